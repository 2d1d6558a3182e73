//! Canned forecasting assistant
//!
//! Maps a free-text question to one of a few fixed topics by keyword and
//! returns the matching canned reply. Keywords are matched against the
//! lowercased message, in topic order; the first hit wins.

use serde::{Deserialize, Serialize};

/// Topic recognised in a user message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Topic {
    /// Sales trend analysis
    Trend,
    /// Forecast accuracy review
    Accuracy,
    /// Inventory optimisation
    Inventory,
    /// Anomaly detection
    Anomaly,
    /// Nothing recognised
    General,
}

const KEYWORDS: &[(Topic, &[&str])] = &[
    (Topic::Trend, &["销售趋势", "趋势分析", "sales trend", "trend analysis"]),
    (Topic::Accuracy, &["预测准确", "准确性", "forecast accuracy", "accuracy"]),
    (Topic::Inventory, &["库存", "inventory"]),
    (Topic::Anomaly, &["异常", "检测", "anomaly", "detect"]),
];

impl Topic {
    /// Classify a message
    #[must_use]
    pub fn classify(message: &str) -> Self {
        let lower = message.to_lowercase();
        KEYWORDS
            .iter()
            .find(|(_, words)| words.iter().any(|w| lower.contains(w)))
            .map_or(Self::General, |(topic, _)| *topic)
    }

    /// Canned reply for this topic
    #[must_use]
    pub fn reply(self) -> &'static str {
        match self {
            Self::Trend => {
                "Sales trend summary:\n\
                 - Chargers lead the range at 87.5% of the Q3 target; keep investing in fast charging.\n\
                 - Power banks grow steadily under heavy competition; review pricing.\n\
                 - Cables are ahead of plan at 96.8%; check supply capacity before scaling.\n\
                 Ask about a specific product for a detailed breakdown."
            }
            Self::Accuracy => {
                "Forecast accuracy review:\n\
                 - Overall accuracy 92.3% against a 95% target.\n\
                 - On target: cables 96.8%, chargers 94.2%.\n\
                 - Below target: power banks 89.7%, wireless chargers 88.5%.\n\
                 Seasonality and additional external data are the main levers."
            }
            Self::Inventory => {
                "Inventory overview:\n\
                 - Healthy stock: chargers and cables.\n\
                 - Overstock risk: older power bank models; consider promotions.\n\
                 - Shortage risk: new fast-charge SKUs; raise replenishment early.\n\
                 Keep four to six weeks of cover for fast movers."
            }
            Self::Anomaly => {
                "Anomaly scan:\n\
                 - Three SKUs changed by more than 30% month over month.\n\
                 - Two PNs have forecasts far above their six-month average.\n\
                 - One region reported no sales for an active product.\n\
                 Review these rows in the audit view before approval."
            }
            Self::General => {
                "I can help with sales trend analysis, forecast accuracy, \
                 inventory optimisation and anomaly detection. \
                 What would you like to look at?"
            }
        }
    }
}

/// Canned reply for a user message
#[must_use]
pub fn reply(message: &str) -> &'static str {
    let topic = Topic::classify(message);
    tracing::debug!(?topic, "assistant reply");
    topic.reply()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_by_keyword() {
        assert_eq!(Topic::classify("请做一下销售趋势分析"), Topic::Trend);
        assert_eq!(Topic::classify("预测准确率怎么样"), Topic::Accuracy);
        assert_eq!(Topic::classify("Check INVENTORY levels"), Topic::Inventory);
        assert_eq!(Topic::classify("有没有异常数据"), Topic::Anomaly);
        assert_eq!(Topic::classify("hello"), Topic::General);
    }

    #[test]
    fn earlier_topics_win() {
        assert_eq!(Topic::classify("趋势分析和库存"), Topic::Trend);
        assert_eq!(Topic::classify("inventory anomaly"), Topic::Inventory);
    }

    #[test]
    fn reply_matches_topic() {
        assert_eq!(reply("库存"), Topic::Inventory.reply());
        assert_eq!(reply(""), Topic::General.reply());
    }
}
