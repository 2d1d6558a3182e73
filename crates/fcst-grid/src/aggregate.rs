//! Summary metrics over the visible rows
//!
//! Every metric is recomputed from scratch on each call. Results are always
//! finite; an empty input yields zero for every metric.

use fcst_record::{MetricKind, MetricSpec, Record};
use indexmap::IndexMap;

/// Metric name to value, in metric declaration order
pub type Summary = IndexMap<String, f64>;

/// Compute every metric over `records`
#[must_use]
pub fn summarize(metrics: &[MetricSpec], records: &[&Record]) -> Summary {
    metrics
        .iter()
        .map(|metric| (metric.name.clone(), evaluate(&metric.kind, records)))
        .collect()
}

/// Compute one metric
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn evaluate(kind: &MetricKind, records: &[&Record]) -> f64 {
    let rows = records.len() as f64;
    let value = match kind {
        MetricKind::Count => rows,
        MetricKind::Sum(field) => sum(records, field.as_str()),
        MetricKind::Mean(field) => ratio(sum(records, field.as_str()), rows),
        MetricKind::CountWhere { field, value } => records
            .iter()
            .filter(|r| r.value(field.as_str()).matches_exact(value))
            .count() as f64,
        MetricKind::Ratio {
            numerator,
            denominator,
            percent,
        } => {
            let r = ratio(
                sum(records, numerator.as_str()),
                sum(records, denominator.as_str()),
            );
            if *percent {
                r * 100.0
            } else {
                r
            }
        }
        MetricKind::MeanAcross(fields) => {
            let total: f64 = fields.iter().map(|f| sum(records, f.as_str())).sum();
            ratio(total, rows * fields.len() as f64)
        }
    };
    finite(value)
}

/// Row counts per distinct value of a field, in first-seen order.
///
/// Blank values are not counted.
#[must_use]
pub fn group_counts(records: &[&Record], field: &str) -> IndexMap<String, usize> {
    let mut counts = IndexMap::new();
    for record in records {
        let value = record.value(field);
        if value.is_blank() {
            continue;
        }
        *counts.entry(value.to_string()).or_insert(0) += 1;
    }
    counts
}

fn sum(records: &[&Record], field: &str) -> f64 {
    records.iter().map(|r| r.number(field)).sum()
}

fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

fn finite(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fcst_record::{entities, FieldName};
    use pretty_assertions::assert_eq;

    fn metrics() -> Vec<MetricSpec> {
        vec![
            MetricSpec {
                name: "sum".into(),
                kind: MetricKind::Sum(FieldName::from("amount")),
            },
            MetricSpec {
                name: "mean".into(),
                kind: MetricKind::Mean(FieldName::from("amount")),
            },
            MetricSpec {
                name: "count".into(),
                kind: MetricKind::Count,
            },
        ]
    }

    fn rows() -> Vec<Record> {
        vec![
            Record::new("1").with("amount", 10.0).with("target", 20.0),
            Record::new("2").with("amount", 20.0).with("target", 20.0),
        ]
    }

    #[test]
    fn sum_mean_count() {
        let rows = rows();
        let refs: Vec<&Record> = rows.iter().collect();
        let summary = summarize(&metrics(), &refs);
        assert_eq!(summary["sum"], 30.0);
        assert_eq!(summary["mean"], 15.0);
        assert_eq!(summary["count"], 2.0);
        assert_eq!(
            summary.keys().cloned().collect::<Vec<_>>(),
            vec!["sum", "mean", "count"]
        );
    }

    #[test]
    fn empty_input_is_all_zero_for_every_builtin_schema() {
        for schema in entities::catalog().unwrap() {
            let summary = summarize(schema.metrics(), &[]);
            assert_eq!(summary.len(), schema.metrics().len());
            assert!(summary.values().all(|v| *v == 0.0), "{}", schema.name());
        }
    }

    #[test]
    fn ratio_with_zero_denominator_is_zero() {
        let single = [Record::new("1").with("amount", 5.0)];
        let refs: Vec<&Record> = single.iter().collect();
        let kind = MetricKind::Ratio {
            numerator: FieldName::from("amount"),
            denominator: FieldName::from("target"),
            percent: true,
        };
        assert_eq!(evaluate(&kind, &refs), 0.0);

        let rows = rows();
        let refs: Vec<&Record> = rows.iter().collect();
        assert_eq!(evaluate(&kind, &refs), 75.0);
    }

    #[test]
    fn mean_across_fields() {
        let months = [
            Record::new("1").with("jan", 10.0).with("feb", 20.0),
            Record::new("2").with("jan", 30.0).with("feb", 40.0),
        ];
        let refs: Vec<&Record> = months.iter().collect();
        let kind = MetricKind::MeanAcross(vec![FieldName::from("jan"), FieldName::from("feb")]);
        assert_eq!(evaluate(&kind, &refs), 25.0);
        assert_eq!(evaluate(&MetricKind::MeanAcross(Vec::new()), &refs), 0.0);
    }

    #[test]
    fn non_finite_values_collapse_to_zero() {
        let huge = [
            Record::new("1").with("amount", f64::MAX),
            Record::new("2").with("amount", f64::MAX),
        ];
        let refs: Vec<&Record> = huge.iter().collect();
        assert_eq!(evaluate(&MetricKind::Sum(FieldName::from("amount")), &refs), 0.0);
    }

    #[test]
    fn group_counts_skip_blank() {
        let segments = [
            Record::new("1").with("segment", "S1"),
            Record::new("2").with("segment", "S2"),
            Record::new("3").with("segment", "S1"),
            Record::new("4"),
        ];
        let refs: Vec<&Record> = segments.iter().collect();
        let counts = group_counts(&refs, "segment");
        assert_eq!(
            counts.into_iter().collect::<Vec<_>>(),
            vec![("S1".to_string(), 2), ("S2".to_string(), 1)]
        );
    }
}
