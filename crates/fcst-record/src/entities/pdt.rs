//! PDT (category) level forecast

use crate::error::SchemaError;
use crate::field::{FieldName, FieldSpec};
use crate::schema::{EntitySchema, MetricKind};

/// Category-level forecast with Q3 achievement and Q4 monthly forecasts
///
/// # Errors
/// Returns `SchemaError` if the definition is inconsistent.
pub fn pdt_forecast() -> Result<EntitySchema, SchemaError> {
    EntitySchema::builder("pdt_forecast")
        .fields([
            FieldSpec::identity("cnCategory", "CN category"),
            FieldSpec::derived("q3AchievedAmount", "Q3 achieved amount"),
            FieldSpec::editable("septemberForecast", "Sep forecast"),
            FieldSpec::editable("octoberForecast", "Oct forecast"),
            FieldSpec::editable("novemberForecast", "Nov forecast"),
            FieldSpec::editable("decemberForecast", "Dec forecast"),
            FieldSpec::derived("q3TotalAmount", "Q3 total amount"),
            FieldSpec::derived("q4TotalAmount", "Q4 total amount"),
        ])
        .search(&["cnCategory"])
        .partial_match(&["cnCategory"])
        .group("basic", "Basic", &["cnCategory"])
        .group(
            "forecast",
            "Forecast",
            &[
                "septemberForecast",
                "octoberForecast",
                "novemberForecast",
                "decemberForecast",
            ],
        )
        .group(
            "totals",
            "Totals",
            &["q3AchievedAmount", "q3TotalAmount", "q4TotalAmount"],
        )
        .metric("rows", MetricKind::Count)
        .metric(
            "q3AchievedAmount",
            MetricKind::Sum(FieldName::from("q3AchievedAmount")),
        )
        .metric("q3TotalAmount", MetricKind::Sum(FieldName::from("q3TotalAmount")))
        .metric("q4TotalAmount", MetricKind::Sum(FieldName::from("q4TotalAmount")))
        .metric(
            "q3Achievement",
            MetricKind::Ratio {
                numerator: FieldName::from("q3AchievedAmount"),
                denominator: FieldName::from("q3TotalAmount"),
                percent: true,
            },
        )
        .build()
}
