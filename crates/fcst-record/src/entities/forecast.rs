//! Forecast collection sheet and collection template

use super::PRODUCT_STATUSES;
use crate::error::SchemaError;
use crate::field::{FieldName, FieldSpec};
use crate::schema::{EntitySchema, MetricKind};

const MONTHS_H1: &[&str] = &[
    "jan2025Sales",
    "feb2025Sales",
    "mar2025Sales",
    "apr2025Sales",
    "may2025Sales",
    "jun2025Sales",
];

/// Forecast collection sheet filled in by sales.
///
/// Sales fill the `*Forecast` columns; the `*Corrected` columns come back
/// from review and are read-only.
///
/// # Errors
/// Returns `SchemaError` if the definition is inconsistent.
pub fn forecast_entry() -> Result<EntitySchema, SchemaError> {
    EntitySchema::builder("forecast_entry")
        .fields([
            FieldSpec::identity("channel", "Channel"),
            FieldSpec::identity("sku", "SKU"),
            FieldSpec::identity("pdt", "PDT"),
            FieldSpec::identity("singularity", "Singularity segment"),
            FieldSpec::identity("pn", "PN"),
            FieldSpec::identity("cnCategory", "CN category"),
            FieldSpec::identity("skuName", "SKU name"),
            FieldSpec::identity_enum("skuStatus", "SKU status", PRODUCT_STATUSES),
        ])
        .fields(MONTHS_H1.iter().map(|m| FieldSpec::derived(m, m)))
        .fields([
            FieldSpec::derived("jul2025Sales", "Jul 2025 sales"),
            FieldSpec::derived("aug2025Sales", "Aug 2025 sales"),
            FieldSpec::derived("avgPrice", "Average price (ex tax)"),
            FieldSpec::derived("q3PlanTotal", "Q3 plan total"),
            FieldSpec::derived("currentSales", "Current sales"),
            FieldSpec::derived("timeProgress", "Time progress %"),
            FieldSpec::derived("vsTimeProgress", "vs time progress %"),
            FieldSpec::derived("inventory", "Inventory"),
            FieldSpec::derived("q3Total", "Q3 total"),
            FieldSpec::editable("augForecast", "Aug forecast"),
            FieldSpec::editable("sepForecast", "Sep forecast"),
            FieldSpec::editable("octForecast", "Oct forecast"),
            FieldSpec::editable("novForecast", "Nov forecast"),
            FieldSpec::editable("decForecast", "Dec forecast"),
            FieldSpec::derived("aug2Corrected", "Aug (corrected)"),
            FieldSpec::derived("sep2Corrected", "Sep (corrected)"),
            FieldSpec::derived("oct2Corrected", "Oct (corrected)"),
            FieldSpec::derived("nov2Corrected", "Nov (corrected)"),
            FieldSpec::derived("dec2Corrected", "Dec (corrected)"),
        ])
        .search(&["sku", "pn", "pdt", "skuName"])
        .partial_match(&["sku", "pn"])
        .group(
            "basic",
            "Basic",
            &["channel", "sku", "pdt", "singularity", "pn", "cnCategory", "skuName", "skuStatus"],
        )
        .group("history", "Sales history", MONTHS_H1)
        .group(
            "progress",
            "Progress",
            &[
                "jul2025Sales",
                "aug2025Sales",
                "avgPrice",
                "q3PlanTotal",
                "currentSales",
                "timeProgress",
                "vsTimeProgress",
                "inventory",
                "q3Total",
            ],
        )
        .group(
            "forecast",
            "Sales forecast",
            &["augForecast", "sepForecast", "octForecast", "novForecast", "decForecast"],
        )
        .group(
            "corrected",
            "Corrected",
            &[
                "aug2Corrected",
                "sep2Corrected",
                "oct2Corrected",
                "nov2Corrected",
                "dec2Corrected",
            ],
        )
        .default_columns(&[
            "sku",
            "pn",
            "augForecast",
            "sepForecast",
            "octForecast",
            "novForecast",
            "decForecast",
        ])
        .metric("rows", MetricKind::Count)
        .metric("q3PlanTotal", MetricKind::Sum(FieldName::from("q3PlanTotal")))
        .metric("inventory", MetricKind::Sum(FieldName::from("inventory")))
        .metric("augForecast", MetricKind::Sum(FieldName::from("augForecast")))
        .metric("sepForecast", MetricKind::Sum(FieldName::from("sepForecast")))
        .metric("octForecast", MetricKind::Sum(FieldName::from("octForecast")))
        .metric("novForecast", MetricKind::Sum(FieldName::from("novForecast")))
        .metric("decForecast", MetricKind::Sum(FieldName::from("decForecast")))
        .build()
}

/// Forecast collection template with first-half monthly sales
///
/// # Errors
/// Returns `SchemaError` if the definition is inconsistent.
pub fn forecast_template() -> Result<EntitySchema, SchemaError> {
    EntitySchema::builder("forecast_template")
        .fields([
            FieldSpec::identity("channel", "Channel"),
            FieldSpec::identity("ankerSKU", "Anker SKU"),
            FieldSpec::identity("pdt", "PDT"),
            FieldSpec::identity("singularity", "Singularity segment"),
            FieldSpec::identity("pn", "PN"),
            FieldSpec::editable_text("skuDescription", "SKU description"),
            FieldSpec::identity_enum("productStatus", "Product status", PRODUCT_STATUSES),
        ])
        .fields(MONTHS_H1.iter().map(|m| FieldSpec::editable(m, m)))
        .field(FieldSpec::derived("q3Summary", "Q3 summary"))
        .search(&["ankerSKU", "pdt", "pn", "skuDescription"])
        .partial_match(&["ankerSKU", "pn"])
        .group(
            "basic",
            "Basic",
            &["channel", "ankerSKU", "pdt", "singularity", "pn", "skuDescription", "productStatus"],
        )
        .group("sales", "Monthly sales", MONTHS_H1)
        .group("summary", "Summary", &["q3Summary"])
        .default_columns(&["ankerSKU", "pdt", "pn", "q3Summary"])
        .metric("rows", MetricKind::Count)
        .metric("totalQ3Summary", MetricKind::Sum(FieldName::from("q3Summary")))
        .metric(
            "avgMonthlySales",
            MetricKind::MeanAcross(MONTHS_H1.iter().map(|m| FieldName::from(*m)).collect()),
        )
        .build()
}
