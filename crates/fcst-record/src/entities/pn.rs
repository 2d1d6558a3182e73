//! PN-level schemas: the PN detail table, the PN audit review and the
//! regional PN forecast review

use super::{PRODUCT_STATUSES, REVIEW_STATUSES, SALES_TRENDS};
use crate::error::SchemaError;
use crate::field::{FieldKind, FieldName, FieldSpec, ValueKind};
use crate::scalar::Scalar;
use crate::schema::{EntitySchema, MetricKind};

/// PN detail table with shipment, inventory and gap columns
///
/// `timeProgress`, `timeGap` and `quarterGap` are stored inputs, not
/// recomputed here.
///
/// # Errors
/// Returns `SchemaError` if the definition is inconsistent.
pub fn pn_data() -> Result<EntitySchema, SchemaError> {
    EntitySchema::builder("pn_data")
        .fields([
            FieldSpec::identity("brand", "Brand"),
            FieldSpec::identity("channel", "Channel"),
            FieldSpec::identity("sku", "SKU"),
            FieldSpec::identity("pdt", "PDT"),
            FieldSpec::identity("pn", "PN"),
            FieldSpec::identity("singularitySegment", "Singularity segment"),
            FieldSpec::identity("cnCategory", "CN category"),
            FieldSpec::identity_enum("productStatus", "Product status", PRODUCT_STATUSES),
            FieldSpec::identity_enum("salesTrend", "Sales trend", SALES_TRENDS),
            FieldSpec::derived("q3ForecastQuantity", "Q3 forecast qty"),
            FieldSpec::derived("q3ForecastAmount", "Q3 forecast amount"),
            FieldSpec::editable("julyForecast", "Jul forecast"),
            FieldSpec::editable("augustForecast", "Aug forecast"),
            FieldSpec::editable("septemberForecast", "Sep forecast"),
            FieldSpec::derived("quarterProgress", "Quarter progress %"),
            FieldSpec::derived("actualShipment", "Actual shipment"),
            FieldSpec::derived("timeProgress", "Time progress %"),
            FieldSpec::derived("shipmentVolume", "Shipment volume"),
            FieldSpec::derived("offlineInventory", "Offline inventory"),
            FieldSpec::derived("offlineSuper", "Offline super"),
            FieldSpec::derived("omniChannelInventory", "Omni-channel inventory"),
            FieldSpec::derived("salesAchievementRate", "Achievement rate %"),
            FieldSpec::derived("timeGap", "Time gap"),
            FieldSpec::derived("quarterGap", "Quarter gap"),
            FieldSpec::editable_text("remarks", "Remarks"),
        ])
        .search(&["pdt", "pn", "singularitySegment"])
        .partial_match(&["pdt", "pn"])
        .group(
            "basic",
            "Basic",
            &["pdt", "pn", "singularitySegment", "productStatus", "salesTrend"],
        )
        .group(
            "forecast",
            "Forecast",
            &[
                "q3ForecastQuantity",
                "q3ForecastAmount",
                "julyForecast",
                "augustForecast",
                "septemberForecast",
            ],
        )
        .group(
            "shipment",
            "Shipment",
            &[
                "actualShipment",
                "timeProgress",
                "shipmentVolume",
                "salesAchievementRate",
            ],
        )
        .group(
            "inventory",
            "Inventory",
            &["offlineInventory", "offlineSuper", "omniChannelInventory"],
        )
        .group("analysis", "Analysis", &["timeGap", "quarterGap"])
        .group("other", "Other", &["remarks"])
        .default_columns(&[
            "pdt",
            "pn",
            "julyForecast",
            "augustForecast",
            "septemberForecast",
        ])
        .metric("rows", MetricKind::Count)
        .metric(
            "totalForecastAmount",
            MetricKind::Sum(FieldName::from("q3ForecastAmount")),
        )
        .metric(
            "totalActualShipment",
            MetricKind::Sum(FieldName::from("actualShipment")),
        )
        .metric(
            "avgAchievementRate",
            MetricKind::Mean(FieldName::from("salesAchievementRate")),
        )
        .build()
}

/// PN audit review: monthly sales history plus the editable corrected quantity
///
/// # Errors
/// Returns `SchemaError` if the definition is inconsistent.
pub fn pn_audit() -> Result<EntitySchema, SchemaError> {
    EntitySchema::builder("pn_audit")
        .fields([
            FieldSpec::identity("pdt", "PDT"),
            FieldSpec::identity("pn", "PN"),
            FieldSpec::identity("singularitySegment", "Singularity segment"),
            FieldSpec::identity_enum("productStatus", "Product status", PRODUCT_STATUSES),
            FieldSpec::derived("jan2025Sales", "Jan 2025 sales"),
            FieldSpec::derived("feb2025Sales", "Feb 2025 sales"),
            FieldSpec::derived("mar2025Sales", "Mar 2025 sales"),
            FieldSpec::derived("apr2025Sales", "Apr 2025 sales"),
            FieldSpec::derived("may2025Sales", "May 2025 sales"),
            FieldSpec::derived("jun2025Sales", "Jun 2025 sales"),
            FieldSpec::derived("currentStock", "Current stock"),
            FieldSpec::derived("q3SalesForecastQuantity", "Q3 sales forecast qty"),
            FieldSpec::derived("q3ForecastAmount", "Q3 forecast amount"),
            FieldSpec::editable("auditCorrectedQuantity", "Audit corrected qty"),
        ])
        .search(&["pdt", "pn", "singularitySegment"])
        .partial_match(&["pdt", "pn"])
        .group(
            "basic",
            "Basic",
            &["pdt", "pn", "singularitySegment", "productStatus"],
        )
        .group(
            "sales",
            "Sales history",
            &[
                "jan2025Sales",
                "feb2025Sales",
                "mar2025Sales",
                "apr2025Sales",
                "may2025Sales",
                "jun2025Sales",
            ],
        )
        .group(
            "forecast",
            "Forecast",
            &["currentStock", "q3SalesForecastQuantity", "q3ForecastAmount"],
        )
        .group("audit", "Audit", &["auditCorrectedQuantity"])
        .default_columns(&["pdt", "pn", "auditCorrectedQuantity"])
        .metric("rows", MetricKind::Count)
        .metric(
            "totalQ3Forecast",
            MetricKind::Sum(FieldName::from("q3SalesForecastQuantity")),
        )
        .metric(
            "totalCorrected",
            MetricKind::Sum(FieldName::from("auditCorrectedQuantity")),
        )
        .metric(
            "totalAmount",
            MetricKind::Sum(FieldName::from("q3ForecastAmount")),
        )
        .metric(
            "avgCorrectionRate",
            MetricKind::Ratio {
                numerator: FieldName::from("auditCorrectedQuantity"),
                denominator: FieldName::from("q3SalesForecastQuantity"),
                percent: true,
            },
        )
        .build()
}

/// Regional PN forecast review: a reviewer adjusts the sales forecast and
/// sets a review status with a comment
///
/// `adjustmentRatio` is stored as delivered, not recomputed on edit.
///
/// # Errors
/// Returns `SchemaError` if the definition is inconsistent.
pub fn pn_review() -> Result<EntitySchema, SchemaError> {
    let status_count = |status: &str| MetricKind::CountWhere {
        field: FieldName::from("reviewStatus"),
        value: Scalar::text(status),
    };
    EntitySchema::builder("pn_review")
        .fields([
            FieldSpec::identity("pn", "PN"),
            FieldSpec::identity("region", "Region"),
            FieldSpec::identity("salesPerson", "Sales"),
            FieldSpec::derived("salesForecast", "Sales forecast"),
            FieldSpec::editable("adjustedForecast", "Adjusted forecast"),
            FieldSpec::derived("adjustmentRatio", "Adjustment %"),
            FieldSpec::new(
                "reviewStatus",
                "Review status",
                ValueKind::variants(REVIEW_STATUSES),
                FieldKind::Editable,
            ),
            FieldSpec::editable_text("reviewComment", "Review comment"),
        ])
        .search(&["pn", "region", "salesPerson"])
        .partial_match(&["pn"])
        .group("basic", "Basic", &["pn", "region", "salesPerson"])
        .group(
            "forecast",
            "Forecast",
            &["salesForecast", "adjustedForecast", "adjustmentRatio"],
        )
        .group("review", "Review", &["reviewStatus", "reviewComment"])
        .default_columns(&[
            "pn",
            "region",
            "salesPerson",
            "adjustedForecast",
            "reviewStatus",
        ])
        .metric("rows", MetricKind::Count)
        .metric(
            "totalSalesForecast",
            MetricKind::Sum(FieldName::from("salesForecast")),
        )
        .metric(
            "totalAdjustedForecast",
            MetricKind::Sum(FieldName::from("adjustedForecast")),
        )
        .metric("approved", status_count("approved"))
        .metric("pending", status_count("pending"))
        .metric("rejected", status_count("rejected"))
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn audit_only_edits_corrected_quantity() {
        let schema = pn_audit().unwrap();
        let editable: Vec<&str> = schema.editable_fields().map(|f| f.name.as_str()).collect();
        assert_eq!(editable, vec!["auditCorrectedQuantity"]);
    }

    #[test]
    fn pn_data_groups_cover_grouped_fields_once() {
        let schema = pn_data().unwrap();
        assert_eq!(schema.group_of("timeGap").map(|g| g.name.as_str()), Some("analysis"));
        assert!(schema.group_of("brand").is_none());
        assert!(schema.is_partial_match("pn"));
        assert!(!schema.is_partial_match("productStatus"));
    }

    #[test]
    fn review_edits_forecast_status_and_comment() {
        let schema = pn_review().unwrap();
        let editable: Vec<&str> = schema.editable_fields().map(|f| f.name.as_str()).collect();
        assert_eq!(editable, vec!["adjustedForecast", "reviewStatus", "reviewComment"]);
        let status = FieldName::from("reviewStatus");
        assert!(schema.check_value(&status, &Scalar::text("approved")).is_ok());
        assert!(schema.check_value(&status, &Scalar::text("done")).is_err());
    }
}
