//! Quick-entry lists keyed by PN or by SKU

use crate::error::SchemaError;
use crate::field::{FieldKind, FieldName, FieldSpec, ValueKind};
use crate::schema::{EntitySchema, MetricKind};

/// Field holding the product code in [`pn_quick_entry`]
pub const PN_CODE_FIELD: &str = "pn";

/// Field holding the product code in [`sku_quick_entry`]
pub const SKU_CODE_FIELD: &str = "sku";

fn quick_entry(
    entity: &str,
    code_field: &str,
    code_label: &str,
) -> Result<EntitySchema, SchemaError> {
    EntitySchema::builder(entity)
        .fields([
            FieldSpec::identity(code_field, code_label),
            FieldSpec::identity("region", "Region"),
            FieldSpec::identity("salesPerson", "Sales"),
            FieldSpec::editable("quantity", "Quantity"),
            FieldSpec::new("isNew", "New", ValueKind::Bool, FieldKind::Derived),
        ])
        .search(&[code_field, "region", "salesPerson"])
        .partial_match(&[code_field])
        .group("basic", "Basic", &[code_field, "region", "salesPerson"])
        .group("entry", "Entry", &["quantity", "isNew"])
        .default_columns(&[code_field, "region", "salesPerson", "quantity"])
        .metric("rows", MetricKind::Count)
        .metric("totalQuantity", MetricKind::Sum(FieldName::from("quantity")))
        .metric(
            "newRows",
            MetricKind::CountWhere {
                field: FieldName::from("isNew"),
                value: true.into(),
            },
        )
        .build()
}

/// Fast entry by PN
///
/// # Errors
/// Returns `SchemaError` if the definition is inconsistent.
pub fn pn_quick_entry() -> Result<EntitySchema, SchemaError> {
    quick_entry("pn_quick_entry", PN_CODE_FIELD, "PN")
}

/// Fast entry by SKU
///
/// # Errors
/// Returns `SchemaError` if the definition is inconsistent.
pub fn sku_quick_entry() -> Result<EntitySchema, SchemaError> {
    quick_entry("sku_quick_entry", SKU_CODE_FIELD, "SKU")
}
