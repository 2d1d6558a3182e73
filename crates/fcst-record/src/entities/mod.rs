//! Built-in entity schemas
//!
//! One schema per grid in the forecast desk: PN detail data, the forecast
//! collection sheet, PN audit review, PDT category forecasts, regional PN
//! forecast review, the forecast collection template, and the PN/SKU
//! quick-entry lists.

mod forecast;
mod pdt;
mod pn;
mod quick;

pub use forecast::{forecast_entry, forecast_template};
pub use pdt::pdt_forecast;
pub use pn::{pn_audit, pn_data, pn_review};
pub use quick::{pn_quick_entry, sku_quick_entry, PN_CODE_FIELD, SKU_CODE_FIELD};

use crate::error::SchemaError;
use crate::schema::EntitySchema;
use once_cell::sync::Lazy;
use std::sync::Arc;

/// Product lifecycle states
pub const PRODUCT_STATUSES: &[&str] = &["active", "inactive", "eol", "new"];

/// Sales trend directions
pub const SALES_TRENDS: &[&str] = &["rising", "stable", "declining"];

/// Review states of a [`pn_review`] row
pub const REVIEW_STATUSES: &[&str] = &["pending", "approved", "rejected"];

static CATALOG: Lazy<Result<Vec<Arc<EntitySchema>>, SchemaError>> = Lazy::new(|| {
    Ok(vec![
        Arc::new(pn_data()?),
        Arc::new(forecast_entry()?),
        Arc::new(pn_audit()?),
        Arc::new(pdt_forecast()?),
        Arc::new(pn_review()?),
        Arc::new(forecast_template()?),
        Arc::new(pn_quick_entry()?),
        Arc::new(sku_quick_entry()?),
    ])
});

/// All built-in schemas, shared
///
/// # Errors
/// Returns the first `SchemaError` if a built-in definition is inconsistent.
pub fn catalog() -> Result<&'static [Arc<EntitySchema>], SchemaError> {
    CATALOG.as_ref().map(Vec::as_slice).map_err(|e| e.clone())
}

/// Look up a built-in schema by entity name
///
/// # Errors
/// Propagates catalog construction errors.
pub fn by_name(name: &str) -> Result<Option<Arc<EntitySchema>>, SchemaError> {
    Ok(catalog()?.iter().find(|s| s.name() == name).cloned())
}
