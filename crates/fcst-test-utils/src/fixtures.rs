use fcst_record::{
    entities, EntitySchema, FieldName, FieldSpec, MetricKind, Record, RecordStore,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;

/// Two-field schema: `category` (identity) and `amount` (editable), with
/// `rows`, `total` and `mean` metrics
pub fn sample_schema() -> Arc<EntitySchema> {
    Arc::new(
        EntitySchema::builder("sample")
            .field(FieldSpec::identity("category", "Category"))
            .field(FieldSpec::editable("amount", "Amount"))
            .search(&["category"])
            .metric("rows", MetricKind::Count)
            .metric("total", MetricKind::Sum(FieldName::from("amount")))
            .metric("mean", MetricKind::Mean(FieldName::from("amount")))
            .build()
            .unwrap(),
    )
}

pub fn sample_row(key: &str, category: &str, amount: f64) -> Record {
    Record::new(key).with("category", category).with("amount", amount)
}

/// Keys 1..=5 with categories A, A, B, B, C and amounts 10..=50
pub fn scenario_records() -> Vec<Record> {
    vec![
        sample_row("1", "A", 10.0),
        sample_row("2", "A", 20.0),
        sample_row("3", "B", 30.0),
        sample_row("4", "B", 40.0),
        sample_row("5", "C", 50.0),
    ]
}

pub fn scenario_store() -> RecordStore {
    RecordStore::from_records(sample_schema(), scenario_records()).unwrap()
}

const PDTS: &[&str] = &["Chargers", "Power Banks", "Cables", "Wireless"];
const SEGMENTS: &[&str] = &["S1", "S2", "S3"];
const MONTHS: &[&str] = &[
    "jan2025Sales",
    "feb2025Sales",
    "mar2025Sales",
    "apr2025Sales",
    "may2025Sales",
    "jun2025Sales",
];

/// Deterministic `pn_audit` rows keyed `0..count`
pub fn random_pn_audit_rows(seed: u64, count: usize) -> Vec<Record> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|i| {
            let pdt = PDTS[rng.random_range(0..PDTS.len())];
            let segment = SEGMENTS[rng.random_range(0..SEGMENTS.len())];
            let status =
                entities::PRODUCT_STATUSES[rng.random_range(0..entities::PRODUCT_STATUSES.len())];
            let mut record = Record::new(i)
                .with("pdt", pdt)
                .with("pn", format!("A{:04}", rng.random_range(1000..10_000)))
                .with("singularitySegment", segment)
                .with("productStatus", status);
            for month in MONTHS {
                record = record.with(*month, f64::from(rng.random_range(0u32..5_000)));
            }
            let forecast = f64::from(rng.random_range(0u32..20_000));
            record
                .with("currentStock", f64::from(rng.random_range(0u32..10_000)))
                .with("q3SalesForecastQuantity", forecast)
                .with("q3ForecastAmount", forecast * 25.0)
                .with("auditCorrectedQuantity", forecast)
        })
        .collect()
}
