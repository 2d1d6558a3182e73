use fcst_core::prelude::*;
use fcst_core::ImportReport;
use fcst_edit::{DiscardSink, EditError};
use fcst_test_utils::{random_pn_audit_rows, sample_row, sample_schema, scenario_records};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use std::sync::Arc;

fn desk(config: &DeskConfig) -> Workbench {
    Workbench::new(
        sample_schema(),
        scenario_records(),
        config,
        Arc::new(DiscardSink),
        Arc::new(TracingNotifier),
    )
    .unwrap()
}

fn amounts(rows: &[&Record]) -> Vec<f64> {
    rows.iter().map(|r| r.number("amount")).collect()
}

fn keys(rows: &[&Record]) -> Vec<String> {
    rows.iter().map(|r| r.key().to_string()).collect()
}

#[test]
fn test_filter_summarize_edit_scenario() {
    let mut desk = desk(&DeskConfig::default());

    desk.set_filter("category", "A");
    assert_eq!(amounts(&desk.visible()), vec![10.0, 20.0]);
    let summary = desk.summary();
    assert_eq!(summary["total"], 30.0);
    assert_eq!(summary["mean"], 15.0);

    desk.edit("1", "amount", 25.0).unwrap();
    assert_eq!(amounts(&desk.visible()), vec![25.0, 20.0]);
    assert_eq!(desk.summary()["total"], 45.0);
}

#[test]
fn test_page_size_two_scenario() {
    let config = DeskConfig::new().with_pagination(vec![2, 10], 2);
    let mut desk = desk(&config);

    let first = desk.current_page();
    assert_eq!(keys(&first.items), vec!["1", "2"]);
    assert_eq!(first.total, 5);
    assert_eq!(first.pages, 3);

    desk.set_page(3);
    assert_eq!(keys(&desk.current_page().items), vec!["5"]);

    desk.set_page(4);
    let beyond = desk.current_page();
    assert!(beyond.items.is_empty());
    assert_eq!(beyond.total, 5);

    desk.set_page(0);
    assert!(desk.current_page().items.is_empty());
}

#[test]
fn test_page_size_change_resets_page() {
    let config = DeskConfig::new().with_pagination(vec![2, 10], 2);
    let mut desk = desk(&config);
    desk.set_page(2);
    desk.set_page_size(10).unwrap();
    assert_eq!(desk.pagination().page(), 1);
    assert!(matches!(desk.set_page_size(7), Err(DeskError::Pagination(_))));
}

#[test]
fn test_invalid_edits_leave_store_untouched() {
    let mut desk = desk(&DeskConfig::default());
    let err = desk.edit("1", "amount", "lots").unwrap_err();
    assert!(matches!(err, DeskError::Edit(EditError::InvalidNumber { .. })));
    assert!(err.is_user_error());

    let err = desk.edit("1", "category", "Z").unwrap_err();
    assert!(matches!(err, DeskError::Edit(EditError::NotEditable(_))));
    assert_eq!(desk.store().get("1").unwrap().number("amount"), 10.0);
}

#[test]
fn test_negative_input_clamped() {
    let mut desk = desk(&DeskConfig::default());
    let outcome = desk.edit("2", "amount", -5.0).unwrap();
    assert!(outcome.clamped);
    assert_eq!(desk.store().get("2").unwrap().number("amount"), 0.0);
}

#[test]
fn test_search_and_clear() {
    let mut desk = desk(&DeskConfig::default());
    desk.set_search("  b ");
    assert_eq!(keys(&desk.visible()), vec!["3", "4"]);
    desk.set_filter("unknownField", "x");
    assert_eq!(keys(&desk.visible()), vec!["3", "4"]);
    desk.clear_filters();
    assert_eq!(desk.visible().len(), 5);
}

#[test]
fn test_snapshot_reflects_view() {
    let mut desk = desk(&DeskConfig::new().with_pagination(vec![2, 10], 2));
    desk.set_filter("category", "B");
    let snapshot = desk.snapshot();

    assert_eq!(snapshot.entity, "sample");
    assert_eq!(snapshot.columns.len(), 2);
    assert_eq!(snapshot.rows.len(), 2);
    assert_eq!(snapshot.summary["total"], 70.0);
    assert_eq!(snapshot.page.total, 2);

    let json = serde_json::to_value(&snapshot).unwrap();
    assert_eq!(json["page"]["pages"], 1);
}

#[test]
fn test_add_and_remove_rows() {
    let mut desk = desk(&DeskConfig::default());
    desk.add_record(sample_row("6", "A", 60.0)).unwrap();
    assert!(matches!(
        desk.add_record(sample_row("6", "A", 1.0)),
        Err(DeskError::Edit(EditError::Record(_)))
    ));
    desk.set_filter("category", "A");
    assert_eq!(amounts(&desk.visible()), vec![10.0, 20.0, 60.0]);

    desk.remove_record("1").unwrap();
    assert_eq!(amounts(&desk.visible()), vec![20.0, 60.0]);
    assert!(desk.remove_record("1").is_err());
}

#[test]
fn test_detail_navigation_bounded() {
    let mut desk = desk(&DeskConfig::default());
    desk.set_filter("category", "A");
    assert_eq!(desk.open_detail(0).map(|r| r.key().to_string()), Some("1".into()));
    assert_eq!(desk.next_detail().map(|r| r.key().to_string()), Some("2".into()));
    assert_eq!(desk.next_detail().map(|r| r.key().to_string()), Some("2".into()));
    assert_eq!(desk.prev_detail().map(|r| r.key().to_string()), Some("1".into()));
    assert!(desk.open_detail(5).is_none());
    desk.close_detail();
    assert!(desk.detail().is_none());
}

#[test]
fn test_column_groups_on_builtin_entity() {
    let mut desk = Workbench::for_entity(
        "pn_audit",
        random_pn_audit_rows(7, 12),
        &DeskConfig::default(),
        Arc::new(DiscardSink),
        Arc::new(TracingNotifier),
    )
    .unwrap();

    assert_eq!(desk.group_state("sales"), Some(GroupState::None));
    desk.toggle_column("mar2025Sales", true);
    assert_eq!(desk.group_state("sales"), Some(GroupState::Partial));
    desk.toggle_group("sales", true);
    assert_eq!(desk.group_state("sales"), Some(GroupState::All));
    desk.toggle_column("notAColumn", true);
    assert!(!desk.columns().contains("notAColumn"));

    desk.select_all_columns();
    assert_eq!(desk.visible_fields().len(), desk.schema().fields().count());
    desk.reset_columns();
    assert_eq!(desk.columns().len(), 3);
}

fn review_row(key: &str, pn: &str, status: &str) -> Record {
    Record::new(key)
        .with("pn", pn)
        .with("region", "华东区")
        .with("salesPerson", "张三")
        .with("salesForecast", 12000.0)
        .with("adjustedForecast", 12000.0)
        .with("adjustmentRatio", 0.0)
        .with("reviewStatus", status)
        .with("reviewComment", "")
}

#[test]
fn test_review_approval_through_edits() {
    let mut desk = Workbench::for_entity(
        "pn_review",
        vec![
            review_row("1", "A5634", "approved"),
            review_row("2", "A5635", "pending"),
            review_row("3", "A5636", "pending"),
        ],
        &DeskConfig::default(),
        Arc::new(DiscardSink),
        Arc::new(TracingNotifier),
    )
    .unwrap();
    assert_eq!(desk.summary()["approved"], 1.0);
    assert_eq!(desk.summary()["pending"], 2.0);

    desk.edit("2", "adjustedForecast", "13,200").unwrap();
    desk.edit("2", "reviewStatus", "approved").unwrap();
    desk.edit("2", "reviewComment", "raised for Q4 launch").unwrap();

    let summary = desk.summary();
    assert_eq!(summary["approved"], 2.0);
    assert_eq!(summary["pending"], 1.0);
    assert_eq!(summary["rejected"], 0.0);
    assert_eq!(summary["totalAdjustedForecast"], 37200.0);
    // stored ratio is not recomputed
    assert_eq!(desk.store().get("2").unwrap().number("adjustmentRatio"), 0.0);

    assert!(matches!(
        desk.edit("3", "reviewStatus", "escalated"),
        Err(DeskError::Edit(EditError::Record(_)))
    ));
    assert!(matches!(
        desk.edit("3", "adjustmentRatio", 5.0),
        Err(DeskError::Edit(EditError::NotEditable(_)))
    ));

    desk.set_filter("reviewStatus", "approved");
    assert_eq!(keys(&desk.visible()), vec!["1", "2"]);
}

#[test]
fn test_batch_edit_reports_each_patch() {
    let mut desk = desk(&DeskConfig::default());
    let outcome = desk.batch_edit(vec![
        EditPatch::new("1", "amount", 11.0),
        EditPatch::new("9", "amount", 1.0),
        EditPatch::new("2", "amount", "1,200"),
    ]);
    assert_eq!(outcome.applied.len(), 2);
    assert_eq!(outcome.failed.len(), 1);
    assert_eq!(desk.store().get("2").unwrap().number("amount"), 1200.0);
}

#[test]
fn test_default_import_report_is_empty() {
    let report = ImportReport::default();
    assert_eq!(report.merge.accepted(), 0);
    assert!(report.row_errors.is_empty());
}

proptest! {
    #[test]
    fn prop_pages_partition_visible_rows(
        seed in any::<u64>(),
        count in 0usize..60,
        size in prop_oneof![Just(10usize), Just(20), Just(50)],
        segment in prop_oneof![Just(""), Just("S1"), Just("S2")],
    ) {
        let mut desk = Workbench::for_entity(
            "pn_audit",
            random_pn_audit_rows(seed, count),
            &DeskConfig::default(),
            Arc::new(DiscardSink),
            Arc::new(TracingNotifier),
        )
        .unwrap();
        desk.set_filter("singularitySegment", segment);
        desk.set_page_size(size).unwrap();

        let visible = keys(&desk.visible());
        let mut paged = Vec::new();
        for page in 1..=visible.len().div_ceil(size) + 1 {
            desk.set_page(page);
            let slice = desk.current_page();
            prop_assert_eq!(slice.total, visible.len());
            paged.extend(keys(&slice.items));
        }
        prop_assert_eq!(paged, visible);
    }
}
