//! Integration tests for the sheet mutation surface and sheet files

use std::path::Path;

use pretty_assertions::assert_eq;

use sheet_layout::layout::snap::Side;
use sheet_layout::layout::LintCategory;
use sheet_layout::{
    AttachOutcome, CheckpointLog, DetachOutcome, GroupId, LayoutError, PositionUpdate, Sheet,
    SheetError, StackConfig, Unmeasured, Widget, WidgetId,
};

fn id(name: &str) -> WidgetId {
    WidgetId::new(name)
}

fn config() -> StackConfig {
    StackConfig::default()
        .with_kind_size("dice", 80.0, 80.0)
        .with_kind_size("counter", 160.0, 100.0)
}

fn dashboard() -> (Sheet, CheckpointLog) {
    let log = CheckpointLog::new();
    let sheet = Sheet::from_json(include_str!("fixtures/dashboard.json"), config())
        .expect("fixture should load")
        .with_checkpoints(log.clone());
    (sheet, log)
}

fn position(sheet: &Sheet, name: &str) -> (f64, f64) {
    let widget = sheet.get(&id(name)).expect("widget exists");
    (widget.x, widget.y)
}

fn group_members(sheet: &Sheet, group: &str) -> Vec<String> {
    sheet
        .widgets_in_group(&GroupId::new(group))
        .iter()
        .map(|w| w.id.to_string())
        .collect()
}

#[test]
fn test_dashboard_loads_with_groups() {
    let (sheet, log) = dashboard();

    assert_eq!(sheet.len(), 5);
    assert_eq!(group_members(&sheet, "g1"), vec!["dice", "tracker", "timer"]);

    let warnings = sheet.lint(&Unmeasured);
    let categories: Vec<LintCategory> = warnings.iter().map(|w| w.category).collect();
    assert_eq!(categories, vec![LintCategory::Grid]);
    assert!(warnings[0].message.contains("\"counter\""));
    assert!(log.labels().is_empty());
}

#[test]
fn test_auto_stack_dashboard() {
    let (mut sheet, log) = dashboard();

    let updates = sheet.auto_stack(&Unmeasured);

    let moved: Vec<(String, f64, f64)> = updates
        .iter()
        .map(|u| (u.id.to_string(), u.x, u.y))
        .collect();
    assert_eq!(
        moved,
        vec![
            ("dice".to_string(), 0.0, 0.0),
            ("tracker".to_string(), 80.0, 0.0),
            ("timer".to_string(), 80.0, 80.0),
            ("notes".to_string(), 460.0, 0.0),
            ("counter".to_string(), 290.0, 0.0),
        ]
    );
    assert_eq!(position(&sheet, "counter"), (290.0, 0.0));
    assert_eq!(log.labels(), vec!["Auto-stack"]);
    assert!(sheet.lint(&Unmeasured).is_empty());
}

#[test]
fn test_damaged_sheet_is_repaired_on_load() {
    let sheet = Sheet::from_json(include_str!("fixtures/damaged.json"), config()).unwrap();

    assert_eq!(group_members(&sheet, "g7"), vec!["a", "b"]);
    assert_eq!(group_members(&sheet, "g1"), vec!["d", "e"]);
    assert!(group_members(&sheet, "g9").is_empty());
    assert_eq!(sheet.get(&id("c")).unwrap().group_id, None);

    let a = sheet.get(&id("a")).unwrap();
    assert_eq!(a.attached_to.iter().collect::<Vec<_>>(), vec![&id("b")]);
    assert!(sheet.lint(&Unmeasured).is_empty());
}

#[test]
fn test_new_groups_avoid_loaded_ids() {
    let mut sheet = Sheet::from_json(include_str!("fixtures/damaged.json"), config()).unwrap();

    assert_eq!(
        sheet.attach(&id("c"), &id("lonely")).unwrap(),
        AttachOutcome::Formed(GroupId::new("g2"))
    );
    assert_eq!(
        sheet.attach(&id("b"), &id("c")).unwrap(),
        AttachOutcome::Merged {
            kept: GroupId::new("g7"),
            absorbed: GroupId::new("g2"),
        }
    );
    assert_eq!(group_members(&sheet, "g7"), vec!["a", "b", "c", "lonely"]);
}

#[test]
fn test_checkpoint_per_logical_operation() {
    let (mut sheet, log) = dashboard();

    sheet.attach(&id("notes"), &id("counter")).unwrap();
    sheet.attach(&id("counter"), &id("notes")).unwrap();
    sheet.detach(&id("timer")).unwrap();
    sheet.detach(&id("timer")).unwrap();
    let _ = sheet.attach(&id("notes"), &id("nobody"));
    let _ = sheet.attach(&id("notes"), &id("notes"));
    sheet.move_widget(&id("dice"), 0.0, 0.0).unwrap();

    assert_eq!(
        log.labels(),
        vec!["Attach widgets", "Detach widget", "Move widget"]
    );
}

#[test]
fn test_errors_leave_sheet_unchanged() {
    let (mut sheet, log) = dashboard();
    let before = sheet.to_document();

    assert_eq!(
        sheet.attach(&id("dice"), &id("dice")),
        Err(LayoutError::self_attach(&id("dice")))
    );
    assert_eq!(
        sheet.detach(&id("ghost")),
        Err(LayoutError::unknown(&id("ghost")))
    );
    assert!(sheet.remove_widget(&id("ghost")).is_err());
    assert!(sheet.move_widget(&id("ghost"), 1.0, 1.0).is_err());
    let batch = vec![
        PositionUpdate { id: id("dice"), x: 500.0, y: 500.0 },
        PositionUpdate { id: id("ghost"), x: 0.0, y: 0.0 },
    ];
    assert!(sheet.apply_positions(&batch).is_err());
    assert!(sheet.add_widget(Widget::new("dice", 0.0, 0.0)).is_err());

    assert_eq!(sheet.to_document(), before);
    assert!(log.labels().is_empty());
}

#[test]
fn test_attach_touching_joins_neighbours() {
    let (mut sheet, log) = dashboard();
    sheet
        .add_widget(Widget::new("sticker", 320.0, 30.0).with_size(100.0, 50.0))
        .unwrap();

    let contacts = sheet.touching(&id("sticker"), &Unmeasured).unwrap();
    let found: Vec<(String, Side)> = contacts
        .iter()
        .map(|c| (c.id.to_string(), c.side))
        .collect();
    assert_eq!(
        found,
        vec![
            ("tracker".to_string(), Side::Left),
            ("counter".to_string(), Side::Right),
        ]
    );

    let outcomes = sheet.attach_touching(&id("sticker"), &Unmeasured).unwrap();
    assert_eq!(
        outcomes,
        vec![
            AttachOutcome::Joined(GroupId::new("g1")),
            AttachOutcome::Joined(GroupId::new("g1")),
        ]
    );
    assert_eq!(
        group_members(&sheet, "g1"),
        vec!["dice", "tracker", "timer", "counter", "sticker"]
    );
    assert_eq!(log.labels(), vec!["Add widget", "Attach widgets"]);
}

#[test]
fn test_move_and_remove_through_sheet() {
    let (mut sheet, _) = dashboard();

    let updates = sheet.move_widget(&id("tracker"), 220.0, 130.0).unwrap();
    assert_eq!(updates.len(), 3);
    assert_eq!(position(&sheet, "dice"), (140.0, 130.0));
    assert_eq!(position(&sheet, "timer"), (220.0, 210.0));

    let removed = sheet.remove_widget(&id("tracker")).unwrap();
    assert_eq!(removed.id, id("tracker"));
    assert!(group_members(&sheet, "g1").is_empty());
    assert_eq!(
        sheet.detach(&id("dice")).unwrap(),
        DetachOutcome::NotGrouped
    );
}

#[test]
fn test_sheet_file_roundtrip() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/dashboard.json");
    let sheet = Sheet::from_file(&path, config()).unwrap();

    let json = sheet.to_json().unwrap();
    assert!(json.contains("\"groupId\": \"g1\""));
    assert!(json.contains("\"attachedTo\""));
    assert!(!json.contains("group_id"));

    let reloaded = Sheet::from_json(&json, config()).unwrap();
    assert_eq!(reloaded.to_document(), sheet.to_document());
}

#[test]
fn test_missing_file_reports_io_error() {
    let result = Sheet::from_file(Path::new("tests/fixtures/nope.json"), config());
    assert!(matches!(result, Err(SheetError::Io(_))));
}

#[test]
fn test_duplicate_ids_in_file_rejected() {
    let json = r#"{"widgets": [{"id": "a", "x": 0, "y": 0}, {"id": "a", "x": 10, "y": 0}]}"#;
    let result = Sheet::from_json(json, config());
    assert!(matches!(
        result,
        Err(SheetError::Layout(LayoutError::DuplicateWidget { .. }))
    ));
}

#[test]
fn test_sheet_is_send() {
    fn assert_send<T: Send>() {}
    assert_send::<Sheet>();
}
