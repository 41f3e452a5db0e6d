//! Sheet Layout - widget attachment and auto-stacking for a free-form canvas
//!
//! Widgets dropped on a sheet can be snapped together into rigid groups.
//! The auto-stack packer re-flows every group and loose widget into a
//! compact, grid-aligned arrangement while keeping groups intact.
//!
//! # Example
//!
//! ```rust
//! use sheet_layout::{Sheet, StackConfig, Unmeasured, Widget, WidgetId};
//!
//! let mut sheet = Sheet::new(StackConfig::default());
//! sheet.add_widget(Widget::new("chart", 0.0, 0.0)).unwrap();
//! sheet.add_widget(Widget::new("table", 200.0, 0.0)).unwrap();
//! sheet.add_widget(Widget::new("note", 900.0, 700.0)).unwrap();
//! sheet
//!     .attach(&WidgetId::new("chart"), &WidgetId::new("table"))
//!     .unwrap();
//!
//! let updates = sheet.auto_stack(&Unmeasured);
//! assert_eq!(updates.len(), 3);
//!
//! let note = sheet.get(&WidgetId::new("note")).unwrap();
//! assert_eq!((note.x, note.y), (410.0, 0.0));
//! ```

pub mod error;
pub mod layout;
pub mod sheet;

pub use error::SheetError;
pub use layout::{
    AttachOutcome, AttachmentGraph, DetachOutcome, GroupId, LayoutError, LintWarning,
    PositionUpdate, SizeOracle, StackConfig, StackPlan, Unmeasured, Widget, WidgetId,
};
pub use sheet::{CheckpointLog, CheckpointSink, NoCheckpoints, Sheet, SheetDocument};
