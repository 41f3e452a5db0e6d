//! Layout engine for widget sheets
//!
//! Two parts share the types in this module: the attachment graph that
//! keeps snapped widgets together as groups, and the auto-stack packer that
//! re-flows groups and loose widgets into a compact grid-aligned layout.

pub mod components;
pub mod config;
pub mod error;
pub mod graph;
pub mod lint;
pub mod oracle;
pub mod packer;
pub mod snap;
pub mod stack;
pub mod types;

pub use components::{recompute_groups, Component};
pub use config::StackConfig;
pub use error::LayoutError;
pub use graph::{AttachOutcome, AttachmentGraph, DetachOutcome, GroupIdSource, SequentialGroupIds};
pub use lint::{LintCategory, LintWarning};
pub use oracle::{resolve_size, widget_bounds, SizeOracle, Unmeasured};
pub use packer::FreeRectPacker;
pub use snap::{find_contacts, Contact, Side};
pub use stack::{auto_stack, plan_stack, PlacedItem, StackPlan};
pub use types::*;
