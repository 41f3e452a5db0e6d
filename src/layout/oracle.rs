//! Widget size resolution
//!
//! The engine never measures rendered content itself. Callers inject a
//! [`SizeOracle`]; anything it cannot answer falls back to the widget's
//! stored size, then its kind's default, then the generic default.

use std::collections::HashMap;

use indexmap::IndexMap;

use super::config::StackConfig;
use super::types::{BoundingBox, Size, Widget, WidgetId};

/// Supplies the current rendered size of a widget in canvas units
pub trait SizeOracle {
    fn size_of(&self, id: &WidgetId) -> Option<Size>;
}

/// An oracle with no measurements; every widget uses its fallbacks
#[derive(Debug, Clone, Copy, Default)]
pub struct Unmeasured;

impl SizeOracle for Unmeasured {
    fn size_of(&self, _id: &WidgetId) -> Option<Size> {
        None
    }
}

impl SizeOracle for HashMap<WidgetId, Size> {
    fn size_of(&self, id: &WidgetId) -> Option<Size> {
        self.get(id).copied()
    }
}

impl SizeOracle for IndexMap<WidgetId, Size> {
    fn size_of(&self, id: &WidgetId) -> Option<Size> {
        self.get(id).copied()
    }
}

impl<T: SizeOracle + ?Sized> SizeOracle for &T {
    fn size_of(&self, id: &WidgetId) -> Option<Size> {
        (**self).size_of(id)
    }
}

/// Effective size: measured, then stored, then kind default, then generic default.
///
/// Each axis falls back independently, so a widget with only a stored
/// width still takes its height from the defaults.
pub fn resolve_size(widget: &Widget, oracle: &impl SizeOracle, config: &StackConfig) -> Size {
    if let Some(measured) = oracle.size_of(&widget.id) {
        return measured;
    }
    let fallback = config.fallback_size(widget.kind.as_deref());
    Size::new(
        widget.w.unwrap_or(fallback.width),
        widget.h.unwrap_or(fallback.height),
    )
}

/// Current on-canvas rectangle of a widget
pub fn widget_bounds(widget: &Widget, oracle: &impl SizeOracle, config: &StackConfig) -> BoundingBox {
    BoundingBox::at(widget.position(), resolve_size(widget, oracle, config))
}
