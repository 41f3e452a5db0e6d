//! Auto-stack: re-flow every widget into a compact, grid-aligned arrangement
//!
//! ## Pipeline
//!
//! 1. **Resolve sizes** through the size oracle, rounded up to the grid
//! 2. **Build stackable items**: one per group (bounding box of its members)
//!    and one per ungrouped widget
//! 3. **Pick a container width** roughly square for the total padded area
//! 4. **Sort items** into reading order: row bands top to bottom, then left
//!    to right
//! 5. **Pack** each padded item with the MaxRects packer
//! 6. **Replay offsets**: every member moves by its item's displacement, so
//!    groups stay rigid
//!
//! Packing only repositions; it never resizes a widget.

use std::cmp::Ordering;

use indexmap::IndexMap;
use tracing::{debug, debug_span};

use super::config::StackConfig;
use super::oracle::{resolve_size, SizeOracle};
use super::packer::FreeRectPacker;
use super::types::{
    round_up_to_grid, snap_to_grid, BoundingBox, GroupId, Point, PositionUpdate, Widget, WidgetId,
};

/// The unit the packer places: a whole group or a single ungrouped widget
#[derive(Debug, Clone)]
struct StackItem {
    group: Option<GroupId>,
    /// Indices into the input widget list
    members: Vec<usize>,
    /// Union of the members' grid-rounded rectangles at their current positions
    bounds: BoundingBox,
}

/// Where an item ended up
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedItem {
    pub group: Option<GroupId>,
    pub members: Vec<WidgetId>,
    /// Item bounds before packing
    pub original: BoundingBox,
    /// Item bounds after packing
    pub placed: BoundingBox,
    /// `placed` plus the gap reserved to its right and below
    pub padded: BoundingBox,
}

/// Full result of an auto-stack run
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StackPlan {
    /// New position of every widget, in input order
    pub updates: Vec<PositionUpdate>,
    /// Items in packing order
    pub items: Vec<PlacedItem>,
    pub container_width: f64,
}

impl StackPlan {
    pub fn is_empty(&self) -> bool {
        self.updates.is_empty()
    }
}

/// Compute new positions for every widget; see [`plan_stack`]
pub fn auto_stack<'a, I>(
    widgets: I,
    oracle: &impl SizeOracle,
    config: &StackConfig,
) -> Vec<PositionUpdate>
where
    I: IntoIterator<Item = &'a Widget>,
{
    plan_stack(widgets, oracle, config).updates
}

/// Pack all widgets of a sheet, keeping groups rigid.
///
/// Returns a complete batch of positions for the caller to apply at once.
/// An empty input yields an empty plan.
pub fn plan_stack<'a, I>(widgets: I, oracle: &impl SizeOracle, config: &StackConfig) -> StackPlan
where
    I: IntoIterator<Item = &'a Widget>,
{
    let widgets: Vec<&Widget> = widgets.into_iter().collect();
    if widgets.is_empty() {
        return StackPlan::default();
    }
    let _span = debug_span!("auto_stack", widgets = widgets.len()).entered();

    let grid = config.grid_size;
    let rects: Vec<BoundingBox> = widgets
        .iter()
        .map(|widget| {
            let size = resolve_size(widget, oracle, config);
            BoundingBox::new(
                widget.x,
                widget.y,
                round_up_to_grid(size.width.max(grid), grid),
                round_up_to_grid(size.height.max(grid), grid),
            )
        })
        .collect();

    let mut items = build_items(&widgets, &rects);
    let container_width = container_width(&items, config);
    sort_reading_order(&mut items, config.row_height);

    let mut packer = FreeRectPacker::new(container_width, grid);
    let mut positions: Vec<Option<Point>> = vec![None; widgets.len()];
    let mut placed_items = Vec::with_capacity(items.len());

    for item in &items {
        // group bounds are off-grid when their members are; rounding keeps free space on the grid
        let padded_w = round_up_to_grid(item.bounds.width + config.gap, grid);
        let padded_h = round_up_to_grid(item.bounds.height + config.gap, grid);
        let spot = packer.place(padded_w, padded_h);

        let dx = spot.x - item.bounds.x;
        let dy = spot.y - item.bounds.y;
        for &index in &item.members {
            let widget = widgets[index];
            positions[index] = Some(Point::new(
                snap_to_grid(widget.x + dx, grid),
                snap_to_grid(widget.y + dy, grid),
            ));
        }

        placed_items.push(PlacedItem {
            group: item.group.clone(),
            members: item
                .members
                .iter()
                .map(|&index| widgets[index].id.clone())
                .collect(),
            original: item.bounds,
            placed: item.bounds.moved_to(spot),
            padded: BoundingBox::new(spot.x, spot.y, padded_w, padded_h),
        });
    }

    let updates: Vec<PositionUpdate> = widgets
        .iter()
        .zip(positions)
        .filter_map(|(widget, position)| {
            position.map(|p| PositionUpdate {
                id: widget.id.clone(),
                x: p.x,
                y: p.y,
            })
        })
        .collect();

    debug!(
        items = placed_items.len(),
        container_width,
        free_rects = packer.free_rects().len(),
        "auto-stack planned"
    );

    StackPlan {
        updates,
        items: placed_items,
        container_width,
    }
}

/// Group widgets into stackable items, in order of first appearance
fn build_items(widgets: &[&Widget], rects: &[BoundingBox]) -> Vec<StackItem> {
    let mut items: Vec<StackItem> = Vec::new();
    let mut by_group: IndexMap<&GroupId, usize> = IndexMap::new();

    for (index, widget) in widgets.iter().enumerate() {
        let rect = rects[index];
        match &widget.group_id {
            Some(group) => match by_group.get(group) {
                Some(&slot) => {
                    let item = &mut items[slot];
                    item.members.push(index);
                    item.bounds = item.bounds.union(&rect);
                }
                None => {
                    by_group.insert(group, items.len());
                    items.push(StackItem {
                        group: Some(group.clone()),
                        members: vec![index],
                        bounds: rect,
                    });
                }
            },
            None => items.push(StackItem {
                group: None,
                members: vec![index],
                bounds: rect,
            }),
        }
    }
    items
}

/// `max(min width, sqrt(factor * total padded area))`, grid-rounded.
///
/// Items wider than this go through the packer's fallback below everything.
fn container_width(items: &[StackItem], config: &StackConfig) -> f64 {
    let gap = config.gap;
    let area: f64 = items
        .iter()
        .map(|item| (item.bounds.width + gap) * (item.bounds.height + gap))
        .sum();
    let square = round_up_to_grid((config.area_factor * area).sqrt(), config.grid_size);

    config.min_container_width.max(square)
}

/// Row bands of `row_height` top to bottom, then left to right.
///
/// The sort is stable, so items tied on both keys keep input order.
fn sort_reading_order(items: &mut [StackItem], row_height: f64) {
    items.sort_by(|a, b| {
        let row_a = (a.bounds.y / row_height).floor();
        let row_b = (b.bounds.y / row_height).floor();
        match row_a.total_cmp(&row_b) {
            Ordering::Equal => a.bounds.x.total_cmp(&b.bounds.x),
            other => other,
        }
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::layout::oracle::Unmeasured;
    use crate::layout::types::Size;

    fn grouped(widget: Widget, group: &str) -> Widget {
        let mut widget = widget;
        widget.group_id = Some(GroupId::new(group));
        widget
    }

    fn position_of(updates: &[PositionUpdate], id: &str) -> (f64, f64) {
        let update = updates
            .iter()
            .find(|u| u.id.as_str() == id)
            .unwrap_or_else(|| panic!("no update for {}", id));
        (update.x, update.y)
    }

    #[test]
    fn test_empty_input() {
        let widgets: Vec<Widget> = Vec::new();
        let plan = plan_stack(&widgets, &Unmeasured, &StackConfig::default());
        assert!(plan.is_empty());
        assert!(plan.items.is_empty());
    }

    #[test]
    fn test_three_widget_scenario() {
        let widgets = vec![
            Widget::new("a", 0.0, 0.0).with_size(200.0, 120.0),
            Widget::new("b", 400.0, 0.0).with_size(200.0, 120.0),
            Widget::new("c", 0.0, 300.0).with_size(200.0, 120.0),
        ];
        let plan = plan_stack(&widgets, &Unmeasured, &StackConfig::default());

        assert_eq!(plan.container_width, 800.0);
        assert_eq!(position_of(&plan.updates, "a"), (0.0, 0.0));
        assert_eq!(position_of(&plan.updates, "b"), (210.0, 0.0));
        // the first row still has room, so c joins it
        assert_eq!(position_of(&plan.updates, "c"), (420.0, 0.0));
    }

    #[test]
    fn test_reading_order_uses_row_bands() {
        // b sits slightly higher than a but in the same 50-unit band
        let widgets = vec![
            Widget::new("a", 300.0, 40.0).with_size(100.0, 100.0),
            Widget::new("b", 0.0, 10.0).with_size(100.0, 100.0),
            Widget::new("c", 0.0, 60.0).with_size(100.0, 100.0),
        ];
        let plan = plan_stack(&widgets, &Unmeasured, &StackConfig::default());
        let order: Vec<&str> = plan
            .items
            .iter()
            .map(|item| item.members[0].as_str())
            .collect();
        assert_eq!(order, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_group_moves_rigidly() {
        let widgets = vec![
            grouped(Widget::new("left", 500.0, 500.0).with_size(100.0, 100.0), "g1"),
            grouped(Widget::new("right", 600.0, 500.0).with_size(100.0, 100.0), "g1"),
            grouped(Widget::new("under", 500.0, 600.0).with_size(200.0, 50.0), "g1"),
        ];
        let plan = plan_stack(&widgets, &Unmeasured, &StackConfig::default());

        assert_eq!(plan.items.len(), 1);
        assert_eq!(position_of(&plan.updates, "left"), (0.0, 0.0));
        assert_eq!(position_of(&plan.updates, "right"), (100.0, 0.0));
        assert_eq!(position_of(&plan.updates, "under"), (0.0, 100.0));
        assert_eq!(plan.items[0].original, BoundingBox::new(500.0, 500.0, 200.0, 150.0));
    }

    #[test]
    fn test_sizes_round_up_to_grid() {
        let widgets = vec![
            Widget::new("a", 0.0, 0.0).with_size(195.0, 111.0),
            Widget::new("b", 300.0, 0.0).with_size(50.0, 50.0),
        ];
        let plan = plan_stack(&widgets, &Unmeasured, &StackConfig::default());
        assert_eq!(plan.items[0].placed, BoundingBox::new(0.0, 0.0, 200.0, 120.0));
        assert_eq!(position_of(&plan.updates, "b"), (210.0, 0.0));
    }

    #[test]
    fn test_oracle_sizes_used() {
        let mut sizes = HashMap::new();
        sizes.insert(WidgetId::new("a"), Size::new(400.0, 40.0));
        let widgets = vec![Widget::new("a", 0.0, 0.0), Widget::new("b", 10.0, 0.0)];

        let plan = plan_stack(&widgets, &sizes, &StackConfig::default());
        assert_eq!(position_of(&plan.updates, "b"), (410.0, 0.0));
    }

    #[test]
    fn test_zero_size_is_clamped() {
        let widgets = vec![Widget::new("a", 0.0, 0.0).with_size(0.0, -5.0)];
        let plan = plan_stack(&widgets, &Unmeasured, &StackConfig::default());
        assert_eq!(plan.items[0].placed, BoundingBox::new(0.0, 0.0, 10.0, 10.0));
    }

    #[test]
    fn test_wide_item_keeps_container_width() {
        let widgets = vec![Widget::new("banner", 0.0, 0.0).with_size(1200.0, 50.0)];
        let plan = plan_stack(&widgets, &Unmeasured, &StackConfig::default());
        assert_eq!(plan.container_width, 800.0);
        assert_eq!(position_of(&plan.updates, "banner"), (0.0, 0.0));
    }

    #[test]
    fn test_wide_item_falls_below_packed_rows() {
        let mut widgets: Vec<Widget> = (0..5)
            .map(|i| Widget::new(format!("s{}", i), i as f64 * 250.0, 0.0))
            .collect();
        widgets.push(Widget::new("banner", 0.0, 200.0).with_size(1200.0, 50.0));

        let plan = plan_stack(&widgets, &Unmeasured, &StackConfig::default());

        assert_eq!(plan.container_width, 800.0);
        assert_eq!(position_of(&plan.updates, "s2"), (420.0, 0.0));
        assert_eq!(position_of(&plan.updates, "s3"), (0.0, 130.0));
        assert_eq!(position_of(&plan.updates, "s4"), (210.0, 130.0));
        assert_eq!(position_of(&plan.updates, "banner"), (0.0, 260.0));
        assert_eq!(plan.items[5].padded, BoundingBox::new(0.0, 260.0, 1210.0, 60.0));
    }

    #[test]
    fn test_container_grows_with_area() {
        let widgets: Vec<Widget> = (0..40)
            .map(|i| Widget::new(format!("w{}", i), 0.0, i as f64 * 200.0))
            .collect();
        let plan = plan_stack(&widgets, &Unmeasured, &StackConfig::default());
        // sqrt(1.5 * 40 * 210 * 130) = 1279.8...
        assert_eq!(plan.container_width, 1280.0);
    }

    #[test]
    fn test_deterministic() {
        let widgets = vec![
            Widget::new("a", 37.0, 12.0).with_size(130.0, 70.0),
            grouped(Widget::new("b", 400.0, 80.0).with_size(60.0, 60.0), "g"),
            grouped(Widget::new("c", 460.0, 80.0).with_size(60.0, 90.0), "g"),
            Widget::new("d", 5.0, 300.0),
        ];
        let config = StackConfig::default();
        assert_eq!(
            plan_stack(&widgets, &Unmeasured, &config),
            plan_stack(&widgets, &Unmeasured, &config)
        );
    }
}
