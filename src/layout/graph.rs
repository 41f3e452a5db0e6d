//! Attachment graph: direct adjacency between widgets plus group tags
//!
//! Widgets that snap together edge-to-edge form rigid groups. The graph
//! stores each widget's direct neighbours (`attached_to`, always symmetric)
//! and a `group_id` shared by every widget of one connected component.
//! Singletons carry no group id.
//!
//! ## Invariants
//!
//! - **Symmetry**: `b ∈ a.attached_to` iff `a ∈ b.attached_to`
//! - **Cohesion**: the widgets sharing a group id form exactly one connected
//!   component, and every group has at least two members
//!
//! `attach` only ever joins components, so it can retag incrementally.
//! `detach` can disconnect the remainder, so it re-derives components with
//! [`recompute_groups`].

use std::collections::HashSet;
use std::fmt;

use indexmap::IndexMap;
use tracing::debug;

use super::components::recompute_groups;
use super::error::LayoutError;
use super::types::{GroupId, PositionUpdate, Widget, WidgetId};

/// How many ids to draw from a [`GroupIdSource`] before suffixing one
const MINT_ATTEMPTS: usize = 64;

/// Produces candidate ids for newly formed groups.
///
/// Candidates already carried by a widget are skipped. After
/// 64 taken candidates in a row, the last one gets a numeric
/// suffix (`g1-2`, `g1-3`, ...) until it is free.
pub trait GroupIdSource: fmt::Debug + Send {
    fn next_group_id(&mut self) -> GroupId;
}

/// Mints `g1`, `g2`, `g3`, ...
#[derive(Debug, Clone, Default)]
pub struct SequentialGroupIds {
    issued: u64,
}

impl SequentialGroupIds {
    pub fn new() -> Self {
        Self::default()
    }
}

impl GroupIdSource for SequentialGroupIds {
    fn next_group_id(&mut self) -> GroupId {
        self.issued += 1;
        GroupId::new(format!("g{}", self.issued))
    }
}

/// What an [`AttachmentGraph::attach`] call changed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttachOutcome {
    /// The pair was already attached; nothing changed
    AlreadyAttached,
    /// Two ungrouped widgets formed a new group
    Formed(GroupId),
    /// An ungrouped widget joined an existing group
    Joined(GroupId),
    /// Two groups became one; every member of `absorbed` now carries `kept`
    Merged { kept: GroupId, absorbed: GroupId },
    /// Both widgets were already in the same group; only the edge was added
    Linked(GroupId),
}

/// What an [`AttachmentGraph::detach`] call changed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetachOutcome {
    /// The widget had no group; nothing changed
    NotGrouped,
    Detached {
        former: GroupId,
        /// Ids carried by the surviving multi-member components
        regrouped: Vec<GroupId>,
        /// Former members left on their own (not counting the detached widget)
        released: Vec<WidgetId>,
    },
}

/// Ordered widget store with attachment edges and group tags
#[derive(Debug)]
pub struct AttachmentGraph {
    widgets: IndexMap<WidgetId, Widget>,
    group_ids: Box<dyn GroupIdSource>,
}

impl Default for AttachmentGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl AttachmentGraph {
    /// Create an empty graph minting sequential group ids
    pub fn new() -> Self {
        Self::with_group_ids(SequentialGroupIds::new())
    }

    /// Create an empty graph with a custom group id source
    pub fn with_group_ids(source: impl GroupIdSource + 'static) -> Self {
        Self {
            widgets: IndexMap::new(),
            group_ids: Box::new(source),
        }
    }

    /// Build a graph from stored widgets, keeping their edges and groups.
    ///
    /// Stored data is repaired so both invariants hold afterwards: edges to
    /// missing widgets and self-edges are dropped, one-sided edges are
    /// mirrored, and groups are re-derived from the adjacency.
    pub fn from_widgets(widgets: impl IntoIterator<Item = Widget>) -> Result<Self, LayoutError> {
        let mut graph = Self::new();
        graph.load(widgets)?;
        Ok(graph)
    }

    /// Replace the contents with stored widgets (see [`Self::from_widgets`])
    pub fn load(&mut self, widgets: impl IntoIterator<Item = Widget>) -> Result<(), LayoutError> {
        let mut loaded = IndexMap::new();
        for widget in widgets {
            if loaded.contains_key(&widget.id) {
                return Err(LayoutError::duplicate(&widget.id));
            }
            loaded.insert(widget.id.clone(), widget);
        }
        self.widgets = loaded;
        self.repair();
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.widgets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }

    pub fn contains(&self, id: &WidgetId) -> bool {
        self.widgets.contains_key(id)
    }

    pub fn get(&self, id: &WidgetId) -> Option<&Widget> {
        self.widgets.get(id)
    }

    /// All widgets in insertion order
    pub fn widgets(&self) -> impl Iterator<Item = &Widget> {
        self.widgets.values()
    }

    /// Whether `a` and `b` share a direct edge
    pub fn is_attached(&self, a: &WidgetId, b: &WidgetId) -> bool {
        self.widgets
            .get(a)
            .is_some_and(|widget| widget.is_attached_to(b))
    }

    /// Add a new widget. It always starts ungrouped with no edges.
    pub fn insert(&mut self, mut widget: Widget) -> Result<(), LayoutError> {
        if self.widgets.contains_key(&widget.id) {
            return Err(LayoutError::duplicate(&widget.id));
        }
        widget.group_id = None;
        widget.attached_to.clear();
        self.widgets.insert(widget.id.clone(), widget);
        Ok(())
    }

    /// Detach and remove a widget, returning it ungrouped
    pub fn remove(&mut self, id: &WidgetId) -> Result<Widget, LayoutError> {
        self.detach(id)?;
        self.widgets
            .shift_remove(id)
            .ok_or_else(|| LayoutError::unknown(id))
    }

    /// Join two widgets with an edge, merging or forming groups as needed.
    ///
    /// No geometric check happens here; the caller decides that the widgets
    /// touch. Attaching two members of the same group through a new path
    /// just records the extra edge.
    pub fn attach(&mut self, a: &WidgetId, b: &WidgetId) -> Result<AttachOutcome, LayoutError> {
        if a == b {
            return Err(LayoutError::self_attach(a));
        }
        let group_a = self.require(a)?.group_id.clone();
        let group_b = self.require(b)?.group_id.clone();

        if self.is_attached(a, b) {
            debug!(a = %a, b = %b, "attach skipped: already attached");
            return Ok(AttachOutcome::AlreadyAttached);
        }

        let outcome = match (group_a, group_b) {
            (Some(ga), Some(gb)) if ga == gb => AttachOutcome::Linked(ga),
            (Some(kept), Some(absorbed)) => {
                for widget in self.widgets.values_mut() {
                    if widget.group_id.as_ref() == Some(&absorbed) {
                        widget.group_id = Some(kept.clone());
                    }
                }
                AttachOutcome::Merged { kept, absorbed }
            }
            (Some(group), None) => {
                self.set_group(b, Some(group.clone()));
                AttachOutcome::Joined(group)
            }
            (None, Some(group)) => {
                self.set_group(a, Some(group.clone()));
                AttachOutcome::Joined(group)
            }
            (None, None) => {
                let group = self.mint_group_id();
                self.set_group(a, Some(group.clone()));
                self.set_group(b, Some(group.clone()));
                AttachOutcome::Formed(group)
            }
        };

        if let Some(widget) = self.widgets.get_mut(a) {
            widget.attached_to.insert(b.clone());
        }
        if let Some(widget) = self.widgets.get_mut(b) {
            widget.attached_to.insert(a.clone());
        }

        debug!(a = %a, b = %b, outcome = ?outcome, "attached");
        Ok(outcome)
    }

    /// Take a widget out of its group and re-partition what is left.
    ///
    /// The first surviving multi-member component keeps the former group id;
    /// any further ones get fresh ids. Components of one widget are
    /// ungrouped.
    pub fn detach(&mut self, id: &WidgetId) -> Result<DetachOutcome, LayoutError> {
        let widget = self
            .widgets
            .get_mut(id)
            .ok_or_else(|| LayoutError::unknown(id))?;
        let Some(former) = widget.group_id.take() else {
            debug!(id = %id, "detach skipped: widget is not grouped");
            return Ok(DetachOutcome::NotGrouped);
        };
        let neighbors = std::mem::take(&mut widget.attached_to);
        for neighbor in &neighbors {
            if let Some(other) = self.widgets.get_mut(neighbor) {
                other.attached_to.remove(id);
            }
        }

        let remaining: Vec<WidgetId> = self
            .widgets
            .values()
            .filter(|w| w.group_id.as_ref() == Some(&former))
            .map(|w| w.id.clone())
            .collect();
        let components = recompute_groups(&remaining, |member| {
            self.widgets.get(member).map(|w| &w.attached_to)
        });

        let mut reusable = Some(former.clone());
        let mut regrouped = Vec::new();
        let mut released = Vec::new();
        for component in components {
            if component.len() < 2 {
                for member in &component {
                    self.set_group(member, None);
                }
                released.extend(component);
                continue;
            }
            let group = match reusable.take() {
                Some(group) => group,
                None => self.mint_group_id(),
            };
            for member in &component {
                self.set_group(member, Some(group.clone()));
            }
            regrouped.push(group);
        }

        debug!(
            id = %id,
            former = %former,
            regrouped = ?regrouped,
            released = released.len(),
            "detached"
        );
        Ok(DetachOutcome::Detached {
            former,
            regrouped,
            released,
        })
    }

    /// Every widget tagged with `group`, in insertion order
    pub fn widgets_in_group(&self, group: &GroupId) -> Vec<&Widget> {
        self.widgets
            .values()
            .filter(|w| w.group_id.as_ref() == Some(group))
            .collect()
    }

    /// Member ids of every group, keyed in order of first appearance
    pub fn groups(&self) -> IndexMap<GroupId, Vec<WidgetId>> {
        let mut groups: IndexMap<GroupId, Vec<WidgetId>> = IndexMap::new();
        for widget in self.widgets.values() {
            if let Some(group) = &widget.group_id {
                groups
                    .entry(group.clone())
                    .or_default()
                    .push(widget.id.clone());
            }
        }
        groups
    }

    /// Move a widget to `(x, y)`, translating the rest of its group rigidly
    pub fn move_widget(
        &mut self,
        id: &WidgetId,
        x: f64,
        y: f64,
    ) -> Result<Vec<PositionUpdate>, LayoutError> {
        let widget = self.require(id)?;
        let (dx, dy) = (x - widget.x, y - widget.y);
        let members: Vec<WidgetId> = match &widget.group_id {
            Some(group) => self
                .widgets_in_group(group)
                .into_iter()
                .map(|w| w.id.clone())
                .collect(),
            None => vec![id.clone()],
        };

        let mut updates = Vec::with_capacity(members.len());
        for member in members {
            if let Some(widget) = self.widgets.get_mut(&member) {
                widget.x += dx;
                widget.y += dy;
                updates.push(PositionUpdate {
                    id: member,
                    x: widget.x,
                    y: widget.y,
                });
            }
        }
        Ok(updates)
    }

    /// Apply a batch of positions. Either every update applies or none does.
    pub fn apply_positions(&mut self, updates: &[PositionUpdate]) -> Result<(), LayoutError> {
        if let Some(missing) = updates.iter().find(|u| !self.widgets.contains_key(&u.id)) {
            return Err(LayoutError::unknown(&missing.id));
        }
        for update in updates {
            if let Some(widget) = self.widgets.get_mut(&update.id) {
                widget.x = update.x;
                widget.y = update.y;
            }
        }
        Ok(())
    }

    fn require(&self, id: &WidgetId) -> Result<&Widget, LayoutError> {
        self.widgets.get(id).ok_or_else(|| LayoutError::unknown(id))
    }

    fn set_group(&mut self, id: &WidgetId, group: Option<GroupId>) {
        if let Some(widget) = self.widgets.get_mut(id) {
            widget.group_id = group;
        }
    }

    fn group_in_use(&self, group: &GroupId) -> bool {
        self.widgets
            .values()
            .any(|w| w.group_id.as_ref() == Some(group))
    }

    /// Next id from the source that no widget currently carries
    fn mint_group_id(&mut self) -> GroupId {
        let mut candidate = self.group_ids.next_group_id();
        for _ in 1..MINT_ATTEMPTS {
            if !self.group_in_use(&candidate) {
                return candidate;
            }
            candidate = self.group_ids.next_group_id();
        }

        let base = candidate.clone();
        let mut suffix = 1u64;
        while self.group_in_use(&candidate) {
            suffix += 1;
            candidate = GroupId::new(format!("{}-{}", base, suffix));
        }
        if candidate != base {
            debug!(base = %base, minted = %candidate, "group id source exhausted, suffixed");
        }
        candidate
    }

    fn repair(&mut self) {
        let known: HashSet<WidgetId> = self.widgets.keys().cloned().collect();
        for widget in self.widgets.values_mut() {
            let own = widget.id.clone();
            widget
                .attached_to
                .retain(|other| *other != own && known.contains(other));
        }

        let edges: Vec<(WidgetId, WidgetId)> = self
            .widgets
            .values()
            .flat_map(|w| w.attached_to.iter().map(|n| (w.id.clone(), n.clone())))
            .collect();
        for (a, b) in edges {
            if let Some(widget) = self.widgets.get_mut(&b) {
                widget.attached_to.insert(a);
            }
        }

        let all: Vec<WidgetId> = self.widgets.keys().cloned().collect();
        let components = recompute_groups(&all, |member| {
            self.widgets.get(member).map(|w| &w.attached_to)
        });

        // A component keeps a stored id when no earlier component claimed it
        let mut claimed: HashSet<GroupId> = HashSet::new();
        let mut unnamed = Vec::new();
        for component in components {
            if component.len() < 2 {
                for member in &component {
                    self.set_group(member, None);
                }
                continue;
            }
            let stored = component
                .iter()
                .filter_map(|member| self.widgets.get(member)?.group_id.clone())
                .find(|group| !claimed.contains(group));
            match stored {
                Some(group) => {
                    for member in &component {
                        self.set_group(member, Some(group.clone()));
                    }
                    claimed.insert(group);
                }
                None => unnamed.push(component),
            }
        }
        for component in unnamed {
            let group = self.mint_group_id();
            for member in &component {
                self.set_group(member, Some(group.clone()));
            }
        }
    }
}
