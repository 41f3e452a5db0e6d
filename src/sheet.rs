//! The mutation surface for one sheet of widgets
//!
//! UI gestures call into a [`Sheet`]: attach, detach, move, auto-stack.
//! Each logical operation that will change state first asks the
//! [`CheckpointSink`] for one undo snapshot, then mutates. Operations that
//! turn out to be no-ops (already attached, not grouped, empty sheet)
//! request no snapshot.
//!
//! All mutation takes `&mut self`, so an operation can never observe another
//! one half-way through. Hosts that share a sheet across threads wrap it in
//! a mutex.

use std::fmt;
use std::path::Path;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::SheetError;
use crate::layout::lint::{self, LintWarning};
use crate::layout::snap::{find_contacts, Contact};
use crate::layout::{
    plan_stack, widget_bounds, AttachOutcome, AttachmentGraph, DetachOutcome, GroupId,
    LayoutError, PositionUpdate, SizeOracle, StackConfig, StackPlan, Widget, WidgetId,
};

const CHECKPOINT_ADD: &str = "Add widget";
const CHECKPOINT_REMOVE: &str = "Remove widget";
const CHECKPOINT_MOVE: &str = "Move widget";
const CHECKPOINT_ATTACH: &str = "Attach widgets";
const CHECKPOINT_DETACH: &str = "Detach widget";
const CHECKPOINT_STACK: &str = "Auto-stack";
const CHECKPOINT_POSITIONS: &str = "Apply positions";

/// Receives a "take an undo snapshot now" request before each mutation
pub trait CheckpointSink: fmt::Debug + Send {
    fn checkpoint(&mut self, label: &str);
}

/// Discards checkpoint requests
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCheckpoints;

impl CheckpointSink for NoCheckpoints {
    fn checkpoint(&mut self, _label: &str) {}
}

/// Records checkpoint labels. Clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct CheckpointLog {
    labels: Arc<Mutex<Vec<String>>>,
}

impl CheckpointLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Labels requested so far, oldest first
    pub fn labels(&self) -> Vec<String> {
        self.labels
            .lock()
            .map(|labels| labels.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }
}

impl CheckpointSink for CheckpointLog {
    fn checkpoint(&mut self, label: &str) {
        let mut labels = self
            .labels
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        labels.push(label.to_string());
    }
}

/// Serialized form of a sheet
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SheetDocument {
    pub widgets: Vec<Widget>,
}

/// One sheet: its widgets, their attachments, and the layout settings
#[derive(Debug)]
pub struct Sheet {
    graph: AttachmentGraph,
    config: StackConfig,
    checkpoints: Box<dyn CheckpointSink>,
}

impl Default for Sheet {
    fn default() -> Self {
        Self::new(StackConfig::default())
    }
}

impl Sheet {
    /// Create an empty sheet
    pub fn new(config: StackConfig) -> Self {
        Self {
            graph: AttachmentGraph::new(),
            config,
            checkpoints: Box::new(NoCheckpoints),
        }
    }

    /// Create a sheet around an existing graph
    pub fn with_graph(graph: AttachmentGraph, config: StackConfig) -> Self {
        Self {
            graph,
            config,
            checkpoints: Box::new(NoCheckpoints),
        }
    }

    /// Route checkpoint requests to `sink`
    pub fn with_checkpoints(mut self, sink: impl CheckpointSink + 'static) -> Self {
        self.checkpoints = Box::new(sink);
        self
    }

    /// Build a sheet from a stored document; see [`AttachmentGraph::from_widgets`]
    pub fn from_document(document: SheetDocument, config: StackConfig) -> Result<Self, SheetError> {
        let graph = AttachmentGraph::from_widgets(document.widgets)?;
        Ok(Self::with_graph(graph, config))
    }

    /// Parse a sheet from JSON (`{"widgets": [...]}`)
    pub fn from_json(json: &str, config: StackConfig) -> Result<Self, SheetError> {
        let document: SheetDocument = serde_json::from_str(json)?;
        Self::from_document(document, config)
    }

    /// Load a sheet from a JSON file
    pub fn from_file(path: &Path, config: StackConfig) -> Result<Self, SheetError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content, config)
    }

    pub fn to_document(&self) -> SheetDocument {
        SheetDocument {
            widgets: self.graph.widgets().cloned().collect(),
        }
    }

    pub fn to_json(&self) -> Result<String, SheetError> {
        Ok(serde_json::to_string_pretty(&self.to_document())?)
    }

    pub fn config(&self) -> &StackConfig {
        &self.config
    }

    pub fn graph(&self) -> &AttachmentGraph {
        &self.graph
    }

    pub fn widgets(&self) -> impl Iterator<Item = &Widget> {
        self.graph.widgets()
    }

    pub fn get(&self, id: &WidgetId) -> Option<&Widget> {
        self.graph.get(id)
    }

    pub fn len(&self) -> usize {
        self.graph.len()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.is_empty()
    }

    pub fn add_widget(&mut self, widget: Widget) -> Result<(), LayoutError> {
        if self.graph.contains(&widget.id) {
            return Err(self.ignored("add", LayoutError::duplicate(&widget.id)));
        }
        self.checkpoints.checkpoint(CHECKPOINT_ADD);
        self.graph.insert(widget)
    }

    /// Remove a widget, splitting its former group as needed
    pub fn remove_widget(&mut self, id: &WidgetId) -> Result<Widget, LayoutError> {
        self.require(id, "remove")?;
        self.checkpoints.checkpoint(CHECKPOINT_REMOVE);
        self.graph.remove(id)
    }

    /// Move a widget; the rest of its group follows rigidly
    pub fn move_widget(
        &mut self,
        id: &WidgetId,
        x: f64,
        y: f64,
    ) -> Result<Vec<PositionUpdate>, LayoutError> {
        self.require(id, "move")?;
        self.checkpoints.checkpoint(CHECKPOINT_MOVE);
        self.graph.move_widget(id, x, y)
    }

    /// Attach `a` to `b`. Self-attach and unknown ids change nothing.
    pub fn attach(&mut self, a: &WidgetId, b: &WidgetId) -> Result<AttachOutcome, LayoutError> {
        if a == b {
            return Err(self.ignored("attach", LayoutError::self_attach(a)));
        }
        self.require(a, "attach")?;
        self.require(b, "attach")?;
        if self.graph.is_attached(a, b) {
            return Ok(AttachOutcome::AlreadyAttached);
        }
        self.checkpoints.checkpoint(CHECKPOINT_ATTACH);
        self.graph.attach(a, b)
    }

    /// Take a widget out of its group
    pub fn detach(&mut self, id: &WidgetId) -> Result<DetachOutcome, LayoutError> {
        let widget = self.require(id, "detach")?;
        if !widget.is_grouped() {
            return Ok(DetachOutcome::NotGrouped);
        }
        self.checkpoints.checkpoint(CHECKPOINT_DETACH);
        self.graph.detach(id)
    }

    pub fn widgets_in_group(&self, group: &GroupId) -> Vec<&Widget> {
        self.graph.widgets_in_group(group)
    }

    /// Widgets whose edges lie within the snap tolerance of `id`'s edges
    pub fn touching(
        &self,
        id: &WidgetId,
        oracle: &impl SizeOracle,
    ) -> Result<Vec<Contact>, LayoutError> {
        let target = self
            .graph
            .get(id)
            .ok_or_else(|| LayoutError::unknown(id))?;
        let target_bounds = widget_bounds(target, oracle, &self.config);
        let others = self
            .graph
            .widgets()
            .filter(|w| w.id != *id)
            .map(|w| (&w.id, widget_bounds(w, oracle, &self.config)));
        Ok(find_contacts(
            &target_bounds,
            others,
            self.config.snap_tolerance,
        ))
    }

    /// Attach `id` to everything it touches, as one undoable operation
    pub fn attach_touching(
        &mut self,
        id: &WidgetId,
        oracle: &impl SizeOracle,
    ) -> Result<Vec<AttachOutcome>, LayoutError> {
        let targets: Vec<WidgetId> = self
            .touching(id, oracle)?
            .into_iter()
            .map(|contact| contact.id)
            .filter(|other| !self.graph.is_attached(id, other))
            .collect();
        if targets.is_empty() {
            debug!(id = %id, "nothing new to attach");
            return Ok(Vec::new());
        }

        self.checkpoints.checkpoint(CHECKPOINT_ATTACH);
        let mut outcomes = Vec::with_capacity(targets.len());
        for other in &targets {
            outcomes.push(self.graph.attach(id, other)?);
        }
        Ok(outcomes)
    }

    /// Compute an auto-stack without applying it
    pub fn plan_stack(&self, oracle: &impl SizeOracle) -> StackPlan {
        plan_stack(self.graph.widgets(), oracle, &self.config)
    }

    /// Re-flow every widget and apply the result as one batch
    pub fn auto_stack(&mut self, oracle: &impl SizeOracle) -> Vec<PositionUpdate> {
        let plan = self.plan_stack(oracle);
        if plan.is_empty() {
            return Vec::new();
        }
        self.checkpoints.checkpoint(CHECKPOINT_STACK);
        if let Err(err) = self.graph.apply_positions(&plan.updates) {
            warn!(error = %err, "auto-stack batch rejected");
            return Vec::new();
        }
        debug!(updates = plan.updates.len(), "auto-stack applied");
        plan.updates
    }

    /// Apply an externally computed batch of positions atomically
    pub fn apply_positions(&mut self, updates: &[PositionUpdate]) -> Result<(), LayoutError> {
        if let Some(missing) = updates.iter().find(|u| !self.graph.contains(&u.id)) {
            return Err(self.ignored("apply positions", LayoutError::unknown(&missing.id)));
        }
        if updates.is_empty() {
            return Ok(());
        }
        self.checkpoints.checkpoint(CHECKPOINT_POSITIONS);
        self.graph.apply_positions(updates)
    }

    /// Check the sheet for invariant violations and overlaps
    pub fn lint(&self, oracle: &impl SizeOracle) -> Vec<LintWarning> {
        lint::check(&self.graph, oracle, &self.config)
    }

    fn require(&self, id: &WidgetId, operation: &str) -> Result<&Widget, LayoutError> {
        self.graph
            .get(id)
            .ok_or_else(|| self.ignored(operation, LayoutError::unknown(id)))
    }

    fn ignored(&self, operation: &str, err: LayoutError) -> LayoutError {
        debug!(operation, error = %err, "operation ignored");
        err
    }
}
