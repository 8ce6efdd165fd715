//! Keyed enter/update/exit binding of entries to persistent bars.
//!
//! The reconciler owns an explicit `label -> VisualElement` map. Every render
//! pass diffs the new label set against that map:
//!
//! - labels without an element **enter**: a new element is created at zero
//!   extent and grows into its slot,
//! - labels with an element **update**: the same element is re-targeted to its
//!   new rank and size,
//! - elements whose label disappeared **exit**: they fade out and are dropped
//!   once the fade has finished.
//!
//! Element identity ([`ElementId`]) never changes while a label stays present.

use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};

use crate::animation::{Appearance, BarGeometry, Tween};
use crate::layout::ChartLayout;
use crate::ordering::{BucketLabelError, OrderingPolicy};
use crate::state::{ChartKind, Entry, Snapshot, SnapshotError, DEFAULT_TRANSITION};

/// Stable identity of one on-screen bar
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub u64);

/// The persistent on-screen representation of one entry
#[derive(Clone, Debug)]
pub struct VisualElement {
    id: ElementId,
    entry: Entry,
    rank: usize,
    tween: Tween,
    exiting: bool,
}

impl VisualElement {
    pub fn id(&self) -> ElementId {
        self.id
    }

    pub fn label(&self) -> &str {
        &self.entry.label
    }

    /// The datum currently bound to this element
    pub fn entry(&self) -> &Entry {
        &self.entry
    }

    /// Position in the chart order of the last render pass
    pub fn rank(&self) -> usize {
        self.rank
    }

    pub fn is_exiting(&self) -> bool {
        self.exiting
    }

    /// Where the element is drawn at `now`
    pub fn appearance(&self, now: Instant) -> Appearance {
        self.tween.sample(now)
    }

    /// Where the element will settle
    pub fn target(&self) -> Appearance {
        self.tween.target()
    }

    pub fn is_settled(&self, now: Instant) -> bool {
        self.tween.is_finished(now)
    }
}

/// One binding decision made during a render pass
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum JoinEvent {
    Enter { id: ElementId, label: String },
    Update { id: ElementId, label: String },
    Exit { id: ElementId, label: String },
}

impl JoinEvent {
    pub fn id(&self) -> ElementId {
        match self {
            JoinEvent::Enter { id, .. }
            | JoinEvent::Update { id, .. }
            | JoinEvent::Exit { id, .. } => *id,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            JoinEvent::Enter { label, .. }
            | JoinEvent::Update { label, .. }
            | JoinEvent::Exit { label, .. } => label,
        }
    }
}

/// Outcome of one render pass
#[derive(Clone, Debug)]
pub struct ReconcileReport {
    /// Enter events in rank order, then exits, then updates in rank order
    pub events: Vec<JoinEvent>,
    /// Bucket labels that could not be ordered numerically
    pub malformed_labels: Vec<BucketLabelError>,
}

impl ReconcileReport {
    pub fn entered(&self) -> impl Iterator<Item = &JoinEvent> {
        self.events
            .iter()
            .filter(|e| matches!(e, JoinEvent::Enter { .. }))
    }

    pub fn updated(&self) -> impl Iterator<Item = &JoinEvent> {
        self.events
            .iter()
            .filter(|e| matches!(e, JoinEvent::Update { .. }))
    }

    pub fn exited(&self) -> impl Iterator<Item = &JoinEvent> {
        self.events
            .iter()
            .filter(|e| matches!(e, JoinEvent::Exit { .. }))
    }
}

/// Enter/update/exit engine for one chart
#[derive(Debug)]
pub struct Reconciler {
    kind: ChartKind,
    policy: OrderingPolicy,
    transition: Duration,
    next_id: u64,
    /// Live elements keyed by label
    elements: HashMap<String, VisualElement>,
    /// Live labels in chart order
    order: Vec<String>,
    /// Elements fading out, oldest first
    exiting: Vec<VisualElement>,
    layout: ChartLayout,
}

impl Reconciler {
    pub fn new(kind: ChartKind) -> Self {
        Self {
            kind,
            policy: OrderingPolicy::from(kind),
            transition: DEFAULT_TRANSITION,
            next_id: 0,
            elements: HashMap::new(),
            order: Vec::new(),
            exiting: Vec::new(),
            layout: ChartLayout::compute(kind, &[], 0.0),
        }
    }

    pub fn with_transition(mut self, transition: Duration) -> Self {
        self.transition = transition;
        self
    }

    pub fn kind(&self) -> ChartKind {
        self.kind
    }

    /// Layout computed by the most recent render pass
    pub fn layout(&self) -> &ChartLayout {
        &self.layout
    }

    /// Bind `snapshot` to the chart's elements.
    ///
    /// Scales are re-derived from the snapshot and `viewport_width`. An invalid
    /// snapshot is rejected before any element is touched.
    pub fn reconcile(
        &mut self,
        snapshot: &Snapshot,
        viewport_width: f32,
        now: Instant,
    ) -> Result<ReconcileReport, SnapshotError> {
        snapshot.validate()?;

        let mut sorted = snapshot.label_counts.clone();
        let malformed_labels = self.policy.sort(&mut sorted);
        self.layout = ChartLayout::compute(self.kind, &sorted, viewport_width);
        self.prune(now);

        let incoming: HashSet<&str> = sorted.iter().map(|e| e.label.as_str()).collect();
        let mut events = Vec::with_capacity(sorted.len() + self.elements.len());
        let mut entered: HashSet<ElementId> = HashSet::new();

        // Enter
        for (rank, entry) in sorted.iter().enumerate() {
            if self.elements.contains_key(&entry.label) {
                continue;
            }
            let id = self.allocate_id();
            let start = Appearance::opaque(self.layout.entering_geometry(rank, entry));
            let end = Appearance::opaque(self.layout.bar_geometry(rank, entry));
            self.elements.insert(
                entry.label.clone(),
                VisualElement {
                    id,
                    entry: entry.clone(),
                    rank,
                    tween: Tween::new(start, end, now, self.transition),
                    exiting: false,
                },
            );
            entered.insert(id);
            events.push(JoinEvent::Enter {
                id,
                label: entry.label.clone(),
            });
        }

        // Exit
        let departed: Vec<String> = self
            .order
            .iter()
            .filter(|label| !incoming.contains(label.as_str()))
            .cloned()
            .collect();
        for label in departed {
            if let Some(mut element) = self.elements.remove(&label) {
                let current = element.tween.sample(now);
                let faded = Appearance::new(current.geometry, 0.0);
                element.tween = Tween::new(current, faded, now, self.transition);
                element.exiting = true;
                events.push(JoinEvent::Exit {
                    id: element.id,
                    label: label.clone(),
                });
                self.exiting.push(element);
            }
        }

        // Update
        for (rank, entry) in sorted.iter().enumerate() {
            let target = Appearance::opaque(self.layout.bar_geometry(rank, entry));
            let Some(element) = self.elements.get_mut(&entry.label) else {
                continue;
            };
            if entered.contains(&element.id) {
                continue;
            }
            element.tween = element.tween.retarget(target, now, self.transition);
            element.entry = entry.clone();
            element.rank = rank;
            events.push(JoinEvent::Update {
                id: element.id,
                label: entry.label.clone(),
            });
        }

        // Re-sequence paint order to follow rank
        self.order = sorted.into_iter().map(|e| e.label).collect();

        Ok(ReconcileReport {
            events,
            malformed_labels,
        })
    }

    /// Drop exiting elements whose fade has completed; returns how many went away
    pub fn prune(&mut self, now: Instant) -> usize {
        let before = self.exiting.len();
        self.exiting.retain(|e| !e.tween.is_finished(now));
        before - self.exiting.len()
    }

    /// Live element bound to `label`
    pub fn element(&self, label: &str) -> Option<&VisualElement> {
        self.elements.get(label)
    }

    /// Labels of live elements, in chart order
    pub fn labels(&self) -> &[String] {
        &self.order
    }

    /// All elements on screen at `now`, in paint order: fading elements
    /// first, then live elements by rank. Exits that finished are skipped
    /// even before they are pruned.
    pub fn paint_order(&self, now: Instant) -> impl Iterator<Item = &VisualElement> {
        self.exiting
            .iter()
            .filter(move |e| !e.tween.is_finished(now))
            .chain(self.order.iter().filter_map(|l| self.elements.get(l)))
    }

    pub fn exiting_count(&self) -> usize {
        self.exiting.len()
    }

    /// True while any element is mid-transition
    pub fn is_animating(&self, now: Instant) -> bool {
        self.paint_order(now).any(|e| !e.is_settled(now))
    }

    /// Topmost live element under a point given in bar-group coordinates
    pub fn hit_test(&self, x: f32, y: f32, now: Instant) -> Option<&VisualElement> {
        self.order
            .iter()
            .rev()
            .filter_map(|l| self.elements.get(l))
            .find(|e| e.appearance(now).geometry.contains(x, y))
    }

    /// Settled geometry of every live element, in chart order
    pub fn target_geometry(&self) -> Vec<(String, BarGeometry)> {
        self.order
            .iter()
            .filter_map(|l| self.elements.get(l))
            .map(|e| (e.label().to_string(), e.target().geometry))
            .collect()
    }

    fn allocate_id(&mut self) -> ElementId {
        let id = ElementId(self.next_id);
        self.next_id += 1;
        id
    }
}
