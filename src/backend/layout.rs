//! Layout backend.
//!
//! Owns the current layout and the active topology. The layout is
//! topology-relative, so replacing the topology always recomputes it;
//! no-op requests (same algorithm, same topology and scale) neither
//! recompute nor notify.

use super::{BackendConfig, ChangeSignal, ConfigError};
use crate::history::{Command, CommandHistory};
use crate::layout::{compute_layout, GursoyAtunParams, LayoutAlgorithm};
use crate::types::{DependencyGraph, Layout, Topology, TopologyKind};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::cell::{Ref, RefCell};
use std::rc::Rc;
use std::sync::Arc;

/// Startup configuration for the layout backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Plugged-in layout algorithm identifiers.
    pub algorithms: Vec<String>,
    /// Default (and initially selected) layout algorithm.
    pub default_algorithm: String,
    /// Plugged-in topology identifiers.
    pub topologies: Vec<String>,
    /// Default (and initially selected) topology.
    pub default_topology: String,
    /// Default topology scale.
    pub default_scale: f64,
    /// Self-organizing-map schedule parameters.
    #[serde(default)]
    pub params: GursoyAtunParams,
    /// Seed for the sampling generator; fixed so recomputes reproduce.
    #[serde(default = "default_seed")]
    pub seed: u64,
}

fn default_seed() -> u64 {
    0
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            algorithms: vec!["gursoy_atun".into()],
            default_algorithm: "gursoy_atun".into(),
            topologies: vec!["cube".into(), "sphere".into()],
            default_topology: "cube".into(),
            default_scale: 10.0,
            params: GursoyAtunParams::default(),
            seed: default_seed(),
        }
    }
}

pub(crate) struct LayoutState {
    graph: Arc<DependencyGraph>,
    pub(crate) layout: Layout,
    topology: Topology,
    algorithms: BackendConfig<LayoutAlgorithm>,
    topologies: BackendConfig<TopologyKind>,
    defaults: Defaults,
    params: GursoyAtunParams,
    rng: StdRng,
    layout_changed: ChangeSignal,
    topology_changed: ChangeSignal,
}

#[derive(Clone, Copy)]
struct Defaults {
    algorithm: LayoutAlgorithm,
    topology: Topology,
}

impl LayoutState {
    fn recompute(&mut self) {
        self.layout = compute_layout(
            &self.graph,
            &self.topology,
            *self.algorithms.selected(),
            &self.params,
            &mut self.rng,
        );
        tracing::debug!(
            algorithm = %self.algorithms.selected(),
            topology = %self.topology.kind(),
            scale = self.topology.scale(),
            vertices = self.layout.len(),
            "layout recomputed"
        );
    }

    fn set_topology(&mut self, topology: Topology) {
        self.topologies.select(topology.kind());
        self.topology = topology;
    }
}

/// Captured slice of layout state for undo.
struct Snapshot {
    algorithm: LayoutAlgorithm,
    topology: Topology,
    layout: Layout,
}

impl Snapshot {
    fn take(st: &LayoutState) -> Self {
        Self {
            algorithm: *st.algorithms.selected(),
            topology: st.topology,
            layout: st.layout.clone(),
        }
    }

    fn restore(&self, st: &mut LayoutState) -> bool {
        let topology_changed = st.topology != self.topology;
        st.algorithms.select(self.algorithm);
        st.set_topology(self.topology);
        st.layout = self.layout.clone();
        topology_changed
    }
}

enum LayoutMutation {
    SelectAlgorithm(LayoutAlgorithm),
    SetTopology(Topology),
    RestoreDefaults,
    Refresh,
}

/// One undoable layout-backend mutation.
///
/// Emits layout-changed on every effective run and topology-changed only
/// when the topology actually changed, in both directions of the history.
/// Redo restores the snapshot captured at first execution rather than
/// recomputing: the sampling generator has advanced since then, so a fresh
/// sweep would not reproduce the undone layout.
struct LayoutCommand {
    state: Rc<RefCell<LayoutState>>,
    mutation: LayoutMutation,
    previous: Option<Snapshot>,
    result: Option<Snapshot>,
}

impl LayoutCommand {
    fn emit(&self, topology_changed: bool) {
        let st = self.state.borrow();
        st.layout_changed.emit();
        if topology_changed {
            st.topology_changed.emit();
        }
    }
}

impl Command for LayoutCommand {
    fn execute(&mut self) {
        let topology_changed = {
            let mut st = self.state.borrow_mut();
            self.previous = Some(Snapshot::take(&st));
            let before = st.topology;
            match &self.mutation {
                LayoutMutation::SelectAlgorithm(id) => st.algorithms.select(*id),
                LayoutMutation::SetTopology(topology) => st.set_topology(*topology),
                LayoutMutation::RestoreDefaults => {
                    let defaults = st.defaults;
                    st.algorithms.select(defaults.algorithm);
                    st.set_topology(defaults.topology);
                }
                LayoutMutation::Refresh => {}
            }
            st.recompute();
            self.result = Some(Snapshot::take(&st));
            st.topology != before
        };
        self.emit(topology_changed);
    }

    fn undo(&mut self) {
        let topology_changed = {
            let mut st = self.state.borrow_mut();
            self.previous
                .as_ref()
                .expect("undo of a command that never executed")
                .restore(&mut st)
        };
        self.emit(topology_changed);
    }

    fn redo(&mut self) {
        let topology_changed = {
            let mut st = self.state.borrow_mut();
            self.result
                .as_ref()
                .expect("redo of a command that never executed")
                .restore(&mut st)
        };
        self.emit(topology_changed);
    }
}

/// Layout backend state machine.
pub struct LayoutBackend {
    state: Rc<RefCell<LayoutState>>,
    history: CommandHistory,
}

impl LayoutBackend {
    /// Build a backend over an externally owned graph.
    ///
    /// The initial layout is empty until the first effective mutation or
    /// [`refresh_layout`](Self::refresh_layout).
    pub fn new(graph: Arc<DependencyGraph>, config: &LayoutConfig) -> Result<Self, ConfigError> {
        let parse_algorithm = |s: &str| LayoutAlgorithm::parse(s);
        let algorithms = BackendConfig::new(
            config
                .algorithms
                .iter()
                .map(|s| {
                    parse_algorithm(s).ok_or_else(|| ConfigError::UnknownId(s.clone()))
                })
                .collect::<Result<Vec<_>, _>>()?,
            parse_algorithm(&config.default_algorithm)
                .ok_or_else(|| ConfigError::UnknownId(config.default_algorithm.clone()))?,
        )?;
        let topologies = BackendConfig::new(
            config
                .topologies
                .iter()
                .map(|s| {
                    TopologyKind::parse(s).ok_or_else(|| ConfigError::UnknownId(s.clone()))
                })
                .collect::<Result<Vec<_>, _>>()?,
            TopologyKind::parse(&config.default_topology)
                .ok_or_else(|| ConfigError::UnknownId(config.default_topology.clone()))?,
        )?;

        let topology = Topology::new(*topologies.selected(), config.default_scale);
        let defaults = Defaults {
            algorithm: *algorithms.selected(),
            topology,
        };

        tracing::info!(
            algorithm = %algorithms.selected(),
            topology = %topology.kind(),
            scale = topology.scale(),
            "layout backend constructed"
        );

        Ok(Self {
            state: Rc::new(RefCell::new(LayoutState {
                graph,
                layout: Layout::new(),
                topology,
                algorithms,
                topologies,
                defaults,
                params: config.params,
                rng: StdRng::seed_from_u64(config.seed),
                layout_changed: ChangeSignal::new(),
                topology_changed: ChangeSignal::new(),
            })),
            history: CommandHistory::new(),
        })
    }

    fn run(&mut self, mutation: LayoutMutation) {
        self.history.execute(Box::new(LayoutCommand {
            state: Rc::clone(&self.state),
            mutation,
            previous: None,
            result: None,
        }));
    }

    /// Select a layout algorithm and recompute. No-op when `id` is already
    /// selected.
    ///
    /// # Panics
    /// Panics when `id` is not plugged in.
    pub fn update_layout(&mut self, id: LayoutAlgorithm) {
        if *self.state.borrow().algorithms.selected() == id {
            return;
        }
        self.run(LayoutMutation::SelectAlgorithm(id));
    }

    /// Replace the topology and recompute the (topology-relative) layout.
    /// No-op when both kind and scale are unchanged.
    ///
    /// # Panics
    /// Panics when `kind` is not plugged in or `scale` is not positive.
    pub fn update_topology(&mut self, kind: TopologyKind, scale: f64) {
        let requested = Topology::new(kind, scale);
        if self.state.borrow().topology == requested {
            return;
        }
        self.run(LayoutMutation::SetTopology(requested));
    }

    /// Revert algorithm, topology, and scale to the construction-time
    /// defaults atomically. No-op when already at the defaults.
    pub fn restore_defaults(&mut self) {
        {
            let st = self.state.borrow();
            if *st.algorithms.selected() == st.defaults.algorithm
                && st.topology == st.defaults.topology
            {
                return;
            }
        }
        self.run(LayoutMutation::RestoreDefaults);
    }

    /// Recompute the layout with the current selection. Undoable; used for
    /// the initial pass and after graph swaps.
    pub fn refresh_layout(&mut self) {
        self.run(LayoutMutation::Refresh);
    }

    /// Read-only view of the current layout.
    pub fn layout(&self) -> Ref<'_, Layout> {
        Ref::map(self.state.borrow(), |st| &st.layout)
    }

    /// The active topology.
    pub fn topology(&self) -> Topology {
        self.state.borrow().topology
    }

    /// The currently selected layout algorithm.
    pub fn selected_algorithm(&self) -> LayoutAlgorithm {
        *self.state.borrow().algorithms.selected()
    }

    /// Live read-through position view for the renderer.
    pub fn position_map(&self) -> crate::maps::PositionMap {
        crate::maps::PositionMap::new(Rc::clone(&self.state))
    }

    /// Subscribe to layout-changed notifications.
    pub fn on_layout_changed(&self, observer: impl Fn() + 'static) {
        self.state.borrow_mut().layout_changed.connect(observer);
    }

    /// Subscribe to topology-changed notifications.
    pub fn on_topology_changed(&self, observer: impl Fn() + 'static) {
        self.state.borrow_mut().topology_changed.connect(observer);
    }

    /// Replace the externally owned graph and recompute. Not undoable; the
    /// history is cleared since older commands hold layouts over the old
    /// graph's handles.
    pub fn set_graph(&mut self, graph: Arc<DependencyGraph>) {
        {
            let mut st = self.state.borrow_mut();
            st.graph = graph;
            st.recompute();
        }
        self.history.clear();
        self.state.borrow().layout_changed.emit();
    }

    /// Undo the latest command. Returns `false` when the history is empty.
    pub fn undo(&mut self) -> bool {
        self.history.undo()
    }

    /// Redo the next command. Returns `false` at the end of the history.
    pub fn redo(&mut self) -> bool {
        self.history.redo()
    }
}

impl std::fmt::Debug for LayoutBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let st = self.state.borrow();
        f.debug_struct("LayoutBackend")
            .field("algorithm", st.algorithms.selected())
            .field("topology", &st.topology)
            .field("positions", &st.layout.len())
            .field("history", &self.history)
            .finish()
    }
}
