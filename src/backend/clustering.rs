//! Clustering backend.
//!
//! Owns the current cluster assignment, validates clusterer and MST-finder
//! selection against the plugged-in registry, and mutates through undoable
//! commands. The graph itself is owned externally and swapped in wholesale
//! by the task layer.

use super::{BackendConfig, ChangeSignal, ConfigError};
use crate::clustering::{
    compute_clusters, Clusterer, ClusteringParams, MstAlgorithm,
};
use crate::history::{Command, CommandHistory};
use crate::types::{ClusterAssignment, DependencyGraph, WeightRepository};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::cell::{Ref, RefCell};
use std::rc::Rc;
use std::sync::Arc;

/// Startup configuration for the clustering backend.
///
/// Identifier strings come from external configuration; an unknown id or
/// default is a fatal configuration error surfaced at construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusteringConfig {
    /// Plugged-in clusterer identifiers.
    pub clusterers: Vec<String>,
    /// Default (and initially selected) clusterer.
    pub default_clusterer: String,
    /// Plugged-in MST-finder identifiers.
    pub mst_finders: Vec<String>,
    /// Default (and initially selected) MST finder.
    pub default_mst_finder: String,
    /// Algorithm tuning parameters.
    #[serde(default)]
    pub params: ClusteringParams,
    /// Seed for the tie-breaking generator; fixed so recomputes reproduce.
    #[serde(default = "default_seed")]
    pub seed: u64,
}

fn default_seed() -> u64 {
    0
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        Self {
            clusterers: vec![
                "k_spanning_tree".into(),
                "shared_nearest_neighbour".into(),
                "strong_components".into(),
                "highly_connected_components".into(),
                "maximal_clique".into(),
                "louvain".into(),
                "layered_label_propagation".into(),
            ],
            default_clusterer: "k_spanning_tree".into(),
            mst_finders: vec!["prim".into(), "kruskal".into()],
            default_mst_finder: "prim".into(),
            params: ClusteringParams::default(),
            seed: default_seed(),
        }
    }
}

fn parse_id<T>(name: &str, parse: impl Fn(&str) -> Option<T>) -> Result<T, ConfigError> {
    parse(name).ok_or_else(|| ConfigError::UnknownId(name.to_string()))
}

fn parse_ids<T>(
    names: &[String],
    parse: impl Fn(&str) -> Option<T> + Copy,
) -> Result<Vec<T>, ConfigError> {
    names.iter().map(|n| parse_id(n, parse)).collect()
}

pub(crate) struct ClusteringState {
    graph: Arc<DependencyGraph>,
    weights: Rc<RefCell<WeightRepository>>,
    pub(crate) clusters: ClusterAssignment,
    clusterers: BackendConfig<Clusterer>,
    mst_finders: BackendConfig<MstAlgorithm>,
    params: ClusteringParams,
    rng: StdRng,
    clusters_changed: ChangeSignal,
}

impl ClusteringState {
    fn recompute(&mut self) {
        let weights = self.weights.borrow();
        self.clusters = compute_clusters(
            &self.graph,
            &weights,
            *self.clusterers.selected(),
            *self.mst_finders.selected(),
            &self.params,
            &mut self.rng,
        );
        tracing::debug!(
            clusterer = %self.clusterers.selected(),
            mst_finder = %self.mst_finders.selected(),
            vertices = self.clusters.len(),
            clusters = self.clusters.cluster_count(),
            "clusters recomputed"
        );
    }
}

/// Recompute the assignment with the currently selected algorithms.
///
/// Redo restores the assignment captured at first execution rather than
/// recomputing: the backend's generator has advanced since then, so a fresh
/// run of a randomized clusterer would not reproduce the undone state.
struct UpdateClustersCommand {
    state: Rc<RefCell<ClusteringState>>,
    previous: Option<ClusterAssignment>,
    result: Option<ClusterAssignment>,
}

impl Command for UpdateClustersCommand {
    fn execute(&mut self) {
        {
            let mut st = self.state.borrow_mut();
            self.previous = Some(st.clusters.clone());
            st.recompute();
            self.result = Some(st.clusters.clone());
        }
        self.state.borrow().clusters_changed.emit();
    }

    fn undo(&mut self) {
        {
            let mut st = self.state.borrow_mut();
            st.clusters = self
                .previous
                .clone()
                .expect("undo of a command that never executed");
        }
        self.state.borrow().clusters_changed.emit();
    }

    fn redo(&mut self) {
        {
            let mut st = self.state.borrow_mut();
            st.clusters = self
                .result
                .clone()
                .expect("redo of a command that never executed");
        }
        self.state.borrow().clusters_changed.emit();
    }
}

/// Select a clusterer (or MST finder) and recompute.
///
/// Like [`UpdateClustersCommand`], redo re-applies the selection but restores
/// the captured assignment instead of recomputing.
struct SelectCommand {
    state: Rc<RefCell<ClusteringState>>,
    selection: Selection,
    previous_selection: Option<Selection>,
    previous_clusters: Option<ClusterAssignment>,
    result_clusters: Option<ClusterAssignment>,
}

#[derive(Clone, Copy)]
enum Selection {
    Clusterer(Clusterer),
    MstFinder(MstAlgorithm),
}

impl Command for SelectCommand {
    fn execute(&mut self) {
        {
            let mut st = self.state.borrow_mut();
            self.previous_clusters = Some(st.clusters.clone());
            match self.selection {
                Selection::Clusterer(id) => {
                    self.previous_selection =
                        Some(Selection::Clusterer(*st.clusterers.selected()));
                    st.clusterers.select(id);
                }
                Selection::MstFinder(id) => {
                    self.previous_selection =
                        Some(Selection::MstFinder(*st.mst_finders.selected()));
                    st.mst_finders.select(id);
                }
            }
            st.recompute();
            self.result_clusters = Some(st.clusters.clone());
        }
        self.state.borrow().clusters_changed.emit();
    }

    fn undo(&mut self) {
        {
            let mut st = self.state.borrow_mut();
            match self
                .previous_selection
                .expect("undo of a command that never executed")
            {
                Selection::Clusterer(id) => st.clusterers.select(id),
                Selection::MstFinder(id) => st.mst_finders.select(id),
            }
            st.clusters = self
                .previous_clusters
                .clone()
                .expect("undo of a command that never executed");
        }
        self.state.borrow().clusters_changed.emit();
    }

    fn redo(&mut self) {
        {
            let mut st = self.state.borrow_mut();
            match self.selection {
                Selection::Clusterer(id) => st.clusterers.select(id),
                Selection::MstFinder(id) => st.mst_finders.select(id),
            }
            st.clusters = self
                .result_clusters
                .clone()
                .expect("redo of a command that never executed");
        }
        self.state.borrow().clusters_changed.emit();
    }
}

/// Clustering backend state machine.
pub struct ClusteringBackend {
    state: Rc<RefCell<ClusteringState>>,
    history: CommandHistory,
}

impl ClusteringBackend {
    /// Build a backend over an externally owned graph and weight repository.
    ///
    /// The initial assignment is empty until the first
    /// [`update_clusters`](Self::update_clusters).
    pub fn new(
        graph: Arc<DependencyGraph>,
        weights: Rc<RefCell<WeightRepository>>,
        config: &ClusteringConfig,
    ) -> Result<Self, ConfigError> {
        let clusterers = BackendConfig::new(
            parse_ids(&config.clusterers, Clusterer::parse)?,
            parse_id(&config.default_clusterer, Clusterer::parse)?,
        )?;
        let mst_finders = BackendConfig::new(
            parse_ids(&config.mst_finders, MstAlgorithm::parse)?,
            parse_id(&config.default_mst_finder, MstAlgorithm::parse)?,
        )?;

        tracing::info!(
            clusterer = %clusterers.selected(),
            mst_finder = %mst_finders.selected(),
            vertices = graph.vertex_count(),
            "clustering backend constructed"
        );

        Ok(Self {
            state: Rc::new(RefCell::new(ClusteringState {
                graph,
                weights,
                clusters: ClusterAssignment::new(),
                clusterers,
                mst_finders,
                params: config.params.clone(),
                rng: StdRng::seed_from_u64(config.seed),
                clusters_changed: ChangeSignal::new(),
            })),
            history: CommandHistory::new(),
        })
    }

    /// Recompute the full assignment with the selected algorithms. Undoable;
    /// emits cluster-changed.
    pub fn update_clusters(&mut self) {
        self.history.execute(Box::new(UpdateClustersCommand {
            state: Rc::clone(&self.state),
            previous: None,
            result: None,
        }));
    }

    /// Select a clusterer and recompute. Selecting the already-selected id
    /// neither recomputes nor notifies.
    ///
    /// # Panics
    /// Panics when `id` is not plugged in.
    pub fn select_clusterer(&mut self, id: Clusterer) {
        if *self.state.borrow().clusterers.selected() == id {
            return;
        }
        self.history.execute(Box::new(SelectCommand {
            state: Rc::clone(&self.state),
            selection: Selection::Clusterer(id),
            previous_selection: None,
            previous_clusters: None,
            result_clusters: None,
        }));
    }

    /// Select an MST finder and recompute. Same no-op rule as
    /// [`select_clusterer`](Self::select_clusterer).
    ///
    /// # Panics
    /// Panics when `id` is not plugged in.
    pub fn select_mst_finder(&mut self, id: MstAlgorithm) {
        if *self.state.borrow().mst_finders.selected() == id {
            return;
        }
        self.history.execute(Box::new(SelectCommand {
            state: Rc::clone(&self.state),
            selection: Selection::MstFinder(id),
            previous_selection: None,
            previous_clusters: None,
            result_clusters: None,
        }));
    }

    /// Read-only view of the current assignment.
    pub fn clusters(&self) -> Ref<'_, ClusterAssignment> {
        Ref::map(self.state.borrow(), |st| &st.clusters)
    }

    /// The currently selected clusterer.
    pub fn selected_clusterer(&self) -> Clusterer {
        *self.state.borrow().clusterers.selected()
    }

    /// The currently selected MST finder.
    pub fn selected_mst_finder(&self) -> MstAlgorithm {
        *self.state.borrow().mst_finders.selected()
    }

    /// Live read-through cluster view for the renderer.
    pub fn cluster_map(&self) -> crate::maps::ClusterMap {
        crate::maps::ClusterMap::new(Rc::clone(&self.state))
    }

    /// Subscribe to cluster-changed notifications.
    pub fn on_clusters_changed(&self, observer: impl Fn() + 'static) {
        self.state.borrow_mut().clusters_changed.connect(observer);
    }

    /// Replace the externally owned graph and recompute.
    ///
    /// Issued by the task layer after a rebuild; not undoable, and the
    /// history is cleared since older commands hold assignments over the old
    /// graph's handles.
    pub fn set_graph(&mut self, graph: Arc<DependencyGraph>) {
        {
            let mut st = self.state.borrow_mut();
            st.graph = graph;
            st.recompute();
        }
        self.history.clear();
        self.state.borrow().clusters_changed.emit();
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

impl std::fmt::Debug for ClusteringBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let st = self.state.borrow();
        f.debug_struct("ClusteringBackend")
            .field("clusterer", st.clusterers.selected())
            .field("mst_finder", st.mst_finders.selected())
            .field("clusters", &st.clusters.cluster_count())
            .field("history", &self.history)
            .finish()
    }
}
