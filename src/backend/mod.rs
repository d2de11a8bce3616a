//! Observable, undo/redo-capable backend state machines.
//!
//! Backends own the current clustering/layout state, validate algorithm
//! selection against a plugged-in registry, mutate exclusively through
//! commands recorded in a [`CommandHistory`](crate::history::CommandHistory),
//! and notify observers exactly once per effective change. All backend
//! mutation happens on one logical thread; the types are deliberately not
//! `Send`.

pub mod clustering;
pub mod layout;
pub mod weights;

pub use clustering::{ClusteringBackend, ClusteringConfig};
pub use layout::{LayoutBackend, LayoutConfig};
pub use weights::WeightBackend;

use std::collections::BTreeSet;
use std::fmt::Debug;

/// Configuration-load error.
///
/// Raised while wiring plugged-in algorithm sets at startup; an unknown
/// selected default is fatal for the application, but it is reported as a
/// value so startup code can log it before aborting.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// An identifier string did not parse to any known plugin id.
    #[error("unknown plugin identifier: {0:?}")]
    UnknownId(String),
    /// The plugged-in set was empty.
    #[error("plugged-in set must not be empty")]
    EmptyPluginSet,
    /// The configured default is not a member of the plugged-in set.
    #[error("default {0:?} is not in the plugged-in set")]
    DefaultNotPluggedIn(String),
}

/// Plugged-in plugin set with a selected and a default member.
///
/// Membership is validated at construction (recoverable, so startup can
/// report the broken configuration) and on every selection (fatal; a live
/// backend being handed an unknown id is a programming error).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig<T: Ord + Clone + Debug> {
    plugged_in: BTreeSet<T>,
    selected: T,
    default: T,
}

impl<T: Ord + Clone + Debug + ToString> BackendConfig<T> {
    /// Build a config with `default` initially selected.
    pub fn new(plugged_in: impl IntoIterator<Item = T>, default: T) -> Result<Self, ConfigError> {
        let plugged_in: BTreeSet<T> = plugged_in.into_iter().collect();
        if plugged_in.is_empty() {
            return Err(ConfigError::EmptyPluginSet);
        }
        if !plugged_in.contains(&default) {
            return Err(ConfigError::DefaultNotPluggedIn(default.to_string()));
        }
        Ok(Self {
            selected: default.clone(),
            default,
            plugged_in,
        })
    }

    /// The currently selected id.
    pub fn selected(&self) -> &T {
        &self.selected
    }

    /// The construction-time default id.
    pub fn default_id(&self) -> &T {
        &self.default
    }

    /// The plugged-in set.
    pub fn plugged_in(&self) -> &BTreeSet<T> {
        &self.plugged_in
    }

    /// Select an id.
    ///
    /// # Panics
    /// Panics when `id` is not plugged in. Unknown ids reaching a live
    /// backend are fatal, never silently ignored.
    pub fn select(&mut self, id: T) {
        assert!(
            self.plugged_in.contains(&id),
            "id {id:?} is not in the plugged-in set {:?}",
            self.plugged_in
        );
        self.selected = id;
    }
}

/// Explicit observer list for change notification.
///
/// Replaces signal/slot wiring: observers are plain closures invoked in
/// subscription order. Emission happens only on effective changes; the
/// backends are responsible for suppressing no-ops.
#[derive(Default)]
pub struct ChangeSignal {
    observers: Vec<Box<dyn Fn()>>,
}

impl ChangeSignal {
    /// Create a signal with no observers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an observer.
    pub fn connect(&mut self, observer: impl Fn() + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Notify every observer once.
    pub fn emit(&self) {
        for observer in &self.observers {
            observer();
        }
    }
}

impl std::fmt::Debug for ChangeSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeSignal")
            .field("observers", &self.observers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clustering::MstAlgorithm;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_config_validates_default_membership() {
        let ok = BackendConfig::new([MstAlgorithm::Prim, MstAlgorithm::Kruskal], MstAlgorithm::Prim);
        assert!(ok.is_ok());

        let err = BackendConfig::new([MstAlgorithm::Prim], MstAlgorithm::Kruskal);
        assert_eq!(
            err.unwrap_err(),
            ConfigError::DefaultNotPluggedIn("kruskal".into())
        );

        let empty: Result<BackendConfig<MstAlgorithm>, _> =
            BackendConfig::new([], MstAlgorithm::Prim);
        assert_eq!(empty.unwrap_err(), ConfigError::EmptyPluginSet);
    }

    #[test]
    fn test_select_known_id() {
        let mut config =
            BackendConfig::new([MstAlgorithm::Prim, MstAlgorithm::Kruskal], MstAlgorithm::Prim)
                .unwrap();
        config.select(MstAlgorithm::Kruskal);
        assert_eq!(*config.selected(), MstAlgorithm::Kruskal);
        assert_eq!(*config.default_id(), MstAlgorithm::Prim);
    }

    #[test]
    #[should_panic(expected = "not in the plugged-in set")]
    fn test_select_unknown_id_is_fatal() {
        let mut config = BackendConfig::new([MstAlgorithm::Prim], MstAlgorithm::Prim).unwrap();
        config.select(MstAlgorithm::Kruskal);
    }

    #[test]
    fn test_signal_notifies_every_observer() {
        let mut signal = ChangeSignal::new();
        let count = Rc::new(Cell::new(0u32));
        for _ in 0..3 {
            let count = Rc::clone(&count);
            signal.connect(move || count.set(count.get() + 1));
        }
        signal.emit();
        assert_eq!(count.get(), 3);
    }
}
