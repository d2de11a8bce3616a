//! Dependency-weight backend.
//!
//! Thin undoable wrapper over the shared [`WeightRepository`]: weight edits
//! go through commands on the same history engine as the clustering and
//! layout backends, and observers hear about every effective change.

use super::ChangeSignal;
use crate::history::{Command, CommandHistory};
use crate::types::WeightRepository;
use std::cell::{Ref, RefCell};
use std::rc::Rc;

struct WeightState {
    repository: Rc<RefCell<WeightRepository>>,
    weights_changed: ChangeSignal,
}

/// Set (or override) the weight of one dependency type.
struct SetWeightCommand {
    state: Rc<RefCell<WeightState>>,
    dependency_type: String,
    weight: i64,
    /// Explicit previous weight, `None` when the type resolved through the
    /// default before this command.
    previous: Option<i64>,
}

impl Command for SetWeightCommand {
    fn execute(&mut self) {
        {
            let st = self.state.borrow();
            self.previous = st
                .repository
                .borrow_mut()
                .set_weight(self.dependency_type.clone(), self.weight);
        }
        self.state.borrow().weights_changed.emit();
    }

    fn undo(&mut self) {
        {
            let st = self.state.borrow();
            let mut repo = st.repository.borrow_mut();
            match self.previous {
                Some(w) => {
                    repo.set_weight(self.dependency_type.clone(), w);
                }
                None => {
                    repo.clear_weight(&self.dependency_type);
                }
            }
        }
        self.state.borrow().weights_changed.emit();
    }
}

/// Dependency-weight backend state machine.
pub struct WeightBackend {
    state: Rc<RefCell<WeightState>>,
    history: CommandHistory,
}

impl WeightBackend {
    /// Wrap a shared weight repository.
    pub fn new(repository: Rc<RefCell<WeightRepository>>) -> Self {
        Self {
            state: Rc::new(RefCell::new(WeightState {
                repository,
                weights_changed: ChangeSignal::new(),
            })),
            history: CommandHistory::new(),
        }
    }

    /// Set the weight of a dependency type. Undoable; setting the weight a
    /// type already resolves to is a no-op and does not notify.
    pub fn set_weight(&mut self, dependency_type: impl Into<String>, weight: i64) {
        let dependency_type = dependency_type.into();
        if self
            .state
            .borrow()
            .repository
            .borrow()
            .resolve(&dependency_type)
            == weight
        {
            return;
        }
        self.history.execute(Box::new(SetWeightCommand {
            state: Rc::clone(&self.state),
            dependency_type,
            weight,
            previous: None,
        }));
    }

    /// Resolve the current weight of a dependency type.
    pub fn weight_of(&self, dependency_type: &str) -> i64 {
        self.state
            .borrow()
            .repository
            .borrow()
            .resolve(dependency_type)
    }

    /// Read-only view of the shared repository.
    pub fn repository(&self) -> Ref<'_, Rc<RefCell<WeightRepository>>> {
        Ref::map(self.state.borrow(), |st| &st.repository)
    }

    /// Subscribe to weight-changed notifications.
    pub fn on_weights_changed(&self, observer: impl Fn() + 'static) {
        self.state.borrow_mut().weights_changed.connect(observer);
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

impl std::fmt::Debug for WeightBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeightBackend")
            .field("history", &self.history)
            .finish()
    }
}
