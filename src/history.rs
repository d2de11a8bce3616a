//! Generic undo/redo engine shared by every backend.

/// A reversible unit of state change.
///
/// `redo` defaults to re-running `execute`; commands whose re-application
/// differs from first application override it.
pub trait Command {
    /// Apply the change.
    fn execute(&mut self);
    /// Revert the change.
    fn undo(&mut self);
    /// Re-apply after an undo.
    fn redo(&mut self) {
        self.execute();
    }
}

/// Ordered command list with a cursor.
///
/// Executing a new command truncates everything past the cursor, so an
/// abandoned redo branch is discarded permanently; there is no branching
/// history.
#[derive(Default)]
pub struct CommandHistory {
    entries: Vec<Box<dyn Command>>,
    cursor: usize,
}

impl CommandHistory {
    /// Create an empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Run a command and take ownership of it.
    pub fn execute(&mut self, mut command: Box<dyn Command>) {
        command.execute();
        self.entries.truncate(self.cursor);
        self.entries.push(command);
        self.cursor = self.entries.len();
    }

    /// Undo the command before the cursor. Returns `false` at the beginning.
    pub fn undo(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        self.entries[self.cursor].undo();
        true
    }

    /// Redo the command at the cursor. Returns `false` at the end.
    pub fn redo(&mut self) -> bool {
        if self.cursor == self.entries.len() {
            return false;
        }
        self.entries[self.cursor].redo();
        self.cursor += 1;
        true
    }

    /// Drop every retained command. Used when the state the commands close
    /// over is replaced wholesale and replaying them would be unsound.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = 0;
    }

    /// True when an undo is available.
    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    /// True when a redo is available.
    pub fn can_redo(&self) -> bool {
        self.cursor < self.entries.len()
    }

    /// Number of commands currently retained.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no command is retained.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl std::fmt::Debug for CommandHistory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandHistory")
            .field("entries", &self.entries.len())
            .field("cursor", &self.cursor)
            .finish()
    }
}
