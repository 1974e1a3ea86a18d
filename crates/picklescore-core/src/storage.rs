// Durable snapshot slot: the persistence port the session store writes through.

use std::cell::{Cell, RefCell};

use anyhow::{bail, Result};

/// A single key-value slot holding the serialized session snapshot.
///
/// Read once at startup, overwritten wholesale after every mutation.
pub trait SnapshotStorage {
    /// The stored snapshot, or `None` on first run.
    fn load(&self) -> Result<Option<String>>;

    /// Replace the stored snapshot.
    fn save(&self, json: &str) -> Result<()>;
}

/// In-process slot, used by tests and as a scratch store.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    slot: RefCell<Option<String>>,
    writes: Cell<usize>,
    fail_writes: bool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// A slot that already holds `json`, as if written by an earlier run.
    pub fn with_contents(json: impl Into<String>) -> Self {
        MemoryStorage {
            slot: RefCell::new(Some(json.into())),
            ..Self::default()
        }
    }

    /// A slot whose writes always fail.
    pub fn failing() -> Self {
        MemoryStorage {
            fail_writes: true,
            ..Self::default()
        }
    }

    /// Number of successful writes so far.
    pub fn writes(&self) -> usize {
        self.writes.get()
    }

    pub fn contents(&self) -> Option<String> {
        self.slot.borrow().clone()
    }
}

impl SnapshotStorage for MemoryStorage {
    fn load(&self) -> Result<Option<String>> {
        Ok(self.slot.borrow().clone())
    }

    fn save(&self, json: &str) -> Result<()> {
        if self.fail_writes {
            bail!("memory slot is read-only");
        }
        *self.slot.borrow_mut() = Some(json.to_string());
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }
}
