use super::backend::AttributeBackend;
use super::batch::BatchOp;
use crate::codec::Buffer;
use crate::error::{DynBlockError, Result};
use crate::model::Handle;
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};

type Dictionary = BTreeMap<String, Buffer>;

/// In-memory attribute backend.
///
/// Uses `RefCell` for interior mutability since the core is single-writer.
/// Stands in for the host's extension dictionaries in tests and in the CLI.
#[derive(Debug, Default)]
pub struct MemBackend {
    dictionaries: RefCell<HashMap<Handle, Dictionary>>,
    simulate_write_error: RefCell<bool>,
}

impl MemBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every write, delete and batch fail, for testing error paths.
    pub fn set_simulate_write_error(&self, simulate: bool) {
        *self.simulate_write_error.borrow_mut() = simulate;
    }

    /// Whether a handle has a dictionary. Dictionaries are dropped once their
    /// last record is deleted.
    pub fn has_dictionary(&self, handle: Handle) -> bool {
        self.dictionaries.borrow().contains_key(&handle)
    }

    fn check_writable(&self) -> Result<()> {
        if *self.simulate_write_error.borrow() {
            return Err(DynBlockError::Store("Simulated write error".to_string()));
        }
        Ok(())
    }
}

impl AttributeBackend for MemBackend {
    fn read(&self, handle: Handle, name: &str) -> Result<Option<Buffer>> {
        let dictionaries = self.dictionaries.borrow();
        Ok(dictionaries
            .get(&handle)
            .and_then(|dict| dict.get(name))
            .cloned())
    }

    fn write(&self, handle: Handle, name: &str, buffer: &Buffer) -> Result<()> {
        self.check_writable()?;
        let mut dictionaries = self.dictionaries.borrow_mut();
        dictionaries
            .entry(handle)
            .or_default()
            .insert(name.to_string(), buffer.clone());
        Ok(())
    }

    fn delete(&self, handle: Handle, name: &str) -> Result<bool> {
        self.check_writable()?;
        Ok(remove_entry(&mut self.dictionaries.borrow_mut(), handle, name))
    }

    fn list_names(&self, handle: Handle) -> Result<Vec<String>> {
        let dictionaries = self.dictionaries.borrow();
        Ok(dictionaries
            .get(&handle)
            .map(|dict| dict.keys().cloned().collect())
            .unwrap_or_default())
    }

    fn list_handles(&self) -> Result<Vec<Handle>> {
        let mut handles: Vec<Handle> = self.dictionaries.borrow().keys().copied().collect();
        handles.sort();
        Ok(handles)
    }

    fn remove_dictionary(&self, handle: Handle) -> Result<bool> {
        self.check_writable()?;
        Ok(self.dictionaries.borrow_mut().remove(&handle).is_some())
    }

    fn apply_batch(&self, ops: &[BatchOp]) -> Result<()> {
        self.check_writable()?;
        let mut dictionaries = self.dictionaries.borrow_mut();
        for op in ops {
            match op {
                BatchOp::Write {
                    handle,
                    name,
                    buffer,
                } => {
                    dictionaries
                        .entry(*handle)
                        .or_default()
                        .insert(name.clone(), buffer.clone());
                }
                BatchOp::Remove { handle, name } => {
                    remove_entry(&mut dictionaries, *handle, name);
                }
            }
        }
        Ok(())
    }
}

fn remove_entry(
    dictionaries: &mut HashMap<Handle, Dictionary>,
    handle: Handle,
    name: &str,
) -> bool {
    let Some(dict) = dictionaries.get_mut(&handle) else {
        return false;
    };
    let existed = dict.remove(name).is_some();
    if dict.is_empty() {
        dictionaries.remove(&handle);
    }
    existed
}
