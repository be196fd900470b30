use super::batch::BatchOp;
use crate::codec::Buffer;
use crate::error::Result;
use crate::model::Handle;
use tracing::warn;

/// Host primitives for per-object named-record dictionaries.
///
/// Every host object may carry a dictionary mapping record names to opaque
/// buffers. The dictionary is created on the first write and may be dropped
/// wholesale. Methods take `&self`; backends use interior mutability and
/// assume a single writer per handle.
pub trait AttributeBackend {
    /// Read a named record. `Ok(None)` when the handle has no dictionary or
    /// the dictionary has no such name.
    fn read(&self, handle: Handle, name: &str) -> Result<Option<Buffer>>;

    /// Create or overwrite a named record, creating the dictionary if needed.
    fn write(&self, handle: Handle, name: &str, buffer: &Buffer) -> Result<()>;

    /// Delete a named record. Returns whether it existed.
    fn delete(&self, handle: Handle, name: &str) -> Result<bool>;

    /// Names stored under a handle, sorted.
    fn list_names(&self, handle: Handle) -> Result<Vec<String>>;

    /// Every handle that currently has a dictionary, sorted. A dictionary
    /// whose last record was deleted is not listed.
    fn list_handles(&self) -> Result<Vec<Handle>>;

    /// Drop a handle's whole dictionary. Returns whether it existed.
    fn remove_dictionary(&self, handle: Handle) -> Result<bool>;

    /// Apply staged operations as one unit.
    ///
    /// The default applies them in order, remembering each previous value,
    /// and restores those values in reverse if any operation fails.
    /// Backends with native transactions should override this.
    fn apply_batch(&self, ops: &[BatchOp]) -> Result<()> {
        let mut undo: Vec<(Handle, &str, Option<Buffer>)> = Vec::with_capacity(ops.len());
        for op in ops {
            let (handle, name) = (op.handle(), op.name());
            let outcome = self.read(handle, name).and_then(|previous| {
                match op {
                    BatchOp::Write { buffer, .. } => self.write(handle, name, buffer)?,
                    BatchOp::Remove { .. } => {
                        self.delete(handle, name)?;
                    }
                }
                Ok(previous)
            });
            match outcome {
                Ok(previous) => undo.push((handle, name, previous)),
                Err(err) => {
                    rollback(self, undo);
                    return Err(err);
                }
            }
        }
        Ok(())
    }
}

fn rollback<B: AttributeBackend + ?Sized>(backend: &B, undo: Vec<(Handle, &str, Option<Buffer>)>) {
    for (handle, name, previous) in undo.into_iter().rev() {
        let restored = match &previous {
            Some(buffer) => backend.write(handle, name, buffer),
            None => backend.delete(handle, name).map(|_| ()),
        };
        if let Err(err) = restored {
            warn!(%handle, record = name, %err, "rollback could not restore record");
        }
    }
}
