//! # Attribute Store
//!
//! Associates named tagged-record buffers with host objects, mimicking a
//! per-object nested dictionary:
//!
//! ```text
//! host object #2A
//! └── dictionary
//!     ├── "Action"        -> ACTION buffer
//!     ├── "SelectionSet"  -> SELECTION_SET buffer
//!     ├── "LookupValues"  -> LOOKUP_VALUES buffer
//!     └── "LookupTable"   -> LOOKUP_TABLE buffer
//! ```
//!
//! The host supplies the primitives through [`AttributeBackend`]; the store
//! adds typed access on top. Dictionaries are materialized lazily on the first
//! write. A missing name is never an error on read: [`AttributeStore::get_record`]
//! returns `None`.
//!
//! ## Multi-record Writes
//!
//! Objects that span several records (a lookup action writes four) are
//! written through a [`Batch`], committed with [`AttributeStore::commit`].
//! Either every staged write lands or none does, so no reader ever sees a
//! half-written action.
//!
//! ## Implementations
//!
//! - [`mem_backend::MemBackend`]: in-memory dictionaries, used by tests and
//!   the command-line client.

use crate::codec::{self, Buffer, RecordKind};
use crate::error::{ReferenceError, Result};
use crate::model::{Handle, Resolver};
use crate::records::{names, DomainRecord, ParameterRecord};
use tracing::debug;

pub mod backend;
pub mod batch;
pub mod mem_backend;

pub use backend::AttributeBackend;
pub use batch::{Batch, BatchOp};
pub use mem_backend::MemBackend;

pub struct AttributeStore<B: AttributeBackend> {
    /// Exposed as pub(crate) for tests that poke the backend directly.
    pub(crate) backend: B,
}

impl<B: AttributeBackend> AttributeStore<B> {
    pub fn with_backend(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn get_record(&self, handle: Handle, name: &str) -> Result<Option<Buffer>> {
        self.backend.read(handle, name)
    }

    pub fn set_record(&self, handle: Handle, name: &str, buffer: Buffer) -> Result<()> {
        self.backend.write(handle, name, &buffer)?;
        debug!(%handle, record = name, bytes = buffer.len(), "wrote record");
        Ok(())
    }

    pub fn remove_record(&self, handle: Handle, name: &str) -> Result<bool> {
        self.backend.delete(handle, name)
    }

    pub fn has_record(&self, handle: Handle, name: &str) -> Result<bool> {
        Ok(self.backend.read(handle, name)?.is_some())
    }

    pub fn record_names(&self, handle: Handle) -> Result<Vec<String>> {
        self.backend.list_names(handle)
    }

    pub fn handles(&self) -> Result<Vec<Handle>> {
        self.backend.list_handles()
    }

    /// Drop every record stored under `handle`.
    pub fn clear(&self, handle: Handle) -> Result<bool> {
        self.backend.remove_dictionary(handle)
    }

    /// Decode a named record. `Ok(None)` if it is absent.
    pub fn load<R: DomainRecord>(&self, handle: Handle, name: &str) -> Result<Option<R>> {
        match self.backend.read(handle, name)? {
            Some(buffer) => Ok(Some(R::decode(&buffer)?)),
            None => Ok(None),
        }
    }

    /// Decode a named record that must exist.
    pub fn require<R: DomainRecord>(&self, handle: Handle, name: &str) -> Result<R> {
        self.load(handle, name)?.ok_or_else(|| {
            ReferenceError::MissingRecord {
                handle,
                name: name.to_string(),
            }
            .into()
        })
    }

    pub fn save<R: DomainRecord>(&self, handle: Handle, name: &str, record: &R) -> Result<()> {
        self.set_record(handle, name, record.encode())
    }

    /// Apply every staged operation, or none.
    pub fn commit(&self, batch: Batch) -> Result<()> {
        if batch.is_empty() {
            return Ok(());
        }
        self.backend.apply_batch(batch.ops())?;
        debug!(ops = batch.len(), "committed batch");
        Ok(())
    }
}

/// A handle is a live parameter when it carries a decodable `Parameter`
/// record marker.
impl<B: AttributeBackend> Resolver<ParameterRecord> for AttributeStore<B> {
    fn is_live(&self, handle: Handle) -> bool {
        matches!(
            self.backend.read(handle, names::PARAMETER),
            Ok(Some(buffer)) if codec::peek_kind(&buffer) == Ok(RecordKind::Parameter)
        )
    }
}
