use crate::codec::Buffer;
use crate::model::Handle;
use crate::records::DomainRecord;

/// One staged change.
#[derive(Debug, Clone, PartialEq)]
pub enum BatchOp {
    Write {
        handle: Handle,
        name: String,
        buffer: Buffer,
    },
    Remove {
        handle: Handle,
        name: String,
    },
}

impl BatchOp {
    pub fn handle(&self) -> Handle {
        match self {
            BatchOp::Write { handle, .. } | BatchOp::Remove { handle, .. } => *handle,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            BatchOp::Write { name, .. } | BatchOp::Remove { name, .. } => name,
        }
    }
}

/// Named-record writes and removals that commit together.
///
/// Nothing touches the backend until [`AttributeStore::commit`]; a dropped
/// batch has no effect.
///
/// ```
/// use dynblock::model::Handle;
/// use dynblock::records::{names, ParameterRecord};
/// use dynblock::store::{AttributeStore, Batch, MemBackend};
///
/// let store = AttributeStore::with_backend(MemBackend::new());
/// let host = Handle::new(1);
/// let batch = Batch::new().save(host, names::PARAMETER, &ParameterRecord::new("Width"));
/// store.commit(batch).unwrap();
/// assert!(store.has_record(host, names::PARAMETER).unwrap());
/// ```
///
/// [`AttributeStore::commit`]: super::AttributeStore::commit
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Batch {
    ops: Vec<BatchOp>,
}

impl Batch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write(mut self, handle: Handle, name: impl Into<String>, buffer: Buffer) -> Self {
        self.ops.push(BatchOp::Write {
            handle,
            name: name.into(),
            buffer,
        });
        self
    }

    /// Stage a typed record.
    pub fn save<R: DomainRecord>(self, handle: Handle, name: impl Into<String>, record: &R) -> Self {
        self.write(handle, name, record.encode())
    }

    pub fn remove(mut self, handle: Handle, name: impl Into<String>) -> Self {
        self.ops.push(BatchOp::Remove {
            handle,
            name: name.into(),
        });
        self
    }

    pub fn ops(&self) -> &[BatchOp] {
        &self.ops
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}
