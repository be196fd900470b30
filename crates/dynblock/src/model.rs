//! # Host Object Model
//!
//! The host application owns every drawing object. The core only ever sees
//! opaque [`Handle`]s: equality-comparable identifiers it stores and hands
//! back, never interprets.
//!
//! Links between records that do not imply ownership (an action pointing at
//! the parameter that drives it) are expressed as [`WeakRef`]. A weak
//! reference is resolved on demand and may fail; holding one never keeps the
//! target alive.

use crate::error::ReferenceError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;

/// Opaque identifier of a host object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Handle(u64);

impl Handle {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl From<u64> for Handle {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:X}", self.0)
    }
}

/// Something a weak reference can be checked against.
///
/// Implemented by the attribute store: a handle is live for a record type
/// when the store holds that record under the handle.
pub trait Resolver<T> {
    fn is_live(&self, handle: Handle) -> bool;
}

/// Non-owning reference to a host object carrying records of type `T`.
#[derive(Debug)]
pub struct WeakRef<T> {
    handle: Handle,
    _target: PhantomData<fn() -> T>,
}

impl<T> WeakRef<T> {
    pub fn new(handle: Handle) -> Self {
        Self {
            handle,
            _target: PhantomData,
        }
    }

    /// The stored handle, without checking that it still resolves.
    pub fn handle(&self) -> Handle {
        self.handle
    }

    /// Resolve the reference against a live view of the host.
    pub fn resolve<R: Resolver<T> + ?Sized>(&self, resolver: &R) -> Result<Handle, ReferenceError> {
        if resolver.is_live(self.handle) {
            Ok(self.handle)
        } else {
            Err(ReferenceError::DanglingReference(self.handle))
        }
    }
}

impl<T> Clone for WeakRef<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for WeakRef<T> {}

impl<T> PartialEq for WeakRef<T> {
    fn eq(&self, other: &Self) -> bool {
        self.handle == other.handle
    }
}

impl<T> Eq for WeakRef<T> {}
