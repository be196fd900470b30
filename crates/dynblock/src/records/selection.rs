//! Selection sets: ordered, de-duplicated collections of host object handles.
//!
//! A [`SelectionSetRef`] either belongs to exactly one action (stored beside
//! it as the `SelectionSet` record) or lives in a [`SelectionSetManager`],
//! the caller-owned registry of named sets that users manage independently of
//! any action.

use super::DomainRecord;
use crate::codec::{tags, Field, Fields, RecordKind};
use crate::error::{DecodeError, SchemaError};
use crate::model::Handle;
use std::collections::{BTreeMap, HashSet};

/// Ordered set of handles. Membership ignores order; iteration follows
/// insertion order.
#[derive(Debug, Clone, Default)]
pub struct SelectionSetRef {
    name: Option<String>,
    handles: Vec<Handle>,
}

impl SelectionSetRef {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            handles: Vec::new(),
        }
    }

    /// Build from handles, keeping the first occurrence of each.
    pub fn from_handles<I: IntoIterator<Item = Handle>>(handles: I) -> Self {
        let mut set = Self::new();
        set.extend(handles);
        set
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn set_name(&mut self, name: Option<String>) {
        self.name = name;
    }

    /// Returns false if the handle was already a member.
    pub fn add(&mut self, handle: Handle) -> bool {
        if self.handles.contains(&handle) {
            return false;
        }
        self.handles.push(handle);
        true
    }

    pub fn extend<I: IntoIterator<Item = Handle>>(&mut self, handles: I) -> usize {
        handles.into_iter().filter(|h| self.add(*h)).count()
    }

    pub fn remove(&mut self, handle: Handle) -> bool {
        let before = self.handles.len();
        self.handles.retain(|h| *h != handle);
        self.handles.len() != before
    }

    pub fn contains(&self, handle: Handle) -> bool {
        self.handles.contains(&handle)
    }

    pub fn clear(&mut self) {
        self.handles.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = Handle> + '_ {
        self.handles.iter().copied()
    }

    pub fn handles(&self) -> &[Handle] {
        &self.handles
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}

impl PartialEq for SelectionSetRef {
    /// Sets are equal when they have the same name and members, whatever the order.
    fn eq(&self, other: &Self) -> bool {
        if self.name != other.name || self.handles.len() != other.handles.len() {
            return false;
        }
        let mine: HashSet<_> = self.handles.iter().collect();
        other.handles.iter().all(|h| mine.contains(h))
    }
}

impl Eq for SelectionSetRef {}

impl DomainRecord for SelectionSetRef {
    const KIND: RecordKind = RecordKind::SelectionSet;

    fn to_fields(&self) -> Vec<Field> {
        let mut fields = Vec::with_capacity(self.handles.len() + 2);
        if let Some(name) = &self.name {
            fields.push(Field::new(tags::NAME, name.as_str()));
        }
        fields.push(Field::new(tags::FLAG_0, self.handles.len() as i64));
        fields.extend(
            self.handles
                .iter()
                .enumerate()
                .map(|(i, h)| Field::new(tags::payload(i), *h)),
        );
        fields
    }

    fn from_fields(fields: &[Field]) -> Result<Self, DecodeError> {
        let f = Fields::new(Self::KIND, fields);
        let mut payload = f.payload();
        let count = f.opt_int(tags::FLAG_0)?.unwrap_or(payload.remaining() as i64);
        if count < 0 || count as usize != payload.remaining() {
            return Err(DecodeError::InvalidValue {
                tag: tags::FLAG_0,
                reason: format!(
                    "selection count {count} does not match {} handles",
                    payload.remaining()
                ),
            });
        }

        let mut set = Self {
            name: f.opt_string(tags::NAME)?.map(str::to_string),
            handles: Vec::with_capacity(payload.remaining()),
        };
        while payload.remaining() > 0 {
            set.add(payload.next_handle()?);
        }
        Ok(set)
    }
}

/// Caller-owned registry of named selection sets.
///
/// Replaces any notion of a process-wide "current selection": whoever needs
/// named sets holds one of these and passes it where it is needed.
#[derive(Debug, Clone, Default)]
pub struct SelectionSetManager {
    sets: BTreeMap<String, SelectionSetRef>,
}

impl SelectionSetManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&mut self, name: &str) -> Result<&mut SelectionSetRef, SchemaError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(SchemaError::InvalidName {
                name: name.to_string(),
                reason: "selection set name cannot be empty".to_string(),
            });
        }
        if self.sets.contains_key(name) {
            return Err(SchemaError::DuplicateName(name.to_string()));
        }
        Ok(self
            .sets
            .entry(name.to_string())
            .or_insert_with(|| SelectionSetRef::named(name)))
    }

    /// Insert or replace a set under `name`.
    pub fn insert(&mut self, name: &str, mut set: SelectionSetRef) -> Option<SelectionSetRef> {
        set.set_name(Some(name.to_string()));
        self.sets.insert(name.to_string(), set)
    }

    pub fn get(&self, name: &str) -> Option<&SelectionSetRef> {
        self.sets.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut SelectionSetRef> {
        self.sets.get_mut(name)
    }

    pub fn rename(&mut self, from: &str, to: &str) -> Result<(), SchemaError> {
        let to = to.trim();
        if to.is_empty() {
            return Err(SchemaError::InvalidName {
                name: to.to_string(),
                reason: "selection set name cannot be empty".to_string(),
            });
        }
        if self.sets.contains_key(to) {
            return Err(SchemaError::DuplicateName(to.to_string()));
        }
        let mut set = self
            .sets
            .remove(from)
            .ok_or_else(|| SchemaError::UnknownName(from.to_string()))?;
        set.set_name(Some(to.to_string()));
        self.sets.insert(to.to_string(), set);
        Ok(())
    }

    pub fn remove(&mut self, name: &str) -> Option<SelectionSetRef> {
        self.sets.remove(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.sets.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }
}
