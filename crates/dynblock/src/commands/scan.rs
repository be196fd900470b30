//! Partial-failure tolerant scans over every host object.
//!
//! One unreadable record must not hide the rest, so scans log and skip
//! objects whose records fail to decode and report them alongside the
//! objects that loaded.

use crate::commands::action;
use crate::error::Result;
use crate::model::Handle;
use crate::records::{names, LookupAction, ParameterRecord};
use crate::store::{AttributeBackend, AttributeStore};
use tracing::warn;

#[derive(Debug)]
pub struct ScanReport<T> {
    pub found: Vec<(Handle, T)>,
    /// Objects that carry the record but could not be loaded, with the reason.
    pub skipped: Vec<(Handle, String)>,
}

impl<T> Default for ScanReport<T> {
    fn default() -> Self {
        Self {
            found: Vec::new(),
            skipped: Vec::new(),
        }
    }
}

impl<T> ScanReport<T> {
    pub fn handles(&self) -> impl Iterator<Item = Handle> + '_ {
        self.found.iter().map(|(h, _)| *h)
    }
}

/// Every object carrying a `Parameter` record, in handle order.
pub fn find_all_parameters<B: AttributeBackend>(
    store: &AttributeStore<B>,
) -> Result<ScanReport<ParameterRecord>> {
    scan(store, names::PARAMETER, |handle| {
        store.require(handle, names::PARAMETER)
    })
}

/// Every object carrying an `Action` record, loaded with its siblings.
pub fn find_all_actions<B: AttributeBackend>(
    store: &AttributeStore<B>,
) -> Result<ScanReport<LookupAction>> {
    scan(store, names::ACTION, |handle| action::load(store, handle))
}

fn scan<B, T, F>(store: &AttributeStore<B>, marker: &str, load: F) -> Result<ScanReport<T>>
where
    B: AttributeBackend,
    F: Fn(Handle) -> Result<T>,
{
    let mut report = ScanReport::default();
    for handle in store.handles()? {
        if !store.has_record(handle, marker)? {
            continue;
        }
        match load(handle) {
            Ok(item) => report.found.push((handle, item)),
            Err(err) => {
                warn!(%handle, record = marker, %err, "skipping unreadable object");
                report.skipped.push((handle, err.to_string()));
            }
        }
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::Buffer;
    use crate::commands::parameter;
    use crate::config::DynBlockConfig;
    use crate::records::Point3;
    use crate::store::MemBackend;

    #[test]
    fn corrupt_parameter_is_skipped_not_fatal() {
        let store = AttributeStore::with_backend(MemBackend::new());
        let config = DynBlockConfig::default();
        for (raw, name) in [(1, "A"), (3, "C")] {
            parameter::create(
                &store,
                &config,
                Handle::new(raw),
                ParameterRecord::new(name),
                Point3::default(),
            )
            .unwrap();
        }
        store
            .set_record(Handle::new(2), names::PARAMETER, Buffer::from(vec![0xE8, 0x03]))
            .unwrap();
        store
            .save(Handle::new(4), "Unrelated", &ParameterRecord::new("x"))
            .unwrap();

        let report = find_all_parameters(&store).unwrap();
        let found: Vec<_> = report.found.iter().map(|(_, p)| p.name.as_str()).collect();
        assert_eq!(found, ["A", "C"]);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].0, Handle::new(2));
    }

    #[test]
    fn action_missing_sibling_is_skipped() {
        let store = AttributeStore::with_backend(MemBackend::new());
        store
            .save(
                Handle::new(9),
                names::ACTION,
                &crate::records::ActionRecord::lookup("Orphan", Handle::new(1)),
            )
            .unwrap();
        let report = find_all_actions(&store).unwrap();
        assert!(report.found.is_empty());
        assert_eq!(report.skipped.len(), 1);
        assert!(report.skipped[0].1.contains("SelectionSet"));
    }
}
