use crate::commands::{CmdMessage, CmdResult};
use crate::config::DynBlockConfig;
use crate::error::{Result, SchemaError};
use crate::model::Handle;
use crate::records::{names, GripRecord, GripType, ParameterRecord, Point3};
use crate::store::{AttributeBackend, AttributeStore, Batch};

/// Store a new parameter on `handle`, with its grip when it has one.
///
/// The parameter and its grip are committed together.
pub fn create<B: AttributeBackend>(
    store: &AttributeStore<B>,
    config: &DynBlockConfig,
    handle: Handle,
    record: ParameterRecord,
    location: Point3,
) -> Result<CmdResult> {
    check_name(&record.name)?;
    if store.has_record(handle, names::PARAMETER)? {
        return Err(SchemaError::DuplicateName(format!("parameter on {handle}")).into());
    }

    let mut batch = Batch::new().save(handle, names::PARAMETER, &record);
    if record.grip_count > 0 {
        let grip = GripRecord::new(location, GripType::Position, config.default_grip_size);
        batch = batch.save(handle, names::grip(0), &grip);
    }
    store.commit(batch)?;

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Parameter created: {}",
        record.name
    )));
    Ok(result.with_parameter(handle, record))
}

pub fn get<B: AttributeBackend>(store: &AttributeStore<B>, handle: Handle) -> Result<ParameterRecord> {
    store.require(handle, names::PARAMETER)
}

/// Grips stored for a parameter, in index order. Stops at the first gap.
pub fn grips<B: AttributeBackend>(store: &AttributeStore<B>, handle: Handle) -> Result<Vec<GripRecord>> {
    let mut grips = Vec::new();
    while let Some(grip) = store.load(handle, &names::grip(grips.len()))? {
        grips.push(grip);
    }
    Ok(grips)
}

pub fn rename<B: AttributeBackend>(
    store: &AttributeStore<B>,
    handle: Handle,
    name: &str,
) -> Result<CmdResult> {
    check_name(name)?;
    let name = name.trim().to_string();
    update(store, handle, |record| {
        let message = format!("Parameter renamed: {} -> {}", record.name, name);
        record.name = name;
        message
    })
}

pub fn relabel<B: AttributeBackend>(
    store: &AttributeStore<B>,
    handle: Handle,
    label: &str,
) -> Result<CmdResult> {
    let label = label.to_string();
    update(store, handle, |record| {
        record.label = label;
        format!("Parameter relabelled: {}", record.name)
    })
}

pub fn describe<B: AttributeBackend>(
    store: &AttributeStore<B>,
    handle: Handle,
    description: &str,
) -> Result<CmdResult> {
    let description = description.to_string();
    update(store, handle, |record| {
        record.description = description;
        format!("Parameter description updated: {}", record.name)
    })
}

/// Remove the parameter record and every grip record on `handle`.
pub fn delete<B: AttributeBackend>(store: &AttributeStore<B>, handle: Handle) -> Result<CmdResult> {
    let record = get(store, handle)?;
    let batch = store
        .record_names(handle)?
        .into_iter()
        .filter(|name| name == names::PARAMETER || is_grip_name(name))
        .fold(Batch::new(), |batch, name| batch.remove(handle, name));
    store.commit(batch)?;

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Parameter deleted: {}",
        record.name
    )));
    Ok(result.with_parameter(handle, record))
}

fn update<B, F>(store: &AttributeStore<B>, handle: Handle, change: F) -> Result<CmdResult>
where
    B: AttributeBackend,
    F: FnOnce(&mut ParameterRecord) -> String,
{
    let mut record = get(store, handle)?;
    let message = change(&mut record);
    store.save(handle, names::PARAMETER, &record)?;

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(message));
    Ok(result.with_parameter(handle, record))
}

fn check_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(SchemaError::InvalidName {
            name: name.to_string(),
            reason: "parameter name cannot be empty".to_string(),
        }
        .into());
    }
    Ok(())
}

fn is_grip_name(name: &str) -> bool {
    name.strip_prefix(names::GRIP_PREFIX)
        .is_some_and(|index| !index.is_empty() && index.bytes().all(|b| b.is_ascii_digit()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{DynBlockError, ReferenceError};
    use crate::store::MemBackend;

    fn setup() -> (AttributeStore<MemBackend>, DynBlockConfig) {
        (
            AttributeStore::with_backend(MemBackend::new()),
            DynBlockConfig::default(),
        )
    }

    #[test]
    fn create_writes_parameter_and_one_grip() {
        let (store, config) = setup();
        let h = Handle::new(10);
        let at = Point3::new(1.0, 2.0, 0.0);
        create(&store, &config, h, ParameterRecord::new("Width"), at).unwrap();

        assert_eq!(store.record_names(h).unwrap(), vec!["Grip0", "Parameter"]);
        let grips = grips(&store, h).unwrap();
        assert_eq!(grips.len(), 1);
        assert_eq!(grips[0].location, at);
        assert_eq!(grips[0].size, 1.0);
    }

    #[test]
    fn gripless_parameter_has_no_grip_record() {
        let (store, config) = setup();
        let h = Handle::new(10);
        let record = ParameterRecord::new("Hidden").with_grip_count(0);
        create(&store, &config, h, record, Point3::default()).unwrap();
        assert_eq!(store.record_names(h).unwrap(), vec!["Parameter"]);
    }

    #[test]
    fn grip_size_follows_config() {
        let (store, mut config) = setup();
        config.default_grip_size = 2.5;
        let h = Handle::new(1);
        create(&store, &config, h, ParameterRecord::new("W"), Point3::default()).unwrap();
        assert_eq!(grips(&store, h).unwrap()[0].size, 2.5);
    }

    #[test]
    fn second_parameter_on_same_handle_is_rejected() {
        let (store, config) = setup();
        let h = Handle::new(1);
        create(&store, &config, h, ParameterRecord::new("A"), Point3::default()).unwrap();
        let err = create(&store, &config, h, ParameterRecord::new("B"), Point3::default())
            .unwrap_err();
        assert!(matches!(
            err,
            DynBlockError::Schema(SchemaError::DuplicateName(_))
        ));
    }

    #[test]
    fn failed_commit_leaves_no_parameter() {
        let (store, config) = setup();
        store.backend().set_simulate_write_error(true);
        let h = Handle::new(1);
        assert!(create(&store, &config, h, ParameterRecord::new("A"), Point3::default()).is_err());
        store.backend().set_simulate_write_error(false);
        assert!(store.record_names(h).unwrap().is_empty());
    }

    #[test]
    fn rename_relabel_describe() {
        let (store, config) = setup();
        let h = Handle::new(1);
        create(&store, &config, h, ParameterRecord::new("A"), Point3::default()).unwrap();

        rename(&store, h, " Depth ").unwrap();
        relabel(&store, h, "Depth (mm)").unwrap();
        let result = describe(&store, h, "Overall depth").unwrap();
        assert_eq!(
            result.messages[0].content,
            "Parameter description updated: Depth"
        );

        let record = get(&store, h).unwrap();
        assert_eq!(record.name, "Depth");
        assert_eq!(record.label, "Depth (mm)");
        assert_eq!(record.description, "Overall depth");
        assert!(rename(&store, h, "  ").is_err());
    }

    #[test]
    fn delete_removes_grips_but_not_other_records() {
        let (store, config) = setup();
        let h = Handle::new(1);
        create(&store, &config, h, ParameterRecord::new("A"), Point3::default()).unwrap();
        store
            .save(h, &names::grip(1), &GripRecord::new(Point3::default(), GripType::Linear, 1.0))
            .unwrap();
        store.save(h, "Gripper", &ParameterRecord::new("other")).unwrap();

        delete(&store, h).unwrap();
        assert_eq!(store.record_names(h).unwrap(), vec!["Gripper"]);
    }

    #[test]
    fn operations_on_missing_parameter_fail() {
        let (store, _) = setup();
        let err = relabel(&store, Handle::new(5), "x").unwrap_err();
        assert!(matches!(
            err,
            DynBlockError::Reference(ReferenceError::MissingRecord { .. })
        ));
    }
}
