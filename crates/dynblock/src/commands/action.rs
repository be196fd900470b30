use crate::commands::{CmdMessage, CmdResult};
use crate::error::{ReferenceError, Result, SchemaError};
use crate::model::{Handle, Resolver};
use crate::records::{names, ActionRecord, LookupAction, LookupValues, ParameterRecord, SelectionSetRef};
use crate::store::{AttributeBackend, AttributeStore, Batch};
use crate::table::LookupTable;
use tracing::debug;

/// Everything needed to create a lookup action.
#[derive(Debug, Clone)]
pub struct NewLookupAction {
    pub name: String,
    pub description: String,
    /// Host object carrying the driving parameter.
    pub parameter: Handle,
    /// Objects the action applies to.
    pub targets: SelectionSetRef,
    pub table: LookupTable,
    /// Column whose distinct values are offered to the user.
    pub values_column: String,
}

/// Distinct values of `column`, in first-seen row order.
pub fn lookup_values(table: &LookupTable, column: &str) -> Result<LookupValues> {
    let mut values: Vec<String> = Vec::new();
    for value in table.column_values(column)? {
        let text = value.to_string();
        if !values.contains(&text) {
            values.push(text);
        }
    }
    Ok(LookupValues(values))
}

/// Create a lookup action on `handle`.
///
/// Writes the `Action`, `SelectionSet`, `LookupValues` and `LookupTable`
/// records in one batch. Fails with `DanglingReference` if `parameter` does
/// not carry a parameter.
pub fn create<B: AttributeBackend>(
    store: &AttributeStore<B>,
    handle: Handle,
    spec: NewLookupAction,
) -> Result<CmdResult> {
    if spec.name.trim().is_empty() {
        return Err(SchemaError::InvalidName {
            name: spec.name,
            reason: "action name cannot be empty".to_string(),
        }
        .into());
    }
    if store.has_record(handle, names::ACTION)? {
        return Err(SchemaError::DuplicateName(format!("action on {handle}")).into());
    }
    if !Resolver::<ParameterRecord>::is_live(store, spec.parameter) {
        return Err(ReferenceError::DanglingReference(spec.parameter).into());
    }

    let action = LookupAction {
        record: ActionRecord::lookup(spec.name, spec.parameter).with_description(spec.description),
        values: lookup_values(&spec.table, &spec.values_column)?,
        selection: spec.targets,
        table: spec.table,
    };
    store.commit(stage(Batch::new(), handle, &action))?;
    debug!(%handle, parameter = %spec.parameter, "created lookup action");

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Lookup action created: {} ({} values)",
        action.record.name,
        action.values.len()
    )));
    Ok(result.with_action(handle, action))
}

/// Load an action with all of its sibling records.
pub fn load<B: AttributeBackend>(store: &AttributeStore<B>, handle: Handle) -> Result<LookupAction> {
    Ok(LookupAction {
        record: store.require(handle, names::ACTION)?,
        selection: store.require(handle, names::SELECTION_SET)?,
        values: store.require(handle, names::LOOKUP_VALUES)?,
        table: store.require(handle, names::LOOKUP_TABLE)?,
    })
}

/// Replace the table (and the lookup values derived from it).
pub fn update_table<B: AttributeBackend>(
    store: &AttributeStore<B>,
    handle: Handle,
    table: LookupTable,
    values_column: &str,
) -> Result<CmdResult> {
    let mut action = load(store, handle)?;
    action.values = lookup_values(&table, values_column)?;
    action.table = table;
    let batch = Batch::new()
        .save(handle, names::LOOKUP_VALUES, &action.values)
        .save(handle, names::LOOKUP_TABLE, &action.table);
    store.commit(batch)?;

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Lookup table updated: {} ({} rows)",
        action.record.name,
        action.table.len()
    )));
    Ok(result.with_action(handle, action))
}

/// Replace the set of objects the action applies to.
pub fn set_targets<B: AttributeBackend>(
    store: &AttributeStore<B>,
    handle: Handle,
    targets: SelectionSetRef,
) -> Result<CmdResult> {
    let mut action = load(store, handle)?;
    action.selection = targets;
    store.save(handle, names::SELECTION_SET, &action.selection)?;

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Action targets updated: {} ({} objects)",
        action.record.name,
        action.selection.len()
    )));
    Ok(result.with_action(handle, action))
}

pub fn enable<B: AttributeBackend>(store: &AttributeStore<B>, handle: Handle) -> Result<CmdResult> {
    set_enabled(store, handle, true)
}

pub fn disable<B: AttributeBackend>(store: &AttributeStore<B>, handle: Handle) -> Result<CmdResult> {
    set_enabled(store, handle, false)
}

fn set_enabled<B: AttributeBackend>(
    store: &AttributeStore<B>,
    handle: Handle,
    enabled: bool,
) -> Result<CmdResult> {
    let mut action = load(store, handle)?;
    let mut result = CmdResult::default();
    if action.record.enabled == enabled {
        result.add_message(CmdMessage::info(format!(
            "Action already {}: {}",
            if enabled { "enabled" } else { "disabled" },
            action.record.name
        )));
        return Ok(result.with_action(handle, action));
    }

    action.record.enabled = enabled;
    store.save(handle, names::ACTION, &action.record)?;
    result.add_message(CmdMessage::success(format!(
        "Action {}: {}",
        if enabled { "enabled" } else { "disabled" },
        action.record.name
    )));
    Ok(result.with_action(handle, action))
}

/// Remove the action and its sibling records in one batch.
pub fn delete<B: AttributeBackend>(store: &AttributeStore<B>, handle: Handle) -> Result<CmdResult> {
    let record: ActionRecord = store.require(handle, names::ACTION)?;
    let batch = [
        names::ACTION,
        names::SELECTION_SET,
        names::LOOKUP_VALUES,
        names::LOOKUP_TABLE,
    ]
    .into_iter()
    .fold(Batch::new(), |batch, name| batch.remove(handle, name));
    store.commit(batch)?;

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Lookup action deleted: {}",
        record.name
    )));
    Ok(result)
}

fn stage(batch: Batch, handle: Handle, action: &LookupAction) -> Batch {
    batch
        .save(handle, names::ACTION, &action.record)
        .save(handle, names::SELECTION_SET, &action.selection)
        .save(handle, names::LOOKUP_VALUES, &action.values)
        .save(handle, names::LOOKUP_TABLE, &action.table)
}
