use crate::commands::action;
use crate::error::{ReferenceError, Result};
use crate::matching::{self, MatchConfig, Resolution};
use crate::model::Handle;
use crate::store::{AttributeBackend, AttributeStore};
use serde::Serialize;
use tracing::debug;

/// Outcome of running an input through a lookup action.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionResolution {
    pub resolution: Resolution,
    /// The live parameter driving the action.
    pub parameter: Handle,
    /// Objects the resolved value applies to.
    pub targets: Vec<Handle>,
}

/// Resolve `input` through the action stored on `handle`.
///
/// Fails with `ActionDisabled` for a disabled action and with
/// `DanglingReference` when the driving parameter is gone. Matching never
/// starts in either case.
pub fn run<B: AttributeBackend>(
    store: &AttributeStore<B>,
    handle: Handle,
    input: &str,
    config: &MatchConfig,
) -> Result<ActionResolution> {
    let action = action::load(store, handle)?;
    if !action.record.enabled {
        return Err(ReferenceError::ActionDisabled(handle).into());
    }
    let parameter = action.record.parameter_ref.resolve(store)?;

    let resolution = matching::resolve(&action.table, input, config)?;
    debug!(
        %handle,
        input,
        matched = resolution.outcome.is_match(),
        skipped = resolution.skipped.len(),
        "resolved lookup action"
    );
    Ok(ActionResolution {
        resolution,
        parameter,
        targets: action.selection.handles().to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::action::NewLookupAction;
    use crate::commands::parameter;
    use crate::config::DynBlockConfig;
    use crate::error::{DynBlockError, MatchError};
    use crate::matching::{MatchOutcome, MatchStrategy};
    use crate::records::{ParameterRecord, Point3, SelectionSetRef};
    use crate::store::MemBackend;
    use crate::table::{ColumnDef, ColumnType, LookupTable};

    const PARAM: Handle = Handle::new(1);
    const ACTION: Handle = Handle::new(2);

    fn setup() -> AttributeStore<MemBackend> {
        let store = AttributeStore::with_backend(MemBackend::new());
        parameter::create(
            &store,
            &DynBlockConfig::default(),
            PARAM,
            ParameterRecord::new("Width"),
            Point3::default(),
        )
        .unwrap();

        let mut table = LookupTable::new("Widths");
        table
            .add_column(ColumnDef::new("Input", ColumnType::Text).required())
            .unwrap();
        table
            .add_column(ColumnDef::new("Result", ColumnType::Number))
            .unwrap();
        table
            .add_text_row([("Input", "A"), ("Result", "100")])
            .unwrap();
        table
            .add_text_row([("Input", "B"), ("Result", "200")])
            .unwrap();

        action::create(
            &store,
            ACTION,
            NewLookupAction {
                name: "WidthLookup".into(),
                description: String::new(),
                parameter: PARAM,
                targets: SelectionSetRef::from_handles([Handle::new(7)]),
                table,
                values_column: "Input".into(),
            },
        )
        .unwrap();
        store
    }

    fn exact() -> MatchConfig {
        MatchConfig::new("Input", "Result", MatchStrategy::Exact)
    }

    #[test]
    fn resolves_input_to_row_and_targets() {
        let store = setup();
        let resolved = run(&store, ACTION, "b", &exact()).unwrap();
        assert_eq!(resolved.resolution.outcome.value().as_deref(), Some("200"));
        assert_eq!(resolved.parameter, PARAM);
        assert_eq!(resolved.targets, vec![Handle::new(7)]);
    }

    #[test]
    fn no_match_falls_back_to_default() {
        let store = setup();
        let config = exact().with_default("50");
        let resolved = run(&store, ACTION, "Z", &config).unwrap();
        assert_eq!(
            resolved.resolution.outcome,
            MatchOutcome::Default { value: "50".into() }
        );
    }

    #[test]
    fn disabled_action_is_refused() {
        let store = setup();
        action::disable(&store, ACTION).unwrap();
        assert!(matches!(
            run(&store, ACTION, "A", &exact()),
            Err(DynBlockError::Reference(ReferenceError::ActionDisabled(_)))
        ));
    }

    #[test]
    fn deleted_parameter_is_dangling() {
        let store = setup();
        parameter::delete(&store, PARAM).unwrap();
        assert!(matches!(
            run(&store, ACTION, "A", &exact()),
            Err(DynBlockError::Reference(ReferenceError::DanglingReference(h))) if h == PARAM
        ));
    }

    #[test]
    fn range_type_error_surfaces() {
        let store = setup();
        let config = MatchConfig::new("Input", "Result", MatchStrategy::Range);
        assert!(matches!(
            run(&store, ACTION, "wide", &config),
            Err(DynBlockError::Match(MatchError::TypeError(_)))
        ));
    }
}
