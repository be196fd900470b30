//! Parameter and lookup action lifecycle through the public API.

use dynblock::api::DynBlockApi;
use dynblock::commands::action::NewLookupAction;
use dynblock::config::DynBlockConfig;
use dynblock::error::{DynBlockError, ReferenceError};
use dynblock::matching::{MatchConfig, MatchOutcome, MatchStrategy};
use dynblock::model::Handle;
use dynblock::records::{names, ParameterRecord, Point3, SelectionSetRef};
use dynblock::store::MemBackend;
use dynblock::table::{ColumnDef, ColumnType, LookupTable};

const PARAM: Handle = Handle::new(100);
const ACTION: Handle = Handle::new(200);

fn beams() -> LookupTable {
    let mut table = LookupTable::new("Beams");
    table
        .add_column(ColumnDef::new("Material", ColumnType::Text).required())
        .unwrap();
    table
        .add_column(ColumnDef::new("Min", ColumnType::Number))
        .unwrap();
    table
        .add_column(ColumnDef::new("Max", ColumnType::Number))
        .unwrap();
    table
        .add_column(ColumnDef::new("Profile", ColumnType::Text))
        .unwrap();
    table
        .from_csv(
            "Material,Min,Max,Profile\n\
             Steel,0,100,HEA 100\n\
             Steel,100,200,HEA 200\n\
             Timber,0,300,GL24h\n",
        )
        .unwrap();
    table
}

fn setup() -> DynBlockApi<MemBackend> {
    let mut api = DynBlockApi::new(MemBackend::new(), DynBlockConfig::default());
    api.create_parameter(PARAM, ParameterRecord::new("Span"), Point3::default())
        .unwrap();
    api.create_selection_set("Frame", [Handle::new(1), Handle::new(2)])
        .unwrap();
    api.create_lookup_action_for_set(
        ACTION,
        "Frame",
        NewLookupAction {
            name: "Profile".into(),
            description: "Pick a profile by span".into(),
            parameter: PARAM,
            targets: SelectionSetRef::new(),
            table: beams(),
            values_column: "Material".into(),
        },
    )
    .unwrap();
    api
}

#[test]
fn created_action_is_stored_as_four_records() {
    let api = setup();
    let mut stored = api.store().record_names(ACTION).unwrap();
    stored.sort();
    assert_eq!(
        stored,
        vec![
            names::ACTION,
            names::LOOKUP_TABLE,
            names::LOOKUP_VALUES,
            names::SELECTION_SET
        ]
    );

    let action = api.load_action(ACTION).unwrap();
    assert_eq!(action.values.0, vec!["Steel", "Timber"]);
    assert_eq!(action.table, beams());
    assert_eq!(action.selection.handles(), &[Handle::new(1), Handle::new(2)]);
}

#[test]
fn range_resolution_returns_profile_and_targets() {
    let api = setup();
    let config = MatchConfig::range("Min", "Max", "Profile");
    let resolved = api.resolve_action_with(ACTION, "150", &config).unwrap();
    assert_eq!(resolved.parameter, PARAM);
    assert_eq!(resolved.targets, vec![Handle::new(1), Handle::new(2)]);
    assert_eq!(
        resolved.resolution.outcome.value().as_deref(),
        Some("HEA 200")
    );
}

#[test]
fn exact_resolution_falls_back_to_default() {
    let api = setup();
    let config =
        MatchConfig::new("Material", "Profile", MatchStrategy::Exact).with_default("none");
    let resolved = api.resolve_action_with(ACTION, "Concrete", &config).unwrap();
    assert_eq!(
        resolved.resolution.outcome,
        MatchOutcome::Default {
            value: "none".into()
        }
    );
}

#[test]
fn disabled_action_does_not_resolve() {
    let api = setup();
    api.disable_action(ACTION).unwrap();
    let err = api
        .resolve_action(ACTION, "Steel", "Material", "Profile", None)
        .unwrap_err();
    assert!(matches!(
        err,
        DynBlockError::Reference(ReferenceError::ActionDisabled(h)) if h == ACTION
    ));

    api.enable_action(ACTION).unwrap();
    assert!(api
        .resolve_action(ACTION, "Steel", "Material", "Profile", None)
        .is_ok());
}

#[test]
fn deleting_the_parameter_leaves_a_dangling_action() {
    let api = setup();
    api.delete_parameter(PARAM).unwrap();
    let err = api
        .resolve_action(ACTION, "Steel", "Material", "Profile", None)
        .unwrap_err();
    assert!(matches!(
        err,
        DynBlockError::Reference(ReferenceError::DanglingReference(h)) if h == PARAM
    ));
}

#[test]
fn scans_report_what_is_stored() {
    let api = setup();
    let params = api.find_all_parameters().unwrap();
    assert_eq!(params.handles().collect::<Vec<_>>(), vec![PARAM]);
    let actions = api.find_all_actions().unwrap();
    assert_eq!(actions.handles().collect::<Vec<_>>(), vec![ACTION]);
    assert!(actions.skipped.is_empty());

    api.delete_action(ACTION).unwrap();
    assert!(api.find_all_actions().unwrap().found.is_empty());
}

#[test]
fn resolution_serializes_for_clients() {
    let api = setup();
    let config = MatchConfig::new("Material", "Profile", MatchStrategy::Fuzzy);
    let resolved = api.resolve_action_with(ACTION, "tim", &config).unwrap();
    let json = serde_json::to_value(&resolved).unwrap();
    assert_eq!(json["resolution"]["outcome"]["outcome"], "matched");
    assert_eq!(json["resolution"]["outcome"]["row"], 2);
}
