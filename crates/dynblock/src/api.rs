//! # API Facade
//!
//! A thin facade over the command layer and the single entry point for
//! hosts and UIs. It dispatches to [`commands`], fills in settings from
//! [`DynBlockConfig`], and owns the named selection sets.
//!
//! ## Selection Context
//!
//! Named selection sets live in a [`SelectionSetManager`] owned by the API
//! instance, never in process-wide state. Their lifetime is the API's, and a
//! lookup action created from a named set stores its own copy of the members.
//!
//! ## Generic Over the Backend
//!
//! `DynBlockApi<B: AttributeBackend>` works with any host backend; tests and
//! the command-line client use [`MemBackend`](crate::store::MemBackend).

use crate::commands::action::NewLookupAction;
use crate::commands::resolve::ActionResolution;
use crate::commands::scan::ScanReport;
use crate::commands::{self, CmdResult};
use crate::config::DynBlockConfig;
use crate::error::{Result, SchemaError};
use crate::matching::{MatchConfig, MatchStrategy};
use crate::model::Handle;
use crate::records::{
    GripRecord, LookupAction, ParameterRecord, Point3, SelectionSetManager, SelectionSetRef,
};
use crate::store::{AttributeBackend, AttributeStore};
use crate::table::LookupTable;
use crate::validation::{self, ParameterProperty, ValidationResult};

pub struct DynBlockApi<B: AttributeBackend> {
    store: AttributeStore<B>,
    config: DynBlockConfig,
    selections: SelectionSetManager,
}

impl<B: AttributeBackend> DynBlockApi<B> {
    pub fn new(backend: B, config: DynBlockConfig) -> Self {
        Self {
            store: AttributeStore::with_backend(backend),
            config,
            selections: SelectionSetManager::new(),
        }
    }

    pub fn store(&self) -> &AttributeStore<B> {
        &self.store
    }

    pub fn config(&self) -> &DynBlockConfig {
        &self.config
    }

    pub fn selections(&self) -> &SelectionSetManager {
        &self.selections
    }

    // --- Parameters ---

    pub fn create_parameter(
        &self,
        handle: Handle,
        record: ParameterRecord,
        location: Point3,
    ) -> Result<CmdResult> {
        commands::parameter::create(&self.store, &self.config, handle, record, location)
    }

    pub fn get_parameter(&self, handle: Handle) -> Result<ParameterRecord> {
        commands::parameter::get(&self.store, handle)
    }

    pub fn parameter_grips(&self, handle: Handle) -> Result<Vec<GripRecord>> {
        commands::parameter::grips(&self.store, handle)
    }

    pub fn rename_parameter(&self, handle: Handle, name: &str) -> Result<CmdResult> {
        commands::parameter::rename(&self.store, handle, name)
    }

    pub fn relabel_parameter(&self, handle: Handle, label: &str) -> Result<CmdResult> {
        commands::parameter::relabel(&self.store, handle, label)
    }

    pub fn describe_parameter(&self, handle: Handle, description: &str) -> Result<CmdResult> {
        commands::parameter::describe(&self.store, handle, description)
    }

    pub fn delete_parameter(&self, handle: Handle) -> Result<CmdResult> {
        commands::parameter::delete(&self.store, handle)
    }

    pub fn find_all_parameters(&self) -> Result<ScanReport<ParameterRecord>> {
        commands::scan::find_all_parameters(&self.store)
    }

    // --- Lookup actions ---

    pub fn create_lookup_action(&self, handle: Handle, spec: NewLookupAction) -> Result<CmdResult> {
        commands::action::create(&self.store, handle, spec)
    }

    /// Create an action whose targets are a copy of the named selection set.
    pub fn create_lookup_action_for_set(
        &self,
        handle: Handle,
        set_name: &str,
        mut spec: NewLookupAction,
    ) -> Result<CmdResult> {
        spec.targets = self.selection_set(set_name)?.clone();
        commands::action::create(&self.store, handle, spec)
    }

    pub fn load_action(&self, handle: Handle) -> Result<LookupAction> {
        commands::action::load(&self.store, handle)
    }

    pub fn update_action_table(
        &self,
        handle: Handle,
        table: LookupTable,
        values_column: &str,
    ) -> Result<CmdResult> {
        commands::action::update_table(&self.store, handle, table, values_column)
    }

    pub fn set_action_targets(&self, handle: Handle, targets: SelectionSetRef) -> Result<CmdResult> {
        commands::action::set_targets(&self.store, handle, targets)
    }

    pub fn enable_action(&self, handle: Handle) -> Result<CmdResult> {
        commands::action::enable(&self.store, handle)
    }

    pub fn disable_action(&self, handle: Handle) -> Result<CmdResult> {
        commands::action::disable(&self.store, handle)
    }

    pub fn delete_action(&self, handle: Handle) -> Result<CmdResult> {
        commands::action::delete(&self.store, handle)
    }

    pub fn find_all_actions(&self) -> Result<ScanReport<LookupAction>> {
        commands::scan::find_all_actions(&self.store)
    }

    /// Resolve through one input and one output column, with the configured
    /// strategy unless `strategy` is given.
    pub fn resolve_action(
        &self,
        handle: Handle,
        input: &str,
        input_column: &str,
        output_column: &str,
        strategy: Option<MatchStrategy>,
    ) -> Result<ActionResolution> {
        let config = self
            .config
            .match_config(input_column, output_column, strategy);
        commands::resolve::run(&self.store, handle, input, &config)
    }

    pub fn resolve_action_with(
        &self,
        handle: Handle,
        input: &str,
        config: &MatchConfig,
    ) -> Result<ActionResolution> {
        commands::resolve::run(&self.store, handle, input, config)
    }

    // --- Selection sets ---

    pub fn create_selection_set<I>(&mut self, name: &str, handles: I) -> Result<&SelectionSetRef>
    where
        I: IntoIterator<Item = Handle>,
    {
        let set = self.selections.create(name)?;
        set.extend(handles);
        Ok(set)
    }

    pub fn selection_set(&self, name: &str) -> Result<&SelectionSetRef> {
        self.selections
            .get(name)
            .ok_or_else(|| SchemaError::UnknownName(name.to_string()).into())
    }

    pub fn add_to_selection_set(&mut self, name: &str, handle: Handle) -> Result<bool> {
        let set = self
            .selections
            .get_mut(name)
            .ok_or_else(|| SchemaError::UnknownName(name.to_string()))?;
        Ok(set.add(handle))
    }

    pub fn rename_selection_set(&mut self, from: &str, to: &str) -> Result<()> {
        Ok(self.selections.rename(from, to)?)
    }

    pub fn remove_selection_set(&mut self, name: &str) -> Result<SelectionSetRef> {
        self.selections
            .remove(name)
            .ok_or_else(|| SchemaError::UnknownName(name.to_string()).into())
    }

    pub fn selection_set_names(&self) -> Vec<String> {
        self.selections.names().map(str::to_string).collect()
    }

    // --- Tables and properties ---

    /// Duplicate groups, ignoring the configured identity column.
    pub fn find_duplicates(&self, table: &LookupTable) -> Vec<Vec<usize>> {
        table.find_duplicate_groups_excluding(&self.config.identity_column)
    }

    pub fn optimize_table(&self, table: &mut LookupTable) -> usize {
        table.optimize_excluding(&self.config.identity_column)
    }

    pub fn validate_property(&self, property: &ParameterProperty) -> ValidationResult {
        validation::validate_property(property)
    }
}
