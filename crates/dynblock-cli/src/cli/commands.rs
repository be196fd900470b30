//! # Dispatch
//!
//! `run` parses arguments, installs logging, loads configuration and hands
//! the command to its handler. Handlers read files, call the library through
//! [`DynBlockApi`] and print what `render` gives back.
//!
//! Configuration is merged from the user config directory and then the
//! current directory, so a `dynblock.toml` next to the data wins.
//! `DYNBLOCK_CONFIG_DIR` replaces the user config directory.

use super::render;
use super::setup::{Cli, Commands, PropertyArgs, TableArgs};
use clap::Parser;
use directories::ProjectDirs;
use dynblock::api::DynBlockApi;
use dynblock::config::{load_config, DynBlockConfig};
use dynblock::error::{Result, SchemaError};
use dynblock::matching::{self, MatchStrategy};
use dynblock::store::MemBackend;
use dynblock::table::{read_csv_header, ColumnDef, ColumnType, LookupTable};
use dynblock::validation::{validate_value, ParameterProperty, ValidationResult};
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::EnvFilter;

const CONFIG_DIR_ENV: &str = "DYNBLOCK_CONFIG_DIR";

type Api = DynBlockApi<MemBackend>;

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let dirs = config_dirs();
    debug!(?dirs, "loading configuration");
    let api = DynBlockApi::new(MemBackend::new(), load_config(&dirs));

    match cli.command {
        Commands::Show { table } => handle_show(&table, cli.json),
        Commands::Duplicates { table } => handle_duplicates(&api, &table, cli.json),
        Commands::Optimize { table, output } => {
            handle_optimize(&api, &table, output.as_deref(), cli.json)
        }
        Commands::Match {
            table,
            input,
            input_columns,
            output_columns,
            strategy,
            default,
            case_sensitive,
        } => {
            let request = MatchRequest {
                input,
                input_columns,
                output_columns,
                strategy,
                default,
                case_sensitive,
            };
            handle_match(&api, &table, request, cli.json)
        }
        Commands::ValidateProperty(args) => handle_validate_property(&api, args, cli.json),
        Commands::Config => handle_config(api.config(), cli.json),
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Config search directories, lowest priority first.
fn config_dirs() -> Vec<PathBuf> {
    let mut dirs = Vec::new();
    match std::env::var_os(CONFIG_DIR_ENV) {
        Some(dir) => dirs.push(PathBuf::from(dir)),
        None => {
            if let Some(project) = ProjectDirs::from("com", "dynblock", "dynblock") {
                dirs.push(project.config_dir().to_path_buf());
            }
        }
    }
    if let Ok(cwd) = std::env::current_dir() {
        dirs.push(cwd);
    }
    dirs
}

/// Read a CSV file into a table typed by the `--schema` entries.
fn load_table(args: &TableArgs) -> Result<LookupTable> {
    let text = fs::read_to_string(&args.csv)?;
    let header = read_csv_header(&text)?;

    if let Some(entry) = args.schema.iter().find(|e| !header.contains(&e.name)) {
        return Err(SchemaError::UnknownColumn(entry.name.clone()).into());
    }

    let name = args
        .csv
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut table = LookupTable::new(name);
    for column in &header {
        let def = match args.schema.iter().find(|e| &e.name == column) {
            Some(entry) if entry.required => {
                ColumnDef::new(column.as_str(), entry.column_type).required()
            }
            Some(entry) => ColumnDef::new(column.as_str(), entry.column_type),
            None => ColumnDef::new(column.as_str(), ColumnType::Text),
        };
        table.add_column(def)?;
    }

    let rows = table.from_csv(&text)?;
    debug!(path = %args.csv.display(), rows, "loaded table");
    Ok(table)
}

fn handle_show(args: &TableArgs, json: bool) -> Result<()> {
    let table = load_table(args)?;
    if json {
        print!("{}", render::json(&table)?);
    } else {
        print!("{}", render::table(&table));
    }
    Ok(())
}

fn handle_duplicates(api: &Api, args: &TableArgs, json: bool) -> Result<()> {
    let table = load_table(args)?;
    let groups = api.find_duplicates(&table);
    if json {
        print!("{}", render::json(&json!({ "groups": groups }))?);
    } else {
        print!("{}", render::duplicates(&groups));
    }
    Ok(())
}

fn handle_optimize(api: &Api, args: &TableArgs, output: Option<&Path>, json: bool) -> Result<()> {
    let mut table = load_table(args)?;
    let removed = api.optimize_table(&mut table);
    let csv = table.to_csv()?;

    if let Some(path) = output {
        fs::write(path, &csv)?;
    }
    if json {
        let mut report = json!({ "removed": removed, "rows": table.len() });
        if output.is_none() {
            report["csv"] = json!(csv);
        }
        print!("{}", render::json(&report)?);
    } else {
        if output.is_none() {
            print!("{csv}");
        }
        eprint!("{}", render::removed(removed));
    }
    Ok(())
}

struct MatchRequest {
    input: String,
    input_columns: Vec<String>,
    output_columns: Vec<String>,
    strategy: Option<MatchStrategy>,
    default: Option<String>,
    case_sensitive: bool,
}

fn handle_match(api: &Api, args: &TableArgs, request: MatchRequest, json: bool) -> Result<()> {
    let table = load_table(args)?;

    let mut config = api.config().match_config(
        &request.input_columns[0],
        &request.output_columns[0],
        request.strategy,
    );
    config.input_columns = request.input_columns;
    config.output_columns = request.output_columns;
    config.default_result = request.default;
    if request.case_sensitive {
        config = config.case_sensitive();
    }

    let resolution = matching::resolve(&table, &request.input, &config)?;
    if json {
        print!("{}", render::json(&resolution)?);
    } else {
        print!("{}", render::resolution(&resolution));
    }
    Ok(())
}

fn handle_validate_property(api: &Api, args: PropertyArgs, json: bool) -> Result<()> {
    let property = ParameterProperty {
        name: args.name,
        type_name: args.type_name,
        default: args.default,
        min: args.min,
        max: args.max,
        allowed_values: args.allowed,
        regex_pattern: args.pattern,
        required: args.required,
    };

    let checked = api.validate_property(&property);
    // A value is only meaningful against a valid property.
    let value = match &args.value {
        Some(text) if checked.is_valid => Some((text, validate_value(&property, text))),
        _ => None,
    };

    if json {
        let report = json!({
            "property": checked,
            "value": value.as_ref().map(|(_, result)| result),
        });
        print!("{}", render::json(&report)?);
    } else {
        print!("{}", render::validation(&property.name, &checked));
        if let Some((text, result)) = &value {
            print!("{}", render::validation(&format!("'{text}'"), result));
        }
    }

    validation_outcome(&property.name, &checked, value.map(|(_, result)| result))
}

/// Turn printed validation results into the command's exit status.
fn validation_outcome(
    name: &str,
    property: &ValidationResult,
    value: Option<ValidationResult>,
) -> Result<()> {
    if !property.is_valid {
        return Err(SchemaError::InvalidProperty(property.errors.clone()).into());
    }
    match value {
        Some(result) if !result.is_valid => Err(SchemaError::ConstraintViolation {
            column: name.to_string(),
            reason: result.errors.join("; "),
        }
        .into()),
        _ => Ok(()),
    }
}

fn handle_config(config: &DynBlockConfig, json: bool) -> Result<()> {
    if json {
        print!("{}", render::json(config)?);
    } else {
        print!("{}", render::config(config)?);
    }
    Ok(())
}
