use clap::{Args, Parser, Subcommand};
use dynblock::matching::MatchStrategy;
use dynblock::table::ColumnType;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "dynblock",
    bin_name = "dynblock",
    version,
    disable_help_subcommand = true
)]
#[command(about = "Inspect, clean and query dynamic block lookup tables", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Print JSON instead of formatted text
    #[arg(long, global = true, help_heading = "Options")]
    pub json: bool,

    /// Verbose output
    #[arg(short, long, global = true, help_heading = "Options")]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print a table
    #[command(display_order = 1)]
    Show {
        #[command(flatten)]
        table: TableArgs,
    },

    /// List groups of rows that differ only in the identity column
    #[command(display_order = 2)]
    Duplicates {
        #[command(flatten)]
        table: TableArgs,
    },

    /// Remove duplicate rows, keeping the first of each group
    #[command(display_order = 3)]
    Optimize {
        #[command(flatten)]
        table: TableArgs,

        /// Write the result here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Resolve an input against a table
    #[command(name = "match", display_order = 4)]
    Match {
        #[command(flatten)]
        table: TableArgs,

        /// Value to look up
        input: String,

        /// Column compared against the input (twice for range min/max)
        #[arg(long = "input-col", required = true, num_args = 1)]
        input_columns: Vec<String>,

        /// Column returned on a match (repeatable)
        #[arg(long = "output-col", required = true, num_args = 1)]
        output_columns: Vec<String>,

        /// exact, fuzzy, range or regex [default: from config]
        #[arg(short, long)]
        strategy: Option<MatchStrategy>,

        /// Result when no row matches
        #[arg(short, long)]
        default: Option<String>,

        /// Compile row patterns case sensitively (regex only)
        #[arg(long)]
        case_sensitive: bool,
    },

    /// Check a parameter property definition, and optionally a value
    #[command(name = "validate-property", display_order = 5)]
    ValidateProperty(PropertyArgs),

    /// Show the resolved configuration
    #[command(display_order = 6)]
    Config,
}

#[derive(Args, Debug)]
pub struct TableArgs {
    /// CSV file with a header row
    pub csv: PathBuf,

    /// Column type as name:type[:required] (repeatable)
    #[arg(long = "schema", value_name = "COLUMN", value_parser = parse_schema_entry)]
    pub schema: Vec<SchemaEntry>,
}

#[derive(Args, Debug)]
pub struct PropertyArgs {
    /// Property name
    #[arg(long)]
    pub name: String,

    /// text, number, boolean or datetime
    #[arg(long = "type", default_value = "text")]
    pub type_name: String,

    #[arg(long)]
    pub default: Option<String>,

    #[arg(long)]
    pub min: Option<String>,

    #[arg(long)]
    pub max: Option<String>,

    /// Allowed values, comma separated or repeated
    #[arg(long, value_delimiter = ',')]
    pub allowed: Vec<String>,

    /// Regular expression values must match
    #[arg(long)]
    pub pattern: Option<String>,

    #[arg(long)]
    pub required: bool,

    /// Also validate this value against the property
    #[arg(long)]
    pub value: Option<String>,
}

/// A `--schema` entry.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaEntry {
    pub name: String,
    pub column_type: ColumnType,
    pub required: bool,
}

pub fn parse_schema_entry(text: &str) -> Result<SchemaEntry, String> {
    let mut parts = text.split(':');
    let name = parts.next().unwrap_or_default().trim();
    if name.is_empty() {
        return Err(format!("'{text}': missing column name"));
    }
    let column_type = match parts.next() {
        Some(t) => t.parse::<ColumnType>()?,
        None => return Err(format!("'{text}': expected name:type[:required]")),
    };
    let required = match parts.next() {
        None => false,
        Some("required") => true,
        Some(other) => return Err(format!("'{text}': unknown flag '{other}'")),
    };
    if parts.next().is_some() {
        return Err(format!("'{text}': expected name:type[:required]"));
    }
    Ok(SchemaEntry {
        name: name.to_string(),
        column_type,
        required,
    })
}
