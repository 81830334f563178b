//! `phreeqc` CLI — inspect and index PHREEQC selected output.
//!
//! ## Usage
//!
//! ```sh
//! # Shape of a selected-output table stored as JSON
//! phreeqc shape -i output.json
//!
//! # Index it like `table[0, 1:4]`
//! phreeqc select "0,1:4" -i output.json
//!
//! # Heading row and component names
//! phreeqc headings -i output.json
//! phreeqc components -i output.json
//!
//! # Run a script through IPhreeqc (built with --features iphreeqc)
//! phreeqc run --database phreeqc.dat -i ex11.pqi --select "1:,:"
//! ```
//!
//! Table files hold either a JSON array of rows or an object with `rows`
//! and `components`. Cells are null, numbers or strings.

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use phreeqc_core::{DatabaseConfig, Engine, MemoryEngine, Phreeqc, TableIndex};
use std::io::{self, Read};
use std::path::PathBuf;
use tracing::{debug, Level};

type BoxedEngine = Box<dyn Engine + Send + Sync>;

#[derive(Parser)]
#[command(
    name = "phreeqc",
    version,
    about = "Inspect and index PHREEQC selected output"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the (rows, columns) shape of a table
    Shape {
        /// Input JSON table (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
    },
    /// Index a table with `row` or `row,col` keys, e.g. "0,1:4"
    Select {
        /// Index expression: integers or start:stop:step slices
        #[arg(allow_hyphen_values = true)]
        index: String,
        /// Input JSON table (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
        /// Emit compact JSON instead of pretty-printed
        #[arg(long)]
        compact: bool,
    },
    /// Print the heading row (row 0) as JSON
    Headings {
        /// Input JSON table (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
    },
    /// List component names, one per line
    Components {
        /// Input JSON table (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
    },
    /// Run a PHREEQC script and print (part of) its selected output
    Run {
        /// Database file name
        #[arg(long, default_value = phreeqc_core::config::DEFAULT_DATABASE)]
        database: String,
        /// Directory holding the database (default: $PHREEQC_DATABASE_DIR or ./database)
        #[arg(long)]
        database_dir: Option<PathBuf>,
        /// PHREEQC input script (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Index expression applied to the selected output
        #[arg(long, default_value = ":", allow_hyphen_values = true)]
        select: String,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet)?;

    match cli.command {
        Commands::Shape { input } => {
            let table = load_table(input.as_deref())?;
            let (rows, columns) = table.shape()?;
            println!("Rows:     {}", rows);
            println!("Columns:  {}", columns);
        }
        Commands::Select {
            index,
            input,
            output,
            compact,
        } => {
            let index = parse_index(&index)?;
            let table = load_table(input.as_deref())?;
            let selection = table
                .get(index)
                .with_context(|| format!("Failed to index table with [{}]", index))?;
            let json = if compact {
                serde_json::to_string(&selection)?
            } else {
                serde_json::to_string_pretty(&selection)?
            };
            write_output(output.as_deref(), &json)?;
        }
        Commands::Headings { input } => {
            let table = load_table(input.as_deref())?;
            let headings = table.headings().context("Failed to read heading row")?;
            println!("{}", serde_json::to_string(&headings)?);
        }
        Commands::Components { input } => {
            let table = load_table(input.as_deref())?;
            for component in table.components()? {
                println!("{}", component);
            }
        }
        Commands::Run {
            database,
            database_dir,
            input,
            select,
            output,
        } => {
            let index = parse_index(&select)?;
            let mut config = DatabaseConfig::new(database);
            if let Some(dir) = database_dir {
                config = config.with_directory(dir);
            }
            let script = read_input(input.as_deref())?;

            let mut phreeqc = Phreeqc::with_database(native_engine()?, &config)
                .with_context(|| format!("Failed to load database {}", config.path().display()))?;
            phreeqc
                .run_string(&script)
                .context("Failed to run PHREEQC input")?;

            let selection = phreeqc.get(index)?;
            write_output(output.as_deref(), &serde_json::to_string_pretty(&selection)?)?;
        }
    }

    Ok(())
}

/// Install a stderr fmt subscriber. Default level is WARN.
fn init_tracing(verbose: u8, quiet: bool) -> Result<()> {
    let level = match (quiet, verbose) {
        (true, _) => Level::ERROR,
        (false, 0) => Level::WARN,
        (false, 1) => Level::DEBUG,
        (false, _) => Level::TRACE,
    };
    let subscriber = tracing_subscriber::fmt()
        .compact()
        .with_target(false)
        .with_max_level(level)
        .with_writer(io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn parse_index(text: &str) -> Result<TableIndex> {
    text.parse::<TableIndex>()
        .with_context(|| format!("Invalid index expression: '{}'", text))
}

fn load_table(path: Option<&str>) -> Result<Phreeqc<MemoryEngine>> {
    let engine = match path {
        Some(path) => MemoryEngine::from_json_file(path)
            .with_context(|| format!("Failed to read file: {}", path))?,
        None => MemoryEngine::from_json(&read_input(None)?).context("Failed to parse JSON table")?,
    };
    debug!(rows = engine.selected_output_row_count()?, "loaded table");
    Ok(Phreeqc::new(engine))
}

#[cfg(feature = "iphreeqc")]
fn native_engine() -> Result<BoxedEngine> {
    let engine = phreeqc_core::IPhreeqc::new().context("Failed to create IPhreeqc instance")?;
    Ok(Box::new(engine))
}

#[cfg(not(feature = "iphreeqc"))]
fn native_engine() -> Result<BoxedEngine> {
    anyhow::bail!("`run` needs IPhreeqc: rebuild phreeqc-cli with --features iphreeqc")
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}

fn write_output(path: Option<&str>, content: &str) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write file: {}", path))?;
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
