//! csvtable Command-Line Interface
//!
//! A CLI tool for inspecting and converting CSV tables.
//!
//! # Commands
//!
//! - `info` - Display table shape
//! - `get` - Read one element
//! - `interpolate` - Interpolate a value column at a key
//! - `convert` - Re-encode a table with a canonical separator
//! - `group` - Group rows by their first field

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use clap::{Parser, Subcommand};
use csvtable::codec::is_valid_separator;
use csvtable::{decode_dictionary, encode_dictionary, TableConfig, TableRegistry};
use serde::Serialize;
use tracing_subscriber::FmtSubscriber;

/// csvtable CLI - Command-line interface for numeric CSV tables
#[derive(Parser, Debug)]
#[command(name = "csvtable")]
#[command(author, version, about = "Numeric CSV table CLI", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show table shape
    Info {
        /// Path to CSV file
        path: String,
        /// Leading lines to skip
        #[arg(short, long, default_value = "0")]
        skip: usize,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Read one element
    Get {
        /// Path to CSV file
        path: String,
        /// Row index
        row: usize,
        /// Column index
        col: usize,
        /// Leading lines to skip
        #[arg(short, long, default_value = "0")]
        skip: usize,
    },
    /// Interpolate a value column at a key
    Interpolate {
        /// Path to CSV file
        path: String,
        /// Key to look up
        #[arg(allow_hyphen_values = true)]
        key: f64,
        /// Column holding the sorted keys
        #[arg(short, long, default_value = "0")]
        key_col: usize,
        /// Column holding the values
        #[arg(short = 'c', long, default_value = "1")]
        value_col: usize,
        /// Leading lines to skip
        #[arg(short, long, default_value = "0")]
        skip: usize,
    },
    /// Re-encode a table
    Convert {
        /// Input CSV file
        input: String,
        /// Output CSV file
        output: String,
        /// Leading lines to skip
        #[arg(short, long, default_value = "0")]
        skip: usize,
        /// Separator written between elements
        #[arg(short = 'S', long, default_value = ",", value_parser = parse_separator)]
        separator: char,
    },
    /// Group rows by their first field
    Group {
        /// Input CSV file
        input: String,
        /// Output CSV file
        output: String,
        /// Separator written between elements
        #[arg(short = 'S', long, default_value = ",", value_parser = parse_separator)]
        separator: char,
    },
}

/// Accepts one character that cannot be mistaken for part of a number.
fn parse_separator(value: &str) -> Result<char, String> {
    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if is_valid_separator(c) => Ok(c),
        (Some(_), None) => Err(format!("'{}' is not a usable separator", value)),
        _ => Err("expected a single character".to_string()),
    }
}

fn main() {
    let cli = Cli::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(if cli.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::WARN
        })
        .with_writer(std::io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Warning: failed to install logger: {}", e);
    }

    let result = match cli.command {
        Commands::Info { path, skip, json } => cmd_info(&path, skip, json),
        Commands::Get {
            path,
            row,
            col,
            skip,
        } => cmd_get(&path, row, col, skip),
        Commands::Interpolate {
            path,
            key,
            key_col,
            value_col,
            skip,
        } => cmd_interpolate(&path, key, key_col, value_col, skip),
        Commands::Convert {
            input,
            output,
            skip,
            separator,
        } => cmd_convert(&input, &output, skip, separator),
        Commands::Group {
            input,
            output,
            separator,
        } => cmd_group(&input, &output, separator),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn require_file(path: &str) -> Result<(), Box<dyn std::error::Error>> {
    if !Path::new(path).exists() {
        return Err(format!("File not found: {}", path).into());
    }
    Ok(())
}

/// Shape summary printed by `info`.
#[derive(Serialize, Debug)]
struct TableInfo<'a> {
    path: &'a str,
    rows: usize,
    cols: usize,
    min_width: usize,
    max_width: usize,
}

/// Display table shape
fn cmd_info(path: &str, skip: usize, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    require_file(path)?;

    let mut registry = TableRegistry::new();
    let id = registry.load_file(path, skip)?;
    let (min_width, max_width) = registry.width_range(id)?.unwrap_or((0, 0));
    let info = TableInfo {
        path,
        rows: registry.row_count(id)?,
        cols: registry.col_count(id)?,
        min_width,
        max_width,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    println!("Table: {}", info.path);
    println!("Rows: {}", info.rows);
    println!("Columns (first row): {}", info.cols);
    if info.min_width == info.max_width {
        println!("Row width: {}", info.max_width);
    } else {
        println!("Row width: {} to {} (ragged)", info.min_width, info.max_width);
    }

    Ok(())
}

/// Read one element
fn cmd_get(
    path: &str,
    row: usize,
    col: usize,
    skip: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    require_file(path)?;

    let mut registry = TableRegistry::new();
    let id = registry.load_file(path, skip)?;
    println!("{}", registry.read(id, row, col)?);

    Ok(())
}

/// Interpolate a value column at a key
fn cmd_interpolate(
    path: &str,
    key: f64,
    key_col: usize,
    value_col: usize,
    skip: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    require_file(path)?;

    let mut registry = TableRegistry::new();
    let id = registry.load_file(path, skip)?;
    println!("{}", registry.interpolate(id, key, key_col, value_col)?);

    Ok(())
}

/// Re-encode a table
fn cmd_convert(
    input: &str,
    output: &str,
    skip: usize,
    separator: char,
) -> Result<(), Box<dyn std::error::Error>> {
    require_file(input)?;

    let mut registry = TableRegistry::with_config(TableConfig {
        separator,
        ..Default::default()
    });
    let id = registry.load_file(input, skip)?;
    let rows = registry.save_file(id, output)?;
    println!("Wrote {} rows to {}", rows, output);

    Ok(())
}

/// Group rows by their first field
fn cmd_group(input: &str, output: &str, separator: char) -> Result<(), Box<dyn std::error::Error>> {
    require_file(input)?;

    let dict = decode_dictionary(BufReader::new(File::open(input)?))?;
    encode_dictionary(BufWriter::new(File::create(output)?), &dict, separator)?;
    println!("Wrote {} keys to {}", dict.len(), output);

    Ok(())
}
