//! # gridbook-cli
//!
//! Command-line interface for gridbook worksheets.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use gridbook_auth::AuthService;
use gridbook_http::{HttpFetcher, HttpMethod};
use gridbook_integrations::{run_integration, IntegrationDraft, IntegrationRegistry};
use gridbook_worksheet::{CellType, ImportOptions, Worksheet, WorksheetStore};
use indexmap::IndexMap;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// gridbook - spreadsheet-style worksheet manager
#[derive(Parser)]
#[command(name = "gridbook")]
#[command(author, version, about = "Worksheet data manager", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Import a CSV file into a new worksheet
    Import {
        /// CSV file to import
        file: PathBuf,

        /// Worksheet name (defaults to the file stem)
        #[arg(short, long)]
        name: Option<String>,

        /// Field delimiter
        #[arg(short, long, default_value = ",")]
        delimiter: char,

        /// Infer value types instead of importing everything as text
        #[arg(long)]
        infer_types: bool,
    },

    /// Pull rows from a JSON API into a new worksheet
    Fetch {
        /// Endpoint URL
        #[arg(long)]
        url: String,

        /// HTTP method (GET or POST)
        #[arg(long, default_value = "GET")]
        method: String,

        /// Request header (KEY=VALUE, repeatable)
        #[arg(short = 'H', long = "header", value_name = "KEY=VALUE")]
        headers: Vec<String>,

        /// Response field to column mapping (FIELD=COLUMN, repeatable)
        #[arg(short, long = "map", value_name = "FIELD=COLUMN", required = true)]
        map: Vec<String>,

        /// Worksheet name
        #[arg(short, long, default_value = "API Import")]
        name: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .init();
    }

    let mut auth = AuthService::new();
    auth.login("operator@gridbook.local", "local-session")?;

    match cli.command {
        Command::Import {
            file,
            name,
            delimiter,
            infer_types,
        } => run_import(&auth, &file, name.as_deref(), delimiter, infer_types),
        Command::Fetch {
            url,
            method,
            headers,
            map,
            name,
        } => run_fetch(&auth, url, &method, &headers, &map, &name).await,
    }
}

fn run_import(
    auth: &AuthService,
    file: &Path,
    name: Option<&str>,
    delimiter: char,
    infer_types: bool,
) -> Result<()> {
    if !delimiter.is_ascii() {
        bail!("Delimiter must be a single ASCII character");
    }

    let worksheet_name = match name {
        Some(name) => name.to_string(),
        None => file
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or("Imported")
            .to_string(),
    };

    let mut store = WorksheetStore::new();
    store.create_worksheet(&worksheet_name, auth.current_user())?;

    let options = ImportOptions::default()
        .with_delimiter(delimiter as u8)
        .with_type_inference(infer_types);
    let summary = store
        .import_csv_path(file, options, auth.current_user())
        .with_context(|| format!("Failed to import {}", file.display()))?;

    let worksheet = store
        .active_worksheet()
        .context("No active worksheet after import")?;
    print_worksheet(worksheet);
    println!(
        "{} {} rows, {} new columns into \"{}\"",
        "Imported".green().bold(),
        summary.rows_added,
        summary.columns_added,
        worksheet.name
    );
    Ok(())
}

async fn run_fetch(
    auth: &AuthService,
    url: String,
    method: &str,
    headers: &[String],
    map: &[String],
    name: &str,
) -> Result<()> {
    let method = parse_method(method)?;

    let mut store = WorksheetStore::new();
    let mut registry = IntegrationRegistry::new();
    let worksheet = store.create_worksheet(name, auth.current_user())?;

    // One text column per mapped field, in mapping order.
    let mut response_mapping = IndexMap::new();
    for pair in map {
        let (field, column_name) = split_pair(pair)
            .with_context(|| format!("Invalid mapping '{pair}'. Expected FIELD=COLUMN format"))?;
        let column = store.add_column(column_name, CellType::Text)?;
        response_mapping.insert(field.to_string(), column);
    }

    let mut header_map = HashMap::new();
    for pair in headers {
        let (key, value) = split_pair(pair)
            .with_context(|| format!("Invalid header '{pair}'. Expected KEY=VALUE format"))?;
        header_map.insert(key.to_string(), value.to_string());
    }

    let integration = registry.create(
        worksheet,
        IntegrationDraft {
            name: format!("fetch {url}"),
            url,
            method,
            headers: header_map,
            body: None,
            response_mapping,
            schedule: None,
        },
    );

    let fetcher = HttpFetcher::new()?;
    let outcome = run_integration(
        &mut store,
        &mut registry,
        &fetcher,
        worksheet,
        integration,
        auth.current_user(),
    )
    .await?;

    let worksheet = store
        .get(worksheet)
        .context("Worksheet disappeared after fetch")?;
    print_worksheet(worksheet);
    println!(
        "{} {} rows into \"{}\"",
        "Fetched".green().bold(),
        outcome.rows_added,
        worksheet.name
    );
    Ok(())
}

/// Parse an HTTP method name.
fn parse_method(method: &str) -> Result<HttpMethod> {
    match method.to_uppercase().as_str() {
        "GET" => Ok(HttpMethod::Get),
        "POST" => Ok(HttpMethod::Post),
        other => bail!("Unsupported method: {other}. Expected GET or POST"),
    }
}

/// Split a `KEY=VALUE` pair.
fn split_pair(pair: &str) -> Option<(&str, &str)> {
    pair.split_once('=')
        .filter(|(key, _)| !key.is_empty())
}

/// Render a worksheet as a fixed-width text table.
fn print_worksheet(worksheet: &Worksheet) {
    let mut widths: Vec<usize> = worksheet
        .columns
        .iter()
        .map(|column| column.name.len())
        .collect();

    let mut grid: Vec<Vec<String>> = Vec::with_capacity(worksheet.rows.len());
    for row in &worksheet.rows {
        let mut cells = Vec::with_capacity(worksheet.columns.len());
        for (index, column) in worksheet.columns.iter().enumerate() {
            let text = row.value(column.id).to_string();
            widths[index] = widths[index].max(text.len());
            cells.push(text);
        }
        grid.push(cells);
    }

    let header = worksheet
        .columns
        .iter()
        .zip(widths.iter().copied())
        .map(|(column, width)| format!("{:<width$}", column.name))
        .collect::<Vec<_>>()
        .join("  ");
    println!("{}", header.bold());

    for cells in &grid {
        let line = cells
            .iter()
            .zip(widths.iter().copied())
            .map(|(text, width)| format!("{text:<width$}"))
            .collect::<Vec<_>>()
            .join("  ");
        println!("{line}");
    }
}
