//! gridlite CLI
//!
//! Command-line tool for browsing SQLite tables, exporting them, and
//! applying batched edits.

use clap::{Parser, Subcommand};
use gridlite_core::{
    apply_script, export_csv, export_json, EditOp, EditScript, Store, TableModel,
};
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "gridlite-cli")]
#[command(about = "SQLite table browser and editor", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the tables in a database
    Tables {
        /// Path to the SQLite database file
        #[arg(short, long)]
        db: PathBuf,
    },

    /// Show the schema of a table
    Schema {
        /// Path to the SQLite database file
        #[arg(short, long)]
        db: PathBuf,

        /// Table name
        #[arg(short, long)]
        table: String,
    },

    /// Display a table's rows
    Show {
        /// Path to the SQLite database file
        #[arg(short, long)]
        db: PathBuf,

        /// Table name
        #[arg(short, long)]
        table: String,

        /// Maximum number of rows to display
        #[arg(short, long)]
        limit: Option<usize>,

        /// Columns to display (comma-separated)
        #[arg(short, long)]
        columns: Option<String>,
    },

    /// Export a table to a file
    Export {
        /// Path to the SQLite database file
        #[arg(short, long)]
        db: PathBuf,

        /// Table name
        #[arg(short, long)]
        table: String,

        /// Output format (csv or json)
        #[arg(long, default_value = "csv")]
        format: String,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Apply an edit script and commit the result
    Apply {
        /// Path to the SQLite database file
        #[arg(short, long)]
        db: PathBuf,

        /// Path to the edit script (JSON)
        #[arg(short, long)]
        script: PathBuf,

        /// Apply in memory and report, but do not commit
        #[arg(long)]
        dry_run: bool,
    },

    /// Create an edit script template
    CreateScript {
        /// Table name for the script
        #[arg(short, long)]
        table: String,

        /// Output path for the script file
        #[arg(short, long)]
        output: PathBuf,

        /// Example edits to include (row:column:value)
        #[arg(short, long)]
        example: Vec<String>,
    },
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> gridlite_core::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Tables { db } => cmd_tables(&db),
        Commands::Schema { db, table } => cmd_schema(&db, &table),
        Commands::Show {
            db,
            table,
            limit,
            columns,
        } => cmd_show(&db, &table, limit, columns),
        Commands::Export {
            db,
            table,
            format,
            output,
        } => cmd_export(&db, &table, &format, &output),
        Commands::Apply {
            db,
            script,
            dry_run,
        } => cmd_apply(&db, &script, dry_run),
        Commands::CreateScript {
            table,
            output,
            example,
        } => cmd_create_script(&table, &output, &example),
    }
}

fn cmd_tables(db: &PathBuf) -> gridlite_core::Result<()> {
    let store = Store::open(db)?;
    let names = store.table_names()?;

    println!("Tables ({}):", names.len());
    for name in &names {
        println!("  {}", name);
    }

    Ok(())
}

fn cmd_schema(db: &PathBuf, table: &str) -> gridlite_core::Result<()> {
    let store = Store::open(db)?;
    let sql = store.table_sql(table)?;
    let model = TableModel::load(store, table)?;

    println!("Table: {}", table);
    if let Some(sql) = sql {
        println!("{}", sql);
        println!();
    }

    println!("Columns:");
    for column in model.columns() {
        let pk_marker = if column.is_primary_key { " [pk]" } else { "" };
        println!(
            "  {} {} ({:?}){}",
            column.name, column.declared_type, column.kind, pk_marker
        );
    }

    Ok(())
}

fn cmd_show(
    db: &PathBuf,
    table: &str,
    limit: Option<usize>,
    columns: Option<String>,
) -> gridlite_core::Result<()> {
    let store = Store::open(db)?;
    let model = TableModel::load(store, table)?;

    // Filter columns if specified
    let col_filter: Option<Vec<&str>> = columns.as_ref().map(|c| c.split(',').collect());

    let display_cols: Vec<usize> = (0..model.column_count())
        .filter(|&i| match (&col_filter, model.column_name(i)) {
            (Some(filter), Some(name)) => filter.contains(&name),
            _ => true,
        })
        .collect();

    // Print header
    let header: Vec<&str> = display_cols
        .iter()
        .filter_map(|&i| model.column_name(i))
        .collect();
    println!("{}", header.join("\t"));
    println!("{}", "-".repeat(header.len() * 12));

    // Print rows
    let row_limit = limit.unwrap_or(model.row_count());
    for row in 0..model.row_count().min(row_limit) {
        let values: Vec<String> = display_cols.iter().map(|&c| model.cell(row, c)).collect();
        println!("{}", values.join("\t"));
    }

    if model.row_count() > row_limit {
        println!("... ({} more rows)", model.row_count() - row_limit);
    }

    Ok(())
}

fn cmd_export(
    db: &PathBuf,
    table: &str,
    format: &str,
    output: &PathBuf,
) -> gridlite_core::Result<()> {
    let store = Store::open(db)?;
    let model = TableModel::load(store, table)?;

    let file = File::create(output)?;
    let writer = BufWriter::new(file);

    match format.to_lowercase().as_str() {
        "csv" => export_csv(&model, writer)?,
        "json" => export_json(&model, writer)?,
        _ => {
            eprintln!("Unknown format: {}. Supported formats: csv, json", format);
            std::process::exit(1);
        }
    }

    println!("Exported {} rows to {}", model.row_count(), output.display());

    Ok(())
}

fn cmd_apply(db: &PathBuf, script_path: &PathBuf, dry_run: bool) -> gridlite_core::Result<()> {
    let script = EditScript::load(script_path)?;
    println!(
        "Loaded script for table '{}' with {} operations",
        script.table,
        script.ops.len()
    );

    let store = Store::open(db)?;
    let mut model = TableModel::load(store, &script.table)?;

    let report = apply_script(&mut model, &script);

    if !report.failed.is_empty() {
        println!("\nWarning: {} operations failed:", report.failed.len());
        for (op, reason) in &report.failed {
            println!("  - {:?}: {}", op, reason);
        }
    }

    println!("{} operations applied in memory", report.applied);

    if dry_run {
        println!(
            "Dry run: not committing ({} pending change{})",
            report.applied,
            if report.applied == 1 { "" } else { "s" }
        );
        return Ok(());
    }

    let outcome = model.commit();
    println!("{}", outcome.message());
    if !outcome.is_success() {
        std::process::exit(1);
    }

    Ok(())
}

fn cmd_create_script(
    table: &str,
    output: &PathBuf,
    examples: &[String],
) -> gridlite_core::Result<()> {
    let mut script = EditScript::new(table);

    // Parse example edits: "row:column:value"
    for example in examples {
        let parts: Vec<&str> = example.splitn(3, ':').collect();
        if parts.len() != 3 {
            eprintln!(
                "Warning: Invalid example format '{}', expected 'row:column:value'",
                example
            );
            continue;
        }

        let row: usize = match parts[0].parse() {
            Ok(r) => r,
            Err(_) => {
                eprintln!("Warning: Invalid row '{}' in example", parts[0]);
                continue;
            }
        };

        script.add_op(EditOp::Set {
            row,
            column: parts[1].to_string(),
            value: parts[2].to_string(),
        });
    }

    // If no examples provided, add a placeholder
    if script.ops.is_empty() {
        script.add_op(EditOp::Set {
            row: 0,
            column: "column_name".to_string(),
            value: "new_value".to_string(),
        });
    }

    script.save(output)?;
    println!("Created script file: {}", output.display());
    println!("Table: {}", table);
    println!("Operations: {}", script.ops.len());
    println!();
    println!("Edit the file to add your changes, then run:");
    println!(
        "  gridlite-cli apply --db <database> --script {}",
        output.display()
    );

    Ok(())
}
