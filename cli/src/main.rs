use std::io;
use std::path::{Path, PathBuf};

use checkin_roster_core::RosterLayout;
use checkin_roster_sqlite::{ImportReport, Importer, Migration, MigrationStatus, open_store};
use clap::Parser;
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "roster-import")]
#[command(version)]
#[command(about = "Import a registration-form CSV roster into the student check-in database")]
struct Cli {
    /// Roster CSV exported from the registration form.
    source: PathBuf,
    /// SQLite database file (created if missing).
    database: PathBuf,
    /// YAML file describing the roster column headers.
    #[arg(long)]
    layout: Option<PathBuf>,
    /// Number of child slots per guardian row (overrides the layout).
    #[arg(long)]
    max_children: Option<usize>,
    /// Parse and normalize the roster without touching the database.
    #[arg(long)]
    dry_run: bool,
    /// Print the import summary as JSON.
    #[arg(long)]
    json: bool,
    /// Increase log verbosity (-v info, -vv debug). `RUST_LOG` takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// JSON shape printed with `--json`.
#[derive(Debug, Serialize)]
struct JsonSummary<'a> {
    import: &'a ImportReport,
    status: Option<&'a MigrationStatus>,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(err) = run(cli) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<(), String> {
    let layout = load_layout(&cli)?;
    debug!(max_children = layout.max_children, "using roster layout");

    let report = Importer::new(layout)
        .dry_run(cli.dry_run)
        .run(&cli.source, &cli.database)
        .map_err(|e| format!("Import failed: {e}"))?;

    let status = if report.dry_run {
        None
    } else {
        Some(read_status(&cli.database)?)
    };

    if cli.json {
        let summary = JsonSummary {
            import: &report,
            status: status.as_ref(),
        };
        let raw = serde_json::to_string_pretty(&summary)
            .map_err(|e| format!("Failed to serialize import summary: {e}"))?;
        println!("{raw}");
        return Ok(());
    }

    print_report(&cli, &report, status.as_ref());
    Ok(())
}

fn load_layout(cli: &Cli) -> Result<RosterLayout, String> {
    let mut layout = match &cli.layout {
        Some(path) => RosterLayout::load(path)
            .map_err(|e| format!("Failed to load layout '{}': {e}", path.display()))?,
        None => RosterLayout::default(),
    };
    if let Some(max_children) = cli.max_children {
        layout = layout.with_max_children(max_children);
        layout
            .validate()
            .map_err(|e| format!("Invalid --max-children: {e}"))?;
    }
    Ok(layout)
}

fn read_status(database: &Path) -> Result<MigrationStatus, String> {
    let conn = open_store(database).map_err(|e| e.to_string())?;
    let migration =
        Migration::new(conn).map_err(|e| format!("Failed to initialize migration: {e}"))?;
    migration
        .status()
        .map_err(|e| format!("Failed to get migration status: {e}"))
}

fn print_report(cli: &Cli, report: &ImportReport, status: Option<&MigrationStatus>) {
    if report.dry_run {
        println!(
            "Dry run: {} row(s) read, {} student(s) would be imported from '{}'.",
            report.rows_read,
            report.students.len(),
            cli.source.display()
        );
        for student in &report.students {
            println!(
                "  {} ({})",
                student.name,
                student.grade.as_deref().unwrap_or("-")
            );
        }
    } else {
        println!(
            "Imported {} student(s) from {} row(s) into '{}'.",
            report.students_inserted,
            report.rows_read,
            cli.database.display()
        );
    }

    if report.slots_skipped > 0 {
        println!(
            "  Skipped {} incomplete child slot(s) (name or grade missing).",
            report.slots_skipped
        );
    }
    for column in &report.migrations.columns_added {
        println!("  Added column: {column}");
    }

    if let Some(status) = status {
        println!(
            "  Schema version: {}",
            status
                .schema_version
                .map_or_else(|| "none".to_string(), |v| v.to_string())
        );
        println!("  Students in database: {}", status.student_count);
    }
}
