use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use raciscan::export;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Parse any RACI spreadsheet into a canonical model plus diagnostics"
)]
struct Args {
    /// Path to a delimited RACI spreadsheet (.csv, .tsv, .txt)
    file: PathBuf,

    /// Sheet name (only meaningful for workbook sources)
    #[arg(short, long)]
    sheet: Option<String>,

    /// Write the parsed model as pretty JSON
    #[arg(short, long, value_name = "OUTPUT.json")]
    json: Option<PathBuf>,

    /// Write the relational CSV kit (roles/capabilities/assignments)
    #[arg(short, long, value_name = "OUTPUT_DIR")]
    tables: Option<PathBuf>,
}

fn main() -> ExitCode {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env).init();

    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<()> {
    info!(file = %args.file.display(), "parsing");
    if args.sheet.is_some() {
        info!("sheet selection applies to workbook sources; delimited files have a single sheet");
    }

    let data = raciscan::parse_path(&args.file)
        .with_context(|| format!("parsing {}", args.file.display()))?;

    print_report(&data);

    if let Some(path) = &args.json {
        export::write_json(&data, path)?;
        println!("\n  JSON exported to: {}", path.display());
    }
    if let Some(dir) = &args.tables {
        let files = export::export_tables(&data, dir)?;
        println!("\n  CSV tables exported to: {}/", dir.display());
        for f in &files {
            if let Some(name) = f.file_name() {
                println!("    - {}", name.to_string_lossy());
            }
        }
    }

    Ok(())
}

fn print_report(data: &raciscan::ParseOutput) {
    let report = &data.meta.report;

    println!("\n  Sheet:        {}", data.meta.sheet);
    println!("  Roles:        {}", report.role_count);
    println!("  Categories:   {}", report.category_count);
    println!("  Capabilities: {}", report.capability_count);
    if report.has_maturity {
        println!("  Maturity:     detected (scale 0-{})", report.maturity_scale);
    }

    if !report.orphaned_capabilities.is_empty() {
        println!(
            "\n  Warning: {} capabilities with no R assigned:",
            report.orphaned_capabilities.len()
        );
        for cap in report.orphaned_capabilities.iter().take(10) {
            println!("    - {cap}");
        }
        if report.orphaned_capabilities.len() > 10 {
            println!("    ... and {} more", report.orphaned_capabilities.len() - 10);
        }
    }
    if !report.zero_r_roles.is_empty() {
        println!(
            "\n  Warning: Roles with zero R assignments: {}",
            report.zero_r_roles.join(", ")
        );
    }

    if !report.column_classifications.is_empty() {
        println!("\n  Column classifications:");
        for (ci, info) in &report.column_classifications {
            println!(
                "    Col {ci}: {:30} → {}",
                format!("{:?}", info.header),
                info.classification.as_str()
            );
        }
    }
}
