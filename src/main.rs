use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use cohort_progress_tracker::{processor, report, summary};

#[derive(Parser)]
#[command(name = "tracker-report")]
#[command(about = "Weekly cohort progress report builder", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the multi-sheet xlsx report from a survey export
    Process {
        #[arg(long)]
        csv: PathBuf,
        /// Defaults to `<input stem>_report.xlsx` next to the input
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Print classified records as JSON
    Classify {
        #[arg(long)]
        csv: PathBuf,
        #[arg(long)]
        pretty: bool,
    },
    /// Print cohort summary statistics
    Summary {
        #[arg(long)]
        csv: PathBuf,
    },
}

fn read_export(path: &Path) -> anyhow::Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))
}

fn default_output_path(csv: &Path) -> PathBuf {
    let name = csv
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or_default();
    csv.with_file_name(processor::report_filename(name))
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("cohort_progress_tracker=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Process { csv, out } => {
            let data = read_export(&csv)?;
            let report = processor::try_process(&data)?;
            let out = out.unwrap_or_else(|| default_output_path(&csv));
            std::fs::write(&out, &report.workbook)
                .with_context(|| format!("failed to write {}", out.display()))?;

            println!("Tracker report written to {}.", out.display());
            println!(
                "- Run {} at {}",
                report.run_id,
                report.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
            );
            println!("- Students processed: {}", report.records.len());
            println!(
                "- On track {}, flagged {}, at risk {}",
                report.summary.on_track, report.summary.flagged, report.summary.at_risk
            );
            println!(
                "- Sheets: {}, {}, {}, {}, {}",
                report::MASTER_SHEET,
                report::AT_RISK_SHEET,
                report::FLAGGED_SHEET,
                report::ON_TRACK_SHEET,
                report::DASHBOARD_SHEET
            );
        }
        Commands::Classify { csv, pretty } => {
            let data = read_export(&csv)?;
            let records = processor::classify_export(&data)?;
            let json = if pretty {
                serde_json::to_string_pretty(&records)?
            } else {
                serde_json::to_string(&records)?
            };
            println!("{json}");
        }
        Commands::Summary { csv } => {
            let data = read_export(&csv)?;
            let records = processor::classify_export(&data)?;
            let stats = summary::summarize(&records);

            println!("Week {} overview", stats.current_week);
            println!("- Total students: {}", stats.total);
            println!("- On track: {}", summary::share(stats.on_track, stats.total));
            println!("- Flagged: {}", summary::share(stats.flagged, stats.total));
            println!("- At risk: {}", summary::share(stats.at_risk, stats.total));
            println!("- Sunday submissions: {}", summary::rate(stats.sun_submitted, stats.total));
            println!(
                "- Wednesday submissions: {}",
                summary::rate(stats.wed_submitted, stats.total)
            );
            for (idx, count) in stats.phase_counts.iter().enumerate() {
                println!("- Phase {}: {} students", idx + 1, count);
            }
            println!("- MRs submitted: {}", summary::share(stats.mr_submitted, stats.total));
            println!("- MRs merged: {}", summary::share(stats.mr_merged, stats.total));
            println!("- Interventions needed: {}", stats.interventions_needed);
        }
    }

    Ok(())
}
