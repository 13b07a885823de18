use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{error, info};

use listings_pipeline::config::Config;
use listings_pipeline::observability::init_logging;
use listings_pipeline::pipeline::processing::quality_gate::QualityDecision;
use listings_pipeline::pipeline::storage::FsTableStore;
use listings_pipeline::pipeline::{PipelineOrchestrator, StageKind};

#[derive(Parser)]
#[command(name = "listings_pipeline")]
#[command(about = "Bronze to silver to gold pipeline for rental listings and hosts")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to a TOML config file (falls back to $PIPELINE_CONFIG, then defaults)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the storage root holding bronze/, silver/ and gold/
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run every stage: hosts and listings to silver, then the gold join
    Run {
        /// Print the run summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// Run a single stage, reading upstream tables from storage
    Stage {
        #[arg(value_enum)]
        stage: StageArg,
    },
    /// Re-check the materialized silver and gold tables
    Validate,
    /// Print the stage execution order without running anything
    Plan,
}

#[derive(Clone, Copy, ValueEnum)]
enum StageArg {
    HostsSilver,
    ListingsSilver,
    Gold,
}

impl From<StageArg> for StageKind {
    fn from(arg: StageArg) -> Self {
        match arg {
            StageArg::HostsSilver => StageKind::HostsSilver,
            StageArg::ListingsSilver => StageKind::ListingsSilver,
            StageArg::Gold => StageKind::ListingsWithHostsGold,
        }
    }
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load(path).with_context(|| format!("loading config from {}", path.display()))?,
        None => Config::from_env().context("loading config from environment")?,
    };
    if let Some(data_dir) = &cli.data_dir {
        config.storage.root = data_dir.clone();
    }
    Ok(config)
}

fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    let config = load_config(&cli)?;
    let _guard = init_logging(&config.storage.log_dir).context("initializing logging")?;

    let store = FsTableStore::new(&config.storage.root);
    let orchestrator = PipelineOrchestrator::new(config, Box::new(store));

    match cli.command {
        Commands::Plan => {
            let order = orchestrator.pipeline().execution_order()?;
            println!("🗺️  Pipeline '{}':", orchestrator.pipeline().name);
            for (index, stage) in order.iter().enumerate() {
                println!("   {}. {}", index + 1, stage);
            }
        }
        Commands::Run { json } => {
            println!("🚀 Running full pipeline...");
            match orchestrator.run() {
                Ok(result) if json => {
                    println!("{}", result.to_json()?);
                }
                Ok(result) => {
                    println!("\n📊 Pipeline Results (run {}):", result.run_id);
                    if let Some(elapsed) = result.duration() {
                        println!("   Duration: {} ms", elapsed.num_milliseconds());
                    }
                    for step in &result.step_results {
                        println!(
                            "   {}: {} rows in, {} rows out, {} issues, sha256 {}",
                            step.stage,
                            step.rows_in,
                            step.rows_out,
                            step.quality.issues.len(),
                            step.materialized.sha256
                        );
                    }
                    println!("✅ Pipeline completed successfully");
                }
                Err(e) => {
                    error!("Pipeline run failed: {}", e);
                    println!("❌ Pipeline run failed: {}", e);
                    return Err(e.into());
                }
            }
        }
        Commands::Stage { stage } => {
            let stage = StageKind::from(stage);
            println!("🔨 Running stage {}...", stage);
            match orchestrator.run_stage(stage) {
                Ok(step) => {
                    println!(
                        "✅ {} wrote {} rows to {} (sha256 {})",
                        step.stage, step.rows_out, step.materialized.table, step.materialized.sha256
                    );
                }
                Err(e) => {
                    error!("Stage {} failed: {}", stage, e);
                    println!("❌ Stage {} failed: {}", stage, e);
                    return Err(e.into());
                }
            }
        }
        Commands::Validate => {
            println!("🔍 Validating materialized tables...");
            let reports = orchestrator.validate()?;
            let mut rejected = 0;
            for report in &reports {
                let decision = report.decision();
                let icon = match decision {
                    QualityDecision::Accept => "✅",
                    QualityDecision::AcceptWithWarnings => "⚠️ ",
                    QualityDecision::Reject => "❌",
                };
                println!(
                    "{} {}: {} rows, {} errors, {} warnings",
                    icon,
                    report.table,
                    report.row_count,
                    report.error_count(),
                    report.warning_count()
                );
                for issue in &report.issues {
                    println!("   - [{:?}] {}", issue.severity, issue.description);
                }
                if decision == QualityDecision::Reject {
                    rejected += 1;
                }
            }
            info!("Validation finished: {} of {} tables rejected", rejected, reports.len());
            if rejected > 0 {
                anyhow::bail!("{} table(s) failed validation", rejected);
            }
        }
    }
    Ok(())
}
