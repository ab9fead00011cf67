use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::{error, info};

use retail_etl::config::{Config, DEFAULT_CONFIG_PATH};
use retail_etl::logging;
use retail_etl::pipeline::{Job, Pipeline, PipelineResult};
use retail_etl::types::RecordSet;

/// Rows shown by `--dry-run`
const PREVIEW_ROWS: usize = 5;

#[derive(Parser)]
#[command(name = "retail_etl")]
#[command(about = "Extract, clean and load retail sales data into a local store")]
#[command(version)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Clone)]
struct JobArgs {
    /// Extract and clean, print the last rows, leave the local store untouched
    #[arg(long)]
    dry_run: bool,

    /// Also write the cleaned table as a spreadsheet (CSV) to this path
    #[arg(long, value_name = "PATH")]
    export: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Load user data from the relational source into dim_users
    Users(JobArgs),
    /// Load card details from the PDF document into dim_card_details
    Cards(JobArgs),
    /// Load store data from the stores API into dim_store_details
    Stores(JobArgs),
    /// Load the product catalogue from object storage into dim_products
    Products(JobArgs),
    /// Load orders from the relational source into orders_table
    Orders(JobArgs),
    /// Load sale timestamps from object storage into dim_date_times
    DateTimes(JobArgs),
    /// Run every job in order
    RunAll,
    /// List tables in the source database, or in the local store with --sink
    ListTables {
        #[arg(long)]
        sink: bool,
    },
}

fn print_result(result: &PipelineResult) {
    println!("\n📊 {} -> {}", result.job, result.table);
    println!("   Rows in: {}", result.input_rows);
    println!("   Rows out: {}", result.output_rows);
    println!("   Dropped: {}", result.dropped_rows);
    println!("   Columns: {}", result.columns.join(", "));
    if !result.written {
        println!("   Local store: untouched (dry run)");
    }
    if let Some(path) = &result.exported {
        println!("   Exported to: {}", path);
    }
}

fn print_preview(set: &RecordSet) {
    println!("{}", set.columns().join("\t"));
    for row in set.tail(PREVIEW_ROWS) {
        let line = set
            .columns()
            .iter()
            .map(|c| row.get(c).map(|cell| cell.to_string()).unwrap_or_default())
            .collect::<Vec<_>>()
            .join("\t");
        println!("{line}");
    }
}

async fn run_job(pipeline: &Pipeline, job: Job, args: JobArgs) -> Result<()> {
    if args.dry_run {
        let (result, cleaned) = pipeline
            .dry_run(job, args.export.as_deref())
            .await
            .with_context(|| format!("dry run of job {job} failed"))?;
        print_preview(&cleaned);
        print_result(&result);
        return Ok(());
    }

    let result = match &args.export {
        Some(path) => pipeline.run_job_with_export(job, path).await,
        None => pipeline.run_job(job).await,
    }
    .with_context(|| format!("job {job} failed"))?;
    print_result(&result);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let _guard = logging::init_logging();

    let cli = Cli::parse();
    let config = Config::load(&cli.config)
        .with_context(|| format!("loading configuration from {}", cli.config))?;
    let pipeline = Pipeline::from_config(&config).context("building pipeline")?;

    match cli.command {
        Commands::Users(args) => run_job(&pipeline, Job::Users, args).await?,
        Commands::Cards(args) => run_job(&pipeline, Job::Cards, args).await?,
        Commands::Stores(args) => run_job(&pipeline, Job::Stores, args).await?,
        Commands::Products(args) => run_job(&pipeline, Job::Products, args).await?,
        Commands::Orders(args) => run_job(&pipeline, Job::Orders, args).await?,
        Commands::DateTimes(args) => run_job(&pipeline, Job::DateTimes, args).await?,
        Commands::RunAll => {
            println!("🚀 Running all jobs...");
            let mut failed = 0;
            for (job, result) in pipeline.run_all().await {
                match result {
                    Ok(result) => print_result(&result),
                    Err(e) => {
                        failed += 1;
                        println!("❌ {job} failed: {e}");
                    }
                }
            }
            if failed > 0 {
                error!("{} of {} jobs failed", failed, Job::ALL.len());
                anyhow::bail!("{failed} job(s) failed");
            }
            info!("All jobs completed");
            println!("\n✅ All jobs completed successfully");
        }
        Commands::ListTables { sink } => {
            let tables = if sink {
                pipeline.sink().list_tables().await?
            } else {
                pipeline.sources().relational.list_tables().await?
            };
            for table in tables {
                println!("{table}");
            }
        }
    }
    Ok(())
}
