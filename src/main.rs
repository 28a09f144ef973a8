//! Penca Scoring CLI
//!
//! Recomputes race scores for a pool and prints standings. This is the
//! invocation surface of the engine; it owns no scoring logic itself.

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use penca_scoring::config::LogFormat;
use penca_scoring::database::{create_pool, run_migrations};
use penca_scoring::models::Pool;
use penca_scoring::services::BatchReport;
use penca_scoring::{AppConfig, AppError, AppState};
use std::process::ExitCode;
use tracing::{error, info};
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(
    name = "penca-scoring",
    about = "Recompute race scores for a prediction pool",
    version
)]
struct Cli {
    /// Override SCORING_BATCH_CONCURRENCY
    #[arg(long, global = true)]
    concurrency: Option<usize>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Recompute the given races
    Recompute(RecomputeArgs),
    /// Recompute every published race of a pool
    RecomputePool(RecomputePoolArgs),
    /// Print accumulated points per participant
    Standings {
        #[arg(long)]
        pool: Uuid,
    },
}

#[derive(Args, Debug)]
struct RecomputeArgs {
    /// Race ids to recompute
    #[arg(required = true)]
    race_ids: Vec<Uuid>,
    /// Compute and print scores without writing them
    #[arg(long)]
    dry_run: bool,
}

#[derive(Args, Debug)]
struct RecomputePoolArgs {
    #[arg(long)]
    pool: Uuid,
    /// Only races run on this day (YYYY-MM-DD)
    #[arg(long)]
    date: Option<NaiveDate>,
    /// Compute and print scores without writing them
    #[arg(long)]
    dry_run: bool,
}

fn init_tracing(config: &AppConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("penca_scoring={},sqlx=warn", config.log_level).into()
    });

    match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt().json().with_env_filter(filter).init(),
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // Load environment variables first
    dotenv::dotenv().ok();

    let cli = Cli::parse();

    let mut config = AppConfig::from_env().map_err(AppError::Config)?;
    if let Some(concurrency) = cli.concurrency {
        config.scoring.batch_concurrency = concurrency.max(1);
    }

    init_tracing(&config);
    info!("Environment: {}", config.environment);

    let pool = create_pool(&config.database)
        .await
        .context("failed to create database pool")?;
    run_migrations(&pool).await.context("database migration failed")?;
    info!("Database ready (max connections: {})", config.database.max_connections);

    let state = AppState::new(pool);

    match cli.command {
        Command::Recompute(args) => run_recompute(&state, &config, &args.race_ids, args.dry_run).await,
        Command::RecomputePool(args) => {
            find_pool(&state, args.pool).await?;
            let races = state
                .race_repo
                .find_published_by_pool(args.pool, args.date)
                .await?;
            let race_ids: Vec<Uuid> = races.iter().map(|r| r.id).collect();
            info!("Found {} published race(s) in pool {}", race_ids.len(), args.pool);
            run_recompute(&state, &config, &race_ids, args.dry_run).await
        }
        Command::Standings { pool } => {
            let penca = find_pool(&state, pool).await?;
            println!("Standings for {} ({})", penca.name, penca.slug);
            let standings = state.score_repo.standings(pool).await?;
            for (rank, standing) in standings.iter().enumerate() {
                println!(
                    "{:>3}. {:<30} {:>6} pts ({} races)",
                    rank + 1,
                    standing.display_name,
                    standing.points_total,
                    standing.races_scored
                );
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn find_pool(state: &AppState, pool_id: Uuid) -> anyhow::Result<Pool> {
    state
        .pool_repo
        .find_by_id(pool_id)
        .await?
        .with_context(|| format!("pool {} not found", pool_id))
}

async fn run_recompute(
    state: &AppState,
    config: &AppConfig,
    race_ids: &[Uuid],
    dry_run: bool,
) -> anyhow::Result<ExitCode> {
    if dry_run {
        return run_dry(state, race_ids).await;
    }

    let runner = state.batch_runner(config.scoring.batch_concurrency);
    let report = match config.scoring.batch_deadline() {
        Some(deadline) => runner.run_all_with_deadline(race_ids, deadline).await,
        None => runner.run_all(race_ids).await,
    };

    print_report(&report);

    Ok(if report.has_failures() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

async fn run_dry(state: &AppState, race_ids: &[Uuid]) -> anyhow::Result<ExitCode> {
    let mut failed = false;
    for race_id in race_ids {
        match state.scoring_service.prepare(*race_id).await {
            Ok(prepared) => {
                println!(
                    "race {} (seq {}, ruleset v{}, winner backers {})",
                    race_id, prepared.race.seq, prepared.ruleset_version, prepared.winner_backers
                );
                for score in &prepared.scores {
                    println!(
                        "  {} -> {} pts {}",
                        score.participant_id,
                        score.points_total,
                        serde_json::to_string(&score.breakdown)?
                    );
                }
            }
            Err(e) => {
                error!("Dry run failed for race {}: {}", race_id, e);
                println!("race {} FAILED [{}]: {}", race_id, e.kind(), e);
                failed = true;
            }
        }
    }
    Ok(if failed { ExitCode::FAILURE } else { ExitCode::SUCCESS })
}

fn print_report(report: &BatchReport) {
    println!(
        "Scored {} race(s), {} participant score(s) written",
        report.races_scored(),
        report.participants_scored()
    );

    for (race_id, e) in report.race_failures() {
        println!("race {} FAILED [{}]: {}", race_id, e.kind(), e);
    }
    for (race_id, failure) in report.participant_failures() {
        println!(
            "race {} participant {} FAILED: {}",
            race_id, failure.participant_id, failure.error
        );
    }
    for race_id in report.unfinished() {
        println!("race {} UNFINISHED: batch deadline reached", race_id);
    }
}
