//! Squad role synchronization command-line runner.

#![forbid(unsafe_code)]

mod report_output;
mod sync_config;

use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use squadsync_application::{
    ReconciliationReport, RoleSyncService, SettingsService, SettingsUpdateInput, SyncMode,
};
use squadsync_core::{AppError, AppResult};
use squadsync_infrastructure::{
    MIGRATOR, PostgresMembershipDirectory, PostgresSettingsRepository,
};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::report_output::{
    DRY_RUN_BANNER, DRY_RUN_FOOTER, render_json, render_report, render_settings,
};
use crate::sync_config::SyncConfig;

const EXIT_SUCCESS: u8 = 0;
const EXIT_FATAL: u8 = 1;
const EXIT_PARTIAL_FAILURE: u8 = 2;

#[derive(Debug, Parser)]
#[command(name = "squadsync")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Synchronize user roles based on squad memberships", long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    /// Show what would be changed without actually making changes
    #[arg(long)]
    dry_run: bool,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Synchronize roles with squad memberships (default)
    Sync {
        /// Show what would be changed without actually making changes
        #[arg(long)]
        dry_run: bool,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Inspect or replace the synchronization settings
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },

    /// Apply database migrations and exit
    Migrate,
}

#[derive(Debug, Subcommand)]
enum SettingsAction {
    /// Print the stored settings
    Show,

    /// Validate and store new settings
    Set {
        /// JSON object mapping squad ids to role ids, e.g. '{"10": 100}'
        #[arg(long)]
        mapping: String,

        /// Role id assigned to inactive users
        #[arg(long)]
        inactive_role_id: Option<String>,

        /// JSON array of role ids synchronization never touches
        #[arg(long)]
        ignore_role_ids: Option<String>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(code) => code,
        Err(app_error) => {
            report_failure(&app_error);
            ExitCode::from(EXIT_FATAL)
        }
    }
}

async fn run(cli: Cli) -> AppResult<ExitCode> {
    let config = SyncConfig::load()?;
    let pool = connect_pool(&config).await?;

    match cli.command {
        None => sync(pool, SyncMode::from_dry_run(cli.dry_run), cli.json).await,
        Some(Command::Sync { dry_run, json }) => {
            sync(pool, SyncMode::from_dry_run(dry_run), json).await
        }
        Some(Command::Settings { action }) => {
            settings(pool, action).await?;
            Ok(ExitCode::SUCCESS)
        }
        Some(Command::Migrate) => {
            MIGRATOR.run(&pool).await.map_err(|error| {
                AppError::Internal(format!("failed to run migrations: {error}"))
            })?;
            info!("migrations applied");
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn sync(pool: PgPool, mode: SyncMode, json: bool) -> AppResult<ExitCode> {
    let (_, sync_service) = build_services(pool);

    if mode.is_dry_run() && !json {
        println!("{DRY_RUN_BANNER}");
    }

    let result = sync_service.run(mode).await;

    match &result {
        Ok(report) if json => println!("{}", render_json(report)?),
        Ok(report) => {
            println!("Starting role synchronization based on squad memberships...");
            println!("{}", render_settings(&report.settings));
            print!("{}", render_report(report));

            if mode.is_dry_run() {
                println!("{DRY_RUN_FOOTER}");
            }
        }
        Err(app_error) => report_failure(app_error),
    }

    Ok(ExitCode::from(exit_code(&result)))
}

/// Maps a finished run to the process exit status.
fn exit_code(result: &AppResult<ReconciliationReport>) -> u8 {
    match result {
        Err(_) => EXIT_FATAL,
        Ok(report) if report.failed_users() > 0 => EXIT_PARTIAL_FAILURE,
        Ok(_) => EXIT_SUCCESS,
    }
}

fn report_failure(app_error: &AppError) {
    error!(error = %app_error, "squadsync failed");
    eprintln!("error: {}", describe_error(app_error));
}

async fn settings(pool: PgPool, action: SettingsAction) -> AppResult<()> {
    let (settings_service, _) = build_services(pool);

    match action {
        SettingsAction::Show => {
            let raw = settings_service.load_raw_settings().await?;
            println!(
                "Squad-Role Mapping: {}",
                raw.role_squad_map.as_deref().unwrap_or("Not set")
            );
            println!(
                "Inactive Role ID: {}",
                raw.inactive_role_id.as_deref().unwrap_or("Not set")
            );
            println!(
                "Ignore Role IDs: {}",
                raw.ignore_role_ids.as_deref().unwrap_or("None")
            );

            if let Err(app_error) = settings_service.load_sync_settings().await {
                eprintln!("warning: stored settings are not usable: {app_error}");
            }
        }
        SettingsAction::Set {
            mapping,
            inactive_role_id,
            ignore_role_ids,
        } => {
            let settings = settings_service
                .update_sync_settings(SettingsUpdateInput {
                    role_squad_map: mapping,
                    inactive_role_id,
                    ignore_role_ids,
                })
                .await?;
            println!("Squad role sync settings have been updated.");
            println!("{}", render_settings(&settings));
        }
    }

    Ok(())
}

fn build_services(pool: PgPool) -> (SettingsService, RoleSyncService) {
    let directory = Arc::new(PostgresMembershipDirectory::new(pool.clone()));
    let settings_repository = Arc::new(PostgresSettingsRepository::new(pool));
    let settings_service =
        SettingsService::new(settings_repository, directory.clone(), directory.clone());
    let sync_service = RoleSyncService::new(directory.clone(), directory, settings_service.clone());

    (settings_service, sync_service)
}

async fn connect_pool(config: &SyncConfig) -> AppResult<PgPool> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(config.database_url.as_str())
        .await
        .map_err(|error| AppError::Internal(format!("failed to connect to database: {error}")))
}

fn describe_error(app_error: &AppError) -> String {
    match app_error {
        AppError::Configuration(message) => {
            format!("{message}. Configure the squad-role mapping with `squadsync settings set`.")
        }
        other => other.to_string(),
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
