use std::sync::Arc;

use trail_planner::cli::{ResultsScreen, run_terminal};
use trail_planner::config::AppConfig;
use trail_planner::error::{ConfigError, Result};
use trail_planner::identity::StaticIdentity;
use trail_planner::llm::{GeneratorConfig, create_generator};
use trail_planner::questionnaire::{QuestionnaireSession, SubmissionPipeline};
use trail_planner::routes::{ResultsState, results_routes};
use trail_planner::store::{HandoffStore, LibSqlBackend, PlanStore};

#[tokio::main]
async fn main() -> Result<()> {
    let config = match AppConfig::from_env() {
        Err(ConfigError::MissingEnvVar(var)) => {
            eprintln!("Error: {var} not set");
            eprintln!("  export {var}=...");
            std::process::exit(1);
        }
        other => other?,
    };

    // Logs go to a file so they don't interleave with the questionnaire.
    std::fs::create_dir_all(&config.log_dir)?;
    let appender = tracing_appender::rolling::daily(&config.log_dir, "trail-planner.log");
    let (log_writer, _log_guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_ansi(false)
        .with_writer(log_writer)
        .init();

    eprintln!("🥾 Trail Planner v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Model: {}", config.llm.model);
    eprintln!("   Database: {}", config.db_path.display());
    eprintln!("   Logs: {}", config.log_dir.display());
    match &config.user_id {
        Some(user) => eprintln!("   User: {user}"),
        None => eprintln!("   User: (not signed in, set TRAIL_PLANNER_USER to save plans)"),
    }

    // ── Database ─────────────────────────────────────────────────────────
    let db = Arc::new(LibSqlBackend::new_local(&config.db_path).await?);
    let handoff: Arc<dyn HandoffStore> = db.clone();
    let plans: Arc<dyn PlanStore> = db;

    // ── Results API ──────────────────────────────────────────────────────
    if let Some(port) = config.http_port {
        let app = results_routes(ResultsState {
            handoff: Arc::clone(&handoff),
            plans: Arc::clone(&plans),
        });
        let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}")).await?;
        eprintln!("   Results API: http://0.0.0.0:{port}/api/trip/result");
        tokio::spawn(async move {
            tracing::info!(port, "Results API started");
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!(error = %e, "Results API stopped");
            }
        });
    }

    // ── Questionnaire ────────────────────────────────────────────────────
    let generator = create_generator(&config.llm, GeneratorConfig::default())?;
    let pipeline = SubmissionPipeline::new(
        generator,
        Arc::new(StaticIdentity::new(config.user_id.clone())),
        plans,
        Arc::clone(&handoff),
        Arc::new(ResultsScreen::new(Arc::clone(&handoff))),
    );
    let session = QuestionnaireSession::new(pipeline);
    session.start().await;

    eprintln!("   Press Enter to skip a question, b to go back, q to quit.\n");

    let submitted = run_terminal(&session).await?;
    if !submitted {
        eprintln!("\nNo trip submitted.");
    } else if config.http_port.is_some() {
        eprintln!("Results API still serving. Press Ctrl-C to exit.");
        tokio::signal::ctrl_c().await?;
    }

    Ok(())
}
