use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use axum_prometheus::PrometheusMetricLayer;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use incentive_ai::config::AppConfig;
use incentive_ai::error::AppError;
use incentive_ai::telemetry;
use incentive_ai::workflows::awards::{
    golden_opportunities, parse_agent_metrics, parse_rule_set, summarize, AwardEngine,
    ComponentKey, EvaluatedAward, EvaluationFailure, FinalAwardBreakdown, IncentiveRule,
    LoadError, Opportunity, RuleCatalog, RuleRejection, RunPeriod, RunSummary,
};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::io::Cursor;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
struct AppState {
    readiness: Arc<AtomicBool>,
    metrics: PrometheusHandle,
}

#[derive(Parser, Debug)]
#[command(
    name = "Incentive Award Engine",
    about = "Compute and serve incentive award reports for sales agents",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Run the award engine against local data exports
    Awards {
        #[command(subcommand)]
        command: AwardsCommand,
    },
}

#[derive(Args, Debug, Default)]
struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    port: Option<u16>,
}

#[derive(Subcommand, Debug)]
enum AwardsCommand {
    /// Compute the award report for one evaluation period
    Report(AwardsReportArgs),
}

#[derive(Args, Debug)]
struct AwardsReportArgs {
    /// Wide metrics CSV export (falls back to AWARDS_METRICS_PATH)
    #[arg(long)]
    metrics_csv: Option<PathBuf>,
    /// Rule catalog JSON (falls back to AWARDS_RULES_PATH)
    #[arg(long)]
    rules: Option<PathBuf>,
    /// Evaluation period start (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    period_start: NaiveDate,
    /// Evaluation period end (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    period_end: NaiveDate,
    /// Include every per-rule evaluation row in the output
    #[arg(long)]
    list_evaluations: bool,
}

#[derive(Debug, Deserialize)]
struct AwardReportRequest {
    #[serde(deserialize_with = "deserialize_date")]
    period_start: NaiveDate,
    #[serde(deserialize_with = "deserialize_date")]
    period_end: NaiveDate,
    metrics_csv: String,
    rules: Vec<IncentiveRule>,
    #[serde(default)]
    include_evaluations: bool,
}

#[derive(Debug, Serialize)]
struct AwardReportResponse {
    period_start: NaiveDate,
    period_end: NaiveDate,
    summary: RunSummary,
    breakdowns: Vec<FinalAwardBreakdown>,
    failures: Vec<EvaluationFailure>,
    rejected_rules: Vec<RuleRejection>,
    opportunities: Vec<Opportunity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    evaluations: Option<Vec<EvaluatedAward>>,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run_cli().await {
        eprintln!("application error: {err}");
        std::process::exit(1);
    }
}

async fn run_cli() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => run_server(args).await,
        Command::Awards {
            command: AwardsCommand::Report(args),
        } => run_awards_report(args),
    }
}

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

fn deserialize_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_date(&raw).map_err(serde::de::Error::custom)
}

fn run_period(start: NaiveDate, end: NaiveDate) -> Result<RunPeriod, LoadError> {
    if end < start {
        return Err(LoadError::InvalidPeriod { start, end });
    }
    Ok(RunPeriod { start, end })
}

async fn run_server(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let state = AppState {
        readiness: readiness_flag.clone(),
        metrics: prometheus_handle,
    };

    let app = Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .route("/api/v1/awards/report", post(award_report_endpoint))
        .layer(prometheus_layer)
        .with_state(state);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "incentive award engine ready");

    axum::serve(listener, app).await?;
    Ok(())
}

fn run_awards_report(args: AwardsReportArgs) -> Result<(), AppError> {
    let AwardsReportArgs {
        metrics_csv,
        rules,
        period_start,
        period_end,
        list_evaluations,
    } = args;

    let config = AppConfig::load()?;

    let metrics_path = metrics_csv.or(config.data.metrics_path).ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "no metrics export given; pass --metrics-csv or set AWARDS_METRICS_PATH",
        )
    })?;
    let rules_path = rules.or(config.data.rules_path).ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "no rule catalog given; pass --rules or set AWARDS_RULES_PATH",
        )
    })?;

    let period = run_period(period_start, period_end)?;

    let metrics_file = std::fs::File::open(&metrics_path)?;
    let agents = parse_agent_metrics(metrics_file)?;

    let rules_raw = std::fs::read_to_string(&rules_path)?;
    let configured = parse_rule_set(&rules_raw)?;

    let (catalog, rejected_rules) = RuleCatalog::load(configured);
    let engine = AwardEngine::new(catalog);
    let outcome = engine.run(&agents, &period);

    let summary = summarize(&outcome);
    let opportunities = golden_opportunities(&outcome.evaluations);

    render_award_report(
        &period,
        &summary,
        &outcome.breakdowns,
        &outcome.failures,
        &rejected_rules,
        &opportunities,
        list_evaluations.then_some(&outcome.evaluations),
    );

    Ok(())
}

async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn readiness_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

async fn metrics_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

async fn award_report_endpoint(
    Json(payload): Json<AwardReportRequest>,
) -> Result<Json<AwardReportResponse>, AppError> {
    let AwardReportRequest {
        period_start,
        period_end,
        metrics_csv,
        rules,
        include_evaluations,
    } = payload;

    let period = run_period(period_start, period_end)?;

    let agents = parse_agent_metrics(Cursor::new(metrics_csv.into_bytes()))?;
    let (catalog, rejected_rules) = RuleCatalog::load(rules);
    let engine = AwardEngine::new(catalog);
    let outcome = engine.run(&agents, &period);

    let summary = summarize(&outcome);
    let opportunities = golden_opportunities(&outcome.evaluations);
    let evaluations = include_evaluations.then_some(outcome.evaluations);

    Ok(Json(AwardReportResponse {
        period_start,
        period_end,
        summary,
        breakdowns: outcome.breakdowns,
        failures: outcome.failures,
        rejected_rules,
        opportunities,
        evaluations,
    }))
}

fn render_award_report(
    period: &RunPeriod,
    summary: &RunSummary,
    breakdowns: &[FinalAwardBreakdown],
    failures: &[EvaluationFailure],
    rejected_rules: &[RuleRejection],
    opportunities: &[Opportunity],
    evaluations: Option<&Vec<EvaluatedAward>>,
) {
    println!("Incentive award report");
    println!("Evaluation period: {} -> {}", period.start, period.end);
    println!(
        "Total payout: {:.0} across {} award(s), {} agent(s) paid, average achievement {:.1}%",
        summary.total_payout, summary.awards_paid, summary.agents_paid, summary.average_achievement
    );

    println!("\nPer-agent breakdown");
    for breakdown in breakdowns {
        println!("- {}: {:.0}", breakdown.agent_id.0, breakdown.total_amount);
        for component in &breakdown.components {
            let label = match &component.key {
                ComponentKey::Group(group) => format!("group '{group}'"),
                ComponentKey::Rule(rule_id) => format!("rule '{}'", rule_id.0),
            };
            println!(
                "    {} -> {} pays {:.0}",
                label, component.winning_rule_id.0, component.amount
            );
        }
    }

    if rejected_rules.is_empty() {
        println!("\nRejected rules: none");
    } else {
        println!("\nRejected rules");
        for rejection in rejected_rules {
            println!("- {}: {}", rejection.rule_id.0, rejection.reason);
        }
    }

    if failures.is_empty() {
        println!("\nEvaluation failures: none");
    } else {
        println!("\nEvaluation failures");
        for failure in failures {
            println!(
                "- agent {} / rule {}: {}",
                failure.agent_id.0,
                failure.rule_id.0,
                failure.kind.summary()
            );
        }
    }

    if !opportunities.is_empty() {
        println!("\nGolden opportunities (best ROI first)");
        for opportunity in opportunities {
            println!(
                "- {} / {}: {:.0} more performance unlocks {:.0} (ROI {:.2}, at {:.1}%)",
                opportunity.agent_id.0,
                opportunity.rule_name,
                opportunity.shortfall,
                opportunity.reward_at_stake,
                opportunity.roi,
                opportunity.achievement_rate
            );
        }
    }

    if let Some(evaluations) = evaluations {
        println!("\nEvaluation rows");
        for evaluation in evaluations {
            let group_note = evaluation
                .competition_group
                .as_deref()
                .map(|group| format!(" [group {group}]"))
                .unwrap_or_default();
            println!(
                "- {} | {} | {:.0}{} | achievement {:.1}%",
                evaluation.agent_id.0,
                evaluation.rule_name,
                evaluation.amount,
                group_note,
                evaluation.progress.achievement_rate
            );
        }
    }
}
