use std::time::Duration;

use axum::{
    Json, Router,
    http::StatusCode,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use stock_cutter::solver::{Solver, SolverConfig};
use stock_cutter::types::{PieceDemand, Plan, SolveError, deserialize_u32_from_number};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

// A request is never allowed to enumerate unbounded: clients may tighten
// these, not lift them.
const MAX_PATTERNS: usize = 100_000;
const TIME_LIMIT: Duration = Duration::from_secs(10);

#[derive(Deserialize, Serialize)]
struct SolveRequest {
    #[serde(deserialize_with = "deserialize_u32_from_number")]
    stock_length: u32,
    pieces: Vec<PieceDemand>,
    #[serde(default)]
    max_patterns: Option<usize>,
}

#[derive(Serialize)]
struct SolveResponse {
    entries: Vec<EntryResponse>,
    stock_length: u32,
    bar_count: u64,
    total_scrap: u64,
    waste_percent: f64,
}

#[derive(Serialize)]
struct EntryResponse {
    pattern: Vec<u32>,
    count: u32,
    used: u64,
    scrap: u64,
}

impl From<Plan> for SolveResponse {
    fn from(plan: Plan) -> Self {
        Self {
            bar_count: plan.bar_count(),
            total_scrap: plan.total_scrap(),
            waste_percent: plan.waste_percent(),
            stock_length: plan.stock_length,
            entries: plan
                .entries
                .into_iter()
                .map(|e| EntryResponse {
                    pattern: e.pattern.counts,
                    count: e.count,
                    used: e.used,
                    scrap: e.scrap,
                })
                .collect(),
        }
    }
}

fn error_status(err: &SolveError) -> StatusCode {
    match err {
        SolveError::InvalidInstance(_) => StatusCode::BAD_REQUEST,
        SolveError::InfeasibleInstance(_) | SolveError::PatternLimitExceeded(_) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        SolveError::SolverTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
        SolveError::SolverFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn request_config(max_patterns: Option<usize>) -> SolverConfig {
    SolverConfig {
        max_patterns: Some(max_patterns.map_or(MAX_PATTERNS, |m| m.min(MAX_PATTERNS))),
        time_limit: Some(TIME_LIMIT),
        ..SolverConfig::default()
    }
}

async fn solve(
    Json(req): Json<SolveRequest>,
) -> Result<Json<SolveResponse>, (StatusCode, String)> {
    tracing::info!(
        body = serde_json::to_string(&req).unwrap_or_default(),
        "POST /solve"
    );

    let solver = Solver::from_demands(req.stock_length, &req.pieces, request_config(req.max_patterns));

    let plan = solver.solve().map_err(|e| {
        tracing::warn!(error = %e, "solve failed");
        (error_status(&e), e.to_string())
    })?;

    Ok(Json(plan.into()))
}

#[tokio::main]
async fn main() {
    let _sentry = std::env::var("SENTRY_DSN").ok().map(|dsn| {
        sentry::init((
            dsn,
            sentry::ClientOptions {
                release: sentry::release_name!(),
                ..Default::default()
            },
        ))
    });

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open("development.log")
        .expect("failed to open development.log");

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_target(false)
        .with_ansi(false)
        .with_max_level(Level::INFO)
        .init();

    let port = std::env::var("PORT").unwrap_or_else(|_| "3001".to_string());
    let addr = format!("0.0.0.0:{port}");

    let app = Router::new()
        .route("/up", get(|| async { "ok" }))
        .route("/solve", post(solve))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        );

    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();
    eprintln!("Listening on {addr}");
    axum::serve(listener, app).await.unwrap();
}
