use crate::data::{SeatingInput, SeatingOutput, SessionRequest};
use crate::error::SolveError;
use crate::solver;
use axum::{Json, Router, http::StatusCode, routing::post};
use log::{info, warn};

/// Bind address used when `SEATING_ADDR` is not set.
pub const DEFAULT_ADDR: &str = "127.0.0.1:8080";

type HandlerResult = Result<Json<SeatingOutput>, (StatusCode, String)>;

fn respond(result: Result<SeatingOutput, SolveError>) -> HandlerResult {
    match result {
        Ok(output) => Ok(Json(output)),
        Err(e) => {
            warn!("Rejected seating request: {}", e);
            Err((StatusCode::BAD_REQUEST, e.to_string()))
        }
    }
}

async fn solve_handler(Json(input): Json<SeatingInput>) -> HandlerResult {
    respond(solver::solve(&input))
}

async fn session_handler(Json(request): Json<SessionRequest>) -> HandlerResult {
    respond(solver::solve_session(&request))
}

pub fn build_router() -> Router {
    Router::new()
        .route("/v1/seating/solve", post(solve_handler))
        .route("/v1/seating/session", post(session_handler))
}

pub async fn run_server(addr: &str) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("Server running at http://{}", listener.local_addr()?);

    axum::serve(listener, build_router()).await
}
