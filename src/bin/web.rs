//! Single binary web server: JSON API over the bracket engine.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default.
//! Override with env: HOST (e.g. 0.0.0.0), PORT (e.g. 8080). Log level via RUST_LOG.

use actix_web::{
    get, post, put,
    web::{Data, Json, Path},
    App, HttpResponse, HttpServer, Responder,
};
use bracket_engine::{
    ErrorKind, Format, GenerationOptions, MatchId, NewTournament, TeamId, TournamentError,
    TournamentId, TournamentStore,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

type AppState = Data<TournamentStore>;

/// Inactivity threshold: tournaments not accessed for this long are removed.
const INACTIVITY_TIMEOUT: Duration = Duration::from_secs(12 * 3600);

/// How often the cleanup task runs.
const CLEANUP_INTERVAL: Duration = Duration::from_secs(30 * 60);

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Deserialize)]
struct RegisterTeamBody {
    name: String,
    members: Vec<String>,
}

#[derive(Deserialize)]
struct SetFormatBody {
    format: Format,
}

#[derive(Deserialize)]
struct GenerateBody {
    team_ids: Vec<TeamId>,
    #[serde(flatten)]
    options: GenerationOptions,
}

#[derive(Deserialize)]
struct FriendlyMatchBody {
    home: TeamId,
    away: TeamId,
    #[serde(default)]
    scheduled_at: Option<DateTime<Utc>>,
    #[serde(default)]
    venue: Option<String>,
}

#[derive(Deserialize)]
struct ScoreBody {
    home_score: u32,
    away_score: u32,
    expected_version: u64,
    /// Keep the match live instead of completing it.
    #[serde(default)]
    live: bool,
}

#[derive(Deserialize)]
struct RescheduleBody {
    scheduled_at: DateTime<Utc>,
}

#[derive(Deserialize)]
struct VenueBody {
    venue: Option<String>,
}

#[derive(Serialize)]
struct CreatedId<T: Serialize> {
    id: T,
}

/// Path segment: tournament id (e.g. /api/tournaments/{id})
#[derive(Deserialize)]
struct TournamentPath {
    id: TournamentId,
}

/// Path segments: tournament id and team id (e.g. /api/tournaments/{id}/teams/{team_id})
#[derive(Deserialize)]
struct TournamentTeamPath {
    id: TournamentId,
    team_id: TeamId,
}

/// Path segment: match id (e.g. /api/matches/{match_id})
#[derive(Deserialize)]
struct MatchPath {
    match_id: MatchId,
}

/// Map an engine error to a status code with `{ "error": ... }` body.
fn error_response(e: TournamentError) -> HttpResponse {
    let body = serde_json::json!({ "error": e.to_string() });
    match e.kind() {
        ErrorKind::Validation => HttpResponse::BadRequest().json(body),
        ErrorKind::Conflict => HttpResponse::Conflict().json(body),
        ErrorKind::NotFound => HttpResponse::NotFound().json(body),
        ErrorKind::Invariant => {
            log::error!("Internal error: {}", e);
            HttpResponse::InternalServerError().json(body)
        }
    }
}

fn respond<T: Serialize>(result: Result<T, TournamentError>) -> HttpResponse {
    match result {
        Ok(value) => HttpResponse::Ok().json(value),
        Err(e) => error_response(e),
    }
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "bracket-engine",
    })
}

/// Create a new tournament (returns it with id; client stores id for subsequent requests).
#[post("/api/tournaments")]
async fn api_create_tournament(state: AppState, body: Json<NewTournament>) -> HttpResponse {
    respond(state.create_tournament(body.into_inner()))
}

/// Get a tournament by id (404 if not found). Touching it refreshes last_activity.
#[get("/api/tournaments/{id}")]
async fn api_get_tournament(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    respond(state.get(path.id))
}

/// Change format (only before any match exists).
#[put("/api/tournaments/{id}/format")]
async fn api_set_format(
    state: AppState,
    path: Path<TournamentPath>,
    body: Json<SetFormatBody>,
) -> HttpResponse {
    respond(state.set_format(path.id, body.format))
}

#[post("/api/tournaments/{id}/teams")]
async fn api_register_team(
    state: AppState,
    path: Path<TournamentPath>,
    body: Json<RegisterTeamBody>,
) -> HttpResponse {
    respond(
        state
            .register_team(path.id, &body.name, &body.members)
            .map(|id| CreatedId { id }),
    )
}

#[post("/api/tournaments/{id}/teams/{team_id}/withdraw")]
async fn api_withdraw_team(state: AppState, path: Path<TournamentTeamPath>) -> HttpResponse {
    match state.withdraw_team(path.id, path.team_id) {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(e) => error_response(e),
    }
}

/// Generate the cup bracket; `team_ids` is the seed order, best first.
#[post("/api/tournaments/{id}/bracket")]
async fn api_generate_bracket(
    state: AppState,
    path: Path<TournamentPath>,
    body: Json<GenerateBody>,
) -> HttpResponse {
    respond(state.generate_bracket(path.id, &body.team_ids, &body.options))
}

#[post("/api/tournaments/{id}/round-robin")]
async fn api_generate_round_robin(
    state: AppState,
    path: Path<TournamentPath>,
    body: Json<GenerateBody>,
) -> HttpResponse {
    respond(state.generate_round_robin(path.id, &body.team_ids, &body.options))
}

/// Generate from all active teams according to the tournament's format.
#[post("/api/tournaments/{id}/schedule")]
async fn api_generate_schedule(
    state: AppState,
    path: Path<TournamentPath>,
    body: Option<Json<GenerationOptions>>,
) -> HttpResponse {
    let options = body.map(|b| b.into_inner()).unwrap_or_default();
    respond(state.generate_schedule(path.id, &options))
}

/// Add a friendly match ("fun" format).
#[post("/api/tournaments/{id}/matches")]
async fn api_add_friendly_match(
    state: AppState,
    path: Path<TournamentPath>,
    body: Json<FriendlyMatchBody>,
) -> HttpResponse {
    let body = body.into_inner();
    respond(
        state
            .add_friendly_match(path.id, body.home, body.away, body.scheduled_at, body.venue)
            .map(|id| CreatedId { id }),
    )
}

#[get("/api/tournaments/{id}/view")]
async fn api_bracket_view(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    respond(state.bracket_view(path.id))
}

#[get("/api/tournaments/{id}/standings")]
async fn api_standings(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    respond(state.standings(path.id))
}

#[get("/api/tournaments/{id}/standings.csv")]
async fn api_standings_csv(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    match state.standings_csv(path.id) {
        Ok(csv) => HttpResponse::Ok()
            .content_type("text/csv; charset=utf-8")
            .body(csv),
        Err(e) => error_response(e),
    }
}

#[post("/api/matches/{match_id}/start")]
async fn api_start_match(state: AppState, path: Path<MatchPath>) -> HttpResponse {
    respond(state.start_match(path.match_id))
}

/// Record a score. `expected_version` must be the version last read; 409 on mismatch.
#[put("/api/matches/{match_id}/score")]
async fn api_record_score(
    state: AppState,
    path: Path<MatchPath>,
    body: Json<ScoreBody>,
) -> HttpResponse {
    let result = if body.live {
        state.update_live_score(path.match_id, body.home_score, body.away_score, body.expected_version)
    } else {
        state.record_score(path.match_id, body.home_score, body.away_score, body.expected_version)
    };
    respond(result)
}

#[put("/api/matches/{match_id}/schedule")]
async fn api_reschedule_match(
    state: AppState,
    path: Path<MatchPath>,
    body: Json<RescheduleBody>,
) -> HttpResponse {
    respond(state.reschedule_match(path.match_id, body.scheduled_at))
}

#[put("/api/matches/{match_id}/venue")]
async fn api_set_match_venue(
    state: AppState,
    path: Path<MatchPath>,
    body: Json<VenueBody>,
) -> HttpResponse {
    respond(state.set_match_venue(path.match_id, body.into_inner().venue))
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let host = std::env::var("HOST").unwrap_or_else(|_| default_host());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or_else(default_port);
    let bind = (host.as_str(), port);
    log::info!("Starting server at http://{}:{}", bind.0, bind.1);

    let state = Data::new(TournamentStore::new());

    // Background task: every 30 minutes, remove tournaments inactive for 12+ hours
    let state_cleanup = state.clone();
    actix_web::rt::spawn(async move {
        let mut interval = actix_web::rt::time::interval(CLEANUP_INTERVAL);
        loop {
            interval.tick().await;
            match state_cleanup.evict_inactive(INACTIVITY_TIMEOUT) {
                Ok(0) => {}
                Ok(removed) => {
                    log::info!("Cleaned up {} inactive tournament(s) (no activity for 12h)", removed)
                }
                Err(e) => log::warn!("Cleanup skipped: {}", e),
            }
        }
    });

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .service(api_health)
            .service(api_create_tournament)
            .service(api_get_tournament)
            .service(api_set_format)
            .service(api_register_team)
            .service(api_withdraw_team)
            .service(api_generate_bracket)
            .service(api_generate_round_robin)
            .service(api_generate_schedule)
            .service(api_add_friendly_match)
            .service(api_bracket_view)
            .service(api_standings_csv)
            .service(api_standings)
            .service(api_start_match)
            .service(api_record_score)
            .service(api_reschedule_match)
            .service(api_set_match_venue)
    })
    .bind(bind)?
    .run()
    .await
}
