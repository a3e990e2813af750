//! JSON transport over the study core.
//!
//! Routing, validation of the wire shapes and cookie plumbing only;
//! all semantics live in the `study` module. Authentication is an
//! upstream concern: the gateway injects the caller's id as the
//! `x-user-id` header and this layer trusts it.

use axum::extract::{FromRequestParts, Query, State};
use axum::http::request::Parts;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use serde::Deserialize;
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;

use crate::config;
use crate::db;
use crate::domain::{DifficultyBucket, PageDirection};
use crate::error::StudyError;
use crate::state::AppState;
use crate::study::{self, CardPage, DifficultyEntry, StartedStudy};

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/study/start", post(start_study))
        .route("/study/cards", get(get_cards))
        .route("/study/review", post(submit_review))
        .route("/study/complete", post(complete_study))
        .route("/study/end", post(end_study))
        .route("/study/difficulties", get(get_difficulties).put(configure_difficulties))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Authenticated caller id, supplied by the upstream gateway.
pub struct UserId(pub i64);

impl<S> FromRequestParts<S> for UserId
where
    S: Send + Sync,
{
    type Rejection = StudyError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get("x-user-id")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse().ok())
            .map(UserId)
            .ok_or_else(|| StudyError::Validation("missing or invalid x-user-id header".into()))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StartStudyRequest {
    study_set_id: i64,
}

async fn start_study(
    State(state): State<AppState>,
    UserId(user_id): UserId,
    jar: CookieJar,
    Json(body): Json<StartStudyRequest>,
) -> Result<(CookieJar, Json<StartedStudy>), StudyError> {
    let conn = db::try_lock(&state.db)?;
    let started = study::start_session(&conn, &state.sessions, user_id, body.study_set_id)?;

    let cookie = Cookie::build((config::SESSION_COOKIE, started.session_token.clone()))
        .path("/")
        .http_only(true)
        .build();
    Ok((jar.add(cookie), Json(started)))
}

#[derive(Debug, Deserialize)]
struct CardsQuery {
    direction: Option<String>,
    limit: Option<usize>,
}

async fn get_cards(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(query): Query<CardsQuery>,
) -> Result<Json<CardPage>, StudyError> {
    let token = session_token(&jar)?;

    let direction = match query.direction.as_deref() {
        None => PageDirection::Next,
        Some(s) => PageDirection::from_str(s)
            .ok_or_else(|| StudyError::Validation("direction must be 'next' or 'prev'".into()))?,
    };
    let limit = query.limit.unwrap_or(config::DEFAULT_PAGE_LIMIT);

    let conn = db::try_lock(&state.db)?;
    let page = study::get_page_of_cards(&conn, &state.sessions, &token, direction, limit)?;
    Ok(Json(page))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubmitReviewRequest {
    enrollment_id: i64,
    flashcard_id: i64,
    difficulty_id: i64,
}

async fn submit_review(
    State(state): State<AppState>,
    UserId(user_id): UserId,
    Json(body): Json<SubmitReviewRequest>,
) -> Result<Json<Value>, StudyError> {
    let conn = db::try_lock(&state.db)?;
    study::submit_review(
        &conn,
        user_id,
        body.enrollment_id,
        body.flashcard_id,
        body.difficulty_id,
    )?;
    Ok(Json(json!({ "message": "review recorded" })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CompleteStudyRequest {
    enrollment_id: i64,
}

async fn complete_study(
    State(state): State<AppState>,
    UserId(user_id): UserId,
    Json(body): Json<CompleteStudyRequest>,
) -> Result<Json<Value>, StudyError> {
    let conn = db::try_lock(&state.db)?;
    let enrollment = db::get_enrollment_by_id(&conn, body.enrollment_id)?
        .filter(|e| e.user_id == user_id)
        .ok_or_else(|| StudyError::NotFound(format!("enrollment {}", body.enrollment_id)))?;
    db::mark_complete(&conn, enrollment.id)?;
    Ok(Json(json!({ "message": "study marked complete" })))
}

async fn end_study(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, Json<Value>) {
    if let Some(cookie) = jar.get(config::SESSION_COOKIE) {
        state.sessions.delete_session(cookie.value());
    }

    let mut removal = Cookie::from(config::SESSION_COOKIE);
    removal.set_path("/");
    (jar.remove(removal), Json(json!({ "message": "study session ended" })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DifficultiesQuery {
    enrollment_id: i64,
}

async fn get_difficulties(
    State(state): State<AppState>,
    UserId(user_id): UserId,
    Query(query): Query<DifficultiesQuery>,
) -> Result<Json<Vec<DifficultyBucket>>, StudyError> {
    let conn = db::try_lock(&state.db)?;
    let buckets = study::get_difficulties_config(&conn, user_id, query.enrollment_id)?;
    Ok(Json(buckets))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigureDifficultiesRequest {
    enrollment_id: i64,
    difficulties: Vec<DifficultyEntry>,
}

async fn configure_difficulties(
    State(state): State<AppState>,
    UserId(user_id): UserId,
    Json(body): Json<ConfigureDifficultiesRequest>,
) -> Result<Json<Value>, StudyError> {
    let conn = db::try_lock(&state.db)?;
    study::configure_difficulties(&conn, user_id, body.enrollment_id, &body.difficulties)?;
    Ok(Json(json!({ "message": "difficulties updated" })))
}

fn session_token(jar: &CookieJar) -> Result<String, StudyError> {
    jar.get(config::SESSION_COOKIE)
        .map(|c| c.value().to_string())
        .ok_or(StudyError::SessionExpired)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderName, HeaderValue};
    use axum_test::TestServer;
    use tempfile::TempDir;

    fn test_server() -> (TempDir, TestServer) {
        let temp = TempDir::new().unwrap();
        let pool = db::init_db(&temp.path().join("cardbox.db")).unwrap();
        {
            let conn = pool.lock().unwrap();
            db::seed_demo_set(&conn).unwrap();
        }
        let server = TestServer::new(app(AppState::new(pool))).unwrap();
        (temp, server)
    }

    fn as_user(user_id: i64) -> (HeaderName, HeaderValue) {
        (
            HeaderName::from_static("x-user-id"),
            HeaderValue::from_str(&user_id.to_string()).unwrap(),
        )
    }

    fn cookie_header(token: &str) -> (HeaderName, HeaderValue) {
        (
            HeaderName::from_static("cookie"),
            HeaderValue::from_str(&format!("{}={}", config::SESSION_COOKIE, token)).unwrap(),
        )
    }

    async fn start(server: &TestServer, user_id: i64) -> Value {
        let (name, value) = as_user(user_id);
        let response = server
            .post("/study/start")
            .add_header(name, value)
            .json(&json!({ "studySetId": 1 }))
            .await;
        response.assert_status_ok();
        response.json::<Value>()
    }

    #[tokio::test]
    async fn test_start_then_page_then_review() {
        let (_temp, server) = test_server();

        let started = start(&server, 1).await;
        assert_eq!(started["totalCards"], 10);
        assert_eq!(started["currentIndex"], 0);
        let token = started["sessionToken"].as_str().unwrap().to_string();
        let enrollment_id = started["enrollmentId"].as_i64().unwrap();

        // Page of four new cards
        let (cookie_name, cookie_value) = cookie_header(&token);
        let response = server
            .get("/study/cards?direction=next&limit=4")
            .add_header(cookie_name, cookie_value)
            .await;
        response.assert_status_ok();
        let page = response.json::<Value>();
        assert_eq!(page["currentIndex"], 4);
        assert_eq!(page["totalCards"], 10);
        let data = page["data"].as_array().unwrap();
        assert_eq!(data.len(), 4);
        let flashcard_id = data[0]["flashcardId"].as_i64().unwrap();

        // Rate the first card "Hard"
        let (user_name, user_value) = as_user(1);
        let buckets = server
            .get(&format!("/study/difficulties?enrollmentId={}", enrollment_id))
            .add_header(user_name, user_value)
            .await
            .json::<Vec<Value>>();
        let hard = buckets.iter().find(|b| b["name"] == "Hard").unwrap();

        let (user_name, user_value) = as_user(1);
        let response = server
            .post("/study/review")
            .add_header(user_name, user_value)
            .json(&json!({
                "enrollmentId": enrollment_id,
                "flashcardId": flashcard_id,
                "difficultyId": hard["id"],
            }))
            .await;
        response.assert_status_ok();

        // The rated card disappears from the rewound window
        let (cookie_name, cookie_value) = cookie_header(&token);
        server
            .get("/study/cards?direction=prev&limit=4")
            .add_header(cookie_name, cookie_value)
            .await
            .assert_status_ok();
        let (cookie_name, cookie_value) = cookie_header(&token);
        let page = server
            .get("/study/cards?direction=next&limit=4")
            .add_header(cookie_name, cookie_value)
            .await
            .json::<Value>();
        let ids: Vec<i64> = page["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["flashcardId"].as_i64().unwrap())
            .collect();
        assert_eq!(ids.len(), 3);
        assert!(!ids.contains(&flashcard_id));
    }

    #[tokio::test]
    async fn test_missing_identity_header_rejected() {
        let (_temp, server) = test_server();
        let response = server.post("/study/start").json(&json!({ "studySetId": 1 })).await;
        response.assert_status_bad_request();
    }

    #[tokio::test]
    async fn test_unknown_session_cookie_is_gone() {
        let (_temp, server) = test_server();
        let (name, value) = cookie_header("bogus");
        let response = server.get("/study/cards").add_header(name, value).await;
        assert_eq!(response.status_code(), 410);
    }

    #[tokio::test]
    async fn test_missing_session_cookie_is_gone() {
        let (_temp, server) = test_server();
        let response = server.get("/study/cards").await;
        assert_eq!(response.status_code(), 410);
    }

    #[tokio::test]
    async fn test_bad_direction_rejected() {
        let (_temp, server) = test_server();
        let started = start(&server, 1).await;
        let token = started["sessionToken"].as_str().unwrap();

        let (name, value) = cookie_header(token);
        let response = server
            .get("/study/cards?direction=sideways&limit=4")
            .add_header(name, value)
            .await;
        response.assert_status_bad_request();
    }

    #[tokio::test]
    async fn test_empty_set_not_found() {
        let (_temp, server) = test_server();
        let (name, value) = as_user(1);
        let response = server
            .post("/study/start")
            .add_header(name, value)
            .json(&json!({ "studySetId": 999 }))
            .await;
        response.assert_status_not_found();
    }

    #[tokio::test]
    async fn test_configure_difficulties_roundtrip() {
        let (_temp, server) = test_server();
        let started = start(&server, 1).await;
        let enrollment_id = started["enrollmentId"].as_i64().unwrap();

        let (name, value) = as_user(1);
        let response = server
            .put("/study/difficulties")
            .add_header(name, value)
            .json(&json!({
                "enrollmentId": enrollment_id,
                "difficulties": [{ "name": "Easy", "minutes": 5 }],
            }))
            .await;
        response.assert_status_ok();

        let (name, value) = as_user(1);
        let buckets = server
            .get(&format!("/study/difficulties?enrollmentId={}", enrollment_id))
            .add_header(name, value)
            .await
            .json::<Vec<Value>>();
        let easy = buckets.iter().find(|b| b["name"] == "Easy").unwrap();
        assert_eq!(easy["minutes"], 5);
    }

    #[tokio::test]
    async fn test_complete_then_restart_resets_progress() {
        let (_temp, server) = test_server();
        let started = start(&server, 1).await;
        let token = started["sessionToken"].as_str().unwrap().to_string();
        let enrollment_id = started["enrollmentId"].as_i64().unwrap();

        let (name, value) = cookie_header(&token);
        server
            .get("/study/cards?direction=next&limit=10")
            .add_header(name, value)
            .await
            .assert_status_ok();

        let (name, value) = as_user(1);
        server
            .post("/study/complete")
            .add_header(name, value)
            .json(&json!({ "enrollmentId": enrollment_id }))
            .await
            .assert_status_ok();

        let restarted = start(&server, 1).await;
        assert_eq!(restarted["enrollmentId"].as_i64().unwrap(), enrollment_id);
        assert_eq!(restarted["currentIndex"], 0);
    }

    #[tokio::test]
    async fn test_end_study_invalidates_session() {
        let (_temp, server) = test_server();
        let started = start(&server, 1).await;
        let token = started["sessionToken"].as_str().unwrap().to_string();

        let (name, value) = cookie_header(&token);
        server.post("/study/end").add_header(name, value).await.assert_status_ok();

        let (name, value) = cookie_header(&token);
        let response = server.get("/study/cards").add_header(name, value).await;
        assert_eq!(response.status_code(), 410);
    }
}
