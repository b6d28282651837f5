//! Leaderboard service routes

use axum::{
    Extension, Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Redirect},
    routing::{delete, get, post},
};
use chrono::Utc;
use serde_json::json;
use tracing::{error, info};
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    jwt::Claims,
    middleware::auth_middleware,
    models::{
        ActivityQuery, LimitQuery, LoginCredentials, NewActivity, NewUser, PageRequest,
        PromoteAdmin, RegisterQuery, WindowQuery,
    },
    state::AppState,
};

/// Create the router for the leaderboard service
pub fn create_router(state: AppState) -> Router {
    let protected_routes = Router::new()
        .route("/api/leaderboard/my-rank", get(my_rank))
        .route("/api/leaderboard/my-position", get(my_position))
        .route("/api/activities", post(record_activity))
        .route("/api/referrals/stats", get(referral_stats))
        .route("/api/referrals/dashboard", get(referral_dashboard))
        .route("/api/referrals/my-code", get(my_referral_code))
        .route("/api/admin/users", delete(clear_users))
        .route("/api/admin/activities", delete(clear_activities))
        .route("/api/admin/promote", post(promote_admin))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/api/health", get(health_check))
        .route("/ref/:code", get(referral_redirect))
        .route("/register", get(register_redirect))
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/leaderboard", get(leaderboard))
        .route("/api/leaderboard/waitlist", get(waitlist))
        .route("/api/leaderboard/referrals", get(top_referrers))
        .route("/api/leaderboard/user/:id", get(user_rank))
        .route("/api/leaderboard/user/:id/around", get(user_window))
        .route("/api/users", get(list_users))
        .route("/api/users/:id", get(get_user))
        .route("/api/activities", get(list_activities))
        .route("/api/activities/user/:id", get(list_user_activities))
        .route(
            "/api/referrals/validate/:code",
            get(validate_referral_code).post(validate_referral_code),
        )
        .merge(protected_routes)
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "leaderboard-service",
        "total_users": state.service.total_users(),
        "timestamp": Utc::now(),
    }))
}

/// Share link target: forward to the app with the code attached
pub async fn referral_redirect(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> impl IntoResponse {
    Redirect::temporary(&state.service.referral_link(&code))
}

/// Registration link: forward to the app, keeping `?ref=` if present
pub async fn register_redirect(
    State(state): State<AppState>,
    Query(query): Query<RegisterQuery>,
) -> impl IntoResponse {
    Redirect::temporary(&state.service.registration_link(query.referral_code.as_deref()))
}

/// Run store writes and credential hashing off the async workers
async fn blocking<T, F>(f: F) -> ApiResult<T>
where
    F: FnOnce() -> ApiResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f).await.map_err(|e| {
        error!("Blocking task failed: {}", e);
        ApiError::InternalServerError
    })?
}

pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<NewUser>,
) -> ApiResult<impl IntoResponse> {
    let service = state.service.clone();
    let response = blocking(move || service.register_user(&payload)).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginCredentials>,
) -> ApiResult<impl IntoResponse> {
    info!("Login attempt for {}", payload.email);
    let service = state.service.clone();
    Ok(Json(blocking(move || service.authenticate_user(&payload)).await?))
}

pub async fn leaderboard(
    State(state): State<AppState>,
    Query(request): Query<PageRequest>,
) -> impl IntoResponse {
    Json(state.service.get_leaderboard_page(&request))
}

pub async fn waitlist(
    State(state): State<AppState>,
    Query(request): Query<PageRequest>,
) -> impl IntoResponse {
    Json(state.service.get_waitlist_page(&request))
}

pub async fn top_referrers(
    State(state): State<AppState>,
    Query(query): Query<LimitQuery>,
) -> impl IntoResponse {
    Json(state.service.get_top_referrers(query.limit()))
}

pub async fn user_rank(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.service.get_user_rank(id)?))
}

pub async fn user_window(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<WindowQuery>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.service.get_user_window(id, query.range())?))
}

pub async fn my_rank(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.service.get_user_rank(claims.sub)?))
}

pub async fn my_position(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.service.get_waitlist_standing(claims.sub)?))
}

pub async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<LimitQuery>,
) -> impl IntoResponse {
    Json(state.service.list_users(query.limit()))
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let user = state.service.get_user_by_id(id)?;
    Ok(Json(json!({ "user": user })))
}

pub async fn list_activities(
    State(state): State<AppState>,
    Query(query): Query<ActivityQuery>,
) -> impl IntoResponse {
    Json(state.service.list_activities(&query))
}

pub async fn list_user_activities(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<ActivityQuery>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.service.list_user_activities(id, &query)?))
}

/// Award points to the caller
pub async fn record_activity(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<NewActivity>,
) -> ApiResult<impl IntoResponse> {
    let service = state.service.clone();
    let recorded = blocking(move || service.record_activity(claims.sub, &payload)).await?;
    Ok((StatusCode::CREATED, Json(recorded)))
}

pub async fn referral_stats(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.service.get_referral_stats(claims.sub)?))
}

pub async fn referral_dashboard(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.service.get_referral_dashboard(claims.sub)?))
}

pub async fn my_referral_code(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.service.get_referral_code(claims.sub)?))
}

pub async fn validate_referral_code(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.service.validate_referral_code(&code)?))
}

pub async fn clear_users(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<impl IntoResponse> {
    state.service.require_admin(claims.sub)?;
    let service = state.service.clone();
    let deleted = blocking(move || service.clear_users()).await?;
    info!("Admin {} cleared {} users", claims.sub, deleted);
    Ok(Json(json!({ "message": "All users cleared", "deleted": deleted })))
}

pub async fn clear_activities(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<impl IntoResponse> {
    state.service.require_admin(claims.sub)?;
    let service = state.service.clone();
    let deleted = blocking(move || service.clear_activities()).await?;
    info!("Admin {} cleared {} activities", claims.sub, deleted);
    Ok(Json(json!({ "message": "All activities cleared", "deleted": deleted })))
}

pub async fn promote_admin(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<PromoteAdmin>,
) -> ApiResult<impl IntoResponse> {
    state.service.require_admin(claims.sub)?;
    let service = state.service.clone();
    let user = blocking(move || service.promote_admin(&payload.email)).await?;
    Ok(Json(json!({ "message": "User promoted to admin", "user": user })))
}
