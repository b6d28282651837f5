//! Application state shared across handlers

use crate::{jwt::JwtService, service::LeaderboardService};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub service: LeaderboardService,
    pub jwt_service: JwtService,
}
