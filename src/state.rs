/*
 * Responsibility
 * - shared context attached to the Router (AppState)
 *   - auth: AuthService, health: HealthProbe
 * - cheap to Clone (Arc inside)
 */
use std::sync::Arc;

use crate::services::{auth::AuthService, health::HealthProbe};

#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthService>,
    pub health: Arc<dyn HealthProbe>,
}

impl AppState {
    pub fn new(auth: Arc<AuthService>, health: Arc<dyn HealthProbe>) -> Self {
        Self { auth, health }
    }
}
