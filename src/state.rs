use std::sync::Arc;

use crate::config::Config;
use crate::policy::ContentPolicy;
use axum::extract::FromRef;

#[derive(Clone)]
pub struct AppState {
    pub policy: Arc<ContentPolicy>,
    pub config: Config,
}

impl FromRef<AppState> for Arc<ContentPolicy> {
    fn from_ref(state: &AppState) -> Self {
        state.policy.clone()
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}
