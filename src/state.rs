use axum::extract::FromRef;

use crate::{config::Config, store::DocStore};

#[derive(Clone)]
pub struct AppState {
    pub store: DocStore,
    pub config: Config,
}

impl FromRef<AppState> for DocStore {
    fn from_ref(state: &AppState) -> Self {
        state.store.clone()
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}
