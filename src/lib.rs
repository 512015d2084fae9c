pub mod cadastro;
pub mod config;
pub mod handlers;
pub mod models;
pub mod services;

use std::sync::Arc;

use axum::routing::post;
use axum::{middleware, Router};

use crate::config::Config;
use crate::handlers::lead::{metodo_nao_permitido, preflight, recebe_lead, sem_cache};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub http_client: reqwest::Client,
}

//unica rota da API; o restante da landing page e estatico e servido pela CDN
pub fn app(estado: AppState) -> Router {
    Router::new()
        .route(
            "/api/lead",
            post(recebe_lead)
                .options(preflight)
                .fallback(metodo_nao_permitido),
        )
        .layer(middleware::from_fn(sem_cache))
        .with_state(estado)
}
