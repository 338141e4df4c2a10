//! Servidor web Axum que expõe o destaque de menções via HTTP

mod config;
mod error;

use std::sync::Arc;

use axum::{
    extract::State,
    response::Json,
    routing::{get, post},
    Router,
};
use highlight_core::{mentions_to_offset_items, visibility_in, HighlightConfig, Mention, Renderer};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::error::AppError;

/// Estado compartilhado da aplicação
#[derive(Clone)]
struct AppState {
    renderer: Arc<Renderer>,
}

impl AppState {
    fn new(config: HighlightConfig) -> Self {
        Self {
            renderer: Arc::new(Renderer::new(config)),
        }
    }
}

#[derive(Deserialize)]
struct HighlightRequest {
    #[serde(default)]
    text: String,
    #[serde(default)]
    mentions: Vec<Mention>,
    /// Etiquetas de visibilidade que o chamador pode ver.
    #[serde(default)]
    authorizations: Vec<String>,
}

#[derive(Serialize)]
struct HighlightResponse {
    markup: String,
    style: String,
    html: String,
    max_depth: usize,
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();
    let config = Config::from_env().unwrap_or_else(|e| {
        tracing::warn!("configuração do ambiente ignorada: {}, usando padrões", e);
        Config::default()
    });

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("🚀 Servidor de destaque iniciado em http://{}", addr);
    axum::serve(listener, app(AppState::new(config.highlight))).await?;
    Ok(())
}

fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_handler))
        .route("/highlight", post(highlight_handler))
        .layer(cors)
        .with_state(state)
}

async fn health_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Converte as menções visíveis e renderiza o texto
async fn highlight_handler(
    State(state): State<AppState>,
    Json(req): Json<HighlightRequest>,
) -> Result<Json<HighlightResponse>, AppError> {
    let mentions = req.mentions.len();
    let renderer = Arc::clone(&state.renderer);

    // Renderização é síncrona e limitada por CPU
    let highlighted = tokio::task::spawn_blocking(move || {
        let items = mentions_to_offset_items(
            &req.mentions,
            &req.text,
            visibility_in(&req.authorizations),
        )?;
        renderer.render(&req.text, &items)
    })
    .await??;

    info!(mentions, max_depth = highlighted.max_depth, "requisição de destaque atendida");

    let html = highlighted.to_string();
    Ok(Json(HighlightResponse {
        markup: highlighted.markup,
        style: highlighted.style,
        html,
        max_depth: highlighted.max_depth,
    }))
}
