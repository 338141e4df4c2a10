//! Erros do servidor e sua conversão em respostas HTTP.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use highlight_core::HighlightError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    /// Entrada rejeitada pelo núcleo (intervalo inválido, fora do texto...).
    #[error("{0}")]
    Highlight(#[from] HighlightError),

    #[error("configuração inválida: {0}")]
    Config(String),

    #[error("tarefa de renderização interrompida: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("erro de E/S: {0}")]
    Io(#[from] std::io::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Highlight(_) => StatusCode::BAD_REQUEST,
            other => {
                tracing::error!(error = %other, "erro interno");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}
