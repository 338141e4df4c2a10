//! # Erros do destaque de menções
//!
//! Todos os erros são síncronos e locais ao componente que os detecta.
//! Não existe modo de resultado parcial: uma chamada ou termina por completo
//! ou falha com uma causa específica.

use thiserror::Error;

/// Resultado padrão do crate.
pub type Result<T> = std::result::Result<T, HighlightError>;

#[derive(Error, Debug)]
pub enum HighlightError {
    /// Intervalo vazio ou invertido (`start >= end`).
    #[error("intervalo inválido: start={start} end={end}")]
    InvalidInterval { start: usize, end: usize },

    /// O intervalo termina depois do fim do texto (offsets em caracteres).
    #[error("intervalo fora do texto: end={end} excede o tamanho {len}")]
    OutOfBounds { end: usize, len: usize },

    /// Um item precisa de ao menos uma classe CSS.
    #[error("item sem classes CSS")]
    MissingCssClasses,

    /// Metadados que não puderam ser codificados como JSON.
    #[error("metadados inválidos: {0}")]
    Metadata(#[from] serde_json::Error),

    /// Metadados codificados, mas que não formam um objeto JSON.
    #[error("metadados devem ser um objeto JSON")]
    MetadataNotObject,

    /// Sequência UTF-8 inválida vinda do leitor.
    #[error("UTF-8 inválido próximo ao caractere {offset}")]
    InvalidUtf8 { offset: usize },

    #[error("erro de leitura: {0}")]
    Io(#[from] std::io::Error),
}
