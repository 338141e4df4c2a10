//! Configuração do renderizador.

use serde::{Deserialize, Serialize};

use crate::normalizer::DEFAULT_BUFFER_SIZE;

/// Parâmetros do renderizador.
///
/// Os valores padrão reproduzem a marcação esperada pelo frontend:
/// contêiner `.text`, marcador `.res` e quebra de linha `<br>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    /// Tamanho (em bytes) do buffer de leitura do normalizador.
    pub buffer_size: usize,
    /// Classe do elemento que contém o texto destacado.
    pub container_class: String,
    /// Classe presente em toda tag de menção.
    pub marker_class: String,
    /// Elemento emitido após cada `\n`.
    pub line_break: String,
    /// Se `false`, o bloco `<style>` não é gerado.
    pub emit_style: bool,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            buffer_size: DEFAULT_BUFFER_SIZE,
            container_class: "text".to_string(),
            marker_class: "res".to_string(),
            line_break: "<br>".to_string(),
            emit_style: true,
        }
    }
}
