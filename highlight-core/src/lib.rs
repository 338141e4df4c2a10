//! # highlight-core — Destaque de menções sobrepostas em HTML
//!
//! Este crate transforma um texto e um conjunto de anotações por intervalo de
//! caracteres (menções de entidades, conceitos, termos) em marcação HTML bem
//! aninhada, pronta para exibição. Anotações podem se sobrepor ou se cruzar:
//! o renderizador divide as que cruzam em fragmentos e liga os fragmentos por
//! um identificador comum.
//!
//! ## Arquitetura do Sistema
//!
//! O dado flui em uma direção só:
//!
//! 1.  **Entrada**: texto bruto e registros de [`Mention`] vindos do armazenamento.
//! 2.  **Adaptação** ([`adapter`]): filtra por autorização, descarta menções
//!     substituídas e gera um [`OffsetItem`] por menção, com identificador
//!     estável ([`identifier`]).
//! 3.  **Normalização** ([`normalizer`]): lê o texto em blocos de tamanho fixo,
//!     trocando `&nbsp;` por espaço sem deslocar offsets.
//! 4.  **Renderização** ([`render`]): percorre os caracteres abrindo e fechando
//!     tags conforme as fronteiras das anotações.
//! 5.  **Saída**: marcação + bloco `<style>` por profundidade ([`style`]).
//!
//! ## Exemplo de Uso
//!
//! ```rust
//! use highlight_core::{mentions_to_offset_items, authorize_all, Mention, Renderer};
//!
//! let text = "Test highlight of Joe Ferner.";
//! let mention = Mention::builder()
//!     .id("m1")
//!     .out_entity_id("doc-1")
//!     .process("regras")
//!     .range(18, 28)
//!     .title("joe ferner")
//!     .build()
//!     .unwrap();
//!
//! let items = mentions_to_offset_items(&[mention], text, authorize_all).unwrap();
//! let highlighted = Renderer::default().render(text, &items).unwrap();
//!
//! assert!(highlighted.markup.starts_with("Test highlight of <span class=\"resolvable res TM_18-28-"));
//! assert_eq!(highlighted.max_depth, 1);
//! ```
//!
//! ## Módulos Principais
//!
//! - [`render`]: o renderizador e o processamento em lote.
//! - [`offset_item`]: o contrato que o renderizador consome.
//! - [`adapter`]: menções persistidas → itens renderizáveis.
//! - [`normalizer`]: leitura com buffer limitado e substituição de entidades.

pub mod adapter;
pub mod config;
pub mod error;
pub mod identifier;
pub mod mention;
pub mod normalizer;
pub mod offset_item;
pub mod render;
pub mod style;

pub use adapter::{authorize_all, mentions_to_offset_items, visibility_in, MentionOffsetItem};
pub use config::HighlightConfig;
pub use error::{HighlightError, Result};
pub use mention::{Mention, Resolution, SandboxStatus};
pub use offset_item::{InfoJson, OffsetItem, StaticOffsetItem};
pub use render::{highlight_text, Document, Highlighted, Renderer};
