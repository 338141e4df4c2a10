//! # Menções persistidas
//!
//! Uma [`Mention`] afirma que um trecho de um texto se refere a um conceito ou
//! entidade. Ela vem do armazenamento externo (grafo) e carrega mais
//! informação do que o renderizador precisa: quem a detectou (`process`), qual
//! propriedade de texto a contém, a etiqueta de visibilidade e, quando
//! resolvida, o alvo da resolução.
//!
//! ## Cadeia "resolved-from"
//!
//! Quando uma análise mais nova substitui uma menção antiga no mesmo trecho,
//! a nova aponta para a antiga via `resolved_from`. Somente a mais nova é
//! exibida (ver [`crate::adapter`]).

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::offset_item::check_interval;

/// Estado de publicação da menção.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SandboxStatus {
    /// Visível apenas no workspace de quem criou.
    #[default]
    Private,
    /// Publicada.
    Public,
    /// Publicada, mas com alterações ainda privadas.
    PublicChanged,
}

impl SandboxStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SandboxStatus::Private => "PRIVATE",
            SandboxStatus::Public => "PUBLIC",
            SandboxStatus::PublicChanged => "PUBLIC_CHANGED",
        }
    }
}

/// Alvo concreto de uma menção resolvida.
///
/// A ligação é unidirecional: a entidade alvo não conhece a menção.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resolution {
    pub entity_id: String,
    #[serde(default)]
    pub relation_id: Option<String>,
}

/// Registro de menção como guardado pelo armazenamento externo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mention {
    /// Id do registro no armazenamento.
    pub id: String,
    /// Entidade dona do texto onde a menção aparece.
    pub out_entity_id: String,
    #[serde(default)]
    pub property_key: String,
    #[serde(default)]
    pub property_name: String,
    /// Processo que detectou a menção (ex: nome do analisador).
    pub process: String,
    #[serde(default)]
    pub concept_type: Option<String>,
    pub start: usize,
    pub end: usize,
    pub title: String,
    /// Etiqueta de visibilidade interpretada pela camada de autorização.
    #[serde(default)]
    pub visibility: String,
    #[serde(default)]
    pub sandbox_status: SandboxStatus,
    #[serde(default)]
    pub resolution: Option<Resolution>,
    /// Id da menção que esta substitui.
    #[serde(default)]
    pub resolved_from: Option<String>,
}

impl Mention {
    pub fn builder() -> MentionBuilder {
        MentionBuilder::default()
    }

    pub fn is_resolved(&self) -> bool {
        self.resolution.is_some()
    }
}

/// Construção fluente de [`Mention`].
///
/// # Exemplo
/// ```rust
/// use highlight_core::mention::Mention;
///
/// let mention = Mention::builder()
///     .id("m1")
///     .out_entity_id("doc-1")
///     .process("regras")
///     .concept_type("http://example.org/person")
///     .range(18, 28)
///     .title("joe ferner")
///     .build()
///     .unwrap();
/// assert!(!mention.is_resolved());
/// ```
#[derive(Debug, Clone, Default)]
pub struct MentionBuilder {
    id: String,
    out_entity_id: String,
    property_key: String,
    property_name: String,
    process: String,
    concept_type: Option<String>,
    start: usize,
    end: usize,
    title: String,
    visibility: String,
    sandbox_status: SandboxStatus,
    resolution: Option<Resolution>,
    resolved_from: Option<String>,
}

impl MentionBuilder {
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn out_entity_id(mut self, id: impl Into<String>) -> Self {
        self.out_entity_id = id.into();
        self
    }

    pub fn property(mut self, key: impl Into<String>, name: impl Into<String>) -> Self {
        self.property_key = key.into();
        self.property_name = name.into();
        self
    }

    pub fn process(mut self, process: impl Into<String>) -> Self {
        self.process = process.into();
        self
    }

    pub fn concept_type(mut self, concept_type: impl Into<String>) -> Self {
        self.concept_type = Some(concept_type.into());
        self
    }

    pub fn range(mut self, start: usize, end: usize) -> Self {
        self.start = start;
        self.end = end;
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn visibility(mut self, visibility: impl Into<String>) -> Self {
        self.visibility = visibility.into();
        self
    }

    pub fn sandbox_status(mut self, status: SandboxStatus) -> Self {
        self.sandbox_status = status;
        self
    }

    /// Marca a menção como resolvida para uma entidade (e relação opcional).
    pub fn resolved_to(mut self, entity_id: impl Into<String>, relation_id: Option<&str>) -> Self {
        self.resolution = Some(Resolution {
            entity_id: entity_id.into(),
            relation_id: relation_id.map(str::to_string),
        });
        self
    }

    pub fn resolved_from(mut self, mention_id: impl Into<String>) -> Self {
        self.resolved_from = Some(mention_id.into());
        self
    }

    pub fn build(self) -> Result<Mention> {
        check_interval(self.start, self.end)?;
        Ok(Mention {
            id: self.id,
            out_entity_id: self.out_entity_id,
            property_key: self.property_key,
            property_name: self.property_name,
            process: self.process,
            concept_type: self.concept_type,
            start: self.start,
            end: self.end,
            title: self.title,
            visibility: self.visibility,
            sandbox_status: self.sandbox_status,
            resolution: self.resolution,
            resolved_from: self.resolved_from,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HighlightError;

    #[test]
    fn test_builder_validates_range() {
        let err = Mention::builder().range(5, 5).build().unwrap_err();
        assert!(matches!(err, HighlightError::InvalidInterval { start: 5, end: 5 }));
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let mention: Mention = serde_json::from_str(
            r#"{"id":"m1","outEntityId":"1","process":"p","start":0,"end":4,"title":"This"}"#,
        )
        .unwrap();
        assert_eq!(mention.sandbox_status, SandboxStatus::Private);
        assert!(mention.resolution.is_none());
        assert!(mention.visibility.is_empty());
    }

    #[test]
    fn test_sandbox_status_serialization() {
        let json = serde_json::to_string(&SandboxStatus::PublicChanged).unwrap();
        assert_eq!(json, "\"PUBLIC_CHANGED\"");
        assert_eq!(SandboxStatus::PublicChanged.as_str(), "PUBLIC_CHANGED");
    }

    #[test]
    fn test_resolved_to() {
        let mention = Mention::builder()
            .range(0, 4)
            .resolved_to("v1", Some("e1"))
            .build()
            .unwrap();
        assert!(mention.is_resolved());
        assert_eq!(mention.resolution.unwrap().relation_id.as_deref(), Some("e1"));
    }
}
