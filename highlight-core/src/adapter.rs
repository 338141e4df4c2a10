//! # Adaptador Menção → OffsetItem
//!
//! Converte os registros de menção de um texto nos itens que o renderizador
//! consome:
//!
//! 1. Descarta o que o predicado de autorização rejeita.
//! 2. Descarta menções substituídas por outra menção visível (`resolved_from`).
//! 3. Valida os intervalos contra o texto (falha imediata, nunca corrige).
//! 4. Constrói um [`MentionOffsetItem`] por menção, preservando a ordem de entrada.
//! 5. Descarta repetições: menções de mesmo conteúdo geram o mesmo identificador
//!    e só a primeira é mantida.
//!
//! A ordenação para renderização acontece dentro do renderizador, não aqui.

use std::collections::HashSet;

use serde_json::Value;
use tracing::{debug, trace};

use crate::error::{HighlightError, Result};
use crate::identifier::{mention_identifier, IdentifierParts};
use crate::mention::Mention;
use crate::offset_item::{check_interval, InfoJson, OffsetItem};

/// Classe de uma menção que já aponta para um alvo.
pub const RESOLVED_CLASS: &str = "resolved";
/// Classe de uma menção candidata, ainda sem alvo.
pub const RESOLVABLE_CLASS: &str = "resolvable";
/// Classe presente em toda menção.
pub const MENTION_CLASS: &str = "res";

/// OffsetItem construído a partir de uma [`Mention`].
#[derive(Debug, Clone, PartialEq)]
pub struct MentionOffsetItem {
    mention_id: String,
    start: usize,
    end: usize,
    title: String,
    class_identifier: String,
    resolved: bool,
    info: InfoJson,
}

impl MentionOffsetItem {
    /// Constrói o item a partir de um registro; falha se o intervalo for inválido.
    pub fn from_mention(mention: &Mention) -> Result<Self> {
        check_interval(mention.start, mention.end)?;

        let resolution = mention.resolution.as_ref();
        let resolved_to_entity_id = resolution.map(|r| r.entity_id.as_str());
        let resolved_to_relation_id = resolution.and_then(|r| r.relation_id.as_deref());

        let class_identifier = mention_identifier(&IdentifierParts {
            process: &mention.process,
            concept_type: mention.concept_type.as_deref(),
            out_entity_id: &mention.out_entity_id,
            start: mention.start,
            end: mention.end,
            title: &mention.title,
            resolved_to_entity_id,
            resolved_to_relation_id,
        });

        // A ordem de inserção é a ordem de serialização (preserve_order).
        let mut info = InfoJson::new();
        info.insert("process".into(), Value::from(mention.process.as_str()));
        if let Some(entity_id) = resolved_to_entity_id {
            info.insert("resolvedToVertexId".into(), Value::from(entity_id));
            if let Some(relation_id) = resolved_to_relation_id {
                info.insert("resolvedToEdgeId".into(), Value::from(relation_id));
            }
        }
        if let Some(concept_type) = &mention.concept_type {
            info.insert("conceptType".into(), Value::from(concept_type.as_str()));
        }
        info.insert("start".into(), Value::from(mention.start));
        if let Some(entity_id) = resolved_to_entity_id {
            info.insert("termMentionFor".into(), Value::from("VERTEX"));
            info.insert("termMentionForElementId".into(), Value::from(entity_id));
        }
        info.insert("end".into(), Value::from(mention.end));
        info.insert("id".into(), Value::from(class_identifier.as_str()));
        info.insert("outVertexId".into(), Value::from(mention.out_entity_id.as_str()));
        info.insert("title".into(), Value::from(mention.title.as_str()));
        info.insert(
            "sandboxStatus".into(),
            Value::from(mention.sandbox_status.as_str()),
        );
        if let Some(resolved_from) = &mention.resolved_from {
            info.insert(
                "resolvedFromTermMentionId".into(),
                Value::from(resolved_from.as_str()),
            );
        }

        Ok(Self {
            mention_id: mention.id.clone(),
            start: mention.start,
            end: mention.end,
            title: mention.title.clone(),
            class_identifier,
            resolved: resolution.is_some(),
            info,
        })
    }

    /// Id do registro de origem no armazenamento.
    pub fn mention_id(&self) -> &str {
        &self.mention_id
    }
}

impl OffsetItem for MentionOffsetItem {
    fn start(&self) -> usize {
        self.start
    }

    fn end(&self) -> usize {
        self.end
    }

    fn title(&self) -> Option<&str> {
        Some(&self.title)
    }

    fn css_classes(&self) -> Vec<String> {
        let state = if self.resolved {
            RESOLVED_CLASS
        } else {
            RESOLVABLE_CLASS
        };
        vec![
            state.to_string(),
            MENTION_CLASS.to_string(),
            self.class_identifier.clone(),
        ]
    }

    fn info_json(&self) -> &InfoJson {
        &self.info
    }

    fn class_identifier(&self) -> Option<&str> {
        Some(&self.class_identifier)
    }

    fn is_resolved(&self) -> bool {
        self.resolved
    }
}

/// Converte as menções de um texto em itens prontos para o renderizador.
///
/// `authorize` vem da camada de controle de acesso; o adaptador nunca
/// interpreta regras de visibilidade por conta própria.
pub fn mentions_to_offset_items<F>(
    mentions: &[Mention],
    text: &str,
    authorize: F,
) -> Result<Vec<MentionOffsetItem>>
where
    F: Fn(&Mention) -> bool,
{
    let visible: Vec<&Mention> = mentions
        .iter()
        .filter(|m| {
            let allowed = authorize(*m);
            if !allowed {
                trace!(mention = %m.id, "menção rejeitada pela autorização");
            }
            allowed
        })
        .collect();

    let superseded: HashSet<&str> = visible
        .iter()
        .filter_map(|m| m.resolved_from.as_deref())
        .collect();

    let len = text.chars().count();
    let mut items = Vec::with_capacity(visible.len());
    let mut emitted: HashSet<String> = HashSet::new();

    for mention in visible {
        if superseded.contains(mention.id.as_str()) {
            debug!(mention = %mention.id, "menção substituída por resolução mais nova");
            continue;
        }
        check_interval(mention.start, mention.end)?;
        if mention.end > len {
            return Err(HighlightError::OutOfBounds { end: mention.end, len });
        }
        let item = MentionOffsetItem::from_mention(mention)?;
        if !emitted.insert(item.class_identifier.clone()) {
            debug!(mention = %mention.id, "menção com conteúdo idêntico a outra já convertida");
            continue;
        }
        items.push(item);
    }

    debug!(total = mentions.len(), items = items.len(), "menções convertidas");
    Ok(items)
}

/// Predicado que aceita qualquer menção.
pub fn authorize_all(_mention: &Mention) -> bool {
    true
}

/// Predicado que aceita menções sem etiqueta de visibilidade ou com uma
/// etiqueta presente em `authorizations`.
pub fn visibility_in(authorizations: &[String]) -> impl Fn(&Mention) -> bool + '_ {
    move |mention: &Mention| {
        mention.visibility.is_empty() || authorizations.iter().any(|a| *a == mention.visibility)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PERSON: &str = "http://example.org/test/person";

    fn mention(id: &str, title: &str, start: usize, end: usize) -> Mention {
        Mention::builder()
            .id(id)
            .out_entity_id("1")
            .process("EntityHighlighterTest")
            .concept_type(PERSON)
            .range(start, end)
            .title(title)
            .build()
            .unwrap()
    }

    #[test]
    fn test_empty_input() {
        let items = mentions_to_offset_items(&[], "", authorize_all).unwrap();
        assert!(items.is_empty());
    }

    #[test]
    fn test_item_classes_and_info() {
        let text = "Test highlight of Joe Ferner.";
        let items =
            mentions_to_offset_items(&[mention("m1", "joe ferner", 18, 28)], text, authorize_all)
                .unwrap();
        let item = &items[0];
        let id = item.class_identifier().unwrap().to_string();

        assert!(id.starts_with("TM_18-28-"));
        assert_eq!(item.css_classes(), vec!["resolvable", "res", id.as_str()]);
        assert_eq!(item.title(), Some("joe ferner"));
        assert!(!item.is_resolved());
        assert!(item.should_highlight());
        assert_eq!(item.mention_id(), "m1");

        let json = serde_json::to_string(item.info_json()).unwrap();
        let expected = format!(
            "{{\"process\":\"EntityHighlighterTest\",\"conceptType\":\"{PERSON}\",\"start\":18,\"end\":28,\"id\":\"{id}\",\"outVertexId\":\"1\",\"title\":\"joe ferner\",\"sandboxStatus\":\"PRIVATE\"}}"
        );
        assert_eq!(json, expected);
    }

    #[test]
    fn test_resolved_item_info() {
        let resolved = Mention::builder()
            .id("m2")
            .out_entity_id("1")
            .process("p")
            .range(0, 4)
            .title("This")
            .resolved_to("v1", Some("e1"))
            .resolved_from("m1")
            .build()
            .unwrap();
        let items = mentions_to_offset_items(&[resolved], "This is", authorize_all).unwrap();
        let item = &items[0];

        assert!(item.is_resolved());
        assert_eq!(item.css_classes()[0], "resolved");
        let keys: Vec<&str> = item.info_json().keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            vec![
                "process",
                "resolvedToVertexId",
                "resolvedToEdgeId",
                "start",
                "termMentionFor",
                "termMentionForElementId",
                "end",
                "id",
                "outVertexId",
                "title",
                "sandboxStatus",
                "resolvedFromTermMentionId",
            ]
        );
        assert_eq!(item.info_json()["resolvedFromTermMentionId"], "m1");
    }

    #[test]
    fn test_identical_content_gives_identical_identifier() {
        let text = "Joe Ferner and Joe Ferner";
        let a = mentions_to_offset_items(&[mention("a", "joe", 0, 3)], text, authorize_all).unwrap();
        let b = mentions_to_offset_items(&[mention("b", "joe", 0, 3)], text, authorize_all).unwrap();
        // o id de armazenamento não faz parte da identidade
        assert_eq!(a[0].class_identifier(), b[0].class_identifier());
    }

    #[test]
    fn test_identical_mentions_are_deduplicated() {
        let text = "Joe x";
        let items = mentions_to_offset_items(
            &[mention("m1", "joe", 0, 3), mention("m2", "joe", 0, 3)],
            text,
            authorize_all,
        )
        .unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].mention_id(), "m1");

        let highlighted = crate::render::Renderer::default().render(text, &items).unwrap();
        assert_eq!(highlighted.max_depth, 1);
        assert!(!highlighted.markup.contains("data-ref=\""));
    }

    #[test]
    fn test_same_range_different_content_both_kept() {
        let text = "Test highlight of Joe Ferner.";
        let mut other = mention("m2", "joe ferner", 18, 28);
        other.process = "uniq1".to_string();
        let items = mentions_to_offset_items(
            &[mention("m1", "joe ferner", 18, 28), other],
            text,
            authorize_all,
        )
        .unwrap();
        assert_eq!(items.len(), 2);
        assert_ne!(items[0].class_identifier(), items[1].class_identifier());
    }

    #[test]
    fn test_superseded_mention_is_dropped_in_any_order() {
        let text = "This is a test sentence";
        let old = mention("old", "Wrong", 0, 4);
        let new = Mention::builder()
            .id("new")
            .out_entity_id("1")
            .process("EntityHighlighterTest")
            .range(0, 4)
            .title("This")
            .resolved_to("v1", Some("e1"))
            .resolved_from("old")
            .build()
            .unwrap();

        for input in [vec![old.clone(), new.clone()], vec![new.clone(), old.clone()]] {
            let items = mentions_to_offset_items(&input, text, authorize_all).unwrap();
            assert_eq!(items.len(), 1);
            assert_eq!(items[0].mention_id(), "new");
        }
    }

    #[test]
    fn test_unauthorized_supersession_does_not_hide() {
        // se a menção nova não é visível, a antiga continua aparecendo
        let text = "This is";
        let old = mention("old", "This", 0, 4);
        let mut new = mention("new", "This", 0, 4);
        new.resolved_from = Some("old".to_string());
        new.visibility = "secret".to_string();

        let items = mentions_to_offset_items(&[old, new], text, visibility_in(&[])).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].mention_id(), "old");
    }

    #[test]
    fn test_authorization_filter() {
        let text = "Joe and Jeff";
        let mut secret = mention("s", "jeff", 8, 12);
        secret.visibility = "secret".to_string();
        let mentions = vec![mention("p", "joe", 0, 3), secret];

        let items = mentions_to_offset_items(&mentions, text, visibility_in(&[])).unwrap();
        assert_eq!(items.len(), 1);

        let auths = vec!["secret".to_string()];
        let items = mentions_to_offset_items(&mentions, text, visibility_in(&auths)).unwrap();
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn test_invalid_interval_fails_fast() {
        let mut bad = mention("m", "x", 0, 1);
        bad.start = 3;
        bad.end = 3;
        let err = mentions_to_offset_items(&[bad], "abcdef", authorize_all).unwrap_err();
        assert!(matches!(err, HighlightError::InvalidInterval { start: 3, end: 3 }));
    }

    #[test]
    fn test_out_of_bounds_fails_fast() {
        let err =
            mentions_to_offset_items(&[mention("m", "x", 2, 10)], "short", authorize_all).unwrap_err();
        assert!(matches!(err, HighlightError::OutOfBounds { end: 10, len: 5 }));
    }

    #[test]
    fn test_bounds_are_counted_in_chars() {
        // "Ejército" tem 8 caracteres e 9 bytes
        let items =
            mentions_to_offset_items(&[mention("m", "x", 0, 8)], "Ejército", authorize_all).unwrap();
        assert_eq!(items.len(), 1);
    }
}
