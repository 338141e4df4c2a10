//! # Identificador estável de menções
//!
//! Cada menção recebe um identificador `TM_{start}-{end}-{digest}`, onde o
//! digest é um SHA-256 sobre uma string canônica versionada. O mesmo conteúdo
//! lógico sempre produz o mesmo identificador, o que torna o re-destaque
//! idempotente entre chamadas e reinícios de processo.
//!
//! ## String canônica (`v1`)
//!
//! `"v1"` seguido de cada campo, na ordem fixa abaixo, cada um prefixado pelo
//! separador de unidade `U+001F`:
//!
//! 1. process
//! 2. concept_type (ou `""`)
//! 3. out_entity_id
//! 4. start
//! 5. end
//! 6. title
//! 7. resolved_to_entity_id (ou `""`)
//! 8. resolved_to_relation_id (ou `""`)
//!
//! Trocar o algoritmo de hash exige apenas uma nova versão da string canônica;
//! o formato `TM_{start}-{end}-` permanece.

use sha2::{Digest, Sha256};

/// Versão da construção canônica usada no digest.
pub const CANONICAL_VERSION: &str = "v1";

/// Prefixo de todo identificador de menção.
pub const IDENTIFIER_PREFIX: &str = "TM_";

const FIELD_SEPARATOR: char = '\u{1f}';

/// Campos que determinam a identidade de uma menção.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IdentifierParts<'a> {
    pub process: &'a str,
    pub concept_type: Option<&'a str>,
    pub out_entity_id: &'a str,
    pub start: usize,
    pub end: usize,
    pub title: &'a str,
    pub resolved_to_entity_id: Option<&'a str>,
    pub resolved_to_relation_id: Option<&'a str>,
}

impl IdentifierParts<'_> {
    fn canonical(&self) -> String {
        let start = self.start.to_string();
        let end = self.end.to_string();
        let fields = [
            self.process,
            self.concept_type.unwrap_or(""),
            self.out_entity_id,
            start.as_str(),
            end.as_str(),
            self.title,
            self.resolved_to_entity_id.unwrap_or(""),
            self.resolved_to_relation_id.unwrap_or(""),
        ];

        let mut canonical = String::from(CANONICAL_VERSION);
        for field in fields {
            canonical.push(FIELD_SEPARATOR);
            canonical.push_str(field);
        }
        canonical
    }
}

/// Gera o identificador `TM_{start}-{end}-{digest}`.
pub fn mention_identifier(parts: &IdentifierParts<'_>) -> String {
    let digest = Sha256::digest(parts.canonical().as_bytes());
    format!(
        "{}{}-{}-{}",
        IDENTIFIER_PREFIX,
        parts.start,
        parts.end,
        hex::encode(digest)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn joe() -> IdentifierParts<'static> {
        IdentifierParts {
            process: "EntityHighlighterTest",
            concept_type: Some("http://example.org/person"),
            out_entity_id: "1",
            start: 18,
            end: 28,
            title: "joe ferner",
            resolved_to_entity_id: None,
            resolved_to_relation_id: None,
        }
    }

    #[test]
    fn test_identifier_format() {
        let id = mention_identifier(&joe());
        assert!(id.starts_with("TM_18-28-"));
        let digest = id.trim_start_matches("TM_18-28-");
        assert_eq!(digest.len(), 64);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_identifier_is_deterministic() {
        let a = mention_identifier(&joe());
        let b = mention_identifier(&joe());
        assert_eq!(a, b);
    }

    #[test]
    fn test_identifier_depends_on_every_field() {
        let base = mention_identifier(&joe());
        let variants = [
            IdentifierParts { process: "other", ..joe() },
            IdentifierParts { concept_type: None, ..joe() },
            IdentifierParts { out_entity_id: "2", ..joe() },
            IdentifierParts { title: "Joe Ferner", ..joe() },
            IdentifierParts { resolved_to_entity_id: Some("jf"), ..joe() },
            IdentifierParts { resolved_to_relation_id: Some("e1"), ..joe() },
        ];
        for variant in variants {
            assert_ne!(mention_identifier(&variant), base);
        }
    }

    #[test]
    fn test_separator_prevents_field_ambiguity() {
        // "ab" + "" e "a" + "b" não podem colidir
        let a = IdentifierParts { process: "ab", concept_type: Some(""), ..joe() };
        let b = IdentifierParts { process: "a", concept_type: Some("b"), ..joe() };
        assert_ne!(mention_identifier(&a), mention_identifier(&b));
    }
}
