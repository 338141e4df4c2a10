//! # OffsetItem — a visão de uma anotação para o renderizador
//!
//! O renderizador não conhece menções, grafos ou modelos de NER: ele só enxerga
//! um intervalo de caracteres com classes CSS e metadados. Qualquer produtor de
//! anotações (o adaptador de menções, um pipeline de NLP, um dublê de teste)
//! implementa [`OffsetItem`].
//!
//! Offsets são índices de caracteres (valores escalares Unicode) no texto
//! original, **antes** da substituição de `&nbsp;`.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{HighlightError, Result};

/// Metadados opacos de um item, emitidos uma única vez em `data-info`.
pub type InfoJson = Map<String, Value>;

/// Capacidades que o renderizador exige de uma anotação.
pub trait OffsetItem {
    /// Início do intervalo (inclusivo).
    fn start(&self) -> usize;

    /// Fim do intervalo (exclusivo).
    fn end(&self) -> usize;

    /// Texto coberto pela anotação, usado no atributo `title`.
    fn title(&self) -> Option<&str>;

    /// Classes CSS, da mais geral para a mais específica.
    fn css_classes(&self) -> Vec<String>;

    fn info_json(&self) -> &InfoJson;

    /// Identificador compartilhado por todos os fragmentos da anotação.
    fn class_identifier(&self) -> Option<&str>;

    /// Itens suprimidos participam da ordenação, mas nunca emitem tag.
    fn should_highlight(&self) -> bool {
        true
    }

    fn is_resolved(&self) -> bool {
        false
    }
}

impl<T: OffsetItem + ?Sized> OffsetItem for &T {
    fn start(&self) -> usize {
        (**self).start()
    }
    fn end(&self) -> usize {
        (**self).end()
    }
    fn title(&self) -> Option<&str> {
        (**self).title()
    }
    fn css_classes(&self) -> Vec<String> {
        (**self).css_classes()
    }
    fn info_json(&self) -> &InfoJson {
        (**self).info_json()
    }
    fn class_identifier(&self) -> Option<&str> {
        (**self).class_identifier()
    }
    fn should_highlight(&self) -> bool {
        (**self).should_highlight()
    }
    fn is_resolved(&self) -> bool {
        (**self).is_resolved()
    }
}

impl<T: OffsetItem + ?Sized> OffsetItem for Box<T> {
    fn start(&self) -> usize {
        (**self).start()
    }
    fn end(&self) -> usize {
        (**self).end()
    }
    fn title(&self) -> Option<&str> {
        (**self).title()
    }
    fn css_classes(&self) -> Vec<String> {
        (**self).css_classes()
    }
    fn info_json(&self) -> &InfoJson {
        (**self).info_json()
    }
    fn class_identifier(&self) -> Option<&str> {
        (**self).class_identifier()
    }
    fn should_highlight(&self) -> bool {
        (**self).should_highlight()
    }
    fn is_resolved(&self) -> bool {
        (**self).is_resolved()
    }
}

/// Valida um intervalo meio-aberto `[start, end)`.
pub(crate) fn check_interval(start: usize, end: usize) -> Result<()> {
    if start >= end {
        return Err(HighlightError::InvalidInterval { start, end });
    }
    Ok(())
}

/// Anotação genérica, independente de qualquer armazenamento.
///
/// Útil para fontes de anotação que não são menções persistidas (e como
/// dublê nos testes do renderizador).
///
/// # Exemplo
/// ```rust
/// use highlight_core::offset_item::StaticOffsetItem;
/// use serde_json::json;
///
/// let item = StaticOffsetItem::builder(0, 4)
///     .css_class("This")
///     .info(&json!({"data": "attribute"}))
///     .unwrap()
///     .build()
///     .unwrap();
/// assert_eq!(item.css_classes_ref(), ["This"]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct StaticOffsetItem {
    start: usize,
    end: usize,
    title: Option<String>,
    css_classes: Vec<String>,
    info: InfoJson,
    class_identifier: Option<String>,
    highlight: bool,
    resolved: bool,
}

impl StaticOffsetItem {
    pub fn builder(start: usize, end: usize) -> StaticOffsetItemBuilder {
        StaticOffsetItemBuilder {
            item: StaticOffsetItem {
                start,
                end,
                title: None,
                css_classes: Vec::new(),
                info: InfoJson::new(),
                class_identifier: None,
                highlight: true,
                resolved: false,
            },
        }
    }

    pub fn css_classes_ref(&self) -> &[String] {
        &self.css_classes
    }
}

impl OffsetItem for StaticOffsetItem {
    fn start(&self) -> usize {
        self.start
    }
    fn end(&self) -> usize {
        self.end
    }
    fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }
    fn css_classes(&self) -> Vec<String> {
        self.css_classes.clone()
    }
    fn info_json(&self) -> &InfoJson {
        &self.info
    }
    fn class_identifier(&self) -> Option<&str> {
        self.class_identifier.as_deref()
    }
    fn should_highlight(&self) -> bool {
        self.highlight
    }
    fn is_resolved(&self) -> bool {
        self.resolved
    }
}

/// Builder de [`StaticOffsetItem`]; valida tudo em [`build`](Self::build).
#[derive(Debug, Clone)]
pub struct StaticOffsetItemBuilder {
    item: StaticOffsetItem,
}

impl StaticOffsetItemBuilder {
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.item.title = Some(title.into());
        self
    }

    pub fn css_class(mut self, class: impl Into<String>) -> Self {
        self.item.css_classes.push(class.into());
        self
    }

    pub fn css_classes<I, S>(mut self, classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.item.css_classes.extend(classes.into_iter().map(Into::into));
        self
    }

    /// Serializa os metadados; falha se não formarem um objeto JSON.
    pub fn info<T: Serialize + ?Sized>(mut self, info: &T) -> Result<Self> {
        match serde_json::to_value(info)? {
            Value::Object(map) => {
                self.item.info = map;
                Ok(self)
            }
            _ => Err(HighlightError::MetadataNotObject),
        }
    }

    pub fn class_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.item.class_identifier = Some(identifier.into());
        self
    }

    pub fn highlight(mut self, highlight: bool) -> Self {
        self.item.highlight = highlight;
        self
    }

    pub fn resolved(mut self, resolved: bool) -> Self {
        self.item.resolved = resolved;
        self
    }

    pub fn build(self) -> Result<StaticOffsetItem> {
        check_interval(self.item.start, self.item.end)?;
        if self.item.css_classes.is_empty() {
            return Err(HighlightError::MissingCssClasses);
        }
        Ok(self.item)
    }
}
