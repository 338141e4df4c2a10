//! # Renderizador com resolução de sobreposições
//!
//! Transforma um texto e um conjunto de anotações por intervalo em marcação
//! HTML **bem aninhada**, mesmo quando as anotações se cruzam.
//!
//! ## Algoritmo
//!
//! O texto é percorrido da esquerda para a direita, caractere a caractere,
//! através do [`normalizer`](crate::normalizer). Toda vez que o offset original
//! cruza uma fronteira de anotação (um início ou um fim), o conjunto ativo é
//! recalculado na ordem total:
//!
//! 1. início crescente;
//! 2. fim decrescente (quem vai mais longe fica por fora);
//! 3. ordem de entrada (desempate estável).
//!
//! A pilha de tags abertas é comparada com o novo conjunto ativo: o maior
//! prefixo comum permanece aberto, o resto da pilha é fechado (de dentro para
//! fora) e os itens restantes do conjunto ativo são abertos. Um item que
//! reaparece depois de ter sido fechado por um cruzamento vira um **fragmento
//! de continuação**: só classes, título e `data-ref`, sem repetir `data-info`.
//!
//! ```text
//! texto:   f i r s t   s e c o n d
//! A[0,5):  ─────────
//! B[4,8):         ───────
//! saída:   <A>firs<B>t</B></A><B ref> se</B>cond
//! ```
//!
//! Itens com `should_highlight() == false` ocupam sua posição na pilha (para que
//! a profundidade dos vizinhos não mude), mas nunca emitem tag.

use std::cmp::Reverse;
use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::io::Read;

use rayon::prelude::*;
use tracing::debug;

use crate::config::HighlightConfig;
use crate::error::{HighlightError, Result};
use crate::normalizer::NormalizedChars;
use crate::offset_item::{check_interval, OffsetItem};
use crate::style::depth_style;

/// Resultado de uma renderização.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Highlighted {
    /// Texto com as tags de menção.
    pub markup: String,
    /// Bloco `<style>` com uma regra por nível de aninhamento usado.
    pub style: String,
    /// Maior número de tags de menção abertas ao mesmo tempo.
    pub max_depth: usize,
}

impl Highlighted {
    /// Marcação seguida do bloco de estilo.
    pub fn into_html(self) -> String {
        let mut html = self.markup;
        html.push_str(&self.style);
        html
    }
}

impl fmt::Display for Highlighted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.markup, self.style)
    }
}

/// Um documento a ser renderizado em lote.
#[derive(Debug, Clone, Copy)]
pub struct Document<'a, T> {
    pub text: &'a str,
    pub items: &'a [T],
}

/// Renderizador de menções. Não guarda estado entre chamadas.
#[derive(Debug, Clone, Default)]
pub struct Renderer {
    config: HighlightConfig,
}

impl Renderer {
    pub fn new(config: HighlightConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &HighlightConfig {
        &self.config
    }

    /// Renderiza um texto em memória.
    pub fn render<T: OffsetItem>(&self, text: &str, items: &[T]) -> Result<Highlighted> {
        self.render_reader(text.as_bytes(), items)
    }

    /// Renderiza um texto lido em blocos de `config.buffer_size` bytes.
    pub fn render_reader<R: Read, T: OffsetItem>(
        &self,
        reader: R,
        items: &[T],
    ) -> Result<Highlighted> {
        for item in items {
            check_interval(item.start(), item.end())?;
        }
        // metadados inválidos falham antes de qualquer saída
        let infos = items
            .iter()
            .map(|item| {
                if item.info_json().is_empty() {
                    Ok(None)
                } else {
                    serde_json::to_string(item.info_json()).map(Some)
                }
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let mut chars = NormalizedChars::new(reader, self.config.buffer_size);
        let mut sweep = Sweep::new(items);
        let mut writer = MarkupWriter::new(items, &infos, &self.config);

        for c in chars.by_ref() {
            let c = c?;
            if sweep.advance(c.offset, c.end()) {
                writer.transition(&sweep.active());
            }
            writer.push(c.ch);
        }

        let len = chars.consumed();
        if let Some(end) = items.iter().map(|item| item.end()).max() {
            if end > len {
                return Err(HighlightError::OutOfBounds { end, len });
            }
        }

        let (markup, max_depth) = writer.finish();
        let style = if self.config.emit_style {
            depth_style(max_depth, &self.config)
        } else {
            String::new()
        };
        debug!(items = items.len(), max_depth, "texto destacado");

        Ok(Highlighted {
            markup,
            style,
            max_depth,
        })
    }

    /// Renderiza documentos independentes em paralelo, preservando a ordem.
    pub fn render_batch<T>(&self, documents: &[Document<'_, T>]) -> Vec<Result<Highlighted>>
    where
        T: OffsetItem + Sync,
    {
        documents
            .par_iter()
            .map(|doc| self.render(doc.text, doc.items))
            .collect()
    }
}

/// Renderiza com a configuração padrão e devolve marcação + estilo.
pub fn highlight_text<T: OffsetItem>(text: &str, items: &[T]) -> Result<String> {
    Renderer::default()
        .render(text, items)
        .map(Highlighted::into_html)
}

/// Escapa um valor para atributo entre aspas duplas. O texto do documento
/// não passa por aqui: ele já chega como HTML.
fn escape_attribute(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Chave da ordem total entre itens ativos.
type OrderKey = (usize, Reverse<usize>, usize);

/// Varredura das fronteiras: mantém o conjunto ativo ordenado.
struct Sweep {
    by_start: Vec<OrderKey>,
    by_end: Vec<(usize, OrderKey)>,
    next_start: usize,
    next_end: usize,
    active: BTreeSet<OrderKey>,
}

impl Sweep {
    fn new<T: OffsetItem>(items: &[T]) -> Self {
        let mut by_start: Vec<OrderKey> = items
            .iter()
            .enumerate()
            .map(|(index, item)| (item.start(), Reverse(item.end()), index))
            .collect();
        by_start.sort_unstable();

        let mut by_end: Vec<(usize, OrderKey)> =
            by_start.iter().map(|key| (key.1 .0, *key)).collect();
        by_end.sort_unstable();

        Self {
            by_start,
            by_end,
            next_start: 0,
            next_end: 0,
            active: BTreeSet::new(),
        }
    }

    /// Avança até o caractere que cobre o trecho original `[start, end)`.
    /// Retorna `true` se o conjunto ativo mudou.
    ///
    /// Um item fica ativo se tocar esse trecho. Um `&nbsp;` cobre seis offsets,
    /// então um item inteiro dentro dele ainda envolve o espaço de saída.
    fn advance(&mut self, start: usize, end: usize) -> bool {
        let mut changed = false;
        while let Some(key) = self.by_start.get(self.next_start) {
            if key.0 >= end {
                break;
            }
            self.active.insert(*key);
            self.next_start += 1;
            changed = true;
        }
        while let Some((item_end, key)) = self.by_end.get(self.next_end) {
            if *item_end > start {
                break;
            }
            self.active.remove(key);
            self.next_end += 1;
            changed = true;
        }
        changed
    }

    /// Índices dos itens ativos, de fora para dentro.
    fn active(&self) -> Vec<usize> {
        self.active.iter().map(|key| key.2).collect()
    }
}

/// Entrada da pilha de tags abertas.
#[derive(Debug, Clone, Copy)]
struct Frame {
    item: usize,
    /// `false` para itens suprimidos, que não têm tag.
    emitted: bool,
}

struct MarkupWriter<'a, T> {
    items: &'a [T],
    infos: &'a [Option<String>],
    config: &'a HighlightConfig,
    out: String,
    stack: Vec<Frame>,
    seen_items: Vec<bool>,
    seen_ids: HashSet<String>,
    depth: usize,
    max_depth: usize,
    /// Houve texto desde a última abertura de tag.
    dirty: bool,
    /// Quebras de linha seguradas até saber se o fragmento seguinte tem texto.
    pending_breaks: usize,
}

impl<'a, T: OffsetItem> MarkupWriter<'a, T> {
    fn new(items: &'a [T], infos: &'a [Option<String>], config: &'a HighlightConfig) -> Self {
        Self {
            items,
            infos,
            config,
            out: String::new(),
            stack: Vec::new(),
            seen_items: vec![false; items.len()],
            seen_ids: HashSet::new(),
            depth: 0,
            max_depth: 0,
            dirty: false,
            pending_breaks: 0,
        }
    }

    fn transition(&mut self, active: &[usize]) {
        let common = self
            .stack
            .iter()
            .zip(active)
            .take_while(|(frame, item)| frame.item == **item)
            .count();
        let kept_emitted = self.stack[..common].iter().any(|frame| frame.emitted);
        if self.pending_breaks > 0 && kept_emitted {
            // as tags que continuam depois das quebras têm texto dos dois lados
            self.close_to(common);
            self.split_at_breaks();
        } else {
            self.flush_breaks();
            self.close_to(common);
        }
        for &item in &active[common..] {
            self.open(item);
        }
    }

    fn push(&mut self, ch: char) {
        if ch == '\n' {
            if self.depth > 0 && (self.dirty || self.pending_breaks > 0) {
                self.pending_breaks += 1;
            } else {
                self.write_break();
            }
            return;
        }
        if self.pending_breaks > 0 {
            self.split_at_breaks();
        }
        self.out.push(ch);
        if self.depth > 0 {
            self.dirty = true;
        }
    }

    fn finish(mut self) -> (String, usize) {
        self.flush_breaks();
        self.close_to(0);
        (self.out, self.max_depth)
    }

    fn close_to(&mut self, len: usize) {
        while self.stack.len() > len {
            if let Some(frame) = self.stack.pop() {
                if frame.emitted {
                    self.out.push_str("</span>");
                    self.depth -= 1;
                }
            }
        }
    }

    fn open(&mut self, index: usize) {
        let items = self.items;
        let item = &items[index];
        if !item.should_highlight() {
            self.stack.push(Frame {
                item: index,
                emitted: false,
            });
            return;
        }

        let mut continuation = self.seen_items[index];
        if let Some(id) = item.class_identifier() {
            continuation |= !self.seen_ids.insert(id.to_string());
        }
        self.seen_items[index] = true;
        self.write_open_tag(index, continuation);

        self.stack.push(Frame {
            item: index,
            emitted: true,
        });
        self.depth += 1;
        self.max_depth = self.max_depth.max(self.depth);
        self.dirty = false;
    }

    fn write_open_tag(&mut self, index: usize, continuation: bool) {
        let items = self.items;
        let item = &items[index];

        self.out.push_str("<span class=\"");
        self.out.push_str(&escape_attribute(&item.css_classes().join(" ")));
        self.out.push('"');
        if let Some(title) = item.title() {
            self.push_attribute("title", title);
        }
        if continuation {
            if let Some(id) = item.class_identifier() {
                self.push_attribute("data-ref", id);
            }
        } else {
            let infos = self.infos;
            if let Some(info) = &infos[index] {
                self.push_attribute("data-info", info);
            }
            if let Some(id) = item.class_identifier() {
                self.push_attribute("data-ref-id", id);
            }
        }
        self.out.push('>');
    }

    fn push_attribute(&mut self, name: &str, value: &str) {
        self.out.push(' ');
        self.out.push_str(name);
        self.out.push_str("=\"");
        self.out.push_str(&escape_attribute(value));
        self.out.push('"');
    }

    fn write_break(&mut self) {
        self.out.push('\n');
        self.out.push_str(&self.config.line_break);
    }

    fn flush_breaks(&mut self) {
        for _ in 0..std::mem::take(&mut self.pending_breaks) {
            self.write_break();
        }
    }

    /// Divide as tags abertas nas quebras pendentes: os dois lados têm texto.
    fn split_at_breaks(&mut self) {
        for frame in self.stack.iter().rev() {
            if frame.emitted {
                self.out.push_str("</span>");
            }
        }
        self.flush_breaks();
        for i in 0..self.stack.len() {
            let frame = self.stack[i];
            if frame.emitted {
                self.write_open_tag(frame.item, true);
            }
        }
        self.dirty = false;
    }
}
