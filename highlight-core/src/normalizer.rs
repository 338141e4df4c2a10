//! # Normalizador de texto com buffer limitado
//!
//! Lê texto de tamanho arbitrário através de um buffer fixo e entrega um
//! caractere por vez, já normalizado para exibição:
//!
//! - A entidade `&nbsp;` (seis caracteres) vira um único espaço, mesmo quando
//!   seus caracteres atravessam a fronteira entre duas leituras.
//! - Um code point multibyte nunca é partido entre leituras: se o buffer
//!   termina no meio de uma sequência UTF-8, os bytes incompletos ficam
//!   guardados e a próxima leitura estende a janela.
//!
//! Cada [`NormalizedChar`] carrega o offset (em caracteres) do texto
//! **original**. A substituição é só de exibição e nunca desloca os offsets
//! usados pelas anotações: o espaço de um `&nbsp;` tem o offset do `&`, e o
//! caractere seguinte tem esse offset + 6.

use std::collections::VecDeque;
use std::io::{ErrorKind, Read};

use crate::error::{HighlightError, Result};

/// Tamanho padrão do buffer de leitura, em bytes.
pub const DEFAULT_BUFFER_SIZE: usize = 1024;

/// A única entidade reescrita por esta camada.
pub const NBSP_ENTITY: &str = "&nbsp;";
const NBSP_LEN: usize = 6;

/// Um caractere de saída e sua posição no texto original.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizedChar {
    pub offset: usize,
    /// Quantos caracteres do texto original este caractere representa.
    pub width: usize,
    pub ch: char,
}

impl NormalizedChar {
    /// Fim (exclusivo) do trecho original coberto.
    pub fn end(&self) -> usize {
        self.offset + self.width
    }
}

/// Iterador de caracteres normalizados sobre qualquer [`Read`].
///
/// A memória usada é o buffer de leitura mais a janela de caracteres ainda não
/// consumidos (no máximo `buffer_size + 5`), independente do tamanho do texto.
pub struct NormalizedChars<R> {
    reader: R,
    buffer_size: usize,
    /// Bytes de um code point incompleto, carregados para a próxima leitura.
    carry: Vec<u8>,
    window: VecDeque<char>,
    /// Offset original do primeiro caractere da janela.
    offset: usize,
    eof: bool,
    failed: bool,
}

impl<R: Read> NormalizedChars<R> {
    pub fn new(reader: R, buffer_size: usize) -> Self {
        Self {
            reader,
            buffer_size: buffer_size.max(1),
            carry: Vec::new(),
            window: VecDeque::new(),
            offset: 0,
            eof: false,
            failed: false,
        }
    }

    /// Quantidade de caracteres originais consumidos até agora.
    ///
    /// Depois que o iterador termina, é o tamanho do texto original.
    pub fn consumed(&self) -> usize {
        self.offset
    }

    /// Faz uma leitura do buffer. Retorna `false` no fim do texto.
    fn refill(&mut self) -> Result<bool> {
        if self.eof {
            return Ok(false);
        }

        let mut chunk = std::mem::take(&mut self.carry);
        let kept = chunk.len();
        chunk.resize(kept + self.buffer_size, 0);
        let read = loop {
            match self.reader.read(&mut chunk[kept..]) {
                Ok(n) => break n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        };
        chunk.truncate(kept + read);

        if read == 0 {
            self.eof = true;
            if !chunk.is_empty() {
                // texto terminou no meio de um code point
                return Err(HighlightError::InvalidUtf8 {
                    offset: self.offset + self.window.len(),
                });
            }
            return Ok(false);
        }

        match std::str::from_utf8(&chunk) {
            Ok(text) => self.window.extend(text.chars()),
            Err(err) => {
                let (complete, tail) = chunk.split_at(err.valid_up_to());
                let decoded = String::from_utf8_lossy(complete);
                if err.error_len().is_some() {
                    return Err(HighlightError::InvalidUtf8 {
                        offset: self.offset + self.window.len() + decoded.chars().count(),
                    });
                }
                // sequência incompleta no fim: consome só até a última fronteira válida
                self.window.extend(decoded.chars());
                self.carry = tail.to_vec();
            }
        }
        Ok(true)
    }

    /// Garante ao menos `wanted` caracteres na janela (ou fim do texto).
    fn fill(&mut self, wanted: usize) -> Result<()> {
        while self.window.len() < wanted && self.refill()? {}
        Ok(())
    }

    fn next_char(&mut self) -> Result<Option<NormalizedChar>> {
        self.fill(1)?;
        let Some(&ch) = self.window.front() else {
            return Ok(None);
        };

        if ch == '&' {
            // a entidade pode estar dividida entre duas leituras
            self.fill(NBSP_LEN)?;
            if self.window.iter().take(NBSP_LEN).copied().eq(NBSP_ENTITY.chars()) {
                self.window.drain(..NBSP_LEN);
                let out = NormalizedChar {
                    offset: self.offset,
                    width: NBSP_LEN,
                    ch: ' ',
                };
                self.offset += NBSP_LEN;
                return Ok(Some(out));
            }
        }

        self.window.pop_front();
        let out = NormalizedChar {
            offset: self.offset,
            width: 1,
            ch,
        };
        self.offset += 1;
        Ok(Some(out))
    }
}

impl<R: Read> Iterator for NormalizedChars<R> {
    type Item = Result<NormalizedChar>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match self.next_char() {
            Ok(Some(c)) => Some(Ok(c)),
            Ok(None) => None,
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}

/// Normaliza um texto já em memória.
pub fn normalize(text: &str) -> String {
    text.replace(NBSP_ENTITY, " ")
}

/// Normaliza um texto lido em blocos de `buffer_size` bytes.
pub fn normalize_reader<R: Read>(reader: R, buffer_size: usize) -> Result<String> {
    NormalizedChars::new(reader, buffer_size)
        .map(|c| c.map(|c| c.ch))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Leitor que entrega no máximo `step` bytes por chamada.
    struct Trickle<'a> {
        data: &'a [u8],
        step: usize,
    }

    impl Read for Trickle<'_> {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            let n = self.step.min(buf.len()).min(self.data.len());
            buf[..n].copy_from_slice(&self.data[..n]);
            self.data = &self.data[n..];
            Ok(n)
        }
    }

    #[test]
    fn test_replace_non_breaking_spaces() {
        assert_eq!(normalize("&nbsp;"), " ");
        assert_eq!(normalize("&nbsp;&nbsp;&nbsp;&nbsp;&nbsp;"), "     ");
        assert_eq!(normalize(" &nbsp; &nbsp;&nbsp;&nbsp;&nbsp;"), "       ");
        assert_eq!(normalize("a &amp; b"), "a &amp; b");
    }

    #[test]
    fn test_streaming_matches_in_memory_for_every_buffer_size() {
        let texts = [
            "&nbsp;",
            " &nbsp; &nbsp;&nbsp;&nbsp;&nbsp;",
            "&&nbsp;&nbsp&nbsp;;",
            "&nbsp;😎💃🏿 Ejército&nbsp;de Liberación",
            "fim &nbs",
        ];
        for text in texts {
            for size in 1..=16 {
                let streamed = normalize_reader(text.as_bytes(), size).unwrap();
                assert_eq!(streamed, normalize(text), "buffer {size} em {text:?}");
            }
        }
    }

    #[test]
    fn test_entity_across_buffer_boundary() {
        // a entidade começa 2 bytes antes do fim do primeiro bloco
        let size = 32;
        let start = size - 2;
        let text = format!("{}&nbsp;", "_".repeat(start));
        let expected = format!("{} ", "_".repeat(start));
        assert_eq!(normalize_reader(text.as_bytes(), size).unwrap(), expected);
    }

    #[test]
    fn test_entity_at_every_position() {
        let size = 8;
        for start in 0..(3 * size) {
            let text = format!("{}&nbsp;{}", "a".repeat(start), "b".repeat(3));
            let expected = format!("{} bbb", "a".repeat(start));
            assert_eq!(normalize_reader(text.as_bytes(), size).unwrap(), expected);
        }
    }

    #[test]
    fn test_utf8_never_split() {
        let text = "&nbsp;😎💃🏿";
        for step in 1..=5 {
            let reader = Trickle { data: text.as_bytes(), step };
            assert_eq!(normalize_reader(reader, 3).unwrap(), " 😎💃🏿");
        }
    }

    #[test]
    fn test_offsets_refer_to_original_text() {
        let chars: Vec<NormalizedChar> = NormalizedChars::new("a&nbsp;bé".as_bytes(), 2)
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(
            chars,
            vec![
                NormalizedChar { offset: 0, width: 1, ch: 'a' },
                NormalizedChar { offset: 1, width: 6, ch: ' ' },
                NormalizedChar { offset: 7, width: 1, ch: 'b' },
                NormalizedChar { offset: 8, width: 1, ch: 'é' },
            ]
        );
    }

    #[test]
    fn test_consumed_is_original_length() {
        let mut chars = NormalizedChars::new("x&nbsp;y".as_bytes(), 4);
        while let Some(c) = chars.next() {
            c.unwrap();
        }
        assert_eq!(chars.consumed(), 8);
    }

    #[test]
    fn test_invalid_utf8_is_reported() {
        let bytes = [b'a', b'b', 0xff, b'c'];
        let err = normalize_reader(&bytes[..], 2).unwrap_err();
        assert!(matches!(err, HighlightError::InvalidUtf8 { offset: 2 }));

        // sequência truncada no fim do texto
        let bytes = [b'a', 0xc3];
        let err = normalize_reader(&bytes[..], 4).unwrap_err();
        assert!(matches!(err, HighlightError::InvalidUtf8 { offset: 1 }));
    }
}
