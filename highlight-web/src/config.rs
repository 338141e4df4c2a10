//! Configuração do servidor lida de variáveis de ambiente.

use std::str::FromStr;

use highlight_core::HighlightConfig;

use crate::error::AppError;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub highlight: HighlightConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            highlight: HighlightConfig::default(),
        }
    }
}

impl Config {
    /// Lê `HIGHLIGHT_HOST`, `HIGHLIGHT_PORT` e `HIGHLIGHT_BUFFER_SIZE`.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let defaults = Self::default();
        let host = lookup("HIGHLIGHT_HOST").unwrap_or(defaults.host);
        let port = parse_var(&lookup, "HIGHLIGHT_PORT", defaults.port)?;
        let buffer_size = parse_var(
            &lookup,
            "HIGHLIGHT_BUFFER_SIZE",
            defaults.highlight.buffer_size,
        )?;
        if buffer_size == 0 {
            return Err(AppError::Config(
                "HIGHLIGHT_BUFFER_SIZE deve ser maior que zero".to_string(),
            ));
        }

        Ok(Self {
            host,
            port,
            highlight: HighlightConfig {
                buffer_size,
                ..defaults.highlight
            },
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_var<T>(lookup: impl Fn(&str) -> Option<String>, name: &str, default: T) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| AppError::Config(format!("{name}={raw}: {e}"))),
        None => Ok(default),
    }
}
