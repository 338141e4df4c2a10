//! Bloco `<style>` indexado por profundidade de aninhamento.
//!
//! Cada nível de aninhamento recebe um sublinhado deslocado para baixo, de modo
//! que menções aninhadas continuem distinguíveis. Em todo nível há duas famílias
//! de seletores: a base (sublinhado contínuo, usada pelas menções resolvidas) e
//! a variante `.resolvable` (sublinhado tracejado).

use crate::config::HighlightConfig;

/// Distância, em pixels, entre os sublinhados de dois níveis consecutivos.
const DEPTH_OUTSET_PX: usize = 3;

/// Gera o bloco de estilo para `max_depth` níveis. Profundidade zero gera `""`.
pub fn depth_style(max_depth: usize, config: &HighlightConfig) -> String {
    if max_depth == 0 {
        return String::new();
    }

    let marker = format!(" .{}", config.marker_class);
    let mut style = String::from("<style>");
    let mut selector = format!(".{}", config.container_class);

    for depth in 1..=max_depth {
        let parent = selector.clone();
        selector.push_str(&marker);

        style.push_str(&format!(
            "{selector}{{border-image-outset: 0 0 {}px 0;border-bottom: 1px solid black;\
             border-image-source: linear-gradient(to right, black, black);\
             border-image-slice: 0 0 1 0;border-image-width: 0 0 1px 0;\
             border-image-repeat: repeat;}}",
            (depth - 1) * DEPTH_OUTSET_PX
        ));
        style.push_str(&format!(
            "{parent}{marker}.resolvable{{border-image-source: repeating-linear-gradient(\
             to right, transparent, transparent 1px, rgb(0,0,0) 1px, rgb(0,0,0) 3px);}}"
        ));
    }

    style.push_str("</style>");
    style
}

/// Quantas regras de profundidade um bloco de estilo contém.
pub fn depth_rule_count(style: &str) -> usize {
    style.matches("border-bottom:").count()
}
