use crate::config::LayoutConfig;

/// Width estimate from character count alone. Layout must not depend on
/// which fonts happen to be installed, so no glyph metrics are consulted.
pub(super) fn text_width(text: &str, font_size: f32, char_width_ratio: f32) -> f32 {
    text.chars().count() as f32 * font_size * char_width_ratio
}

pub(super) fn title_width(text: &str, config: &LayoutConfig) -> f32 {
    text_width(text.trim(), config.font_size, config.char_width_ratio)
}

/// Width of the longest port label in `labels`, 0 when empty.
pub(super) fn longest_port_label(labels: &[String], config: &LayoutConfig) -> f32 {
    labels
        .iter()
        .map(|label| text_width(label, config.port_font_size, config.char_width_ratio))
        .fold(0.0, f32::max)
}
