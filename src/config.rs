use anyhow::Context;
use once_cell::sync::Lazy;
use serde::Deserialize;
use std::path::Path;

static DEFAULT_FACET_TIERS: Lazy<Vec<Vec<String>>> = Lazy::new(|| {
    [
        &["infrastructure", "infra", "platform", "network"][..],
        &["storage", "database", "db", "data"][..],
        &["backend", "service", "api", "server"][..],
        &["logic", "domain", "business", "core"][..],
        &["ui", "frontend", "view", "client"][..],
    ]
    .iter()
    .map(|tier| tier.iter().map(|alias| alias.to_string()).collect())
    .collect()
});

/// Ordered technical-facet tiers used to seed the order inside each layer.
///
/// A facet matches a tier when it equals one of the tier's aliases, ignoring
/// case. Nodes whose facet matches no tier (or who have none) sort after
/// every tier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FacetPriority {
    pub tiers: Vec<Vec<String>>,
}

impl FacetPriority {
    pub fn new<I, T, S>(tiers: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tiers: tiers
                .into_iter()
                .map(|tier| tier.into_iter().map(Into::into).collect())
                .collect(),
        }
    }

    pub fn rank(&self, facet: Option<&str>) -> usize {
        let Some(facet) = facet.map(str::trim) else {
            return self.tiers.len();
        };
        self.tiers
            .iter()
            .position(|tier| tier.iter().any(|alias| alias.eq_ignore_ascii_case(facet)))
            .unwrap_or(self.tiers.len())
    }
}

impl Default for FacetPriority {
    fn default() -> Self {
        Self {
            tiers: DEFAULT_FACET_TIERS.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LayoutConfig {
    /// Height of one port row.
    pub port_row_height: f32,
    /// Title band above the port rows.
    pub header_height: f32,
    pub body_padding: f32,
    pub min_node_height: f32,
    pub min_node_width: f32,
    pub max_node_width: f32,
    /// Horizontal padding added around the title text.
    pub label_padding: f32,
    /// Space between the longest input label and the longest output label.
    pub port_label_padding: f32,
    pub font_size: f32,
    pub port_font_size: f32,
    /// Average glyph advance as a fraction of the font size.
    pub char_width_ratio: f32,
    pub layer_gap: f32,
    pub node_gap: f32,
    pub margin: f32,
    pub viewport_height: f32,
    /// Distance between neighbouring sibling edges at a shared port.
    pub sibling_spread: f32,
    /// Horizontal span at which sibling offsets reach full strength.
    pub spread_full_distance: f32,
    pub facet_priority: FacetPriority,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            port_row_height: 24.0,
            header_height: 40.0,
            body_padding: 8.0,
            min_node_height: 64.0,
            min_node_width: 160.0,
            max_node_width: 360.0,
            label_padding: 48.0,
            port_label_padding: 40.0,
            font_size: 14.0,
            port_font_size: 12.0,
            char_width_ratio: 0.6,
            layer_gap: 120.0,
            node_gap: 40.0,
            margin: 40.0,
            viewport_height: 800.0,
            sibling_spread: 18.0,
            spread_full_distance: 240.0,
            facet_priority: FacetPriority::default(),
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct LayoutConfigFile {
    port_row_height: Option<f32>,
    header_height: Option<f32>,
    body_padding: Option<f32>,
    min_node_height: Option<f32>,
    min_node_width: Option<f32>,
    max_node_width: Option<f32>,
    label_padding: Option<f32>,
    port_label_padding: Option<f32>,
    font_size: Option<f32>,
    port_font_size: Option<f32>,
    char_width_ratio: Option<f32>,
    layer_gap: Option<f32>,
    node_gap: Option<f32>,
    margin: Option<f32>,
    viewport_height: Option<f32>,
    sibling_spread: Option<f32>,
    spread_full_distance: Option<f32>,
    facet_priority: Option<Vec<Vec<String>>>,
}

impl LayoutConfigFile {
    fn apply(self, config: &mut LayoutConfig) {
        if let Some(v) = self.port_row_height {
            config.port_row_height = v;
        }
        if let Some(v) = self.header_height {
            config.header_height = v;
        }
        if let Some(v) = self.body_padding {
            config.body_padding = v;
        }
        if let Some(v) = self.min_node_height {
            config.min_node_height = v;
        }
        if let Some(v) = self.min_node_width {
            config.min_node_width = v;
        }
        if let Some(v) = self.max_node_width {
            config.max_node_width = v;
        }
        if let Some(v) = self.label_padding {
            config.label_padding = v;
        }
        if let Some(v) = self.port_label_padding {
            config.port_label_padding = v;
        }
        if let Some(v) = self.font_size {
            config.font_size = v;
        }
        if let Some(v) = self.port_font_size {
            config.port_font_size = v;
        }
        if let Some(v) = self.char_width_ratio {
            config.char_width_ratio = v;
        }
        if let Some(v) = self.layer_gap {
            config.layer_gap = v;
        }
        if let Some(v) = self.node_gap {
            config.node_gap = v;
        }
        if let Some(v) = self.margin {
            config.margin = v;
        }
        if let Some(v) = self.viewport_height {
            config.viewport_height = v;
        }
        if let Some(v) = self.sibling_spread {
            config.sibling_spread = v;
        }
        if let Some(v) = self.spread_full_distance {
            config.spread_full_distance = v;
        }
        if let Some(tiers) = self.facet_priority {
            config.facet_priority = FacetPriority { tiers };
        }
        // Keep the clamp range usable even when only one bound is overridden.
        if config.max_node_width < config.min_node_width {
            config.max_node_width = config.min_node_width;
        }
    }
}

pub fn parse_config(contents: &str) -> anyhow::Result<LayoutConfig> {
    let parsed: LayoutConfigFile = match serde_json::from_str(contents) {
        Ok(parsed) => parsed,
        Err(_) => json5::from_str(contents).context("layout config is neither JSON nor JSON5")?,
    };
    let mut config = LayoutConfig::default();
    parsed.apply(&mut config);
    Ok(config)
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<LayoutConfig> {
    let Some(path) = path else {
        return Ok(LayoutConfig::default());
    };
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    parse_config(&contents).with_context(|| format!("invalid config {}", path.display()))
}
