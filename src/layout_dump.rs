use crate::layout::RenderModel;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Flat `id<TAB>path` listing of every routed edge, one per line.
pub fn svg_paths(model: &RenderModel) -> String {
    let mut out = String::new();
    for edge in &model.edges {
        out.push_str(&edge.edge.id);
        out.push('\t');
        out.push_str(&edge.svg_path());
        out.push('\n');
    }
    out
}

pub fn to_json_string<T: Serialize>(value: &T, pretty: bool) -> anyhow::Result<String> {
    let mut json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    json.push('\n');
    Ok(json)
}

pub fn render_model_to_string(model: &RenderModel, pretty: bool) -> anyhow::Result<String> {
    to_json_string(model, pretty)
}

pub fn write_render_model(path: &Path, model: &RenderModel, pretty: bool) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    if pretty {
        serde_json::to_writer_pretty(&mut writer, model)?;
    } else {
        serde_json::to_writer(&mut writer, model)?;
    }
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}
