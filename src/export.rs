use anyhow::Context;
use serde_json::json;
use std::path::Path;

use crate::report::ClassReport;

pub const MODEL_FORMAT_V1: &str = "reportcardd-class-model-v1";

/// Write the class model for the renderer as pretty JSON.
pub fn write_class_model(report: &ClassReport, out_path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = out_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("failed to create directory {}", parent.to_string_lossy())
            })?;
        }
    }

    let doc = json!({
        "format": MODEL_FORMAT_V1,
        "appVersion": env!("CARGO_PKG_VERSION"),
        "generatedAt": chrono::Utc::now().to_rfc3339(),
        "report": report,
    });
    let text = serde_json::to_string_pretty(&doc)?;
    std::fs::write(out_path, text)
        .with_context(|| format!("failed to write {}", out_path.to_string_lossy()))?;
    Ok(())
}
