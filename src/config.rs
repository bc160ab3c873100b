use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::comments::{CommentRules, BILINGUAL_AGGREGATE_DIVISOR};
use crate::overall::OverallScale;

pub const CONFIG_ENV: &str = "REPORTCARDD_CONFIG";
pub const WORKSPACE_SETTINGS_FILE: &str = "reportcardd.json";

/// Column positions inside a student row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct SheetLayout {
    pub first_subject_column: usize,
    pub subject_count: usize,
    pub bilingual_index: usize,
    pub total_column: usize,
    pub position_column: usize,
    pub total_divisor: f64,
    pub bilingual_divisor: f64,
}

impl Default for SheetLayout {
    fn default() -> Self {
        SheetLayout {
            first_subject_column: 3,
            subject_count: 5,
            bilingual_index: 1,
            total_column: 8,
            position_column: 9,
            // Five subjects feed the total column.
            total_divisor: 5.0,
            bilingual_divisor: BILINGUAL_AGGREGATE_DIVISOR,
        }
    }
}

impl SheetLayout {
    pub fn subject_columns(&self) -> std::ops::Range<usize> {
        self.first_subject_column..self.first_subject_column + self.subject_count
    }

    pub fn comment_rules(&self) -> CommentRules {
        CommentRules {
            bilingual_index: self.bilingual_index,
            total_divisor: self.total_divisor,
            bilingual_divisor: self.bilingual_divisor,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct Settings {
    pub overall_scale: OverallScale,
    pub name_max_length: usize,
    pub layout: SheetLayout,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            overall_scale: OverallScale::default(),
            name_max_length: 17,
            layout: SheetLayout::default(),
        }
    }
}

impl Settings {
    pub fn validate(&self) -> anyhow::Result<()> {
        let l = &self.layout;
        if l.subject_count < 2 {
            bail!("layout.subjectCount must be at least 2");
        }
        if l.total_divisor <= 0.0 || l.bilingual_divisor <= 0.0 {
            bail!("layout divisors must be positive");
        }
        if self.name_max_length == 0 {
            bail!("nameMaxLength must be positive");
        }
        Ok(())
    }

    pub fn load_file(path: &Path) -> anyhow::Result<Settings> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read settings {}", path.to_string_lossy()))?;
        let settings: Settings = serde_json::from_str(&text)
            .with_context(|| format!("failed to parse settings {}", path.to_string_lossy()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Defaults, overridden by the file named in `REPORTCARDD_CONFIG`.
    pub fn from_env() -> Settings {
        let Ok(path) = std::env::var(CONFIG_ENV) else {
            return Settings::default();
        };
        match Settings::load_file(Path::new(&path)) {
            Ok(s) => {
                tracing::info!(path = %path, "loaded settings");
                s
            }
            Err(e) => {
                tracing::warn!(path = %path, error = %format!("{e:#}"), "ignoring settings file");
                Settings::default()
            }
        }
    }

    /// Workspace settings file, if one exists.
    pub fn load_workspace(workspace: &Path) -> anyhow::Result<Option<Settings>> {
        let p = workspace.join(WORKSPACE_SETTINGS_FILE);
        if !p.is_file() {
            return Ok(None);
        }
        Settings::load_file(&p).map(Some)
    }

    /// Apply a partial JSON object on top of these settings.
    pub fn merged(&self, patch: &serde_json::Value) -> anyhow::Result<Settings> {
        if !patch.is_object() {
            bail!("settings patch must be an object");
        }
        let mut base = serde_json::to_value(self)?;
        merge_json(&mut base, patch);
        let out: Settings = serde_json::from_value(base).context("invalid settings")?;
        out.validate()?;
        Ok(out)
    }
}

fn merge_json(base: &mut serde_json::Value, patch: &serde_json::Value) {
    match (base, patch) {
        (serde_json::Value::Object(b), serde_json::Value::Object(p)) => {
            for (k, v) in p {
                let nested = v.is_object() && b.get(k).map(|e| e.is_object()).unwrap_or(false);
                if nested {
                    if let Some(existing) = b.get_mut(k) {
                        merge_json(existing, v);
                    }
                } else {
                    b.insert(k.clone(), v.clone());
                }
            }
        }
        (b, p) => *b = p.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn defaults_round_trip_through_camel_case() {
        let v = serde_json::to_value(Settings::default()).unwrap();
        assert_eq!(v["overallScale"], "averaged");
        assert_eq!(v["nameMaxLength"], 17);
        assert_eq!(v["layout"]["bilingualIndex"], 1);
    }

    #[test]
    fn partial_patch_keeps_other_fields() {
        let s = Settings::default()
            .merged(&json!({ "overallScale": "absolute", "layout": { "subjectCount": 11 } }))
            .expect("merge");
        assert_eq!(s.overall_scale, OverallScale::Absolute);
        assert_eq!(s.layout.subject_count, 11);
        assert_eq!(s.layout.first_subject_column, 3);
        assert_eq!(s.name_max_length, 17);
    }

    #[test]
    fn unknown_or_invalid_fields_are_rejected() {
        assert!(Settings::default().merged(&json!({ "colour": "red" })).is_err());
        assert!(Settings::default()
            .merged(&json!({ "layout": { "totalDivisor": 0 } }))
            .is_err());
        assert!(Settings::default().merged(&json!([1])).is_err());
    }

    #[test]
    fn layout_feeds_comment_rules() {
        let r = SheetLayout::default().comment_rules();
        assert_eq!(r.bilingual_index, 1);
        assert_eq!(r.bilingual_divisor, 5.0);
        assert_eq!(SheetLayout::default().subject_columns(), 3..8);
    }
}
