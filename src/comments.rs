use serde::{Deserialize, Serialize};

use crate::error::{ReportError, Result};
use crate::marks::{normalize_all, RawCell};

pub const MAX_MARK: f64 = 100.0;

/// Subject and total columns a pre-summed total spans when it leaks into the
/// per-subject list.
pub const SUBJECT_AND_TOTAL_COLUMNS: f64 = 11.0;

/// Divisor for a bilingual-slot value that is really an aggregate.
pub const BILINGUAL_AGGREGATE_DIVISOR: f64 = 5.0;

/// Ordered remark bands, highest lower bound first.
#[derive(Debug, Clone, Copy)]
pub struct BandTable {
    pub bands: [(f64, &'static str); 5],
    pub below_zero: &'static str,
    pub no_mark: &'static str,
}

impl BandTable {
    /// First band whose lower bound the score reaches.
    pub fn remark(&self, score: Option<f64>) -> &'static str {
        let Some(score) = score else {
            return self.no_mark;
        };
        self.bands
            .iter()
            .find(|(lower, _)| score >= *lower)
            .map(|(_, msg)| *msg)
            .unwrap_or(self.below_zero)
    }
}

pub const GENERAL_BANDS: BandTable = BandTable {
    bands: [
        (80.0, "Excellent, keep it up!"),
        (75.0, "Very Good, aim higher!"),
        (60.0, "Good, there's room for improvement."),
        (50.0, "Average, strive to do better next time."),
        (0.0, "Below Average, let's work harder."),
    ],
    below_zero: "Marks < 0, please double check.",
    no_mark: "No marks entered, please double check.",
};

/// Kiswahili remarks.
pub const BILINGUAL_BANDS: BandTable = BandTable {
    bands: [
        (80.0, "Bora, endelea na bidii hiyohiyo!"),
        (75.0, "Vema kabisa, lenga juu zaidi!"),
        (60.0, "Vizuri, kuna fursa ya kuimarika."),
        (50.0, "Wastani, jitahidi kufanya vizuri zaidi."),
        (0.0, "Chini ya wastani, tufanye kazi kwa bidii."),
    ],
    below_zero: "Alama zimepungua 0, tafadhali angalia.",
    no_mark: "Hakuna alama zilizoingizwa, tafadhali angalia.",
};

/// Where the bilingual subject sits and how leaked aggregates are scaled back.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentRules {
    pub bilingual_index: usize,
    pub total_divisor: f64,
    pub bilingual_divisor: f64,
}

impl Default for CommentRules {
    fn default() -> Self {
        CommentRules {
            bilingual_index: 1,
            total_divisor: SUBJECT_AND_TOTAL_COLUMNS,
            bilingual_divisor: BILINGUAL_AGGREGATE_DIVISOR,
        }
    }
}

/// A value above the mark ceiling can only be an aggregate.
fn looks_like_aggregate(score: f64) -> bool {
    score > MAX_MARK
}

fn rescale_aggregate(score: Option<f64>, divisor: f64) -> Option<f64> {
    score.map(|v| {
        if looks_like_aggregate(v) && divisor > 0.0 {
            v / divisor
        } else {
            v
        }
    })
}

fn check_mark_range(score: Option<f64>) -> Result<()> {
    match score {
        Some(v) if !(0.0..=MAX_MARK).contains(&v) => Err(ReportError::Range {
            what: "mark",
            value: v,
            max: MAX_MARK,
        }),
        _ => Ok(()),
    }
}

/// One remark per mark, positionally aligned with the input.
#[allow(dead_code)]
pub fn classify_subjects(marks: &[RawCell]) -> Result<Vec<String>> {
    classify_subjects_with(&CommentRules::default(), marks)
}

pub fn classify_subjects_with(rules: &CommentRules, marks: &[RawCell]) -> Result<Vec<String>> {
    let mut scores: Vec<Option<f64>> = normalize_all(marks)?
        .into_iter()
        .map(|m| m.score().map(|v| v as f64))
        .collect();

    // The trailing slot sometimes carries the summed total.
    if let Some(last) = scores.last_mut() {
        *last = rescale_aggregate(*last, rules.total_divisor);
    }

    let mut out = Vec::with_capacity(scores.len());
    for (idx, score) in scores.into_iter().enumerate() {
        let (table, score) = if idx == rules.bilingual_index {
            (
                &BILINGUAL_BANDS,
                rescale_aggregate(score, rules.bilingual_divisor),
            )
        } else {
            (&GENERAL_BANDS, score)
        };
        check_mark_range(score)?;
        out.push(table.remark(score).to_string());
    }
    Ok(out)
}
