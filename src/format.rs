//! Display-only helpers for the report renderer.
//!
//! Nothing here fails: bad input degrades to a neutral default so a page can
//! still be produced.

use regex::Regex;
use std::sync::OnceLock;

use crate::marks::RawCell;

static WHOLE_NUMBER: OnceLock<Regex> = OnceLock::new();
static DECIMAL_NUMBER: OnceLock<Regex> = OnceLock::new();

fn whole_number() -> &'static Regex {
    WHOLE_NUMBER.get_or_init(|| Regex::new(r"^\d+$").expect("valid regex"))
}

fn decimal_number() -> &'static Regex {
    DECIMAL_NUMBER.get_or_init(|| Regex::new(r"^\d+\.\d+$").expect("valid regex"))
}

/// Mark as shown in the marks table. Absent or unreadable cells show as 0.
pub fn format_mark(raw: &RawCell) -> i64 {
    match raw {
        RawCell::Empty => 0,
        RawCell::Int(v) => *v,
        RawCell::Float(v) => v.trunc() as i64,
        RawCell::Text(s) => {
            let t = s.trim();
            if decimal_number().is_match(t) {
                t.parse::<f64>().map(|v| v.trunc() as i64).unwrap_or(0)
            } else if whole_number().is_match(t) {
                t.parse::<i64>().unwrap_or(0)
            } else {
                0
            }
        }
    }
}

/// Two-decimal class average, or "0.00" for anything that is not a
/// non-negative number.
pub fn format_class_average(raw: &RawCell) -> String {
    let text = raw.display_text();
    let t = text.trim();
    if whole_number().is_match(t) || decimal_number().is_match(t) {
        if let Ok(v) = t.parse::<f64>() {
            return format!("{v:.2}");
        }
    }
    "0.00".to_string()
}

/// Identifier or rank cell as text; float cells lose their fractional part.
pub fn format_student_id(raw: &RawCell) -> String {
    match raw {
        RawCell::Empty => String::new(),
        RawCell::Int(v) => v.to_string(),
        RawCell::Float(v) if v.is_finite() => (v.trunc() as i64).to_string(),
        RawCell::Float(v) => v.to_string(),
        RawCell::Text(s) => s.trim().to_string(),
    }
}

pub fn format_position(raw: &RawCell, class_size: usize) -> String {
    format!("{} / {}", format_student_id(raw), class_size)
}

fn title_case(word: &str) -> String {
    let mut out = String::with_capacity(word.len());
    let mut prev_alpha = false;
    for c in word.chars() {
        if prev_alpha {
            out.extend(c.to_lowercase());
        } else {
            out.extend(c.to_uppercase());
        }
        prev_alpha = c.is_alphabetic();
    }
    out
}

/// First two name parts, title-cased.
pub fn display_name(name: &str) -> String {
    name.split_whitespace()
        .take(2)
        .map(title_case)
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn first_name(name: &str) -> String {
    name.split_whitespace()
        .next()
        .map(title_case)
        .unwrap_or_default()
}

fn initial(part: &str) -> String {
    match part.chars().next() {
        Some(c) => {
            let mut s: String = c.to_uppercase().collect();
            s.push('.');
            s
        }
        None => String::new(),
    }
}

fn fits(parts: &[String], max_length: usize) -> Option<String> {
    let joined = parts.join(" ");
    (joined.chars().count() <= max_length).then_some(joined)
}

/// Shorten a name to fit a box of `max_length` characters.
///
/// Steps, stopping at the first that fits: initial for the last part, then
/// initials for every part, then drop the last part when there are three or
/// more. The result can still be too long for very long names.
pub fn abbreviate_name(name: &str, max_length: usize) -> String {
    if name.chars().count() <= max_length {
        return name.to_string();
    }

    let mut parts: Vec<String> = name.split_whitespace().map(str::to_string).collect();
    if parts.len() <= 1 {
        return name.trim().chars().take(max_length).collect();
    }

    let last = parts.len() - 1;
    parts[last] = initial(&parts[last]);
    if let Some(s) = fits(&parts, max_length) {
        return s;
    }

    for p in &mut parts[..last] {
        *p = initial(p);
    }
    if let Some(s) = fits(&parts, max_length) {
        return s;
    }

    if parts.len() >= 3 {
        parts.pop();
    }
    parts.join(" ")
}
