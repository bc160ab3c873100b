use indexmap::IndexMap;
use serde_json::json;

use crate::comments::{classify_subjects_with, CommentRules, SUBJECT_AND_TOTAL_COLUMNS};
use crate::ipc::error::{ok, report_err};
use crate::ipc::helpers::{optional_param, required_f64, required_param, required_str};
use crate::ipc::types::{AppState, Request};
use crate::marks::{normalize, RawCell};
use crate::overall::{overall_comment_with, OverallScale, SubjectMarkMap};

fn handle_comments_subjects(state: &mut AppState, req: &Request) -> serde_json::Value {
    let marks: Vec<RawCell> = match required_param(req, "marks") {
        Ok(v) => v,
        Err(e) => return e,
    };
    // A bare mark list may carry the full per-term total in its last slot.
    let rules = CommentRules {
        total_divisor: SUBJECT_AND_TOTAL_COLUMNS,
        ..state.settings.layout.comment_rules()
    };
    match classify_subjects_with(&rules, &marks) {
        Ok(comments) => ok(&req.id, json!({ "comments": comments })),
        Err(e) => report_err(&req.id, &e),
    }
}

fn handle_comments_overall(state: &mut AppState, req: &Request) -> serde_json::Value {
    let raw_marks: IndexMap<String, RawCell> = match required_param(req, "subjectMarks") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let total = match required_f64(req, "total") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let name = match required_str(req, "studentName") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let scale: OverallScale = match optional_param(req, "scale") {
        Ok(v) => v.unwrap_or(state.settings.overall_scale),
        Err(e) => return e,
    };

    let mut subject_marks = SubjectMarkMap::with_capacity(raw_marks.len());
    for (subject, raw) in &raw_marks {
        match normalize(raw) {
            Ok(m) => {
                subject_marks.insert(subject.clone(), m);
            }
            Err(e) => return report_err(&req.id, &e),
        }
    }

    match overall_comment_with(scale, &subject_marks, total, &name) {
        Ok(comment) => ok(&req.id, json!({ "comment": comment })),
        Err(e) => report_err(&req.id, &e),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "comments.subjects" => Some(handle_comments_subjects(state, req)),
        "comments.overall" => Some(handle_comments_overall(state, req)),
        _ => None,
    }
}
