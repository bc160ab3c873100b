use crate::ipc::error::{ok, report_err};
use crate::ipc::helpers::required_param;
use crate::ipc::types::{AppState, Request};
use crate::marks::{normalize_all, RawCell};
use serde_json::json;

fn handle_marks_normalize(_state: &mut AppState, req: &Request) -> serde_json::Value {
    let values: Vec<RawCell> = match required_param(req, "values") {
        Ok(v) => v,
        Err(e) => return e,
    };
    match normalize_all(&values) {
        Ok(marks) => ok(&req.id, json!({ "marks": marks })),
        Err(e) => report_err(&req.id, &e),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "marks.normalize" => Some(handle_marks_normalize(state, req)),
        _ => None,
    }
}
