use crate::format::{abbreviate_name, format_class_average, format_mark};
use crate::ipc::error::ok;
use crate::ipc::helpers::{optional_param, required_str};
use crate::ipc::types::{AppState, Request};
use crate::marks::RawCell;
use serde_json::json;

/// Formatting never fails; an unreadable value renders as the default.
fn cell_param(req: &Request) -> RawCell {
    req.params
        .get("value")
        .cloned()
        .and_then(|v| serde_json::from_value(v).ok())
        .unwrap_or_default()
}

fn handle_format_mark(_state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(&req.id, json!({ "mark": format_mark(&cell_param(req)) }))
}

fn handle_format_class_average(_state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(
        &req.id,
        json!({ "classAverage": format_class_average(&cell_param(req)) }),
    )
}

fn handle_format_abbreviate_name(state: &mut AppState, req: &Request) -> serde_json::Value {
    let name = match required_str(req, "name") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let max_length: usize = match optional_param(req, "maxLength") {
        Ok(v) => v.unwrap_or(state.settings.name_max_length),
        Err(e) => return e,
    };
    ok(
        &req.id,
        json!({ "name": abbreviate_name(&name, max_length) }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "format.mark" => Some(handle_format_mark(state, req)),
        "format.classAverage" => Some(handle_format_class_average(state, req)),
        "format.abbreviateName" => Some(handle_format_abbreviate_name(state, req)),
        _ => None,
    }
}
