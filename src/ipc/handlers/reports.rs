use crate::export::write_class_model;
use crate::ipc::error::{err, ok, report_err};
use crate::ipc::helpers::{required_param, required_str};
use crate::ipc::types::{AppState, Request};
use crate::report::{build_class_report, ClassReport, ClassSheet};
use serde_json::json;
use std::path::PathBuf;

fn class_report(state: &AppState, req: &Request) -> Result<ClassReport, serde_json::Value> {
    let sheet: ClassSheet = required_param(req, "sheet")?;
    build_class_report(&sheet, &state.settings).map_err(|e| report_err(&req.id, &e))
}

/// Relative output paths land inside the selected workspace.
fn resolve_out_path(state: &AppState, raw: &str) -> PathBuf {
    let p = PathBuf::from(raw);
    match &state.workspace {
        Some(ws) if p.is_relative() => ws.join(p),
        _ => p,
    }
}

fn handle_reports_class_model(state: &mut AppState, req: &Request) -> serde_json::Value {
    match class_report(state, req) {
        Ok(report) => ok(&req.id, json!(report)),
        Err(e) => e,
    }
}

fn handle_reports_export_model(state: &mut AppState, req: &Request) -> serde_json::Value {
    let out = match required_str(req, "outPath") {
        Ok(v) => resolve_out_path(state, &v),
        Err(e) => return e,
    };
    let report = match class_report(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    if let Err(e) = write_class_model(&report, &out) {
        return err(&req.id, "io_failed", format!("{e:#}"), None);
    }
    tracing::info!(path = %out.to_string_lossy(), students = report.student_count, "exported class model");
    ok(
        &req.id,
        json!({
            "outPath": out.to_string_lossy(),
            "studentCount": report.student_count,
        }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "reports.classModel" => Some(handle_reports_class_model(state, req)),
        "reports.exportModel" => Some(handle_reports_export_model(state, req)),
        _ => None,
    }
}
