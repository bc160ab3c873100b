use crate::config::Settings;
use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use serde_json::json;
use std::path::PathBuf;

fn handle_health(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(
        &req.id,
        json!({
            "version": env!("CARGO_PKG_VERSION"),
            "workspacePath": state.workspace.as_ref().map(|p| p.to_string_lossy().to_string())
        }),
    )
}

fn handle_workspace_select(state: &mut AppState, req: &Request) -> serde_json::Value {
    let p = req
        .params
        .get("path")
        .and_then(|v| v.as_str())
        .map(PathBuf::from);
    let Some(path) = p else {
        return err(&req.id, "bad_params", "missing params.path", None);
    };
    if !path.is_dir() {
        return err(
            &req.id,
            "bad_params",
            format!("not a directory: {}", path.to_string_lossy()),
            None,
        );
    }

    // A broken settings file must not prevent the workspace from opening.
    let settings_loaded = match Settings::load_workspace(&path) {
        Ok(Some(s)) => {
            state.settings = s;
            true
        }
        Ok(None) => false,
        Err(e) => {
            tracing::warn!(error = %format!("{e:#}"), "ignoring workspace settings");
            false
        }
    };

    state.workspace = Some(path.clone());
    ok(
        &req.id,
        json!({
            "workspacePath": path.to_string_lossy(),
            "settingsLoaded": settings_loaded,
        }),
    )
}

fn handle_settings_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(&req.id, json!(state.settings))
}

fn handle_settings_update(state: &mut AppState, req: &Request) -> serde_json::Value {
    match state.settings.merged(&req.params) {
        Ok(s) => {
            state.settings = s;
            ok(&req.id, json!(state.settings))
        }
        Err(e) => err(&req.id, "bad_params", format!("{e:#}"), None),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "health" => Some(handle_health(state, req)),
        "workspace.select" => Some(handle_workspace_select(state, req)),
        "settings.get" => Some(handle_settings_get(state, req)),
        "settings.update" => Some(handle_settings_update(state, req)),
        _ => None,
    }
}
