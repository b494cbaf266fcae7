//! RPC method handler for the Markshelf JSON-RPC protocol.
//!
//! Kept apart from `rpc_server.rs` so it can be unit-tested without stdio.
//! `handle_method` dispatches one call to the `App` behind the mutex.

use std::sync::Mutex;

use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::app::App;
use crate::managers::bookmark_manager::TreeStore;
use crate::managers::drag_session::DropOutcome;
use crate::services::settings_engine::SettingsEngineTrait;
use crate::types::bookmark::{BookmarkChanges, CreateDetails};
use crate::types::drag::{DropTarget, Point};

fn str_param<'a>(params: &'a Value, key: &'static str) -> Result<&'a str, String> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| format!("missing {}", key))
}

fn typed_param<T: DeserializeOwned>(params: &Value, key: &'static str) -> Result<T, String> {
    let value = params.get(key).ok_or_else(|| format!("missing {}", key))?;
    serde_json::from_value(value.clone()).map_err(|e| format!("invalid {}: {}", key, e))
}

fn index_param(params: &Value) -> Result<Option<u32>, String> {
    match params.get("index") {
        None | Some(Value::Null) => Ok(None),
        Some(v) => v
            .as_u64()
            .and_then(|i| u32::try_from(i).ok())
            .map(Some)
            .ok_or_else(|| "invalid index".to_string()),
    }
}

fn non_blank_title(title: &str) -> Result<String, String> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err("invalid title: must not be empty".to_string());
    }
    Ok(trimmed.to_string())
}

fn outcome_to_json(outcome: &DropOutcome) -> Value {
    let (kind, node) = match outcome {
        DropOutcome::Moved(node) => ("moved", Some(node)),
        DropOutcome::Unchanged => ("unchanged", None),
        DropOutcome::Rejected(_) => ("rejected", None),
        DropOutcome::Failed(_) => ("failed", None),
        DropOutcome::Aborted(_) => ("aborted", None),
        DropOutcome::Ignored => ("ignored", None),
    };
    json!({
        "outcome": kind,
        "node": node,
        "notification": outcome.notification(),
    })
}

/// Dispatch a JSON-RPC method call.
///
/// Returns `Ok(Value)` on success or `Err(String)` with an error message.
pub fn handle_method(app: &Mutex<App>, method: &str, params: &Value) -> Result<Value, String> {
    match method {
        "ping" => Ok(json!({"pong": true})),

        // ─── Bookmarks ───
        "bookmark.get" => {
            let id = str_param(params, "id")?;
            let a = app.lock().map_err(|e| e.to_string())?;
            let node = a.store().get_node(id).map_err(|e| e.to_string())?;
            Ok(json!(node))
        }
        "bookmark.children" => {
            let id = str_param(params, "id")?;
            let mut a = app.lock().map_err(|e| e.to_string())?;
            let children = a.open_folder(id).map_err(|e| e.to_string())?;
            Ok(json!(children))
        }
        "bookmark.path" => {
            let id = str_param(params, "id")?;
            let a = app.lock().map_err(|e| e.to_string())?;
            let path = a.breadcrumbs(id).map_err(|e| e.to_string())?;
            Ok(json!(path))
        }
        "bookmark.create" => {
            let parent_id = str_param(params, "parentId")?;
            let title = non_blank_title(str_param(params, "title")?)?;
            let url = params.get("url").and_then(|v| v.as_str());
            if matches!(url, Some(u) if u.trim().is_empty()) {
                return Err("invalid url: must not be empty".to_string());
            }
            let details = CreateDetails {
                parent_id: parent_id.to_string(),
                title,
                url: url.map(str::to_string),
                index: index_param(params)?,
            };
            let mut a = app.lock().map_err(|e| e.to_string())?;
            let node = a.create(&details).map_err(|e| e.to_string())?;
            Ok(json!(node))
        }
        "bookmark.update" => {
            let id = str_param(params, "id")?;
            let title = match params.get("title").and_then(|v| v.as_str()) {
                Some(t) => Some(non_blank_title(t)?),
                None => None,
            };
            let changes = BookmarkChanges {
                title,
                url: params.get("url").and_then(|v| v.as_str()).map(str::to_string),
            };
            let mut a = app.lock().map_err(|e| e.to_string())?;
            let node = a.update(id, &changes).map_err(|e| e.to_string())?;
            Ok(json!(node))
        }
        "bookmark.remove" => {
            let id = str_param(params, "id")?;
            let recursive = params.get("recursive").and_then(|v| v.as_bool()).unwrap_or(false);
            let mut a = app.lock().map_err(|e| e.to_string())?;
            a.remove(id, recursive).map_err(|e| e.to_string())?;
            Ok(json!({"ok": true}))
        }
        "bookmark.move" => {
            let id = str_param(params, "id")?;
            let parent_id = str_param(params, "parentId")?;
            let index = index_param(params)?;
            let mut a = app.lock().map_err(|e| e.to_string())?;
            Ok(json!({"ok": a.on_move_bookmark(id, parent_id, index)}))
        }
        "bookmark.search" => {
            let query = str_param(params, "query")?;
            let seq = params.get("seq").and_then(|v| v.as_u64());
            let mut a = app.lock().map_err(|e| e.to_string())?;
            if let Some(seq) = seq {
                if !a.search.observe(seq) {
                    return Ok(json!({"stale": true, "items": []}));
                }
            }
            let items = a.search_bookmarks(query).map_err(|e| e.to_string())?;
            Ok(json!({"stale": false, "items": items}))
        }
        "tree.index" => {
            let mut a = app.lock().map_err(|e| e.to_string())?;
            let nodes = a.index_tree().map_err(|e| e.to_string())?;
            Ok(json!({"nodes": nodes}))
        }

        // ─── Drag and drop ───
        "drag.start" => {
            let transfer = str_param(params, "transfer")?;
            let mut a = app.lock().map_err(|e| e.to_string())?;
            a.drag_start_from_transfer(transfer).map_err(|e| e.to_string())?;
            Ok(json!({"ok": true}))
        }
        "drag.over" => {
            let target: DropTarget = typed_param(params, "target")?;
            let pointer: Point = typed_param(params, "pointer")?;
            let mut a = app.lock().map_err(|e| e.to_string())?;
            Ok(json!(a.drag_over(&target, pointer)))
        }
        "drag.leave" => {
            let id = str_param(params, "id")?;
            let mut a = app.lock().map_err(|e| e.to_string())?;
            a.drag_leave(id);
            Ok(json!({"ok": true}))
        }
        "drag.drop" => {
            let target: DropTarget = typed_param(params, "target")?;
            let pointer: Point = typed_param(params, "pointer")?;
            let transfer = params.get("transfer").and_then(|v| v.as_str());
            let mut a = app.lock().map_err(|e| e.to_string())?;
            let outcome = a.drop_on(&target, pointer, transfer);
            Ok(outcome_to_json(&outcome))
        }
        "drag.end" => {
            let mut a = app.lock().map_err(|e| e.to_string())?;
            a.drag_end();
            Ok(json!({"ok": true}))
        }

        // ─── Settings ───
        "settings.get" => {
            let a = app.lock().map_err(|e| e.to_string())?;
            Ok(json!(a.settings_engine.get_settings()))
        }
        "settings.set" => {
            let key = str_param(params, "key")?;
            let value = params.get("value").cloned().ok_or("missing value")?;
            let mut a = app.lock().map_err(|e| e.to_string())?;
            a.settings_engine.set_value(key, value).map_err(|e| e.to_string())?;
            a.apply_settings();
            Ok(json!({"ok": true}))
        }

        _ => Err(format!("unknown method: {}", method)),
    }
}
