//! Markshelf RPC Server: JSON-RPC over stdin/stdout for the popup front end.
//!
//! Protocol: one JSON object per line (newline-delimited JSON).
//! Request:  {"id":1, "method":"bookmark.children", "params":{"id":"1"}}
//! Response: {"id":1, "result":{...}} or {"id":1, "error":"..."}
//!
//! Logs go to stderr so they never interleave with responses.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Mutex;

use markshelf::app::App;
use markshelf::platform;
use markshelf::rpc_handler::handle_method;

use serde_json::{json, Value};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();
}

/// `MARKSHELF_DATA_DIR` if set, else the platform data directory.
fn db_path() -> PathBuf {
    let dir = match std::env::var("MARKSHELF_DATA_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(_) => platform::get_data_dir(),
    };
    if let Err(e) = std::fs::create_dir_all(&dir) {
        error!(dir = %dir.display(), error = %e, "cannot create data directory");
    }
    dir.join("bookmarks.db")
}

fn respond(out: &mut impl Write, response: &Value) -> io::Result<()> {
    writeln!(out, "{}", response)?;
    out.flush()
}

fn main() {
    init_tracing();

    let path = db_path();
    let app = match App::new(&path.to_string_lossy()) {
        Ok(app) => Mutex::new(app),
        Err(e) => {
            error!(path = %path.display(), error = %e, "failed to initialize markshelf");
            std::process::exit(1);
        }
    };
    info!(path = %path.display(), "bookmark database ready");

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let ready = json!({"event": "ready", "version": env!("CARGO_PKG_VERSION")});
    if respond(&mut out, &ready).is_err() {
        return;
    }

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(_) => break,
        };
        if line.trim().is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<Value>(&line) {
            Ok(req) => {
                let id = req.get("id").cloned().unwrap_or(Value::Null);
                let method = req.get("method").and_then(|v| v.as_str()).unwrap_or("");
                let params = req.get("params").cloned().unwrap_or(json!({}));
                match handle_method(&app, method, &params) {
                    Ok(val) => json!({"id": id, "result": val}),
                    Err(err) => json!({"id": id, "error": err}),
                }
            }
            Err(e) => json!({"id": null, "error": format!("parse error: {}", e)}),
        };

        if respond(&mut out, &response).is_err() {
            break;
        }
    }
}
