//! Markshelf console demo.
//!
//! Builds a small tree in an in-memory database and walks through browsing,
//! search and a few drag gestures, printing what the popup would show.

use std::error::Error;

use markshelf::app::App;
use markshelf::database::connection::Database;
use markshelf::managers::bookmark_manager::TreeStore;
use markshelf::managers::drag_session::DropOutcome;
use markshelf::services::settings_engine::SettingsEngine;
use markshelf::types::bookmark::{BookmarkNode, CreateDetails, BOOKMARKS_BAR_ID};
use markshelf::types::drag::{DragPayload, DropTarget, Point, Rect};
use tracing_subscriber::EnvFilter;

fn section(name: &str) {
    println!("───────────────────────────────────────────────────────────────");
    println!("  {}", name);
    println!("───────────────────────────────────────────────────────────────");
}

fn titles(nodes: &[BookmarkNode]) -> String {
    nodes.iter().map(|n| n.title.as_str()).collect::<Vec<_>>().join(", ")
}

fn create(app: &mut App, parent: &str, title: &str, url: Option<&str>) -> Result<BookmarkNode, Box<dyn Error>> {
    let details = CreateDetails {
        parent_id: parent.to_string(),
        title: title.to_string(),
        url: url.map(str::to_string),
        index: None,
    };
    Ok(app.create(&details)?)
}

/// Tile `index` in a grid row of 100px-wide tiles.
fn tile(node: &BookmarkNode) -> DropTarget {
    DropTarget::from_node(node, Rect::new(node.index as f64 * 100.0, 0.0, 100.0, 80.0))
}

fn describe(outcome: &DropOutcome) -> String {
    match outcome {
        DropOutcome::Moved(node) => format!("moved {} to index {}", node.title, node.index),
        DropOutcome::Unchanged => "unchanged".to_string(),
        DropOutcome::Rejected(r) if r.is_silent() => format!("suppressed ({})", r),
        DropOutcome::Rejected(r) => format!("refused: {}", r),
        DropOutcome::Failed(e) => format!("failed: {}", e),
        DropOutcome::Aborted(e) => format!("aborted: {}", e),
        DropOutcome::Ignored => "ignored".to_string(),
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    println!("Markshelf v{} (demo)", env!("CARGO_PKG_VERSION"));
    let mut app = App::with_parts(Database::open_in_memory()?, SettingsEngine::new(None));

    section("Building the tree");
    let rust = create(&mut app, BOOKMARKS_BAR_ID, "Rust", None)?;
    let crates = create(&mut app, &rust.id, "Crates", None)?;
    create(&mut app, &rust.id, "Book", Some("https://doc.rust-lang.org/book/"))?;
    create(&mut app, &rust.id, "Reference", Some("https://doc.rust-lang.org/reference/"))?;
    create(&mut app, &crates.id, "serde", Some("https://serde.rs"))?;
    println!("  Indexed {} nodes", app.index_tree()?);

    section("Browsing");
    let children = app.open_folder(&rust.id)?;
    println!("  Rust: {}", titles(&children));
    let crumbs = app.breadcrumbs(&crates.id)?;
    println!("  Path to Crates: {}", titles(&crumbs[1..]));

    section("Search");
    println!("  \"doc\": {}", titles(&app.search_bookmarks("doc")?));

    section("Drag and drop");
    // Crates after Reference: a reorder in the grid.
    let first = children[0].clone();
    let last = children[children.len() - 1].clone();
    app.drag_start(DragPayload::from_node(&first))?;
    let target = tile(&last);
    let pointer = Point::new(target.bounds.x + 95.0, 40.0);
    let hints = app.drag_over(&target, pointer);
    println!("  Hover {} → {:?} edge", last.title, hints.edge);
    let outcome = app.drop_on(&target, pointer, None);
    println!("  Drop: {}", describe(&outcome));
    println!("  Rust: {}", titles(&app.open_folder(&rust.id)?));

    // Rust into its own child folder.
    let crates = app.store().get_node(&crates.id)?;
    app.drag_start(DragPayload::from_node(&rust))?;
    let target = tile(&crates);
    let outcome = app.drop_on(&target, Point::new(target.bounds.x + 50.0, 40.0), None);
    println!("  Drop Rust into Crates: {}", describe(&outcome));

    // Book into Crates: appended after serde.
    let book = app.store().get_node(&children[1].id)?;
    app.drag_start(DragPayload::from_node(&book))?;
    let outcome = app.drop_on(&target, Point::new(target.bounds.x + 50.0, 40.0), None);
    println!("  Drop Book into Crates: {}", describe(&outcome));
    println!("  Crates: {}", titles(&app.open_folder(&crates.id)?));

    // Hover a few tiles, then let go outside the popup.
    let reference = app.store().get_node(&last.id)?;
    app.drag_start(DragPayload::from_node(&reference))?;
    for node in app.open_folder(&rust.id)? {
        let target = tile(&node);
        app.drag_over(&target, Point::new(target.bounds.x + 50.0, 40.0));
    }
    app.drag_end();
    println!("  Cancelled drag, session idle: {}", app.session.is_idle());
    println!("  Rust: {}", titles(&app.open_folder(&rust.id)?));

    Ok(())
}
