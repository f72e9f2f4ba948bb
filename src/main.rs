//! filemarks: named file bookmarks in nested groups.
//!
//! Small command-line front end over `App`. Without a command it prints the
//! stored forest.
//!
//! ```text
//! filemarks [--config PATH] [list]
//! filemarks [--config PATH] add <path|uri> [name] [--group ID]
//! filemarks [--config PATH] group <name> [--parent ID]
//! filemarks [--config PATH] remove <id>
//! filemarks [--config PATH] export <file>
//! filemarks [--config PATH] import <file> [--merge]
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use filemarks::app::App;
use filemarks::managers::bookmark_manager::BookmarkManagerTrait;
use filemarks::services::editor::DetachedEditor;
use filemarks::services::notifier::LogNotifier;
use filemarks::types::errors::BookmarkError;
use filemarks::types::group::Group;
use filemarks::types::locator::Locator;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args: Vec<String> = std::env::args().skip(1).collect();
    let config_path = take_option(&mut args, "--config");

    let mut app = App::new(config_path, Arc::new(DetachedEditor), Arc::new(LogNotifier))?;
    let restored = app.startup();
    tracing::debug!(
        bookmarks = restored.bookmarks,
        groups = restored.groups,
        skipped = restored.skipped,
        "restored forest"
    );

    let command = if args.is_empty() {
        "list".to_string()
    } else {
        args.remove(0)
    };
    let mgr = &mut app.bookmark_manager;

    match command.as_str() {
        "list" => print_forest(&*mgr),
        "add" => {
            let group = take_option(&mut args, "--group");
            let target = args.first().ok_or("add: missing <path|uri>")?;
            let locator = to_locator(target)?;
            let id = mgr.add_bookmark(locator, args.get(1).map(String::as_str), None, group.as_deref());
            println!("{}", id);
        }
        "group" => {
            let parent = take_option(&mut args, "--parent");
            let name = args.first().ok_or("group: missing <name>")?;
            println!("{}", mgr.create_group(name, None, parent.as_deref()));
        }
        "remove" => {
            let id = args.first().ok_or("remove: missing <id>")?;
            if !mgr.remove_bookmark(id) && !mgr.remove_group(id) {
                return Err(BookmarkError::NotFound(id.clone()).into());
            }
        }
        "export" => {
            let file = args.first().ok_or("export: missing <file>")?;
            mgr.export_to_file(Path::new(file))?;
        }
        "import" => {
            let merge = take_flag(&mut args, "--merge");
            let file = args.first().ok_or("import: missing <file>")?;
            let report = mgr.import_from_file(Path::new(file), merge)?;
            println!(
                "imported {} bookmark(s), {} group(s), skipped {}",
                report.bookmarks, report.groups, report.skipped
            );
        }
        other => return Err(format!("unknown command: {}", other).into()),
    }

    app.shutdown();
    Ok(())
}

/// Removes `name VALUE` from `args`, returning VALUE.
fn take_option(args: &mut Vec<String>, name: &str) -> Option<String> {
    let pos = args.iter().position(|a| a == name)?;
    if pos + 1 >= args.len() {
        args.remove(pos);
        return None;
    }
    let value = args.remove(pos + 1);
    args.remove(pos);
    Some(value)
}

fn take_flag(args: &mut Vec<String>, name: &str) -> bool {
    match args.iter().position(|a| a == name) {
        Some(pos) => {
            args.remove(pos);
            true
        }
        None => false,
    }
}

/// URIs are parsed as-is; anything else is a filesystem path, made absolute
/// against the working directory.
fn to_locator(arg: &str) -> Result<Locator, Box<dyn std::error::Error>> {
    if arg.contains("://") {
        return Ok(arg.parse::<Locator>()?);
    }
    let path = PathBuf::from(arg);
    let absolute = if path.is_absolute() {
        path
    } else {
        std::env::current_dir()?.join(path)
    };
    Ok(Locator::from_path(absolute)?)
}

fn print_forest(mgr: &impl BookmarkManagerTrait) {
    for bookmark in mgr.list_root_bookmarks() {
        println!("{}  {}  {}", bookmark.id(), bookmark.name(), bookmark.locator());
    }
    for group in mgr.list_root_groups() {
        print_group(&group, 0);
    }
}

fn print_group(group: &Group, depth: usize) {
    let indent = "  ".repeat(depth);
    println!("{}[{}] {}", indent, group.id(), group.name());
    for bookmark in group.bookmarks() {
        println!(
            "{}  {}  {}  {}",
            indent,
            bookmark.id(),
            bookmark.name(),
            bookmark.locator()
        );
    }
    for child in group.children() {
        print_group(child, depth + 1);
    }
}
