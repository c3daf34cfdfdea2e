//! Command dispatch: load the tree, run the operation, print the outcome.

use std::io;
use std::path::Path;

use clap::CommandFactory;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::application::{load_tree, ApplicationError, ApplicationResult, LoadedTree};
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{global_config_path, Settings};
use crate::domain::{label_of, NodeId, NodeSet, Query, Removal, TreeArena, TreeNodeConvert};

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let Some(command) = &cli.command else {
        return Err(CliError::Usage(
            "no command given, run with --help for usage".to_string(),
        ));
    };

    if let Commands::Completion { shell } = command {
        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        clap_complete::generate(*shell, &mut cmd, name, &mut io::stdout());
        return Ok(());
    }

    let settings = Settings::load(cli.config.as_deref())?;
    debug!(?settings, "effective settings");

    match command {
        Commands::Show { file, label } => cmd_show(&settings, file, label.as_deref()),
        Commands::Find { file, id } => cmd_find(&settings, file, id),
        Commands::Where {
            file,
            filters,
            first,
            from,
            descendants,
        } => cmd_where(&settings, file, filters, *first, from.as_deref(), *descendants),
        Commands::Info { file, id } => cmd_info(&settings, file, id),
        Commands::Remove {
            file,
            filters,
            first,
        } => cmd_remove(&settings, file, filters, *first),
        Commands::Config { command } => cmd_config(&settings, command),
        Commands::Completion { .. } => Ok(()),
    }
}

#[instrument(skip(settings))]
fn cmd_show(settings: &Settings, file: &Path, label: Option<&str>) -> CliResult<()> {
    let loaded = load_tree(file, settings)?;
    let label_field = label.unwrap_or(&settings.label_field);
    output::info(&loaded.tree.to_tree_string(loaded.root, label_field));
    Ok(())
}

#[instrument(skip(settings))]
fn cmd_find(settings: &Settings, file: &Path, id: &str) -> CliResult<()> {
    let loaded = load_tree(file, settings)?;
    let node = loaded.require(id)?;
    output::info(&format!("{:#}", attrs_value(&loaded.tree, node)));
    Ok(())
}

#[instrument(skip(settings))]
fn cmd_where(
    settings: &Settings,
    file: &Path,
    filters: &[String],
    first: bool,
    from: Option<&str>,
    descendants: bool,
) -> CliResult<()> {
    let loaded = load_tree(file, settings)?;
    let query = Query::from_filters(filters)?;
    let start = match from {
        Some(id) => loaded.require(id)?,
        None => loaded.root,
    };

    let mode = match (first, descendants) {
        (true, _) => Selection::First,
        (false, true) => Selection::Descendants,
        (false, false) => Selection::All,
    };
    let matches = select(&loaded.tree, start, &query, mode)?;
    if matches.is_empty() {
        output::warning(&format!("no node matches {}", query));
    }
    for attrs in matches.snapshots(&loaded.tree) {
        output::info(&Value::Object(attrs));
    }
    Ok(())
}

/// Which nodes `where` reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Selection {
    /// First match only; a miss is an error
    First,
    /// Every match, start node included
    All,
    /// Every match below the start node
    Descendants,
}

fn select(
    tree: &TreeArena,
    start: NodeId,
    query: &Query,
    mode: Selection,
) -> ApplicationResult<NodeSet> {
    match mode {
        Selection::First => tree
            .find_where(start, query)
            .map(|hit| NodeSet::from_iter([hit]))
            .ok_or_else(|| ApplicationError::NodeNotFound(query.to_string())),
        Selection::All => Ok(tree.where_all(start, query)),
        Selection::Descendants => Ok(tree.where_descendants(start, query)),
    }
}

#[instrument(skip(settings))]
fn cmd_info(settings: &Settings, file: &Path, id: &str) -> CliResult<()> {
    let loaded = load_tree(file, settings)?;
    let node = loaded.require(id)?;
    let tree = &loaded.tree;
    let label = |other: Option<NodeId>| -> String {
        other
            .map(|n| node_label(tree, n, tree.id_field()))
            .unwrap_or_else(|| "-".to_string())
    };

    output::field("node", &node_label(tree, node, tree.id_field()));
    output::field("parent", &label(tree.parent(node)));
    output::field(
        "index",
        &tree
            .index(node)
            .map(|i| i.to_string())
            .unwrap_or_else(|| "-".to_string()),
    );
    output::field("prev", &label(tree.prev(node)));
    output::field("next", &label(tree.next(node)));
    output::field("root", &label(tree.root(node)));
    output::field("level", &(tree.path(node).len() - 1));
    output::field("children", &tree.children(node).len());
    Ok(())
}

#[instrument(skip(settings))]
fn cmd_remove(
    settings: &Settings,
    file: &Path,
    filters: &[String],
    first: bool,
) -> CliResult<()> {
    let LoadedTree { mut tree, root } = load_tree(file, settings)?;
    let query = Query::from_filters(filters)?;
    let mode = if first { Removal::First } else { Removal::All };

    let report = remove_matching(&mut tree, root, &query, mode);
    output::action(
        "removed",
        &format!("{} node(s) matching {}", report.removed, query),
    );
    if report.root_matched {
        output::warning("the root matches but cannot be removed");
    }
    output::info(&tree.to_tree_string(root, &settings.label_field));
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RemoveReport {
    removed: usize,
    /// Root matched the query and was kept
    root_matched: bool,
}

fn remove_matching(
    tree: &mut TreeArena,
    root: NodeId,
    query: &Query,
    mode: Removal,
) -> RemoveReport {
    let removed = tree.remove_where(root, query, mode);
    RemoveReport {
        removed,
        root_matched: tree.matches(root, query),
    }
}

fn cmd_config(settings: &Settings, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => output::info(&settings.to_toml()?),
        ConfigCommands::Template => output::info(&Settings::template()),
        ConfigCommands::Path => match global_config_path() {
            Some(path) => output::info(&path.display()),
            None => output::warning("no config directory available on this platform"),
        },
    }
    Ok(())
}

fn attrs_value(tree: &TreeArena, node: NodeId) -> Value {
    Value::Object(tree.snapshot(node).unwrap_or_default())
}

fn node_label(tree: &TreeArena, node: NodeId, field: &str) -> String {
    tree.attr(node, field)
        .map(label_of)
        .unwrap_or_else(|| node.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NodeSpec;
    use serde_json::json;

    // r{a{a1}, b}; r, a1 and b have kind=x
    fn tree() -> (TreeArena, NodeId) {
        let mut tree = TreeArena::new();
        let root = tree.create(
            NodeSpec::from_value(json!({
                "id": "r", "kind": "x",
                "nodes": [
                    {"id": "a", "nodes": [{"id": "a1", "kind": "x"}]},
                    {"id": "b", "kind": "x"}
                ]
            }))
            .unwrap(),
        );
        (tree, root)
    }

    fn ids(tree: &TreeArena, nodes: &NodeSet) -> Vec<String> {
        nodes.iter().map(|&n| node_label(tree, n, "id")).collect()
    }

    #[test]
    fn given_first_selection_when_selecting_then_single_preferred_match() {
        let (tree, root) = tree();
        let a = tree.find(root, "a").unwrap();

        let query = Query::new().eq("kind", "x");
        let hit = select(&tree, a, &query, Selection::First).unwrap();
        assert_eq!(ids(&tree, &hit), vec!["a1"]);
    }

    #[test]
    fn given_first_selection_without_match_when_selecting_then_not_found() {
        let (tree, root) = tree();
        let query = Query::new().eq("kind", "z");
        let err = select(&tree, root, &query, Selection::First).unwrap_err();
        assert!(matches!(err, ApplicationError::NodeNotFound(_)));
        assert_eq!(CliError::from(err).exit_code(), crate::exitcode::NOTFOUND);
    }

    #[test]
    fn given_descendants_selection_when_selecting_then_start_excluded() {
        let (tree, root) = tree();
        let query = Query::new().eq("kind", "x");

        let all = select(&tree, root, &query, Selection::All).unwrap();
        assert_eq!(ids(&tree, &all), vec!["r", "b", "a1"]);

        let below = select(&tree, root, &query, Selection::Descendants).unwrap();
        assert_eq!(ids(&tree, &below), vec!["b", "a1"]);
    }

    #[test]
    fn given_query_matching_root_when_removing_then_root_kept_and_reported() {
        let (mut tree, root) = tree();

        let query = Query::new().eq("kind", "x");
        let report = remove_matching(&mut tree, root, &query, Removal::All);

        assert_eq!(
            report,
            RemoveReport {
                removed: 2,
                root_matched: true
            }
        );
        assert!(tree.contains(root));
        assert_eq!(tree.children(root).len(), 1);
    }

    #[test]
    fn given_query_missing_root_when_removing_then_no_root_warning() {
        let (mut tree, root) = tree();

        let query = Query::new().eq("id", "a");
        let report = remove_matching(&mut tree, root, &query, Removal::First);

        assert_eq!(report.removed, 1);
        assert!(!report.root_matched);
        assert!(tree.find(root, "a1").is_none());
    }
}
