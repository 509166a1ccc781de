//! `stockyard tree` — render the point-in-time snapshot.

use std::path::Path;

use anyhow::Result;

use crate::cli::{output, parse_at};
use crate::db::Database;
use crate::ledger;
use crate::tree::{self, TreeNode};

pub fn run(db_path: &Path, at: Option<&str>, cargo_type: Option<&str>) -> Result<()> {
    let at = parse_at(at)?;
    let db = Database::open(db_path)?;
    let filter = match cargo_type {
        Some(name) => Some(ledger::type_by_name(&db, name)?.id),
        None => None,
    };
    let roots = tree::build(&db, at, filter)?;
    if output::is_json() {
        output::print_json(&serde_json::to_value(&roots)?);
        return Ok(());
    }
    if roots.is_empty() {
        println!("nothing to show");
        return Ok(());
    }
    for root in &roots {
        print_node(root, 0);
    }
    Ok(())
}

fn print_node(node: &TreeNode, depth: usize) {
    let pad = "  ".repeat(depth);
    match node {
        TreeNode::Warehouse {
            id,
            name,
            platforms,
        } => {
            println!("{pad}{name} (warehouse {id})");
            for child in platforms {
                print_node(child, depth + 1);
            }
        }
        TreeNode::Platform {
            id,
            name,
            cargo,
            pickets,
        } => {
            match cargo {
                Some(summary) => println!(
                    "{pad}{name} (platform {id}) [{}: {}]",
                    summary.cargo_type, summary.remainder
                ),
                None => println!("{pad}{name} (platform {id}) [no cargo]"),
            }
            for child in pickets {
                print_node(child, depth + 1);
            }
        }
        TreeNode::Picket { id, name } => {
            println!("{pad}{name} (picket {id})");
        }
    }
}
