// Copyright 2026 Stockyard Contributors
// SPDX-License-Identifier: Apache-2.0

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use stockyard::cli;
use stockyard::ErrorKind;

#[derive(Parser)]
#[command(
    name = "stockyard",
    about = "Stockyard — bitemporal warehouse topology and cargo ledger",
    version,
    after_help = "Run 'stockyard <command> --help' for details on each command.\nAll timestamps are UTC; pass --at to backdate an operation."
)]
struct Cli {
    /// Database file (defaults to $STOCKYARD_DB or ~/.stockyard/stockyard.db)
    #[arg(long, global = true, value_name = "PATH")]
    db: Option<PathBuf>,

    /// Output results as JSON (machine-readable)
    #[arg(long, global = true)]
    json: bool,

    /// Suppress non-essential output
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Enable verbose/debug logging
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the database, optionally seeded with a demo yard
    Init {
        /// Seed two warehouses with pickets, platforms and cargo traffic
        #[arg(long)]
        demo: bool,
    },
    /// Manage warehouses
    Warehouse {
        #[command(subcommand)]
        action: WarehouseAction,
    },
    /// Manage pickets
    Picket {
        #[command(subcommand)]
        action: PicketAction,
    },
    /// Manage platforms
    Platform {
        #[command(subcommand)]
        action: PlatformAction,
    },
    /// Manage the cargo type catalogue
    CargoType {
        #[command(subcommand)]
        action: CargoTypeAction,
    },
    /// Record and inspect cargo movements
    Cargo {
        #[command(subcommand)]
        action: CargoAction,
    },
    /// Print every warehouse as a tree, as of an instant
    Tree {
        /// Instant to query (RFC 3339 or "YYYY-MM-DD HH:MM"; defaults to now)
        #[arg(long)]
        at: Option<String>,
        /// Only show platforms currently holding this cargo type
        #[arg(long = "cargo-type")]
        cargo_type: Option<String>,
    },
}

#[derive(Subcommand)]
enum WarehouseAction {
    /// Register a new warehouse
    Create {
        /// Warehouse name (unique among open warehouses)
        name: String,
        /// Creation instant (defaults to now)
        #[arg(long)]
        at: Option<String>,
    },
    /// List warehouses
    List {
        /// Include closed warehouses
        #[arg(long)]
        all: bool,
    },
    /// Rename a warehouse
    Rename {
        id: i64,
        new_name: String,
    },
    /// Close a warehouse and everything inside it
    Close {
        id: i64,
        /// Closing instant (defaults to now)
        #[arg(long)]
        at: Option<String>,
    },
}

#[derive(Subcommand)]
enum PicketAction {
    /// Add a picket to a warehouse
    Create {
        warehouse: i64,
        /// Picket name; its lexicographic rank fixes its physical position
        name: String,
        /// Attach the new picket to this platform immediately
        #[arg(long)]
        platform: Option<i64>,
        /// Creation instant (defaults to now)
        #[arg(long)]
        at: Option<String>,
    },
    /// List a warehouse's pickets in sequence order
    List {
        warehouse: i64,
        /// Include closed pickets
        #[arg(long)]
        all: bool,
    },
    /// Rename a picket (its new rank must not break any platform)
    Rename {
        id: i64,
        new_name: String,
    },
    /// Close a picket, releasing it from its platform
    Close {
        id: i64,
        /// Closing instant (defaults to now)
        #[arg(long)]
        at: Option<String>,
    },
}

#[derive(Subcommand)]
enum PlatformAction {
    /// Form a platform from contiguous pickets, absorbing prior platforms
    Create {
        warehouse: i64,
        name: String,
        /// Picket names to group (must be a contiguous run)
        #[arg(required = true)]
        pickets: Vec<String>,
        /// Creation instant (defaults to now)
        #[arg(long)]
        at: Option<String>,
    },
    /// List a warehouse's platforms
    List {
        warehouse: i64,
        /// Include closed platforms
        #[arg(long)]
        all: bool,
    },
    /// Show the pickets a platform held at an instant
    Pickets {
        id: i64,
        /// Instant to query (defaults to now)
        #[arg(long)]
        at: Option<String>,
    },
    /// Rename a platform
    Rename {
        id: i64,
        new_name: String,
    },
    /// Close a platform, releasing its pickets
    Close {
        id: i64,
        /// Closing instant (defaults to now)
        #[arg(long)]
        at: Option<String>,
    },
}

#[derive(Subcommand)]
enum CargoTypeAction {
    /// Register a cargo type
    Create { name: String },
    /// List all cargo types
    List,
}

#[derive(Subcommand)]
enum CargoAction {
    /// Book cargo in and/or out on a platform
    Record {
        platform: i64,
        /// Cargo type name
        #[arg(long, name = "type")]
        cargo_type: String,
        /// Quantity arriving
        #[arg(long, default_value = "0")]
        coming: String,
        /// Quantity leaving
        #[arg(long, default_value = "0")]
        consumption: String,
        /// Booking instant (defaults to now)
        #[arg(long)]
        at: Option<String>,
    },
    /// Show the remainder on a platform as of an instant
    Current {
        platform: i64,
        /// Instant to query (defaults to now)
        #[arg(long)]
        at: Option<String>,
    },
    /// Show a platform's booking history
    History {
        platform: i64,
        /// Only bookings at or after this instant
        #[arg(long)]
        from: Option<String>,
        /// Only bookings at or before this instant
        #[arg(long)]
        to: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set global flags via environment variables so all modules can check them
    if cli.json {
        std::env::set_var("STOCKYARD_JSON", "1");
    }
    if cli.quiet {
        std::env::set_var("STOCKYARD_QUIET", "1");
    }
    if cli.verbose {
        std::env::set_var("STOCKYARD_VERBOSE", "1");
    }

    let directive = if cli.verbose {
        "stockyard=debug"
    } else if cli.quiet {
        "stockyard=warn"
    } else {
        "stockyard=info"
    };
    let filter = EnvFilter::from_default_env().add_directive(directive.parse().unwrap());
    // logs go to stderr so --json output on stdout stays parseable
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if cli.json {
        builder.json().init();
    } else {
        builder.init();
    }

    let db_path = cli::database_path(cli.db.as_deref());

    let result = match cli.command {
        Commands::Init { demo } => cli::init_cmd::run(&db_path, demo),

        Commands::Warehouse { action } => match action {
            WarehouseAction::Create { name, at } => {
                cli::warehouse_cmd::run_create(&db_path, &name, at.as_deref())
            }
            WarehouseAction::List { all } => cli::warehouse_cmd::run_list(&db_path, all),
            WarehouseAction::Rename { id, new_name } => {
                cli::warehouse_cmd::run_rename(&db_path, id, &new_name)
            }
            WarehouseAction::Close { id, at } => {
                cli::warehouse_cmd::run_close(&db_path, id, at.as_deref())
            }
        },

        Commands::Picket { action } => match action {
            PicketAction::Create {
                warehouse,
                name,
                platform,
                at,
            } => cli::picket_cmd::run_create(&db_path, warehouse, &name, platform, at.as_deref()),
            PicketAction::List { warehouse, all } => {
                cli::picket_cmd::run_list(&db_path, warehouse, all)
            }
            PicketAction::Rename { id, new_name } => {
                cli::picket_cmd::run_rename(&db_path, id, &new_name)
            }
            PicketAction::Close { id, at } => {
                cli::picket_cmd::run_close(&db_path, id, at.as_deref())
            }
        },

        Commands::Platform { action } => match action {
            PlatformAction::Create {
                warehouse,
                name,
                pickets,
                at,
            } => cli::platform_cmd::run_create(&db_path, warehouse, &name, &pickets, at.as_deref()),
            PlatformAction::List { warehouse, all } => {
                cli::platform_cmd::run_list(&db_path, warehouse, all)
            }
            PlatformAction::Pickets { id, at } => {
                cli::platform_cmd::run_pickets(&db_path, id, at.as_deref())
            }
            PlatformAction::Rename { id, new_name } => {
                cli::platform_cmd::run_rename(&db_path, id, &new_name)
            }
            PlatformAction::Close { id, at } => {
                cli::platform_cmd::run_close(&db_path, id, at.as_deref())
            }
        },

        Commands::CargoType { action } => match action {
            CargoTypeAction::Create { name } => cli::cargo_type_cmd::run_create(&db_path, &name),
            CargoTypeAction::List => cli::cargo_type_cmd::run_list(&db_path),
        },

        Commands::Cargo { action } => match action {
            CargoAction::Record {
                platform,
                cargo_type,
                coming,
                consumption,
                at,
            } => cli::cargo_cmd::run_record(
                &db_path,
                platform,
                &cargo_type,
                &coming,
                &consumption,
                at.as_deref(),
            ),
            CargoAction::Current { platform, at } => {
                cli::cargo_cmd::run_current(&db_path, platform, at.as_deref())
            }
            CargoAction::History { platform, from, to } => {
                cli::cargo_cmd::run_history(&db_path, platform, from.as_deref(), to.as_deref())
            }
        },

        Commands::Tree { at, cargo_type } => {
            cli::tree_cmd::run(&db_path, at.as_deref(), cargo_type.as_deref())
        }
    };

    // Exit codes: 0=success, 2=not found, 3=rejected operation, 1=internal
    if let Err(e) = &result {
        if !cli::output::is_quiet() && !cli::output::is_json() {
            eprintln!("  Error: {e:#}");
        }
        if cli::output::is_json() {
            cli::output::print_json(&serde_json::json!({
                "error": true,
                "message": format!("{e:#}"),
            }));
        }
        let code = match e.downcast_ref::<stockyard::Error>().map(stockyard::Error::kind) {
            Some(ErrorKind::NotFound) => 2,
            Some(ErrorKind::InvalidOperation) => 3,
            _ => 1,
        };
        std::process::exit(code);
    }

    result
}
