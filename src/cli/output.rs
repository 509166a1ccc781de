//! Output mode helpers shared by every subcommand. The binary exports the
//! global flags as environment variables so nested code can check them
//! without threading a config value through.

pub fn is_json() -> bool {
    std::env::var("STOCKYARD_JSON").is_ok()
}

pub fn is_quiet() -> bool {
    std::env::var("STOCKYARD_QUIET").is_ok()
}

pub fn print_json(value: &serde_json::Value) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{text}"),
        Err(e) => eprintln!("failed to render JSON output: {e}"),
    }
}
