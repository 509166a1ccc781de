//! CLI subcommand implementations for the stockyard binary.

use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::error::{Error, Result};

pub mod cargo_cmd;
pub mod cargo_type_cmd;
pub mod init_cmd;
pub mod output;
pub mod picket_cmd;
pub mod platform_cmd;
pub mod tree_cmd;
pub mod warehouse_cmd;

/// Resolve the database location: `--db` flag, then `STOCKYARD_DB`, then
/// `~/.stockyard/stockyard.db`.
pub fn database_path(flag: Option<&Path>) -> PathBuf {
    if let Some(path) = flag {
        return path.to_path_buf();
    }
    if let Ok(path) = std::env::var("STOCKYARD_DB") {
        return PathBuf::from(path);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("/tmp"))
        .join(".stockyard/stockyard.db")
}

/// Parse a user-supplied instant. Accepts RFC 3339, `YYYY-MM-DD HH:MM[:SS]`
/// (read as UTC) and a bare `YYYY-MM-DD` (midnight UTC).
pub fn parse_at(raw: Option<&str>) -> Result<Option<DateTime<Utc>>> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(Some(dt.with_timezone(&Utc)));
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Ok(Some(naive.and_utc()));
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        if let Some(naive) = date.and_hms_opt(0, 0, 0) {
            return Ok(Some(naive.and_utc()));
        }
    }
    Err(Error::InvalidOperation(format!(
        "cannot parse '{raw}' as a timestamp (try RFC 3339 or YYYY-MM-DD HH:MM)"
    )))
}
