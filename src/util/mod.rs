//! Shared utilities: logging, ids, rounding, bounds.

use crate::error::{Error, Result};
use std::path::Path;
use tracing::Level;

/// Initialize tracing with env filter. Safe to call once at startup.
pub fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| level.to_string());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Normalize vehicle ID or name for lookup (lowercase, trim).
pub fn normalize_id(s: &str) -> String {
    s.trim().to_lowercase()
}

/// Round half away from zero to `decimals` places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}

/// `Some(value)` only for finite numbers; NaN and infinities become absent.
pub fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

/// Check file is within a size limit. Returns its size.
pub fn check_file_bounds(path: &Path, max_bytes: usize) -> Result<u64> {
    let size = std::fs::metadata(path)?.len();
    if size > max_bytes as u64 {
        return Err(Error::Layout(format!(
            "{}: file too large: {} bytes (max {})",
            path.display(),
            size,
            max_bytes
        )));
    }
    Ok(size)
}
