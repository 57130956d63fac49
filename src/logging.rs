//! File + stdout logging with size-bounded truncation — spec.md §4.I.

use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

pub fn log_file_path(data_dir: &Path) -> PathBuf {
    data_dir.join("checker.log")
}

/// If `path` exceeds `max_size_bytes`, keep the last half (rounded forward
/// to the next line boundary so the marker doesn't land mid-line) and
/// prepend a truncation marker. A no-op if the file doesn't exist yet or
/// is within budget.
pub fn truncate_if_oversized(path: &Path, max_size_bytes: u64) -> io::Result<()> {
    let metadata = match std::fs::metadata(path) {
        Ok(m) => m,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(e),
    };
    if metadata.len() <= max_size_bytes {
        return Ok(());
    }

    let contents = std::fs::read(path)?;
    let half = contents.len() / 2;
    let keep_from = contents[half..]
        .iter()
        .position(|&b| b == b'\n')
        .map(|i| half + i + 1)
        .unwrap_or(half);

    let marker = format!(
        "--- log truncated: {} bytes discarded, exceeded {max_size_bytes}-byte ceiling ---\n",
        keep_from
    );
    let mut kept = marker.into_bytes();
    kept.extend_from_slice(&contents[keep_from..]);
    std::fs::write(path, kept)
}

/// Initialize stdout + file tracing output. Must be called once, before
/// any other module logs. The file layer appends to `checker.log` under
/// `data_dir`, which is pre-truncated if it has exceeded `max_log_size_bytes`.
pub fn init(data_dir: &Path, max_log_size_bytes: u64) -> io::Result<()> {
    let log_path = log_file_path(data_dir);
    truncate_if_oversized(&log_path, max_log_size_bytes)?;

    let file = OpenOptions::new().create(true).append(true).open(&log_path)?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .with(
            fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .init();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn leaves_small_file_untouched() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("checker.log");
        std::fs::write(&path, b"short\n").unwrap();

        truncate_if_oversized(&path, 1_000_000).unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), b"short\n");
    }

    #[test]
    fn keeps_last_half_and_prepends_marker_when_oversized() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("checker.log");
        let lines: String = (0..1000).map(|i| format!("line {i}\n")).collect();
        std::fs::write(&path, &lines).unwrap();

        truncate_if_oversized(&path, 100).unwrap();

        let result = String::from_utf8(std::fs::read(&path).unwrap()).unwrap();
        assert!(result.starts_with("--- log truncated"));
        assert!(result.len() < lines.len());
        assert!(result.contains("line 999\n"));
        assert!(!result.contains("line 0\n"));
    }

    #[test]
    fn missing_file_is_a_no_op() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("checker.log");

        truncate_if_oversized(&path, 100).unwrap();

        assert!(!path.exists());
    }
}
