//! Execution plumbing for the edcmd binary.
//!
//! The binary is an embedding host for the core engine: it owns file I/O
//! (which the engine deliberately does not), feeds buffers through the
//! filter runner, and writes the results back out.

mod filter;

use std::path::{Path, PathBuf};

pub use filter::run_filter_mode;

/// Validate and canonicalize file paths to prevent directory traversal and
/// block device files.
pub fn validate_file_path(path: &Path) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let canonical = match path.canonicalize() {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            // File doesn't exist yet - validate the parent directory
            if let Some(parent) = path.parent() {
                let canonical_parent = parent
                    .canonicalize()
                    .map_err(|_| "Invalid parent directory")?;
                if let Some(filename) = path.file_name() {
                    canonical_parent.join(filename)
                } else {
                    return Err("Invalid file path: missing filename".into());
                }
            } else {
                let current_dir =
                    std::env::current_dir().map_err(|_| "Cannot determine current directory")?;
                current_dir.join(path)
            }
        }
        Err(e) => return Err(format!("Invalid path: {}", e).into()),
    };

    // Block special file types that could hang or crash the filter
    #[cfg(unix)]
    {
        use std::os::unix::fs::FileTypeExt;
        if let Ok(metadata) = std::fs::metadata(&canonical) {
            let ft = metadata.file_type();
            if ft.is_char_device() {
                return Err("Cannot open character device files (e.g., /dev/zero)".into());
            }
            if ft.is_block_device() {
                return Err("Cannot open block device files".into());
            }
            if ft.is_fifo() {
                return Err("Cannot open FIFO/named pipe files".into());
            }
            if ft.is_socket() {
                return Err("Cannot open socket files".into());
            }
        }
    }

    // Windows: block named pipes
    #[cfg(windows)]
    {
        let path_str = canonical.to_string_lossy();
        if path_str.starts_with(r"\\.\pipe\") || path_str.starts_with(r"\\?\pipe\") {
            return Err("Cannot open Windows named pipes".into());
        }
    }

    Ok(canonical)
}
