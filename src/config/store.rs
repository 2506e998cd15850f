//! Writing the secrets file and keeping it out of git

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to create directory {}", path.display())]
    CreateDir { path: PathBuf, source: io::Error },
    #[error("failed to write {}", path.display())]
    Write { path: PathBuf, source: io::Error },
    #[error("failed to read {}", path.display())]
    Read { path: PathBuf, source: io::Error },
}

/// What `ensure_ignored` did to the ignore file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreUpdate {
    Created,
    Appended,
    AlreadyPresent,
}

/// Replace `path` with `contents` in one step.
///
/// The bytes go to a temporary file next to the target which is then renamed
/// over it, so a failure leaves either the old file or no file.
pub fn write_secrets(path: &Path, contents: &[u8]) -> Result<(), StoreError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(|source| StoreError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })?;

    let write_err = |source| StoreError::Write {
        path: path.to_path_buf(),
        source,
    };

    let mut tmp = NamedTempFile::new_in(dir).map_err(write_err)?;
    tmp.write_all(contents).map_err(write_err)?;
    tmp.as_file().sync_all().map_err(write_err)?;

    // Contains client secrets
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(tmp.path(), fs::Permissions::from_mode(0o600)).map_err(write_err)?;
    }

    tmp.persist(path).map_err(|e| write_err(e.error))?;
    tracing::info!("Wrote {} ({} bytes)", path.display(), contents.len());
    Ok(())
}

/// Whether `ignore_file` already lists `entry` on a line of its own.
pub fn is_ignored(ignore_file: &Path, entry: &str) -> Result<bool, StoreError> {
    Ok(read_ignore_file(ignore_file)?.map_or(false, |content| lists_entry(&content, entry)))
}

/// Add `entry` to `ignore_file` unless it is already listed.
///
/// Existing bytes are never rewritten, only appended to, so ignore files
/// in a legacy encoding survive untouched.
pub fn ensure_ignored(ignore_file: &Path, entry: &str) -> Result<IgnoreUpdate, StoreError> {
    let existing = read_ignore_file(ignore_file)?;

    let write_err = |source| StoreError::Write {
        path: ignore_file.to_path_buf(),
        source,
    };

    match existing {
        Some(content) if lists_entry(&content, entry) => {
            tracing::debug!("{} already ignores {}", ignore_file.display(), entry);
            Ok(IgnoreUpdate::AlreadyPresent)
        }
        Some(_) => {
            let mut file = fs::OpenOptions::new()
                .append(true)
                .open(ignore_file)
                .map_err(write_err)?;
            file.write_all(format!("\n# Streamlit secrets\n{}\n", entry).as_bytes())
                .map_err(write_err)?;
            tracing::info!("Added {} to {}", entry, ignore_file.display());
            Ok(IgnoreUpdate::Appended)
        }
        None => {
            fs::write(ignore_file, format!("# Streamlit secrets\n{}\n", entry))
                .map_err(write_err)?;
            tracing::info!("Created {} with {}", ignore_file.display(), entry);
            Ok(IgnoreUpdate::Created)
        }
    }
}

/// Raw ignore-file content, or `None` when the file does not exist yet.
///
/// Git does not require UTF-8 here, so invalid sequences are replaced for
/// matching only.
fn read_ignore_file(ignore_file: &Path) -> Result<Option<String>, StoreError> {
    match fs::read(ignore_file) {
        Ok(bytes) => Ok(Some(String::from_utf8_lossy(&bytes).into_owned())),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(StoreError::Read {
            path: ignore_file.to_path_buf(),
            source,
        }),
    }
}

fn lists_entry(content: &str, entry: &str) -> bool {
    let entry = entry.trim_start_matches('/');
    content
        .lines()
        .map(str::trim)
        .any(|line| line.trim_start_matches('/') == entry)
}
