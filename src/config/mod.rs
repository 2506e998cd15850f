//! Credential configuration model and its on-disk form

pub mod check;
pub mod credentials;
pub mod document;
pub mod redirect;
pub mod store;

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

pub use check::check;
pub use credentials::{
    DataAccessIdentity, DataAccessTarget, IdentityCredentials, LoginIdentity, DEFAULT_LIBRARY,
};
pub use document::{DataAccessSection, LoginSection, SecretsDocument};
pub use redirect::{derive, RedirectUris};

/// Secrets file location relative to the project root, as Streamlit expects it.
pub const SECRETS_RELATIVE_PATH: &str = ".streamlit/secrets.toml";

const IGNORE_FILE: &str = ".gitignore";

/// Files the wizard touches inside one project directory.
#[derive(Debug, Clone)]
pub struct ProjectPaths {
    root: PathBuf,
}

impl ProjectPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn secrets_file(&self) -> PathBuf {
        self.root.join(SECRETS_RELATIVE_PATH)
    }

    pub fn ignore_file(&self) -> PathBuf {
        self.root.join(IGNORE_FILE)
    }

    /// Entry to add to the ignore file, relative to the project root.
    pub fn ignore_entry(&self) -> &'static str {
        SECRETS_RELATIVE_PATH
    }

    /// Load and validate the secrets file.
    pub fn load_secrets(&self) -> Result<SecretsDocument> {
        let path = self.secrets_file();
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        SecretsDocument::parse(&content)
            .with_context(|| format!("Invalid secrets file {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_are_rooted() {
        let paths = ProjectPaths::new("/srv/app");
        assert_eq!(
            paths.secrets_file(),
            PathBuf::from("/srv/app/.streamlit/secrets.toml")
        );
        assert_eq!(paths.ignore_file(), PathBuf::from("/srv/app/.gitignore"));
        assert_eq!(paths.ignore_entry(), ".streamlit/secrets.toml");
    }

    #[test]
    fn test_load_missing_file_names_path() {
        let dir = tempfile::tempdir().unwrap();
        let err = ProjectPaths::new(dir.path()).load_secrets().unwrap_err();
        assert!(format!("{:#}", err).contains("secrets.toml"));
    }
}
