//! App registration credentials and the data-access target
//!
//! The login identity signs users in with delegated permissions; the
//! data-access identity reads files with application permissions. They are
//! separate types so one can never stand in for the other by accident.

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

/// SharePoint library used when the operator does not name one.
pub const DEFAULT_LIBRARY: &str = "Documents";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CredentialError {
    #[error("{0} is required")]
    MissingField(&'static str),
}

/// One app registration: tenant, client id and client secret.
#[derive(Debug)]
pub struct IdentityCredentials {
    directory_id: String,
    application_id: String,
    application_secret: SecretString,
}

impl IdentityCredentials {
    /// All three values must be non-blank; a half-configured identity is rejected.
    pub fn new(
        directory_id: impl Into<String>,
        application_id: impl Into<String>,
        application_secret: impl Into<String>,
    ) -> Result<Self, CredentialError> {
        let directory_id = required("tenant_id", directory_id.into())?;
        let application_id = required("client_id", application_id.into())?;
        let application_secret = required("client_secret", application_secret.into())?;

        Ok(Self {
            directory_id,
            application_id,
            application_secret: SecretString::from(application_secret),
        })
    }

    pub fn directory_id(&self) -> &str {
        &self.directory_id
    }

    pub fn application_id(&self) -> &str {
        &self.application_id
    }

    pub fn application_secret(&self) -> &SecretString {
        &self.application_secret
    }

    fn duplicate(&self) -> Self {
        Self {
            directory_id: self.directory_id.clone(),
            application_id: self.application_id.clone(),
            application_secret: SecretString::from(
                self.application_secret.expose_secret().to_owned(),
            ),
        }
    }
}

fn required(field: &'static str, value: String) -> Result<String, CredentialError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CredentialError::MissingField(field));
    }
    Ok(trimmed.to_string())
}

/// App registration used for the delegated sign-in flow.
#[derive(Debug)]
pub struct LoginIdentity(IdentityCredentials);

impl LoginIdentity {
    pub fn new(credentials: IdentityCredentials) -> Self {
        Self(credentials)
    }

    pub fn credentials(&self) -> &IdentityCredentials {
        &self.0
    }
}

/// App registration used with application permissions to reach files.
#[derive(Debug)]
pub struct DataAccessIdentity(IdentityCredentials);

impl DataAccessIdentity {
    pub fn new(credentials: IdentityCredentials) -> Self {
        Self(credentials)
    }

    /// Copy the login registration's values into an independent data-access
    /// identity. The registration still needs application permissions granted.
    pub fn copied_from(login: &LoginIdentity) -> Self {
        Self(login.credentials().duplicate())
    }

    pub fn credentials(&self) -> &IdentityCredentials {
        &self.0
    }
}

/// Where the file-access connector looks for files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataAccessTarget {
    /// A user's OneDrive.
    OneDrive {
        user_principal_name: String,
        file_path: Option<String>,
    },
    /// A document library on a SharePoint site.
    SharePoint {
        hostname: String,
        site_path: String,
        library_name: String,
        file_path: Option<String>,
    },
}

impl DataAccessTarget {
    pub fn mode_name(&self) -> &'static str {
        match self {
            Self::OneDrive { .. } => "OneDrive",
            Self::SharePoint { .. } => "SharePoint",
        }
    }

    pub fn file_path(&self) -> Option<&str> {
        match self {
            Self::OneDrive { file_path, .. } | Self::SharePoint { file_path, .. } => {
                file_path.as_deref()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_any_blank_field() {
        assert_eq!(
            IdentityCredentials::new("", "client", "secret").unwrap_err(),
            CredentialError::MissingField("tenant_id")
        );
        assert_eq!(
            IdentityCredentials::new("tenant", "  ", "secret").unwrap_err(),
            CredentialError::MissingField("client_id")
        );
        assert_eq!(
            IdentityCredentials::new("tenant", "client", "\t").unwrap_err(),
            CredentialError::MissingField("client_secret")
        );
    }

    #[test]
    fn test_trims_values() {
        let creds = IdentityCredentials::new(" tenant ", "client\n", " secret").unwrap();
        assert_eq!(creds.directory_id(), "tenant");
        assert_eq!(creds.application_id(), "client");
        assert_eq!(creds.application_secret().expose_secret(), "secret");
    }

    #[test]
    fn test_debug_redacts_secret() {
        let creds = IdentityCredentials::new("tenant", "client", "hunter2-value").unwrap();
        let login = LoginIdentity::new(creds);
        let debug = format!("{:?}", login);
        assert!(debug.contains("tenant"));
        assert!(!debug.contains("hunter2-value"));
    }

    #[test]
    fn test_copied_identity_is_independent_value() {
        let login =
            LoginIdentity::new(IdentityCredentials::new("tenant", "client", "secret").unwrap());
        let data = DataAccessIdentity::copied_from(&login);

        assert_eq!(data.credentials().directory_id(), "tenant");
        assert_eq!(data.credentials().application_id(), "client");
        assert_eq!(
            data.credentials().application_secret().expose_secret(),
            "secret"
        );
        assert!(!std::ptr::eq(data.credentials(), login.credentials()));
    }

    #[test]
    fn test_target_accessors() {
        let target = DataAccessTarget::SharePoint {
            hostname: "contoso.sharepoint.com".into(),
            site_path: "/sites/Finance".into(),
            library_name: DEFAULT_LIBRARY.into(),
            file_path: Some("reports/q1.xlsx".into()),
        };
        assert_eq!(target.mode_name(), "SharePoint");
        assert_eq!(target.file_path(), Some("reports/q1.xlsx"));
    }
}
