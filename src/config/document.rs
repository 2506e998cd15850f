//! The secrets document (`.streamlit/secrets.toml`)
//!
//! Rendered by hand rather than through `toml::to_string` so each section can
//! carry a comment stating the permission level it needs; values still go
//! through the `toml` encoder for quoting and escaping.

use secrecy::ExposeSecret;
use serde::Deserialize;
use thiserror::Error;

use super::credentials::{
    CredentialError, DataAccessIdentity, DataAccessTarget, IdentityCredentials, LoginIdentity,
    DEFAULT_LIBRARY,
};
use super::redirect::{self, RedirectError, RedirectUris, LOCAL_REDIRECT_URI};

/// Delegated scope requested at sign-in.
pub const LOGIN_SCOPE: &str = "https://graph.microsoft.com/User.Read";

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("secrets file is not valid TOML")]
    Syntax(#[from] toml::de::Error),
    #[error("missing [login] section")]
    MissingLogin,
    #[error("[{section}] {source}")]
    Credentials {
        section: &'static str,
        source: CredentialError,
    },
    #[error("[login] redirect_uri_local must be {expected}, found {found}")]
    LocalRedirect { expected: &'static str, found: String },
    #[error("[login] redirect_uri_prod {found} is not canonical (expected {expected})")]
    ProductionRedirect { expected: String, found: String },
    #[error("[login] redirect_uri_prod is invalid")]
    Redirect(#[from] RedirectError),
    #[error("[login] scope must include {}", LOGIN_SCOPE)]
    MissingScope,
    #[error("[data_access] {0}")]
    Target(String),
}

/// The `[login]` section.
#[derive(Debug)]
pub struct LoginSection {
    identity: LoginIdentity,
    redirect_uris: RedirectUris,
}

impl LoginSection {
    pub fn new(identity: LoginIdentity, redirect_uris: RedirectUris) -> Self {
        Self {
            identity,
            redirect_uris,
        }
    }

    pub fn identity(&self) -> &LoginIdentity {
        &self.identity
    }

    pub fn redirect_uris(&self) -> &RedirectUris {
        &self.redirect_uris
    }

    pub fn scope(&self) -> &'static str {
        LOGIN_SCOPE
    }
}

/// The `[data_access]` section.
#[derive(Debug)]
pub struct DataAccessSection {
    identity: DataAccessIdentity,
    target: DataAccessTarget,
}

impl DataAccessSection {
    pub fn new(identity: DataAccessIdentity, target: DataAccessTarget) -> Self {
        Self { identity, target }
    }

    pub fn identity(&self) -> &DataAccessIdentity {
        &self.identity
    }

    pub fn target(&self) -> &DataAccessTarget {
        &self.target
    }
}

/// Everything the wizard writes in one run.
#[derive(Debug)]
pub struct SecretsDocument {
    pub login: LoginSection,
    pub data_access: Option<DataAccessSection>,
}

impl SecretsDocument {
    pub fn new(login: LoginSection, data_access: Option<DataAccessSection>) -> Self {
        Self { login, data_access }
    }

    /// Render the document. `[data_access]` comes first when present.
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str("# Azure AD configuration - generated by configure-azure\n");
        out.push_str("# WARNING: never commit this file to version control!\n");

        if let Some(data_access) = &self.data_access {
            out.push_str("\n[data_access]\n");
            out.push_str(
                "# Application permissions (Files.Read.All / Sites.Read.All), admin consent required\n",
            );
            push_identity(&mut out, data_access.identity.credentials());
            match &data_access.target {
                DataAccessTarget::OneDrive {
                    user_principal_name,
                    file_path,
                } => {
                    out.push_str("\n# OneDrive mode\n");
                    push_pair(&mut out, "user_upn", user_principal_name);
                    push_optional(&mut out, "file_path", file_path.as_deref());
                }
                DataAccessTarget::SharePoint {
                    hostname,
                    site_path,
                    library_name,
                    file_path,
                } => {
                    out.push_str("\n# SharePoint mode\n");
                    push_pair(&mut out, "hostname", hostname);
                    push_pair(&mut out, "site_path", site_path);
                    push_pair(&mut out, "library_name", library_name);
                    push_optional(&mut out, "file_path", file_path.as_deref());
                }
            }
        }

        out.push_str("\n[login]\n");
        out.push_str("# Delegated permission (User.Read), acts on behalf of the signed-in user\n");
        push_identity(&mut out, self.login.identity.credentials());
        out.push_str("\n# Redirect URIs (must be registered on the app registration)\n");
        push_pair(&mut out, "redirect_uri_local", self.login.redirect_uris.local());
        push_pair(&mut out, "redirect_uri_prod", self.login.redirect_uris.production());
        out.push_str("\n# Microsoft Graph scope\n");
        out.push_str(&format!("scope = [{}]\n", quote(LOGIN_SCOPE)));

        out
    }

    /// Parse and validate an existing secrets document.
    pub fn parse(text: &str) -> Result<Self, DocumentError> {
        let raw: RawDocument = toml::from_str(text)?;
        let login = raw.login.ok_or(DocumentError::MissingLogin)?;

        let identity = identity_from_raw(
            "login",
            login.tenant_id,
            login.client_id,
            login.client_secret,
        )?;

        let local = login.redirect_uri_local.unwrap_or_default();
        if local != LOCAL_REDIRECT_URI {
            return Err(DocumentError::LocalRedirect {
                expected: LOCAL_REDIRECT_URI,
                found: local,
            });
        }
        let production = login.redirect_uri_prod.unwrap_or_default();
        let redirect_uris = redirect::derive(&production)?;
        if redirect_uris.production() != production {
            return Err(DocumentError::ProductionRedirect {
                expected: redirect_uris.production().to_string(),
                found: production,
            });
        }
        if !login.scope.iter().any(|s| s == LOGIN_SCOPE) {
            return Err(DocumentError::MissingScope);
        }

        let data_access = raw.data_access.map(data_access_from_raw).transpose()?;

        Ok(Self {
            login: LoginSection::new(LoginIdentity::new(identity), redirect_uris),
            data_access,
        })
    }
}

fn push_identity(out: &mut String, credentials: &IdentityCredentials) {
    push_pair(out, "tenant_id", credentials.directory_id());
    push_pair(out, "client_id", credentials.application_id());
    push_pair(
        out,
        "client_secret",
        credentials.application_secret().expose_secret(),
    );
}

fn push_pair(out: &mut String, key: &str, value: &str) {
    out.push_str(key);
    out.push_str(" = ");
    out.push_str(&quote(value));
    out.push('\n');
}

fn push_optional(out: &mut String, key: &str, value: Option<&str>) {
    if let Some(value) = value {
        push_pair(out, key, value);
    }
}

fn quote(value: &str) -> String {
    toml::Value::String(value.to_string()).to_string()
}

#[derive(Deserialize)]
struct RawDocument {
    login: Option<RawLogin>,
    data_access: Option<RawDataAccess>,
}

#[derive(Deserialize)]
struct RawLogin {
    tenant_id: Option<String>,
    client_id: Option<String>,
    client_secret: Option<String>,
    redirect_uri_local: Option<String>,
    redirect_uri_prod: Option<String>,
    #[serde(default)]
    scope: Vec<String>,
}

#[derive(Deserialize)]
struct RawDataAccess {
    tenant_id: Option<String>,
    client_id: Option<String>,
    client_secret: Option<String>,
    user_upn: Option<String>,
    hostname: Option<String>,
    site_path: Option<String>,
    library_name: Option<String>,
    file_path: Option<String>,
}

fn identity_from_raw(
    section: &'static str,
    tenant_id: Option<String>,
    client_id: Option<String>,
    client_secret: Option<String>,
) -> Result<IdentityCredentials, DocumentError> {
    IdentityCredentials::new(
        tenant_id.unwrap_or_default(),
        client_id.unwrap_or_default(),
        client_secret.unwrap_or_default(),
    )
    .map_err(|source| DocumentError::Credentials { section, source })
}

fn data_access_from_raw(raw: RawDataAccess) -> Result<DataAccessSection, DocumentError> {
    let identity =
        identity_from_raw("data_access", raw.tenant_id, raw.client_id, raw.client_secret)?;
    let file_path = raw.file_path.filter(|p| !p.trim().is_empty());

    let target = match (raw.user_upn, raw.hostname) {
        (Some(_), Some(_)) => {
            return Err(DocumentError::Target(
                "user_upn and hostname are mutually exclusive".into(),
            ))
        }
        (Some(upn), None) => {
            if raw.site_path.is_some() || raw.library_name.is_some() {
                return Err(DocumentError::Target(
                    "site_path/library_name are only valid with hostname".into(),
                ));
            }
            DataAccessTarget::OneDrive {
                user_principal_name: upn,
                file_path,
            }
        }
        (None, Some(hostname)) => DataAccessTarget::SharePoint {
            hostname,
            site_path: raw
                .site_path
                .ok_or_else(|| DocumentError::Target("site_path is required".into()))?,
            library_name: raw
                .library_name
                .unwrap_or_else(|| DEFAULT_LIBRARY.to_string()),
            file_path,
        },
        (None, None) => {
            return Err(DocumentError::Target(
                "either user_upn or hostname is required".into(),
            ))
        }
    };

    Ok(DataAccessSection::new(DataAccessIdentity::new(identity), target))
}
