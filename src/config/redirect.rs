//! Redirect URI derivation
//!
//! Entra ID rejects a sign-in whose redirect URI is not registered verbatim,
//! and the error it shows says nothing about which URI it expected. Both
//! URIs therefore come from one place and are always produced as a pair.

use thiserror::Error;
use url::Url;

/// Streamlit's local development server.
pub const LOCAL_REDIRECT_URI: &str = "http://localhost:8501";

/// Suffix of every app hosted on Streamlit Community Cloud.
pub const HOSTING_SUFFIX: &str = ".streamlit.app";

const SCHEMES: [&str; 2] = ["https://", "http://"];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RedirectError {
    #[error("application name is empty")]
    EmptyAppName,
    #[error("'{0}' is not a valid application name (expected something like my-app)")]
    InvalidAppName(String),
}

/// The URIs that must be registered on the app registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectUris {
    app_name: String,
    local: String,
    production: String,
}

impl RedirectUris {
    /// Normalized application name the production URI was built from.
    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    pub fn local(&self) -> &str {
        &self.local
    }

    pub fn production(&self) -> &str {
        &self.production
    }
}

/// Strip what operators tend to paste along with the app name: a scheme,
/// slashes, and the hosting suffix. Applied until nothing changes.
pub fn normalize_app_name(raw: &str) -> String {
    let mut name = raw.trim();
    loop {
        let before = name;
        for scheme in SCHEMES {
            if name
                .get(..scheme.len())
                .is_some_and(|prefix| prefix.eq_ignore_ascii_case(scheme))
            {
                name = &name[scheme.len()..];
            }
        }
        name = name.trim_matches('/');
        let split = name.len().saturating_sub(HOSTING_SUFFIX.len());
        if name
            .get(split..)
            .is_some_and(|suffix| suffix.eq_ignore_ascii_case(HOSTING_SUFFIX))
        {
            name = &name[..split];
        }
        name = name.trim();
        if name == before {
            return name.to_string();
        }
    }
}

/// Derive the local and production redirect URIs for an application name.
pub fn derive(name: &str) -> Result<RedirectUris, RedirectError> {
    let app_name = normalize_app_name(name);
    if app_name.is_empty() {
        return Err(RedirectError::EmptyAppName);
    }

    let production = format!("https://{}{}", app_name, HOSTING_SUFFIX);
    let expected_host = format!("{}{}", app_name, HOSTING_SUFFIX);
    let valid = Url::parse(&production)
        .ok()
        .and_then(|url| url.host_str().map(|h| h.eq_ignore_ascii_case(&expected_host)))
        .unwrap_or(false);
    if !valid {
        return Err(RedirectError::InvalidAppName(app_name));
    }

    Ok(RedirectUris {
        app_name,
        local: LOCAL_REDIRECT_URI.to_string(),
        production,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_plain_name() {
        let uris = derive("meu-app").unwrap();
        assert_eq!(uris.local(), "http://localhost:8501");
        assert_eq!(uris.production(), "https://meu-app.streamlit.app");
        assert_eq!(uris.app_name(), "meu-app");
    }

    #[test]
    fn test_derive_strips_pasted_url() {
        let pasted = derive("https://meu-app.streamlit.app/").unwrap();
        assert_eq!(pasted, derive("meu-app").unwrap());

        let http = derive("  http://meu-app.streamlit.app  ").unwrap();
        assert_eq!(http, derive("meu-app").unwrap());

        let suffix_only = derive("meu-app.streamlit.app").unwrap();
        assert_eq!(suffix_only.production(), "https://meu-app.streamlit.app");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let inputs = [
            "meu-app",
            "https://meu-app.streamlit.app/",
            "HTTPS://Meu-App.STREAMLIT.APP//",
            "https://https://meu-app.streamlit.app.streamlit.app/",
            "/meu-app/",
        ];
        for input in inputs {
            let once = normalize_app_name(input);
            assert_eq!(normalize_app_name(&once), once, "input: {input}");
        }
    }

    #[test]
    fn test_derive_from_own_production_uri() {
        let first = derive("https://meu-app.streamlit.app/").unwrap();
        let again = derive(first.production()).unwrap();
        assert_eq!(first, again);
    }

    #[test]
    fn test_derive_rejects_empty() {
        assert_eq!(derive(""), Err(RedirectError::EmptyAppName));
        assert_eq!(derive("   "), Err(RedirectError::EmptyAppName));
        assert_eq!(
            derive("https://.streamlit.app/"),
            Err(RedirectError::EmptyAppName)
        );
    }

    #[test]
    fn test_derive_rejects_non_host_names() {
        assert!(matches!(
            derive("my app"),
            Err(RedirectError::InvalidAppName(_))
        ));
        assert!(matches!(
            derive("my/app"),
            Err(RedirectError::InvalidAppName(_))
        ));
        assert!(matches!(
            derive("user@app"),
            Err(RedirectError::InvalidAppName(_))
        ));
    }
}
