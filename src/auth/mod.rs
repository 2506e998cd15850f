//! OAuth2 client descriptions for the secrets file's consumers
//!
//! The login flow signs users in with the `[login]` registration (delegated,
//! authorization code). The file connector calls Graph with the
//! `[data_access]` registration (application permissions, client
//! credentials). Nothing here talks to the network.

pub mod oauth;

pub use oauth::{data_access_client, print_authorize_url, token_endpoint};

use secrecy::ExposeSecret;

use crate::config::{DataAccessSection, LoginSection};

/// Scope for app-only Graph calls; the granted application permissions apply.
pub const GRAPH_DEFAULT_SCOPE: &str = "https://graph.microsoft.com/.default";

/// Which registered redirect URI a sign-in should return to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectTarget {
    Local,
    Production,
}

/// Entra ID client configuration for one app registration
pub struct AuthConfig<'a> {
    /// Application (client) ID
    pub client_id: &'a str,
    /// Client secret value
    pub client_secret: &'a str,
    /// Redirect URI; none for the client-credentials flow
    pub redirect_uri: Option<&'a str>,
    /// Directory (tenant) ID
    pub tenant: &'a str,
    /// Scope requested from the token endpoint
    pub scope: &'a str,
}

impl<'a> AuthConfig<'a> {
    /// Config for the delegated sign-in flow.
    pub fn login(section: &'a LoginSection, target: RedirectTarget) -> Self {
        let credentials = section.identity().credentials();
        let uris = section.redirect_uris();
        Self {
            client_id: credentials.application_id(),
            client_secret: credentials.application_secret().expose_secret(),
            redirect_uri: Some(match target {
                RedirectTarget::Local => uris.local(),
                RedirectTarget::Production => uris.production(),
            }),
            tenant: credentials.directory_id(),
            scope: section.scope(),
        }
    }

    /// Config for app-only Graph access.
    pub fn data_access(section: &'a DataAccessSection) -> Self {
        let credentials = section.identity().credentials();
        Self {
            client_id: credentials.application_id(),
            client_secret: credentials.application_secret().expose_secret(),
            redirect_uri: None,
            tenant: credentials.directory_id(),
            scope: GRAPH_DEFAULT_SCOPE,
        }
    }
}
