//! Entra ID endpoints and `oauth2` client construction

use anyhow::{Context, Result};
use oauth2::{
    basic::BasicClient, url::Url, AuthUrl, ClientId, ClientSecret, CsrfToken, RedirectUrl, Scope,
    TokenUrl,
};

use super::{AuthConfig, RedirectTarget};
use crate::config::{DataAccessSection, LoginSection, ProjectPaths};

const AUTHORITY: &str = "https://login.microsoftonline.com";

pub fn authorize_endpoint(tenant: &str) -> String {
    format!("{}/{}/oauth2/v2.0/authorize", AUTHORITY, tenant)
}

pub fn token_endpoint(tenant: &str) -> String {
    format!("{}/{}/oauth2/v2.0/token", AUTHORITY, tenant)
}

/// Build the OAuth2 client from an AuthConfig
fn build_client(auth_config: &AuthConfig) -> Result<BasicClient> {
    let auth_url = AuthUrl::new(authorize_endpoint(auth_config.tenant))
        .context("Invalid authorize endpoint")?;
    let token_url =
        TokenUrl::new(token_endpoint(auth_config.tenant)).context("Invalid token endpoint")?;

    let client = BasicClient::new(
        ClientId::new(auth_config.client_id.to_string()),
        Some(ClientSecret::new(auth_config.client_secret.to_string())),
        auth_url,
        Some(token_url),
    );

    match auth_config.redirect_uri {
        Some(uri) => {
            let redirect = RedirectUrl::new(uri.to_string()).context("Invalid redirect URI")?;
            Ok(client.set_redirect_uri(redirect))
        }
        None => Ok(client),
    }
}

/// Client for the delegated authorization-code flow of `[login]`.
pub fn login_client(section: &LoginSection, target: RedirectTarget) -> Result<BasicClient> {
    build_client(&AuthConfig::login(section, target))
}

/// Client for the client-credentials flow of `[data_access]`.
pub fn data_access_client(section: &DataAccessSection) -> Result<BasicClient> {
    build_client(&AuthConfig::data_access(section))
}

/// Sign-in URL the login flow sends users to.
pub fn authorize_url(
    section: &LoginSection,
    target: RedirectTarget,
    state: CsrfToken,
) -> Result<Url> {
    let client = login_client(section, target)?;
    let (url, _state) = client
        .authorize_url(|| state)
        .add_scope(Scope::new(section.scope().to_string()))
        .url();
    Ok(url)
}

/// Print the sign-in URL for the configured login registration.
pub fn print_authorize_url(paths: &ProjectPaths, target: RedirectTarget) -> Result<()> {
    let document = paths.load_secrets()?;
    let url = authorize_url(&document.login, target, CsrfToken::new_random())?;
    tracing::debug!("Built authorize URL for {:?} redirect", target);

    println!();
    println!("Open this URL to test the sign-in:");
    println!();
    println!("{}", url);
    println!();
    println!("If Entra ID answers with AADSTS50011, the redirect URI is not registered.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{
        derive, DataAccessIdentity, DataAccessTarget, IdentityCredentials, LoginIdentity,
    };

    fn login() -> LoginSection {
        LoginSection::new(
            LoginIdentity::new(
                IdentityCredentials::new("tenant-1", "client-1", "secret-1").unwrap(),
            ),
            derive("meu-app").unwrap(),
        )
    }

    fn query(url: &Url, key: &str) -> Option<String> {
        url.query_pairs()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.into_owned())
    }

    #[test]
    fn test_authorize_url_local() {
        let url = authorize_url(
            &login(),
            RedirectTarget::Local,
            CsrfToken::new("fixed-state".to_string()),
        )
        .unwrap();

        assert_eq!(url.host_str(), Some("login.microsoftonline.com"));
        assert_eq!(url.path(), "/tenant-1/oauth2/v2.0/authorize");
        assert_eq!(query(&url, "client_id").as_deref(), Some("client-1"));
        assert_eq!(query(&url, "response_type").as_deref(), Some("code"));
        assert_eq!(
            query(&url, "redirect_uri").as_deref(),
            Some("http://localhost:8501")
        );
        assert_eq!(
            query(&url, "scope").as_deref(),
            Some("https://graph.microsoft.com/User.Read")
        );
        assert_eq!(query(&url, "state").as_deref(), Some("fixed-state"));
    }

    #[test]
    fn test_authorize_url_never_carries_secret() {
        let url = authorize_url(
            &login(),
            RedirectTarget::Production,
            CsrfToken::new("s".to_string()),
        )
        .unwrap();

        assert_eq!(
            query(&url, "redirect_uri").as_deref(),
            Some("https://meu-app.streamlit.app")
        );
        assert!(!url.as_str().contains("secret-1"));
    }

    #[test]
    fn test_data_access_config_uses_its_own_registration() {
        let section = DataAccessSection::new(
            DataAccessIdentity::new(
                IdentityCredentials::new("tenant-2", "client-2", "secret-2").unwrap(),
            ),
            DataAccessTarget::OneDrive {
                user_principal_name: "ana@contoso.com".into(),
                file_path: None,
            },
        );

        let config = AuthConfig::data_access(&section);
        assert_eq!(config.client_id, "client-2");
        assert_eq!(config.tenant, "tenant-2");
        assert_eq!(config.redirect_uri, None);
        assert_eq!(config.scope, crate::auth::GRAPH_DEFAULT_SCOPE);
        assert!(data_access_client(&section).is_ok());
    }

    #[test]
    fn test_endpoints() {
        assert_eq!(
            token_endpoint("contoso.onmicrosoft.com"),
            "https://login.microsoftonline.com/contoso.onmicrosoft.com/oauth2/v2.0/token"
        );
        assert_eq!(
            authorize_endpoint("t"),
            "https://login.microsoftonline.com/t/oauth2/v2.0/authorize"
        );
    }
}
