//! `check` command: validate and summarize an existing secrets file

use anyhow::{Context, Result};

use super::credentials::{DataAccessTarget, IdentityCredentials};
use super::store;
use super::{ProjectPaths, SecretsDocument};
use crate::auth;

/// Load the secrets file, print a summary with secrets masked, and report
/// whether git ignores it.
pub fn check(paths: &ProjectPaths) -> Result<()> {
    let document = paths.load_secrets()?;
    let ignored = store::is_ignored(&paths.ignore_file(), paths.ignore_entry())?;

    print!("{}", summary(paths, &document, ignored)?);
    Ok(())
}

fn summary(paths: &ProjectPaths, document: &SecretsDocument, ignored: bool) -> Result<String> {
    let mut out = String::new();
    let login = &document.login;

    out.push_str(&format!(
        "Secrets file: {}\n\n",
        paths.secrets_file().display()
    ));
    out.push_str(&format!("[login]  delegated scope {}\n", login.scope()));
    push_identity(&mut out, login.identity().credentials());
    out.push_str(&format!(
        "  app name:      {}\n  redirect URIs: {}\n                 {}\n",
        login.redirect_uris().app_name(),
        login.redirect_uris().local(),
        login.redirect_uris().production(),
    ));

    match &document.data_access {
        None => out.push_str("\n[data_access]  not configured\n"),
        Some(section) => {
            let credentials = section.identity().credentials();
            auth::data_access_client(section).context("Invalid [data_access] registration")?;

            out.push_str(&format!(
                "\n[data_access]  application permissions, {} mode\n",
                section.target().mode_name()
            ));
            push_identity(&mut out, credentials);
            match section.target() {
                DataAccessTarget::OneDrive {
                    user_principal_name,
                    ..
                } => out.push_str(&format!("  user_upn:      {}\n", user_principal_name)),
                DataAccessTarget::SharePoint {
                    hostname,
                    site_path,
                    library_name,
                    ..
                } => out.push_str(&format!(
                    "  site:          {}{}\n  library:       {}\n",
                    hostname, site_path, library_name
                )),
            }
            if let Some(path) = section.target().file_path() {
                out.push_str(&format!("  file_path:     {}\n", path));
            }
            out.push_str(&format!(
                "  token URL:     {}\n  scope:         {}\n",
                auth::token_endpoint(credentials.directory_id()),
                auth::GRAPH_DEFAULT_SCOPE
            ));

            if credentials.application_id() == login.identity().credentials().application_id() {
                out.push_str(
                    "  note: same app registration as [login]; it must also hold the \
                     application permissions, with admin consent\n",
                );
            }
        }
    }

    if ignored {
        out.push_str(&format!(
            "\nGit: {} is listed in {}\n",
            paths.ignore_entry(),
            paths.ignore_file().display()
        ));
    } else {
        out.push_str(&format!(
            "\nWARNING: {} is not listed in {}; it could be committed.\n",
            paths.ignore_entry(),
            paths.ignore_file().display()
        ));
    }

    Ok(out)
}

fn push_identity(out: &mut String, credentials: &IdentityCredentials) {
    out.push_str(&format!(
        "  tenant_id:     {}\n  client_id:     {}\n  client_secret: ******** (set)\n",
        credentials.directory_id(),
        credentials.application_id()
    ));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{
        derive, DataAccessIdentity, DataAccessSection, IdentityCredentials, LoginIdentity,
        LoginSection,
    };

    fn document(data_access: Option<DataAccessSection>) -> SecretsDocument {
        SecretsDocument::new(
            LoginSection::new(
                LoginIdentity::new(
                    IdentityCredentials::new("tenant-1", "client-1", "login-secret").unwrap(),
                ),
                derive("meu-app").unwrap(),
            ),
            data_access,
        )
    }

    #[test]
    fn test_summary_masks_secrets() {
        let paths = ProjectPaths::new("/srv/app");
        let data = DataAccessSection::new(
            DataAccessIdentity::new(
                IdentityCredentials::new("tenant-1", "client-1", "data-secret").unwrap(),
            ),
            DataAccessTarget::OneDrive {
                user_principal_name: "ana@contoso.com".into(),
                file_path: Some("a.xlsx".into()),
            },
        );

        let out = summary(&paths, &document(Some(data)), false).unwrap();
        assert!(!out.contains("login-secret"));
        assert!(!out.contains("data-secret"));
        assert!(out.contains("OneDrive mode"));
        assert!(out.contains("same app registration"));
        assert!(out.contains("WARNING"));
    }

    #[test]
    fn test_check_reads_written_file() {
        let dir = tempfile::tempdir().unwrap();
        let paths = ProjectPaths::new(dir.path());
        store::write_secrets(
            &paths.secrets_file(),
            document(None).render().as_bytes(),
        )
        .unwrap();
        store::ensure_ignored(&paths.ignore_file(), paths.ignore_entry()).unwrap();

        check(&paths).unwrap();

        let loaded = paths.load_secrets().unwrap();
        let out = summary(&paths, &loaded, true).unwrap();
        assert!(out.contains("[data_access]  not configured"));
        assert!(out.contains("https://meu-app.streamlit.app"));
        assert!(!out.contains("WARNING"));
    }
}
