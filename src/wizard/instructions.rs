//! Operator-facing text

use crate::config::RedirectUris;

const RULE: &str =
    "----------------------------------------------------------------------";

pub const HEADER: &str = "\
======================================================================
  Microsoft Entra ID login setup
  Provisions .streamlit/secrets.toml for a Streamlit app
======================================================================";

pub const APP_NAME_HINT: &str = "\
Enter the name of your app on Streamlit Community Cloud.
  If its URL is https://my-app.streamlit.app, type just: my-app
";

pub const PORTAL_STEPS: &str = "
How to register the redirect URIs in the Azure portal:

  1. Open https://portal.azure.com
  2. Go to Microsoft Entra ID > App registrations
  3. Select your application
  4. Open Authentication
  5. Under Redirect URIs:
     - Add a platform > Web
     - Paste EACH URI on its own line
     - Configure

  IMPORTANT: add BOTH URIs (localhost and production).
";

pub const LOGIN_CREDENTIALS_HINT: &str = "\
Where to find the credentials:
  Azure portal > Microsoft Entra ID > App registrations > [your app] > Overview

The client secret is under Certificates & secrets > Client secrets
  (create one if the app has none yet).
";

pub const DATA_ACCESS_HINT: &str = "\
Data access reads files from OneDrive or SharePoint through Microsoft Graph
with APPLICATION permissions (Files.Read.All or Sites.Read.All), which an
administrator must grant consent for. This is a different trust level from
the delegated User.Read permission used for sign-in.
";

pub const TARGET_MODES: &str = "\
Where are the files?
  [1] OneDrive   (a user's drive, identified by their UPN)
  [2] SharePoint (a document library on a site)";

/// The two redirect URIs, boxed and then bare for copy and paste.
pub fn redirect_uri_banner(uris: &RedirectUris) -> String {
    format!(
        "\n\
Redirect URIs to register in Entra ID:
  Local:      {local}
  Production: {production}

{RULE}
COPY AND PASTE INTO THE AZURE PORTAL:
{RULE}

{local}
{production}

{RULE}",
        local = uris.local(),
        production = uris.production(),
    )
}

pub fn section(title: &str) -> String {
    format!(
        "\n{}\n{}\n{}\n",
        "=".repeat(RULE.len()),
        title,
        "=".repeat(RULE.len())
    )
}

/// Closing message once the files are in place.
pub fn next_steps(secrets: &str, ignore_file: &str) -> String {
    format!(
        "
Files created/updated:
  {secrets}  (your credentials)
  {ignore_file}  (keeps them out of git)

Next steps:
  1. Run the app locally:  streamlit run app.py
  2. Sign in with your Microsoft account
  3. To deploy on Streamlit Community Cloud:
     - push your code (without secrets.toml!)
     - open Settings > Secrets in the app dashboard
     - paste the contents of secrets.toml
"
    )
}
