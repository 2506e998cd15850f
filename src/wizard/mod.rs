//! Interactive credential setup
//!
//! Collection runs first and touches nothing on disk; the secrets file and the
//! ignore entry are written together afterwards in [`commit`].

pub mod instructions;
pub mod prompt;

use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::Context;
use thiserror::Error;

use crate::config::redirect::RedirectError;
use crate::config::store::{self, IgnoreUpdate, StoreError};
use crate::config::{
    derive, DataAccessIdentity, DataAccessSection, DataAccessTarget, IdentityCredentials,
    LoginIdentity, LoginSection, ProjectPaths, RedirectUris, SecretsDocument, DEFAULT_LIBRARY,
};
use prompt::{
    ask_optional, ask_required, ask_required_secret, ask_with_default, confirm, Prompter,
    TerminalPrompter,
};

#[derive(Debug, Error)]
pub enum WizardError {
    #[error("operation cancelled by the operator")]
    Cancelled,
    #[error("failed to read operator input")]
    Input(#[source] io::Error),
    #[error("failed to write to the terminal")]
    Output(#[source] io::Error),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Wizard progress. Each transition consumes the state and returns the next.
#[derive(Debug)]
pub enum State {
    CollectingAppName,
    CollectingLoginCredentials { redirect_uris: RedirectUris },
    CollectingDataAccessChoice { login: LoginSection },
    CollectingDataAccessCredentials { login: LoginSection },
    Serializing { document: SecretsDocument },
    Done { document: SecretsDocument, rendered: Vec<u8> },
}

/// A fully collected run, ready to be written.
#[derive(Debug)]
pub struct Draft {
    pub document: SecretsDocument,
    pub rendered: Vec<u8>,
    pub secrets_file: PathBuf,
}

/// What [`commit`] changed on disk.
#[derive(Debug)]
pub struct CommitReport {
    pub secrets_file: PathBuf,
    pub ignore_file: PathBuf,
    pub ignore_update: IgnoreUpdate,
}

/// Advance the wizard by one state.
pub fn advance<P: Prompter + ?Sized>(p: &mut P, state: State) -> Result<State, WizardError> {
    tracing::debug!("wizard step: {}", state_name(&state));
    let next = match state {
        State::CollectingAppName => {
            p.say(&instructions::section("STEP 1: Application"))?;
            p.say(instructions::APP_NAME_HINT)?;
            let redirect_uris = collect_app_name(p)?;
            p.say(&instructions::redirect_uri_banner(&redirect_uris))?;
            p.say(instructions::PORTAL_STEPS)?;
            p.ask("Press ENTER once both URIs are registered in the Azure portal...")?;
            State::CollectingLoginCredentials { redirect_uris }
        }
        State::CollectingLoginCredentials { redirect_uris } => {
            p.say(&instructions::section("STEP 2: Login credentials"))?;
            p.say(instructions::LOGIN_CREDENTIALS_HINT)?;
            let identity = collect_login_identity(p)?;
            State::CollectingDataAccessChoice {
                login: LoginSection::new(identity, redirect_uris),
            }
        }
        State::CollectingDataAccessChoice { login } => {
            if offer_data_access(p)? {
                State::CollectingDataAccessCredentials { login }
            } else {
                State::Serializing {
                    document: SecretsDocument::new(login, None),
                }
            }
        }
        State::CollectingDataAccessCredentials { login } => {
            let identity = collect_data_access_identity(p, login.identity())?;
            let target = collect_target_descriptor(p)?;
            State::Serializing {
                document: SecretsDocument::new(
                    login,
                    Some(DataAccessSection::new(identity, target)),
                ),
            }
        }
        State::Serializing { document } => {
            let rendered = serialize(&document);
            tracing::debug!("rendered secrets document ({} bytes)", rendered.len());
            State::Done { document, rendered }
        }
        done @ State::Done { .. } => done,
    };
    Ok(next)
}

fn state_name(state: &State) -> &'static str {
    match state {
        State::CollectingAppName => "collecting app name",
        State::CollectingLoginCredentials { .. } => "collecting login credentials",
        State::CollectingDataAccessChoice { .. } => "collecting data access choice",
        State::CollectingDataAccessCredentials { .. } => "collecting data access credentials",
        State::Serializing { .. } => "serializing",
        State::Done { .. } => "done",
    }
}

/// Run every prompt, including the overwrite confirmation. Nothing is written.
pub fn prepare<P: Prompter + ?Sized>(
    p: &mut P,
    paths: &ProjectPaths,
) -> Result<Draft, WizardError> {
    p.say(instructions::HEADER)?;

    let mut state = State::CollectingAppName;
    let (document, rendered) = loop {
        match advance(p, state)? {
            State::Done { document, rendered } => break (document, rendered),
            next => state = next,
        }
    };

    p.say(&instructions::section("STEP 3: Writing the configuration"))?;
    let secrets_file = paths.secrets_file();
    confirm_overwrite(p, &secrets_file)?;

    Ok(Draft {
        document,
        rendered,
        secrets_file,
    })
}

/// Make sure git ignores the secrets file, then write it.
///
/// The ignore list is settled first so a failure there leaves no secrets on
/// disk that git could pick up.
pub fn commit(draft: &Draft, paths: &ProjectPaths) -> Result<CommitReport, WizardError> {
    let ignore_file = paths.ignore_file();
    let ignore_update = store::ensure_ignored(&ignore_file, paths.ignore_entry())?;

    store::write_secrets(&draft.secrets_file, &draft.rendered)?;

    Ok(CommitReport {
        secrets_file: draft.secrets_file.clone(),
        ignore_file,
        ignore_update,
    })
}

/// Collect with `prompter` on a blocking task raced against `cancel`, then
/// commit.
///
/// If `cancel` resolves first the run ends with [`WizardError::Cancelled`] and
/// nothing is written; the blocked prompt is abandoned. Once collection
/// finishes `cancel` is no longer polled, so it cannot cut the commit short.
pub async fn run_with<P, F>(
    paths: &ProjectPaths,
    mut prompter: P,
    cancel: F,
) -> anyhow::Result<(Draft, CommitReport)>
where
    P: Prompter + Send + 'static,
    F: Future<Output = io::Result<()>>,
{
    let prompt_paths = paths.clone();
    let collecting =
        tokio::task::spawn_blocking(move || prepare(&mut prompter, &prompt_paths));

    let draft = tokio::select! {
        joined = collecting => joined.context("Prompt task failed")??,
        signal = cancel => {
            signal.context("Failed to wait for the cancel signal")?;
            return Err(WizardError::Cancelled.into());
        }
    };

    let report = commit(&draft, paths)?;
    Ok((draft, report))
}

/// Run the wizard on the terminal, cancelled by Ctrl-C.
pub async fn run(paths: ProjectPaths) -> anyhow::Result<()> {
    let (draft, report) =
        run_with(&paths, TerminalPrompter::stdio(), tokio::signal::ctrl_c()).await?;

    println!("Created: {}", report.secrets_file.display());
    match &draft.document.data_access {
        Some(section) => println!(
            "Data access: {} mode",
            section.target().mode_name()
        ),
        None => println!("Data access: not configured"),
    }
    match report.ignore_update {
        IgnoreUpdate::Created => println!(
            "Created {} with {}",
            report.ignore_file.display(),
            paths.ignore_entry()
        ),
        IgnoreUpdate::Appended => println!(
            "Added {} to {}",
            paths.ignore_entry(),
            report.ignore_file.display()
        ),
        IgnoreUpdate::AlreadyPresent => {}
    }
    println!("{}", instructions::section("CONFIGURATION COMPLETE"));
    println!(
        "{}",
        instructions::next_steps(paths.ignore_entry(), ".gitignore")
    );
    Ok(())
}

fn collect_app_name<P: Prompter + ?Sized>(p: &mut P) -> Result<RedirectUris, WizardError> {
    loop {
        let name = ask_required(p, "Application name (without .streamlit.app)")?;
        match derive(&name) {
            Ok(uris) => return Ok(uris),
            Err(RedirectError::EmptyAppName) => {
                p.say("  That leaves an empty name. Type just the app name, e.g. my-app.")?;
            }
            Err(e) => p.say(&format!("  {}", e))?,
        }
    }
}

fn collect_identity<P: Prompter + ?Sized>(p: &mut P) -> Result<IdentityCredentials, WizardError> {
    loop {
        let tenant = ask_required(p, "Tenant ID (Directory ID)")?;
        let client = ask_required(p, "Client ID (Application ID)")?;
        let secret = ask_required_secret(p, "Client secret (the secret's Value)")?;
        match IdentityCredentials::new(tenant, client, secret) {
            Ok(credentials) => return Ok(credentials),
            Err(e) => p.say(&format!("  {}", e))?,
        }
    }
}

/// Collect the app registration used for sign-in.
pub fn collect_login_identity<P: Prompter + ?Sized>(
    p: &mut P,
) -> Result<LoginIdentity, WizardError> {
    collect_identity(p).map(LoginIdentity::new)
}

/// Ask whether to configure OneDrive/SharePoint access. Defaults to no.
pub fn offer_data_access<P: Prompter + ?Sized>(p: &mut P) -> Result<bool, WizardError> {
    p.say("")?;
    confirm(p, "Configure OneDrive/SharePoint data access as well?", false)
}

/// Collect the app registration used for data access, optionally copying the
/// login registration's values.
pub fn collect_data_access_identity<P: Prompter + ?Sized>(
    p: &mut P,
    login: &LoginIdentity,
) -> Result<DataAccessIdentity, WizardError> {
    p.say(&instructions::section("Data access credentials"))?;
    p.say(instructions::DATA_ACCESS_HINT)?;

    if confirm(
        p,
        "Reuse the login app registration (it must also have the application permissions)?",
        false,
    )? {
        tracing::debug!("data access identity copied from login identity");
        return Ok(DataAccessIdentity::copied_from(login));
    }
    collect_identity(p).map(DataAccessIdentity::new)
}

/// Pick OneDrive or SharePoint and collect only that mode's fields.
pub fn collect_target_descriptor<P: Prompter + ?Sized>(
    p: &mut P,
) -> Result<DataAccessTarget, WizardError> {
    p.say(instructions::TARGET_MODES)?;
    let choice = p.ask("Choice [1]:")?;

    let share_point = match choice.as_str() {
        "2" => true,
        "" | "1" => false,
        other => {
            p.say(&format!("  Unrecognized choice '{}', using OneDrive.", other))?;
            false
        }
    };

    if share_point {
        let hostname = ask_required(p, "SharePoint hostname (e.g. contoso.sharepoint.com)")?;
        let site_path = ask_required(p, "Site path (e.g. /sites/Finance)")?;
        let library_name = ask_with_default(p, "Document library", DEFAULT_LIBRARY)?;
        let file_path = ask_optional(p, "File path inside the library")?;
        Ok(DataAccessTarget::SharePoint {
            hostname,
            site_path,
            library_name,
            file_path,
        })
    } else {
        let user_principal_name =
            ask_required(p, "User principal name (e.g. someone@contoso.com)")?;
        let file_path = ask_optional(p, "File path inside the drive")?;
        Ok(DataAccessTarget::OneDrive {
            user_principal_name,
            file_path,
        })
    }
}

/// Render the document to the bytes that go on disk.
pub fn serialize(document: &SecretsDocument) -> Vec<u8> {
    document.render().into_bytes()
}

/// An existing file is only replaced after an explicit yes.
pub fn confirm_overwrite<P: Prompter + ?Sized>(
    p: &mut P,
    path: &Path,
) -> Result<(), WizardError> {
    if !path.exists() {
        return Ok(());
    }
    let question = format!("{} already exists. Overwrite?", path.display());
    if confirm(p, &question, false)? {
        Ok(())
    } else {
        Err(WizardError::Cancelled)
    }
}
