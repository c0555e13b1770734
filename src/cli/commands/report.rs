//! cli::commands::report
//!
//! The default command: fetch a work item's history and write its change log.
//!
//! # Inputs
//!
//! Each value is taken from the first source that has it:
//!
//! | Value        | Flag            | Saved            | Prompt |
//! |--------------|-----------------|------------------|--------|
//! | token        | `--token`       | secret store     | masked |
//! | organization | `--org`         | `config.toml`    | yes    |
//! | output dir   | `--output-dir`  | `config.toml`    | yes    |
//! | work item    | `--item`        | -                | yes    |
//!
//! After a prompted token, organization, or folder the user may type `YES`
//! to remember it.
//!
//! # Security
//!
//! The token is never printed or logged.

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use chrono::{DateTime, FixedOffset, Local};
use log::{debug, info};

use crate::cli::args::ReportArgs;
use crate::cli::{Context, InputError};
use crate::core::config::{schema, Config, ConfigError};
use crate::core::delta::{compute_changes, ScanMode};
use crate::core::types::WorkItemId;
use crate::secrets::{self, SecretStore, PAT_KEY};
use crate::tracker::{fetch_all_revisions, AzureDevOpsClient, FetchOptions, RevisionSource};
use crate::ui::detail::write_revision_detail;
use crate::ui::output::{self, Verbosity};
use crate::ui::prompts::Prompter;
use crate::ui::report::{render_report, write_report};

/// Everything a run needs once prompting is over.
#[derive(Clone)]
pub(crate) struct RunInputs {
    pub token: String,
    pub organization: String,
    pub api_base: String,
    pub output_dir: PathBuf,
    pub item: WorkItemId,
    pub fetch: FetchOptions,
    pub mode: ScanMode,
    pub detail: bool,
}

// Custom Debug to avoid exposing the token
impl std::fmt::Debug for RunInputs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunInputs")
            .field("has_token", &!self.token.is_empty())
            .field("organization", &self.organization)
            .field("api_base", &self.api_base)
            .field("output_dir", &self.output_dir)
            .field("item", &self.item)
            .field("fetch", &self.fetch)
            .field("mode", &self.mode)
            .field("detail", &self.detail)
            .finish()
    }
}

/// Run the report command.
pub fn report(ctx: &Context, args: &ReportArgs) -> Result<()> {
    let mut prompter = Prompter::stdio(ctx.interactive);
    let inputs = resolve_inputs(ctx, args, &mut prompter)?;
    debug!("{:?}", inputs);

    let client =
        AzureDevOpsClient::with_api_base(&inputs.organization, &inputs.token, &inputs.api_base);
    generate(ctx, &inputs, &client)?;
    Ok(())
}

/// Resolve every input from flags, saved settings, and prompts, in the
/// order token, organization, output folder, work item.
pub(crate) fn resolve_inputs<R: BufRead, W: Write>(
    ctx: &Context,
    args: &ReportArgs,
    prompter: &mut Prompter<R, W>,
) -> Result<RunInputs> {
    let mut config = Config::load(&ctx.paths).context("Failed to load settings")?;
    let store = secrets::create_store(config.secrets_provider(), &ctx.paths)
        .context("Failed to initialize secret store")?;

    let token = resolve_token(args, store.as_ref(), prompter)?;
    let organization = resolve_organization(args, &mut config, prompter)?;
    let output_dir = resolve_output_dir(args, &mut config, prompter)?;
    ensure_output_dir(&output_dir, ctx.verbosity())?;
    let item = resolve_item(args, prompter)?;

    let api_base = match &args.api_base {
        Some(base) => {
            schema::validate_api_base(base)?;
            base.clone()
        }
        None => config.api_base().to_string(),
    };
    let page_size = args
        .page_size
        .map(|n| usize::try_from(n).unwrap_or(usize::MAX))
        .or(config.page_size());

    Ok(RunInputs {
        token,
        organization,
        api_base,
        output_dir,
        item,
        fetch: FetchOptions { page_size },
        mode: ScanMode::from_track_field(args.track_field.as_deref()),
        detail: args.detail,
    })
}

fn resolve_token<R: BufRead, W: Write>(
    args: &ReportArgs,
    store: &dyn SecretStore,
    prompter: &mut Prompter<R, W>,
) -> Result<String> {
    if let Some(token) = args.token.as_deref().filter(|t| !t.is_empty()) {
        return Ok(token.to_string());
    }

    if let Some(token) = store.get(PAT_KEY).context("Failed to read stored token")? {
        debug!("using saved personal access token");
        return Ok(token);
    }

    let token = prompter
        .password("Enter your Personal Access Token (PAT): ")
        .map_err(|e| InputError::from_prompt(e, "personal access token", "--token"))?;
    let token = token.trim().to_string();
    if token.is_empty() {
        return Err(InputError::Empty("personal access token").into());
    }

    if remember(prompter, "PAT")? {
        store.set(PAT_KEY, &token).context("Failed to store token")?;
        info!("saved personal access token");
    }

    Ok(token)
}

fn resolve_organization<R: BufRead, W: Write>(
    args: &ReportArgs,
    config: &mut Config,
    prompter: &mut Prompter<R, W>,
) -> Result<String> {
    if let Some(org) = args.org.as_deref() {
        schema::validate_organization(org)?;
        return Ok(org.to_string());
    }

    if let Some(org) = config.organization() {
        return Ok(org.to_string());
    }

    let org = prompter
        .input("Enter your organization ID: ")
        .map_err(|e| InputError::from_prompt(e, "organization", "--org"))?;
    let org = org.trim().to_string();
    if org.is_empty() {
        return Err(InputError::Empty("organization").into());
    }
    schema::validate_organization(&org)?;

    if remember(prompter, "organization")? {
        config.set_organization(Some(&org))?;
        config.save()?;
        info!("saved organization to {}", config.path().display());
    }

    Ok(org)
}

fn resolve_output_dir<R: BufRead, W: Write>(
    args: &ReportArgs,
    config: &mut Config,
    prompter: &mut Prompter<R, W>,
) -> Result<PathBuf> {
    if let Some(dir) = &args.output_dir {
        return Ok(dir.clone());
    }

    if let Some(dir) = config.output_dir() {
        return Ok(dir.to_path_buf());
    }

    let dir = prompter
        .input("Enter the full path to the folder where you want the history file to be stored: ")
        .map_err(|e| InputError::from_prompt(e, "output folder", "--output-dir"))?;
    let dir = dir.trim();
    if dir.is_empty() {
        return Err(InputError::Empty("output folder").into());
    }
    let dir = PathBuf::from(dir);

    if remember(prompter, "folder location")? {
        config.set_output_dir(Some(dir.as_path()));
        config.save()?;
        info!("saved output folder to {}", config.path().display());
    }

    Ok(dir)
}

fn resolve_item<R: BufRead, W: Write>(
    args: &ReportArgs,
    prompter: &mut Prompter<R, W>,
) -> Result<WorkItemId> {
    let raw = match &args.item {
        Some(item) => item.clone(),
        None => prompter
            .input("Enter the ID of the ADO Work Item to retrieve (e.g. 3421): ")
            .map_err(|e| InputError::from_prompt(e, "work item ID", "--item"))?,
    };

    Ok(WorkItemId::parse(&raw).map_err(InputError::InvalidItemId)?)
}

fn remember<R: BufRead, W: Write>(prompter: &mut Prompter<R, W>, what: &'static str) -> Result<bool> {
    prompter
        .confirm_remember(what)
        .map_err(|e| InputError::from_prompt(e, what, "--no-interactive"))
}

/// Create the output folder if it does not exist yet.
fn ensure_output_dir(dir: &Path, verbosity: Verbosity) -> Result<(), ConfigError> {
    if dir.is_dir() {
        return Ok(());
    }

    std::fs::create_dir_all(dir).map_err(|e| {
        ConfigError::InvalidValue(format!(
            "cannot create output folder '{}': {}",
            dir.display(),
            e
        ))
    })?;
    output::print(
        format!("New directory '{}' has been created.", dir.display()),
        verbosity,
    );
    Ok(())
}

/// Fetch, compute, and write the change log. Returns the report path.
///
/// A fetch that stops early is reported as a warning; the log is still
/// written from the revisions received.
pub(crate) fn generate(
    ctx: &Context,
    inputs: &RunInputs,
    source: &dyn RevisionSource,
) -> Result<PathBuf> {
    let verbosity = ctx.verbosity();
    output::print(
        format!("Getting Change History for item {}...", inputs.item),
        verbosity,
    );

    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    let outcome = runtime.block_on(fetch_all_revisions(source, inputs.item, &inputs.fetch));

    if let Some(err) = &outcome.aborted {
        output::warn(
            format!(
                "retrieving history stopped after {} revisions: {}",
                outcome.revisions.len(),
                err
            ),
            verbosity,
        );
    }

    if inputs.detail {
        for snapshot in &outcome.revisions {
            write_revision_detail(&inputs.output_dir, inputs.item, snapshot).with_context(
                || format!("Failed to write details of revision {}", snapshot.rev),
            )?;
        }
    }

    output::print("Evaluating changes over each revision...", verbosity);
    let result = compute_changes(&outcome.revisions, inputs.mode.clone());

    let generated_at: DateTime<FixedOffset> = Local::now().into();
    let text = render_report(&result, inputs.item, generated_at);
    let path = write_report(&inputs.output_dir, inputs.item, &text)
        .with_context(|| format!("Failed to write report to {}", inputs.output_dir.display()))?;

    output::print(
        format!(
            "Evaluated {} revisions to item {}.",
            result.revisions_evaluated, inputs.item
        ),
        verbosity,
    );
    output::print("-".repeat(70), verbosity);
    output::print(format!("Output saved in file: {}", path.display()), verbosity);

    Ok(path)
}
