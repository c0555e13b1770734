//! cli::commands::clear
//!
//! Forget remembered settings.
//!
//! # Example
//!
//! ```bash
//! # Forget everything
//! ado-history clear
//!
//! # Forget only the token
//! ado-history clear pat
//! ```

use anyhow::{Context as _, Result};
use log::info;

use crate::cli::args::ClearTarget;
use crate::cli::Context;
use crate::core::config::Config;
use crate::secrets::{self, PAT_KEY};
use crate::ui::output;

/// Run the clear command.
///
/// With no target, the organization, token, and output folder are all
/// forgotten. Clearing something that was never saved succeeds.
pub fn clear(ctx: &Context, target: Option<ClearTarget>) -> Result<()> {
    let mut config = Config::load(&ctx.paths)?;

    let targets: &[ClearTarget] = match &target {
        Some(t) => std::slice::from_ref(t),
        None => &[ClearTarget::Org, ClearTarget::Pat, ClearTarget::Loc],
    };

    let mut config_changed = false;
    for target in targets {
        match target {
            ClearTarget::Org => {
                config.set_organization(None)?;
                config_changed = true;
            }
            ClearTarget::Loc => {
                config.set_output_dir(None);
                config_changed = true;
            }
            ClearTarget::Pat => {
                let store = secrets::create_store(config.secrets_provider(), &ctx.paths)
                    .context("Failed to initialize secret store")?;
                store
                    .delete(PAT_KEY)
                    .context("Failed to remove stored token")?;
            }
        }
        info!("cleared saved {}", describe(*target));
        output::print(
            format!("Cleared saved {}.", describe(*target)),
            ctx.verbosity(),
        );
    }

    // Nothing to rewrite if there was never a config file
    if config_changed && config.loaded_from().is_some() {
        config.save()?;
    }

    Ok(())
}

fn describe(target: ClearTarget) -> &'static str {
    match target {
        ClearTarget::Org => "organization",
        ClearTarget::Pat => "PAT",
        ClearTarget::Loc => "folder location",
    }
}
