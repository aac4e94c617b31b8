//! Resolves the effective profile for a run: config file, then CLI flags
//! and environment overrides on top.

use std::path::PathBuf;

use secrecy::SecretString;

use tutora_config::{Config, Profile};
use tutora_core::ClientConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Everything `main` needs to build a `Tutora` for this invocation.
#[derive(Debug)]
pub struct Resolved {
    pub name: String,
    /// Effective profile with CLI overrides applied.
    pub profile: Profile,
    pub client: ClientConfig,
    pub state_file: PathBuf,
}

impl Resolved {
    /// Password for the effective profile.
    pub fn password(&self) -> Result<SecretString, CliError> {
        Ok(tutora_config::resolve_password(&self.profile, &self.name)?)
    }
}

pub fn active_profile_name(global: &GlobalOpts, cfg: &Config) -> String {
    cfg.profile_name(global.profile.as_deref())
}

/// Merge the named profile (if any) with `--api-url`, `--timeout` and
/// `--state-file`.
pub fn resolve(global: &GlobalOpts, cfg: &Config) -> Result<Resolved, CliError> {
    let name = active_profile_name(global, cfg);

    let mut profile = match cfg.profiles.get(&name) {
        Some(p) => p.clone(),
        // An explicitly requested profile must exist.
        None if global.profile.is_some() && global.api_url.is_none() => {
            return Err(CliError::ProfileNotFound {
                available: available_profiles(cfg),
                name,
            });
        }
        None => Profile::default(),
    };

    if let Some(ref url) = global.api_url {
        profile.api_url.clone_from(url);
    }
    if profile.api_url.is_empty() {
        return Err(CliError::NoConfig {
            path: tutora_config::config_path().display().to_string(),
        });
    }
    if global.timeout.is_some() {
        profile.timeout = global.timeout;
    }
    if let Some(ref path) = global.state_file {
        profile.state_file = Some(path.clone());
    }

    let client = tutora_config::profile_to_client_config(&profile, &cfg.defaults)?;
    let state_file = tutora_config::state_path(Some(&profile), &name);

    Ok(Resolved {
        name,
        profile,
        client,
        state_file,
    })
}

pub fn available_profiles(cfg: &Config) -> String {
    if cfg.profiles.is_empty() {
        return "(none)".into();
    }
    let mut names: Vec<&str> = cfg.profiles.keys().map(String::as_str).collect();
    names.sort_unstable();
    names.join(", ")
}
