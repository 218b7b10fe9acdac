//! Config subcommand handlers.

use dialoguer::{Input, Select};

use portico_config::{AUTH_MODES, Config, Profile};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, available_profiles};
use crate::error::CliError;
use crate::output;

const REDACTED: &str = "********";

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

fn read_secret(prompt: &str) -> Result<String, CliError> {
    let secret = rpassword::prompt_password(prompt).map_err(prompt_err)?;
    if secret.trim().is_empty() {
        return Err(CliError::Validation {
            field: "token".into(),
            reason: "value cannot be empty".into(),
        });
    }
    Ok(secret.trim().to_owned())
}

/// Copy of the config with plaintext tokens masked.
fn redacted(mut cfg: Config) -> Config {
    for profile in cfg.profiles.values_mut() {
        if profile.token.is_some() {
            profile.token = Some(REDACTED.into());
        }
    }
    cfg
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Init => init(global),

        ConfigCommand::Show => {
            let cfg = redacted(config::load_config_or_default());
            let out = output::render_single(
                global.output,
                &cfg,
                |c| toml::to_string_pretty(c).unwrap_or_else(|e| format!("# unprintable: {e}")),
                |c| c.default_profile.clone().unwrap_or_default(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::SetToken { profile } => {
            let cfg = config::load_config_or_default();
            let profile_name = profile.unwrap_or_else(|| config::active_profile_name(global, &cfg));
            if !cfg.profiles.contains_key(&profile_name) {
                return Err(CliError::ProfileNotFound {
                    name: profile_name,
                    available: available_profiles(&cfg),
                });
            }

            let token = read_secret("Token: ")?;
            portico_config::store_token(&profile_name, &token)?;
            if !global.quiet {
                eprintln!("✓ Token stored in system keyring for profile '{profile_name}'");
            }
            Ok(())
        }

        ConfigCommand::Use { name } => {
            let mut cfg = config::load_config_or_default();
            if !cfg.profiles.contains_key(&name) {
                return Err(CliError::ProfileNotFound {
                    available: available_profiles(&cfg),
                    name,
                });
            }
            cfg.default_profile = Some(name.clone());
            portico_config::save_config(&cfg)?;
            if !global.quiet {
                eprintln!("✓ Default profile set to '{name}'");
            }
            Ok(())
        }

        ConfigCommand::Profiles => {
            let cfg = config::load_config_or_default();
            let names = cfg.profile_names();
            if names.is_empty() {
                eprintln!("No profiles configured. Run: portico config init");
                return Ok(());
            }
            let default = cfg.default_profile.as_deref().unwrap_or("default");
            for name in names {
                let marker = if name == default { " *" } else { "" };
                println!("{name}{marker}");
            }
            Ok(())
        }
    }
}

// ── Init: interactive wizard ────────────────────────────────────────

fn init(global: &GlobalOpts) -> Result<(), CliError> {
    let mut cfg = config::load_config_or_default();
    eprintln!("portico configuration");
    eprintln!("  Config path: {}\n", config::config_path().display());

    // 1. Profile name
    let profile_name: String = Input::new()
        .with_prompt("Profile name")
        .default(global.profile.clone().unwrap_or_else(|| "default".into()))
        .interact_text()
        .map_err(prompt_err)?;

    // 2. API URL
    let api_url: String = Input::new()
        .with_prompt("API base URL")
        .default(
            global
                .api_url
                .clone()
                .unwrap_or_else(|| "https://portal.example.org/api".into()),
        )
        .validate_with(|input: &String| {
            portico_config::parse_api_url(input)
                .map(|_| ())
                .map_err(|e| e.to_string())
        })
        .interact_text()
        .map_err(prompt_err)?;

    // 3. Auth mode
    let labels = &["Bearer token (recommended)", "Service API key", "None"];
    let selection = Select::new()
        .with_prompt("Authentication")
        .items(labels)
        .default(0)
        .interact()
        .map_err(prompt_err)?;
    let auth_mode = AUTH_MODES.get(selection).copied().unwrap_or("token");

    let mut profile = Profile::new(api_url);
    profile.auth_mode = auth_mode.into();
    if global.insecure {
        profile.insecure = Some(true);
    }

    // 4. Secret and where to keep it
    if auth_mode != "none" {
        let secret = match global.token {
            Some(ref token) => token.clone(),
            None => read_secret("Token: ")?,
        };
        let store_choices = &[
            "Store in system keyring (recommended)",
            "Save to config file (plaintext)",
        ];
        let store = Select::new()
            .with_prompt("Where to store it?")
            .items(store_choices)
            .default(0)
            .interact()
            .map_err(prompt_err)?;
        if store == 0 {
            portico_config::store_token(&profile_name, &secret)?;
            eprintln!("  ✓ Token stored in system keyring");
        } else {
            profile.token = Some(secret);
        }
    }

    // 5. Write config
    if cfg.profiles.is_empty() || cfg.default_profile.is_none() {
        cfg.default_profile = Some(profile_name.clone());
    }
    cfg.profiles.insert(profile_name.clone(), profile);
    let path = portico_config::save_config(&cfg)?;

    eprintln!("\n✓ Configuration written to {}", path.display());
    eprintln!("  Profile: {profile_name}");
    eprintln!("\n  Test it: portico -p {profile_name} announcements list");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn show_masks_plaintext_tokens() {
        let mut cfg = Config::default();
        let mut profile = Profile::new("https://portal.example.org/api");
        profile.token = Some("s3cret".into());
        cfg.profiles.insert("prod".into(), profile);
        cfg.profiles
            .insert("dev".into(), Profile::new("http://localhost:5000/api"));

        let shown = redacted(cfg);
        assert_eq!(shown.profiles["prod"].token.as_deref(), Some(REDACTED));
        assert!(shown.profiles["dev"].token.is_none());
    }
}
