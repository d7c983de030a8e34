use dialoguer::{theme::ColorfulTheme, Confirm, Input};

use crate::cli::parser::ConfigArgs;
use crate::config::defaults::{default_config, get_config_file_path};
use crate::config::{Config, ConfigManager};
use crate::utils::{Result, SweepError};

pub fn execute(args: ConfigArgs) -> Result<()> {
    if args.show {
        return show_config();
    }

    let config_path = get_config_file_path();
    if config_path.exists() && !args.edit {
        return show_config();
    }

    let existing = if config_path.exists() {
        Some(ConfigManager::load_from_file(&config_path)?)
    } else {
        None
    };
    let config = run_setup(existing.unwrap_or_else(default_config))?;
    ConfigManager::save(&config)?;
    println!("✅ Configuration saved to {}", ConfigManager::get_config_path());
    Ok(())
}

fn show_config() -> Result<()> {
    let config = Config::load_or_create()?;
    println!("Configuration file: {}\n", ConfigManager::get_config_path());
    println!("  base URL:        {}", config.remote.base_url);
    println!(
        "  token:           {}",
        if config.remote.token.is_empty() {
            "(unset)"
        } else {
            "(stored)"
        }
    );
    println!(
        "  project:         {}",
        config.remote.project.as_deref().unwrap_or("(unset)")
    );
    println!("  archive prefix:  {}", config.sweep.archive_prefix);
    println!(
        "  default target:  {}",
        config.sweep.default_target.as_deref().unwrap_or("(unset)")
    );
    println!("\nTip: 'glsweep config --edit' re-runs the interactive setup");
    Ok(())
}

fn run_setup(mut config: Config) -> Result<Config> {
    println!("glsweep configuration\n");

    config.remote.base_url = prompt("GitLab base URL", &config.remote.base_url)?;

    let token = prompt_optional("API token (empty keeps the current value)")?;
    if !token.is_empty() {
        config.remote.token = token;
    }

    let project = prompt_optional("Default project path or id (empty for none)")?;
    config.remote.project = if project.is_empty() {
        config.remote.project
    } else {
        Some(project)
    };

    config.sweep.archive_prefix = prompt("Archive prefix", &config.sweep.archive_prefix)?;

    let wants_target = Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt("Configure a default target branch for merge classification?")
        .default(config.sweep.default_target.is_some())
        .interact()
        .map_err(|e| SweepError::invalid_args(format!("Failed to read input: {}", e)))?;

    config.sweep.default_target = if wants_target {
        let current = config.sweep.default_target.unwrap_or_else(|| "main".to_string());
        Some(prompt("Default target branch", &current)?)
    } else {
        None
    };

    Ok(config)
}

fn prompt(message: &str, initial: &str) -> Result<String> {
    Input::<String>::with_theme(&ColorfulTheme::default())
        .with_prompt(message)
        .with_initial_text(initial)
        .interact_text()
        .map_err(|e| SweepError::invalid_args(format!("Failed to read input: {}", e)))
}

fn prompt_optional(message: &str) -> Result<String> {
    Input::<String>::with_theme(&ColorfulTheme::default())
        .with_prompt(message)
        .allow_empty(true)
        .interact_text()
        .map_err(|e| SweepError::invalid_args(format!("Failed to read input: {}", e)))
}
