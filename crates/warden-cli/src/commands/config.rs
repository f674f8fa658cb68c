use super::{load_settings, ExitCodeError};
use crate::cli::{Cli, ConfigAction};
use console::style;
use dialoguer::Confirm;
use warden_core::{validate, ValidationResult};

pub async fn run(cli: &Cli, action: &ConfigAction) -> anyhow::Result<()> {
    match action {
        ConfigAction::Validate => {
            let settings = load_settings(cli)?;
            let result = validate(&settings);
            print_validation(&result);
            if !result.is_valid() {
                return Err(ExitCodeError::new(
                    1,
                    format!("Configuration has {} error(s)", result.errors.len()),
                )
                .into());
            }
        }
        ConfigAction::Show => {
            let settings = load_settings(cli)?;
            print!("{}", settings.redacted().to_yaml()?);
        }
        ConfigAction::Reset { yes } => reset(cli, *yes).await?,
        ConfigAction::Path => println!("{}", cli.config_store().path().display()),
    }
    Ok(())
}

async fn reset(cli: &Cli, yes: bool) -> anyhow::Result<()> {
    let store = cli.config_store();
    let path = store.path().to_path_buf();

    if !yes {
        let prompt = format!("Overwrite {} with the default template?", path.display());
        let confirmed = tokio::task::spawn_blocking(move || {
            Confirm::new()
                .with_prompt(prompt)
                .default(false)
                .interact()
                .unwrap_or(false)
        })
        .await?;
        if !confirmed {
            println!("{}", style("Reset cancelled.").dim());
            return Ok(());
        }
    }

    store.reset()?;
    println!("  {} Reset {}", style("✓").green(), path.display());
    Ok(())
}

fn print_validation(result: &ValidationResult) {
    println!("{}", style("Validating configuration...").cyan().bold());
    for error in &result.errors {
        println!("  {} {}", style("✗").red(), error);
    }
    for warning in &result.warnings {
        println!("  {} {}", style("!").yellow(), warning);
    }

    if result.is_valid() && result.warnings.is_empty() {
        println!("{}", style("Configuration is valid.").green().bold());
    } else if result.is_valid() {
        println!(
            "{}",
            style(format!(
                "Configuration is valid with {} warning(s).",
                result.warnings.len()
            ))
            .green()
        );
    }
}
