use crate::VaultContext;
use crate::config::{Config, KEYS};
use crate::output;
use anyhow::Result;
use colored::Colorize;

/// Execute config command to get/set configuration values
///
/// # Errors
///
/// Returns an error if:
/// - The key is unknown or the value is invalid for it
/// - Failed to save configuration
pub fn execute(
    ctx: &mut VaultContext,
    key: Option<&str>,
    value: Option<&str>,
    unset: bool,
    list: bool,
) -> Result<()> {
    // If --list flag is set or no key is provided, show all configuration
    let Some(key) = key.filter(|_| !list) else {
        show_all_config(ctx);
        return Ok(());
    };

    if unset {
        ctx.config.unset(key)?;
        ctx.config.save(&ctx.config_path)?;
        output::success(&format!("Unset {key}"));
    } else if let Some(val) = value {
        ctx.config.set(key, val)?;
        ctx.config.save(&ctx.config_path)?;
        output::success(&format!("Set {key} = {}", val.trim()));
    } else if let Some(val) = ctx.config.get(key) {
        println!("{val}");
    } else if KEYS.contains(&key) {
        output::warning(&format!("Configuration key '{key}' is not set"));
    } else {
        anyhow::bail!("Unknown configuration key: {key}");
    }

    Ok(())
}

/// Execute config-reset command - delete the configuration file
///
/// # Errors
///
/// Returns an error if the file exists but cannot be removed.
pub fn reset(ctx: &VaultContext) -> Result<()> {
    Config::reset(&ctx.config_path)?;
    output::success(&format!("Removed {}", ctx.config_path.display()));
    Ok(())
}

/// Show all configuration values, grouped by section
fn show_all_config(ctx: &VaultContext) {
    let mut section = "";
    for &key in KEYS {
        let (head, name) = key.split_once('.').unwrap_or(("", key));
        if head != section {
            if !section.is_empty() {
                println!();
            }
            println!("{}", format!("[{head}]").bold());
            section = head;
        }
        match ctx.config.get(key) {
            Some(val) => println!("  {name} = {val}"),
            None => println!("  {name} = {}", "(unset)".dimmed()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup() -> Result<(TempDir, VaultContext)> {
        let temp = TempDir::new()?;
        let home = temp.path().join("home");
        std::fs::create_dir_all(&home)?;
        let ctx =
            VaultContext::new_explicit(&home, &home.join(".bk"), temp.path().join("config.toml"))?;
        Ok((temp, ctx))
    }

    #[test]
    fn test_set_persists() -> Result<()> {
        let (_temp, mut ctx) = setup()?;
        execute(&mut ctx, Some("git.branch"), Some("main"), false, false)?;

        let reloaded = Config::load(&ctx.config_path)?;
        assert_eq!(reloaded.git.branch.as_deref(), Some("main"));
        Ok(())
    }

    #[test]
    fn test_unset_restores_default() -> Result<()> {
        let (_temp, mut ctx) = setup()?;
        execute(&mut ctx, Some("git.remote"), Some("backup"), false, false)?;
        execute(&mut ctx, Some("git.remote"), None, true, false)?;

        assert_eq!(Config::load(&ctx.config_path)?.git.remote, "origin");
        Ok(())
    }

    #[test]
    fn test_unknown_key_is_rejected() -> Result<()> {
        let (_temp, mut ctx) = setup()?;
        assert!(execute(&mut ctx, Some("core.nope"), None, false, false).is_err());
        assert!(execute(&mut ctx, Some("core.nope"), Some("x"), false, false).is_err());
        Ok(())
    }

    #[test]
    fn test_reset_removes_file() -> Result<()> {
        let (_temp, ctx) = setup()?;
        assert!(ctx.config_path.exists());
        reset(&ctx)?;
        assert!(!ctx.config_path.exists());
        reset(&ctx)?;
        Ok(())
    }
}
