use crate::VaultContext;
use crate::config::Config;
use crate::output;
use crate::tracking::IgnoreSet;
use crate::utils::paths::{ensure_dir, expand_tilde};
use anyhow::{Context, Result};
use dialoguer::Input;

/// Values asked for by `cfgvault setup`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetupAnswers {
    /// `core.backup_dir`
    pub backup_dir: String,
    /// `core.map_file`
    pub map_file: String,
    /// First entry of `core.ignore_files`, seeded in the backup directory
    pub ignore_file: String,
}

impl SetupAnswers {
    /// Current values: the backup directory in effect and the configured
    /// registry and ignore file names
    #[must_use]
    pub fn current(ctx: &VaultContext) -> Self {
        Self {
            backup_dir: ctx.layout.backup_dir().display().to_string(),
            map_file: ctx.config.core.map_file.clone(),
            ignore_file: ctx
                .config
                .core
                .ignore_files
                .first()
                .cloned()
                .unwrap_or_else(|| ".cfgvaultignore".to_string()),
        }
    }

    /// Writes the answers into `config`
    ///
    /// The ignore file replaces the first configured one; the rest are kept.
    ///
    /// # Errors
    ///
    /// Returns an error if an answer is empty.
    pub fn apply(&self, config: &mut Config) -> Result<()> {
        config.set("core.backup_dir", &self.backup_dir)?;
        config.set("core.map_file", &self.map_file)?;

        let ignore_file = self.ignore_file.trim();
        let mut names = vec![ignore_file.to_string()];
        names.extend(
            config
                .core
                .ignore_files
                .iter()
                .skip(1)
                .filter(|name| name.as_str() != ignore_file)
                .cloned(),
        );
        config.set("core.ignore_files", &names.join(","))
    }
}

fn ask(prompt: &str, default: String) -> Result<String> {
    Input::<String>::new()
        .with_prompt(prompt)
        .default(default)
        .interact_text()
        .with_context(|| format!("Failed to read {}", prompt.to_lowercase()))
}

fn prompt(defaults: SetupAnswers) -> Result<SetupAnswers> {
    Ok(SetupAnswers {
        backup_dir: ask("Backup directory", defaults.backup_dir)?,
        map_file: ask("Map file", defaults.map_file)?,
        ignore_file: ask("Ignore file", defaults.ignore_file)?,
    })
}

/// Execute setup command - prompt for the core settings and save them
///
/// With `--yes` the current values are saved as they are.
///
/// # Errors
///
/// Returns an error if:
/// - A prompt fails or an answer is empty
/// - Failed to save configuration
/// - The backup directory or its ignore file cannot be created
pub fn execute(ctx: &mut VaultContext) -> Result<()> {
    let defaults = SetupAnswers::current(ctx);
    let answers = if ctx.non_interactive {
        defaults
    } else {
        prompt(defaults)?
    };

    answers.apply(&mut ctx.config)?;
    ctx.config.save(&ctx.config_path)?;
    output::success(&format!("Saved {}", ctx.config_path.display()));

    let backup_dir = expand_tilde(&ctx.config.core.backup_dir, ctx.layout.home());
    ensure_dir(&backup_dir)
        .with_context(|| format!("Failed to create backup directory: {}", backup_dir.display()))?;
    let ignore_file = backup_dir.join(answers.ignore_file.trim());
    if IgnoreSet::seed_default(&ignore_file)? {
        output::action("Seeded", &ignore_file.display().to_string());
    }
    Ok(())
}
