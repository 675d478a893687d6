use anyhow::Result;
use cfgvault::cli::{Cli, Commands};
use cfgvault::output::{self, Verbosity};
use cfgvault::{VaultContext, commands};
use clap::{CommandFactory, Parser};
use clap_complete::{Generator, generate};
use std::io;
use std::process;
use tracing_subscriber::EnvFilter;

/// Environment variable holding a `tracing` filter directive
const LOG_ENV: &str = "CFGVAULT_LOG";

fn main() {
    if let Err(e) = run() {
        output::error(&format!("{e:#}"));
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);
    output::set_verbosity(Verbosity::from_flags(cli.verbose, cli.quiet));

    if let Commands::Completion { shell } = cli.command {
        print_completions(shell, &mut Cli::command());
        return Ok(());
    }

    let mut ctx = VaultContext::with_overrides(cli.backup_dir.as_deref(), cli.map_file.as_deref())?;
    ctx.non_interactive = cli.yes;

    match cli.command {
        Commands::Backup {
            paths,
            patterns,
            replicate,
        } => commands::backup::execute(&ctx, &paths, &patterns, replicate)?,
        Commands::Restore { all } => commands::restore::execute(&ctx, all)?,
        Commands::Delete { targets, restore } => {
            commands::delete::execute(&ctx, &targets, restore)?;
        }
        Commands::Replicate { dir, all, clean } => {
            commands::replicate::execute(&ctx, dir.as_deref(), all, clean)?;
        }
        Commands::List => commands::list::execute(&ctx)?,
        Commands::Tidy => commands::tidy::execute(&ctx)?,
        Commands::Push { remote, branch } => {
            commands::push::execute(&ctx, remote.as_deref(), branch.as_deref())?;
        }
        Commands::Pull { remote, branch } => {
            commands::pull::execute(&ctx, remote.as_deref(), branch.as_deref())?;
        }
        Commands::Clone { url, branch } => {
            commands::clone::execute(&ctx, &url, branch.as_deref())?;
        }
        Commands::Config {
            key,
            value,
            unset,
            list,
        } => commands::config::execute(
            &mut ctx,
            key.as_deref(),
            value.as_deref(),
            unset,
            list,
        )?,
        Commands::ConfigReset => commands::config::reset(&ctx)?,
        Commands::Setup => commands::setup::execute(&mut ctx)?,
        Commands::Completion { .. } => {}
    }

    Ok(())
}

/// Logs go to stderr; `CFGVAULT_LOG` wins over `--verbose`
fn init_tracing(verbose: bool) {
    let default = if verbose { "cfgvault=debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn print_completions<G: Generator>(g: G, cmd: &mut clap::Command) {
    generate(g, cmd, cmd.get_name().to_string(), &mut io::stdout());
}
