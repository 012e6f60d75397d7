//! Fragments CLI
//!
//! Create, read, convert and delete owner-scoped fragments from the command
//! line.

mod commands;
mod config;
mod owner;
mod store_factory;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt};

use fragments_core::OwnerId;

use crate::commands::Context;
use crate::config::FragmentsConfig;

/// Fragments CLI: store and convert owner-scoped text fragments.
#[derive(Parser, Debug)]
#[command(name = "fragments", version, about)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(
        long,
        env = "FRAGMENTS_CONFIG",
        default_value = "fragments.toml",
        global = true
    )]
    config: PathBuf,

    /// Owner id to act as, used verbatim.
    #[arg(long, env = "FRAGMENTS_OWNER", global = true, conflicts_with = "user")]
    owner: Option<String>,

    /// User identity (e.g. an email address) to act as; hashed into an owner id.
    #[arg(long, env = "FRAGMENTS_USER", global = true)]
    user: Option<String>,

    /// Output format.
    #[arg(long, default_value = "text", global = true)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a fragment from a file or stdin.
    Create(commands::create::CreateArgs),
    /// Write a fragment's payload to stdout.
    Get(commands::get::GetArgs),
    /// Show a fragment's metadata.
    Info(commands::info::InfoArgs),
    /// List the owner's fragments.
    List(commands::list::ListArgs),
    /// Replace a fragment's payload.
    Update(commands::update::UpdateArgs),
    /// Delete a fragment.
    Delete(commands::delete::DeleteArgs),
    /// Render a fragment in another format.
    Convert(commands::convert::ConvertArgs),
}

/// Resolve the acting owner from `--owner` or, failing that, `--user`.
fn resolve_owner(owner: Option<&str>, user: Option<&str>) -> anyhow::Result<OwnerId> {
    match (owner, user) {
        (Some(owner), _) if !owner.trim().is_empty() => Ok(OwnerId::new(owner.trim())),
        (_, Some(user)) if !user.trim().is_empty() => Ok(owner::owner_id_for(user.trim())),
        _ => anyhow::bail!("an owner is required: pass --owner or --user"),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = FragmentsConfig::load(&cli.config)?;
    let owner = resolve_owner(cli.owner.as_deref(), cli.user.as_deref())?;
    let store = store_factory::create_store(&config.store).await?;
    debug!(backend = store.backend_name(), policy = %config.types.policy, "store ready");

    let ctx = Context {
        store,
        owner,
        policy: config.types.policy,
    };

    match cli.command {
        Command::Create(args) => commands::create::run(&ctx, &args, &cli.format).await,
        Command::Get(args) => commands::get::run(&ctx, &args, &cli.format).await,
        Command::Info(args) => commands::info::run(&ctx, &args, &cli.format).await,
        Command::List(args) => commands::list::run(&ctx, &args, &cli.format).await,
        Command::Update(args) => commands::update::run(&ctx, &args, &cli.format).await,
        Command::Delete(args) => commands::delete::run(&ctx, &args, &cli.format).await,
        Command::Convert(args) => commands::convert::run(&ctx, &args, &cli.format).await,
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn owner_is_used_verbatim() {
        let owner = resolve_owner(Some("abc123"), Some("ignored@example.com")).unwrap();
        assert_eq!(owner.as_str(), "abc123");
    }

    #[test]
    fn user_is_hashed() {
        let owner = resolve_owner(None, Some("User@Example.com")).unwrap();
        assert_eq!(owner, owner::owner_id_for("user@example.com"));
    }

    #[test]
    fn missing_owner_is_an_error() {
        assert!(resolve_owner(None, None).is_err());
        assert!(resolve_owner(Some("  "), Some("")).is_err());
    }

    #[test]
    fn parses_subcommands() {
        let cli = Cli::try_parse_from([
            "fragments",
            "--owner",
            "abc",
            "--format",
            "json",
            "convert",
            "some-id",
            "html",
        ])
        .unwrap();
        assert!(matches!(cli.format, OutputFormat::Json));
        let Command::Convert(args) = cli.command else {
            panic!("expected convert");
        };
        assert_eq!(args.id, "some-id");
        assert_eq!(args.extension, "html");

        let cli = Cli::try_parse_from(["fragments", "list", "--expand"]).unwrap();
        assert!(matches!(cli.command, Command::List(ref a) if a.expand));
    }

    #[test]
    fn owner_and_user_conflict() {
        let result = Cli::try_parse_from([
            "fragments", "--owner", "a", "--user", "b@example.com", "list",
        ]);
        assert!(result.is_err());
    }
}
