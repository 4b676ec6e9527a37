//! chartpush CLI - publish packaged Helm charts to chart repositories

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

mod commands;
mod error;
mod exit_codes;
mod util;

#[derive(Parser)]
#[command(name = "chartpush")]
#[command(author = "chartpush Contributors")]
#[command(version)]
#[command(about = "Publish packaged Helm charts to ChartMuseum-compatible repositories", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Publishing configuration file
    #[arg(long, global = true, env = "CHARTPUSH_CONFIG")]
    config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Publish a packaged chart to one or more repositories
    Publish {
        /// Chart archive (.tgz)
        archive: PathBuf,

        /// Target repository (repeatable)
        #[arg(short, long = "repo")]
        repos: Vec<String>,

        /// Publish to every configured repository
        #[arg(long, conflicts_with = "repos")]
        all: bool,
    },

    /// Manage publishing repositories
    Repo {
        #[command(subcommand)]
        command: RepoCommands,
    },
}

#[derive(Subcommand)]
enum RepoCommands {
    /// Add a publishing repository
    Add {
        /// Repository name
        name: String,

        /// Repository URL
        url: String,

        /// Server flavor (chartmuseum, artifactory)
        #[arg(long, default_value = "chartmuseum")]
        flavor: String,

        /// ChartMuseum tenant id, outermost first (repeatable)
        #[arg(long = "tenant")]
        tenants: Vec<String>,

        /// Username for authentication
        #[arg(long)]
        username: Option<String>,

        /// Password for authentication (prompted when omitted)
        #[arg(long)]
        password: Option<String>,

        /// Bearer token for authentication
        #[arg(long, conflicts_with_all = ["username", "password"])]
        token: Option<String>,

        /// Request timeout (e.g. 30s, 2m)
        #[arg(long, value_parser = parse_timeout)]
        timeout: Option<Duration>,
    },

    /// List publishing repositories
    List,

    /// Remove a publishing repository
    Remove {
        /// Repository name
        name: String,
    },

    /// Show where a repository would receive uploads
    Show {
        /// Repository name
        name: String,
    },
}

fn parse_timeout(s: &str) -> Result<Duration, String> {
    humantime_serde::re::humantime::parse_duration(s).map_err(|e| e.to_string())
}

fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> error::Result<()> {
    let config = cli.config.as_deref();

    match cli.command {
        Commands::Publish {
            archive,
            repos,
            all,
        } => commands::publish::run(config, &archive, &repos, all).await,

        Commands::Repo { command } => match command {
            RepoCommands::Add {
                name,
                url,
                flavor,
                tenants,
                username,
                password,
                token,
                timeout,
            } => commands::repo::add(
                config,
                commands::repo::AddOptions {
                    name: &name,
                    url: &url,
                    flavor: &flavor,
                    tenants: &tenants,
                    username: username.as_deref(),
                    password: password.as_deref(),
                    token: token.as_deref(),
                    timeout,
                },
            ),
            RepoCommands::List => commands::repo::list(config),
            RepoCommands::Remove { name } => commands::repo::remove(config, &name),
            RepoCommands::Show { name } => commands::repo::show(config, &name),
        },
    }
}

fn main() {
    miette::set_panic_hook();

    let cli = Cli::parse();

    if cli.debug {
        // SAFETY: still single-threaded; the runtime is built below
        unsafe { std::env::set_var("RUST_BACKTRACE", "1") };
    }
    init_tracing(cli.debug);

    let result = tokio::runtime::Runtime::new()
        .map_err(error::CliError::from)
        .and_then(|runtime| runtime.block_on(run(cli)));

    if let Err(err) = result {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_timeout() {
        assert_eq!(parse_timeout("30s").unwrap(), Duration::from_secs(30));
        assert_eq!(parse_timeout("2m").unwrap(), Duration::from_secs(120));
        assert!(parse_timeout("soon").is_err());
    }

    #[test]
    fn test_all_conflicts_with_repo() {
        let result = Cli::try_parse_from([
            "chartpush",
            "publish",
            "nginx-1.0.0.tgz",
            "--repo",
            "internal",
            "--all",
        ]);
        assert!(result.is_err());
    }
}
