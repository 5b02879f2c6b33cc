use clap::Parser;
use std::env;

use crate::cli::command::Command;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Serve and administer portfolio content",
    long_about = "Stores experiences, projects and blog posts in SQLite, serves them over a JSON API and lets the admin edit and reorder them.",
    subcommand_required = false,
    arg_required_else_help = false
)]
pub struct Cli {
    #[arg(
        long,
        default_value_t = false,
        help = "Reset all persisted state (delete the SQLite database) before starting"
    )]
    pub reset: bool,

    #[arg(
        long,
        env = "FOLIO_DATA_DIR",
        default_value = ".folio/",
        value_name = "DIR",
        help = "Directory to store persistent data"
    )]
    pub data_dir: String,

    #[arg(
        long,
        default_value_t = false,
        help = "Keep content in memory only; nothing is written to the data dir"
    )]
    pub ephemeral: bool,

    #[arg(
        long = "log-file",
        env = "FOLIO_LOG_FILE",
        value_name = "PATH",
        help = "Write logs to PATH (in addition to stderr)"
    )]
    pub log_file: Option<String>,

    #[arg(
        long = "api-listen",
        env = "FOLIO_API_LISTEN",
        value_name = "ADDR",
        default_value = "127.0.0.1:3001",
        help = "REST API listen address (host:port)"
    )]
    pub api_listen: std::net::SocketAddr,

    #[arg(
        long,
        env = "FOLIO_ADMIN_USER",
        value_name = "USER",
        default_value = "admin",
        help = "Admin username"
    )]
    pub admin_user: String,

    #[arg(
        long,
        env = "FOLIO_ADMIN_PASS",
        value_name = "PASS",
        hide_env_values = true,
        help = "Admin password; admin login is disabled when unset"
    )]
    pub admin_pass: Option<String>,

    #[arg(
        long,
        env = "FOLIO_CACHE_TTL_SECS",
        value_name = "SECS",
        default_value_t = 300u64,
        help = "How long public list responses are served from cache"
    )]
    pub cache_ttl_secs: u64,

    #[command(subcommand)]
    pub cmd: Option<Command>,
}

pub fn parse() -> Cli {
    let dotenv_path = env::var("DOTENV_PATH").unwrap_or(".env".into());
    dotenvy::from_filename(&dotenv_path).ok();

    Cli::parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{KindArg, OrderedKindArg};

    #[test]
    fn defaults_match_local_development() {
        let cli = Cli::try_parse_from(["folio"]).unwrap();
        assert_eq!(cli.api_listen.port(), 3001);
        assert_eq!(cli.cache_ttl_secs, 300);
        assert_eq!(cli.data_dir, ".folio/");
        assert!(cli.cmd.is_none());
    }

    #[test]
    fn parses_subcommands() {
        let cli = Cli::try_parse_from(["folio", "list", "blogs"]).unwrap();
        assert!(matches!(cli.cmd, Some(Command::List { kind: KindArg::Blogs })));

        let cli = Cli::try_parse_from(["folio", "move", "projects", "3", "--onto", "1"]).unwrap();
        assert!(matches!(
            cli.cmd,
            Some(Command::Move {
                kind: OrderedKindArg::Projects,
                dragged: 3,
                onto: 1
            })
        ));
    }
}
