use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::session::Credentials;

/// Resolved runtime configuration.
#[derive(Clone, Debug)]
pub struct Context {
    pub data_dir: PathBuf,
    pub reset: bool,
    pub ephemeral: bool,
    pub log_file: Option<PathBuf>,
    pub api_listen: SocketAddr,
    pub admin_user: String,
    pub admin_pass: Option<String>,
    pub cache_ttl: Duration,
}

impl Context {
    pub fn from_cli(cli: &crate::cli::Cli) -> Self {
        Self {
            data_dir: PathBuf::from(&cli.data_dir),
            reset: cli.reset,
            ephemeral: cli.ephemeral,
            log_file: cli.log_file.as_ref().map(PathBuf::from),
            api_listen: cli.api_listen,
            admin_user: cli.admin_user.clone(),
            admin_pass: cli.admin_pass.clone().filter(|p| !p.is_empty()),
            cache_ttl: Duration::from_secs(cli.cache_ttl_secs),
        }
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join("folio.sqlite")
    }

    pub fn session_flag_path(&self) -> PathBuf {
        self.data_dir.join("admin.session")
    }

    pub fn credentials(&self) -> Credentials {
        match &self.admin_pass {
            Some(pass) => Credentials::new(&self.admin_user, pass),
            None => Credentials::disabled(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn empty_password_disables_admin() {
        let cli = crate::cli::Cli::try_parse_from(["folio", "--admin-pass", ""]).unwrap();
        let ctx = Context::from_cli(&cli);
        assert!(!ctx.credentials().is_enabled());
    }

    #[test]
    fn paths_live_under_data_dir() {
        let cli = crate::cli::Cli::try_parse_from([
            "folio",
            "--data-dir",
            "/tmp/folio-site",
            "--admin-pass",
            "pw",
            "--cache-ttl-secs",
            "5",
        ])
        .unwrap();
        let ctx = Context::from_cli(&cli);
        assert_eq!(ctx.db_path(), PathBuf::from("/tmp/folio-site/folio.sqlite"));
        assert_eq!(ctx.cache_ttl, Duration::from_secs(5));
        assert!(ctx.credentials().verify("admin", "pw"));
    }
}
