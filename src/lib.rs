//! htrealm - Apache htpasswd/htgroup authentication
//!
//! Authenticates users and resolves group membership against Apache-style
//! `htpasswd`/`htgroup` flat files. Parsed file state is cached per path and
//! re-read only when the file's modification time changes; a file that turns
//! transiently unreadable is served from the last good parse instead of
//! failing lookups.
//!
//! Supported password schemes: Apache MD5-crypt (`$apr1$`), unsalted SHA-1
//! (`{SHA}`), and unix crypt(3) including its `$id$` extended forms. bcrypt
//! entries are recognized and rejected with a distinct error.
//!
//! The typical entry point is [`realm::HtRealm`]; the stores and cache
//! underneath are public for hosts that need finer-grained access.

pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod hash;
pub mod htfile;
pub mod logging;
pub mod realm;

pub use cache::{CacheError, CachedHtFile};
pub use htfile::{HtFile, HtGroupFile, HtPasswdFile};
pub use realm::{AuthError, GroupInfo, HtRealm, LookupError, Principal, UserInfo};

use std::io::BufRead;

use anyhow::{bail, Context, Result};

use cli::{Cli, Command};
use config::RealmConfig;
use error::ExitCode;

/// Run the CLI against a realm built from its arguments.
///
/// Returns the exit code for expected outcomes (including rejected
/// credentials and unknown names); `Err` is reserved for setup problems.
pub fn run_app(cli: Cli) -> Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet);

    let config = match (&cli.config, &cli.passwd_file) {
        (Some(path), _) => RealmConfig::load(path)?,
        (None, Some(passwd_file)) => RealmConfig {
            passwd_file: passwd_file.clone(),
            group_file: cli.group_file.clone(),
        },
        (None, None) => bail!("no htpasswd file given (use --passwd-file or --config)"),
    };
    let realm = HtRealm::from_config(&config);

    let code = match cli.command {
        Command::Check { user, password } => {
            let password = match password {
                Some(password) => password,
                None => read_password_from_stdin()?,
            };
            match realm.authenticate(&user, &password) {
                Ok(principal) => {
                    println!("ok: {}", format_groups(&principal.groups));
                    ExitCode::Success
                }
                Err(err) => {
                    eprintln!("{err}");
                    ExitCode::InvalidCredentials
                }
            }
        }
        Command::User { name } => match realm.lookup_user(&name) {
            Ok(user) => {
                println!("{}: {}", user.username, format_groups(&user.groups));
                ExitCode::Success
            }
            Err(err) => {
                eprintln!("{err}");
                ExitCode::NotFound
            }
        },
        Command::Group { name } => match realm.lookup_group(&name) {
            Ok(group) => {
                println!("{}: {}", group.name, group.members.join(" "));
                ExitCode::Success
            }
            Err(err) => {
                eprintln!("{err}");
                ExitCode::NotFound
            }
        },
    };
    Ok(code)
}

fn read_password_from_stdin() -> Result<String> {
    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .context("failed to read password from stdin")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn format_groups(groups: &std::collections::BTreeSet<String>) -> String {
    if groups.is_empty() {
        "no groups".to_string()
    } else {
        groups
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" ")
    }
}
