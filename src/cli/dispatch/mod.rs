use crate::cli::{actions::Action, globals::GlobalArgs};
use anyhow::{anyhow, Result};
use secrecy::SecretString;

/// Turn parsed arguments into the action to run.
///
/// # Errors
/// Returns an error if a required server argument is missing
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    if matches.subcommand_name() == Some("keygen") {
        return Ok(Action::Keygen);
    }

    let jwt_secret = matches
        .get_one::<String>("jwt-secret")
        .map(|s| SecretString::from(s.as_str()))
        .ok_or_else(|| anyhow!("missing required argument: --jwt-secret"))?;

    let mut globals = GlobalArgs::new(jwt_secret);

    if let Some(ttl) = matches.get_one::<u64>("token-ttl") {
        globals.set_token_ttl(*ttl);
    }

    Ok(Action::Server {
        port: matches.get_one::<u16>("port").copied().unwrap_or(5000),
        dsn: matches
            .get_one::<String>("dsn")
            .map(|s| SecretString::from(s.as_str()))
            .ok_or_else(|| anyhow!("missing required argument: --dsn"))?,
        cors_origin: matches.get_one::<String>("cors-origin").cloned(),
        globals,
    })
}
