pub mod keygen;
pub mod server;

use crate::cli::globals::GlobalArgs;
use anyhow::Result;
use secrecy::SecretString;

#[derive(Debug)]
pub enum Action {
    Server {
        port: u16,
        dsn: SecretString,
        cors_origin: Option<String>,
        globals: GlobalArgs,
    },
    Keygen,
}

impl Action {
    /// Run the action to completion.
    ///
    /// # Errors
    /// Returns an error if the action fails
    pub async fn execute(self) -> Result<()> {
        match self {
            Self::Server { .. } => server::handle(self).await,
            Self::Keygen => keygen::handle(),
        }
    }
}
