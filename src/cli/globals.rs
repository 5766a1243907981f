use crate::linkfeed::token::DEFAULT_TOKEN_TTL_SECONDS;
use secrecy::SecretString;

/// Settings shared by everything that issues or verifies tokens.
#[derive(Debug, Clone)]
pub struct GlobalArgs {
    pub jwt_secret: SecretString,
    pub token_ttl_seconds: u64,
}

impl GlobalArgs {
    #[must_use]
    pub const fn new(jwt_secret: SecretString) -> Self {
        Self {
            jwt_secret,
            token_ttl_seconds: DEFAULT_TOKEN_TTL_SECONDS,
        }
    }

    pub fn set_token_ttl(&mut self, seconds: u64) {
        self.token_ttl_seconds = seconds;
    }
}
