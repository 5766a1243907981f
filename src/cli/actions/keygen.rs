use anyhow::Result;
use rand::{rngs::OsRng, RngCore};
use std::io::Write;

const SECRET_BYTES: usize = 64;

/// A hex-encoded random signing secret.
#[must_use]
pub fn generate_secret() -> String {
    let mut bytes = [0u8; SECRET_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Handle the keygen action
///
/// # Errors
/// Returns an error if stdout is not writable
pub fn handle() -> Result<()> {
    let secret = generate_secret();
    let mut out = std::io::stdout().lock();
    writeln!(out, "{secret}")?;
    writeln!(out)?;
    writeln!(out, "Add to your environment:")?;
    writeln!(out, "LINKFEED_JWT_SECRET={secret}")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linkfeed::token::{TokenService, DEFAULT_TOKEN_TTL_SECONDS};
    use secrecy::SecretString;

    #[test]
    fn test_generate_secret() {
        let secret = generate_secret();
        assert_eq!(secret.len(), SECRET_BYTES * 2);
        assert!(secret.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(secret, generate_secret());
    }

    #[test]
    fn test_generated_secret_is_accepted() {
        let tokens =
            TokenService::new(SecretString::from(generate_secret()), DEFAULT_TOKEN_TTL_SECONDS);
        assert!(tokens.is_ok());
    }
}
