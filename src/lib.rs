//! # Linkfeed
//!
//! `linkfeed` is a small social-feed API: users sign up, log in and publish
//! short text posts that every authenticated user can read.
//!
//! ## Authentication
//!
//! Passwords are hashed with Argon2id and never leave the credential path.
//! Login and signup return a stateless `HS256` bearer token valid for a fixed
//! window (7 days by default). There is no server-side revocation: logging out
//! means the client discards its token.
//!
//! ## Authorization
//!
//! Every `/api/posts` route sits behind the auth guard. Only the author of a
//! post may edit or delete it; missing posts answer `404` before ownership is
//! considered, foreign posts answer `403`.

pub mod cli;
pub mod linkfeed;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_commit_hash_format() {
        if GIT_COMMIT_HASH == "unknown" {
            // Acceptable in non-git build environments
            return;
        }
        assert!(
            GIT_COMMIT_HASH.chars().all(|c| c.is_ascii_hexdigit()),
            "GIT_COMMIT_HASH should be a hex string, got: {GIT_COMMIT_HASH}"
        );
        assert!(
            GIT_COMMIT_HASH.len() >= 7,
            "GIT_COMMIT_HASH should be at least 7 characters long, got: {GIT_COMMIT_HASH}"
        );
    }
}
