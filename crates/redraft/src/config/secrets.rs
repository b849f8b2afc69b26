//! Api key lookup in the user's netrc-style secrets file.

use std::path::Path;

use tracing::debug;

/// Host the provider credentials are stored under.
pub const CREDENTIALS_HOST: &str = "api.openai.com";

/// Scan a netrc-style file for the provider api key.
///
/// Only single-line entries of the exact form
/// `machine api.openai.com login apikey password <value>` count, matching
/// how the key is provisioned. Tokens are split on single spaces; lines
/// with fewer than six tokens or different leading tokens are ignored
/// without error. The first match wins.
pub fn load_api_key(path: &Path) -> Option<String> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) => {
            debug!(path = %path.display(), error = %e, "No readable credentials file");
            return None;
        }
    };

    for line in raw.lines() {
        if let Some(key) = parse_credentials_line(line) {
            debug!(path = %path.display(), "Found provider api key");
            return Some(key.to_string());
        }
    }

    debug!(path = %path.display(), host = CREDENTIALS_HOST, "No credentials entry for host");
    None
}

fn parse_credentials_line(line: &str) -> Option<&str> {
    let tokens: Vec<&str> = line.split(' ').collect();
    if tokens.len() < 6 {
        return None;
    }
    let matches = tokens[0] == "machine"
        && tokens[1] == CREDENTIALS_HOST
        && tokens[2] == "login"
        && tokens[3] == "apikey"
        && tokens[4] == "password"
        && !tokens[5].is_empty();
    matches.then_some(tokens[5])
}
