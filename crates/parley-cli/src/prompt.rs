//! Reading secrets from the user.

use std::io::{self, BufRead, IsTerminal};

/// Read a secret without echo when stdin is a terminal, otherwise take the
/// next stdin line so scripts can pipe it in.
pub fn read_secret(label: &str) -> io::Result<String> {
    if io::stdin().is_terminal() {
        return rpassword::prompt_password(label);
    }
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
