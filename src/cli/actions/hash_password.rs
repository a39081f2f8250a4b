use crate::auth::password;
use anyhow::{bail, Context, Result};
use std::io::{self, BufRead};

/// Print the Argon2id PHC hash of the password read on stdin.
/// # Errors
/// Returns an error if stdin cannot be read, the password is empty, or hashing fails.
pub fn execute() -> Result<()> {
    let hash = hash_from(io::stdin().lock())?;
    println!("{hash}");
    Ok(())
}

/// Hash the first line of `input`, without its line terminator.
fn hash_from(mut input: impl BufRead) -> Result<String> {
    let mut line = String::new();
    input
        .read_line(&mut line)
        .context("Failed to read password from stdin")?;
    let password = line.trim_end_matches(['\r', '\n']);
    if password.is_empty() {
        bail!("Password must not be empty");
    }

    password::hash_password(password)
}
