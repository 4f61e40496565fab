use anyhow::{Result, bail};
use std::io::{self, IsTerminal};
use zeroize::Zeroizing;

pub const PASSPHRASE_ENV: &str = "SECURITY_PASSPHRASE";
pub const PASSWORD_ENV: &str = "SECURITY_PASSWORD";
pub const SECRET_KEY_ENV: &str = "SECURITY_SECRET_KEY";

/// Reads a secret from `env_var`, then piped stdin, then an interactive prompt.
///
/// An empty secret is accepted only when `allow_empty` is set and it is given
/// explicitly through `env_var`; empty or closed stdin is never taken as one.
pub fn read_secret(env_var: &str, prompt: &str, allow_empty: bool) -> Result<Zeroizing<String>> {
    //  SECURITY_PASSWORD="hunter2" sdk-security hash-password
    if let Ok(secret) = std::env::var(env_var) {
        if allow_empty || !secret.is_empty() {
            return Ok(Zeroizing::new(secret));
        }
    }

    //  printf "%s" "$SECURITY_PASSWORD" | sdk-security hash-password
    if !io::stdin().is_terminal() {
        let mut buf = Zeroizing::new(String::new());
        io::stdin().read_line(&mut buf)?;
        trim_newline(&mut buf);

        if !buf.is_empty() {
            return Ok(buf);
        }
    }

    if io::stdin().is_terminal() {
        let secret = Zeroizing::new(rpassword::prompt_password(prompt)?);
        if !secret.is_empty() {
            return Ok(secret);
        }
    }

    bail!("no value provided for {env_var}")
}

/// Secret keys are never prompted for; they only come from the environment.
pub fn secret_key() -> Result<Zeroizing<String>> {
    match std::env::var(SECRET_KEY_ENV) {
        Ok(key) => Ok(Zeroizing::new(key)),
        Err(_) => bail!("{SECRET_KEY_ENV} is not set"),
    }
}

fn trim_newline(s: &mut String) {
    while s.ends_with('\n') || s.ends_with('\r') {
        s.pop();
    }
}
