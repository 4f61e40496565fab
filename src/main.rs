use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
mod auth;
use sdk_security::{ScryptConfig, Security};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "sdk-security")]
#[command(
    version,
    about = "Password hashing and passphrase encryption for backend services."
)]
struct Cli {
    /// JSON file with the scrypt configuration
    #[arg(long, global = true, value_name = "PATH", env = "SECURITY_CONFIG")]
    config: Option<PathBuf>,

    /// Dotenv file with SECURITY_* scrypt variables
    #[arg(long, global = true, value_name = "PATH", conflicts_with = "config")]
    env_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Encrypts a value with the passphrase from SECURITY_PASSPHRASE
    #[command(arg_required_else_help = true)]
    Encrypt {
        /// Unix timestamp bound into the key (default: now)
        #[arg(long, allow_hyphen_values = true)]
        timestamp: Option<i64>,
        plaintext: String,
    },

    /// Decrypts a token with the passphrase from SECURITY_PASSPHRASE
    #[command(arg_required_else_help = true)]
    Decrypt {
        /// Unix timestamp used at encryption time
        #[arg(long, allow_hyphen_values = true)]
        timestamp: i64,
        token: String,
    },

    /// Prints the HMAC-SHA256 hash of a password keyed with SECURITY_SECRET_KEY
    HashPassword,

    /// Checks a password against a stored HMAC hash
    #[command(arg_required_else_help = true)]
    VerifyPassword { stored_hash: String },

    /// Prints the scrypt hash of a password
    #[command(arg_required_else_help = true)]
    ScryptPassword {
        /// Base64 per-user salt
        #[arg(long)]
        salt: String,
    },

    /// Checks a password against a stored scrypt hash
    #[command(arg_required_else_help = true)]
    VerifyScryptPassword {
        /// Base64 per-user salt
        #[arg(long)]
        salt: String,
        stored_hash: String,
    },

    /// Prints a fresh base64 salt for scrypt hashes
    GenSalt,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn resolve_config(config: Option<&Path>, env_file: Option<&Path>) -> Result<ScryptConfig> {
    match (config, env_file) {
        (Some(path), _) => ScryptConfig::from_json_file(path),
        (None, Some(path)) => ScryptConfig::from_env_file(path),
        (None, None) => {
            dotenvy::dotenv().ok();
            ScryptConfig::from_env()
        }
    }
}

fn read_passphrase() -> Result<zeroize::Zeroizing<String>> {
    auth::read_secret(auth::PASSPHRASE_ENV, "Passphrase: ", true)
}

fn read_password() -> Result<zeroize::Zeroizing<String>> {
    auth::read_secret(auth::PASSWORD_ENV, "Password: ", false)
}

fn main() -> Result<()> {
    init_tracing();
    let args = Cli::parse();

    match args.command {
        Commands::Encrypt {
            timestamp,
            plaintext,
        } => {
            let passphrase = read_passphrase()?;
            let timestamp = timestamp.unwrap_or_else(|| chrono::Utc::now().timestamp());
            let token = sdk_security::passphrase::encrypt(&passphrase, timestamp, &plaintext)?;
            eprintln!("timestamp: {timestamp}");
            println!("{token}");
        }
        Commands::Decrypt { timestamp, token } => {
            let passphrase = read_passphrase()?;
            let plaintext = sdk_security::passphrase::decrypt(&passphrase, timestamp, &token)
                .context("decryption failed")?;
            println!("{plaintext}");
        }
        Commands::HashPassword => {
            let secret_key = auth::secret_key()?;
            let password = read_password()?;
            println!("{}", sdk_security::password::hmac::hash(&secret_key, &password)?);
        }
        Commands::VerifyPassword { stored_hash } => {
            let secret_key = auth::secret_key()?;
            let password = read_password()?;
            if !sdk_security::password::hmac::verify(&secret_key, &stored_hash, &password)? {
                bail!("password does not match");
            }
            println!("password matches");
        }
        Commands::ScryptPassword { salt } => {
            let security = Security::new(resolve_config(
                args.config.as_deref(),
                args.env_file.as_deref(),
            )?);
            let password = read_password()?;
            println!("{}", security.try_scrypt_password(&salt, &password)?);
        }
        Commands::VerifyScryptPassword { salt, stored_hash } => {
            let security = Security::new(resolve_config(
                args.config.as_deref(),
                args.env_file.as_deref(),
            )?);
            let password = read_password()?;
            if !security.compare_scrypt_password(&stored_hash, &salt, &password) {
                bail!("password does not match");
            }
            println!("password matches");
        }
        Commands::GenSalt => {
            println!("{}", sdk_security::password::generate_scrypt_salt()?);
        }
    }

    Ok(())
}
