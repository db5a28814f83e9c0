//! folio-hash: create and check admin password hashes.
//!
//! `folio-hash hash` prints an Argon2id PHC string for `ADMIN_PASSWORD_HASH`.
//! When `--password` is omitted the password is read from the first line of
//! stdin, which keeps it out of shell history.

use clap::{Parser, Subcommand};
use folio_crypto::{hash_password, verify_password};
use std::io::BufRead;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "folio-hash")]
#[command(author, version, about = "Admin password hashes for folio")]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Hash a password for ADMIN_PASSWORD_HASH
    Hash {
        /// Password to hash (read from stdin when omitted)
        #[arg(short, long)]
        password: Option<String>,
    },

    /// Check a password against a hash
    Verify {
        /// PHC hash string ($argon2id$...)
        #[arg(long)]
        hash: String,

        /// Password to check (read from stdin when omitted)
        #[arg(short, long)]
        password: Option<String>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<bool, Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Hash { password } => {
            let password = password_or_stdin(password)?;
            println!("{}", hash_password(&password)?);
            Ok(true)
        }
        Commands::Verify { hash, password } => {
            let password = password_or_stdin(password)?;
            let matches = verify_password(&password, &hash)?;
            if matches {
                println!("Password matches.");
            } else {
                println!("Password does not match.");
            }
            Ok(matches)
        }
    }
}

fn password_or_stdin(password: Option<String>) -> Result<String, Box<dyn std::error::Error>> {
    if let Some(password) = password {
        return Ok(password);
    }
    eprintln!("Password: ");
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    let password = line.trim_end_matches(['\r', '\n']).to_string();
    if password.is_empty() {
        return Err("no password given".into());
    }
    Ok(password)
}
