use anyhow::Context;
use clap::Subcommand;
use serde_json::{json, Map};

use crate::auth::Passwords;
use crate::cli::output::{output_error, output_result};
use crate::cli::OutputFormat;
use crate::config;

#[derive(Subcommand)]
pub enum PasswordCommands {
    #[command(about = "Hash a plaintext password with the configured Argon2 parameters")]
    Hash {
        #[arg(help = "Plaintext password")]
        plaintext: String,
    },

    #[command(about = "Check a plaintext password against a stored hash")]
    Verify {
        #[arg(help = "Plaintext password")]
        plaintext: String,
        #[arg(help = "PHC-formatted hash")]
        hash: String,
    },
}

pub async fn handle(cmd: PasswordCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let passwords = Passwords::from_config(&config::config().security)
        .context("invalid Argon2 parameters")?;

    match cmd {
        PasswordCommands::Hash { plaintext } => {
            let hash = tokio::task::spawn_blocking(move || passwords.hash(&plaintext)).await??;
            let mut data = Map::new();
            data.insert("hash".into(), json!(hash));
            output_result(output_format, &hash, data)
        }
        PasswordCommands::Verify { plaintext, hash } => {
            let matches =
                tokio::task::spawn_blocking(move || passwords.verify(&plaintext, &hash)).await?;
            if !matches {
                output_error(output_format, "Password does not match")?;
                anyhow::bail!("password does not match");
            }
            let mut data = Map::new();
            data.insert("matches".into(), json!(true));
            output_result(output_format, "Password matches", data)
        }
    }
}
