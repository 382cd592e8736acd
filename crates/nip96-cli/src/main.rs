//! nip96: command-line client for NIP-96 media servers.
//!
//! Anonymous by default. Pass `--pubkey` and `--sign-cmd` (or set NIP96_PUBKEY
//! and NIP96_SIGN_CMD) to send NIP-98 authorization with uploads and deletes.
//! Transport settings come from the NIP96_* environment variables.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use nip96_cli::{guess_content_type, init_tracing, CommandSigner};
use nip96_client::nip96_core::ClientConfig;
use nip96_client::{
    AuthHeaderGenerator, CallContext, CancellationToken, HostRouting, Nip96Client, UploadRequest,
};
use serde::Serialize;

#[derive(Parser)]
#[command(name = "nip96", about = "NIP-96 media server client")]
struct Cli {
    /// Hex public key of the signing identity
    #[arg(long, global = true, env = "NIP96_PUBKEY")]
    pubkey: Option<String>,
    /// Command that prints a hex signature for the event id given as last argument
    #[arg(long, global = true, env = "NIP96_SIGN_CMD")]
    sign_cmd: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show a server's capability document
    Info {
        /// Server base URL
        server: String,
    },
    /// Upload a file
    Upload {
        /// Server base URL
        server: String,
        /// Path to the file to upload
        file: PathBuf,
        /// Accessibility description
        #[arg(long)]
        alt: Option<String>,
        /// Mark the file as sensitive with this reason
        #[arg(long)]
        content_warning: Option<String>,
        /// Override the content type guessed from the file extension
        #[arg(long)]
        content_type: Option<String>,
    },
    /// Delete a file by its original SHA-256 hash
    Delete {
        /// Server base URL
        server: String,
        /// Hex SHA-256 of the original file
        hash: String,
        /// Content type of the file, used for the URL extension
        #[arg(long)]
        content_type: Option<String>,
    },
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize response")?;
    println!("{}", out);
    Ok(())
}

fn auth_from_args(cli: &Cli) -> anyhow::Result<AuthHeaderGenerator> {
    match (&cli.pubkey, &cli.sign_cmd) {
        (Some(pubkey), Some(command)) => {
            let signer = CommandSigner::new(pubkey, command).context("Invalid signer settings")?;
            Ok(AuthHeaderGenerator::with_signer(Arc::new(signer)))
        }
        (None, None) => Ok(AuthHeaderGenerator::unauthenticated()),
        _ => anyhow::bail!("--pubkey and --sign-cmd must be given together"),
    }
}

fn cancel_on_ctrl_c() -> CancellationToken {
    let cancel = CancellationToken::new();
    let token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, cancelling");
            token.cancel();
        }
    });
    cancel
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let config = ClientConfig::from_env().context("Invalid NIP96_* configuration")?;
    let auth = auth_from_args(&cli)?;
    let client = Nip96Client::from_config(&config, auth).context("Failed to build HTTP client")?;

    let routing = HostRouting::from_config(&config);
    let report = |fraction: f32| {
        tracing::info!(progress = %format!("{:.0}%", fraction * 100.0), "Processing");
    };
    let ctx = CallContext::default()
        .with_routing(&routing)
        .with_progress(&report)
        .with_cancel(cancel_on_ctrl_c());

    match cli.command {
        Commands::Info { server } => {
            let info = client.server_info(&server, &ctx).await?;
            print_json(&info)?;
        }
        Commands::Upload {
            server,
            file,
            alt,
            content_warning,
            content_type,
        } => {
            let handle = tokio::fs::File::open(&file)
                .await
                .with_context(|| format!("Failed to open {}", file.display()))?;
            let length = handle
                .metadata()
                .await
                .with_context(|| format!("Failed to stat {}", file.display()))?
                .len();
            let content_type = content_type.unwrap_or_else(|| guess_content_type(&file));

            let mut request = UploadRequest::new(handle, length).with_content_type(content_type);
            if let Some(alt) = alt {
                request = request.with_alt(alt);
            }
            if let Some(reason) = content_warning {
                request = request.with_content_warning(reason);
            }

            let info = client.server_info(&server, &ctx).await?;
            if let Some(content_type) = request.content_type.as_deref() {
                if !info.accepts(content_type) {
                    tracing::warn!(
                        server = %server,
                        content_type = %content_type,
                        accepted = ?info.content_types,
                        "Server does not list this content type"
                    );
                }
            }

            let result = client.upload_to(&server, request, &ctx).await?;
            print_json(&result)?;
        }
        Commands::Delete {
            server,
            hash,
            content_type,
        } => {
            let descriptor = client.discover(&server, &ctx).await?;
            let outcome = client
                .delete(&descriptor, &hash, content_type.as_deref(), &ctx)
                .await?;
            print_json(&outcome)?;
            if !outcome.succeeded {
                anyhow::bail!("Server did not confirm the deletion");
            }
        }
    }

    Ok(())
}
