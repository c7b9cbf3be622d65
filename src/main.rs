//! hero-auth: command-line front end for the item signature authority
//!
//! Every command prints an `ApiResponse` JSON envelope on stdout and exits
//! non-zero when `success` is false.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use serde::Serialize;
use zeroize::Zeroizing;

use hero_auth::message_signer::{personal_sign, personal_sign_hash};
use hero_auth::recovery::address_from_private_key;
use hero_auth::utils::crypto::digest_hex;
use hero_auth::utils::logging;
use hero_auth::{
    log_debug, Address, ApiResponse, AuthorityConfig, AuthorityError, AuthorityResult,
    AuthorizationService, PlaceholderItemSource,
};

const MODULE: &str = "cli";

/// Signature authority for game item state
#[derive(Parser, Debug)]
#[command(name = "hero-auth")]
#[command(about = "Build EIP-712 item authorization payloads and recover personal_sign signers")]
struct Args {
    /// JSON configuration file (defaults to HERO_AUTH_* environment variables)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the typed data a client signs to authorize an item
    Payload {
        /// Decimal item id
        item_id: String,
    },

    /// Recover the address that personal-signed a message
    Verify {
        #[arg(short, long)]
        message: String,

        /// 65-byte signature as hex, `0x` optional
        #[arg(short, long)]
        signature: String,
    },

    /// Print the EIP-191 personal digest of a message
    Digest {
        #[arg(short, long)]
        message: String,
    },

    /// Personal-sign a message with a local key (development only)
    Sign {
        #[arg(short, long)]
        message: String,

        /// 32-byte private key as hex
        #[arg(short, long)]
        private_key: String,
    },
}

#[derive(Serialize)]
struct DigestOutput {
    digest: String,
}

#[derive(Serialize)]
struct SignOutput {
    signature: String,
    address: Address,
}

fn main() {
    let args = Args::parse();

    if args.verbose {
        logging::enable_debug();
    }

    let success = match args.command {
        Command::Payload { ref item_id } => emit(
            service(&args).and_then(|s| s.get_authorization_payload(item_id)),
        ),
        Command::Verify { ref message, ref signature } => emit(
            service(&args).and_then(|s| s.verify_address_binding(message, signature)),
        ),
        Command::Digest { ref message } => emit(Ok(DigestOutput {
            digest: digest_hex(&personal_sign_hash(message.as_bytes())),
        })),
        Command::Sign { ref message, ref private_key } => emit(sign(message, private_key)),
    };

    if !success {
        process::exit(1);
    }
}

fn load_config(args: &Args) -> AuthorityResult<AuthorityConfig> {
    match args.config {
        Some(ref path) => {
            log_debug!(MODULE, "Loading configuration file", path = path.display());
            AuthorityConfig::from_file_with_env(path)
        }
        None => AuthorityConfig::from_env(),
    }
}

fn service(args: &Args) -> AuthorityResult<AuthorizationService<PlaceholderItemSource>> {
    AuthorizationService::new(load_config(args)?, PlaceholderItemSource)
}

fn sign(message: &str, private_key_hex: &str) -> AuthorityResult<SignOutput> {
    let trimmed = private_key_hex.trim();
    let stripped = trimmed.strip_prefix("0x").unwrap_or(trimmed);
    let key = Zeroizing::new(
        hex::decode(stripped)
            .map_err(|_| AuthorityError::invalid_input("private key is not valid hex"))?,
    );

    let signature = personal_sign(message.as_bytes(), &key)?;
    let address = address_from_private_key(&key)?;

    Ok(SignOutput {
        signature: signature.to_hex(),
        address,
    })
}

/// Print the envelope and report whether the command succeeded
fn emit<T: Serialize>(result: AuthorityResult<T>) -> bool {
    let response = match result {
        Ok(data) => ApiResponse::ok(data),
        Err(e) => ApiResponse::err(e),
    };
    println!("{}", response.to_json());
    response.success
}
