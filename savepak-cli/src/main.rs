//! Savepak CLI - player save blob tooling
//!
//! Packs JSON documents into savepak blobs, unpacks blobs back to JSON,
//! and inspects blob headers.

mod commands;
mod utils;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use commands::{cmd_info, cmd_pack, cmd_unpack};

#[derive(Parser)]
#[command(name = "savepak")]
#[command(author, version, about = "Player save blob packer and inspector")]
#[command(long_about = "
Savepak serializes game values to MessagePack, compresses them with LZW
behind a self-describing header, and fits the result into a per-player
storage budget.

Examples:
  savepak pack profile.json
  savepak pack profile.json -o profile.pak --msb
  savepak pack profile.json --base64
  savepak unpack profile.pak
  savepak unpack profile.pak -o restored.json
  savepak info profile.pak
")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Pack a JSON document into a blob
    #[command(alias = "p")]
    Pack {
        /// JSON file to pack
        input: PathBuf,

        /// Output file (default: input with .pak extension)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Use MSB-first bit packing
        #[arg(long)]
        msb: bool,

        /// Wrap the blob in standard base64
        #[arg(long)]
        base64: bool,

        /// Serialized size above which compression is skipped
        #[arg(long)]
        soft_cap: Option<usize>,
    },

    /// Unpack a blob back to JSON
    #[command(alias = "u")]
    Unpack {
        /// Blob file to unpack
        input: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Treat the input as base64 text
        #[arg(long)]
        base64: bool,
    },

    /// Inspect a blob header without unpacking it
    #[command(alias = "i")]
    Info {
        /// Blob file to inspect
        input: PathBuf,
    },
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Pack {
            input,
            output,
            msb,
            base64,
            soft_cap,
        } => cmd_pack(&input, output.as_deref(), msb, base64, soft_cap),
        Commands::Unpack {
            input,
            output,
            base64,
        } => cmd_unpack(&input, output.as_deref(), base64),
        Commands::Info { input } => cmd_info(&input),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
