//! Pack command implementation.

use std::fs;
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use savepak_lzw::BitOrder;
use savepak_store::{Pipeline, PipelineOptions};

use crate::utils::{format_size, json_to_value};

pub fn cmd_pack(
    input: &Path,
    output: Option<&Path>,
    msb: bool,
    base64: bool,
    soft_cap: Option<usize>,
) -> Result<(), Box<dyn std::error::Error>> {
    let text = fs::read_to_string(input)?;
    let json: serde_json::Value = serde_json::from_str(&text)?;
    let value = json_to_value(&json)?;

    let mut options = PipelineOptions::default();
    if msb {
        options.order = BitOrder::Msb;
    }
    if let Some(cap) = soft_cap {
        options.soft_cap = cap;
    }
    let mut pipeline = Pipeline::with_options(options);

    let out_path: PathBuf = match output {
        Some(path) => path.to_path_buf(),
        None => input.with_extension(if base64 { "pak64" } else { "pak" }),
    };

    let packed = pipeline.compress(&value)?;
    if base64 {
        fs::write(&out_path, BASE64.encode(&packed.data))?;
    } else {
        fs::write(&out_path, &packed.data)?;
    }

    println!("Packed {} -> {}", input.display(), out_path.display());
    println!("  Serialized: {}", format_size(packed.raw_len));
    println!("  Stored:     {}", format_size(packed.packed_len));
    println!("  Ratio:      {:.3}", packed.ratio);
    if packed.ratio >= 1.0 && packed.raw_len > pipeline.options().soft_cap {
        println!("  (soft cap exceeded; stored uncompressed)");
    }
    Ok(())
}
