//! Unpack command implementation.

use std::fs;
use std::path::Path;

use savepak_store::Pipeline;

use crate::utils::value_to_json;

pub fn cmd_unpack(
    input: &Path,
    output: Option<&Path>,
    base64: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut pipeline = Pipeline::new();
    let value = if base64 {
        let text = fs::read_to_string(input)?;
        pipeline.decompress_base64(text.trim())?
    } else {
        let data = fs::read(input)?;
        pipeline.decompress(&data)?
    };

    let json = value_to_json(&value)?;
    let rendered = serde_json::to_string_pretty(&json)?;
    match output {
        Some(path) => {
            fs::write(path, rendered)?;
            println!("Unpacked {} -> {}", input.display(), path.display());
        }
        None => println!("{rendered}"),
    }
    Ok(())
}
