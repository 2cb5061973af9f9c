//! Info command implementation.

use std::fs;
use std::path::Path;

use savepak_lzw::{unwrap_frame, BitOrder};
use savepak_store::Pipeline;

use crate::utils::format_size;

pub fn cmd_info(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let data = fs::read(input)?;

    println!("Blob Information");
    println!("================");
    println!("File: {}", input.display());
    println!("Size: {}", format_size(data.len()));

    match unwrap_frame(&data) {
        Some((order, stream)) => {
            let order = match order {
                BitOrder::Lsb => "LSB-first",
                BitOrder::Msb => "MSB-first",
            };
            println!("Format: LZW-compressed ({order})");
            println!("Stream: {}", format_size(stream.len()));
        }
        None => {
            println!("Format: uncompressed (carry-through)");
        }
    }

    let mut pipeline = Pipeline::new();
    match pipeline.decompress(&data) {
        Ok(value) => {
            println!();
            println!("Contents:");
            println!("  Top-level type: {}", describe(&value));
        }
        Err(err) => {
            println!();
            println!("Contents: unreadable ({err})");
        }
    }
    Ok(())
}

fn describe(value: &savepak_msgpack::Value) -> String {
    use savepak_msgpack::Value;
    match value {
        Value::Array(items) => format!("array of {} elements", items.len()),
        Value::Map(entries) => format!("map of {} entries", entries.len()),
        Value::Str(s) => format!("string of {} bytes", s.len()),
        Value::Bin(b) => format!("binary of {} bytes", b.len()),
        other => format!("{other:?}"),
    }
}
