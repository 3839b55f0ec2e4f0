//! `preload extract`: print the assets of one HTML document.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{self, BufReader, Read, Write};

use super::ExtractArgs;
use crate::asset::{Asset, ScanOptions, scan_reader};
use crate::debug;

/// Run the extract command.
pub fn run(args: &ExtractArgs) -> Result<()> {
    let options = ScanOptions {
        exclude_absolute: !args.keep_absolute,
        dedup: args.dedup,
    };

    let assets = match args.input() {
        Some(path) => {
            let file =
                File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
            extract(BufReader::new(file), options)
                .with_context(|| format!("Failed to scan {}", path.display()))?
        }
        None => extract(io::stdin().lock(), options).context("Failed to scan stdin")?,
    };

    debug!("extract"; "{} assets", assets.len());

    let json = to_json(&assets, args.compact)?;
    let mut out = io::stdout().lock();
    writeln!(out, "{json}")?;
    out.flush()?;
    Ok(())
}

fn extract(reader: impl Read, options: ScanOptions) -> Result<Vec<Asset>> {
    Ok(scan_reader(reader, options)?)
}

/// JSON array of assets, indented unless `compact`.
pub fn to_json(assets: &[Asset], compact: bool) -> Result<String> {
    let json = if compact {
        serde_json::to_string(assets)?
    } else {
        serde_json::to_string_pretty(assets)?
    };
    Ok(json)
}
