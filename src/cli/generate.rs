//! `preload generate`: scan HTML sources and write a manifest.

use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::{self, BufWriter, IsTerminal};
use std::path::{Path, PathBuf};

use super::GenerateArgs;
use crate::config::PreloadConfig;
use crate::manifest::{BuildReport, Manifest, build_manifest, collect_sources};
use crate::{debug, log};

/// Run the generate command.
pub fn run(config: &PreloadConfig, args: &GenerateArgs) -> Result<()> {
    let generate = &config.generate;
    let sources = discover(&args.paths);
    debug!("generate"; "found {} sources", sources.len());

    if sources.is_empty() {
        log!("generate"; "no HTML files found");
    }

    // The progress line would interleave with a manifest printed to stdout.
    let output = generate.output_path();
    let progress = output.is_some() && io::stderr().is_terminal();

    let report = build_manifest(
        &sources,
        &generate.normalizer(),
        &generate.build_options(progress),
    )?;

    match output {
        Some(path) => write_manifest_file(&report.manifest, path)?,
        None => report.manifest.write_to(io::stdout().lock())?,
    }

    log!("generate"; "{}", summary(&report, sources.len()));
    Ok(())
}

/// Sources under `paths`, or under the current directory when none are given.
fn discover(paths: &[PathBuf]) -> Vec<PathBuf> {
    if paths.is_empty() {
        collect_sources(&[PathBuf::from(".")])
    } else {
        collect_sources(paths)
    }
}

fn write_manifest_file(manifest: &Manifest, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    manifest
        .write_to(BufWriter::new(file))
        .with_context(|| format!("Failed to write {}", path.display()))?;

    debug!("generate"; "wrote {}", path.display());
    Ok(())
}

fn summary(report: &BuildReport, sources: usize) -> String {
    let pages = report.manifest.len();
    let assets: usize = report.manifest.iter().map(|(_, assets)| assets.len()).sum();
    match report.errors.len() {
        0 => format!("{pages} pages, {assets} assets from {sources} sources"),
        failed => format!("{pages} pages, {assets} assets from {sources} sources, {failed} failed"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::{Asset, AssetKind};
    use crate::config::GenerateConfig;
    use crate::manifest::SourceError;
    use tempfile::TempDir;

    #[test]
    fn test_generate_writes_manifest_file() {
        let dir = TempDir::new().unwrap();
        let site = dir.path().join("public");
        fs::create_dir_all(site.join("docs")).unwrap();
        fs::write(
            site.join("index.html"),
            r#"<script src="/app.js"></script><script src="https://cdn.example.org/lib.js"></script>"#,
        )
        .unwrap();
        fs::write(site.join("docs/intro.html"), r#"<img src="/img/a.png">"#).unwrap();

        let output = dir.path().join("out/preload.json");
        let config = PreloadConfig {
            generate: GenerateConfig {
                strip: site.to_string_lossy().into_owned(),
                output: output.clone(),
                ..Default::default()
            },
            ..Default::default()
        };
        let args = GenerateArgs {
            paths: vec![site],
            ..Default::default()
        };

        run(&config, &args).unwrap();

        let manifest = Manifest::read_file(&output).unwrap();
        assert_eq!(manifest.paths().collect::<Vec<_>>(), ["/", "/docs/intro"]);
        assert_eq!(
            manifest.get("/").unwrap(),
            [Asset::new("/app.js", AssetKind::Script)]
        );
    }

    #[test]
    fn test_summary() {
        let mut report = BuildReport::default();
        report.manifest.insert("/", Vec::new());
        assert_eq!(summary(&report, 1), "1 pages, 0 assets from 1 sources");

        report.manifest.insert(
            "/about",
            vec![
                Asset::new("/a.css", AssetKind::Style),
                Asset::new("/b.png", AssetKind::Image),
            ],
        );

        report.errors.push(SourceError::Open {
            path: PathBuf::from("gone.html"),
            error: io::Error::from(io::ErrorKind::NotFound),
        });
        assert_eq!(summary(&report, 3), "2 pages, 2 assets from 3 sources, 1 failed");
    }
}
