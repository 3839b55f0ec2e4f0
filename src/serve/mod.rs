//! Static file server with preload headers.
//!
//! # Module Structure
//!
//! ```text
//! serve/
//! ├── extract    # POST /manifest: assets of a posted document
//! ├── lifecycle  # Binding, Ctrl+C shutdown
//! ├── path       # URL -> file under the site root
//! ├── response   # Response builders (files, 404, 503)
//! └── mod.rs     # Request loop and routing (this file)
//! ```
//!
//! Page requests pass through [`crate::preload::wrap`], so every response
//! for a path in the manifest carries its `Link` headers.

pub mod extract;
mod lifecycle;
mod path;
mod response;

pub use lifecycle::setup_shutdown_handler;

use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use tiny_http::{Header, Request, Server};

use crate::cache::load_manifest;
use crate::config::ServeConfig;
use crate::manifest::Manifest;
use crate::preload::{Handler, wrap};
use crate::{debug, log};

/// Threads answering requests.
const REQUEST_WORKERS: usize = 4;

/// Run the server until Ctrl+C.
pub fn run(config: &ServeConfig) -> Result<()> {
    let manifest = manifest_or_empty(&config.manifest);
    let root = config.root.clone();

    let files = move |request: Request, headers: Vec<Header>| -> Result<()> {
        serve_file(request, &root, headers)
    };
    let handler = Arc::new(wrap(manifest, files));

    let (server, addr) = lifecycle::bind_with_retry(config.interface, config.port)?;
    let server = Arc::new(server);
    lifecycle::register_server(Arc::clone(&server));

    log!("serve"; "http://{}", addr);
    run_request_loop(&server, handler)
}

/// The manifest at `path`, or an empty one (no headers) if it cannot be loaded.
fn manifest_or_empty(path: &Path) -> Arc<Manifest> {
    let name = path.to_string_lossy();
    match load_manifest(&name) {
        Ok(manifest) => {
            log!("serve"; "preloading assets for {} paths from {}", manifest.len(), name);
            manifest
        }
        Err(e) => {
            log!("serve"; "no preload headers: {}", e);
            Arc::new(Manifest::new())
        }
    }
}

fn run_request_loop<H: Handler + 'static>(server: &Server, handler: Arc<H>) -> Result<()> {
    // Use thread pool to handle requests concurrently
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(REQUEST_WORKERS)
        .thread_name(|i| format!("preload-http-{i}"))
        .build()
        .context("failed to create request thread pool")?;

    for request in server.incoming_requests() {
        let handler = Arc::clone(&handler);
        pool.spawn(move || {
            if let Err(e) = handle_request(request, handler.as_ref()) {
                log!("serve"; "request error: {e}");
            }
        });
    }

    Ok(())
}

/// Route a single HTTP request.
fn handle_request<H: Handler>(request: Request, pages: &H) -> Result<()> {
    // Early exit if shutdown requested
    if lifecycle::is_shutdown() {
        return response::respond_unavailable(request);
    }

    if extract::is_extract_request(&request) {
        return extract::handle(request);
    }

    pages.handle(request, Vec::new())
}

/// Innermost page handler: a file under `root`, or 404.
fn serve_file(request: Request, root: &Path, headers: Vec<Header>) -> Result<()> {
    match path::resolve_path(request.url(), root) {
        Some(file) => {
            debug!("serve"; "{} -> {}", request.url(), file.display());
            response::respond_file(request, &file, headers)
        }
        None => {
            debug!("serve"; "{} -> 404", request.url());
            response::respond_not_found(request, root, headers)
        }
    }
}
