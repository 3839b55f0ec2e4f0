//! On-demand extraction endpoint.
//!
//! `POST /manifest` with an HTML document as the body answers with the
//! document's assets as a JSON array. Absolute URLs are left out, the same
//! as in a generated manifest.

use anyhow::{Context, Result};
use tiny_http::{Method, Request};

use super::response;
use crate::asset::{ScanOptions, scan_reader};
use crate::cli::extract::to_json;
use crate::debug;
use crate::utils::mime::types;

pub const EXTRACT_PATH: &str = "/manifest";

/// A computed answer, independent of the connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
}

impl Reply {
    fn text(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            content_type: types::PLAIN,
            body: body.into(),
        }
    }
}

pub fn is_extract_request(request: &Request) -> bool {
    request.url().split(['?', '#']).next() == Some(EXTRACT_PATH)
}

/// Answer an extraction request.
pub fn handle(mut request: Request) -> Result<()> {
    let mut body = Vec::new();
    if request.method() == &Method::Post {
        request
            .as_reader()
            .read_to_end(&mut body)
            .context("Failed to read request body")?;
    }

    let reply = reply(request.method(), &body);
    debug!("serve"; "{} {} -> {}", request.method(), request.url(), reply.status);

    response::respond_data(
        request,
        reply.status,
        reply.content_type,
        reply.body.into_bytes(),
        Vec::new(),
    )
}

/// Compute the reply for a request with `method` and `body`.
pub fn reply(method: &Method, body: &[u8]) -> Reply {
    if *method != Method::Post {
        return Reply::text(400, format!("Unsupported method {method}"));
    }

    let options = ScanOptions {
        exclude_absolute: true,
        dedup: false,
    };
    let assets = match scan_reader(body, options) {
        Ok(assets) => assets,
        Err(e) => return Reply::text(400, e.to_string()),
    };

    match to_json(&assets, false) {
        Ok(json) => Reply {
            status: 200,
            content_type: types::JSON,
            body: json,
        },
        Err(e) => Reply::text(500, e.to_string()),
    }
}
