//! HTTP response handlers.
//!
//! Every handler that answers a page request takes the `headers` collected
//! by the middleware chain and sends them with the response.

use anyhow::{Context, Result};
use std::fs;
use std::io::Read;
use std::path::Path;
use tiny_http::{Header, Method, Request, Response, StatusCode};

use crate::utils::html::escape;
use crate::utils::mime::{self, types};

/// Respond with a static file.
pub fn respond_file(request: Request, path: &Path, headers: Vec<Header>) -> Result<()> {
    let content_type = mime::from_path(path);

    if is_head_request(&request) {
        return send_head(request, 200, content_type, headers);
    }

    // Check for Range header (video/audio seeking)
    if let Some(range) = get_range_header(&request) {
        let file_size = fs::metadata(path)?.len();
        if file_size > 0 {
            return respond_range(request, path, content_type, &range, file_size, headers);
        }
    }

    let body = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    send_body(request, 200, content_type, body, headers)
}

/// Handle Range request for media files (video/audio seeking).
fn respond_range(
    request: Request,
    path: &Path,
    content_type: &'static str,
    range: &str,
    file_size: u64,
    headers: Vec<Header>,
) -> Result<()> {
    use std::io::{Seek, SeekFrom};

    let range = range.strip_prefix("bytes=").unwrap_or(range);
    let (start, end) = parse_range(range, file_size);
    let length = end - start + 1;

    // Stream the requested range - no memory allocation for large ranges
    let mut file = fs::File::open(path)?;
    file.seek(SeekFrom::Start(start))?;
    let reader = file.take(length);

    let mut response = Response::new(StatusCode(206), Vec::new(), reader, Some(length as usize), None);
    add_header(&mut response, "Content-Type", content_type);
    add_header(&mut response, "Content-Range", &format!("bytes {start}-{end}/{file_size}"));
    add_header(&mut response, "Accept-Ranges", "bytes");
    for header in headers {
        response.add_header(header);
    }

    request.respond(response)?;
    Ok(())
}

/// Parse Range header value "start-end" into inclusive (start, end) bytes.
///
/// `file_size` must be non-zero. Unparsable or out-of-bounds ranges cover
/// the whole file.
fn parse_range(range: &str, file_size: u64) -> (u64, u64) {
    let last = file_size - 1;
    let parts: Vec<&str> = range.trim().split('-').map(str::trim).collect();

    let (start, end) = match parts.as_slice() {
        // "0-499" - specific range
        [s, e] if !s.is_empty() && !e.is_empty() => {
            let start: u64 = s.parse().unwrap_or(0);
            let end: u64 = e.parse().unwrap_or(last);
            (start, end.min(last))
        }
        // "0-" - from start to end
        [s, ""] if !s.is_empty() => (s.parse().unwrap_or(0), last),
        // "-500" - last 500 bytes
        ["", e] if !e.is_empty() => {
            let suffix: u64 = e.parse().unwrap_or(0);
            (file_size.saturating_sub(suffix), last)
        }
        _ => (0, last),
    };

    if start > end { (0, last) } else { (start, end) }
}

/// Extract Range header from request.
fn get_range_header(request: &Request) -> Option<String> {
    request
        .headers()
        .iter()
        .find(|h| h.field.as_str().as_str().eq_ignore_ascii_case("range"))
        .map(|h| h.value.to_string())
}

/// Respond with 404 page (the site's `404.html` if present).
pub fn respond_not_found(request: Request, root: &Path, headers: Vec<Header>) -> Result<()> {
    let custom_404 = root.join("404.html");

    if is_head_request(&request) {
        return send_head(request, 404, types::HTML, headers);
    }

    if let Ok(body) = fs::read(&custom_404) {
        return send_body(request, 404, types::HTML, body, headers);
    }

    let body = format!(
        "<html><body><h1>404 Not Found</h1><p>{}</p></body></html>",
        escape(request.url())
    );
    send_body(request, 404, types::HTML, body.into_bytes(), headers)
}

/// Respond with 503 Service Unavailable (server shutting down).
pub fn respond_unavailable(request: Request) -> Result<()> {
    send_body(request, 503, types::PLAIN, b"503 Service Unavailable".to_vec(), Vec::new())
}

/// Respond with an in-memory body.
pub fn respond_data(
    request: Request,
    status: u16,
    content_type: &str,
    body: Vec<u8>,
    headers: Vec<Header>,
) -> Result<()> {
    send_body(request, status, content_type, body, headers)
}

pub fn is_head_request(request: &Request) -> bool {
    request.method() == &Method::Head
}

fn send_head(
    request: Request,
    status: u16,
    content_type: &str,
    headers: Vec<Header>,
) -> Result<()> {
    let mut response = Response::empty(StatusCode(status));
    add_header(&mut response, "Content-Type", content_type);
    for header in headers {
        response.add_header(header);
    }
    request.respond(response)?;
    Ok(())
}

fn send_body(
    request: Request,
    status: u16,
    content_type: &str,
    body: Vec<u8>,
    headers: Vec<Header>,
) -> Result<()> {
    let mut response = Response::from_data(body).with_status_code(StatusCode(status));
    add_header(&mut response, "Content-Type", content_type);
    for header in headers {
        response.add_header(header);
    }
    request.respond(response)?;
    Ok(())
}

/// Add a header built from static parts; values that are not valid header
/// bytes are dropped.
fn add_header<R: Read>(response: &mut Response<R>, key: &str, value: &str) {
    if let Ok(header) = Header::from_bytes(key, value) {
        response.add_header(header);
    }
}
