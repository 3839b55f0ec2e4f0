//! Request middleware that adds preload headers before the wrapped handler.

use std::sync::Arc;

use anyhow::Result;
use tiny_http::{Header, Request};

use super::{RequestMeta, preload_headers};
use crate::manifest::Manifest;

/// A request handler in a middleware chain.
///
/// `headers` are extra response headers collected by earlier links of the
/// chain; the handler that finally responds must include them.
pub trait Handler: Send + Sync {
    fn handle(&self, request: Request, headers: Vec<Header>) -> Result<()>;
}

impl<F> Handler for F
where
    F: Fn(Request, Vec<Header>) -> Result<()> + Send + Sync,
{
    fn handle(&self, request: Request, headers: Vec<Header>) -> Result<()> {
        self(request, headers)
    }
}

/// Handler adding `Link` preload headers for paths found in a manifest.
pub struct PreloadHandler<H> {
    manifest: Arc<Manifest>,
    next: H,
}

/// Wrap `next` so that requests matching `manifest` get preload headers.
///
/// The wrapper never responds on its own and always calls `next`.
pub fn wrap<H: Handler>(manifest: Arc<Manifest>, next: H) -> PreloadHandler<H> {
    PreloadHandler { manifest, next }
}

impl<H: Handler> Handler for PreloadHandler<H> {
    fn handle(&self, request: Request, mut headers: Vec<Header>) -> Result<()> {
        let meta = RequestMeta::from_request(&request);
        if let Some(preload) = preload_headers(&self.manifest, &meta) {
            headers.extend(preload);
        }
        self.next.handle(request, headers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preload::{ASSOCIATED_CONTENT, LINK};
    use parking_lot::Mutex;
    use tiny_http::{Response, TestRequest};

    /// Headers seen by the inner handler, per call.
    type Seen = Arc<Mutex<Vec<Vec<(String, String)>>>>;

    fn recorder(seen: Seen) -> impl Handler {
        move |request: Request, headers: Vec<Header>| -> Result<()> {
            seen.lock().push(
                headers
                    .iter()
                    .map(|h| (h.field.to_string(), h.value.to_string()))
                    .collect(),
            );
            let mut response = Response::from_string("body");
            for header in headers {
                response.add_header(header);
            }
            request.respond(response)?;
            Ok(())
        }
    }

    fn manifest() -> Arc<Manifest> {
        Arc::new(
            Manifest::from_json(
                r#"{
                    "/abs": [
                        {"url": "http://example.org/app.css", "type": "style"},
                        {"url": "http://example.org/app.js"}
                    ],
                    "/rel": [{"url": "/app.js"}],
                    "/empty": []
                }"#,
            )
            .unwrap(),
        )
    }

    fn request(path: &str) -> Request {
        TestRequest::new()
            .with_path(path)
            .with_header(Header::from_bytes("Host", "h").unwrap())
            .into()
    }

    fn links(headers: &[(String, String)]) -> Vec<&str> {
        headers
            .iter()
            .filter(|(name, _)| name.eq_ignore_ascii_case(LINK))
            .map(|(_, value)| value.as_str())
            .collect()
    }

    #[test]
    fn test_wrapped_handler_always_runs() {
        let seen = Seen::default();
        let handler = wrap(manifest(), recorder(Arc::clone(&seen)));

        for path in ["/abs", "/rel", "/empty", "/other"] {
            handler.handle(request(path), Vec::new()).unwrap();
        }

        let seen = seen.lock();
        assert_eq!(seen.len(), 4);
        assert_eq!(
            links(&seen[0]),
            [
                "<http://example.org/app.css>; rel=preload; as=style",
                "<http://example.org/app.js>; rel=preload",
            ]
        );
        assert_eq!(links(&seen[1]), ["<http://h/app.js>; rel=preload"]);
        assert!(seen[2].is_empty());
        assert!(seen[3].is_empty());
    }

    #[test]
    fn test_associated_content_pairs() {
        let seen = Seen::default();
        let handler = wrap(manifest(), recorder(Arc::clone(&seen)));
        handler.handle(request("/rel"), Vec::new()).unwrap();

        let seen = seen.lock();
        let names: Vec<_> = seen[0].iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, [LINK, ASSOCIATED_CONTENT]);
        assert_eq!(seen[0][1].1, "\"http://h/app.js\"");
    }

    #[test]
    fn test_forwarded_proto_and_query() {
        let seen = Seen::default();
        let handler = wrap(manifest(), recorder(Arc::clone(&seen)));
        let request: Request = TestRequest::new()
            .with_path("/rel?utm=1")
            .with_header(Header::from_bytes("Host", "example.org").unwrap())
            .with_header(Header::from_bytes("X-Forwarded-Proto", "https").unwrap())
            .into();

        handler.handle(request, Vec::new()).unwrap();
        assert_eq!(
            links(&seen.lock()[0]),
            ["<https://example.org/app.js>; rel=preload"]
        );
    }

    #[test]
    fn test_keeps_upstream_headers() {
        let seen = Seen::default();
        let handler = wrap(manifest(), recorder(Arc::clone(&seen)));
        let upstream = vec![Header::from_bytes("X-Upstream", "1").unwrap()];

        handler.handle(request("/rel"), upstream).unwrap();
        let seen = seen.lock();
        assert_eq!(seen[0][0], ("X-Upstream".to_string(), "1".to_string()));
        assert_eq!(seen[0].len(), 3);
    }

    #[test]
    fn test_nested_wrappers() {
        let seen = Seen::default();
        let inner = wrap(manifest(), recorder(Arc::clone(&seen)));
        let outer = wrap(manifest(), inner);

        outer.handle(request("/rel"), Vec::new()).unwrap();
        assert_eq!(links(&seen.lock()[0]).len(), 2);
    }
}
