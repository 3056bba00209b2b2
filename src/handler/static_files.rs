//! Static file serving module
//!
//! Resolves request paths against the asset root and builds file responses
//! with content-type inference, cache validators, and range support.

use crate::config::SiteContext;
use crate::handler::router::RequestContext;
use crate::http::{self, cache, mime, range::RangeParseResult};
use crate::logger;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use percent_encoding::percent_decode_str;
use std::path::{Component, Path, PathBuf};
use tokio::fs;

/// Serve the default document for the root path.
///
/// This is the explicit `/` override. If the default document itself is
/// missing the response is the ordinary not-found response.
pub async fn serve_default_document(
    ctx: &RequestContext<'_>,
    site: &SiteContext,
) -> Response<Full<Bytes>> {
    let path = site.root.join(&site.default_document);
    match load_file(&path).await {
        Some((content, content_type)) => build_file_response(ctx, &content, content_type),
        None => http::build_404_response(),
    }
}

/// Serve any other path by generic resolution under the asset root.
pub async fn serve_asset(ctx: &RequestContext<'_>, site: &SiteContext) -> Response<Full<Bytes>> {
    match resolve(site, ctx.path) {
        Some(path) => match load_file(&path).await {
            Some((content, content_type)) => build_file_response(ctx, &content, content_type),
            None => http::build_404_response(),
        },
        None => http::build_404_response(),
    }
}

/// Map a request path to a file under the asset root.
///
/// Returns `None` for everything that must answer 404: unknown files,
/// undecodable paths, and any path whose canonical form leaves the root.
/// Directory paths fall through to the default document inside them.
pub fn resolve(site: &SiteContext, request_path: &str) -> Option<PathBuf> {
    let decoded = percent_decode_str(request_path).decode_utf8().ok()?;
    let relative = decoded.trim_start_matches('/');

    // Parent segments are rejected before the path ever touches the
    // filesystem; percent-decoding above means encoded `..` lands here too.
    if Path::new(relative)
        .components()
        .any(|c| matches!(c, Component::ParentDir))
    {
        logger::log_warning(&format!("Path traversal attempt blocked: {request_path}"));
        return None;
    }

    let mut path = site.root.join(relative);
    if path.is_dir() {
        path = path.join(&site.default_document);
    }

    // Canonicalize and re-check containment as a backstop, so a symlink
    // pointing outside the root is never followed out of it.
    let canonical = path.canonicalize().ok()?;
    if !canonical.starts_with(&site.root) {
        logger::log_warning(&format!(
            "Path traversal attempt blocked: {request_path} -> {}",
            canonical.display()
        ));
        return None;
    }

    Some(canonical)
}

/// Read a file and infer its content type from the extension.
async fn load_file(path: &Path) -> Option<(Vec<u8>, &'static str)> {
    if !path.is_file() {
        return None;
    }

    let content = match fs::read(path).await {
        Ok(c) => c,
        Err(e) => {
            logger::log_error(&format!("Failed to read file '{}': {e}", path.display()));
            return None;
        }
    };

    let content_type = mime::get_content_type(path.extension().and_then(|e| e.to_str()));

    Some((content, content_type))
}

/// Build the response for a loaded file: 304 for a matching `If-None-Match`,
/// 206/416 for range requests, otherwise a full 200.
fn build_file_response(
    ctx: &RequestContext<'_>,
    data: &[u8],
    content_type: &'static str,
) -> Response<Full<Bytes>> {
    let etag = cache::generate_etag(data);
    let total_size = data.len();

    if cache::check_etag_match(ctx.if_none_match.as_deref(), &etag) {
        return http::build_304_response(&etag);
    }

    match http::parse_range_header(ctx.range_header.as_deref(), total_size) {
        RangeParseResult::Valid(range) => {
            let start = range.start;
            let end = range.end_position(total_size);

            let body = if ctx.is_head {
                Bytes::new()
            } else {
                Bytes::from(data[start..=end].to_vec())
            };

            http::response::build_partial_response(
                body,
                content_type,
                &etag,
                start,
                end,
                total_size,
                ctx.is_head,
            )
        }
        RangeParseResult::NotSatisfiable => http::build_416_response(total_size),
        RangeParseResult::None => {
            let body = if ctx.is_head {
                Bytes::new()
            } else {
                Bytes::from(data.to_owned())
            };

            http::response::build_cached_response(body, content_type, &etag, ctx.is_head)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use std::fs as std_fs;
    use tempfile::TempDir;

    fn scoreboard_site() -> (TempDir, SiteContext) {
        let dir = tempfile::tempdir().unwrap();
        std_fs::write(dir.path().join("index.html"), "<html>OK</html>").unwrap();
        std_fs::create_dir(dir.path().join("js")).unwrap();
        std_fs::write(
            dir.path().join("js").join("scorer.js"),
            "var shots = [];\n",
        )
        .unwrap();

        let site = SiteContext {
            root: dir.path().canonicalize().unwrap(),
            default_document: "index.html".to_string(),
        };
        (dir, site)
    }

    fn ctx(path: &str) -> RequestContext<'_> {
        RequestContext {
            path,
            is_head: false,
            if_none_match: None,
            range_header: None,
        }
    }

    #[test]
    fn test_resolve_existing_file() {
        let (_dir, site) = scoreboard_site();
        let path = resolve(&site, "/js/scorer.js").unwrap();
        assert_eq!(path, site.root.join("js").join("scorer.js"));
    }

    #[test]
    fn test_resolve_missing_file() {
        let (_dir, site) = scoreboard_site();
        assert!(resolve(&site, "/missing.txt").is_none());
    }

    #[test]
    fn test_resolve_directory_uses_default_document() {
        let (_dir, site) = scoreboard_site();
        std_fs::write(site.root.join("js").join("index.html"), "js index").unwrap();
        let path = resolve(&site, "/js/").unwrap();
        assert_eq!(path, site.root.join("js").join("index.html"));
    }

    #[test]
    fn test_resolve_blocks_traversal() {
        let (_dir, site) = scoreboard_site();
        assert!(resolve(&site, "/../server.js").is_none());
        assert!(resolve(&site, "/js/../../etc/passwd").is_none());
    }

    #[test]
    fn test_resolve_blocks_encoded_traversal() {
        let (_dir, site) = scoreboard_site();
        assert!(resolve(&site, "/%2e%2e/server.js").is_none());
        assert!(resolve(&site, "/js/%2e%2e/%2e%2e/server.js").is_none());
    }

    #[tokio::test]
    async fn test_serve_asset_returns_file_bytes() {
        let (_dir, site) = scoreboard_site();
        let resp = serve_asset(&ctx("/js/scorer.js"), &site).await;
        assert_eq!(resp.status(), 200);
        assert_eq!(resp.headers()["Content-Type"], "application/javascript");
        let body = resp.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"var shots = [];\n");
    }

    #[tokio::test]
    async fn test_serve_asset_missing_is_404() {
        let (_dir, site) = scoreboard_site();
        let resp = serve_asset(&ctx("/missing.txt"), &site).await;
        assert_eq!(resp.status(), 404);
    }

    #[tokio::test]
    async fn test_serve_asset_traversal_is_404() {
        let (_dir, site) = scoreboard_site();
        let resp = serve_asset(&ctx("/../server.js"), &site).await;
        assert_eq!(resp.status(), 404);
    }

    #[tokio::test]
    async fn test_serve_default_document() {
        let (_dir, site) = scoreboard_site();
        let resp = serve_default_document(&ctx("/"), &site).await;
        assert_eq!(resp.status(), 200);
        let body = resp.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"<html>OK</html>");
    }

    #[tokio::test]
    async fn test_serve_default_document_missing_is_404() {
        let dir = tempfile::tempdir().unwrap();
        let site = SiteContext {
            root: dir.path().canonicalize().unwrap(),
            default_document: "index.html".to_string(),
        };
        let resp = serve_default_document(&ctx("/"), &site).await;
        assert_eq!(resp.status(), 404);
    }

    #[tokio::test]
    async fn test_head_has_empty_body_and_full_length() {
        let (_dir, site) = scoreboard_site();
        let head_ctx = RequestContext {
            path: "/index.html",
            is_head: true,
            if_none_match: None,
            range_header: None,
        };
        let resp = serve_asset(&head_ctx, &site).await;
        assert_eq!(resp.status(), 200);
        assert_eq!(
            resp.headers()["Content-Length"],
            "<html>OK</html>".len().to_string().as_str()
        );
        let body = resp.into_body().collect().await.unwrap().to_bytes();
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn test_conditional_request_returns_304() {
        let (_dir, site) = scoreboard_site();
        let first = serve_asset(&ctx("/index.html"), &site).await;
        let etag = first.headers()["ETag"].to_str().unwrap().to_string();

        let conditional = RequestContext {
            path: "/index.html",
            is_head: false,
            if_none_match: Some(etag),
            range_header: None,
        };
        let resp = serve_asset(&conditional, &site).await;
        assert_eq!(resp.status(), 304);
    }

    #[tokio::test]
    async fn test_range_request_returns_partial_content() {
        let (_dir, site) = scoreboard_site();
        let ranged = RequestContext {
            path: "/index.html",
            is_head: false,
            if_none_match: None,
            range_header: Some("bytes=0-5".to_string()),
        };
        let resp = serve_asset(&ranged, &site).await;
        assert_eq!(resp.status(), 206);
        assert_eq!(
            resp.headers()["Content-Range"],
            format!("bytes 0-5/{}", "<html>OK</html>".len())
        );
        let body = resp.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"<html>");
    }

    #[tokio::test]
    async fn test_repeated_requests_are_identical() {
        let (_dir, site) = scoreboard_site();
        let first = serve_asset(&ctx("/index.html"), &site).await;
        let second = serve_asset(&ctx("/index.html"), &site).await;
        assert_eq!(first.status(), second.status());
        assert_eq!(first.headers()["ETag"], second.headers()["ETag"]);
        let a = first.into_body().collect().await.unwrap().to_bytes();
        let b = second.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(a, b);
    }
}
