//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: method validation, the
//! root-document override, generic static dispatch, and access logging.

use crate::config::{Config, SiteContext};
use crate::handler::static_files;
use crate::http;
use crate::logger::{self, AccessLogEntry};
use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::{Method, Request, Response, Version};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::time::Instant;

/// Request context encapsulating information needed for request processing
pub struct RequestContext<'a> {
    pub path: &'a str,
    pub is_head: bool,
    pub if_none_match: Option<String>,
    pub range_header: Option<String>,
}

/// Main entry point for HTTP request handling.
///
/// Produces the response first, then emits one access log line with the
/// final status, size, and timing. Logging happens after the response is
/// built and can never change it.
pub async fn handle_request(
    req: Request<hyper::body::Incoming>,
    peer_addr: SocketAddr,
    config: &Config,
    site: &SiteContext,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let started = Instant::now();
    let method = req.method().clone();
    let uri = req.uri().clone();
    let version = req.version();
    let referer = header_string(&req, "referer");
    let user_agent = header_string(&req, "user-agent");

    let response = match check_http_method(&method) {
        Some(resp) => resp,
        None => {
            let ctx = RequestContext {
                path: uri.path(),
                is_head: method == Method::HEAD,
                if_none_match: header_string(&req, "if-none-match"),
                range_header: header_string(&req, "range"),
            };
            route_request(&ctx, site).await
        }
    };

    if config.logging.access_log {
        let mut entry = AccessLogEntry::new(
            peer_addr.to_string(),
            method.to_string(),
            uri.path().to_string(),
        );
        entry.query = uri.query().map(ToString::to_string);
        entry.http_version = http_version_label(version).to_string();
        entry.status = response.status().as_u16();
        entry.body_bytes = response.body().size_hint().exact().unwrap_or(0);
        entry.referer = referer;
        entry.user_agent = user_agent;
        entry.request_time_us = started.elapsed().as_micros().try_into().unwrap_or(u64::MAX);
        logger::log_access(&entry, &config.logging.access_log_format);
    }

    Ok(response)
}

/// Route request based on path.
///
/// The root path is checked before generic resolution, so the default
/// document always wins for `/` no matter what the asset root contains.
pub async fn route_request(
    ctx: &RequestContext<'_>,
    site: &SiteContext,
) -> Response<Full<Bytes>> {
    if ctx.path == "/" {
        return static_files::serve_default_document(ctx, site).await;
    }

    static_files::serve_asset(ctx, site).await
}

/// Check HTTP method and return an early response for non-GET/HEAD methods
fn check_http_method(method: &Method) -> Option<Response<Full<Bytes>>> {
    match *method {
        Method::GET | Method::HEAD => None,
        Method::OPTIONS => Some(http::build_options_response()),
        _ => {
            logger::log_warning(&format!("Method not allowed: {method}"));
            Some(http::build_405_response())
        }
    }
}

fn header_string(req: &Request<hyper::body::Incoming>, name: &str) -> Option<String> {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string)
}

fn http_version_label(version: Version) -> &'static str {
    if version == Version::HTTP_10 {
        "1.0"
    } else if version == Version::HTTP_2 {
        "2"
    } else if version == Version::HTTP_3 {
        "3"
    } else {
        "1.1"
    }
}
