//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: method dispatch, CORS headers
//! and the access log line.

use crate::config::AppState;
use crate::handler::static_files;
use crate::http::{self, ResponseBody};
use crate::logger::{self, AccessLogEntry};
use hyper::header::{CONTENT_LENGTH, REFERER, USER_AGENT};
use hyper::{Method, Request, Response, Version};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// Main entry point for HTTP request handling
///
/// Never fails: file errors become 404/500 responses. The request body is
/// ignored, so any body type is accepted.
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    remote_addr: SocketAddr,
) -> Result<Response<ResponseBody>, Infallible> {
    let started = Instant::now();
    let method = req.method();
    let uri = req.uri();
    let is_head = *method == Method::HEAD;

    let mut response = match *method {
        // Preflight never touches the filesystem
        Method::OPTIONS => http::build_options_response(),
        Method::GET | Method::HEAD => {
            static_files::serve_path(&state, uri.path(), uri.query(), is_head).await
        }
        _ => http::build_405_response(),
    };

    http::apply_cors_headers(response.headers_mut());

    if state.access_log {
        let mut entry = AccessLogEntry::new(
            remote_addr.ip().to_string(),
            method.to_string(),
            uri.path().to_string(),
        );
        entry.query = uri.query().map(ToString::to_string);
        entry.http_version = version_label(req.version()).to_string();
        entry.status = response.status().as_u16();
        entry.body_bytes = if is_head {
            0
        } else {
            header_value(&response, CONTENT_LENGTH)
                .and_then(|v| v.parse().ok())
                .unwrap_or(0)
        };
        entry.referer = request_header(&req, REFERER);
        entry.user_agent = request_header(&req, USER_AGENT);
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(&entry, &state.access_log_format);
    }

    Ok(response)
}

fn version_label(version: Version) -> &'static str {
    if version == Version::HTTP_10 {
        "1.0"
    } else if version == Version::HTTP_09 {
        "0.9"
    } else if version == Version::HTTP_2 {
        "2"
    } else {
        "1.1"
    }
}

fn request_header<B>(req: &Request<B>, name: hyper::header::HeaderName) -> Option<String> {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string)
}

fn header_value(
    response: &Response<ResponseBody>,
    name: hyper::header::HeaderName,
) -> Option<&str> {
    response.headers().get(name).and_then(|v| v.to_str().ok())
}
