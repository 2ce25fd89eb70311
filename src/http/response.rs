//! HTTP response building module
//!
//! Builders for every status the preview server produces. CORS headers are
//! added by the router afterwards, so none of these set them.

use futures_util::TryStreamExt;
use http_body_util::{BodyExt, Empty, Full, StreamBody};
use hyper::body::{Bytes, Frame};
use hyper::header::{ALLOW, CONTENT_LENGTH, CONTENT_TYPE, LOCATION};
use hyper::{Response, StatusCode};
use tokio::fs::File;
use tokio_util::io::ReaderStream;

use super::ResponseBody;

/// Methods the handler answers without a 405
pub const ALLOWED_METHODS: &str = "GET, HEAD, OPTIONS";

/// Body from an in-memory buffer
pub fn full(data: impl Into<Bytes>) -> ResponseBody {
    Full::new(data.into())
        .map_err(|never| match never {})
        .boxed_unsync()
}

/// Zero-length body
pub fn empty() -> ResponseBody {
    Empty::<Bytes>::new()
        .map_err(|never| match never {})
        .boxed_unsync()
}

/// Build 200 response streaming an opened file
///
/// HEAD gets identical headers and an empty body.
pub fn build_file_response(
    file: File,
    len: u64,
    content_type: &'static str,
    is_head: bool,
) -> Response<ResponseBody> {
    let body = if is_head {
        empty()
    } else {
        StreamBody::new(ReaderStream::new(file).map_ok(Frame::data)).boxed_unsync()
    };

    Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, content_type)
        .header(CONTENT_LENGTH, len)
        .body(body)
        .unwrap_or_else(|e| {
            log_build_error("200", &e);
            Response::new(empty())
        })
}

/// Build 404 Not Found response
pub fn build_404_response(is_head: bool) -> Response<ResponseBody> {
    build_text_response(StatusCode::NOT_FOUND, "404 Not Found", is_head)
}

/// Build 500 response for files that exist but cannot be read
pub fn build_500_response(is_head: bool) -> Response<ResponseBody> {
    build_text_response(
        StatusCode::INTERNAL_SERVER_ERROR,
        "500 Internal Server Error",
        is_head,
    )
}

/// Build 405 Method Not Allowed response
pub fn build_405_response() -> Response<ResponseBody> {
    let mut response = build_text_response(
        StatusCode::METHOD_NOT_ALLOWED,
        "405 Method Not Allowed",
        false,
    );
    response
        .headers_mut()
        .insert(ALLOW, hyper::header::HeaderValue::from_static(ALLOWED_METHODS));
    response
}

/// Build OPTIONS response (preflight request)
pub fn build_options_response() -> Response<ResponseBody> {
    Response::builder()
        .status(StatusCode::OK)
        .header(ALLOW, ALLOWED_METHODS)
        .header(CONTENT_LENGTH, 0)
        .body(empty())
        .unwrap_or_else(|e| {
            log_build_error("OPTIONS", &e);
            Response::new(empty())
        })
}

/// Build 301 redirect, used to add the trailing slash to directory paths
pub fn build_redirect_response(target: &str) -> Response<ResponseBody> {
    Response::builder()
        .status(StatusCode::MOVED_PERMANENTLY)
        .header(LOCATION, target)
        .header(CONTENT_LENGTH, 0)
        .body(empty())
        .unwrap_or_else(|e| {
            log_build_error("301", &e);
            build_404_response(false)
        })
}

fn build_text_response(
    status: StatusCode,
    message: &'static str,
    is_head: bool,
) -> Response<ResponseBody> {
    let body = if is_head { empty() } else { full(message) };

    Response::builder()
        .status(status)
        .header(CONTENT_TYPE, "text/plain; charset=utf-8")
        .header(CONTENT_LENGTH, message.len())
        .body(body)
        .unwrap_or_else(|e| {
            log_build_error(status.as_str(), &e);
            let mut response = Response::new(full(message));
            *response.status_mut() = status;
            response
        })
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}
