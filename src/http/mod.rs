//! HTTP protocol layer module
//!
//! Content types, CORS headers and response builders, independent of how
//! requests are routed.

pub mod cors;
pub mod mime;
pub mod response;

use http_body_util::combinators::UnsyncBoxBody;
use hyper::body::Bytes;

/// Body type of every response; file bodies are streamed from disk
pub type ResponseBody = UnsyncBoxBody<Bytes, std::io::Error>;

// Re-export commonly used items
pub use cors::apply_cors_headers;
pub use response::{
    build_404_response, build_405_response, build_500_response, build_file_response,
    build_options_response, build_redirect_response,
};
