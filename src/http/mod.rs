//! HTTP protocol layer module
//!
//! Content-type inference, response builders, and conditional/range request
//! support, decoupled from path resolution.

pub mod cache;
pub mod mime;
pub mod range;
pub mod response;

// Re-export commonly used builders
pub use range::parse_range_header;
pub use response::{
    build_304_response, build_404_response, build_405_response, build_416_response,
    build_options_response,
};
