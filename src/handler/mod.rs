//! Request handler module
//!
//! Routes requests to the root-document override or to generic static
//! resolution under the asset root.

pub mod router;
pub mod static_files;

// Re-export main entry point
pub use router::handle_request;
