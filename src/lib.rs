pub mod analyzer;
pub mod config;
pub mod errors;
pub mod extractor;
pub mod fetcher;
pub mod http;
pub mod pipeline;
pub mod saver;
pub mod storage;

pub use errors::{ClipError, ErrorKind};
