//! Page loader for the HTTP page host: downloads an HTML document and decodes
//! it to UTF-8 using the declared or sniffed charset.

pub mod client;
pub mod decode;
pub mod errors;
pub mod types;

pub use client::load_page;
pub use errors::FetchError;
pub use types::LoadedPage;
