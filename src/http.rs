use once_cell::sync::Lazy;
use reqwest::{Client, ClientBuilder};

const USER_AGENT: &str = concat!("cubox-clipper/", env!("CARGO_PKG_VERSION"));

// API calls rely on the transport's default timeouts.
static API_CLIENT: Lazy<Client> = Lazy::new(|| {
    ClientBuilder::new()
        .user_agent(USER_AGENT)
        .build()
        .unwrap_or_else(|_| Client::new())
});

/// Client shared by the extraction, analysis and save calls.
pub fn api_client() -> Client {
    API_CLIENT.clone()
}

pub(crate) const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";
