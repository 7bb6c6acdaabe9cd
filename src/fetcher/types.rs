use reqwest::StatusCode;
use url::Url;

#[derive(Debug, Clone)]
pub struct LoadedPage {
    /// Location after redirects; relative links resolve against it.
    pub url_final: Url,
    pub status: StatusCode,
    pub html: String,
    /// WHATWG label of the encoding the body was decoded with.
    pub encoding: &'static str,
}
