use reqwest::blocking::Client;
use tracing::{debug, instrument};

use crate::error::Result;

/// User agent sent with every request made by the crate.
pub const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Retrieves the raw bytes behind a data file URL.
pub trait Downloader {
    fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

/// [`Downloader`] backed by a blocking HTTP client using plain GET requests.
#[derive(Debug, Clone)]
pub struct HttpDownloader {
    client: Client,
}

impl HttpDownloader {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl Downloader for HttpDownloader {
    #[instrument(level = "debug", skip(self))]
    fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.client.get(url).send()?.error_for_status()?;
        let bytes = response.bytes()?;
        debug!(bytes = bytes.len(), "downloaded data file");
        Ok(bytes.to_vec())
    }
}

/// Builds the blocking client shared by the catalog and file downloads.
pub fn build_client() -> Result<Client> {
    Ok(Client::builder().user_agent(USER_AGENT).build()?)
}
