//! The sitemap module fetches a sitemap.xml document, extracts its locations
//! and drops the ones pointing at images.

use log::{debug, info};
use quick_xml::{Reader, events::Event};
use thiserror::Error;

use crate::constants::IMAGE_EXTENSIONS;

/// Failure to obtain the list of locations from a sitemap.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The request could not be sent or its body could not be read.
    #[error("{0}")]
    Request(#[source] reqwest::Error),
    /// The server answered with a non-success status.
    #[error("{0}")]
    Status(#[source] reqwest::Error),
    /// The body is not well-formed sitemap XML.
    #[error("Failed to parse sitemap: {0}")]
    Parse(String),
}

/// Downloads the sitemap at `sitemap_url` and returns the text of every `<loc>`
/// element in document order.
///
/// Locations listed by a sitemap index are returned as they are, nested
/// sitemaps are not followed.
///
/// # Errors
///
/// Returns [`FetchError::Request`] on network failure, [`FetchError::Status`]
/// if the response status is not a success and [`FetchError::Parse`] if the
/// body is not valid XML.
pub async fn fetch_sitemap_locations(sitemap_url: &str) -> Result<Vec<String>, FetchError> {
    let client = reqwest::Client::new();

    info!("Fetching sitemap {sitemap_url}...");
    let response = client
        .get(sitemap_url)
        .send()
        .await
        .map_err(FetchError::Request)?
        .error_for_status()
        .map_err(FetchError::Status)?;
    let content = response.bytes().await.map_err(FetchError::Request)?;

    let locations = parse_sitemap_locations(&content)?;
    info!("Found {} locations in {sitemap_url}", locations.len());
    Ok(locations)
}

/// Collects the raw text of every element named `loc`, whatever its parent
/// or namespace prefix (`image:loc` included). Text is returned unmodified.
///
/// # Errors
///
/// Returns [`FetchError::Parse`] on the first XML error in `content`.
pub fn parse_sitemap_locations(content: &[u8]) -> Result<Vec<String>, FetchError> {
    let mut reader = Reader::from_reader(content);
    let mut locations = Vec::new();
    let mut current: Option<String> = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) if e.local_name().as_ref() == b"loc" => {
                current = Some(String::new());
            }
            Ok(Event::Empty(e)) if e.local_name().as_ref() == b"loc" => {
                locations.push(String::new());
            }
            Ok(Event::Text(e)) => {
                if let Some(loc) = current.as_mut() {
                    let text = e
                        .unescape()
                        .map_err(|err| FetchError::Parse(err.to_string()))?;
                    loc.push_str(&text);
                }
            }
            Ok(Event::CData(e)) => {
                if let Some(loc) = current.as_mut() {
                    loc.push_str(&String::from_utf8_lossy(&e));
                }
            }
            Ok(Event::End(e)) if e.local_name().as_ref() == b"loc" => {
                if let Some(loc) = current.take() {
                    locations.push(loc);
                }
            }
            Ok(Event::Eof) => break,
            Err(err) => return Err(FetchError::Parse(err.to_string())),
            Ok(_) => {}
        }
        buf.clear();
    }

    Ok(locations)
}

/// Returns `true` if `url` contains one of the known image extensions.
pub fn is_image_url(url: &str) -> bool {
    IMAGE_EXTENSIONS.iter().any(|extension| url.contains(extension))
}

/// Keeps the page locations, dropping image resources. Order is preserved.
pub fn filter_page_urls(urls: Vec<String>) -> Vec<String> {
    let total = urls.len();
    let pages: Vec<String> = urls.into_iter().filter(|url| !is_image_url(url)).collect();
    debug!("Filtered out {} image locations", total - pages.len());
    pages
}
