//! The pipeline module composes sitemap fetching and text generation into the
//! three stages callers can trigger: titles, outlines and content.
//!
//! Every stage processes its items one at a time in input order. A failed
//! generation leaves `None` in its slot and never aborts the batch.

use log::info;
use serde::{Deserialize, Serialize};

use crate::generate::{ChatProviderSource, Role, generate};
use crate::sitemap::{FetchError, fetch_sitemap_locations, filter_page_urls};

/// A caller-supplied title and the outline generated for it.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct TitleOutline {
    pub title: String,
    pub outline: Option<String>,
}

/// Fetches the sitemap at `sitemap_url` and generates one title per page URL.
///
/// The returned vector has one slot per non-image location, in sitemap order.
///
/// # Errors
///
/// Returns an error only if the sitemap cannot be fetched or parsed.
pub async fn titles_from_sitemap(
    sitemap_url: &str,
    source: &dyn ChatProviderSource,
) -> Result<Vec<Option<String>>, FetchError> {
    let urls = filter_page_urls(fetch_sitemap_locations(sitemap_url).await?);
    info!("Generating titles for {} pages...", urls.len());

    let mut titles = Vec::with_capacity(urls.len());
    for url in &urls {
        titles.push(generate(source, Role::Title, url).await);
    }

    let failed = titles.iter().filter(|title| title.is_none()).count();
    log_generated("titles", titles.len(), failed);
    Ok(titles)
}

/// Generates an outline for each title, echoing the title next to it.
pub async fn outlines_from_titles(
    titles: &[String],
    source: &dyn ChatProviderSource,
) -> Vec<TitleOutline> {
    info!("Generating outlines for {} titles...", titles.len());

    let mut outlines = Vec::with_capacity(titles.len());
    for title in titles {
        outlines.push(TitleOutline {
            title: title.clone(),
            outline: generate(source, Role::Outline, title).await,
        });
    }

    let failed = outlines.iter().filter(|pair| pair.outline.is_none()).count();
    log_generated("outlines", outlines.len(), failed);
    outlines
}

/// Generates an article from `outline`.
pub async fn content_from_outline(
    outline: &str,
    source: &dyn ChatProviderSource,
) -> Option<String> {
    info!("Generating content...");
    generate(source, Role::Content, outline).await
}

fn log_generated(kind: &str, total: usize, failed: usize) {
    info!("Generated {} of {total} {kind}", total - failed);
}
