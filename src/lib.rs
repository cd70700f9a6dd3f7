//! The seogen library turns a sitemap.xml into SEO drafts: a title per page,
//! an outline per title and an article per outline, all written by an LLM.

pub mod constants;
pub mod generate;
pub mod pipeline;
pub mod server;
pub mod sitemap;

pub use generate::{ChatProviderSource, GenerationError, LlmProviderSource, Role};
pub use pipeline::{TitleOutline, content_from_outline, outlines_from_titles, titles_from_sitemap};
pub use server::{build_app, serve};
pub use sitemap::{FetchError, fetch_sitemap_locations, filter_page_urls};
