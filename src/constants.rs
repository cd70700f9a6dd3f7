pub const MODEL_API_KEY_ENV_NAME: &str = "SEOGEN_MODEL_API_KEY";

/// Model identifier sent with every chat request.
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

pub const DEFAULT_BACKEND: &str = "openai";

pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:5000";

/// Substrings that mark a sitemap location as an image resource.
/// Matched anywhere in the URL, not only at the end of the path.
pub const IMAGE_EXTENSIONS: [&str; 7] = [".jpg", ".jpeg", ".png", ".gif", ".webp", ".avif", ".bmp"];

pub(crate) const THINK_STRIPPER: &str = r"<think>[\s\S]*</think>\s*";

pub(crate) const TITLE_PROMPT_TEMPLATE: &str = "Act as an SEO expert, create a catchy SEO-optimized title for the following URL: {url}. Only return the title text.";

pub(crate) const OUTLINE_PROMPT_TEMPLATE: &str =
    "Generate a detailed SEO-optimized outline for the title: {title}. List key sections and subtopics.";

pub(crate) const CONTENT_PROMPT_TEMPLATE: &str =
    "Using the following outline, generate a detailed, SEO-optimized, human-like article: {outline}";
