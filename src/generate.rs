//! The generate module sends single-turn prompts to an LLM provider and
//! returns the reply text.

use std::fmt;
use std::str::FromStr;

use llm::builder::{LLMBackend, LLMBuilder};
use llm::chat::{ChatMessage, ChatProvider};
use log::{debug, error};
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::constants::{
    CONTENT_PROMPT_TEMPLATE, DEFAULT_MODEL, OUTLINE_PROMPT_TEMPLATE, THINK_STRIPPER,
    TITLE_PROMPT_TEMPLATE,
};

static THINK_STRIPPER_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(THINK_STRIPPER).expect("Failed to compile THINK_STRIPPER regex"));

/// What a prompt asks the model to produce.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Role {
    /// A title for a page URL.
    Title,
    /// An outline for a title.
    Outline,
    /// An article for an outline.
    Content,
}

impl Role {
    /// Renders the prompt for this role around `input`.
    pub fn prompt(self, input: &str) -> String {
        match self {
            Role::Title => TITLE_PROMPT_TEMPLATE.replace("{url}", input),
            Role::Outline => OUTLINE_PROMPT_TEMPLATE.replace("{title}", input),
            Role::Content => CONTENT_PROMPT_TEMPLATE.replace("{outline}", input),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::Title => "title",
            Role::Outline => "outline",
            Role::Content => "content",
        };
        formatter.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Failed to build LLM provider: {0}")]
    Build(String),
    #[error("LLM error: {0}")]
    Provider(String),
    #[error("LLM returned no text")]
    EmptyResponse,
}

/// Hands out a chat provider for a single generation call.
///
/// Nothing is shared between calls: every [`generate_text`] asks the source
/// for a new provider and drops it once the reply arrives.
pub trait ChatProviderSource: Send + Sync {
    /// Creates a provider for one request.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError::Build`] if the provider cannot be configured.
    fn provide(&self) -> Result<Box<dyn ChatProvider>, GenerationError>;
}

/// Builds `llm` crate providers from a backend, model and optional credentials.
#[derive(Clone)]
pub struct LlmProviderSource {
    backend: LLMBackend,
    model: String,
    api_key: Option<String>,
    base_url: Option<String>,
}

impl LlmProviderSource {
    /// Creates a source for `backend` (an `llm` backend name such as `openai`).
    ///
    /// # Errors
    ///
    /// Returns an error if the backend name is not known to the `llm` crate.
    pub fn new(backend: &str, model: Option<String>) -> Result<Self, GenerationError> {
        let backend = LLMBackend::from_str(backend)
            .map_err(|err| GenerationError::Build(format!("Invalid LLM backend: {err}")))?;

        Ok(Self {
            backend,
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_owned()),
            api_key: None,
            base_url: None,
        })
    }

    #[must_use]
    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key;
        self
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: Option<String>) -> Self {
        self.base_url = base_url;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

impl ChatProviderSource for LlmProviderSource {
    fn provide(&self) -> Result<Box<dyn ChatProvider>, GenerationError> {
        let mut builder = LLMBuilder::new()
            .backend(self.backend.clone())
            .model(self.model.clone());

        if let Some(api_key) = &self.api_key {
            builder = builder.api_key(api_key.clone());
        }
        if let Some(base_url) = &self.base_url {
            builder = builder.base_url(base_url.clone());
        }

        let provider: Box<dyn ChatProvider> = builder
            .build()
            .map_err(|err| GenerationError::Build(err.to_string()))?;
        Ok(provider)
    }
}

/// Asks a fresh provider from `source` for the `role` text about `input`.
///
/// The reply is stripped of `<think>` blocks and surrounding whitespace.
///
/// # Errors
///
/// Returns an error if the provider cannot be built, the chat call fails or
/// the reply carries no text.
pub async fn generate_text(
    source: &dyn ChatProviderSource,
    role: Role,
    input: &str,
) -> Result<String, GenerationError> {
    let provider = source.provide()?;
    let messages = [ChatMessage::user().content(role.prompt(input)).build()];

    let response = provider
        .chat(&messages)
        .await
        .map_err(|err| GenerationError::Provider(err.to_string()))?;
    let text = response.text().ok_or(GenerationError::EmptyResponse)?;

    Ok(THINK_STRIPPER_REGEX
        .replace_all(&text, "")
        .trim()
        .to_owned())
}

/// Like [`generate_text`], but logs a failure and returns `None` instead.
///
/// A provider failure and a reply without text both end up as `None`.
pub async fn generate(source: &dyn ChatProviderSource, role: Role, input: &str) -> Option<String> {
    match generate_text(source, role, input).await {
        Ok(text) => {
            debug!("Generated {role} for {input:?}");
            Some(text)
        }
        Err(err) => {
            error!("Error generating {role}: {err}");
            None
        }
    }
}
