#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use axum::{Router, http::header::CONTENT_TYPE, routing::get};
use llm::{
    chat::{ChatMessage, ChatProvider, ChatResponse, Tool},
    error::LLMError,
};
use seogen::{ChatProviderSource, GenerationError};

#[macro_export]
macro_rules! assert_responses {
    (
        $(
            $test_name:ident : response => $response:expr, result => $result:expr
        ),+ $(,)?
    ) => {
        $(
            #[tokio::test]
            async fn $test_name() {
                let source = StubSource::replying(|_| Ok(Some($response.to_owned())));
                let result = seogen::generate::generate_text(&source, seogen::Role::Title, "")
                    .await
                    .expect("Expected successful generation.");

                assert_that(&result).is_equal_to($result.to_owned());
            }
        )+
    }
}

type Reply = dyn Fn(&str) -> Result<Option<String>, String> + Send + Sync;

/// Hands out a new [`StubLlmProvider`] per call and records every prompt.
#[derive(Clone)]
pub(crate) struct StubSource {
    reply: Arc<Reply>,
    prompts: Arc<Mutex<Vec<String>>>,
    provided: Arc<Mutex<usize>>,
}

impl StubSource {
    pub fn replying<F>(reply: F) -> Self
    where
        F: Fn(&str) -> Result<Option<String>, String> + Send + Sync + 'static,
    {
        StubSource {
            reply: Arc::new(reply),
            prompts: Arc::new(Mutex::new(Vec::new())),
            provided: Arc::new(Mutex::new(0)),
        }
    }

    /// Replies with the prompt itself, so output can be traced back to input.
    pub fn echoing() -> Self {
        Self::replying(|prompt| Ok(Some(prompt.to_owned())))
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().expect("prompts lock").clone()
    }

    pub fn provided(&self) -> usize {
        *self.provided.lock().expect("provided lock")
    }
}

impl ChatProviderSource for StubSource {
    fn provide(&self) -> Result<Box<dyn ChatProvider>, GenerationError> {
        *self.provided.lock().expect("provided lock") += 1;
        Ok(Box::new(StubLlmProvider {
            reply: Arc::clone(&self.reply),
            prompts: Arc::clone(&self.prompts),
        }))
    }
}

/// A source whose providers can never be built.
pub(crate) struct BrokenSource;

impl ChatProviderSource for BrokenSource {
    fn provide(&self) -> Result<Box<dyn ChatProvider>, GenerationError> {
        Err(GenerationError::Build("no backend".to_owned()))
    }
}

pub(crate) struct StubLlmProvider {
    reply: Arc<Reply>,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl ChatProvider for StubLlmProvider {
    fn chat<'life0, 'life1, 'async_trait>(
        &'life0 self,
        messages: &'life1 [ChatMessage],
    ) -> ::core::pin::Pin<
        Box<
            dyn ::core::future::Future<Output = Result<Box<dyn ChatResponse>, LLMError>>
                + ::core::marker::Send
                + 'async_trait,
        >,
    >
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        Self: 'async_trait,
    {
        Box::pin(async move {
            #[derive(Debug)]
            struct StringResponse(Option<String>);

            impl ChatResponse for StringResponse {
                fn text(&self) -> Option<String> {
                    self.0.clone()
                }

                fn tool_calls(&self) -> Option<Vec<llm::ToolCall>> {
                    panic!()
                }

                fn thinking(&self) -> Option<String> {
                    None
                }

                fn usage(&self) -> Option<llm::chat::Usage> {
                    None
                }
            }

            impl std::fmt::Display for StringResponse {
                fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                    write!(formatter, "{}", self.0.as_deref().unwrap_or_default())
                }
            }

            let prompt = messages
                .first()
                .map(|message| message.content.clone())
                .unwrap_or_default();
            self.prompts.lock().expect("prompts lock").push(prompt.clone());

            match (self.reply)(&prompt) {
                Ok(text) => Ok(Box::new(StringResponse(text)) as Box<dyn ChatResponse>),
                Err(err) => Err(LLMError::ProviderError(err)),
            }
        })
    }

    fn chat_with_tools<'life0, 'life1, 'life2, 'async_trait>(
        &'life0 self,
        _messages: &'life1 [ChatMessage],
        _tools: Option<&'life2 [Tool]>,
    ) -> ::core::pin::Pin<
        Box<
            dyn ::core::future::Future<Output = Result<Box<dyn ChatResponse>, LLMError>>
                + ::core::marker::Send
                + 'async_trait,
        >,
    >
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        'life2: 'async_trait,
        Self: 'async_trait,
    {
        panic!()
    }
}

/// Serves `body` as `/sitemap.xml` on a random local port and returns its URL.
pub async fn serve_sitemap(body: &'static str) -> String {
    let app = Router::new().route(
        "/sitemap.xml",
        get(move || async move { ([(CONTENT_TYPE, "application/xml")], body) }),
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Expected a free local port.");
    let addr = listener.local_addr().expect("Expected a bound address.");

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Sitemap server failed.");
    });

    format!("http://{addr}/sitemap.xml")
}

/// Two pages around one image.
pub const SITEMAP: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
  <url><loc>https://ex.com/a</loc></url>
  <url><loc>https://ex.com/b.png</loc></url>
  <url><loc>https://ex.com/c</loc></url>
</urlset>"#;
