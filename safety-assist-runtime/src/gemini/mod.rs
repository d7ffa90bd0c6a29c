//! Google Gemini provider over the Generative Language API.
//!
//! Blocking turns use `generateContent` with retries; streamed turns use
//! `streamGenerateContent?alt=sse` and feed a [`crate::streaming::TurnAccumulator`].

mod api;
mod client;
mod config;

pub use client::GeminiClient;
pub use config::GeminiConfig;
