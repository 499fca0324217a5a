//! Anchor API server: HTTP gateway over the Bible-text, LLM, TTS and
//! object-storage providers, with SQLite-backed caches from `anchor-core`.

pub mod api;
pub mod clients;
pub mod config;
pub mod error;
pub mod services;
