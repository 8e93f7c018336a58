//! Client-side orchestration for video minutes.
//!
//! A video is uploaded, its processing job is polled until it finishes, and
//! the resulting transcript, summary and chat thread are kept in one shared
//! [`store::MinutesHandle`].

pub mod api;
pub mod chat;
pub mod cli;
pub mod config;
pub mod history;
pub mod store;
pub mod summary;
pub mod sync;
