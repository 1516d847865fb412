//! Core data model types for chat events and media identifiers.

pub mod content_uri;
pub mod event;
