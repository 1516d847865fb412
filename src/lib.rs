//! `cellchat`: inline attachment rendering for terminal chat clients.
//!
//! This crate provides the pieces a terminal chat view needs to show file
//! attachments: content URI parsing, a media cache, background preview
//! fetching, a half-block image rasteriser with colour-depth quantisation,
//! and message types that lay themselves out into styled terminal rows.

pub mod config;
pub mod error;
pub mod media;
pub mod messages;
pub mod model;
pub mod render;
pub mod tui;
