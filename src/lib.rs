//! mediascout - media discovery for third-party listing pages.
//!
//! Drives a stealth browser session against an arbitrary listing page,
//! reveals lazy-loaded galleries, and returns a classified,
//! de-duplicated media asset list. A static sibling extracts agent
//! contact details and avatar candidates from profile HTML without a
//! browser. Both are exposed over a JSON HTTP API and a small CLI.

pub mod cli;
pub mod config;
pub mod crawler;
pub mod models;
pub mod profile;
pub mod server;
