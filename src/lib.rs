//! Newsboard - a single-page news board
//!
//! Pulls items from several news sources through a feed-to-JSON gateway,
//! interleaves them so every source shows up near the top, optionally
//! translates the titles, and serves the result as one list that refreshes
//! on a fixed interval.

pub mod aggregate;
pub mod config;
pub mod fetcher;
pub mod item;
pub mod present;
pub mod registry;
pub mod routes;
pub mod scheduler;
pub mod translate;
