//! Session and data access for Pandora radio.
//!
//! Keeps a remote session alive across long-running processes, recovers
//! from expired authorization on its own, and presents each station as an
//! endless, lazily fetched sequence of tracks that can be looked up again by
//! URI.
//!
//! Start with a [`Library`](library::Library) over a
//! [`Gateway`](gateway::Gateway):
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use pandora_radio::{
//!     config::Config, credentials::Credentials, gateway::Gateway, library::Library,
//! };
//!
//! # async fn run() -> pandora_radio::error::Result<()> {
//! let config = Config::new();
//! let library = Library::new(&config, Arc::new(Gateway::new(&config)?));
//! library.login(&Credentials::new("john@example.com", "smith")).await?;
//!
//! for station in library.stations().await? {
//!     println!("{station}");
//! }
//! # Ok(())
//! # }
//! ```
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

#[macro_use]
extern crate log;

pub mod auth;
pub mod buffer;
pub mod client;
pub mod config;
pub mod credentials;
pub mod crypt;
pub mod directory;
pub mod error;
pub mod gateway;
pub mod http;
pub mod library;
pub mod playlist;
pub mod protocol;
pub mod remote;
pub mod session;
pub mod station;
pub mod track;

#[cfg(test)]
mod testing;
