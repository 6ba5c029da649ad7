//! Torrent View Client - a live torrent table fed by a remote status endpoint.
//!
//! The engine crate decides what to fetch and what changed; this crate does
//! the fetching over HTTP, drives the poll timer and routes user commands.

pub mod config;
pub mod error;
pub mod rpc;
pub mod source;
pub mod surface;
pub mod view;

pub use config::{Config, ConfigError};
pub use error::{AppError, Result};
pub use rpc::{HttpStatusClient, StatusClient, StatusQuery};
pub use source::ChannelSource;
pub use surface::LogSurface;
pub use view::{TorrentView, ViewCommand, ViewHandle};
