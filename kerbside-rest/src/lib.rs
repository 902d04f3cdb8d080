//! REST client for the bins backend.
//!
//! This crate talks to the municipal backend on behalf of the bin map in
//! `kerbside-core`: [`BinsClient`] performs the HTTP calls, [`BinBackend`]
//! abstracts them, and [`Dispatcher`] runs each request as its own task and
//! reports completions back over a channel.
//!
//! # Example
//!
//! ```ignore
//! use kerbside_core::{BinMap, MemorySurface};
//! use kerbside_rest::{drain_ready, BinsClient, Dispatcher};
//!
//! #[tokio::main]
//! async fn main() {
//!     let client = BinsClient::new("http://localhost:8080").unwrap();
//!     let (dispatcher, mut completions) = Dispatcher::new(client);
//!
//!     let mut map = BinMap::new(MemorySurface::new());
//!     if let Some(load) = map.mount() {
//!         dispatcher.dispatch(load);
//!     }
//!
//!     // In the UI loop:
//!     for completion in drain_ready(&mut completions) {
//!         map.apply(completion);
//!     }
//! }
//! ```

mod backend;
mod client;
mod dispatch;
mod error;

pub use backend::BinBackend;
pub use client::{BinsClient, ClientConfig, DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
pub use dispatch::{drain_ready, Dispatcher};
pub use error::RestError;
