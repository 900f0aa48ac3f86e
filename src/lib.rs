//! dashclient: typed client for the dashboard backend.
//!
//! Provides a uniform JSON request gateway, a resource store that only
//! changes on server-confirmed results, the two-step Telegram activation
//! handshake, the global bot switch and worker control, session auth, the
//! profile's OpenAI settings, and Zoom recording transcripts and reports.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use dashclient::prelude::*;
//!
//! # async fn example() -> dashclient::error::Result<()> {
//! let config = ClientConfig::load()?;
//! let gateway = Arc::new(HttpGateway::new(&config)?);
//! let store = ResourceStore::new(gateway);
//! store.list().await?;
//! for resource in store.snapshot() {
//!     if resource.status != ResourceStatus::Active {
//!         store.toggle(&resource.id).await?;
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod activation;
pub mod bot;
pub mod config;
pub mod error;
pub mod gateway;
pub mod prelude;
pub mod profile;
pub mod resources;
pub mod session;
pub mod util;
pub mod zoom;

#[cfg(feature = "cli")]
pub mod cli;
