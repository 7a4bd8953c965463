//! # daybook-client
//!
//! Everything a journal UI needs below the rendering layer: the day
//! aggregate service, drafts, image attachments, the activity heatmap and
//! export, plus local identity and configuration.
//!
//! Start with [`Journal::open`] and [`ClientConfig::from_env`].

pub mod commands;
pub mod config;
pub mod events;
pub mod identity;
pub mod journal;
pub mod state;

mod error;

use tracing_subscriber::{fmt, EnvFilter};

pub use config::ClientConfig;
pub use error::{ClientError, Result};
pub use events::JournalEvent;
pub use journal::Journal;

/// Install the global tracing subscriber. `RUST_LOG` overrides the default
/// filter. Calling it twice is harmless.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("daybook_client=debug,daybook_store=info,warn"));

    let _ = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .try_init();
}
