//! paperdeck-core: the query-dispatch controller and session runtime of the
//! whitepaper browser.
//!
//! The crate reconciles three data sources — realtime snapshots from a
//! document store, on-demand hits from a hosted search index, and local
//! topic filtering — into the one list the presentation layer renders.
//! Everything network-facing hides behind the traits in [`provider`];
//! concrete REST adapters live in `paperdeck-backend-client`.

pub mod config;
pub mod controller;
pub mod error;
pub mod provider;
pub mod record;
pub mod session;
pub mod state;
pub mod topics;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use config::Config;
pub use controller::Controller;
pub use controller::ControllerEvent;
pub use controller::Effect;
pub use controller::Intent;
pub use provider::ProviderSet;
pub use record::Whitepaper;
pub use session::SessionHandle;
pub use state::DisplayState;
pub use topics::TopicCatalog;
pub use topics::TopicFilter;
