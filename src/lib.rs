//! OAuth 2.0 integration adapters for SaaS platforms.
//!
//! Each [`Connector`] drives the authorization-code flow for one provider
//! (CSRF state, code exchange, single-use credential handoff) and normalizes
//! the provider's resources into [`IntegrationItem`]s. HubSpot and Slack
//! adapters ship in the crate; new platforms only need a [`Provider`] impl.

mod connector;
mod error;
#[cfg(feature = "router")]
mod http;
mod item;
mod provider;
mod providers;
mod state;
mod store;
mod types;

pub use connector::{CLOSE_WINDOW_HTML, Connector, ConnectorConfig};
pub use error::ConnectError;
#[cfg(feature = "router")]
pub use http::callback_router;
pub use item::IntegrationItem;
pub use provider::{Listing, Provider, TokenRequestFormat};
pub use providers::{HubSpotProvider, SlackProvider};
pub use state::AuthorizationState;
pub use store::{MemoryStore, TRANSIENT_TTL, TransientStore};
pub use types::{CallbackParams, Credentials};
