// Library for the binary and tests to access modules

pub mod channel;
pub mod config;
pub mod detector;
pub mod error;
pub mod models;
pub mod publisher;
pub mod routes;
pub mod status;
pub mod store;
pub mod version;

pub use channel::{ChannelClient, Transport, WsTransport};
pub use detector::detect_issues;
pub use store::{StateStore, Subscription};
