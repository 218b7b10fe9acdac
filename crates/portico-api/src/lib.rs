// portico-api: Async Rust client for the Portico administration REST API

pub mod auth;
pub mod client;
pub mod error;
pub mod transport;
pub mod types;

pub use auth::Credentials;
pub use client::ResourceClient;
pub use error::{Error, FieldErrors};
pub use transport::{TlsMode, TransportConfig};
pub use types::Page;
