// nce-api: Async Rust client for the Huawei iMaster NCE-Campus northbound API

pub mod auth;
pub mod client;
pub mod error;
pub mod paging;
pub mod transport;
pub mod types;

pub use client::NbiClient;
pub use error::Error;
pub use transport::{TlsMode, TransportConfig};
pub use types::Record;
