// cyberq-api: Async HTTP transport for the CyberQ WiFi controller

pub mod client;
pub mod error;
pub mod payload;
pub mod transport;

pub use client::{CyberqClient, Page, WriteRequest};
pub use error::Error;
pub use payload::RawPayload;
pub use transport::{DeviceTransport, TransportConfig};
