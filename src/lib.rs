pub mod config;
pub mod error;
pub mod mac;
pub mod transport;
pub mod wol;

pub use error::Error;
pub use mac::MacAddress;
pub use wol::{WakeOnLan, DEFAULT_BROADCAST_IP, DEFAULT_PORT};
