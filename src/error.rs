#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Invalid MAC address: {0:?}")]
    InvalidMacAddress(String),
    #[error("Required field has not been configured: {0}")]
    MissingRequiredField(&'static str),
    #[error("Could not send magic packet: {0}")]
    Transport(#[from] std::io::Error),
}
