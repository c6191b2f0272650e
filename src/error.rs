#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("http status {status} for {url}")]
    Status { status: u16, url: String },
    #[error("transport: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("decode: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("a draw is already in flight")]
    DrawInFlight,
}

pub type Result<T> = std::result::Result<T, Error>;
