#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Graph(#[from] springbox_graph::Error),
    #[error("scale must be a positive finite number, got {scale}")]
    InvalidScale { scale: f64 },
    #[error("viewport must have a positive finite size, got {width}x{height}")]
    InvalidViewport { width: f64, height: f64 },
    #[error("invalid layout config: {message}")]
    InvalidConfig { message: String },
    #[error("failed to parse layout config: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
