use thiserror::Error;

#[derive(Debug, Error)]
pub enum MapError {
    #[error("invalid scene: {0}")]
    InvalidScene(String),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("map extent is empty")]
    EmptyExtent,

    #[error("basemap request for {url} failed: {message}")]
    Basemap { url: String, message: String },

    #[error("basemap needs {requested} tiles at zoom {zoom}, limit is {limit}")]
    TileLimit {
        requested: usize,
        zoom: u8,
        limit: usize,
    },
}
