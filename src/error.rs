use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, KeyerError>;

#[derive(thiserror::Error, Debug)]
pub enum KeyerError {
    #[error("Couldn't open source {0}: {1}")]
    UnopenableSource(String, String),

    #[error("Source {0} produced no frames")]
    EmptySource(String),

    #[error("Couldn't load background image {}: {source}", path.display())]
    Background {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Frame is {actual:?} but {what} is {expected:?}")]
    DimensionMismatch {
        what: &'static str,
        expected: (u32, u32),
        actual: (u32, u32),
    },

    #[error("Invalid command `{0}`: {1}")]
    InvalidCommand(String, String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Camera error: {0}")]
    Camera(#[from] nokhwa::NokhwaError),

    #[error("{0}")]
    Other(String),
}
