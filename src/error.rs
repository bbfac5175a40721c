/// Per-frame failures. None of these are fatal: the caller skips the frame
/// and carries on with the next one.
#[derive(thiserror::Error, Debug)]
pub enum RectifyError {
    #[error("need at least 4 candidate blobs, found {found}")]
    InsufficientCandidates { found: usize },
    #[error("marker {id} cannot be ordered around the datum (zero-length triangle side)")]
    DegenerateGeometry { id: usize },
    #[error("rectification plan does not describe an invertible perspective map")]
    SingularHomography,
    #[error(transparent)]
    Image(#[from] image::ImageError),
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, RectifyError>;
