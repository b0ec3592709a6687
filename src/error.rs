use std::io;

use thiserror::Error;

/// Errors that abort a whole classification call. Per-value metadata
/// failures never surface here; they are skipped at the extraction site.
#[derive(Error, Debug)]
pub enum ClassifyError {
    #[error("Unrecognized image container")]
    UnrecognizedContainer,

    #[error("Image decode failed: {0}")]
    DecodeFailed(#[from] image::ImageError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
