use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EvalError {
    #[error("I/O error while {context} '{}': {source}", .path.display())]
    Io {
        context: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("JSON error while {context}: {source}")]
    Json {
        context: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("image error while {context}: {source}")]
    Image {
        context: &'static str,
        #[source]
        source: image::ImageError,
    },
    #[error("render failed: {message}")]
    Render { message: String },
    #[error(
        "predicted and gold segment counts differ: {predicted} predicted vs {gold} gold"
    )]
    LengthMismatch { predicted: usize, gold: usize },
    #[error("image shapes differ: {left} vs {right}")]
    DimensionMismatch { left: String, right: String },
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
}

impl EvalError {
    pub(crate) fn io(
        context: &'static str,
        path: impl Into<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        Self::Io {
            context,
            path: path.into(),
            source,
        }
    }

    pub(crate) fn json(context: &'static str, source: serde_json::Error) -> Self {
        Self::Json { context, source }
    }

    pub(crate) fn image(context: &'static str, source: image::ImageError) -> Self {
        Self::Image { context, source }
    }

    pub(crate) fn render(message: impl Into<String>) -> Self {
        Self::Render {
            message: message.into(),
        }
    }

    pub(crate) fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }
}
