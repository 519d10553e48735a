use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid value: {message}")]
    InvalidValue { message: String },

    #[error(
        "draw of {vertices} vertices / {indices} indices exceeds batcher capacity of {max_vertices} vertices / {max_indices} indices"
    )]
    DrawTooLarge {
        vertices: usize,
        indices: usize,
        max_vertices: usize,
        max_indices: usize,
    },

    #[error("unknown animation: {name}")]
    UnknownAnimation { name: String },

    #[error("unknown skin: {name}")]
    UnknownSkin { name: String },

    #[cfg(feature = "json")]
    #[error("failed to parse mesh config JSON: {message}")]
    ConfigParse { message: String },
}

impl Error {
    pub(crate) fn invalid_value(message: impl Into<String>) -> Self {
        Self::InvalidValue {
            message: message.into(),
        }
    }
}
