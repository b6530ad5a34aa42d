pub type MediaResult<T> = Result<T, MediaError>;

#[derive(thiserror::Error, Debug)]
pub enum MediaError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("image error: {0}")]
    Image(String),

    #[error("capture error: {0}")]
    Capture(String),

    #[error("transcript error: {0}")]
    Transcript(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl MediaError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn image(msg: impl Into<String>) -> Self {
        Self::Image(msg.into())
    }

    pub fn capture(msg: impl Into<String>) -> Self {
        Self::Capture(msg.into())
    }

    pub fn transcript(msg: impl Into<String>) -> Self {
        Self::Transcript(msg.into())
    }
}

impl From<image::ImageError> for MediaError {
    fn from(e: image::ImageError) -> Self {
        Self::Image(e.to_string())
    }
}

impl From<gif::EncodingError> for MediaError {
    fn from(e: gif::EncodingError) -> Self {
        Self::Image(format!("gif encode: {e}"))
    }
}
