pub type QuoteResult<T> = Result<T, QuoteError>;

/// Error taxonomy for the card pipeline.
///
/// Every external call (decode, shape, rasterize, encode) is attempted once;
/// failures propagate synchronously to the caller, who decides whether to
/// retry the whole request.
#[derive(thiserror::Error, Debug)]
pub enum QuoteError {
    /// Malformed or oversized request fields. Raised before any rendering.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Image bytes that could not be decoded. Halts the request before
    /// compositing; never produces a partial card.
    #[error("decode error: {0}")]
    Decode(String),

    /// Shaping or rasterization fault (missing font family, buffer shape
    /// mismatch, template dimensions). Never silently falls back.
    #[error("render error: {0}")]
    Render(String),

    /// Final JPEG serialization failed. There is no fallback format.
    #[error("encode error: {0}")]
    Encode(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl QuoteError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_are_stable() {
        assert!(
            QuoteError::invalid_input("x")
                .to_string()
                .contains("invalid input:")
        );
        assert!(QuoteError::decode("x").to_string().contains("decode error:"));
        assert!(QuoteError::render("x").to_string().contains("render error:"));
        assert!(QuoteError::encode("x").to_string().contains("encode error:"));
    }

    #[test]
    fn other_preserves_source() {
        let base = std::io::Error::other("boom");
        let err = QuoteError::Other(anyhow::Error::new(base));
        assert!(err.to_string().contains("boom"));
    }
}
