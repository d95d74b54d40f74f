use crate::error::{QuoteError, QuoteResult};

/// Hard limit on the body text, in characters.
pub const MAX_TEXT_CHARS: usize = 20_000;

/// One card request. A typed struct with a single validation pass replaces
/// any runtime argument-shape dispatch; shape errors are impossible by
/// construction and size errors are caught before any rendering.
#[derive(Clone, Debug)]
pub struct QuoteRequest {
    pub text: String,
    pub author_name: String,
    /// Encoded avatar image in any format the decoder supports.
    pub avatar_bytes: Vec<u8>,
}

impl QuoteRequest {
    pub fn validate(&self) -> QuoteResult<()> {
        if self.text.trim().is_empty() {
            return Err(QuoteError::invalid_input("text must be non-empty"));
        }
        let chars = self.text.chars().count();
        if chars > MAX_TEXT_CHARS {
            return Err(QuoteError::invalid_input(format!(
                "text is {chars} characters, limit is {MAX_TEXT_CHARS}"
            )));
        }
        if self.author_name.trim().is_empty() {
            return Err(QuoteError::invalid_input("author name must be non-empty"));
        }
        if self.avatar_bytes.is_empty() {
            return Err(QuoteError::invalid_input("avatar bytes must be non-empty"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ok_request() -> QuoteRequest {
        QuoteRequest {
            text: "hello".to_string(),
            author_name: "Jane".to_string(),
            avatar_bytes: vec![1, 2, 3],
        }
    }

    #[test]
    fn accepts_a_normal_request() {
        ok_request().validate().unwrap();
    }

    #[test]
    fn limit_is_inclusive_and_counts_characters() {
        let mut req = ok_request();
        req.text = "ё".repeat(MAX_TEXT_CHARS);
        req.validate().unwrap();

        req.text.push('a');
        assert!(matches!(
            req.validate().unwrap_err(),
            QuoteError::InvalidInput(_)
        ));
    }

    #[test]
    fn rejects_missing_fields() {
        let mut req = ok_request();
        req.text = "   ".to_string();
        assert!(req.validate().is_err());

        let mut req = ok_request();
        req.author_name = String::new();
        assert!(req.validate().is_err());

        let mut req = ok_request();
        req.avatar_bytes.clear();
        assert!(req.validate().is_err());
    }
}
