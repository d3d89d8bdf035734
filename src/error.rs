/// Failure of a single render call.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Invalid parameter `{field}`: {reason}")]
    InvalidParameter { field: &'static str, reason: String },

    #[error("Render failed: {0}")]
    RenderFailure(String),
}

impl RenderError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            field,
            reason: reason.into(),
        }
    }

    pub fn failure(context: &str, err: impl std::fmt::Display) -> Self {
        Self::RenderFailure(format!("{}: {}", context, err))
    }

    pub fn is_invalid_parameter(&self) -> bool {
        matches!(self, Self::InvalidParameter { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::RenderError;

    #[test]
    fn messages_name_the_offending_field() {
        let err = RenderError::invalid("rooms", "must be at least 1, got 0");
        assert_eq!(
            err.to_string(),
            "Invalid parameter `rooms`: must be at least 1, got 0"
        );
        assert!(err.is_invalid_parameter());
    }

    #[test]
    fn failures_carry_their_context() {
        let err = RenderError::failure("Failed to encode PNG", "out of memory");
        assert_eq!(err.to_string(), "Render failed: Failed to encode PNG: out of memory");
        assert!(!err.is_invalid_parameter());
    }
}
