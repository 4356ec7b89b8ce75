use thiserror::Error;

/// Errors raised while encoding labels, invoking the decoder or encoding frames.
#[derive(Debug, Error)]
pub enum CvaeError {
    #[error("Unknown label '{0}'")]
    InvalidLabel(String),
    #[error("Decoder output shape mismatch: {0}")]
    ShapeMismatch(String),
    #[error("Decoder invocation failed: {0}")]
    InferenceFailed(anyhow::Error),
    #[error("Frame encoding failed: {0}")]
    Encoding(String),
}

impl CvaeError {
    pub fn shape_mismatch(msg: impl Into<String>) -> Self {
        Self::ShapeMismatch(msg.into())
    }

    pub fn encoding(msg: impl Into<String>) -> Self {
        Self::Encoding(msg.into())
    }
}

pub type CvaeResult<T> = Result<T, CvaeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_label_names_the_label() {
        let err = CvaeError::InvalidLabel("fish".to_string());
        assert_eq!(err.to_string(), "Unknown label 'fish'");
    }

    #[test]
    fn inference_failure_keeps_the_source_message() {
        let err = CvaeError::InferenceFailed(anyhow::anyhow!("nan in output"));
        assert!(err.to_string().contains("nan in output"));
    }
}
