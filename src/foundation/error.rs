/// Convenience result type used across flapgen.
pub type FlapgenResult<T> = Result<T, FlapgenError>;

/// Top-level error taxonomy used by both pipelines.
#[derive(thiserror::Error, Debug)]
pub enum FlapgenError {
    /// Invalid user-provided parameters.
    #[error("validation error: {0}")]
    Validation(String),

    /// Errors while assembling or serializing the audio track.
    #[error("synthesis error: {0}")]
    Synth(String),

    /// Errors while rasterizing or writing animation frames.
    #[error("render error: {0}")]
    Render(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FlapgenError {
    /// Build a [`FlapgenError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`FlapgenError::Synth`] value.
    pub fn synth(msg: impl Into<String>) -> Self {
        Self::Synth(msg.into())
    }

    /// Build a [`FlapgenError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_are_stable() {
        assert!(
            FlapgenError::validation("x")
                .to_string()
                .contains("validation error:")
        );
        assert!(FlapgenError::synth("x").to_string().contains("synthesis error:"));
        assert!(FlapgenError::render("x").to_string().contains("render error:"));
    }

    #[test]
    fn other_preserves_source() {
        let base = std::io::Error::other("boom");
        let err = FlapgenError::Other(anyhow::Error::new(base));
        assert!(err.to_string().contains("boom"));
    }
}
