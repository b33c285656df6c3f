/// Why a request was refused before processing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// A path parameter (namespace or identifier) is malformed.
    #[error("invalid {param}: {reason}")]
    InvalidParam { param: &'static str, reason: String },

    /// The request body broke a payload rule.
    #[error("{reason}")]
    InvalidPayload { rule: &'static str, reason: String },
}

impl ValidationError {
    pub fn param(param: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParam {
            param,
            reason: reason.into(),
        }
    }

    pub fn payload(rule: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidPayload {
            rule,
            reason: reason.into(),
        }
    }
}
