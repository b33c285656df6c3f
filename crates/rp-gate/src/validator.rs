use rp_types::Request;

use crate::error::ValidationError;

/// Validation capability the request pipeline depends on.
///
/// The trait is object-safe and `Send + Sync` so a validator can be shared
/// as `Arc<dyn RequestValidator>` across concurrent calls.
pub trait RequestValidator: Send + Sync {
    /// Check the `namespace`/`identifier` path pair.
    fn validate_params(&self, namespace: &str, identifier: &str) -> Result<(), ValidationError>;

    /// Check the request body.
    fn validate_payload(&self, request: &Request) -> Result<(), ValidationError>;
}

/// Validator that accepts everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct AllowAllValidator;

impl RequestValidator for AllowAllValidator {
    fn validate_params(&self, _namespace: &str, _identifier: &str) -> Result<(), ValidationError> {
        Ok(())
    }

    fn validate_payload(&self, _request: &Request) -> Result<(), ValidationError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allow_all_accepts_anything() {
        let v = AllowAllValidator;
        assert!(v.validate_params("", "").is_ok());
        assert!(v.validate_payload(&Request::default()).is_ok());
    }
}
