//! Request validation for the relying-party node.
//!
//! Nothing reaches request-ID derivation or the ledger without passing a
//! [`RequestValidator`]. Two validators ship with the crate:
//!
//! - [`AllowAllValidator`] accepts everything (tests, local development).
//! - [`RuleValidator`] runs an ordered list of named checks configured by
//!   [`ValidationRules`] and stops at the first failure.
//!
//! # Quick Start
//!
//! ```rust
//! use rp_gate::{RequestValidator, RuleValidator, ValidationRules};
//! use rp_types::Request;
//!
//! let validator = RuleValidator::new(ValidationRules::default());
//! assert!(validator.validate_params("citizen_id", "1234567890123").is_ok());
//! assert!(validator.validate_payload(&Request::default()).is_err());
//! ```

pub mod error;
pub mod rules;
pub mod validator;

pub use error::ValidationError;
pub use rules::{RuleValidator, ValidationRules};
pub use validator::{AllowAllValidator, RequestValidator};
