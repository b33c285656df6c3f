use std::collections::HashSet;

use rp_types::Request;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::validator::RequestValidator;

/// Limits applied by [`RuleValidator`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationRules {
    /// Longest accepted namespace or identifier.
    pub max_identifier_len: usize,
    /// Highest IAL/AAL value a request may demand.
    pub max_assurance_level: u32,
    /// Most data sub-requests in one request.
    pub max_data_requests: usize,
    /// Whether the callback URL must be present.
    pub require_callback_url: bool,
}

impl Default for ValidationRules {
    fn default() -> Self {
        Self {
            max_identifier_len: 128,
            max_assurance_level: 3,
            max_data_requests: 16,
            require_callback_url: false,
        }
    }
}

type PayloadCheck = fn(&ValidationRules, &Request) -> Result<(), String>;

/// Payload checks in evaluation order.
const PAYLOAD_CHECKS: &[(&str, PayloadCheck)] = &[
    ("reference", check_reference),
    ("callback", check_callback),
    ("assurance", check_assurance),
    ("idp", check_idp),
    ("timeout", check_timeout),
    ("data_requests", check_data_requests),
];

/// Rule-driven validator.
///
/// Runs each check in order and reports the first failure.
#[derive(Clone, Debug, Default)]
pub struct RuleValidator {
    rules: ValidationRules,
}

impl RuleValidator {
    pub fn new(rules: ValidationRules) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &ValidationRules {
        &self.rules
    }

    fn check_path_segment(&self, param: &'static str, value: &str) -> Result<(), ValidationError> {
        if value.is_empty() {
            return Err(ValidationError::param(param, "must not be empty"));
        }
        if value.chars().count() > self.rules.max_identifier_len {
            return Err(ValidationError::param(
                param,
                format!("longer than {} characters", self.rules.max_identifier_len),
            ));
        }
        if let Some(bad) = value
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || "-_.:@".contains(*c)))
        {
            return Err(ValidationError::param(
                param,
                format!("contains disallowed character {bad:?}"),
            ));
        }
        Ok(())
    }
}

impl RequestValidator for RuleValidator {
    fn validate_params(&self, namespace: &str, identifier: &str) -> Result<(), ValidationError> {
        self.check_path_segment("namespace", namespace)?;
        self.check_path_segment("identifier", identifier)
    }

    fn validate_payload(&self, request: &Request) -> Result<(), ValidationError> {
        for &(rule, check) in PAYLOAD_CHECKS {
            if let Err(reason) = check(&self.rules, request) {
                tracing::debug!(rule, %reason, "payload rejected");
                return Err(ValidationError::payload(rule, reason));
            }
        }
        Ok(())
    }
}

fn check_reference(_rules: &ValidationRules, req: &Request) -> Result<(), String> {
    if req.reference_id.trim().is_empty() {
        return Err("reference_id must not be empty".into());
    }
    Ok(())
}

fn check_callback(rules: &ValidationRules, req: &Request) -> Result<(), String> {
    let url = req.callback_url.as_str();
    if url.is_empty() {
        if rules.require_callback_url {
            return Err("callback_url is required".into());
        }
        return Ok(());
    }
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(format!("callback_url must be an http(s) URL, got {url:?}"));
    }
    Ok(())
}

fn check_assurance(rules: &ValidationRules, req: &Request) -> Result<(), String> {
    let max = rules.max_assurance_level;
    for (name, level) in [("min_ial", req.min_ial), ("min_aal", req.min_aal)] {
        if !(1..=max).contains(&level) {
            return Err(format!("{name} must be between 1 and {max}, got {level}"));
        }
    }
    Ok(())
}

fn check_idp(_rules: &ValidationRules, req: &Request) -> Result<(), String> {
    if req.min_idp == 0 {
        return Err("min_idp must be at least 1".into());
    }
    if !req.idp_list.is_empty() && req.min_idp as usize > req.idp_list.len() {
        return Err(format!(
            "min_idp ({}) exceeds the number of listed IdPs ({})",
            req.min_idp,
            req.idp_list.len()
        ));
    }
    Ok(())
}

fn check_timeout(_rules: &ValidationRules, req: &Request) -> Result<(), String> {
    if req.timeout == 0 {
        return Err("timeout must be greater than zero".into());
    }
    Ok(())
}

fn check_data_requests(rules: &ValidationRules, req: &Request) -> Result<(), String> {
    if req.data_request_list.len() > rules.max_data_requests {
        return Err(format!(
            "too many data requests: {} exceeds maximum of {}",
            req.data_request_list.len(),
            rules.max_data_requests
        ));
    }
    let mut services = HashSet::new();
    for (i, item) in req.data_request_list.iter().enumerate() {
        if item.service_id.trim().is_empty() {
            return Err(format!("data request at index {i} has an empty service_id"));
        }
        if !services.insert(item.service_id.as_str()) {
            return Err(format!("service_id {:?} is requested twice", item.service_id));
        }
        if item.count == 0 {
            return Err(format!("data request {:?} must ask for at least one answer", item.service_id));
        }
        if !item.as_ids.is_empty() && item.count as usize > item.as_ids.len() {
            return Err(format!(
                "data request {:?} asks for {} answers from {} listed AS",
                item.service_id,
                item.count,
                item.as_ids.len()
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use rp_types::DataRequestItem;

    use super::*;

    fn valid_request() -> Request {
        Request {
            reference_id: "ref-1".into(),
            idp_list: vec!["idp1".into(), "idp2".into()],
            callback_url: "https://rp.example/callback".into(),
            data_request_list: vec![DataRequestItem {
                service_id: "bank_statement".into(),
                as_ids: vec!["as1".into()],
                count: 1,
                ..Default::default()
            }],
            request_message: "Please verify".into(),
            min_ial: 2,
            min_aal: 2,
            min_idp: 1,
            request_timeout: 300,
            timeout: 600,
        }
    }

    fn rule_of(err: ValidationError) -> &'static str {
        match err {
            ValidationError::InvalidPayload { rule, .. } => rule,
            other => panic!("expected payload error, got {other:?}"),
        }
    }

    fn validator() -> RuleValidator {
        RuleValidator::new(ValidationRules::default())
    }

    // -----------------------------------------------------------------------
    // Path parameters
    // -----------------------------------------------------------------------
    #[test]
    fn accepts_typical_params() {
        assert!(validator().validate_params("citizen_id", "1100400000000").is_ok());
    }

    #[test]
    fn rejects_empty_namespace() {
        let err = validator().validate_params("", "123").unwrap_err();
        assert_eq!(err, ValidationError::param("namespace", "must not be empty"));
    }

    #[test]
    fn rejects_odd_characters_in_identifier() {
        let err = validator().validate_params("ns", "12 3").unwrap_err();
        assert!(matches!(err, ValidationError::InvalidParam { param: "identifier", .. }));
    }

    #[test]
    fn rejects_overlong_identifier() {
        let rules = ValidationRules {
            max_identifier_len: 4,
            ..Default::default()
        };
        let err = RuleValidator::new(rules).validate_params("ns", "12345").unwrap_err();
        assert!(err.to_string().contains("longer than 4"));
    }

    // -----------------------------------------------------------------------
    // Payload
    // -----------------------------------------------------------------------
    #[test]
    fn accepts_valid_payload() {
        assert!(validator().validate_payload(&valid_request()).is_ok());
    }

    #[test]
    fn rejects_blank_reference() {
        let mut req = valid_request();
        req.reference_id = "  ".into();
        assert_eq!(rule_of(validator().validate_payload(&req).unwrap_err()), "reference");
    }

    #[test]
    fn rejects_non_http_callback() {
        let mut req = valid_request();
        req.callback_url = "ftp://rp.example".into();
        assert_eq!(rule_of(validator().validate_payload(&req).unwrap_err()), "callback");
    }

    #[test]
    fn callback_can_be_required() {
        let mut req = valid_request();
        req.callback_url.clear();
        assert!(validator().validate_payload(&req).is_ok());
        let strict = RuleValidator::new(ValidationRules {
            require_callback_url: true,
            ..Default::default()
        });
        assert_eq!(rule_of(strict.validate_payload(&req).unwrap_err()), "callback");
    }

    #[test]
    fn rejects_out_of_range_assurance() {
        let mut req = valid_request();
        req.min_aal = 4;
        let err = validator().validate_payload(&req).unwrap_err();
        assert!(err.to_string().contains("min_aal"));
        req.min_aal = 2;
        req.min_ial = 0;
        assert_eq!(rule_of(validator().validate_payload(&req).unwrap_err()), "assurance");
    }

    #[test]
    fn rejects_min_idp_above_list() {
        let mut req = valid_request();
        req.min_idp = 3;
        assert_eq!(rule_of(validator().validate_payload(&req).unwrap_err()), "idp");
        req.idp_list.clear();
        assert!(validator().validate_payload(&req).is_ok());
    }

    #[test]
    fn rejects_zero_timeout() {
        let mut req = valid_request();
        req.timeout = 0;
        assert_eq!(rule_of(validator().validate_payload(&req).unwrap_err()), "timeout");
    }

    #[test]
    fn rejects_duplicate_services() {
        let mut req = valid_request();
        req.data_request_list.push(req.data_request_list[0].clone());
        let err = validator().validate_payload(&req).unwrap_err();
        assert!(err.to_string().contains("requested twice"));
    }

    #[test]
    fn rejects_count_above_listed_as() {
        let mut req = valid_request();
        req.data_request_list[0].count = 2;
        assert_eq!(rule_of(validator().validate_payload(&req).unwrap_err()), "data_requests");
    }

    #[test]
    fn rejects_too_many_data_requests() {
        let rules = ValidationRules {
            max_data_requests: 0,
            ..Default::default()
        };
        let err = RuleValidator::new(rules).validate_payload(&valid_request()).unwrap_err();
        assert!(err.to_string().contains("too many data requests"));
    }

    #[test]
    fn first_failure_wins() {
        let mut req = valid_request();
        req.reference_id.clear();
        req.timeout = 0;
        assert_eq!(rule_of(validator().validate_payload(&req).unwrap_err()), "reference");
    }

    #[test]
    fn rules_load_from_partial_toml() {
        let rules: ValidationRules = toml::from_str("max_data_requests = 4").unwrap();
        assert_eq!(rules.max_data_requests, 4);
        assert_eq!(rules.max_assurance_level, 3);
    }
}
