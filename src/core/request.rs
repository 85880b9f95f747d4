//! Orchestration requests
//!
//! What the user asked for: an IDL kind, the interface packages and the
//! target middlewares.

use regex::Regex;

use crate::error::RequestError;

/// Interface package names
const PACKAGE_PATTERN: &str = r"^[A-Za-z][A-Za-z0-9_]*$";

/// Middleware and IDL kind names
const IDENTIFIER_PATTERN: &str = r"^[A-Za-z0-9][A-Za-z0-9_-]*$";

/// A request to build mix artifacts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MixRequest {
    /// IDL kind
    pub idl: String,
    /// Requested packages, in request order
    pub packages: Vec<String>,
    /// Requested middlewares, in request order
    pub middlewares: Vec<String>,
    /// Escalate recoverable problems to fatal
    pub strict: bool,
}

impl MixRequest {
    /// Create a request
    pub fn new(idl: &str, packages: Vec<String>, middlewares: Vec<String>) -> Self {
        Self {
            idl: idl.to_string(),
            packages,
            middlewares,
            strict: false,
        }
    }

    /// Make the request strict
    #[must_use]
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Check names and that something was requested
    pub fn validate(&self) -> Result<(), RequestError> {
        check_name("IDL", &self.idl, IDENTIFIER_PATTERN)?;

        if self.packages.is_empty() {
            return Err(RequestError::Empty { what: "package" });
        }
        if self.middlewares.is_empty() {
            return Err(RequestError::Empty { what: "middleware" });
        }

        for package in &self.packages {
            check_name("package", package, PACKAGE_PATTERN)?;
        }
        for middleware in &self.middlewares {
            check_name("middleware", middleware, IDENTIFIER_PATTERN)?;
        }

        Ok(())
    }
}

/// Whether `name` is a valid interface package name
pub fn is_valid_package_name(name: &str) -> bool {
    matches_pattern(name, PACKAGE_PATTERN)
}

fn matches_pattern(name: &str, pattern: &str) -> bool {
    Regex::new(pattern)
        .map(|re| re.is_match(name))
        .unwrap_or(false)
}

fn check_name(what: &'static str, name: &str, pattern: &str) -> Result<(), RequestError> {
    if matches_pattern(name, pattern) {
        Ok(())
    } else {
        Err(RequestError::InvalidName {
            what,
            name: name.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::generators::package_name;
    use proptest::prelude::*;

    fn request(packages: &[&str], middlewares: &[&str]) -> MixRequest {
        MixRequest::new(
            "rosidl",
            packages.iter().map(ToString::to_string).collect(),
            middlewares.iter().map(ToString::to_string).collect(),
        )
    }

    #[test]
    fn test_valid_request() {
        assert!(request(&["nav_msgs"], &["ros2", "web-socket"]).validate().is_ok());
    }

    #[test]
    fn test_empty_lists_are_rejected() {
        assert_eq!(
            request(&[], &["ros2"]).validate(),
            Err(RequestError::Empty { what: "package" })
        );
        assert_eq!(
            request(&["std_msgs"], &[]).validate(),
            Err(RequestError::Empty { what: "middleware" })
        );
    }

    #[test]
    fn test_invalid_names_are_rejected() {
        let err = request(&["nav-msgs"], &["ros2"]).validate().unwrap_err();
        assert!(matches!(err, RequestError::InvalidName { what: "package", .. }));

        let err = request(&["std_msgs"], &["ros 2"]).validate().unwrap_err();
        assert!(matches!(err, RequestError::InvalidName { what: "middleware", .. }));

        let mut bad_idl = request(&["std_msgs"], &["ros2"]);
        bad_idl.idl = "../idl".to_string();
        assert!(bad_idl.validate().is_err());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn prop_generated_package_names_validate(name in package_name()) {
            let req = request(&[name.as_str()], &["ros2"]);
            prop_assert!(req.validate().is_ok());
        }
    }
}
