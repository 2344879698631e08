//! Requirement source locators.
//!
//! A [`RequirementSource`] names a requirement-list resource inside a
//! package, written `<package>:<resource>` (for example
//! `pak:requirements.txt`). The split is on the *last* colon. How the
//! package name maps to an actual file is up to the
//! [`RequirementLocator`](crate::manager::RequirementLocator) in use.

use std::fmt;
use std::str::FromStr;

use crate::error::LocateError;

/// A parsed `<package>:<resource>` requirement locator.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequirementSource {
    package: String,
    resource: String,
}

impl RequirementSource {
    /// Parse a `<package>:<resource>` locator string.
    ///
    /// The package must be a dotted name with non-empty segments; the
    /// resource must be a plain filename (no path separators, not `..`).
    pub fn parse(value: &str) -> Result<Self, LocateError> {
        let invalid = || LocateError::InvalidSource {
            value: value.to_string(),
        };

        let (package, resource) = value.rsplit_once(':').ok_or_else(invalid)?;
        if package.is_empty() || resource.is_empty() {
            return Err(invalid());
        }
        if package
            .split('.')
            .any(|segment| segment.is_empty() || segment.contains([':', '/', '\\']))
        {
            return Err(invalid());
        }
        if resource.contains(['/', '\\']) || resource == ".." {
            return Err(invalid());
        }

        Ok(Self {
            package: package.to_string(),
            resource: resource.to_string(),
        })
    }

    /// The dotted package name holding the resource.
    pub fn package(&self) -> &str {
        &self.package
    }

    /// The resource filename inside the package.
    pub fn resource(&self) -> &str {
        &self.resource
    }
}

impl FromStr for RequirementSource {
    type Err = LocateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for RequirementSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.package, self.resource)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use rstest::rstest;

    #[test]
    fn test_parse_simple() {
        let source = RequirementSource::parse("pak:requirements.txt").unwrap();
        assert_eq!(source.package(), "pak");
        assert_eq!(source.resource(), "requirements.txt");
        assert_eq!(source.to_string(), "pak:requirements.txt");
    }

    #[test]
    fn test_parse_dotted_package() {
        let source = RequirementSource::parse("nspak.vendor:deps.txt").unwrap();
        assert_eq!(source.package(), "nspak.vendor");
        assert_eq!(source.resource(), "deps.txt");
    }

    #[test]
    fn test_split_is_on_last_colon() {
        // Only the final colon separates package from resource; anything
        // before it must still be a valid dotted package name.
        let err = RequirementSource::parse("a:b:c").unwrap_err();
        assert!(matches!(err, LocateError::InvalidSource { .. }));
    }

    #[rstest]
    #[case("")]
    #[case("pak")]
    #[case(":requirements.txt")]
    #[case("pak:")]
    #[case("pak..sub:requirements.txt")]
    #[case("pak:../requirements.txt")]
    #[case("pak:..")]
    #[case("pa/k:requirements.txt")]
    #[case("pak:sub/requirements.txt")]
    fn test_parse_rejects(#[case] value: &str) {
        let err = RequirementSource::parse(value).unwrap_err();
        assert!(
            matches!(err, LocateError::InvalidSource { value: v } if v == value),
            "expected InvalidSource for {value:?}"
        );
    }

    #[test]
    fn test_from_str_round_trip() {
        let source: RequirementSource = "pak:itk-demo-requirements.txt".parse().unwrap();
        assert_eq!(source.resource(), "itk-demo-requirements.txt");
    }

    proptest! {
        #[test]
        fn prop_display_parse_round_trip(
            package in "[a-z][a-z0-9_]{0,6}(\\.[a-z][a-z0-9_]{0,6}){0,2}",
            resource in "[a-z0-9_-]{1,8}\\.txt",
        ) {
            let text = format!("{package}:{resource}");
            let source = RequirementSource::parse(&text).unwrap();
            prop_assert_eq!(source.package(), package.as_str());
            prop_assert_eq!(source.resource(), resource.as_str());
            prop_assert_eq!(source.to_string(), text);
        }
    }
}
