//! HTTP methods and route verb filters.

use std::fmt;

/// HTTP request method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// GET
    Get,
    /// HEAD
    Head,
    /// POST
    Post,
    /// PUT
    Put,
    /// DELETE
    Delete,
    /// PATCH
    Patch,
    /// OPTIONS
    Options,
    /// TRACE
    Trace,
}

impl Method {
    /// Parse a method token (uppercase, as it appears on the request line).
    ///
    /// # Example
    ///
    /// ```
    /// use junction_core::Method;
    ///
    /// assert_eq!(Method::parse("GET"), Some(Method::Get));
    /// assert_eq!(Method::parse("get"), None);
    /// assert_eq!(Method::parse("BREW"), None);
    /// ```
    #[must_use]
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "GET" => Some(Self::Get),
            "HEAD" => Some(Self::Head),
            "POST" => Some(Self::Post),
            "PUT" => Some(Self::Put),
            "DELETE" => Some(Self::Delete),
            "PATCH" => Some(Self::Patch),
            "OPTIONS" => Some(Self::Options),
            "TRACE" => Some(Self::Trace),
            _ => None,
        }
    }

    /// The canonical uppercase token.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Head => "HEAD",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Patch => "PATCH",
            Self::Options => "OPTIONS",
            Self::Trace => "TRACE",
        }
    }

    /// Whether requests with this method conventionally carry a body.
    #[must_use]
    pub fn expects_body(self) -> bool {
        matches!(self, Self::Post | Self::Put | Self::Patch)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The method filter attached to a route.
///
/// Routes registered through the verb constructors accept exactly one
/// method; routes registered with [`Verb::Any`] accept every method and
/// behave like the wildcard-verb filters of classic web frameworks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    /// Accept any request method.
    Any,
    /// Accept exactly one method.
    Only(Method),
}

impl Verb {
    /// Whether this filter admits the given request method.
    #[must_use]
    pub fn admits(self, method: Method) -> bool {
        match self {
            Self::Any => true,
            Self::Only(m) => m == method,
        }
    }
}

impl From<Method> for Verb {
    fn from(method: Method) -> Self {
        Self::Only(method)
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str("*"),
            Self::Only(m) => f.write_str(m.as_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_roundtrip() {
        for token in [
            "GET", "HEAD", "POST", "PUT", "DELETE", "PATCH", "OPTIONS", "TRACE",
        ] {
            let method = Method::parse(token).unwrap();
            assert_eq!(method.as_str(), token);
        }
    }

    #[test]
    fn parse_rejects_lowercase_and_unknown() {
        assert_eq!(Method::parse("get"), None);
        assert_eq!(Method::parse("CONNECT"), None);
        assert_eq!(Method::parse(""), None);
    }

    #[test]
    fn expects_body_covers_mutating_methods() {
        assert!(Method::Post.expects_body());
        assert!(Method::Put.expects_body());
        assert!(Method::Patch.expects_body());
        assert!(!Method::Get.expects_body());
        assert!(!Method::Delete.expects_body());
    }

    #[test]
    fn any_verb_admits_everything() {
        assert!(Verb::Any.admits(Method::Get));
        assert!(Verb::Any.admits(Method::Trace));
    }

    #[test]
    fn only_verb_admits_its_method() {
        let verb = Verb::from(Method::Post);
        assert!(verb.admits(Method::Post));
        assert!(!verb.admits(Method::Get));
    }

    #[test]
    fn display_formats() {
        assert_eq!(Method::Delete.to_string(), "DELETE");
        assert_eq!(Verb::Any.to_string(), "*");
        assert_eq!(Verb::Only(Method::Get).to_string(), "GET");
    }
}
