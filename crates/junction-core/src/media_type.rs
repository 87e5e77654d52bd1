//! Media types with wildcard matching and quality values.
//!
//! This module provides the [`MediaType`] value type used on both sides of
//! content negotiation:
//! - Parsing of `type/subtype` forms with optional parameters
//! - Wildcard matching (`*/*` and `type/*`)
//! - Specificity ranking and `q` quality values
//!
//! # Example
//!
//! ```
//! use junction_core::MediaType;
//!
//! let accept = MediaType::parse("text/*;q=0.5").unwrap();
//! assert!(accept.matches(&MediaType::html()));
//! assert_eq!(accept.quality(), 0.5);
//! ```

use std::fmt;

/// How specific a media type is, for ranking negotiation candidates.
///
/// Ordering is `Exact > SubtypeWildcard > Wildcard`, so a plain
/// comparison picks the more specific candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Specificity {
    /// `*/*`
    Wildcard,
    /// `type/*`
    SubtypeWildcard,
    /// `type/subtype`
    Exact,
}

/// Error produced when a media type fails to parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaTypeError {
    /// Input is not a `type/subtype` form.
    Malformed {
        /// The rejected input.
        input: String,
    },
    /// A `q` parameter was present but not a number in `[0, 1]`.
    InvalidQuality {
        /// The rejected quality value.
        value: String,
    },
    /// A wildcard primary type was combined with a concrete subtype.
    WildcardPrimary {
        /// The rejected input.
        input: String,
    },
}

impl fmt::Display for MediaTypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed { input } => write!(f, "malformed media type: {input:?}"),
            Self::InvalidQuality { value } => {
                write!(f, "quality must be a number in [0, 1], got {value:?}")
            }
            Self::WildcardPrimary { input } => {
                write!(f, "wildcard primary with concrete subtype: {input:?}")
            }
        }
    }
}

impl std::error::Error for MediaTypeError {}

/// A media type: `type/subtype` plus ordered parameters.
///
/// Type and subtype are stored lowercased; comparison and matching are
/// case-insensitive as a consequence. Parameters keep their declaration
/// order. Equality is structural, so `text/html` and `text/html;q=0.8`
/// are distinct values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaType {
    primary: String,
    subtype: String,
    params: Vec<(String, String)>,
}

impl MediaType {
    /// Build a media type from its two components.
    ///
    /// Components are lowercased. A wildcard primary with a concrete
    /// subtype is not a meaningful media type; [`parse`](Self::parse)
    /// rejects it and programmatic callers are expected not to build one.
    #[must_use]
    pub fn new(primary: impl Into<String>, subtype: impl Into<String>) -> Self {
        let primary = primary.into().to_ascii_lowercase();
        let subtype = subtype.into().to_ascii_lowercase();
        debug_assert!(
            primary != "*" || subtype == "*",
            "wildcard primary requires wildcard subtype"
        );
        Self {
            primary,
            subtype,
            params: Vec::new(),
        }
    }

    /// `*/*`
    #[must_use]
    pub fn any() -> Self {
        Self::new("*", "*")
    }

    /// `text/*`
    #[must_use]
    pub fn text() -> Self {
        Self::new("text", "*")
    }

    /// `text/plain`
    #[must_use]
    pub fn plain() -> Self {
        Self::new("text", "plain")
    }

    /// `text/html`
    #[must_use]
    pub fn html() -> Self {
        Self::new("text", "html")
    }

    /// `text/css`
    #[must_use]
    pub fn css() -> Self {
        Self::new("text", "css")
    }

    /// `application/javascript`
    #[must_use]
    pub fn javascript() -> Self {
        Self::new("application", "javascript")
    }

    /// `application/json`
    #[must_use]
    pub fn json() -> Self {
        Self::new("application", "json")
    }

    /// `application/xml`
    #[must_use]
    pub fn xml() -> Self {
        Self::new("application", "xml")
    }

    /// `application/octet-stream`
    #[must_use]
    pub fn octet_stream() -> Self {
        Self::new("application", "octet-stream")
    }

    /// `application/x-www-form-urlencoded`
    #[must_use]
    pub fn form() -> Self {
        Self::new("application", "x-www-form-urlencoded")
    }

    /// Parse a single media type.
    ///
    /// Accepts `type/subtype`, a bare `*` (shorthand for `*/*`), and
    /// `;`-separated parameters. Parameter values may be double-quoted;
    /// quotes are trimmed. Parameters without `=` are skipped. A `q`
    /// parameter must be a number in `[0, 1]`.
    ///
    /// # Example
    ///
    /// ```
    /// use junction_core::MediaType;
    ///
    /// let mt = MediaType::parse("Application/JSON; charset=\"utf-8\"").unwrap();
    /// assert_eq!(mt.primary(), "application");
    /// assert_eq!(mt.subtype(), "json");
    /// assert_eq!(mt.param("charset"), Some("utf-8"));
    /// ```
    pub fn parse(input: &str) -> Result<Self, MediaTypeError> {
        let mut pieces = input.split(';');
        let head = pieces.next().unwrap_or_default().trim();

        let (primary, subtype) = if head == "*" {
            ("*".to_string(), "*".to_string())
        } else {
            match head.split_once('/') {
                Some((p, s)) if !p.trim().is_empty() && !s.trim().is_empty() => {
                    let p = p.trim();
                    let s = s.trim();
                    if s.contains('/') {
                        return Err(MediaTypeError::Malformed {
                            input: input.to_string(),
                        });
                    }
                    (p.to_ascii_lowercase(), s.to_ascii_lowercase())
                }
                _ => {
                    return Err(MediaTypeError::Malformed {
                        input: input.to_string(),
                    });
                }
            }
        };

        if primary == "*" && subtype != "*" {
            return Err(MediaTypeError::WildcardPrimary {
                input: input.to_string(),
            });
        }

        let mut params = Vec::new();
        for piece in pieces {
            let piece = piece.trim();
            if piece.is_empty() {
                continue;
            }
            let Some((name, value)) = piece.split_once('=') else {
                continue;
            };
            let name = name.trim().to_ascii_lowercase();
            let value = value.trim().trim_matches('"').to_string();
            if name == "q" {
                let parsed: Result<f32, _> = value.parse();
                match parsed {
                    Ok(q) if (0.0..=1.0).contains(&q) => {}
                    _ => return Err(MediaTypeError::InvalidQuality { value }),
                }
            }
            params.push((name, value));
        }

        Ok(Self {
            primary,
            subtype,
            params,
        })
    }

    /// Parse a comma-separated list of media types (Accept header form).
    ///
    /// Empty entries are skipped; any entry failing to parse fails the
    /// whole list.
    pub fn parse_list(input: &str) -> Result<Vec<Self>, MediaTypeError> {
        let mut out = Vec::new();
        for piece in input.split(',') {
            let piece = piece.trim();
            if piece.is_empty() {
                continue;
            }
            out.push(Self::parse(piece)?);
        }
        Ok(out)
    }

    /// The primary type (`text` in `text/html`).
    #[must_use]
    pub fn primary(&self) -> &str {
        &self.primary
    }

    /// The subtype (`html` in `text/html`).
    #[must_use]
    pub fn subtype(&self) -> &str {
        &self.subtype
    }

    /// All parameters in declaration order.
    #[must_use]
    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    /// Look up a parameter value by (lowercased) name.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Add or replace a parameter, consuming self.
    #[must_use]
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into().to_ascii_lowercase();
        self.params.retain(|(n, _)| *n != name);
        self.params.push((name, value.into()));
        self
    }

    /// Set the `q` parameter, clamped to `[0, 1]`.
    #[must_use]
    pub fn with_quality(self, quality: f32) -> Self {
        let q = quality.clamp(0.0, 1.0);
        self.with_param("q", format!("{q}"))
    }

    /// The quality value: the `q` parameter, defaulting to `1.0`.
    #[must_use]
    pub fn quality(&self) -> f32 {
        self.param("q")
            .and_then(|v| v.parse().ok())
            .unwrap_or(1.0)
    }

    /// How specific this type is.
    #[must_use]
    pub fn specificity(&self) -> Specificity {
        match (self.primary.as_str(), self.subtype.as_str()) {
            ("*", _) => Specificity::Wildcard,
            (_, "*") => Specificity::SubtypeWildcard,
            _ => Specificity::Exact,
        }
    }

    /// Structural wildcard match against another type.
    ///
    /// Each component matches if the two sides are equal or either side
    /// is `*`. Parameters do not participate.
    ///
    /// # Example
    ///
    /// ```
    /// use junction_core::MediaType;
    ///
    /// assert!(MediaType::text().matches(&MediaType::html()));
    /// assert!(MediaType::html().matches(&MediaType::text()));
    /// assert!(!MediaType::text().matches(&MediaType::json()));
    /// ```
    #[must_use]
    pub fn matches(&self, other: &MediaType) -> bool {
        fn component(a: &str, b: &str) -> bool {
            a == "*" || b == "*" || a == b
        }
        component(&self.primary, &other.primary) && component(&self.subtype, &other.subtype)
    }

    /// Whether this type carries textual content.
    ///
    /// Covers `text/*` plus the application types that are text on the
    /// wire: JSON, JavaScript, and XML.
    #[must_use]
    pub fn is_text_like(&self) -> bool {
        if self.primary == "text" || self.primary == "*" {
            return true;
        }
        self.primary == "application"
            && matches!(self.subtype.as_str(), "json" | "javascript" | "xml")
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.primary, self.subtype)?;
        for (name, value) in &self.params {
            write!(f, ";{name}={value}")?;
        }
        Ok(())
    }
}
