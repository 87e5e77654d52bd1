//! Ant-style path patterns.
//!
//! Patterns are `/`-segmented and matched segment by segment:
//! - literal segments compare case-sensitively
//! - `?` matches one non-slash character, `*` a run of them
//! - `{name}`, `{name:regex}`, and the `:name` shorthand capture one
//!   non-empty segment
//! - a final `**` swallows the remaining segments, zero included
//!
//! Compilation is fail-fast: a bad pattern never reaches the routing
//! table.
//!
//! # Example
//!
//! ```
//! use junction_router::PathPattern;
//!
//! let pattern = PathPattern::compile("/user/{id}/files/**").unwrap();
//! let m = pattern.match_path("/user/7/files/docs/a.txt").unwrap();
//! assert_eq!(m.var("id"), Some("7"));
//! assert_eq!(m.tail(), Some("docs/a.txt"));
//! ```

use std::fmt;

use junction_core::PathVars;
use regex::Regex;

/// Error produced when a pattern fails to compile.
#[derive(Debug)]
pub enum PatternError {
    /// `**` somewhere other than the final segment.
    WildcardNotLast {
        /// The offending pattern.
        pattern: String,
    },
    /// A `{` segment without its closing `}`.
    UnclosedBrace {
        /// The offending segment.
        segment: String,
    },
    /// A variable with no name (`{}` or a bare `:`).
    EmptyVariableName {
        /// The offending segment.
        segment: String,
    },
    /// The same variable name captured twice.
    DuplicateVariable {
        /// The repeated name.
        name: String,
    },
    /// An inline constraint or glob segment failed to compile.
    InvalidRegex {
        /// The rejected expression.
        pattern: String,
        /// The underlying regex error.
        source: regex::Error,
    },
}

impl fmt::Display for PatternError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WildcardNotLast { pattern } => {
                write!(f, "`**` must be the final segment: {pattern:?}")
            }
            Self::UnclosedBrace { segment } => {
                write!(f, "unclosed variable brace in segment {segment:?}")
            }
            Self::EmptyVariableName { segment } => {
                write!(f, "empty variable name in segment {segment:?}")
            }
            Self::DuplicateVariable { name } => {
                write!(f, "duplicate variable name {name:?}")
            }
            Self::InvalidRegex { pattern, source } => {
                write!(f, "invalid constraint {pattern:?}: {source}")
            }
        }
    }
}

impl std::error::Error for PatternError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidRegex { source, .. } => Some(source),
            _ => None,
        }
    }
}

#[derive(Debug)]
enum Segment {
    Literal(String),
    Glob(Regex),
    Var {
        name: String,
        constraint: Option<Regex>,
    },
}

/// A compiled path pattern.
#[derive(Debug)]
pub struct PathPattern {
    raw: String,
    segments: Vec<Segment>,
    trailing: bool,
    var_count: usize,
}

impl PathPattern {
    /// Compile a pattern, validating every segment.
    pub fn compile(pattern: &str) -> Result<Self, PatternError> {
        let trimmed = pattern.strip_prefix('/').unwrap_or(pattern);
        let parts: Vec<&str> = trimmed.split('/').collect();

        let mut segments = Vec::with_capacity(parts.len());
        let mut names: Vec<&str> = Vec::new();
        let mut trailing = false;

        for (idx, part) in parts.iter().copied().enumerate() {
            if part == "**" {
                if idx + 1 != parts.len() {
                    return Err(PatternError::WildcardNotLast {
                        pattern: pattern.to_string(),
                    });
                }
                trailing = true;
                continue;
            }

            let segment = if let Some(name) = part.strip_prefix(':') {
                if name.is_empty() {
                    return Err(PatternError::EmptyVariableName {
                        segment: part.to_string(),
                    });
                }
                claim_name(&mut names, name)?;
                Segment::Var {
                    name: name.to_string(),
                    constraint: None,
                }
            } else if part.starts_with('{') {
                if part.len() < 2 || !part.ends_with('}') {
                    return Err(PatternError::UnclosedBrace {
                        segment: part.to_string(),
                    });
                }
                let inner = &part[1..part.len() - 1];
                let (name, constraint) = match inner.split_once(':') {
                    Some((name, constraint)) => (name, Some(constraint)),
                    None => (inner, None),
                };
                if name.is_empty() {
                    return Err(PatternError::EmptyVariableName {
                        segment: part.to_string(),
                    });
                }
                claim_name(&mut names, name)?;
                let constraint = match constraint {
                    Some(c) => Some(anchored(c).map_err(|source| PatternError::InvalidRegex {
                        pattern: c.to_string(),
                        source,
                    })?),
                    None => None,
                };
                Segment::Var {
                    name: name.to_string(),
                    constraint,
                }
            } else if part.contains('*') || part.contains('?') {
                let regex = glob_regex(part).map_err(|source| PatternError::InvalidRegex {
                    pattern: part.to_string(),
                    source,
                })?;
                Segment::Glob(regex)
            } else {
                Segment::Literal(part.to_string())
            };
            segments.push(segment);
        }

        let var_count = names.len();
        Ok(Self {
            raw: pattern.to_string(),
            segments,
            trailing,
            var_count,
        })
    }

    /// The pattern text as written.
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Whether the pattern ends in `**`.
    #[must_use]
    pub fn has_trailing_wildcard(&self) -> bool {
        self.trailing
    }

    /// Number of named variables.
    #[must_use]
    pub fn var_count(&self) -> usize {
        self.var_count
    }

    /// Match a request path against this pattern.
    ///
    /// Returns borrowed captures on success: names borrow from the
    /// pattern, values from the path. A trailing wildcard also yields
    /// the remainder of the path, which is empty when the wildcard
    /// matched zero segments: `/assets/**` matches `/assets/` but not
    /// `/assets`.
    #[must_use]
    pub fn match_path<'n, 'v>(&'n self, path: &'v str) -> Option<PathMatch<'n, 'v>> {
        let trimmed = path.strip_prefix('/').unwrap_or(path);
        let parts: Vec<&str> = trimmed.split('/').collect();
        let fixed = self.segments.len();

        if self.trailing {
            if parts.len() < fixed + 1 {
                return None;
            }
        } else if parts.len() != fixed {
            return None;
        }

        let mut vars = Vec::with_capacity(self.var_count);
        for (segment, part) in self.segments.iter().zip(parts.iter().copied()) {
            match segment {
                Segment::Literal(lit) => {
                    if lit != part {
                        return None;
                    }
                }
                Segment::Glob(regex) => {
                    if !regex.is_match(part) {
                        return None;
                    }
                }
                Segment::Var { name, constraint } => {
                    if part.is_empty() {
                        return None;
                    }
                    if let Some(regex) = constraint {
                        if !regex.is_match(part) {
                            return None;
                        }
                    }
                    vars.push((name.as_str(), part));
                }
            }
        }

        let tail = if self.trailing {
            let consumed: usize = parts[..fixed].iter().map(|p| p.len()).sum::<usize>() + fixed;
            Some(&trimmed[consumed..])
        } else {
            None
        };

        Some(PathMatch { vars, tail })
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// A successful pattern match with borrowed captures.
///
/// `'n` is the pattern borrow (capture names), `'v` the path borrow
/// (capture values). Keeping them apart lets a caller drop the path
/// borrow by copying values out while still holding the pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathMatch<'n, 'v> {
    vars: Vec<(&'n str, &'v str)>,
    tail: Option<&'v str>,
}

impl<'n, 'v> PathMatch<'n, 'v> {
    /// Look up a capture by variable name.
    #[must_use]
    pub fn var(&self, name: &str) -> Option<&'v str> {
        self.vars
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| *v)
    }

    /// All captures in pattern order.
    #[must_use]
    pub fn vars(&self) -> &[(&'n str, &'v str)] {
        &self.vars
    }

    /// The remainder matched by a trailing wildcard, if any.
    #[must_use]
    pub fn tail(&self) -> Option<&'v str> {
        self.tail
    }

    /// Copy the captures into owned path variables.
    #[must_use]
    pub fn to_vars(&self) -> PathVars {
        PathVars::new(
            self.vars
                .iter()
                .map(|(n, v)| ((*n).to_string(), (*v).to_string()))
                .collect(),
            self.tail.map(str::to_string),
        )
    }
}

fn claim_name<'a>(names: &mut Vec<&'a str>, name: &'a str) -> Result<(), PatternError> {
    if names.contains(&name) {
        return Err(PatternError::DuplicateVariable {
            name: name.to_string(),
        });
    }
    names.push(name);
    Ok(())
}

fn anchored(constraint: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!("^(?:{constraint})$"))
}

fn glob_regex(segment: &str) -> Result<Regex, regex::Error> {
    let mut pattern = String::with_capacity(segment.len() + 8);
    pattern.push('^');
    for c in segment.chars() {
        match c {
            '*' => pattern.push_str("[^/]*"),
            '?' => pattern.push_str("[^/]"),
            other => pattern.push_str(&regex::escape(other.encode_utf8(&mut [0u8; 4]))),
        }
    }
    pattern.push('$');
    Regex::new(&pattern)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compile(pattern: &str) -> PathPattern {
        PathPattern::compile(pattern).unwrap()
    }

    // ==== Literals ====

    #[test]
    fn literal_match() {
        let p = compile("/user/list");
        assert!(p.match_path("/user/list").is_some());
        assert!(p.match_path("/user/other").is_none());
        assert!(p.match_path("/user").is_none());
        assert!(p.match_path("/user/list/extra").is_none());
    }

    #[test]
    fn root_pattern() {
        let p = compile("/");
        assert!(p.match_path("/").is_some());
        assert!(p.match_path("/x").is_none());
    }

    #[test]
    fn literals_are_case_sensitive() {
        let p = compile("/Files");
        assert!(p.match_path("/Files").is_some());
        assert!(p.match_path("/files").is_none());
    }

    // ==== Globs ====

    #[test]
    fn question_mark_matches_one_char() {
        let p = compile("/com/t?st.jsp");
        assert!(p.match_path("/com/test.jsp").is_some());
        assert!(p.match_path("/com/tast.jsp").is_some());
        assert!(p.match_path("/com/tst.jsp").is_none());
        assert!(p.match_path("/com/teest.jsp").is_none());
    }

    #[test]
    fn star_matches_within_segment() {
        let p = compile("/com/*.jsp");
        assert!(p.match_path("/com/test.jsp").is_some());
        assert!(p.match_path("/com/.jsp").is_some());
        assert!(p.match_path("/com/dir/test.jsp").is_none());
    }

    #[test]
    fn glob_escapes_regex_metachars() {
        let p = compile("/files/*.tar.gz");
        assert!(p.match_path("/files/a.tar.gz").is_some());
        // The dots are literal dots, not regex wildcards.
        assert!(p.match_path("/files/aXtarXgz").is_none());
    }

    // ==== Variables ====

    #[test]
    fn brace_variable_captures_segment() {
        let p = compile("/user/{id}");
        let m = p.match_path("/user/42").unwrap();
        assert_eq!(m.var("id"), Some("42"));
        assert_eq!(m.var("other"), None);
    }

    #[test]
    fn colon_shorthand_captures_segment() {
        let p = compile("/user/:id/posts/:post");
        let m = p.match_path("/user/7/posts/99").unwrap();
        assert_eq!(m.var("id"), Some("7"));
        assert_eq!(m.var("post"), Some("99"));
        assert_eq!(m.vars(), &[("id", "7"), ("post", "99")]);
    }

    #[test]
    fn variable_rejects_empty_segment() {
        let p = compile("/user/{id}");
        assert!(p.match_path("/user/").is_none());
    }

    #[test]
    fn variable_does_not_cross_slashes() {
        let p = compile("/user/{id}");
        assert!(p.match_path("/user/1/extra").is_none());
    }

    #[test]
    fn constrained_variable_filters() {
        let p = compile("/user/{id:[0-9]+}");
        assert_eq!(p.match_path("/user/123").unwrap().var("id"), Some("123"));
        assert!(p.match_path("/user/abc").is_none());
        // Anchored: a partial match is not enough.
        assert!(p.match_path("/user/12a").is_none());
    }

    #[test]
    fn constraint_may_contain_braces() {
        let p = compile("/code/{pin:[0-9]{4}}");
        assert!(p.match_path("/code/1234").is_some());
        assert!(p.match_path("/code/123").is_none());
    }

    // ==== Trailing wildcard ====

    #[test]
    fn trailing_wildcard_captures_remainder() {
        let p = compile("/assets/**");
        let m = p.match_path("/assets/js/app.js").unwrap();
        assert_eq!(m.tail(), Some("js/app.js"));
    }

    #[test]
    fn trailing_wildcard_matches_zero_segments() {
        let p = compile("/assets/**");
        let m = p.match_path("/assets/").unwrap();
        assert_eq!(m.tail(), Some(""));
        // Without the trailing slash there is no remainder position.
        assert!(p.match_path("/assets").is_none());
    }

    #[test]
    fn bare_wildcard_matches_everything() {
        let p = compile("/**");
        assert_eq!(p.match_path("/").unwrap().tail(), Some(""));
        assert_eq!(p.match_path("/a/b/c").unwrap().tail(), Some("a/b/c"));
    }

    #[test]
    fn variables_compose_with_trailing_wildcard() {
        let p = compile("/user/{id}/files/**");
        let m = p.match_path("/user/9/files/docs/cv.pdf").unwrap();
        assert_eq!(m.var("id"), Some("9"));
        assert_eq!(m.tail(), Some("docs/cv.pdf"));
    }

    // ==== Compile errors ====

    #[test]
    fn wildcard_must_be_last() {
        assert!(matches!(
            PathPattern::compile("/a/**/b"),
            Err(PatternError::WildcardNotLast { .. })
        ));
    }

    #[test]
    fn duplicate_variables_rejected() {
        assert!(matches!(
            PathPattern::compile("/a/{id}/b/{id}"),
            Err(PatternError::DuplicateVariable { .. })
        ));
        assert!(matches!(
            PathPattern::compile("/a/{id}/b/:id"),
            Err(PatternError::DuplicateVariable { .. })
        ));
    }

    #[test]
    fn unclosed_brace_rejected() {
        assert!(matches!(
            PathPattern::compile("/user/{id"),
            Err(PatternError::UnclosedBrace { .. })
        ));
    }

    #[test]
    fn empty_variable_names_rejected() {
        assert!(matches!(
            PathPattern::compile("/user/{}"),
            Err(PatternError::EmptyVariableName { .. })
        ));
        assert!(matches!(
            PathPattern::compile("/user/:"),
            Err(PatternError::EmptyVariableName { .. })
        ));
        assert!(matches!(
            PathPattern::compile("/user/{:[0-9]+}"),
            Err(PatternError::EmptyVariableName { .. })
        ));
    }

    #[test]
    fn invalid_constraint_rejected() {
        assert!(matches!(
            PathPattern::compile("/user/{id:[0-9}"),
            Err(PatternError::InvalidRegex { .. })
        ));
    }

    // ==== Conversions ====

    #[test]
    fn to_vars_copies_captures() {
        let p = compile("/user/{id}/**");
        let m = p.match_path("/user/5/a/b").unwrap();
        let vars = m.to_vars();
        assert_eq!(vars.get("id"), Some("5"));
        assert_eq!(vars.tail(), Some("a/b"));
    }

    #[test]
    fn accessors() {
        let p = compile("/user/{id}/**");
        assert_eq!(p.raw(), "/user/{id}/**");
        assert!(p.has_trailing_wildcard());
        assert_eq!(p.var_count(), 1);
        assert_eq!(p.to_string(), "/user/{id}/**");
    }
}
