//! Path pattern parsing and matching.
//!
//! # Responsibilities
//! - Parse patterns such as `/products/:categoryId/:slug`
//! - Match concrete paths, extracting named params
//! - Build concrete paths back from params
//!
//! # Design Decisions
//! - Query string and fragment are ignored when matching
//! - One trailing slash is optional
//! - Static segments compare ASCII case-insensitively
//! - Param values are percent-decoded; encoded again when building paths

use std::collections::BTreeMap;
use std::fmt;

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};

/// Characters escaped when a param value is written into a path segment.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Errors raised while parsing a path pattern.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PatternError {
    #[error("pattern `{0}` must start with '/'")]
    MissingLeadingSlash(String),
    #[error("pattern `{0}` contains an empty param name")]
    EmptyParamName(String),
    #[error("pattern `{pattern}` has invalid param name `{name}`")]
    InvalidParamName { pattern: String, name: String },
    #[error("pattern `{pattern}` declares param `{name}` more than once")]
    DuplicateParam { pattern: String, name: String },
}

/// One `/`-separated piece of a pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Static(String),
    Param(String),
}

/// A compiled path pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    source: String,
    segments: Vec<Segment>,
}

impl PathPattern {
    /// Parse a pattern. `:name` segments become params.
    pub fn parse(pattern: &str) -> Result<Self, PatternError> {
        let Some(rest) = pattern.strip_prefix('/') else {
            return Err(PatternError::MissingLeadingSlash(pattern.to_string()));
        };

        let mut segments = Vec::new();
        for raw in split_segments(rest) {
            match raw.strip_prefix(':') {
                Some("") => return Err(PatternError::EmptyParamName(pattern.to_string())),
                Some(name) => {
                    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
                        return Err(PatternError::InvalidParamName {
                            pattern: pattern.to_string(),
                            name: name.to_string(),
                        });
                    }
                    let seen = segments
                        .iter()
                        .any(|s| matches!(s, Segment::Param(p) if p == name));
                    if seen {
                        return Err(PatternError::DuplicateParam {
                            pattern: pattern.to_string(),
                            name: name.to_string(),
                        });
                    }
                    segments.push(Segment::Param(name.to_string()));
                }
                None => segments.push(Segment::Static(raw.to_string())),
            }
        }

        Ok(Self {
            source: pattern.to_string(),
            segments,
        })
    }

    /// The pattern text as declared.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Names of the params in declaration order.
    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Param(name) => Some(name.as_str()),
            Segment::Static(_) => None,
        })
    }

    /// Match a concrete path. Returns the extracted params on success.
    pub fn matches(&self, path: &str) -> Option<BTreeMap<String, String>> {
        let path = strip_query_fragment(path);
        let rest = path.strip_prefix('/').unwrap_or(path);
        let parts: Vec<&str> = split_segments(rest).collect();

        if parts.len() != self.segments.len() {
            return None;
        }

        let mut params = BTreeMap::new();
        for (segment, part) in self.segments.iter().zip(parts) {
            match segment {
                Segment::Static(expected) => {
                    if !expected.eq_ignore_ascii_case(part) {
                        return None;
                    }
                }
                Segment::Param(name) => {
                    if part.is_empty() {
                        return None;
                    }
                    params.insert(name.clone(), decode_segment(part));
                }
            }
        }
        Some(params)
    }

    /// Build a concrete path from params. Returns the first missing param name on failure.
    pub fn build(&self, params: &BTreeMap<String, String>) -> Result<String, String> {
        if self.segments.is_empty() {
            return Ok("/".to_string());
        }

        let mut path = String::new();
        for segment in &self.segments {
            path.push('/');
            match segment {
                Segment::Static(text) => path.push_str(text),
                Segment::Param(name) => match params.get(name) {
                    Some(value) if !value.is_empty() => {
                        path.extend(utf8_percent_encode(value, SEGMENT));
                    }
                    _ => return Err(name.clone()),
                },
            }
        }
        Ok(path)
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.source)
    }
}

/// Split the part after the leading slash, tolerating one trailing slash.
fn split_segments(rest: &str) -> impl Iterator<Item = &str> {
    let trimmed = rest.strip_suffix('/').unwrap_or(rest);
    trimmed.split('/').filter(move |_| !trimmed.is_empty())
}

fn strip_query_fragment(path: &str) -> &str {
    path.split(['?', '#']).next().unwrap_or(path)
}

fn decode_segment(raw: &str) -> String {
    percent_decode_str(raw)
        .decode_utf8()
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| raw.to_string())
}
