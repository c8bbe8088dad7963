//! Path templates.
//!
//! A template is a `/`-separated list of literal segments and parameters.
//! `:name` declares a required parameter and `:name?` an optional one.
//! Optional parameters may only form a trailing run:
//!
//! ```text
//! /stuff/:param/:another?     ok
//! /stuff/:param?/more         rejected
//! /stuff/:a?/:b               rejected
//! ```
//!
//! The same template drives both directions of the wire: the server matches
//! concrete paths against it, and the client substitutes values into it.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use crate::error::TemplateError;
use crate::params::Params;

/// One segment of a parsed template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Literal text matched verbatim.
    Literal(String),
    /// Named parameter.
    Param {
        /// Parameter name, without the leading `:` or trailing `?`.
        name: String,
        /// Whether the segment may be omitted.
        optional: bool,
    },
}

impl Segment {
    /// Returns the parameter name if this is a parameter segment.
    #[must_use]
    pub fn param_name(&self) -> Option<&str> {
        match self {
            Self::Param { name, .. } => Some(name),
            Self::Literal(_) => None,
        }
    }
}

/// A compiled path template.
///
/// # Example
///
/// ```rust
/// use hermes_router::{Params, PathTemplate};
///
/// let template = PathTemplate::parse("/stuff/:param/:another?").unwrap();
/// assert_eq!(template.required_params(), vec!["param"]);
/// assert_eq!(template.optional_params(), vec!["another"]);
///
/// let params = template.match_path("/stuff/value").unwrap();
/// assert_eq!(params.get("param"), Some("value"));
/// assert_eq!(params.get("another"), None);
///
/// let mut values = Params::new();
/// values.push("param", "value");
/// assert_eq!(template.substitute(&values).unwrap(), "/stuff/value");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTemplate {
    raw: String,
    segments: Vec<Segment>,
    optional_count: usize,
}

impl PathTemplate {
    /// Parses a template string.
    pub fn parse(template: &str) -> Result<Self, TemplateError> {
        if !template.starts_with('/') {
            return Err(TemplateError::MissingLeadingSlash {
                template: template.to_string(),
            });
        }

        let mut segments = Vec::new();
        let mut seen = HashSet::new();
        let mut optional_count = 0;

        for raw in template.split('/').filter(|s| !s.is_empty()) {
            let segment = match raw.strip_prefix(':') {
                Some(rest) => {
                    let (name, optional) = match rest.strip_suffix('?') {
                        Some(name) => (name, true),
                        None => (rest, false),
                    };
                    if !is_valid_name(name) {
                        return Err(TemplateError::InvalidParameterName {
                            template: template.to_string(),
                            name: name.to_string(),
                        });
                    }
                    if !seen.insert(name) {
                        return Err(TemplateError::DuplicateParameter {
                            template: template.to_string(),
                            name: name.to_string(),
                        });
                    }
                    Segment::Param {
                        name: name.to_string(),
                        optional,
                    }
                }
                None => Segment::Literal(raw.to_string()),
            };

            let is_optional = matches!(segment, Segment::Param { optional: true, .. });
            if optional_count > 0 && !is_optional {
                return Err(TemplateError::NotTrailingOptional {
                    template: template.to_string(),
                    segment: raw.to_string(),
                });
            }
            if is_optional {
                optional_count += 1;
            }
            segments.push(segment);
        }

        Ok(Self {
            raw: template.to_string(),
            segments,
            optional_count,
        })
    }

    /// Returns the template as written.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Returns the parsed segments.
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Iterates over `(name, optional)` for every parameter, in order.
    pub fn params(&self) -> impl Iterator<Item = (&str, bool)> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Param { name, optional } => Some((name.as_str(), *optional)),
            Segment::Literal(_) => None,
        })
    }

    /// Names of the required parameters.
    #[must_use]
    pub fn required_params(&self) -> Vec<&str> {
        self.params()
            .filter(|(_, optional)| !optional)
            .map(|(name, _)| name)
            .collect()
    }

    /// Names of the optional parameters.
    #[must_use]
    pub fn optional_params(&self) -> Vec<&str> {
        self.params()
            .filter(|(_, optional)| *optional)
            .map(|(name, _)| name)
            .collect()
    }

    /// Returns `true` if the template has no parameters at all.
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.params().next().is_none()
    }

    /// Returns every concrete shape this template can take, longest first.
    ///
    /// A template with `n` optional parameters has `n + 1` variants.
    pub fn variants(&self) -> impl Iterator<Item = &[Segment]> {
        let len = self.segments.len();
        (0..=self.optional_count).map(move |dropped| &self.segments[..len - dropped])
    }

    /// Matches a concrete request path, returning the percent-decoded captures.
    ///
    /// Omitted optional parameters are absent from the result. Empty segments
    /// (including a trailing slash) are ignored.
    #[must_use]
    pub fn match_path(&self, path: &str) -> Option<Params> {
        let actual: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let required_len = self.segments.len() - self.optional_count;
        if actual.len() < required_len || actual.len() > self.segments.len() {
            return None;
        }

        let mut params = Params::with_capacity(actual.len());
        for (segment, value) in self.segments.iter().zip(actual) {
            match segment {
                Segment::Literal(lit) => {
                    if lit != value {
                        return None;
                    }
                }
                Segment::Param { name, .. } => params.push(name.clone(), decode_segment(value)),
            }
        }
        Some(params)
    }

    /// Builds a concrete path by substituting parameter values.
    ///
    /// Values are percent-encoded. An absent optional parameter drops its
    /// segment entirely, so no stray slash is left behind.
    pub fn substitute(&self, values: &Params) -> Result<String, TemplateError> {
        let mut path = String::with_capacity(self.raw.len());
        let mut omitted: Option<&str> = None;

        for segment in &self.segments {
            match segment {
                Segment::Literal(lit) => {
                    path.push('/');
                    path.push_str(lit);
                }
                Segment::Param { name, optional } => match values.get(name) {
                    Some("") => {
                        return Err(TemplateError::EmptyParameter { name: name.clone() });
                    }
                    Some(value) => {
                        if let Some(missing) = omitted {
                            return Err(TemplateError::OptionalGap {
                                missing: missing.to_string(),
                                present: name.clone(),
                            });
                        }
                        path.push('/');
                        path.push_str(&urlencoding::encode(value));
                    }
                    None if *optional => {
                        omitted.get_or_insert(name.as_str());
                    }
                    None => {
                        return Err(TemplateError::MissingParameter { name: name.clone() });
                    }
                },
            }
        }

        if path.is_empty() {
            path.push('/');
        }
        Ok(path)
    }
}

impl fmt::Display for PathTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl FromStr for PathTemplate {
    type Err = TemplateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

fn decode_segment(raw: &str) -> String {
    urlencoding::decode(raw)
        .map(std::borrow::Cow::into_owned)
        .unwrap_or_else(|_| raw.to_string())
}
