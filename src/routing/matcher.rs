//! Path pattern parsing and tree matching.
//!
//! # Responsibilities
//! - Parse declared route paths into segment patterns
//! - Match request segments against sibling nodes in declaration order
//! - Capture named parameters and catch-all suffixes
//! - Render a pattern back into a concrete path from parameters
//!
//! # Design Decisions
//! - Static segments compare ASCII case-insensitively; captures keep the
//!   request's casing
//! - A catch-all matches any remaining suffix, including an empty one
//! - No regex: `:name(.*)*` is the only bracketed form understood

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::routing::node::RouteNode;

/// A captured path parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Single(String),
    Repeated(Vec<String>),
}

impl ParamValue {
    /// Path form of the value. Repeated values are joined with `/`.
    pub fn to_path(&self) -> String {
        match self {
            ParamValue::Single(value) => value.clone(),
            ParamValue::Repeated(values) => values.join("/"),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Single(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Single(value)
    }
}

/// Parameters captured while matching, keyed by parameter name.
pub type Params = BTreeMap<String, ParamValue>;

/// Errors raised while parsing a declared path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    #[error("empty parameter name in `{0}`")]
    EmptyParam(String),

    #[error("unsupported parameter syntax `{0}`")]
    Unsupported(String),

    #[error("catch-all must be the final segment in `{0}`")]
    CatchAllNotFinal(String),
}

/// A single segment of a path pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Static(String),
    Param(String),
    CatchAll(String),
}

/// A parsed path pattern, relative to its parent node.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PathPattern {
    segments: Vec<Segment>,
}

impl PathPattern {
    /// Parse a declared path such as `/`, `views`, `:id` or `/:pathMatch(.*)*`.
    pub fn parse(raw: &str) -> Result<Self, PatternError> {
        let parts: Vec<&str> = raw.split('/').filter(|s| !s.is_empty()).collect();
        let mut segments = Vec::with_capacity(parts.len());

        for (i, part) in parts.iter().enumerate() {
            let segment = match part.strip_prefix(':') {
                None => Segment::Static((*part).to_string()),
                Some(spec) => parse_param(raw, spec)?,
            };
            if matches!(segment, Segment::CatchAll(_)) && i + 1 != parts.len() {
                return Err(PatternError::CatchAllNotFinal(raw.to_string()));
            }
            segments.push(segment);
        }

        Ok(Self { segments })
    }

    /// True for the empty pattern (`/` or `""`).
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// True if the pattern ends with a catch-all capture.
    pub fn is_catch_all(&self) -> bool {
        matches!(self.segments.last(), Some(Segment::CatchAll(_)))
    }

    /// Names of all parameters in this pattern, in order.
    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Param(name) | Segment::CatchAll(name) => Some(name.as_str()),
            Segment::Static(_) => None,
        })
    }

    /// Concatenate a child pattern onto this one.
    pub fn join(&self, child: &PathPattern) -> PathPattern {
        let mut segments = self.segments.clone();
        segments.extend(child.segments.iter().cloned());
        PathPattern { segments }
    }

    /// Match this pattern against the head of `path`.
    ///
    /// Returns the number of segments consumed, writing captures into `params`.
    pub fn match_prefix(&self, path: &[&str], params: &mut Params) -> Option<usize> {
        let mut consumed = 0;
        for segment in &self.segments {
            match segment {
                Segment::Static(expected) => {
                    if !path
                        .get(consumed)
                        .is_some_and(|actual| actual.eq_ignore_ascii_case(expected))
                    {
                        return None;
                    }
                    consumed += 1;
                }
                Segment::Param(name) => {
                    let value = path.get(consumed)?;
                    params.insert(name.clone(), ParamValue::Single((*value).to_string()));
                    consumed += 1;
                }
                Segment::CatchAll(name) => {
                    let rest = path[consumed..].iter().map(|s| s.to_string()).collect();
                    params.insert(name.clone(), ParamValue::Repeated(rest));
                    consumed = path.len();
                }
            }
        }
        Some(consumed)
    }

    /// Render a concrete path, substituting parameters.
    ///
    /// Returns the name of the first missing parameter on failure.
    pub fn render(&self, params: &Params) -> Result<String, String> {
        let mut out = String::new();
        for segment in &self.segments {
            let part = match segment {
                Segment::Static(value) => value.clone(),
                Segment::Param(name) | Segment::CatchAll(name) => params
                    .get(name)
                    .map(ParamValue::to_path)
                    .ok_or_else(|| name.clone())?,
            };
            if part.is_empty() {
                continue;
            }
            out.push('/');
            out.push_str(&part);
        }
        if out.is_empty() {
            out.push('/');
        }
        Ok(out)
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return write!(f, "/");
        }
        for segment in &self.segments {
            match segment {
                Segment::Static(value) => write!(f, "/{}", value)?,
                Segment::Param(name) => write!(f, "/:{}", name)?,
                Segment::CatchAll(name) => write!(f, "/:{}(.*)*", name)?,
            }
        }
        Ok(())
    }
}

fn parse_param(raw: &str, spec: &str) -> Result<Segment, PatternError> {
    let (name, suffix) = match spec.find('(') {
        Some(idx) => (&spec[..idx], &spec[idx..]),
        None => (spec, ""),
    };
    if name.is_empty() {
        return Err(PatternError::EmptyParam(raw.to_string()));
    }
    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(PatternError::Unsupported(spec.to_string()));
    }
    match suffix {
        "" => Ok(Segment::Param(name.to_string())),
        "(.*)*" => Ok(Segment::CatchAll(name.to_string())),
        _ => Err(PatternError::Unsupported(spec.to_string())),
    }
}

/// Split a normalized path into its non-empty segments.
pub fn split_segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// Depth-first, first-match-wins traversal over `nodes`.
///
/// On success `chain` holds the matched nodes from outermost to deepest.
pub(crate) fn match_tree<'t>(
    nodes: &'t [RouteNode],
    path: &[&str],
    params: &mut Params,
    chain: &mut Vec<&'t RouteNode>,
) -> bool {
    for node in nodes {
        let mut scratch = params.clone();
        let Some(consumed) = node.pattern.match_prefix(path, &mut scratch) else {
            continue;
        };

        chain.push(node);
        let rest = &path[consumed..];
        if rest.is_empty() || match_tree(&node.children, rest, &mut scratch, chain) {
            *params = scratch;
            return true;
        }
        chain.pop();
    }
    false
}
