//! Endpoint Matcher - resolve free text to a canonical endpoint identity
//!
//! Free text (a selector plan such as `GET /person/5026/movie_credits to get
//! the movies` or a literal identity) is scanned for `METHOD /path` mentions.
//! Each mention is compared segment-wise against every path template of the
//! same method: literal segments must be equal, `{param}` segments match
//! anything. Candidates are returned least specific first, so the chosen
//! endpoint is always the **last** one.

use crate::error::{AgentError, Result};
use crate::spec::{is_placeholder, Endpoint, Method, SpecIndex};
use regex::Regex;
use serde::Serialize;
use std::cmp::Ordering;
use std::sync::LazyLock;

static MENTION_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(GET|POST|PUT|PATCH|DELETE)\s+(/\S*)").unwrap());

/// One endpoint that a piece of text may refer to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Candidate {
    /// Endpoint identity, `"<METHOD> <path>"`.
    pub name: String,
    /// Literal template segments matched exactly.
    pub exact: usize,
    /// Template placeholders that absorbed a segment.
    pub placeholders: usize,
    path_len: usize,
}

impl Candidate {
    /// Ordering from least to most specific.
    fn specificity(&self, other: &Self) -> Ordering {
        self.exact
            .cmp(&other.exact)
            .then_with(|| other.placeholders.cmp(&self.placeholders))
            .then_with(|| other.path_len.cmp(&self.path_len))
            .then_with(|| other.name.cmp(&self.name))
    }
}

/// Matcher over one [`SpecIndex`].
#[derive(Debug, Clone, Copy)]
pub struct EndpointMatcher<'a> {
    index: &'a SpecIndex,
}

impl<'a> EndpointMatcher<'a> {
    pub fn new(index: &'a SpecIndex) -> Self {
        Self { index }
    }

    /// All endpoints mentioned by `text`, most specific last.
    ///
    /// Occurrences of the base URL are removed first, so absolute URLs such
    /// as `GET https://api.example.com/v1/users` match like relative ones.
    pub fn candidates(&self, text: &str) -> Vec<Candidate> {
        let text = if self.index.base_url().is_empty() {
            text.to_string()
        } else {
            text.replace(self.index.base_url(), "")
        };

        let mut found: Vec<Candidate> = Vec::new();
        for caps in MENTION_REGEX.captures_iter(&text) {
            let Ok(method) = caps[1].parse::<Method>() else {
                continue;
            };
            let fragment = clean_fragment(&caps[2]);
            let segments: Vec<&str> = fragment.split('/').filter(|s| !s.is_empty()).collect();

            for endpoint in self.index.endpoints() {
                if endpoint.method() != method {
                    continue;
                }
                if let Some(candidate) = match_segments(endpoint, &segments) {
                    if !found.iter().any(|c| c.name == candidate.name) {
                        found.push(candidate);
                    }
                }
            }
        }

        found.sort_by(Candidate::specificity);
        found
    }

    /// The most specific endpoint mentioned by `text`.
    pub fn resolve(&self, text: &str) -> Result<&'a Endpoint> {
        self.candidates(text)
            .last()
            .and_then(|c| self.index.get(&c.name))
            .ok_or_else(|| AgentError::EndpointUnresolved(text.trim().to_string()))
    }

    /// Resolve the endpoint that was actually called with `method` on `url`.
    pub fn resolve_called(&self, method: Method, url: &str) -> Result<&'a Endpoint> {
        let path = relative_path(self.index.base_url(), url);
        self.resolve(&format!("{} {}", method, path))
    }
}

/// Path of `url` relative to `base_url`.
///
/// The base URL is stripped as a prefix when present. Otherwise the URL's own
/// path is taken and the base URL's path prefix (e.g. `/3`) removed from it.
pub fn relative_path(base_url: &str, url: &str) -> String {
    let url = url.trim();
    let base = base_url.trim_end_matches('/');

    if !base.is_empty() {
        if let Some(rest) = url.strip_prefix(base) {
            return ensure_leading_slash(rest);
        }
    }

    let Ok(parsed) = reqwest::Url::parse(url) else {
        return ensure_leading_slash(url);
    };
    let base_path = reqwest::Url::parse(base)
        .map(|b| b.path().trim_end_matches('/').to_string())
        .unwrap_or_default();

    let path = parsed.path();
    match path.strip_prefix(base_path.as_str()) {
        Some(rest) if !base_path.is_empty() && (rest.is_empty() || rest.starts_with('/')) => {
            ensure_leading_slash(rest)
        }
        _ => path.to_string(),
    }
}

fn ensure_leading_slash(path: &str) -> String {
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{}", path)
    }
}

/// Strip query string, fragment and trailing punctuation from a path mention.
fn clean_fragment(raw: &str) -> &str {
    let end = raw.find(['?', '#']).unwrap_or(raw.len());
    raw[..end].trim_end_matches(|c: char| matches!(c, '.' | ',' | ';' | ':' | ')' | '"' | '\'' | '`'))
}

fn match_segments(endpoint: &Endpoint, segments: &[&str]) -> Option<Candidate> {
    let template: Vec<&str> = endpoint.segments().collect();
    if template.len() != segments.len() {
        return None;
    }

    let mut exact = 0;
    let mut placeholders = 0;
    for (tpl, seg) in template.iter().zip(segments) {
        if is_placeholder(tpl) {
            placeholders += 1;
        } else if tpl == seg {
            exact += 1;
        } else {
            return None;
        }
    }

    if exact == 0 && !template.is_empty() {
        return None;
    }

    Some(Candidate {
        name: endpoint.name().to_string(),
        exact,
        placeholders,
        path_len: endpoint.path().len(),
    })
}
