//! Spec Index - immutable, queryable view of a reduced API description
//!
//! The index is built once from a [`ReducedSpec`] and never mutated
//! afterwards. Every endpoint is keyed by its identity `"<METHOD> <path>"`,
//! where the path may contain `{param}` placeholders.

pub mod reduce;

pub use reduce::{reduce_openapi_spec, ReduceOptions};

use crate::error::{AgentError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// HTTP verbs the agent can call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    pub const ALL: [Method; 5] = [
        Method::Get,
        Method::Post,
        Method::Put,
        Method::Patch,
        Method::Delete,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }

    /// Whether requests with this verb carry a body.
    pub fn has_body(&self) -> bool {
        !matches!(self, Method::Get)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = AgentError;

    /// Only the uppercase spelling is accepted, as written in endpoint names
    /// and in the `Operation:` line of a completion.
    fn from_str(s: &str) -> Result<Self> {
        Method::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| AgentError::UnsupportedOperation(s.to_string()))
    }
}

/// API server entry of a reduced spec.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Server {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// `(identity, description, docs)` triple of a reduced spec.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndpointEntry(pub String, pub Option<String>, pub Value);

/// Reduced OpenAPI-like description consumed by the agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReducedSpec {
    pub servers: Vec<Server>,
    #[serde(default)]
    pub description: String,
    pub endpoints: Vec<EndpointEntry>,
}

/// A single API operation known to the index.
#[derive(Debug, Clone, PartialEq)]
pub struct Endpoint {
    name: String,
    method: Method,
    path: String,
    description: Option<String>,
    docs: Value,
}

impl Endpoint {
    /// Canonical identity, `"<METHOD> <path>"`.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn method(&self) -> Method {
        self.method
    }

    /// Path template, possibly containing `{param}` segments.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Structured documentation (parameters, request body, responses).
    pub fn docs(&self) -> &Value {
        &self.docs
    }

    /// Path split into its non-empty segments.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.path.split('/').filter(|s| !s.is_empty())
    }

    /// Number of `{param}` segments in the path template.
    pub fn placeholder_count(&self) -> usize {
        self.segments().filter(|s| is_placeholder(s)).count()
    }
}

/// Whether a path segment is a `{param}` placeholder.
pub fn is_placeholder(segment: &str) -> bool {
    segment.len() >= 2 && segment.starts_with('{') && segment.ends_with('}')
}

/// Split an endpoint identity into method and path.
pub fn parse_identity(name: &str) -> Result<(Method, String)> {
    let (method, path) = name
        .trim()
        .split_once(char::is_whitespace)
        .ok_or_else(|| AgentError::Spec(format!("Invalid endpoint name: {}", name)))?;
    let method = method
        .parse::<Method>()
        .map_err(|_| AgentError::Spec(format!("Invalid method in endpoint name: {}", name)))?;
    Ok((method, path.trim().to_string()))
}

/// Immutable index over the endpoints of one API.
#[derive(Debug, Clone)]
pub struct SpecIndex {
    base_url: String,
    description: String,
    endpoints: Vec<Endpoint>,
    by_name: HashMap<String, usize>,
}

impl SpecIndex {
    /// Build the index. The first server URL becomes the base URL.
    pub fn new(spec: ReducedSpec) -> Result<Self> {
        let base_url = spec
            .servers
            .first()
            .map(|s| s.url.trim_end_matches('/').to_string())
            .ok_or_else(|| AgentError::Spec("API description has no servers".to_string()))?;

        let mut endpoints = Vec::with_capacity(spec.endpoints.len());
        let mut by_name = HashMap::with_capacity(spec.endpoints.len());

        for EndpointEntry(name, description, docs) in spec.endpoints {
            let (method, path) = parse_identity(&name)?;
            let name = format!("{} {}", method, path);
            if by_name.contains_key(&name) {
                return Err(AgentError::Spec(format!("Duplicate endpoint: {}", name)));
            }
            by_name.insert(name.clone(), endpoints.len());
            endpoints.push(Endpoint {
                name,
                method,
                path,
                description,
                docs,
            });
        }

        Ok(Self {
            base_url,
            description: spec.description,
            endpoints,
            by_name,
        })
    }

    /// Load a reduced spec previously written as JSON.
    pub fn from_reduced_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let spec: ReducedSpec = serde_json::from_str(&content)?;
        Self::new(spec)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn endpoints(&self) -> &[Endpoint] {
        &self.endpoints
    }

    pub fn get(&self, name: &str) -> Option<&Endpoint> {
        self.by_name.get(name).map(|&i| &self.endpoints[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    /// One `"<identity>: <description>"` line per endpoint, in spec order.
    pub fn endpoint_listing(&self) -> String {
        self.endpoints
            .iter()
            .map(|e| match e.description() {
                Some(desc) if !desc.trim().is_empty() => {
                    format!("{}: {}", e.name, desc.trim().replace('\n', " "))
                }
                _ => e.name.clone(),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures;
    use serde_json::json;

    #[test]
    fn test_method_parsing() {
        assert_eq!("GET".parse::<Method>().unwrap(), Method::Get);
        assert_eq!("PATCH".parse::<Method>().unwrap(), Method::Patch);
        assert!(matches!(
            "get".parse::<Method>(),
            Err(AgentError::UnsupportedOperation(_))
        ));
        assert!(!Method::Get.has_body());
        assert!(Method::Delete.has_body());
    }

    #[test]
    fn test_index_from_reduced_spec() {
        let index = fixtures::tmdb_index().unwrap();

        assert_eq!(index.base_url(), "https://api.themoviedb.org/3");
        assert!(index.contains("GET /person/{person_id}/movie_credits"));

        let endpoint = index.get("GET /person/{person_id}/movie_credits").unwrap();
        assert_eq!(endpoint.method(), Method::Get);
        assert_eq!(endpoint.path(), "/person/{person_id}/movie_credits");
        assert_eq!(endpoint.placeholder_count(), 1);
        assert_eq!(
            endpoint.segments().collect::<Vec<_>>(),
            vec!["person", "{person_id}", "movie_credits"]
        );
    }

    #[test]
    fn test_index_requires_server() {
        let spec = ReducedSpec {
            servers: vec![],
            description: String::new(),
            endpoints: vec![],
        };
        assert!(matches!(SpecIndex::new(spec), Err(AgentError::Spec(_))));
    }

    #[test]
    fn test_index_rejects_bad_names() {
        let spec = ReducedSpec {
            servers: vec![Server {
                url: "https://api.example.com/".to_string(),
                description: None,
            }],
            description: String::new(),
            endpoints: vec![EndpointEntry("FETCH /things".to_string(), None, json!({}))],
        };
        assert!(matches!(SpecIndex::new(spec), Err(AgentError::Spec(_))));
    }

    #[test]
    fn test_reduced_spec_json_shape() {
        let raw = json!({
            "servers": [{"url": "https://api.example.com"}],
            "endpoints": [["GET /users/{id}/tweets", "List tweets", {"description": "List tweets"}]]
        });
        let spec: ReducedSpec = serde_json::from_value(raw).unwrap();
        let index = SpecIndex::new(spec).unwrap();
        assert_eq!(index.len(), 1);
        assert_eq!(index.endpoint_listing(), "GET /users/{id}/tweets: List tweets");
    }
}
