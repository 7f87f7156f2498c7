//! Documentation Shaper - bounded documentation excerpts for prompts
//!
//! Endpoint docs are rendered as YAML and cut to a token budget using the
//! `o200k_base` vocabulary. Truncation keeps the leading tokens.

use crate::error::{AgentError, Result};
use crate::spec::Endpoint;
use serde_json::{Map, Value};
use std::sync::{Arc, LazyLock};
use tiktoken_rs::CoreBPE;

/// Token budget for a documentation excerpt.
pub const DOC_TOKEN_LIMIT: usize = 1500;

/// Character budget for an API response body.
pub const RESPONSE_CHAR_LIMIT: usize = 7500;

const JSON_CONTENT_TYPES: [&str; 2] = ["application/json", "application/json; charset=utf-8"];

/// `o200k_base` is loaded once and shared by every shaper.
static O200K_BASE: LazyLock<std::result::Result<Arc<CoreBPE>, String>> =
    LazyLock::new(|| tiktoken_rs::o200k_base().map(Arc::new).map_err(|e| e.to_string()));

/// Builds token-capped documentation excerpts.
#[derive(Clone)]
pub struct DocShaper {
    bpe: Arc<CoreBPE>,
    token_limit: usize,
    with_response: bool,
}

impl std::fmt::Debug for DocShaper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocShaper")
            .field("token_limit", &self.token_limit)
            .field("with_response", &self.with_response)
            .finish()
    }
}

impl DocShaper {
    /// `with_response` keeps the flattened response schema in caller docs.
    pub fn new(token_limit: usize, with_response: bool) -> Result<Self> {
        let bpe = O200K_BASE
            .as_ref()
            .map_err(|e| AgentError::Config(format!("Failed to load tokenizer: {}", e)))?;
        Ok(Self {
            bpe: Arc::clone(bpe),
            token_limit,
            with_response,
        })
    }

    pub fn token_limit(&self) -> usize {
        self.token_limit
    }

    pub fn count_tokens(&self, text: &str) -> usize {
        self.bpe.encode_with_special_tokens(text).len()
    }

    /// Keep at most `token_limit` leading tokens of `text`.
    pub fn truncate_tokens(&self, text: &str) -> String {
        let tokens = self.bpe.encode_with_special_tokens(text);
        if tokens.len() <= self.token_limit {
            return text.to_string();
        }

        // A cut inside a multi-byte character does not decode; back off until it does.
        let mut cap = self.token_limit;
        while cap > 0 {
            if let Ok(decoded) = self.bpe.decode(tokens[..cap].to_vec()) {
                return decoded;
            }
            cap -= 1;
        }
        String::new()
    }

    /// Excerpt of an endpoint's docs for the caller prompt. The header counts
    /// against the token limit.
    pub fn caller_docs(&self, endpoint: &Endpoint) -> Result<String> {
        let mut docs = flatten_response_schema(endpoint.docs());
        if !self.with_response {
            if let Value::Object(map) = &mut docs {
                map.remove("responses");
            }
        }
        let yaml = serde_yaml::to_string(&docs)?;
        let excerpt = format!("== Docs for {} == \n{}\n", endpoint.name(), yaml);
        Ok(self.truncate_tokens(&excerpt))
    }

    /// Token-capped YAML of the flattened response schema, if any.
    pub fn response_docs(&self, docs: &Value) -> Result<Option<String>> {
        match flatten_response_schema(docs).get("responses") {
            Some(schema) => self.render(schema).map(Some),
            None => Ok(None),
        }
    }

    /// Render a value as YAML and cap it by tokens.
    pub fn render(&self, value: &Value) -> Result<String> {
        let yaml = serde_yaml::to_string(value)?;
        Ok(self.truncate_tokens(&yaml))
    }
}

fn json_schema<'v>(responses: &'v Value) -> Option<&'v Value> {
    let content = responses.get("content")?;
    JSON_CONTENT_TYPES
        .iter()
        .find_map(|ct| content.get(*ct))
        .and_then(|c| c.get("schema"))
}

fn json_schema_mut<'v>(responses: &'v mut Value) -> Option<&'v mut Value> {
    let content = responses.get_mut("content")?;
    let content_type = JSON_CONTENT_TYPES
        .iter()
        .find(|ct| content.get(**ct).is_some())?;
    content.get_mut(*content_type)?.get_mut("schema")
}

/// Replace a JSON-content `responses` entry by its schema's property list.
///
/// Docs without a JSON response schema are returned unchanged.
pub fn flatten_response_schema(docs: &Value) -> Value {
    let mut docs = docs.clone();
    let flattened = docs
        .get("responses")
        .and_then(json_schema)
        .map(|schema| schema.get("properties").unwrap_or(schema).clone());

    if let (Some(flat), Value::Object(map)) = (flattened, &mut docs) {
        map.insert("responses".to_string(), flat);
    }
    docs
}

/// Narrow a polymorphic search response schema to the requested result types.
///
/// `search_type` is the raw `type` parameter (`track`, `artist,album`, ...).
/// Each listed type keeps its plural property (`tracks`, `albums`). The input
/// is never modified; when no listed type exists in the schema the docs are
/// returned unchanged.
pub fn narrow_search_schema(docs: &Value, search_type: &str) -> Value {
    let mut narrowed = docs.clone();
    let Some(properties) = narrowed
        .get_mut("responses")
        .and_then(json_schema_mut)
        .and_then(|schema| schema.get_mut("properties"))
        .and_then(Value::as_object_mut)
    else {
        return narrowed;
    };

    let kept: Map<String, Value> = search_type
        .split(',')
        .map(|t| format!("{}s", t.trim()))
        .filter_map(|key| properties.get(&key).map(|v| (key, v.clone())))
        .collect();

    if !kept.is_empty() {
        *properties = kept;
    }
    narrowed
}

/// The `type` argument of a search request, from params or the URL query.
pub fn search_type_of(params: Option<&Map<String, Value>>, url: &str) -> Option<String> {
    if let Some(value) = params.and_then(|p| p.get("type")) {
        return match value {
            Value::String(s) => Some(s.clone()),
            Value::Array(items) => Some(
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .collect::<Vec<_>>()
                    .join(","),
            ),
            other => Some(other.to_string()),
        };
    }

    url.split(['?', '&'])
        .skip(1)
        .find_map(|pair| pair.strip_prefix("type="))
        .map(|v| v.replace("%2C", ",").replace("%2c", ","))
}

/// Keep at most `limit` leading characters of `text`.
pub fn truncate_chars(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::{EndpointEntry, ReducedSpec, Server, SpecIndex};
    use crate::testing::fixtures;
    use serde_json::json;

    #[test]
    fn test_caller_docs_drop_responses() {
        let index = fixtures::tmdb_index().unwrap();
        let endpoint = index.get("GET /person/{person_id}/movie_credits").unwrap();
        let shaper = DocShaper::new(DOC_TOKEN_LIMIT, false).unwrap();

        let docs = shaper.caller_docs(endpoint).unwrap();
        assert!(docs.starts_with("== Docs for GET /person/{person_id}/movie_credits == \n"));
        assert!(docs.contains("person_id"));
        assert!(!docs.contains("crew"));
    }

    #[test]
    fn test_caller_docs_header_within_token_limit() {
        let params: Vec<Value> = (0..2000)
            .map(|i| json!({"name": format!("param_{}", i), "description": "a filter value"}))
            .collect();
        let index = SpecIndex::new(ReducedSpec {
            servers: vec![Server {
                url: "https://api.example.com/v1".to_string(),
                description: None,
            }],
            description: String::new(),
            endpoints: vec![EndpointEntry(
                "GET /discover/movie".to_string(),
                None,
                json!({"description": "huge", "parameters": params}),
            )],
        })
        .unwrap();
        let endpoint = index.get("GET /discover/movie").unwrap();
        let shaper = DocShaper::new(DOC_TOKEN_LIMIT, false).unwrap();

        let docs = shaper.caller_docs(endpoint).unwrap();
        assert!(shaper.count_tokens(&docs) <= DOC_TOKEN_LIMIT);
        assert!(docs.starts_with("== Docs for GET /discover/movie == \ndescription: huge"));
    }

    #[test]
    fn test_shapers_share_tokenizer() {
        let caller = DocShaper::new(DOC_TOKEN_LIMIT, false).unwrap();
        let parser = DocShaper::new(DOC_TOKEN_LIMIT, true).unwrap();
        assert!(Arc::ptr_eq(&caller.bpe, &parser.bpe));
    }

    #[test]
    fn test_caller_docs_with_response_flattened() {
        let index = fixtures::tmdb_index().unwrap();
        let endpoint = index.get("GET /person/{person_id}/movie_credits").unwrap();
        let shaper = DocShaper::new(DOC_TOKEN_LIMIT, true).unwrap();

        let docs = shaper.caller_docs(endpoint).unwrap();
        assert!(docs.contains("crew"));
        assert!(!docs.contains("application/json"));
    }

    #[test]
    fn test_flatten_charset_variant() {
        let docs = json!({
            "description": "d",
            "responses": {"content": {"application/json; charset=utf-8": {
                "schema": {"type": "object", "properties": {"items": {"type": "array"}}}
            }}}
        });
        let flat = flatten_response_schema(&docs);
        assert_eq!(flat["responses"], json!({"items": {"type": "array"}}));

        let no_json = json!({"responses": {"description": "No content"}});
        assert_eq!(flatten_response_schema(&no_json), no_json);
    }

    #[test]
    fn test_docs_capped_by_tokens() {
        let shaper = DocShaper::new(DOC_TOKEN_LIMIT, false).unwrap();
        let params: Vec<Value> = (0..2000)
            .map(|i| json!({"name": format!("param_{}", i), "description": "a filter value"}))
            .collect();
        let docs = json!({"description": "huge", "parameters": params});

        let rendered = shaper.render(&docs).unwrap();
        assert!(shaper.count_tokens(&rendered) <= DOC_TOKEN_LIMIT);
        assert!(rendered.starts_with("description: huge"));
    }

    #[test]
    fn test_truncate_tokens_short_text_unchanged() {
        let shaper = DocShaper::new(10, false).unwrap();
        assert_eq!(shaper.truncate_tokens("short text"), "short text");
        let long = "word ".repeat(100);
        let cut = shaper.truncate_tokens(&long);
        assert!(long.starts_with(&cut));
        assert!(shaper.count_tokens(&cut) <= 10);
    }

    #[test]
    fn test_narrow_search_schema() {
        let index = fixtures::spotify_index().unwrap();
        let docs = index.get("GET /search").unwrap().docs();

        let narrowed = narrow_search_schema(docs, "track");
        let props = narrowed
            .pointer("/responses/content/application~1json/schema/properties")
            .unwrap()
            .as_object()
            .unwrap();
        assert_eq!(props.keys().collect::<Vec<_>>(), vec!["tracks"]);

        // The index itself is untouched
        let original = docs
            .pointer("/responses/content/application~1json/schema/properties")
            .unwrap();
        assert_eq!(original.as_object().unwrap().len(), 4);

        let several = narrow_search_schema(docs, "artist,album");
        let props = several
            .pointer("/responses/content/application~1json/schema/properties")
            .unwrap();
        assert!(props.get("artists").is_some() && props.get("albums").is_some());
        assert!(props.get("tracks").is_none());

        assert_eq!(&narrow_search_schema(docs, "audiobook"), docs);
    }

    #[test]
    fn test_narrow_search_schema_charset_variant() {
        let docs = json!({
            "responses": {"content": {"application/json; charset=utf-8": {
                "schema": {"type": "object", "properties": {
                    "tracks": {"type": "object"},
                    "artists": {"type": "object"}
                }}
            }}}
        });

        let narrowed = narrow_search_schema(&docs, "artist");
        let props = narrowed
            .pointer("/responses/content/application~1json; charset=utf-8/schema/properties")
            .unwrap();
        assert_eq!(props, &json!({"artists": {"type": "object"}}));
    }

    #[test]
    fn test_search_type_of() {
        let params = json!({"q": "Lana", "type": "artist"});
        assert_eq!(
            search_type_of(params.as_object(), "https://api.spotify.com/v1/search"),
            Some("artist".to_string())
        );
        assert_eq!(
            search_type_of(None, "https://api.spotify.com/v1/search?q=Lana&type=track%2Calbum"),
            Some("track,album".to_string())
        );
        assert_eq!(search_type_of(None, "https://api.spotify.com/v1/search?q=x"), None);
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("hello", 3), "hel");
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("hi", 7500), "hi");
        let long = "x".repeat(RESPONSE_CHAR_LIMIT + 10);
        assert_eq!(truncate_chars(&long, RESPONSE_CHAR_LIMIT).len(), RESPONSE_CHAR_LIMIT);
    }
}
