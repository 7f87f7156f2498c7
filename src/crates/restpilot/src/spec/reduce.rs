//! OpenAPI reduction
//!
//! Turns a raw OpenAPI 3 document into the compact [`ReducedSpec`] the agent
//! works with: one entry per operation, `$ref`s inlined, and per-endpoint docs
//! cut down to description, parameters, the `200` response and the request
//! body.

use super::{EndpointEntry, Method, ReducedSpec, Server};
use crate::error::{AgentError, Result};
use serde_json::{Map, Value};
use std::path::Path;
use tracing::debug;

/// Knobs for [`reduce_openapi_spec`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReduceOptions {
    /// Inline `#/...` references.
    pub dereference: bool,
    /// Keep only parameters marked `required: true`.
    pub only_required: bool,
    /// Collapse `allOf` lists into a single schema.
    pub merge_allof: bool,
}

impl Default for ReduceOptions {
    fn default() -> Self {
        Self {
            dereference: true,
            only_required: true,
            merge_allof: false,
        }
    }
}

/// Read an OpenAPI JSON file and reduce it.
pub fn load_openapi_file(path: impl AsRef<Path>, options: &ReduceOptions) -> Result<ReducedSpec> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)?;
    let raw: Value = serde_json::from_str(&content)?;
    debug!(path = %path.display(), "Loaded OpenAPI document");
    reduce_openapi_spec(&raw, options)
}

/// Reduce a raw OpenAPI document.
pub fn reduce_openapi_spec(raw: &Value, options: &ReduceOptions) -> Result<ReducedSpec> {
    let servers: Vec<Server> = match raw.get("servers") {
        Some(servers) => serde_json::from_value(servers.clone())?,
        None => Vec::new(),
    };
    if servers.is_empty() {
        return Err(AgentError::Spec("OpenAPI document has no servers".to_string()));
    }

    let paths = raw
        .get("paths")
        .and_then(Value::as_object)
        .ok_or_else(|| AgentError::Spec("OpenAPI document has no paths".to_string()))?;

    let mut endpoints = Vec::new();
    for (route, operations) in paths {
        let Some(operations) = operations.as_object() else {
            continue;
        };
        for (operation_name, docs) in operations {
            let Ok(method) = operation_name.to_uppercase().parse::<Method>() else {
                continue;
            };

            let mut docs = docs.clone();
            if options.dereference {
                docs = dereference_refs(&docs, raw, &mut Vec::new());
            }
            if options.merge_allof {
                docs = merge_allof(&docs);
            }

            let description = docs
                .get("description")
                .or_else(|| docs.get("summary"))
                .and_then(Value::as_str)
                .map(str::to_string);

            endpoints.push(EndpointEntry(
                format!("{} {}", method, route),
                description,
                reduce_endpoint_docs(&docs, options.only_required),
            ));
        }
    }

    let description = raw
        .pointer("/info/description")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    Ok(ReducedSpec {
        servers,
        description,
        endpoints,
    })
}

fn reduce_endpoint_docs(docs: &Value, only_required: bool) -> Value {
    let mut out = Map::new();

    if let Some(desc) = docs.get("description").and_then(Value::as_str) {
        if !desc.is_empty() {
            out.insert("description".to_string(), Value::String(desc.to_string()));
        }
    }

    if let Some(params) = docs.get("parameters").and_then(Value::as_array) {
        let kept: Vec<Value> = params
            .iter()
            .filter(|p| !only_required || p.get("required").and_then(Value::as_bool) == Some(true))
            .cloned()
            .collect();
        if !kept.is_empty() {
            out.insert("parameters".to_string(), Value::Array(kept));
        }
    }

    if let Some(ok) = docs.pointer("/responses/200") {
        out.insert("responses".to_string(), ok.clone());
    }

    if let Some(body) = docs.get("requestBody") {
        out.insert("requestBody".to_string(), body.clone());
    }

    Value::Object(out)
}

/// Inline local `$ref`s. A reference already being expanded on the current
/// branch is left in place.
fn dereference_refs(value: &Value, root: &Value, stack: &mut Vec<String>) -> Value {
    match value {
        Value::Object(map) => {
            if let Some(reference) = map.get("$ref").and_then(Value::as_str) {
                if stack.iter().any(|r| r == reference) {
                    return value.clone();
                }
                let Some(target) = reference.strip_prefix('#').and_then(|p| root.pointer(p)) else {
                    return value.clone();
                };
                stack.push(reference.to_string());
                let resolved = dereference_refs(target, root, stack);
                stack.pop();
                return resolved;
            }
            Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), dereference_refs(v, root, stack)))
                    .collect(),
            )
        }
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|v| dereference_refs(v, root, stack))
                .collect(),
        ),
        other => other.clone(),
    }
}

/// Replace every `allOf` with one schema holding the union of properties and
/// required fields. Other keys keep their first value.
fn merge_allof(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut merged: Map<String, Value> = map
                .iter()
                .filter(|(k, _)| k.as_str() != "allOf")
                .map(|(k, v)| (k.clone(), merge_allof(v)))
                .collect();

            if let Some(parts) = map.get("allOf").and_then(Value::as_array) {
                for part in parts.iter().map(merge_allof) {
                    let Value::Object(part) = part else { continue };
                    for (key, val) in part {
                        match merged.get_mut(&key) {
                            None => {
                                merged.insert(key, val);
                            }
                            Some(Value::Object(existing)) if key == "properties" => {
                                if let Value::Object(props) = val {
                                    for (name, schema) in props {
                                        existing.entry(name).or_insert(schema);
                                    }
                                }
                            }
                            Some(Value::Array(existing)) if key == "required" => {
                                if let Value::Array(required) = val {
                                    for field in required {
                                        if !existing.contains(&field) {
                                            existing.push(field);
                                        }
                                    }
                                }
                            }
                            Some(_) => {}
                        }
                    }
                }
            }

            Value::Object(merged)
        }
        Value::Array(items) => Value::Array(items.iter().map(merge_allof).collect()),
        other => other.clone(),
    }
}
