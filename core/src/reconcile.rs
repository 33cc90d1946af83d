//! Response-shape reconciliation.
//!
//! The remote API wraps collections inconsistently: sometimes a bare array,
//! sometimes `{"tasks": [...]}`. Both are valid. Anything else degrades to an
//! empty result instead of failing the caller.

use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionKind {
    Tasks,
    Projects,
    Habits,
    Tags,
}

impl CollectionKind {
    /// Field name used when the remote wraps the array in an object.
    pub fn envelope_key(self) -> &'static str {
        match self {
            CollectionKind::Tasks => "tasks",
            CollectionKind::Projects => "projects",
            CollectionKind::Habits => "habits",
            CollectionKind::Tags => "tags",
        }
    }
}

/// Decoded envelope of a list response.
#[derive(Debug, Clone, PartialEq)]
pub enum CollectionShape {
    Bare(Vec<Value>),
    Wrapped(Vec<Value>),
    /// Carries a short description of what was received instead.
    Unrecognized(String),
}

impl CollectionShape {
    pub fn classify(kind: CollectionKind, body: Option<Value>) -> Self {
        let key = kind.envelope_key();
        match body {
            Some(Value::Array(items)) => CollectionShape::Bare(items),
            Some(Value::Object(mut map)) => match map.remove(key) {
                Some(Value::Array(items)) => CollectionShape::Wrapped(items),
                Some(other) => CollectionShape::Unrecognized(format!(
                    "object whose '{key}' field is {}",
                    json_type(&other)
                )),
                None => CollectionShape::Unrecognized(format!("object without a '{key}' field")),
            },
            Some(other) => CollectionShape::Unrecognized(json_type(&other).to_string()),
            None => CollectionShape::Unrecognized("empty body".to_string()),
        }
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, CollectionShape::Unrecognized(_))
    }

    pub fn into_items(self) -> Vec<Value> {
        match self {
            CollectionShape::Bare(items) | CollectionShape::Wrapped(items) => items,
            CollectionShape::Unrecognized(_) => Vec::new(),
        }
    }
}

pub fn reconcile_collection(kind: CollectionKind, body: Option<Value>) -> Vec<Value> {
    CollectionShape::classify(kind, body).into_items()
}

/// Decoded single-entity response.
#[derive(Debug, Clone, PartialEq)]
pub enum EntityShape {
    Object(Map<String, Value>),
    Unrecognized(String),
}

impl EntityShape {
    pub fn classify(body: Option<Value>) -> Self {
        match body {
            Some(Value::Object(map)) => EntityShape::Object(map),
            Some(other) => EntityShape::Unrecognized(json_type(&other).to_string()),
            None => EntityShape::Unrecognized("empty body".to_string()),
        }
    }

    pub fn into_map(self) -> Map<String, Value> {
        match self {
            EntityShape::Object(map) => map,
            EntityShape::Unrecognized(_) => Map::new(),
        }
    }
}

pub fn reconcile_entity(body: Option<Value>) -> Map<String, Value> {
    EntityShape::classify(body).into_map()
}

/// Tag ids currently on a task, in remote order.
///
/// Accepts plain id strings and `{"id": ...}` objects; anything else is skipped.
pub fn task_tag_ids(task: &Map<String, Value>) -> Vec<String> {
    let Some(tags) = task.get("tags").and_then(Value::as_array) else {
        return Vec::new();
    };
    tags.iter()
        .filter_map(|tag| match tag {
            Value::String(id) => Some(id.clone()),
            Value::Object(obj) => obj.get("id").and_then(Value::as_str).map(str::to_string),
            _ => None,
        })
        .collect()
}

/// True when the task references a project. Inbox tasks have none.
pub fn task_has_project(task: &Value) -> bool {
    task.get("projectId")
        .is_some_and(|project| !project.is_null() && project.as_str() != Some(""))
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
