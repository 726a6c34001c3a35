//! Conversions from the page contexts into template [`Value`]s. Optional
//! fields are always present in the output (as `Nil` or `false`) so templates
//! can test them with `{{if}}`.

use crate::buzzword::Buzzword;
use crate::context::{ErrorContext, IndexContext, ProjectContext, TagBanner};
use crate::project::Project;
use gtmpl::Value;
use std::collections::HashMap;
use std::sync::Arc;

impl From<&Buzzword> for Value {
    fn from(b: &Buzzword) -> Value {
        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert("key".to_owned(), Value::String(b.key.clone()));
        m.insert("name".to_owned(), Value::String(b.name.clone()));
        m.insert("safe_name".to_owned(), Value::String(b.safe_name.clone()));
        m.insert("aliases".to_owned(), strings(&b.aliases));
        m.insert("slug".to_owned(), Value::String(b.slug.clone()));
        m.insert("tag_url".to_owned(), Value::String(b.tag_url()));
        Value::Object(m)
    }
}

impl From<&Project> for Value {
    /// Converts a [`Project`] into a [`Value::Object`]. Fields of the source
    /// record are passed through, then `id`, `sub_url`, `lines`,
    /// `has_description`, `buzzwords` and `has_buzzwords` are set on top of
    /// them. `lines` is empty when there is no description.
    fn from(p: &Project) -> Value {
        let mut m: HashMap<String, Value> = p
            .extra
            .iter()
            .map(|(k, v)| (k.clone(), from_json(v)))
            .collect();
        m.insert("id".to_owned(), Value::String(p.id.clone()));
        m.insert("sub_url".to_owned(), Value::String(p.sub_url()));
        let lines = p.description_lines.as_deref().unwrap_or_default();
        m.insert("lines".to_owned(), strings(lines));
        m.insert(
            "has_description".to_owned(),
            Value::Bool(p.description_lines.is_some()),
        );
        m.insert("buzzwords".to_owned(), buzzwords(&p.tags));
        m.insert("has_buzzwords".to_owned(), Value::Bool(p.has_tags()));
        Value::Object(m)
    }
}

impl From<&TagBanner> for Value {
    fn from(t: &TagBanner) -> Value {
        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert("name".to_owned(), Value::String(t.name.clone()));
        m.insert("warn_tag".to_owned(), Value::Bool(t.warn_tag));
        m.insert("warn_proj".to_owned(), Value::Bool(t.warn_proj));
        Value::Object(m)
    }
}

impl From<&IndexContext<'_>> for Value {
    fn from(c: &IndexContext<'_>) -> Value {
        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert(
            "tag".to_owned(),
            c.tag.as_ref().map_or(Value::Nil, Value::from),
        );
        m.insert(
            "info".to_owned(),
            c.info.as_deref().map_or(Value::Nil, Value::from),
        );
        m.insert(
            "projects".to_owned(),
            Value::Array(c.projects.iter().map(|&p| Value::from(p)).collect()),
        );
        Value::Object(m)
    }
}

impl From<&ProjectContext<'_>> for Value {
    fn from(c: &ProjectContext<'_>) -> Value {
        Value::from(c.0)
    }
}

impl From<&ErrorContext> for Value {
    fn from(c: &ErrorContext) -> Value {
        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert(
            "status".to_owned(),
            Value::String(c.status.as_u16().to_string()),
        );
        m.insert(
            "reason".to_owned(),
            Value::String(c.status.canonical_reason().unwrap_or_default().to_owned()),
        );
        Value::Object(m)
    }
}

/// Converts an arbitrary JSON value from a source record. Numbers become
/// strings since templates only ever print them.
pub fn from_json(v: &serde_json::Value) -> Value {
    use serde_json::Value as Json;
    match v {
        Json::Null => Value::Nil,
        Json::Bool(b) => Value::Bool(*b),
        Json::Number(n) => Value::String(n.to_string()),
        Json::String(s) => Value::String(s.clone()),
        Json::Array(items) => Value::Array(items.iter().map(from_json).collect()),
        Json::Object(fields) => Value::Object(
            fields
                .iter()
                .map(|(k, v)| (k.clone(), from_json(v)))
                .collect(),
        ),
    }
}

fn strings(items: &[String]) -> Value {
    Value::Array(items.iter().map(|s| Value::String(s.clone())).collect())
}

fn buzzwords(tags: &[Arc<Buzzword>]) -> Value {
    Value::Array(tags.iter().map(|t| Value::from(&**t)).collect())
}
