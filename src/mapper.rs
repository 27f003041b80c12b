//! Name mappers for list items.
//!
//! A name mapper computes the element name of a list item from the item's
//! singular name, its index and its value. Mappers are registered under the
//! singular item name (`"element"` for a list keyed `"elements"`), and any
//! item name without a mapper falls back to the `"default"` entry, which
//! returns the name unchanged.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, LazyLock};

use crate::value::Value;

/// Name of the fallback mapper.
pub const DEFAULT_MAPPER: &str = "default";

/// A list item naming function: `(item_name, index, value) -> element name`.
pub type NameMapper = Arc<dyn Fn(&str, usize, &Value) -> String + Send + Sync>;

static IDENTITY: LazyLock<NameMapper> = LazyLock::new(|| Arc::new(identity));

/// Registry of name mappers keyed by singular item name.
#[derive(Clone)]
pub struct NameMappers {
    mappers: HashMap<String, NameMapper>,
}

impl Default for NameMappers {
    fn default() -> Self {
        let mut mappers: HashMap<String, NameMapper> = HashMap::new();
        mappers.insert(DEFAULT_MAPPER.to_string(), Arc::new(identity));
        Self { mappers }
    }
}

impl fmt::Debug for NameMappers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.mappers.keys().collect();
        names.sort();
        f.debug_struct("NameMappers").field("names", &names).finish()
    }
}

fn identity(name: &str, _index: usize, _value: &Value) -> String {
    name.to_string()
}

impl NameMappers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `mapper` for `name`, replacing any previous entry.
    pub fn register<F>(&mut self, name: impl Into<String>, mapper: F) -> &mut Self
    where
        F: Fn(&str, usize, &Value) -> String + Send + Sync + 'static,
    {
        self.mappers.insert(name.into(), Arc::new(mapper));
        self
    }

    /// Register an already shared mapper.
    pub fn register_shared(&mut self, name: impl Into<String>, mapper: NameMapper) -> &mut Self {
        self.mappers.insert(name.into(), mapper);
        self
    }

    /// Copy every entry of `other` over this registry.
    pub fn extend(&mut self, other: &NameMappers) -> &mut Self {
        for (name, mapper) in &other.mappers {
            self.mappers.insert(name.clone(), Arc::clone(mapper));
        }
        self
    }

    /// The mapper for `item_name`, or the default mapper.
    pub fn resolve(&self, item_name: &str) -> &NameMapper {
        self.mappers
            .get(item_name)
            .or_else(|| self.mappers.get(DEFAULT_MAPPER))
            .unwrap_or(&*IDENTITY)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.mappers.contains_key(name)
    }

    /// Apply the mapper resolved for `item_name`.
    pub fn map_name(&self, item_name: &str, index: usize, value: &Value) -> String {
        (self.resolve(item_name))(item_name, index, value)
    }
}

/// Build a mapper from a name template.
///
/// Placeholders:
/// - `{name}` — the item name
/// - `{index}` — the zero-based position in the list
/// - `{field}` — a scalar field of a map item; empty when absent
///
/// Use `{{` and `}}` for literal braces. An unterminated `{` is kept as text.
///
/// # Examples
///
/// ```
/// use arrayxml::{Value, mapper::template};
///
/// let mapper = template("{name}{id}");
/// let item = Value::map([("id", "One")]);
/// assert_eq!(mapper("element", 0, &item), "elementOne");
/// ```
pub fn template(pattern: &str) -> NameMapper {
    let pattern = pattern.to_string();
    Arc::new(move |name: &str, index: usize, value: &Value| {
        render_template(&pattern, name, index, value)
    })
}

fn render_template(pattern: &str, name: &str, index: usize, value: &Value) -> String {
    let mut out = String::with_capacity(pattern.len() + name.len());
    let mut rest = pattern;

    while let Some(pos) = rest.find(['{', '}']) {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];

        if tail.starts_with("{{") || tail.starts_with("}}") {
            out.push_str(&tail[..1]);
            rest = &tail[2..];
            continue;
        }
        if tail.starts_with('}') {
            out.push('}');
            rest = &tail[1..];
            continue;
        }

        let Some(end) = tail.find('}') else {
            out.push_str(tail);
            rest = "";
            break;
        };
        let placeholder = &tail[1..end];
        match placeholder {
            "name" => out.push_str(name),
            "index" => out.push_str(&index.to_string()),
            field => {
                if let Some(text) = value.get(field).and_then(Value::to_text) {
                    out.push_str(&text);
                }
            }
        }
        rest = &tail[end + 1..];
    }

    out.push_str(rest);
    out
}
