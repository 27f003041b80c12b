//! Key name grammar.
//!
//! Map keys carry more than an element name. The grammar is:
//!
//! ```text
//! key       = [ "<" ] name [ "|" item ] { "@" attr-name [ "=" attr-value ] }
//! ```
//!
//! - `name@id=7@lang=en` produces `<name id="7" lang="en">`
//! - `elements|thing` names the items of a list `thing` instead of `element`
//! - `<things` flattens a list: items attach to the enclosing element
//!
//! The flatten marker and the item name only matter for list-valued keys.
//! Attribute suffixes are parsed wherever a key becomes an element, so a
//! container name or an explicit item name may carry attributes too.

use indexmap::IndexMap;

use crate::error::{Error, Result};

/// Prefix marking a list whose items attach directly to the parent.
pub const FLATTEN_MARKER: char = '<';

/// Separator between a list container name and its item name.
pub const ITEM_SEPARATOR: char = '|';

/// Separator introducing an attribute.
pub const ATTRIBUTE_SEPARATOR: char = '@';

/// A key split into its element name and attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyName {
    pub name: String,
    /// Attributes in declaration order. A repeated name keeps its first
    /// position and takes the last value.
    pub attributes: IndexMap<String, String>,
}

/// Where the items of a list are attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListContainer {
    /// A wrapper element with this (possibly attribute-carrying) key.
    Named(String),
    /// No wrapper; items attach to the enclosing element.
    Flatten,
}

/// A list key split into its container and singular item name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListName {
    pub container: ListContainer,
    pub item: String,
}

impl ListName {
    pub fn is_flatten(&self) -> bool {
        self.container == ListContainer::Flatten
    }
}

/// Split a key into its element name and `@name=value` attributes.
///
/// Everything after the first `=` of a segment is the value, including any
/// further `=`. A segment without `=` yields an empty value.
///
/// # Errors
///
/// [`Error::InvalidName`] with an empty name when an attribute segment has
/// no name (`"root@"` or `"root@=x"`).
///
/// # Examples
///
/// ```
/// use arrayxml::key::split_attributes;
///
/// let key = split_attributes("link@href=a?b=c@rel=next").unwrap();
/// assert_eq!(key.name, "link");
/// assert_eq!(key.attributes["href"], "a?b=c");
/// assert_eq!(key.attributes["rel"], "next");
/// ```
pub fn split_attributes(key: &str) -> Result<KeyName> {
    let mut segments = key.split(ATTRIBUTE_SEPARATOR);
    let name = segments.next().unwrap_or_default().to_string();

    let mut attributes = IndexMap::new();
    for segment in segments {
        let (attr_name, attr_value) = segment.split_once('=').unwrap_or((segment, ""));
        if attr_name.is_empty() {
            return Err(Error::invalid_name(attr_name, "attribute name is empty"));
        }
        attributes.insert(attr_name.to_string(), attr_value.to_string());
    }

    Ok(KeyName { name, attributes })
}

/// Split a list key into its container and the singular name of its items.
///
/// Without an explicit `|item`, the item name is the container name with a
/// single trailing `s` (either case) removed. Other plural forms are not
/// recognised: `"boxes"` gives `"boxe"`.
///
/// # Examples
///
/// ```
/// use arrayxml::key::{ListContainer, split_list_name};
///
/// let list = split_list_name("elements");
/// assert_eq!(list.container, ListContainer::Named("elements".into()));
/// assert_eq!(list.item, "element");
///
/// let list = split_list_name("<elements|thing");
/// assert_eq!(list.container, ListContainer::Flatten);
/// assert_eq!(list.item, "thing");
/// ```
pub fn split_list_name(key: &str) -> ListName {
    let (flatten, rest) = match key.strip_prefix(FLATTEN_MARKER) {
        Some(rest) => (true, rest),
        None => (false, key),
    };

    let mut parts = rest.split(ITEM_SEPARATOR);
    let container_name = parts.next().unwrap_or_default();
    let item = match parts.next() {
        Some(explicit) => explicit.to_string(),
        None => singularize(container_name).to_string(),
    };

    let container = if flatten {
        ListContainer::Flatten
    } else {
        ListContainer::Named(container_name.to_string())
    };

    ListName { container, item }
}

fn singularize(name: &str) -> &str {
    name.strip_suffix(['s', 'S']).unwrap_or(name)
}
