//! Property tests for key parsing and conversion.

use arrayxml::{
    ListContainer, Map, Options, Value, split_attributes, split_list_name, to_document, to_string,
};
use proptest::prelude::*;

/// Simple XML names: a letter followed by letters, digits, `-` or `_`.
fn xml_name() -> impl Strategy<Value = String> {
    "[a-zA-Z][a-zA-Z0-9_-]{0,8}"
}

/// Attribute values without the `@` separator.
fn attr_value() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 =<>&\"']{0,8}"
}

fn scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<i64>().prop_map(Value::Int),
        any::<bool>().prop_map(Value::Bool),
        "[a-zA-Z0-9 <>&]{0,12}".prop_map(Value::String),
    ]
}

fn tree() -> impl Strategy<Value = Value> {
    scalar().prop_recursive(4, 32, 4, |inner| {
        prop_oneof![
            prop::collection::vec((xml_name(), inner.clone()), 1..4)
                .prop_map(|entries| Value::Map(entries.into_iter().collect())),
            prop::collection::vec(inner, 0..4).prop_map(Value::Seq),
        ]
    })
}

fn root() -> impl Strategy<Value = Value> {
    prop::collection::vec((xml_name(), tree()), 1..4)
        .prop_map(|entries| Value::Map(entries.into_iter().collect()))
}

proptest! {
    #[test]
    fn split_attributes_recovers_name_and_pairs(
        name in xml_name(),
        attrs in prop::collection::vec((xml_name(), attr_value()), 0..4),
    ) {
        let mut key = name.clone();
        for (attr_name, value) in &attrs {
            key.push('@');
            key.push_str(attr_name);
            key.push('=');
            key.push_str(value);
        }

        let parsed = split_attributes(&key).unwrap();
        prop_assert_eq!(&parsed.name, &name);
        for (attr_name, _) in &attrs {
            // Last occurrence wins.
            let expected = &attrs.iter().rev().find(|(n, _)| n == attr_name).unwrap().1;
            prop_assert_eq!(&parsed.attributes[attr_name], expected);
        }
    }

    #[test]
    fn split_list_name_strips_one_trailing_s(base in "[a-z]{1,8}") {
        let plural = format!("{base}s");
        let list = split_list_name(&plural);
        prop_assert_eq!(list.container, ListContainer::Named(plural.clone()));
        prop_assert_eq!(list.item, base.clone());

        let flat = split_list_name(&format!("<{plural}"));
        prop_assert_eq!(flat.container, ListContainer::Flatten);
        prop_assert_eq!(flat.item, base);
    }

    #[test]
    fn scalar_maps_produce_one_element_per_key(
        entries in prop::collection::vec((xml_name(), scalar()), 1..8),
    ) {
        let map: Map = entries.into_iter().collect();
        let input = Value::map([("root", Value::Map(map.clone()))]);
        let doc = to_document(&input, &Options::default()).unwrap();

        let root = doc.document_element().unwrap();
        let children = doc.children(root);
        prop_assert_eq!(children.len(), map.len());
        for (&child, (key, value)) in children.iter().zip(&map) {
            prop_assert_eq!(doc.name(child), Some(key.as_str()));
            prop_assert_eq!(doc.text_content(child), value.to_text().unwrap_or_default());
        }
    }

    #[test]
    fn document_save_matches_to_string(input in root()) {
        let options = Options::default();
        // Generated trees may contain sequences nested in sequences, which fail.
        if let Ok(xml) = to_string(&input, &options) {
            let doc = to_document(&input, &options).unwrap();
            prop_assert_eq!(doc.to_xml(true).unwrap(), xml);
        }
    }

    #[test]
    fn omitting_declaration_drops_first_line(input in root()) {
        let with = to_string(&input, &Options::default());
        let without = to_string(&input, &Options::new().with_declaration(false));
        match (with, without) {
            (Ok(with), Ok(without)) => {
                let (first, rest) = with.split_once('\n').unwrap();
                prop_assert!(first.starts_with("<?xml "));
                prop_assert_eq!(rest, without.as_str());
            }
            (Err(_), Err(_)) => {}
            _ => prop_assert!(false, "declaration changed the outcome"),
        }
    }
}
