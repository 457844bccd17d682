use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// One event binding: the action name plus its parameter object. Both fields
/// default so a half-formed binding deserializes and later no-ops at dispatch
/// instead of rejecting the whole document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionBinding {
    #[serde(default)]
    pub action: String,
    #[serde(default, rename = "actionParams")]
    pub action_params: Value,
}

/// One node of the canonical element graph.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ElementDef {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub props: BTreeMap<String, Value>,
    #[serde(default)]
    pub children: Vec<String>,
    #[serde(default)]
    pub on: BTreeMap<String, ActionBinding>,
    #[serde(default)]
    pub visible: Option<Value>,
}

/// Canonical flat document: a distinguished root key, the element graph, and
/// the initial state tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanvasSpec {
    pub root: String,
    pub elements: BTreeMap<String, ElementDef>,
    #[serde(default = "default_state")]
    pub state: Value,
}

pub fn default_state() -> Value {
    serde_json::json!({ "form": {} })
}

/// Converts either accepted document shape into the canonical flat form.
///
/// A flat document (`root` is a key into `elements`) passes through
/// unchanged. A nested document (`root` is an inline node with a `type`) is
/// flattened depth-first in pre-order; synthetic keys are
/// `<lowercased-type>-<n>` with the counter scoped to this call, so two
/// concurrent normalizations can never collide. Anything else returns `None`
/// and the caller shows the raw document instead of failing.
pub fn normalize(doc: &Value) -> Option<CanvasSpec> {
    let root = doc.get("root")?;
    if root.is_string() && doc.get("elements").is_some_and(Value::is_object) {
        return serde_json::from_value(doc.clone()).ok();
    }

    if root.get("type").and_then(Value::as_str).is_some() {
        let mut elements = BTreeMap::new();
        let mut counter = 0usize;
        let root_key = flatten_node(root, &mut elements, &mut counter)?;
        let state = match doc.get("state") {
            Some(state) if !state.is_null() => state.clone(),
            _ => default_state(),
        };
        return Some(CanvasSpec {
            root: root_key,
            elements,
            state,
        });
    }

    None
}

fn flatten_node(
    node: &Value,
    elements: &mut BTreeMap<String, ElementDef>,
    counter: &mut usize,
) -> Option<String> {
    let kind = node.get("type").and_then(Value::as_str)?;
    let key = format!("{}-{}", kind.to_ascii_lowercase(), *counter);
    *counter += 1;

    let mut def = ElementDef {
        kind: kind.to_string(),
        ..ElementDef::default()
    };
    if let Some(props) = node.get("props").and_then(Value::as_object) {
        def.props = props
            .iter()
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();
    }
    if let Some(on) = node.get("on").and_then(Value::as_object) {
        for (event, binding) in on {
            let binding = serde_json::from_value(binding.clone()).unwrap_or_default();
            def.on.insert(event.clone(), binding);
        }
    }
    def.visible = node.get("visible").cloned();

    if let Some(children) = node.get("children").and_then(Value::as_array) {
        for child in children {
            // Entries that are not nodes (strings, numbers, nodes without a
            // type) are skipped rather than rejected.
            if let Some(child_key) = flatten_node(child, elements, counter) {
                def.children.push(child_key);
            }
        }
    }

    elements.insert(key.clone(), def);
    Some(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn flat_document_passes_through_unchanged() {
        let doc = json!({
            "root": "card-1",
            "elements": {
                "card-1": { "type": "Card", "children": ["text-1", "text-2"] },
                "text-1": { "type": "Text", "props": { "text": "a" } },
                "text-2": { "type": "Text", "props": { "text": "b" } }
            },
            "state": { "count": 3 }
        });

        let normalized = normalize(&doc).expect("flat document should normalize");
        assert_eq!(normalized.root, "card-1");
        assert_eq!(
            normalized.elements["card-1"].children,
            vec!["text-1", "text-2"]
        );
        assert_eq!(normalized.state, json!({ "count": 3 }));

        let again = normalize(&serde_json::to_value(&normalized).expect("serialize"))
            .expect("canonical form should normalize");
        assert_eq!(again, normalized);
    }

    #[test]
    fn nested_document_flattens_to_one_key_per_node() {
        let doc = json!({
            "root": {
                "type": "Card",
                "children": [
                    { "type": "Heading", "props": { "text": "Title" } },
                    {
                        "type": "Row",
                        "children": [
                            { "type": "Text", "props": { "text": "left" } },
                            { "type": "Text", "props": { "text": "right" } }
                        ]
                    }
                ]
            }
        });

        let normalized = normalize(&doc).expect("nested document should normalize");
        assert_eq!(normalized.elements.len(), 5);
        assert_eq!(normalized.root, "card-0");

        let root = &normalized.elements["card-0"];
        assert_eq!(root.children, vec!["heading-1", "row-2"]);
        let row = &normalized.elements["row-2"];
        assert_eq!(row.children, vec!["text-3", "text-4"]);
        assert_eq!(
            normalized.elements["text-4"].props["text"],
            json!("right")
        );
    }

    #[test]
    fn nested_document_without_state_gets_default_state() {
        let doc = json!({ "root": { "type": "Text", "props": { "text": "x" } } });
        let normalized = normalize(&doc).expect("should normalize");
        assert_eq!(normalized.state, default_state());
    }

    #[test]
    fn malformed_child_entries_are_skipped() {
        let doc = json!({
            "root": {
                "type": "Column",
                "children": [
                    "just a string",
                    42,
                    { "props": { "text": "no type" } },
                    { "type": "Text", "props": { "text": "kept" } }
                ]
            }
        });

        let normalized = normalize(&doc).expect("should normalize");
        assert_eq!(normalized.elements["column-0"].children, vec!["text-1"]);
        assert_eq!(normalized.elements.len(), 2);
    }

    #[test]
    fn event_bindings_and_visibility_survive_flattening() {
        let doc = json!({
            "root": {
                "type": "Button",
                "props": { "label": "Go" },
                "on": { "press": { "action": "toggleState", "actionParams": { "path": "/open" } } },
                "visible": { "path": "/ready" }
            }
        });

        let normalized = normalize(&doc).expect("should normalize");
        let button = &normalized.elements["button-0"];
        assert_eq!(button.on["press"].action, "toggleState");
        assert_eq!(button.on["press"].action_params, json!({ "path": "/open" }));
        assert_eq!(button.visible, Some(json!({ "path": "/ready" })));
    }

    #[test]
    fn unrecognized_shapes_return_none() {
        assert!(normalize(&json!(null)).is_none());
        assert!(normalize(&json!("text")).is_none());
        assert!(normalize(&json!({ "components": [] })).is_none());
        assert!(normalize(&json!({ "root": 17 })).is_none());
        // Flat root key without an elements map is not canonical.
        assert!(normalize(&json!({ "root": "a" })).is_none());
    }

    #[test]
    fn synthetic_counter_is_scoped_per_call() {
        let doc = json!({ "root": { "type": "Text" } });
        let first = normalize(&doc).expect("should normalize");
        let second = normalize(&doc).expect("should normalize");
        assert_eq!(first.root, "text-0");
        assert_eq!(second.root, "text-0");
    }
}
