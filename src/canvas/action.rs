use crate::canvas::expr;
use crate::canvas::spec::ActionBinding;
use crate::canvas::state::StateStore;
use serde::Serialize;
use serde_json::Value;

/// Side effects that leave the canvas. The dispatcher never performs them
/// itself; the hosting shell drains the log and acts (opens the url, forwards
/// the payload).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum CanvasEffect {
    Navigated { url: String },
    Submitted { data: Value },
}

impl CanvasEffect {
    pub fn to_log_line(&self) -> String {
        match self {
            Self::Navigated { url } => format!("navigate url={url}"),
            Self::Submitted { data } => format!("submit data={data}"),
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct EffectLog {
    entries: Vec<CanvasEffect>,
}

impl EffectLog {
    pub fn entries(&self) -> &[CanvasEffect] {
        &self.entries
    }

    pub fn push(&mut self, effect: CanvasEffect) {
        self.entries.push(effect);
    }

    /// Hands the accumulated effects to the caller and resets the log.
    pub fn drain(&mut self) -> Vec<CanvasEffect> {
        std::mem::take(&mut self.entries)
    }
}

/// Dispatches one named action against the store. Unknown action names and
/// malformed parameters are silent no-ops; documents come from a generative
/// agent and staying up beats strict validation. `sequence` and `conditional`
/// recurse through this same function.
pub fn dispatch(
    store: &mut StateStore,
    action: &str,
    params: &Value,
    emit: &mut dyn FnMut(CanvasEffect),
) {
    match action {
        "setState" => {
            let Some(path) = str_param(params, "path") else {
                return;
            };
            let value = params.get("value").cloned().unwrap_or(Value::Null);
            let resolved = resolve_in(store, &value);
            store.set(&path, resolved);
        }
        "toggleState" => {
            let Some(path) = str_param(params, "path") else {
                return;
            };
            let current = store.get(&path).map(|v| expr::truthy(&v)).unwrap_or(false);
            store.set(&path, Value::Bool(!current));
        }
        "appendItem" => {
            let Some(path) = str_param(params, "path") else {
                return;
            };
            let item = params.get("item").cloned().unwrap_or(Value::Null);
            let mut items = match store.get(&path) {
                Some(Value::Array(items)) => items,
                _ => Vec::new(),
            };
            items.push(item);
            store.set(&path, Value::Array(items));
        }
        "removeItem" => {
            let Some(path) = str_param(params, "path") else {
                return;
            };
            let Some(index) = params.get("index").and_then(Value::as_u64) else {
                return;
            };
            let Some(Value::Array(mut items)) = store.get(&path) else {
                return;
            };
            let index = index as usize;
            if index >= items.len() {
                return;
            }
            items.remove(index);
            store.set(&path, Value::Array(items));
        }
        "navigate" => {
            if let Some(url) = str_param(params, "url") {
                emit(CanvasEffect::Navigated { url });
            }
        }
        "submit" => {
            let data = params.get("data").cloned().unwrap_or(Value::Null);
            let data = resolve_in(store, &data);
            emit(CanvasEffect::Submitted { data });
        }
        "sequence" => {
            let Some(steps) = params.get("actions").and_then(Value::as_array) else {
                return;
            };
            for step in steps {
                let name = step.get("action").and_then(Value::as_str).unwrap_or("");
                let step_params = step.get("actionParams").cloned().unwrap_or(Value::Null);
                dispatch(store, name, &step_params, emit);
            }
        }
        "conditional" => {
            let condition = params.get("condition").cloned().unwrap_or(Value::Bool(false));
            let taken = {
                let reader: &StateStore = store;
                expr::eval_condition(&condition, &|path| reader.get(path))
            };
            let branch = if taken {
                params.get("then")
            } else {
                params.get("else")
            };
            if let Some(step) = branch {
                let name = step.get("action").and_then(Value::as_str).unwrap_or("");
                let step_params = step.get("actionParams").cloned().unwrap_or(Value::Null);
                dispatch(store, name, &step_params, emit);
            }
        }
        _ => {}
    }
}

/// Dispatches an element's event binding.
pub fn dispatch_binding(
    store: &mut StateStore,
    binding: &ActionBinding,
    emit: &mut dyn FnMut(CanvasEffect),
) {
    dispatch(store, &binding.action, &binding.action_params, emit);
}

fn resolve_in(store: &StateStore, value: &Value) -> Value {
    expr::resolve(value, &|path| store.get(path))
}

fn str_param(params: &Value, name: &str) -> Option<String> {
    params
        .get(name)
        .and_then(Value::as_str)
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn run(store: &mut StateStore, action: &str, params: Value) -> Vec<CanvasEffect> {
        let mut effects = Vec::new();
        dispatch(store, action, &params, &mut |effect| effects.push(effect));
        effects
    }

    #[test]
    fn set_state_resolves_its_value() {
        let mut store = StateStore::new(json!({ "user": { "name": "Ada" } }));
        run(
            &mut store,
            "setState",
            json!({ "path": "/greeting", "value": { "$template": "Hi ${/user/name}!" } }),
        );
        assert_eq!(store.get("/greeting"), Some(json!("Hi Ada!")));
    }

    #[test]
    fn toggle_state_negates_truthiness() {
        let mut store = StateStore::new(json!({ "open": true }));
        run(&mut store, "toggleState", json!({ "path": "/open" }));
        assert_eq!(store.get("/open"), Some(json!(false)));
        run(&mut store, "toggleState", json!({ "path": "/missing" }));
        assert_eq!(store.get("/missing"), Some(json!(true)));
    }

    #[test]
    fn sequence_appends_in_declared_order() {
        let mut store = StateStore::new(json!({}));
        run(
            &mut store,
            "sequence",
            json!({ "actions": [
                { "action": "appendItem", "actionParams": { "path": "/items", "item": "a" } },
                { "action": "appendItem", "actionParams": { "path": "/items", "item": "b" } },
                { "action": "appendItem", "actionParams": { "path": "/items", "item": "c" } }
            ] }),
        );
        assert_eq!(store.get("/items"), Some(json!(["a", "b", "c"])));
    }

    #[test]
    fn remove_item_out_of_bounds_is_a_no_op() {
        let mut store = StateStore::new(json!({ "items": ["a", "b"] }));
        run(&mut store, "removeItem", json!({ "path": "/items", "index": 5 }));
        assert_eq!(store.get("/items"), Some(json!(["a", "b"])));
        run(&mut store, "removeItem", json!({ "path": "/items", "index": 0 }));
        assert_eq!(store.get("/items"), Some(json!(["b"])));
    }

    #[test]
    fn remove_item_on_non_array_is_a_no_op() {
        let mut store = StateStore::new(json!({ "items": "not an array" }));
        run(&mut store, "removeItem", json!({ "path": "/items", "index": 0 }));
        assert_eq!(store.get("/items"), Some(json!("not an array")));
    }

    #[test]
    fn conditional_takes_the_matching_branch() {
        let params = json!({
            "condition": { "gt": [{ "$path": "/count" }, 5] },
            "then": { "action": "setState", "actionParams": { "path": "/flag", "value": true } },
            "else": { "action": "setState", "actionParams": { "path": "/flag", "value": false } }
        });

        let mut store = StateStore::new(json!({ "count": 10 }));
        run(&mut store, "conditional", params.clone());
        assert_eq!(store.get("/flag"), Some(json!(true)));

        let mut store = StateStore::new(json!({ "count": 3 }));
        run(&mut store, "conditional", params);
        assert_eq!(store.get("/flag"), Some(json!(false)));
    }

    #[test]
    fn conditional_without_else_leaves_state_untouched() {
        let mut store = StateStore::new(json!({ "count": 3 }));
        run(
            &mut store,
            "conditional",
            json!({
                "condition": { "gt": [{ "$path": "/count" }, 5] },
                "then": { "action": "setState", "actionParams": { "path": "/flag", "value": true } }
            }),
        );
        assert_eq!(store.get("/flag"), None);
    }

    #[test]
    fn navigate_and_submit_surface_effects_without_mutation() {
        let mut store = StateStore::new(json!({ "form": { "a": 1 } }));
        let before = store.snapshot();
        let effects = run(&mut store, "navigate", json!({ "url": "https://example.com" }));
        assert_eq!(
            effects,
            vec![CanvasEffect::Navigated { url: "https://example.com".to_string() }]
        );

        let effects = run(
            &mut store,
            "submit",
            json!({ "data": { "$path": "/form" } }),
        );
        assert_eq!(
            effects,
            vec![CanvasEffect::Submitted { data: json!({ "a": 1 }) }]
        );
        assert_eq!(store.snapshot(), before);
    }

    #[test]
    fn unknown_actions_and_malformed_params_no_op() {
        let mut store = StateStore::new(json!({ "x": 1 }));
        let before = store.snapshot();
        assert!(run(&mut store, "explode", json!({})).is_empty());
        assert!(run(&mut store, "setState", json!({ "value": 2 })).is_empty());
        assert!(run(&mut store, "setState", json!(null)).is_empty());
        assert!(run(&mut store, "removeItem", json!({ "path": "/x", "index": "first" })).is_empty());
        assert!(run(&mut store, "navigate", json!({})).is_empty());
        assert_eq!(store.snapshot(), before);
    }

    #[test]
    fn sequence_recurses_into_conditionals() {
        let mut store = StateStore::new(json!({ "count": 10 }));
        run(
            &mut store,
            "sequence",
            json!({ "actions": [
                { "action": "conditional", "actionParams": {
                    "condition": { "path": "/count" },
                    "then": { "action": "appendItem", "actionParams": { "path": "/log", "item": "seen" } }
                } },
                { "action": "toggleState", "actionParams": { "path": "/done" } }
            ] }),
        );
        assert_eq!(store.get("/log"), Some(json!(["seen"])));
        assert_eq!(store.get("/done"), Some(json!(true)));
    }
}
