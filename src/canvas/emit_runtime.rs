// Resolution and dispatch helpers over a plain `serde_json::Value` state
// tree: slash paths, null-as-empty display, NaN-poisoned comparisons,
// shallow equality, silent no-op dispatch. This file is embedded verbatim
// in generated stateful programs, where `navigate` and `submit` degrade to
// stderr lines.

use serde_json::Value;

pub fn parse_json(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or(Value::Null)
}

pub fn get_path(state: &Value, path: &str) -> Value {
    let mut cursor = state;
    for segment in path.split('/').filter(|s| !s.is_empty()) {
        match cursor.get(segment) {
            Some(next) => cursor = next,
            None => return Value::Null,
        }
    }
    cursor.clone()
}

pub fn set_path(state: &mut Value, path: &str, value: Value) {
    let parts: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    let Some((last, intermediate)) = parts.split_last() else {
        return;
    };
    let mut cursor = state;
    for segment in intermediate {
        if !cursor.is_object() {
            *cursor = Value::Object(serde_json::Map::new());
        }
        let Value::Object(map) = cursor else { return };
        cursor = map
            .entry((*segment).to_string())
            .or_insert_with(|| Value::Object(serde_json::Map::new()));
    }
    if !cursor.is_object() {
        *cursor = Value::Object(serde_json::Map::new());
    }
    let Value::Object(map) = cursor else { return };
    map.insert((*last).to_string(), value);
}

pub fn display(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        Value::Bool(flag) => flag.to_string(),
        Value::Number(number) => number.to_string(),
        container => serde_json::to_string(container).unwrap_or_default(),
    }
}

pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

pub fn to_number(value: &Value) -> f64 {
    match value {
        Value::Number(number) => number.as_f64().unwrap_or(f64::NAN),
        Value::Bool(flag) => {
            if *flag {
                1.0
            } else {
                0.0
            }
        }
        Value::String(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                0.0
            } else {
                trimmed.parse().unwrap_or(f64::NAN)
            }
        }
        _ => f64::NAN,
    }
}

// Container operands are never equal, no matter the contents.
pub fn strict_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_f64(), y.as_f64()) {
            (Some(x), Some(y)) => x == y,
            _ => false,
        },
        (Value::Array(_) | Value::Object(_), _) => false,
        (_, Value::Array(_) | Value::Object(_)) => false,
        _ => a == b,
    }
}

pub fn render_template(template: &str, state: &Value) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find('}') {
            Some(end) => {
                let path = after[..end].trim();
                out.push_str(&display(&get_path(state, path)));
                rest = &after[end + 1..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

pub fn resolve_value(value: &Value, state: &Value) -> Value {
    match value {
        Value::Object(map) => {
            if let Some(path) = map.get("$path").and_then(Value::as_str) {
                return get_path(state, path);
            }
            if let Some(parts) = map.get("$concat").and_then(Value::as_array) {
                let joined: String = parts
                    .iter()
                    .map(|part| display(&resolve_value(part, state)))
                    .collect();
                return Value::String(joined);
            }
            if let Some(template) = map.get("$template").and_then(Value::as_str) {
                return Value::String(render_template(template, state));
            }
            Value::Object(
                map.iter()
                    .map(|(key, member)| (key.clone(), resolve_value(member, state)))
                    .collect(),
            )
        }
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| resolve_value(item, state))
                .collect(),
        ),
        other => other.clone(),
    }
}

pub fn eval_condition(cond: &Value, state: &Value) -> bool {
    let Value::Object(map) = cond else {
        return truthy(cond);
    };
    if let Some(path) = map.get("path").and_then(Value::as_str) {
        return truthy(&get_path(state, path));
    }
    let ops: &[(&str, fn(&Value, &Value) -> bool)] = &[
        ("eq", |a, b| strict_eq(a, b)),
        ("ne", |a, b| !strict_eq(a, b)),
        ("gt", |a, b| to_number(a) > to_number(b)),
        ("gte", |a, b| to_number(a) >= to_number(b)),
        ("lt", |a, b| to_number(a) < to_number(b)),
        ("lte", |a, b| to_number(a) <= to_number(b)),
    ];
    // A comparator that is present but malformed decides the condition as
    // false; it does not fall through to a later key.
    for (op, test) in ops {
        if let Some(pair) = map.get(*op) {
            return match pair.as_array().filter(|items| items.len() == 2) {
                Some(items) => {
                    let left = resolve_value(&items[0], state);
                    let right = resolve_value(&items[1], state);
                    test(&left, &right)
                }
                None => false,
            };
        }
    }
    if let Some(terms) = map.get("and").and_then(Value::as_array) {
        return terms.iter().all(|term| eval_condition(term, state));
    }
    if let Some(terms) = map.get("or").and_then(Value::as_array) {
        return terms.iter().any(|term| eval_condition(term, state));
    }
    if let Some(inner) = map.get("not") {
        return !eval_condition(inner, state);
    }
    false
}

pub fn dispatch(state: &mut Value, action: &str, params: &Value) {
    match action {
        "setState" => {
            let Some(path) = params.get("path").and_then(Value::as_str) else {
                return;
            };
            let value = params.get("value").cloned().unwrap_or(Value::Null);
            let resolved = resolve_value(&value, state);
            set_path(state, path, resolved);
        }
        "toggleState" => {
            let Some(path) = params.get("path").and_then(Value::as_str) else {
                return;
            };
            let current = truthy(&get_path(state, path));
            set_path(state, path, Value::Bool(!current));
        }
        "appendItem" => {
            let Some(path) = params.get("path").and_then(Value::as_str) else {
                return;
            };
            let item = params.get("item").cloned().unwrap_or(Value::Null);
            let mut items = match get_path(state, path) {
                Value::Array(items) => items,
                _ => Vec::new(),
            };
            items.push(item);
            set_path(state, path, Value::Array(items));
        }
        "removeItem" => {
            let Some(path) = params.get("path").and_then(Value::as_str) else {
                return;
            };
            let Some(index) = params.get("index").and_then(Value::as_u64) else {
                return;
            };
            let Value::Array(mut items) = get_path(state, path) else {
                return;
            };
            let index = index as usize;
            if index >= items.len() {
                return;
            }
            items.remove(index);
            set_path(state, path, Value::Array(items));
        }
        "navigate" => {
            if let Some(url) = params.get("url").and_then(Value::as_str) {
                eprintln!("navigate: {url}");
            }
        }
        "submit" => {
            let data = params.get("data").cloned().unwrap_or(Value::Null);
            let data = resolve_value(&data, state);
            eprintln!("submit: {data}");
        }
        "sequence" => {
            let Some(steps) = params.get("actions").and_then(Value::as_array) else {
                return;
            };
            for step in steps {
                let name = step.get("action").and_then(Value::as_str).unwrap_or("");
                let step_params = step.get("actionParams").cloned().unwrap_or(Value::Null);
                dispatch(state, name, &step_params);
            }
        }
        "conditional" => {
            let condition = params
                .get("condition")
                .cloned()
                .unwrap_or(Value::Bool(false));
            let taken = eval_condition(&condition, state);
            let branch = if taken {
                params.get("then")
            } else {
                params.get("else")
            };
            if let Some(step) = branch {
                let name = step.get("action").and_then(Value::as_str).unwrap_or("");
                let step_params = step.get("actionParams").cloned().unwrap_or(Value::Null);
                dispatch(state, name, &step_params);
            }
        }
        _ => {}
    }
}
