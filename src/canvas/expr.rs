use serde_json::Value;

/// State lookup used during resolution. `None` means the path does not exist,
/// which is distinct from an explicit JSON `null` only in that both render as
/// the empty string and both compare as non-numbers.
pub type Lookup<'a> = dyn Fn(&str) -> Option<Value> + 'a;

/// Resolves a value that may contain `$path` / `$concat` / `$template`
/// references against state. Plain objects and arrays are resolved member by
/// member; primitives pass through. Total over any JSON input.
pub fn resolve(value: &Value, get: &Lookup) -> Value {
    match value {
        Value::Object(map) => {
            if let Some(path) = map.get("$path").and_then(Value::as_str) {
                return get(path).unwrap_or(Value::Null);
            }
            if let Some(parts) = map.get("$concat").and_then(Value::as_array) {
                let joined: String = parts
                    .iter()
                    .map(|part| display(&resolve(part, get)))
                    .collect();
                return Value::String(joined);
            }
            if let Some(template) = map.get("$template").and_then(Value::as_str) {
                return Value::String(render_template(template, get));
            }
            Value::Object(
                map.iter()
                    .map(|(key, member)| (key.clone(), resolve(member, get)))
                    .collect(),
            )
        }
        Value::Array(items) => Value::Array(items.iter().map(|item| resolve(item, get)).collect()),
        other => other.clone(),
    }
}

/// True when the value contains any reference that needs state to resolve.
/// Detection only; nothing is evaluated.
pub fn is_dynamic(value: &Value) -> bool {
    match value {
        Value::Object(map) => {
            map.contains_key("$path")
                || map.contains_key("$concat")
                || map.contains_key("$template")
                || map.values().any(is_dynamic)
        }
        Value::Array(items) => items.iter().any(is_dynamic),
        _ => false,
    }
}

/// Substitutes `${path}` placeholders left to right. Interior whitespace is
/// trimmed before lookup; missing and null both substitute as "". An
/// unterminated placeholder is copied through verbatim.
fn render_template(template: &str, get: &Lookup) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find('}') {
            Some(end) => {
                let path = after[..end].trim();
                if let Some(value) = get(path) {
                    out.push_str(&display(&value));
                }
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

/// String coercion used by `$concat`, `$template`, and text props: null is
/// empty, strings are unquoted, containers serialize as compact JSON.
pub fn display(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        Value::Bool(flag) => flag.to_string(),
        Value::Number(number) => number.to_string(),
        container => serde_json::to_string(container).unwrap_or_default(),
    }
}

/// Truthiness over resolved values: false, 0, "", and null are falsy;
/// containers are always truthy.
pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Numeric coercion for ordered comparisons. Non-numeric strings, containers,
/// and null coerce to NaN, and every comparison against NaN is false; that
/// behavior is load-bearing for documents probing absent state.
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

// Strict equality: primitives by value, container operands always unequal.
// Two independently resolved containers never share identity, so documents
// comparing objects get `false` no matter the contents. Documented contract,
// not an oversight; do not switch to deep equality.
fn strict_eq(a: &Value, b: &Value) -> bool {
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

/// Evaluates a condition tree to a boolean. Unrecognized shapes evaluate to
/// false; bare values evaluate by truthiness. A comparator key that is
/// present but malformed decides the condition as false rather than falling
/// through to a later key.
pub fn eval_condition(cond: &Value, get: &Lookup) -> bool {
    let Value::Object(map) = cond else {
        return truthy(cond);
    };

    if let Some(path) = map.get("path").and_then(Value::as_str) {
        return get(path).map(|value| truthy(&value)).unwrap_or(false);
    }
    for (op, test) in COMPARATORS {
        if let Some(pair) = map.get(*op) {
            return match operands(pair, get) {
                Some((left, right)) => test(&left, &right),
                None => false,
            };
        }
    }
    if let Some(terms) = map.get("and").and_then(Value::as_array) {
        return terms.iter().all(|term| eval_condition(term, get));
    }
    if let Some(terms) = map.get("or").and_then(Value::as_array) {
        return terms.iter().any(|term| eval_condition(term, get));
    }
    if let Some(inner) = map.get("not") {
        return !eval_condition(inner, get);
    }

    false
}

type Comparator = fn(&Value, &Value) -> bool;

const COMPARATORS: &[(&str, Comparator)] = &[
    ("eq", |a, b| strict_eq(a, b)),
    ("ne", |a, b| !strict_eq(a, b)),
    ("gt", |a, b| to_number(a) > to_number(b)),
    ("gte", |a, b| to_number(a) >= to_number(b)),
    ("lt", |a, b| to_number(a) < to_number(b)),
    ("lte", |a, b| to_number(a) <= to_number(b)),
];

fn operands(pair: &Value, get: &Lookup) -> Option<(Value, Value)> {
    let items = pair.as_array()?;
    if items.len() != 2 {
        return None;
    }
    Some((resolve(&items[0], get), resolve(&items[1], get)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn state_get(state: Value) -> impl Fn(&str) -> Option<Value> {
        move |path| {
            let mut cursor = &state;
            for segment in path.split('/').filter(|s| !s.is_empty()) {
                cursor = cursor.get(segment)?;
            }
            Some(cursor.clone())
        }
    }

    #[test]
    fn path_reference_reads_state() {
        let get = state_get(json!({ "user": { "name": "Ada" } }));
        assert_eq!(
            resolve(&json!({ "$path": "/user/name" }), &get),
            json!("Ada")
        );
        assert_eq!(resolve(&json!({ "$path": "/user/age" }), &get), json!(null));
    }

    #[test]
    fn template_substitutes_present_and_absent_paths() {
        let get = state_get(json!({ "user": { "name": "Ada" } }));
        assert_eq!(
            resolve(&json!({ "$template": "Hi ${/user/name}!" }), &get),
            json!("Hi Ada!")
        );
        assert_eq!(
            resolve(&json!({ "$template": "Hi ${/user/nick}!" }), &get),
            json!("Hi !")
        );
        assert_eq!(
            resolve(&json!({ "$template": "${ /user/name } and ${/user/name}" }), &get),
            json!("Ada and Ada")
        );
    }

    #[test]
    fn unterminated_template_placeholder_is_verbatim() {
        let get = state_get(json!({}));
        assert_eq!(
            resolve(&json!({ "$template": "broken ${/a" }), &get),
            json!("broken ${/a")
        );
    }

    #[test]
    fn concat_stringifies_each_entry_in_order() {
        let get = state_get(json!({ "count": 4 }));
        let expr = json!({ "$concat": ["items: ", { "$path": "/count" }, true] });
        assert_eq!(resolve(&expr, &get), json!("items: 4true"));
    }

    #[test]
    fn containers_resolve_member_by_member() {
        let get = state_get(json!({ "n": 2 }));
        let expr = json!({ "rows": [{ "$path": "/n" }, "x"], "fixed": 1 });
        assert_eq!(resolve(&expr, &get), json!({ "rows": [2, "x"], "fixed": 1 }));
    }

    #[test]
    fn dynamic_detection_scans_recursively() {
        assert!(is_dynamic(&json!({ "$path": "/a" })));
        assert!(is_dynamic(&json!([1, { "deep": { "$template": "x" } }])));
        assert!(!is_dynamic(&json!({ "text": "static", "n": [1, 2] })));
    }

    #[test]
    fn numeric_comparisons_treat_non_numbers_as_nan() {
        let get = state_get(json!({ "count": 10, "label": "abc" }));
        assert!(eval_condition(&json!({ "gt": [{ "$path": "/count" }, 5] }), &get));
        assert!(!eval_condition(&json!({ "gt": [{ "$path": "/label" }, 5] }), &get));
        assert!(!eval_condition(&json!({ "lt": [{ "$path": "/label" }, 5] }), &get));
        assert!(!eval_condition(&json!({ "gte": [{ "$path": "/missing" }, 0] }), &get));
    }

    #[test]
    fn equality_is_strict_and_shallow() {
        let get = state_get(json!({ "a": { "k": 1 }, "b": { "k": 1 }, "n": 3 }));
        assert!(eval_condition(&json!({ "eq": [{ "$path": "/n" }, 3] }), &get));
        assert!(!eval_condition(&json!({ "eq": [{ "$path": "/n" }, "3"] }), &get));
        // Container operands are never equal, even when structurally identical.
        assert!(!eval_condition(
            &json!({ "eq": [{ "$path": "/a" }, { "$path": "/b" }] }),
            &get
        ));
        assert!(eval_condition(
            &json!({ "ne": [{ "$path": "/a" }, { "$path": "/b" }] }),
            &get
        ));
    }

    #[test]
    fn boolean_connectives_compose() {
        let get = state_get(json!({ "a": 1, "b": 0 }));
        assert!(eval_condition(
            &json!({ "and": [{ "path": "/a" }, { "not": { "path": "/b" } }] }),
            &get
        ));
        assert!(eval_condition(
            &json!({ "or": [{ "path": "/b" }, { "path": "/a" }] }),
            &get
        ));
        assert!(!eval_condition(&json!({ "or": [] }), &get));
        assert!(eval_condition(&json!({ "and": [] }), &get));
    }

    #[test]
    fn unrecognized_condition_shapes_are_false() {
        let get = state_get(json!({}));
        assert!(!eval_condition(&json!({ "between": [1, 2, 3] }), &get));
        assert!(!eval_condition(&json!({ "eq": [1] }), &get));
        assert!(!eval_condition(&json!(null), &get));
        assert!(eval_condition(&json!("non-empty"), &get));
        assert!(!eval_condition(&json!(0), &get));
    }

    #[test]
    fn malformed_comparator_decides_without_falling_through() {
        let get = state_get(json!({}));
        // A present-but-broken comparator settles the whole condition even
        // when a later key would evaluate true on its own.
        assert!(!eval_condition(&json!({ "eq": [1], "and": [true] }), &get));
        assert!(!eval_condition(&json!({ "lt": "nope", "or": [true] }), &get));
        assert!(!eval_condition(&json!({ "gte": [1, 2, 3], "not": false }), &get));
    }
}
