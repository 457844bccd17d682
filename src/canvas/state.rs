use serde_json::{Map, Value};

/// The single mutable state tree backing one canvas instance.
///
/// Reads walk slash-delimited paths; writes publish a fresh copy of the tree
/// (copy-on-write), so a snapshot taken before a `set` is never mutated
/// underneath its holder. All access is synchronous and single-threaded.
#[derive(Debug, Clone)]
pub struct StateStore {
    tree: Value,
}

impl StateStore {
    pub fn new(initial: Value) -> Self {
        Self { tree: initial }
    }

    /// The current tree by value. Later `set` calls do not affect the
    /// returned snapshot.
    pub fn snapshot(&self) -> Value {
        self.tree.clone()
    }

    /// Reads the value at `path`, returning `None` as soon as any segment is
    /// absent. Empty segments are dropped, so `/a/b`, `a/b/`, and `//a//b`
    /// address the same slot.
    pub fn get(&self, path: &str) -> Option<Value> {
        let mut cursor = &self.tree;
        for segment in segments(path) {
            cursor = cursor.get(segment)?;
        }
        Some(cursor.clone())
    }

    /// Writes `value` at `path`, creating intermediate objects on demand. An
    /// intermediate that exists but is not an object is replaced by one. The
    /// whole tree is cloned first and swapped in at the end, which is what
    /// keeps previously taken snapshots stable. An empty path is a no-op.
    pub fn set(&mut self, path: &str, value: Value) {
        let parts: Vec<&str> = segments(path).collect();
        let Some((last, intermediate)) = parts.split_last() else {
            return;
        };

        let mut next = self.tree.clone();
        let mut cursor = &mut next;
        for segment in intermediate {
            ensure_object(cursor);
            let Value::Object(map) = cursor else {
                return;
            };
            cursor = map
                .entry((*segment).to_string())
                .or_insert_with(|| Value::Object(Map::new()));
        }
        ensure_object(cursor);
        let Value::Object(map) = cursor else {
            return;
        };
        map.insert((*last).to_string(), value);

        self.tree = next;
    }
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new(crate::canvas::spec::default_state())
    }
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|segment| !segment.is_empty())
}

fn ensure_object(slot: &mut Value) {
    if !slot.is_object() {
        *slot = Value::Object(Map::new());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn set_then_get_round_trips() {
        let mut store = StateStore::new(json!({}));
        store.set("/form/email", json!("ada@example.com"));
        assert_eq!(store.get("/form/email"), Some(json!("ada@example.com")));
        assert_eq!(store.get("/form"), Some(json!({ "email": "ada@example.com" })));
    }

    #[test]
    fn set_creates_intermediate_segments_on_demand() {
        let mut store = StateStore::new(json!({}));
        store.set("/a/b/c/d", json!(1));
        assert_eq!(store.get("/a/b/c/d"), Some(json!(1)));
        assert_eq!(store.get("/a/b"), Some(json!({ "c": { "d": 1 } })));
    }

    #[test]
    fn set_replaces_non_object_intermediates() {
        let mut store = StateStore::new(json!({ "a": "leaf" }));
        store.set("/a/b", json!(true));
        assert_eq!(store.get("/a/b"), Some(json!(true)));
    }

    #[test]
    fn get_short_circuits_on_absent_segments() {
        let store = StateStore::new(json!({ "a": { "b": 1 } }));
        assert_eq!(store.get("/a/b"), Some(json!(1)));
        assert_eq!(store.get("/a/x/y"), None);
        assert_eq!(store.get("/missing"), None);
    }

    #[test]
    fn leading_and_trailing_slashes_are_tolerated() {
        let mut store = StateStore::new(json!({}));
        store.set("count/", json!(2));
        assert_eq!(store.get("/count"), Some(json!(2)));
        assert_eq!(store.get("count"), Some(json!(2)));
        assert_eq!(store.get("//count//"), Some(json!(2)));
    }

    #[test]
    fn snapshots_are_copy_on_write() {
        let mut store = StateStore::new(json!({ "items": ["a"] }));
        let before = store.snapshot();
        store.set("/items", json!(["a", "b"]));
        assert_eq!(before, json!({ "items": ["a"] }));
        assert_eq!(store.get("/items"), Some(json!(["a", "b"])));
    }

    #[test]
    fn empty_path_set_is_a_no_op() {
        let mut store = StateStore::new(json!({ "keep": 1 }));
        store.set("", json!("x"));
        store.set("///", json!("x"));
        assert_eq!(store.snapshot(), json!({ "keep": 1 }));
    }
}
