use recon_core::{DiffEntry, DiffResult, Slot};
use serde_json::{json, Value};

/// The family record before the edit
///
/// Five characters, each with an age and an address.
#[allow(dead_code)]
pub fn family_before() -> Value {
    json!({
        "show": "The Simpsons",
        "characters": [
            {
                "firstName": "Homer",
                "lastName": "Simpson",
                "age": 40,
                "address": {"line1": "742 Evergreen Terrace", "city": "Springfield"}
            },
            {
                "firstName": "Marge",
                "lastName": "Simpson",
                "age": 38,
                "address": {"line1": "742 Evergreen Terrace", "city": "Springfield"}
            },
            {
                "firstName": "Bart",
                "lastName": "Simpson",
                "age": 10,
                "address": {"line1": "742 Evergreen Terrace", "city": "Springfield"}
            },
            {
                "firstName": "Lisa",
                "lastName": "Simpson",
                "age": 8,
                "address": {"line1": "742 Evergreen Terrace", "city": "Springfield"}
            },
            {
                "firstName": "Maggie",
                "lastName": "Simpson",
                "age": 1,
                "address": {"line1": "742 Evergreen Terrace", "city": "Springfield"}
            }
        ]
    })
}

/// The family record after the edit
///
/// Ages are gone, Homer's first name and four of the five address lines
/// changed and a `creators` list was added.
#[allow(dead_code)]
pub fn family_after() -> Value {
    json!({
        "show": "The Simpsons",
        "creators": ["Matt Groening"],
        "characters": [
            {
                "firstName": "Homer J.",
                "lastName": "Simpson",
                "address": {"line1": "742 Evergreen Tr", "city": "Springfield"}
            },
            {
                "firstName": "Marge",
                "lastName": "Simpson",
                "address": {"line1": "742 Evergreen Tr", "city": "Springfield"}
            },
            {
                "firstName": "Bart",
                "lastName": "Simpson",
                "address": {"line1": "742 Evergreen Tr", "city": "Springfield"}
            },
            {
                "firstName": "Lisa",
                "lastName": "Simpson",
                "address": {"line1": "742 Evergreen Tr", "city": "Springfield"}
            },
            {
                "firstName": "Maggie",
                "lastName": "Simpson",
                "address": {"line1": "742 Evergreen Terrace", "city": "Springfield"}
            }
        ]
    })
}

/// Find the entry displayed at `path`
#[allow(dead_code)]
pub fn find<'a>(result: &'a DiffResult, path: &str) -> Option<&'a DiffEntry> {
    result.diff().iter().find(|entry| entry.path == path)
}

/// Assert both sides of the entry at `path`; `None` means absent
#[allow(dead_code)]
pub fn assert_sides(result: &DiffResult, path: &str, lhs: Option<Value>, rhs: Option<Value>) {
    let entry = find(result, path).unwrap_or_else(|| panic!("no entry at {}", path));
    assert_eq!(entry.lhs.as_value(), lhs.as_ref(), "lhs at {}", path);
    assert_eq!(entry.rhs.as_value(), rhs.as_ref(), "rhs at {}", path);
}

/// Extract a string field of the looked-up subtree, or `undefined`
#[allow(dead_code)]
pub fn field(name: &'static str) -> impl Fn(&Slot) -> String + Send + Sync + 'static {
    move |slot: &Slot| {
        slot.as_value()
            .and_then(|v| v.get(name))
            .and_then(Value::as_str)
            .unwrap_or("undefined")
            .to_string()
    }
}
