#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{assert_sides, family_after, family_before, find};
use recon_core::{reconcile, ReconcileError, Rules};
use serde_json::{json, Value};

fn assert_common_differences(result: &recon_core::DiffResult) {
    assert_sides(
        result,
        "characters.0.firstName",
        Some(json!("Homer")),
        Some(json!("Homer J.")),
    );
    for (index, age) in [40, 38, 10, 8, 1].into_iter().enumerate() {
        assert_sides(
            result,
            &format!("characters.{}.age", index),
            Some(json!(age)),
            None,
        );
    }
}

fn assert_address_differences(result: &recon_core::DiffResult) {
    for index in 0..4 {
        assert_sides(
            result,
            &format!("characters.{}.address.line1", index),
            Some(json!("742 Evergreen Terrace")),
            Some(json!("742 Evergreen Tr")),
        );
    }
}

#[test]
fn test_all_differences_without_rules() {
    // GIVEN the family fixture and no rules
    let rules = Rules::default();

    // WHEN reconciling
    let result = reconcile(&rules, &family_before(), &family_after()).unwrap();

    // THEN eleven differences are reported
    assert_eq!(result.len(), 11);
    assert_common_differences(&result);
    assert_address_differences(&result);
    assert_sides(&result, "creators", None, Some(json!(["Matt Groening"])));
}

#[test]
fn test_entries_are_sorted_by_path() {
    let result = reconcile(&Rules::default(), &family_before(), &family_after()).unwrap();
    let paths: Vec<&str> = result.diff().iter().map(|e| e.path.as_str()).collect();
    let mut sorted = paths.clone();
    sorted.sort();
    assert_eq!(paths, sorted);
    assert_eq!(paths.first(), Some(&"characters.0.address.line1"));
    assert_eq!(paths.last(), Some(&"creators"));
}

#[test]
fn test_add_excludes_path_from_after_side() {
    // GIVEN creators marked as added
    let rules = Rules::new().add("creators");

    // WHEN reconciling
    let result = reconcile(&rules, &family_before(), &family_after()).unwrap();

    // THEN the creators difference is gone and nothing else changed
    assert_eq!(result.len(), 10);
    assert!(find(&result, "creators").is_none());
    assert_common_differences(&result);
    assert_address_differences(&result);
}

#[test]
fn test_add_does_not_touch_before_side() {
    // GIVEN ages marked as added, although they only exist before
    let rules = Rules::new().add("characters.[].age");

    // WHEN reconciling
    let result = reconcile(&rules, &family_before(), &family_after()).unwrap();

    // THEN the age removals are still reported
    assert_eq!(result.len(), 11);
    assert_common_differences(&result);
    assert_address_differences(&result);
}

#[test]
fn test_remove_excludes_path_from_before_side() {
    let rules = Rules::new().remove("characters.[].age");
    let result = reconcile(&rules, &family_before(), &family_after()).unwrap();

    assert_eq!(result.len(), 6);
    assert!(result.diff().iter().all(|e| !e.path.ends_with(".age")));
}

#[test]
fn test_ignore_excludes_path_from_both_sides() {
    // GIVEN the address line ignored
    let rules = Rules::new().ignore("characters.[].address.line1");

    // WHEN reconciling
    let result = reconcile(&rules, &family_before(), &family_after()).unwrap();

    // THEN only names, ages and creators remain
    assert_eq!(result.len(), 7);
    assert_common_differences(&result);
    assert_sides(&result, "creators", None, Some(json!(["Matt Groening"])));
    assert!(result
        .diff()
        .iter()
        .all(|e| !e.path.ends_with("address.line1")));
}

#[test]
fn test_map_transforms_before_value() {
    // GIVEN a mapper abbreviating the street suffix
    let rules = Rules::new().map("characters.[].address.line1", |value| {
        let text = value.as_str().ok_or("address line is not a string")?;
        let head: String = text.chars().take(13).collect();
        Ok(Value::String(format!("{} Tr", head)))
    });

    // WHEN reconciling
    let result = reconcile(&rules, &family_before(), &family_after()).unwrap();

    // THEN the four abbreviated addresses match; Maggie's unchanged one now differs
    assert_eq!(result.len(), 8);
    assert_common_differences(&result);
    assert_sides(&result, "creators", None, Some(json!(["Matt Groening"])));
    assert_sides(
        &result,
        "characters.4.address.line1",
        Some(json!("742 Evergreen Tr")),
        Some(json!("742 Evergreen Terrace")),
    );
}

#[test]
fn test_map_failure_aborts_reconcile() {
    let rules = Rules::new().map("characters.[].age", |value| {
        if value.as_u64() == Some(1) {
            Err("babies have no age".into())
        } else {
            Ok(value.clone())
        }
    });

    let err = reconcile(&rules, &family_before(), &family_after()).unwrap_err();

    assert_eq!(
        err,
        ReconcileError::MapFailed {
            path: "characters.[].age".to_string(),
            message: "babies have no age".to_string(),
        }
    );
}

#[test]
fn test_rename_moves_before_value() {
    // GIVEN firstName renamed to givenName in the after document
    let after = {
        let mut after = family_before();
        for character in after["characters"].as_array_mut().unwrap() {
            let name = character
                .as_object_mut()
                .unwrap()
                .remove("firstName")
                .unwrap();
            character["givenName"] = name;
        }
        after
    };

    // WHEN the before document is renamed the same way
    let rules = Rules::new().rename("characters.[].firstName", "characters.[].givenName");
    let result = reconcile(&rules, &family_before(), &after).unwrap();

    // THEN the documents agree
    assert!(result.is_empty(), "{}", result.print_diff());
}

#[test]
fn test_identical_documents_have_no_differences() {
    let result = reconcile(&Rules::default(), &family_before(), &family_before()).unwrap();
    assert!(result.is_empty());
    assert_eq!(result.print_diff(), "");
}

#[test]
fn test_invalid_rule_path_is_rejected() {
    let rules = Rules::new().ignore("characters..age");
    let err = reconcile(&rules, &family_before(), &family_after()).unwrap_err();
    assert!(matches!(err, ReconcileError::InvalidPath { .. }));
}

#[test]
fn test_print_diff_of_full_result() {
    let result = reconcile(
        &Rules::new().ignore("characters.[].address"),
        &family_before(),
        &family_after(),
    )
    .unwrap();

    assert_eq!(
        result.print_diff(),
        [
            "characters.0.age -> 40 undefined",
            "characters.0.firstName -> \"Homer\" \"Homer J.\"",
            "characters.1.age -> 38 undefined",
            "characters.2.age -> 10 undefined",
            "characters.3.age -> 8 undefined",
            "characters.4.age -> 1 undefined",
            "creators -> undefined [\"Matt Groening\"]",
        ]
        .join("\n")
    );
}

#[test]
fn test_ignore_sequence_index_keeps_other_indices_aligned() {
    // GIVEN sequences that differ only at their last element
    let before = json!({"xs": ["a", "b", "c"]});
    let after = json!({"xs": ["a", "b", "x"]});

    // WHEN ignoring the first element
    let result = reconcile(&Rules::new().ignore("xs.0"), &before, &after).unwrap();

    // THEN only the last element is reported, at its own index
    assert_eq!(result.print_diff(), "xs.2 -> \"c\" \"x\"");
}

#[test]
fn test_remove_sequence_index_reports_only_that_index() {
    let tree = json!({"xs": [{"id": 1}, {"id": 2}, {"id": 3}]});

    let result = reconcile(&Rules::new().remove("xs.0"), &tree, &tree).unwrap();

    assert_eq!(result.len(), 1);
    assert_sides(&result, "xs.0", None, Some(json!({"id": 1})));
}

#[test]
fn test_ignore_every_element_of_a_character_list() {
    let result = reconcile(
        &Rules::new().ignore("characters.[]").add("creators"),
        &family_before(),
        &family_after(),
    )
    .unwrap();

    assert!(result.is_empty(), "{}", result.print_diff());
}

#[test]
fn test_rename_past_sequence_end_is_rejected() {
    for target in ["b.18446744073709551615", "b.1000000000000"] {
        let err = reconcile(&Rules::new().rename("a", target), &json!({"a": 1}), &json!({}))
            .unwrap_err();
        assert!(
            matches!(&err, ReconcileError::InvalidPath { path, .. } if path == target),
            "{:?}",
            err
        );
    }
}

#[test]
fn test_rename_into_new_sequence_appends() {
    let result = reconcile(
        &Rules::new().rename("a", "b.0"),
        &json!({"a": 1}),
        &json!({"b": [1]}),
    )
    .unwrap();

    assert!(result.is_empty());
}

#[test]
fn test_integral_float_equals_integer() {
    let before: Value = serde_json::from_str(r#"{"age": 40, "scores": [1, 2.5]}"#).unwrap();
    let after: Value = serde_json::from_str(r#"{"age": 40.0, "scores": [1.0, 2.5]}"#).unwrap();

    let result = reconcile(&Rules::default(), &before, &after).unwrap();

    assert!(result.is_empty(), "{}", result.print_diff());
}
