use objcompare_core::{
    inspect_struct, Comparer, DifferenceType, DynamicValueComparer, ObjCompareError,
};
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
struct Node {
    value: i32,
    next: Option<Box<Node>>,
}
inspect_struct!(Node { value as "Value", next as "Next" });

fn chain(values: &[i32]) -> Option<Box<Node>> {
    values.iter().rev().fold(None, |next, &value| {
        Some(Box::new(Node { value, next }))
    })
}

#[test]
fn self_referential_type_reports_nested_path() {
    let a = Node {
        value: 1,
        next: chain(&[2]),
    };
    let b = Node {
        value: 1,
        next: chain(&[3]),
    };

    let differences = Comparer::<Node>::new().calculate_differences(&a, &b).unwrap();
    assert_eq!(differences.len(), 1);
    assert_eq!(differences[0].member_path(), "Next.Value");
    assert_eq!(differences[0].value1(), "2");
    assert_eq!(differences[0].value2(), "3");
}

#[test]
fn self_referential_chain_of_different_length() {
    let a = Node {
        value: 1,
        next: chain(&[2, 3]),
    };
    let b = Node {
        value: 1,
        next: chain(&[2]),
    };

    let differences = Comparer::<Node>::new().calculate_differences(&a, &b).unwrap();
    assert_eq!(differences.len(), 1);
    assert_eq!(differences[0].member_path(), "Next.Next");
    assert_eq!(differences[0].value1(), "Node");
    assert_eq!(differences[0].value2(), "");
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct Key {
    id: i32,
}
inspect_struct!(Key { id as "Id" });

#[derive(Debug, Clone, Default)]
struct Registry {
    entries: BTreeMap<Key, i32>,
    labels: BTreeMap<Option<String>, i32>,
}
inspect_struct!(Registry { entries as "Entries", labels as "Labels" });

#[test]
fn map_with_struct_keys_reports_changed_value() {
    let a = Registry {
        entries: [(Key { id: 1 }, 5), (Key { id: 2 }, 1)].into_iter().collect(),
        ..Registry::default()
    };
    let b = Registry {
        entries: [(Key { id: 1 }, 9), (Key { id: 2 }, 1)].into_iter().collect(),
        ..Registry::default()
    };

    let differences = Comparer::<Registry>::new().calculate_differences(&a, &b).unwrap();
    assert_eq!(differences.len(), 1);
    assert_eq!(differences[0].member_path(), "Entries[Key]");
    assert_eq!(differences[0].difference_type(), DifferenceType::ValueMismatch);
    assert_eq!(differences[0].value1(), "5");
    assert_eq!(differences[0].value2(), "9");
}

#[test]
fn map_with_absent_and_empty_keys_reports_changed_value() {
    let a = Registry {
        labels: [(None, 5), (Some(String::new()), 1)].into_iter().collect(),
        ..Registry::default()
    };
    let b = Registry {
        labels: [(None, 9), (Some(String::new()), 1)].into_iter().collect(),
        ..Registry::default()
    };

    let comparer = Comparer::<Registry>::new();
    assert!(!comparer.compare(&a, &b).unwrap());
    assert!(comparer.compare(&a, &a.clone()).unwrap());
}

#[derive(Debug, Clone)]
struct Counter {
    count: i32,
}
inspect_struct!(Counter { count as "Count" });

#[derive(Debug, Clone)]
struct Holder {
    counter: Counter,
}
inspect_struct!(Holder { counter as "Counter" });

#[test]
fn nested_comparer_error_propagates() {
    let comparer = Comparer::<Holder>::builder()
        .add_member_override::<Counter>(
            "Count",
            DynamicValueComparer::<String>::new(|a, b, _| a == b),
        )
        .build::<Holder>();

    let a = Holder {
        counter: Counter { count: 1 },
    };
    let b = Holder {
        counter: Counter { count: 2 },
    };

    let err = comparer.calculate_differences(&a, &b).unwrap_err();
    match err {
        ObjCompareError::IncompatibleTypes { expected, found } => {
            assert_eq!(expected, "String");
            assert_eq!(found, "i32");
        }
        other => panic!("unexpected error: {other}"),
    }
}
