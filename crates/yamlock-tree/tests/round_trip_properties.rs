//! Property tests: generated block documents survive parse + serialize
//! unchanged.

use proptest::prelude::*;
use yamlock_tree::{find_node, parse, serialize, split_path};

#[derive(Debug, Clone)]
enum Entry {
    Scalar {
        head: Option<String>,
        key: String,
        value: String,
        comment: Option<String>,
    },
    Mapping {
        key: String,
        children: Vec<Entry>,
    },
    List {
        key: String,
        items: Vec<String>,
    },
}

fn key() -> impl Strategy<Value = String> {
    "[a-z][a-z_]{0,7}"
}

fn value() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-z][a-z0-9]{0,7}",
        "[0-9]{1,4}",
        "[a-z]{1,4} [a-z]{1,4}",
        "'[a-z ]{0,6}'",
        "\"[a-z ]{0,6}\"",
    ]
}

fn comment() -> impl Strategy<Value = String> {
    "# [a-z ]{0,8}"
}

fn entry() -> impl Strategy<Value = Entry> {
    let leaf = (
        prop::option::of(comment()),
        key(),
        value(),
        prop::option::of(comment()),
    )
        .prop_map(|(head, key, value, comment)| Entry::Scalar {
            head,
            key,
            value,
            comment,
        });
    leaf.prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            (key(), prop::collection::vec(inner, 1..4))
                .prop_map(|(key, children)| Entry::Mapping { key, children }),
            (key(), prop::collection::vec(value(), 1..4))
                .prop_map(|(key, items)| Entry::List { key, items }),
        ]
    })
}

fn render(entries: &[Entry], indent: usize, step: usize, out: &mut String) {
    let pad = " ".repeat(indent);
    for entry in entries {
        match entry {
            Entry::Scalar {
                head,
                key,
                value,
                comment,
            } => {
                if let Some(head) = head {
                    out.push_str(&format!("{pad}{head}\n"));
                }
                out.push_str(&format!("{pad}{key}: {value}"));
                if let Some(comment) = comment {
                    out.push_str(&format!("  {comment}"));
                }
                out.push('\n');
            }
            Entry::Mapping { key, children } => {
                out.push_str(&format!("{pad}{key}:\n"));
                render(children, indent + step, step, out);
            }
            Entry::List { key, items } => {
                out.push_str(&format!("{pad}{key}:\n"));
                for item in items {
                    out.push_str(&format!("{pad}{}- {item}\n", " ".repeat(step)));
                }
            }
        }
    }
}

fn document() -> impl Strategy<Value = String> {
    (prop::collection::vec(entry(), 1..5), 1usize..5).prop_map(|(entries, step)| {
        let mut out = String::new();
        render(&entries, 0, step, &mut out);
        out
    })
}

proptest! {
    #[test]
    fn round_trip_is_exact(text in document()) {
        let doc = parse(&text).unwrap();
        prop_assert_eq!(serialize(&doc), text);
    }

    #[test]
    fn reparse_of_output_is_stable(text in document()) {
        let once = serialize(&parse(&text).unwrap());
        let twice = serialize(&parse(&once).unwrap());
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn first_key_path_resolves(text in document()) {
        let doc = parse(&text).unwrap();
        let root = doc.document_root().unwrap();
        let first = root.as_mapping().unwrap()[0].key_text().unwrap().to_string();
        prop_assert!(find_node(&doc, &first).is_ok());
        let dotted = format!(".{first}");
        prop_assert_eq!(split_path(&dotted), vec![first.as_str()]);
    }
}
