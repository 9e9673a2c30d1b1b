use consread::*;
use proptest::prelude::*;

// ============================================================================
// Strategies for Generating Syntax
// ============================================================================

/// Symbol names that cannot be mistaken for numbers or singletons
fn symbol_name() -> impl Strategy<Value = String> {
    "[a-z*+!?<>=/_][a-z0-9*+!?<>=/_-]{0,8}"
        .prop_filter("Must not be a reserved name", |s| {
            !matches!(s.as_str(), "true" | "false" | "nil")
        })
}

fn atom() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<i64>().prop_map(Value::int),
        symbol_name().prop_map(|s| Value::symbol(&s)),
        symbol_name().prop_map(|s| Value::keyword(&s)),
        Just(TRUE),
        Just(FALSE),
        Just(NIL),
    ]
}

fn form() -> impl Strategy<Value = Value> {
    atom().prop_recursive(4, 64, 8, |inner| {
        prop::collection::vec(inner, 0..8).prop_map(Value::list)
    })
}

/// Whitespace runs, including the comma
fn separator() -> impl Strategy<Value = String> {
    "[ \t\r\n,]{1,4}"
}

// ============================================================================
// Reader Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn integers_read_back(n in any::<i64>()) {
        prop_assert_eq!(read_str(&n.to_string(), true).unwrap(), Value::int(n));
    }

    #[test]
    fn printed_forms_read_back(value in form()) {
        let printed = value.to_string();
        prop_assert_eq!(read_str(&printed, true).unwrap(), value);
    }

    #[test]
    fn separators_do_not_change_list_contents(
        items in prop::collection::vec(atom(), 1..10),
        sep in separator(),
    ) {
        let text = format!(
            "({})",
            items.iter().map(|v| v.to_string()).collect::<Vec<_>>().join(&sep)
        );
        prop_assert_eq!(read_str(&text, true).unwrap(), Value::list(items));
    }

    #[test]
    fn stream_and_buffer_sources_agree(value in form()) {
        let printed = value.to_string();
        let mut stream = StreamSource::from_chars(printed.chars());
        prop_assert_eq!(
            read_stream(&mut stream, true).unwrap(),
            read_str(&printed, true).unwrap()
        );
        prop_assert_eq!(read_stream(&mut stream, false).unwrap(), EOF);
    }

    #[test]
    fn whitespace_only_input_is_eof(ws in "[ \t\r\n,]{0,16}") {
        prop_assert_eq!(read_str(&ws, false).unwrap(), EOF);
        prop_assert!(read_str(&ws, true).unwrap_err().is_incomplete());
    }

    #[test]
    fn truncated_lists_are_incomplete(items in prop::collection::vec(atom(), 0..6)) {
        let text = format!(
            "({}",
            items.iter().map(|v| v.to_string()).collect::<Vec<_>>().join(" ")
        );
        prop_assert!(read_str(&text, false).unwrap_err().is_incomplete());
    }
}
