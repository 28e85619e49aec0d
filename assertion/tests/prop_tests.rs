use proptest::prelude::*;

use trackid_assertion::{parse, Assertion, AssertionComponent, Conjunction};

fn component() -> impl Strategy<Value = AssertionComponent> {
    let service = prop_oneof![
        Just("keybase".to_string()),
        Just("uid".to_string()),
        Just("twitter".to_string()),
        Just("github".to_string()),
        Just("hackernews".to_string()),
        Just("dns".to_string()),
        Just("web".to_string()),
        "[a-z][a-z0-9_-]{0,8}",
    ];
    (service, "[a-zA-Z0-9_.][a-zA-Z0-9_.:/-]{0,15}").prop_filter_map(
        "term must parse",
        |(service, value)| AssertionComponent::parse(&format!("{service}:{value}")).ok(),
    )
}

fn assertion() -> impl Strategy<Value = Assertion> {
    prop::collection::vec(
        prop::collection::vec(component(), 1..4).prop_map(|terms| Conjunction { terms }),
        1..4,
    )
    .prop_map(|any_of| Assertion { any_of })
}

proptest! {
    /// parse never panics, whatever the input.
    #[test]
    fn parse_is_total(input in ".{0,64}") {
        let _ = parse(&input);
    }

    /// Anything that parses renders to text that reparses to the same tree.
    #[test]
    fn reparse_of_parsed_input_is_stable(input in "[a-zA-Z0-9:+,/. _-]{0,40}") {
        if let Ok(a) = parse(&input) {
            let rendered = a.render();
            prop_assert_eq!(parse(&rendered).unwrap(), a);
        }
    }

    /// render(tree) reparses to the same tree for generated trees.
    #[test]
    fn render_reparse_identity(a in assertion()) {
        prop_assert_eq!(parse(&a.render()).unwrap(), a);
    }

    /// Conjoining keeps every disjunct pairing.
    #[test]
    fn and_cardinality(a in assertion(), b in assertion()) {
        let c = a.and(&b);
        prop_assert_eq!(c.any_of.len(), a.any_of.len() * b.any_of.len());
        prop_assert_eq!(parse(&c.render()).unwrap(), c);
    }
}
