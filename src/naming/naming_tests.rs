use super::*;

fn snake() -> NamingRules<'static> {
    NamingRules {
        style: Style::Snake,
        embed_id: true,
        compression_threshold: 40,
        abbreviations: AbbreviationTable::builtin(),
    }
}

fn pascal() -> NamingRules<'static> {
    NamingRules {
        style: Style::Pascal,
        ..snake()
    }
}

#[test]
fn snake_identifier_embeds_namespace_and_id() {
    assert_eq!(
        generate_identifier(2, "Positive bignum", "cbor_tag", &snake()),
        "CBOR_TAG_2_POSITIVE_BIGNUM"
    );
}

#[test]
fn snake_identifier_without_id_for_simple_values() {
    let rules = NamingRules {
        embed_id: false,
        ..snake()
    };
    assert_eq!(
        generate_identifier(20, "false", "cbor_simple_value", &rules),
        "CBOR_SIMPLE_VALUE_FALSE"
    );
}

#[test]
fn empty_descriptive_part_keeps_namespace_and_id() {
    assert_eq!(
        generate_identifier(5, "(registered) [RFC1]", "cbor_tag", &snake()),
        "CBOR_TAG_5"
    );
}

#[test]
fn trailing_clause_after_semicolon_is_ignored() {
    assert_eq!(
        generate_identifier(
            0,
            "Standard date/time string; see Section 3.4.1",
            "cbor_tag",
            &snake()
        ),
        "CBOR_TAG_0_STD_DATE_TIME_STRING"
    );
}

#[test]
fn long_labels_are_compressed() {
    assert_eq!(
        generate_identifier(
            62,
            "DDoS Open Threat Signaling (DOTS) signal channel object, as defined in [RFC9132]",
            "cbor_tag",
            &snake()
        ),
        "CBOR_TAG_62_DDOS_OPEN_THREAT_SIGNALING_SIG_CHN_OBJ"
    );
}

#[test]
fn labels_just_under_threshold_are_not_compressed() {
    assert_eq!(
        generate_identifier(
            7,
            "a number representation attribute extension",
            "cbor_tag",
            &snake()
        ),
        "CBOR_TAG_7_A_NUMBER_REPRESENTATION_ATTRIBUTE_EXTENSION"
    );
}

#[test]
fn wrapped_labels_keep_their_content() {
    assert_eq!(
        generate_identifier(
            16,
            "[COSE algorithm identifier, Base Hash value]",
            "cbor_tag",
            &snake()
        ),
        "CBOR_TAG_16_COSE_ALGORITHM_ID_BASE_HASH_VALUE"
    );
}

#[test]
fn wrapped_label_with_defined_in_trailer_keeps_the_bracketed_head() {
    assert_eq!(
        generate_identifier(1, "[A] b, as defined in [C]", "cbor_tag", &snake()),
        "CBOR_TAG_1_A"
    );
}

#[test]
fn pascal_moves_known_tags_suffix_after_label() {
    assert_eq!(
        generate_identifier(2, "Positive bignum", "CborKnownTags", &pascal()),
        "CborPositiveBignumTag"
    );
    assert_eq!(
        generate_identifier(1, "Epoch-based date/time", "CborTags", &pascal()),
        "CborEpochBasedDateTimeTag"
    );
    assert_eq!(
        generate_identifier(21, "true", "CborSimpleValue", &pascal()),
        "CborSimpleValueTrue"
    );
}

#[test]
fn pascal_capitalizes_each_token() {
    assert_eq!(
        generate_identifier(99, "URI in C++ STRING", "CborKnownTags", &pascal()),
        "CborUriInCplusplusStringTag"
    );
}

#[test]
fn pascal_recases_snake_namespaces() {
    assert_eq!(
        generate_identifier(20, "false", "cbor_simple_value", &pascal()),
        "CborSimpleValueFalse"
    );
    assert_eq!(
        generate_identifier(2, "Positive bignum", "cbor_tag", &pascal()),
        "CborTagPositiveBignum"
    );
}

#[test]
fn output_is_restricted_to_identifier_characters() {
    let labels = [
        "Café ¿qué? (déjà vu)",
        "a/b\\c|d e.f",
        "__lead__ and trail--",
        "{braces} <angle> \"quoted\"",
    ];
    for label in labels {
        for rules in [snake(), pascal()] {
            let name = generate_identifier(42, label, "cbor_tag", &rules);
            assert!(
                name.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_'),
                "unexpected character in {name:?}"
            );
            assert!(!name.contains("__"), "doubled underscore in {name:?}");
        }
    }
}

#[test]
fn generation_is_deterministic() {
    let label = "Extended time, with nanoseconds and time zone offset";
    let first = generate_identifier(1001, label, "cbor_tag", &snake());
    let second = generate_identifier(1001, label, "cbor_tag", &snake());
    assert_eq!(first, second);
}
