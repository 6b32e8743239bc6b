// crates/hldbx-cli/src/tests/i18n.rs
// ============================================================================
// Module: CLI i18n Tests
// Description: Unit tests for the message catalog and placeholder rendering.
// Purpose: Keep catalog keys unique and every used key present.
// Dependencies: hldbx-cli i18n module
// ============================================================================

//! ## Overview
//! Verifies catalog integrity, substitution, and the key fallback.

use std::collections::BTreeSet;

use crate::i18n::MessageArg;
use crate::i18n::catalog;
use crate::i18n::catalog_entries;
use crate::i18n::translate;

#[test]
fn catalog_keys_are_unique() {
    let entries = catalog_entries();
    let keys: BTreeSet<&str> = entries.iter().map(|(key, _)| *key).collect();
    assert_eq!(keys.len(), entries.len(), "duplicate catalog key");
    assert_eq!(catalog().len(), entries.len());
}

#[test]
fn placeholders_use_simple_names() {
    for (key, template) in catalog_entries() {
        let mut rest = *template;
        while let Some(start) = rest.find('{') {
            let end = rest[start..].find('}').unwrap_or_else(|| panic!("unclosed brace in {key}"));
            let name = &rest[start + 1..start + end];
            let simple = name.bytes().all(|byte| byte.is_ascii_lowercase() || byte == b'_');
            assert!(!name.is_empty() && simple, "bad placeholder {name:?} in {key}");
            rest = &rest[start + end + 1..];
        }
    }
}

#[test]
fn every_key_used_by_the_binary_exists() {
    let sources = [
        include_str!("../commands.rs"),
        include_str!("../credentials.rs"),
        include_str!("../error.rs"),
        include_str!("../main.rs"),
        include_str!("../prompt.rs"),
        include_str!("../resources.rs"),
        include_str!("../scanner.rs"),
        include_str!("../setup.rs"),
        include_str!("../token_cache.rs"),
        include_str!("../validate.rs"),
    ];
    let mut used = 0;
    for source in sources {
        for (index, _) in source.match_indices("t!(\"") {
            let rest = &source[index + 4..];
            let key = &rest[..rest.find('"').unwrap()];
            assert!(catalog().contains_key(key), "missing catalog key {key}");
            used += 1;
        }
    }
    assert!(used > 0);
}

#[test]
fn translate_substitutes_placeholders() {
    let output = translate(
        "schema.not_found",
        vec![MessageArg::new("schema", "models"), MessageArg::new("catalog", "main")],
    );
    assert_eq!(
        output,
        "Schema models in catalog main not found in Unity Catalog. Please try again."
    );
}

#[test]
fn macro_formats_display_values() {
    let output = crate::t!("provision.job_created", job_id = 4242_i64);
    assert_eq!(output, "Scheduled monitoring job with ID: 4242");
}

#[test]
fn unknown_keys_fall_back_to_the_key() {
    assert_eq!(translate("does.not.exist", Vec::new()), "does.not.exist");
}
