//! # Tests for Config Constants
//!
//! Unit tests verifying the relationships between configuration constants.

use crate::constants::*;

// =============================================================================
// PRINTING TESTS
// =============================================================================

#[test]
fn test_snippet_prologue_opens_php() {
    assert!(
        SNIPPET_PROLOGUE.starts_with(PHP_OPEN_TAG),
        "snippets must be wrapped in a PHP open tag"
    );
    assert!(SNIPPET_PROLOGUE.ends_with('\n'));
}

#[test]
fn test_json_indent_is_reasonable() {
    assert!(JSON_DEFAULT_INDENT >= 2 && JSON_DEFAULT_INDENT <= 8);
}

// =============================================================================
// LIMIT TESTS
// =============================================================================

#[test]
fn test_red_zone_smaller_than_stack() {
    assert!(
        STACKER_RED_ZONE_BYTES * 8 <= STACKER_STACK_SIZE_BYTES,
        "red zone should be a small fraction of the grown stack"
    );
}

#[test]
fn test_every_adapter_has_extensions() {
    for list in [
        PHP_EXTENSIONS,
        JAVASCRIPT_EXTENSIONS,
        TYPESCRIPT_EXTENSIONS,
        CSS_EXTENSIONS,
        JSON_EXTENSIONS,
    ] {
        assert!(!list.is_empty());
    }
}
