//! End-to-end tests for the WBS tree builder.
//!
//! These drive the full pipeline — lexer, classifier, builder — and check
//! the resulting forest shapes, the structural invariants of the phrase
//! tree, and the diagnostics list.

use pretty_assertions::assert_eq;
use wbs::error::SyntaxErrorKind;
use wbs::token::Arity;
use wbs::tree::{NodeId, PhraseTree};
use wbs::{parse_and_build, SyntaxError};

/// Helper to build a source string into (tree, errors)
fn build(source: &str) -> (PhraseTree, Vec<SyntaxError>) {
    parse_and_build(source)
}

/// Renders a node as `KIND:value(child, child, ...)` for shape assertions.
fn shape(tree: &PhraseTree, id: NodeId) -> String {
    let mut out = tree.token(id).to_string();
    let children: Vec<String> = tree.children(id).map(|c| shape(tree, c)).collect();
    if !children.is_empty() {
        out.push('(');
        out.push_str(&children.join(", "));
        out.push(')');
    }
    out
}

/// Renders every top-level phrase of the forest.
fn forest(source: &str) -> (Vec<String>, Vec<SyntaxError>) {
    let (tree, errors) = build(source);
    let tops = tree.top_level().map(|id| shape(&tree, id)).collect();
    (tops, errors)
}

fn assert_clean(source: &str, expected: &[&str]) {
    let (tops, errors) = forest(source);
    assert_eq!(tops, expected, "forest shape for {source:?}");
    assert_eq!(errors, vec![], "diagnostics for {source:?}");
}

// ============================================
// 1. End-to-End Scenarios
// ============================================

#[test]
fn test_const_assignment() {
    assert_clean(
        "const x = 3",
        &["CONST:const(ASSIGNMENT:=(NAME:x, NUMERIC_LITERAL:3))"],
    );
}

#[test]
fn test_double_equals_fuses_to_equality() {
    assert_clean("a == b", &["BINARY_OPERATOR:==(NAME:a, NAME:b)"]);
}

#[test]
fn test_open_with_path() {
    assert_clean("open /path/to/file", &["KEYWORD:open(FILE_LITERAL:path/to/file)"]);
}

#[test]
fn test_colorset_takes_three_assignments() {
    assert_clean(
        "colorset r = 1 g = 2 b = 3",
        &["KEYWORD:colorset(\
            ASSIGNMENT:=(NAME:r, NUMERIC_LITERAL:1), \
            ASSIGNMENT:=(NAME:g, NUMERIC_LITERAL:2), \
            ASSIGNMENT:=(NAME:b, NUMERIC_LITERAL:3))"],
    );
}

#[test]
fn test_foreach_with_body() {
    assert_clean(
        "foreach x in items do export x",
        &["KEYWORD:foreach(NAME:x, FILLER:in, NAME:items, FILLER:do, KEYWORD:export(NAME:x))"],
    );
}

#[test]
fn test_bang_equals_fuses_to_not_equal() {
    assert_clean("!a = b", &["BINARY_OPERATOR:≠(NAME:a, NAME:b)"]);
}

#[test]
fn test_star_star_fuses_to_power() {
    assert_clean("a * * b", &["BINARY_OPERATOR:**(NAME:a, NAME:b)"]);
}

#[test]
fn test_create_call() {
    assert_clean(
        "create div()",
        &["KEYWORD:create(BINARY_OPERATOR:()(HTMLPART:div, ARGUMENT_LIST:()))"],
    );
}

#[test]
fn test_comment_line_is_discarded() {
    assert_clean("// comment\nx", &["NAME:x"]);
}

#[test]
fn test_unterminated_string_is_an_incomplete_phrase() {
    let (tops, errors) = forest("\"hi");
    assert_eq!(tops, ["STRING_LITERAL:hi"]);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].kind(), SyntaxErrorKind::IncompletePhrase);
    assert_eq!((errors[0].line(), errors[0].column()), (0, 3));
}

// ============================================
// 2. More Fusion and Restructuring
// ============================================

#[test]
fn test_remaining_doublings() {
    assert_clean("a * b", &["BINARY_OPERATOR:*(NAME:a, NAME:b)"]);
    assert_clean("a / / b", &["BINARY_OPERATOR://(NAME:a, NAME:b)"]);
    assert_clean("a ^ ^ b", &["BINARY_OPERATOR:xor(NAME:a, NAME:b)"]);
    assert_clean("a & & b", &["BINARY_OPERATOR:and(NAME:a, NAME:b)"]);
    assert_clean("a | | b", &["BINARY_OPERATOR:or(NAME:a, NAME:b)"]);
}

#[test]
fn test_word_operators() {
    assert_clean("a and b", &["BINARY_OPERATOR:and(NAME:a, NAME:b)"]);
    assert_clean("a xor b", &["BINARY_OPERATOR:xor(NAME:a, NAME:b)"]);
    assert_clean("export not x", &["KEYWORD:export(UNARY_OPERATOR:not(NAME:x))"]);
}

#[test]
fn test_comparison_fusions() {
    assert_clean("a < = b", &["BINARY_OPERATOR:≤(NAME:a, NAME:b)"]);
    assert_clean("a > = b", &["BINARY_OPERATOR:≥(NAME:a, NAME:b)"]);
    assert_clean("a ~ = b", &["BINARY_OPERATOR:≈(NAME:a, NAME:b)"]);
}

#[test]
fn test_direct_multibyte_operators() {
    assert_clean("a ≤ b", &["BINARY_OPERATOR:≤(NAME:a, NAME:b)"]);
    assert_clean("a ≠ b", &["BINARY_OPERATOR:≠(NAME:a, NAME:b)"]);
}

#[test]
fn test_left_associative_chain() {
    // No precedence: later operators gobble the previous leaf only.
    assert_clean(
        "x = a * b",
        &["BINARY_OPERATOR:=(NAME:x, BINARY_OPERATOR:*(NAME:a, NAME:b))"],
    );
}

#[test]
fn test_assignment_stays_real_inside_const_and_argument_lists() {
    let (tree, errors) = build("const x = 3");
    assert_eq!(errors, vec![]);
    let root = tree.root().unwrap();
    let assign = tree.child(root, 0).unwrap();
    assert_eq!(tree.token(assign).kind, wbs::TokenKind::Assignment);

    // Without a const parent the `=` becomes the equality binary operator.
    let (tree, errors) = build("x = 3");
    assert_eq!(errors, vec![]);
    let root = tree.root().unwrap();
    assert_eq!(tree.token(root).kind, wbs::TokenKind::BinaryOperator);
    assert_eq!(tree.token(root).value, "=");
}

// ============================================
// 3. Files and Links
// ============================================

#[test]
fn test_file_keyword_takes_a_dotted_path() {
    assert_clean("file style.css", &["KEYWORD:file(FILE_LITERAL:style.css)"]);
}

#[test]
fn test_path_segments_merge_with_single_slashes() {
    assert_clean("open /a/b.css", &["KEYWORD:open(FILE_LITERAL:a/b.css)"]);
    assert_clean("open /path/to/file", &["KEYWORD:open(FILE_LITERAL:path/to/file)"]);
}

#[test]
fn test_keywords_are_path_segments_inside_links() {
    // `file` here is a path segment, not a keyword.
    assert_clean("open /etc/file", &["KEYWORD:open(FILE_LITERAL:etc/file)"]);
}

// ============================================
// 4. Lists, Argument Lists, and Calls
// ============================================

#[test]
fn test_list_literal_in_a_value_slot() {
    assert_clean(
        "x = [1, 2]",
        &["BINARY_OPERATOR:=(NAME:x, LIST_LITERAL:[](\
            FILLER:,, NUMERIC_LITERAL:1, FILLER:,, NUMERIC_LITERAL:2))"],
    );
}

#[test]
fn test_empty_list_closes_to_no_children() {
    assert_clean("x = []", &["BINARY_OPERATOR:=(NAME:x, LIST_LITERAL:[])"]);
}

#[test]
fn test_trailing_comma_is_removed_on_closure() {
    assert_clean(
        "x = [1,]",
        &["BINARY_OPERATOR:=(NAME:x, LIST_LITERAL:[](FILLER:,, NUMERIC_LITERAL:1))"],
    );
}

#[test]
fn test_call_with_assignment_arguments() {
    assert_clean(
        "create div(id = 1)",
        &["KEYWORD:create(BINARY_OPERATOR:()(HTMLPART:div, ARGUMENT_LIST:()(\
            FILLER:,, ASSIGNMENT:=(NAME:id, NUMERIC_LITERAL:1))))"],
    );
}

#[test]
fn test_bracket_pairing_marks_both_shapes() {
    let (tree, errors) = build("x = [1]");
    assert_eq!(errors, vec![]);
    let root = tree.root().unwrap();
    let list = tree.child(root, 1).unwrap();
    assert_eq!(tree.token(list).value, "[]");

    let (tree, errors) = build("create div()");
    assert_eq!(errors, vec![]);
    let call = tree.child(tree.root().unwrap(), 0).unwrap();
    assert_eq!(tree.token(call).value, "()");
    assert_eq!(tree.token(tree.child(call, 1).unwrap()).value, "()");
}

// ============================================
// 5. Diagnostics
// ============================================

#[test]
fn test_unknown_token_is_reported_at_its_position() {
    let (_, errors) = forest("?");
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].kind(), SyntaxErrorKind::UnknownToken);
    assert_eq!((errors[0].line(), errors[0].column()), (0, 1));
}

#[test]
fn test_mismatched_closer_is_an_unknown_token() {
    let (tops, errors) = forest("x ]");
    assert_eq!(tops, ["NAME:x", "UNKNOWN:]"]);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].kind(), SyntaxErrorKind::UnknownToken);
}

#[test]
fn test_incomplete_keyword_phrase() {
    let (_, errors) = forest("foreach x in");
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].kind(), SyntaxErrorKind::IncompletePhrase);
}

#[test]
fn test_incomplete_phrases_cascade_undeduplicated() {
    // The inner export is incomplete, which makes the outer one incomplete
    // too; both are reported.
    let (_, errors) = forest("export export");
    assert_eq!(errors.len(), 2);
    assert!(errors
        .iter()
        .all(|e| e.kind() == SyntaxErrorKind::IncompletePhrase));
}

#[test]
fn test_errors_come_back_in_source_order() {
    let (_, errors) = forest("? \n ?");
    assert_eq!(errors.len(), 2);
    assert!((errors[0].line(), errors[0].column()) <= (errors[1].line(), errors[1].column()));
}

#[test]
fn test_unclosed_list_is_incomplete() {
    let (_, errors) = forest("x = [1, 2");
    assert!(errors
        .iter()
        .any(|e| e.kind() == SyntaxErrorKind::IncompletePhrase));
}

#[test]
fn test_building_continues_after_errors() {
    let (tops, errors) = forest("? const x = 3");
    assert_eq!(
        tops,
        [
            "UNKNOWN:?",
            "CONST:const(ASSIGNMENT:=(NAME:x, NUMERIC_LITERAL:3))"
        ]
    );
    assert_eq!(errors.len(), 1);
}

// ============================================
// 6. Structural Invariants
// ============================================

/// Walks the whole forest checking the parent/child/sibling invariants and
/// the arity bound.
fn assert_invariants(tree: &PhraseTree) {
    fn check(tree: &PhraseTree, id: NodeId) {
        let children: Vec<NodeId> = tree.children(id).collect();
        assert_eq!(children.len() as u32, tree.children_count(id));
        for (i, child) in children.iter().enumerate() {
            assert_eq!(tree.parent(*child), Some(id), "child parent link");
            assert_eq!(tree.child(id, i as i32), Some(*child), "positive index");
            let back = i as i32 - children.len() as i32;
            assert_eq!(tree.child(id, back), Some(*child), "negative index");
            check(tree, *child);
        }
        if let Arity::Fixed(n) = tree.token(id).phrase_length() {
            assert!(
                tree.children_count(id) <= n,
                "arity bound broken at {}",
                tree.token(id)
            );
        }
        if let Some(last) = children.last() {
            assert_eq!(tree.child(id, -1), Some(*last));
        }
    }
    for top in tree.top_level() {
        assert_eq!(tree.parent(top), None, "top-level nodes have no parent");
        check(tree, top);
    }
}

#[test]
fn test_invariants_hold_across_inputs() {
    for source in [
        "",
        "x",
        "const x = 3",
        "a == b",
        "open /path/to/file",
        "colorset r = 1 g = 2 b = 3",
        "foreach x in items do export x",
        "!a = b",
        "a ~ = b",
        "a * * b",
        "create div()",
        "create div(id = 1)",
        "x = [1, 2,]",
        "using this as x do export x",
        "? ] ) nonsense \"unterminated",
        "foreach x in",
        "x = [1, 2",
    ] {
        let (tree, _) = build(source);
        assert_invariants(&tree);
    }
}

// ============================================
// 7. Remaining Keywords and Literals
// ============================================

#[test]
fn test_using_phrase() {
    assert_clean(
        "using this as x do export x",
        &["KEYWORD:using(THIS_LITERAL:this, FILLER:as, NAME:x, FILLER:do, KEYWORD:export(NAME:x))"],
    );
}

#[test]
fn test_literals_in_value_slots() {
    assert_clean("export true", &["KEYWORD:export(BOOL_LITERAL:true)"]);
    assert_clean("export #ff0000", &["KEYWORD:export(COLOR_LITERAL:ff0000)"]);
    assert_clean(
        "export \"hello\"",
        &["KEYWORD:export(STRING_LITERAL:hello\")"],
    );
}

#[test]
fn test_output_keyword_is_dialect_gated() {
    use wbs::{Dialect, Lexer, TreeBuilder};

    // Default dialect: output is a keyword phrase.
    let (tops, errors) = forest("output x");
    assert_eq!(tops, ["KEYWORD:output(NAME:x)"]);
    assert_eq!(errors, vec![]);

    // Gate off: output is a plain name and x starts its own phrase.
    let dialect = Dialect {
        output_keyword: false,
    };
    let lexemes = Lexer::new("output x").tokenize();
    let (tree, errors) = TreeBuilder::with_dialect(dialect).build(&lexemes);
    let tops: Vec<String> = tree.top_level().map(|id| shape(&tree, id)).collect();
    assert_eq!(tops, ["NAME:output", "NAME:x"]);
    assert_eq!(errors, vec![]);
}

#[test]
fn test_empty_input_has_no_root_and_no_errors() {
    let (tree, errors) = build("");
    assert!(tree.root().is_none());
    assert_eq!(errors, vec![]);
}
