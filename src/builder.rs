//! The incremental phrase-tree builder.
//!
//! The builder consumes positioned lexemes strictly left to right and
//! maintains an evolving [`PhraseTree`]. There is no grammar table: each
//! incoming token is classified against the current insertion anchor and
//! then either fused into an existing node (operator doubling, `<` + `=`
//! into `≤`, file-path accumulation), restructured into place (an infix
//! operator gobbles up the previous leaf as its left operand), matched
//! against an open bracket somewhere up the ancestor chain, or attached as
//! a child of the nearest ancestor that still wants one. Tokens nothing
//! accepts start a new top-level phrase.
//!
//! Operator handling is purely left-associative; precedence does not
//! reorder the tree. A later precedence pass would slot in where the
//! gobble-up happens.
//!
//! The builder never fails. Malformed input leaves `UNKNOWN` leaves and
//! incomplete phrases in the tree, and a final walk turns those into the
//! returned [`SyntaxError`] list.

use crate::error::{SyntaxError, SyntaxErrorKind};
use crate::lexer::Lexeme;
use crate::token::{ClassifyContext, Dialect, Token, TokenKind};
use crate::tree::{NodeId, PhraseTree};

/// Builds a phrase tree from a lexeme stream.
///
/// A builder is single-use: feed it one stream via [`build`](Self::build).
/// Parses never share state, so concurrent parses just use independent
/// builders.
///
/// # Example
///
/// ```rust
/// use wbs::builder::TreeBuilder;
/// use wbs::lexer::Lexer;
///
/// let lexemes = Lexer::new("a == b").tokenize();
/// let (tree, errors) = TreeBuilder::new().build(&lexemes);
///
/// assert!(errors.is_empty());
/// let root = tree.root().unwrap();
/// assert_eq!(tree.token(root).to_string(), "BINARY_OPERATOR:==");
/// ```
#[derive(Debug, Default)]
pub struct TreeBuilder {
    tree: PhraseTree,
    dialect: Dialect,
    /// The most recently created leaf: the current insertion anchor.
    last: Option<NodeId>,
    /// The previous value of `last`, for fusions that undo the most recent
    /// leaf creation.
    last_last: Option<NodeId>,
    /// The most recent top-level sibling; new top-level phrases attach
    /// after it.
    last_top_level: Option<NodeId>,
}

impl TreeBuilder {
    /// Creates a builder with the default [`Dialect`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a builder with an explicit dialect.
    pub fn with_dialect(dialect: Dialect) -> Self {
        Self {
            dialect,
            ..Self::default()
        }
    }

    /// Consumes the lexeme stream and returns the finished tree together
    /// with all diagnostics, in source order.
    pub fn build(mut self, lexemes: &[Lexeme]) -> (PhraseTree, Vec<SyntaxError>) {
        for lexeme in lexemes {
            let ctx = self.classify_context();
            let token = Token::classify(lexeme, ctx, &self.dialect);
            self.dispatch(token);
        }
        let errors = self.collect_errors();
        (self.tree, errors)
    }

    /// Derives the `(first, in_link, in_html)` tuple from the insertion
    /// anchor, before the incoming lexeme is classified.
    fn classify_context(&self) -> ClassifyContext {
        let Some(last) = self.last else {
            return ClassifyContext {
                first: true,
                ..ClassifyContext::default()
            };
        };
        let token = self.tree.token(last);
        let parent = self.tree.parent(last);

        let mut in_link = token.kind == TokenKind::Keyword
            && matches!(token.value.as_str(), "open" | "file");
        if !in_link {
            if let Some(parent) = parent {
                let pt = self.tree.token(parent);
                in_link = pt.kind == TokenKind::FileLiteral
                    || (pt.kind == TokenKind::Keyword
                        && matches!(pt.value.as_str(), "open" | "file"));
            }
        }

        let in_html = token.kind == TokenKind::Keyword && token.value == "create";

        // `first` marks the start of a fresh expression slot: an unfilled
        // phrase is opening its first slot; a finished leaf starts a new
        // slot only while its parent still has room.
        let children = self.tree.children_count(last);
        let first = if token.phrase_length().wants_more(children) {
            children == 0
        } else if let Some(parent) = parent {
            let pt = self.tree.token(parent);
            pt.phrase_length().wants_more(self.tree.children_count(parent))
        } else {
            false
        };

        ClassifyContext {
            first,
            in_link,
            in_html,
        }
    }

    /// Routes one classified token through the dispatch order.
    fn dispatch(&mut self, mut token: Token) {
        // The first token just becomes the root.
        let Some(last) = self.last else {
            let id = self.tree.new_node(token);
            self.tree.install_root(id);
            self.last = Some(id);
            self.last_top_level = Some(id);
            return;
        };

        match token.kind {
            TokenKind::Assignment => {
                self.dispatch_assignment(last, token);
                return;
            }
            TokenKind::BinaryOperator => {
                self.dispatch_binary(last, token);
                return;
            }
            TokenKind::UnaryOperator => {
                if token.value == "/" {
                    // A unary slash opens a blank file literal, letting a
                    // path start anywhere a value can.
                    token.kind = TokenKind::FileLiteral;
                    token.value.clear();
                } else if token.value == "(" {
                    token = self.maybe_begin_call(last, token);
                }
            }
            TokenKind::FileLiteral => {
                if self.merge_file_literal(last, &token) {
                    return;
                }
            }
            TokenKind::Filler if matches!(token.value.as_str(), ")" | "]") => {
                match self.close_bracket(last, &token) {
                    Ok(()) => return,
                    // No opener anywhere above: the stray closer falls
                    // through to general attachment as an unknown token and
                    // gets reported from there.
                    Err(()) => token.kind = TokenKind::Unknown,
                }
            }
            _ => {}
        }

        self.attach(last, token);
    }

    /// Assignment fusion: `=` merges with a preceding `=`, `<`, `>`, `!`,
    /// or `~` where possible, stays a real assignment inside `const`,
    /// `colorset`, and argument lists, and otherwise becomes the `=`
    /// equality operator and gobbles up the previous leaf.
    fn dispatch_assignment(&mut self, last: NodeId, mut token: Token) {
        let parent = self.tree.parent(last);

        let keeps_assignment = parent.is_some_and(|p| {
            let pt = self.tree.token(p);
            pt.kind == TokenKind::Const
                || pt.kind == TokenKind::ArgumentList
                || (pt.kind == TokenKind::Keyword && pt.value == "colorset")
        });
        if !keeps_assignment {
            // Both `=` and `==` then exist as equality operators; collapsing
            // them here would make an explicit `==` impossible to type.
            token.kind = TokenKind::BinaryOperator;
        }

        if let Some(parent) = parent {
            if self.tree.children_count(parent) == 1 {
                let parent_kind = self.tree.token(parent).kind;
                let parent_value = self.tree.token(parent).value.clone();
                // A second `=` upgrades the parent to equality.
                if (parent_kind == TokenKind::BinaryOperator
                    || parent_kind == TokenKind::Assignment)
                    && parent_value == "="
                {
                    let pt = self.tree.token_mut(parent);
                    pt.kind = TokenKind::BinaryOperator;
                    pt.value = "==".to_string();
                    return;
                }
                if parent_kind == TokenKind::BinaryOperator
                    && matches!(parent_value.as_str(), "<" | ">")
                {
                    let upgraded = if parent_value == "<" { "≤" } else { "≥" };
                    self.tree.token_mut(parent).value = upgraded.to_string();
                    return;
                }
                // `!a =` and `~a =`: the unary already holds its operand in
                // the left slot, so retyping it in place is the whole fusion.
                if parent_kind == TokenKind::UnaryOperator
                    && matches!(parent_value.as_str(), "not" | "~")
                {
                    let upgraded = if parent_value == "not" { "≠" } else { "≈" };
                    let pt = self.tree.token_mut(parent);
                    pt.kind = TokenKind::BinaryOperator;
                    pt.value = upgraded.to_string();
                    return;
                }
            }
        }

        // `a ! =` and `a ~ =`: the unary started its own phrase beside what
        // should be its left operand, so retype it and swap it over the
        // prior leaf.
        let last_kind = self.tree.token(last).kind;
        let last_value = self.tree.token(last).value.clone();
        if last_kind == TokenKind::UnaryOperator
            && matches!(last_value.as_str(), "not" | "~")
            && self.tree.children_count(last) == 0
        {
            let upgraded = if last_value == "not" { "≠" } else { "≈" };
            {
                let lt = self.tree.token_mut(last);
                lt.kind = TokenKind::BinaryOperator;
                lt.value = upgraded.to_string();
            }
            if let Some(prior) = self.last_last {
                self.tree.detach(last);
                self.tree.swap_in_slot(prior, last);
                self.last = Some(prior);
                self.last_last = self.tree.parent(prior);
            }
            return;
        }

        self.gobble(last, token);
    }

    /// Binary operator handling: doubling fusion (`**`, `//`, `xor`, `and`,
    /// `or`), slash accumulation onto file literals, then the plain
    /// gobble-up.
    fn dispatch_binary(&mut self, last: NodeId, token: Token) {
        if let Some(parent) = self.tree.parent(last) {
            let pt = self.tree.token(parent);
            if self.tree.children_count(parent) == 1
                && pt.kind == TokenKind::BinaryOperator
                && pt.value == token.value
            {
                let doubled = match token.value.as_str() {
                    "*" => Some("**"),
                    "/" => Some("//"),
                    "^" => Some("xor"),
                    "&" => Some("and"),
                    "|" => Some("or"),
                    _ => None,
                };
                if let Some(doubled) = doubled {
                    self.tree.token_mut(parent).value = doubled.to_string();
                    return;
                }
            }
        }

        if token.value == "/" && self.tree.token(last).kind == TokenKind::FileLiteral {
            self.tree.token_mut(last).value.push('/');
            return;
        }

        self.gobble(last, token);

        // TODO: precedence-aware reordering would replace this flat gobble;
        // the tree is left-associative until then.
    }

    /// A `(` after an htmlpart or a finished value expression begins a
    /// call: a binary `(` node takes the callee's slot with the callee as
    /// left operand, and the incoming token becomes the argument list.
    fn maybe_begin_call(&mut self, last: NodeId, mut token: Token) -> Token {
        let lt = self.tree.token(last);
        let callable = lt.kind == TokenKind::HtmlPart
            || (lt.is_value_expression() && self.tree.is_complete(last));
        if callable {
            let call = self.tree.new_node(Token::new(
                TokenKind::BinaryOperator,
                "(",
                token.line,
                token.column,
            ));
            self.tree.swap_in_slot(last, call);
            self.last_last = Some(call);
            token.kind = TokenKind::ArgumentList;
        }
        token
    }

    /// Adjacent file literals merge into one path, with a single `/`
    /// inserted unless one side already provides it.
    fn merge_file_literal(&mut self, last: NodeId, token: &Token) -> bool {
        if self.tree.token(last).kind != TokenKind::FileLiteral {
            return false;
        }
        let joined = {
            let left = &self.tree.token(last).value;
            let right = &token.value;
            if left.is_empty() || left.ends_with('/') || right.is_empty() || right.starts_with('/')
            {
                format!("{left}{right}")
            } else {
                format!("{left}/{right}")
            }
        };
        self.tree.token_mut(last).value = joined;
        true
    }

    /// Matches a `)` or `]` against the nearest open bracket up the
    /// ancestor chain.
    ///
    /// Only a unary `(`, an argument list, or a list literal can match; a
    /// call's binary `(` is closed through its argument list instead. On a
    /// match the opener's value becomes the closed pair and a trailing
    /// comma filler is dropped from list-shaped nodes. `Err` means no
    /// opener was found.
    fn close_bracket(&mut self, last: NodeId, token: &Token) -> Result<(), ()> {
        let opener = if token.value == ")" { "(" } else { "[" };
        let closed = if token.value == ")" { "()" } else { "[]" };

        let mut cursor = Some(last);
        while let Some(node) = cursor {
            let t = self.tree.token(node);
            if t.value == opener
                && matches!(
                    t.kind,
                    TokenKind::UnaryOperator | TokenKind::ArgumentList | TokenKind::ListLiteral
                )
            {
                break;
            }
            cursor = self.tree.parent(node);
        }
        let Some(matched) = cursor else {
            return Err(());
        };

        self.tree.token_mut(matched).value = closed.to_string();
        let matched_kind = self.tree.token(matched).kind;

        if matched_kind != TokenKind::UnaryOperator {
            if let Some(last_child) = self.tree.child(matched, -1) {
                let lc = self.tree.token(last_child);
                if lc.kind == TokenKind::Filler && lc.value == "," {
                    self.tree.disconnect(last_child);
                    if self.last == Some(last_child) {
                        self.last = Some(matched);
                    }
                }
            }
        }

        // Closing an argument list also closes the call node that carries it.
        if matched_kind == TokenKind::ArgumentList {
            if let Some(parent) = self.tree.parent(matched) {
                let pt = self.tree.token(parent);
                if pt.kind == TokenKind::BinaryOperator && pt.value == "(" {
                    self.tree.token_mut(parent).value = closed.to_string();
                }
            }
        }

        Ok(())
    }

    /// General attachment: the nearest ancestor that is still incomplete
    /// and accepts the token at its next child index takes it; otherwise a
    /// new top-level phrase begins.
    fn attach(&mut self, last: NodeId, token: Token) {
        let mut cursor = Some(last);
        while let Some(node) = cursor {
            let position = self.tree.children_count(node);
            if !self.tree.is_complete(node)
                && self
                    .tree
                    .token(node)
                    .accepts_in_position(&token, position, false)
            {
                self.append_token(node, token, false);
                return;
            }
            cursor = self.tree.parent(node);
        }

        if let Some(top) = self.last_top_level {
            self.append_token(top, token, true);
        }
    }

    /// Creates the node for `token` under (or after) `anchor` and advances
    /// the insertion state. Fresh lists get their sentinel comma filler so
    /// completion can key off the trailing comma.
    fn append_token(&mut self, anchor: NodeId, token: Token, as_top_level: bool) {
        let is_list = matches!(token.kind, TokenKind::ArgumentList | TokenKind::ListLiteral);
        let (line, column) = (token.line, token.column);

        let id = self.tree.new_node(token);
        if as_top_level {
            self.tree.add_sibling(anchor, id);
            self.last_top_level = Some(id);
        } else {
            self.tree.add_child(anchor, id);
        }
        self.last_last = self.last;
        self.last = Some(id);

        if is_list && !as_top_level {
            let comma = self
                .tree
                .new_node(Token::new(TokenKind::Filler, ",", line, column));
            self.tree.add_child(id, comma);
            self.last_last = Some(id);
            self.last = Some(comma);
        }
    }

    /// Gobble up: a new node for `token` takes `last`'s position and adopts
    /// it as the left operand; the right slot waits for later tokens.
    fn gobble(&mut self, last: NodeId, token: Token) {
        let id = self.tree.new_node(token);
        self.tree.swap_in_slot(last, id);
        self.last_last = Some(id);
    }

    /// Final validation walk: one diagnostic per unknown token and per
    /// incomplete phrase, in source order, undeduplicated.
    fn collect_errors(&self) -> Vec<SyntaxError> {
        let mut errors = Vec::new();
        for top in self.tree.top_level() {
            self.collect_node_errors(top, &mut errors);
        }
        errors.sort_by_key(|e| e.position());
        errors
    }

    fn collect_node_errors(&self, id: NodeId, errors: &mut Vec<SyntaxError>) {
        let token = self.tree.token(id);
        if token.kind == TokenKind::Unknown {
            errors.push(SyntaxError::new(
                SyntaxErrorKind::UnknownToken,
                token.line,
                token.column,
            ));
        } else if !self.tree.is_complete(id) {
            errors.push(SyntaxError::new(
                SyntaxErrorKind::IncompletePhrase,
                token.line,
                token.column,
            ));
        }
        for child in self.tree.children(id) {
            self.collect_node_errors(child, errors);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;

    fn build(source: &str) -> (PhraseTree, Vec<SyntaxError>) {
        TreeBuilder::new().build(&Lexer::new(source).tokenize())
    }

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

    fn forest(source: &str) -> (Vec<String>, Vec<SyntaxError>) {
        let (tree, errors) = build(source);
        let tops = tree.top_level().map(|id| shape(&tree, id)).collect();
        (tops, errors)
    }

    #[test]
    fn empty_input_builds_nothing() {
        let (tree, errors) = build("");
        assert!(tree.root().is_none());
        assert!(errors.is_empty());
    }

    #[test]
    fn single_token_becomes_the_root() {
        let (tops, errors) = forest("x");
        assert_eq!(tops, ["NAME:x"]);
        assert!(errors.is_empty());
    }

    #[test]
    fn doubling_fusion_consumes_the_second_operator() {
        let (tops, errors) = forest("a & & b");
        assert_eq!(tops, ["BINARY_OPERATOR:and(NAME:a, NAME:b)"]);
        assert!(errors.is_empty());
    }

    #[test]
    fn less_equal_fuses_into_one_operator() {
        let (tops, errors) = forest("a < = b");
        assert_eq!(tops, ["BINARY_OPERATOR:≤(NAME:a, NAME:b)"]);
        assert!(errors.is_empty());
    }

    #[test]
    fn tilde_equal_restructures_over_the_prior_leaf() {
        let (tops, errors) = forest("a ~ = b");
        assert_eq!(tops, ["BINARY_OPERATOR:≈(NAME:a, NAME:b)"]);
        assert!(errors.is_empty());
    }

    #[test]
    fn stray_closer_is_an_unknown_token() {
        let (tops, errors) = forest("x )");
        assert_eq!(tops, ["NAME:x", "UNKNOWN:)"]);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind(), SyntaxErrorKind::UnknownToken);
    }

    #[test]
    fn list_keeps_interleaved_fillers_and_drops_the_trailing_comma() {
        let (tops, errors) = forest("x = [1, 2,]");
        assert_eq!(
            tops,
            ["BINARY_OPERATOR:=(NAME:x, LIST_LITERAL:[](FILLER:,, NUMERIC_LITERAL:1, FILLER:,, NUMERIC_LITERAL:2))"]
        );
        assert!(errors.is_empty());
    }

    #[test]
    fn unclosed_list_is_incomplete() {
        let (_, errors) = forest("x = [1, 2");
        assert!(errors
            .iter()
            .any(|e| e.kind() == SyntaxErrorKind::IncompletePhrase));
    }

    #[test]
    fn grouping_paren_closes_by_value() {
        // After `export` the anchor is still incomplete, so `(` stays a
        // plain unary grouping rather than starting a call.
        let (tops, errors) = forest("export (a)");
        assert_eq!(tops, ["KEYWORD:export(UNARY_OPERATOR:()(NAME:a))"]);
        assert!(errors.is_empty());
    }

    #[test]
    fn paren_after_a_value_begins_a_call() {
        let (tops, errors) = forest("x = f(a = 1)");
        assert_eq!(
            tops,
            ["BINARY_OPERATOR:=(NAME:x, BINARY_OPERATOR:()(NAME:f, ARGUMENT_LIST:()(FILLER:,, ASSIGNMENT:=(NAME:a, NUMERIC_LITERAL:1))))"]
        );
        assert!(errors.is_empty());
    }
}
