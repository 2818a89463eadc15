//! The phrase tree.
//!
//! A [`PhraseTree`] is an arena of phrase nodes: each node owns its
//! [`Token`] and links to its parent, first child, and next younger
//! sibling by [`NodeId`]. The semantic model is a rooted ordered forest —
//! every node has at most one parent, siblings form a linear chain, and
//! additional top-level phrases hang off the first root as siblings.
//!
//! The builder restructures this tree in place as tokens arrive. The two
//! mutation primitives that make that safe are [`swap_in_slot`]
//! (gobble-up: a new node takes an existing node's position and adopts it
//! as first child) and [`disconnect`] (remove a node, splicing its
//! children into its place). Everything else is plain traversal.
//!
//! [`swap_in_slot`]: PhraseTree::swap_in_slot
//! [`disconnect`]: PhraseTree::disconnect
//!
//! # Example
//!
//! ```rust
//! use wbs::{parse, build_tree};
//!
//! let (tree, errors) = build_tree(&parse("const x = 3"));
//! assert!(errors.is_empty());
//!
//! let root = tree.root().unwrap();
//! assert_eq!(tree.token(root).to_string(), "CONST:const");
//! let assign = tree.child(root, 0).unwrap();
//! assert_eq!(tree.children_count(assign), 2);
//! // Negative indices count from the end.
//! assert_eq!(tree.token(tree.child(assign, -1).unwrap()).value, "3");
//! ```

use crate::token::{Token, TokenKind};

/// Handle to a node inside a [`PhraseTree`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

impl NodeId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug)]
struct Node {
    token: Token,
    parent: Option<NodeId>,
    first_child: Option<NodeId>,
    next_sibling: Option<NodeId>,
}

/// An arena-backed forest of phrase nodes.
///
/// Dropping the tree drops every node; nodes disconnected during
/// construction simply become unreachable in the arena.
#[derive(Debug, Default)]
pub struct PhraseTree {
    nodes: Vec<Node>,
    root: Option<NodeId>,
}

impl PhraseTree {
    /// Creates an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// The root of the first top-level phrase, if any token was consumed.
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// The token carried by `id`.
    pub fn token(&self, id: NodeId) -> &Token {
        &self.nodes[id.index()].token
    }

    /// The enclosing phrase of `id`, or `None` at a top-level node.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.index()].parent
    }

    /// The next younger sibling of `id`.
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.index()].next_sibling
    }

    /// The `index`-th child of `id`. Negative indices count from the end;
    /// anything out of range returns `None`.
    pub fn child(&self, id: NodeId, index: i32) -> Option<NodeId> {
        let index = if index < 0 {
            let count = self.children_count(id) as i64 + index as i64;
            if count < 0 {
                return None;
            }
            count as u32
        } else {
            index as u32
        };
        let mut current = self.nodes[id.index()].first_child;
        for _ in 0..index {
            current = self.nodes[current?.index()].next_sibling;
        }
        current
    }

    /// How many children `id` has.
    pub fn children_count(&self, id: NodeId) -> u32 {
        let mut count = 0;
        let mut current = self.nodes[id.index()].first_child;
        while let Some(c) = current {
            count += 1;
            current = self.nodes[c.index()].next_sibling;
        }
        count
    }

    /// Iterates the children of `id` in order.
    pub fn children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        let mut current = self.nodes[id.index()].first_child;
        std::iter::from_fn(move || {
            let id = current?;
            current = self.nodes[id.index()].next_sibling;
            Some(id)
        })
    }

    /// Iterates the top-level phrases: the root and its younger siblings.
    pub fn top_level(&self) -> impl Iterator<Item = NodeId> + '_ {
        let mut current = self.root;
        std::iter::from_fn(move || {
            let id = current?;
            current = self.nodes[id.index()].next_sibling;
            Some(id)
        })
    }

    /// Whether the phrase at `id` has all its mandated children.
    ///
    /// Fixed-arity phrases are complete once the child count reaches the
    /// arity and the youngest child is itself complete. Variable-arity
    /// phrases (lists, argument lists) are complete once their bracket has
    /// been closed and no transient name is dangling. A string literal is
    /// complete only if its stored value still carries the terminating
    /// quote.
    pub fn is_complete(&self, id: NodeId) -> bool {
        let token = self.token(id);
        if token.kind == TokenKind::StringLiteral {
            return token.value.ends_with('"');
        }
        let children = self.children_count(id);
        let last_child = self.child(id, -1);
        let arity = token.phrase_length();
        if arity.is_variable() {
            // No children means the sentinel comma has been removed by a
            // closer and the list just happens to be empty.
            let Some(last_child) = last_child else {
                return true;
            };
            if self.token(last_child).kind == TokenKind::Name
                && token.kind == TokenKind::ArgumentList
            {
                return false;
            }
            // Still a bare opener: no matching closer seen yet.
            if token.value == "(" || token.value == "[" {
                return false;
            }
            return self.is_complete(last_child);
        }
        if arity.wants_more(children) {
            return false;
        }
        // More children than the arity is a separate validation concern.
        match last_child {
            Some(last_child) => self.is_complete(last_child),
            None => true,
        }
    }

    /// Linearises the forest into a heap-indexed vector of token strings
    /// for the debug tree view: a node at index `i` has its first child at
    /// `2i + 1` and its next sibling at `2i + 2`. Empty slots are empty
    /// strings.
    pub fn to_vector(&self) -> Vec<String> {
        let mut out = Vec::new();
        if let Some(root) = self.root {
            self.place(root, 0, &mut out);
        }
        out
    }

    fn place(&self, id: NodeId, index: usize, out: &mut Vec<String>) {
        if out.len() <= index {
            out.resize(index + 1, String::new());
        }
        out[index] = self.token(id).to_string();
        let node = &self.nodes[id.index()];
        if let Some(child) = node.first_child {
            self.place(child, 2 * index + 1, out);
        }
        if let Some(sibling) = node.next_sibling {
            self.place(sibling, 2 * index + 2, out);
        }
    }

    // ---- construction internals used by the builder ----

    /// Allocates a detached node carrying `token`.
    pub(crate) fn new_node(&mut self, token: Token) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node {
            token,
            parent: None,
            first_child: None,
            next_sibling: None,
        });
        id
    }

    /// Installs `id` as the root of the first top-level phrase.
    pub(crate) fn install_root(&mut self, id: NodeId) {
        self.root = Some(id);
    }

    /// Mutable access to a node's token, for in-place fusion rewrites.
    pub(crate) fn token_mut(&mut self, id: NodeId) -> &mut Token {
        &mut self.nodes[id.index()].token
    }

    /// Appends `child` at the end of `parent`'s child chain.
    pub(crate) fn add_child(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[child.index()].parent = Some(parent);
        match self.nodes[parent.index()].first_child {
            None => self.nodes[parent.index()].first_child = Some(child),
            Some(first) => {
                let last = self.last_in_chain(first);
                self.nodes[last.index()].next_sibling = Some(child);
            }
        }
    }

    /// Appends `sibling` at the end of `node`'s sibling chain.
    pub(crate) fn add_sibling(&mut self, node: NodeId, sibling: NodeId) {
        self.nodes[sibling.index()].parent = self.nodes[node.index()].parent;
        let last = self.last_in_chain(node);
        self.nodes[last.index()].next_sibling = Some(sibling);
    }

    fn last_in_chain(&self, start: NodeId) -> NodeId {
        let mut current = start;
        while let Some(next) = self.nodes[current.index()].next_sibling {
            current = next;
        }
        current
    }

    /// The sibling immediately older than `id`, if any.
    fn previous_sibling(&self, id: NodeId) -> Option<NodeId> {
        let chain_start = match self.nodes[id.index()].parent {
            Some(parent) => self.nodes[parent.index()].first_child,
            None => self.root,
        };
        let mut current = chain_start?;
        if current == id {
            return None;
        }
        while let Some(next) = self.nodes[current.index()].next_sibling {
            if next == id {
                return Some(current);
            }
            current = next;
        }
        None
    }

    /// Unlinks `id` from its parent and sibling chain. `id` keeps its
    /// children.
    pub(crate) fn detach(&mut self, id: NodeId) {
        let next = self.nodes[id.index()].next_sibling;
        if let Some(prev) = self.previous_sibling(id) {
            self.nodes[prev.index()].next_sibling = next;
        } else if let Some(parent) = self.nodes[id.index()].parent {
            self.nodes[parent.index()].first_child = next;
        } else if self.root == Some(id) {
            self.root = next;
        }
        self.nodes[id.index()].parent = None;
        self.nodes[id.index()].next_sibling = None;
    }

    /// Puts the detached node `new` in `old`'s position and makes `old` its
    /// first child: the gobble-up primitive.
    ///
    /// `new` inherits `old`'s parent and sibling links; `old` loses its
    /// sibling and keeps its own children.
    pub(crate) fn swap_in_slot(&mut self, old: NodeId, new: NodeId) {
        debug_assert!(self.nodes[new.index()].first_child.is_none());
        let parent = self.nodes[old.index()].parent;
        let next = self.nodes[old.index()].next_sibling;
        let prev = self.previous_sibling(old);

        self.nodes[new.index()].parent = parent;
        self.nodes[new.index()].next_sibling = next;
        if let Some(prev) = prev {
            self.nodes[prev.index()].next_sibling = Some(new);
        } else if let Some(parent) = parent {
            self.nodes[parent.index()].first_child = Some(new);
        } else if self.root == Some(old) {
            self.root = Some(new);
        }

        self.nodes[old.index()].parent = Some(new);
        self.nodes[old.index()].next_sibling = None;
        self.nodes[new.index()].first_child = Some(old);
    }

    /// Removes `id` from the tree, rewiring its neighbours around its
    /// children: the children (if any) take its place, and its old sibling
    /// chain is appended after them. The node itself is reset so nothing
    /// dangles into the arena.
    pub(crate) fn disconnect(&mut self, id: NodeId) {
        let parent = self.nodes[id.index()].parent;
        let next = self.nodes[id.index()].next_sibling;
        let first_child = self.nodes[id.index()].first_child;
        let prev = self.previous_sibling(id);

        let replacement = match first_child {
            Some(child) => {
                // All children move up one level.
                let mut current = Some(child);
                while let Some(c) = current {
                    self.nodes[c.index()].parent = parent;
                    current = self.nodes[c.index()].next_sibling;
                }
                if let Some(next) = next {
                    let last = self.last_in_chain(child);
                    self.nodes[last.index()].next_sibling = Some(next);
                }
                Some(child)
            }
            None => next,
        };

        if let Some(prev) = prev {
            self.nodes[prev.index()].next_sibling = replacement;
        } else if let Some(parent) = parent {
            self.nodes[parent.index()].first_child = replacement;
        } else if self.root == Some(id) {
            self.root = replacement;
        }

        let node = &mut self.nodes[id.index()];
        node.token = Token::default();
        node.parent = None;
        node.first_child = None;
        node.next_sibling = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(kind: TokenKind, value: &str) -> Token {
        Token::new(kind, value, 0, 0)
    }

    fn leaf(tree: &mut PhraseTree, value: &str) -> NodeId {
        tree.new_node(token(TokenKind::Name, value))
    }

    #[test]
    fn children_are_ordered_and_indexable() {
        let mut tree = PhraseTree::new();
        let root = tree.new_node(token(TokenKind::Keyword, "colorset"));
        tree.install_root(root);
        let a = leaf(&mut tree, "a");
        let b = leaf(&mut tree, "b");
        let c = leaf(&mut tree, "c");
        tree.add_child(root, a);
        tree.add_child(root, b);
        tree.add_child(root, c);

        assert_eq!(tree.children_count(root), 3);
        assert_eq!(tree.child(root, 0), Some(a));
        assert_eq!(tree.child(root, 2), Some(c));
        assert_eq!(tree.child(root, -1), Some(c));
        assert_eq!(tree.child(root, -3), Some(a));
        assert_eq!(tree.child(root, -4), None);
        assert_eq!(tree.child(root, 3), None);
        assert_eq!(tree.parent(a), Some(root));
        assert_eq!(tree.parent(root), None);
    }

    #[test]
    fn swap_in_slot_replaces_a_child() {
        let mut tree = PhraseTree::new();
        let root = tree.new_node(token(TokenKind::Keyword, "export"));
        tree.install_root(root);
        let x = leaf(&mut tree, "x");
        tree.add_child(root, x);

        let op = tree.new_node(token(TokenKind::BinaryOperator, "+"));
        tree.swap_in_slot(x, op);

        assert_eq!(tree.child(root, 0), Some(op));
        assert_eq!(tree.child(op, 0), Some(x));
        assert_eq!(tree.parent(x), Some(op));
        assert_eq!(tree.parent(op), Some(root));
    }

    #[test]
    fn swap_in_slot_replaces_the_root() {
        let mut tree = PhraseTree::new();
        let x = tree.new_node(token(TokenKind::Name, "x"));
        tree.install_root(x);

        let op = tree.new_node(token(TokenKind::BinaryOperator, "="));
        tree.swap_in_slot(x, op);

        assert_eq!(tree.root(), Some(op));
        assert_eq!(tree.child(op, 0), Some(x));
    }

    #[test]
    fn swap_in_slot_preserves_sibling_links() {
        let mut tree = PhraseTree::new();
        let root = tree.new_node(token(TokenKind::Keyword, "colorset"));
        tree.install_root(root);
        let a = leaf(&mut tree, "a");
        let b = leaf(&mut tree, "b");
        tree.add_child(root, a);
        tree.add_child(root, b);

        let op = tree.new_node(token(TokenKind::Assignment, "="));
        tree.swap_in_slot(a, op);

        assert_eq!(tree.child(root, 0), Some(op));
        assert_eq!(tree.next_sibling(op), Some(b));
        assert_eq!(tree.next_sibling(a), None);
    }

    #[test]
    fn disconnect_removes_a_trailing_leaf() {
        let mut tree = PhraseTree::new();
        let list = tree.new_node(token(TokenKind::ListLiteral, "["));
        tree.install_root(list);
        let a = leaf(&mut tree, "a");
        let comma = tree.new_node(token(TokenKind::Filler, ","));
        tree.add_child(list, a);
        tree.add_child(list, comma);

        tree.disconnect(comma);

        assert_eq!(tree.children_count(list), 1);
        assert_eq!(tree.child(list, -1), Some(a));
        assert_eq!(tree.parent(comma), None);
        assert_eq!(tree.token(comma).kind, TokenKind::Unset);
    }

    #[test]
    fn disconnect_promotes_children_into_the_slot() {
        let mut tree = PhraseTree::new();
        let root = tree.new_node(token(TokenKind::Keyword, "foreach"));
        tree.install_root(root);
        let mid = tree.new_node(token(TokenKind::UnaryOperator, "not"));
        let tail = leaf(&mut tree, "tail");
        tree.add_child(root, mid);
        tree.add_child(root, tail);
        let inner = leaf(&mut tree, "inner");
        tree.add_child(mid, inner);

        tree.disconnect(mid);

        // inner takes mid's slot, tail follows it.
        assert_eq!(tree.child(root, 0), Some(inner));
        assert_eq!(tree.child(root, 1), Some(tail));
        assert_eq!(tree.parent(inner), Some(root));
    }

    #[test]
    fn to_vector_uses_heap_indices() {
        let mut tree = PhraseTree::new();
        let root = tree.new_node(token(TokenKind::BinaryOperator, "=="));
        tree.install_root(root);
        let a = leaf(&mut tree, "a");
        let b = leaf(&mut tree, "b");
        tree.add_child(root, a);
        tree.add_child(root, b);

        let v = tree.to_vector();
        // root at 0, first child at 1, that child's sibling at 4.
        assert_eq!(v[0], "BINARY_OPERATOR:==");
        assert_eq!(v[1], "NAME:a");
        assert_eq!(v[4], "NAME:b");
        assert_eq!(v[2], "");
    }
}
