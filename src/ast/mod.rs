// SPDX-License-Identifier: SEE LICENSE IN LICENSE.md
// SPDX-FileCopyrightText: 2022 CYBERTEC PostgreSQL International GmbH
// <office@cybertec.at>

//! The expression tree: an arena of [`Node`]s addressed by [`ExprId`],
//! each holding an ordered, string-keyed bag of [`Arg`]s. Replaces the
//! teacher's rowan `SyntaxNode` tree: rowan's children-by-position model
//! can't represent a dynamic named-argument bag with in-place
//! `set`/`append`/`transform`, so nodes live in a flat `Vec` and reference
//! their parent by index instead of by tree pointer.

pub mod kind;

pub use kind::ExprKind;

use indexmap::IndexMap;

/// Index into a [`Tree`]'s node arena.
pub type ExprId = usize;

/// Where in its parent's argument bag a node sits: a plain key for a
/// single-node slot, or a key plus position for a list slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArgKey {
    pub key: &'static str,
    pub index: Option<usize>,
}

/// A single argument slot's value.
#[derive(Debug, Clone)]
pub enum Arg {
    Node(ExprId),
    List(Vec<ExprId>),
    Text(String),
    Bool(bool),
    None,
}

impl Arg {
    pub fn as_node(&self) -> Option<ExprId> {
        match self {
            Arg::Node(id) => Some(*id),
            _ => None,
        }
    }

    pub fn as_list(&self) -> &[ExprId] {
        match self {
            Arg::List(ids) => ids,
            _ => &[],
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Arg::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> bool {
        matches!(self, Arg::Bool(true))
    }
}

/// One node in the tree. `this_` (the `THIS` slot of a `Literal`) always
/// holds the literal's textual representation, never a parsed numeric
/// value, per the data model's "Literal `this_` is always textual"
/// invariant.
#[derive(Debug, Clone)]
pub struct Node {
    pub kind: ExprKind,
    args: IndexMap<&'static str, Arg>,
    pub parent: Option<ExprId>,
    pub arg_key: Option<ArgKey>,
    pub comments: Vec<String>,
}

impl Node {
    fn new(kind: ExprKind) -> Self {
        Self { kind, args: IndexMap::new(), parent: None, arg_key: None, comments: Vec::new() }
    }

    pub fn arg(&self, key: &str) -> Option<&Arg> {
        self.args.get(key)
    }

    pub fn this(&self) -> Option<&str> {
        self.args.get(kind::keys::THIS).and_then(Arg::as_text)
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        self.args.get(key).and_then(Arg::as_text)
    }

    pub fn node_arg(&self, key: &str) -> Option<ExprId> {
        self.args.get(key).and_then(Arg::as_node)
    }

    pub fn list_arg(&self, key: &str) -> &[ExprId] {
        self.args.get(key).map(Arg::as_list).unwrap_or(&[])
    }

    pub fn bool_arg(&self, key: &str) -> bool {
        self.args.get(key).map(Arg::as_bool).unwrap_or(false)
    }

    /// Iterates `(key, Arg)` pairs in insertion order — insertion order is
    /// syntactically significant (e.g. projection and `ORDER BY` order).
    pub fn args(&self) -> impl Iterator<Item = (&'static str, &Arg)> {
        self.args.iter().map(|(k, v)| (*k, v))
    }
}

/// Result of a [`Tree::transform`] visitor callback.
pub enum TransformResult {
    /// Keep the node (possibly mutated in place by the callback).
    Keep,
    /// Replace the node with a different single node.
    Replace(ExprId),
    /// Splice multiple nodes in where this one sat (only valid inside a
    /// list-valued slot).
    Splice(Vec<ExprId>),
    /// Remove the node entirely from its parent's slot.
    Remove,
}

/// An arena of [`Node`]s plus the id of its root.
#[derive(Debug, Clone, Default)]
pub struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    pub fn alloc(&mut self, kind: ExprKind) -> ExprId {
        self.nodes.push(Node::new(kind));
        self.nodes.len() - 1
    }

    pub fn get(&self, id: ExprId) -> &Node {
        &self.nodes[id]
    }

    pub fn get_mut(&mut self, id: ExprId) -> &mut Node {
        &mut self.nodes[id]
    }

    /// Sets a single-node argument slot, updating the child's back-link.
    /// Overwrites (and orphans) any previous occupant of the slot.
    pub fn set_node(&mut self, parent: ExprId, key: &'static str, child: ExprId) {
        self.nodes[child].parent = Some(parent);
        self.nodes[child].arg_key = Some(ArgKey { key, index: None });
        self.nodes[parent].args.insert(key, Arg::Node(child));
    }

    pub fn set_text(&mut self, parent: ExprId, key: &'static str, text: impl Into<String>) {
        self.nodes[parent].args.insert(key, Arg::Text(text.into()));
    }

    pub fn set_bool(&mut self, parent: ExprId, key: &'static str, value: bool) {
        self.nodes[parent].args.insert(key, Arg::Bool(value));
    }

    /// Sets a list-valued argument slot wholesale, updating every child's
    /// back-link with its position.
    pub fn set_list(&mut self, parent: ExprId, key: &'static str, children: Vec<ExprId>) {
        for (i, &child) in children.iter().enumerate() {
            self.nodes[child].parent = Some(parent);
            self.nodes[child].arg_key = Some(ArgKey { key, index: Some(i) });
        }
        self.nodes[parent].args.insert(key, Arg::List(children));
    }

    /// Appends one child to a list-valued slot, creating it if absent.
    pub fn append(&mut self, parent: ExprId, key: &'static str, child: ExprId) {
        let mut list = match self.nodes[parent].args.shift_remove(key) {
            Some(Arg::List(list)) => list,
            _ => Vec::new(),
        };
        let index = list.len();
        list.push(child);
        self.nodes[child].parent = Some(parent);
        self.nodes[child].arg_key = Some(ArgKey { key, index: Some(index) });
        self.nodes[parent].args.insert(key, Arg::List(list));
    }

    /// The direct children of `id`, in argument-bag order.
    pub fn children(&self, id: ExprId) -> Vec<ExprId> {
        let mut out = Vec::new();
        for (_, arg) in self.nodes[id].args.iter() {
            match arg {
                Arg::Node(child) => out.push(*child),
                Arg::List(list) => out.extend(list.iter().copied()),
                Arg::Text(_) | Arg::Bool(_) | Arg::None => {}
            }
        }
        out
    }

    /// Depth-first pre-order walk starting at `id`, visiting `id` itself
    /// first.
    pub fn walk(&self, id: ExprId) -> Vec<ExprId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(node) = stack.pop() {
            out.push(node);
            let mut kids = self.children(node);
            kids.reverse();
            stack.extend(kids);
        }
        out
    }

    /// All descendants (including `id`) of the given kind.
    pub fn find_all(&self, id: ExprId, kind: ExprKind) -> Vec<ExprId> {
        self.walk(id).into_iter().filter(|&n| self.nodes[n].kind == kind).collect()
    }

    /// The first descendant (including `id`) of the given kind, in
    /// pre-order.
    pub fn find(&self, id: ExprId, kind: ExprKind) -> Option<ExprId> {
        self.walk(id).into_iter().find(|&n| self.nodes[n].kind == kind)
    }

    /// Post-order node ids: every descendant before its parent, `id` last.
    fn post_order(&self, id: ExprId) -> Vec<ExprId> {
        let mut out = Vec::new();
        fn visit(tree: &Tree, id: ExprId, out: &mut Vec<ExprId>) {
            for child in tree.children(id) {
                visit(tree, child, out);
            }
            out.push(id);
        }
        visit(self, id, &mut out);
        out
    }

    /// Bottom-up rewrite: `f` runs on each node post-order and decides
    /// whether to keep, replace, splice, or remove it. A replacement is
    /// never itself recursed into — the callback has already seen
    /// everything beneath the node it returns.
    pub fn transform(&mut self, id: ExprId, mut f: impl FnMut(&mut Tree, ExprId) -> TransformResult) -> Option<ExprId> {
        let order = self.post_order(id);
        let mut replaced_root: Option<ExprId> = None;

        for node in order {
            // A node already spliced/removed earlier in this pass (as
            // someone else's child) no longer has a parent slot to act on,
            // but we still ran `f` for everything below it before this.
            let parent = self.nodes[node].parent;
            let arg_key = self.nodes[node].arg_key;

            let result = f(self, node);

            match result {
                TransformResult::Keep => {
                    if node == id {
                        replaced_root = Some(node);
                    }
                }
                TransformResult::Replace(new_id) => {
                    self.rewire_slot(parent, arg_key, &[new_id]);
                    if node == id {
                        replaced_root = Some(new_id);
                    }
                }
                TransformResult::Splice(ids) => {
                    self.rewire_slot(parent, arg_key, &ids);
                    if node == id {
                        replaced_root = ids.first().copied();
                    }
                }
                TransformResult::Remove => {
                    self.rewire_slot(parent, arg_key, &[]);
                    if node == id {
                        replaced_root = None;
                    }
                }
            }
        }

        replaced_root
    }

    fn rewire_slot(&mut self, parent: Option<ExprId>, arg_key: Option<ArgKey>, replacements: &[ExprId]) {
        let (Some(parent), Some(arg_key)) = (parent, arg_key) else {
            return;
        };

        match arg_key.index {
            None => match replacements {
                [] => {
                    self.nodes[parent].args.insert(arg_key.key, Arg::None);
                }
                [single] => {
                    self.nodes[*single].parent = Some(parent);
                    self.nodes[*single].arg_key = Some(ArgKey { key: arg_key.key, index: None });
                    self.nodes[parent].args.insert(arg_key.key, Arg::Node(*single));
                }
                many => {
                    // A single-node slot spliced into many: fall back to a
                    // list slot under the same key.
                    self.set_list(parent, arg_key.key, many.to_vec());
                }
            },
            Some(i) => {
                let mut list = match self.nodes[parent].args.shift_remove(arg_key.key) {
                    Some(Arg::List(list)) => list,
                    _ => Vec::new(),
                };
                if i < list.len() {
                    list.splice(i..=i, replacements.iter().copied());
                } else {
                    list.extend(replacements.iter().copied());
                }
                self.set_list(parent, arg_key.key, list);
            }
        }
    }

    /// Deep-copies the subtree rooted at `id` into fresh arena slots,
    /// returning the new root. The copy shares no node ids with the
    /// original.
    pub fn copy_subtree(&mut self, id: ExprId) -> ExprId {
        let node = self.nodes[id].clone();
        let new_id = self.alloc(node.kind);
        self.nodes[new_id].comments = node.comments.clone();

        for (key, arg) in node.args.iter() {
            match arg {
                Arg::Node(child) => {
                    let new_child = self.copy_subtree(*child);
                    self.set_node(new_id, key, new_child);
                }
                Arg::List(list) => {
                    let new_list: Vec<ExprId> = list.iter().map(|&c| self.copy_subtree(c)).collect();
                    self.set_list(new_id, key, new_list);
                }
                Arg::Text(text) => self.set_text(new_id, key, text.clone()),
                Arg::Bool(b) => self.set_bool(new_id, key, *b),
                Arg::None => {
                    self.nodes[new_id].args.insert(key, Arg::None);
                }
            }
        }

        new_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_node_updates_back_link() {
        let mut tree = Tree::new();
        let parent = tree.alloc(ExprKind::Where);
        let child = tree.alloc(ExprKind::Boolean);
        tree.set_node(parent, kind::keys::THIS, child);
        assert_eq!(tree.get(child).parent, Some(parent));
        assert_eq!(tree.get(parent).node_arg(kind::keys::THIS), Some(child));
    }

    #[test]
    fn append_tracks_list_index() {
        let mut tree = Tree::new();
        let select = tree.alloc(ExprKind::Select);
        let a = tree.alloc(ExprKind::Column);
        let b = tree.alloc(ExprKind::Column);
        tree.append(select, kind::keys::EXPRESSIONS, a);
        tree.append(select, kind::keys::EXPRESSIONS, b);
        assert_eq!(tree.get(select).list_arg(kind::keys::EXPRESSIONS), &[a, b]);
        assert_eq!(tree.get(b).arg_key, Some(ArgKey { key: kind::keys::EXPRESSIONS, index: Some(1) }));
    }

    #[test]
    fn transform_replace_rewires_parent() {
        let mut tree = Tree::new();
        let select = tree.alloc(ExprKind::Select);
        let lit = tree.alloc(ExprKind::Literal);
        tree.set_text(lit, kind::keys::THIS, "1");
        tree.set_node(select, kind::keys::WHERE, lit);

        tree.transform(select, |t, id| {
            if t.get(id).kind == ExprKind::Literal {
                let replacement = t.alloc(ExprKind::Null);
                TransformResult::Replace(replacement)
            } else {
                TransformResult::Keep
            }
        });

        let new_where = tree.get(select).node_arg(kind::keys::WHERE).unwrap();
        assert_eq!(tree.get(new_where).kind, ExprKind::Null);
    }
}
