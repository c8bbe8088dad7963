//! Radix tree node implementation.
//!
//! This module provides the core radix tree (compressed trie) data structure
//! used for efficient path matching. Parameter nodes are anonymous: captures
//! are positional, and names are attached per route in [`RouteEntry`] so two
//! templates may use different names at the same position.
//!
//! [`RouteEntry`]: crate::RouteEntry

use smallvec::SmallVec;

use crate::method_router::MethodRouter;
use crate::template::Segment;

/// Positional captures collected while walking the tree.
pub type Captures = SmallVec<[String; 4]>;

/// Type of path segment in the radix tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SegmentKind {
    /// Static path segment (e.g., "users", "api")
    Static,
    /// Parameter segment (e.g., ":id")
    Param,
}

/// A node in the radix tree.
#[derive(Debug, Clone)]
pub struct Node {
    /// The path segment this node represents
    pub segment: String,

    /// The kind of segment
    pub kind: SegmentKind,

    /// Method router for this node (if it's a route endpoint)
    pub methods: Option<MethodRouter>,

    /// Static children, sorted by segment for binary search
    pub static_children: Vec<Node>,

    /// Parameter child (at most one per node)
    pub param_child: Option<Box<Node>>,
}

impl Node {
    /// Creates a new static node.
    #[must_use]
    pub fn new_static(segment: impl Into<String>) -> Self {
        Self {
            segment: segment.into(),
            kind: SegmentKind::Static,
            methods: None,
            static_children: Vec::new(),
            param_child: None,
        }
    }

    /// Creates a new parameter node.
    #[must_use]
    pub fn new_param() -> Self {
        Self {
            segment: ":".to_string(),
            kind: SegmentKind::Param,
            methods: None,
            static_children: Vec::new(),
            param_child: None,
        }
    }

    /// Creates a root node for the tree.
    #[must_use]
    pub fn root() -> Self {
        Self::new_static("")
    }

    /// Walks (creating as needed) to the node for `segments` and returns its
    /// method router.
    pub fn insert(&mut self, segments: &[Segment]) -> &mut MethodRouter {
        let Some((first, remaining)) = segments.split_first() else {
            return self.methods.get_or_insert_with(MethodRouter::new);
        };

        match first {
            Segment::Literal(lit) => {
                let idx = match self
                    .static_children
                    .binary_search_by(|c| c.segment.as_str().cmp(lit))
                {
                    Ok(idx) => idx,
                    Err(idx) => {
                        // Keep sorted for binary search
                        self.static_children.insert(idx, Node::new_static(lit));
                        idx
                    }
                };
                self.static_children[idx].insert(remaining)
            }
            Segment::Param { .. } => self
                .param_child
                .get_or_insert_with(|| Box::new(Node::new_param()))
                .insert(remaining),
        }
    }

    /// Matches a concrete path against the tree.
    ///
    /// Returns the method router and the raw positional captures.
    #[must_use]
    pub fn match_path(&self, path: &str) -> Option<(&MethodRouter, Captures)> {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let mut captures = Captures::new();
        let methods = self.match_segments(&segments, &mut captures)?;
        Some((methods, captures))
    }

    fn match_segments<'a>(
        &'a self,
        segments: &[&str],
        captures: &mut Captures,
    ) -> Option<&'a MethodRouter> {
        let Some((segment, remaining)) = segments.split_first() else {
            return self.methods.as_ref().filter(|m| !m.is_empty());
        };

        // Static match has priority
        if let Some(child) = self.find_static_child(segment) {
            if let Some(found) = child.match_segments(remaining, captures) {
                return Some(found);
            }
        }

        if let Some(child) = &self.param_child {
            let mark = captures.len();
            captures.push((*segment).to_string());
            if let Some(found) = child.match_segments(remaining, captures) {
                return Some(found);
            }
            captures.truncate(mark);
        }

        None
    }

    /// Finds a static child by segment using binary search.
    fn find_static_child(&self, segment: &str) -> Option<&Node> {
        self.static_children
            .binary_search_by(|c| c.segment.as_str().cmp(segment))
            .ok()
            .map(|i| &self.static_children[i])
    }
}
