//! Search tree nodes.
//!
//! A node records a position, the move that produced it, and a shared link to
//! its parent. Nodes never change after construction, so a chain can be handed
//! between worker threads freely.

use std::sync::Arc;

#[derive(Debug)]
pub struct SearchNode<P, M> {
    position: P,
    incoming: Option<M>,
    parent: Option<Arc<SearchNode<P, M>>>,
    depth: usize,
}

impl<P, M> SearchNode<P, M> {
    /// Create the root of a search tree
    pub fn root(position: P) -> Arc<Self> {
        Arc::new(Self {
            position,
            incoming: None,
            parent: None,
            depth: 0,
        })
    }

    /// Create a node reached from `parent` by playing `mv`
    pub fn child(parent: &Arc<Self>, mv: M, position: P) -> Arc<Self> {
        Arc::new(Self {
            position,
            incoming: Some(mv),
            parent: Some(Arc::clone(parent)),
            depth: parent.depth + 1,
        })
    }

    pub fn position(&self) -> &P {
        &self.position
    }

    pub fn incoming_move(&self) -> Option<&M> {
        self.incoming.as_ref()
    }

    pub fn parent(&self) -> Option<&Arc<Self>> {
        self.parent.as_ref()
    }

    /// Number of moves between the root and this node
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

impl<P, M: Clone> SearchNode<P, M> {
    /// Moves from the root to this node, in playing order
    pub fn path(&self) -> Vec<M> {
        let mut moves = Vec::with_capacity(self.depth);
        let mut current = Some(self);
        while let Some(node) = current {
            if let Some(mv) = &node.incoming {
                moves.push(mv.clone());
            }
            current = node.parent.as_deref();
        }
        moves.reverse();
        moves
    }
}

impl<P, M> Drop for SearchNode<P, M> {
    // Unlink the chain iteratively; deep depth-first paths would otherwise
    // recurse once per ancestor.
    fn drop(&mut self) {
        let mut next = self.parent.take();
        while let Some(parent) = next {
            match Arc::try_unwrap(parent) {
                Ok(mut node) => next = node.parent.take(),
                Err(_) => break,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_has_no_move_or_parent() {
        let root: Arc<SearchNode<u8, char>> = SearchNode::root(0);
        assert!(root.is_root());
        assert!(root.incoming_move().is_none());
        assert_eq!(root.depth(), 0);
        assert!(root.path().is_empty());
    }

    #[test]
    fn test_path_is_root_to_leaf() {
        let root = SearchNode::root(0u8);
        let a = SearchNode::child(&root, 'a', 1);
        let b = SearchNode::child(&a, 'b', 2);
        let c = SearchNode::child(&b, 'c', 3);

        assert_eq!(c.path(), vec!['a', 'b', 'c']);
        assert_eq!(c.depth(), 3);
        assert_eq!(*c.parent().unwrap().position(), 2);
        assert_eq!(c.incoming_move(), Some(&'c'));
    }

    #[test]
    fn test_siblings_share_parent() {
        let root = SearchNode::root(0u8);
        let left = SearchNode::child(&root, 'l', 1);
        let right = SearchNode::child(&root, 'r', 2);
        drop(root);

        assert_eq!(left.path(), vec!['l']);
        assert_eq!(right.path(), vec!['r']);
        assert!(Arc::ptr_eq(left.parent().unwrap(), right.parent().unwrap()));
    }

    #[test]
    fn test_deep_chain_drops_without_overflow() {
        let mut node = SearchNode::root(0u32);
        for i in 1..200_000u32 {
            node = SearchNode::child(&node, (), i);
        }
        assert_eq!(node.depth(), 199_999);
        drop(node);
    }
}
