//! Authoritative node and edge tables.
//!
//! Both tables keep insertion order, which is the tie-break order used by
//! focus navigation. The store holds visual handles but never talks to the
//! scene itself.

use std::collections::{HashMap, HashSet};

use super::scene::ShapeHandle;
use super::types::{EdgeKey, Node, NodeId, Point};

/// Live drawable state of a node.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeVisual {
	pub shape: ShapeHandle,
	pub width: f64,
	/// Where the box is currently drawn.
	pub position: Point,
	/// Set from insertion until the first transition has revealed the box.
	pub entering: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NodeEntry {
	pub node: Node,
	pub visual: NodeVisual,
}

#[derive(Clone, Debug, PartialEq)]
pub struct EdgeEntry {
	pub key: EdgeKey,
	pub shape: ShapeHandle,
}

/// What an in-place node update changed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NodeChange {
	pub relabeled: bool,
	pub moved: bool,
	pub visibility: bool,
}

#[derive(Debug, Default)]
pub struct GraphStore {
	nodes: Vec<NodeEntry>,
	node_index: HashMap<NodeId, usize>,
	edges: Vec<EdgeEntry>,
	edge_index: HashMap<EdgeKey, usize>,
	pending: HashSet<NodeId>,
}

impl GraphStore {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn node(&self, id: &str) -> Option<&NodeEntry> {
		self.node_index.get(id).map(|&i| &self.nodes[i])
	}

	pub fn node_mut(&mut self, id: &str) -> Option<&mut NodeEntry> {
		self.node_index.get(id).map(|&i| &mut self.nodes[i])
	}

	pub fn contains_node(&self, id: &str) -> bool {
		self.node_index.contains_key(id)
	}

	pub fn nodes(&self) -> impl Iterator<Item = &NodeEntry> {
		self.nodes.iter()
	}

	pub fn nodes_mut(&mut self) -> impl Iterator<Item = &mut NodeEntry> {
		self.nodes.iter_mut()
	}

	pub fn node_count(&self) -> usize {
		self.nodes.len()
	}

	/// Add a node that is not yet present and queue it for the next commit.
	pub fn insert_node(&mut self, entry: NodeEntry) {
		let id = entry.node.id.clone();
		if let Some(&i) = self.node_index.get(&id) {
			self.nodes[i] = entry;
		} else {
			self.node_index.insert(id.clone(), self.nodes.len());
			self.nodes.push(entry);
		}
		self.pending.insert(id);
	}

	/// Replace the caller-owned fields of an existing node. A coordinate change
	/// queues the node for the next commit.
	pub fn update_node(
		&mut self,
		id: &str,
		label: &str,
		row: i32,
		col: i32,
		invisible: bool,
	) -> Option<NodeChange> {
		let entry = self.node_mut(id)?;
		let node = &mut entry.node;
		let change = NodeChange {
			relabeled: node.label != label,
			moved: node.row != row || node.col != col,
			visibility: node.invisible != invisible,
		};
		if change.relabeled {
			node.label = label.to_owned();
		}
		node.row = row;
		node.col = col;
		node.invisible = invisible;
		if change.moved {
			self.pending.insert(id.to_owned());
		}
		Some(change)
	}

	/// Detach a node from every lookup. Edges referencing it are kept.
	pub fn remove_node(&mut self, id: &str) -> Option<NodeEntry> {
		let i = self.node_index.remove(id)?;
		let entry = self.nodes.remove(i);
		for idx in self.node_index.values_mut() {
			if *idx > i {
				*idx -= 1;
			}
		}
		self.pending.remove(id);
		Some(entry)
	}

	pub fn edge(&self, key: &EdgeKey) -> Option<&EdgeEntry> {
		self.edge_index.get(key).map(|&i| &self.edges[i])
	}

	pub fn contains_edge(&self, key: &EdgeKey) -> bool {
		self.edge_index.contains_key(key)
	}

	pub fn edges(&self) -> impl Iterator<Item = &EdgeEntry> {
		self.edges.iter()
	}

	/// Insert an edge, replacing any edge with the same ordered pair in place.
	/// Returns the replaced entry.
	pub fn insert_edge(&mut self, entry: EdgeEntry) -> Option<EdgeEntry> {
		if let Some(&i) = self.edge_index.get(&entry.key) {
			return Some(std::mem::replace(&mut self.edges[i], entry));
		}
		self.edge_index.insert(entry.key.clone(), self.edges.len());
		self.edges.push(entry);
		None
	}

	pub fn remove_edge(&mut self, key: &EdgeKey) -> Option<EdgeEntry> {
		let i = self.edge_index.remove(key)?;
		let entry = self.edges.remove(i);
		for idx in self.edge_index.values_mut() {
			if *idx > i {
				*idx -= 1;
			}
		}
		Some(entry)
	}

	/// Edges leaving `id`, in insertion order.
	pub fn outgoing<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a EdgeKey> + 'a {
		self.edges.iter().map(|e| &e.key).filter(move |k| k.from == id)
	}

	/// Edges entering `id`, in insertion order.
	pub fn incoming<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a EdgeKey> + 'a {
		self.edges.iter().map(|e| &e.key).filter(move |k| k.to == id)
	}

	pub fn mark_all_pending(&mut self) {
		self.pending.extend(self.node_index.keys().cloned());
	}

	/// Whether the node has layout changes not yet committed.
	pub fn is_pending(&self, id: &str) -> bool {
		self.pending.contains(id)
	}

	/// Drain the pending set in table order.
	pub fn take_pending(&mut self) -> Vec<NodeId> {
		let pending = std::mem::take(&mut self.pending);
		self.nodes
			.iter()
			.map(|e| &e.node.id)
			.filter(|id| pending.contains(*id))
			.cloned()
			.collect()
	}
}
