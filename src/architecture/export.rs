//! Downloadable snapshot of a laid-out graph.
//!
//! The JSON field names are relied on by consumers of exported files; add fields,
//! never rename or remove them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::{ArchitectureError, Result};
use super::types::{BuildStats, Category, GraphEdge, GraphNode, NodeKind};

/// A node as handed to renderers and exports.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeView {
	/// Node id.
	pub id: String,
	/// Display name.
	pub name: String,
	/// Category.
	pub category: Category,
	/// Centre x.
	pub x: f64,
	/// Centre y.
	pub y: f64,
	/// Width.
	pub width: f64,
	/// Height.
	pub height: f64,
	/// Member count, groups only.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub member_count: Option<usize>,
	/// Member paths, groups only.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub member_paths: Option<Vec<String>>,
}

impl From<&GraphNode> for NodeView {
	fn from(node: &GraphNode) -> Self {
		let members = match &node.kind {
			NodeKind::Group { members } => Some(members.clone()),
			NodeKind::File { .. } => None,
		};
		Self {
			id: node.id.clone(),
			name: node.name.clone(),
			category: node.category,
			x: node.x,
			y: node.y,
			width: node.width,
			height: node.height,
			member_count: members.as_ref().map(Vec::len),
			member_paths: members,
		}
	}
}

/// An edge as handed to renderers and exports.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeView {
	/// Importing node id.
	pub from_id: String,
	/// Imported node id.
	pub to_id: String,
}

impl From<&GraphEdge> for EdgeView {
	fn from(edge: &GraphEdge) -> Self {
		Self {
			from_id: edge.from.clone(),
			to_id: edge.to.clone(),
		}
	}
}

/// Export document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
	/// Nodes with their current positions.
	pub nodes: Vec<NodeView>,
	/// Edges.
	pub edges: Vec<EdgeView>,
	/// Capture time.
	pub timestamp: DateTime<Utc>,
	/// Build counters.
	pub stats: BuildStats,
}

impl Snapshot {
	/// Snapshot taken now.
	pub fn capture(nodes: &[GraphNode], edges: &[GraphEdge], stats: &BuildStats) -> Self {
		Self::at(nodes, edges, stats, Utc::now())
	}

	/// Snapshot with an explicit timestamp.
	pub fn at(
		nodes: &[GraphNode],
		edges: &[GraphEdge],
		stats: &BuildStats,
		timestamp: DateTime<Utc>,
	) -> Self {
		Self {
			nodes: nodes.iter().map(NodeView::from).collect(),
			edges: edges.iter().map(EdgeView::from).collect(),
			timestamp,
			stats: stats.clone(),
		}
	}

	/// Pretty-printed JSON.
	pub fn to_json(&self) -> Result<String> {
		serde_json::to_string_pretty(self).map_err(ArchitectureError::Export)
	}
}

#[cfg(test)]
mod tests {
	use chrono::TimeZone;
	use serde_json::{Value, json};

	use super::*;

	fn node(id: &str, kind: NodeKind) -> GraphNode {
		GraphNode {
			id: id.into(),
			name: id.into(),
			category: Category::Utility,
			level: 3,
			x: 10.0,
			y: 20.0,
			vx: 1.0,
			vy: 1.0,
			width: 140.0,
			height: 44.0,
			kind,
		}
	}

	#[test]
	fn field_names_are_stable() {
		let nodes = vec![
			node(
				"file:src/a.ts",
				NodeKind::File {
					path: "src/a.ts".into(),
					size_bytes: 3,
					importance: 7,
				},
			),
			node(
				"group:utility",
				NodeKind::Group {
					members: vec!["src/b.ts".into()],
				},
			),
		];
		let edges = vec![GraphEdge {
			from: "file:src/a.ts".into(),
			to: "group:utility".into(),
		}];
		let ts = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
		let snapshot = Snapshot::at(&nodes, &edges, &BuildStats::default(), ts);
		let value: Value = serde_json::from_str(&snapshot.to_json().unwrap()).unwrap();

		assert_eq!(value["timestamp"], json!("2024-05-01T12:00:00Z"));
		assert_eq!(value["edges"][0], json!({ "fromId": "file:src/a.ts", "toId": "group:utility" }));
		assert!(value["nodes"][0].get("memberCount").is_none());
		assert_eq!(value["nodes"][1]["memberCount"], json!(1));
		assert_eq!(value["nodes"][1]["memberPaths"], json!(["src/b.ts"]));
		assert_eq!(value["nodes"][1]["category"], json!("Utility"));
		for key in ["id", "name", "category", "x", "y", "width", "height"] {
			assert!(value["nodes"][0].get(key).is_some(), "missing {key}");
		}
		for key in ["totalFiles", "groupNodes", "unreadableFiles", "edges"] {
			assert!(value["stats"].get(key).is_some(), "missing stats.{key}");
		}
	}

	#[test]
	fn snapshot_reads_back() {
		let ts = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
		let snapshot = Snapshot::at(&[], &[], &BuildStats::default(), ts);
		let back: Snapshot = serde_json::from_str(&snapshot.to_json().unwrap()).unwrap();
		assert_eq!(back, snapshot);
	}
}
