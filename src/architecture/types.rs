use std::fmt;
use std::rc::Rc;

use futures::future::{self, LocalBoxFuture};
use serde::{Deserialize, Serialize};

use super::error::ReadError;

/// Lazy accessor for a file's text, supplied by whoever ingested the batch.
pub trait TextProvider {
	/// Fetch the full text of the file.
	fn read_text(&self) -> LocalBoxFuture<'_, Result<String, ReadError>>;
}

/// Text that is already in memory.
#[derive(Clone, Debug, Default)]
pub struct InlineText(pub String);

impl TextProvider for InlineText {
	fn read_text(&self) -> LocalBoxFuture<'_, Result<String, ReadError>> {
		Box::pin(future::ready(Ok(self.0.clone())))
	}
}

/// One file of an uploaded batch.
#[derive(Clone)]
pub struct SourceFile {
	/// Batch-relative, forward-slash separated path.
	pub path: String,
	/// File name (last path segment).
	pub name: String,
	/// Size in bytes as reported by the ingestion side.
	pub size_bytes: u64,
	/// Lazy content accessor.
	pub text: Rc<dyn TextProvider>,
}

impl SourceFile {
	/// Create a file entry, deriving `name` from the path.
	pub fn new(path: impl Into<String>, size_bytes: u64, text: Rc<dyn TextProvider>) -> Self {
		let path = normalize_path(&path.into());
		let name = file_name(&path).to_string();
		Self {
			path,
			name,
			size_bytes,
			text,
		}
	}

	/// Convenience constructor for files whose text is already loaded.
	pub fn inline(path: impl Into<String>, content: impl Into<String>) -> Self {
		let content = content.into();
		let size = content.len() as u64;
		Self::new(path, size, Rc::new(InlineText(content)))
	}
}

impl fmt::Debug for SourceFile {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("SourceFile")
			.field("path", &self.path)
			.field("size_bytes", &self.size_bytes)
			.finish_non_exhaustive()
	}
}

/// Backslashes become forward slashes and a leading `./` is dropped.
pub fn normalize_path(path: &str) -> String {
	let path = path.replace('\\', "/");
	path.trim_start_matches("./").to_string()
}

/// Last segment of a forward-slash path.
pub fn file_name(path: &str) -> &str {
	path.rsplit('/').next().unwrap_or(path)
}

/// Architectural role of a file.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
	/// Routes and pages.
	Page,
	/// API clients and service layers.
	Service,
	/// UI components.
	Component,
	/// Hooks, helpers and shared libraries.
	Utility,
	/// Type and interface declarations.
	Types,
	/// Stylesheets.
	Styles,
	/// Configuration and settings.
	Config,
	/// Vendored or version-control content.
	Dependencies,
	/// Test files.
	Tests,
	/// Everything else.
	Other,
}

impl Category {
	/// Fixed importance score of the category (1-9).
	pub fn importance(self) -> u8 {
		match self {
			Category::Page => 9,
			Category::Service | Category::Component => 8,
			Category::Utility => 7,
			Category::Types => 5,
			Category::Styles => 4,
			Category::Tests | Category::Other => 3,
			Category::Config => 2,
			Category::Dependencies => 1,
		}
	}

	/// Ring the category is seeded on.
	pub fn level(self) -> u8 {
		match self {
			Category::Page | Category::Service => 1,
			Category::Component => 2,
			_ => 3,
		}
	}

	/// Lower-case key used in node ids.
	pub fn key(self) -> &'static str {
		match self {
			Category::Page => "page",
			Category::Service => "service",
			Category::Component => "component",
			Category::Utility => "utility",
			Category::Types => "types",
			Category::Styles => "styles",
			Category::Config => "config",
			Category::Dependencies => "dependencies",
			Category::Tests => "tests",
			Category::Other => "other",
		}
	}

	/// Plural label shown on group nodes.
	pub fn label(self) -> &'static str {
		match self {
			Category::Page => "Pages",
			Category::Service => "Services",
			Category::Component => "Components",
			Category::Utility => "Utilities",
			Category::Types => "Types",
			Category::Styles => "Styles",
			Category::Config => "Config",
			Category::Dependencies => "Dependencies",
			Category::Tests => "Tests",
			Category::Other => "Other",
		}
	}
}

impl fmt::Display for Category {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.label())
	}
}

/// A static import whose target was found in the batch.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ResolvedImport {
	/// Importing file.
	pub from_path: String,
	/// Imported file.
	pub to_path: String,
}

/// What a graph node stands for.
#[derive(Clone, Debug, PartialEq)]
pub enum NodeKind {
	/// Exactly one file.
	File {
		/// Path of the file.
		path: String,
		/// Reported size.
		size_bytes: u64,
		/// Importance score.
		importance: u8,
	},
	/// Several same-category files collapsed together.
	Group {
		/// Member paths in batch order.
		members: Vec<String>,
	},
}

/// A node of the architecture graph.
#[derive(Clone, Debug, PartialEq)]
pub struct GraphNode {
	/// Stable id (`file:<path>` or `group:<category>`).
	pub id: String,
	/// Display name.
	pub name: String,
	/// Category shared by every member.
	pub category: Category,
	/// Seeding ring.
	pub level: u8,
	/// Centre x.
	pub x: f64,
	/// Centre y.
	pub y: f64,
	/// Velocity x.
	pub vx: f64,
	/// Velocity y.
	pub vy: f64,
	/// Fixed width.
	pub width: f64,
	/// Fixed height.
	pub height: f64,
	/// File or group payload.
	pub kind: NodeKind,
}

impl GraphNode {
	/// Number of files represented by this node.
	pub fn member_count(&self) -> usize {
		match &self.kind {
			NodeKind::File { .. } => 1,
			NodeKind::Group { members } => members.len(),
		}
	}

	/// Paths of every file represented by this node.
	pub fn member_paths(&self) -> Vec<&str> {
		match &self.kind {
			NodeKind::File { path, .. } => vec![path.as_str()],
			NodeKind::Group { members } => members.iter().map(String::as_str).collect(),
		}
	}

	/// Whether this is a group node.
	pub fn is_group(&self) -> bool {
		matches!(self.kind, NodeKind::Group { .. })
	}
}

/// A directed dependency between two nodes.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct GraphEdge {
	/// Importing node id.
	pub from: String,
	/// Imported node id.
	pub to: String,
}

/// Counters collected while building a graph.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildStats {
	/// Files in the batch.
	pub total_files: usize,
	/// Single-file nodes.
	pub individual_nodes: usize,
	/// Group nodes.
	pub group_nodes: usize,
	/// Files whose imports were scanned.
	pub scanned_files: usize,
	/// Files whose content could not be read.
	pub unreadable_files: usize,
	/// Imports resolved to a file in the batch.
	pub resolved_imports: usize,
	/// Edges after mapping to nodes.
	pub edges: usize,
}

/// Nodes and edges produced from one batch.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ArchitectureGraph {
	/// Graph nodes.
	pub nodes: Vec<GraphNode>,
	/// Graph edges.
	pub edges: Vec<GraphEdge>,
	/// Build counters.
	pub stats: BuildStats,
}

impl ArchitectureGraph {
	/// Edges that start or end at `id`.
	pub fn connection_count(&self, id: &str) -> usize {
		self.edges
			.iter()
			.filter(|e| e.from == id || e.to == id)
			.count()
	}

	/// Side-panel payload for a node.
	pub fn details(&self, id: &str) -> Option<NodeDetails> {
		let node = self.nodes.iter().find(|n| n.id == id)?;
		Some(NodeDetails {
			id: node.id.clone(),
			name: node.name.clone(),
			category: node.category,
			member_count: node.member_count(),
			member_paths: node.member_paths().into_iter().map(String::from).collect(),
			connections: self.connection_count(id),
		})
	}
}

/// Details about a selected node.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDetails {
	/// Node id.
	pub id: String,
	/// Display name.
	pub name: String,
	/// Category.
	pub category: Category,
	/// Files represented.
	pub member_count: usize,
	/// Paths represented.
	pub member_paths: Vec<String>,
	/// Incoming plus outgoing edges.
	pub connections: usize,
}

/// Size of the drawing surface.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
	/// Width in canvas units.
	pub width: f64,
	/// Height in canvas units.
	pub height: f64,
}

impl Viewport {
	/// Create a viewport.
	pub fn new(width: f64, height: f64) -> Self {
		Self { width, height }
	}

	/// Canvas centre.
	pub fn center(&self) -> (f64, f64) {
		(self.width / 2.0, self.height / 2.0)
	}
}

impl Default for Viewport {
	fn default() -> Self {
		Self::new(800.0, 600.0)
	}
}
