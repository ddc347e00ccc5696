//! Turns a file batch into a bounded architecture graph.

use std::collections::{BTreeMap, HashMap, HashSet};

use futures::future::join_all;
use log::{debug, warn};
use serde::Deserialize;

use super::classifier::{Classification, classify};
use super::error::ArchitectureError;
use super::imports::{ImportResolver, KnownPaths, ResolverConfig, extract_imports};
use super::types::{
	ArchitectureGraph, BuildStats, Category, GraphEdge, GraphNode, NodeKind, ResolvedImport,
	SourceFile,
};

/// Size of a single-file node.
pub const FILE_NODE_SIZE: (f64, f64) = (140.0, 44.0);
/// Size of a group node.
pub const GROUP_NODE_SIZE: (f64, f64) = (170.0, 56.0);

/// How many files of each category get their own node.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct DisplayPolicy {
	/// Individual page nodes before grouping.
	pub page_limit: usize,
	/// Individual service nodes before grouping.
	pub service_limit: usize,
	/// Individual component nodes before grouping.
	pub component_limit: usize,
	/// Files below this importance are not scanned for imports.
	pub scan_threshold: u8,
}

impl Default for DisplayPolicy {
	fn default() -> Self {
		Self {
			page_limit: 10,
			service_limit: 10,
			component_limit: 8,
			scan_threshold: 5,
		}
	}
}

impl DisplayPolicy {
	/// Individual node allowance; `0` means always grouped.
	pub fn limit(&self, category: Category) -> usize {
		match category {
			Category::Page => self.page_limit,
			Category::Service => self.service_limit,
			Category::Component => self.component_limit,
			_ => 0,
		}
	}
}

struct Classified<'a> {
	file: &'a SourceFile,
	class: Classification,
}

/// Builds graphs from file batches.
///
/// The builder carries no state between builds; two builders (or two builds) never
/// share anything.
#[derive(Clone, Debug, Default)]
pub struct GraphBuilder {
	resolver: ImportResolver,
	policy: DisplayPolicy,
}

impl GraphBuilder {
	/// Builder with explicit resolver rules and display policy.
	pub fn new(resolver: ResolverConfig, policy: DisplayPolicy) -> Self {
		Self {
			resolver: ImportResolver::new(resolver),
			policy,
		}
	}

	/// Build nodes and edges for `files`.
	///
	/// Files whose text cannot be read are logged and left out of the import scan;
	/// the graph is built from whatever was read successfully.
	pub async fn build(&self, files: &[SourceFile]) -> ArchitectureGraph {
		let mut stats = BuildStats {
			total_files: files.len(),
			..Default::default()
		};

		let classified: Vec<Classified> = files
			.iter()
			.map(|file| Classified {
				file,
				class: classify(&file.path),
			})
			.collect();

		let (nodes, owner) = self.group_nodes(&classified);
		stats.individual_nodes = nodes.iter().filter(|n| !n.is_group()).count();
		stats.group_nodes = nodes.len() - stats.individual_nodes;

		let imports = self.scan_imports(&classified, &mut stats).await;
		stats.resolved_imports = imports.len();

		let edges = map_edges(&imports, &owner);
		stats.edges = edges.len();

		debug!(
			"built graph: {} files -> {} nodes, {} edges ({} unreadable)",
			stats.total_files,
			nodes.len(),
			edges.len(),
			stats.unreadable_files
		);

		ArchitectureGraph {
			nodes,
			edges,
			stats,
		}
	}

	/// Nodes per category plus the path → node id lookup.
	fn group_nodes(&self, classified: &[Classified]) -> (Vec<GraphNode>, HashMap<String, String>) {
		let mut by_category: BTreeMap<Category, Vec<&Classified>> = BTreeMap::new();
		for entry in classified {
			by_category.entry(entry.class.category).or_default().push(entry);
		}

		let mut nodes = Vec::new();
		let mut owner = HashMap::new();

		for (category, mut entries) in by_category {
			let limit = self.policy.limit(category);
			entries.sort_by(|a, b| {
				b.class
					.importance
					.cmp(&a.class.importance)
					.then(b.file.size_bytes.cmp(&a.file.size_bytes))
					.then(a.file.path.cmp(&b.file.path))
			});
			let split = limit.min(entries.len());
			let (singles, rest) = entries.split_at(split);

			for entry in singles {
				let node = file_node(entry);
				owner.insert(entry.file.path.clone(), node.id.clone());
				nodes.push(node);
			}

			if !rest.is_empty() {
				let mut members: Vec<&Classified> = rest.to_vec();
				members.sort_by(|a, b| a.file.path.cmp(&b.file.path));
				let node = group_node(category, &members);
				for entry in &members {
					owner.insert(entry.file.path.clone(), node.id.clone());
				}
				nodes.push(node);
			}
		}

		(nodes, owner)
	}

	/// Read eligible files concurrently and resolve their imports.
	async fn scan_imports(
		&self,
		classified: &[Classified<'_>],
		stats: &mut BuildStats,
	) -> Vec<ResolvedImport> {
		let known: KnownPaths = classified.iter().map(|c| c.file.path.clone()).collect();
		let eligible: Vec<&SourceFile> = classified
			.iter()
			.filter(|c| c.class.importance >= self.policy.scan_threshold)
			.map(|c| c.file)
			.collect();
		stats.scanned_files = eligible.len();

		let reads = join_all(eligible.iter().copied().map(|file| async move {
			let text = file.text.read_text().await;
			(file, text)
		}))
		.await;

		let mut resolved = Vec::new();
		for (file, text) in reads {
			let content = match text {
				Ok(content) => content,
				Err(source) => {
					let err = ArchitectureError::UnreadableFile {
						path: file.path.clone(),
						source,
					};
					warn!("skipping import scan: {err}");
					stats.unreadable_files += 1;
					continue;
				}
			};

			for raw in extract_imports(&content) {
				if let Some(to_path) = self.resolver.resolve(&file.path, &raw, &known) {
					resolved.push(ResolvedImport {
						from_path: file.path.clone(),
						to_path,
					});
				}
			}
		}
		resolved
	}
}

fn file_node(entry: &Classified) -> GraphNode {
	let (width, height) = FILE_NODE_SIZE;
	GraphNode {
		id: format!("file:{}", entry.file.path),
		name: entry.file.name.clone(),
		category: entry.class.category,
		level: entry.class.category.level(),
		x: 0.0,
		y: 0.0,
		vx: 0.0,
		vy: 0.0,
		width,
		height,
		kind: NodeKind::File {
			path: entry.file.path.clone(),
			size_bytes: entry.file.size_bytes,
			importance: entry.class.importance,
		},
	}
}

fn group_node(category: Category, members: &[&Classified]) -> GraphNode {
	let (width, height) = GROUP_NODE_SIZE;
	GraphNode {
		id: format!("group:{}", category.key()),
		name: format!("{} ({})", category.label(), members.len()),
		category,
		level: category.level(),
		x: 0.0,
		y: 0.0,
		vx: 0.0,
		vy: 0.0,
		width,
		height,
		kind: NodeKind::Group {
			members: members.iter().map(|m| m.file.path.clone()).collect(),
		},
	}
}

/// Map file-level imports onto node ids, dropping self edges and duplicates.
fn map_edges(imports: &[ResolvedImport], owner: &HashMap<String, String>) -> Vec<GraphEdge> {
	let mut seen = HashSet::new();
	let mut edges = Vec::new();
	for import in imports {
		let (Some(from), Some(to)) = (owner.get(&import.from_path), owner.get(&import.to_path))
		else {
			continue;
		};
		if from == to || !seen.insert((from.clone(), to.clone())) {
			continue;
		}
		edges.push(GraphEdge {
			from: from.clone(),
			to: to.clone(),
		});
	}
	edges
}
