use std::collections::HashSet;

use crate::architecture::config::ArchitectureConfig;
use crate::architecture::export::Snapshot;
use crate::architecture::simulation::{LayoutState, step};
use crate::architecture::types::{ArchitectureGraph, Category, NodeDetails, Viewport};

/// Fill colour of a category.
pub fn category_color(category: Category) -> &'static str {
	match category {
		Category::Page => "#1f77b4",
		Category::Service => "#ff7f0e",
		Category::Component => "#2ca02c",
		Category::Utility => "#9467bd",
		Category::Types => "#17becf",
		Category::Styles => "#e377c2",
		Category::Config => "#7f7f7f",
		Category::Dependencies => "#8c564b",
		Category::Tests => "#bcbd22",
		Category::Other => "#d62728",
	}
}

#[derive(Clone, Debug, Default)]
pub struct HoverState {
	pub node: Option<usize>,
	pub neighbors: HashSet<usize>,
	pub highlight_t: f64,
}

/// View-side state of one mounted canvas: the layout plus hover and selection.
pub struct ForceGraphState {
	pub layout: LayoutState,
	pub hover: HoverState,
	pub selected: Option<usize>,
	pub animation_running: bool,
	pub flow_time: f64,
}

impl ForceGraphState {
	pub fn new(graph: ArchitectureGraph, width: f64, height: f64, config: &ArchitectureConfig) -> Self {
		let layout = LayoutState::new(
			graph,
			Viewport::new(width, height),
			&config.seed,
			config.simulation.clone(),
		);
		Self {
			layout,
			hover: HoverState::default(),
			selected: None,
			animation_running: true,
			flow_time: 0.0,
		}
	}

	/// Replace the graph after a new build, keeping the canvas size. Positions are
	/// reseeded and hover/selection dropped; returns whether a selection was cleared.
	pub fn rebuild(&mut self, graph: ArchitectureGraph, config: &ArchitectureConfig) -> bool {
		let had_selection = self.selected.is_some();
		*self = Self::new(graph, self.width(), self.height(), config);
		had_selection
	}

	pub fn width(&self) -> f64 {
		self.layout.viewport.width
	}

	pub fn height(&self) -> f64 {
		self.layout.viewport.height
	}

	pub fn set_hover(&mut self, node: Option<usize>) {
		if self.hover.node == node {
			return;
		}
		self.hover.node = node;
		self.hover.neighbors.clear();
		if let Some(idx) = node {
			for &(src, tgt) in &self.layout.links {
				if src == idx {
					self.hover.neighbors.insert(tgt);
				} else if tgt == idx {
					self.hover.neighbors.insert(src);
				}
			}
		}
	}

	pub fn is_highlighted(&self, idx: usize) -> bool {
		self.hover.node == Some(idx) || self.hover.neighbors.contains(&idx)
	}

	/// Press on the canvas: grab and select the node under the pointer, or clear the
	/// selection when the press lands on empty space.
	pub fn press(&mut self, x: f64, y: f64) -> Option<NodeDetails> {
		if self.layout.press(x, y) {
			self.selected = self.layout.dragged();
		} else if self.layout.dragged().is_none() {
			self.selected = None;
		}
		self.selected_details()
	}

	pub fn selected_details(&self) -> Option<NodeDetails> {
		let node = self.layout.graph.nodes.get(self.selected?)?;
		self.layout.graph.details(&node.id)
	}

	pub fn snapshot(&self) -> Snapshot {
		let graph = &self.layout.graph;
		Snapshot::capture(&graph.nodes, &graph.edges, &graph.stats)
	}

	pub fn tick(&mut self, dt: f64) {
		self.layout = step(std::mem::take(&mut self.layout), dt);
		self.flow_time += dt;

		let target = if self.hover.node.is_some() { 1.0 } else { 0.0 };
		self.hover.highlight_t += (target - self.hover.highlight_t) * 1.8 * dt;
		if self.hover.node.is_none() && self.hover.highlight_t < 0.01 {
			self.hover.highlight_t = 0.0;
		}
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.layout.resize(width, height);
	}
}

#[cfg(test)]
mod tests {
	use futures::executor::block_on;

	use super::*;
	use crate::architecture::types::SourceFile;

	fn state() -> ForceGraphState {
		let files = vec![
			SourceFile::inline("src/pages/Home.tsx", "import B from '../components/Button';"),
			SourceFile::inline("src/components/Button.tsx", ""),
			SourceFile::inline("README.md", ""),
		];
		let graph = block_on(ArchitectureConfig::default().builder().build(&files));
		ForceGraphState::new(graph, 800.0, 600.0, &ArchitectureConfig::default())
	}

	#[test]
	fn hover_collects_neighbors() {
		let mut s = state();
		s.set_hover(Some(0));
		assert!(s.is_highlighted(0));
		assert!(s.is_highlighted(1));
		assert!(!s.is_highlighted(2));
	}

	#[test]
	fn pressing_a_node_selects_it() {
		let mut s = state();
		let (x, y) = (s.layout.graph.nodes[0].x, s.layout.graph.nodes[0].y);
		let details = s.press(x, y).expect("selected");
		assert_eq!(details.id, "file:src/pages/Home.tsx");
		assert_eq!(details.connections, 1);

		s.layout.release();
		assert!(s.press(-50.0, -50.0).is_none());
	}

	#[test]
	fn rebuild_clears_selection_and_keeps_size() {
		let mut s = state();
		s.resize(1024.0, 768.0);
		let (x, y) = (s.layout.graph.nodes[1].x, s.layout.graph.nodes[1].y);
		assert!(s.press(x, y).is_some());
		s.layout.release();

		let graph = s.layout.graph.clone();
		assert!(s.rebuild(graph.clone(), &ArchitectureConfig::default()));
		assert_eq!(s.selected, None);
		assert!(s.selected_details().is_none());
		assert_eq!((s.width(), s.height()), (1024.0, 768.0));

		assert!(!s.rebuild(graph, &ArchitectureConfig::default()));
	}

	#[test]
	fn tick_advances_layout() {
		let mut s = state();
		s.tick(1.0 / 60.0);
		assert_eq!(s.layout.ticks, 1);
		assert_eq!(s.snapshot().nodes.len(), 3);
	}
}
