use codebase_atlas::architecture::simulation::FRAME;
use codebase_atlas::architecture::{
	ArchitectureGraph, BuildStats, Category, GraphBuilder, GraphEdge, GraphNode, LayoutState,
	NodeKind, SeedParameters, SimulationParameters, SourceFile, Viewport, step,
};
use futures::executor::block_on;
use proptest::prelude::*;

fn page_chain() -> ArchitectureGraph {
	let files: Vec<SourceFile> = (0..5)
		.map(|i| {
			let content = if i < 4 {
				format!("import next from './Step{}';", i + 1)
			} else {
				String::new()
			};
			SourceFile::inline(format!("src/pages/Step{i}.tsx"), content)
		})
		.collect();
	block_on(GraphBuilder::default().build(&files))
}

#[test]
fn chain_graph_has_expected_shape() {
	let graph = page_chain();
	assert_eq!(graph.nodes.len(), 5);
	assert_eq!(graph.edges.len(), 4);
	assert!(graph.nodes.iter().all(|n| n.level == 1));
}

#[test]
fn five_node_chain_comes_to_rest() {
	let mut state = LayoutState::new(
		page_chain(),
		Viewport::new(1024.0, 768.0),
		&SeedParameters::default(),
		SimulationParameters::default(),
	);

	let mut rest_tick = None;
	for tick in 0..6000 {
		state = step(state, FRAME);
		if state.last_displacement < 0.05 {
			rest_tick = Some(tick);
			break;
		}
	}
	assert!(
		rest_tick.is_some(),
		"displacement after 6000 ticks: {}",
		state.last_displacement
	);

	for _ in 0..600 {
		state = step(state, FRAME);
	}
	assert!(state.last_displacement < 0.05, "{}", state.last_displacement);
}

#[test]
fn rebuild_discards_positions() {
	let viewport = Viewport::new(800.0, 600.0);
	let seeded = LayoutState::new(
		page_chain(),
		viewport,
		&SeedParameters::default(),
		SimulationParameters::default(),
	);
	let mut moved = seeded.clone();
	for _ in 0..120 {
		moved = step(moved, FRAME);
	}

	let reseeded = LayoutState::new(
		page_chain(),
		viewport,
		&SeedParameters::default(),
		SimulationParameters::default(),
	);
	let positions = |s: &LayoutState| -> Vec<(f64, f64)> {
		s.graph.nodes.iter().map(|n| (n.x, n.y)).collect()
	};
	assert_eq!(positions(&seeded), positions(&reseeded));
	assert_ne!(positions(&seeded), positions(&moved));
}

fn node(i: usize, x: f64, y: f64, vx: f64, vy: f64, group: bool) -> GraphNode {
	let (width, height, kind) = if group {
		(
			170.0,
			56.0,
			NodeKind::Group {
				members: vec![format!("g{i}")],
			},
		)
	} else {
		(
			140.0,
			44.0,
			NodeKind::File {
				path: format!("f{i}"),
				size_bytes: 0,
				importance: 3,
			},
		)
	};
	GraphNode {
		id: format!("n{i}"),
		name: format!("n{i}"),
		category: Category::Other,
		level: 3,
		x,
		y,
		vx,
		vy,
		width,
		height,
		kind,
	}
}

proptest! {
	#![proptest_config(ProptestConfig::with_cases(64))]

	#[test]
	fn positions_stay_within_bounds(
		raw in prop::collection::vec(
			(-2000.0..3000.0f64, -2000.0..3000.0f64, -500.0..500.0f64, -500.0..500.0f64, any::<bool>()),
			1..24,
		),
		links in prop::collection::vec((0usize..24, 0usize..24), 0..40),
		width in 200.0..1600.0f64,
		height in 150.0..1200.0f64,
		drag in prop::option::of((0usize..24, -1000.0..3000.0f64, -1000.0..3000.0f64)),
	) {
		let nodes: Vec<GraphNode> = raw
			.iter()
			.enumerate()
			.map(|(i, &(x, y, vx, vy, group))| node(i, x, y, vx, vy, group))
			.collect();
		let n = nodes.len();
		let edges = links
			.iter()
			.filter(|(a, b)| *a < n && *b < n && a != b)
			.map(|&(a, b)| GraphEdge { from: format!("n{a}"), to: format!("n{b}") })
			.collect();
		let graph = ArchitectureGraph { nodes, edges, stats: BuildStats::default() };
		let mut state = LayoutState::from_positions(
			graph,
			Viewport::new(width, height),
			SimulationParameters::default(),
		);
		if let Some((idx, cx, cy)) = drag {
			let target = &state.graph.nodes[idx % n];
			let (x, y) = (target.x, target.y);
			if state.press(x, y) {
				state.drag_to(cx, cy);
			}
		}

		for _ in 0..30 {
			state = step(state, FRAME);
			for node in &state.graph.nodes {
				let (hw, hh) = (node.width / 2.0, node.height / 2.0);
				prop_assert!(node.x >= hw - 1e-9 && node.x <= width - hw + 1e-9, "x {} of {}", node.x, width);
				prop_assert!(node.y >= hh - 1e-9 && node.y <= height - hh + 1e-9, "y {} of {}", node.y, height);
			}
		}
	}
}
