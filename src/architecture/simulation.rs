//! Force-directed relaxation of node positions.
//!
//! [`step`] is a pure function of the layout state; frame scheduling is left to the
//! caller, which ticks it once per animation frame for as long as a view is mounted.
//! There is no fixed point detection.

use std::collections::HashMap;
use std::f64::consts::PI;

use serde::Deserialize;

use super::seed::{SeedParameters, seed_layout};
use super::types::{ArchitectureGraph, Viewport};

/// Length of one nominal frame in seconds.
pub const FRAME: f64 = 1.0 / 60.0;
const MAX_FRAME_SCALE: f64 = 3.0;
/// Closer pairs repel as if they were this far apart.
const MIN_DISTANCE: f64 = 5.0;
/// Pairs closer than this get a fixed separation direction.
const COINCIDENT: f64 = 0.01;
/// Width of the band below the interaction radius over which repulsion fades out.
const CUTOFF_BAND: f64 = 5.0;

/// Physics constants.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct SimulationParameters {
	/// Spring constant toward the canvas centre.
	pub center_pull: f64,
	/// Pairwise repulsion strength.
	pub repulsion: f64,
	/// Pairs further apart than this do not repel.
	pub repulsion_radius: f64,
	/// Edge spring constant.
	pub spring: f64,
	/// Edge rest length.
	pub spring_length: f64,
	/// Velocity multiplier applied every tick.
	pub damping: f64,
}

impl Default for SimulationParameters {
	fn default() -> Self {
		Self {
			center_pull: 0.001,
			repulsion: 1500.0,
			repulsion_radius: 100.0,
			spring: 0.05,
			spring_length: 80.0,
			damping: 0.9,
		}
	}
}

/// Pointer interaction with a node.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum DragState {
	/// No node is held.
	#[default]
	Idle,
	/// One node follows the pointer.
	Dragging {
		/// Index of the held node.
		node: usize,
		/// Node centre minus cursor at grab time.
		offset_x: f64,
		/// Node centre minus cursor at grab time.
		offset_y: f64,
		/// Latest cursor x.
		cursor_x: f64,
		/// Latest cursor y.
		cursor_y: f64,
	},
}

impl DragState {
	/// Node being dragged and where it is pinned.
	pub fn pin(&self) -> Option<(usize, f64, f64)> {
		match *self {
			DragState::Idle => None,
			DragState::Dragging {
				node,
				offset_x,
				offset_y,
				cursor_x,
				cursor_y,
			} => Some((node, cursor_x + offset_x, cursor_y + offset_y)),
		}
	}
}

/// Everything the simulation reads and writes.
#[derive(Clone, Debug, Default)]
pub struct LayoutState {
	/// Graph being laid out; node positions are mutated by [`step`].
	pub graph: ArchitectureGraph,
	/// Edges as node index pairs.
	pub links: Vec<(usize, usize)>,
	/// Canvas size.
	pub viewport: Viewport,
	/// Physics constants.
	pub params: SimulationParameters,
	/// Pointer interaction.
	pub drag: DragState,
	/// Sum of node displacements during the last step.
	pub last_displacement: f64,
	/// Steps taken so far.
	pub ticks: u64,
}

impl LayoutState {
	/// Seed positions on rings and prepare the simulation.
	pub fn new(
		mut graph: ArchitectureGraph,
		viewport: Viewport,
		seed: &SeedParameters,
		params: SimulationParameters,
	) -> Self {
		seed_layout(&mut graph.nodes, viewport, seed);
		Self::from_positions(graph, viewport, params)
	}

	/// Use node positions as they are.
	pub fn from_positions(
		graph: ArchitectureGraph,
		viewport: Viewport,
		params: SimulationParameters,
	) -> Self {
		let index: HashMap<&str, usize> = graph
			.nodes
			.iter()
			.enumerate()
			.map(|(i, n)| (n.id.as_str(), i))
			.collect();
		let links = graph
			.edges
			.iter()
			.filter_map(|e| Some((*index.get(e.from.as_str())?, *index.get(e.to.as_str())?)))
			.collect();

		Self {
			graph,
			links,
			viewport,
			params,
			drag: DragState::Idle,
			last_displacement: 0.0,
			ticks: 0,
		}
	}

	/// Topmost node whose rectangle contains the point.
	pub fn node_at(&self, x: f64, y: f64) -> Option<usize> {
		self.graph.nodes.iter().rposition(|n| {
			(x - n.x).abs() <= n.width / 2.0 && (y - n.y).abs() <= n.height / 2.0
		})
	}

	/// Start dragging the node under the pointer. Returns whether a drag started;
	/// a press while another node is held is ignored.
	pub fn press(&mut self, x: f64, y: f64) -> bool {
		if self.drag != DragState::Idle {
			return false;
		}
		let Some(idx) = self.node_at(x, y) else {
			return false;
		};
		let node = &mut self.graph.nodes[idx];
		node.vx = 0.0;
		node.vy = 0.0;
		self.drag = DragState::Dragging {
			node: idx,
			offset_x: node.x - x,
			offset_y: node.y - y,
			cursor_x: x,
			cursor_y: y,
		};
		true
	}

	/// Move the pointer of an active drag.
	pub fn drag_to(&mut self, x: f64, y: f64) {
		if let DragState::Dragging {
			cursor_x, cursor_y, ..
		} = &mut self.drag
		{
			*cursor_x = x;
			*cursor_y = y;
		}
	}

	/// End any drag; the node rejoins the simulation.
	pub fn release(&mut self) {
		self.drag = DragState::Idle;
	}

	/// Index of the node being dragged.
	pub fn dragged(&self) -> Option<usize> {
		self.drag.pin().map(|(idx, _, _)| idx)
	}

	/// Change the canvas size; nodes are pulled back inside on the next step.
	pub fn resize(&mut self, width: f64, height: f64) {
		self.viewport = Viewport::new(width, height);
	}

	/// Allowed range for a node centre on one axis.
	fn bounds(extent: f64, dimension: f64) -> (f64, f64) {
		let half = extent / 2.0;
		if dimension < extent {
			(dimension / 2.0, dimension / 2.0)
		} else {
			(half, dimension - half)
		}
	}
}

/// Magnitude of the push between two nodes `dist` apart: `repulsion / dist²` inside
/// the interaction radius, faded linearly to zero over the last [`CUTOFF_BAND`] units
/// so a pair parked at the radius does not flip between pushed and free every tick.
fn repulsion(params: &SimulationParameters, dist: f64) -> f64 {
	let r = params.repulsion_radius;
	if dist >= r {
		return 0.0;
	}
	let d = dist.max(MIN_DISTANCE);
	let force = params.repulsion / (d * d);
	let band = CUTOFF_BAND.min(r);
	if dist > r - band {
		force * (r - dist) / band
	} else {
		force
	}
}

/// Advance the simulation by `dt` seconds.
pub fn step(mut state: LayoutState, dt: f64) -> LayoutState {
	let scale = (dt / FRAME).clamp(0.0, MAX_FRAME_SCALE);
	let params = state.params.clone();
	let (cx, cy) = state.viewport.center();
	let nodes = &mut state.graph.nodes;
	let n = nodes.len();

	let mut forces = vec![(0.0_f64, 0.0_f64); n];

	for (i, node) in nodes.iter().enumerate() {
		forces[i].0 += (cx - node.x) * params.center_pull;
		forces[i].1 += (cy - node.y) * params.center_pull;
	}

	let r = params.repulsion_radius;
	for i in 0..n {
		for j in (i + 1)..n {
			let (mut dx, mut dy) = (nodes[i].x - nodes[j].x, nodes[i].y - nodes[j].y);
			let dist = (dx * dx + dy * dy).sqrt();
			if dist >= r {
				continue;
			}
			if dist < COINCIDENT {
				let angle = (i * 7 + j * 13) as f64 * PI / 17.0;
				(dx, dy) = (angle.cos(), angle.sin());
			} else {
				(dx, dy) = (dx / dist, dy / dist);
			}
			let magnitude = repulsion(&params, dist);
			forces[i].0 += dx * magnitude;
			forces[i].1 += dy * magnitude;
			forces[j].0 -= dx * magnitude;
			forces[j].1 -= dy * magnitude;
		}
	}

	for &(a, b) in &state.links {
		if a == b {
			continue;
		}
		let (dx, dy) = (nodes[b].x - nodes[a].x, nodes[b].y - nodes[a].y);
		let dist = (dx * dx + dy * dy).sqrt();
		if dist < COINCIDENT {
			continue;
		}
		let magnitude = params.spring * (dist - params.spring_length);
		let (fx, fy) = (dx / dist * magnitude, dy / dist * magnitude);
		forces[a].0 += fx;
		forces[a].1 += fy;
		forces[b].0 -= fx;
		forces[b].1 -= fy;
	}

	let pin = state.drag.pin();
	let (width, height) = (state.viewport.width, state.viewport.height);
	let mut displacement = 0.0;

	for (i, node) in nodes.iter_mut().enumerate() {
		let (old_x, old_y) = (node.x, node.y);

		match pin {
			Some((idx, px, py)) if idx == i => {
				node.x = px;
				node.y = py;
				node.vx = 0.0;
				node.vy = 0.0;
			}
			_ => {
				node.vx = (node.vx + forces[i].0 * scale) * params.damping;
				node.vy = (node.vy + forces[i].1 * scale) * params.damping;
				node.x += node.vx * scale;
				node.y += node.vy * scale;
			}
		}

		let (min_x, max_x) = LayoutState::bounds(node.width, width);
		let (min_y, max_y) = LayoutState::bounds(node.height, height);
		if node.x < min_x || node.x > max_x {
			node.x = node.x.clamp(min_x, max_x);
			node.vx = 0.0;
		}
		if node.y < min_y || node.y > max_y {
			node.y = node.y.clamp(min_y, max_y);
			node.vy = 0.0;
		}
		if !node.x.is_finite() || !node.y.is_finite() {
			(node.x, node.y, node.vx, node.vy) = (cx, cy, 0.0, 0.0);
		}

		displacement += ((node.x - old_x).powi(2) + (node.y - old_y).powi(2)).sqrt();
	}

	state.last_displacement = displacement;
	state.ticks += 1;
	state
}
