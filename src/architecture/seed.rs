use std::f64::consts::PI;

use serde::Deserialize;

use super::types::{GraphNode, Viewport};

/// Outermost ring index.
pub const RING_COUNT: u8 = 3;

/// Tuning for the concentric-ring seeding.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct SeedParameters {
	/// Radius left free around the centre.
	pub inner_padding: f64,
	/// Angular offset applied per ring so rings don't line up.
	pub ring_rotation: f64,
}

impl Default for SeedParameters {
	fn default() -> Self {
		Self {
			inner_padding: 40.0,
			ring_rotation: 0.35,
		}
	}
}

/// Largest ring radius that keeps every node inside the viewport.
pub fn max_radius(nodes: &[GraphNode], viewport: Viewport) -> f64 {
	let half_w = nodes.iter().map(|n| n.width / 2.0).fold(0.0, f64::max);
	let half_h = nodes.iter().map(|n| n.height / 2.0).fold(0.0, f64::max);
	(viewport.width / 2.0 - half_w)
		.min(viewport.height / 2.0 - half_h)
		.max(0.0)
}

/// Radius of ring `level` (1-based).
pub fn ring_radius(level: u8, max_radius: f64, params: &SeedParameters) -> f64 {
	let t = f64::from(level.clamp(1, RING_COUNT)) / f64::from(RING_COUNT);
	if max_radius >= params.inner_padding {
		params.inner_padding + (max_radius - params.inner_padding) * t
	} else {
		max_radius * t
	}
}

/// Place nodes on concentric rings by level, evenly spaced, and reset velocities.
pub fn seed_layout(nodes: &mut [GraphNode], viewport: Viewport, params: &SeedParameters) {
	let limit = max_radius(nodes, viewport);
	let (cx, cy) = viewport.center();

	for level in 1..=RING_COUNT {
		let ring: Vec<usize> = nodes
			.iter()
			.enumerate()
			.filter(|(_, n)| n.level.clamp(1, RING_COUNT) == level)
			.map(|(i, _)| i)
			.collect();
		if ring.is_empty() {
			continue;
		}

		let radius = ring_radius(level, limit, params);
		let offset = f64::from(level) * params.ring_rotation;
		let step = 2.0 * PI / ring.len() as f64;
		for (slot, &idx) in ring.iter().enumerate() {
			let angle = offset + step * slot as f64;
			let node = &mut nodes[idx];
			node.x = cx + radius * angle.cos();
			node.y = cy + radius * angle.sin();
			node.vx = 0.0;
			node.vy = 0.0;
		}
	}
}
