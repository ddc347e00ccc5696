use serde::Deserialize;

use super::builder::{DisplayPolicy, GraphBuilder};
use super::error::{ArchitectureError, Result};
use super::imports::ResolverConfig;
use super::seed::SeedParameters;
use super::simulation::SimulationParameters;

/// Every tunable of the engine. Missing sections and fields fall back to defaults.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ArchitectureConfig {
	/// Alias, root prefix and extension rules.
	pub resolver: ResolverConfig,
	/// Individual-vs-group display caps.
	pub policy: DisplayPolicy,
	/// Ring seeding.
	pub seed: SeedParameters,
	/// Force simulation.
	pub simulation: SimulationParameters,
}

impl ArchitectureConfig {
	/// Parse a JSON configuration document.
	pub fn from_json(json: &str) -> Result<Self> {
		serde_json::from_str(json).map_err(ArchitectureError::Config)
	}

	/// Graph builder using this configuration.
	pub fn builder(&self) -> GraphBuilder {
		GraphBuilder::new(self.resolver.clone(), self.policy.clone())
	}
}
