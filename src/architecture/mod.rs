//! Codebase structure engine: classify files, resolve imports, build a bounded graph,
//! seed its layout and relax it with a force simulation.

pub mod builder;
pub mod classifier;
pub mod config;
pub mod error;
pub mod export;
pub mod imports;
pub mod seed;
pub mod simulation;
pub mod types;

pub use builder::{DisplayPolicy, GraphBuilder};
pub use classifier::{Classification, classify};
pub use config::ArchitectureConfig;
pub use error::{ArchitectureError, ReadError};
pub use export::{EdgeView, NodeView, Snapshot};
pub use imports::{ImportResolver, KnownPaths, ResolverConfig, extract_imports};
pub use seed::{SeedParameters, seed_layout};
pub use simulation::{DragState, LayoutState, SimulationParameters, step};
pub use types::{
	ArchitectureGraph, BuildStats, Category, GraphEdge, GraphNode, InlineText, NodeDetails,
	NodeKind, ResolvedImport, SourceFile, TextProvider, Viewport,
};
