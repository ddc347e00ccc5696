//! Canvas view of an architecture graph: frame driver, input handling and painting.

mod component;
mod render;
mod state;

pub use component::ForceGraphCanvas;
