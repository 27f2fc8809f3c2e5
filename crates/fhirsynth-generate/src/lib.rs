//! Synthetic record generation for fhirsynth.
//!
//! Flattens a resource model into columns, fills every column with a value
//! chosen from column-name heuristics and writes the records as CSV or JSON
//! Lines.

pub mod engine;
pub mod errors;
pub mod generators;
pub mod model;
pub mod output;

pub use engine::{GenerationEngine, GenerationResult};
pub use errors::GenerationError;
pub use generators::{GeneratedValue, GeneratorRegistry, GeneratorState};
pub use model::{GenerateOptions, GenerationReport};
pub use output::OutputFormat;
