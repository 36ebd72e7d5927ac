//! Project state: manifest schema, persistence, and the timeline engine.

pub mod project;
pub mod timeline;

pub use project::{ChunkRecord, Project, ProjectSettings};
pub use timeline::TimelineMode;
