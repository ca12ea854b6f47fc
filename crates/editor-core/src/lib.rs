pub mod bounds;
pub mod group;
pub mod registry;
pub mod selection;

// Re-exports
pub use bounds::{Aabb, BoundsTracker};
pub use group::{GroupPivot, centroid};
pub use registry::{PointId, PointRegistry};
pub use selection::SelectionSet;
