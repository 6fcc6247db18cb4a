// Re-export glam for convenience
pub use glam::*;

// Caustic math types
mod basis;
mod interval;
mod ray;

pub use basis::Basis;
pub use interval::Interval;
pub use ray::Ray;
