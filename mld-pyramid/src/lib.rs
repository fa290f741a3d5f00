pub mod builder;
pub mod error;
pub mod levels_plan;

pub use builder::{build, PersistedStrategy, PERSISTED_STRATEGIES};
pub use error::{PyramidError, PyramidResult};
pub use levels_plan::{levels_plan, LevelPlan, PyramidConfig};
