mod adapter;
mod dataset;
mod swamp;

pub use adapter::{ActorConfigs, Adapter};
pub use dataset::DatasetConfig;
pub use swamp::SwampConfig;
