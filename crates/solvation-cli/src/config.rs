mod builder;
mod defaults;
mod file;
mod models;

pub use builder::{AnalysisRequest, build_config};
pub use models::AppConfig;
