pub mod matcher;
pub mod normalize;
pub mod quality;
pub mod registry;
pub mod sequel;
pub mod source;
pub mod tpb;
pub mod tracker;
pub mod x1337;

pub use matcher::{MovieQuery, SourceResult};
pub use registry::SourceRegistry;
pub use source::SourceInfo;
pub use tracker::{CheckSummary, check_all_movies, run_checker};
