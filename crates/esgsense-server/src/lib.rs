//! esgsense server: batch pipeline orchestration, database validation and
//! the read-only chart-feed API.

pub mod pipeline;
pub mod routes;
pub mod state;
pub mod validate;

pub use pipeline::{Pipeline, PipelineReport, SqlAnalysis};
pub use routes::build_router;
pub use state::AppState;
