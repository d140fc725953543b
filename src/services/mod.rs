pub mod analysis;
pub use analysis::{AnalysisMode, AnalysisOptions, AnalysisService, AnalysisStats};

pub mod ingest;
pub use ingest::IngestService;

pub mod pipeline;
pub use pipeline::{PipelineService, RunSummary};

pub mod scoring;
pub use scoring::ScoringService;
