//! Pipeline components: path source, digest pool, collector, orchestration and cancellation.

pub mod cancel;
pub mod collect;
pub mod context;
pub mod digest;
pub mod error_handler;
pub mod orchestrator;
pub mod serial;
pub mod walk;

pub use cancel::CancelToken;
pub use collect::{Collected, collect_digests};
pub use context::{
    PipelineChannels, PipelineContext, PipelineHandles, PipelineTuning, create_pipeline_channels,
};
pub use digest::{PoolReport, spawn_digest_pool};
pub use error_handler::{check_pipeline_outcome, log_skipped_paths};
pub use orchestrator::{digest_tree_bounded, digest_tree_from_walk, finish_pipeline, run_pipeline};
pub use serial::digest_tree_serial;
pub use walk::{
    WalkOutcome, WalkSummary, run_walk_loop, spawn_path_source, spawn_walk_thread,
    to_outcome_jwalk, to_outcome_walkdir, walk_iter,
};
