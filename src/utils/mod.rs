pub mod config;
pub mod fd_limit;
pub mod logger;
pub mod treedigest_toml;

pub use config::*;
pub use fd_limit::{FDS_PER_WORKER, max_open_fds, max_workers_by_fd_limit, resolve_bound};
pub use logger::setup_logging;
pub use treedigest_toml::{apply_file_to_opts, load_treedigest_toml};
