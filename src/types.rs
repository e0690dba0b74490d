//! Public and internal types for the treedigest API and pipeline.

use std::collections::HashMap;
use std::path::PathBuf;

/// Length of a content digest in bytes (blake3 output).
pub const DIGEST_LEN: usize = blake3::OUT_LEN;

/// Fixed-size content digest of one file.
pub type Digest = [u8; DIGEST_LEN];

/// Map of path → digest for every successfully read regular file under the root.
///
/// Keys are the walked paths (`root.join(...)`), or root-relative with forward slashes when
/// [`DigestOpts::relative_paths`] is set. Order is irrelevant.
pub type DigestMap = HashMap<PathBuf, Digest>;

/// Outcome of digesting one file. Produced once per regular file, consumed once by the collector.
/// A read error stays inside the record; it never aborts the pool.
#[derive(Debug)]
pub struct FileDigest {
    pub path: PathBuf,
    pub digest: std::io::Result<Digest>,
}

/// How files are digested.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Strategy {
    /// Walk thread → fixed pool of `bound` workers → collector.
    #[default]
    Bounded,
    /// Walk and digest on the calling thread.
    Serial,
}

/// Which directory walker feeds the path source.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WalkMode {
    /// Depth-first `walkdir`.
    #[default]
    Serial,
    /// `jwalk` on the rayon pool. Visit order is not depth-first.
    Parallel,
}

/// Options for [`digest_tree`](crate::digest_tree).
#[derive(Clone, Debug, Default)]
pub struct DigestOpts {
    /// Number of digest workers. When None, derived from available threads and the FD limit.
    pub bound: Option<usize>,
    pub strategy: Strategy,
    pub walk_mode: WalkMode,
    /// Follow symbolic links.
    pub follow_links: bool,
    /// Exclude patterns (glob syntax, e.g. `target`, `*.log`). A file is dropped when a pattern
    /// matches its name, its full walked path, or the name of any directory between it and the root.
    pub exclude: Vec<String>,
    /// Key the map by root-relative paths instead of walked paths.
    pub relative_paths: bool,
    /// Log and skip traversal errors below the root instead of failing the batch.
    pub skip_walk_errors: bool,
    /// Capacity for the path and result channels. When None, [`StreamingChannelCap::DEFAULT`](crate::utils::StreamingChannelCap::DEFAULT).
    pub channel_cap: Option<usize>,
}

/// Everything a run produced besides the map: what was left out and why.
#[derive(Debug, Default)]
pub struct DigestReport {
    pub digests: DigestMap,
    /// Files that could not be read, with the read error message. Omitted from `digests`.
    pub skipped: Vec<(PathBuf, String)>,
    /// Traversal errors tolerated under [`DigestOpts::skip_walk_errors`].
    pub walk_errors: Vec<(Option<PathBuf>, String)>,
    /// Number of regular-file paths the walk handed to the digest stage.
    pub path_count: usize,
    /// Effective worker count (1 for [`Strategy::Serial`]).
    pub bound: usize,
}
