//! Result collector: drains the result stream into the digest map.

use crossbeam_channel::Receiver;
use log::debug;
use std::path::{Path, PathBuf};

use crate::engine::tools::map_key;
use crate::types::{DigestMap, FileDigest};

/// Map plus the files that were left out because their read failed.
#[derive(Debug, Default)]
pub struct Collected {
    pub digests: DigestMap,
    pub skipped: Vec<(PathBuf, String)>,
}

impl Collected {
    /// Fold one result in: successful digests go into the map, failures into `skipped`.
    pub fn push(&mut self, result: FileDigest, root: &Path, relative: bool) {
        match result.digest {
            Ok(digest) => {
                self.digests
                    .insert(map_key(&result.path, root, relative), digest);
            }
            Err(e) => self.skipped.push((result.path, e.to_string())),
        }
    }
}

/// Drain `result_rx` until every sender is gone. Blocks only while the stream is open.
/// `on_result` is called once per received record (e.g. progress display).
pub fn collect_digests<F>(
    result_rx: &Receiver<FileDigest>,
    root: &Path,
    relative: bool,
    mut on_result: Option<F>,
) -> Collected
where
    F: FnMut(&FileDigest),
{
    let mut collected = Collected::default();
    for result in result_rx.iter() {
        if let Some(f) = on_result.as_mut() {
            f(&result);
        }
        collected.push(result, root, relative);
    }
    debug!(
        "collect: stream closed, {} digests, {} skipped",
        collected.digests.len(),
        collected.skipped.len()
    );
    collected
}
