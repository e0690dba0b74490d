//! Application configuration constants.
//! Tuning and thresholds in one place.

use std::sync::OnceLock;

// ---- Package / paths (from CARGO_PKG_NAME, cached) ----

/// Package-derived names: built once from `CARGO_PKG_NAME`, then cached.
pub struct PackagePaths {
    pkg_name: &'static str,
    config_filename: String,
}

static PACKAGE_PATHS: OnceLock<PackagePaths> = OnceLock::new();

impl PackagePaths {
    /// Build and cache names from `CARGO_PKG_NAME`. Called once on first use.
    pub fn get() -> &'static PackagePaths {
        PACKAGE_PATHS.get_or_init(|| {
            let pkg = env!("CARGO_PKG_NAME");
            PackagePaths {
                pkg_name: pkg,
                config_filename: format!(".{pkg}.toml"),
            }
        })
    }

    pub fn pkg_name(&self) -> &str {
        self.pkg_name
    }

    /// Per-directory CLI config file (e.g. `.treedigest.toml`).
    pub fn config_filename(&self) -> &str {
        &self.config_filename
    }
}

// ---- Worker bound ----

/// Limits used when the caller does not pick a worker bound.
/// Use [`WorkerBoundLimits::current()`] to fill `all_threads` from rayon; the rest are const.
#[derive(Clone, Copy, Debug)]
pub struct WorkerBoundLimits {
    /// Available threads (from rayon); set by [`WorkerBoundLimits::current()`].
    pub all_threads: usize,
    /// Upper bound for the derived default.
    pub default_max: usize,
}

impl Default for WorkerBoundLimits {
    fn default() -> Self {
        Self {
            all_threads: 0, // use current() to set from rayon
            default_max: Self::DEFAULT_MAX_BOUND,
        }
    }
}

impl WorkerBoundLimits {
    pub const DEFAULT_MAX_BOUND: usize = 16;

    /// Build limits with `all_threads` set from `rayon::current_num_threads()`.
    pub fn current() -> Self {
        Self {
            all_threads: rayon::current_num_threads(),
            ..Self::default()
        }
    }
}

// ---- Hashing ----

/// File read thresholds.
pub struct HashingConsts;

impl HashingConsts {
    /// File size above which the default reader memory-maps instead of reading (bytes). 100 MB.
    pub const MMAP_THRESHOLD: u64 = 100 * 1024 * 1024;
}

// ---- Streaming channel cap ----

/// Capacity of the path and result channels.
pub struct StreamingChannelCap;

impl StreamingChannelCap {
    /// Walk may run this far ahead of the workers before blocking on send.
    pub const DEFAULT: usize = 50_000;
    /// Upper bound for a caller-supplied cap (avoid huge allocation).
    pub const MAX: usize = 1_000_000;

    /// Clamp a requested cap to `[1, MAX]`; None → DEFAULT.
    pub fn resolve(requested: Option<usize>) -> usize {
        requested.unwrap_or(Self::DEFAULT).clamp(1, Self::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_filename_from_pkg_name() {
        let paths = PackagePaths::get();
        assert_eq!(paths.pkg_name(), "treedigest");
        assert_eq!(paths.config_filename(), ".treedigest.toml");
    }

    #[test]
    fn test_channel_cap_resolve() {
        assert_eq!(StreamingChannelCap::resolve(None), StreamingChannelCap::DEFAULT);
        assert_eq!(StreamingChannelCap::resolve(Some(0)), 1);
        assert_eq!(StreamingChannelCap::resolve(Some(64)), 64);
        assert_eq!(
            StreamingChannelCap::resolve(Some(usize::MAX)),
            StreamingChannelCap::MAX
        );
    }
}
