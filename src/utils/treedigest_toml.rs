//! Load `.treedigest.toml` from a directory (CLI only). The library takes everything through `DigestOpts`.

use serde::Deserialize;
use std::path::Path;

use crate::types::{DigestOpts, Strategy, WalkMode};
use crate::utils::config::PackagePaths;

#[derive(Debug, Default, Deserialize)]
pub struct TreedigestToml {
    #[serde(default)]
    pub settings: SettingsSection,
}

#[derive(Debug, Default, Deserialize)]
pub struct SettingsSection {
    pub bound: Option<usize>,
    pub serial: Option<bool>,
    pub parallel_walk: Option<bool>,
    pub follow_links: Option<bool>,
    pub exclude: Option<Vec<String>>,
    pub relative: Option<bool>,
    pub skip_walk_errors: Option<bool>,
    pub channel_cap: Option<usize>,
    pub verbose: Option<bool>,
    pub json: Option<bool>,
}

/// Load the config file from `dir` if present. None if missing; a parse error is logged and ignored.
pub fn load_treedigest_toml(dir: &Path) -> Option<TreedigestToml> {
    let path = dir.join(PackagePaths::get().config_filename());
    let s = std::fs::read_to_string(&path).ok()?;
    parse_treedigest_toml(&s)
        .map_err(|e| log::warn!("{}: {}", path.display(), e))
        .ok()
}

pub fn parse_treedigest_toml(s: &str) -> Result<TreedigestToml, toml::de::Error> {
    toml::from_str(s)
}

/// Overwrite opts field from file when present.
macro_rules! apply_file_opt {
    ($section:expr, $opts:expr, $field:ident => $opts_field:ident) => {
        if let Some(v) = $section.$field {
            $opts.$opts_field = v;
        }
    };
}

/// Apply file config to opts (only fields present in the file). Call before applying CLI flags.
pub fn apply_file_to_opts(file: &TreedigestToml, opts: &mut DigestOpts) {
    let s = &file.settings;
    if s.bound.is_some() {
        opts.bound = s.bound;
    }
    if let Some(serial) = s.serial {
        opts.strategy = if serial {
            Strategy::Serial
        } else {
            Strategy::Bounded
        };
    }
    if let Some(parallel) = s.parallel_walk {
        opts.walk_mode = if parallel {
            WalkMode::Parallel
        } else {
            WalkMode::Serial
        };
    }
    apply_file_opt!(s, opts, follow_links => follow_links);
    if let Some(ref v) = s.exclude {
        opts.exclude = v.clone();
    }
    apply_file_opt!(s, opts, relative => relative_paths);
    apply_file_opt!(s, opts, skip_walk_errors => skip_walk_errors);
    if s.channel_cap.is_some() {
        opts.channel_cap = s.channel_cap;
    }
}
