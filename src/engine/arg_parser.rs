use clap::Parser;
use std::path::PathBuf;

struct DefaultArgs;

impl DefaultArgs {
    pub const DIR: &'static str = ".";
}

/// Bounded-concurrency directory digester.
#[derive(Clone, Parser)]
#[command(name = "treedigest")]
#[command(about = "Digest every regular file under a directory with a fixed number of workers.")]
pub struct Cli {
    /// Directory to digest. Default: current directory.
    #[arg(value_name = "DIR", default_value = DefaultArgs::DIR)]
    pub dir: PathBuf,

    /// Number of concurrent digest workers. Default: available threads, capped by the FD limit.
    #[arg(long, short = 'j', value_parser = clap::value_parser!(usize))]
    pub bound: Option<usize>,

    /// Walk and digest on a single thread.
    #[arg(long, num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub serial: Option<bool>,

    /// Walk directories in parallel (jwalk). Visit order is not depth-first.
    #[arg(long, num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub parallel_walk: Option<bool>,

    /// Follow symbolic links.
    #[arg(long, short = 'f', num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub follow_links: Option<bool>,

    /// Exclude patterns (glob syntax). Can specify multiple: -e pattern1 pattern2 pattern3
    #[arg(long, short = 'e', num_args = 1..)]
    pub exclude: Vec<String>,

    /// Print paths relative to DIR.
    #[arg(long, short = 'r', num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub relative: Option<bool>,

    /// Skip unreadable directories instead of failing on the first traversal error.
    #[arg(long, num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub skip_walk_errors: Option<bool>,

    /// Print a JSON object of path → hex digest instead of lines.
    #[arg(long, num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub json: Option<bool>,

    /// Verbose output (debug logs, progress counter, skipped files).
    #[arg(long, short = 'v', num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub verbose: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["treedigest"]);
        assert_eq!(cli.dir, PathBuf::from("."));
        assert_eq!(cli.bound, None);
        assert_eq!(cli.serial, None);
        assert!(cli.exclude.is_empty());
    }

    #[test]
    fn test_flags() {
        let cli = Cli::parse_from([
            "treedigest",
            "/data",
            "-j",
            "8",
            "--serial",
            "-e",
            "target",
            "*.log",
            "--json=false",
        ]);
        assert_eq!(cli.dir, PathBuf::from("/data"));
        assert_eq!(cli.bound, Some(8));
        assert_eq!(cli.serial, Some(true));
        assert_eq!(cli.exclude, vec!["target".to_string(), "*.log".to_string()]);
        assert_eq!(cli.json, Some(false));
    }
}
