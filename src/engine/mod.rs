//! Engine module: hashing, path helpers, CLI parsing and the command handler

pub mod arg_parser;
pub mod handlers;
pub mod hashing;
pub mod progress;
pub mod tools;

// Re-export commonly used functions
pub use arg_parser::Cli;
pub use handlers::handle_run;
pub use hashing::{
    Blake3Digest, ContentDigest, DigestBackend, FileBytes, FileReader, FsReader, digest_file,
    digest_to_hex,
};
pub use tools::{
    glob_match, is_under_excluded_dir, map_key, path_relative_to, path_to_key_string,
    should_include_in_walk,
};
