mod path_validator;
mod process_runner;
mod tool_check;
mod video_scanner;
mod worker_pool;

pub use path_validator::{ensure_directory_exists, validate_path_exists};
pub use process_runner::{ProcessOutput, ProcessRunner};
pub use tool_check::AvailableTools;
pub use video_scanner::{expand_input_paths, scan_video_files};
pub use worker_pool::{build_worker_pool, default_worker_count};
