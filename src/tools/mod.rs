mod binary_locator;
mod ffprobe_info;
mod file_mover;
mod path_validator;

pub use binary_locator::{
    BinaryNotFound, Toolchain, executable_extensions, find_executable, which,
};
pub use ffprobe_info::{FormatInfo, MediaMetadata, ProbeError, StreamInfo, probe};
pub use file_mover::move_into_directory;
pub use path_validator::{ensure_directory_exists, validate_file_exists};
