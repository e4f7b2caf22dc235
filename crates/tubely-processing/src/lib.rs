//! External media tool adapters
//!
//! The upload pipeline shells out to ffprobe (aspect ratio inspection) and
//! ffmpeg (fast-start remux). Both sit behind traits so they can be replaced
//! by in-process implementations or test fakes.

pub mod command;
pub mod error;
pub mod probe;
pub mod repackage;

pub use error::ProcessingError;
pub use probe::{parse_aspect_ratio, FfprobeProber, MediaProber};
pub use repackage::{processing_output_path, FfmpegRepackager, MediaRepackager};
