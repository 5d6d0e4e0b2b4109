//! 影片轉檔元件
//!
//! 使用 ffprobe 取得影片資訊，再以 ffmpeg 轉成 mp4 與 webm

mod ffmpeg_command;
mod main;
mod media_item;
pub mod progress;

pub use ffmpeg_command::FfmpegCommand;
pub use main::{TranscodeSummary, VideoTranscoder};
pub use media_item::{DecodeRequest, MediaItem};
pub use progress::{
    StderrEvent, StderrEvents, compute_percent, parse_elapsed_seconds, valid_duration,
};
