//! 功能元件模組

pub mod video_transcoder;

pub use video_transcoder::VideoTranscoder;
