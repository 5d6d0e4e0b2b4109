use anyhow::{Context, Result};
use log::{debug, warn};
use serde::Deserialize;
use std::path::Path;
use std::process::{Command, Stdio};

/// ffprobe `-print_format json` 的輸出
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MediaMetadata {
    #[serde(default)]
    pub format: Option<FormatInfo>,
    #[serde(default)]
    pub streams: Vec<StreamInfo>,
    #[serde(default)]
    pub error: Option<ProbeError>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FormatInfo {
    pub format_name: Option<String>,
    pub duration: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StreamInfo {
    pub duration: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProbeError {
    pub code: Option<i64>,
    pub string: Option<String>,
}

impl MediaMetadata {
    /// 解析 ffprobe JSON 輸出
    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).context("無法解析 ffprobe 輸出")
    }

    /// 影片長度（優先從 format，其次從 stream）
    #[must_use]
    pub fn duration_seconds(&self) -> Option<f64> {
        self.format
            .as_ref()
            .and_then(|f| f.duration.as_deref())
            .and_then(|d| d.parse::<f64>().ok())
            .or_else(|| {
                self.streams
                    .iter()
                    .filter_map(|s| s.duration.as_deref())
                    .find_map(|d| d.parse::<f64>().ok())
            })
    }

    #[must_use]
    pub fn format_name(&self) -> Option<&str> {
        self.format.as_ref().and_then(|f| f.format_name.as_deref())
    }
}

/// 使用 ffprobe 取得影片資訊
pub fn probe(ffprobe: &Path, path: &Path) -> Result<MediaMetadata> {
    debug!("執行 ffprobe: {} -i {}", ffprobe.display(), path.display());

    let output = Command::new(ffprobe)
        .arg("-i")
        .arg(path)
        .args([
            "-print_format",
            "json",
            "-show_format",
            "-show_streams",
            "-show_error",
        ])
        .stdin(Stdio::null())
        .output()
        .with_context(|| format!("無法執行 ffprobe: {}", ffprobe.display()))?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    let metadata = MediaMetadata::from_json(&stdout).with_context(|| {
        let stderr = String::from_utf8_lossy(&output.stderr);
        format!("ffprobe 沒有輸出有效的 JSON: {} ({})", path.display(), stderr.trim())
    })?;

    if let Some(error) = &metadata.error {
        warn!(
            "ffprobe 回報錯誤 [{}]: {}",
            error.code.unwrap_or_default(),
            error.string.as_deref().unwrap_or("未知錯誤")
        );
    }

    Ok(metadata)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "streams": [
            { "index": 0, "codec_name": "h264", "codec_type": "video", "duration": "59.500000" },
            { "index": 1, "codec_name": "aac", "codec_type": "audio" }
        ],
        "format": {
            "filename": "clip.mkv",
            "format_name": "matroska,webm",
            "duration": "60.000000"
        }
    }"#;

    #[test]
    fn test_from_json_format_duration() {
        let metadata = MediaMetadata::from_json(SAMPLE).unwrap();
        assert!((metadata.duration_seconds().unwrap() - 60.0).abs() < f64::EPSILON);
        assert_eq!(metadata.format_name(), Some("matroska,webm"));
        assert_eq!(metadata.streams.len(), 2);
    }

    #[test]
    fn test_duration_falls_back_to_stream() {
        let raw = r#"{ "streams": [ { "codec_type": "video", "duration": "12.5" } ], "format": {} }"#;
        let metadata = MediaMetadata::from_json(raw).unwrap();
        assert!((metadata.duration_seconds().unwrap() - 12.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_error_section_only() {
        let raw = r#"{ "error": { "code": -2, "string": "No such file or directory" } }"#;
        let metadata = MediaMetadata::from_json(raw).unwrap();
        assert!(metadata.duration_seconds().is_none());
        assert_eq!(metadata.error.unwrap().code, Some(-2));
    }

    #[test]
    fn test_from_json_invalid() {
        assert!(MediaMetadata::from_json("").is_err());
        assert!(MediaMetadata::from_json("not json").is_err());
    }
}
