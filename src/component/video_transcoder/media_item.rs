use crate::config::TargetFormat;
use crate::tools::{MediaMetadata, probe};
use anyhow::Result;
use std::path::{Path, PathBuf};

/// 待處理的影片及其 ffprobe 資訊
#[derive(Debug, Clone)]
pub struct MediaItem {
    pub path: PathBuf,
    /// 含前導點的副檔名，例如 `.mkv`；沒有副檔名時為空字串
    pub extension: String,
    pub basename: String,
    pub metadata: MediaMetadata,
}

impl MediaItem {
    /// 以 ffprobe 讀取影片資訊後建立
    pub fn probe(ffprobe: &Path, path: &Path) -> Result<Self> {
        let metadata = probe(ffprobe, path)?;
        Ok(Self::with_metadata(path, metadata))
    }

    #[must_use]
    pub fn with_metadata(path: &Path, metadata: MediaMetadata) -> Self {
        let extension = path
            .extension()
            .and_then(|s| s.to_str())
            .map(|ext| format!(".{ext}"))
            .unwrap_or_default();
        let basename = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "output".to_string());

        Self {
            path: path.to_path_buf(),
            extension,
            basename,
            metadata,
        }
    }

    #[must_use]
    pub fn duration_seconds(&self) -> Option<f64> {
        self.metadata.duration_seconds()
    }
}

/// 單次轉檔請求
#[derive(Debug, Clone)]
pub struct DecodeRequest<'a> {
    pub source: &'a MediaItem,
    pub format: &'a TargetFormat,
    pub destination: PathBuf,
}

impl<'a> DecodeRequest<'a> {
    #[must_use]
    pub fn new(source: &'a MediaItem, format: &'a TargetFormat, destination_dir: &Path) -> Self {
        let destination =
            destination_dir.join(format!("{}.{}", source.basename, format.extension));
        Self {
            source,
            format,
            destination,
        }
    }

    #[must_use]
    pub fn extra_args(&self) -> &[String] {
        &self.format.extra_args
    }
}
