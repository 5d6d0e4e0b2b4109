use std::path::PathBuf;

/// 預設的輸出資料夾（相對於目前工作目錄）
pub const DEFAULT_DESTINATION_DIR: &str = "./destination";

/// 轉檔目標格式
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetFormat {
    /// 輸出副檔名（不含前導點）
    pub extension: String,
    /// 插入在輸入與輸出路徑之間的額外 ffmpeg 參數
    pub extra_args: Vec<String>,
}

impl TargetFormat {
    #[must_use]
    pub fn new(extension: &str) -> Self {
        Self {
            extension: extension.to_string(),
            extra_args: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_args(mut self, args: &[&str]) -> Self {
        self.extra_args = args.iter().map(|a| (*a).to_string()).collect();
        self
    }

    /// 副檔名是否符合此格式（不分大小寫，可含前導點）
    #[must_use]
    pub fn matches_extension(&self, extension: &str) -> bool {
        extension
            .trim_start_matches('.')
            .eq_ignore_ascii_case(&self.extension)
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub destination_dir: PathBuf,
    pub target_formats: Vec<TargetFormat>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            destination_dir: PathBuf::from(DEFAULT_DESTINATION_DIR),
            target_formats: vec![TargetFormat::new("mp4"), TargetFormat::new("webm")],
        }
    }
}
