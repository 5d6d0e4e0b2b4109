use crate::config::types::Config;
use std::path::Path;

impl Config {
    /// 使用指定的輸出資料夾，其餘設定沿用預設值
    #[must_use]
    pub fn with_destination(destination_dir: &Path) -> Self {
        Self {
            destination_dir: destination_dir.to_path_buf(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn is_target_extension(&self, extension: &str) -> bool {
        self.target_formats
            .iter()
            .any(|f| f.matches_extension(extension))
    }
}
