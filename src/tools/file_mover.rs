use anyhow::{Context, Result};
use log::{debug, info};
use std::fs;
use std::path::{Path, PathBuf};

/// 將檔案移動到指定資料夾，保留原檔名
///
/// 先嘗試 rename，失敗時（例如跨檔案系統）改為複製後刪除原檔案
pub fn move_into_directory(source: &Path, directory: &Path) -> Result<PathBuf> {
    let file_name = source
        .file_name()
        .ok_or_else(|| anyhow::anyhow!("無法取得檔案名稱: {}", source.display()))?;
    let target = directory.join(file_name);

    if let Err(e) = fs::rename(source, &target) {
        debug!("rename 失敗，改用複製: {e}");
        copy_and_delete(source, &target)?;
    }

    info!("已移動原始檔案: {} -> {}", source.display(), target.display());
    Ok(target)
}

/// 複製檔案後刪除原檔案
fn copy_and_delete(source: &Path, target: &Path) -> Result<()> {
    fs::copy(source, target).with_context(|| {
        format!("複製檔案失敗: {} -> {}", source.display(), target.display())
    })?;

    fs::remove_file(source).with_context(|| format!("刪除原檔案失敗: {}", source.display()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_move_into_directory() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("movie.mkv");
        let destination = temp_dir.path().join("destination");
        fs::write(&source, "video content").unwrap();
        fs::create_dir(&destination).unwrap();

        let target = move_into_directory(&source, &destination).unwrap();

        assert_eq!(target, destination.join("movie.mkv"));
        assert_eq!(fs::read_to_string(&target).unwrap(), "video content");
        assert!(!source.exists());
    }

    #[test]
    fn test_move_into_missing_directory_fails() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("movie.mkv");
        fs::write(&source, "video content").unwrap();

        let result = move_into_directory(&source, &temp_dir.path().join("missing"));

        assert!(result.is_err());
        assert!(source.exists());
    }
}
