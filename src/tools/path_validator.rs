use anyhow::{Result, bail};
use std::path::Path;

pub fn validate_file_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        bail!("路徑不存在: {}", path.display());
    }
    if !path.is_file() {
        bail!("路徑不是檔案: {}", path.display());
    }
    Ok(())
}

pub fn ensure_directory_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    } else if !path.is_dir() {
        bail!("路徑不是資料夾: {}", path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_validate_file_exists() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("clip.avi");
        fs::write(&file, "data").unwrap();

        assert!(validate_file_exists(&file).is_ok());
        assert!(validate_file_exists(temp_dir.path()).is_err());
        assert!(validate_file_exists(&temp_dir.path().join("missing.avi")).is_err());
    }

    #[test]
    fn test_ensure_directory_exists_creates_nested() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("a/b/destination");

        ensure_directory_exists(&nested).unwrap();
        assert!(nested.is_dir());
        ensure_directory_exists(&nested).unwrap();
    }

    #[test]
    fn test_ensure_directory_exists_rejects_file() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("destination");
        fs::write(&file, "").unwrap();

        assert!(ensure_directory_exists(&file).is_err());
    }
}
