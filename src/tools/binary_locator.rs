use anyhow::Result;
use log::debug;
use std::env;
use std::ffi::{OsStr, OsString};
use std::fmt;
use std::path::{Path, PathBuf};

/// 在搜尋路徑中找不到執行檔
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryNotFound {
    pub name: String,
    pub search_path: String,
}

impl fmt::Display for BinaryNotFound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "the {} binary could not be found in {}",
            self.name, self.search_path
        )
    }
}

impl std::error::Error for BinaryNotFound {}

/// 外部工具路徑
#[derive(Debug, Clone)]
pub struct Toolchain {
    pub ffmpeg: PathBuf,
    pub ffprobe: PathBuf,
}

impl Toolchain {
    /// 依照目前程序的 PATH / PATHEXT 尋找 ffmpeg 與 ffprobe
    pub fn locate() -> Result<Self> {
        Ok(Self {
            ffmpeg: which("ffmpeg")?,
            ffprobe: which("ffprobe")?,
        })
    }

    pub fn locate_in(search_path: &OsStr, extensions: &[String]) -> Result<Self> {
        Ok(Self {
            ffmpeg: find_executable("ffmpeg", search_path, extensions)?,
            ffprobe: find_executable("ffprobe", search_path, extensions)?,
        })
    }
}

/// 將 PATHEXT 拆成副檔名列表，未設定時只嘗試原始名稱
#[must_use]
pub fn executable_extensions(pathext: Option<&str>) -> Vec<String> {
    match pathext {
        Some(raw) if !raw.is_empty() => raw.split(';').map(str::to_string).collect(),
        _ => vec![String::new()],
    }
}

pub fn which(name: &str) -> Result<PathBuf> {
    let search_path = env::var_os("PATH").unwrap_or_default();
    let pathext = env::var("PATHEXT").ok();
    find_executable(name, &search_path, &executable_extensions(pathext.as_deref()))
}

/// 依序檢查每個目錄與副檔名組合，回傳第一個可執行的檔案
pub fn find_executable(name: &str, search_path: &OsStr, extensions: &[String]) -> Result<PathBuf> {
    for dir in env::split_paths(search_path) {
        for ext in extensions {
            let mut file_name = OsString::from(name);
            file_name.push(ext);
            let candidate = dir.join(file_name);
            if is_executable(&candidate) {
                debug!("找到 {name}: {}", candidate.display());
                return Ok(candidate);
            }
        }
    }

    Err(BinaryNotFound {
        name: name.to_string(),
        search_path: search_path.to_string_lossy().into_owned(),
    }
    .into())
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    path.metadata()
        .is_ok_and(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_script(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, "#!/bin/sh\n").unwrap();
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        }
        path
    }

    fn join(dirs: &[&Path]) -> OsString {
        env::join_paths(dirs).unwrap()
    }

    #[test]
    fn test_executable_extensions_default() {
        assert_eq!(executable_extensions(None), vec![String::new()]);
        assert_eq!(executable_extensions(Some("")), vec![String::new()]);
    }

    #[test]
    fn test_executable_extensions_pathext() {
        assert_eq!(
            executable_extensions(Some(".COM;.EXE;.BAT")),
            vec![".COM", ".EXE", ".BAT"]
        );
    }

    #[test]
    fn test_find_executable_first_directory_wins() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        write_script(second.path(), "ffmpeg");
        let expected = write_script(first.path(), "ffmpeg");

        let search_path = join(&[first.path(), second.path()]);
        let found = find_executable("ffmpeg", &search_path, &[String::new()]).unwrap();
        assert_eq!(found, expected);
    }

    #[test]
    fn test_find_executable_with_extension() {
        let dir = TempDir::new().unwrap();
        let expected = write_script(dir.path(), "ffprobe.exe");

        let search_path = join(&[dir.path()]);
        let extensions = executable_extensions(Some(".com;.exe"));
        let found = find_executable("ffprobe", &search_path, &extensions).unwrap();
        assert_eq!(found, expected);
    }

    #[test]
    fn test_find_executable_not_found() {
        let dir = TempDir::new().unwrap();
        write_script(dir.path(), "ffmpeg");

        let search_path = join(&[dir.path()]);
        let err = find_executable("ffprobe", &search_path, &[String::new()]).unwrap_err();
        let not_found = err.downcast_ref::<BinaryNotFound>().unwrap();
        assert_eq!(not_found.name, "ffprobe");
        assert_eq!(not_found.search_path, search_path.to_string_lossy());
        assert!(err.to_string().contains("ffprobe"));
    }

    #[test]
    fn test_find_executable_skips_directories() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("ffmpeg")).unwrap();

        let search_path = join(&[dir.path()]);
        assert!(find_executable("ffmpeg", &search_path, &[String::new()]).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_find_executable_requires_exec_bit() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("ffmpeg"), "not executable").unwrap();

        let search_path = join(&[dir.path()]);
        assert!(find_executable("ffmpeg", &search_path, &[String::new()]).is_err());
    }

    #[test]
    fn test_toolchain_locate_in() {
        let dir = TempDir::new().unwrap();
        let ffmpeg = write_script(dir.path(), "ffmpeg");
        let ffprobe = write_script(dir.path(), "ffprobe");

        let toolchain = Toolchain::locate_in(&join(&[dir.path()]), &[String::new()]).unwrap();
        assert_eq!(toolchain.ffmpeg, ffmpeg);
        assert_eq!(toolchain.ffprobe, ffprobe);
    }
}
