use super::media_item::DecodeRequest;
use super::progress::{StderrEvent, StderrEvents};
use anyhow::{Context, Result, bail};
use log::{debug, info, warn};
use std::ffi::OsString;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

pub struct FfmpegCommand {
    ffmpeg: PathBuf,
    source_path: PathBuf,
    destination_path: PathBuf,
    format: String,
    extra_args: Vec<String>,
    duration_seconds: Option<f64>,
}

impl FfmpegCommand {
    #[must_use]
    pub fn new(ffmpeg: &Path, request: &DecodeRequest<'_>) -> Self {
        Self {
            ffmpeg: ffmpeg.to_path_buf(),
            source_path: request.source.path.clone(),
            destination_path: request.destination.clone(),
            format: request.format.extension.clone(),
            extra_args: request.extra_args().to_vec(),
            duration_seconds: request.source.duration_seconds(),
        }
    }

    #[must_use]
    pub fn destination_path(&self) -> &Path {
        &self.destination_path
    }

    /// `-y -i <source> <extra_args...> <destination>`
    #[must_use]
    pub fn args(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> =
            vec!["-y".into(), "-i".into(), self.source_path.clone().into()];
        args.extend(self.extra_args.iter().map(OsString::from));
        args.push(self.destination_path.clone().into());
        args
    }

    #[must_use]
    pub fn build_command(&self) -> Command {
        let mut cmd = Command::new(&self.ffmpeg);
        cmd.args(self.args());
        cmd
    }

    /// 命令列字串，僅供顯示
    #[must_use]
    pub fn command_line(&self) -> String {
        std::iter::once(self.ffmpeg.as_os_str().to_owned())
            .chain(self.args())
            .map(|a| a.to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// 執行 ffmpeg，每讀到一次 `time=` 狀態就以完成百分比呼叫 `on_progress`
    ///
    /// 阻塞直到 ffmpeg 結束；沒有逾時
    pub fn run<F>(&self, mut on_progress: F) -> Result<()>
    where
        F: FnMut(f64),
    {
        debug!("{}", self.command_line());

        let mut child = self
            .build_command()
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("無法啟動 ffmpeg: {}", self.ffmpeg.display()))?;

        info!(
            "啟動編碼任務 [{}]: {} -> {}",
            child.id(),
            self.source_path.display(),
            self.destination_path.display()
        );

        let mut last_message = None;
        if let Some(stderr) = child.stderr.take() {
            let reader = BufReader::new(stderr);
            match scan_stderr(reader, self.duration_seconds, &mut on_progress) {
                Ok(message) => last_message = message,
                Err(e) => {
                    warn!("讀取 ffmpeg 輸出失敗，終止程序 [{}]", child.id());
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(e).context("讀取 ffmpeg 輸出失敗");
                }
            }
        }

        let status = child.wait().context("等待 ffmpeg 結束失敗")?;
        if !status.success() {
            bail!(
                "ffmpeg 轉檔為 {} 失敗 ({status}): {}",
                self.format,
                last_message.as_deref().unwrap_or("未知錯誤")
            );
        }

        info!("編碼完成: {}", self.destination_path.display());
        Ok(())
    }
}

/// 讀完 stderr，回傳最後一段非進度輸出
fn scan_stderr<R, F>(
    reader: R,
    duration_seconds: Option<f64>,
    on_progress: &mut F,
) -> io::Result<Option<String>>
where
    R: BufRead,
    F: FnMut(f64),
{
    let mut last_message = None;
    for event in StderrEvents::new(reader, duration_seconds) {
        match event? {
            StderrEvent::Progress(percent) => on_progress(percent),
            StderrEvent::Message(message) => last_message = Some(message),
        }
    }
    Ok(last_message)
}
