use super::ffmpeg_command::FfmpegCommand;
use super::media_item::{DecodeRequest, MediaItem};
use super::progress::valid_duration;
use crate::config::Config;
use crate::tools::{Toolchain, ensure_directory_exists, move_into_directory, validate_file_exists};
use anyhow::Result;
use console::{Term, style};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use log::{info, warn};
use std::path::{Path, PathBuf};

/// 單一檔案的處理結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscodeSummary {
    /// 依轉檔順序產生的輸出檔
    pub outputs: Vec<PathBuf>,
    /// 原始檔案移動後的位置
    pub moved_original: PathBuf,
}

pub struct VideoTranscoder {
    config: Config,
    toolchain: Toolchain,
}

impl VideoTranscoder {
    pub const fn new(config: Config, toolchain: Toolchain) -> Self {
        Self { config, toolchain }
    }

    /// 探測 → 視需要轉成各目標格式 → 移動原始檔案到輸出資料夾
    ///
    /// 任何一步失敗即中止，已產生的輸出不會被清除
    pub fn process_file(&self, path: &Path) -> Result<TranscodeSummary> {
        validate_file_exists(path)?;

        info!("探測影片資訊: {}", path.display());
        let item = MediaItem::probe(&self.toolchain.ffprobe, path)?;
        info!(
            "格式: {}, 長度: {}",
            item.metadata.format_name().unwrap_or("未知"),
            item.duration_seconds()
                .map_or_else(|| "未知".to_string(), |d| format!("{d:.2}s"))
        );
        ensure_directory_exists(&self.config.destination_dir)?;

        let mut outputs = Vec::new();
        if self.needs_transcoding(&item) {
            if valid_duration(item.duration_seconds()).is_none() {
                warn!("無法取得有效的影片長度，進度將顯示為 0%: {}", path.display());
            }

            for format in &self.config.target_formats {
                let request = DecodeRequest::new(&item, format, &self.config.destination_dir);
                outputs.push(self.decode(&request)?);
            }
        } else {
            println!(
                "{}",
                style(format!("已是目標格式 ({})，略過轉檔", item.extension)).dim()
            );
        }

        let moved_original = move_into_directory(&item.path, &self.config.destination_dir)?;

        Ok(TranscodeSummary {
            outputs,
            moved_original,
        })
    }

    #[must_use]
    pub fn needs_transcoding(&self, item: &MediaItem) -> bool {
        !self.config.is_target_extension(&item.extension)
    }

    fn decode(&self, request: &DecodeRequest<'_>) -> Result<PathBuf> {
        let ffmpeg_cmd = FfmpegCommand::new(&self.toolchain.ffmpeg, request);

        println!(
            "{}",
            style(format!("開始轉檔為 {}", request.format.extension)).cyan()
        );
        println!("{}", style(ffmpeg_cmd.command_line()).dim());

        let display = ProgressDisplay::new();
        let result = ffmpeg_cmd.run(|percent| display.update(percent));
        display.finish();

        result?;
        Ok(ffmpeg_cmd.destination_path().to_path_buf())
    }
}

fn progress_message(percent: f64) -> String {
    format!("{percent:.4}% completed")
}

/// 終端機上顯示進度條；輸出被導向時改為以 `\r` 覆寫同一行
enum ProgressDisplay {
    Bar(ProgressBar),
    Line(Term),
}

impl ProgressDisplay {
    fn new() -> Self {
        let term = Term::stdout();
        if !term.is_term() {
            return Self::Line(term);
        }

        let progress_bar = ProgressBar::with_draw_target(Some(100), ProgressDrawTarget::stdout());
        progress_bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {msg}")
                .expect("Invalid progress bar template")
                .progress_chars("#>-"),
        );
        Self::Bar(progress_bar)
    }

    fn update(&self, percent: f64) {
        match self {
            Self::Bar(progress_bar) => {
                progress_bar.set_position(percent.clamp(0.0, 100.0) as u64);
                progress_bar.set_message(progress_message(percent));
            }
            Self::Line(term) => {
                let _ = term.write_str(&format!("\r{} ", progress_message(percent)));
                let _ = term.flush();
            }
        }
    }

    fn finish(&self) {
        match self {
            Self::Bar(progress_bar) => progress_bar.finish(),
            Self::Line(term) => {
                let _ = term.write_line("");
            }
        }
    }
}
