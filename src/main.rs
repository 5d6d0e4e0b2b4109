use anyhow::Result;
use clap::Parser;
use console::style;
use log::{info, warn};
use std::path::PathBuf;
use video_transcode::component::VideoTranscoder;
use video_transcode::config::{Config, DEFAULT_DESTINATION_DIR};
use video_transcode::init;
use video_transcode::tools::Toolchain;

/// 將單一影片轉成 mp4 與 webm，並把原始檔案移到輸出資料夾
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// 輸入影片路徑
    input: PathBuf,

    /// 輸出資料夾
    #[arg(short, long, default_value = DEFAULT_DESTINATION_DIR)]
    destination: PathBuf,
}

fn main() -> Result<()> {
    init::init();
    let cli = Cli::parse();

    let toolchain = Toolchain::locate()?;
    info!(
        "ffmpeg: {}, ffprobe: {}",
        toolchain.ffmpeg.display(),
        toolchain.ffprobe.display()
    );

    let transcoder = VideoTranscoder::new(Config::with_destination(&cli.destination), toolchain);
    match transcoder.process_file(&cli.input) {
        Ok(summary) => {
            for output in &summary.outputs {
                println!("{} {}", style("輸出:").green(), output.display());
            }
            println!(
                "{} {}",
                style("原始檔案已移動到:").green(),
                summary.moved_original.display()
            );
            Ok(())
        }
        Err(e) => {
            warn!("處理失敗: {e:#}");
            Err(e)
        }
    }
}
