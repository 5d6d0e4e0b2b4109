//! ffmpeg 進度解析
//!
//! ffmpeg 會在 stderr 以 `\r` 覆寫同一行狀態，例如
//! `frame=  240 fps= 60 q=28.0 size=    512kB time=00:00:08.00 bitrate= 524.3kbits/s speed=2.0x`

use regex::Regex;
use std::io::{self, BufRead};
use std::sync::LazyLock;

static REGEX_ELAPSED_TIME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"time=(\d+):(\d+):(\d+\.\d+)").expect("Invalid regex"));

const TIME_MARKER: &str = "time=";

/// stderr 中的一段輸出
#[derive(Debug, Clone, PartialEq)]
pub enum StderrEvent {
    /// 含有 `time=` 的狀態行，附完成百分比
    Progress(f64),
    /// 其他輸出（banner、警告、錯誤訊息）
    Message(String),
}

/// 從 `time=HH:MM:SS.frac` 取出已處理秒數
///
/// 沒有符合格式（例如 `time=N/A`）時回傳 0.0
#[must_use]
pub fn parse_elapsed_seconds(chunk: &str) -> f64 {
    REGEX_ELAPSED_TIME
        .captures(chunk)
        .and_then(|caps| {
            let hours = caps[1].parse::<f64>().ok()?;
            let minutes = caps[2].parse::<f64>().ok()?;
            let seconds = caps[3].parse::<f64>().ok()?;
            Some(hours * 3600.0 + minutes * 60.0 + seconds)
        })
        .unwrap_or(0.0)
}

/// 可用來計算進度的影片長度：有限且大於 0
#[must_use]
pub fn valid_duration(duration_seconds: Option<f64>) -> Option<f64> {
    duration_seconds.filter(|d| d.is_finite() && *d > 0.0)
}

/// 完成百分比，四捨五入到小數第四位
///
/// 沒有有效的影片長度時回傳 0.0；不做上下限裁切
#[must_use]
pub fn compute_percent(elapsed_seconds: f64, duration_seconds: Option<f64>) -> f64 {
    valid_duration(duration_seconds)
        .map_or(0.0, |duration| round_to_4((elapsed_seconds / duration) * 100.0))
}

fn round_to_4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

/// 解析單段輸出；不含 `time=` 的段落不產生進度
#[must_use]
pub fn parse_chunk(chunk: &str, duration_seconds: Option<f64>) -> StderrEvent {
    if chunk.contains(TIME_MARKER) {
        StderrEvent::Progress(compute_percent(
            parse_elapsed_seconds(chunk),
            duration_seconds,
        ))
    } else {
        StderrEvent::Message(chunk.to_string())
    }
}

/// 以 `\r` 或 `\n` 切段讀取 ffmpeg stderr 的迭代器，讀到 EOF 為止
pub struct StderrEvents<R> {
    reader: R,
    duration_seconds: Option<f64>,
}

impl<R: BufRead> StderrEvents<R> {
    pub const fn new(reader: R, duration_seconds: Option<f64>) -> Self {
        Self {
            reader,
            duration_seconds,
        }
    }

    fn read_chunk(&mut self) -> io::Result<Option<String>> {
        let mut buf = Vec::new();
        loop {
            let available = match self.reader.fill_buf() {
                Ok(available) => available,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };

            if available.is_empty() {
                return Ok((!buf.is_empty()).then(|| String::from_utf8_lossy(&buf).into_owned()));
            }

            if let Some(pos) = available.iter().position(|b| *b == b'\r' || *b == b'\n') {
                buf.extend_from_slice(&available[..pos]);
                self.reader.consume(pos + 1);
                return Ok(Some(String::from_utf8_lossy(&buf).into_owned()));
            }

            let len = available.len();
            buf.extend_from_slice(available);
            self.reader.consume(len);
        }
    }
}

impl<R: BufRead> Iterator for StderrEvents<R> {
    type Item = io::Result<StderrEvent>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.read_chunk() {
                Ok(Some(chunk)) if chunk.trim().is_empty() => {}
                Ok(Some(chunk)) => return Some(Ok(parse_chunk(&chunk, self.duration_seconds))),
                Ok(None) => return None,
                Err(e) => return Some(Err(e)),
            }
        }
    }
}
