use crate::pipeline::{scan_folder, ScanOptions, ScanReport};
use crate::rules::Rule;
use anyhow::Result;
use std::collections::HashSet;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// 協調的なポーリングループ。走査→報告→スリープを繰り返す。
/// 書き込み側は常に1つで、1ファイルの処理が終わるまで次に進まない。
/// 停止は外部のプロセス終了に任せる (処理中のファイルだけ完了させる)。
///
/// processedは呼び出し側が所有するセッションスコープの集合。
/// 再起動をまたいで永続化はしない。
pub fn watch_folder(
    options: &ScanOptions,
    rules: &[Rule],
    interval: Duration,
    max_cycles: Option<u64>,
    processed: &mut HashSet<PathBuf>,
    mut on_report: impl FnMut(&ScanReport),
) -> Result<()> {
    let mut cycle = 0u64;
    loop {
        let report = scan_folder(options, rules, processed)?;
        on_report(&report);

        cycle += 1;
        if let Some(max) = max_cycles {
            if cycle >= max {
                return Ok(());
            }
        }
        thread::sleep(interval);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::sample_rules;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn bounded_watch_runs_requested_cycles() {
        let temp = tempdir().expect("tempdir");
        let source = temp.path().join("watch");
        fs::create_dir_all(&source).expect("source");
        fs::write(source.join("notes.txt"), b"x").expect("write");

        let options = ScanOptions::new(&source);
        let mut processed = HashSet::new();
        let mut reports = 0usize;

        watch_folder(
            &options,
            &sample_rules(),
            Duration::from_millis(1),
            Some(3),
            &mut processed,
            |_| reports += 1,
        )
        .expect("watch must succeed");

        assert_eq!(reports, 3);
    }

    #[test]
    fn missing_folder_stops_the_loop_with_error() {
        let temp = tempdir().expect("tempdir");
        let options = ScanOptions::new(temp.path().join("gone"));
        let mut processed = HashSet::new();

        let err = watch_folder(
            &options,
            &sample_rules(),
            Duration::from_millis(1),
            Some(1),
            &mut processed,
            |_| {},
        )
        .expect_err("missing folder must fail");
        assert!(err.to_string().contains("監視フォルダ"));
    }
}
