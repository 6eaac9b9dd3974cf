use crate::collision::resolve_collision;
use crate::error::ProcessError;
use crate::extract::extract_text;
use crate::matcher::match_rule;
use crate::metadata::{extract_metadata, ExtractedMetadata};
use crate::mover::move_file;
use crate::resolver::resolve_target;
use crate::rules::Rule;
use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub const DEFAULT_MAX_FILE_SIZE: u64 = 100 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct ScanOptions {
    pub source_dir: PathBuf,
    /// move_toの相対パスを解決するルート。既定では監視フォルダ自身。
    pub dest_root: PathBuf,
    /// これを超えるファイルは抽出前にスキップする。
    pub max_file_size: u64,
    pub dry_run: bool,
}

impl ScanOptions {
    pub fn new(source_dir: impl Into<PathBuf>) -> Self {
        let source_dir = source_dir.into();
        Self {
            dest_root: source_dir.clone(),
            source_dir,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            dry_run: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkipReason {
    NonPdf,
    Symlink,
    Oversize,
}

/// ファイル1件につき必ず1レコード。コアは印字せず、CLI層がこれを消費する。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileOutcome {
    pub file: PathBuf,
    pub matched_rule: Option<String>,
    pub final_path: Option<PathBuf>,
    pub error: Option<String>,
    pub skipped: Option<SkipReason>,
}

impl FileOutcome {
    fn unprocessed(file: &Path) -> Self {
        Self {
            file: file.to_path_buf(),
            matched_rule: None,
            final_path: None,
            error: None,
            skipped: None,
        }
    }

    fn skipped(file: &Path, reason: SkipReason) -> Self {
        Self {
            skipped: Some(reason),
            ..Self::unprocessed(file)
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanStats {
    pub scanned_files: usize,
    pub pdf_files: usize,
    pub skipped_non_pdf: usize,
    pub skipped_symlink: usize,
    pub skipped_oversize: usize,
    pub skipped_processed: usize,
    pub matched: usize,
    pub moved: usize,
    pub unmatched: usize,
    pub errors: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReport {
    pub outcomes: Vec<FileOutcome>,
    pub stats: ScanStats,
}

/// 1ファイルを抽出→照合→解決→衝突回避→移動まで処理する。
/// ファイル単位の失敗はここで飲み込み、成果レコードとして返す。
pub fn process_file(path: &Path, rules: &[Rule], options: &ScanOptions) -> FileOutcome {
    process_file_with(path, rules, options, extract_text)
}

/// テキスト抽出器を注入できる版。テストと抽出器差し替えのための継ぎ目。
pub fn process_file_with(
    path: &Path,
    rules: &[Rule],
    options: &ScanOptions,
    extract: impl Fn(&Path) -> Result<String, ProcessError>,
) -> FileOutcome {
    let mut outcome = FileOutcome::unprocessed(path);

    let text = match extract(path) {
        Ok(text) => text,
        Err(err) => {
            outcome.error = Some(err.to_string());
            return outcome;
        }
    };

    let metadata = extract_metadata(&text, file_created_to_local(path));
    let extension = path
        .extension()
        .map(|v| v.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    let Some(rule) = match_rule(rules, &extension, &text) else {
        // どのルールにも当たらないのは失敗ではない。ファイルは放置する。
        return outcome;
    };
    outcome.matched_rule = Some(rule.name.clone());

    match resolve_and_move(path, rule, &metadata, options) {
        Ok(final_path) => outcome.final_path = Some(final_path),
        Err(err) => outcome.error = Some(err.to_string()),
    }

    outcome
}

fn resolve_and_move(
    path: &Path,
    rule: &Rule,
    metadata: &ExtractedMetadata,
    options: &ScanOptions,
) -> Result<PathBuf, ProcessError> {
    let target = resolve_target(rule, metadata, path, &options.dest_root)?;
    let file_name = resolve_collision(&target.dest_dir, &target.file_name, |p| p.exists())?;
    let final_path = target.dest_dir.join(file_name);

    if !options.dry_run {
        move_file(path, &final_path)?;
    }

    Ok(final_path)
}

/// 監視フォルダを1回走査する。直下のみ (整理先サブフォルダは再走査しない)。
/// processedは呼び出し側が所有するセッションスコープの処理済み集合。
pub fn scan_folder(
    options: &ScanOptions,
    rules: &[Rule],
    processed: &mut HashSet<PathBuf>,
) -> Result<ScanReport> {
    scan_folder_with(options, rules, processed, extract_text)
}

pub fn scan_folder_with(
    options: &ScanOptions,
    rules: &[Rule],
    processed: &mut HashSet<PathBuf>,
    extract: impl Fn(&Path) -> Result<String, ProcessError>,
) -> Result<ScanReport> {
    if !options.source_dir.exists() {
        anyhow::bail!(
            "監視フォルダが存在しません: {}",
            options.source_dir.display()
        );
    }

    let mut stats = ScanStats::default();
    let mut outcomes = Vec::new();

    for entry in WalkDir::new(&options.source_dir)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.with_context(|| {
            format!(
                "フォルダ走査に失敗しました: {}",
                options.source_dir.display()
            )
        })?;
        let path = entry.path();
        if entry.file_type().is_dir() {
            continue;
        }
        stats.scanned_files += 1;

        if processed.contains(path) {
            stats.skipped_processed += 1;
            continue;
        }
        processed.insert(path.to_path_buf());

        if !is_pdf(path) {
            stats.skipped_non_pdf += 1;
            outcomes.push(FileOutcome::skipped(path, SkipReason::NonPdf));
            continue;
        }
        stats.pdf_files += 1;

        // シンボリックリンクは参照先を一切触らない
        if entry.file_type().is_symlink() {
            stats.skipped_symlink += 1;
            outcomes.push(FileOutcome::skipped(path, SkipReason::Symlink));
            continue;
        }

        let size = entry.metadata().map(|m| m.len()).unwrap_or(0);
        if size > options.max_file_size {
            stats.skipped_oversize += 1;
            outcomes.push(FileOutcome::skipped(path, SkipReason::Oversize));
            continue;
        }

        let outcome = process_file_with(path, rules, options, &extract);
        if outcome.error.is_some() {
            stats.errors += 1;
        }
        match &outcome.matched_rule {
            Some(_) => {
                stats.matched += 1;
                if outcome.final_path.is_some() {
                    stats.moved += 1;
                }
            }
            None if outcome.error.is_none() => stats.unmatched += 1,
            None => {}
        }
        outcomes.push(outcome);
    }

    Ok(ScanReport { outcomes, stats })
}

fn is_pdf(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().eq_ignore_ascii_case("pdf"))
        .unwrap_or(false)
}

fn file_created_to_local(path: &Path) -> DateTime<Local> {
    fs::metadata(path)
        .and_then(|meta| meta.created().or_else(|_| meta.modified()))
        .map(DateTime::from)
        .unwrap_or_else(|_| Local::now())
}
