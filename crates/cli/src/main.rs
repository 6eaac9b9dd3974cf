use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use pdf_organizer_core::{
    app_paths, load_config, load_rules, scan_folder, watch_folder, write_sample_rules, Rule,
    ScanOptions, ScanReport, SkipReason,
};
use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Parser)]
#[command(name = "pdf-organizer-cli")]
#[command(about = "PDFの内容をルールで分類し、リネームして年/カテゴリ別に整理します")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// フォルダを1回だけ走査して整理する
    Run(RunArgs),
    /// フォルダを定期的に走査し続ける
    Watch(WatchArgs),
    Rules(RulesArgs),
    Config(ConfigArgs),
}

#[derive(Debug, Args)]
struct RunArgs {
    #[command(flatten)]
    scan: ScanArgs,
}

#[derive(Debug, Args)]
struct WatchArgs {
    #[command(flatten)]
    scan: ScanArgs,
    /// 走査間隔 (秒)
    #[arg(long)]
    interval: Option<u64>,
    /// 走査回数の上限。省略時は停止されるまで続ける
    #[arg(long)]
    cycles: Option<u64>,
}

#[derive(Debug, Args)]
struct ScanArgs {
    /// 監視フォルダ。省略時は設定ファイルのsource_dir
    #[arg(long)]
    source: Option<PathBuf>,
    /// 整理先ルート。省略時は監視フォルダ自身
    #[arg(long)]
    dest: Option<PathBuf>,
    /// ルールファイル (JSON)
    #[arg(long)]
    rules: Option<PathBuf>,
    #[arg(long, default_value_t = false)]
    dry_run: bool,
    /// このバイト数を超えるファイルは抽出せずスキップする
    #[arg(long)]
    max_file_size: Option<u64>,
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    output: OutputFormat,
}

#[derive(Debug, Args)]
struct RulesArgs {
    #[command(subcommand)]
    action: RulesAction,
}

#[derive(Debug, Subcommand)]
enum RulesAction {
    /// サンプルルールファイルを作成する
    Init {
        #[arg(long)]
        path: Option<PathBuf>,
    },
    /// 読み込んだルールを表示する
    Show {
        #[arg(long)]
        path: Option<PathBuf>,
    },
}

#[derive(Debug, Args)]
struct ConfigArgs {
    #[command(subcommand)]
    action: ConfigAction,
}

#[derive(Debug, Subcommand)]
enum ConfigAction {
    Show,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run(args) => cmd_run(args),
        Commands::Watch(args) => cmd_watch(args),
        Commands::Rules(rules) => match rules.action {
            RulesAction::Init { path } => cmd_rules_init(path),
            RulesAction::Show { path } => cmd_rules_show(path),
        },
        Commands::Config(config) => match config.action {
            ConfigAction::Show => cmd_config_show(),
        },
    }
}

fn cmd_run(args: RunArgs) -> Result<()> {
    let (options, rules) = build_scan(&args.scan)?;
    let mut processed = HashSet::new();
    let report = scan_folder(&options, &rules, &mut processed)?;

    print_report(&report, args.scan.output)?;

    if options.dry_run {
        eprintln!("dry-runモード: 実ファイルは移動していません。");
    }
    Ok(())
}

fn cmd_watch(args: WatchArgs) -> Result<()> {
    let config = load_config()?;
    let (options, rules) = build_scan(&args.scan)?;
    let interval = Duration::from_secs(args.interval.unwrap_or(config.interval_secs));

    eprintln!(
        "監視開始: {} ({}秒間隔)",
        options.source_dir.display(),
        interval.as_secs()
    );

    let output = args.scan.output;
    let mut processed = HashSet::new();
    watch_folder(
        &options,
        &rules,
        interval,
        args.cycles,
        &mut processed,
        |report| {
            if !report.outcomes.is_empty() {
                if let Err(err) = print_report(report, output) {
                    eprintln!("出力に失敗しました: {err}");
                }
            }
        },
    )
}

fn cmd_rules_init(path: Option<PathBuf>) -> Result<()> {
    let path = match path {
        Some(path) => path,
        None => app_paths()?.rules_path,
    };
    if path.exists() {
        anyhow::bail!("ルールファイルは既に存在します: {}", path.display());
    }
    write_sample_rules(&path)?;
    println!("サンプルルールを作成しました: {}", path.display());
    Ok(())
}

fn cmd_rules_show(path: Option<PathBuf>) -> Result<()> {
    let path = resolve_rules_path(path)?;
    let rules = load_rules(&path)?;
    println!("ルールファイル: {}", path.display());
    println!("{}", serde_json::to_string_pretty(&rules)?);
    Ok(())
}

fn cmd_config_show() -> Result<()> {
    let config = load_config()?;
    let paths = app_paths()?;
    println!("設定ファイル: {}", paths.config_path.display());
    println!("{}", toml::to_string_pretty(&config)?);
    Ok(())
}

fn build_scan(args: &ScanArgs) -> Result<(ScanOptions, Vec<Rule>)> {
    let config = load_config()?;

    let source = args
        .source
        .clone()
        .or(config.source_dir.clone())
        .context("監視フォルダが指定されていません (--source または設定ファイル)")?;

    let mut options = ScanOptions::new(source);
    if let Some(dest) = args.dest.clone().or(config.dest_dir.clone()) {
        options.dest_root = dest;
    }
    options.max_file_size = args.max_file_size.unwrap_or(config.max_file_size_bytes);
    options.dry_run = args.dry_run || config.dry_run_default;

    let rules_path = resolve_rules_path(args.rules.clone())?;
    let rules = load_rules(&rules_path)?;

    Ok((options, rules))
}

fn resolve_rules_path(explicit: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path);
    }
    let config = load_config()?;
    if let Some(path) = config.rules_file {
        return Ok(path);
    }
    let path = app_paths()?.rules_path;
    if !path.exists() {
        anyhow::bail!(
            "ルールファイルがありません: {} (`rules init` で作成できます)",
            path.display()
        );
    }
    Ok(path)
}

fn print_report(report: &ScanReport, output: OutputFormat) -> Result<()> {
    match output {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(report)?);
        }
        OutputFormat::Table => print_table(report),
    }
    Ok(())
}

fn print_table(report: &ScanReport) {
    for outcome in &report.outcomes {
        match (&outcome.skipped, &outcome.error, &outcome.final_path) {
            (Some(SkipReason::NonPdf), _, _) => {
                println!("{} : スキップ (PDF以外)", outcome.file.display());
            }
            (Some(SkipReason::Symlink), _, _) => {
                println!("{} : スキップ (シンボリックリンク)", outcome.file.display());
            }
            (Some(SkipReason::Oversize), _, _) => {
                println!("{} : スキップ (サイズ上限超過)", outcome.file.display());
            }
            (None, Some(error), _) => {
                println!("{} : エラー {}", outcome.file.display(), error);
            }
            (None, None, Some(final_path)) => {
                println!(
                    "{} -> {} ({})",
                    outcome.file.display(),
                    final_path.display(),
                    outcome.matched_rule.as_deref().unwrap_or("-")
                );
            }
            (None, None, None) => {
                println!("{} : ルール該当なし", outcome.file.display());
            }
        }
    }

    println!(
        "\n集計: scanned={} pdf={} matched={} moved={} unmatched={} errors={} skip(symlink={} oversize={} processed={} non_pdf={})",
        report.stats.scanned_files,
        report.stats.pdf_files,
        report.stats.matched,
        report.stats.moved,
        report.stats.unmatched,
        report.stats.errors,
        report.stats.skipped_symlink,
        report.stats.skipped_oversize,
        report.stats.skipped_processed,
        report.stats.skipped_non_pdf
    );
}
