use std::path::PathBuf;
use thiserror::Error;

/// 1ファイル処理中に起こり得る失敗。バッチ全体は止めず、
/// ファイル単位の境界で捕捉して成果レコードに記録する。
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("PDFテキスト抽出に失敗しました: {}: {reason}", path.display())]
    Extraction { path: PathBuf, reason: String },

    #[error("移動先が許可ルートの外に出ています: {}", destination.display())]
    PathEscape { destination: PathBuf },

    #[error("重複回避の試行上限に達しました: {} 内の {file_name}", dir.display())]
    CollisionExhausted { dir: PathBuf, file_name: String },

    #[error("ファイル移動に失敗しました: {} -> {}", from.display(), to.display())]
    Move {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// ルールファイル読み込み時の失敗。処理開始前に致命エラーとして返す。
#[derive(Debug, Error)]
pub enum RuleError {
    #[error("ルールファイルを読めませんでした: {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("ルールファイルのパースに失敗しました: {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("不正なルールです ({name}): {reason}")]
    Invalid { name: String, reason: String },
}
