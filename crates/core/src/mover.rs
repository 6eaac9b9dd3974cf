use crate::error::ProcessError;
use std::fs;
use std::path::Path;

/// 最終パス確定後の移動プリミティブ。中間ディレクトリは再帰的に作る。
/// renameがファイルシステム境界で失敗した場合はコピー+削除で代替する。
pub fn move_file(from: &Path, to: &Path) -> Result<(), ProcessError> {
    let move_error = |source: std::io::Error| ProcessError::Move {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        source,
    };

    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent).map_err(move_error)?;
    }

    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(_) => {
            fs::copy(from, to).map_err(move_error)?;
            fs::remove_file(from).map_err(move_error)?;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::move_file;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn creates_intermediate_directories() {
        let temp = tempdir().expect("tempdir");
        let from = temp.path().join("a.pdf");
        let to = temp.path().join("archive").join("2025").join("a.pdf");
        fs::write(&from, b"x").expect("write source");

        move_file(&from, &to).expect("move must succeed");
        assert!(!from.exists());
        assert_eq!(fs::read(&to).expect("read dest"), b"x");
    }

    #[test]
    fn missing_source_reports_move_error() {
        let temp = tempdir().expect("tempdir");
        let from = temp.path().join("missing.pdf");
        let to = temp.path().join("dest.pdf");

        let err = move_file(&from, &to).expect_err("missing source must fail");
        assert!(err.to_string().contains("移動に失敗"));
    }
}
