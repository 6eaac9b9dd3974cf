use crate::error::ProcessError;
use std::path::Path;

/// PDF本文のテキストを取り出す。暗号化・破損などで読めない場合は
/// Extractionエラーを返し、呼び出し側がskip-and-continueする。
/// 画像のみのスキャンPDFは空文字列になり得るが、それはエラーではない。
pub fn extract_text(path: &Path) -> Result<String, ProcessError> {
    pdf_extract::extract_text(path).map_err(|err| ProcessError::Extraction {
        path: path.to_path_buf(),
        reason: err.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::extract_text;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn unreadable_pdf_reports_extraction_error() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("broken.pdf");
        fs::write(&path, b"not a pdf at all").expect("write");

        let err = extract_text(&path).expect_err("garbage must not extract");
        assert!(err.to_string().contains("broken.pdf"));
    }
}
