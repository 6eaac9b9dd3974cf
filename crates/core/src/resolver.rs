use crate::error::ProcessError;
use crate::metadata::ExtractedMetadata;
use crate::rules::Rule;
use crate::sanitize::sanitize_filename;
use crate::template::{parse_template, render_template, TemplateContext};
use std::path::{Component, Path, PathBuf};

/// ルールの展開結果。ファイル名はサニタイズ済み、
/// ディレクトリは許可ルート配下であることを検証済み。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTarget {
    pub file_name: String,
    pub dest_dir: PathBuf,
}

/// rename_pattern / move_to をメタデータで展開して移動先を決める。
///
/// move_toが相対パスの場合はdest_rootからの相対として解決し、
/// `..` で許可ルートの外に出る展開はPathEscapeで拒否する (黙って丸めない)。
/// 絶対パスのmove_toは明示的な設定として信頼し、そのまま使う。
pub fn resolve_target(
    rule: &Rule,
    metadata: &ExtractedMetadata,
    original_path: &Path,
    dest_root: &Path,
) -> Result<ResolvedTarget, ProcessError> {
    let ctx = TemplateContext::new(metadata, original_path);

    let file_name = match rule.actions.rename_pattern.as_deref() {
        Some(pattern) if !pattern.is_empty() => {
            render_template(&parse_template(pattern), &ctx)
        }
        _ => original_path
            .file_name()
            .map(|v| v.to_string_lossy().to_string())
            .unwrap_or_default(),
    };
    let file_name = sanitize_filename(&file_name);

    let dest_dir = match rule.actions.move_to.as_deref() {
        Some(target) if !target.is_empty() => {
            let rendered = render_template(&parse_template(target), &ctx);
            let rendered = PathBuf::from(rendered);
            if rendered.is_absolute() {
                rendered
            } else {
                normalize_under_root(dest_root, &rendered).ok_or_else(|| {
                    ProcessError::PathEscape {
                        destination: dest_root.join(&rendered),
                    }
                })?
            }
        }
        _ => dest_root.to_path_buf(),
    };

    Ok(ResolvedTarget {
        file_name,
        dest_dir,
    })
}

/// 相対パスを字句的に正規化してルートに結合する。
/// `..` がルートを突き抜けたらNone。
fn normalize_under_root(root: &Path, relative: &Path) -> Option<PathBuf> {
    let mut parts: Vec<std::ffi::OsString> = Vec::new();
    for component in relative.components() {
        match component {
            Component::CurDir => {}
            Component::Normal(part) => parts.push(part.to_os_string()),
            Component::ParentDir => {
                parts.pop()?;
            }
            Component::RootDir | Component::Prefix(_) => return None,
        }
    }

    let mut out = root.to_path_buf();
    for part in parts {
        out.push(part);
    }
    Some(out)
}
