use crate::error::ProcessError;
use std::path::Path;

const MAX_COLLISION_PROBES: usize = 10_000;

/// 既存ファイルを決して上書きしない名前を返す。
/// 空いていればそのまま、衝突したら stem_1.ext, stem_2.ext, ... と
/// 連番を振っていく。上限を超えたらCollisionExhausted。
pub fn resolve_collision(
    dir: &Path,
    file_name: &str,
    exists: impl Fn(&Path) -> bool,
) -> Result<String, ProcessError> {
    if !exists(&dir.join(file_name)) {
        return Ok(file_name.to_string());
    }

    let (stem, extension) = split_name(file_name);
    for n in 1..=MAX_COLLISION_PROBES {
        let candidate = format!("{stem}_{n}{extension}");
        if !exists(&dir.join(&candidate)) {
            return Ok(candidate);
        }
    }

    Err(ProcessError::CollisionExhausted {
        dir: dir.to_path_buf(),
        file_name: file_name.to_string(),
    })
}

fn split_name(file_name: &str) -> (&str, &str) {
    match file_name.rfind('.') {
        Some(pos) if pos > 0 => file_name.split_at(pos),
        _ => (file_name, ""),
    }
}
