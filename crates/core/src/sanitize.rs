const WINDOWS_RESERVED_NAMES: &[&str] = &[
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

const MAX_FILENAME_BYTES: usize = 255;
const TRUNCATION_MARGIN_BYTES: usize = 10;

/// ファイル名をクロスプラットフォーム安全な形に整える。全域関数で失敗しない。
/// 1回適用すれば不動点になる (sanitize(sanitize(x)) == sanitize(x))。
///
/// 文字置換と圧縮を先に行い、バイト長の切り詰めは最後に行う。
/// 拡張子は切り詰め対象にしない。
pub fn sanitize_filename(value: &str) -> String {
    let replaced: String = value
        .chars()
        .filter(|ch| !ch.is_control())
        .map(|ch| if is_disallowed_char(ch) { '_' } else { ch })
        .collect();
    let collapsed = collapse_underscores(&replaced);
    // 末尾のドットはsplit_extensionで拡張子扱いされないよう先に落とす
    let trimmed = collapsed
        .trim()
        .trim_end_matches(|c: char| c.is_whitespace() || c == '.');

    let (stem, extension) = split_extension(trimmed);
    let mut stem = stem
        .trim_matches(|c: char| c.is_whitespace() || c == '.')
        .to_string();

    if stem.is_empty() {
        stem = "unnamed".to_string();
    }

    if is_windows_reserved(&stem) {
        stem.insert(0, '_');
    }

    let base_limit = MAX_FILENAME_BYTES - TRUNCATION_MARGIN_BYTES;
    // 切り詰めで末尾にドットや空白が現れ得るので、もう一度だけ整える
    let mut stem = truncate_at_char_boundary(&stem, base_limit)
        .trim_end_matches(|c: char| c.is_whitespace() || c == '.')
        .to_string();

    if stem.is_empty() {
        stem = "unnamed".to_string();
    }
    if is_windows_reserved(&stem) {
        stem.insert(0, '_');
    }

    format!("{}{}", stem, extension)
}

fn collapse_underscores(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut prev_underscore = false;
    for ch in value.chars() {
        if ch == '_' {
            if prev_underscore {
                continue;
            }
            prev_underscore = true;
        } else {
            prev_underscore = false;
        }
        out.push(ch);
    }
    out
}

/// 最後のドットで拡張子を切り出す。先頭ドット (隠しファイル) は拡張子扱いしない。
fn split_extension(value: &str) -> (&str, &str) {
    match value.rfind('.') {
        Some(pos) if pos > 0 => value.split_at(pos),
        _ => (value, ""),
    }
}

/// UTF-8のコードポイント境界を割らずに最大max_bytesへ切り詰める。
fn truncate_at_char_boundary(value: &str, max_bytes: usize) -> &str {
    if value.len() <= max_bytes {
        return value;
    }
    let mut end = max_bytes;
    while !value.is_char_boundary(end) {
        end -= 1;
    }
    &value[..end]
}

fn is_disallowed_char(ch: char) -> bool {
    matches!(ch, '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|')
}

fn is_windows_reserved(stem: &str) -> bool {
    WINDOWS_RESERVED_NAMES
        .iter()
        .any(|reserved| reserved.eq_ignore_ascii_case(stem))
}
