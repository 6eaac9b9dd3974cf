use crate::metadata::ExtractedMetadata;
use std::path::Path;

/// rename_pattern / move_to 共通のプレースホルダ。
/// 未知のプレースホルダは波括弧ごとリテラルとして残す方針
/// (黙って捨てない)。{date} が欠落している場合は空文字列に展開する。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplatePart {
    Literal(String),
    Token(Token),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    Date,
    Year,
    Ext,
    DateCreated,
    OriginalName,
}

/// トークン展開に使う値の表。resolverがメタデータと元ファイル名から組み立てる。
#[derive(Debug, Clone)]
pub struct TemplateContext {
    pub date: Option<String>,
    pub year: String,
    /// 先頭ドット付き・小文字の元拡張子 (例: ".pdf")。
    pub ext: String,
    /// ファイル作成日時を YYYY-MM-DD にしたもの。
    pub date_created: String,
    /// 拡張子を除いた元ファイル名。
    pub original_name: String,
}

impl TemplateContext {
    pub fn new(metadata: &ExtractedMetadata, original_path: &Path) -> Self {
        let ext = original_path
            .extension()
            .map(|v| format!(".{}", v.to_string_lossy().to_lowercase()))
            .unwrap_or_default();
        let original_name = original_path
            .file_stem()
            .map(|v| v.to_string_lossy().to_string())
            .unwrap_or_default();

        Self {
            date: metadata.date.clone(),
            year: metadata.year.clone(),
            ext,
            date_created: metadata.file_created.format("%Y-%m-%d").to_string(),
            original_name,
        }
    }
}

/// テンプレートを分解する。全域関数で失敗しない。
/// 未知トークンと閉じ忘れの波括弧はそのままリテラルになる。
pub fn parse_template(input: &str) -> Vec<TemplatePart> {
    let mut parts = Vec::new();
    let mut literal = String::new();
    let mut rest = input;

    while let Some(open) = rest.find('{') {
        literal.push_str(&rest[..open]);
        let after_open = &rest[open + 1..];

        match after_open.find('}') {
            Some(close) => {
                let name = &after_open[..close];
                match parse_token(name) {
                    Some(token) => {
                        if !literal.is_empty() {
                            parts.push(TemplatePart::Literal(std::mem::take(&mut literal)));
                        }
                        parts.push(TemplatePart::Token(token));
                    }
                    None => {
                        literal.push('{');
                        literal.push_str(name);
                        literal.push('}');
                    }
                }
                rest = &after_open[close + 1..];
            }
            None => {
                literal.push('{');
                rest = after_open;
            }
        }
    }

    literal.push_str(rest);
    if !literal.is_empty() {
        parts.push(TemplatePart::Literal(literal));
    }

    parts
}

pub fn render_template(parts: &[TemplatePart], ctx: &TemplateContext) -> String {
    let mut output = String::new();
    for part in parts {
        match part {
            TemplatePart::Literal(s) => output.push_str(s),
            TemplatePart::Token(token) => {
                let value = match token {
                    Token::Date => ctx.date.as_deref().unwrap_or_default(),
                    Token::Year => &ctx.year,
                    Token::Ext => &ctx.ext,
                    Token::DateCreated => &ctx.date_created,
                    Token::OriginalName => &ctx.original_name,
                };
                output.push_str(value);
            }
        }
    }
    output
}

fn parse_token(name: &str) -> Option<Token> {
    match name {
        "date" => Some(Token::Date),
        "year" => Some(Token::Year),
        "ext" => Some(Token::Ext),
        "date_created" => Some(Token::DateCreated),
        "original_name" => Some(Token::OriginalName),
        _ => None,
    }
}
