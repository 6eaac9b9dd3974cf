use chrono::{DateTime, Datelike, Local, NaiveDate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

const YEAR_MIN: i32 = 1900;
const YEAR_MAX: i32 = 2100;

/// 1ファイルにつき1回だけ生成する抽出メタデータ。
/// dateは見つからなければ欠落のまま (エラーではない)。
/// yearは日付→単独の西暦トークン→処理時点の年、の順でフォールバックする。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedMetadata {
    /// YYYY-MM-DD 形式に正規化済み。
    pub date: Option<String>,
    /// 4桁の西暦。必ず埋まる。
    pub year: String,
    pub raw_text: String,
    /// ファイル作成日時。{date_created} の展開に使う。
    pub file_created: DateTime<Local>,
}

/// 自由テキストから日付と年を推定する。空テキストでも必ず有効な値を返す。
pub fn extract_metadata(text: &str, file_created: DateTime<Local>) -> ExtractedMetadata {
    let date = find_first_date(text);
    let year = match &date {
        Some(date) => date[..4].to_string(),
        None => find_first_year(text)
            .unwrap_or_else(|| format!("{:04}", Local::now().year())),
    };

    ExtractedMetadata {
        date,
        year,
        raw_text: text.to_string(),
        file_created,
    }
}

/// 対応する日付表現のうち、文書内で最も早く現れる妥当なものを採用する。
/// 形式: "January 15, 2025" / "01/15/2025" / "2025-01-15" (区切りは - と / 両対応)。
fn find_first_date(text: &str) -> Option<String> {
    let mut best: Option<(usize, NaiveDate)> = None;

    for (start, date) in first_month_name_date(text)
        .into_iter()
        .chain(first_numeric_mdy_date(text))
        .chain(first_iso_date(text))
    {
        if best.map(|(pos, _)| start < pos).unwrap_or(true) {
            best = Some((start, date));
        }
    }

    best.map(|(_, date)| date.format("%Y-%m-%d").to_string())
}

fn first_month_name_date(text: &str) -> Option<(usize, NaiveDate)> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(
            r"(?i)\b(Jan(?:uary)?|Feb(?:ruary)?|Mar(?:ch)?|Apr(?:il)?|May|Jun(?:e)?|Jul(?:y)?|Aug(?:ust)?|Sep(?:tember)?|Oct(?:ober)?|Nov(?:ember)?|Dec(?:ember)?)\.?\s+(\d{1,2})(?:,\s*|\s+)(\d{4})\b",
        )
        .expect("month name date pattern must compile")
    });

    for caps in re.captures_iter(text) {
        let whole = caps.get(0)?;
        let month = month_number(caps.get(1)?.as_str())?;
        let day: u32 = caps.get(2)?.as_str().parse().ok()?;
        let year: i32 = caps.get(3)?.as_str().parse().ok()?;
        if let Some(date) = plausible_date(year, month, day) {
            return Some((whole.start(), date));
        }
    }
    None
}

fn first_numeric_mdy_date(text: &str) -> Option<(usize, NaiveDate)> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(r"\b(\d{1,2})[/-](\d{1,2})[/-](\d{4})\b")
            .expect("numeric date pattern must compile")
    });

    for caps in re.captures_iter(text) {
        let whole = caps.get(0)?;
        let month: u32 = caps.get(1)?.as_str().parse().ok()?;
        let day: u32 = caps.get(2)?.as_str().parse().ok()?;
        let year: i32 = caps.get(3)?.as_str().parse().ok()?;
        if let Some(date) = plausible_date(year, month, day) {
            return Some((whole.start(), date));
        }
    }
    None
}

fn first_iso_date(text: &str) -> Option<(usize, NaiveDate)> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(r"\b(\d{4})[/-](\d{1,2})[/-](\d{1,2})\b")
            .expect("iso date pattern must compile")
    });

    for caps in re.captures_iter(text) {
        let whole = caps.get(0)?;
        let year: i32 = caps.get(1)?.as_str().parse().ok()?;
        let month: u32 = caps.get(2)?.as_str().parse().ok()?;
        let day: u32 = caps.get(3)?.as_str().parse().ok()?;
        if let Some(date) = plausible_date(year, month, day) {
            return Some((whole.start(), date));
        }
    }
    None
}

fn find_first_year(text: &str) -> Option<String> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"\b(\d{4})\b").expect("year pattern must compile"));

    for caps in re.captures_iter(text) {
        let year: i32 = caps.get(1)?.as_str().parse().ok()?;
        if (YEAR_MIN..=YEAR_MAX).contains(&year) {
            return Some(format!("{year:04}"));
        }
    }
    None
}

fn plausible_date(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    if !(YEAR_MIN..=YEAR_MAX).contains(&year) {
        return None;
    }
    NaiveDate::from_ymd_opt(year, month, day)
}

fn month_number(name: &str) -> Option<u32> {
    let prefix = name.get(..3)?.to_ascii_lowercase();
    let month = match prefix.as_str() {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(month)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Local;

    fn meta(text: &str) -> ExtractedMetadata {
        extract_metadata(text, Local::now())
    }

    #[test]
    fn parses_month_name_date() {
        let m = meta("Your iCloud receipt for January 15, 2025. Thank you.");
        assert_eq!(m.date.as_deref(), Some("2025-01-15"));
        assert_eq!(m.year, "2025");
    }

    #[test]
    fn parses_abbreviated_month_name() {
        let m = meta("Invoice issued Jan 3 2024");
        assert_eq!(m.date.as_deref(), Some("2024-01-03"));
    }

    #[test]
    fn parses_numeric_mdy_and_iso_dates() {
        assert_eq!(meta("due 01/15/2025").date.as_deref(), Some("2025-01-15"));
        assert_eq!(meta("due 2025-01-15").date.as_deref(), Some("2025-01-15"));
        assert_eq!(meta("due 2025/1/5").date.as_deref(), Some("2025-01-05"));
    }

    #[test]
    fn earliest_occurrence_wins_across_forms() {
        let m = meta("2023-03-01 was settled, see also January 15, 2025");
        assert_eq!(m.date.as_deref(), Some("2023-03-01"));
        assert_eq!(m.year, "2023");
    }

    #[test]
    fn implausible_dates_are_not_matches() {
        let m = meta("order 99/99/2025 then 02/03/2025");
        assert_eq!(m.date.as_deref(), Some("2025-02-03"));
    }

    #[test]
    fn falls_back_to_standalone_year() {
        let m = meta("Annual report 2022, no explicit dates here");
        assert_eq!(m.date, None);
        assert_eq!(m.year, "2022");
    }

    #[test]
    fn standalone_year_outside_range_is_ignored() {
        let m = meta("serial 8823 and part 0042");
        assert_eq!(m.date, None);
        assert_eq!(m.year, format!("{:04}", Local::now().year()));
    }

    #[test]
    fn empty_text_falls_back_to_current_year() {
        let m = meta("");
        assert_eq!(m.date, None);
        assert_eq!(m.year, format!("{:04}", Local::now().year()));

        let m = meta("   \n\t ");
        assert_eq!(m.date, None);
    }
}
