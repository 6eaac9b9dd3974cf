use crate::rules::Rule;

/// ルールを宣言順に評価し、最初に全条件を満たした1件を返す。
/// どのルールにも当たらないのは正常な結果 (ファイルは放置される)。
pub fn match_rule<'r>(rules: &'r [Rule], extension: &str, text: &str) -> Option<&'r Rule> {
    let text_lower = text.to_lowercase();
    rules
        .iter()
        .find(|rule| rule_matches(rule, extension, &text_lower))
}

/// 拡張子が一致し、かつ全キーワードが部分文字列として含まれること (純粋なAND)。
/// キーワード列が空なら内容条件は常に成立。
fn rule_matches(rule: &Rule, extension: &str, text_lower: &str) -> bool {
    if !rule.conditions.extension.eq_ignore_ascii_case(extension) {
        return false;
    }
    rule.conditions
        .content_contains
        .iter()
        .all(|keyword| text_lower.contains(&keyword.to_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{Rule, RuleActions, RuleConditions};

    fn rule(name: &str, extension: &str, keywords: &[&str]) -> Rule {
        Rule {
            name: name.to_string(),
            description: None,
            conditions: RuleConditions {
                extension: extension.to_string(),
                content_contains: keywords.iter().map(|k| k.to_string()).collect(),
            },
            actions: RuleActions {
                rename_pattern: Some("{original_name}{ext}".to_string()),
                move_to: Some(name.to_string()),
            },
        }
    }

    #[test]
    fn all_keywords_must_be_present() {
        let rules = vec![rule("receipts", "pdf", &["receipt", "icloud"])];
        assert!(match_rule(&rules, "pdf", "your receipt is here").is_none());
        assert!(match_rule(&rules, "pdf", "iCloud Receipt attached").is_some());
    }

    #[test]
    fn keyword_match_is_case_insensitive() {
        let rules = vec![rule("invoices", "pdf", &["INVOICE"])];
        let matched = match_rule(&rules, "pdf", "invoice #123").expect("must match");
        assert_eq!(matched.name, "invoices");
    }

    #[test]
    fn extension_must_match_case_insensitively() {
        let rules = vec![rule("invoices", "pdf", &["invoice"])];
        assert!(match_rule(&rules, "PDF", "invoice").is_some());
        assert!(match_rule(&rules, "txt", "invoice").is_none());
    }

    #[test]
    fn first_declared_match_wins() {
        let rules = vec![
            rule("specific", "pdf", &["invoice", "acme"]),
            rule("generic", "pdf", &["invoice"]),
        ];
        let matched = match_rule(&rules, "pdf", "ACME invoice #9").expect("must match");
        assert_eq!(matched.name, "specific");

        let matched = match_rule(&rules, "pdf", "some invoice").expect("must match");
        assert_eq!(matched.name, "generic");
    }

    #[test]
    fn empty_keyword_list_matches_on_extension_alone() {
        let rules = vec![rule("any pdf", "pdf", &[])];
        assert!(match_rule(&rules, "pdf", "").is_some());
    }
}
