use crate::error::RuleError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// 宣言的な分類ルール。読み込み後は不変。リスト順に評価され、
/// 最初に全条件を満たした1件だけがファイルを支配する。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rule {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub conditions: RuleConditions,
    pub actions: RuleActions,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleConditions {
    /// ドット無しの拡張子 (例: "pdf")。大文字小文字は無視して比較する。
    pub extension: String,
    /// AND条件のキーワード列。空なら常に成立。
    #[serde(default)]
    pub content_contains: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleActions {
    /// 省略時は元のファイル名を維持する。
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rename_pattern: Option<String>,
    /// 絶対パス、または整理先ルートからの相対パス。省略時はルート直下。
    /// {year} などのプレースホルダを展開できる。
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub move_to: Option<String>,
}

/// ルールファイル (JSON配列) を読み込み、処理開始前に検証する。
/// 不正なエントリはどのルールかを特定できるエラーで弾く。
pub fn load_rules(path: &Path) -> Result<Vec<Rule>, RuleError> {
    let raw = fs::read_to_string(path).map_err(|source| RuleError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let rules: Vec<Rule> = serde_json::from_str(&raw).map_err(|source| RuleError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    for rule in &rules {
        validate_rule(rule)?;
    }

    Ok(rules)
}

fn validate_rule(rule: &Rule) -> Result<(), RuleError> {
    if rule.name.trim().is_empty() {
        return Err(RuleError::Invalid {
            name: "(無名)".to_string(),
            reason: "nameが空です".to_string(),
        });
    }
    if rule.conditions.extension.trim().is_empty() {
        return Err(RuleError::Invalid {
            name: rule.name.clone(),
            reason: "conditions.extensionが空です".to_string(),
        });
    }
    if rule.conditions.extension.starts_with('.') {
        return Err(RuleError::Invalid {
            name: rule.name.clone(),
            reason: "conditions.extensionはドット無しで指定してください".to_string(),
        });
    }
    if rule
        .conditions
        .content_contains
        .iter()
        .any(|keyword| keyword.trim().is_empty())
    {
        return Err(RuleError::Invalid {
            name: rule.name.clone(),
            reason: "content_containsに空のキーワードがあります".to_string(),
        });
    }
    if rule.actions.rename_pattern.is_none() && rule.actions.move_to.is_none() {
        return Err(RuleError::Invalid {
            name: rule.name.clone(),
            reason: "actionsにrename_patternもmove_toもありません".to_string(),
        });
    }
    Ok(())
}

/// 初回セットアップ用のサンプルルール一式。
pub fn sample_rules() -> Vec<Rule> {
    vec![
        Rule {
            name: "App Store Receipts".to_string(),
            description: Some("App Store/iCloudのレシートを整理".to_string()),
            conditions: RuleConditions {
                extension: "pdf".to_string(),
                content_contains: vec!["receipt".to_string(), "icloud".to_string()],
            },
            actions: RuleActions {
                rename_pattern: Some("App Store_{date}_{year}{ext}".to_string()),
                move_to: Some("Receipts/{year}".to_string()),
            },
        },
        Rule {
            name: "Bank Statements".to_string(),
            description: Some("銀行の取引明細を整理".to_string()),
            conditions: RuleConditions {
                extension: "pdf".to_string(),
                content_contains: vec!["statement".to_string(), "account".to_string()],
            },
            actions: RuleActions {
                rename_pattern: Some("Bank_Statement_{date}{ext}".to_string()),
                move_to: Some("Banking/Statements/{year}".to_string()),
            },
        },
        Rule {
            name: "Invoices".to_string(),
            description: Some("請求書を整理".to_string()),
            conditions: RuleConditions {
                extension: "pdf".to_string(),
                content_contains: vec!["invoice".to_string()],
            },
            actions: RuleActions {
                rename_pattern: Some("Invoice_{date}_{year}{ext}".to_string()),
                move_to: Some("Invoices/{year}".to_string()),
            },
        },
    ]
}

pub fn write_sample_rules(path: &Path) -> Result<(), RuleError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| RuleError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    }
    let body = serde_json::to_string_pretty(&sample_rules()).map_err(|source| RuleError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, body).map_err(|source| RuleError::Io {
        path: path.to_path_buf(),
        source,
    })
}
