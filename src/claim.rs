// 🧾 Claim Model - Expense claim records
// One record per submitted claim; immutable once built

use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// EXPENSE CATEGORY
// ============================================================================

/// Fixed expense category list from the entry form.
/// Serialized as the Japanese form labels so records written by the
/// original entry app parse unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExpenseCategory {
    /// 旅費交通費 - travel and transportation
    #[serde(rename = "旅費交通費")]
    Travel,

    /// 消耗品費 - consumables / office supplies
    #[serde(rename = "消耗品費")]
    Supplies,

    /// 交際費 - entertainment
    #[serde(rename = "交際費")]
    Entertainment,

    /// 雑費 - miscellaneous
    #[serde(rename = "雑費")]
    Miscellaneous,

    /// その他 - anything else
    #[serde(rename = "その他")]
    Other,
}

impl ExpenseCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExpenseCategory::Travel => "旅費交通費",
            ExpenseCategory::Supplies => "消耗品費",
            ExpenseCategory::Entertainment => "交際費",
            ExpenseCategory::Miscellaneous => "雑費",
            ExpenseCategory::Other => "その他",
        }
    }
}

// ============================================================================
// ACCOUNT TYPE
// ============================================================================

/// Bank account type from the transfer-details form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountType {
    /// 普通 - ordinary deposit account
    #[serde(rename = "普通")]
    Ordinary,

    /// 当座 - current (checking) account
    #[serde(rename = "当座")]
    Current,

    /// 貯蓄 - savings account
    #[serde(rename = "貯蓄")]
    Savings,
}

impl AccountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountType::Ordinary => "普通",
            AccountType::Current => "当座",
            AccountType::Savings => "貯蓄",
        }
    }
}

// ============================================================================
// LINE ITEM
// ============================================================================

/// One dated expense entry within a claim.
///
/// `paid_on` is kept as a string: normalized rows hold an ISO `YYYY-MM-DD`
/// value, but an unparseable date cell is preserved verbatim rather than
/// discarded (validation only checks presence).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    #[serde(rename = "支払日")]
    pub paid_on: Option<String>,

    #[serde(rename = "店名")]
    pub payee: String,

    #[serde(rename = "金額")]
    pub amount: f64,

    #[serde(rename = "内容")]
    pub memo: String,
}

// ============================================================================
// BANK INFO
// ============================================================================

/// Transfer destination for the reimbursement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BankInfo {
    #[serde(rename = "銀行名")]
    pub bank_name: String,

    #[serde(rename = "支店名")]
    pub branch_name: String,

    #[serde(rename = "口座種別")]
    pub account_type: AccountType,

    #[serde(rename = "口座番号")]
    pub account_number: String,

    #[serde(rename = "口座名義")]
    pub account_holder: String,
}

// ============================================================================
// CLAIM RECORD
// ============================================================================

/// A validated, submitted expense claim.
///
/// Constructed once by the builder, persisted once by the store, never
/// updated or deleted. Field names on disk match the original entry app's
/// claim.json keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimRecord {
    pub claim_id: String,

    #[serde(rename = "申請日")]
    pub claim_date: NaiveDate,

    #[serde(rename = "申請者名")]
    pub claimant: String,

    #[serde(rename = "タイトル")]
    pub title: String,

    #[serde(rename = "経費種別")]
    pub category: ExpenseCategory,

    #[serde(rename = "合計金額")]
    pub total_amount: f64,

    #[serde(rename = "経費項目リスト")]
    pub items: Vec<LineItem>,

    #[serde(rename = "備考")]
    pub memo: String,

    /// Relative paths of saved receipt files, filled in by the store.
    #[serde(default)]
    pub attachments: Vec<String>,

    #[serde(flatten)]
    pub bank: BankInfo,

    pub created_at: DateTime<Utc>,
}

/// Generate a claim id: local timestamp plus an 8-hex random suffix.
/// The suffix keeps ids distinct even for two submissions within the
/// same second.
pub fn generate_claim_id() -> String {
    let stamp = Local::now().format("%Y%m%d%H%M%S");
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!("{}-{}", stamp, &suffix[..8])
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claim_id_format() {
        let id = generate_claim_id();
        let (stamp, suffix) = id.split_once('-').expect("id has a dash");

        assert_eq!(stamp.len(), 14);
        assert!(stamp.chars().all(|c| c.is_ascii_digit()));
        assert_eq!(suffix.len(), 8);
        assert!(suffix.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_claim_ids_distinct_within_same_second() {
        let a = generate_claim_id();
        let b = generate_claim_id();
        assert_ne!(a, b);
    }

    #[test]
    fn test_category_serializes_as_form_label() {
        let json = serde_json::to_string(&ExpenseCategory::Travel).unwrap();
        assert_eq!(json, "\"旅費交通費\"");

        let back: ExpenseCategory = serde_json::from_str("\"雑費\"").unwrap();
        assert_eq!(back, ExpenseCategory::Miscellaneous);
    }

    #[test]
    fn test_account_type_round_trip() {
        for ty in [AccountType::Ordinary, AccountType::Current, AccountType::Savings] {
            let json = serde_json::to_string(&ty).unwrap();
            let back: AccountType = serde_json::from_str(&json).unwrap();
            assert_eq!(back, ty);
        }
    }

    #[test]
    fn test_line_item_uses_original_json_keys() {
        let item = LineItem {
            paid_on: Some("2024-01-05".to_string()),
            payee: "スーパーA".to_string(),
            amount: 1000.0,
            memo: "備品".to_string(),
        };

        let value = serde_json::to_value(&item).unwrap();
        assert_eq!(value["支払日"], "2024-01-05");
        assert_eq!(value["店名"], "スーパーA");
        assert_eq!(value["金額"], 1000.0);
        assert_eq!(value["内容"], "備品");
    }
}
