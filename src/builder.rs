// 📝 Claim Builder - Row normalization + submission validation
// Turns editable-table rows and form fields into a validated ClaimRecord

use crate::claim::{
    generate_claim_id, BankInfo, ClaimRecord, ExpenseCategory, LineItem,
};
use chrono::{NaiveDate, Utc};

/// Declared total must match the line-item sum within this tolerance.
pub const TOTAL_TOLERANCE: f64 = 0.0001;

// ============================================================================
// VALIDATION ERROR
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        ValidationError {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

// ============================================================================
// RAW ROW NORMALIZATION
// ============================================================================

/// One editable-table row as it arrives from a UI layer.
/// Any cell may be missing or blank; values are untyped text.
#[derive(Debug, Clone, Default)]
pub struct RawItemRow {
    pub paid_on: Option<String>,
    pub payee: Option<String>,
    pub amount: Option<String>,
    pub memo: Option<String>,
}

fn cell_is_blank(cell: &Option<String>) -> bool {
    match cell {
        None => true,
        Some(s) => s.trim().is_empty(),
    }
}

/// Coerce a date cell to an ISO `YYYY-MM-DD` string.
/// Accepts `YYYY-MM-DD`, `YYYY/MM/DD`, and `YYYYMMDD`; anything else is
/// preserved verbatim (validation only checks presence).
fn normalize_date(cell: &Option<String>) -> Option<String> {
    let raw = cell.as_deref()?.trim();
    if raw.is_empty() {
        return None;
    }

    for format in ["%Y-%m-%d", "%Y/%m/%d", "%Y%m%d"] {
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            return Some(date.format("%Y-%m-%d").to_string());
        }
    }

    Some(raw.to_string())
}

/// Coerce an amount cell to f64. A blank or unparseable cell becomes 0.0;
/// the bad value then fails the `> 0` rule at submission instead of being
/// silently accepted.
fn normalize_amount(cell: &Option<String>) -> f64 {
    match cell {
        None => 0.0,
        Some(s) => s.trim().parse::<f64>().unwrap_or(0.0),
    }
}

fn normalize_text(cell: &Option<String>) -> String {
    cell.as_deref().unwrap_or("").trim().to_string()
}

/// Normalize one raw row into a LineItem.
/// Returns None for a fully-blank row (payee, memo, and amount all empty):
/// such rows are leftovers from the dynamic table, not user errors.
pub fn normalize_row(row: &RawItemRow) -> Option<LineItem> {
    if cell_is_blank(&row.payee) && cell_is_blank(&row.memo) && cell_is_blank(&row.amount) {
        return None;
    }

    Some(LineItem {
        paid_on: normalize_date(&row.paid_on),
        payee: normalize_text(&row.payee),
        amount: normalize_amount(&row.amount),
        memo: normalize_text(&row.memo),
    })
}

// ============================================================================
// ITEM BUFFER
// ============================================================================

/// Session-scoped mutable list of in-progress line items.
/// Passed by reference into `build_claim`, which clears it on success.
#[derive(Debug, Default)]
pub struct ItemBuffer {
    items: Vec<LineItem>,
}

impl ItemBuffer {
    pub fn new() -> Self {
        ItemBuffer { items: Vec::new() }
    }

    /// Replace the whole buffer from raw table rows, dropping blank rows.
    pub fn replace_rows(&mut self, rows: &[RawItemRow]) {
        self.items = rows.iter().filter_map(normalize_row).collect();
    }

    /// Append a single raw row, ignoring it if fully blank.
    pub fn push_row(&mut self, row: &RawItemRow) {
        if let Some(item) = normalize_row(row) {
            self.items.push(item);
        }
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Running sum of item amounts, for the live total display.
    pub fn total(&self) -> f64 {
        self.items.iter().map(|item| item.amount).sum()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

// ============================================================================
// CLAIM FORM
// ============================================================================

/// Scalar fields submitted with the form, alongside the item buffer.
#[derive(Debug, Clone)]
pub struct ClaimForm {
    pub claimant: String,
    pub title: String,
    pub category: ExpenseCategory,
    pub claim_date: NaiveDate,
    pub bank: BankInfo,
    pub memo: String,
    /// Total shown to the user at submission time; must agree with the
    /// buffer sum.
    pub declared_total: f64,
}

// ============================================================================
// BUILD + VALIDATE
// ============================================================================

/// Validate the buffer and form, producing either a ClaimRecord or the
/// full ordered list of violations (never both). On success the buffer is
/// cleared: the claim is finalized.
pub fn build_claim(
    buffer: &mut ItemBuffer,
    form: &ClaimForm,
) -> Result<ClaimRecord, Vec<ValidationError>> {
    let errors = validate(buffer, form);
    if !errors.is_empty() {
        return Err(errors);
    }

    let total = buffer.total();
    let record = ClaimRecord {
        claim_id: generate_claim_id(),
        claim_date: form.claim_date,
        claimant: form.claimant.clone(),
        title: form.title.clone(),
        category: form.category,
        total_amount: total,
        items: buffer.items().to_vec(),
        memo: form.memo.clone(),
        attachments: Vec::new(),
        bank: form.bank.clone(),
        created_at: Utc::now(),
    };

    buffer.clear();
    Ok(record)
}

/// Apply every validation rule, collecting all violations in rule order.
fn validate(buffer: &ItemBuffer, form: &ClaimForm) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if form.claimant.trim().is_empty() {
        errors.push(ValidationError::new("claimant", "claimant name is required"));
    }

    if form.title.trim().is_empty() {
        errors.push(ValidationError::new("title", "title is required"));
    }

    if buffer.is_empty() {
        errors.push(ValidationError::new(
            "items",
            "at least one line item is required",
        ));
    }

    let bank = &form.bank;
    if bank.bank_name.trim().is_empty()
        || bank.branch_name.trim().is_empty()
        || bank.account_number.trim().is_empty()
        || bank.account_holder.trim().is_empty()
    {
        errors.push(ValidationError::new(
            "bank",
            "all bank transfer fields are required",
        ));
    }

    for (i, item) in buffer.items().iter().enumerate() {
        let row = i + 1;

        if item.paid_on.is_none() {
            errors.push(ValidationError::new(
                "items",
                format!("line item {}: payment date is required", row),
            ));
        }

        if item.amount <= 0.0 {
            errors.push(ValidationError::new(
                "items",
                format!("line item {}: amount must be greater than 0", row),
            ));
        }
    }

    let account_number = bank.account_number.trim();
    if !account_number.is_empty() {
        if !account_number.chars().all(|c| c.is_ascii_digit()) {
            errors.push(ValidationError::new(
                "account_number",
                "account number must contain digits only",
            ));
        } else if account_number.len() < 7 {
            errors.push(ValidationError::new(
                "account_number",
                "account number must be at least 7 digits",
            ));
        }
    }

    if (buffer.total() - form.declared_total).abs() > TOTAL_TOLERANCE {
        errors.push(ValidationError::new(
            "total",
            "declared total does not match the sum of line items",
        ));
    }

    errors
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::claim::AccountType;

    fn create_test_bank() -> BankInfo {
        BankInfo {
            bank_name: "みずほ銀行".to_string(),
            branch_name: "渋谷支店".to_string(),
            account_type: AccountType::Ordinary,
            account_number: "1234567".to_string(),
            account_holder: "ヤマダ タロウ".to_string(),
        }
    }

    fn create_test_form(declared_total: f64) -> ClaimForm {
        ClaimForm {
            claimant: "山田太郎".to_string(),
            title: "1月出張経費".to_string(),
            category: ExpenseCategory::Travel,
            claim_date: NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
            bank: create_test_bank(),
            memo: String::new(),
            declared_total,
        }
    }

    fn row(date: &str, payee: &str, amount: &str, memo: &str) -> RawItemRow {
        let cell = |s: &str| {
            if s.is_empty() {
                None
            } else {
                Some(s.to_string())
            }
        };
        RawItemRow {
            paid_on: cell(date),
            payee: cell(payee),
            amount: cell(amount),
            memo: cell(memo),
        }
    }

    fn buffer_with(rows: &[RawItemRow]) -> ItemBuffer {
        let mut buffer = ItemBuffer::new();
        buffer.replace_rows(rows);
        buffer
    }

    #[test]
    fn test_blank_row_is_dropped() {
        let mut buffer = ItemBuffer::new();
        buffer.replace_rows(&[
            row("2024-01-05", "A", "1000", ""),
            RawItemRow::default(),
            row("", "", "", ""),
        ]);

        assert_eq!(buffer.items().len(), 1);
    }

    #[test]
    fn test_date_only_row_is_dropped() {
        // Date cell alone does not make a row real
        let mut buffer = ItemBuffer::new();
        buffer.push_row(&row("2024-01-05", "", "", ""));

        assert!(buffer.is_empty());
    }

    #[test]
    fn test_date_cell_normalized_to_iso() {
        let item = normalize_row(&row("2024/01/05", "A", "1000", "")).unwrap();
        assert_eq!(item.paid_on.as_deref(), Some("2024-01-05"));

        let item = normalize_row(&row("20240105", "A", "1000", "")).unwrap();
        assert_eq!(item.paid_on.as_deref(), Some("2024-01-05"));
    }

    #[test]
    fn test_garbage_date_preserved_verbatim() {
        let item = normalize_row(&row("来週", "A", "1000", "")).unwrap();
        assert_eq!(item.paid_on.as_deref(), Some("来週"));
    }

    #[test]
    fn test_unparseable_amount_coerced_to_zero() {
        let item = normalize_row(&row("2024-01-05", "A", "千円", "")).unwrap();
        assert_eq!(item.amount, 0.0);
    }

    #[test]
    fn test_buffer_total() {
        let buffer = buffer_with(&[
            row("2024-01-05", "A", "1000", ""),
            row("2024-01-06", "B", "2000", ""),
        ]);
        assert_eq!(buffer.total(), 3000.0);
    }

    #[test]
    fn test_valid_claim_accepted() {
        let mut buffer = buffer_with(&[
            row("2024-01-05", "A", "1000", ""),
            row("2024-01-06", "B", "2000", ""),
        ]);

        let record = build_claim(&mut buffer, &create_test_form(3000.0)).unwrap();

        assert_eq!(record.total_amount, 3000.0);
        assert_eq!(record.items.len(), 2);
        assert_eq!(record.items[0].payee, "A");
        // Finalized: buffer cleared
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_total_mismatch_rejected() {
        let mut buffer = buffer_with(&[
            row("2024-01-05", "A", "1000", ""),
            row("2024-01-06", "B", "2000", ""),
        ]);

        let errors = build_claim(&mut buffer, &create_test_form(2999.0)).unwrap_err();

        assert!(errors.iter().any(|e| e.field == "total"));
        // Rejected submission leaves the buffer intact
        assert_eq!(buffer.items().len(), 2);
    }

    #[test]
    fn test_total_within_tolerance_accepted() {
        let mut buffer = buffer_with(&[row("2024-01-05", "A", "1000", "")]);
        let result = build_claim(&mut buffer, &create_test_form(1000.00005));
        assert!(result.is_ok());
    }

    #[test]
    fn test_empty_claimant_and_title_both_reported() {
        let mut buffer = buffer_with(&[row("2024-01-05", "A", "1000", "")]);
        let mut form = create_test_form(1000.0);
        form.claimant = String::new();
        form.title = "   ".to_string();

        let errors = build_claim(&mut buffer, &form).unwrap_err();

        assert_eq!(errors[0].field, "claimant");
        assert_eq!(errors[1].field, "title");
    }

    #[test]
    fn test_no_items_rejected() {
        let mut buffer = ItemBuffer::new();
        let errors = build_claim(&mut buffer, &create_test_form(0.0)).unwrap_err();
        assert!(errors.iter().any(|e| e.field == "items"));
    }

    #[test]
    fn test_missing_bank_field_rejected() {
        let mut buffer = buffer_with(&[row("2024-01-05", "A", "1000", "")]);
        let mut form = create_test_form(1000.0);
        form.bank.branch_name = String::new();

        let errors = build_claim(&mut buffer, &form).unwrap_err();
        assert!(errors.iter().any(|e| e.field == "bank"));
    }

    #[test]
    fn test_missing_item_date_rejected() {
        let mut buffer = buffer_with(&[row("", "A", "1000", "")]);
        let errors = build_claim(&mut buffer, &create_test_form(1000.0)).unwrap_err();

        assert!(errors
            .iter()
            .any(|e| e.message == "line item 1: payment date is required"));
    }

    #[test]
    fn test_unparseable_amount_rejected_not_accepted_as_zero() {
        let mut buffer = buffer_with(&[row("2024-01-05", "A", "千円", "")]);
        let errors = build_claim(&mut buffer, &create_test_form(0.0)).unwrap_err();

        assert!(errors
            .iter()
            .any(|e| e.message == "line item 1: amount must be greater than 0"));
    }

    #[test]
    fn test_account_number_too_short() {
        let mut buffer = buffer_with(&[row("2024-01-05", "A", "1000", "")]);
        let mut form = create_test_form(1000.0);
        form.bank.account_number = "12345".to_string();

        let errors = build_claim(&mut buffer, &form).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.message == "account number must be at least 7 digits"));
    }

    #[test]
    fn test_account_number_non_digit() {
        let mut buffer = buffer_with(&[row("2024-01-05", "A", "1000", "")]);
        let mut form = create_test_form(1000.0);
        form.bank.account_number = "12345ab".to_string();

        let errors = build_claim(&mut buffer, &form).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.message == "account number must contain digits only"));
        // Length rule is not also reported for a non-digit value
        assert_eq!(
            errors
                .iter()
                .filter(|e| e.field == "account_number")
                .count(),
            1
        );
    }

    #[test]
    fn test_seven_digit_account_number_passes() {
        let mut buffer = buffer_with(&[row("2024-01-05", "A", "1000", "")]);
        let mut form = create_test_form(1000.0);
        form.bank.account_number = "1234567".to_string();

        assert!(build_claim(&mut buffer, &form).is_ok());
    }

    #[test]
    fn test_all_violations_collected() {
        // Empty everything: claimant, title, items, bank all fail at once
        let mut buffer = ItemBuffer::new();
        let mut form = create_test_form(0.0);
        form.claimant = String::new();
        form.title = String::new();
        form.bank.bank_name = String::new();
        form.bank.account_number = String::new();
        form.bank.account_holder = String::new();

        let errors = build_claim(&mut buffer, &form).unwrap_err();

        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["claimant", "title", "items", "bank"]);
    }

    #[test]
    fn test_validation_error_display() {
        let err = ValidationError::new("title", "title is required");
        assert_eq!(err.to_string(), "title: title is required");
    }
}
