// Keihi - Expense Claim Entry Core
// Exposes the claim model, builder, and store for the CLI and tests

pub mod builder;
pub mod claim;
pub mod store;

// Re-export commonly used types
pub use builder::{
    build_claim, normalize_row, ClaimForm, ItemBuffer, RawItemRow, ValidationError,
    TOTAL_TOLERANCE,
};
pub use claim::{
    generate_claim_id, AccountType, BankInfo, ClaimRecord, ExpenseCategory, LineItem,
};
pub use store::{
    is_allowed_attachment, AttachmentBlob, ClaimStore, SavedClaim,
    ALLOWED_ATTACHMENT_EXTENSIONS,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
