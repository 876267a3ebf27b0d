use anyhow::Result;
use chrono::Local;
use std::env;
use std::path::Path;

use keihi::{
    build_claim, is_allowed_attachment, AccountType, AttachmentBlob, BankInfo, ClaimForm,
    ClaimStore, ExpenseCategory, ItemBuffer, RawItemRow,
};

const STORE_ROOT: &str = "claims";

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    if args.len() > 1 && args[1] == "demo" {
        // Demo submission mode
        run_demo()?;
    } else {
        // History mode (default)
        run_history()?;
    }

    Ok(())
}

/// Submit a built-in sample claim through the full builder → store pipeline.
fn run_demo() -> Result<()> {
    println!("🧾 Keihi: demo claim submission");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    // 1. Fill the item buffer from raw table rows
    let mut buffer = ItemBuffer::new();
    buffer.replace_rows(&[
        RawItemRow {
            paid_on: Some("2024-01-05".to_string()),
            payee: Some("JR東日本".to_string()),
            amount: Some("1000".to_string()),
            memo: Some("往路".to_string()),
        },
        RawItemRow {
            paid_on: Some("2024/01/06".to_string()),
            payee: Some("JR東日本".to_string()),
            amount: Some("2000".to_string()),
            memo: Some("復路".to_string()),
        },
        // Leftover blank table row, dropped during normalization
        RawItemRow::default(),
    ]);
    println!("\n📝 Line items: {} (total {:.0} JPY)", buffer.items().len(), buffer.total());

    // 2. Build the form and validate
    let form = ClaimForm {
        claimant: "山田太郎".to_string(),
        title: "1月出張経費".to_string(),
        category: ExpenseCategory::Travel,
        claim_date: Local::now().date_naive(),
        bank: BankInfo {
            bank_name: "みずほ銀行".to_string(),
            branch_name: "渋谷支店".to_string(),
            account_type: AccountType::Ordinary,
            account_number: "1234567".to_string(),
            account_holder: "ヤマダ タロウ".to_string(),
        },
        memo: "デモ申請".to_string(),
        declared_total: buffer.total(),
    };

    let record = match build_claim(&mut buffer, &form) {
        Ok(record) => record,
        Err(errors) => {
            eprintln!("\n❌ Validation failed:");
            for error in &errors {
                eprintln!("   - {}", error);
            }
            std::process::exit(1);
        }
    };
    println!("✓ Validated claim {}", record.claim_id);

    // 3. Persist record + sample receipt
    let attachment_name = "receipt.png";
    let mut blobs = Vec::new();
    if is_allowed_attachment(attachment_name) {
        blobs.push(AttachmentBlob::new(attachment_name, vec![0x89, 0x50, 0x4E, 0x47]));
    }

    let store = ClaimStore::new(Path::new(STORE_ROOT));
    let saved = store.save(record, &blobs)?;

    println!("\n💾 Saved to {:?}", saved.dir);
    for path in &saved.record.attachments {
        println!("   📎 {}", path);
    }

    println!("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("✅ Demo claim submitted");

    Ok(())
}

/// List stored claims, newest first.
fn run_history() -> Result<()> {
    println!("🧾 Keihi: claim history");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let store = ClaimStore::new(Path::new(STORE_ROOT));
    let records = store.list()?;

    if records.is_empty() {
        println!("\nNo claims yet. Run: cargo run demo");
        return Ok(());
    }

    println!("\n📊 {} claim(s):\n", records.len());
    for record in &records {
        println!(
            "  {}  {}  {}  {:>10.0} JPY  ({} items, {} attachments)",
            record.claim_id,
            record.claim_date,
            record.title,
            record.total_amount,
            record.items.len(),
            record.attachments.len(),
        );
    }

    Ok(())
}
