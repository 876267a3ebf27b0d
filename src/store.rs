// 💾 Claim Store - Per-claim directory persistence
// One directory per claim: claim.json + receipt files under original names

use crate::claim::ClaimRecord;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Record file written inside every claim directory.
const RECORD_FILE: &str = "claim.json";

/// Receipt file extensions accepted by the entry form.
/// UI-level filter only; the store writes whatever it is handed.
pub const ALLOWED_ATTACHMENT_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "pdf"];

/// Check a file name against the upload extension filter (case-insensitive).
pub fn is_allowed_attachment(file_name: &str) -> bool {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let lower = ext.to_lowercase();
            ALLOWED_ATTACHMENT_EXTENSIONS.contains(&lower.as_str())
        })
        .unwrap_or(false)
}

// ============================================================================
// ATTACHMENT BLOB
// ============================================================================

/// An uploaded receipt file: original name + raw bytes.
#[derive(Debug, Clone)]
pub struct AttachmentBlob {
    pub file_name: String,
    pub data: Vec<u8>,
}

impl AttachmentBlob {
    pub fn new(file_name: impl Into<String>, data: Vec<u8>) -> Self {
        AttachmentBlob {
            file_name: file_name.into(),
            data,
        }
    }
}

// ============================================================================
// SAVED CLAIM
// ============================================================================

/// Result of a successful save: where the claim landed, and the final
/// record with attachment paths filled in.
#[derive(Debug)]
pub struct SavedClaim {
    pub dir: PathBuf,
    pub record: ClaimRecord,
}

// ============================================================================
// CLAIM STORE
// ============================================================================

/// Flat-file claim storage rooted at one directory, e.g. `claims/`.
///
/// Layout per claim:
/// ```text
/// <root>/<claim_id>/claim.json     pretty-printed ClaimRecord
/// <root>/<claim_id>/<attachment>   0..N receipt files, original basenames
/// ```
///
/// Single-user, single-process. Writes are not atomic: a crash mid-write
/// can leave a partial record, and `list()` will skip it.
pub struct ClaimStore {
    root: PathBuf,
}

impl ClaimStore {
    /// Open a store rooted at `root`. The directory is created lazily on
    /// first save.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        ClaimStore { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Persist a validated claim and its attachment blobs.
    ///
    /// Attachments are written first, verbatim, each under the basename of
    /// its original file name; two blobs with the same name within one
    /// claim overwrite (last write wins). The record's `attachments` field
    /// is filled with the forward-slash relative path of each saved file
    /// before `claim.json` is written.
    pub fn save(&self, mut record: ClaimRecord, blobs: &[AttachmentBlob]) -> Result<SavedClaim> {
        let dir = self.root.join(&record.claim_id);
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create claim directory: {:?}", dir))?;

        let root_name = self
            .root
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or(".")
            .to_string();

        let mut saved_paths = Vec::new();
        for blob in blobs {
            // Basename only: uploads carry plain file names, never paths
            let name = match Path::new(&blob.file_name).file_name().and_then(|n| n.to_str()) {
                Some(name) => name,
                None => continue,
            };

            let dest = dir.join(name);
            fs::write(&dest, &blob.data)
                .with_context(|| format!("Failed to write attachment: {:?}", dest))?;
            saved_paths.push(format!("{}/{}/{}", root_name, record.claim_id, name));
        }
        record.attachments = saved_paths;

        let json = serde_json::to_string_pretty(&record)
            .context("Failed to serialize claim record")?;
        let record_path = dir.join(RECORD_FILE);
        fs::write(&record_path, json)
            .with_context(|| format!("Failed to write claim record: {:?}", record_path))?;

        Ok(SavedClaim { dir, record })
    }

    /// Load every stored claim, newest first.
    ///
    /// Each claim directory is parsed independently; a directory whose
    /// record file is missing or corrupt is skipped rather than failing
    /// the whole listing.
    pub fn list(&self) -> Result<Vec<ClaimRecord>> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }

        let entries = fs::read_dir(&self.root)
            .with_context(|| format!("Failed to read store root: {:?}", self.root))?;

        let mut records = Vec::new();
        for entry in entries {
            let entry = entry.context("Failed to read store directory entry")?;
            let record_path = entry.path().join(RECORD_FILE);

            let content = match fs::read_to_string(&record_path) {
                Ok(content) => content,
                Err(_) => continue,
            };
            match serde_json::from_str::<ClaimRecord>(&content) {
                Ok(record) => records.push(record),
                Err(_) => continue,
            }
        }

        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(records)
    }
}

// ============================================================================
// TESTS
// ============================================================================
