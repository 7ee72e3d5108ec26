//! Pending submission - a failed draft kept for retry
//!
//! When a submission fails, the draft and the idempotency key it was sent
//! with are written to `pending_expense.json`. Retrying from that file
//! sends the identical request, so the backend can deduplicate it against
//! the original attempt.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::domain::{ExpenseDraft, IdempotencyKey};

const PENDING_FILE: &str = "pending_expense.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingSubmission {
    pub draft: ExpenseDraft,
    pub idempotency_key: IdempotencyKey,
}

impl PendingSubmission {
    fn path(dir: &Path) -> PathBuf {
        dir.join(PENDING_FILE)
    }

    /// Load the pending submission, if any
    pub fn load(dir: &Path) -> Result<Option<Self>> {
        let path = Self::path(dir);
        if !path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let pending = serde_json::from_str(&content)
            .with_context(|| format!("Pending submission file is corrupt: {}", path.display()))?;
        Ok(Some(pending))
    }

    pub fn save(&self, dir: &Path) -> Result<()> {
        std::fs::create_dir_all(dir)?;
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(Self::path(dir), content)?;
        Ok(())
    }

    pub fn clear(dir: &Path) -> Result<()> {
        let path = Self::path(dir);
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }
}
