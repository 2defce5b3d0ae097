//! # Document Numbering
//!
//! Unique document numbers come from the numbering collaborator (a
//! server-side RPC that hands out reserved, sequential identifiers). When
//! the collaborator is unreachable the client falls back to a provisional
//! number — `PREFIX-YYYY-MM-NNN` with a random 3-digit suffix — which is
//! never guaranteed unique. Reservation failures are logged and recovered
//! locally; a save proceeds with the provisional number.

use async_trait::async_trait;
use chrono::{Datelike, Local};
use rand::Rng;

use super::DocumentKind;
use crate::error::FolioError;
use crate::storage::StoreConfig;

/// Collaborator that reserves uniqueness-guaranteed document numbers.
#[async_trait]
pub trait NumberingService: Send + Sync {
    /// Reserve the next number for the given document kind.
    async fn reserve(&self, kind: DocumentKind) -> Result<String, FolioError>;
}

/// Generate a client-side provisional number: `PREFIX-YYYY-MM-NNN`.
///
/// Used on session start/reset and as the fallback when reservation
/// fails. Not guaranteed unique.
pub fn provisional_number(kind: DocumentKind) -> String {
    let now = Local::now();
    let suffix: u32 = rand::rng().random_range(1..=999);
    format!(
        "{}-{}-{:02}-{:03}",
        kind.number_prefix(),
        now.year(),
        now.month(),
        suffix
    )
}

/// Numbering client backed by the store's RPC endpoint
/// (`POST <base>/rest/v1/rpc/reserve_document_number`).
pub struct RpcNumbering {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl RpcNumbering {
    pub fn new(config: &StoreConfig) -> Self {
        Self {
            base_url: config.url.trim_end_matches('/').to_string(),
            api_key: config.key.clone(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl NumberingService for RpcNumbering {
    async fn reserve(&self, kind: DocumentKind) -> Result<String, FolioError> {
        let url = format!("{}/rest/v1/rpc/reserve_document_number", self.base_url);
        let response = self
            .client
            .post(&url)
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&serde_json::json!({ "doc_kind": kind.number_prefix() }))
            .send()
            .await
            .map_err(|e| FolioError::Numbering(format!("reservation request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(FolioError::Numbering(format!(
                "reservation returned {}",
                response.status()
            )));
        }

        // PostgREST returns the scalar function result as a JSON string.
        let number: String = response
            .json()
            .await
            .map_err(|e| FolioError::Numbering(format!("malformed reservation response: {e}")))?;
        Ok(number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Assert a number matches `PREFIX-YYYY-MM-NNN`.
    fn assert_provisional_shape(number: &str, prefix: &str) {
        let rest = number
            .strip_prefix(prefix)
            .and_then(|r| r.strip_prefix('-'))
            .unwrap_or_else(|| panic!("{number} does not start with {prefix}-"));
        let parts: Vec<&str> = rest.split('-').collect();
        assert_eq!(parts.len(), 3, "{number} should have year-month-suffix");
        assert_eq!(parts[0].len(), 4);
        assert_eq!(parts[1].len(), 2);
        assert_eq!(parts[2].len(), 3);
        for part in parts {
            assert!(part.chars().all(|c| c.is_ascii_digit()), "{number}");
        }
    }

    #[test]
    fn test_provisional_number_pattern() {
        assert_provisional_shape(&provisional_number(DocumentKind::Invoice), "INV");
        assert_provisional_shape(&provisional_number(DocumentKind::PurchaseOrder), "PO");
        assert_provisional_shape(&provisional_number(DocumentKind::DeliveryOrder), "DO");
    }

    #[test]
    fn test_provisional_suffix_in_range() {
        for _ in 0..100 {
            let number = provisional_number(DocumentKind::Invoice);
            let suffix: u32 = number.rsplit('-').next().unwrap().parse().unwrap();
            assert!((1..=999).contains(&suffix));
        }
    }
}
