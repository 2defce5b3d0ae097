//! # Document Persistence
//!
//! The persistence collaborator: a PostgREST-style REST endpoint (hosted
//! Postgres) holding saved invoices. Saving flattens the in-memory
//! document plus its freshly computed totals into one record; after the
//! insert the in-memory document is independent of the stored row.
//!
//! Operations are insert, list (newest first), fetch by id, and delete by
//! id — there is no update-in-place. Everything sits behind the
//! [`DocumentStore`] trait so tests and offline use run against
//! [`MemoryStore`].

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use uuid::Uuid;

use crate::document::{totals, Invoice, InvoiceItem, Party};
use crate::error::FolioError;

/// Connection settings for the hosted store.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Base URL, e.g. `https://project.example.co`.
    pub url: String,
    /// API key, sent as both `apikey` and bearer token.
    pub key: String,
}

impl StoreConfig {
    /// Read `FOLIO_STORE_URL` / `FOLIO_STORE_KEY` from the environment
    /// (the binary loads `.env` first via dotenvy).
    pub fn from_env() -> Result<Self, FolioError> {
        let url = std::env::var("FOLIO_STORE_URL")
            .map_err(|_| FolioError::Storage("FOLIO_STORE_URL is not set".to_string()))?;
        let key = std::env::var("FOLIO_STORE_KEY")
            .map_err(|_| FolioError::Storage("FOLIO_STORE_KEY is not set".to_string()))?;
        Ok(Self { url, key })
    }
}

fn none_if_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// A flattened invoice row: header fields, items as JSON, and the
/// computed totals the user saw at save time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceRecord {
    /// Assigned by the store on insert.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    pub invoice_number: String,
    pub invoice_date: NaiveDate,
    pub due_date: NaiveDate,
    pub customer_number: Option<String>,
    pub bill_to_name: String,
    pub bill_to_address: Option<String>,
    pub bill_to_city: Option<String>,
    pub bill_to_phone: Option<String>,
    pub bill_to_email: Option<String>,
    pub ship_to_name: Option<String>,
    pub ship_to_address: Option<String>,
    pub ship_to_city: Option<String>,
    pub ship_to_phone: Option<String>,
    pub items: Vec<InvoiceItem>,
    pub currency: String,
    pub discount: f64,
    pub payment_terms: Option<String>,
    pub purchase_order_number: Option<String>,
    pub notes: Option<String>,
    pub subtotal: f64,
    pub total_tax: f64,
    pub grand_total: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl InvoiceRecord {
    /// Flatten an invoice for insertion. Totals are recomputed here from
    /// the current items — the snapshot can never disagree with the
    /// preview the user just looked at.
    pub fn from_invoice(invoice: &Invoice) -> Self {
        let t = totals::invoice_totals(&invoice.items, invoice.discount);
        Self {
            id: None,
            invoice_number: invoice.number.clone(),
            invoice_date: invoice.invoice_date,
            due_date: invoice.due_date,
            customer_number: none_if_empty(&invoice.customer_number),
            bill_to_name: invoice.bill_to.name.clone(),
            bill_to_address: none_if_empty(&invoice.bill_to.address),
            bill_to_city: none_if_empty(&invoice.bill_to.city),
            bill_to_phone: none_if_empty(&invoice.bill_to.phone),
            bill_to_email: none_if_empty(&invoice.bill_to.email),
            ship_to_name: none_if_empty(&invoice.ship_to.name),
            ship_to_address: none_if_empty(&invoice.ship_to.address),
            ship_to_city: none_if_empty(&invoice.ship_to.city),
            ship_to_phone: none_if_empty(&invoice.ship_to.phone),
            items: invoice.items.clone(),
            currency: invoice.currency.clone(),
            discount: invoice.discount,
            payment_terms: none_if_empty(&invoice.payment_terms),
            purchase_order_number: none_if_empty(&invoice.order_reference),
            notes: none_if_empty(&invoice.notes),
            subtotal: t.subtotal,
            total_tax: t.total_tax,
            grand_total: t.grand_total,
            created_at: None,
        }
    }

    /// Rebuild an editable invoice from a stored record (used by the
    /// history view's re-export).
    pub fn to_invoice(&self) -> Invoice {
        Invoice {
            number: self.invoice_number.clone(),
            auto_number: false,
            number_reserved: true,
            invoice_date: self.invoice_date,
            due_date: self.due_date,
            customer_number: self.customer_number.clone().unwrap_or_default(),
            order_reference: self.purchase_order_number.clone().unwrap_or_default(),
            bill_to: Party {
                name: self.bill_to_name.clone(),
                address: self.bill_to_address.clone().unwrap_or_default(),
                city: self.bill_to_city.clone().unwrap_or_default(),
                phone: self.bill_to_phone.clone().unwrap_or_default(),
                email: self.bill_to_email.clone().unwrap_or_default(),
            },
            ship_to: Party {
                name: self.ship_to_name.clone().unwrap_or_default(),
                address: self.ship_to_address.clone().unwrap_or_default(),
                city: self.ship_to_city.clone().unwrap_or_default(),
                phone: self.ship_to_phone.clone().unwrap_or_default(),
                email: String::new(),
            },
            items: self.items.clone(),
            currency: self.currency.clone(),
            discount: self.discount,
            payment_terms: self.payment_terms.clone().unwrap_or_default(),
            notes: self.notes.clone().unwrap_or_default(),
        }
    }
}

/// Compact row for the history listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceSummary {
    pub id: Uuid,
    pub invoice_number: String,
    pub invoice_date: NaiveDate,
    pub due_date: NaiveDate,
    pub bill_to_name: String,
    pub currency: String,
    pub grand_total: f64,
    pub created_at: DateTime<Utc>,
}

/// The persistence collaborator. No update operation exists: stored
/// records are immutable snapshots.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn insert(&self, record: &InvoiceRecord) -> Result<(), FolioError>;
    /// All saved invoices, newest first.
    async fn list(&self) -> Result<Vec<InvoiceSummary>, FolioError>;
    async fn fetch(&self, id: Uuid) -> Result<InvoiceRecord, FolioError>;
    async fn delete(&self, id: Uuid) -> Result<(), FolioError>;
}

/// REST client for the hosted store.
pub struct RestStore {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl RestStore {
    pub fn new(config: StoreConfig) -> Self {
        Self {
            base_url: config.url.trim_end_matches('/').to_string(),
            api_key: config.key,
            client: reqwest::Client::new(),
        }
    }

    fn invoices_url(&self) -> String {
        format!("{}/rest/v1/invoices", self.base_url)
    }

    fn authed(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, FolioError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            Err(FolioError::Storage(format!(
                "store returned {}",
                response.status()
            )))
        }
    }
}

#[async_trait]
impl DocumentStore for RestStore {
    async fn insert(&self, record: &InvoiceRecord) -> Result<(), FolioError> {
        let response = self
            .authed(self.client.post(self.invoices_url()))
            .header("Prefer", "return=minimal")
            .json(record)
            .send()
            .await
            .map_err(|e| FolioError::Storage(format!("insert failed: {e}")))?;
        Self::check(response).await?;
        Ok(())
    }

    async fn list(&self) -> Result<Vec<InvoiceSummary>, FolioError> {
        let url = format!(
            "{}?select=id,invoice_number,invoice_date,due_date,bill_to_name,currency,grand_total,created_at&order=created_at.desc",
            self.invoices_url()
        );
        let response = self
            .authed(self.client.get(url))
            .send()
            .await
            .map_err(|e| FolioError::Storage(format!("list failed: {e}")))?;
        Self::check(response)
            .await?
            .json()
            .await
            .map_err(|e| FolioError::Storage(format!("malformed list response: {e}")))
    }

    async fn fetch(&self, id: Uuid) -> Result<InvoiceRecord, FolioError> {
        let url = format!("{}?id=eq.{}&select=*", self.invoices_url(), id);
        let response = self
            .authed(self.client.get(url))
            .send()
            .await
            .map_err(|e| FolioError::Storage(format!("fetch failed: {e}")))?;
        let mut rows: Vec<InvoiceRecord> = Self::check(response)
            .await?
            .json()
            .await
            .map_err(|e| FolioError::Storage(format!("malformed fetch response: {e}")))?;
        rows
            .pop()
            .ok_or_else(|| FolioError::Storage(format!("invoice {id} not found")))
    }

    async fn delete(&self, id: Uuid) -> Result<(), FolioError> {
        let url = format!("{}?id=eq.{}", self.invoices_url(), id);
        let response = self
            .authed(self.client.delete(url))
            .send()
            .await
            .map_err(|e| FolioError::Storage(format!("delete failed: {e}")))?;
        Self::check(response).await?;
        Ok(())
    }
}

/// In-memory store for tests and offline runs.
#[derive(Default)]
pub struct MemoryStore {
    records: Mutex<Vec<InvoiceRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn insert(&self, record: &InvoiceRecord) -> Result<(), FolioError> {
        let mut records = self.records.lock().unwrap();
        let mut record = record.clone();
        record.id = Some(Uuid::new_v4());
        record.created_at = Some(Utc::now());
        records.push(record);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<InvoiceSummary>, FolioError> {
        let records = self.records.lock().unwrap();
        // Insertion order stands in for created_at; newest first.
        Ok(records
            .iter()
            .rev()
            .map(|r| InvoiceSummary {
                id: r.id.unwrap_or_default(),
                invoice_number: r.invoice_number.clone(),
                invoice_date: r.invoice_date,
                due_date: r.due_date,
                bill_to_name: r.bill_to_name.clone(),
                currency: r.currency.clone(),
                grand_total: r.grand_total,
                created_at: r.created_at.unwrap_or_default(),
            })
            .collect())
    }

    async fn fetch(&self, id: Uuid) -> Result<InvoiceRecord, FolioError> {
        let records = self.records.lock().unwrap();
        records
            .iter()
            .find(|r| r.id == Some(id))
            .cloned()
            .ok_or_else(|| FolioError::Storage(format!("invoice {id} not found")))
    }

    async fn delete(&self, id: Uuid) -> Result<(), FolioError> {
        let mut records = self.records.lock().unwrap();
        records.retain(|r| r.id != Some(id));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample_invoice() -> Invoice {
        let mut invoice = Invoice::default();
        invoice.number = "INV-2026-08-001".to_string();
        invoice.bill_to.name = "Acme LLC".to_string();
        invoice.items[0].quantity = 2.0;
        invoice.items[0].unit_price = 10.0;
        invoice.items[0].tax_rate = 5.0;
        invoice.items[0].recompute();
        invoice.discount = 1.0;
        invoice
    }

    #[test]
    fn test_record_carries_computed_totals() {
        let record = InvoiceRecord::from_invoice(&sample_invoice());
        assert_eq!(record.subtotal, 20.0);
        assert_eq!(record.total_tax, 1.0);
        assert_eq!(record.grand_total, 20.0);
        assert_eq!(record.customer_number, None);
        assert_eq!(record.bill_to_name, "Acme LLC");
    }

    #[test]
    fn test_record_round_trips_to_invoice() {
        let invoice = sample_invoice();
        let record = InvoiceRecord::from_invoice(&invoice);
        let back = record.to_invoice();
        assert_eq!(back.number, invoice.number);
        assert_eq!(back.bill_to.name, invoice.bill_to.name);
        assert_eq!(back.items.len(), invoice.items.len());
        assert_eq!(back.discount, invoice.discount);
        assert!(!back.auto_number);
    }

    #[tokio::test]
    async fn test_memory_store_lists_newest_first() {
        let store = MemoryStore::new();
        for n in ["INV-1", "INV-2", "INV-3"] {
            let mut invoice = sample_invoice();
            invoice.number = n.to_string();
            store.insert(&InvoiceRecord::from_invoice(&invoice)).await.unwrap();
        }
        let listed = store.list().await.unwrap();
        let numbers: Vec<&str> = listed.iter().map(|s| s.invoice_number.as_str()).collect();
        assert_eq!(numbers, vec!["INV-3", "INV-2", "INV-1"]);
    }

    #[tokio::test]
    async fn test_memory_store_fetch_and_delete() {
        let store = MemoryStore::new();
        store
            .insert(&InvoiceRecord::from_invoice(&sample_invoice()))
            .await
            .unwrap();
        let id = store.list().await.unwrap()[0].id;
        let record = store.fetch(id).await.unwrap();
        assert_eq!(record.invoice_number, "INV-2026-08-001");

        store.delete(id).await.unwrap();
        assert!(store.list().await.unwrap().is_empty());
        assert!(store.fetch(id).await.is_err());
    }
}
