//! DNS record endpoints.

use crate::types::{NewRecord, ProviderRecord, RecordPage, RecordPatch};
use crate::{CloudflareClient, CloudflareError, Result};
use serde::Deserialize;
use zonegate_core::RecordType;

/// DNS record endpoints, scoped to the client's zone
pub struct RecordsApi<'a> {
    client: &'a CloudflareClient,
}

impl<'a> RecordsApi<'a> {
    pub(crate) const fn new(client: &'a CloudflareClient) -> Self {
        Self { client }
    }

    /// List records in the zone
    #[must_use]
    pub fn list(&self) -> ListRecordsBuilder<'a> {
        ListRecordsBuilder::new(self.client)
    }

    /// Fetch a single record by id
    pub async fn get(&self, id: &str) -> Result<ProviderRecord> {
        let zone = self.client.zone_id().await?;
        let envelope = self
            .client
            .get(&format!("/zones/{zone}/dns_records/{id}"), &[])
            .await;
        unwrap_result(envelope?.result)
    }

    /// Create a record
    pub async fn create(&self, record: &NewRecord) -> Result<ProviderRecord> {
        let zone = self.client.zone_id().await?;
        let envelope = self
            .client
            .post(&format!("/zones/{zone}/dns_records"), record)
            .await;
        unwrap_result(envelope?.result)
    }

    /// Partially update a record (absent fields keep their value)
    pub async fn update(&self, id: &str, patch: &RecordPatch) -> Result<ProviderRecord> {
        let zone = self.client.zone_id().await?;
        let envelope = self
            .client
            .patch(&format!("/zones/{zone}/dns_records/{id}"), patch)
            .await;
        unwrap_result(envelope?.result)
    }

    /// Delete a record, returning its id
    pub async fn delete(&self, id: &str) -> Result<String> {
        #[derive(Debug, Deserialize)]
        struct Deleted {
            id: String,
        }

        let zone = self.client.zone_id().await?;
        let envelope = self
            .client
            .delete::<Deleted>(&format!("/zones/{zone}/dns_records/{id}"))
            .await;
        unwrap_result(envelope?.result).map(|deleted| deleted.id)
    }
}

fn unwrap_result<T>(result: Option<T>) -> Result<T> {
    result.ok_or_else(|| CloudflareError::Provider {
        code: 0,
        message: "response missing result".to_string(),
    })
}

/// Builder for record listing requests
pub struct ListRecordsBuilder<'a> {
    client: &'a CloudflareClient,
    record_type: Option<RecordType>,
    name: Option<String>,
    page: Option<u32>,
    per_page: Option<u32>,
}

impl<'a> ListRecordsBuilder<'a> {
    const fn new(client: &'a CloudflareClient) -> Self {
        Self {
            client,
            record_type: None,
            name: None,
            page: None,
            per_page: None,
        }
    }

    /// Filter by record type
    #[must_use]
    pub const fn record_type(mut self, record_type: RecordType) -> Self {
        self.record_type = Some(record_type);
        self
    }

    /// Filter by record name
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the page number
    #[must_use]
    pub const fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    /// Set the page size
    #[must_use]
    pub const fn per_page(mut self, per_page: u32) -> Self {
        self.per_page = Some(per_page);
        self
    }

    /// Execute the request
    pub async fn send(self) -> Result<RecordPage> {
        let zone = self.client.zone_id().await?;

        let mut params = Vec::new();
        if let Some(record_type) = self.record_type {
            params.push(("type", record_type.as_str().to_string()));
        }
        if let Some(ref name) = self.name {
            params.push(("name", name.clone()));
        }
        if let Some(page) = self.page {
            params.push(("page", page.to_string()));
        }
        if let Some(per_page) = self.per_page {
            params.push(("per_page", per_page.to_string()));
        }

        let params_ref: Vec<(&str, &str)> =
            params.iter().map(|(k, v)| (*k, v.as_str())).collect();

        let envelope = self
            .client
            .get::<Vec<ProviderRecord>>(&format!("/zones/{zone}/dns_records"), &params_ref)
            .await?;

        let total = envelope
            .result_info
            .as_ref()
            .map_or(0, |info| info.total_count);
        let records = envelope.result.unwrap_or_default();
        Ok(RecordPage { records, total })
    }
}
