//! PostgREST table client for the remote `residents` table

use std::collections::HashMap;
use std::time::Duration;

use reqwest::Client;
use uuid::Uuid;

use crate::error::Error;
use crate::fetch::Fetch;
use crate::model::{Resident, ResidentPatch};

/// Thin client over the REST interface of the `residents` table
#[derive(Debug, Clone)]
pub struct RemoteTable {
    url: String,
    key: String,
    table: String,
    schema: String,
    client: Client,
    timeout: Option<Duration>,
}

impl RemoteTable {
    pub(crate) fn new(
        url: &str,
        key: &str,
        table: &str,
        schema: &str,
        client: Client,
        timeout: Option<Duration>,
    ) -> Self {
        Self {
            url: url.to_string(),
            key: key.to_string(),
            table: table.to_string(),
            schema: schema.to_string(),
            client,
            timeout,
        }
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/{}", self.url, self.table)
    }

    /// Fetch every record, newest first
    pub async fn list(&self) -> Result<Vec<Resident>, Error> {
        let mut params = HashMap::new();
        params.insert("select".to_string(), "*".to_string());
        params.insert("order".to_string(), "createdAt.desc".to_string());

        Fetch::get(&self.client, &self.table_url())
            .apikey(&self.key)
            .bearer_auth(&self.key)
            .header("Accept-Profile", &self.schema)
            .timeout(self.timeout)
            .query(params)
            .execute::<Vec<Resident>>()
            .await
    }

    /// Fetch one record by id
    pub async fn fetch(&self, id: Uuid) -> Result<Option<Resident>, Error> {
        let mut params = HashMap::new();
        params.insert("select".to_string(), "*".to_string());
        params.insert("id".to_string(), format!("eq.{}", id));

        let rows = Fetch::get(&self.client, &self.table_url())
            .apikey(&self.key)
            .bearer_auth(&self.key)
            .header("Accept-Profile", &self.schema)
            .timeout(self.timeout)
            .query(params)
            .execute::<Vec<Resident>>()
            .await?;

        Ok(rows.into_iter().next())
    }

    /// Insert a record and return the server-confirmed row
    pub async fn insert(&self, resident: &Resident) -> Result<Resident, Error> {
        let rows = Fetch::post(&self.client, &self.table_url())
            .apikey(&self.key)
            .bearer_auth(&self.key)
            .header("Content-Profile", &self.schema)
            .header("Prefer", "return=representation")
            .timeout(self.timeout)
            .json(resident)?
            .execute::<Vec<Resident>>()
            .await?;

        rows.into_iter()
            .next()
            .ok_or_else(|| Error::database("insert returned no rows"))
    }

    /// Patch a record by id and return the server-confirmed row
    pub async fn update(&self, id: Uuid, patch: &ResidentPatch) -> Result<Resident, Error> {
        let mut params = HashMap::new();
        params.insert("id".to_string(), format!("eq.{}", id));

        let rows = Fetch::patch(&self.client, &self.table_url())
            .apikey(&self.key)
            .bearer_auth(&self.key)
            .header("Content-Profile", &self.schema)
            .header("Prefer", "return=representation")
            .timeout(self.timeout)
            .query(params)
            .json(patch)?
            .execute::<Vec<Resident>>()
            .await?;

        rows.into_iter()
            .next()
            .ok_or_else(|| Error::database(format!("no record with id {}", id)))
    }

    /// Delete a record by id
    pub async fn delete(&self, id: Uuid) -> Result<(), Error> {
        let mut params = HashMap::new();
        params.insert("id".to_string(), format!("eq.{}", id));

        let response = Fetch::delete(&self.client, &self.table_url())
            .apikey(&self.key)
            .bearer_auth(&self.key)
            .header("Content-Profile", &self.schema)
            .timeout(self.timeout)
            .query(params)
            .execute_raw()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(Error::database(format!(
                "delete failed with status {}: {}",
                status, text
            )));
        }

        Ok(())
    }
}
