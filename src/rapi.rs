//! Reads the collection and search-field schema from the EODMS RAPI.
use crate::catalog::{Catalog, Collection, FieldDescriptor};
use crate::collector::Credentials;
use crate::config::RapiConfig;
use anyhow::{anyhow, Result};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

/// Shorthand names the RAPI does not publish but operators use.
const ALIASES: [(&str, &str); 3] = [
    ("RCMImageProducts", "RCM"),
    ("Radarsat1", "R1"),
    ("Radarsat2", "R2"),
];

#[derive(Deserialize, Debug)]
struct CollectionGroup {
    #[serde(default)]
    children: Vec<CollectionEntry>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct CollectionEntry {
    collection_id: String,
    title: String,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
struct CollectionDetail {
    #[serde(default)]
    search_fields: Vec<SearchField>,
}

#[derive(Deserialize, Debug)]
struct SearchField {
    id: String,
    title: String,
    #[serde(default)]
    datatype: Option<String>,
    #[serde(default)]
    choices: Option<Vec<FieldChoice>>,
}

#[derive(Deserialize, Debug)]
struct FieldChoice {
    value: serde_json::Value,
}

impl FieldChoice {
    fn as_text(&self) -> String {
        match &self.value {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

/// RAPI field ids carry the collection as a prefix ("RCM.BEAM_MNEMONIC").
fn short_field_id(id: &str) -> &str {
    id.rsplit_once('.').map(|(_, f)| f).unwrap_or(id)
}

impl From<SearchField> for FieldDescriptor {
    fn from(field: SearchField) -> Self {
        FieldDescriptor {
            id: short_field_id(&field.id).to_string(),
            title: field.title,
            choices: field
                .choices
                .unwrap_or_default()
                .iter()
                .map(FieldChoice::as_text)
                .collect(),
            data_type: field.datatype.unwrap_or_else(|| "String".to_string()),
        }
    }
}

fn collection_entries(groups: Vec<CollectionGroup>) -> Vec<CollectionEntry> {
    groups.into_iter().flat_map(|g| g.children).collect()
}

fn build_collection(entry: CollectionEntry, detail: CollectionDetail) -> Collection {
    let aliases = ALIASES
        .iter()
        .filter(|(id, _)| *id == entry.collection_id)
        .map(|(_, alias)| alias.to_string())
        .collect();
    Collection {
        id: entry.collection_id,
        title: entry.title,
        aliases,
        fields: detail.search_fields.into_iter().map(Into::into).collect(),
    }
}

pub struct RapiClient {
    client: reqwest::Client,
    base: Url,
    credentials: Credentials,
}

impl RapiClient {
    pub fn new(config: &RapiConfig, credentials: Credentials) -> Result<Self> {
        let mut base = Url::parse(&config.url)?;
        if !base.path().ends_with('/') {
            base.set_path(&format!("{}/", base.path()));
        }
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_query))
            .build()?;
        Ok(Self {
            client,
            base,
            credentials,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.base.join(path)?)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: Url) -> Result<T> {
        debug!("RAPI query: {}", url);
        let response = self
            .client
            .get(url.clone())
            .basic_auth(&self.credentials.username, Some(&self.credentials.password))
            .send()
            .await?;
        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(anyhow!("the EODMS username or password is incorrect"));
        }
        if !status.is_success() {
            return Err(anyhow!("RAPI query {} failed with status {}", url, status));
        }
        Ok(response.json().await?)
    }

    pub async fn fetch_catalog(&self) -> Result<Catalog> {
        let groups: Vec<CollectionGroup> = self.get_json(self.endpoint("collections")?).await?;
        let mut collections = vec![];
        for entry in collection_entries(groups) {
            let url = self.endpoint(&format!("collections/{}", entry.collection_id))?;
            let detail: CollectionDetail = self.get_json(url).await?;
            collections.push(build_collection(entry, detail));
        }
        info!("Retrieved {} collections from the RAPI", collections.len());
        Ok(Catalog::new(collections))
    }
}
