use anyhow::Context;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use swarecore::feed::Event;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NarrativeProduct {
    #[serde(default)]
    product_text: Option<String>,
}

/// Records decoded from one feed reply.
#[derive(Debug, Default)]
pub struct FeedBatch {
    /// Oldest-first, as served.
    pub events: Vec<Event>,
    /// `ingest_ts` of the last record served, including records that failed to decode.
    pub latest_ingest_ts: Option<i64>,
    pub skipped: usize,
}

impl FeedBatch {
    /// Decodes each record on its own so one malformed record only loses itself.
    pub fn decode(records: Vec<Value>) -> Self {
        let mut batch = FeedBatch::default();
        for record in records {
            if let Some(ts) = record.get("ingest_ts").and_then(Value::as_i64) {
                batch.latest_ingest_ts = Some(ts);
            }
            match serde_json::from_value::<Event>(record) {
                Ok(event) => batch.events.push(event),
                Err(err) => {
                    batch.skipped += 1;
                    log::warn!("skipping malformed feed record: {}", err);
                }
            }
        }
        batch
    }
}

/// HTTP access to the event feed and to narrative product text.
#[derive(Clone)]
pub struct FeedClient {
    http: reqwest::Client,
    base: String,
}

impl FeedClient {
    pub fn new(base: &str) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("building feed HTTP client")?;
        Ok(Self {
            http,
            base: base.trim_end_matches('/').to_string(),
        })
    }

    pub fn events_url(&self, since_ts: i64) -> String {
        format!("{}/{}", self.base, since_ts)
    }

    /// Events ingested after `since_ts`, oldest-first as served.
    pub async fn fetch_since(&self, since_ts: i64) -> anyhow::Result<FeedBatch> {
        let url = self.events_url(since_ts);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .with_context(|| format!("requesting {}", url))?
            .error_for_status()
            .with_context(|| format!("feed status for {}", url))?;
        let records = response
            .json::<Vec<Value>>()
            .await
            .with_context(|| format!("decoding events from {}", url))?;
        Ok(FeedBatch::decode(records))
    }

    /// Full text of a narrative product, if the endpoint has any.
    pub async fn fetch_narrative(&self, uri: &str) -> anyhow::Result<Option<String>> {
        let product = self
            .http
            .get(uri)
            .send()
            .await
            .with_context(|| format!("requesting narrative {}", uri))?
            .error_for_status()
            .with_context(|| format!("narrative status for {}", uri))?
            .json::<NarrativeProduct>()
            .await
            .with_context(|| format!("decoding narrative {}", uri))?;
        Ok(product.product_text.filter(|text| !text.is_empty()))
    }
}
