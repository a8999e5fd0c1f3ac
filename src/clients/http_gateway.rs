// JSON gateway client for chain queries and extrinsic submission
//
// The gateway holds the chain connection and the signing keys; this client
// only speaks HTTP/JSON to it. Every request names the chain endpoint it
// should be forwarded to.

use async_trait::async_trait;
use reqwest::StatusCode;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use crate::clients::chain::{ChainClient, StakeRequest, SubmitOutcome};
use crate::error::{WatcherError, WatcherResult};

pub const CHAIN_ENDPOINT_HEADER: &str = "x-chain-endpoint";

#[derive(Debug, Deserialize)]
struct PriceResponse {
    price: Decimal,
}

#[derive(Debug, Deserialize)]
struct BalanceResponse {
    free: Decimal,
}

#[derive(Debug, Deserialize)]
struct StakeResponse {
    stake: Decimal,
}

#[derive(Debug, Deserialize)]
struct HotkeysResponse {
    hotkeys: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct SubmitResponse {
    #[serde(default)]
    success: Option<bool>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Clone)]
pub struct HttpChainClient {
    client: reqwest::Client,
    base_url: String,
    chain_endpoint: String,
}

impl HttpChainClient {
    pub fn new(base_url: &str, chain_endpoint: &str, timeout: Duration) -> WatcherResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| WatcherError::Query(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            chain_endpoint: chain_endpoint.to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn chain_endpoint(&self) -> &str {
        &self.chain_endpoint
    }

    async fn query<T: for<'de> Deserialize<'de>>(&self, path: &str) -> WatcherResult<T> {
        let url = format!("{}{}", self.base_url, path);
        debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .header(CHAIN_ENDPOINT_HEADER, &self.chain_endpoint)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(WatcherError::Query(describe_status(path, status, &body)));
        }

        Ok(response.json::<T>().await?)
    }

    async fn submit(&self, path: &str, request: &StakeRequest) -> WatcherResult<SubmitOutcome> {
        let url = format!("{}{}", self.base_url, path);
        debug!("POST {} ({} on netuid {})", url, request.amount, request.netuid);

        let response = self
            .client
            .post(&url)
            .header(CHAIN_ENDPOINT_HEADER, &self.chain_endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| WatcherError::Submission(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(WatcherError::Submission(describe_status(path, status, &body)));
        }

        let parsed: SubmitResponse = response
            .json()
            .await
            .map_err(|e| WatcherError::Submission(format!("malformed response: {}", e)))?;

        if let Some(message) = parsed.message.as_deref() {
            debug!("gateway: {}", message);
        }

        Ok(SubmitOutcome::from(parsed.success))
    }
}

fn describe_status(path: &str, status: StatusCode, body: &str) -> String {
    if body.is_empty() {
        format!("{} returned HTTP {}", path, status.as_u16())
    } else {
        format!("{} returned HTTP {}: {}", path, status.as_u16(), body.trim())
    }
}

#[async_trait]
impl ChainClient for HttpChainClient {
    async fn get_price(&self, netuid: u16) -> WatcherResult<Decimal> {
        let response: PriceResponse = self.query(&format!("/v1/subnets/{}/price", netuid)).await?;
        Ok(response.price)
    }

    async fn get_balance(&self, coldkey_ss58: &str) -> WatcherResult<Decimal> {
        let response: BalanceResponse = self
            .query(&format!("/v1/accounts/{}/balance", coldkey_ss58))
            .await?;
        Ok(response.free)
    }

    async fn get_stake(&self, hotkey_ss58: &str, netuid: u16) -> WatcherResult<Decimal> {
        let response: StakeResponse = self
            .query(&format!("/v1/hotkeys/{}/stake/{}", hotkey_ss58, netuid))
            .await?;
        Ok(response.stake)
    }

    async fn submit_stake(&self, request: &StakeRequest) -> WatcherResult<SubmitOutcome> {
        self.submit("/v1/extrinsics/add_stake", request).await
    }

    async fn submit_unstake(&self, request: &StakeRequest) -> WatcherResult<SubmitOutcome> {
        self.submit("/v1/extrinsics/remove_stake", request).await
    }

    async fn subnet_hotkeys(&self, netuid: u16) -> WatcherResult<Vec<String>> {
        let response: HotkeysResponse = self
            .query(&format!("/v1/subnets/{}/hotkeys", netuid))
            .await?;
        Ok(response.hotkeys)
    }

    fn name(&self) -> &'static str {
        "http-gateway"
    }
}
