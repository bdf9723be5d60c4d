// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP client for the cron gateway — the engine's only outbound network
//! call, used for `listCronJobs` and by the CLI's `workflow install`/
//! `workflow uninstall` commands.

use antfarm_core::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize)]
struct GatewayEnvelope<'a> {
    tool: &'a str,
    args: GatewayArgs<'a>,
}

#[derive(Debug, Clone, Serialize)]
struct GatewayArgs<'a> {
    action: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    job: Option<&'a Value>,
}

#[derive(Debug, Deserialize)]
struct GatewayResponse {
    ok: bool,
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<GatewayErrorBody>,
}

#[derive(Debug, Deserialize)]
struct GatewayErrorBody {
    message: String,
}

/// A thin client over the cron gateway's `{ tool: "cron", args: {...} }`
/// envelope. All fields beyond `ok`/`error.message` are treated as opaque.
#[derive(Clone)]
pub struct CronGatewayClient {
    endpoint: String,
    token: Option<String>,
    http: reqwest::Client,
}

impl CronGatewayClient {
    pub fn new(endpoint: impl Into<String>, token: Option<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            token,
            http: reqwest::Client::new(),
        }
    }

    pub async fn list(&self) -> Result<Value> {
        self.call("list", None).await
    }

    pub async fn add(&self, job: Value) -> Result<Value> {
        self.call("add", Some(&job)).await
    }

    pub async fn remove(&self, job: Value) -> Result<Value> {
        self.call("remove", Some(&job)).await
    }

    async fn call(&self, action: &str, job: Option<&Value>) -> Result<Value> {
        let envelope = GatewayEnvelope {
            tool: "cron",
            args: GatewayArgs { action, job },
        };

        let mut request = self.http.post(&self.endpoint).json(&envelope);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::GatewayError(e.to_string()))?;

        let body: GatewayResponse = response
            .json()
            .await
            .map_err(|e| Error::GatewayError(e.to_string()))?;

        if !body.ok {
            let message = body
                .error
                .map(|e| e.message)
                .unwrap_or_else(|| "cron gateway returned ok=false with no error message".into());
            return Err(Error::GatewayError(message));
        }

        Ok(body.result.unwrap_or(Value::Null))
    }
}

#[cfg(test)]
#[path = "gateway_tests.rs"]
mod tests;
