use crate::processors::{classify_status, HealthReading, ProcessorApi, ProcessorPayment, SendOutcome};
use anyhow::{anyhow, Result};
use std::time::Duration;

pub struct HttpProcessor {
    pub base_url: String,
    pub client: reqwest::Client,
}

#[async_trait::async_trait]
impl ProcessorApi for HttpProcessor {
    async fn send_payment(&self, payment: &ProcessorPayment, timeout: Duration) -> SendOutcome {
        let url = format!("{}/payments", self.base_url);
        let resp = self
            .client
            .post(url)
            .json(payment)
            .timeout(timeout)
            .send()
            .await;

        match resp {
            Ok(r) => classify_status(r.status().as_u16()),
            Err(e) => {
                tracing::debug!("send to {} failed: {}", self.base_url, e);
                SendOutcome::Failed
            }
        }
    }

    async fn check_health(&self, timeout: Duration) -> Result<HealthReading> {
        let url = format!("{}/payments/service-health", self.base_url);
        let resp = self.client.get(url).timeout(timeout).send().await?;
        if !resp.status().is_success() {
            return Err(anyhow!("health endpoint returned {}", resp.status()));
        }
        Ok(resp.json::<HealthReading>().await?)
    }
}
