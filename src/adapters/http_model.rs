use crate::domain::ports::{ClassModel, ModelOutput};
use crate::utils::error::{QuakeError, Result};
use crate::utils::validation::validate_url;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A classifier served over HTTP.
///
/// Requests are `POST {"features": [..]}`; the endpoint answers either
/// `{"class": n}` or `{"probabilities": [p0, p1, p2]}`.
pub struct HttpModel {
    name: String,
    endpoint: String,
    client: Client,
}

#[derive(Serialize)]
struct PredictRequest<'a> {
    features: &'a [f64],
}

#[derive(Deserialize)]
struct PredictResponse {
    // 樹模型常回傳 1.0 之類的浮點類別
    class: Option<f64>,
    probabilities: Option<Vec<f64>>,
}

impl HttpModel {
    pub fn connect(name: impl Into<String>, endpoint: &str, timeout: Duration) -> Result<Self> {
        let name = name.into();
        validate_url(&format!("{}.endpoint", name), endpoint)?;

        let client = Client::builder().timeout(timeout).build()?;
        tracing::debug!("Model '{}' bound to {}", name, endpoint);

        Ok(Self {
            name,
            endpoint: endpoint.to_string(),
            client,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

#[async_trait]
impl ClassModel for HttpModel {
    async fn predict(&self, features: &[f64]) -> Result<ModelOutput> {
        tracing::debug!("Requesting prediction from {}", self.endpoint);
        let response = self
            .client
            .post(&self.endpoint)
            .json(&PredictRequest { features })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(QuakeError::PredictionError {
                model: self.name.clone(),
                message: format!("endpoint answered HTTP {}", status),
            });
        }

        let body: PredictResponse = response.json().await?;
        match (body.class, body.probabilities) {
            (Some(class), _) if class.is_finite() && class.fract() == 0.0 => {
                Ok(ModelOutput::Class(class as i64))
            }
            (Some(class), _) => Err(QuakeError::PredictionError {
                model: self.name.clone(),
                message: format!("class {} is not a whole number", class),
            }),
            (None, Some(probabilities)) => Ok(ModelOutput::Probabilities(probabilities)),
            (None, None) => Err(QuakeError::PredictionError {
                model: self.name.clone(),
                message: "response has neither 'class' nor 'probabilities'".to_string(),
            }),
        }
    }
}
