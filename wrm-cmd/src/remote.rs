//! Client for the demand prediction service.
//!
//! The service keeps its own table of readings and fits a demand model on
//! request:
//!
//! - `POST /add` with `{inflow, rainfall, outflow, demand, date}`
//! - `GET /data` returning every stored row
//! - `POST /train`
//! - `POST /predict` with `{inflow, rainfall, outflow}` returning `{predicted_demand}`
//!
//! Failures come back as a non-2xx status with an `{"error": ...}` body.
//! Requests are sent once; there is no retry.

use anyhow::{anyhow, Context};
use clap::Subcommand;
use log::{info, warn};
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use std::io::Write;

use wrm_core::{Reading, Severity};
use wrm_utils::dates::{format_date, parse_log_date};

use crate::view::notice;

#[derive(Subcommand, Debug)]
pub enum RemoteCommand {
    /// Send one day's reading to the prediction service
    Add {
        #[arg(long)]
        inflow: f64,
        #[arg(long)]
        rainfall: f64,
        #[arg(long)]
        outflow: f64,
        #[arg(long)]
        demand: f64,
        /// YYYY-MM-DD, YYYYMMDD or "today"
        #[arg(long, default_value = "today")]
        date: String,
    },

    /// List the readings stored by the prediction service
    Data,

    /// Fit the demand model on the stored readings
    Train,

    /// Predict demand for the given flows
    Predict {
        #[arg(long)]
        inflow: f64,
        #[arg(long)]
        rainfall: f64,
        #[arg(long)]
        outflow: f64,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AddRecord {
    #[serde(flatten)]
    pub reading: Reading,
    pub date: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PredictRequest {
    pub inflow: f64,
    pub rainfall: f64,
    pub outflow: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Prediction {
    pub predicted_demand: f64,
}

/// One row of `GET /data`. The service stores whatever it was sent, so every
/// column may be null.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WaterRow {
    pub id: Option<i64>,
    pub inflow: Option<f64>,
    pub rainfall: Option<f64>,
    pub outflow: Option<f64>,
    pub demand: Option<f64>,
    pub date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ServiceMessage {
    message: Option<String>,
    error: Option<String>,
}

pub struct PredictionClient {
    client: Client,
    base_url: String,
}

impl PredictionClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Returns the service's confirmation message.
    pub async fn add(&self, record: &AddRecord) -> anyhow::Result<String> {
        let url = self.endpoint("add");
        info!("[WRM] remote: POST {}", url);
        let response = self.client.post(&url).json(record).send().await?;
        let body: ServiceMessage = checked(response).await?.json().await?;
        Ok(body.message.unwrap_or_else(|| "Data added successfully".to_string()))
    }

    pub async fn data(&self) -> anyhow::Result<Vec<WaterRow>> {
        let url = self.endpoint("data");
        info!("[WRM] remote: GET {}", url);
        let response = self.client.get(&url).send().await?;
        let rows = checked(response)
            .await?
            .json()
            .await
            .context("prediction service returned malformed rows")?;
        Ok(rows)
    }

    pub async fn train(&self) -> anyhow::Result<String> {
        let url = self.endpoint("train");
        info!("[WRM] remote: POST {}", url);
        let response = self.client.post(&url).send().await?;
        let body: ServiceMessage = checked(response).await?.json().await?;
        Ok(body.message.unwrap_or_else(|| "Model trained successfully".to_string()))
    }

    pub async fn predict(&self, request: &PredictRequest) -> anyhow::Result<Prediction> {
        let url = self.endpoint("predict");
        info!("[WRM] remote: POST {}", url);
        let response = self.client.post(&url).json(request).send().await?;
        let prediction = checked(response)
            .await?
            .json()
            .await
            .context("prediction service returned a malformed prediction")?;
        Ok(prediction)
    }
}

/// Turn a non-2xx response into an error carrying the service's `error` text.
async fn checked(response: Response) -> anyhow::Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let text = response.text().await.unwrap_or_default();
    warn!("[WRM] remote: {} returned {}", status, text.trim());
    let message = serde_json::from_str::<ServiceMessage>(&text)
        .ok()
        .and_then(|body| body.error)
        .unwrap_or_else(|| format!("prediction service returned {status}"));
    Err(anyhow!(message))
}

fn cell(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}

pub fn render_rows(rows: &[WaterRow]) -> String {
    let mut out = format!(
        "{:>6}  {:>9}  {:>9}  {:>9}  {:>9}  date\n",
        "id", "inflow", "rainfall", "outflow", "demand"
    );
    for row in rows {
        out.push_str(&format!(
            "{:>6}  {:>9}  {:>9}  {:>9}  {:>9}  {}\n",
            row.id.map(|id| id.to_string()).unwrap_or_else(|| "-".to_string()),
            cell(row.inflow),
            cell(row.rainfall),
            cell(row.outflow),
            cell(row.demand),
            row.date.as_deref().unwrap_or("-")
        ));
    }
    out
}

pub async fn run_remote(
    api_url: &str,
    command: RemoteCommand,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let client = PredictionClient::new(api_url);
    match command {
        RemoteCommand::Add {
            inflow,
            rainfall,
            outflow,
            demand,
            date,
        } => {
            let reading = Reading::new(inflow, rainfall, outflow, demand);
            reading.validate()?;
            let record = AddRecord {
                reading,
                date: format_date(&parse_log_date(&date)?),
            };
            let message = client.add(&record).await?;
            writeln!(out, "{}", notice(Severity::Success, &message))?;
        }
        RemoteCommand::Data => {
            let rows = client.data().await?;
            write!(out, "{}", render_rows(&rows))?;
        }
        RemoteCommand::Train => {
            let message = client.train().await?;
            writeln!(out, "{}", notice(Severity::Success, &message))?;
        }
        RemoteCommand::Predict {
            inflow,
            rainfall,
            outflow,
        } => {
            let prediction = client
                .predict(&PredictRequest {
                    inflow,
                    rainfall,
                    outflow,
                })
                .await?;
            writeln!(out, "Predicted Demand: {:.2}", prediction.predicted_demand)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_endpoint_joins_paths() {
        let client = PredictionClient::new("http://127.0.0.1:5000/");
        assert_eq!(client.endpoint("/predict"), "http://127.0.0.1:5000/predict");
        assert_eq!(client.endpoint("data"), "http://127.0.0.1:5000/data");
    }

    #[test]
    fn test_add_record_is_flat() {
        let record = AddRecord {
            reading: Reading::new(1.0, 2.0, 3.0, 4.0),
            date: "2024-05-01".to_string(),
        };
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "inflow": 1.0, "rainfall": 2.0, "outflow": 3.0, "demand": 4.0,
                "date": "2024-05-01"
            })
        );
    }

    #[test]
    fn test_rows_tolerate_nulls() {
        let rows: Vec<WaterRow> = serde_json::from_str(
            r#"[{"id":1,"inflow":5.0,"rainfall":null,"outflow":2,"demand":1,"date":"2024-05-01"}]"#,
        )
        .unwrap();
        assert_eq!(rows[0].rainfall, None);
        let text = render_rows(&rows);
        assert!(text.lines().nth(1).unwrap().contains("2024-05-01"));
        assert!(text.contains(" - "));
    }

    #[tokio::test]
    async fn test_predict_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/predict"))
            .and(body_json(json!({"inflow": 10.0, "rainfall": 2.0, "outflow": 4.0})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"predicted_demand": 12.345})))
            .expect(1)
            .mount(&server)
            .await;

        let mut out = Vec::new();
        run_remote(
            &server.uri(),
            RemoteCommand::Predict {
                inflow: 10.0,
                rainfall: 2.0,
                outflow: 4.0,
            },
            &mut out,
        )
        .await
        .unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "Predicted Demand: 12.35\n");
    }

    #[tokio::test]
    async fn test_add_sends_flat_record() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/add"))
            .and(body_json(json!({
                "inflow": 5.0, "rainfall": 1.0, "outflow": 2.0, "demand": 3.0,
                "date": "2024-05-01"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "Data added successfully"})))
            .expect(1)
            .mount(&server)
            .await;

        let mut out = Vec::new();
        run_remote(
            &server.uri(),
            RemoteCommand::Add {
                inflow: 5.0,
                rainfall: 1.0,
                outflow: 2.0,
                demand: 3.0,
                date: "20240501".to_string(),
            },
            &mut out,
        )
        .await
        .unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "[success] Data added successfully\n"
        );
    }

    #[tokio::test]
    async fn test_data_lists_rows() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": 1, "inflow": 5.0, "rainfall": 0.0, "outflow": 2.0, "demand": 1.0, "date": "2024-05-01"}
            ])))
            .mount(&server)
            .await;

        let rows = PredictionClient::new(&server.uri()).data().await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].date.as_deref(), Some("2024-05-01"));
    }

    #[tokio::test]
    async fn test_service_error_message_surfaces() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/train"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({"error": "Not enough data to train"})))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/predict"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({"error": "Model not trained yet"})))
            .mount(&server)
            .await;

        let client = PredictionClient::new(&server.uri());
        let err = client.train().await.unwrap_err();
        assert_eq!(err.to_string(), "Not enough data to train");
        let err = client
            .predict(&PredictRequest {
                inflow: 1.0,
                rainfall: 1.0,
                outflow: 1.0,
            })
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Model not trained yet");
    }

    #[tokio::test]
    async fn test_error_without_body_reports_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let err = PredictionClient::new(&server.uri()).data().await.unwrap_err();
        assert!(err.to_string().starts_with("prediction service returned 500"));
    }

    #[tokio::test]
    async fn test_negative_reading_is_not_sent() {
        let mut out = Vec::new();
        let err = run_remote(
            "http://127.0.0.1:9",
            RemoteCommand::Add {
                inflow: -1.0,
                rainfall: 0.0,
                outflow: 0.0,
                demand: 0.0,
                date: "2024-05-01".to_string(),
            },
            &mut out,
        )
        .await
        .unwrap_err();
        assert!(err.downcast_ref::<wrm_core::LedgerError>().is_some());
        assert!(out.is_empty());
    }
}
