use crate::domain::model::Fundamentals;
use crate::market::USER_AGENT;
use crate::utils::error::{Result, ScreenerError};
use reqwest::Client;
use serde::Deserialize;

const QUOTE_MODULES: &str = "financialData,summaryDetail,defaultKeyStatistics";

/// The slice of the `quoteSummary` payload we care about. Every level is
/// optional: the API regularly omits modules or individual fields.
#[derive(Debug, Deserialize)]
struct QuoteSummaryResponse {
    #[serde(rename = "quoteSummary")]
    quote_summary: QuoteSummary,
}

#[derive(Debug, Deserialize)]
struct QuoteSummary {
    result: Option<Vec<QuoteModules>>,
    #[allow(dead_code)]
    error: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct QuoteModules {
    #[serde(rename = "summaryDetail")]
    summary_detail: Option<SummaryDetail>,
    #[serde(rename = "financialData")]
    financial_data: Option<FinancialData>,
    #[serde(rename = "defaultKeyStatistics")]
    default_key_statistics: Option<DefaultKeyStatistics>,
}

#[derive(Debug, Deserialize)]
struct SummaryDetail {
    #[serde(rename = "trailingPE")]
    trailing_pe: Option<RawValue>,
}

#[derive(Debug, Deserialize)]
struct FinancialData {
    #[serde(rename = "returnOnEquity")]
    return_on_equity: Option<RawValue>,
}

#[derive(Debug, Deserialize)]
struct DefaultKeyStatistics {
    #[serde(rename = "priceToBook")]
    price_to_book: Option<RawValue>,
}

#[derive(Debug, Deserialize)]
struct RawValue {
    raw: Option<f64>,
}

/// Per-ticker fundamentals client. Cheap to clone; the inner reqwest client
/// is shared across the worker pool.
#[derive(Debug, Clone)]
pub struct QuoteClient {
    client: Client,
    base_url: String,
}

impl QuoteClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Fetches ROE/PER/PBR for one symbol. ROE arrives as a fraction and is
    /// converted to percent here.
    pub async fn fetch_fundamentals(&self, symbol: &str) -> Result<Fundamentals> {
        let url = format!(
            "{}/v10/finance/quoteSummary/{}",
            self.base_url.trim_end_matches('/'),
            symbol
        );

        tracing::debug!("Fetching fundamentals: {}", url);
        let response = self
            .client
            .get(&url)
            .query(&[("modules", QUOTE_MODULES)])
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScreenerError::ProcessingError {
                message: format!("quote API returned HTTP {} for {}", status, symbol),
            });
        }

        let body: QuoteSummaryResponse = response.json().await?;
        let modules = body
            .quote_summary
            .result
            .unwrap_or_default()
            .into_iter()
            .next()
            .ok_or_else(|| ScreenerError::ProcessingError {
                message: format!("no quote data for {}", symbol),
            })?;

        Ok(Fundamentals {
            roe: modules
                .financial_data
                .and_then(|d| d.return_on_equity)
                .and_then(|v| v.raw)
                .map(|v| v * 100.0),
            per: modules
                .summary_detail
                .and_then(|d| d.trailing_pe)
                .and_then(|v| v.raw),
            pbr: modules
                .default_key_statistics
                .and_then(|d| d.price_to_book)
                .and_then(|v| v.raw),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn quote_body(roe_fraction: f64, per: f64, pbr: f64) -> serde_json::Value {
        serde_json::json!({
            "quoteSummary": {
                "result": [{
                    "summaryDetail": {"trailingPE": {"raw": per, "fmt": format!("{:.2}", per)}},
                    "financialData": {"returnOnEquity": {"raw": roe_fraction, "fmt": format!("{:.2}%", roe_fraction * 100.0)}},
                    "defaultKeyStatistics": {"priceToBook": {"raw": pbr, "fmt": format!("{:.2}", pbr)}}
                }],
                "error": null
            }
        })
    }

    #[tokio::test]
    async fn test_fetch_fundamentals_converts_roe_to_percent() {
        let server = MockServer::start();
        let quote_mock = server.mock(|when, then| {
            when.method(GET)
                .path("/v10/finance/quoteSummary/7203.T")
                .query_param("modules", QUOTE_MODULES);
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(quote_body(0.124, 9.5, 0.9));
        });

        let client = QuoteClient::new(server.base_url());
        let f = client.fetch_fundamentals("7203.T").await.unwrap();

        quote_mock.assert();
        assert!((f.roe.unwrap() - 12.4).abs() < 1e-9);
        assert_eq!(f.per, Some(9.5));
        assert_eq!(f.pbr, Some(0.9));
    }

    #[tokio::test]
    async fn test_fetch_fundamentals_missing_fields_are_none() {
        let server = MockServer::start();
        let quote_mock = server.mock(|when, then| {
            when.method(GET).path("/v10/finance/quoteSummary/1301.T");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({
                    "quoteSummary": {
                        "result": [{
                            "summaryDetail": {"trailingPE": {}},
                            "financialData": {}
                        }],
                        "error": null
                    }
                }));
        });

        let client = QuoteClient::new(server.base_url());
        let f = client.fetch_fundamentals("1301.T").await.unwrap();

        quote_mock.assert();
        assert_eq!(f.roe, None);
        assert_eq!(f.per, None);
        assert_eq!(f.pbr, None);
    }

    #[tokio::test]
    async fn test_fetch_fundamentals_http_error() {
        let server = MockServer::start();
        let quote_mock = server.mock(|when, then| {
            when.method(GET).path("/v10/finance/quoteSummary/9999.T");
            then.status(404);
        });

        let client = QuoteClient::new(server.base_url());
        let err = client.fetch_fundamentals("9999.T").await.unwrap_err();

        quote_mock.assert();
        assert!(matches!(err, ScreenerError::ProcessingError { .. }));
    }

    #[tokio::test]
    async fn test_fetch_fundamentals_empty_result() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/v10/finance/quoteSummary/0000.T");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({
                    "quoteSummary": {"result": [], "error": null}
                }));
        });

        let client = QuoteClient::new(server.base_url());
        let err = client.fetch_fundamentals("0000.T").await.unwrap_err();
        assert!(matches!(err, ScreenerError::ProcessingError { .. }));
    }
}
