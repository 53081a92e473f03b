use crate::domain::model::Listing;
use crate::market::USER_AGENT;
use crate::utils::error::{Result, ScreenerError};
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use reqwest::Client;
use std::io::Cursor;

/// Market segments screened by default: the three domestic equity segments
/// of the Tokyo exchange.
pub const DOMESTIC_MARKETS: [&str; 3] = [
    "プライム（内国株式）",
    "スタンダード（内国株式）",
    "グロース（内国株式）",
];

const CODE_COLUMN: &str = "コード";
const NAME_COLUMN: &str = "銘柄名";
const MARKET_COLUMN: &str = "市場・商品区分";

/// Downloads the exchange's listed-companies workbook and turns it into the
/// ticker universe. Any failure here is fatal to the run.
pub struct UniverseClient {
    client: Client,
    url: String,
}

impl UniverseClient {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            url: url.into(),
        }
    }

    pub async fn fetch(&self, markets: &[String]) -> Result<Vec<Listing>> {
        tracing::debug!("Downloading ticker universe from: {}", self.url);
        let response = self
            .client
            .get(&self.url)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .send()
            .await?;

        let status = response.status();
        tracing::debug!("Universe response status: {}", status);
        if !status.is_success() {
            return Err(ScreenerError::UniverseError {
                message: format!("exchange returned HTTP {}", status),
            });
        }

        let bytes = response.bytes().await?;
        parse_universe(&bytes, markets)
    }
}

/// Parses the workbook bytes (.xls or .xlsx) into listings, keeping only the
/// requested market segments. Security codes are zero-padded to 4 characters
/// and may be alphanumeric (e.g. "130A").
pub fn parse_universe(bytes: &[u8], markets: &[String]) -> Result<Vec<Listing>> {
    let cursor = Cursor::new(bytes.to_vec());
    let mut workbook = open_workbook_auto_from_rs(cursor)?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| ScreenerError::UniverseError {
            message: "workbook contains no sheets".to_string(),
        })??;

    let mut rows = range.rows();
    let header = rows.next().ok_or_else(|| ScreenerError::UniverseError {
        message: "listing sheet is empty".to_string(),
    })?;

    let code_col = column_index(header, CODE_COLUMN)?;
    let name_col = column_index(header, NAME_COLUMN)?;
    let market_col = column_index(header, MARKET_COLUMN)?;

    let mut listings = Vec::new();
    for row in rows {
        let market = match row.get(market_col).and_then(cell_text) {
            Some(m) => m,
            None => continue,
        };
        if !markets.iter().any(|m| *m == market) {
            continue;
        }

        let code = match row.get(code_col).and_then(cell_text) {
            Some(c) => format!("{:0>4}", c),
            None => continue,
        };
        let name = match row.get(name_col).and_then(cell_text) {
            Some(n) => n,
            None => continue,
        };

        listings.push(Listing::new(code, name, market));
    }

    if listings.is_empty() {
        return Err(ScreenerError::UniverseError {
            message: "no listings matched the requested market segments".to_string(),
        });
    }

    tracing::info!("対象銘柄数: {}", listings.len());
    Ok(listings)
}

fn column_index(header: &[Data], name: &str) -> Result<usize> {
    header
        .iter()
        .position(|cell| cell_text(cell).as_deref() == Some(name))
        .ok_or_else(|| ScreenerError::UniverseError {
            message: format!("listing sheet is missing column: {}", name),
        })
}

/// Codes come back as text for alphanumeric tickers but as floats for purely
/// numeric ones, so both shapes are normalized to a trimmed string.
fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Data::Float(f) if f.fract() == 0.0 => Some(format!("{}", *f as i64)),
        Data::Int(i) => Some(i.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_xlsxwriter::Workbook;

    fn domestic_markets() -> Vec<String> {
        DOMESTIC_MARKETS.iter().map(|m| m.to_string()).collect()
    }

    fn fixture_workbook() -> Vec<u8> {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();

        let headers = ["日付", CODE_COLUMN, NAME_COLUMN, MARKET_COLUMN];
        for (col, h) in headers.iter().enumerate() {
            sheet.write_string(0, col as u16, *h).unwrap();
        }

        // Numeric code, Prime segment.
        sheet.write_string(1, 0, "20260807").unwrap();
        sheet.write_number(1, 1, 1301.0).unwrap();
        sheet.write_string(1, 2, "極洋").unwrap();
        sheet.write_string(1, 3, "プライム（内国株式）").unwrap();

        // Alphanumeric code, Growth segment.
        sheet.write_string(2, 0, "20260807").unwrap();
        sheet.write_string(2, 1, "130A").unwrap();
        sheet.write_string(2, 2, "ベースフード").unwrap();
        sheet.write_string(2, 3, "グロース（内国株式）").unwrap();

        // Short numeric code needing the zero pad.
        sheet.write_string(3, 0, "20260807").unwrap();
        sheet.write_number(3, 1, 801.0).unwrap();
        sheet.write_string(3, 2, "テスト短縮コード").unwrap();
        sheet.write_string(3, 3, "スタンダード（内国株式）").unwrap();

        // ETF row, must be filtered out.
        sheet.write_string(4, 0, "20260807").unwrap();
        sheet.write_number(4, 1, 1305.0).unwrap();
        sheet.write_string(4, 2, "ダイワ上場投信").unwrap();
        sheet.write_string(4, 3, "ETF・ETN").unwrap();

        workbook.save_to_buffer().unwrap()
    }

    #[test]
    fn test_parse_universe_filters_and_normalizes() {
        let bytes = fixture_workbook();
        let listings = parse_universe(&bytes, &domestic_markets()).unwrap();

        assert_eq!(listings.len(), 3);
        assert_eq!(listings[0].code, "1301");
        assert_eq!(listings[0].name, "極洋");
        assert_eq!(listings[0].symbol(), "1301.T");
        assert_eq!(listings[1].code, "130A");
        assert_eq!(listings[2].code, "0801"); // zero-padded
    }

    #[test]
    fn test_parse_universe_respects_market_selection() {
        let bytes = fixture_workbook();
        let prime_only = vec!["プライム（内国株式）".to_string()];
        let listings = parse_universe(&bytes, &prime_only).unwrap();

        assert_eq!(listings.len(), 1);
        assert_eq!(listings[0].code, "1301");
    }

    #[test]
    fn test_parse_universe_rejects_empty_match() {
        let bytes = fixture_workbook();
        let none = vec!["REIT".to_string()];
        let err = parse_universe(&bytes, &none).unwrap_err();
        assert!(matches!(err, ScreenerError::UniverseError { .. }));
    }

    #[test]
    fn test_parse_universe_rejects_missing_column() {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.write_string(0, 0, "日付").unwrap();
        sheet.write_string(0, 1, CODE_COLUMN).unwrap();
        let bytes = workbook.save_to_buffer().unwrap();

        let err = parse_universe(&bytes, &domestic_markets()).unwrap_err();
        assert!(matches!(err, ScreenerError::UniverseError { .. }));
    }

    #[tokio::test]
    async fn test_fetch_aborts_on_http_error() {
        use httpmock::prelude::*;

        let server = MockServer::start();
        let universe_mock = server.mock(|when, then| {
            when.method(GET).path("/data_j.xls");
            then.status(503);
        });

        let client = UniverseClient::new(server.url("/data_j.xls"));
        let err = client.fetch(&domestic_markets()).await.unwrap_err();

        universe_mock.assert();
        assert!(matches!(err, ScreenerError::UniverseError { .. }));
    }

    #[tokio::test]
    async fn test_fetch_parses_served_workbook() {
        use httpmock::prelude::*;

        let server = MockServer::start();
        let universe_mock = server.mock(|when, then| {
            when.method(GET).path("/data_j.xls");
            then.status(200).body(fixture_workbook());
        });

        let client = UniverseClient::new(server.url("/data_j.xls"));
        let listings = client.fetch(&domestic_markets()).await.unwrap();

        universe_mock.assert();
        assert_eq!(listings.len(), 3);
    }
}
