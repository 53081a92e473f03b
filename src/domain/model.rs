use serde::{Deserialize, Serialize};

/// One row of the exchange's listed-companies sheet, already narrowed to the
/// domestic equity segments we screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    /// Security code, zero-padded to 4 characters (e.g. "1301", "130A").
    pub code: String,
    pub name: String,
    pub market: String,
}

impl Listing {
    pub fn new(code: impl Into<String>, name: impl Into<String>, market: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            market: market.into(),
        }
    }

    /// Quote symbol for the Tokyo exchange (`7203` -> `7203.T`).
    pub fn symbol(&self) -> String {
        format!("{}.T", self.code)
    }
}

/// Valuation ratios for a single ticker. A field is `None` when the quote
/// API does not report it.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Fundamentals {
    /// Return on equity in percent (the wire format reports a fraction).
    pub roe: Option<f64>,
    /// Trailing price-to-earnings ratio.
    pub per: Option<f64>,
    /// Price-to-book ratio.
    pub pbr: Option<f64>,
}

/// Screening thresholds: ROE above, PER below, PBR below.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    pub roe_min: f64,
    pub per_max: f64,
    pub pbr_max: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            roe_min: 10.0,
            per_max: 15.0,
            pbr_max: 1.0,
        }
    }
}

impl Thresholds {
    /// A ticker matches only when all three ratios are present and pass.
    pub fn matches(&self, f: &Fundamentals) -> bool {
        match (f.roe, f.per, f.pbr) {
            (Some(roe), Some(per), Some(pbr)) => {
                roe > self.roe_min && per < self.per_max && pbr < self.pbr_max
            }
            _ => false,
        }
    }
}

/// One matched ticker, shaped exactly like the output CSV row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreenedStock {
    #[serde(rename = "Ticker")]
    pub ticker: String,
    #[serde(rename = "銘柄名")]
    pub name: String,
    #[serde(rename = "PBR")]
    pub pbr: f64,
    #[serde(rename = "PER")]
    pub per: f64,
    #[serde(rename = "ROE")]
    pub roe: f64,
}

/// Result of the screening transform: matched rows plus the rendered CSV
/// document and counters for the run summary.
#[derive(Debug, Clone)]
pub struct ScreenReport {
    pub rows: Vec<ScreenedStock>,
    pub csv_output: String,
    pub universe_size: usize,
    pub fetch_failures: usize,
}

/// Date stamp used in the CSV filename and the mail subject.
pub fn today_stamp() -> String {
    chrono::Local::now().format("%Y%m%d").to_string()
}

impl ScreenReport {
    /// CSV document as written to disk and attached to the mail: UTF-8 with
    /// a BOM so spreadsheet tools pick up the Japanese names.
    pub fn csv_bytes(&self) -> Vec<u8> {
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice(self.csv_output.as_bytes());
        bytes
    }

    /// Plain-text preview of the first `n` rows for the mail body.
    pub fn preview(&self, n: usize) -> String {
        let mut lines = vec![format!(
            "{:<10} {:<20} {:>8} {:>8} {:>8}",
            "Ticker", "銘柄名", "PBR", "PER", "ROE"
        )];
        for row in self.rows.iter().take(n) {
            lines.push(format!(
                "{:<10} {:<20} {:>8.2} {:>8.2} {:>8.2}",
                row.ticker, row.name, row.pbr, row.per, row.roe
            ));
        }
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fundamentals(roe: f64, per: f64, pbr: f64) -> Fundamentals {
        Fundamentals {
            roe: Some(roe),
            per: Some(per),
            pbr: Some(pbr),
        }
    }

    #[test]
    fn test_symbol_suffix() {
        let listing = Listing::new("7203", "トヨタ自動車", "プライム（内国株式）");
        assert_eq!(listing.symbol(), "7203.T");
    }

    #[test]
    fn test_thresholds_match() {
        let t = Thresholds::default();
        assert!(t.matches(&fundamentals(12.0, 10.0, 0.8)));
    }

    #[test]
    fn test_thresholds_reject_each_ratio() {
        let t = Thresholds::default();
        assert!(!t.matches(&fundamentals(9.9, 10.0, 0.8))); // ROE too low
        assert!(!t.matches(&fundamentals(12.0, 15.0, 0.8))); // PER at limit
        assert!(!t.matches(&fundamentals(12.0, 10.0, 1.0))); // PBR at limit
    }

    #[test]
    fn test_thresholds_reject_missing_field() {
        let t = Thresholds::default();
        let missing_roe = Fundamentals {
            roe: None,
            per: Some(10.0),
            pbr: Some(0.8),
        };
        let missing_per = Fundamentals {
            roe: Some(12.0),
            per: None,
            pbr: Some(0.8),
        };
        let missing_pbr = Fundamentals {
            roe: Some(12.0),
            per: Some(10.0),
            pbr: None,
        };
        assert!(!t.matches(&missing_roe));
        assert!(!t.matches(&missing_per));
        assert!(!t.matches(&missing_pbr));
        assert!(!t.matches(&Fundamentals::default()));
    }

    #[test]
    fn test_report_preview_truncates() {
        let rows = (0..8)
            .map(|i| ScreenedStock {
                ticker: format!("{:04}.T", 1300 + i),
                name: format!("Stock {}", i),
                pbr: 0.8,
                per: 10.0,
                roe: 12.0,
            })
            .collect();
        let report = ScreenReport {
            rows,
            csv_output: String::new(),
            universe_size: 8,
            fetch_failures: 0,
        };
        let preview = report.preview(5);
        assert_eq!(preview.lines().count(), 6); // header + 5 rows
        assert!(preview.contains("1300.T"));
        assert!(!preview.contains("1305.T"));
    }
}
