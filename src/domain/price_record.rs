//! Raw close series for one symbol, as written to the daily price batch.

/// Daily closes for one symbol, oldest first.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceRecord {
    pub symbol: String,
    pub closes: Vec<f64>,
}

impl PriceRecord {
    pub fn new(symbol: &str, closes: Vec<f64>) -> Self {
        Self {
            symbol: symbol.to_string(),
            closes,
        }
    }

    pub fn last_close(&self) -> Option<f64> {
        self.closes.last().copied()
    }

    /// The comma-joined series, e.g. `1.5,2,2.25`.
    pub fn joined_closes(&self) -> String {
        self.closes
            .iter()
            .map(|c| c.to_string())
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Parse a comma-joined series. Unparseable entries read as 0 and empty
    /// entries are dropped.
    pub fn parse_closes(input: &str) -> Vec<f64> {
        input
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(|p| p.parse::<f64>().unwrap_or(0.0))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joined_closes_uses_shortest_form() {
        let record = PriceRecord::new("BTCUSDT", vec![100.0, 101.5, 0.000123]);
        assert_eq!(record.joined_closes(), "100,101.5,0.000123");
    }

    #[test]
    fn parse_closes_tolerates_noise() {
        assert_eq!(PriceRecord::parse_closes("1, 2.5,,abc,4"), vec![1.0, 2.5, 0.0, 4.0]);
        assert!(PriceRecord::parse_closes("").is_empty());
    }

    #[test]
    fn last_close() {
        assert_eq!(PriceRecord::new("X", vec![1.0, 2.0]).last_close(), Some(2.0));
        assert_eq!(PriceRecord::new("X", vec![]).last_close(), None);
    }
}
