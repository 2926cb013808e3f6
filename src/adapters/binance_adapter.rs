//! Binance USDⓈ-M futures price source.

use crate::domain::error::RsError;
use crate::ports::price_port::{Interval, PriceSource, SourceKind};
use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const CLOSE_INDEX: usize = 4;
const INVALID_SYMBOL_CODE: i64 = -1121;

#[derive(Debug, Deserialize)]
struct ExchangeInfo {
    symbols: Vec<ContractInfo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContractInfo {
    symbol: String,
    #[serde(default)]
    quote_asset: String,
    #[serde(default)]
    contract_type: String,
    #[serde(default)]
    status: String,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    code: i64,
    #[serde(default)]
    msg: String,
}

fn source_error(target: &str, reason: impl std::fmt::Display) -> RsError {
    RsError::PriceSource {
        target: target.to_string(),
        reason: reason.to_string(),
    }
}

/// USDT-quoted perpetual contracts currently trading, in listing order.
pub fn parse_exchange_info(body: &str) -> Result<Vec<String>, RsError> {
    let info: ExchangeInfo =
        serde_json::from_str(body).map_err(|e| source_error("exchangeInfo", e))?;
    Ok(info
        .symbols
        .into_iter()
        .filter(|c| c.quote_asset == "USDT" && c.contract_type == "PERPETUAL" && c.status == "TRADING")
        .map(|c| c.symbol)
        .collect())
}

/// Close prices from a klines response. Binance sends the close as a
/// string; plain numbers are accepted too.
pub fn parse_kline_closes(symbol: &str, body: &str) -> Result<Vec<f64>, RsError> {
    let klines: Vec<Vec<serde_json::Value>> =
        serde_json::from_str(body).map_err(|e| source_error(symbol, e))?;

    klines
        .iter()
        .map(|kline| {
            let close = kline
                .get(CLOSE_INDEX)
                .ok_or_else(|| source_error(symbol, "kline without close field"))?;
            match close {
                serde_json::Value::String(s) => s
                    .parse::<f64>()
                    .map_err(|e| source_error(symbol, format!("invalid close '{s}': {e}"))),
                serde_json::Value::Number(n) => n
                    .as_f64()
                    .ok_or_else(|| source_error(symbol, format!("invalid close {n}"))),
                other => Err(source_error(symbol, format!("invalid close {other}"))),
            }
        })
        .collect()
}

pub struct BinanceAdapter {
    client: Client,
    base_url: String,
}

impl BinanceAdapter {
    pub fn new(base_url: &str) -> Result<Self, RsError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("rsdaily/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| source_error(base_url, e))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn get(&self, target: &str, path: &str, query: &[(&str, String)]) -> Result<(StatusCode, String), RsError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .map_err(|e| source_error(target, e))?;
        let status = response.status();
        let body = response.text().map_err(|e| source_error(target, e))?;
        Ok((status, body))
    }
}

impl PriceSource for BinanceAdapter {
    fn kind(&self) -> SourceKind {
        SourceKind::Live
    }

    fn list_tradable_symbols(&self) -> Result<Vec<String>, RsError> {
        let (status, body) = self.get("exchangeInfo", "/fapi/v1/exchangeInfo", &[])?;
        if !status.is_success() {
            return Err(source_error("exchangeInfo", format!("HTTP {status}")));
        }
        let symbols = parse_exchange_info(&body)?;
        debug!(count = symbols.len(), "tradable contracts listed");
        Ok(symbols)
    }

    fn fetch_closes(
        &self,
        symbol: &str,
        interval_count: u32,
        interval: Interval,
        limit: usize,
    ) -> Result<Vec<f64>, RsError> {
        let query = [
            ("symbol", symbol.to_string()),
            ("interval", format!("{interval_count}{}", interval.code())),
            ("limit", limit.to_string()),
        ];
        let (status, body) = self.get(symbol, "/fapi/v1/klines", &query)?;

        if status == StatusCode::BAD_REQUEST {
            if let Ok(err) = serde_json::from_str::<ApiError>(&body) {
                if err.code == INVALID_SYMBOL_CODE {
                    debug!(symbol = %symbol, msg = %err.msg, "unknown symbol");
                    return Ok(Vec::new());
                }
            }
        }
        if !status.is_success() {
            return Err(source_error(symbol, format!("HTTP {status}: {body}")));
        }
        parse_kline_closes(symbol, &body)
    }
}
