//! Response types for the Poloniex public API
//!
//! Poloniex sends most decimals as JSON strings; the numeric fields here accept
//! either a string or a number.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::dates::api_date;

/// Summary for one currency pair (`returnTicker`)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticker {
    pub id: u64,
    #[serde(deserialize_with = "deserialize_f64_or_string")]
    pub last: f64,
    #[serde(deserialize_with = "deserialize_f64_or_string")]
    pub lowest_ask: f64,
    #[serde(deserialize_with = "deserialize_f64_or_string")]
    pub highest_bid: f64,
    #[serde(deserialize_with = "deserialize_f64_or_string")]
    pub percent_change: f64,
    #[serde(deserialize_with = "deserialize_f64_or_string")]
    pub base_volume: f64,
    #[serde(deserialize_with = "deserialize_f64_or_string")]
    pub quote_volume: f64,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub is_frozen: bool,
    #[serde(default, rename = "high24hr", deserialize_with = "deserialize_opt_f64")]
    pub high_24hr: Option<f64>,
    #[serde(default, rename = "low24hr", deserialize_with = "deserialize_opt_f64")]
    pub low_24hr: Option<f64>,
}

impl Ticker {
    /// Bid-ask spread
    pub fn spread(&self) -> f64 {
        self.lowest_ask - self.highest_bid
    }
}

/// One entry of the `return24hVolume` response
///
/// Pair keys (`BTC_ETH`) map to per-currency volumes; `totalXXX` keys hold a
/// single figure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VolumeEntry {
    Pair(HashMap<String, String>),
    Total(String),
}

impl VolumeEntry {
    /// Volume of one currency in a pair entry, or the total
    pub fn volume_of(&self, currency: &str) -> Option<f64> {
        match self {
            VolumeEntry::Pair(volumes) => volumes.get(currency)?.parse().ok(),
            VolumeEntry::Total(total) => total.parse().ok(),
        }
    }
}

pub type Volume24h = HashMap<String, VolumeEntry>;

/// Currency details (`returnCurrencies`)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Currency {
    pub id: u64,
    pub name: String,
    #[serde(deserialize_with = "deserialize_f64_or_string")]
    pub tx_fee: f64,
    #[serde(default)]
    pub min_conf: u64,
    #[serde(default)]
    pub deposit_address: Option<String>,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub disabled: bool,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub delisted: bool,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub frozen: bool,
}

/// A single candle from `returnChartData`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartBar {
    /// Candle start, epoch seconds
    pub date: i64,
    #[serde(deserialize_with = "deserialize_f64_or_string")]
    pub high: f64,
    #[serde(deserialize_with = "deserialize_f64_or_string")]
    pub low: f64,
    #[serde(deserialize_with = "deserialize_f64_or_string")]
    pub open: f64,
    #[serde(deserialize_with = "deserialize_f64_or_string")]
    pub close: f64,
    #[serde(deserialize_with = "deserialize_f64_or_string")]
    pub volume: f64,
    #[serde(deserialize_with = "deserialize_f64_or_string")]
    pub quote_volume: f64,
    #[serde(deserialize_with = "deserialize_f64_or_string")]
    pub weighted_average: f64,
}

/// Aggressor side of a trade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeSide {
    #[serde(alias = "BUY")]
    Buy,
    #[serde(alias = "SELL")]
    Sell,
}

impl std::fmt::Display for TradeSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TradeSide::Buy => write!(f, "buy"),
            TradeSide::Sell => write!(f, "sell"),
        }
    }
}

/// Trade from `returnTradeHistory`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    #[serde(rename = "globalTradeID")]
    pub global_trade_id: u64,
    #[serde(rename = "tradeID")]
    pub trade_id: u64,
    /// Execution time, UTC, second precision
    #[serde(with = "api_date")]
    pub date: NaiveDateTime,
    #[serde(rename = "type")]
    pub side: TradeSide,
    #[serde(deserialize_with = "deserialize_f64_or_string")]
    pub rate: f64,
    #[serde(deserialize_with = "deserialize_f64_or_string")]
    pub amount: f64,
    #[serde(deserialize_with = "deserialize_f64_or_string")]
    pub total: f64,
    #[serde(rename = "orderNumber", default, deserialize_with = "deserialize_opt_u64")]
    pub order_number: Option<u64>,
}

impl Trade {
    /// Execution time as epoch seconds
    pub fn epoch_secs(&self) -> i64 {
        self.date.and_utc().timestamp()
    }
}

/// Trade from `/markets/{symbol}/trades`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketTrade {
    pub id: String,
    #[serde(deserialize_with = "deserialize_f64_or_string")]
    pub price: f64,
    #[serde(deserialize_with = "deserialize_f64_or_string")]
    pub quantity: f64,
    #[serde(deserialize_with = "deserialize_f64_or_string")]
    pub amount: f64,
    pub taker_side: TradeSide,
    /// Epoch milliseconds
    pub ts: i64,
    /// Epoch milliseconds
    pub create_time: i64,
}

/// Latest price (`/markets/{symbol}/price`)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketPrice {
    pub symbol: String,
    #[serde(deserialize_with = "deserialize_f64_or_string")]
    pub price: f64,
    /// Epoch milliseconds
    pub time: i64,
    #[serde(deserialize_with = "deserialize_f64_or_string")]
    pub daily_change: f64,
    /// Epoch milliseconds
    pub ts: i64,
}

// Custom deserializer for f64 that can handle string representation
pub(crate) fn deserialize_f64_or_string<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::{self, Visitor};

    struct F64OrString;

    impl<'de> Visitor<'de> for F64OrString {
        type Value = f64;

        fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
            formatter.write_str("a number or a string representing a number")
        }

        fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(v)
        }

        fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(v as f64)
        }

        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(v as f64)
        }

        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            v.trim().parse().map_err(de::Error::custom)
        }
    }

    deserializer.deserialize_any(F64OrString)
}

fn deserialize_opt_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    struct Wrapper(#[serde(deserialize_with = "deserialize_f64_or_string")] f64);

    Ok(Option::<Wrapper>::deserialize(deserializer)?.map(|w| w.0))
}

fn deserialize_opt_u64<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error;

    match Option::<serde_json::Value>::deserialize(deserializer)? {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::Number(n)) => n
            .as_u64()
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("not an unsigned integer: {}", n))),
        Some(serde_json::Value::String(s)) => s.parse().map(Some).map_err(D::Error::custom),
        Some(other) => Err(D::Error::custom(format!("unexpected value: {}", other))),
    }
}

// Poloniex flags arrive as 0/1, "0"/"1" or true/false
pub(crate) fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error;

    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Bool(b) => Ok(b),
        serde_json::Value::Number(n) => Ok(n.as_f64().unwrap_or(0.0) != 0.0),
        serde_json::Value::String(s) => Ok(!matches!(s.as_str(), "" | "0" | "false")),
        serde_json::Value::Null => Ok(false),
        other => Err(D::Error::custom(format!("unexpected flag value: {}", other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticker_parsing() {
        let json = r#"{
            "id": 121,
            "last": "38000.12",
            "lowestAsk": "38001.00",
            "highestBid": "37999.50",
            "percentChange": "0.0123",
            "baseVolume": "1500.5",
            "quoteVolume": "0.04",
            "isFrozen": "0",
            "high24hr": "39000",
            "low24hr": "37000"
        }"#;

        let ticker: Ticker = serde_json::from_str(json).unwrap();
        assert_eq!(ticker.id, 121);
        assert_eq!(ticker.last, 38000.12);
        assert!(!ticker.is_frozen);
        assert_eq!(ticker.high_24hr, Some(39000.0));
        assert!((ticker.spread() - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_trade_parsing_keeps_date_format() {
        let json = r#"{
            "globalTradeID": 394131412,
            "tradeID": 5455033,
            "date": "2021-01-03 00:00:00",
            "type": "sell",
            "rate": "0.03117266",
            "amount": "0.00000652",
            "total": "0.00000020",
            "orderNumber": "104768235081"
        }"#;

        let trade: Trade = serde_json::from_str(json).unwrap();
        assert_eq!(trade.side, TradeSide::Sell);
        assert_eq!(trade.epoch_secs(), 1_609_632_000);
        assert_eq!(trade.order_number, Some(104_768_235_081));

        let back = serde_json::to_value(&trade).unwrap();
        assert_eq!(back["date"], "2021-01-03 00:00:00");
    }

    #[test]
    fn test_trade_rejects_bad_date() {
        let json = r#"{"globalTradeID": 1, "tradeID": 1, "date": "yesterday",
                       "type": "buy", "rate": "1", "amount": "1", "total": "1"}"#;
        assert!(serde_json::from_str::<Trade>(json).is_err());
    }

    #[test]
    fn test_volume_entries() {
        let json = r#"{
            "BTC_ETH": {"BTC": "2.5", "ETH": "80.1"},
            "totalBTC": "120.7"
        }"#;
        let volume: Volume24h = serde_json::from_str(json).unwrap();
        assert_eq!(volume["BTC_ETH"].volume_of("ETH"), Some(80.1));
        assert_eq!(volume["totalBTC"].volume_of("anything"), Some(120.7));
        assert_eq!(volume["BTC_ETH"].volume_of("XMR"), None);
    }

    #[test]
    fn test_market_trade_parsing() {
        let json = r#"{
            "id": "194",
            "price": "1.9",
            "quantity": "110",
            "amount": "209.00",
            "takerSide": "SELL",
            "createTime": 1648635115525,
            "ts": 1648635115537
        }"#;
        let trade: MarketTrade = serde_json::from_str(json).unwrap();
        assert_eq!(trade.taker_side, TradeSide::Sell);
        assert_eq!(trade.quantity, 110.0);
    }

    #[test]
    fn test_flags() {
        let json = r#"{"id": 1, "name": "Bitcoin", "txFee": "0.0005", "minConf": 1,
                       "depositAddress": null, "disabled": 0, "delisted": 1, "frozen": "0"}"#;
        let currency: Currency = serde_json::from_str(json).unwrap();
        assert!(!currency.disabled);
        assert!(currency.delisted);
        assert!(!currency.frozen);
        assert_eq!(currency.tx_fee, 0.0005);
    }
}
