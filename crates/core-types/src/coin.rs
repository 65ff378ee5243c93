use serde::{Deserialize, Serialize};

/// Live market snapshot of a coin.
///
/// Every figure is optional: the data collaborator omits fields for thinly
/// traded coins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoinInfo {
    pub id: String,
    pub symbol: String,
    pub name: String,
    /// Quote currency of `current_price` and `market_cap`.
    pub vs_currency: String,
    pub current_price: Option<f64>,
    pub market_cap: Option<f64>,
    /// Price change over the last 24 hours, in percent (2.5 = 2.5%).
    pub change_24h: Option<f64>,
    pub change_7d: Option<f64>,
    pub change_30d: Option<f64>,
}
