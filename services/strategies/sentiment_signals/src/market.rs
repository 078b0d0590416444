//! Price-series helpers feeding the composer and the signal generator

use sentiment_types::PriceDataPoint;

use crate::statistics::{percent_returns, std_dev};

/// Percent change from the first to the last close; 0 when undefined
pub fn price_change_pct(prices: &[PriceDataPoint]) -> f64 {
    match (prices.first(), prices.last()) {
        (Some(first), Some(last)) if prices.len() >= 2 && first.close > 0.0 => {
            (last.close - first.close) / first.close * 100.0
        }
        _ => 0.0,
    }
}

/// Standard deviation of step returns as a fraction, clamped to `[0, 1]`
pub fn price_volatility(prices: &[PriceDataPoint]) -> f64 {
    if prices.len() < 3 {
        return 0.0;
    }
    let closes: Vec<f64> = prices.iter().map(|p| p.close).collect();
    // Skip the leading 0 so it does not dampen the deviation
    let returns: Vec<f64> = percent_returns(&closes)
        .into_iter()
        .skip(1)
        .map(|r| r / 100.0)
        .collect();
    std_dev(&returns).clamp(0.0, 1.0)
}

/// Price change clamped to `[-100, 100]`
pub fn price_momentum(prices: &[PriceDataPoint]) -> f64 {
    price_change_pct(prices).clamp(-100.0, 100.0)
}
