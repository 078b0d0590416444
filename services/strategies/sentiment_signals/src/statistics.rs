//! Numeric helpers shared by the correlation and divergence components
//!
//! Every degenerate input has a defined result: empty or zero-variance series
//! give 0 rather than NaN.

use statrs::distribution::{ContinuousCDF, Normal};

/// Arithmetic mean; 0 for an empty slice
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation; 0 for fewer than two values
pub fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Pearson correlation coefficient, clamped to `[-1, 1]`
///
/// Returns 0 when the lengths differ, fewer than two pairs exist, or either
/// series has zero variance.
pub fn pearson(x: &[f64], y: &[f64]) -> f64 {
    if x.len() != y.len() || x.len() < 2 {
        return 0.0;
    }

    let mean_x = mean(x);
    let mean_y = mean(y);

    let mut covariance = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (xi, yi) in x.iter().zip(y.iter()) {
        let dx = xi - mean_x;
        let dy = yi - mean_y;
        covariance += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    let denominator = (var_x * var_y).sqrt();
    if denominator == 0.0 || !denominator.is_finite() {
        return 0.0;
    }

    (covariance / denominator).clamp(-1.0, 1.0)
}

/// Two-sided p-value of a correlation coefficient over `n` pairs
///
/// Uses `t = r·sqrt((n-2)/(1-r²))` and approximates the t-distribution with
/// the standard normal. Fewer than three pairs give 1.
pub fn correlation_p_value(coefficient: f64, n: usize) -> f64 {
    if n < 3 {
        return 1.0;
    }
    let r_squared = coefficient * coefficient;
    if r_squared >= 1.0 {
        return 0.0;
    }

    let t = coefficient * ((n as f64 - 2.0) / (1.0 - r_squared)).sqrt();
    let standard = match Normal::new(0.0, 1.0) {
        Ok(normal) => normal,
        Err(_) => return 1.0,
    };
    let p = 2.0 * (1.0 - standard.cdf(t.abs()));
    p.clamp(0.0, 1.0)
}

/// Least-squares slope of `values` against their index
pub fn regression_slope(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }

    let mean_x = (n as f64 - 1.0) / 2.0;
    let mean_y = mean(values);

    let mut numerator = 0.0;
    let mut denominator = 0.0;
    for (i, y) in values.iter().enumerate() {
        let dx = i as f64 - mean_x;
        numerator += dx * (y - mean_y);
        denominator += dx * dx;
    }

    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

/// Step-over-step percentage returns; the first element is 0
///
/// A non-positive previous price yields a 0 return for that step.
pub fn percent_returns(prices: &[f64]) -> Vec<f64> {
    let mut returns = Vec::with_capacity(prices.len());
    for (i, price) in prices.iter().enumerate() {
        if i == 0 {
            returns.push(0.0);
            continue;
        }
        let previous = prices[i - 1];
        if previous > 0.0 {
            returns.push((price - previous) / previous * 100.0);
        } else {
            returns.push(0.0);
        }
    }
    returns
}
