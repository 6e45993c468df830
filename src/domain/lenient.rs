// Serde helpers for the monitoring API, which sends most numbers as strings
use serde::de::Error;
use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum Numeric {
    Number(f64),
    Text(String),
}

fn parse_text<E: Error>(text: &str) -> Result<f64, E> {
    text.trim()
        .parse::<f64>()
        .map_err(|e| E::custom(format!("invalid number {:?}: {}", text, e)))
}

/// Accept `31`, `31.0` or `"31"` as an integer code
pub fn integer<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = match Numeric::deserialize(deserializer)? {
        Numeric::Number(n) => n,
        Numeric::Text(s) => parse_text(&s)?,
    };

    if !value.is_finite() || value.fract() != 0.0 {
        return Err(D::Error::custom(format!("expected an integer, got {}", value)));
    }
    // i64::MAX as f64 rounds up to 2^63, which is already out of range
    if value < i64::MIN as f64 || value >= i64::MAX as f64 {
        return Err(D::Error::custom(format!("integer {} is out of range", value)));
    }
    Ok(value as i64)
}

/// Accept a number, a numeric string, `null` or an empty string
pub fn optional_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Numeric>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Numeric::Number(n)) => Ok(Some(n)),
        Some(Numeric::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(Numeric::Text(s)) => parse_text(&s).map(Some),
    }
}
