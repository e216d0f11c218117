use super::error::{EngineError, EngineResult};

pub const MAX_HORIZON_PERIODS: u32 = 1_200;
pub const MAX_PERIODIC_RATE: f64 = 1.0;

pub fn validate_amount(field: &'static str, value: f64) -> EngineResult<f64> {
    if !value.is_finite() {
        return Err(EngineError::amount(field, format!("must be finite, got {value}")));
    }
    if value < 0.0 {
        return Err(EngineError::amount(field, format!("must be >= 0, got {value}")));
    }
    Ok(value)
}

pub fn validate_target(field: &'static str, value: f64) -> EngineResult<f64> {
    let value = validate_amount(field, value)?;
    if value == 0.0 {
        return Err(EngineError::amount(field, "must be > 0"));
    }
    Ok(value)
}

pub fn validate_rate(field: &'static str, value: f64) -> EngineResult<f64> {
    if !value.is_finite() {
        return Err(EngineError::rate(field, format!("must be finite, got {value}")));
    }
    if !(0.0..=MAX_PERIODIC_RATE).contains(&value) {
        return Err(EngineError::rate(
            field,
            format!("must be between 0 and {MAX_PERIODIC_RATE}, got {value}"),
        ));
    }
    Ok(value)
}

pub fn validate_horizon(field: &'static str, periods: u32) -> EngineResult<u32> {
    if periods < 1 {
        return Err(EngineError::horizon(field, "must be >= 1"));
    }
    if periods > MAX_HORIZON_PERIODS {
        return Err(EngineError::horizon(
            field,
            format!("must be <= {MAX_HORIZON_PERIODS}, got {periods}"),
        ));
    }
    Ok(periods)
}

/// Converts a horizon that arrived as a JSON number into a period count.
pub fn horizon_from_number(field: &'static str, value: f64) -> EngineResult<u32> {
    if !value.is_finite() || value.fract() != 0.0 {
        return Err(EngineError::horizon(
            field,
            format!("must be a whole number of periods, got {value}"),
        ));
    }
    if value < 1.0 {
        return Err(EngineError::horizon(field, format!("must be >= 1, got {value}")));
    }
    if value > MAX_HORIZON_PERIODS as f64 {
        return Err(EngineError::horizon(
            field,
            format!("must be <= {MAX_HORIZON_PERIODS}, got {value}"),
        ));
    }
    Ok(value as u32)
}
