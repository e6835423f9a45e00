//! Typed access to a sensor setting's numeric params.

use contracts::{ContractError, Result, SensorSetting};

/// Reads params of one setting, rejecting keys the sensor kind does not know.
pub struct ParamReader<'a> {
    setting: &'a SensorSetting,
}

impl<'a> ParamReader<'a> {
    /// Fails with a malformed-setting error if `setting` carries a key not in `known`.
    pub fn new(setting: &'a SensorSetting, known: &[&str]) -> Result<Self> {
        if let Some(key) = setting.params.keys().find(|k| !known.contains(&k.as_str())) {
            return Err(ContractError::malformed_sensor(
                &setting.name,
                format!(
                    "unknown param '{key}' for sensor type '{}' (expected one of: {})",
                    setting.sensor_type,
                    known.join(", ")
                ),
            ));
        }
        Ok(Self { setting })
    }

    pub fn get(&self, key: &str, default: f64) -> Result<f64> {
        let value = self.setting.params.get(key).copied().unwrap_or(default);
        if !value.is_finite() {
            return Err(self.malformed(format!("param '{key}' must be finite")));
        }
        Ok(value)
    }

    pub fn non_negative(&self, key: &str, default: f64) -> Result<f64> {
        let value = self.get(key, default)?;
        if value < 0.0 {
            return Err(self.malformed(format!("param '{key}' must be >= 0, got {value}")));
        }
        Ok(value)
    }

    pub fn positive(&self, key: &str, default: f64) -> Result<f64> {
        let value = self.get(key, default)?;
        if value <= 0.0 {
            return Err(self.malformed(format!("param '{key}' must be > 0, got {value}")));
        }
        Ok(value)
    }

    pub fn malformed(&self, message: impl Into<String>) -> ContractError {
        ContractError::malformed_sensor(&self.setting.name, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_key_rejected() {
        let setting = SensorSetting::new("gps", "gps").with_param("ephh", 1.0);
        let err = ParamReader::new(&setting, &["eph", "epv"]).err().unwrap();
        assert!(matches!(err, ContractError::MalformedSensor { .. }));
        assert!(err.to_string().contains("ephh"));
    }

    #[test]
    fn test_defaults_and_ranges() {
        let setting = SensorSetting::new("range", "distance")
            .with_param("min_distance", -1.0)
            .with_param("max_distance", 10.0);
        let params = ParamReader::new(&setting, &["min_distance", "max_distance"]).unwrap();

        assert_eq!(params.positive("max_distance", 40.0).unwrap(), 10.0);
        assert!(params.non_negative("min_distance", 0.2).is_err());
        assert_eq!(params.get("absent", 3.0).unwrap(), 3.0);
    }
}
