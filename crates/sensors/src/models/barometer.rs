//! Barometer model: pressure altitude from the environment.

use contracts::{
    BarometerData, ContractError, GroundTruth, Result, SensorModel, SensorReading,
    SensorSetting, StateReporter,
};

pub const SENSOR_TYPE: &str = "barometer";

const PARAMS: &[&str] = &["qnh"];

pub fn build(setting: &SensorSetting) -> Result<Box<dyn SensorModel>> {
    let params = crate::ParamReader::new(setting, PARAMS)?;
    Ok(Box::new(BarometerSensor {
        name: setting.name.clone(),
        qnh: params.positive("qnh", 1013.25)? as f32,
        initial: None,
        output: None,
    }))
}

pub struct BarometerSensor {
    name: String,
    /// hPa
    qnh: f32,
    initial: Option<BarometerData>,
    output: Option<BarometerData>,
}

impl BarometerSensor {
    fn sample(&self, gt: &GroundTruth) -> Result<BarometerData> {
        let pressure = gt.environment.air_pressure;
        if !pressure.is_finite() || pressure <= 0.0 {
            return Err(ContractError::sensor_fault(
                &self.name,
                format!("invalid air pressure {pressure}"),
            ));
        }

        Ok(BarometerData {
            timestamp: gt.timestamp,
            altitude: pressure_altitude(pressure, self.qnh),
            pressure,
            qnh: self.qnh,
        })
    }
}

/// Altitude (m) for `pressure_pa` against the reference `qnh_hpa`.
fn pressure_altitude(pressure_pa: f32, qnh_hpa: f32) -> f32 {
    44_330.77 * (1.0 - (pressure_pa / (qnh_hpa * 100.0)).powf(0.190_263))
}

impl SensorModel for BarometerSensor {
    fn name(&self) -> &str {
        &self.name
    }

    fn sensor_type(&self) -> &str {
        SENSOR_TYPE
    }

    fn initialize(&mut self, ground_truth: &GroundTruth) -> Result<()> {
        let data = self.sample(ground_truth)?;
        self.initial = Some(data.clone());
        self.output = Some(data);
        Ok(())
    }

    fn update(&mut self, ground_truth: &GroundTruth) -> Result<()> {
        self.output = Some(self.sample(ground_truth)?);
        Ok(())
    }

    fn report_state(&self, reporter: &mut StateReporter) {
        reporter.start_heading(&self.name);
        if let Some(data) = &self.output {
            reporter.write_float("altitude", f64::from(data.altitude));
            reporter.write_float("pressure", f64::from(data.pressure));
        }
        reporter.end_heading();
    }

    fn reset(&mut self) {
        self.output = self.initial.clone();
    }

    fn reading(&self) -> SensorReading {
        SensorReading::Barometer(self.output.clone().unwrap_or(BarometerData {
            timestamp: 0,
            altitude: 0.0,
            pressure: 0.0,
            qnh: self.qnh,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{Environment, GeoPoint, Vector3};

    #[test]
    fn test_sea_level_reads_zero() {
        assert!(pressure_altitude(101_325.0, 1013.25).abs() < 0.1);
    }

    #[test]
    fn test_barometer_follows_altitude() {
        let home = GeoPoint::new(0.0, 0.0, 0.0);
        let mut gt = GroundTruth {
            environment: Environment::standard(home),
            ..Default::default()
        };
        let mut sensor = build(&SensorSetting::new("baro", "barometer")).unwrap();
        sensor.initialize(&gt).unwrap();

        gt.environment.set_position(home, Vector3::new(0.0, 0.0, -500.0));
        sensor.update(&gt).unwrap();

        let SensorReading::Barometer(data) = sensor.reading() else {
            panic!("expected barometer reading");
        };
        assert!((data.altitude - 500.0).abs() < 5.0, "altitude {}", data.altitude);
    }

    #[test]
    fn test_zero_qnh_is_malformed() {
        let setting = SensorSetting::new("baro", "barometer").with_param("qnh", 0.0);
        assert!(build(&setting).is_err());
    }
}
