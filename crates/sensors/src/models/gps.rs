//! GPS model: geo point and NED velocity straight from ground truth.

use contracts::{
    ContractError, GnssFixType, GpsData, GroundTruth, Result, SensorModel, SensorReading,
    SensorSetting, StateReporter,
};

pub const SENSOR_TYPE: &str = "gps";

const PARAMS: &[&str] = &["eph", "epv"];

pub fn build(setting: &SensorSetting) -> Result<Box<dyn SensorModel>> {
    let params = crate::ParamReader::new(setting, PARAMS)?;
    Ok(Box::new(GpsSensor {
        name: setting.name.clone(),
        eph: params.non_negative("eph", 0.3)? as f32,
        epv: params.non_negative("epv", 0.4)? as f32,
        initial: None,
        output: None,
    }))
}

pub struct GpsSensor {
    name: String,
    eph: f32,
    epv: f32,
    initial: Option<GpsData>,
    output: Option<GpsData>,
}

impl GpsSensor {
    fn sample(&self, gt: &GroundTruth) -> Result<GpsData> {
        let velocity = gt.kinematics.linear_velocity;
        let geo = gt.environment.geo_point;
        if !velocity.is_finite() || !geo.latitude.is_finite() || !geo.longitude.is_finite() {
            return Err(ContractError::sensor_fault(&self.name, "non-finite ground truth"));
        }

        Ok(GpsData {
            timestamp: gt.timestamp,
            geo_point: geo,
            eph: self.eph,
            epv: self.epv,
            velocity,
            fix_type: GnssFixType::Fix3d,
            is_valid: true,
        })
    }
}

impl SensorModel for GpsSensor {
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
        match &self.output {
            Some(data) => {
                reporter.write_float("latitude", data.geo_point.latitude);
                reporter.write_float("longitude", data.geo_point.longitude);
                reporter.write_float("altitude", f64::from(data.geo_point.altitude));
                reporter.write_vector("velocity", &data.velocity);
            }
            None => reporter.write_value("fix", "none"),
        }
        reporter.end_heading();
    }

    fn reset(&mut self) {
        self.output = self.initial.clone();
    }

    fn reading(&self) -> SensorReading {
        SensorReading::Gps(self.output.clone().unwrap_or_else(|| GpsData {
            timestamp: 0,
            geo_point: Default::default(),
            eph: self.eph,
            epv: self.epv,
            velocity: Default::default(),
            fix_type: GnssFixType::NoFix,
            is_valid: false,
        }))
    }
}
