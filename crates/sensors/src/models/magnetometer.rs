//! Magnetometer model: a constant world field rotated into the body frame.

use contracts::{
    ContractError, GroundTruth, MagnetometerData, Result, SensorModel, SensorReading,
    SensorSetting, StateReporter, Vector3,
};

pub const SENSOR_TYPE: &str = "magnetometer";

const PARAMS: &[&str] = &["field_north", "field_east", "field_down", "covariance"];

pub fn build(setting: &SensorSetting) -> Result<Box<dyn SensorModel>> {
    let params = crate::ParamReader::new(setting, PARAMS)?;
    let field = Vector3::new(
        params.get("field_north", 0.21)? as f32,
        params.get("field_east", 0.0)? as f32,
        params.get("field_down", 0.43)? as f32,
    );
    if field.norm() == 0.0 {
        return Err(params.malformed("world magnetic field cannot be zero"));
    }

    Ok(Box::new(MagnetometerSensor {
        name: setting.name.clone(),
        field_world: field,
        covariance: params.non_negative("covariance", 0.0)? as f32,
        initial: None,
        output: None,
    }))
}

pub struct MagnetometerSensor {
    name: String,
    /// gauss, NED
    field_world: Vector3,
    covariance: f32,
    initial: Option<MagnetometerData>,
    output: Option<MagnetometerData>,
}

impl MagnetometerSensor {
    fn sample(&self, gt: &GroundTruth) -> Result<MagnetometerData> {
        let q = gt.kinematics.pose.orientation;
        let body = q.rotate_inverse(self.field_world);
        if !body.is_finite() {
            return Err(ContractError::sensor_fault(&self.name, "non-finite orientation"));
        }

        Ok(MagnetometerData {
            timestamp: gt.timestamp,
            magnetic_field_body: body,
            magnetic_field_covariance: self.covariance,
        })
    }
}

impl SensorModel for MagnetometerSensor {
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
            reporter.write_vector("field_body", &data.magnetic_field_body);
        }
        reporter.end_heading();
    }

    fn reset(&mut self) {
        self.output = self.initial.clone();
    }

    fn reading(&self) -> SensorReading {
        SensorReading::Magnetometer(self.output.clone().unwrap_or(MagnetometerData {
            timestamp: 0,
            magnetic_field_body: Vector3::ZERO,
            magnetic_field_covariance: self.covariance,
        }))
    }
}
