//! IMU model: body-frame angular rate and specific force.

use contracts::{
    ContractError, GroundTruth, ImuData, Result, SensorModel, SensorReading, SensorSetting,
    StateReporter, Vector3,
};

pub const SENSOR_TYPE: &str = "imu";

const PARAMS: &[&str] = &["gyro_bias", "accel_bias"];

pub fn build(setting: &SensorSetting) -> Result<Box<dyn SensorModel>> {
    let params = crate::ParamReader::new(setting, PARAMS)?;
    Ok(Box::new(ImuSensor {
        name: setting.name.clone(),
        gyro_bias: params.get("gyro_bias", 0.0)? as f32,
        accel_bias: params.get("accel_bias", 0.0)? as f32,
        initial: None,
        output: None,
    }))
}

pub struct ImuSensor {
    name: String,
    /// Added to every gyro axis (rad/s)
    gyro_bias: f32,
    /// Added to every accelerometer axis (m/s^2)
    accel_bias: f32,
    initial: Option<ImuData>,
    output: Option<ImuData>,
}

impl ImuSensor {
    fn sample(&self, gt: &GroundTruth) -> Result<ImuData> {
        let kin = &gt.kinematics;
        if !kin.angular_velocity.is_finite() || !kin.linear_acceleration.is_finite() {
            return Err(ContractError::sensor_fault(&self.name, "non-finite ground truth"));
        }

        let orientation = kin.pose.orientation;
        let gyro_bias = Vector3::new(self.gyro_bias, self.gyro_bias, self.gyro_bias);
        let accel_bias = Vector3::new(self.accel_bias, self.accel_bias, self.accel_bias);

        // accelerometers measure a - g
        let specific_force = kin.linear_acceleration - gt.environment.gravity;

        Ok(ImuData {
            timestamp: gt.timestamp,
            orientation,
            angular_velocity: orientation.rotate_inverse(kin.angular_velocity) + gyro_bias,
            linear_acceleration: orientation.rotate_inverse(specific_force) + accel_bias,
        })
    }
}

impl SensorModel for ImuSensor {
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
            reporter.write_vector("angular_velocity", &data.angular_velocity);
            reporter.write_vector("linear_acceleration", &data.linear_acceleration);
        }
        reporter.end_heading();
    }

    fn reset(&mut self) {
        self.output = self.initial.clone();
    }

    fn reading(&self) -> SensorReading {
        SensorReading::Imu(self.output.clone().unwrap_or(ImuData {
            timestamp: 0,
            orientation: Default::default(),
            angular_velocity: Vector3::ZERO,
            linear_acceleration: Vector3::ZERO,
        }))
    }
}
