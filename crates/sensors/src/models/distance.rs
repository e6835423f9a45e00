//! Downward range finder over a flat ground plane at z = 0 (NED).

use contracts::{
    ContractError, DistanceData, GroundTruth, Pose, Result, SensorModel, SensorReading,
    SensorSetting, StateReporter,
};

pub const SENSOR_TYPE: &str = "distance";

const PARAMS: &[&str] = &["min_distance", "max_distance"];

pub fn build(setting: &SensorSetting) -> Result<Box<dyn SensorModel>> {
    let params = crate::ParamReader::new(setting, PARAMS)?;
    let min_distance = params.non_negative("min_distance", 0.2)? as f32;
    let max_distance = params.positive("max_distance", 40.0)? as f32;
    if min_distance >= max_distance {
        return Err(params.malformed(format!(
            "min_distance ({min_distance}) must be < max_distance ({max_distance})"
        )));
    }

    Ok(Box::new(DistanceSensor {
        name: setting.name.clone(),
        min_distance,
        max_distance,
        initial: None,
        output: None,
    }))
}

pub struct DistanceSensor {
    name: String,
    min_distance: f32,
    max_distance: f32,
    initial: Option<DistanceData>,
    output: Option<DistanceData>,
}

impl DistanceSensor {
    fn sample(&self, gt: &GroundTruth) -> Result<DistanceData> {
        let height = -gt.kinematics.pose.position.z;
        if !height.is_finite() {
            return Err(ContractError::sensor_fault(&self.name, "non-finite position"));
        }

        Ok(DistanceData {
            timestamp: gt.timestamp,
            distance: height.clamp(self.min_distance, self.max_distance),
            min_distance: self.min_distance,
            max_distance: self.max_distance,
            relative_pose: Pose::default(),
        })
    }
}

impl SensorModel for DistanceSensor {
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
            reporter.write_float("distance", f64::from(data.distance));
        }
        reporter.end_heading();
    }

    fn reset(&mut self) {
        self.output = self.initial.clone();
    }

    fn reading(&self) -> SensorReading {
        SensorReading::Distance(self.output.clone().unwrap_or(DistanceData {
            timestamp: 0,
            distance: self.max_distance,
            min_distance: self.min_distance,
            max_distance: self.max_distance,
            relative_pose: Pose::default(),
        }))
    }
}
