//! Generic Vehicle API shared by every vehicle type.

use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, OnceLock, RwLock};

use contracts::{
    ContractError, Environment, GeoPoint, GroundTruth, KinematicsState, Result, SensorReadings,
    StateReporter, VehicleSetting, VehicleType,
};
use sensors::{SensorCollection, SensorFactory, SensorStorage};
use tracing::{debug, info, instrument, warn};

use crate::api::{ArmState, VehicleApi};
use crate::control::{ControlLatch, ControlMode};
use crate::kind::{ArmingModel, VehicleKind};
use crate::state::{StateCell, VehicleState};
use crate::wire::{VehicleControls, VehicleStateSnapshot};
use crate::{lock, read, write};

/// Sensors and the inputs needed to rebuild or reset them.
///
/// Guarded by one mutex: the tick thread holds it for `update`, and
/// `initialize` / `reset` hold it while swapping or resetting sensors.
struct SensorSuite {
    storage: SensorStorage,
    collection: SensorCollection,
    factory: Option<Arc<dyn SensorFactory>>,
    environment: Environment,
    initial_kinematics: KinematicsState,
}

/// Vehicle API implementation parameterized by vehicle type
///
/// # Synchronization
///
/// - snapshot / readings: `ArcSwap` in [`StateCell`], lock-free reads
/// - command: `ArcSwap` in [`ControlLatch`], writers serialize on the mode mutex
/// - sensors: `Mutex<SensorSuite>`, taken by the tick thread
/// - `fence`: held exclusively by `initialize` / `reset`, shared by
///   `set_controls` / `update_state`
/// - `generation`: only written under the exclusive fence
pub struct VehicleApiBase<K: VehicleKind> {
    name: String,
    suite: Mutex<SensorSuite>,
    fence: RwLock<()>,
    generation: AtomicU64,
    latch: ControlLatch<K::Controls>,
    state: StateCell<K::State>,
    home: OnceLock<GeoPoint>,
    _kind: PhantomData<K>,
}

impl<K: VehicleKind> std::fmt::Debug for VehicleApiBase<K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VehicleApiBase")
            .field("name", &self.name)
            .field("vehicle_type", &K::VEHICLE_TYPE)
            .field("mode", &self.latch.mode())
            .finish()
    }
}

impl<K: VehicleKind> VehicleApiBase<K> {
    /// Construct and initialize from `setting`.
    pub fn new(
        setting: &VehicleSetting,
        factory: Arc<dyn SensorFactory>,
        kinematics: &KinematicsState,
        environment: &Environment,
    ) -> Result<Self> {
        let api = Self::uninitialized(&setting.name);
        api.initialize(setting, factory, kinematics, environment)?;
        Ok(api)
    }

    /// Vehicle with no sensors and a default snapshot at t = 0.
    pub fn uninitialized(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            suite: Mutex::new(SensorSuite {
                storage: SensorStorage::new(),
                collection: SensorCollection::new(&name),
                factory: None,
                environment: Environment::default(),
                initial_kinematics: KinematicsState::default(),
            }),
            fence: RwLock::new(()),
            generation: AtomicU64::new(0),
            latch: ControlLatch::default(),
            state: StateCell::new(K::initial_state(
                &KinematicsState::default(),
                GeoPoint::default(),
                0,
            )),
            home: OnceLock::new(),
            name,
            _kind: PhantomData,
        }
    }

    /// Rebuild the sensors with the factory and inputs of the last
    /// successful `initialize`.
    pub fn reinitialize(&self, setting: &VehicleSetting) -> Result<()> {
        let (factory, kinematics, environment) = {
            let suite = lock(&self.suite);
            let factory = suite.factory.clone().ok_or_else(|| {
                ContractError::Other(format!("vehicle '{}' was never initialized", self.name))
            })?;
            (factory, suite.initial_kinematics, suite.environment)
        };
        self.initialize(setting, factory, &kinematics, &environment)
    }

    /// Control mode (API control, armed flag, policy)
    pub fn control_mode(&self) -> ControlMode {
        self.latch.mode()
    }

    /// Latest command, typed
    pub fn controls(&self) -> Arc<K::Controls> {
        self.latch.load()
    }

    /// Latest snapshot, typed
    pub fn state(&self) -> Arc<K::State> {
        self.state.load()
    }

    fn home(&self) -> GeoPoint {
        self.home.get().copied().unwrap_or_default()
    }

    fn unwrap_state(&self, state: VehicleStateSnapshot) -> Result<K::State> {
        let actual = state.vehicle_type();
        K::unwrap_state(state).ok_or_else(|| {
            ContractError::type_mismatch(&self.name, K::VEHICLE_TYPE.as_str(), actual.as_str())
        })
    }

    /// Caller holds the shared fence.
    fn publish_monotonic(&self, state: K::State) -> Result<()> {
        let latest = self.state.load().timestamp();
        if state.timestamp() < latest {
            return Err(ContractError::StaleSnapshot {
                vehicle: self.name.clone(),
                timestamp: state.timestamp(),
                latest,
            });
        }
        self.state.publish(state);
        Ok(())
    }

    /// Caller holds the exclusive fence.
    fn bump_generation(&self) {
        self.generation.fetch_add(1, Ordering::Release);
    }

    fn publish_readings(&self, suite: &SensorSuite, timestamp: u64) {
        self.state
            .publish_readings(suite.collection.readings(&suite.storage, timestamp));
    }
}

impl<K: VehicleKind> VehicleApi for VehicleApiBase<K> {
    fn name(&self) -> &str {
        &self.name
    }

    fn vehicle_type(&self) -> VehicleType {
        K::VEHICLE_TYPE
    }

    #[instrument(
        name = "vehicle_initialize",
        skip_all,
        fields(
            vehicle = %self.name,
            vehicle_type = %K::VEHICLE_TYPE,
            sensors = setting.sensors.len()
        )
    )]
    fn initialize(
        &self,
        setting: &VehicleSetting,
        factory: Arc<dyn SensorFactory>,
        kinematics: &KinematicsState,
        environment: &Environment,
    ) -> Result<()> {
        if setting.vehicle_type != K::VEHICLE_TYPE {
            return Err(ContractError::type_mismatch(
                &self.name,
                K::VEHICLE_TYPE.as_str(),
                setting.vehicle_type.as_str(),
            ));
        }

        let _fence = write(&self.fence);

        // 先构建到新的 storage，成功后再替换；失败时保留旧传感器
        let mut storage = SensorStorage::new();
        let mut collection = SensorCollection::new(&self.name);
        factory.create_sensors_from_settings(&setting.sensors, &mut collection, &mut storage)?;

        let home = *self
            .home
            .get_or_init(|| setting.home_geo_point.unwrap_or(environment.geo_point));

        let mut env = *environment;
        env.set_position(home, kinematics.pose.position);

        let timestamp = self.state.load().timestamp();
        let ground_truth = GroundTruth {
            kinematics: *kinematics,
            environment: env,
            timestamp,
        };
        let faults = collection.initialize(&mut storage, &ground_truth);

        let mut suite = lock(&self.suite);
        suite.storage = storage;
        suite.collection = collection;
        suite.factory = Some(factory);
        suite.environment = *environment;
        suite.initial_kinematics = *kinematics;

        self.latch.set_policy(setting.control_policy);
        self.state
            .publish(K::initial_state(kinematics, home, timestamp));
        self.publish_readings(&suite, timestamp);
        self.bump_generation();

        info!(
            sensors = suite.collection.len(),
            faults,
            policy = ?setting.control_policy,
            "vehicle initialized"
        );
        Ok(())
    }

    fn update(&self) {
        let snapshot = self.state.load();
        let kinematics = *snapshot.kinematics();
        let timestamp = snapshot.timestamp();
        let home = self.home();

        let mut suite = lock(&self.suite);
        let mut environment = suite.environment;
        environment.set_position(home, kinematics.pose.position);

        let ground_truth = GroundTruth {
            kinematics,
            environment,
            timestamp,
        };
        let SensorSuite {
            storage,
            collection,
            ..
        } = &mut *suite;
        collection.update(storage, &ground_truth);
        self.publish_readings(&suite, timestamp);
    }

    fn report_state(&self, reporter: &mut StateReporter) {
        let suite = lock(&self.suite);
        reporter.start_heading(&self.name);
        reporter.write_value("vehicle_type", K::VEHICLE_TYPE);
        reporter.write_value("api_control", self.latch.is_enabled());
        suite.collection.report_state(&suite.storage, reporter);
        reporter.end_heading();
    }

    fn enable_api_control(&self, enabled: bool) {
        if self.latch.enable(enabled) {
            info!(vehicle = %self.name, enabled, "api control changed, command reset");
        } else {
            debug!(vehicle = %self.name, enabled, "api control unchanged");
        }
    }

    fn is_api_control_enabled(&self) -> bool {
        self.latch.is_enabled()
    }

    fn arm_disarm(&self, arm: bool) -> bool {
        match K::ARMING {
            ArmingModel::NotModeled => {
                debug!(vehicle = %self.name, arm, "arming not modeled, reporting success");
            }
            ArmingModel::Latched => {
                self.latch.set_armed(arm);
                info!(vehicle = %self.name, armed = arm, "arm state changed");
            }
        }
        true
    }

    fn arm_state(&self) -> ArmState {
        match K::ARMING {
            ArmingModel::NotModeled => ArmState::NotModeled,
            ArmingModel::Latched if self.latch.is_armed() => ArmState::Armed,
            ArmingModel::Latched => ArmState::Disarmed,
        }
    }

    fn get_home_geo_point(&self) -> GeoPoint {
        self.home()
    }

    fn set_controls(&self, controls: VehicleControls) -> Result<()> {
        let actual = controls.vehicle_type();
        let controls = K::unwrap_controls(controls).ok_or_else(|| {
            ContractError::type_mismatch(&self.name, K::VEHICLE_TYPE.as_str(), actual.as_str())
        })?;

        let _fence = read(&self.fence);
        match self.latch.set(&controls) {
            Ok(admitted) => {
                if admitted != controls {
                    debug!(
                        vehicle = %self.name,
                        requested = ?controls,
                        stored = ?admitted,
                        "controls clamped"
                    );
                }
                Ok(())
            }
            Err(e) => {
                warn!(vehicle = %self.name, error = %e, "controls rejected");
                Err(e)
            }
        }
    }

    fn get_controls(&self) -> VehicleControls {
        K::wrap_controls((*self.latch.load()).clone())
    }

    fn update_state(&self, state: VehicleStateSnapshot) -> Result<()> {
        let state = self.unwrap_state(state)?;
        let _fence = read(&self.fence);
        self.publish_monotonic(state)
    }

    fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    fn update_state_since(&self, generation: u64, state: VehicleStateSnapshot) -> Result<bool> {
        let state = self.unwrap_state(state)?;
        let _fence = read(&self.fence);
        let current = self.generation();
        if current != generation {
            debug!(
                vehicle = %self.name,
                expected = generation,
                current,
                "snapshot computed before reset, dropped"
            );
            return Ok(false);
        }
        self.publish_monotonic(state).map(|()| true)
    }

    fn get_state(&self) -> VehicleStateSnapshot {
        K::wrap_state((*self.state.load()).clone())
    }

    fn sensor_readings(&self) -> Arc<SensorReadings> {
        self.state.readings()
    }

    fn sensor_names(&self) -> Vec<String> {
        self.state
            .readings()
            .entries
            .iter()
            .map(|e| e.sensor.clone())
            .collect()
    }

    fn reset(&self) {
        let _fence = write(&self.fence);
        let mut suite = lock(&self.suite);

        let SensorSuite {
            storage,
            collection,
            ..
        } = &mut *suite;
        collection.reset(storage);

        let disarm = K::ARMING == ArmingModel::Latched;
        if K::RESET_CLEARS_CONTROLS {
            self.latch.clear(disarm);
        } else if disarm {
            self.latch.set_armed(false);
        }

        // 重新发布初始化后的快照，时间戳沿用最新值保持单调
        let timestamp = self.state.load().timestamp();
        self.state.publish(K::initial_state(
            &suite.initial_kinematics,
            self.home(),
            timestamp,
        ));
        self.publish_readings(&suite, timestamp);
        self.bump_generation();

        info!(vehicle = %self.name, sensors = suite.collection.len(), "vehicle reset");
    }
}
