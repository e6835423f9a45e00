//! SensorFactory 核心实现
//!
//! 从 SensorSetting 列表构建传感器，写入 storage 与 collection。

use std::collections::HashMap;
use std::sync::Arc;

use contracts::{ContractError, Result, SensorModel, SensorSetting};
use tracing::{debug, info, instrument, warn};

use crate::collection::SensorCollection;
use crate::models;
use crate::storage::SensorStorage;

/// 单个传感器类型的构造函数
pub type SensorConstructor =
    Arc<dyn Fn(&SensorSetting) -> Result<Box<dyn SensorModel>> + Send + Sync>;

/// Sensor factory trait
///
/// The single extension point for new sensor kinds. A vehicle keeps its
/// factory so it can rebuild its sensors on re-initialization.
pub trait SensorFactory: Send + Sync {
    /// Build every enabled setting into `storage`, appending handles to `collection`.
    ///
    /// # 原子性保证
    /// 任何一个传感器构建失败时，不向 collection / storage 追加任何内容。
    fn create_sensors_from_settings(
        &self,
        settings: &[SensorSetting],
        collection: &mut SensorCollection,
        storage: &mut SensorStorage,
    ) -> Result<()>;
}

/// 默认传感器工厂
///
/// 持有 sensor_type → 构造函数 的映射表，内置 gps / imu / barometer /
/// magnetometer / distance。
#[derive(Clone)]
pub struct DefaultSensorFactory {
    constructors: HashMap<String, SensorConstructor>,
}

impl std::fmt::Debug for DefaultSensorFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut kinds: Vec<_> = self.constructors.keys().collect();
        kinds.sort();
        f.debug_struct("DefaultSensorFactory")
            .field("kinds", &kinds)
            .finish()
    }
}

impl Default for DefaultSensorFactory {
    fn default() -> Self {
        Self::with_builtin()
    }
}

impl DefaultSensorFactory {
    /// 创建空工厂 (无任何类型)
    pub fn empty() -> Self {
        Self {
            constructors: HashMap::new(),
        }
    }

    /// 创建包含内置类型的工厂
    pub fn with_builtin() -> Self {
        let mut factory = Self::empty();
        factory.register(models::gps::SENSOR_TYPE, Arc::new(models::gps::build));
        factory.register(models::imu::SENSOR_TYPE, Arc::new(models::imu::build));
        factory.register(
            models::barometer::SENSOR_TYPE,
            Arc::new(models::barometer::build),
        );
        factory.register(
            models::magnetometer::SENSOR_TYPE,
            Arc::new(models::magnetometer::build),
        );
        factory.register(
            models::distance::SENSOR_TYPE,
            Arc::new(models::distance::build),
        );
        factory
    }

    /// 注册 (或替换) 一个传感器类型
    pub fn register(&mut self, sensor_type: impl Into<String>, constructor: SensorConstructor) {
        let sensor_type = sensor_type.into();
        if self
            .constructors
            .insert(sensor_type.clone(), constructor)
            .is_some()
        {
            debug!(sensor_type = %sensor_type, "sensor constructor replaced");
        }
    }

    /// 已注册的类型 (排序)
    pub fn sensor_types(&self) -> Vec<&str> {
        let mut kinds: Vec<_> = self.constructors.keys().map(String::as_str).collect();
        kinds.sort_unstable();
        kinds
    }

    pub fn supports(&self, sensor_type: &str) -> bool {
        self.constructors.contains_key(sensor_type)
    }

    #[instrument(
        name = "sensor_factory_build_sensor",
        skip(self, setting),
        fields(sensor = %setting.name, sensor_type = %setting.sensor_type)
    )]
    fn build_sensor(&self, setting: &SensorSetting) -> Result<Box<dyn SensorModel>> {
        let constructor = self.constructors.get(&setting.sensor_type).ok_or_else(|| {
            ContractError::unknown_sensor_type(&setting.name, &setting.sensor_type)
        })?;
        constructor(setting)
    }
}

impl SensorFactory for DefaultSensorFactory {
    #[instrument(
        name = "sensor_factory_create_sensors",
        skip(self, settings, collection, storage),
        fields(vehicle = %collection.vehicle(), setting_count = settings.len())
    )]
    fn create_sensors_from_settings(
        &self,
        settings: &[SensorSetting],
        collection: &mut SensorCollection,
        storage: &mut SensorStorage,
    ) -> Result<()> {
        // 先全部构建，成功后再提交
        let mut built = Vec::with_capacity(settings.len());

        for setting in settings {
            if !setting.enabled {
                debug!(sensor = %setting.name, "sensor disabled, skipping");
                continue;
            }

            match self.build_sensor(setting) {
                Ok(sensor) => built.push(sensor),
                Err(e) => {
                    warn!(
                        sensor = %setting.name,
                        sensor_type = %setting.sensor_type,
                        error = %e,
                        "sensor build failed, discarding {} built sensors",
                        built.len()
                    );
                    return Err(e);
                }
            }
        }

        let count = built.len();
        for sensor in built {
            collection.insert(storage.push(sensor));
        }

        info!(sensors = count, "sensors created from settings");
        Ok(())
    }
}
