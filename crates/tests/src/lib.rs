//! # Integration Tests
//!
//! 集成测试与端到端测试。
//!
//! 负责：
//! - 配置到车辆注册表的完整构建
//! - 并发读写下快照不撕裂
//! - 传感器故障隔离、reset 与重复 initialize
//! - TCP 端到端：每个 RPC 操作走一遍

#[cfg(test)]
mod support {
    use std::sync::Arc;

    use contracts::{SimulationSettings, VehicleSetting};
    use sensors::{DefaultSensorFactory, MockCounters, MockSensor, SensorFactory};
    use vehicle_api::ApiProvider;

    /// Built-in sensor types plus `mock`, sharing one set of counters.
    pub fn mock_factory() -> (Arc<dyn SensorFactory>, Arc<MockCounters>) {
        let counters = Arc::new(MockCounters::default());
        let mut factory = DefaultSensorFactory::with_builtin();
        factory.register("mock", MockSensor::constructor(counters.clone()));
        (Arc::new(factory), counters)
    }

    pub fn provider(vehicles: Vec<VehicleSetting>) -> Arc<ApiProvider> {
        let settings = SimulationSettings {
            vehicles,
            ..SimulationSettings::default()
        };
        let (factory, _) = mock_factory();
        let (provider, failures) = ApiProvider::from_settings(&settings, factory);
        assert!(failures.is_empty(), "unexpected build failures: {failures:?}");
        Arc::new(provider)
    }
}

#[cfg(test)]
mod config_tests {
    use std::sync::Arc;

    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::{ControlPolicy, VehicleType};
    use sensors::DefaultSensorFactory;
    use vehicle_api::{ApiProvider, CarControls, VehicleControls};

    const FLEET: &str = r#"
[server]
host = "127.0.0.1"
port = 41451

[clock]
tick_rate_hz = 50.0

[[vehicles]]
name = "drone1"
vehicle_type = "multirotor"
control_policy = "reject"

[[vehicles.sensors]]
name = "gps"
sensor_type = "gps"

[[vehicles.sensors]]
name = "imu"
sensor_type = "imu"

[[vehicles]]
name = "car1"
vehicle_type = "car"

[[vehicles.sensors]]
name = "front"
sensor_type = "distance"
params = { max_distance = 20.0 }
"#;

    #[test]
    fn test_config_to_registry() {
        let settings = ConfigLoader::load_from_str(FLEET, ConfigFormat::Toml).unwrap();
        assert_eq!(settings.vehicles[0].control_policy, ControlPolicy::Reject);

        let (provider, failures) =
            ApiProvider::from_settings(&settings, Arc::new(DefaultSensorFactory::with_builtin()));
        assert!(failures.is_empty());
        assert_eq!(provider.names(), vec!["drone1".to_string(), "car1".to_string()]);

        // empty name resolves to the first configured vehicle
        let default = provider.get("").unwrap();
        assert_eq!(default.name(), "drone1");
        assert_eq!(default.vehicle_type(), VehicleType::Multirotor);
        assert_eq!(default.sensor_names(), vec!["gps".to_string(), "imu".to_string()]);

        let car = provider.get("car1").unwrap();
        assert_eq!(car.sensor_names(), vec!["front".to_string()]);
    }

    #[test]
    fn test_sample_config_builds() {
        let content = include_str!("../../../configs/bridge.toml");
        let settings = ConfigLoader::load_from_str(content, ConfigFormat::Toml).unwrap();
        let (provider, failures) =
            ApiProvider::from_settings(&settings, Arc::new(DefaultSensorFactory::with_builtin()));

        assert!(failures.is_empty(), "{failures:?}");
        assert_eq!(provider.len(), 3);
        let car = provider.get("car1").unwrap();
        assert_eq!(car.get_state().kinematics().pose.position.x, 10.0);
        let rover = provider.get("rover").unwrap();
        assert_eq!(rover.get_home_geo_point().altitude, 120.0);
    }

    #[test]
    fn test_unknown_vehicle_is_routing_error() {
        let settings = ConfigLoader::load_from_str(FLEET, ConfigFormat::Toml).unwrap();
        let (provider, _) =
            ApiProvider::from_settings(&settings, Arc::new(DefaultSensorFactory::with_builtin()));

        let car = provider.get("car1").unwrap();
        car.enable_api_control(true);
        car.set_controls(VehicleControls::Car(CarControls::new(0.6, -0.3)))
            .unwrap();
        let drone = provider.get("drone1").unwrap();
        let before = (car.get_state(), car.get_controls(), drone.get_controls());

        let err = provider.get("drone2").err().unwrap();
        assert_eq!(err.kind().as_str(), "routing");
        assert!(err.to_string().contains("drone2"));

        // failed lookup leaves every other vehicle untouched
        let after = (car.get_state(), car.get_controls(), drone.get_controls());
        assert_eq!(after, before);
        assert!(car.is_api_control_enabled());
        assert_eq!(provider.len(), 2);
    }

    #[test]
    fn test_bad_vehicle_does_not_block_others() {
        let content = format!(
            "{FLEET}\n[[vehicles]]\nname = \"bad\"\nvehicle_type = \"warthog\"\n\n\
             [[vehicles.sensors]]\nname = \"cam\"\nsensor_type = \"camera\"\n"
        );
        let settings = ConfigLoader::load_from_str(&content, ConfigFormat::Toml).unwrap();
        let (provider, failures) =
            ApiProvider::from_settings(&settings, Arc::new(DefaultSensorFactory::with_builtin()));

        assert_eq!(provider.len(), 2);
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].vehicle, "bad");
        assert_eq!(failures[0].error.kind().as_str(), "configuration");
    }
}

#[cfg(test)]
mod concurrency_tests {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Barrier};
    use std::thread;

    use contracts::{
        Environment, KinematicsState, Pose, SensorSetting, VehicleSetting, VehicleType, Vector3,
    };
    use vehicle_api::{VehicleControls, VehicleStateSnapshot, WarthogControls, WarthogState};

    use crate::support::{mock_factory, provider};

    const WRITES: u64 = 20_000;
    const READERS: usize = 4;

    /// Every field of the published snapshot is derived from its timestamp,
    /// so a torn read shows up as a mismatch.
    fn snapshot(t: u64) -> VehicleStateSnapshot {
        let v = t as f32;
        VehicleStateSnapshot::Warthog(WarthogState {
            linear_vel: v,
            angular_vel: v,
            kinematics_estimated: KinematicsState {
                pose: Pose {
                    position: Vector3::new(v, -v, 0.0),
                    ..Pose::default()
                },
                linear_velocity: Vector3::new(v, 0.0, 0.0),
                ..KinematicsState::default()
            },
            timestamp: t,
        })
    }

    #[test]
    fn test_state_reads_never_tear() {
        let provider = provider(vec![VehicleSetting::new("rover", VehicleType::Warthog)]);
        let rover = provider.get("rover").unwrap();
        let done = Arc::new(AtomicBool::new(false));
        let start = Arc::new(Barrier::new(READERS + 1));

        let readers: Vec<_> = (0..READERS)
            .map(|_| {
                let rover = Arc::clone(&rover);
                let done = Arc::clone(&done);
                let start = Arc::clone(&start);
                thread::spawn(move || {
                    start.wait();
                    let mut last = 0;
                    let mut reads = 0u64;
                    while !done.load(Ordering::Acquire) {
                        let state = rover.get_state();
                        let t = state.timestamp();
                        let k = state.kinematics();
                        assert!(t >= last, "timestamp went backwards: {t} < {last}");
                        assert_eq!(k.pose.position.x, t as f32);
                        assert_eq!(k.pose.position.y, -(t as f32));
                        assert_eq!(k.linear_velocity.x, t as f32);
                        last = t;
                        reads += 1;
                    }
                    reads
                })
            })
            .collect();

        start.wait();
        for t in 1..=WRITES {
            rover.update_state(snapshot(t)).unwrap();
        }
        done.store(true, Ordering::Release);

        for reader in readers {
            assert!(reader.join().unwrap() > 0);
        }
        assert_eq!(rover.get_state().timestamp(), WRITES);
    }

    #[test]
    fn test_control_reads_never_tear() {
        let provider = provider(vec![VehicleSetting::new("rover", VehicleType::Warthog)]);
        let rover = provider.get("rover").unwrap();
        let done = Arc::new(AtomicBool::new(false));

        let reader = {
            let rover = Arc::clone(&rover);
            let done = Arc::clone(&done);
            thread::spawn(move || {
                while !done.load(Ordering::Acquire) {
                    let VehicleControls::Warthog(c) = rover.get_controls() else {
                        panic!("controls changed type");
                    };
                    // writers always send equal fields
                    assert_eq!(c.linear_vel, c.angular_vel);
                }
            })
        };

        let writers: Vec<_> = (0..2)
            .map(|w| {
                let rover = Arc::clone(&rover);
                thread::spawn(move || {
                    for i in 0..5_000 {
                        let v = ((i + w * 7) % 40) as f32 / 20.0 - 1.0;
                        rover
                            .set_controls(VehicleControls::Warthog(WarthogControls::new(v, v)))
                            .unwrap();
                    }
                })
            })
            .collect();

        for writer in writers {
            writer.join().unwrap();
        }
        done.store(true, Ordering::Release);
        reader.join().unwrap();
    }

    #[test]
    fn test_lifecycle_fenced_against_tick_and_transport() {
        const CYCLES: usize = 200;
        const TICKS: u64 = 2_000;

        let setting = VehicleSetting::new("rover", VehicleType::Warthog)
            .with_sensor(SensorSetting::new("m1", "mock"))
            .with_sensor(SensorSetting::new("gps", "gps"))
            .with_sensor(SensorSetting::new("m2", "mock"));
        let expected = vec!["m1".to_string(), "gps".to_string(), "m2".to_string()];
        let provider = provider(vec![setting.clone()]);
        let rover = provider.get("rover").unwrap();
        rover.enable_api_control(true);
        let generation = rover.generation();

        let done = Arc::new(AtomicBool::new(false));
        let start = Arc::new(Barrier::new(READERS + 2));

        let lifecycle = {
            let rover = Arc::clone(&rover);
            let start = Arc::clone(&start);
            thread::spawn(move || {
                let (factory, _) = mock_factory();
                start.wait();
                for i in 0..CYCLES {
                    if i % 2 == 0 {
                        rover
                            .initialize(
                                &setting,
                                Arc::clone(&factory),
                                &KinematicsState::default(),
                                &Environment::default(),
                            )
                            .unwrap();
                    } else {
                        rover.reset();
                    }
                }
            })
        };

        let tick = {
            let rover = Arc::clone(&rover);
            let start = Arc::clone(&start);
            thread::spawn(move || {
                start.wait();
                let mut dropped = 0u64;
                for t in 1..=TICKS {
                    let generation = rover.generation();
                    if !rover.update_state_since(generation, snapshot(t)).unwrap() {
                        dropped += 1;
                    }
                    rover.update();
                }
                dropped
            })
        };

        let transport: Vec<_> = (0..READERS)
            .map(|r| {
                let rover = Arc::clone(&rover);
                let done = Arc::clone(&done);
                let start = Arc::clone(&start);
                let expected = expected.clone();
                thread::spawn(move || {
                    start.wait();
                    let mut last = 0;
                    let mut i = 0u32;
                    loop {
                        let v = ((i + r as u32) % 20) as f32 / 10.0 - 1.0;
                        rover
                            .set_controls(VehicleControls::Warthog(WarthogControls::new(v, v)))
                            .unwrap();

                        let t = rover.get_state().timestamp();
                        assert!(t >= last, "timestamp went backwards: {t} < {last}");
                        last = t;

                        assert_eq!(rover.sensor_names(), expected);
                        let readings = rover.sensor_readings();
                        let names: Vec<_> =
                            readings.entries.iter().map(|e| e.sensor.as_str()).collect();
                        assert_eq!(names, ["m1", "gps", "m2"]);
                        i += 1;

                        if done.load(Ordering::Acquire) {
                            break i;
                        }
                    }
                })
            })
            .collect();

        lifecycle.join().unwrap();
        let dropped = tick.join().unwrap();
        done.store(true, Ordering::Release);
        for reader in transport {
            assert!(reader.join().unwrap() > 0);
        }

        // each bump can invalidate at most the one step in flight
        assert!(dropped <= CYCLES as u64);
        assert_eq!(rover.generation(), generation + CYCLES as u64);
        assert_eq!(rover.sensor_names(), expected);
        assert!(rover.get_state().timestamp() <= TICKS);
    }

    #[test]
    fn test_stale_snapshot_rejected() {
        let provider = provider(vec![VehicleSetting::new("rover", VehicleType::Warthog)]);
        let rover = provider.get("rover").unwrap();
        rover.update_state(snapshot(100)).unwrap();

        let err = rover.update_state(snapshot(50)).unwrap_err();
        assert_eq!(err.kind().as_str(), "validation");
        assert_eq!(rover.get_state().timestamp(), 100);

        // equal timestamp is accepted
        rover.update_state(snapshot(100)).unwrap();
    }
}

#[cfg(test)]
mod lifecycle_tests {
    use contracts::{
        ControlPolicy, Environment, KinematicsState, SensorReading, SensorSetting,
        VehicleSetting, VehicleType,
    };
    use vehicle_api::{
        ArmState, CarControls, MultirotorControls, VehicleApi, VehicleControls,
        VehicleStateSnapshot, WarthogState,
    };

    use crate::support::{mock_factory, provider};

    fn faulty_setting() -> VehicleSetting {
        let mut bad = SensorSetting::new("bad", "mock");
        bad.params.insert("fail".to_string(), 1.0);
        VehicleSetting::new("rover", VehicleType::Warthog)
            .with_sensor(SensorSetting::new("good", "mock"))
            .with_sensor(bad)
            .with_sensor(SensorSetting::new("gps", "gps"))
    }

    fn mock_ticks(reading: &SensorReading) -> f32 {
        match reading {
            SensorReading::Barometer(b) => b.altitude,
            other => panic!("expected mock reading, got {other:?}"),
        }
    }

    #[test]
    fn test_faulty_sensor_is_isolated() {
        let provider = provider(vec![faulty_setting()]);
        let rover = provider.get("rover").unwrap();

        for t in 1..=5u64 {
            let state = VehicleStateSnapshot::Warthog(WarthogState {
                timestamp: t * 1_000,
                ..WarthogState::default()
            });
            rover.update_state(state).unwrap();
            rover.update();
        }

        let readings = rover.sensor_readings();
        assert_eq!(readings.timestamp, 5_000);
        assert_eq!(readings.len(), 3);
        assert_eq!(mock_ticks(readings.get("good").unwrap()), 5.0);
        // failing sensor keeps its post-initialize reading
        assert_eq!(mock_ticks(readings.get("bad").unwrap()), 0.0);
        assert_eq!(readings.get("gps").unwrap().timestamp(), 5_000);
    }

    #[test]
    fn test_reset_restores_initial_state() {
        let provider = provider(vec![VehicleSetting::new("drone", VehicleType::Multirotor)
            .with_sensor(SensorSetting::new("m", "mock"))]);
        let drone = provider.get("drone").unwrap();
        let initial = drone.get_state();

        drone.enable_api_control(true);
        assert!(drone.arm_disarm(true));
        drone
            .set_controls(VehicleControls::Multirotor(MultirotorControls {
                throttle: 0.9,
                ..Default::default()
            }))
            .unwrap();
        let mut moved = initial.clone();
        if let VehicleStateSnapshot::Multirotor(s) = &mut moved {
            s.kinematics_estimated.pose.position.z = -10.0;
            s.timestamp = 7_000;
        }
        drone.update_state(moved).unwrap();
        drone.update();

        drone.reset();

        assert_eq!(drone.arm_state(), ArmState::Disarmed);
        // multirotor keeps its last command; disarming alone stops it
        let VehicleControls::Multirotor(kept) = drone.get_controls() else {
            panic!("expected multirotor controls");
        };
        assert_eq!(kept.throttle, 0.9);
        let state = drone.get_state();
        assert_eq!(state.kinematics(), initial.kinematics());
        // time keeps moving forward across a reset
        assert_eq!(state.timestamp(), 7_000);
        assert_eq!(mock_ticks(&drone.get_sensor_reading("m").unwrap()), 0.0);
    }

    #[test]
    fn test_car_reset_clears_controls() {
        let provider = provider(vec![VehicleSetting::new("car1", VehicleType::Car)]);
        let car = provider.get("car1").unwrap();
        car.set_controls(VehicleControls::Car(CarControls::new(0.7, 0.3)))
            .unwrap();

        car.reset();
        assert_eq!(car.get_controls(), VehicleControls::Car(CarControls::default()));
        assert_eq!(car.arm_state(), ArmState::NotModeled);
    }

    #[test]
    fn test_initialize_is_idempotent() {
        let (factory, counters) = mock_factory();
        let setting = VehicleSetting::new("rover", VehicleType::Warthog)
            .with_sensor(SensorSetting::new("a", "mock"))
            .with_sensor(SensorSetting::new("b", "mock"));
        let env = Environment::default();
        let kin = KinematicsState::default();

        let rover =
            vehicle_api::build_vehicle(&setting, factory.clone(), &env).unwrap();
        rover.initialize(&setting, factory.clone(), &kin, &env).unwrap();
        rover.initialize(&setting, factory, &kin, &env).unwrap();

        assert_eq!(rover.sensor_names(), vec!["a".to_string(), "b".to_string()]);
        assert_eq!(rover.sensor_readings().len(), 2);
        assert_eq!(counters.initializes(), 6);
    }

    #[test]
    fn test_failed_reinitialize_keeps_sensors() {
        let (factory, _) = mock_factory();
        let env = Environment::default();
        let kin = KinematicsState::default();
        let setting = VehicleSetting::new("rover", VehicleType::Warthog)
            .with_sensor(SensorSetting::new("a", "mock"));
        let rover = vehicle_api::build_vehicle(&setting, factory.clone(), &env).unwrap();

        let broken = setting
            .clone()
            .with_sensor(SensorSetting::new("cam", "camera"));
        let err = rover.initialize(&broken, factory, &kin, &env).unwrap_err();
        assert_eq!(err.kind().as_str(), "configuration");
        assert_eq!(rover.sensor_names(), vec!["a".to_string()]);
    }

    #[test]
    fn test_reject_policy_keeps_previous_command() {
        let provider = provider(vec![
            VehicleSetting::new("strict", VehicleType::Car).with_policy(ControlPolicy::Reject),
            VehicleSetting::new("lenient", VehicleType::Car),
        ]);
        let first = CarControls::new(0.5, 0.1);
        let too_fast = CarControls::new(1.5, 0.1);

        let strict = provider.get("strict").unwrap();
        strict.set_controls(VehicleControls::Car(first)).unwrap();
        let err = strict.set_controls(VehicleControls::Car(too_fast)).unwrap_err();
        assert_eq!(err.kind().as_str(), "validation");
        assert!(err.to_string().contains("throttle"));
        assert_eq!(strict.get_controls(), VehicleControls::Car(first));

        let lenient = provider.get("lenient").unwrap();
        lenient.set_controls(VehicleControls::Car(too_fast)).unwrap();
        let VehicleControls::Car(latched) = lenient.get_controls() else {
            panic!("expected car controls");
        };
        assert_eq!(latched.throttle, 1.0);
    }

    #[test]
    fn test_controls_of_wrong_type_rejected() {
        let provider = provider(vec![VehicleSetting::new("car1", VehicleType::Car)]);
        let car = provider.get("car1").unwrap();
        let before = car.get_controls();

        let err = car
            .set_controls(VehicleControls::Multirotor(MultirotorControls::default()))
            .unwrap_err();
        assert_eq!(err.kind().as_str(), "validation");
        assert_eq!(car.get_controls(), before);
    }

    #[test]
    fn test_report_state_lists_every_sensor() {
        let provider = provider(vec![faulty_setting()]);
        let rover = provider.get("rover").unwrap();
        let rover: &dyn VehicleApi = rover.as_ref();
        let mut reporter = contracts::StateReporter::new();
        rover.report_state(&mut reporter);
        let text = reporter.into_string();
        for name in ["rover", "good", "bad", "gps"] {
            assert!(text.contains(name), "missing {name} in:\n{text}");
        }
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::sync::Arc;

    use contracts::{SensorSetting, VehicleSetting, VehicleType};
    use rpc_server::{RpcResponse, RpcServer, ServerConfig, ServerHandle};
    use serde_json::{json, Value};
    use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
    use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
    use tokio::net::TcpStream;

    use crate::support::provider;

    struct Client {
        lines: Lines<BufReader<OwnedReadHalf>>,
        writer: OwnedWriteHalf,
        next_id: u64,
    }

    impl Client {
        async fn connect(handle: &ServerHandle) -> Self {
            let stream = TcpStream::connect(handle.local_addr()).await.unwrap();
            let (read_half, writer) = stream.into_split();
            Self {
                lines: BufReader::new(read_half).lines(),
                writer,
                next_id: 1,
            }
        }

        async fn call(&mut self, vehicle: &str, method: &str, params: Value) -> RpcResponse {
            let id = self.next_id;
            self.next_id += 1;
            let request = json!({"id": id, "vehicle": vehicle, "method": method, "params": params});
            let mut line = serde_json::to_vec(&request).unwrap();
            line.push(b'\n');
            self.writer.write_all(&line).await.unwrap();

            let reply = self.lines.next_line().await.unwrap().unwrap();
            let response: RpcResponse = serde_json::from_str(&reply).unwrap();
            assert_eq!(response.id, id);
            response
        }

        async fn ok(&mut self, vehicle: &str, method: &str, params: Value) -> Value {
            let response = self.call(vehicle, method, params).await;
            assert!(response.is_ok(), "{method} failed: {response:?}");
            response.value().cloned().unwrap_or(Value::Null)
        }
    }

    async fn start() -> ServerHandle {
        let provider = provider(vec![
            VehicleSetting::new("drone1", VehicleType::Multirotor)
                .with_sensor(SensorSetting::new("gps", "gps"))
                .with_sensor(SensorSetting::new("baro", "barometer")),
            VehicleSetting::new("car1", VehicleType::Car),
            VehicleSetting::new("rover", VehicleType::Warthog),
        ]);
        RpcServer::bind(ServerConfig::ephemeral(), Arc::clone(&provider))
            .await
            .unwrap()
            .spawn()
            .unwrap()
    }

    #[tokio::test]
    async fn test_every_operation_over_tcp() {
        let handle = start().await;
        let mut client = Client::connect(&handle).await;

        let pong = client.ok("", "ping", Value::Null).await;
        assert_eq!(pong["version"], rpc_server::SERVER_VERSION);
        assert_eq!(
            client.ok("", "list_vehicles", Value::Null).await,
            json!(["drone1", "car1", "rover"])
        );

        // api control
        assert_eq!(client.ok("car1", "is_api_control_enabled", Value::Null).await, json!(false));
        client.ok("car1", "enable_api_control", json!({"enabled": true})).await;
        assert_eq!(client.ok("car1", "is_api_control_enabled", Value::Null).await, json!(true));
        assert_eq!(client.ok("drone1", "is_api_control_enabled", Value::Null).await, json!(false));

        // controls
        client
            .ok(
                "car1",
                "set_controls",
                json!({"throttle": 0.4, "steering": -0.2, "brake": 0.0}),
            )
            .await;
        let controls = client.ok("car1", "get_controls", Value::Null).await;
        assert_eq!(controls["vehicle_type"], "car");
        assert!((controls["throttle"].as_f64().unwrap() - 0.4).abs() < 1e-6);

        // arming
        assert_eq!(client.ok("drone1", "arm_disarm", json!({"arm": true})).await, json!(true));
        assert_eq!(client.ok("drone1", "arm_state", Value::Null).await, json!("armed"));
        assert_eq!(client.ok("rover", "arm_state", Value::Null).await, json!("not_modeled"));

        // state and home
        let state = client.ok("drone1", "get_state", Value::Null).await;
        assert_eq!(state["vehicle_type"], "multirotor");
        assert_eq!(state["landed_state"], "landed");
        let home = client.ok("drone1", "get_home_geo_point", Value::Null).await;
        assert!(home["latitude"].is_number());

        // sensors
        let gps = client
            .ok("drone1", "get_sensor_reading", json!({"sensor": "gps"}))
            .await;
        assert_eq!(gps["type"], "gps");
        let all = client.ok("drone1", "get_sensor_readings", Value::Null).await;
        assert_eq!(all["entries"].as_array().unwrap().len(), 2);

        let report = client.ok("drone1", "report_state", Value::Null).await;
        assert!(report.as_str().unwrap().contains("baro"));

        // reset drops commands and arming
        client.ok("drone1", "reset", Value::Null).await;
        assert_eq!(client.ok("drone1", "arm_state", Value::Null).await, json!("disarmed"));

        handle.shutdown().await;
    }

    #[tokio::test]
    async fn test_errors_over_tcp() {
        let handle = start().await;
        let mut client = Client::connect(&handle).await;

        let ghost = client.call("ghost", "get_state", Value::Null).await;
        let error = ghost.error_body().unwrap();
        assert_eq!(error.kind, "routing");
        assert!(error.message.contains("ghost"));

        let unknown = client.call("car1", "fly_to_moon", Value::Null).await;
        assert_eq!(unknown.error_body().unwrap().kind, "unknown_method");

        let missing = client
            .call("drone1", "get_sensor_reading", json!({"sensor": "lidar"}))
            .await;
        assert_eq!(missing.error_body().unwrap().kind, "validation");

        let bad_params = client.call("drone1", "arm_disarm", json!({"arm": "yes"})).await;
        assert_eq!(bad_params.error_body().unwrap().kind, "invalid_params");

        // the connection survives every error above
        assert!(client.call("", "ping", Value::Null).await.is_ok());

        let metrics = handle.metrics();
        assert_eq!(metrics.error_count, 4);
        assert_eq!(metrics.ok_count, 1);
        handle.shutdown().await;
    }

    #[tokio::test]
    async fn test_concurrent_clients_share_vehicles() {
        let handle = start().await;

        let mut tasks = Vec::new();
        for i in 0..8u32 {
            let addr = handle.local_addr();
            tasks.push(tokio::spawn(async move {
                let stream = TcpStream::connect(addr).await.unwrap();
                let (read_half, mut writer) = stream.into_split();
                let mut lines = BufReader::new(read_half).lines();
                let v = (i % 5) as f64 / 5.0;
                let request = json!({
                    "id": i,
                    "vehicle": "rover",
                    "method": "set_controls",
                    "params": {"linear_vel": v, "angular_vel": v}
                });
                writer
                    .write_all(format!("{request}\n").as_bytes())
                    .await
                    .unwrap();
                let reply = lines.next_line().await.unwrap().unwrap();
                let response: RpcResponse = serde_json::from_str(&reply).unwrap();
                assert!(response.is_ok());
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        let mut client = Client::connect(&handle).await;
        let controls = client.ok("rover", "get_controls", Value::Null).await;
        assert_eq!(controls["linear_vel"], controls["angular_vel"]);
        assert_eq!(handle.metrics().total_connections, 9);
        handle.shutdown().await;
    }
}
