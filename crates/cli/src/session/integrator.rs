//! Stand-in kinematic integrator driving the tick thread.
//!
//! Just enough motion for the published snapshots to change with the
//! latched commands. Not a physics model.

use contracts::{GeoPoint, KinematicsState, Quaternion, Vector3};
use vehicle_api::{
    vehicles::car::MAX_RPM, CarControls, CarState, LandedState, MultirotorControls,
    MultirotorState, VehicleControls, VehicleStateSnapshot, WarthogControls, WarthogState,
};

/// Car: full throttle acceleration, m/s^2
const CAR_ACCEL: f32 = 4.0;
/// Car: full brake deceleration, m/s^2
const CAR_BRAKE: f32 = 8.0;
const CAR_DRAG: f32 = 0.05;
const CAR_WHEELBASE: f32 = 2.7;
const CAR_MAX_STEER: f32 = 0.6;
const CAR_TOP_SPEED: f32 = 40.0;

/// Multirotor: horizontal speed per radian of tilt, m/s
const TILT_SPEED: f32 = 10.0;
/// Multirotor: climb rate at full throttle, m/s
const MAX_CLIMB: f32 = 5.0;
const HOVER_THROTTLE: f32 = 0.5;

/// Per-vehicle inputs read alongside the command
#[derive(Debug, Clone, Copy)]
pub struct StepInputs {
    pub api_control: bool,
    pub armed: bool,
    pub home: GeoPoint,
}

/// Advance `state` by `dt` seconds under `controls`.
///
/// Without API control the vehicle runs on a default command. A command of
/// another vehicle type is treated the same way.
pub fn step(
    state: &VehicleStateSnapshot,
    controls: &VehicleControls,
    inputs: StepInputs,
    dt: f32,
    timestamp: u64,
) -> VehicleStateSnapshot {
    match state {
        VehicleStateSnapshot::Warthog(s) => {
            let c = match controls {
                VehicleControls::Warthog(c) if inputs.api_control => *c,
                _ => WarthogControls::default(),
            };
            VehicleStateSnapshot::Warthog(step_warthog(s, &c, dt, timestamp))
        }
        VehicleStateSnapshot::Car(s) => {
            let c = match controls {
                VehicleControls::Car(c) if inputs.api_control => *c,
                _ => CarControls::default(),
            };
            VehicleStateSnapshot::Car(step_car(s, &c, dt, timestamp))
        }
        VehicleStateSnapshot::Multirotor(s) => {
            let c = match controls {
                VehicleControls::Multirotor(c) if inputs.api_control => *c,
                _ => MultirotorControls::default(),
            };
            VehicleStateSnapshot::Multirotor(step_multirotor(s, &c, inputs, dt, timestamp))
        }
    }
}

/// New kinematics moving at `velocity` (world frame) with heading `yaw`.
fn advance(
    previous: &KinematicsState,
    velocity: Vector3,
    yaw: f32,
    yaw_rate: f32,
    dt: f32,
) -> KinematicsState {
    let angular_velocity = Vector3::new(0.0, 0.0, yaw_rate);
    KinematicsState {
        pose: contracts::Pose {
            position: previous.pose.position + velocity * dt,
            orientation: Quaternion::from_yaw(yaw),
        },
        linear_velocity: velocity,
        angular_velocity,
        linear_acceleration: (velocity - previous.linear_velocity) * (1.0 / dt),
        angular_acceleration: (angular_velocity - previous.angular_velocity) * (1.0 / dt),
    }
}

fn heading(yaw: f32, forward: f32, right: f32) -> Vector3 {
    let (sin, cos) = yaw.sin_cos();
    Vector3::new(forward * cos - right * sin, forward * sin + right * cos, 0.0)
}

fn step_warthog(s: &WarthogState, c: &WarthogControls, dt: f32, timestamp: u64) -> WarthogState {
    let previous = &s.kinematics_estimated;
    let yaw = previous.pose.orientation.yaw() + c.angular_vel * dt;
    let velocity = heading(yaw, c.linear_vel, 0.0);

    WarthogState {
        linear_vel: c.linear_vel,
        angular_vel: c.angular_vel,
        kinematics_estimated: advance(previous, velocity, yaw, c.angular_vel, dt),
        timestamp,
    }
}

fn step_car(s: &CarState, c: &CarControls, dt: f32, timestamp: u64) -> CarState {
    let previous = &s.kinematics_estimated;

    let mut speed = s.speed + (c.throttle * CAR_ACCEL - CAR_DRAG * s.speed) * dt;
    let braking = if c.handbrake { 1.0 } else { c.brake };
    let decel = braking * CAR_BRAKE * dt;
    speed = if speed.abs() <= decel {
        0.0
    } else {
        speed - decel * speed.signum()
    };
    speed = speed.clamp(-CAR_TOP_SPEED, CAR_TOP_SPEED);

    let yaw_rate = speed * (c.steering * CAR_MAX_STEER).tan() / CAR_WHEELBASE;
    let yaw = previous.pose.orientation.yaw() + yaw_rate * dt;

    let gear = if c.is_manual_gear {
        c.manual_gear
    } else if speed > 0.1 {
        1
    } else if speed < -0.1 {
        -1
    } else {
        0
    };

    CarState {
        speed,
        gear,
        rpm: (speed.abs() / CAR_TOP_SPEED * MAX_RPM).min(MAX_RPM),
        maxrpm: MAX_RPM,
        handbrake: c.handbrake,
        kinematics_estimated: advance(previous, heading(yaw, speed, 0.0), yaw, yaw_rate, dt),
        timestamp,
    }
}

fn step_multirotor(
    s: &MultirotorState,
    c: &MultirotorControls,
    inputs: StepInputs,
    dt: f32,
    timestamp: u64,
) -> MultirotorState {
    let previous = &s.kinematics_estimated;
    let airborne = s.landed_state == LandedState::Flying;

    // 未解锁时没有推力：空中则以最大速率下降，地面则静止
    let (climb, forward, right, yaw_rate) = if inputs.armed {
        (
            (c.throttle - HOVER_THROTTLE) / HOVER_THROTTLE * MAX_CLIMB,
            -c.pitch * TILT_SPEED,
            c.roll * TILT_SPEED,
            c.yaw_rate,
        )
    } else if airborne {
        (-MAX_CLIMB, 0.0, 0.0, 0.0)
    } else {
        (0.0, 0.0, 0.0, 0.0)
    };

    let yaw = previous.pose.orientation.yaw() + yaw_rate * dt;
    let mut velocity = heading(yaw, forward, right);
    // NED: climbing is negative z
    velocity.z = -climb;

    let mut kinematics = advance(previous, velocity, yaw, yaw_rate, dt);

    // ground plane at z = 0
    let landed = kinematics.pose.position.z >= 0.0 && velocity.z >= 0.0;
    if landed {
        kinematics.pose.position.z = 0.0;
        kinematics.linear_velocity = Vector3::ZERO;
    }

    MultirotorState {
        gps_location: inputs.home.offset_by(kinematics.pose.position),
        kinematics_estimated: kinematics,
        landed_state: if landed {
            LandedState::Landed
        } else {
            LandedState::Flying
        },
        timestamp,
    }
}
