//! Control commands and the per-vehicle control latch.

use std::fmt::Debug;
use std::sync::{Arc, Mutex};

use arc_swap::ArcSwap;
use contracts::{ContractError, ControlPolicy, Result};

use crate::lock;

/// Documented range of one bounded scalar control field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlRange {
    pub field: &'static str,
    pub min: f32,
    pub max: f32,
}

impl ControlRange {
    pub const fn new(field: &'static str, min: f32, max: f32) -> Self {
        Self { field, min, max }
    }

    /// Nearest in-range value. NaN maps to 0 (then into range).
    pub fn clamp(&self, value: f32) -> f32 {
        let value = if value.is_nan() { 0.0 } else { value };
        value.clamp(self.min, self.max)
    }

    /// Error unless `value` is finite and inside `[min, max]`.
    pub fn check(&self, value: f32) -> Result<()> {
        if value.is_finite() && value >= self.min && value <= self.max {
            Ok(())
        } else {
            Err(ContractError::control_out_of_range(
                self.field, value, self.min, self.max,
            ))
        }
    }
}

/// Vehicle-type-specific control command.
///
/// Replaced wholesale on every accepted set; there is no partial update.
pub trait ControlCommand: Debug + Clone + Default + PartialEq + Send + Sync + 'static {
    /// Copy with every bounded field clamped into its range.
    fn clamped(&self) -> Self;

    /// First bounded field outside its range, as a validation error.
    fn validate(&self) -> Result<()>;

    /// Apply `policy`: clamp into range, or reject on the first violation.
    fn admit(&self, policy: ControlPolicy) -> Result<Self> {
        match policy {
            ControlPolicy::Clamp => Ok(self.clamped()),
            ControlPolicy::Reject => {
                self.validate()?;
                Ok(self.clone())
            }
        }
    }
}

/// Coarse control state guarded by the latch mutex.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ControlMode {
    pub api_control_enabled: bool,
    pub armed: bool,
    pub policy: ControlPolicy,
}

/// Latched control command plus the API-control / arming mode.
///
/// The command lives in an `ArcSwap` so the tick thread reads it without
/// locking. Writers (set, enable toggle, reset) serialize on the mode mutex
/// so a toggle's clear and a concurrent set never interleave half-way.
pub struct ControlLatch<C> {
    mode: Mutex<ControlMode>,
    controls: ArcSwap<C>,
}

impl<C: ControlCommand> Default for ControlLatch<C> {
    fn default() -> Self {
        Self::new(ControlPolicy::default())
    }
}

impl<C: ControlCommand> ControlLatch<C> {
    pub fn new(policy: ControlPolicy) -> Self {
        Self {
            mode: Mutex::new(ControlMode {
                policy,
                ..ControlMode::default()
            }),
            controls: ArcSwap::from_pointee(C::default()),
        }
    }

    pub fn mode(&self) -> ControlMode {
        *lock(&self.mode)
    }

    pub fn set_policy(&self, policy: ControlPolicy) {
        lock(&self.mode).policy = policy;
    }

    /// Enable / disable API control. Returns whether the mode changed.
    ///
    /// A change in either direction resets the latched command to default.
    pub fn enable(&self, enabled: bool) -> bool {
        let mut mode = lock(&self.mode);
        if mode.api_control_enabled == enabled {
            return false;
        }
        mode.api_control_enabled = enabled;
        self.controls.store(Arc::new(C::default()));
        true
    }

    pub fn is_enabled(&self) -> bool {
        lock(&self.mode).api_control_enabled
    }

    pub fn set_armed(&self, armed: bool) {
        lock(&self.mode).armed = armed;
    }

    pub fn is_armed(&self) -> bool {
        lock(&self.mode).armed
    }

    /// Admit `controls` under the current policy and latch the result.
    ///
    /// On rejection the previous command stays latched.
    pub fn set(&self, controls: &C) -> Result<C> {
        let mode = lock(&self.mode);
        let admitted = controls.admit(mode.policy)?;
        self.controls.store(Arc::new(admitted.clone()));
        Ok(admitted)
    }

    /// Latest accepted command (lock-free)
    pub fn load(&self) -> Arc<C> {
        self.controls.load_full()
    }

    /// Reset the command to default, optionally clearing the armed flag.
    pub fn clear(&self, disarm: bool) {
        let mut mode = lock(&self.mode);
        if disarm {
            mode.armed = false;
        }
        self.controls.store(Arc::new(C::default()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Default, PartialEq)]
    struct Throttle(f32);

    const RANGE: ControlRange = ControlRange::new("throttle", 0.0, 1.0);

    impl ControlCommand for Throttle {
        fn clamped(&self) -> Self {
            Throttle(RANGE.clamp(self.0))
        }

        fn validate(&self) -> Result<()> {
            RANGE.check(self.0)
        }
    }

    #[test]
    fn test_range_clamp_and_nan() {
        assert_eq!(RANGE.clamp(2.0), 1.0);
        assert_eq!(RANGE.clamp(-1.0), 0.0);
        assert_eq!(RANGE.clamp(f32::NAN), 0.0);
        assert_eq!(RANGE.clamp(f32::INFINITY), 1.0);
        assert!(RANGE.check(f32::NAN).is_err());
        assert!(RANGE.check(0.5).is_ok());
    }

    #[test]
    fn test_toggle_clears_latched_command() {
        let latch = ControlLatch::<Throttle>::default();
        latch.set(&Throttle(0.7)).unwrap();

        // disabled -> disabled: no change
        assert!(!latch.enable(false));
        assert_eq!(*latch.load(), Throttle(0.7));

        assert!(latch.enable(true));
        assert_eq!(*latch.load(), Throttle(0.0));

        latch.set(&Throttle(0.3)).unwrap();
        assert!(!latch.enable(true));
        assert_eq!(*latch.load(), Throttle(0.3));
    }

    #[test]
    fn test_reject_policy_keeps_previous() {
        let latch = ControlLatch::<Throttle>::new(ControlPolicy::Reject);
        latch.set(&Throttle(0.4)).unwrap();

        let err = latch.set(&Throttle(1.5)).unwrap_err();
        assert!(matches!(err, ContractError::ControlOutOfRange { .. }));
        assert_eq!(*latch.load(), Throttle(0.4));
    }

    #[test]
    fn test_clear_disarms() {
        let latch = ControlLatch::<Throttle>::default();
        latch.set_armed(true);
        latch.set(&Throttle(1.0)).unwrap();

        latch.clear(false);
        assert!(latch.is_armed());
        latch.clear(true);
        assert!(!latch.is_armed());
        assert_eq!(*latch.load(), Throttle::default());
    }
}
