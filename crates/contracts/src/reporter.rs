//! Human-readable state dump used by `report_state` hooks.

use std::fmt::{Display, Write};

/// Accumulates an indented text report.
///
/// Sensors append a heading followed by name/value lines; the vehicle
/// drives the fan-out and hands the finished text to the caller.
#[derive(Debug, Default, Clone)]
pub struct StateReporter {
    out: String,
    depth: usize,
    float_precision: usize,
}

impl StateReporter {
    pub fn new() -> Self {
        Self {
            out: String::new(),
            depth: 0,
            float_precision: 3,
        }
    }

    pub fn with_precision(mut self, digits: usize) -> Self {
        self.float_precision = digits;
        self
    }

    /// Write a heading line and indent everything after it until `end_heading`.
    pub fn start_heading(&mut self, title: &str) {
        self.indent();
        let _ = writeln!(self.out, "{title}");
        self.depth += 1;
    }

    pub fn end_heading(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    pub fn write_value(&mut self, name: &str, value: impl Display) {
        self.indent();
        let _ = writeln!(self.out, "{name}: {value}");
    }

    pub fn write_float(&mut self, name: &str, value: f64) {
        self.indent();
        let _ = writeln!(self.out, "{name}: {value:.*}", self.float_precision);
    }

    pub fn write_vector(&mut self, name: &str, v: &crate::Vector3) {
        self.indent();
        let p = self.float_precision;
        let _ = writeln!(self.out, "{name}: ({:.p$}, {:.p$}, {:.p$})", v.x, v.y, v.z);
    }

    pub fn as_str(&self) -> &str {
        &self.out
    }

    pub fn into_string(self) -> String {
        self.out
    }

    pub fn clear(&mut self) {
        self.out.clear();
        self.depth = 0;
    }

    fn indent(&mut self) {
        for _ in 0..self.depth {
            self.out.push_str("  ");
        }
    }
}
