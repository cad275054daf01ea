// Copyright 2024 The PHX-rs Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

//! Utilization patterns (schedules): ventilation operating periods and
//! occupancy. Both are catalog entities, keyed and deduplicated at the
//! Project level so that many spaces can share one pattern.

use crate::common::{Error, ErrorCode, ErrorKind, Result};

pub const HOURS_PER_YEAR: f64 = 8760.0;

/// One ventilation operating period: how many hours per day the system runs
/// at a given fraction of peak design airflow.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
pub struct OperatingPeriod {
    /// hours/day
    pub operating_hours: f64,
    /// fraction of peak design airflow, 0..=1
    pub operation_speed: f64,
}

impl OperatingPeriod {
    pub fn new(operating_hours: f64, operation_speed: f64) -> Self {
        OperatingPeriod {
            operating_hours,
            operation_speed,
        }
    }
}

/// A fresh-air ventilation utilization pattern: four speed tiers whose
/// daily operating hours must total 24.
#[derive(Clone, Debug, PartialEq)]
pub struct VentilationPattern {
    pub display_name: String,
    pub operating_days: f64,
    pub operating_weeks: f64,
    pub high: OperatingPeriod,
    pub standard: OperatingPeriod,
    pub basic: OperatingPeriod,
    pub minimum: OperatingPeriod,
}

impl Default for VentilationPattern {
    fn default() -> Self {
        VentilationPattern {
            display_name: String::new(),
            operating_days: 7.0,
            operating_weeks: 52.0,
            high: OperatingPeriod::new(24.0, 1.0),
            standard: OperatingPeriod::default(),
            basic: OperatingPeriod::default(),
            minimum: OperatingPeriod::default(),
        }
    }
}

impl VentilationPattern {
    pub fn total_operating_hours(&self) -> f64 {
        self.high.operating_hours
            + self.standard.operating_hours
            + self.basic.operating_hours
            + self.minimum.operating_hours
    }

    /// Rebalance the 'high' period so the four tiers total `max_hours`
    /// (24 by default in the source data).
    pub fn force_max_utilization_hours(&mut self, max_hours: f64) {
        let others = self.standard.operating_hours
            + self.basic.operating_hours
            + self.minimum.operating_hours;
        self.high.operating_hours = (max_hours - others).max(0.0);
    }

    /// Time-weighted average airflow fraction over a day.
    pub fn daily_average_speed(&self) -> f64 {
        let total = self.total_operating_hours();
        if total <= 0.0 {
            return 0.0;
        }
        (self.high.operating_hours * self.high.operation_speed
            + self.standard.operating_hours * self.standard.operation_speed
            + self.basic.operating_hours * self.basic.operation_speed
            + self.minimum.operating_hours * self.minimum.operation_speed)
            / total
    }

    pub fn validate(&self, key: &str) -> Result<()> {
        let total = self.total_operating_hours();
        if (total - 24.0).abs() > 0.01 {
            return Err(Error::new(
                ErrorKind::Model,
                ErrorCode::BadPhysicalValue,
                Some(format!(
                    "ventilation pattern '{key}': operating periods total {total} hours/day, expected 24"
                )),
            ));
        }
        for (name, period) in [
            ("high", &self.high),
            ("standard", &self.standard),
            ("basic", &self.basic),
            ("minimum", &self.minimum),
        ] {
            if !(0.0..=1.0).contains(&period.operation_speed) {
                return Err(Error::new(
                    ErrorKind::Model,
                    ErrorCode::BadPhysicalValue,
                    Some(format!(
                        "ventilation pattern '{key}': {name} speed {} outside 0..=1",
                        period.operation_speed
                    )),
                ));
            }
        }
        Ok(())
    }
}

/// An occupancy (people) utilization pattern.
#[derive(Clone, Debug, PartialEq)]
pub struct OccupancyPattern {
    pub display_name: String,
    pub start_hour: f64,
    pub end_hour: f64,
    pub annual_utilization_days: f64,
    /// relative to the occupied period, 0..=1
    pub relative_utilization_factor: f64,
}

impl Default for OccupancyPattern {
    fn default() -> Self {
        OccupancyPattern {
            display_name: String::new(),
            start_hour: 0.0,
            end_hour: 24.0,
            annual_utilization_days: 365.0,
            relative_utilization_factor: 1.0,
        }
    }
}

impl OccupancyPattern {
    pub fn daily_operating_hours(&self) -> f64 {
        self.end_hour - self.start_hour
    }

    pub fn annual_operating_hours(&self) -> f64 {
        self.daily_operating_hours() * self.annual_utilization_days
    }

    /// Utilization relative to the whole 8760-hour year.
    pub fn annual_utilization_factor(&self) -> f64 {
        (self.annual_operating_hours() / HOURS_PER_YEAR) * self.relative_utilization_factor
    }

    pub fn validate(&self, key: &str) -> Result<()> {
        if self.end_hour <= self.start_hour
            || self.start_hour < 0.0
            || self.end_hour > 24.0
            || !(0.0..=366.0).contains(&self.annual_utilization_days)
            || !(0.0..=1.0).contains(&self.relative_utilization_factor)
        {
            return Err(Error::new(
                ErrorKind::Model,
                ErrorCode::BadPhysicalValue,
                Some(format!("occupancy pattern '{key}' has out-of-range fields")),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;

    #[test]
    fn vent_pattern_default_is_valid() {
        VentilationPattern::default().validate("default").unwrap();
    }

    #[test]
    fn vent_pattern_rebalances_high_period() {
        let mut pattern = VentilationPattern::default();
        pattern.standard = OperatingPeriod::new(8.0, 0.77);
        pattern.minimum = OperatingPeriod::new(4.0, 0.4);
        pattern.force_max_utilization_hours(24.0);
        assert!(approx_eq!(f64, pattern.high.operating_hours, 12.0, epsilon = 1e-9));
        pattern.validate("rebalanced").unwrap();
    }

    #[test]
    fn vent_pattern_bad_totals_rejected() {
        let mut pattern = VentilationPattern::default();
        pattern.high.operating_hours = 30.0;
        let err = pattern.validate("broken").unwrap_err();
        assert_eq!(err.code, ErrorCode::BadPhysicalValue);
    }

    #[test]
    fn occupancy_annual_factor() {
        let pattern = OccupancyPattern {
            display_name: "office".to_owned(),
            start_hour: 8.0,
            end_hour: 18.0,
            annual_utilization_days: 250.0,
            relative_utilization_factor: 0.8,
        };
        pattern.validate("office").unwrap();
        let expected = (10.0 * 250.0 / HOURS_PER_YEAR) * 0.8;
        assert!(approx_eq!(
            f64,
            pattern.annual_utilization_factor(),
            expected,
            epsilon = 1e-12
        ));
    }

    #[test]
    fn occupancy_inverted_hours_rejected() {
        let pattern = OccupancyPattern {
            start_hour: 18.0,
            end_hour: 8.0,
            ..Default::default()
        };
        assert!(pattern.validate("bad").is_err());
    }
}
