//! # RAID Calculator
//!
//! Usable capacity, fault tolerance and IOPS estimates for an array of `N`
//! identical drives of capacity `C` and per-drive IOPS `I`.
//!
//! | Level | Min drives        | Usable      | Tolerates        | Write penalty |
//! |-------|-------------------|-------------|------------------|---------------|
//! | 0     | 2                 | N·C         | 0                | 1             |
//! | 1     | 2                 | C           | N-1              | N             |
//! | 3, 4  | 3                 | (N-1)·C     | 1                | 4             |
//! | 5     | 3                 | (N-1)·C     | 1                | 4             |
//! | 6     | 4                 | (N-2)·C     | 2                | 6             |
//! | 10    | 4, even           | N·C/2       | 1 (up to N/2)    | 2             |
//! | 50    | 6, g groups of ≥3 | (N-g)·C     | 1 (up to g)      | 4             |
//! | 60    | 8, g groups of ≥4 | (N-2g)·C    | 2 (up to 2g)     | 6             |
//! | JBOD  | 1                 | N·C         | 0                | 1             |
//!
//! Read IOPS is `N·I` except for RAID 3/4 (`(N-1)·I`, dedicated parity
//! drive) and JBOD (`I`, one drive serves a given block). Write IOPS is
//! `N·I / penalty`, and `I` for JBOD.

use std::fmt;
use std::str::FromStr;

use crate::engine::EvalContext;
use crate::errors::{CalcError, CalcResult};
use crate::inputs::InputSnapshot;
use crate::results::CalculatorResults;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RaidLevel {
    Raid0,
    Raid1,
    Raid3,
    Raid4,
    Raid5,
    Raid6,
    Raid10,
    Raid50,
    Raid60,
    Jbod,
}

impl RaidLevel {
    pub const ALL: [RaidLevel; 10] = [
        RaidLevel::Raid0,
        RaidLevel::Raid1,
        RaidLevel::Raid3,
        RaidLevel::Raid4,
        RaidLevel::Raid5,
        RaidLevel::Raid6,
        RaidLevel::Raid10,
        RaidLevel::Raid50,
        RaidLevel::Raid60,
        RaidLevel::Jbod,
    ];

    /// Option key as used in the `level` select
    pub fn key(&self) -> &'static str {
        match self {
            RaidLevel::Raid0 => "0",
            RaidLevel::Raid1 => "1",
            RaidLevel::Raid3 => "3",
            RaidLevel::Raid4 => "4",
            RaidLevel::Raid5 => "5",
            RaidLevel::Raid6 => "6",
            RaidLevel::Raid10 => "10",
            RaidLevel::Raid50 => "50",
            RaidLevel::Raid60 => "60",
            RaidLevel::Jbod => "jbod",
        }
    }

    pub fn min_drives(&self) -> u32 {
        match self {
            RaidLevel::Jbod => 1,
            RaidLevel::Raid0 | RaidLevel::Raid1 => 2,
            RaidLevel::Raid3 | RaidLevel::Raid4 | RaidLevel::Raid5 => 3,
            RaidLevel::Raid6 | RaidLevel::Raid10 => 4,
            RaidLevel::Raid50 => 6,
            RaidLevel::Raid60 => 8,
        }
    }

    /// Nested levels striped across span groups
    pub fn is_nested(&self) -> bool {
        matches!(self, RaidLevel::Raid50 | RaidLevel::Raid60)
    }
}

impl fmt::Display for RaidLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RaidLevel::Jbod => f.write_str("JBOD"),
            other => write!(f, "RAID {}", other.key()),
        }
    }
}

impl FromStr for RaidLevel {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RaidLevel::ALL
            .into_iter()
            .find(|level| level.key().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| CalcError::invalid_input("level", s, "Unknown RAID level"))
    }
}

/// Capacity unit of the drive size input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapacityUnit {
    Gb,
    Tb,
}

impl CapacityUnit {
    pub fn symbol(&self) -> &'static str {
        match self {
            CapacityUnit::Gb => "GB",
            CapacityUnit::Tb => "TB",
        }
    }
}

impl FromStr for CapacityUnit {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "GB" => Ok(CapacityUnit::Gb),
            "TB" => Ok(CapacityUnit::Tb),
            other => Err(CalcError::invalid_input("capacityUnit", other, "Unknown capacity unit")),
        }
    }
}

/// Shape of an array, in units of whole drives.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaidLayout {
    /// Drives' worth of usable capacity
    pub data_drives: f64,
    /// Failures survived in the worst case
    pub fault_tolerance: u32,
    /// Failures survived in the best case
    pub max_fault_tolerance: u32,
    /// Drives' worth of read throughput
    pub read_drives: f64,
    /// Drives' worth of write throughput
    pub write_drives: f64,
    pub write_penalty: u32,
}

/// Compute the layout of `level` over `drives` drives split into `groups`
/// span groups (only read for RAID 50/60).
pub fn layout(level: RaidLevel, drives: u32, groups: u32) -> CalcResult<RaidLayout> {
    if drives < level.min_drives() {
        return Err(CalcError::invalid_input(
            "driveCount",
            drives.to_string(),
            format!("{level} needs at least {} drives", level.min_drives()),
        ));
    }
    let n = drives as f64;

    let (data_drives, fault_tolerance, max_fault_tolerance, read_drives, write_penalty) = match level {
        RaidLevel::Raid0 => (n, 0, 0, n, 1),
        RaidLevel::Raid1 => (1.0, drives - 1, drives - 1, n, drives),
        RaidLevel::Raid3 | RaidLevel::Raid4 => (n - 1.0, 1, 1, n - 1.0, 4),
        RaidLevel::Raid5 => (n - 1.0, 1, 1, n, 4),
        RaidLevel::Raid6 => (n - 2.0, 2, 2, n, 6),
        RaidLevel::Raid10 => {
            if drives % 2 != 0 {
                return Err(CalcError::invalid_input("driveCount", drives.to_string(), "RAID 10 needs an even number of drives"));
            }
            (n / 2.0, 1, drives / 2, n, 2)
        }
        RaidLevel::Raid50 => {
            check_groups(drives, groups, 3)?;
            (n - groups as f64, 1, groups, n, 4)
        }
        RaidLevel::Raid60 => {
            check_groups(drives, groups, 4)?;
            (n - 2.0 * groups as f64, 2, 2 * groups, n, 6)
        }
        RaidLevel::Jbod => (n, 0, 0, 1.0, 1),
    };

    let write_drives = match level {
        RaidLevel::Jbod => 1.0,
        _ => n / write_penalty as f64,
    };

    Ok(RaidLayout {
        data_drives,
        fault_tolerance,
        max_fault_tolerance,
        read_drives,
        write_drives,
        write_penalty,
    })
}

fn check_groups(drives: u32, groups: u32, min_per_group: u32) -> CalcResult<()> {
    if groups < 2 {
        return Err(CalcError::invalid_input("spanGroups", groups.to_string(), "At least two span groups are needed"));
    }
    if drives % groups != 0 {
        return Err(CalcError::invalid_input(
            "spanGroups",
            groups.to_string(),
            format!("{drives} drives cannot be split evenly into {groups} groups"),
        ));
    }
    if drives / groups < min_per_group {
        return Err(CalcError::invalid_input(
            "spanGroups",
            groups.to_string(),
            format!("Each group needs at least {min_per_group} drives"),
        ));
    }
    Ok(())
}

fn count(inputs: &InputSnapshot, id: &str) -> CalcResult<u32> {
    let n = inputs.integer(id)?;
    u32::try_from(n).map_err(|_| CalcError::invalid_input(id, n.to_string(), "Must be a non-negative whole number"))
}

pub fn calculate(inputs: &InputSnapshot, ctx: &EvalContext<'_>) -> CalcResult<CalculatorResults> {
    let level: RaidLevel = inputs.choice("level")?;
    let unit: CapacityUnit = inputs.choice("capacityUnit")?;
    let drives = count(inputs, "driveCount")?;
    let capacity = inputs.positive("driveCapacity")?;
    let iops = inputs.positive("driveIops")?;
    let groups = if level.is_nested() { count(inputs, "spanGroups")? } else { 1 };

    let layout = layout(level, drives, groups)?;
    let raw = drives as f64 * capacity;
    let usable = layout.data_drives * capacity;

    let results = ctx
        .results()
        .with_unit("usableCapacity", usable, 2, unit.symbol())
        .with_unit("rawCapacity", raw, 2, unit.symbol())
        .percent("efficiency", usable / raw * 100.0, 1)
        .integer("faultTolerance", layout.fault_tolerance as f64)
        .integer("maxFaultTolerance", layout.max_fault_tolerance as f64)
        .integer("readIops", layout.read_drives * iops)
        .integer("writeIops", layout.write_drives * iops)
        .integer("writePenalty", layout.write_penalty as f64);

    let summary = ctx.t.format(
        "summary.default",
        &[
            ("level", &level.to_string()),
            ("drives", &drives.to_string()),
            ("usable", results.shown("usableCapacity")),
            ("tolerance", results.shown("faultTolerance")),
        ],
    );
    Ok(results.summary(summary).build())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculators::testing::{approx, run};

    fn array(level: &str, drives: u32, capacity: f64) -> InputSnapshot {
        InputSnapshot::new()
            .with("level", level)
            .with("driveCount", drives as f64)
            .with("driveCapacity", capacity)
            .with("capacityUnit", "TB")
    }

    #[test]
    fn test_raid5_four_by_four() {
        let results = run("raid", array("5", 4, 4.0));
        assert!(results.is_valid);
        assert!(approx(results.number("usableCapacity").unwrap(), 12.0));
        assert_eq!(results.formatted("usableCapacity"), Some("12 TB"));
        assert_eq!(results.number("faultTolerance"), Some(1.0));
    }

    #[test]
    fn test_raid1_is_one_drive() {
        for drives in 2..6 {
            let results = run("raid", array("1", drives, 8.0));
            assert!(approx(results.number("usableCapacity").unwrap(), 8.0));
            assert_eq!(results.number("faultTolerance"), Some(drives as f64 - 1.0));
        }
    }

    #[test]
    fn test_raid0_is_sum_without_redundancy() {
        let results = run("raid", array("0", 3, 2.0));
        assert!(approx(results.number("usableCapacity").unwrap(), 6.0));
        assert_eq!(results.number("faultTolerance"), Some(0.0));
        assert_eq!(results.formatted("efficiency"), Some("100.0%"));
    }

    #[test]
    fn test_below_minimum_drives() {
        assert!(!run("raid", array("5", 2, 4.0)).is_valid);
        assert!(!run("raid", array("6", 3, 4.0)).is_valid);
    }

    #[test]
    fn test_raid10_needs_even_drives() {
        assert!(!run("raid", array("10", 5, 1.0)).is_valid);
        let results = run("raid", array("10", 6, 1.0));
        assert!(approx(results.number("usableCapacity").unwrap(), 3.0));
        assert_eq!(results.number("maxFaultTolerance"), Some(3.0));
    }

    #[test]
    fn test_nested_levels() {
        let l = layout(RaidLevel::Raid50, 6, 2).unwrap();
        assert_eq!(l.data_drives, 4.0);
        assert_eq!(l.max_fault_tolerance, 2);

        let l = layout(RaidLevel::Raid60, 8, 2).unwrap();
        assert_eq!(l.data_drives, 4.0);
        assert_eq!(l.fault_tolerance, 2);
        assert_eq!(l.max_fault_tolerance, 4);

        assert!(layout(RaidLevel::Raid50, 8, 3).is_err());
        assert!(layout(RaidLevel::Raid50, 8, 4).is_err());
        assert!(layout(RaidLevel::Raid60, 12, 4).is_err());
    }

    #[test]
    fn test_iops() {
        let l = layout(RaidLevel::Raid5, 4, 1).unwrap();
        assert_eq!(l.read_drives, 4.0);
        assert_eq!(l.write_drives, 1.0);

        let l = layout(RaidLevel::Raid4, 4, 1).unwrap();
        assert_eq!(l.read_drives, 3.0);

        let l = layout(RaidLevel::Jbod, 4, 1).unwrap();
        assert_eq!(l.read_drives, 1.0);
        assert_eq!(l.write_drives, 1.0);

        let results = run("raid", array("6", 6, 4.0).with("driveIops", 150.0));
        assert_eq!(results.number("readIops"), Some(900.0));
        assert_eq!(results.number("writeIops"), Some(150.0));
    }

    #[test]
    fn test_numeric_level_accepted() {
        let inputs = array("5", 4, 4.0).with("level", 5.0);
        assert!(run("raid", inputs).is_valid);
    }

    #[test]
    fn test_level_keys_roundtrip() {
        for level in RaidLevel::ALL {
            assert_eq!(level.key().parse::<RaidLevel>().unwrap(), level);
        }
    }
}
