//! # Paint Calculator
//!
//! Paint needed for the four walls of a rectangular room:
//!
//! ```text
//! wall area  = 2·(length + width)·height − doors·A_door − windows·A_window
//! paint      = wall area · coats / coverage
//! ```
//!
//! Everything is computed in meters and liters; imperial inputs are converted
//! on the way in and back on the way out.

use crate::engine::EvalContext;
use crate::errors::{CalcError, CalcResult};
use crate::inputs::InputSnapshot;
use crate::results::CalculatorResults;
use crate::units::{Feet, Liters, Meters, SqFeet, SqMeters, UnitSystem, UsGallons};

/// Standard interior door, 0.9 m × 2.1 m (rounded)
pub const DOOR_AREA: SqMeters = SqMeters(1.9);
/// Typical window, 1.2 m × 1.2 m (rounded)
pub const WINDOW_AREA: SqMeters = SqMeters(1.5);
pub const METRIC_CAN: Liters = Liters(2.5);
pub const IMPERIAL_CAN: UsGallons = UsGallons(1.0);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Room {
    pub length: Meters,
    pub width: Meters,
    pub height: Meters,
    pub doors: u32,
    pub windows: u32,
}

impl Room {
    pub fn gross_wall_area(&self) -> SqMeters {
        (self.length + self.width) * 2.0 * self.height
    }

    pub fn openings(&self) -> SqMeters {
        DOOR_AREA * self.doors as f64 + WINDOW_AREA * self.windows as f64
    }

    /// Paintable area. Errors when the openings cover the whole wall.
    pub fn wall_area(&self) -> CalcResult<SqMeters> {
        let net = self.gross_wall_area() - self.openings();
        if net.0 <= 0.0 {
            return Err(CalcError::invalid_input(
                "doors",
                self.doors.to_string(),
                "Doors and windows cover the entire wall area",
            ));
        }
        Ok(net)
    }
}

/// Liters of paint for `area` at `coats`, with coverage in m² per liter.
pub fn paint_needed(area: SqMeters, coats: u32, coverage: f64) -> CalcResult<Liters> {
    if coverage <= 0.0 {
        return Err(CalcError::division_by_zero("coverage"));
    }
    Ok(Liters(area.0 * coats as f64 / coverage))
}

/// Whole cans needed to hold `volume`.
pub fn cans(volume: f64, can_size: f64) -> u32 {
    (volume / can_size - 1e-9).ceil().max(0.0) as u32
}

fn count(inputs: &InputSnapshot, id: &str) -> CalcResult<u32> {
    let n = inputs.integer(id)?;
    u32::try_from(n).map_err(|_| CalcError::invalid_input(id, n.to_string(), "Count cannot be negative"))
}

pub fn calculate(inputs: &InputSnapshot, ctx: &EvalContext<'_>) -> CalcResult<CalculatorResults> {
    let system: UnitSystem = inputs.choice("unitSystem")?;
    let to_meters = |id: &str| -> CalcResult<Meters> {
        let value = inputs.positive(id)?;
        Ok(match system {
            UnitSystem::Metric => Meters(value),
            UnitSystem::Imperial => Feet(value).into(),
        })
    };

    let room = Room {
        length: to_meters("roomLength")?,
        width: to_meters("roomWidth")?,
        height: to_meters("wallHeight")?,
        doors: count(inputs, "doors")?,
        windows: count(inputs, "windows")?,
    };
    let coats = count(inputs, "coats")?;
    if coats == 0 {
        return Err(CalcError::invalid_input("coats", "0", "At least one coat is needed"));
    }

    // Coverage in m² per liter regardless of the unit system
    let coverage = match system {
        UnitSystem::Metric => inputs.positive("coverageMetric")?,
        UnitSystem::Imperial => {
            let per_gallon = SqMeters::from(SqFeet(inputs.positive("coverageImperial")?));
            per_gallon.0 / Liters::from(UsGallons(1.0)).0
        }
    };

    let area = room.wall_area()?;
    let volume = paint_needed(area, coats, coverage)?;

    let results = match system {
        UnitSystem::Metric => ctx
            .results()
            .with_unit("paintVolume", volume.0, 2, "L")
            .integer("cans", cans(volume.0, METRIC_CAN.0) as f64)
            .with_unit("wallArea", area.0, 2, "m²")
            .with_unit("openingsArea", room.openings().0, 2, "m²"),
        UnitSystem::Imperial => {
            let gallons = UsGallons::from(volume);
            ctx.results()
                .with_unit("paintVolume", gallons.0, 2, "gal")
                .integer("cans", cans(gallons.0, IMPERIAL_CAN.0) as f64)
                .with_unit("wallArea", SqFeet::from(area).0, 1, "ft²")
                .with_unit("openingsArea", SqFeet::from(room.openings()).0, 1, "ft²")
        }
    };

    let summary = ctx.t.format(
        "summary.default",
        &[
            ("volume", results.shown("paintVolume")),
            ("cans", results.shown("cans")),
            ("area", results.shown("wallArea")),
            ("coats", &coats.to_string()),
        ],
    );
    Ok(results.summary(summary).build())
}
