//! Known columns and rename tables of the supported devices.

use crate::models::Field;

/// A column an instrument software is known to export
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KnownColumn {
    pub name: &'static str,
    pub unit: Option<&'static str>,
    pub dimension: Option<&'static str>,
    pub description: Option<&'static str>,
}

impl KnownColumn {
    const fn new(name: &'static str) -> Self {
        Self {
            name,
            unit: None,
            dimension: None,
            description: None,
        }
    }

    const fn unit(mut self, unit: &'static str) -> Self {
        self.unit = Some(unit);
        self
    }

    const fn dimension(mut self, dimension: &'static str) -> Self {
        self.dimension = Some(dimension);
        self
    }

    const fn description(mut self, description: &'static str) -> Self {
        self.description = Some(description);
        self
    }

    pub fn to_field(&self) -> Field {
        Field {
            name: self.name.to_string(),
            unit: self.unit.map(str::to_string),
            dimension: self.dimension.map(str::to_string),
            description: self.description.map(str::to_string),
            ..Default::default()
        }
    }
}

/// Columns of BioLogic EC-Lab MPT exports
pub const ECLAB_COLUMNS: &[KnownColumn] = &[
    KnownColumn::new("mode"),
    KnownColumn::new("ox/red"),
    KnownColumn::new("error"),
    KnownColumn::new("control changes"),
    KnownColumn::new("counter inc."),
    KnownColumn::new("time/s")
        .unit("s")
        .dimension("t")
        .description("relative time"),
    KnownColumn::new("control/V")
        .unit("V")
        .dimension("E")
        .description("control voltage"),
    KnownColumn::new("Ewe/V")
        .unit("V")
        .dimension("E")
        .description("working electrode potential"),
    KnownColumn::new("<I>/mA")
        .unit("mA")
        .dimension("I")
        .description("working electrode current"),
    KnownColumn::new("cycle number").description("cycle number"),
    KnownColumn::new("(Q-Qo)/C").unit("C"),
    KnownColumn::new("I Range").description("current range"),
    KnownColumn::new("P/W")
        .unit("W")
        .dimension("P")
        .description("power"),
];

pub const ECLAB_RENAME: &[(&str, &str)] = &[("time/s", "t"), ("Ewe/V", "E"), ("<I>/mA", "I")];

/// Columns of Gamry DAT curve tables (name and unit lines joined)
pub const GAMRY_COLUMNS: &[KnownColumn] = &[
    KnownColumn::new("Pt / #").description("point index"),
    KnownColumn::new("T / s")
        .unit("s")
        .dimension("t")
        .description("relative time"),
    KnownColumn::new("Vf / V vs. Ref.")
        .unit("V")
        .dimension("E")
        .description("measured potential vs. reference electrode"),
    KnownColumn::new("Im / A")
        .unit("A")
        .dimension("I")
        .description("measured current"),
    KnownColumn::new("Vu / V")
        .unit("V")
        .description("uncompensated potential"),
    KnownColumn::new("Sig / V")
        .unit("V")
        .description("applied signal"),
    KnownColumn::new("Ach / V")
        .unit("V")
        .description("auxiliary channel voltage"),
    KnownColumn::new("IERange / #").description("current range"),
    KnownColumn::new("Over / bits").description("overload flags"),
    KnownColumn::new("Cycle / #").description("cycle number"),
    KnownColumn::new("Temp / deg C")
        .unit("degC")
        .description("temperature"),
];

pub const GAMRY_RENAME: &[(&str, &str)] = &[
    ("T / s", "t"),
    ("Vf / V vs. Ref.", "E"),
    ("Im / A", "I"),
];
