use crate::unit::{BattleHex, Unit};

/// One aimed-at spot: a hex and the unit standing there, if any.
#[derive(Clone, Copy)]
pub struct Destination<'a> {
    pub unit: Option<&'a dyn Unit>,
    pub hex: BattleHex,
}

impl<'a> Destination<'a> {
    pub fn unit(unit: &'a dyn Unit) -> Self {
        Self {
            hex: unit.position(),
            unit: Some(unit),
        }
    }

    pub fn hex(hex: BattleHex) -> Self {
        Self { unit: None, hex }
    }
}

impl core::fmt::Debug for Destination<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Destination")
            .field("unit", &self.unit.map(|u| u.unit_id()))
            .field("hex", &self.hex)
            .finish()
    }
}

/// Resolved targets of one invocation.
#[derive(Clone, Debug, Default)]
pub struct EffectTarget<'a> {
    destinations: Vec<Destination<'a>>,
}

impl<'a> EffectTarget<'a> {
    pub fn new() -> Self {
        Self {
            destinations: Vec::new(),
        }
    }

    pub fn push(&mut self, destination: Destination<'a>) {
        self.destinations.push(destination);
    }

    /// Units among the destinations, each reported once.
    pub fn units(&self) -> Vec<&'a dyn Unit> {
        let mut units: Vec<&'a dyn Unit> = Vec::with_capacity(self.destinations.len());
        for unit in self.destinations.iter().filter_map(|d| d.unit) {
            if !units.iter().any(|u| u.unit_id() == unit.unit_id()) {
                units.push(unit);
            }
        }
        units
    }

    pub fn destinations(&self) -> &[Destination<'a>] {
        &self.destinations
    }

    pub fn len(&self) -> usize {
        self.destinations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.destinations.is_empty()
    }
}

impl<'a> FromIterator<&'a dyn Unit> for EffectTarget<'a> {
    fn from_iter<T: IntoIterator<Item = &'a dyn Unit>>(iter: T) -> Self {
        Self {
            destinations: iter.into_iter().map(Destination::unit).collect(),
        }
    }
}
