//! Domain entities: pans, sides, scales and balance records

use std::fmt;

use generational_arena::Index;

/// Mass unit. Masses are non-negative whole numbers.
pub type Mass = u64;

/// Handle of a scale inside a [`ScaleGraph`](crate::domain::ScaleGraph).
pub type ScaleId = Index;

/// Default self-mass of a scale (its own physical weight).
pub const DEFAULT_SELF_MASS: Mass = 1;

/// A weighing pan: a fixed load plus the counterweight computed for it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Pan {
    /// Load placed on the pan
    pub mass: Mass,
    /// Additional mass added for balancing
    pub balance_mass: Mass,
}

impl Pan {
    pub fn new(mass: Mass) -> Self {
        Self {
            mass,
            balance_mass: 0,
        }
    }
}

/// One side of a scale: an owned weight or a link to another scale.
///
/// A `Reference` never owns its target; it is resolved through the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Pan(Pan),
    Reference(ScaleId),
}

impl Default for Side {
    fn default() -> Self {
        Side::Pan(Pan::default())
    }
}

impl Side {
    /// Target of a reference side, `None` for a plain weight.
    pub fn reference(&self) -> Option<ScaleId> {
        match self {
            Side::Reference(id) => Some(*id),
            Side::Pan(_) => None,
        }
    }
}

/// Selects the left or right side of a scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hand {
    Left,
    Right,
}

/// A named scale with two sides.
///
/// `pan` is the scale's own state as seen by a parent that references it:
/// its accumulated total mass and the counterweight the parent assigned to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scale {
    pub name: String,
    pub pan: Pan,
    pub left: Side,
    pub right: Side,
}

impl Scale {
    pub fn new(name: impl Into<String>, self_mass: Mass) -> Self {
        Self {
            name: name.into(),
            pan: Pan::new(self_mass),
            left: Side::default(),
            right: Side::default(),
        }
    }

    pub fn side(&self, hand: Hand) -> &Side {
        match hand {
            Hand::Left => &self.left,
            Hand::Right => &self.right,
        }
    }

    pub fn side_mut(&mut self, hand: Hand) -> &mut Side {
        match hand {
            Hand::Left => &mut self.left,
            Hand::Right => &mut self.right,
        }
    }

    /// Scales referenced by either side, left first.
    pub fn references(&self) -> impl Iterator<Item = ScaleId> + '_ {
        [&self.left, &self.right]
            .into_iter()
            .filter_map(Side::reference)
    }
}

/// Output record: the counterweights required on each side of one scale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalanceRecord {
    pub name: String,
    pub left_balance: Mass,
    pub right_balance: Mass,
}

impl fmt::Display for BalanceRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{}",
            self.name, self.left_balance, self.right_balance
        )
    }
}
