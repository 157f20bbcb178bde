//! Arena-backed, name-keyed collection of scales.

use std::collections::{HashMap, HashSet};

use generational_arena::Arena;
use tracing::instrument;

use crate::domain::entities::{Hand, Mass, Pan, Scale, ScaleId, Side, DEFAULT_SELF_MASS};
use crate::domain::error::{DomainError, DomainResult};

/// Owns every scale of one computation.
///
/// Scales are keyed by name and remember the order in which their names were
/// first mentioned. Sides link to other scales by [`ScaleId`] only, so the
/// arena stays the single owner even when references form a cycle.
#[derive(Debug)]
pub struct ScaleGraph {
    arena: Arena<Scale>,
    by_name: HashMap<String, ScaleId>,
    order: Vec<ScaleId>,
    self_mass: Mass,
}

impl Default for ScaleGraph {
    fn default() -> Self {
        Self::new(DEFAULT_SELF_MASS)
    }
}

impl ScaleGraph {
    pub fn new(self_mass: Mass) -> Self {
        Self {
            arena: Arena::new(),
            by_name: HashMap::new(),
            order: Vec::new(),
            self_mass,
        }
    }

    /// Returns the scale registered under `name`, creating it on first mention.
    #[instrument(level = "trace", skip(self))]
    pub fn get_or_create(&mut self, name: &str) -> ScaleId {
        if let Some(&id) = self.by_name.get(name) {
            return id;
        }
        let id = self.arena.insert(Scale::new(name, self.self_mass));
        self.by_name.insert(name.to_string(), id);
        self.order.push(id);
        id
    }

    pub fn find(&self, name: &str) -> Option<ScaleId> {
        self.by_name.get(name).copied()
    }

    pub fn get(&self, id: ScaleId) -> Option<&Scale> {
        self.arena.get(id)
    }

    /// Like [`get`](Self::get), but a missing scale is an error.
    pub fn scale(&self, id: ScaleId) -> DomainResult<&Scale> {
        self.arena
            .get(id)
            .ok_or_else(|| DomainError::MissingScale(format!("{:?}", id)))
    }

    pub fn scale_mut(&mut self, id: ScaleId) -> DomainResult<&mut Scale> {
        self.arena
            .get_mut(id)
            .ok_or_else(|| DomainError::MissingScale(format!("{:?}", id)))
    }

    /// Lookup by name, for callers outside the balancing core.
    pub fn by_name(&self, name: &str) -> Option<&Scale> {
        self.find(name).and_then(|id| self.get(id))
    }

    /// Scale handles in first-mention order.
    pub fn order(&self) -> &[ScaleId] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Scales in first-mention order.
    pub fn iter(&self) -> impl Iterator<Item = (ScaleId, &Scale)> + '_ {
        self.order
            .iter()
            .filter_map(move |&id| self.arena.get(id).map(|scale| (id, scale)))
    }

    pub fn set_side(&mut self, owner: ScaleId, hand: Hand, side: Side) -> DomainResult<()> {
        *self.scale_mut(owner)?.side_mut(hand) = side;
        Ok(())
    }

    /// Current state of the pan that `hand` of `owner` resolves to.
    ///
    /// A weight side resolves to its own pan, a reference side to the live
    /// pan state of the referenced scale.
    #[instrument(level = "trace", skip(self))]
    pub fn resolve(&self, owner: ScaleId, hand: Hand) -> DomainResult<Pan> {
        let scale = self.scale(owner)?;
        match scale.side(hand) {
            Side::Pan(pan) => Ok(*pan),
            Side::Reference(target) => self
                .arena
                .get(*target)
                .map(|referenced| referenced.pan)
                .ok_or_else(|| DomainError::DanglingReference {
                    owner: scale.name.clone(),
                }),
        }
    }

    /// Applies `f` to the pan that `hand` of `owner` resolves to.
    pub fn with_resolved_mut<R>(
        &mut self,
        owner: ScaleId,
        hand: Hand,
        f: impl FnOnce(&mut Pan) -> R,
    ) -> DomainResult<R> {
        let target = match self.scale_mut(owner)?.side_mut(hand) {
            Side::Pan(pan) => return Ok(f(pan)),
            Side::Reference(target) => *target,
        };
        if let Some(referenced) = self.arena.get_mut(target) {
            return Ok(f(&mut referenced.pan));
        }
        Err(DomainError::DanglingReference {
            owner: self.scale(owner)?.name.clone(),
        })
    }

    /// Scales that no other scale references, in first-mention order.
    pub fn roots(&self) -> Vec<ScaleId> {
        let referenced: HashSet<ScaleId> = self
            .iter()
            .flat_map(|(_, scale)| scale.references())
            .collect();
        self.order
            .iter()
            .copied()
            .filter(|id| !referenced.contains(id))
            .collect()
    }
}
