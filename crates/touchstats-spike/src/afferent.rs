// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Afferent populations and per-trial firing statistics
//!
//! Every sensor of a trial produces one [`AfferentStats`]: three
//! [`AfferentPopulation`]s (SA, RA, PC) whose dense per-neuron arrays are
//! indexed by the global neuron index, so a neuron id taken from one
//! population can be looked up directly in any other.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Tactile afferent classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AfferentType {
    /// Slowly adapting
    Sa,
    /// Rapidly adapting
    Ra,
    /// Pacinian
    Pc,
}

impl AfferentType {
    /// Fixed population order used for classification and general aggregation
    pub const ALL: [AfferentType; 3] = [AfferentType::Sa, AfferentType::Ra, AfferentType::Pc];

    pub fn tag(&self) -> &'static str {
        match self {
            AfferentType::Sa => "sa",
            AfferentType::Ra => "ra",
            AfferentType::Pc => "pc",
        }
    }
}

impl fmt::Display for AfferentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for AfferentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sa" | "sa1" => Ok(AfferentType::Sa),
            "ra" => Ok(AfferentType::Ra),
            "pc" => Ok(AfferentType::Pc),
            other => Err(format!("unknown afferent type '{}', expected sa, ra or pc", other)),
        }
    }
}

/// 2-D position on the hand coordinate system
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Location {
    pub x: f64,
    pub y: f64,
}

impl Location {
    pub const ORIGIN: Location = Location { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`
    pub fn distance_to(&self, other: &Location) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

impl From<[f64; 2]> for Location {
    fn from([x, y]: [f64; 2]) -> Self {
        Self { x, y }
    }
}

impl From<Location> for [f64; 2] {
    fn from(location: Location) -> Self {
        [location.x, location.y]
    }
}

impl From<(f64, f64)> for Location {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Per-neuron slot of a population's `spike_deltas`.
///
/// `InPopulation(vec![])` is a member that fired fewer than twice;
/// `NotInPopulation` is a neuron owned by another population (or none).
#[derive(Debug, Clone, PartialEq, Default)]
pub enum PopulationMember {
    #[default]
    NotInPopulation,
    InPopulation(Vec<f64>),
}

impl PopulationMember {
    pub fn deltas(&self) -> Option<&[f64]> {
        match self {
            PopulationMember::NotInPopulation => None,
            PopulationMember::InPopulation(deltas) => Some(deltas),
        }
    }

    pub fn is_member(&self) -> bool {
        matches!(self, PopulationMember::InPopulation(_))
    }
}

/// Firing statistics of one afferent population within one sensor
#[derive(Debug, Clone, PartialEq)]
pub struct AfferentPopulation {
    /// Member neuron ids in ascending order
    pub id_range: Vec<usize>,

    /// Mean inter-spike interval per member (0 when fewer than two spikes)
    pub isi: AHashMap<usize, f64>,

    /// Spike count per member
    pub fire_count: AHashMap<usize, usize>,

    /// Dense over all neurons of the sensor
    pub spike_deltas: Vec<PopulationMember>,

    /// Dense over all neurons of the sensor; origin for non-members
    pub locations: Vec<Location>,
}

impl AfferentPopulation {
    /// Empty population sized for `neuron_total` neurons
    pub fn new(neuron_total: usize) -> Self {
        Self {
            id_range: Vec::new(),
            isi: AHashMap::new(),
            fire_count: AHashMap::new(),
            spike_deltas: vec![PopulationMember::NotInPopulation; neuron_total],
            locations: vec![Location::ORIGIN; neuron_total],
        }
    }

    /// Record a member. Neurons must be inserted in ascending id order.
    pub(crate) fn insert(
        &mut self,
        neuron_id: usize,
        fire_count: usize,
        mean_isi: f64,
        deltas: Vec<f64>,
        location: Location,
    ) {
        debug_assert!(self.id_range.last().map_or(true, |last| *last < neuron_id));
        self.id_range.push(neuron_id);
        self.isi.insert(neuron_id, mean_isi);
        self.fire_count.insert(neuron_id, fire_count);
        self.spike_deltas[neuron_id] = PopulationMember::InPopulation(deltas);
        self.locations[neuron_id] = location;
    }

    pub fn neuron_count(&self) -> usize {
        self.id_range.len()
    }

    pub fn contains(&self, neuron_id: usize) -> bool {
        self.spike_deltas
            .get(neuron_id)
            .is_some_and(PopulationMember::is_member)
    }

    /// Inter-spike deltas of a member, `None` for non-members
    pub fn deltas(&self, neuron_id: usize) -> Option<&[f64]> {
        self.spike_deltas.get(neuron_id).and_then(PopulationMember::deltas)
    }

    /// Members' deltas in ascending id order
    pub fn member_deltas(&self) -> impl Iterator<Item = (usize, &[f64])> + '_ {
        self.id_range
            .iter()
            .filter_map(move |id| self.deltas(*id).map(|deltas| (*id, deltas)))
    }
}

/// Per-sensor statistics for all three afferent populations
#[derive(Debug, Clone, PartialEq)]
pub struct AfferentStats {
    sensor_no: usize,
    neuron_total: usize,
    sa: AfferentPopulation,
    ra: AfferentPopulation,
    pc: AfferentPopulation,
    unclassified: Vec<usize>,
}

impl AfferentStats {
    pub(crate) fn new(sensor_no: usize, neuron_total: usize) -> Self {
        Self {
            sensor_no,
            neuron_total,
            sa: AfferentPopulation::new(neuron_total),
            ra: AfferentPopulation::new(neuron_total),
            pc: AfferentPopulation::new(neuron_total),
            unclassified: Vec::new(),
        }
    }

    pub fn sensor_no(&self) -> usize {
        self.sensor_no
    }

    /// Total neurons on the sensor, classified or not
    pub fn neuron_total(&self) -> usize {
        self.neuron_total
    }

    pub fn population(&self, afferent_type: AfferentType) -> &AfferentPopulation {
        match afferent_type {
            AfferentType::Sa => &self.sa,
            AfferentType::Ra => &self.ra,
            AfferentType::Pc => &self.pc,
        }
    }

    pub(crate) fn population_mut(&mut self, afferent_type: AfferentType) -> &mut AfferentPopulation {
        match afferent_type {
            AfferentType::Sa => &mut self.sa,
            AfferentType::Ra => &mut self.ra,
            AfferentType::Pc => &mut self.pc,
        }
    }

    pub(crate) fn mark_unclassified(&mut self, neuron_id: usize) {
        self.unclassified.push(neuron_id);
    }

    /// Neurons dropped because none of their afferent flags was set
    pub fn unclassified(&self) -> &[usize] {
        &self.unclassified
    }

    /// Member counts in SA, RA, PC order
    pub fn neuron_counts(&self) -> [usize; 3] {
        AfferentType::ALL.map(|afferent_type| self.population(afferent_type).neuron_count())
    }

    pub fn afferent_type_of(&self, neuron_id: usize) -> Option<AfferentType> {
        AfferentType::ALL
            .into_iter()
            .find(|afferent_type| self.population(*afferent_type).contains(neuron_id))
    }

    pub fn fire_count(&self, neuron_id: usize) -> Option<usize> {
        let afferent_type = self.afferent_type_of(neuron_id)?;
        self.population(afferent_type)
            .fire_count
            .get(&neuron_id)
            .copied()
    }

    pub fn mean_isi(&self, neuron_id: usize) -> Option<f64> {
        let afferent_type = self.afferent_type_of(neuron_id)?;
        self.population(afferent_type).isi.get(&neuron_id).copied()
    }

    /// True if the neuron is classified and spiked at least once
    pub fn neuron_fired(&self, neuron_id: usize) -> bool {
        self.fire_count(neuron_id).is_some_and(|count| count > 0)
    }

    pub fn location(&self, neuron_id: usize) -> Option<Location> {
        let afferent_type = self.afferent_type_of(neuron_id)?;
        self.population(afferent_type).locations.get(neuron_id).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_afferent_type_round_trip_tags() {
        for afferent_type in AfferentType::ALL {
            assert_eq!(afferent_type.tag().parse::<AfferentType>(), Ok(afferent_type));
        }
        assert_eq!("SA".parse::<AfferentType>(), Ok(AfferentType::Sa));
        assert!("merkel".parse::<AfferentType>().is_err());
    }

    #[test]
    fn test_location_distance() {
        let a = Location::new(3.0, 4.0);
        assert_eq!(a.distance_to(&Location::ORIGIN), 5.0);
        assert_eq!(Location::ORIGIN.distance_to(&a), 5.0);
    }

    #[test]
    fn test_population_membership_tags() {
        let mut population = AfferentPopulation::new(4);
        population.insert(1, 1, 0.0, Vec::new(), Location::new(1.0, 1.0));
        population.insert(3, 3, 0.02, vec![0.01, 0.03], Location::new(2.0, 2.0));

        assert_eq!(population.neuron_count(), 2);
        assert!(!population.contains(0));
        assert_eq!(population.deltas(1), Some(&[][..]));
        assert_eq!(population.deltas(2), None);
        assert_eq!(population.deltas(3), Some(&[0.01, 0.03][..]));
        assert_eq!(population.locations[0], Location::ORIGIN);
        assert_eq!(population.spike_deltas.len(), 4);
        assert_eq!(population.locations.len(), 4);
    }
}
