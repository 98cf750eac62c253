//! Profile store: per school level, the latent types with their mean
//! vectors, priors and intervention templates.
//!
//! The store is read-only reference data. It is loaded once (from JSON or
//! the built-in standard set) and handed to every component by reference.
//! Type order within a level is significant: it is the classifier's
//! tie-break order.

mod standard;

use std::collections::{BTreeMap, HashSet};
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::catalog::FACTOR_COUNT;
use super::domain::SchoolLevel;
use super::error::InputError;

/// Longest intervention list a type may carry. The unpersonalized ranking
/// steps down from 100 by at least 1, so more templates would repeat scores.
pub const MAX_INTERVENTIONS_PER_TYPE: usize = 101;

/// Display label plus the explicit catalog indices it stands for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorRef {
    pub label: String,
    pub factors: Vec<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectType {
    Direct,
    Moderation,
    Mediation,
    Correlation,
}

/// Provenance of an intervention template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EvidenceSource {
    #[serde(rename = "KG")]
    Kg,
    #[serde(rename = "KG_INTERVENTION")]
    KgIntervention,
    #[serde(rename = "INFERRED")]
    Inferred,
}

/// Coaching intervention attached to a type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterventionTemplate {
    pub x: FactorRef,
    #[serde(default)]
    pub z: Option<FactorRef>,
    pub y: String,
    pub effect_type: EffectType,
    #[serde(default)]
    pub beta: Option<f64>,
    pub source: EvidenceSource,
    #[serde(default)]
    pub interpretation: String,
    #[serde(default)]
    pub strategies: Vec<String>,
}

impl InterventionTemplate {
    /// Union of `x` and `z` indices, `x` first, without duplicates.
    pub fn factor_indices(&self) -> Vec<usize> {
        let mut seen = HashSet::new();
        self.x
            .factors
            .iter()
            .chain(self.z.iter().flat_map(|z| z.factors.iter()))
            .copied()
            .filter(|index| seen.insert(*index))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeProfile {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub means: Option<Vec<f64>>,
    pub prior: f64,
    #[serde(default)]
    pub interventions: Vec<InterventionTemplate>,
}

impl TypeProfile {
    /// Mean vector, only when it covers every factor with finite values.
    pub fn complete_means(&self) -> Option<&[f64]> {
        self.means
            .as_deref()
            .filter(|means| means.len() == FACTOR_COUNT)
            .filter(|means| means.iter().all(|mean| mean.is_finite()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileStore {
    pub version: String,
    pub levels: BTreeMap<SchoolLevel, Vec<TypeProfile>>,
}

/// Failure to load or validate stored reference data.
#[derive(Debug, thiserror::Error)]
pub enum ProfileStoreError {
    #[error("failed to read profile store: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid profile store JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("type '{type_name}' ({level}) references unknown factor index {index}")]
    UnknownFactor {
        level: SchoolLevel,
        type_name: String,
        index: usize,
    },
    #[error("type '{type_name}' ({level}) has {count} interventions; at most 101 are supported")]
    TooManyInterventions {
        level: SchoolLevel,
        type_name: String,
        count: usize,
    },
    #[error("type '{type_name}' is defined more than once for {level}")]
    DuplicateType {
        level: SchoolLevel,
        type_name: String,
    },
}

impl ProfileStore {
    pub fn standard() -> Self {
        standard::standard_store()
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ProfileStoreError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ProfileStoreError> {
        let store: ProfileStore = serde_json::from_reader(reader)?;
        store.validate()?;
        Ok(store)
    }

    /// Structural checks only. Mean completeness is enforced when a level is classified.
    pub fn validate(&self) -> Result<(), ProfileStoreError> {
        for (level, types) in &self.levels {
            let mut names = HashSet::new();
            for profile in types {
                if !names.insert(profile.name.as_str()) {
                    return Err(ProfileStoreError::DuplicateType {
                        level: *level,
                        type_name: profile.name.clone(),
                    });
                }

                if profile.interventions.len() > MAX_INTERVENTIONS_PER_TYPE {
                    return Err(ProfileStoreError::TooManyInterventions {
                        level: *level,
                        type_name: profile.name.clone(),
                        count: profile.interventions.len(),
                    });
                }

                let unknown = profile
                    .interventions
                    .iter()
                    .flat_map(InterventionTemplate::factor_indices)
                    .find(|index| *index >= FACTOR_COUNT);
                if let Some(index) = unknown {
                    return Err(ProfileStoreError::UnknownFactor {
                        level: *level,
                        type_name: profile.name.clone(),
                        index,
                    });
                }
            }
        }

        Ok(())
    }

    pub fn types(&self, level: SchoolLevel) -> Result<&[TypeProfile], InputError> {
        self.levels
            .get(&level)
            .map(Vec::as_slice)
            .ok_or(InputError::UnknownSchoolLevel(level))
    }

    pub fn find_type(&self, level: SchoolLevel, type_name: &str) -> Result<&TypeProfile, InputError> {
        self.types(level)?
            .iter()
            .find(|profile| profile.name == type_name)
            .ok_or_else(|| InputError::UnknownType {
                level,
                type_name: type_name.to_string(),
            })
    }
}

impl Default for ProfileStore {
    fn default() -> Self {
        Self::standard()
    }
}
