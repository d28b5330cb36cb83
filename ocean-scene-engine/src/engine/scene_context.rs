use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use serde::Serialize;

use constants::population::{
    BOTTLES_PER_ENTITY, DAYS_PER_YEAR, MAX_BOTTLE_ENTITIES, PROJECTION_YEARS,
};

use crate::engine::error::SceneError;
use crate::engine::interaction::marker::MarkerParts;

/// Result of `init`, reported back to the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SceneSummary {
    pub entity_count: usize,
    pub five_year_total: u64,
}

impl SceneSummary {
    /// Projects daily usage over five years and derives the capped bottle
    /// entity count.
    pub fn from_daily_usage(daily_bottle_count: u64) -> Result<Self, SceneError> {
        if daily_bottle_count == 0 {
            return Err(SceneError::InvalidInput(
                "daily bottle count must be positive".to_string(),
            ));
        }

        let five_year_total = daily_bottle_count
            .saturating_mul(DAYS_PER_YEAR)
            .saturating_mul(PROJECTION_YEARS);
        let entity_count =
            usize::try_from(five_year_total / BOTTLES_PER_ENTITY).unwrap_or(usize::MAX);

        Ok(Self {
            entity_count: entity_count.min(MAX_BOTTLE_ENTITIES),
            five_year_total,
        })
    }
}

/// The live scene. Present from `init` until `dispose`.
#[derive(Resource, Debug)]
pub struct SceneContext {
    pub generation: u64,
    pub summary: SceneSummary,
    /// glTF support was registered when the scene started.
    pub loader_available: bool,
    /// Bottle entities in spawn order.
    pub bottles: Vec<Entity>,
    pub marker: Option<MarkerParts>,
}

impl SceneContext {
    pub fn new(generation: u64, summary: SceneSummary, loader_available: bool) -> Self {
        Self {
            generation,
            summary,
            loader_available,
            bottles: Vec::with_capacity(summary.entity_count),
            marker: None,
        }
    }
}

/// Counter bumped by every `init` and `dispose`. Work started under an older
/// generation must not touch the world.
#[derive(Resource, Default, Debug)]
pub struct SceneGeneration(u64);

impl SceneGeneration {
    pub fn advance(&mut self) -> u64 {
        self.0 += 1;
        self.0
    }

    pub fn current(&self) -> u64 {
        self.0
    }
}

/// True when `generation` still belongs to the active scene.
pub fn is_live(context: Option<&SceneContext>, generation: u64) -> bool {
    context.is_some_and(|context| context.generation == generation)
}

/// Everything carrying this is despawned by `dispose`.
#[derive(Component, Default, Debug, Clone, Copy)]
pub struct SceneOwned;

/// Asset stores written while building scene geometry.
#[derive(SystemParam)]
pub struct SceneAssets<'w> {
    pub meshes: ResMut<'w, Assets<Mesh>>,
    pub materials: ResMut<'w, Assets<StandardMaterial>>,
    pub images: ResMut<'w, Assets<Image>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_bottle_a_day_hits_the_cap() {
        let summary = SceneSummary::from_daily_usage(1).unwrap();
        assert_eq!(summary.five_year_total, 1825);
        assert_eq!(summary.entity_count, 50);
    }

    #[test]
    fn entity_count_matches_projection_for_many_inputs() {
        for daily in [1u64, 2, 3, 7, 30, 1000, 123_456] {
            let summary = SceneSummary::from_daily_usage(daily).unwrap();
            let expected = ((daily * 365 * 5) / 10).min(50) as usize;
            assert_eq!(summary.entity_count, expected, "daily = {daily}");
            assert_eq!(summary.five_year_total, daily * 1825);
        }
    }

    #[test]
    fn zero_usage_is_rejected() {
        assert!(matches!(
            SceneSummary::from_daily_usage(0),
            Err(SceneError::InvalidInput(_))
        ));
    }

    #[test]
    fn huge_usage_saturates_instead_of_overflowing() {
        let summary = SceneSummary::from_daily_usage(u64::MAX).unwrap();
        assert_eq!(summary.five_year_total, u64::MAX);
        assert_eq!(summary.entity_count, 50);
    }

    #[test]
    fn stale_generations_are_not_live() {
        let summary = SceneSummary::from_daily_usage(1).unwrap();
        let context = SceneContext::new(3, summary, true);
        assert!(is_live(Some(&context), 3));
        assert!(!is_live(Some(&context), 2));
        assert!(!is_live(None, 3));
    }
}
