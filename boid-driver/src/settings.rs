use anyhow::{Context, Result};
use boid_core::{Bounds, FlockSimulation, Vector2D};
use boid_shared::{Position, SimulationSettings};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::Path;

/// Command-line values that take precedence over the settings file
#[derive(Debug, Clone, Default)]
pub struct SettingsOverrides {
    pub world_width: Option<f32>,
    pub world_height: Option<f32>,
    pub boid_count: Option<usize>,
    pub tick_rate: Option<f64>,
    pub seed: Option<u64>,
    pub attractor: Option<Position>,
}

impl SettingsOverrides {
    fn apply(&self, settings: &mut SimulationSettings) {
        if let Some(width) = self.world_width {
            settings.world_width = width;
        }
        if let Some(height) = self.world_height {
            settings.world_height = height;
        }
        if let Some(count) = self.boid_count {
            settings.boid_count = count;
        }
        if let Some(rate) = self.tick_rate {
            settings.tick_rate = rate;
        }
        if self.seed.is_some() {
            settings.seed = self.seed;
        }
        if self.attractor.is_some() {
            settings.attractor = self.attractor;
        }
    }
}

/// Defaults, then the optional JSON file, then the overrides.
pub fn resolve_settings(
    config_path: Option<&Path>,
    overrides: &SettingsOverrides,
) -> Result<SimulationSettings> {
    let mut settings = match config_path {
        Some(path) => {
            log::info!("Loading settings from {}", path.display());
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read settings file {}", path.display()))?;
            SimulationSettings::from_json_str(&json)
                .with_context(|| format!("Invalid settings file {}", path.display()))?
        }
        None => SimulationSettings::default(),
    };

    overrides.apply(&mut settings);
    settings.validate().context("Invalid simulation settings")?;

    Ok(settings)
}

/// Seeds the initial population and builds the simulation.
///
/// Without a configured seed one is drawn from entropy and logged so the run
/// can be reproduced.
pub fn build_simulation(settings: &SimulationSettings) -> FlockSimulation {
    let seed = settings.seed.unwrap_or_else(|| rand::thread_rng().gen());
    log::info!("Seeding {} boids with seed {}", settings.boid_count, seed);

    let bounds = Bounds::new(settings.world_width, settings.world_height);
    let attractor = settings.attractor_or_center();
    let mut rng = StdRng::seed_from_u64(seed);

    FlockSimulation::seeded(bounds, settings.boid_count, &mut rng)
        .with_attractor(Vector2D::new(attractor.x, attractor.y))
}
