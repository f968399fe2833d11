//! Simulation settings
//!
//! Persisted as a JSON file next to the world save. Every field has a
//! default, so partial files are accepted.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts;
use crate::error::Result;
use crate::graph::OneWayConvention;
use crate::world::TreeKind;

/// Scale presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Preset {
    Small,
    #[default]
    Default,
    Large,
}

impl Preset {
    pub fn as_str(&self) -> &'static str {
        match self {
            Preset::Small => "Small",
            Preset::Default => "Default",
            Preset::Large => "Large",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "small" => Some(Preset::Small),
            "default" | "medium" => Some(Preset::Default),
            "large" => Some(Preset::Large),
            _ => None,
        }
    }

    /// Cars per generation
    pub fn population(&self) -> usize {
        match self {
            Preset::Small => 20,
            Preset::Default => 100,
            Preset::Large => 500,
        }
    }

    /// Rays per sensor
    pub fn ray_count(&self) -> usize {
        match self {
            Preset::Small => 3,
            Preset::Default => consts::SENSOR_RAY_COUNT,
            Preset::Large => 9,
        }
    }
}

/// World generation parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldSettings {
    pub road_width: f64,
    pub road_roundness: u32,
    pub building_width: f64,
    pub building_min_length: f64,
    pub building_height: f64,
    pub spacing: f64,
    pub tree_size: f64,
    pub tree_kind: TreeKind,
    pub tree_height: f64,
    /// Soft cap on placed trees; derived from the world bounds when unset
    pub max_tree_count: Option<usize>,
    /// Trees stay within this distance of some road or building;
    /// twice the tree size when unset
    pub tree_closeness: Option<f64>,
    /// Seed for tree placement
    pub seed: u64,
    pub one_way_convention: OneWayConvention,
}

impl Default for WorldSettings {
    fn default() -> Self {
        Self {
            road_width: consts::ROAD_WIDTH,
            road_roundness: consts::ROAD_ROUNDNESS,
            building_width: consts::BUILDING_WIDTH,
            building_min_length: consts::BUILDING_MIN_LENGTH,
            building_height: 200.0,
            spacing: consts::BUILDING_SPACING,
            tree_size: consts::TREE_SIZE,
            tree_kind: TreeKind::default(),
            tree_height: 200.0,
            max_tree_count: None,
            tree_closeness: None,
            seed: 0,
            one_way_convention: OneWayConvention::default(),
        }
    }
}

/// Car kinematics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CarSettings {
    pub width: f64,
    pub height: f64,
    pub acceleration: f64,
    pub friction: f64,
    pub max_speed: f64,
    pub turn_rate: f64,
    /// Dummy traffic top speed
    pub traffic_max_speed: f64,
    /// Feed `speed / max_speed` to the brain after the sensor readings
    pub speed_input: bool,
}

impl Default for CarSettings {
    fn default() -> Self {
        Self {
            width: consts::CAR_WIDTH,
            height: consts::CAR_HEIGHT,
            acceleration: consts::CAR_ACCELERATION,
            friction: consts::CAR_FRICTION,
            max_speed: consts::CAR_MAX_SPEED,
            turn_rate: consts::CAR_TURN_RATE,
            traffic_max_speed: 2.0,
            speed_input: false,
        }
    }
}

/// Ray fan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorSettings {
    pub ray_count: usize,
    pub ray_length: f64,
    pub ray_spread: f64,
    pub ray_offset: f64,
}

impl Default for SensorSettings {
    fn default() -> Self {
        Self {
            ray_count: consts::SENSOR_RAY_COUNT,
            ray_length: consts::SENSOR_RAY_LENGTH,
            ray_spread: consts::SENSOR_RAY_SPREAD,
            ray_offset: 0.0,
        }
    }
}

/// Training loop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvolutionSettings {
    pub population: usize,
    pub hidden_layers: Vec<usize>,
    /// Mutation amount in [0, 1]
    pub mutation: f64,
    pub ticks_per_generation: u64,
    pub generations: u32,
}

impl Default for EvolutionSettings {
    fn default() -> Self {
        Self {
            population: Preset::Default.population(),
            hidden_layers: vec![consts::HIDDEN_NEURONS],
            mutation: 0.1,
            ticks_per_generation: 2000,
            generations: 10,
        }
    }
}

/// All tunables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    pub preset: Preset,
    pub world: WorldSettings,
    pub car: CarSettings,
    pub sensor: SensorSettings,
    pub evolution: EvolutionSettings,
}

impl Settings {
    /// Create settings from a preset (applies preset defaults)
    pub fn from_preset(preset: Preset) -> Self {
        let mut settings = Self::default();
        settings.apply_preset(preset);
        settings
    }

    /// Apply a preset (updates preset-dependent settings)
    pub fn apply_preset(&mut self, preset: Preset) {
        self.preset = preset;
        self.evolution.population = preset.population();
        self.sensor.ray_count = preset.ray_count();
    }

    /// Layer sizes of a car brain: sensor inputs, hidden layers, controls
    pub fn brain_topology(&self) -> Vec<usize> {
        let inputs = self.sensor.ray_count + usize::from(self.car.speed_input);
        let mut layers = Vec::with_capacity(self.evolution.hidden_layers.len() + 2);
        layers.push(inputs);
        layers.extend_from_slice(&self.evolution.hidden_layers);
        layers.push(consts::CONTROL_OUTPUTS);
        layers
    }

    /// Load settings from a JSON file, falling back to defaults when the
    /// file does not exist
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            log::info!("No settings at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let json = fs::read_to_string(path)?;
        let settings = serde_json::from_str(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        log::info!("Settings saved to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_round_trip() {
        for preset in [Preset::Small, Preset::Default, Preset::Large] {
            assert_eq!(Preset::from_str(preset.as_str()), Some(preset));
        }
        assert_eq!(Preset::from_str("huge"), None);
    }

    #[test]
    fn test_from_preset_scales_population() {
        let small = Settings::from_preset(Preset::Small);
        let large = Settings::from_preset(Preset::Large);
        assert!(small.evolution.population < large.evolution.population);
        assert_eq!(small.sensor.ray_count, 3);
    }

    #[test]
    fn test_brain_topology() {
        let mut settings = Settings::default();
        assert_eq!(settings.brain_topology(), vec![5, 6, 4]);
        settings.car.speed_input = true;
        assert_eq!(settings.brain_topology(), vec![6, 6, 4]);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"world":{"road_width":60.0}}"#).unwrap();
        assert_eq!(settings.world.road_width, 60.0);
        assert_eq!(settings.world.road_roundness, consts::ROAD_ROUNDNESS);
        assert_eq!(settings.car, CarSettings::default());
    }

    #[test]
    fn test_missing_file_falls_back() {
        let settings = Settings::load("/nonexistent/road-evo-settings.json").unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_save_then_load() {
        let path = std::env::temp_dir().join("road_evo_settings_test.json");
        let mut settings = Settings::from_preset(Preset::Large);
        settings.world.seed = 42;
        settings.save(&path).unwrap();
        assert_eq!(Settings::load(&path).unwrap(), settings);
        let _ = std::fs::remove_file(path);
    }
}
