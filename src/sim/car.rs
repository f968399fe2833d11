//! Car kinematics and damage
//!
//! Simplified arcade model: pedal acceleration, constant friction, fixed
//! turn rate. Heading 0 faces -y; positive headings turn left.

use std::f64::consts::PI;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::controls::{ControlType, Controls};
use super::network::NeuralNetwork;
use super::sensor::{Sensor, SensorTargets};
use crate::consts::CONTROL_OUTPUTS;
use crate::error::{Result, SimError};
use crate::geometry::{Point, Polygon, Segment};
use crate::settings::{CarSettings, Settings};

/// Tuning fields missing from a saved car fall back to [`CarSettings`] defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Car {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub angle: f64,
    pub speed: f64,

    #[serde(default = "default_acceleration")]
    pub acceleration: f64,
    #[serde(default = "default_friction")]
    pub friction: f64,
    #[serde(default = "default_max_speed")]
    pub max_speed: f64,
    #[serde(default = "default_turn_rate")]
    pub turn_rate: f64,

    #[serde(default)]
    pub control_type: ControlType,
    #[serde(default)]
    pub controls: Controls,
    /// Append `speed / max_speed` to the brain inputs
    #[serde(default)]
    pub speed_input: bool,

    #[serde(default)]
    sensors: Vec<Sensor>,
    brain: Option<NeuralNetwork>,

    damaged: bool,
    /// Distance driven while undamaged
    #[serde(default)]
    pub fitness: f64,
    /// Fraction of the corridor covered, when racing one
    #[serde(default)]
    pub progress: f64,
    #[serde(default)]
    pub finish_tick: Option<u64>,
    #[serde(skip)]
    polygon: Option<Polygon>,
}

fn default_acceleration() -> f64 {
    CarSettings::default().acceleration
}

fn default_friction() -> f64 {
    CarSettings::default().friction
}

fn default_max_speed() -> f64 {
    CarSettings::default().max_speed
}

fn default_turn_rate() -> f64 {
    CarSettings::default().turn_rate
}

impl Car {
    pub fn new(position: Point, angle: f64, settings: &CarSettings, control_type: ControlType) -> Self {
        let max_speed = if control_type == ControlType::Dummy {
            settings.traffic_max_speed
        } else {
            settings.max_speed
        };
        let mut car = Self {
            x: position.x,
            y: position.y,
            width: settings.width,
            height: settings.height,
            angle,
            speed: 0.0,
            acceleration: settings.acceleration,
            friction: settings.friction,
            max_speed,
            turn_rate: settings.turn_rate,
            control_type,
            controls: Controls::new(control_type),
            speed_input: settings.speed_input,
            sensors: Vec::new(),
            brain: None,
            damaged: false,
            fitness: 0.0,
            progress: 0.0,
            finish_tick: None,
            polygon: None,
        };
        car.polygon = Some(car.create_polygon());
        car
    }

    /// Car with one sensor and, for AI drivers, a fresh random brain sized
    /// from `settings`
    pub fn from_settings<R: Rng + ?Sized>(
        position: Point,
        angle: f64,
        control_type: ControlType,
        settings: &Settings,
        rng: &mut R,
    ) -> Result<Self> {
        let mut car = Self::new(position, angle, &settings.car, control_type);
        if control_type == ControlType::Dummy {
            return Ok(car);
        }
        car.add_sensor(Sensor::from_settings(&settings.sensor));
        if control_type == ControlType::Ai {
            let brain = NeuralNetwork::new(&settings.brain_topology(), rng)?;
            car.set_brain(brain)?;
        }
        Ok(car)
    }

    #[inline]
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    #[inline]
    pub fn damaged(&self) -> bool {
        self.damaged
    }

    #[inline]
    pub fn sensors(&self) -> &[Sensor] {
        &self.sensors
    }

    #[inline]
    pub fn brain(&self) -> Option<&NeuralNetwork> {
        self.brain.as_ref()
    }

    /// Current hit-box
    pub fn polygon(&self) -> Polygon {
        self.polygon.clone().unwrap_or_else(|| self.create_polygon())
    }

    /// Adding a sensor changes the brain input count; call before
    /// [`Car::set_brain`]
    pub fn add_sensor(&mut self, sensor: Sensor) {
        self.sensors.push(sensor);
    }

    /// Number of values fed to the brain each tick
    pub fn input_count(&self) -> usize {
        self.sensors.iter().map(|s| s.ray_count).sum::<usize>() + usize::from(self.speed_input)
    }

    /// Install a brain whose input layer matches this car's sensors
    pub fn set_brain(&mut self, brain: NeuralNetwork) -> Result<()> {
        Self::check_brain(&brain, self.input_count())?;
        self.brain = Some(brain);
        Ok(())
    }

    pub fn take_brain(&mut self) -> Option<NeuralNetwork> {
        self.brain.take()
    }

    /// Check a deserialized car: brain inputs must match its sensors
    pub(crate) fn validate(&self) -> Result<()> {
        match &self.brain {
            Some(brain) => Self::check_brain(brain, self.input_count()),
            None => Ok(()),
        }
    }

    /// Inputs must match the car's sensors, outputs the four pedals
    fn check_brain(brain: &NeuralNetwork, inputs: usize) -> Result<()> {
        if brain.input_count() != inputs {
            return Err(SimError::NetworkShape {
                expected: brain.input_count(),
                actual: inputs,
            });
        }
        if brain.output_count() != CONTROL_OUTPUTS {
            return Err(SimError::NetworkShape {
                expected: CONTROL_OUTPUTS,
                actual: brain.output_count(),
            });
        }
        Ok(())
    }

    /// Advance one tick against the given world geometry
    pub fn update(&mut self, targets: &SensorTargets<'_>) {
        if !self.damaged {
            self.apply_motion();
            self.fitness += self.speed;
            let polygon = self.create_polygon();
            self.damaged = Self::assess_damage(&polygon, targets.borders, targets.traffic);
            self.polygon = Some(polygon);
        }

        if self.sensors.is_empty() {
            return;
        }
        let origin = self.position();
        for sensor in &mut self.sensors {
            sensor.update(origin, self.angle, targets);
        }

        if self.control_type != ControlType::Ai {
            return;
        }
        if let Some(brain) = &self.brain {
            let outputs = brain.feed_forward(&self.brain_inputs());
            self.controls = Controls::from_outputs(&outputs);
        }
    }

    /// Sensor closeness of every sensor in order, then the optional speed
    pub fn brain_inputs(&self) -> Vec<f64> {
        let mut inputs: Vec<f64> = self.sensors.iter().flat_map(Sensor::closeness).collect();
        if self.speed_input {
            let ratio = if self.max_speed > 0.0 {
                self.speed / self.max_speed
            } else {
                0.0
            };
            inputs.push(ratio);
        }
        inputs
    }

    fn assess_damage(polygon: &Polygon, borders: &[Segment], traffic: &[Polygon]) -> bool {
        borders.iter().any(|b| polygon.intersects_segment(b))
            || traffic.iter().any(|t| polygon.intersects_poly(t))
    }

    /// Four corners from the circumradius around the center
    fn create_polygon(&self) -> Polygon {
        let rad = self.width.hypot(self.height) / 2.0;
        let alpha = self.width.atan2(self.height);
        let corner = |a: f64| Point::new(self.x - a.sin() * rad, self.y - a.cos() * rad);
        Polygon::new(vec![
            corner(self.angle - alpha),
            corner(self.angle + alpha),
            corner(PI + self.angle - alpha),
            corner(PI + self.angle + alpha),
        ])
    }

    fn apply_motion(&mut self) {
        let c = self.controls;
        if c.forward {
            self.speed += self.acceleration;
        }
        if c.reverse {
            self.speed -= self.acceleration;
        }

        self.speed = self.speed.clamp(-self.max_speed / 2.0, self.max_speed);

        if self.speed > 0.0 {
            self.speed -= self.friction;
        }
        if self.speed < 0.0 {
            self.speed += self.friction;
        }
        if self.speed.abs() < self.friction {
            self.speed = 0.0;
        }

        if self.speed != 0.0 {
            let flip = if self.speed > 0.0 { 1.0 } else { -1.0 };
            if c.left {
                self.angle += self.turn_rate * flip;
            }
            if c.right {
                self.angle -= self.turn_rate * flip;
            }
        }

        self.x -= self.angle.sin() * self.speed;
        self.y -= self.angle.cos() * self.speed;
    }
}
