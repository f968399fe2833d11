//! Car control state

use serde::{Deserialize, Serialize};

/// Who drives a car
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ControlType {
    /// Controls are set from outside (keyboard, scripted input)
    Keys,
    /// Controls come from the car's brain every tick
    #[default]
    Ai,
    /// Always drives forward, no sensors
    Dummy,
}

/// Pedal and steering state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Controls {
    pub forward: bool,
    pub left: bool,
    pub right: bool,
    pub reverse: bool,
}

impl Controls {
    pub fn new(control_type: ControlType) -> Self {
        Self {
            forward: control_type == ControlType::Dummy,
            ..Self::default()
        }
    }

    /// Map network outputs `[forward, left, right, reverse]`; missing
    /// outputs read as released
    pub fn from_outputs(outputs: &[f64]) -> Self {
        let pressed = |i: usize| outputs.get(i).is_some_and(|&v| v > 0.0);
        Self {
            forward: pressed(0),
            left: pressed(1),
            right: pressed(2),
            reverse: pressed(3),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dummy_drives_forward() {
        assert!(Controls::new(ControlType::Dummy).forward);
        assert_eq!(Controls::new(ControlType::Ai), Controls::default());
    }

    #[test]
    fn test_from_outputs() {
        let c = Controls::from_outputs(&[1.0, 0.0, 1.0, 0.0]);
        assert!(c.forward && c.right && !c.left && !c.reverse);
        assert_eq!(Controls::from_outputs(&[1.0]), Controls { forward: true, ..Default::default() });
    }
}
