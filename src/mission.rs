use tokio::time::Duration;

use crate::errors::{PilotError, Result};
use crate::types::PositionNedYaw;

const TAKEOFF_DWELL: Duration = Duration::from_secs(5);
const WAYPOINT_DWELL: Duration = Duration::from_secs(3);

/// A setpoint plus how long to hold it before moving on.
#[derive(Debug, Clone, PartialEq)]
pub struct Waypoint {
    pub label: String,
    pub target: PositionNedYaw,
    pub dwell: Duration,
}

impl Waypoint {
    pub fn new(label: impl Into<String>, target: PositionNedYaw, dwell: Duration) -> Self {
        Self { label: label.into(), target, dwell }
    }
}

/// Takeoff height followed by an ordered list of waypoints.
///
/// Waypoints are flown strictly in order; the dwell time stands in for
/// "arrived", nothing checks the actual position.
#[derive(Debug, Clone, PartialEq)]
pub struct Mission {
    pub takeoff_altitude_m: f32,
    pub takeoff_dwell: Duration,
    pub waypoints: Vec<Waypoint>,
}

impl Mission {
    /// Take off to `altitude_m`, then fly a `side_m` square forward, right,
    /// back and left, ending above the start.
    pub fn square(altitude_m: f32, side_m: f32) -> Self {
        let down = -altitude_m;
        let corner = |label: String, north, east| {
            Waypoint::new(label, PositionNedYaw::new(north, east, down, 0.0), WAYPOINT_DWELL)
        };

        Self {
            takeoff_altitude_m: altitude_m,
            takeoff_dwell: TAKEOFF_DWELL,
            waypoints: vec![
                corner(format!("Move forward {side_m} m"), side_m, 0.0),
                corner(format!("Move right {side_m} m"), side_m, side_m),
                corner(format!("Move backward {side_m} m"), 0.0, side_m),
                corner(format!("Move left {side_m} m"), 0.0, 0.0),
            ],
        }
    }

    /// First setpoint, sent before offboard mode may be started.
    pub fn takeoff_setpoint(&self) -> PositionNedYaw {
        PositionNedYaw::new(0.0, 0.0, -self.takeoff_altitude_m, 0.0)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.takeoff_altitude_m.is_finite() && self.takeoff_altitude_m > 0.0) {
            return Err(invalid(format!(
                "takeoff altitude must be positive, got {}",
                self.takeoff_altitude_m
            )));
        }
        if self.waypoints.is_empty() {
            return Err(invalid("no waypoints".to_string()));
        }
        if let Some(w) = self.waypoints.iter().find(|w| !w.target.is_finite()) {
            return Err(invalid(format!("waypoint \"{}\" is not finite", w.label)));
        }
        Ok(())
    }
}

impl Default for Mission {
    fn default() -> Self {
        Self::square(5.0, 2.0)
    }
}

fn invalid(msg: String) -> PilotError {
    PilotError::InvalidMission { msg }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_square() {
        let mission = Mission::default();
        assert_eq!(mission.takeoff_setpoint(), PositionNedYaw::new(0.0, 0.0, -5.0, 0.0));
        assert_eq!(mission.takeoff_dwell, Duration::from_secs(5));

        let targets: Vec<_> = mission.waypoints.iter().map(|w| w.target).collect();
        assert_eq!(
            targets,
            vec![
                PositionNedYaw::new(2.0, 0.0, -5.0, 0.0),
                PositionNedYaw::new(2.0, 2.0, -5.0, 0.0),
                PositionNedYaw::new(0.0, 2.0, -5.0, 0.0),
                PositionNedYaw::new(0.0, 0.0, -5.0, 0.0),
            ]
        );
        assert!(mission.waypoints.iter().all(|w| w.dwell == Duration::from_secs(3)));
        assert_eq!(mission.waypoints[0].label, "Move forward 2 m");
        mission.validate().unwrap();
    }

    #[test]
    fn rejects_bad_missions() {
        let mut mission = Mission::default();
        mission.takeoff_altitude_m = 0.0;
        assert!(matches!(mission.validate(), Err(PilotError::InvalidMission { .. })));

        let mut mission = Mission::default();
        mission.waypoints.clear();
        assert!(mission.validate().is_err());

        let mut mission = Mission::default();
        mission.waypoints[2].target.east_m = f32::NAN;
        let err = mission.validate().unwrap_err();
        assert!(err.to_string().contains("Move backward"));
    }
}
