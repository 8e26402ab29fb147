use std::fmt;

use crate::types::PositionNedYaw;

/// A state-changing call issued to the flight controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FlightCommand {
    Arm,
    Disarm,
    SetPositionNed(PositionNedYaw),
    StartOffboard,
    StopOffboard,
    Land,
}

impl fmt::Display for FlightCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlightCommand::Arm => write!(f, "arm"),
            FlightCommand::Disarm => write!(f, "disarm"),
            FlightCommand::SetPositionNed(p) => write!(f, "set_position_ned({p})"),
            FlightCommand::StartOffboard => write!(f, "offboard_start"),
            FlightCommand::StopOffboard => write!(f, "offboard_stop"),
            FlightCommand::Land => write!(f, "land"),
        }
    }
}
