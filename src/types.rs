use std::fmt;

/// Position and yaw setpoint in the local north-east-down frame.
///
/// Down is positive towards the ground, so flying at 5 m means `down_m = -5.0`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PositionNedYaw {
    pub north_m: f32,
    pub east_m: f32,
    pub down_m: f32,
    pub yaw_deg: f32,
}

impl PositionNedYaw {
    pub const fn new(north_m: f32, east_m: f32, down_m: f32, yaw_deg: f32) -> Self {
        Self { north_m, east_m, down_m, yaw_deg }
    }

    pub(crate) fn is_finite(&self) -> bool {
        self.north_m.is_finite()
            && self.east_m.is_finite()
            && self.down_m.is_finite()
            && self.yaw_deg.is_finite()
    }
}

impl fmt::Display for PositionNedYaw {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "N {:.2} m, E {:.2} m, D {:.2} m, yaw {:.1}°",
            self.north_m, self.east_m, self.down_m, self.yaw_deg
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PositionNed {
    pub north_m: f32,
    pub east_m: f32,
    pub down_m: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct VelocityNed {
    pub north_m_s: f32,
    pub east_m_s: f32,
    pub down_m_s: f32,
}

/// One sample of the local position/velocity stream.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PositionVelocityNed {
    pub position: PositionNed,
    pub velocity: VelocityNed,
}

/// One sample of the attitude stream, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EulerAngle {
    pub roll_deg: f32,
    pub pitch_deg: f32,
    pub yaw_deg: f32,
    pub timestamp_us: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConnectionState {
    pub is_connected: bool,
}

/// Global position fix, used as the "position lock" signal before flying.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GlobalPosition {
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    pub absolute_altitude_m: f32,
    pub relative_altitude_m: f32,
}
