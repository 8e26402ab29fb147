use thiserror::Error;

use crate::camera::CameraStatus;

#[derive(Error, Debug)]
pub enum PilotError {
    #[error("failed to connect to {address} - {msg}")]
    Connection { address: String, msg: String },

    #[error("not connected")]
    NotConnected,

    #[error("{action} failed - {msg}")]
    Command { action: &'static str, msg: String },

    #[error("offboard start rejected - {reason}")]
    OffboardRejected { reason: String },

    #[error("{stream} telemetry ended")]
    TelemetryEnded { stream: &'static str },

    #[error("invalid mission - {msg}")]
    InvalidMission { msg: String },

    #[error("camera open failed - {status}")]
    CameraOpen { status: CameraStatus },

    #[error("camera {action} failed - {status}")]
    Camera { action: &'static str, status: CameraStatus },

    #[error("malformed {what} buffer - {msg}")]
    Buffer { what: &'static str, msg: String },

    #[error("display error - {msg}")]
    Display { msg: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T, E = PilotError> = std::result::Result<T, E>;
