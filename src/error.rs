use core::fmt::Formatter;
use crate::prelude::*;

#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum ErrorCode {
    InvalidPayloadWidth { width: u8 },
    PayloadOffsetOverflow { offset: u8, width: u8 },
    CobIdOutOfRange { cob_id: u16 },
    InvalidStandardId { cob_id: u16 },
    FrameCreationFailed { data: Vec<u8> },
    TransmitFailed { cob_id: u16 },
    SetpointOutOfLimits { setpoint: i32, min: i32, max: i32 },
    ModeNotSupported { mode: &'static str },
    TelemetryNotAvailable,
    UnexpectedTelemetryFrame,
    ProfileSectionFailed { section_name: String, more_info: String },
}

impl Debug for ErrorCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCode::InvalidPayloadWidth { width } =>
                write!(f, "Invalid payload width: {} (only 1, 2 or 4 bytes fit an expedited transfer)", width),
            ErrorCode::PayloadOffsetOverflow { offset, width } =>
                write!(f, "Payload offset overflow: offset {} + width {} exceeds 8 bytes", offset, width),
            ErrorCode::CobIdOutOfRange { cob_id } =>
                write!(f, "COB-ID out of 11-bit range: {:#x}", cob_id),
            ErrorCode::InvalidStandardId { cob_id } =>
                write!(f, "Invalid Standard ID: {}", cob_id),
            ErrorCode::FrameCreationFailed { data } =>
                write!(f, "Frame creation failed, data: {:x?}", data),
            ErrorCode::TransmitFailed { cob_id } =>
                write!(f, "Transmit to {:#x} failed", cob_id),
            ErrorCode::SetpointOutOfLimits { setpoint, min, max } =>
                write!(f, "Setpoint {} outside configured limits [{}, {}]", setpoint, min, max),
            ErrorCode::ModeNotSupported { mode } =>
                write!(f, "Mode '{}' is not supported by the configured protocol version", mode),
            ErrorCode::TelemetryNotAvailable =>
                write!(f, "Telemetry values are undefined while no telemetry is coming"),
            ErrorCode::UnexpectedTelemetryFrame =>
                write!(f, "Secondary telemetry frame from a drive without a position encoder"),
            ErrorCode::ProfileSectionFailed { section_name, more_info } =>
                write!(f, "Processed profile section failed, section_name: {:?}, more info: {:?}",
                section_name, more_info),
        }
    }
}
