use crate::controller::{MotorController, ProtocolVersion};
use crate::error::ErrorCode;
use crate::timer::IntervalTimer;

/// Latest values reported by the drive. Fields are only meaningful while the
/// controller is in the `TelemetryComing` state; the public getters on the
/// controller enforce that.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Telemetry {
    pub position: u16,
    pub speed: i16,
    pub amps: i16,
    pub status: u16,
    /// combined fault/status word, legacy protocol only (telemetry 3)
    pub faults: u16,
}

impl<T: IntervalTimer> MotorController<T> {
    /// Telemetry 1, `0x180 + node`. Both protocol versions report on this
    /// channel; the layouts differ.
    pub(crate) fn parse_primary_telemetry(&mut self, payload: &[u8]) {
        match self.config.protocol_version {
            ProtocolVersion::Legacy => self.parse_primary_telemetry_legacy(payload),
            ProtocolVersion::CanOpen20 => self.parse_primary_telemetry_2_0(payload),
        }
    }

    fn parse_primary_telemetry_legacy(&mut self, payload: &[u8]) {
        if payload.len() != 8 {
            // short frame: no field extraction
            return;
        }
        // bytes 4-5 are the position for servo drives, the speed for chassis
        // drives (which carry no encoder)
        let value = u16::from_le_bytes([payload[4], payload[5]]);
        if self.config.position_encoder_available {
            self.telemetry.position = value;
        } else {
            self.telemetry.speed = value as i16;
        }
    }

    fn parse_primary_telemetry_2_0(&mut self, payload: &[u8]) {
        if payload.len() != 8 {
            return;
        }
        // fixed layout: status, position, speed, amps; 16 bits each
        self.telemetry.status = u16::from_le_bytes([payload[0], payload[1]]);
        self.telemetry.position = u16::from_le_bytes([payload[2], payload[3]]);
        self.telemetry.speed = i16::from_le_bytes([payload[4], payload[5]]);
        self.telemetry.amps = i16::from_le_bytes([payload[6], payload[7]]);
    }

    /// Telemetry 2, `0x280 + node`. Legacy servo drives report speed here;
    /// the 2.0 protocol carries no fields on this channel.
    pub(crate) fn parse_secondary_telemetry(&mut self, payload: &[u8]) -> Result<(), ErrorCode> {
        match self.config.protocol_version {
            ProtocolVersion::Legacy => {
                if !self.config.position_encoder_available {
                    // Chassis drives never emit this frame; receiving one
                    // means a misbehaving peer or a wrong device profile.
                    return Err(ErrorCode::UnexpectedTelemetryFrame);
                }
                if payload.len() == 8 {
                    self.telemetry.speed = i16::from_le_bytes([payload[4], payload[5]]);
                }
                Ok(())
            }
            ProtocolVersion::CanOpen20 => Ok(()),
        }
    }

    /// Telemetry 3, `0x380 + node`. Legacy-only combined fault/status word;
    /// a no-op under the 2.0 protocol.
    pub(crate) fn parse_tertiary_telemetry(&mut self, payload: &[u8]) {
        match self.config.protocol_version {
            ProtocolVersion::Legacy => {
                if payload.len() == 8 {
                    self.telemetry.faults = u16::from_le_bytes([payload[0], payload[1]]);
                }
            }
            ProtocolVersion::CanOpen20 => {}
        }
    }
}
