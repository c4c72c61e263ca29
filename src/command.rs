use embedded_can::Frame;

use crate::canopen::{send_expedited_rpdo, transmit_frame, CanBus};
use crate::constant::{
    RPDO_AMPS_OFFSET, RPDO_COMMAND_AMPS, RPDO_COMMAND_POSITION, RPDO_COMMAND_SPEED,
    RPDO_LEGACY_SPEED_CONTROL, RPDO_MOTOR_CONTROL, RPDO_POSITION_OFFSET, RPDO_SPEED_OFFSET,
};
use crate::controller::{MotorController, OperationMode, ProtocolVersion};
use crate::error;
use crate::prelude::*;
use crate::timer::IntervalTimer;
use crate::util::{get_high, get_low};
use crate::value::WireValue;

impl<T: IntervalTimer> MotorController<T> {
    /// Emits one command frame encoding the current mode and setpoint, in the
    /// wire format the configured protocol version dictates. Undefined mode
    /// emits nothing.
    pub(crate) fn send_rpdo_for_current_mode<CAN>(&self, can: &mut CAN)
    where
        CAN: CanBus,
        CAN::Frame: Frame + Debug,
    {
        match self.config.protocol_version {
            ProtocolVersion::Legacy => self.send_rpdo_legacy(can),
            ProtocolVersion::CanOpen20 => self.send_rpdo_2_0(can),
        }
    }

    fn send_rpdo_2_0<CAN>(&self, can: &mut CAN)
    where
        CAN: CanBus,
        CAN::Frame: Frame + Debug,
    {
        let res = match self.operation_mode {
            OperationMode::Undefined => return,
            OperationMode::Position(position) => send_expedited_rpdo(
                can,
                self.config.node_id,
                RPDO_MOTOR_CONTROL,
                RPDO_COMMAND_POSITION,
                RPDO_POSITION_OFFSET,
                WireValue::from(position),
            ),
            OperationMode::Speed(speed) => send_expedited_rpdo(
                can,
                self.config.node_id,
                RPDO_MOTOR_CONTROL,
                RPDO_COMMAND_SPEED,
                RPDO_SPEED_OFFSET,
                WireValue::from(speed),
            ),
            OperationMode::Amps(amps) => send_expedited_rpdo(
                can,
                self.config.node_id,
                RPDO_MOTOR_CONTROL,
                RPDO_COMMAND_AMPS,
                RPDO_AMPS_OFFSET,
                WireValue::from(amps),
            ),
        };
        if let Err(err) = res {
            error!("node {}: failed to send command frame: {:?}", self.config.node_id, err);
        }
    }

    fn send_rpdo_legacy<CAN>(&self, can: &mut CAN)
    where
        CAN: CanBus,
        CAN::Frame: Frame + Debug,
    {
        match self.operation_mode {
            OperationMode::Undefined => {}
            OperationMode::Position(position) => {
                self.send_legacy_command(can, RPDO_MOTOR_CONTROL, position);
            }
            OperationMode::Speed(speed) => {
                // Servo drives take speed on the dedicated legacy channel;
                // chassis drives (no encoder) share the motor-control channel.
                let channel = if self.config.position_encoder_available {
                    RPDO_LEGACY_SPEED_CONTROL
                } else {
                    RPDO_MOTOR_CONTROL
                };
                self.send_legacy_command(can, channel, speed as u16);
            }
            OperationMode::Amps(_) => {
                // set_amps_command rejects this combination and configure
                // resets the mode, so a Legacy controller cannot reach here.
                unreachable!("amps mode is not supported by the legacy protocol");
            }
        }
    }

    fn send_legacy_command<CAN>(&self, can: &mut CAN, channel: u16, setpoint: u16)
    where
        CAN: CanBus,
        CAN::Frame: Frame + Debug,
    {
        let mut payload = [0u8; 8];
        payload[0] = get_low(setpoint);
        payload[1] = get_high(setpoint);
        // the drive's legacy decoder reads its own node id back from byte 4
        // and drops frames that leave it empty
        payload[4] = self.config.node_id;
        let cob_id = channel + self.config.node_id as u16;
        if let Err(err) = transmit_frame(can, cob_id, &payload) {
            error!("node {}: failed to send legacy command frame: {:?}", self.config.node_id, err);
        }
    }
}
