use embedded_can::Frame;

use crate::canopen::{send_expedited_rpdo, CanBus};
use crate::constant::{
    RPDO_COMMAND_FAULT_ACK, RPDO_FAULT_ACK_OFFSET, RPDO_MOTOR_CONTROL, STATUS_FAULT_FLAGS_MASK,
};
use crate::controller::{MotorController, ProtocolVersion};
use crate::prelude::*;
use crate::timer::IntervalTimer;
use crate::value::WireValue;
use crate::{error, warn};

impl<T: IntervalTimer> MotorController<T> {
    /// Reacts to fault bits reported in the primary telemetry status word.
    /// Faults are recoverable by protocol design: they are acknowledged
    /// automatically and counted, never escalated to the caller.
    pub(crate) fn process_faults<CAN>(&mut self, can: &mut CAN)
    where
        CAN: CanBus,
        CAN::Frame: Frame + Debug,
    {
        match self.config.protocol_version {
            ProtocolVersion::Legacy => {
                // the legacy protocol has no fault-acknowledgment handshake
            }
            ProtocolVersion::CanOpen20 => self.process_faults_2_0(can),
        }
    }

    fn process_faults_2_0<CAN>(&mut self, can: &mut CAN)
    where
        CAN: CanBus,
        CAN::Frame: Frame + Debug,
    {
        let fault_flags = self.telemetry.status & STATUS_FAULT_FLAGS_MASK;
        if fault_flags == 0 {
            return;
        }
        if !can.is_connected() {
            return;
        }
        warn!("node {}: drive reports fault flags {:#06x}, acknowledging",
            self.config.node_id, fault_flags);
        // the ack command carries a dummy one-byte payload
        match send_expedited_rpdo(
            can,
            self.config.node_id,
            RPDO_MOTOR_CONTROL,
            RPDO_COMMAND_FAULT_ACK,
            RPDO_FAULT_ACK_OFFSET,
            WireValue::U8(0),
        ) {
            Ok(()) => self.fault_ack_counter += 1,
            Err(err) => {
                error!("node {}: failed to send fault ack: {:?}", self.config.node_id, err);
            }
        }
    }
}
