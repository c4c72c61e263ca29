use embedded_can::Frame;

use crate::canopen::{split_cob_id, CanBus};
use crate::constant::{
    TPDO_MOTOR_TELEMETRY_1, TPDO_MOTOR_TELEMETRY_2, TPDO_MOTOR_TELEMETRY_3,
    TPDO_MOTOR_TELEMETRY_4,
};
use crate::error::ErrorCode;
use crate::prelude::*;
use crate::telemetry::Telemetry;
use crate::timer::IntervalTimer;
use crate::{info, warn};

/// Wire format generation spoken by the drive. Fixed at configure time and
/// matched exhaustively; there is no "unknown version" at runtime.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum ProtocolVersion {
    Legacy,
    CanOpen20,
}

/// Bus-health axis of the controller, independent of the commanded mode.
/// Changes based on the telemetry healthcheck timer and transport
/// connectivity, never on commands.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum TelemetryState {
    NoTelemetry,
    TelemetryComing,
}

/// Commanded operation mode carrying its validated setpoint.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum OperationMode {
    Undefined,
    Position(u16),
    Speed(i16),
    Amps(i16),
}

/// Static per-drive configuration. Set through [`MotorController::configure`]
/// (typically from a device profile, see [`crate::profile`]) and read-only to
/// the controller's own logic afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MotorConfig {
    /// CANopen node id, 1..=127; id 0 means "not configured yet" and such a
    /// controller is never operational.
    pub node_id: u8,
    pub protocol_version: ProtocolVersion,
    /// Chassis drives have no position encoder; this changes both the legacy
    /// speed-command channel and the primary telemetry layout.
    pub position_encoder_available: bool,
    pub rpdo_interval_us: u64,
    pub healthcheck_timeout_us: u64,
    pub min_position_limit: u16,
    pub max_position_limit: u16,
    pub min_speed_limit: i16,
    pub max_speed_limit: i16,
    pub min_amps_limit: i16,
    pub max_amps_limit: i16,
}

impl Default for MotorConfig {
    fn default() -> Self {
        MotorConfig {
            node_id: 0,
            protocol_version: ProtocolVersion::CanOpen20,
            position_encoder_available: false,
            rpdo_interval_us: 0,
            healthcheck_timeout_us: 0,
            min_position_limit: 0,
            max_position_limit: 0,
            min_speed_limit: 0,
            max_speed_limit: 0,
            min_amps_limit: 0,
            max_amps_limit: 0,
        }
    }
}

/// Controller for one motor drive on the bus.
///
/// The controller owns its configuration, telemetry snapshot, mode and
/// timers, but never the transport: both entry points (`execute` and
/// `process_canbus_callback`) borrow the bus per call, so any number of
/// controllers can share one physical bus (see [`crate::group`]).
///
/// The two entry points mutate shared controller state without internal
/// locking; a multi-threaded host must serialize calls into one controller
/// instance. Distinct controller instances are fully independent.
pub struct MotorController<T: IntervalTimer> {
    pub(crate) config: MotorConfig,
    pub(crate) state: TelemetryState,
    pub(crate) operation_mode: OperationMode,
    pub(crate) rpdo_timer: T,
    pub(crate) healthcheck_timer: T,
    pub(crate) telemetry: Telemetry,
    pub(crate) fault_ack_counter: usize,
}

impl<T: IntervalTimer> MotorController<T> {
    pub fn new(rpdo_timer: T, healthcheck_timer: T) -> Self {
        MotorController {
            config: MotorConfig::default(),
            state: TelemetryState::NoTelemetry,
            operation_mode: OperationMode::Undefined,
            rpdo_timer,
            healthcheck_timer,
            telemetry: Telemetry::default(),
            fault_ack_counter: 0,
        }
    }

    /// (Re)configures the controller. Telemetry state, operation mode and the
    /// fault counter are re-initialized: a reconfigured controller waits for
    /// fresh telemetry before it commands anything.
    pub fn configure(&mut self, config: MotorConfig) {
        self.rpdo_timer.set_interval(config.rpdo_interval_us);
        self.healthcheck_timer.set_interval(config.healthcheck_timeout_us);
        // the real value is undefined until the first telemetry frame
        self.telemetry = Telemetry::default();
        self.telemetry.position = config.min_position_limit;
        self.config = config;
        self.reset_to_initial_state();
    }

    /// Adjusts both timer intervals without resetting the controller.
    pub fn change_timeouts(&mut self, rpdo_interval_us: u64, healthcheck_timeout_us: u64) {
        self.config.rpdo_interval_us = rpdo_interval_us;
        self.config.healthcheck_timeout_us = healthcheck_timeout_us;
        self.rpdo_timer.set_interval(rpdo_interval_us);
        self.healthcheck_timer.set_interval(healthcheck_timeout_us);
    }

    pub fn state(&self) -> TelemetryState {
        self.state
    }

    pub fn operation_mode(&self) -> OperationMode {
        self.operation_mode
    }

    pub fn node_id(&self) -> u8 {
        self.config.node_id
    }

    pub fn is_operational(&self) -> bool {
        self.state == TelemetryState::TelemetryComing && self.config.node_id != 0
    }

    pub fn is_position_encoder_available(&self) -> bool {
        self.config.position_encoder_available
    }

    pub fn fault_ack_counter(&self) -> usize {
        self.fault_ack_counter
    }

    pub fn position_telemetry(&self) -> Result<u16, ErrorCode> {
        self.telemetry_guard()?;
        Ok(self.telemetry.position)
    }

    pub fn speed_telemetry(&self) -> Result<i16, ErrorCode> {
        self.telemetry_guard()?;
        Ok(self.telemetry.speed)
    }

    pub fn amps_telemetry(&self) -> Result<i16, ErrorCode> {
        self.telemetry_guard()?;
        Ok(self.telemetry.amps)
    }

    pub fn status_telemetry(&self) -> Result<u16, ErrorCode> {
        self.telemetry_guard()?;
        Ok(self.telemetry.status)
    }

    /// Combined fault/status word, reported on the legacy protocol only.
    pub fn faults_telemetry(&self) -> Result<u16, ErrorCode> {
        self.telemetry_guard()?;
        Ok(self.telemetry.faults)
    }

    fn telemetry_guard(&self) -> Result<(), ErrorCode> {
        if self.state != TelemetryState::TelemetryComing {
            return Err(ErrorCode::TelemetryNotAvailable);
        }
        Ok(())
    }

    /// Switches to position mode. The setpoint is validated against the
    /// configured limits before any state changes.
    pub fn set_position_command(&mut self, position: u16) -> Result<(), ErrorCode> {
        if position < self.config.min_position_limit
            || position > self.config.max_position_limit
        {
            return Err(ErrorCode::SetpointOutOfLimits {
                setpoint: position as i32,
                min: self.config.min_position_limit as i32,
                max: self.config.max_position_limit as i32,
            });
        }
        self.operation_mode = OperationMode::Position(position);
        Ok(())
    }

    pub fn set_speed_command(&mut self, speed: i16) -> Result<(), ErrorCode> {
        if speed < self.config.min_speed_limit || speed > self.config.max_speed_limit {
            return Err(ErrorCode::SetpointOutOfLimits {
                setpoint: speed as i32,
                min: self.config.min_speed_limit as i32,
                max: self.config.max_speed_limit as i32,
            });
        }
        self.operation_mode = OperationMode::Speed(speed);
        Ok(())
    }

    /// Switches to amps (torque) mode. The legacy protocol has no amps
    /// command, so the combination is rejected here, before any mutation.
    pub fn set_amps_command(&mut self, amps: i16) -> Result<(), ErrorCode> {
        if self.config.protocol_version == ProtocolVersion::Legacy {
            return Err(ErrorCode::ModeNotSupported { mode: "amps" });
        }
        if amps < self.config.min_amps_limit || amps > self.config.max_amps_limit {
            return Err(ErrorCode::SetpointOutOfLimits {
                setpoint: amps as i32,
                min: self.config.min_amps_limit as i32,
                max: self.config.max_amps_limit as i32,
            });
        }
        self.operation_mode = OperationMode::Amps(amps);
        Ok(())
    }

    /// Halts RPDO emission without touching the telemetry state.
    pub fn set_undefined_command(&mut self) {
        self.operation_mode = OperationMode::Undefined;
    }

    /// Periodic tick. Call on a fixed period from the orchestration loop.
    pub fn execute<CAN>(&mut self, can: &mut CAN)
    where
        CAN: CanBus,
        CAN::Frame: Frame + Debug,
    {
        // Reaction to CANbus problems
        if !can.is_connected() {
            if self.state == TelemetryState::TelemetryComing {
                warn!("node {}: CAN transport disconnected", self.config.node_id);
            }
            self.reset_to_initial_state();
        }

        // The healthcheck timer is re-armed by incoming telemetry frames
        // only, never by the tick itself.
        if self.healthcheck_timer.check() && self.state == TelemetryState::TelemetryComing {
            warn!("node {}: telemetry timed out", self.config.node_id);
            self.reset_to_initial_state();
        }

        // Command emission. The timer re-arms on every expiry; frames only go
        // out while telemetry confirms the drive is alive.
        if self.rpdo_timer.check_and_restart()
            && self.state == TelemetryState::TelemetryComing
            && can.is_connected()
        {
            self.send_rpdo_for_current_mode(can);
        }
    }

    /// Ingests one received frame. Returns `Ok(false)` when the frame belongs
    /// to a different node (another controller on the same bus may consume
    /// it) or to an unknown function code.
    pub fn process_canbus_callback<CAN>(
        &mut self,
        can: &mut CAN,
        payload: &[u8],
        source_cob_id: u16,
        _timestamp_us: u64,
    ) -> Result<bool, ErrorCode>
    where
        CAN: CanBus,
        CAN::Frame: Frame + Debug,
    {
        let (function_code, node_id) = split_cob_id(source_cob_id)?;
        if node_id != self.config.node_id {
            return Ok(false);
        }
        match function_code {
            TPDO_MOTOR_TELEMETRY_1 => {
                self.parse_primary_telemetry(payload);
                self.process_faults(can);
                self.healthcheck_timer.restart();
                if self.state != TelemetryState::TelemetryComing {
                    info!("node {}: telemetry is coming", self.config.node_id);
                }
                // Any frame on this channel is proof of life, fault bits or not.
                self.state = TelemetryState::TelemetryComing;
                Ok(true)
            }
            TPDO_MOTOR_TELEMETRY_2 => {
                self.parse_secondary_telemetry(payload)?;
                Ok(true)
            }
            TPDO_MOTOR_TELEMETRY_3 => {
                self.parse_tertiary_telemetry(payload);
                Ok(true)
            }
            TPDO_MOTOR_TELEMETRY_4 => {
                // Reserved channel; consumed so nothing upstream retriggers on it.
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Emergency stop: best effort under all circumstances.
    ///
    /// With telemetry coming, the current mode is re-issued with a
    /// neutralized setpoint; without telemetry the mode falls back to
    /// Undefined and the drive is expected to time out its last command.
    /// Either way one command frame goes out immediately if the bus is up;
    /// over an unplugged bus the stop cannot be delivered.
    pub fn halt<CAN>(&mut self, can: &mut CAN)
    where
        CAN: CanBus,
        CAN::Frame: Frame + Debug,
    {
        if self.state == TelemetryState::TelemetryComing {
            match self.operation_mode {
                OperationMode::Position(_) => {
                    // Hold at the last reported position so a later re-enable
                    // does not jump.
                    self.operation_mode = OperationMode::Position(self.telemetry.position);
                }
                OperationMode::Speed(_) => {
                    self.operation_mode = OperationMode::Speed(0);
                }
                OperationMode::Amps(_) => {
                    self.operation_mode = OperationMode::Amps(0);
                }
                OperationMode::Undefined => {
                    // Nothing is moving under this contract. Can still happen
                    // right after a process restart while the motor spins; the
                    // drive then times out on its own.
                }
            }
        } else {
            // No telemetry; stop commanding and let the drive time out.
            self.set_undefined_command();
        }

        // At least once, without waiting for the RPDO timer.
        if can.is_connected() {
            self.send_rpdo_for_current_mode(can);
        } else {
            warn!("node {}: halt requested while disconnected", self.config.node_id);
        }
    }

    pub(crate) fn reset_to_initial_state(&mut self) {
        // stop sending RPDOs, wait for telemetry to come back
        self.operation_mode = OperationMode::Undefined;
        self.state = TelemetryState::NoTelemetry;
        self.fault_ack_counter = 0;
    }
}
