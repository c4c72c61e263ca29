#![allow(dead_code)]

use std::cell::Cell;
use std::collections::VecDeque;
use std::fmt::{self, Debug, Formatter};
use std::rc::Rc;

use embedded_can::nb::Can;
use embedded_can::{ErrorKind, Frame, Id};

use canopen_motor::canopen::CanBus;
use canopen_motor::controller::{MotorConfig, MotorController, ProtocolVersion};
use canopen_motor::timer::IntervalTimer;

#[derive(Clone, PartialEq, Eq)]
pub struct MockFrame {
    pub id: Id,
    pub data: Vec<u8>,
    pub dlc: usize,
}

impl MockFrame {
    pub fn raw_id(&self) -> u16 {
        match self.id {
            Id::Standard(sid) => sid.as_raw(),
            Id::Extended(_) => panic!("extended id in a mock frame"),
        }
    }
}

impl Frame for MockFrame {
    fn new(id: impl Into<Id>, data: &[u8]) -> Option<Self> {
        if data.len() > 8 {
            return None;
        }
        Some(MockFrame { id: id.into(), data: data.to_vec(), dlc: data.len() })
    }

    fn new_remote(id: impl Into<Id>, dlc: usize) -> Option<Self> {
        if dlc > 8 {
            return None;
        }
        Some(MockFrame { id: id.into(), data: Vec::new(), dlc })
    }

    fn is_extended(&self) -> bool {
        matches!(self.id, Id::Extended(_))
    }

    fn is_remote_frame(&self) -> bool {
        self.data.is_empty() && self.dlc > 0
    }

    fn id(&self) -> Id {
        self.id
    }

    fn dlc(&self) -> usize {
        self.dlc
    }

    fn data(&self) -> &[u8] {
        &self.data
    }
}

impl Debug for MockFrame {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "frame {:03X} [{}] {:02x?}", self.raw_id(), self.dlc, self.data)
    }
}

#[derive(Debug)]
pub struct MockError;

impl embedded_can::Error for MockError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

/// In-memory bus: records everything transmitted, hands out queued frames on
/// receive, and lets tests unplug it.
pub struct MockBus {
    pub connected: bool,
    pub fail_transmit: bool,
    pub sent: Vec<MockFrame>,
    pub rx_queue: VecDeque<MockFrame>,
}

impl MockBus {
    pub fn new() -> Self {
        MockBus {
            connected: true,
            fail_transmit: false,
            sent: Vec::new(),
            rx_queue: VecDeque::new(),
        }
    }

    pub fn queue_rx(&mut self, cob_id: u16, data: &[u8]) {
        self.rx_queue.push_back(frame(cob_id, data));
    }

    pub fn last_sent(&self) -> &MockFrame {
        self.sent.last().expect("no frame was sent")
    }
}

impl Can for MockBus {
    type Frame = MockFrame;
    type Error = MockError;

    fn transmit(&mut self, frame: &MockFrame) -> nb::Result<Option<MockFrame>, MockError> {
        if !self.connected || self.fail_transmit {
            return Err(nb::Error::Other(MockError));
        }
        self.sent.push(frame.clone());
        Ok(None)
    }

    fn receive(&mut self) -> nb::Result<MockFrame, MockError> {
        match self.rx_queue.pop_front() {
            Some(f) => Ok(f),
            None => Err(nb::Error::WouldBlock),
        }
    }
}

impl CanBus for MockBus {
    fn is_connected(&self) -> bool {
        self.connected
    }
}

/// Timer that only expires when a test says so. `restart` clears the flag,
/// mirroring the contract of the real interval timers. Clones share state so
/// a test can keep a handle to a timer owned by a controller.
#[derive(Clone)]
pub struct ManualTimer {
    interval_us: Rc<Cell<u64>>,
    expired: Rc<Cell<bool>>,
}

impl ManualTimer {
    pub fn new() -> Self {
        ManualTimer {
            interval_us: Rc::new(Cell::new(0)),
            expired: Rc::new(Cell::new(false)),
        }
    }

    pub fn force_expire(&self) {
        self.expired.set(true);
    }

    pub fn is_expired(&self) -> bool {
        self.expired.get()
    }
}

impl IntervalTimer for ManualTimer {
    fn set_interval(&mut self, interval_us: u64) {
        self.interval_us.set(interval_us);
        self.restart();
    }

    fn interval_us(&self) -> u64 {
        self.interval_us.get()
    }

    fn restart(&mut self) {
        self.expired.set(false);
    }

    fn check(&self) -> bool {
        self.expired.get()
    }
}

pub fn frame(cob_id: u16, data: &[u8]) -> MockFrame {
    canopen_motor::util::genf(cob_id, data)
}

pub fn test_config(node_id: u8, protocol_version: ProtocolVersion, encoder: bool) -> MotorConfig {
    MotorConfig {
        node_id,
        protocol_version,
        position_encoder_available: encoder,
        rpdo_interval_us: 50_000,
        healthcheck_timeout_us: 100_000,
        min_position_limit: 0,
        max_position_limit: 1000,
        min_speed_limit: -3000,
        max_speed_limit: 3000,
        min_amps_limit: -400,
        max_amps_limit: 400,
    }
}

/// Returns a configured controller plus handles to its RPDO and healthcheck
/// timers, in that order.
pub fn make_controller(
    node_id: u8,
    protocol_version: ProtocolVersion,
    encoder: bool,
) -> (MotorController<ManualTimer>, ManualTimer, ManualTimer) {
    let rpdo_timer = ManualTimer::new();
    let healthcheck_timer = ManualTimer::new();
    let mut controller =
        MotorController::new(rpdo_timer.clone(), healthcheck_timer.clone());
    controller.configure(test_config(node_id, protocol_version, encoder));
    (controller, rpdo_timer, healthcheck_timer)
}

/// 2.0-protocol primary telemetry payload: status, position, speed, amps.
pub fn telemetry_2_0(status: u16, position: u16, speed: i16, amps: i16) -> [u8; 8] {
    let mut payload = [0u8; 8];
    payload[0..2].copy_from_slice(&status.to_le_bytes());
    payload[2..4].copy_from_slice(&position.to_le_bytes());
    payload[4..6].copy_from_slice(&speed.to_le_bytes());
    payload[6..8].copy_from_slice(&amps.to_le_bytes());
    payload
}

/// Legacy primary telemetry payload: position or speed at bytes 4-5.
pub fn telemetry_legacy(value: u16) -> [u8; 8] {
    let mut payload = [0u8; 8];
    payload[4..6].copy_from_slice(&value.to_le_bytes());
    payload
}
