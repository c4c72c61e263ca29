use embedded_can::Frame;

use crate::canopen::{split_cob_id, CanBus};
use crate::controller::MotorController;
use crate::error::ErrorCode;
use crate::info;
use crate::prelude::*;
use crate::timer::IntervalTimer;
use crate::util::get_cob_id;

/// All motor controllers sharing one physical bus, keyed by node id.
///
/// Frames are routed to the controller owning their node id; ticks and halts
/// fan out to every member. The group borrows the bus per call just like the
/// controllers themselves.
pub struct ControllerGroup<T: IntervalTimer> {
    controllers: HashMap<u8, MotorController<T>>,
}

impl<T: IntervalTimer> ControllerGroup<T> {
    pub fn new() -> Self {
        ControllerGroup { controllers: HashMap::new() }
    }

    /// Registers a controller under its configured node id, replacing any
    /// previous controller with the same id.
    pub fn insert(&mut self, controller: MotorController<T>) {
        self.controllers.insert(controller.node_id(), controller);
    }

    pub fn get(&self, node_id: u8) -> Option<&MotorController<T>> {
        self.controllers.get(&node_id)
    }

    pub fn get_mut(&mut self, node_id: u8) -> Option<&mut MotorController<T>> {
        self.controllers.get_mut(&node_id)
    }

    pub fn len(&self) -> usize {
        self.controllers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.controllers.is_empty()
    }

    /// Ticks every controller once.
    pub fn execute_all<CAN>(&mut self, can: &mut CAN)
    where
        CAN: CanBus,
        CAN::Frame: Frame + Debug,
    {
        for controller in self.controllers.values_mut() {
            controller.execute(can);
        }
    }

    /// Emergency-stops every controller.
    pub fn halt_all<CAN>(&mut self, can: &mut CAN)
    where
        CAN: CanBus,
        CAN::Frame: Frame + Debug,
    {
        for controller in self.controllers.values_mut() {
            controller.halt(can);
        }
    }

    /// Routes one received frame to the controller owning its node id.
    /// `Ok(false)` when no registered controller consumed it.
    pub fn dispatch<CAN>(
        &mut self,
        can: &mut CAN,
        payload: &[u8],
        source_cob_id: u16,
        timestamp_us: u64,
    ) -> Result<bool, ErrorCode>
    where
        CAN: CanBus,
        CAN::Frame: Frame + Debug,
    {
        let (_, node_id) = split_cob_id(source_cob_id)?;
        match self.controllers.get_mut(&node_id) {
            Some(controller) => {
                controller.process_canbus_callback(can, payload, source_cob_id, timestamp_us)
            }
            None => Ok(false),
        }
    }

    /// Non-blocking receive feeding at most one pending frame into the
    /// group. `Ok(false)` when nothing was available or nobody consumed it.
    pub fn poll_one_frame<CAN>(&mut self, can: &mut CAN) -> Result<bool, ErrorCode>
    where
        CAN: CanBus,
        CAN::Frame: Frame + Debug,
    {
        let frame = match can.receive() {
            Ok(f) => f,
            Err(nb::Error::WouldBlock) => return Ok(false), // try next time
            Err(nb::Error::Other(err)) => {
                info!("errors in reading CAN frame, {:?}", err);
                return Ok(false);
            }
        };
        let cob_id = match get_cob_id(&frame) {
            Some(id) => id,
            // extended ids never belong to the drive protocol
            None => return Ok(false),
        };
        // embedded-can frames carry no receive timestamp
        self.dispatch(can, frame.data(), cob_id, 0)
    }
}
