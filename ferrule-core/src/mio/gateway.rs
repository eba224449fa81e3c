//! Driver arena and gateway tables
//!
//! Drivers are attached once into an arena and referenced by a
//! generational [`DriverId`]. A gateway is a (driver, port) pair; several
//! gateways may share one driver on different ports. Both tables are
//! append-only.

use heapless::Vec;

use crate::config::{INPUT_MAX_GATEWAYS, MAX_DRIVERS, OUTPUT_MAX_GATEWAYS};
use crate::device::{Direction, IoDevice, IoDriver, Port};

/// Handle of an attached driver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DriverId {
    index: u8,
    generation: u8,
}

impl DriverId {
    pub fn index(self) -> usize {
        self.index as usize
    }
}

/// Handle of a registered gateway, unique within its direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GatewayId(u8);

impl GatewayId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A registered (driver, port) pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Gateway {
    pub driver: DriverId,
    pub port: Port,
}

struct DriverSlot<'d> {
    driver: IoDriver<'d>,
    generation: u8,
}

/// Owner of every attached IO driver
pub struct DriverArena<'d> {
    slots: Vec<DriverSlot<'d>, MAX_DRIVERS>,
}

impl<'d> DriverArena<'d> {
    pub fn new() -> Self {
        Self { slots: Vec::new() }
    }

    /// Take ownership of `device` for the rest of the run
    pub fn attach(&mut self, device: &'d mut dyn IoDevice) -> DriverId {
        let description = device.description();
        let index = self.slots.len() as u8;
        let slot = DriverSlot {
            driver: IoDriver::new(device),
            generation: 0,
        };
        if self.slots.push(slot).is_err() {
            violation!("driver arena full ({}), cannot attach {}", MAX_DRIVERS, description);
        }
        DriverId {
            index,
            generation: 0,
        }
    }

    fn check(&self, id: DriverId) -> usize {
        match self.slots.get(id.index()) {
            Some(slot) if slot.generation == id.generation => id.index(),
            _ => violation!("stale or foreign driver id {:?}", id),
        }
    }

    pub fn get(&self, id: DriverId) -> &IoDriver<'d> {
        let index = self.check(id);
        &self.slots[index].driver
    }

    pub fn get_mut(&mut self, id: DriverId) -> &mut IoDriver<'d> {
        let index = self.check(id);
        &mut self.slots[index].driver
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl Default for DriverArena<'_> {
    fn default() -> Self {
        Self::new()
    }
}

/// Registered gateways of one direction, in registration order
pub struct GatewayTable<const N: usize> {
    entries: Vec<Gateway, N>,
}

impl<const N: usize> GatewayTable<N> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Append a gateway, `None` when the table is full
    pub fn register(&mut self, gateway: Gateway) -> Option<GatewayId> {
        let id = GatewayId(self.entries.len() as u8);
        self.entries.push(gateway).ok()?;
        Some(id)
    }

    pub fn get(&self, id: GatewayId) -> &Gateway {
        match self.entries.get(id.index()) {
            Some(gateway) => gateway,
            None => violation!("gateway {} not registered", id.index()),
        }
    }

    /// Most recently registered gateway
    pub fn latest(&self) -> Option<GatewayId> {
        self.entries
            .len()
            .checked_sub(1)
            .map(|last| GatewayId(last as u8))
    }

    pub fn iter(&self) -> impl Iterator<Item = (GatewayId, &Gateway)> + '_ {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, gateway)| (GatewayId(i as u8), gateway))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub const fn capacity(&self) -> usize {
        N
    }
}

impl<const N: usize> Default for GatewayTable<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Input and output gateway tables
pub struct Gateways {
    input: GatewayTable<INPUT_MAX_GATEWAYS>,
    output: GatewayTable<OUTPUT_MAX_GATEWAYS>,
}

impl Gateways {
    pub fn new() -> Self {
        Self {
            input: GatewayTable::new(),
            output: GatewayTable::new(),
        }
    }

    pub fn register(&mut self, direction: Direction, gateway: Gateway) -> Option<GatewayId> {
        match direction {
            Direction::Input => self.input.register(gateway),
            Direction::Output => self.output.register(gateway),
        }
    }

    pub fn get(&self, direction: Direction, id: GatewayId) -> &Gateway {
        match direction {
            Direction::Input => self.input.get(id),
            Direction::Output => self.output.get(id),
        }
    }

    pub fn latest(&self, direction: Direction) -> Option<GatewayId> {
        match direction {
            Direction::Input => self.input.latest(),
            Direction::Output => self.output.latest(),
        }
    }

    pub fn len(&self, direction: Direction) -> usize {
        match direction {
            Direction::Input => self.input.len(),
            Direction::Output => self.output.len(),
        }
    }

    pub fn capacity(&self, direction: Direction) -> usize {
        match direction {
            Direction::Input => self.input.capacity(),
            Direction::Output => self.output.capacity(),
        }
    }

    /// Gateways of one direction, in registration order
    pub fn iter(&self, direction: Direction) -> impl Iterator<Item = (GatewayId, Gateway)> + '_ {
        (0..self.len(direction)).map(move |i| {
            let id = GatewayId(i as u8);
            (id, *self.get(direction, id))
        })
    }
}

impl Default for Gateways {
    fn default() -> Self {
        Self::new()
    }
}
