//! Multiplexed I/O
//!
//! Binds the semantic profile codes application code uses to lines on
//! concrete drivers:
//!
//! ```text
//!  profile (GP1, Bit, Right)
//!          │  Map { gateway, driver_code }
//!          ▼
//!  gateway 0 = (driver "pca9673", port 0)
//!          │
//!          ▼
//!  driver.get_input(Bit, driver_code, port 0)
//! ```
//!
//! The multiplexer has two phases. During **setup** (boot stages before
//! `Ready`) boards and rigs attach drivers, register gateways and map
//! profile codes. At `Ready` the sequencer freezes the tables; any further
//! registration or mapping is a contract violation. During **run** the
//! application reads and writes by profile code and calls [`Mio::update`]
//! once per frame.

mod action;
mod gateway;
mod profile;

pub use action::{ActionTracker, InputAction};
pub use gateway::{DriverArena, DriverId, Gateway, GatewayId, Gateways};
pub use profile::{
    ControlInBit, ControlOutBit, Gp1Bit, Gp2Bit, GroupSpec, InputGroup, LightDevInBit,
    LightDevInRange, LightDevOutRange, MainBit, Map, MappingRow, MarqueeBit, MarqueeRange,
    OutputGroup, ProfileGroup, ProfileLine, Profiles, SignBit, INPUT_GROUPS, INPUT_MAP_SLOTS,
    OUTPUT_GROUPS, OUTPUT_MAP_SLOTS,
};

use heapless::Vec;

use crate::config::MAX_DRIVERS;
use crate::device::command::{self, CommandNameError, CommandResult};
use crate::device::{Code, Direction, IoDevice, IoDriver, Port, Space, Value, Variant, When};
use crate::Ticks;

/// How [`Mio::map`] treats a code that is already mapped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RemapPolicy {
    /// First mapping wins
    #[default]
    NoRemap,
    /// Newest mapping wins
    Overwrite,
}

/// Multiplexer lifecycle phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Phase {
    /// Tables accept registrations and mappings
    Setup,
    /// Tables are frozen
    Run,
}

/// The multiplexed I/O manager
pub struct Mio<'d> {
    drivers: DriverArena<'d>,
    gateways: Gateways,
    profiles: Profiles,
    actions: [ActionTracker; INPUT_MAP_SLOTS],
    map_action: [RemapPolicy; 2],
    phase: Phase,
}

impl<'d> Mio<'d> {
    pub fn new() -> Self {
        Self {
            drivers: DriverArena::new(),
            gateways: Gateways::new(),
            profiles: Profiles::new(),
            actions: [ActionTracker::new(); INPUT_MAP_SLOTS],
            map_action: [RemapPolicy::NoRemap; 2],
            phase: Phase::Setup,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// End the setup phase; tables are read-only from here on
    pub(crate) fn freeze(&mut self) {
        if self.phase == Phase::Setup {
            info!(
                "mio: frozen with {} drivers, {} input and {} output gateways",
                self.drivers.len(),
                self.gateways.len(Direction::Input),
                self.gateways.len(Direction::Output)
            );
        }
        self.phase = Phase::Run;
    }

    fn assert_setup(&self, op: &str) {
        if self.phase != Phase::Setup {
            violation!("mio: {} after Ready", op);
        }
    }

    // --- setup ---------------------------------------------------------

    /// Take ownership of an IO driver for the rest of the run
    pub fn attach_driver(&mut self, device: &'d mut dyn IoDevice) -> DriverId {
        self.assert_setup("attach_driver");
        debug!("mio: attaching driver {}", device.description());
        self.drivers.attach(device)
    }

    /// Register `(driver, port)` as the next gateway of `direction`
    pub fn register_gateway(&mut self, direction: Direction, driver: DriverId, port: Port) -> GatewayId {
        self.assert_setup("register_gateway");

        let io = self.drivers.get(driver);
        let caps = *io.capabilities();
        if !caps.supports(direction) {
            violation!("mio: {} has no {} lines", io.description(), direction.name());
        }
        if port >= caps.ports {
            violation!("mio: {} has no port {} ({} ports)", io.description(), port, caps.ports);
        }

        let gateway = Gateway { driver, port };
        match self.gateways.register(direction, gateway) {
            Some(id) => {
                debug!(
                    "mio: {} gateway {} = {} port {}",
                    direction.name(),
                    id.index(),
                    io.description(),
                    port
                );
                id
            }
            None => violation!(
                "mio: {} gateway table full ({})",
                direction.name(),
                self.gateways.capacity(direction)
            ),
        }
    }

    /// Make a profile group available to the application
    pub fn attach_profile(&mut self, group: impl Into<ProfileGroup>) {
        self.assert_setup("attach_profile");
        let group = group.into();
        self.profiles.attach(group);
        debug!("mio: attached {} profile {}", group.direction().name(), group.name());
    }

    /// Policy for subsequent [`map`](Mio::map) calls in `direction`
    pub fn set_map_action(&mut self, direction: Direction, policy: RemapPolicy) {
        self.map_action[direction.index()] = policy;
    }

    pub fn map_action(&self, direction: Direction) -> RemapPolicy {
        self.map_action[direction.index()]
    }

    /// Bind a profile code to line `driver_code` of the most recently
    /// registered gateway of the group's direction
    ///
    /// Under [`RemapPolicy::NoRemap`] an already mapped code keeps its
    /// binding. Returns whether the binding was applied.
    pub fn map(
        &mut self,
        group: impl Into<ProfileGroup>,
        space: Space,
        code: Code,
        driver_code: Code,
    ) -> bool {
        self.assert_setup("map");
        let group = group.into();
        let direction = group.direction();
        let Some(gateway) = self.gateways.latest(direction) else {
            violation!(
                "mio: map {} {:?} {}: no {} gateway registered",
                group.name(),
                space,
                code,
                direction.name()
            );
        };

        let slot = self.profiles.slot(group, space, code);
        let policy = self.map_action[direction.index()];
        if self.profiles.map(direction, slot).is_mapped() && policy == RemapPolicy::NoRemap {
            debug!("mio: {} {:?} {} already mapped, kept", group.name(), space, code);
            return false;
        }
        self.bind(group, space, slot, gateway, driver_code);
        true
    }

    /// [`map`](Mio::map) for a typed profile line
    pub fn map_line<L: ProfileLine>(&mut self, line: L, driver_code: Code) -> bool {
        self.map(L::GROUP, L::SPACE, line.code(), driver_code)
    }

    /// Map `code` to the first active Bit line found scanning input
    /// gateways in registration order
    ///
    /// Overwrites any existing binding. Returns false if no gateway reports
    /// an active bit.
    pub fn auto_map_input_bit(&mut self, group: InputGroup, code: Code) -> bool {
        self.assert_setup("auto_map_input_bit");
        let group = ProfileGroup::Input(group);
        let slot = self.profiles.slot(group, Space::Bit, code);

        let mut found = None;
        for (id, gateway) in self.gateways.iter(Direction::Input) {
            let driver = self.drivers.get_mut(gateway.driver);
            if let Some(driver_code) = driver.first_active_input(Space::Bit, gateway.port) {
                found = Some((id, driver_code));
                break;
            }
        }

        match found {
            Some((gateway, driver_code)) => {
                self.bind(group, Space::Bit, slot, gateway, driver_code);
                true
            }
            None => false,
        }
    }

    fn bind(&mut self, group: ProfileGroup, space: Space, slot: usize, gateway: GatewayId, driver_code: Code) {
        let direction = group.direction();
        let gw = *self.gateways.get(direction, gateway);
        let driver = self.drivers.get(gw.driver);
        let available = driver.capabilities().count(direction, space);
        if driver_code >= available {
            violation!(
                "mio: {} has no {} {:?} line {} ({} lines)",
                driver.description(),
                direction.name(),
                space,
                driver_code,
                available
            );
        }
        let max_value = match (direction, space) {
            (Direction::Output, _) => driver.max_output(space, driver_code),
            (Direction::Input, Space::Bit) => 1,
            (Direction::Input, Space::Range) => Value::MAX,
        };
        *self.profiles.map_mut(direction, slot) = Map {
            gateway: Some(gateway),
            driver_code,
            max_value,
        };
        debug!(
            "mio: {} {:?} -> gateway {} line {}",
            group.name(),
            space,
            gateway.index(),
            driver_code
        );
    }

    // --- queries -------------------------------------------------------

    pub fn has_profile(&self, group: impl Into<ProfileGroup>) -> bool {
        self.profiles.is_attached(group.into())
    }

    /// Number of codes a group offers in `space`; 0 if not attached
    pub fn profile_codes(&self, group: impl Into<ProfileGroup>, space: Space) -> Code {
        self.profiles.codes(group.into(), space)
    }

    pub fn is_mapped(&self, group: impl Into<ProfileGroup>, space: Space, code: Code) -> bool {
        self.profiles.lookup(group.into(), space, code).is_some()
    }

    /// Gateway backing a profile code, if mapped
    pub fn mapped_gateway(&self, group: impl Into<ProfileGroup>, space: Space, code: Code) -> Option<GatewayId> {
        self.profiles
            .lookup(group.into(), space, code)
            .and_then(|map| map.gateway)
    }

    /// Driver label of the line backing a profile code, if mapped
    pub fn mapped_name(&self, group: impl Into<ProfileGroup>, space: Space, code: Code) -> Option<&'static str> {
        let group = group.into();
        let direction = group.direction();
        let map = self.profiles.lookup(group, space, code)?;
        let gateway = self.gateways.get(direction, map.gateway?);
        Some(self.drivers.get(gateway.driver).line_name(direction, space, map.driver_code))
    }

    pub fn gateway_count(&self, direction: Direction) -> usize {
        self.gateways.len(direction)
    }

    pub fn gateway(&self, direction: Direction, id: GatewayId) -> &Gateway {
        self.gateways.get(direction, id)
    }

    /// Registered gateways of `direction`, in registration order
    pub fn gateways(&self, direction: Direction) -> impl Iterator<Item = (GatewayId, Gateway)> + '_ {
        self.gateways.iter(direction)
    }

    pub fn driver(&self, id: DriverId) -> &IoDriver<'d> {
        self.drivers.get(id)
    }

    /// Mapped codes of every attached group of `direction`
    pub fn mappings(&self, direction: Direction) -> impl Iterator<Item = MappingRow> + '_ {
        self.profiles.mappings(direction)
    }

    /// Send a device command to an attached driver
    pub fn command(
        &mut self,
        driver: DriverId,
        name: &str,
        value: &mut Variant,
    ) -> Result<CommandResult, CommandNameError> {
        command::dispatch(self.drivers.get_mut(driver).device_mut(), name, value)
    }

    // --- run -----------------------------------------------------------

    /// Read an input profile code; unmapped codes read 0
    pub fn get_input(&mut self, group: InputGroup, space: Space, code: Code, when: When) -> Value {
        let Some(map) = self.profiles.lookup(group.into(), space, code) else {
            return 0;
        };
        let Some(id) = map.gateway else {
            return 0;
        };
        let gateway = *self.gateways.get(Direction::Input, id);
        self.drivers
            .get_mut(gateway.driver)
            .get_input(space, map.driver_code, gateway.port, when)
    }

    /// [`get_input`](Mio::get_input) for a typed input line
    pub fn input<L: ProfileLine>(&mut self, line: L, when: When) -> Value {
        match L::GROUP {
            ProfileGroup::Input(group) => self.get_input(group, L::SPACE, line.code(), when),
            ProfileGroup::Output(group) => {
                violation!("mio: {} is an output profile", group.spec().name)
            }
        }
    }

    /// Write an output profile code, clamped to the line's maximum;
    /// writes to unmapped codes are dropped
    pub fn set_output(&mut self, group: OutputGroup, space: Space, code: Code, value: Value, when: When) {
        let Some(map) = self.profiles.lookup(group.into(), space, code) else {
            return;
        };
        let Some(id) = map.gateway else {
            return;
        };
        let gateway = *self.gateways.get(Direction::Output, id);
        let value = value.min(map.max_value);
        self.drivers
            .get_mut(gateway.driver)
            .set_output(space, map.driver_code, gateway.port, value, when);
    }

    /// [`set_output`](Mio::set_output) for a typed output line
    pub fn output<L: ProfileLine>(&mut self, line: L, value: Value, when: When) {
        match L::GROUP {
            ProfileGroup::Output(group) => self.set_output(group, L::SPACE, line.code(), value, when),
            ProfileGroup::Input(group) => {
                violation!("mio: {} is an input profile", group.spec().name)
            }
        }
    }

    /// Whether any mapped Bit line of the given input groups is active
    ///
    /// Reads buffered state only.
    pub fn any_input_bit(&mut self, groups: &[InputGroup]) -> bool {
        for &group in groups {
            for code in 0..self.profile_codes(group, Space::Bit) {
                if self.get_input(group, Space::Bit, code, When::Buffer) != 0 {
                    return true;
                }
            }
        }
        false
    }

    /// Event detected on an input Bit code during the last update
    pub fn input_bit_action(&self, group: InputGroup, code: Code) -> InputAction {
        if !group.spec().bit_actions {
            violation!("mio: profile {} has no bit actions", group.spec().name);
        }
        let group = ProfileGroup::Input(group);
        if !self.profiles.is_attached(group) {
            return InputAction::None;
        }
        let slot = self.profiles.slot(group, Space::Bit, code);
        self.actions[slot].last()
    }

    /// Poll drivers and run input actions; call once per frame
    ///
    /// Every distinct input driver is updated once, in gateway order, no
    /// matter how many gateways or profile codes share it. Then Bit actions
    /// are evaluated, then every distinct output driver is updated once.
    /// Each driver update is still subject to its own throttle.
    pub fn update(&mut self, now: Ticks) {
        let mut polled: Vec<DriverId, MAX_DRIVERS> = Vec::new();
        for (_, gateway) in self.gateways.iter(Direction::Input) {
            if !polled.contains(&gateway.driver) && polled.push(gateway.driver).is_ok() {
                self.drivers.get_mut(gateway.driver).update(now);
            }
        }

        for group in InputGroup::ALL {
            if group.spec().bit_actions && self.profiles.is_attached(group.into()) {
                self.update_actions(group, now);
            }
        }

        polled.clear();
        for (_, gateway) in self.gateways.iter(Direction::Output) {
            if !polled.contains(&gateway.driver) && polled.push(gateway.driver).is_ok() {
                self.drivers.get_mut(gateway.driver).update(now);
            }
        }
    }

    fn update_actions(&mut self, group: InputGroup, now: Ticks) {
        let profile = ProfileGroup::Input(group);
        for code in 0..group.spec().bits {
            let slot = self.profiles.slot(profile, Space::Bit, code);
            let map = *self.profiles.map(Direction::Input, slot);
            let active = match map.gateway {
                Some(id) => {
                    let gateway = *self.gateways.get(Direction::Input, id);
                    self.drivers.get_mut(gateway.driver).get_input(
                        Space::Bit,
                        map.driver_code,
                        gateway.port,
                        When::Buffer,
                    ) != 0
                }
                None => false,
            };
            self.actions[slot].update(now, active);
        }
    }
}

impl Default for Mio<'_> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{Capabilities, Device};
    use core::cell::Cell;

    const LINES: usize = 12;

    /// Shared view of a mock driver's hardware
    struct Probe {
        updates: Cell<u32>,
        live: [Cell<bool>; LINES],
        written: [Cell<Value>; 4],
    }

    impl Probe {
        fn new() -> Self {
            Self {
                updates: Cell::new(0),
                live: Default::default(),
                written: Default::default(),
            }
        }

        fn press(&self, line: usize, active: bool) {
            self.live[line].set(active);
        }
    }

    struct MockIo<'p> {
        name: &'static str,
        probe: &'p Probe,
        ports: Port,
        cached: [bool; LINES],
        pending: [Value; 4],
    }

    impl<'p> MockIo<'p> {
        fn new(name: &'static str, probe: &'p Probe) -> Self {
            Self {
                name,
                probe,
                ports: 1,
                cached: [false; LINES],
                pending: [0; 4],
            }
        }
    }

    impl Device for MockIo<'_> {
        fn description(&self) -> &'static str {
            self.name
        }
    }

    impl IoDevice for MockIo<'_> {
        fn capabilities(&self) -> Capabilities {
            Capabilities::new(self.ports)
                .with_inputs(Space::Bit, LINES as Code)
                .with_outputs(Space::Bit, 2)
                .with_outputs(Space::Range, 2)
        }

        fn update_period(&self) -> Ticks {
            10
        }

        fn update(&mut self) {
            self.probe.updates.set(self.probe.updates.get() + 1);
            for (cached, live) in self.cached.iter_mut().zip(self.probe.live.iter()) {
                *cached = live.get();
            }
            for (written, pending) in self.probe.written.iter().zip(self.pending.iter()) {
                written.set(*pending);
            }
        }

        fn get_input(&mut self, _space: Space, code: Code, _port: Port) -> Value {
            self.cached[code as usize] as Value
        }

        fn set_output(&mut self, space: Space, code: Code, _port: Port, value: Value) {
            self.pending[space.index() * 2 + code as usize] = value;
        }

        fn input_name(&self, _space: Space, code: Code) -> &'static str {
            ["k0", "k1", "k2", "k3", "k4", "k5", "k6", "k7", "k8", "k9", "k10", "k11"][code as usize]
        }

        fn output_name(&self, space: Space, code: Code) -> &'static str {
            match space {
                Space::Bit => ["led0", "led1"][code as usize],
                Space::Range => ["pwm0", "pwm1"][code as usize],
            }
        }

        fn max_output(&self, space: Space, _code: Code) -> Value {
            match space {
                Space::Bit => 1,
                Space::Range => 255,
            }
        }
    }

    fn mio_with_profiles<'d>() -> Mio<'d> {
        let mut mio = Mio::new();
        mio.attach_profile(InputGroup::Gp1);
        mio.attach_profile(InputGroup::Main);
        mio.attach_profile(OutputGroup::Sign);
        mio.attach_profile(OutputGroup::Marquee);
        mio
    }

    #[test]
    fn test_buffer_read_before_and_after_update() {
        let probe = Probe::new();
        let mut x = MockIo::new("x", &probe);
        let mut mio = mio_with_profiles();
        let d = mio.attach_driver(&mut x);
        let g = mio.register_gateway(Direction::Input, d, 0);
        assert_eq!(g.index(), 0);
        assert!(mio.map_line(Gp1Bit::Right, 7));

        probe.press(7, true);
        assert_eq!(mio.get_input(InputGroup::Gp1, Space::Bit, Gp1Bit::Right.code(), When::Buffer), 0);
        mio.update(0);
        assert_eq!(mio.input(Gp1Bit::Right, When::Buffer), 1);
    }

    #[test]
    fn test_now_read_polls_immediately() {
        let probe = Probe::new();
        let mut x = MockIo::new("x", &probe);
        let mut mio = mio_with_profiles();
        let d = mio.attach_driver(&mut x);
        mio.register_gateway(Direction::Input, d, 0);
        mio.map_line(MainBit::A, 3);

        probe.press(3, true);
        assert_eq!(mio.input(MainBit::A, When::Now), 1);
        assert_eq!(probe.updates.get(), 1);
    }

    #[test]
    fn test_aliased_codes_poll_driver_once() {
        let probe = Probe::new();
        let mut x = MockIo::new("x", &probe);
        x.ports = 2;
        let mut mio = mio_with_profiles();
        let d = mio.attach_driver(&mut x);
        mio.register_gateway(Direction::Input, d, 0);
        mio.map_line(Gp1Bit::Right, 0);
        mio.map_line(Gp1Bit::Left, 1);
        mio.register_gateway(Direction::Input, d, 1);
        mio.map_line(MainBit::A, 0);
        mio.register_gateway(Direction::Output, d, 0);
        mio.map_line(SignBit::Red, 0);

        mio.update(0);
        assert_eq!(probe.updates.get(), 1);
    }

    #[test]
    fn test_remap_policy() {
        let p1 = Probe::new();
        let p2 = Probe::new();
        let mut d1 = MockIo::new("d1", &p1);
        let mut d2 = MockIo::new("d2", &p2);
        let mut mio = mio_with_profiles();

        let a = mio.attach_driver(&mut d1);
        let b = mio.attach_driver(&mut d2);
        let g1 = mio.register_gateway(Direction::Input, a, 0);
        assert!(mio.map_line(Gp1Bit::A, 1));
        let g2 = mio.register_gateway(Direction::Input, b, 0);
        assert!(!mio.map_line(Gp1Bit::A, 2));
        assert_eq!(mio.mapped_gateway(InputGroup::Gp1, Space::Bit, Gp1Bit::A.code()), Some(g1));

        mio.set_map_action(Direction::Input, RemapPolicy::Overwrite);
        assert!(mio.map_line(Gp1Bit::A, 2));
        assert_eq!(mio.mapped_gateway(InputGroup::Gp1, Space::Bit, Gp1Bit::A.code()), Some(g2));
        assert_eq!(mio.mapped_name(InputGroup::Gp1, Space::Bit, Gp1Bit::A.code()), Some("k2"));
        assert_eq!(mio.map_action(Direction::Output), RemapPolicy::NoRemap);
    }

    #[test]
    fn test_unmapped_reads_zero_and_writes_drop() {
        let probe = Probe::new();
        let mut x = MockIo::new("x", &probe);
        let mut mio = mio_with_profiles();
        let d = mio.attach_driver(&mut x);
        mio.register_gateway(Direction::Output, d, 0);

        assert!(!mio.is_mapped(InputGroup::Gp1, Space::Bit, 0));
        assert_eq!(mio.input(Gp1Bit::B, When::Now), 0);
        assert_eq!(mio.mapped_name(InputGroup::Gp1, Space::Bit, 0), None);
        mio.output(SignBit::Green, 1, When::Now);
        assert_eq!(probe.updates.get(), 0);

        // groups never attached behave as unmapped
        assert!(!mio.has_profile(InputGroup::Gp2));
        assert_eq!(mio.profile_codes(InputGroup::Gp2, Space::Bit), 0);
        assert_eq!(mio.get_input(InputGroup::Gp2, Space::Bit, 0, When::Buffer), 0);
        assert!(!mio.is_mapped(OutputGroup::LightDev, Space::Range, 0));
    }

    #[test]
    fn test_output_clamped_and_deferred() {
        let probe = Probe::new();
        let mut x = MockIo::new("x", &probe);
        let mut mio = mio_with_profiles();
        let d = mio.attach_driver(&mut x);
        mio.register_gateway(Direction::Output, d, 0);
        mio.map_line(MarqueeRange::FlashPhase, 1);
        mio.map_line(SignBit::Warning, 0);

        mio.output(MarqueeRange::FlashPhase, 1_000, When::Buffer);
        mio.output(SignBit::Warning, 5, When::Buffer);
        assert_eq!(probe.written[3].get(), 0);
        mio.update(0);
        assert_eq!(probe.written[3].get(), 255);
        assert_eq!(probe.written[0].get(), 1);
        assert_eq!(mio.mapped_name(OutputGroup::Marquee, Space::Range, 2), Some("pwm1"));
    }

    #[test]
    fn test_auto_map_picks_first_active_gateway() {
        let p1 = Probe::new();
        let p2 = Probe::new();
        let mut d1 = MockIo::new("d1", &p1);
        let mut d2 = MockIo::new("d2", &p2);
        let mut mio = mio_with_profiles();
        let a = mio.attach_driver(&mut d1);
        let b = mio.attach_driver(&mut d2);
        mio.register_gateway(Direction::Input, a, 0);
        let g2 = mio.register_gateway(Direction::Input, b, 0);

        assert!(!mio.auto_map_input_bit(InputGroup::Main, 0));

        p1.press(4, true);
        p2.press(2, true);
        mio.update(0);
        p1.press(4, false);
        mio.update(20);
        assert!(mio.auto_map_input_bit(InputGroup::Main, 0));
        assert_eq!(mio.mapped_gateway(InputGroup::Main, Space::Bit, 0), Some(g2));
        assert_eq!(mio.mapped_name(InputGroup::Main, Space::Bit, 0), Some("k2"));
    }

    #[test]
    fn test_any_input_bit_and_actions() {
        let probe = Probe::new();
        let mut x = MockIo::new("x", &probe);
        let mut mio = mio_with_profiles();
        let d = mio.attach_driver(&mut x);
        mio.register_gateway(Direction::Input, d, 0);
        mio.map_line(Gp1Bit::Start, 5);

        mio.update(0);
        assert!(!mio.any_input_bit(&[InputGroup::Gp1, InputGroup::Main]));

        probe.press(5, true);
        let mut pressed = false;
        for frame in 1..10 {
            mio.update(frame * 20);
            pressed |= mio.input_bit_action(InputGroup::Gp1, Gp1Bit::Start.code()) == InputAction::Pressed;
        }
        assert!(pressed);
        assert!(mio.any_input_bit(&[InputGroup::Gp1]));
        assert!(!mio.any_input_bit(&[InputGroup::Main]));
        assert_eq!(mio.input_bit_action(InputGroup::Gp2, 0), InputAction::None);
    }

    #[test]
    fn test_mapping_rows() {
        let probe = Probe::new();
        let mut x = MockIo::new("x", &probe);
        let mut mio = mio_with_profiles();
        let d = mio.attach_driver(&mut x);
        mio.register_gateway(Direction::Input, d, 0);
        mio.map_line(Gp1Bit::Up, 3);
        mio.map_line(MainBit::D, 9);

        let mut rows = mio.mappings(Direction::Input);
        let first = rows.next().unwrap();
        assert_eq!(first.group, ProfileGroup::Input(InputGroup::Gp1));
        assert_eq!(first.code, Gp1Bit::Up.code());
        assert_eq!(first.driver_code, 3);
        let second = rows.next().unwrap();
        assert_eq!(second.group, ProfileGroup::Input(InputGroup::Main));
        assert!(rows.next().is_none());
        assert_eq!(mio.gateways(Direction::Input).count(), 1);
        assert_eq!(mio.mappings(Direction::Output).count(), 0);
    }

    #[test]
    #[should_panic(expected = "no input gateway registered")]
    fn test_map_without_gateway_panics() {
        let mut mio = mio_with_profiles();
        mio.map_line(Gp1Bit::A, 0);
    }

    #[test]
    #[should_panic(expected = "code 12 out of range")]
    fn test_map_bad_code_panics() {
        let probe = Probe::new();
        let mut x = MockIo::new("x", &probe);
        let mut mio = mio_with_profiles();
        let d = mio.attach_driver(&mut x);
        mio.register_gateway(Direction::Input, d, 0);
        mio.map(InputGroup::Gp1, Space::Bit, 12, 0);
    }

    #[test]
    #[should_panic(expected = "line 12")]
    fn test_map_bad_driver_code_panics() {
        let probe = Probe::new();
        let mut x = MockIo::new("x", &probe);
        let mut mio = mio_with_profiles();
        let d = mio.attach_driver(&mut x);
        mio.register_gateway(Direction::Input, d, 0);
        mio.map_line(Gp1Bit::A, LINES as Code);
    }

    #[test]
    #[should_panic(expected = "has no port 1")]
    fn test_register_bad_port_panics() {
        let probe = Probe::new();
        let mut x = MockIo::new("x", &probe);
        let mut mio = Mio::new();
        let d = mio.attach_driver(&mut x);
        mio.register_gateway(Direction::Input, d, 1);
    }

    #[test]
    #[should_panic(expected = "register_gateway after Ready")]
    fn test_register_after_freeze_panics() {
        let probe = Probe::new();
        let mut x = MockIo::new("x", &probe);
        let mut mio = Mio::new();
        let d = mio.attach_driver(&mut x);
        mio.freeze();
        mio.register_gateway(Direction::Input, d, 0);
    }

    #[test]
    #[should_panic(expected = "map after Ready")]
    fn test_map_after_freeze_panics() {
        let probe = Probe::new();
        let mut x = MockIo::new("x", &probe);
        let mut mio = mio_with_profiles();
        let d = mio.attach_driver(&mut x);
        mio.register_gateway(Direction::Input, d, 0);
        mio.freeze();
        assert_eq!(mio.phase(), Phase::Run);
        mio.map_line(Gp1Bit::A, 0);
    }
}
