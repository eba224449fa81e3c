//! Profile groups and the dense mapping table
//!
//! A profile group is a compile-time fixed set of named lines ("first
//! gamepad", "status sign") that application code addresses by code,
//! independent of the driver backing them. Each group is one row of a
//! const [`GroupSpec`] table; the [`ProfileTable`] holds exactly one
//! [`Map`] per (group, space, code) in a single fixed-size array.

use super::gateway::GatewayId;
use crate::config::{MAX_LIGHTING_DEVICES, MAX_LIGHT_CHANNELS};
use crate::device::{Code, Direction, Space, Value};

/// Static shape of a profile group
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupSpec {
    /// Short upper-case name used in summaries
    pub name: &'static str,
    /// Number of Bit codes
    pub bits: Code,
    /// Number of Range codes
    pub ranges: Code,
    /// Whether Bit lines get edge/hold detection on every update
    pub bit_actions: bool,
}

impl GroupSpec {
    pub const fn count(&self, space: Space) -> Code {
        match space {
            Space::Bit => self.bits,
            Space::Range => self.ranges,
        }
    }

    const fn slots(&self) -> usize {
        self.bits as usize + self.ranges as usize
    }
}

/// Total map slots needed by a group table
pub const fn total_slots(groups: &[GroupSpec]) -> usize {
    let mut i = 0;
    let mut total = 0;
    while i < groups.len() {
        total += groups[i].slots();
        i += 1;
    }
    total
}

/// Input profile groups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum InputGroup {
    /// Board control feedback (backlight, storage detect, ...)
    Control,
    /// First gamepad
    Gp1,
    /// Second gamepad
    Gp2,
    /// Lighting device fault reports
    LightDev,
    /// Main board buttons
    Main,
}

/// Output profile groups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OutputGroup {
    /// Board control lines (backlight, storage power, ...)
    Control,
    /// Lighting device channel currents and PWM
    LightDev,
    /// Stepper-driven marquee
    Marquee,
    /// Status sign LEDs
    Sign,
}

const GAMEPAD_BITS: Code = 12;

pub const INPUT_GROUPS: [GroupSpec; 5] = [
    GroupSpec { name: "CONTROL", bits: 5, ranges: 0, bit_actions: false },
    GroupSpec { name: "GP1", bits: GAMEPAD_BITS, ranges: 0, bit_actions: true },
    GroupSpec { name: "GP2", bits: GAMEPAD_BITS, ranges: 0, bit_actions: true },
    GroupSpec {
        name: "LIGHTDEV",
        bits: 2 * MAX_LIGHTING_DEVICES as Code,
        ranges: 2 * MAX_LIGHTING_DEVICES as Code,
        bit_actions: false,
    },
    GroupSpec { name: "MAIN", bits: 4, ranges: 0, bit_actions: true },
];

pub const OUTPUT_GROUPS: [GroupSpec; 4] = [
    GroupSpec { name: "CONTROL", bits: 5, ranges: 0, bit_actions: false },
    GroupSpec {
        name: "LIGHTDEV",
        bits: 0,
        ranges: 2 * MAX_LIGHT_CHANNELS as Code,
        bit_actions: false,
    },
    GroupSpec { name: "MARQUEE", bits: 1, ranges: 4, bit_actions: false },
    GroupSpec { name: "SIGN", bits: 4, ranges: 0, bit_actions: false },
];

pub const INPUT_MAP_SLOTS: usize = total_slots(&INPUT_GROUPS);
pub const OUTPUT_MAP_SLOTS: usize = total_slots(&OUTPUT_GROUPS);

impl InputGroup {
    pub const ALL: [InputGroup; 5] = [
        InputGroup::Control,
        InputGroup::Gp1,
        InputGroup::Gp2,
        InputGroup::LightDev,
        InputGroup::Main,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }

    pub fn spec(self) -> &'static GroupSpec {
        let groups: &'static [GroupSpec] = &INPUT_GROUPS;
        &groups[self.index()]
    }
}

impl OutputGroup {
    pub const ALL: [OutputGroup; 4] = [
        OutputGroup::Control,
        OutputGroup::LightDev,
        OutputGroup::Marquee,
        OutputGroup::Sign,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }

    pub fn spec(self) -> &'static GroupSpec {
        let groups: &'static [GroupSpec] = &OUTPUT_GROUPS;
        &groups[self.index()]
    }
}

/// A profile group of either direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ProfileGroup {
    Input(InputGroup),
    Output(OutputGroup),
}

impl ProfileGroup {
    pub const fn direction(self) -> Direction {
        match self {
            ProfileGroup::Input(_) => Direction::Input,
            ProfileGroup::Output(_) => Direction::Output,
        }
    }

    pub const fn index(self) -> usize {
        match self {
            ProfileGroup::Input(g) => g.index(),
            ProfileGroup::Output(g) => g.index(),
        }
    }

    pub fn spec(self) -> &'static GroupSpec {
        match self {
            ProfileGroup::Input(g) => g.spec(),
            ProfileGroup::Output(g) => g.spec(),
        }
    }

    pub fn name(self) -> &'static str {
        self.spec().name
    }

    /// Every group of one direction, in table order
    pub fn all(direction: Direction) -> &'static [ProfileGroup] {
        const INPUTS: [ProfileGroup; 5] = [
            ProfileGroup::Input(InputGroup::Control),
            ProfileGroup::Input(InputGroup::Gp1),
            ProfileGroup::Input(InputGroup::Gp2),
            ProfileGroup::Input(InputGroup::LightDev),
            ProfileGroup::Input(InputGroup::Main),
        ];
        const OUTPUTS: [ProfileGroup; 4] = [
            ProfileGroup::Output(OutputGroup::Control),
            ProfileGroup::Output(OutputGroup::LightDev),
            ProfileGroup::Output(OutputGroup::Marquee),
            ProfileGroup::Output(OutputGroup::Sign),
        ];
        match direction {
            Direction::Input => &INPUTS,
            Direction::Output => &OUTPUTS,
        }
    }
}

impl From<InputGroup> for ProfileGroup {
    fn from(group: InputGroup) -> Self {
        ProfileGroup::Input(group)
    }
}

impl From<OutputGroup> for ProfileGroup {
    fn from(group: OutputGroup) -> Self {
        ProfileGroup::Output(group)
    }
}

/// A typed profile code: group and space are known from the type
pub trait ProfileLine: Copy {
    const GROUP: ProfileGroup;
    const SPACE: Space;

    fn code(self) -> Code;
}

macro_rules! profile_lines {
    (
        $(#[$meta:meta])*
        $name:ident = $group:expr, $space:ident {
            $($(#[$vmeta:meta])* $variant:ident),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[cfg_attr(feature = "defmt", derive(defmt::Format))]
        #[repr(u16)]
        pub enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];
        }

        impl ProfileLine for $name {
            const GROUP: ProfileGroup = $group;
            const SPACE: Space = Space::$space;

            fn code(self) -> Code {
                self as Code
            }
        }
    };
}

profile_lines! {
    /// Input CONTROL bit codes
    ControlInBit = ProfileGroup::Input(InputGroup::Control), Bit {
        Backlight,
        StoragePower,
        StorageDetect,
        WirelessEnable,
        SoundMute,
    }
}

profile_lines! {
    /// First gamepad bit codes
    Gp1Bit = ProfileGroup::Input(InputGroup::Gp1), Bit {
        Right, Left, Down, Up, Start, Select, A, B, C, X, Y, Z,
    }
}

profile_lines! {
    /// Second gamepad bit codes
    Gp2Bit = ProfileGroup::Input(InputGroup::Gp2), Bit {
        Right, Left, Down, Up, Start, Select, A, B, C, X, Y, Z,
    }
}

profile_lines! {
    /// Main board button codes
    MainBit = ProfileGroup::Input(InputGroup::Main), Bit {
        A, B, C, D,
    }
}

profile_lines! {
    /// Output CONTROL bit codes
    ControlOutBit = ProfileGroup::Output(OutputGroup::Control), Bit {
        Backlight,
        StoragePower,
        StorageEnable,
        WirelessEnable,
        SoundMute,
    }
}

profile_lines! {
    /// Marquee direction bit
    MarqueeBit = ProfileGroup::Output(OutputGroup::Marquee), Bit {
        Dir,
    }
}

profile_lines! {
    /// Marquee range codes
    MarqueeRange = ProfileGroup::Output(OutputGroup::Marquee), Range {
        Step,
        FlashMaxLuminance,
        FlashPhase,
        FlashDuration,
    }
}

profile_lines! {
    /// Status sign LEDs
    SignBit = ProfileGroup::Output(OutputGroup::Sign), Bit {
        Warning, Red, Green, Blue,
    }
}

fn indexed(base: usize, index: u8, limit: usize, what: &str) -> Code {
    if index as usize >= limit {
        violation!("{} index {} out of range (max {})", what, index, limit);
    }
    (base + index as usize) as Code
}

/// Lighting device fault bits, one pair per device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LightDevInBit {
    Overtemp(u8),
    ChannelError(u8),
}

impl ProfileLine for LightDevInBit {
    const GROUP: ProfileGroup = ProfileGroup::Input(InputGroup::LightDev);
    const SPACE: Space = Space::Bit;

    fn code(self) -> Code {
        match self {
            LightDevInBit::Overtemp(d) => indexed(0, d, MAX_LIGHTING_DEVICES, "lighting device"),
            LightDevInBit::ChannelError(d) => {
                indexed(MAX_LIGHTING_DEVICES, d, MAX_LIGHTING_DEVICES, "lighting device")
            }
        }
    }
}

/// Lighting device channel fault masks, one pair per device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LightDevInRange {
    ChannelsShorted(u8),
    ChannelsOpen(u8),
}

impl ProfileLine for LightDevInRange {
    const GROUP: ProfileGroup = ProfileGroup::Input(InputGroup::LightDev);
    const SPACE: Space = Space::Range;

    fn code(self) -> Code {
        match self {
            LightDevInRange::ChannelsShorted(d) => {
                indexed(0, d, MAX_LIGHTING_DEVICES, "lighting device")
            }
            LightDevInRange::ChannelsOpen(d) => {
                indexed(MAX_LIGHTING_DEVICES, d, MAX_LIGHTING_DEVICES, "lighting device")
            }
        }
    }
}

/// Lighting channel reference current and duty cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LightDevOutRange {
    Iref(u8),
    Pwm(u8),
}

impl ProfileLine for LightDevOutRange {
    const GROUP: ProfileGroup = ProfileGroup::Output(OutputGroup::LightDev);
    const SPACE: Space = Space::Range;

    fn code(self) -> Code {
        match self {
            LightDevOutRange::Iref(ch) => indexed(0, ch, MAX_LIGHT_CHANNELS, "light channel"),
            LightDevOutRange::Pwm(ch) => {
                indexed(MAX_LIGHT_CHANNELS, ch, MAX_LIGHT_CHANNELS, "light channel")
            }
        }
    }
}

/// Binding of one profile code to a gateway line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Map {
    /// Gateway backing this code, `None` while unmapped
    pub gateway: Option<GatewayId>,
    /// Line code on the gateway's driver
    pub driver_code: Code,
    /// Largest value the driver line accepts (outputs are clamped to it)
    pub max_value: Value,
}

impl Map {
    pub const UNMAPPED: Map = Map {
        gateway: None,
        driver_code: 0,
        max_value: 0,
    };

    pub fn is_mapped(&self) -> bool {
        self.gateway.is_some()
    }
}

/// Maximum number of groups in one direction
const MAX_GROUPS: usize = 8;

/// Dense map storage for every group of one direction
pub struct ProfileTable<const SLOTS: usize> {
    groups: &'static [GroupSpec],
    attached: [bool; MAX_GROUPS],
    maps: [Map; SLOTS],
}

impl<const SLOTS: usize> ProfileTable<SLOTS> {
    pub fn new(groups: &'static [GroupSpec]) -> Self {
        debug_assert!(groups.len() <= MAX_GROUPS);
        debug_assert_eq!(total_slots(groups), SLOTS);
        Self {
            groups,
            attached: [false; MAX_GROUPS],
            maps: [Map::UNMAPPED; SLOTS],
        }
    }

    pub fn attach(&mut self, group: usize) {
        self.attached[group] = true;
    }

    pub fn is_attached(&self, group: usize) -> bool {
        self.attached[group]
    }

    /// Array index of (group, space, code)
    ///
    /// The group must be attached and the code within the group's range.
    pub fn slot(&self, group: usize, space: Space, code: Code) -> usize {
        let spec = &self.groups[group];
        if !self.attached[group] {
            violation!("profile {} is not attached", spec.name);
        }
        if code >= spec.count(space) {
            violation!(
                "profile {} {:?} code {} out of range (count {})",
                spec.name,
                space,
                code,
                spec.count(space)
            );
        }
        let base: usize = self.groups[..group].iter().map(GroupSpec::slots).sum();
        let offset = match space {
            Space::Bit => 0,
            Space::Range => spec.bits as usize,
        };
        base + offset + code as usize
    }

    pub fn map(&self, slot: usize) -> &Map {
        &self.maps[slot]
    }

    pub fn map_mut(&mut self, slot: usize) -> &mut Map {
        &mut self.maps[slot]
    }
}

/// One mapped profile code, for summaries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MappingRow {
    pub group: ProfileGroup,
    pub space: Space,
    pub code: Code,
    pub gateway: GatewayId,
    pub driver_code: Code,
}

/// Input and output profile tables
pub struct Profiles {
    inputs: ProfileTable<INPUT_MAP_SLOTS>,
    outputs: ProfileTable<OUTPUT_MAP_SLOTS>,
}

impl Profiles {
    pub fn new() -> Self {
        Self {
            inputs: ProfileTable::new(&INPUT_GROUPS),
            outputs: ProfileTable::new(&OUTPUT_GROUPS),
        }
    }

    pub fn attach(&mut self, group: ProfileGroup) {
        match group {
            ProfileGroup::Input(g) => self.inputs.attach(g.index()),
            ProfileGroup::Output(g) => self.outputs.attach(g.index()),
        }
    }

    pub fn is_attached(&self, group: ProfileGroup) -> bool {
        match group {
            ProfileGroup::Input(g) => self.inputs.is_attached(g.index()),
            ProfileGroup::Output(g) => self.outputs.is_attached(g.index()),
        }
    }

    /// Codes a group offers in `space`; 0 if not attached
    pub fn codes(&self, group: ProfileGroup, space: Space) -> Code {
        if self.is_attached(group) {
            group.spec().count(space)
        } else {
            0
        }
    }

    pub fn slot(&self, group: ProfileGroup, space: Space, code: Code) -> usize {
        match group {
            ProfileGroup::Input(g) => self.inputs.slot(g.index(), space, code),
            ProfileGroup::Output(g) => self.outputs.slot(g.index(), space, code),
        }
    }

    pub fn map(&self, direction: Direction, slot: usize) -> &Map {
        match direction {
            Direction::Input => self.inputs.map(slot),
            Direction::Output => self.outputs.map(slot),
        }
    }

    pub fn map_mut(&mut self, direction: Direction, slot: usize) -> &mut Map {
        match direction {
            Direction::Input => self.inputs.map_mut(slot),
            Direction::Output => self.outputs.map_mut(slot),
        }
    }

    /// Mapped entry of an attached group
    ///
    /// `None` if the group is not attached or the code is unmapped. An out
    /// of range code is a contract violation.
    pub fn lookup(&self, group: ProfileGroup, space: Space, code: Code) -> Option<Map> {
        if !self.is_attached(group) {
            return None;
        }
        let map = *self.map(group.direction(), self.slot(group, space, code));
        map.is_mapped().then_some(map)
    }

    /// Mapped codes of every attached group of `direction`
    pub fn mappings(&self, direction: Direction) -> impl Iterator<Item = MappingRow> + '_ {
        ProfileGroup::all(direction).iter().flat_map(move |&group| {
            Space::ALL.into_iter().flat_map(move |space| {
                (0..self.codes(group, space)).filter_map(move |code| {
                    let map = self.lookup(group, space, code)?;
                    Some(MappingRow {
                        group,
                        space,
                        code,
                        gateway: map.gateway?,
                        driver_code: map.driver_code,
                    })
                })
            })
        })
    }
}

impl Default for Profiles {
    fn default() -> Self {
        Self::new()
    }
}
