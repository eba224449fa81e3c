//! Boot stages
//!
//! Bring-up is a fixed, ordered, one-shot walk through these stages. Board
//! and rig handlers see every stage; a few stages select a singleton
//! device instead of just running side effects.

/// One step of board bring-up
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BoardStage {
    /// Clocks, power rails, tick timer
    InitHardware,
    /// Select the debug stream (mandatory)
    InitDebugStreamDriver,
    /// Identity lines are written; handlers may add their own
    Greetings,
    /// Attach the profile groups the board supports
    InitIoProfiles,
    /// Select the random number source
    InitRandomDriver,
    /// First IO level: on-board buttons and LEDs
    InitIoLevel1Drivers,
    /// Communication drivers (serial, network)
    InitCommDrivers,
    /// Storage drivers
    InitStorageDrivers,
    /// Second IO level: drivers that need comm or storage
    InitIoLevel2Drivers,
    /// Select the video driver
    InitScreenDrivers,
    /// Select the sound driver
    InitSoundDriver,
    /// Third IO level: late overrides
    InitIoLevel3Drivers,
    /// Bring-up complete; tables are frozen
    Ready,
    /// Power down
    ShutdownHardware,
}

/// Singleton kinds chosen by selecting stages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SingletonKind {
    DebugStream,
    Random,
    Video,
    Sound,
}

/// What a stage expects from its handlers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StageShape {
    /// Handlers run for their side effects only
    SideEffect,
    /// Handlers may offer a device of this kind
    Select(SingletonKind),
}

impl BoardStage {
    /// Stages run by boot, in order
    pub const BOOT: [BoardStage; 13] = [
        BoardStage::InitHardware,
        BoardStage::InitDebugStreamDriver,
        BoardStage::Greetings,
        BoardStage::InitIoProfiles,
        BoardStage::InitRandomDriver,
        BoardStage::InitIoLevel1Drivers,
        BoardStage::InitCommDrivers,
        BoardStage::InitStorageDrivers,
        BoardStage::InitIoLevel2Drivers,
        BoardStage::InitScreenDrivers,
        BoardStage::InitSoundDriver,
        BoardStage::InitIoLevel3Drivers,
        BoardStage::Ready,
    ];

    /// The stage that must follow this one
    pub fn next(self) -> Option<BoardStage> {
        use BoardStage::*;

        match self {
            InitHardware => Some(InitDebugStreamDriver),
            InitDebugStreamDriver => Some(Greetings),
            Greetings => Some(InitIoProfiles),
            InitIoProfiles => Some(InitRandomDriver),
            InitRandomDriver => Some(InitIoLevel1Drivers),
            InitIoLevel1Drivers => Some(InitCommDrivers),
            InitCommDrivers => Some(InitStorageDrivers),
            InitStorageDrivers => Some(InitIoLevel2Drivers),
            InitIoLevel2Drivers => Some(InitScreenDrivers),
            InitScreenDrivers => Some(InitSoundDriver),
            InitSoundDriver => Some(InitIoLevel3Drivers),
            InitIoLevel3Drivers => Some(Ready),
            Ready => Some(ShutdownHardware),
            ShutdownHardware => None,
        }
    }

    pub fn shape(self) -> StageShape {
        match self {
            BoardStage::InitDebugStreamDriver => StageShape::Select(SingletonKind::DebugStream),
            BoardStage::InitRandomDriver => StageShape::Select(SingletonKind::Random),
            BoardStage::InitScreenDrivers => StageShape::Select(SingletonKind::Video),
            BoardStage::InitSoundDriver => StageShape::Select(SingletonKind::Sound),
            _ => StageShape::SideEffect,
        }
    }

    /// Whether IO drivers are registered and mapped in this stage
    pub fn is_io_level(self) -> bool {
        matches!(
            self,
            BoardStage::InitIoLevel1Drivers
                | BoardStage::InitIoLevel2Drivers
                | BoardStage::InitIoLevel3Drivers
        )
    }

    /// Whether the multiplexer still accepts registrations
    pub fn is_setup(self) -> bool {
        self < BoardStage::Ready
    }

    pub fn name(self) -> &'static str {
        match self {
            BoardStage::InitHardware => "init hardware",
            BoardStage::InitDebugStreamDriver => "init debug stream",
            BoardStage::Greetings => "greetings",
            BoardStage::InitIoProfiles => "init io profiles",
            BoardStage::InitRandomDriver => "init random",
            BoardStage::InitIoLevel1Drivers => "init io level 1",
            BoardStage::InitCommDrivers => "init comm",
            BoardStage::InitStorageDrivers => "init storage",
            BoardStage::InitIoLevel2Drivers => "init io level 2",
            BoardStage::InitScreenDrivers => "init screen",
            BoardStage::InitSoundDriver => "init sound",
            BoardStage::InitIoLevel3Drivers => "init io level 3",
            BoardStage::Ready => "ready",
            BoardStage::ShutdownHardware => "shutdown",
        }
    }
}
