//! Boot sequence and the running system

use super::{
    summary, Board, BoardStage, Candidate, Console, InputCountdown, Rig, SingletonKind,
    StageContext, StageShape,
};
use crate::config::{REQUIRE_SOUND, REQUIRE_VIDEO};
use crate::device::{Code, Direction, RandomDevice, SoundDevice, VideoDevice};
use crate::mio::{InputGroup, Mio, RemapPolicy};
use crate::{Ticks, FRAMEWORK_NAME, FRAMEWORK_VERSION};

/// Enforces the one-way walk through the stage list
struct Sequence {
    current: Option<BoardStage>,
}

impl Sequence {
    fn new() -> Self {
        Self { current: None }
    }

    fn enter(&mut self, stage: BoardStage) {
        let expected = match self.current {
            None => Some(BoardStage::InitHardware),
            Some(current) => current.next(),
        };
        if expected != Some(stage) {
            violation!("boot: stage {:?} out of order (expected {:?})", stage, expected);
        }
        debug!("boot: {}", stage.name());
        self.current = Some(stage);
    }
}

/// Run both handlers for `stage` and pick the winning candidate
fn run_stage<'d>(
    stage: BoardStage,
    board: &mut dyn Board<'d>,
    rig: Option<&mut (dyn Rig<'d> + '_)>,
    mio: &mut Mio<'d>,
    console: Option<&mut Console<'d>>,
) -> Option<Candidate<'d>> {
    let mut ctx = StageContext::new(stage, mio, console);
    let from_board = board.stage_change(&mut ctx);
    let from_rig = match rig {
        Some(rig) => rig.stage_change(&mut ctx),
        None => None,
    };

    let chosen = match (from_board, from_rig) {
        (Some(board_offer), Some(rig_offer)) => {
            debug!(
                "boot: {}: rig {} overrides board {}",
                stage.name(),
                rig_offer.description(),
                board_offer.description()
            );
            Some(rig_offer)
        }
        (board_offer, None) => board_offer,
        (None, rig_offer) => rig_offer,
    };

    if let Some(candidate) = &chosen {
        match stage.shape() {
            StageShape::Select(kind) if kind == candidate.kind() => {}
            StageShape::Select(kind) => violation!(
                "boot: {} expects a {:?} device, got {:?} ({})",
                stage.name(),
                kind,
                candidate.kind(),
                candidate.description()
            ),
            StageShape::SideEffect => violation!(
                "boot: {} does not select devices, got {}",
                stage.name(),
                candidate.description()
            ),
        }
    }
    chosen
}

/// A booted board: the multiplexer and the selected singletons
pub struct System<'d> {
    mio: Mio<'d>,
    console: Console<'d>,
    random: Option<&'d mut dyn RandomDevice>,
    video: Option<&'d mut dyn VideoDevice>,
    sound: Option<&'d mut dyn SoundDevice>,
    stage: BoardStage,
}

impl<'d> System<'d> {
    /// Bring the board (and rig) up through every stage up to `Ready`
    ///
    /// Panics if no debug stream is offered, if a required video or sound
    /// driver is missing, or on any contract violation raised by a handler.
    pub fn boot(
        board: &mut dyn Board<'d>,
        mut rig: Option<&mut dyn Rig<'d>>,
        app_name: &str,
    ) -> Self {
        let mut sequence = Sequence::new();
        let mut mio = Mio::new();

        // nothing can be reported until a debug stream exists
        sequence.enter(BoardStage::InitHardware);
        run_stage(BoardStage::InitHardware, board, rig.as_deref_mut(), &mut mio, None);

        sequence.enter(BoardStage::InitDebugStreamDriver);
        let stream = match run_stage(
            BoardStage::InitDebugStreamDriver,
            board,
            rig.as_deref_mut(),
            &mut mio,
            None,
        ) {
            Some(Candidate::DebugStream(stream)) => stream,
            _ => {
                board.early_failure("no debug stream");
                violation!("boot: {} provided no debug stream", board.identity());
            }
        };
        let mut console = Console::new(stream);

        sequence.enter(BoardStage::Greetings);
        console.line(format_args!("{} {}", FRAMEWORK_NAME, FRAMEWORK_VERSION));
        console.line(format_args!("board: {}", board.identity()));
        console.line(format_args!("application: {}", app_name));
        if let Some(rig) = rig.as_deref() {
            console.line(format_args!("rig: {}", rig.identity()));
        }
        run_stage(
            BoardStage::Greetings,
            board,
            rig.as_deref_mut(),
            &mut mio,
            Some(&mut console),
        );

        console.open("board init");

        let mut random = None;
        let mut video = None;
        let mut sound = None;

        let mut stage = BoardStage::InitIoProfiles;
        while stage != BoardStage::Ready {
            sequence.enter(stage);
            console.open(stage.name());

            if stage.is_io_level() {
                for direction in Direction::ALL {
                    mio.set_map_action(direction, RemapPolicy::Overwrite);
                }
            }

            let chosen = run_stage(stage, board, rig.as_deref_mut(), &mut mio, Some(&mut console));
            if let Some(candidate) = &chosen {
                console.line(format_args!("driver: {}", candidate.description()));
            }

            match chosen {
                Some(Candidate::Random(device)) => random = Some(device),
                Some(Candidate::Video(device)) => video = Some(device),
                Some(Candidate::Sound(device)) => sound = Some(device),
                // kind already checked by run_stage
                Some(Candidate::DebugStream(_)) | None => {}
            }

            match stage {
                BoardStage::InitIoProfiles => summary::profiles(&mut console, &mio),
                BoardStage::InitScreenDrivers if video.is_none() => {
                    Self::missing(&mut console, SingletonKind::Video, REQUIRE_VIDEO)
                }
                BoardStage::InitSoundDriver if sound.is_none() => {
                    Self::missing(&mut console, SingletonKind::Sound, REQUIRE_SOUND)
                }
                BoardStage::InitIoLevel3Drivers => {
                    summary::gateways(&mut console, &mio);
                    summary::mappings(&mut console, &mio);
                }
                _ => {}
            }

            console.close();
            stage = match stage.next() {
                Some(next) => next,
                None => violation!("boot: sequence ended before ready"),
            };
        }

        console.close();
        console.flush();

        // tables are read-only from here on
        mio.freeze();
        sequence.enter(BoardStage::Ready);
        run_stage(
            BoardStage::Ready,
            board,
            rig.as_deref_mut(),
            &mut mio,
            Some(&mut console),
        );
        info!("boot: ready");

        Self {
            mio,
            console,
            random,
            video,
            sound,
            stage: BoardStage::Ready,
        }
    }

    fn missing(console: &mut Console<'_>, kind: SingletonKind, required: bool) {
        if required {
            violation!("boot: required {:?} driver missing", kind);
        }
        warn!("boot: no {:?} driver", kind);
        console.line(format_args!("driver: none"));
    }

    /// Poll every IO driver; call once per frame
    pub fn update(&mut self, now: Ticks) {
        self.mio.update(now);
    }

    /// Start an [`InputCountdown`] on `(group, Bit, code)`, announced on
    /// the console
    pub fn countdown(
        &mut self,
        group: InputGroup,
        code: Code,
        duration: Ticks,
        now: Ticks,
        message: &str,
    ) -> InputCountdown {
        InputCountdown::start(&mut self.console, &self.mio, group, code, duration, now, message)
    }

    pub fn mio(&mut self) -> &mut Mio<'d> {
        &mut self.mio
    }

    pub fn console(&mut self) -> &mut Console<'d> {
        &mut self.console
    }

    pub fn random(&mut self) -> Option<&mut dyn RandomDevice> {
        match &mut self.random {
            Some(device) => Some(&mut **device),
            None => None,
        }
    }

    pub fn video(&mut self) -> Option<&mut dyn VideoDevice> {
        match &mut self.video {
            Some(device) => Some(&mut **device),
            None => None,
        }
    }

    pub fn sound(&mut self) -> Option<&mut dyn SoundDevice> {
        match &mut self.sound {
            Some(device) => Some(&mut **device),
            None => None,
        }
    }

    pub fn stage(&self) -> BoardStage {
        self.stage
    }

    /// Run the `ShutdownHardware` stage; the system is gone afterwards
    pub fn shutdown(mut self, board: &mut dyn Board<'d>, rig: Option<&mut dyn Rig<'d>>) {
        warn!("boot: shutting down");
        self.console.line(format_args!("shutdown"));
        self.console.flush();
        self.stage = BoardStage::ShutdownHardware;
        run_stage(
            BoardStage::ShutdownHardware,
            board,
            rig,
            &mut self.mio,
            Some(&mut self.console),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::console::tests::Capture;
    use crate::device::{Capabilities, Code, Device, IoDevice, Port, Space, Value};
    use crate::mio::{Gp1Bit, InputGroup, ProfileLine};
    use heapless::Vec;

    struct Fixed {
        name: &'static str,
        value: u32,
    }

    impl Device for Fixed {
        fn description(&self) -> &'static str {
            self.name
        }
    }

    impl RandomDevice for Fixed {
        fn next_u32(&mut self) -> u32 {
            self.value
        }
    }

    struct Screen;

    impl Device for Screen {
        fn description(&self) -> &'static str {
            "screen"
        }
    }

    impl VideoDevice for Screen {
        fn resolution(&self) -> (u16, u16) {
            (320, 240)
        }

        fn frame_count(&self) -> u32 {
            0
        }
    }

    struct Keys {
        name: &'static str,
        labels: [&'static str; 2],
    }

    impl Device for Keys {
        fn description(&self) -> &'static str {
            self.name
        }
    }

    impl IoDevice for Keys {
        fn capabilities(&self) -> Capabilities {
            Capabilities::new(1).with_inputs(Space::Bit, 2)
        }

        fn update(&mut self) {}

        fn get_input(&mut self, _space: Space, _code: Code, _port: Port) -> Value {
            0
        }

        fn input_name(&self, _space: Space, code: Code) -> &'static str {
            self.labels[code as usize]
        }
    }

    struct TestBoard<'d> {
        stream: Option<&'d mut Capture>,
        random: Option<&'d mut Fixed>,
        video: Option<&'d mut Screen>,
        keys: Option<&'d mut Keys>,
        random_at: BoardStage,
        seen: Vec<BoardStage, 16>,
    }

    impl<'d> TestBoard<'d> {
        fn new(stream: &'d mut Capture) -> Self {
            Self {
                stream: Some(stream),
                random: None,
                video: None,
                keys: None,
                random_at: BoardStage::InitRandomDriver,
                seen: Vec::new(),
            }
        }
    }

    impl<'d> Board<'d> for TestBoard<'d> {
        fn identity(&self) -> &'static str {
            "test board"
        }

        fn stage_change(&mut self, ctx: &mut StageContext<'_, 'd>) -> Option<Candidate<'d>> {
            let _ = self.seen.push(ctx.stage);
            if ctx.stage == self.random_at {
                return self.random.take().map(|r| Candidate::Random(r));
            }
            match ctx.stage {
                BoardStage::InitDebugStreamDriver => {
                    self.stream.take().map(|s| Candidate::DebugStream(s))
                }
                BoardStage::Greetings => {
                    ctx.line(format_args!("board says hi"));
                    None
                }
                BoardStage::InitIoProfiles => {
                    ctx.mio.attach_profile(InputGroup::Gp1);
                    None
                }
                BoardStage::InitScreenDrivers => self.video.take().map(|v| Candidate::Video(v)),
                BoardStage::InitIoLevel1Drivers => {
                    if let Some(keys) = self.keys.take() {
                        let d = ctx.mio.attach_driver(keys);
                        ctx.mio.register_gateway(Direction::Input, d, 0);
                        ctx.mio.map_line(Gp1Bit::A, 0);
                        ctx.mio.map_line(Gp1Bit::B, 1);
                    }
                    None
                }
                _ => None,
            }
        }

        fn early_failure(&mut self, reason: &str) {
            panic!("early failure: {}", reason);
        }
    }

    struct TestRig<'d> {
        random: Option<&'d mut Fixed>,
        keys: Option<&'d mut Keys>,
        seen: Vec<BoardStage, 16>,
    }

    impl<'d> Rig<'d> for TestRig<'d> {
        fn identity(&self) -> &'static str {
            "test rig"
        }

        fn stage_change(&mut self, ctx: &mut StageContext<'_, 'd>) -> Option<Candidate<'d>> {
            let _ = self.seen.push(ctx.stage);
            match ctx.stage {
                BoardStage::InitRandomDriver => self.random.take().map(|r| Candidate::Random(r)),
                BoardStage::InitIoLevel1Drivers => {
                    if let Some(keys) = self.keys.take() {
                        let d = ctx.mio.attach_driver(keys);
                        ctx.mio.register_gateway(Direction::Input, d, 0);
                        ctx.mio.map_line(Gp1Bit::A, 1);
                    }
                    None
                }
                _ => None,
            }
        }
    }

    #[test]
    fn test_boot_walks_every_stage_in_order() {
        let mut capture = Capture::new();
        {
            let mut board = TestBoard::new(&mut capture);
            let mut rig = TestRig {
                random: None,
                keys: None,
                seen: Vec::new(),
            };
            let system = System::boot(&mut board, Some(&mut rig), "demo");
            assert_eq!(system.stage(), BoardStage::Ready);
            assert_eq!(board.seen.as_slice(), &BoardStage::BOOT[..]);
            assert_eq!(rig.seen.as_slice(), &BoardStage::BOOT[..]);

            system.shutdown(&mut board, Some(&mut rig));
            assert_eq!(board.seen.last(), Some(&BoardStage::ShutdownHardware));
            assert_eq!(rig.seen.last(), Some(&BoardStage::ShutdownHardware));
        }

        let text = capture.text.as_str();
        assert!(text.starts_with("Ferrule "));
        assert!(text.contains("board: test board\napplication: demo\nrig: test rig\nboard says hi\nboard init\n"));
        assert!(text.contains("  init random\n"));
        // greetings come before the log context opens
        assert!(text.find("board says hi") < text.find("board init"));
    }

    #[test]
    fn test_rig_random_wins() {
        let mut capture = Capture::new();
        let mut random_a = Fixed {
            name: "rng a",
            value: 1,
        };
        let mut random_b = Fixed {
            name: "rng b",
            value: 2,
        };
        let mut board = TestBoard::new(&mut capture);
        board.random = Some(&mut random_a);
        let mut rig = TestRig {
            random: Some(&mut random_b),
            keys: None,
            seen: Vec::new(),
        };

        let mut system = System::boot(&mut board, Some(&mut rig), "demo");
        let random = system.random().unwrap();
        assert_eq!(random.description(), "rng b");
        assert_eq!(random.next_u32(), 2);
    }

    #[test]
    fn test_board_random_used_without_rig() {
        let mut capture = Capture::new();
        let mut random_a = Fixed {
            name: "rng a",
            value: 1,
        };
        let mut board = TestBoard::new(&mut capture);
        board.random = Some(&mut random_a);

        let mut system = System::boot(&mut board, None, "demo");
        assert_eq!(system.random().unwrap().description(), "rng a");
        assert!(system.sound().is_none());
    }

    #[test]
    fn test_rig_mapping_overwrites_board() {
        let mut capture = Capture::new();
        let mut board_keys = Keys {
            name: "board keys",
            labels: ["b0", "b1"],
        };
        let mut rig_keys = Keys {
            name: "rig keys",
            labels: ["r0", "r1"],
        };
        let mut board = TestBoard::new(&mut capture);
        board.keys = Some(&mut board_keys);
        let mut rig = TestRig {
            random: None,
            keys: Some(&mut rig_keys),
            seen: Vec::new(),
        };

        let mut system = System::boot(&mut board, Some(&mut rig), "demo");
        let mio = system.mio();
        assert_eq!(mio.mapped_name(InputGroup::Gp1, Space::Bit, Gp1Bit::A.code()), Some("r1"));
        assert_eq!(mio.mapped_name(InputGroup::Gp1, Space::Bit, Gp1Bit::B.code()), Some("b1"));
        assert_eq!(mio.gateway_count(Direction::Input), 2);
        assert_eq!(mio.phase(), crate::mio::Phase::Run);
    }

    #[test]
    fn test_missing_video_is_reported() {
        let mut capture = Capture::new();
        {
            let mut board = TestBoard::new(&mut capture);
            let mut system = System::boot(&mut board, None, "demo");
            assert!(system.video().is_none());
        }
        assert!(capture.text.as_str().contains("init screen\n    driver: none\n"));
    }

    #[test]
    fn test_video_selected() {
        let mut capture = Capture::new();
        let mut screen = Screen;
        let mut board = TestBoard::new(&mut capture);
        board.video = Some(&mut screen);
        let mut system = System::boot(&mut board, None, "demo");
        assert_eq!(system.video().unwrap().resolution(), (320, 240));
    }

    #[test]
    #[should_panic(expected = "early failure: no debug stream")]
    fn test_missing_debug_stream_fails_early() {
        let mut capture = Capture::new();
        let mut board = TestBoard::new(&mut capture);
        board.stream = None;
        System::boot(&mut board, None, "demo");
    }

    #[test]
    #[should_panic(expected = "map after Ready")]
    fn test_map_after_ready_panics() {
        let mut capture = Capture::new();
        let mut board = TestBoard::new(&mut capture);
        let mut system = System::boot(&mut board, None, "demo");
        system.mio().map_line(Gp1Bit::A, 0);
    }

    #[test]
    #[should_panic(expected = "register_gateway after Ready")]
    fn test_register_after_ready_panics() {
        let mut capture = Capture::new();
        let mut keys = Keys {
            name: "late keys",
            labels: ["l0", "l1"],
        };
        let mut board = TestBoard::new(&mut capture);
        board.keys = Some(&mut keys);
        let mut system = System::boot(&mut board, None, "demo");
        let mio = system.mio();
        let (_, gateway) = mio.gateways(Direction::Input).next().unwrap();
        mio.register_gateway(Direction::Input, gateway.driver, 0);
    }

    #[test]
    #[should_panic(expected = "init screen expects a Video device, got Random (rng a)")]
    fn test_wrong_candidate_kind_panics() {
        let mut capture = Capture::new();
        let mut random_a = Fixed {
            name: "rng a",
            value: 1,
        };
        let mut board = TestBoard::new(&mut capture);
        board.random = Some(&mut random_a);
        board.random_at = BoardStage::InitScreenDrivers;
        System::boot(&mut board, None, "demo");
    }

    #[test]
    #[should_panic(expected = "init io level 1 does not select devices, got rng b")]
    fn test_candidate_at_side_effect_stage_panics() {
        let mut capture = Capture::new();
        let mut random_b = Fixed {
            name: "rng b",
            value: 2,
        };
        let mut board = TestBoard::new(&mut capture);
        board.random = Some(&mut random_b);
        board.random_at = BoardStage::InitIoLevel1Drivers;
        System::boot(&mut board, None, "demo");
    }

    #[test]
    #[should_panic(expected = "required Video driver missing")]
    fn test_required_video_missing_panics() {
        let mut capture = Capture::new();
        let mut console = Console::new(&mut capture);
        System::missing(&mut console, SingletonKind::Video, true);
    }

    #[test]
    #[should_panic(expected = "required Sound driver missing")]
    fn test_required_sound_missing_panics() {
        let mut capture = Capture::new();
        let mut console = Console::new(&mut capture);
        System::missing(&mut console, SingletonKind::Sound, true);
    }
}
