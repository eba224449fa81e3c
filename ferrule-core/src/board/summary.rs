//! Bring-up summaries printed on the boot console

use super::Console;
use crate::device::{Direction, Space};
use crate::mio::{Mio, ProfileGroup};

/// Attached profile groups with their line counts
pub fn profiles(console: &mut Console<'_>, mio: &Mio<'_>) {
    console.open("profiles");
    for direction in Direction::ALL {
        let mut attached = 0;
        for &group in ProfileGroup::all(direction) {
            if !mio.has_profile(group) {
                continue;
            }
            attached += 1;
            console.line(format_args!(
                "{:<6} {:<8} {} bits {} ranges",
                direction.name(),
                group.name(),
                mio.profile_codes(group, Space::Bit),
                mio.profile_codes(group, Space::Range)
            ));
        }
        if attached == 0 {
            console.line(format_args!("{:<6} none", direction.name()));
        }
    }
    console.close();
}

/// Registered gateways, per direction
pub fn gateways(console: &mut Console<'_>, mio: &Mio<'_>) {
    console.open("gateways");
    for direction in Direction::ALL {
        if mio.gateway_count(direction) == 0 {
            console.line(format_args!("{:<6} none", direction.name()));
            continue;
        }
        for (id, gateway) in mio.gateways(direction) {
            console.line(format_args!(
                "{:<6} #{} {} port {}",
                direction.name(),
                id.index(),
                mio.driver(gateway.driver).description(),
                gateway.port
            ));
        }
    }
    console.close();
}

/// Every mapped profile code with the driver line behind it
pub fn mappings(console: &mut Console<'_>, mio: &Mio<'_>) {
    console.open("mappings");
    for direction in Direction::ALL {
        for row in mio.mappings(direction) {
            let name = mio
                .mapped_name(row.group, row.space, row.code)
                .unwrap_or("?");
            console.line(format_args!(
                "{:<8} {:<5} {:>2} -> #{} line {:>2} {}",
                row.group.name(),
                row.space.name(),
                row.code,
                row.gateway.index(),
                row.driver_code,
                name
            ));
        }
    }
    console.close();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::console::tests::Capture;
    use crate::device::{Capabilities, Code, Device, IoDevice, Port, Value};
    use crate::mio::{Gp1Bit, InputGroup, OutputGroup, SignBit};

    struct Pad;

    impl Device for Pad {
        fn description(&self) -> &'static str {
            "pad"
        }
    }

    impl IoDevice for Pad {
        fn capabilities(&self) -> Capabilities {
            Capabilities::new(1)
                .with_inputs(Space::Bit, 2)
                .with_outputs(Space::Bit, 1)
        }

        fn update(&mut self) {}

        fn get_input(&mut self, _space: Space, _code: Code, _port: Port) -> Value {
            0
        }

        fn set_output(&mut self, _space: Space, _code: Code, _port: Port, _value: Value) {}

        fn input_name(&self, _space: Space, code: Code) -> &'static str {
            ["fire", "jump"][code as usize]
        }

        fn output_name(&self, _space: Space, _code: Code) -> &'static str {
            "lamp"
        }
    }

    #[test]
    fn test_summaries_list_tables() {
        let mut pad = Pad;
        let mut mio = Mio::new();
        mio.attach_profile(InputGroup::Gp1);
        mio.attach_profile(OutputGroup::Sign);
        let d = mio.attach_driver(&mut pad);
        mio.register_gateway(Direction::Input, d, 0);
        mio.map_line(Gp1Bit::A, 1);
        mio.register_gateway(Direction::Output, d, 0);
        mio.map_line(SignBit::Red, 0);

        let mut capture = Capture::new();
        {
            let mut console = Console::new(&mut capture);
            profiles(&mut console, &mio);
            gateways(&mut console, &mio);
            mappings(&mut console, &mio);
            assert_eq!(console.depth(), 0);
        }

        let text = capture.text.as_str();
        assert!(text.contains("input  GP1      12 bits 0 ranges"));
        assert!(text.contains("output SIGN     4 bits 0 ranges"));
        assert!(text.contains("input  #0 pad port 0"));
        assert!(text.contains("-> #0 line  1 jump"));
        assert!(text.contains("lamp"));
    }
}
