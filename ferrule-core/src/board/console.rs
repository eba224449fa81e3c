//! Boot console
//!
//! Line-oriented writer over the selected debug stream. Lines are indented
//! by the number of open log contexts, so the whole bring-up reads as one
//! nested tree:
//!
//! ```text
//! Ferrule 0.1.0
//! board: hosted simulator
//! board init
//!   profiles
//!     input  GP1  12 bits 0 ranges
//!   ...
//! ```

use core::fmt;

use heapless::Vec;

use crate::config::MAX_CONSOLE_DEPTH;
use crate::device::DebugStream;

const INDENT: &str = "  ";

pub struct Console<'d> {
    stream: &'d mut dyn DebugStream,
    contexts: Vec<&'static str, MAX_CONSOLE_DEPTH>,
}

impl<'d> Console<'d> {
    pub fn new(stream: &'d mut dyn DebugStream) -> Self {
        Self {
            stream,
            contexts: Vec::new(),
        }
    }

    pub fn description(&self) -> &'static str {
        self.stream.description()
    }

    /// Write one indented line
    ///
    /// Stream write errors are dropped: there is no other channel to
    /// report them on.
    pub fn line(&mut self, args: fmt::Arguments<'_>) {
        for _ in 0..self.contexts.len() {
            let _ = self.stream.write_str(INDENT);
        }
        let _ = self.stream.write_fmt(args);
        let _ = self.stream.write_str("\n");
    }

    /// Write `args` without indentation or line ending
    pub fn raw(&mut self, args: fmt::Arguments<'_>) {
        let _ = self.stream.write_fmt(args);
    }

    /// Print `name` and indent everything up to the matching [`close`](Console::close)
    pub fn open(&mut self, name: &'static str) {
        self.line(format_args!("{}", name));
        if self.contexts.push(name).is_err() {
            violation!("console: context {} exceeds depth {}", name, MAX_CONSOLE_DEPTH);
        }
    }

    /// Close the innermost context
    pub fn close(&mut self) {
        match self.contexts.pop() {
            Some(name) => trace!("console: closed {}", name),
            None => violation!("console: close without open context"),
        }
    }

    pub fn depth(&self) -> usize {
        self.contexts.len()
    }

    pub fn flush(&mut self) {
        self.stream.flush();
    }

    pub fn stream_mut(&mut self) -> &mut dyn DebugStream {
        &mut *self.stream
    }
}
