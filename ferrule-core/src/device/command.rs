//! Device command protocol
//!
//! A single string-keyed entry point lets drivers expose their own tuning
//! knobs without growing the [`Device`] trait. Names follow the grammar
//! `^(s|g|x)\|[A-Za-z0-9_.]+$`: a kind letter (set, get, execute), a pipe
//! and a dotted identifier such as `s|uart.baud`.
//!
//! Names are parsed into a [`CommandName`] before any driver sees them, so
//! a malformed name can never reach [`Device::command`].

use super::{Device, Variant};

/// Well-known command names
pub mod names {
    pub const HOSTNAME: &str = "s|hostname";
    pub const WIFI_SSID: &str = "s|wifi.ssid";
    pub const PASSWORD: &str = "s|password";
    pub const UART_BAUD: &str = "s|uart.baud";
    pub const UART_HWFLOW: &str = "s|uart.hwflow";
    pub const SPEED: &str = "s|speed";
    pub const FRAMEBITS: &str = "s|framebits";
    pub const IP_TCP_PORT: &str = "s|ip.tcp.port";
    pub const IP_UDP_PORT: &str = "s|ip.udp.port";
    pub const SEED: &str = "s|seed";
    pub const POWEROFF: &str = "x|poweroff";
}

/// What a command does with its value slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommandKind {
    /// `s|` - apply the value; the driver may normalize it in place
    Set,
    /// `g|` - store the current value into the slot
    Get,
    /// `x|` - perform an action; the slot may carry an argument or result
    Execute,
}

impl CommandKind {
    fn from_prefix(c: u8) -> Option<Self> {
        match c {
            b's' => Some(CommandKind::Set),
            b'g' => Some(CommandKind::Get),
            b'x' => Some(CommandKind::Execute),
            _ => None,
        }
    }

    pub const fn verb(self) -> &'static str {
        match self {
            CommandKind::Set => "set",
            CommandKind::Get => "get",
            CommandKind::Execute => "exec",
        }
    }
}

/// Reasons a command name is rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommandNameError {
    /// Shorter than `k|i`
    TooShort,
    /// First character is not `s`, `g` or `x`
    UnknownKind,
    /// Second character is not `|`
    MissingSeparator,
    /// Identifier contains something other than `[A-Za-z0-9_.]`
    InvalidCharacter,
}

/// Outcome of a device command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommandResult {
    /// Recognized and carried out
    Ok,
    /// The driver does not know this name
    NotHandled,
    /// The driver has no command handler at all
    NoMethod,
    /// Recognized but could not be carried out
    Failed,
}

/// A validated command name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CommandName<'a> {
    raw: &'a str,
    kind: CommandKind,
}

impl<'a> CommandName<'a> {
    /// Validate `raw` against the command grammar
    pub fn parse(raw: &'a str) -> Result<Self, CommandNameError> {
        let bytes = raw.as_bytes();
        if bytes.len() < 3 {
            return Err(CommandNameError::TooShort);
        }
        let kind = CommandKind::from_prefix(bytes[0]).ok_or(CommandNameError::UnknownKind)?;
        if bytes[1] != b'|' {
            return Err(CommandNameError::MissingSeparator);
        }
        let valid = bytes[2..]
            .iter()
            .all(|&b| b.is_ascii_alphanumeric() || b == b'_' || b == b'.');
        if !valid {
            return Err(CommandNameError::InvalidCharacter);
        }
        Ok(Self { raw, kind })
    }

    pub fn kind(&self) -> CommandKind {
        self.kind
    }

    /// Dotted identifier without the kind prefix
    pub fn id(&self) -> &'a str {
        &self.raw[2..]
    }

    /// Full name including the kind prefix
    pub fn as_str(&self) -> &'a str {
        self.raw
    }
}

impl PartialEq<&str> for CommandName<'_> {
    fn eq(&self, other: &&str) -> bool {
        self.raw == *other
    }
}

/// Send a command to `device`
///
/// Rejects malformed names without touching the device. Everything else
/// is logged: the request, a warning for `NotHandled`/`NoMethod`/`Failed`,
/// and for a successful set whether the driver applied the value as
/// requested or modified it.
pub fn dispatch<D: Device + ?Sized>(
    device: &mut D,
    name: &str,
    value: &mut Variant,
) -> Result<CommandResult, CommandNameError> {
    let name = match CommandName::parse(name) {
        Ok(name) => name,
        Err(e) => {
            warn!("{}: rejected command name {:?}: {:?}", device.description(), name, e);
            return Err(e);
        }
    };

    let requested = value.clone();
    match name.kind() {
        CommandKind::Set => info!("{}: set {} = {}", device.description(), name.id(), requested),
        CommandKind::Get => info!("{}: get {}", device.description(), name.id()),
        CommandKind::Execute => info!("{}: exec {}", device.description(), name.id()),
    }

    let result = device.command(&name, value);
    match (result, name.kind()) {
        (CommandResult::Ok, CommandKind::Set) => {
            if *value == requested {
                info!("{}: {} applied as requested", device.description(), name.id());
            } else {
                info!(
                    "{}: {} modified: {} -> {}",
                    device.description(),
                    name.id(),
                    requested,
                    value
                );
            }
        }
        (CommandResult::Ok, _) => info!("{}: {} -> {}", device.description(), name.id(), value),
        (CommandResult::NotHandled, _) => {
            warn!("{}: {} not handled", device.description(), name.as_str())
        }
        (CommandResult::NoMethod, _) => {
            warn!("{}: no command handler", device.description())
        }
        (CommandResult::Failed, _) => warn!("{}: {} failed", device.description(), name.as_str()),
    }
    Ok(result)
}
