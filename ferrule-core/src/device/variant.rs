//! Dynamically typed command value

use core::fmt;

use heapless::String;

/// Longest string a [`Variant`] can carry
pub const MAX_VARIANT_STR: usize = 32;

/// In/out value slot of a device command
///
/// The caller fills it with the requested value; a driver handling a set
/// command may replace it with the value actually applied.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Variant {
    #[default]
    None,
    Bool(bool),
    Uint(u32),
    Int(i32),
    Float(f32),
    Str(String<MAX_VARIANT_STR>),
}

impl Variant {
    /// Build a string variant, `None` if `text` does not fit
    pub fn text(text: &str) -> Option<Self> {
        String::try_from(text).ok().map(Variant::Str)
    }

    /// Unsigned view, accepting non-negative integers of either sign
    pub fn as_uint(&self) -> Option<u32> {
        match *self {
            Variant::Uint(v) => Some(v),
            Variant::Int(v) => u32::try_from(v).ok(),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match *self {
            Variant::Bool(v) => Some(v),
            Variant::Uint(v) => Some(v != 0),
            Variant::Int(v) => Some(v != 0),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Variant::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Variant::None)
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Variant::None => f.write_str("(none)"),
            Variant::Bool(v) => write!(f, "{}", v),
            Variant::Uint(v) => write!(f, "{}", v),
            Variant::Int(v) => write!(f, "{}", v),
            Variant::Float(v) => write!(f, "{}", v),
            Variant::Str(s) => write!(f, "\"{}\"", s),
        }
    }
}

impl From<u32> for Variant {
    fn from(v: u32) -> Self {
        Variant::Uint(v)
    }
}

impl From<i32> for Variant {
    fn from(v: i32) -> Self {
        Variant::Int(v)
    }
}

impl From<bool> for Variant {
    fn from(v: bool) -> Self {
        Variant::Bool(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::fmt::Write;

    fn render(v: &Variant) -> String<48> {
        let mut out = String::new();
        write!(out, "{}", v).unwrap();
        out
    }

    #[test]
    fn test_text_capacity() {
        assert_eq!(Variant::text("ferrule").and_then(|v| v.as_str().map(|s| s.len())), Some(7));
        assert!(Variant::text("0123456789abcdef0123456789abcdef!").is_none());
    }

    #[test]
    fn test_uint_view() {
        assert_eq!(Variant::Int(42).as_uint(), Some(42));
        assert_eq!(Variant::Int(-1).as_uint(), None);
        assert_eq!(Variant::Bool(true).as_uint(), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(render(&Variant::Uint(9600)), "9600");
        assert_eq!(render(&Variant::text("ap").unwrap()), "\"ap\"");
        assert_eq!(render(&Variant::None), "(none)");
    }
}
