//! Writes a [`ThemeRecord`] into whatever holds the presentation state.

use backdrop_color::to_hex;
use std::collections::HashMap;
use std::fmt;

use crate::theme::ThemeRecord;

pub const ACCENT: &str = "--accent-500";
pub const ACCENT_SECONDARY: &str = "--accent-400";
pub const BG_START: &str = "--bg-start";
pub const BG_MID: &str = "--bg-mid";
pub const BG_END: &str = "--bg-end";
pub const ACCENT_SHADOW: &str = "--accent-shadow";

/// Receives named style variables.
pub trait ThemeSink {
    fn set_property(&mut self, name: &str, value: String);
}

impl ThemeSink for HashMap<String, String> {
    fn set_property(&mut self, name: &str, value: String) {
        self.insert(name.to_string(), value);
    }
}

pub fn apply_theme<S: ThemeSink + ?Sized>(theme: &ThemeRecord, sink: &mut S) {
    sink.set_property(ACCENT, to_hex(theme.accent));
    sink.set_property(ACCENT_SECONDARY, to_hex(theme.accent_secondary));
    sink.set_property(BG_START, to_hex(theme.bg_start));
    sink.set_property(BG_MID, to_hex(theme.bg_mid));
    sink.set_property(BG_END, to_hex(theme.bg_end));
    sink.set_property(ACCENT_SHADOW, theme.shadow.to_string());
}

/// CSS custom properties in the order they were first set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CssVariables {
    vars: Vec<(String, String)>,
}

impl CssVariables {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }
}

impl ThemeSink for CssVariables {
    fn set_property(&mut self, name: &str, value: String) {
        match self.vars.iter_mut().find(|(n, _)| n == name) {
            Some((_, existing)) => *existing = value,
            None => self.vars.push((name.to_string(), value)),
        }
    }
}

impl fmt::Display for CssVariables {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, ":root {{")?;
        for (name, value) in self.iter() {
            writeln!(f, "  {name}: {value};")?;
        }
        writeln!(f, "}}")
    }
}
