//! Target selection types shared by the generator, interpreter and driver.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// External toolchain convention the generated source is built with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Preset {
    #[serde(rename = "vs2010")]
    Vs2010,
    #[serde(rename = "g++")]
    Gxx,
}

impl Preset {
    pub const ALL: [Preset; 2] = [Preset::Vs2010, Preset::Gxx];

    pub fn name(&self) -> &'static str {
        match self {
            Preset::Vs2010 => "vs2010",
            Preset::Gxx => "g++",
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Preset {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Preset::ALL
            .into_iter()
            .find(|preset| preset.name() == s)
            .ok_or_else(|| Error::Config(format!("invalid preset name '{}'", s)))
    }
}

/// Host platform family; only affects output formatting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Platform {
    Windows,
    Unix,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(windows) {
            Platform::Windows
        } else {
            Platform::Unix
        }
    }

    pub fn executable_suffix(&self) -> &'static str {
        match self {
            Platform::Windows => ".exe",
            Platform::Unix => "",
        }
    }
}

/// How the `read` instruction consumes input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputMode {
    /// Next whitespace-delimited token (`cin >> input`)
    Token,
    /// Next whole line (`getline(cin, input)`)
    Line,
}

/// Combination of preset and platform that selects formatting variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    pub preset: Option<Preset>,
    pub platform: Platform,
}

impl Target {
    pub fn new(preset: Option<Preset>, platform: Platform) -> Self {
        Self { preset, platform }
    }

    pub fn host(preset: Option<Preset>) -> Self {
        Self::new(preset, Platform::current())
    }

    pub fn is_vs2010(&self) -> bool {
        self.preset == Some(Preset::Vs2010)
    }

    pub fn input_mode(&self) -> InputMode {
        if self.is_vs2010() {
            InputMode::Line
        } else {
            InputMode::Token
        }
    }

    /// Whether the program prints a final newline before exiting
    pub fn trailing_newline(&self) -> bool {
        self.platform != Platform::Windows
    }
}

impl Default for Target {
    fn default() -> Self {
        Self::host(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_parse() {
        assert_eq!("vs2010".parse::<Preset>().unwrap(), Preset::Vs2010);
        assert_eq!("g++".parse::<Preset>().unwrap(), Preset::Gxx);

        let err = "clang".parse::<Preset>().unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert_eq!(err.to_string(), "invalid preset name 'clang'");
    }

    #[test]
    fn test_preset_serialization() {
        let json = serde_json::to_string(&Preset::Gxx).unwrap();
        assert_eq!(json, "\"g++\"");
        let preset: Preset = serde_json::from_str("\"vs2010\"").unwrap();
        assert_eq!(preset, Preset::Vs2010);
    }

    #[test]
    fn test_target_variants() {
        let vs = Target::new(Some(Preset::Vs2010), Platform::Windows);
        assert_eq!(vs.input_mode(), InputMode::Line);
        assert!(!vs.trailing_newline());

        let gxx = Target::new(Some(Preset::Gxx), Platform::Unix);
        assert_eq!(gxx.input_mode(), InputMode::Token);
        assert!(gxx.trailing_newline());

        let plain = Target::new(None, Platform::Unix);
        assert_eq!(plain.input_mode(), InputMode::Token);
    }
}
