use {
    crate::libs::error::Error,
    serde::{Deserialize, Serialize},
    std::{fmt, str::FromStr},
};

/// Closed set of log levels. Higher rank = more verbose.
///
/// `Notset` is the raw passthrough channel and `Skip` is a threshold-only
/// value that silences everything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Notset,
    Error,
    Warn,
    Info,
    Debug,
    Debugext,
    Trace,
    Skip,
}

impl Level {
    pub const ALL: [Level; 8] = [
        Level::Notset,
        Level::Error,
        Level::Warn,
        Level::Info,
        Level::Debug,
        Level::Debugext,
        Level::Trace,
        Level::Skip,
    ];

    pub const fn rank(self) -> u8 {
        match self {
            Level::Notset => 0,
            Level::Error => 1,
            Level::Warn => 2,
            Level::Info => 3,
            Level::Debug => 4,
            Level::Debugext => 5,
            Level::Trace => 6,
            Level::Skip => 99,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Level::Notset => "notset",
            Level::Error => "error",
            Level::Warn => "warn",
            Level::Info => "info",
            Level::Debug => "debug",
            Level::Debugext => "debugext",
            Level::Trace => "trace",
            Level::Skip => "skip",
        }
    }

    /// Whether a message at `requested` passes when `self` is the configured
    /// threshold. `Skip` on either side never passes.
    pub fn allows(self, requested: Level) -> bool {
        if self == Level::Skip || requested == Level::Skip {
            return false;
        }
        self.rank() >= requested.rank()
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Level {
    type Err = Error;

    /// Names are lowercase and case-sensitive, `"INFO"` is rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Level::ALL
            .into_iter()
            .find(|lvl| lvl.name() == s)
            .ok_or_else(|| Error::UnknownLevel(s.to_string()))
    }
}
