use crate::libs::level::Level;

pub mod cc {
    pub const RED: &str = "\x1b[31m";
    pub const GREEN: &str = "\x1b[32m";
    pub const BLUE: &str = "\x1b[34m";
    pub const MAGENTA: &str = "\x1b[35m";
    pub const CYAN: &str = "\x1b[36m";
    pub const BOLD: &str = "\x1b[1m";
    pub const RESET: &str = "\x1b[0m";
    pub const BROWN: &str = "\x1b[38;5;130m";
}

/// Terminal color for a level tag. `Notset` and `Skip` have none.
pub fn level_color(level: Level) -> Option<&'static str> {
    match level {
        Level::Error => Some(cc::RED),
        Level::Warn => Some(cc::BROWN),
        Level::Info => Some(cc::GREEN),
        Level::Debug => Some(cc::CYAN),
        Level::Debugext => Some(cc::MAGENTA),
        Level::Trace => Some(cc::BLUE),
        Level::Notset | Level::Skip => None,
    }
}

/// Color used for the bracketed error text on the terminal sink.
pub const ERROR_TEXT: &str = cc::BROWN;

/// Formatting front-end for [`Logger::alert`](crate::libs::logger::Logger::alert).
///
/// ```ignore
/// alert!(logger, Level::Info, "copied {} files", n);
/// alert!(logger, err = e, Level::Error, "connect to {} failed", host);
/// alert!(logger, err = e, "connect failed"); // level resolves to warn
/// ```
#[macro_export]
macro_rules! alert {
    // -----------------------------------------------------------------
    // 1) with error, explicit level
    //    alert!(log, err = e, Level::Error, "swap: {} -> {}", a, b);
    // -----------------------------------------------------------------
    ($logger:expr, err = $err:expr, $level:expr, $fmt:literal $(, $arg:expr)* $(,)?) => {{
        $logger.alert(
            Some(&$err as &dyn ::std::fmt::Display),
            Some($level),
            &format!($fmt $(, $arg)*),
        );
    }};

    // -----------------------------------------------------------------
    // 2) with error, level resolved from the error
    //    alert!(log, err = e, "connect failed");
    // -----------------------------------------------------------------
    ($logger:expr, err = $err:expr, $fmt:literal $(, $arg:expr)* $(,)?) => {{
        $logger.alert(
            Some(&$err as &dyn ::std::fmt::Display),
            None,
            &format!($fmt $(, $arg)*),
        );
    }};

    // -----------------------------------------------------------------
    // 3) no error
    //    alert!(log, Level::Debug, "price: {}", p);
    // -----------------------------------------------------------------
    ($logger:expr, $level:expr, $fmt:literal $(, $arg:expr)* $(,)?) => {{
        $logger.alert(None, Some($level), &format!($fmt $(, $arg)*));
    }};
}
