//! Level-gated logging to two fixed sinks: the terminal and the optional log
//! file held by [`LogConfig`].
//!
//! Every level gets a pre-built pair of line writers, one per sink, each
//! bound to its own prefix. Building happens once in [`Logger::new`]; a new
//! configuration means a new `Logger`.
use {
    crate::libs::{
        config::LogConfig,
        error::Result,
        level::Level,
        writing::{cc, level_color, ERROR_TEXT},
    },
    std::{
        collections::HashMap,
        fmt,
        fs::File,
        io::{self, Write},
        sync::{Arc, Mutex},
    },
};

const TIME_FORMAT: &str = "%H:%M:%S";

pub(crate) type Terminal = Arc<Mutex<Box<dyn Write + Send>>>;

#[derive(Clone)]
enum Target {
    Terminal(Terminal),
    File(Arc<LogConfig>),
}

/// One sink for one level: a literal prefix, optionally followed by a
/// timestamp, then the message as given.
#[derive(Clone)]
struct LineWriter {
    prefix: String,
    timestamp: bool,
    target: Target,
}

impl LineWriter {
    fn render(&self, msg: &str) -> String {
        if self.timestamp {
            let time = chrono::Local::now().format(TIME_FORMAT);
            format!("{}{} {}", self.prefix, time, msg)
        } else {
            format!("{}{}", self.prefix, msg)
        }
    }

    /// Fire-and-forget: a failing sink never reaches the caller.
    fn print(&self, msg: &str) {
        let line = self.render(msg);
        match &self.target {
            Target::Terminal(term) => {
                if let Ok(mut out) = term.lock() {
                    let _ = out.write_all(line.as_bytes());
                    let _ = out.flush();
                }
            }
            Target::File(config) => {
                if let Some(mut file) = config.file.as_ref() {
                    let _ = file.write_all(line.as_bytes());
                }
            }
        }
    }
}

#[derive(Clone)]
struct LogDist {
    term: LineWriter,
    file: LineWriter,
}

pub struct Logger {
    config: Arc<LogConfig>,
    table: HashMap<Level, LogDist>,
}

impl Logger {
    /// Parse `level` and build a logger writing to stdout and `file`.
    pub fn configure(verbose: bool, level: &str, file: Option<File>) -> Result<Self> {
        let level = level.parse()?;
        Ok(Self::new(LogConfig::new(verbose, level, file)))
    }

    pub fn new(config: LogConfig) -> Self {
        Self::with_terminal(config, Box::new(io::stdout()))
    }

    /// Like [`Logger::new`] but with `terminal` standing in for stdout.
    pub fn with_terminal(config: LogConfig, terminal: Box<dyn Write + Send>) -> Self {
        let config = Arc::new(config);
        let terminal: Terminal = Arc::new(Mutex::new(terminal));

        let table = Level::ALL
            .into_iter()
            .filter(|lvl| *lvl != Level::Skip)
            .map(|lvl| (lvl, build_dist(lvl, &terminal, &config)))
            .collect();

        Self { config, table }
    }

    pub fn config(&self) -> &LogConfig {
        &self.config
    }

    pub fn verbose(&self) -> bool {
        self.config.verbose
    }

    /// Whether a message at `level` would reach any sink.
    pub fn enabled(&self, level: Level) -> bool {
        self.config.level.allows(level)
    }

    /// Log `msg` at `level`.
    ///
    /// Without a level, an error makes it `warn` and no error makes it
    /// `info`. The file sink always gets passing messages; the terminal only
    /// when verbose. `Notset` writes `msg` raw, with no newline added and
    /// the error ignored.
    pub fn alert(&self, err: Option<&dyn fmt::Display>, level: Option<Level>, msg: &str) {
        let level = level.unwrap_or(if err.is_some() {
            Level::Warn
        } else {
            Level::Info
        });

        if !self.enabled(level) {
            return;
        }
        let Some(dist) = self.table.get(&level) else {
            return;
        };
        let verbose = self.config.verbose;

        match (level, err) {
            (Level::Notset, _) => {
                if verbose {
                    dist.term.print(msg);
                }
                dist.file.print(msg);
            }
            (_, Some(e)) => {
                if verbose {
                    dist.term
                        .print(&format!("{} [ {}{}{} ]\n", msg, ERROR_TEXT, e, cc::RESET));
                }
                dist.file.print(&format!("{} [ {} ]\n", msg, e));
            }
            (_, None) => {
                let line = format!("{}\n", msg);
                if verbose {
                    dist.term.print(&line);
                }
                dist.file.print(&line);
            }
        }
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("verbose", &self.config.verbose)
            .field("level", &self.config.level)
            .field("file", &self.config.file.is_some())
            .finish()
    }
}

fn build_dist(level: Level, terminal: &Terminal, config: &Arc<LogConfig>) -> LogDist {
    let (term_prefix, file_prefix, timestamp) = match level {
        Level::Notset => (
            format!("[ {}..{} ] ", cc::GREEN, cc::RESET),
            "[ .. ] ".to_string(),
            false,
        ),
        _ => {
            let tag = level.name().to_uppercase();
            (
                format!(
                    "[ {}{}{}{} ] - ",
                    level_color(level).unwrap_or_default(),
                    cc::BOLD,
                    tag,
                    cc::RESET
                ),
                format!("[ {} ] - ", tag),
                true,
            )
        }
    };

    LogDist {
        term: LineWriter {
            prefix: term_prefix,
            timestamp,
            target: Target::Terminal(terminal.clone()),
        },
        file: LineWriter {
            prefix: file_prefix,
            timestamp,
            target: Target::File(config.clone()),
        },
    }
}
