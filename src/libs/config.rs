use {
    crate::libs::{
        error::{Error, Result},
        level::Level,
        logger::Logger,
        shell::{ShellRunner, TtySize},
    },
    dotenv::dotenv,
    serde::{Deserialize, Serialize},
    std::{
        fmt::Debug,
        fs::{self, File, OpenOptions},
        io,
        path::{Path, PathBuf},
        str::FromStr,
        sync::Arc,
    },
};

pub const DEFAULT_SHELL: &str = "/bin/sh";

pub fn load_env() {
    dotenv().ok();
}

/// Parse env var to T; fall back to typed default.
pub fn get_var_t<T>(key: &str, default: T) -> T
where
    T: FromStr,
    <T as FromStr>::Err: Debug,
{
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse::<T>().ok())
        .unwrap_or(default)
}

/// Env flag: `1`, `true`, `yes` or `on` (any case) are true, `0`, `false`,
/// `no` or `off` are false, anything else or unset keeps `default`.
pub fn get_var_flag(key: &str, default: bool) -> bool {
    match std::env::var(key) {
        Ok(v) => parse_flag(&v).unwrap_or(default),
        Err(_) => default,
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Configure-once logging state shared by the logger, shell runner and
/// dialog bridge. Never mutated after construction.
#[derive(Debug)]
pub struct LogConfig {
    pub verbose: bool,
    pub level: Level,
    pub file: Option<File>,
}

impl LogConfig {
    pub fn new(verbose: bool, level: Level, file: Option<File>) -> Self {
        Self {
            verbose,
            level,
            file,
        }
    }

    /// Independent handle on the file sink, for a child process or a pump
    /// thread. Shares the same open file description.
    pub(crate) fn file_handle(&self) -> io::Result<Option<File>> {
        self.file.as_ref().map(File::try_clone).transpose()
    }
}

/// Caller-side settings: plain values before anything is opened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    pub verbose: bool,
    pub level: String,
    pub file: Option<PathBuf>,
    pub shell: String,
    pub tty: TtySize,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            verbose: false,
            level: Level::Info.to_string(),
            file: None,
            shell: DEFAULT_SHELL.to_string(),
            tty: TtySize::default(),
        }
    }
}

impl LogSettings {
    /// Read settings from the process environment. Call [`load_env`] first
    /// to pick up a `.env` file.
    ///
    /// `LOG_VERBOSE` (see [`get_var_flag`]), `LOG_LEVEL`, `LOG_FILE`,
    /// `DIALOG_SHELL`, `DIALOG_ROWS` and `DIALOG_COLS`; anything unset or
    /// unparsable keeps its default.
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            verbose: get_var_flag("LOG_VERBOSE", d.verbose),
            level: get_var_t("LOG_LEVEL", d.level),
            file: std::env::var_os("LOG_FILE")
                .filter(|v| !v.is_empty())
                .map(PathBuf::from),
            shell: get_var_t("DIALOG_SHELL", d.shell),
            tty: TtySize {
                x: get_var_t("DIALOG_COLS", d.tty.x),
                y: get_var_t("DIALOG_ROWS", d.tty.y),
            },
        }
    }

    /// Load settings from a JSON file. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path)
            .map_err(|e| Error::Settings(format!("failed to read {}: {e}", path.display())))?;
        serde_json::from_str(&contents)
            .map_err(|e| Error::Settings(format!("failed to parse {}: {e}", path.display())))
    }

    pub fn log_level(&self) -> Result<Level> {
        self.level.parse()
    }

    /// Parse the level and open the log file, if any.
    pub fn log_config(&self) -> Result<LogConfig> {
        let level = self.log_level()?;
        let file = self.file.as_deref().map(open_log_file).transpose()?;
        Ok(LogConfig::new(self.verbose, level, file))
    }

    pub fn logger(&self) -> Result<Arc<Logger>> {
        Ok(Arc::new(Logger::new(self.log_config()?)))
    }

    pub fn runner(&self, logger: Arc<Logger>) -> ShellRunner {
        ShellRunner::new(self.shell.clone(), self.tty, logger)
    }
}

/// Open a log file for appending, creating it and its parent directories.
pub fn open_log_file(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_var_t_falls_back_on_missing_or_bad_values() {
        assert_eq!(get_var_t("DIALOGGER_TEST_UNSET_KEY", 7u16), 7);
        std::env::set_var("DIALOGGER_TEST_BAD_U16", "many");
        assert_eq!(get_var_t("DIALOGGER_TEST_BAD_U16", 24u16), 24);
        std::env::set_var("DIALOGGER_TEST_GOOD_BOOL", "true");
        assert!(get_var_t("DIALOGGER_TEST_GOOD_BOOL", false));
    }

    #[test]
    fn flags_accept_common_spellings() {
        for v in ["1", "true", "TRUE", "yes", "on", " Yes "] {
            assert_eq!(parse_flag(v), Some(true), "{v:?}");
        }
        for v in ["0", "false", "no", "OFF"] {
            assert_eq!(parse_flag(v), Some(false), "{v:?}");
        }
        assert_eq!(parse_flag("loud"), None);

        std::env::set_var("DIALOGGER_TEST_FLAG_ONE", "1");
        assert!(get_var_flag("DIALOGGER_TEST_FLAG_ONE", false));
        std::env::set_var("DIALOGGER_TEST_FLAG_BAD", "maybe");
        assert!(get_var_flag("DIALOGGER_TEST_FLAG_BAD", true));
        assert!(!get_var_flag("DIALOGGER_TEST_FLAG_UNSET", false));
    }

    #[test]
    fn missing_settings_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let s = LogSettings::load(&dir.path().join("absent.json")).unwrap();
        assert_eq!(s, LogSettings::default());
        assert_eq!(s.shell, DEFAULT_SHELL);
        assert_eq!(s.log_level().unwrap(), Level::Info);
    }

    #[test]
    fn partial_settings_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.json");
        fs::write(&path, r#"{ "verbose": true, "level": "trace", "tty": { "x": 120, "y": 40 } }"#)
            .unwrap();

        let s = LogSettings::load(&path).unwrap();
        assert!(s.verbose);
        assert_eq!(s.log_level().unwrap(), Level::Trace);
        assert_eq!(s.tty, TtySize { x: 120, y: 40 });
        assert_eq!(s.shell, DEFAULT_SHELL);
        assert!(s.file.is_none());
    }

    #[test]
    fn broken_settings_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.json");
        fs::write(&path, "{ verbose: ").unwrap();
        assert!(matches!(LogSettings::load(&path), Err(Error::Settings(_))));
    }

    #[test]
    fn log_config_rejects_unknown_level() {
        let s = LogSettings {
            level: "loud".into(),
            ..LogSettings::default()
        };
        assert!(matches!(s.log_config(), Err(Error::UnknownLevel(_))));
    }

    #[test]
    fn log_config_opens_file_in_nested_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("run.log");
        let s = LogSettings {
            file: Some(path.clone()),
            level: "warn".into(),
            ..LogSettings::default()
        };

        let cfg = s.log_config().unwrap();
        assert_eq!(cfg.level, Level::Warn);
        assert!(cfg.file.is_some());
        assert!(path.exists());
    }
}
