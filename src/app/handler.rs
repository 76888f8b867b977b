use {
    crate::alert,
    crate::libs::{
        config::{get_var_t, load_env, LogSettings},
        dialog::DialogBridge,
        level::Level,
        shell::TtySize,
    },
    anyhow::{bail, Context, Result},
    std::path::PathBuf,
};

/// Run the command given on the command line behind a `dialog` progress box.
///
/// Settings come from the JSON file named by `DIALOGGER_CONFIG` when set,
/// otherwise from the environment (see [`LogSettings::from_env`]), with the
/// box sized to the terminal unless `DIALOG_ROWS`/`DIALOG_COLS` are set.
/// Box text comes from `DIALOG_BACKTITLE` and `DIALOG_TEXT`.
pub fn init() -> Result<()> {
    let command = std::env::args().skip(1).collect::<Vec<_>>().join(" ");
    if command.trim().is_empty() {
        bail!("usage: dialogger <command...>");
    }

    let settings = load_settings()?;
    let logger = settings.logger().context("Failed to configure logging")?;

    let bridge = DialogBridge::new(settings.runner(logger.clone()));

    let back_title = get_var_t("DIALOG_BACKTITLE", "dialogger".to_string());
    let text = get_var_t("DIALOG_TEXT", command.clone());

    alert!(logger, Level::Info, "running `{}`", command);
    match bridge.dialog_exec(&command, &back_title, &text) {
        Ok(()) => {
            alert!(logger, Level::Info, "finished `{}`", command);
            Ok(())
        }
        Err(e) => {
            alert!(logger, err = e, Level::Error, "`{}` failed", command);
            Err(e).with_context(|| format!("Failed to run `{command}`"))
        }
    }
}

fn load_settings() -> Result<LogSettings> {
    load_env();
    match std::env::var_os("DIALOGGER_CONFIG") {
        Some(path) => {
            let path = PathBuf::from(path);
            LogSettings::load(&path)
                .with_context(|| format!("Failed to load settings from {}", path.display()))
        }
        None => {
            let mut settings = LogSettings::from_env();
            if !tty_from_env() {
                settings.tty = TtySize::detect().unwrap_or(settings.tty);
            }
            Ok(settings)
        }
    }
}

fn tty_from_env() -> bool {
    std::env::var_os("DIALOG_ROWS").is_some() || std::env::var_os("DIALOG_COLS").is_some()
}
