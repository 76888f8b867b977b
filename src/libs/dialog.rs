//! Bridge to the external `dialog(1)` program.
//!
//! One-shot boxes are a single shell command run through
//! [`ShellRunner::shell_exec`]. The streaming progress box runs the caller's
//! command while a second `dialog --progressbox` process, owned by a detached
//! thread, reads the command's output from a pipe and draws it live.
use {
    crate::{
        alert,
        libs::{
            error::Result,
            level::Level,
            shell::{
                boxed, check_status, join_pump, pump, spawn_pump, terminal, ShellRunner, TtySize,
            },
        },
    },
    os_pipe::{PipeReader, PipeWriter},
    std::{
        fs::File,
        io::{self, Write},
        process::{Command, Stdio},
        thread,
    },
};

pub const DIALOG: &str = "dialog";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoxKind {
    InfoBox,
    YesNo,
    MsgBox,
    CheckList,
    InputBox,
    ProgressBox,
}

impl BoxKind {
    /// The `--<flag>` selecting this box type.
    pub const fn flag(self) -> &'static str {
        match self {
            BoxKind::InfoBox => "infobox",
            BoxKind::YesNo => "yesno",
            BoxKind::MsgBox => "msgbox",
            BoxKind::CheckList => "checklist",
            BoxKind::InputBox => "inputbox",
            BoxKind::ProgressBox => "progressbox",
        }
    }
}

/// `--backtitle`, `--title`, then the box. Used by infobox, msgbox and the
/// streaming viewer.
pub fn titled_box(
    program: &str,
    kind: BoxKind,
    back_title: &str,
    title: &str,
    text: &str,
    tty: TtySize,
) -> String {
    format!(
        "{} --stdout --backtitle \"{}\" --title \"{}\" --{} \"{}\" {} {}",
        program,
        back_title,
        title,
        kind.flag(),
        text,
        tty.y,
        tty.x
    )
}

pub fn yes_no_box(program: &str, back_title: &str, text: &str, tty: TtySize) -> String {
    format!(
        "{} --stdout --backtitle \"{}\" --yesno \"{}\" {} {}",
        program, back_title, text, tty.y, tty.x
    )
}

/// `ext_field` is appended verbatim: checklist items or the inputbox
/// initial value, already quoted by the caller.
pub fn check_list_box(
    program: &str,
    back_title: &str,
    title: &str,
    text: &str,
    ext_field: &str,
    tty: TtySize,
) -> String {
    format!(
        "{} --stdout --title \"{}\" --backtitle \"{}\" --no-tags --checklist \"{}\" {} {} 0 {}",
        program, title, back_title, text, tty.y, tty.x, ext_field
    )
}

pub fn input_box(
    program: &str,
    back_title: &str,
    title: &str,
    text: &str,
    ext_field: &str,
    tty: TtySize,
) -> String {
    format!(
        "{} --stdout --title \"{}\" --backtitle \"{}\" --no-tags --inputbox \"{}\" {} {} {}",
        program, title, back_title, text, tty.y, tty.x, ext_field
    )
}

#[derive(Debug, Clone)]
pub struct DialogBridge {
    runner: ShellRunner,
    program: String,
}

impl DialogBridge {
    pub fn new(runner: ShellRunner) -> Self {
        Self {
            runner,
            program: DIALOG.to_string(),
        }
    }

    /// Use another program in place of `dialog`, e.g. a wrapper script.
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    pub fn runner(&self) -> &ShellRunner {
        &self.runner
    }

    fn tty(&self) -> TtySize {
        self.runner.tty
    }

    pub fn dialog_info(&self, back_title: &str, title: &str, text: &str) -> Result<()> {
        let cmd = titled_box(&self.program, BoxKind::InfoBox, back_title, title, text, self.tty());
        self.runner.shell_exec(&cmd).map(drop)
    }

    /// `Ok` for "yes"; "no" comes back as an exit error with code 1.
    pub fn dialog_yes_no(&self, back_title: &str, text: &str) -> Result<()> {
        let cmd = yes_no_box(&self.program, back_title, text, self.tty());
        self.runner.shell_exec(&cmd).map(drop)
    }

    pub fn dialog_msg_box(&self, back_title: &str, title: &str, text: &str) -> Result<()> {
        alert!(self.runner.logger(), Level::Debug, "DialogMsgBox: {:?}", self.runner);
        let cmd = titled_box(&self.program, BoxKind::MsgBox, back_title, title, text, self.tty());
        self.runner.shell_exec(&cmd).map(drop)
    }

    /// Returns the tags the user selected, as `dialog` prints them.
    pub fn dialog_check_list(
        &self,
        back_title: &str,
        title: &str,
        text: &str,
        ext_field: &str,
    ) -> Result<String> {
        let cmd = check_list_box(&self.program, back_title, title, text, ext_field, self.tty());
        self.runner.shell_exec(&cmd)
    }

    pub fn dialog_input_box(
        &self,
        back_title: &str,
        title: &str,
        text: &str,
        ext_field: &str,
    ) -> Result<String> {
        let cmd = input_box(&self.program, back_title, title, text, ext_field, self.tty());
        self.runner.shell_exec(&cmd)
    }

    /// Run `command` behind a progress box with an empty title.
    pub fn dialog_exec(&self, command: &str, back_title: &str, text: &str) -> Result<()> {
        self.dialog(command, back_title, "", text, BoxKind::ProgressBox)
    }

    /// Run `command` and stream its output into a live `kind` box.
    ///
    /// Verbose: no box at all, the command writes straight to the terminal
    /// (and the file sink). Quiet: stdout goes through a pipe to the viewer
    /// (and the file sink); stderr goes to the file sink, or into the same
    /// pipe when there is none.
    ///
    /// Blocks until `command` exits and returns its status. The viewer is
    /// not waited for.
    pub fn dialog(
        &self,
        command: &str,
        back_title: &str,
        title: &str,
        text: &str,
        kind: BoxKind,
    ) -> Result<()> {
        let logger = self.runner.logger();
        alert!(logger, Level::Debugext, "dialog ({}): {}", kind.flag(), command);

        let file = logger.config().file_handle()?;
        let cmd = self.runner.command(command);

        if logger.verbose() {
            return self.run_passthrough(cmd, file);
        }

        let (reader, writer) = os_pipe::pipe()?;
        self.spawn_viewer(
            titled_box(&self.program, kind, back_title, title, text, self.tty()),
            reader,
        );
        self.run_piped(cmd, writer, file)
    }

    fn run_passthrough(&self, mut cmd: Command, file: Option<File>) -> Result<()> {
        let Some(file) = file else {
            cmd.stdout(Stdio::inherit()).stderr(Stdio::inherit());
            let status = self.runner.spawn(&mut cmd)?.wait()?;
            return check_status(status, String::new()).map(drop);
        };

        cmd.stdout(Stdio::piped()).stderr(Stdio::piped());
        let (out_file, err_file) = (boxed(&file)?, boxed(&file)?);

        let mut child = self.runner.spawn(&mut cmd)?;
        drop(cmd);

        let out = child
            .stdout
            .take()
            .map(|o| spawn_pump(o, vec![terminal(io::stdout()), out_file]));
        let err = child
            .stderr
            .take()
            .map(|e| spawn_pump(e, vec![terminal(io::stderr()), err_file]));

        let status = child.wait()?;
        join_pump(out);
        join_pump(err);
        check_status(status, String::new()).map(drop)
    }

    /// Every copy of `writer` the parent holds is gone by the time this
    /// returns, so the viewer sees end of stream once the command exits.
    fn run_piped(&self, mut cmd: Command, writer: PipeWriter, file: Option<File>) -> Result<()> {
        let status = match file {
            Some(file) => {
                cmd.stdout(Stdio::piped()).stderr(file.try_clone()?);
                let mut child = self.runner.spawn(&mut cmd)?;
                drop(cmd);

                let mut pumped = Ok(());
                if let Some(out) = child.stdout.take() {
                    let (mut writer, mut file) = (writer, file);
                    let mut sinks: [&mut dyn Write; 2] = [&mut writer, &mut file];
                    pumped = pump(out, &mut sinks);
                }
                let status = child.wait();
                pumped?;
                status?
            }
            None => {
                cmd.stdout(writer.try_clone()?).stderr(writer);
                let mut child = self.runner.spawn(&mut cmd)?;
                drop(cmd);
                child.wait()?
            }
        };
        check_status(status, String::new()).map(drop)
    }

    /// Detached viewer: runs `line` reading from `reader`, output to the real
    /// stdout. Its result is discarded. Whatever the viewer leaves unread is
    /// drained here so the command never blocks or dies on a closed pipe.
    fn spawn_viewer(&self, line: String, mut reader: PipeReader) {
        let mut cmd = self.runner.command(&line);
        thread::spawn(move || {
            if let Ok(stdin) = reader.try_clone() {
                cmd.stdin(stdin).stdout(Stdio::inherit()).stderr(io::stdout());
                if let Ok(mut child) = cmd.spawn() {
                    drop(cmd);
                    let _ = child.wait();
                }
            }
            let _ = io::copy(&mut reader, &mut io::sink());
        });
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::libs::{
            config::{LogConfig, DEFAULT_SHELL},
            error::Error,
            logger::{
                tests::{sink_file, SharedBuf},
                Logger,
            },
        },
        std::{
            path::Path,
            sync::Arc,
            time::{Duration, Instant},
        },
        tempfile::NamedTempFile,
    };

    const TTY: TtySize = TtySize { x: 160, y: 31 };

    fn bridge(verbose: bool, level: Level, file: Option<File>) -> DialogBridge {
        let logger = Logger::with_terminal(
            LogConfig::new(verbose, level, file),
            Box::new(SharedBuf::default()),
        );
        DialogBridge::new(ShellRunner::new(DEFAULT_SHELL, TTY, Arc::new(logger)))
    }

    fn read(tmp: &NamedTempFile) -> String {
        std::fs::read_to_string(tmp.path()).unwrap()
    }

    /// Viewer that copies everything it is fed into `path`.
    fn capturing(file: Option<File>, path: &Path) -> DialogBridge {
        let viewer = format!("cat > {} ; true", path.display());
        bridge(false, Level::Info, file).with_program(viewer)
    }

    /// The viewer outlives `dialog_exec`, so wait for it to write `tail`.
    fn wait_for(path: &Path, tail: &str) -> String {
        let deadline = Instant::now() + Duration::from_secs(10);
        loop {
            let seen = std::fs::read_to_string(path).unwrap_or_default();
            if seen.ends_with(tail) || Instant::now() > deadline {
                return seen;
            }
            thread::sleep(Duration::from_millis(20));
        }
    }

    fn counted(n: u32) -> String {
        (1..=n).map(|i| format!("{i}\n")).collect()
    }

    #[test]
    fn one_shot_command_lines() {
        assert_eq!(
            titled_box(DIALOG, BoxKind::InfoBox, "Setup", "Wait", "Copying", TTY),
            r#"dialog --stdout --backtitle "Setup" --title "Wait" --infobox "Copying" 31 160"#
        );
        assert_eq!(
            yes_no_box(DIALOG, "Setup", "Continue?", TTY),
            r#"dialog --stdout --backtitle "Setup" --yesno "Continue?" 31 160"#
        );
        assert_eq!(
            titled_box(DIALOG, BoxKind::MsgBox, "Setup", "Done", "All good", TTY),
            r#"dialog --stdout --backtitle "Setup" --title "Done" --msgbox "All good" 31 160"#
        );
        assert_eq!(
            check_list_box(DIALOG, "backtitle", "title", "checklist", "1 a a 2 b b 3 c c", TTY),
            r#"dialog --stdout --title "title" --backtitle "backtitle" --no-tags --checklist "checklist" 31 160 0 1 a a 2 b b 3 c c"#
        );
        assert_eq!(
            input_box(DIALOG, "Setup", "Host", "Name?", "localhost", TTY),
            r#"dialog --stdout --title "Host" --backtitle "Setup" --no-tags --inputbox "Name?" 31 160 localhost"#
        );
    }

    #[test]
    fn progress_viewer_command_line() {
        assert_eq!(
            titled_box(DIALOG, BoxKind::ProgressBox, "Setup", "", "Installing", TTY),
            r#"dialog --stdout --backtitle "Setup" --title "" --progressbox "Installing" 31 160"#
        );
    }

    #[test]
    fn one_shots_return_program_output() {
        let dlg = bridge(false, Level::Info, None).with_program("echo");

        assert_eq!(
            dlg.dialog_check_list("b", "t", "pick", "1 one on").unwrap(),
            "--stdout --title t --backtitle b --no-tags --checklist pick 31 160 0 1 one on"
        );
        assert_eq!(
            dlg.dialog_input_box("b", "t", "name?", "'jo'").unwrap(),
            "--stdout --title t --backtitle b --no-tags --inputbox name? 31 160 jo"
        );
        dlg.dialog_info("b", "t", "hi").unwrap();
        dlg.dialog_yes_no("b", "sure?").unwrap();
    }

    #[test]
    fn yes_no_refusal_is_exit_one() {
        let dlg = bridge(false, Level::Info, None).with_program("false");
        let err = dlg.dialog_yes_no("b", "sure?").unwrap_err();
        assert_eq!(err.exit_code(), Some(1));
    }

    #[test]
    fn msg_box_logs_runner_at_debug() {
        let (tmp, file) = sink_file();
        let dlg = bridge(false, Level::Debug, Some(file)).with_program("true");

        dlg.dialog_msg_box("b", "t", "done").unwrap();
        let log = read(&tmp);
        assert!(log.starts_with("[ DEBUG ] - "), "{log:?}");
        assert!(log.contains("DialogMsgBox: ShellRunner"), "{log:?}");
    }

    #[test]
    fn quiet_stream_tees_stdout_and_sends_stderr_to_file() {
        let (tmp, file) = sink_file();
        let dlg = bridge(false, Level::Info, Some(file)).with_program("true");

        dlg.dialog_exec("echo step one; echo warning 1>&2", "b", "working")
            .unwrap();
        let log = read(&tmp);
        assert!(log.contains("step one\n"), "{log:?}");
        assert!(log.contains("warning\n"), "{log:?}");
    }

    #[test]
    fn quiet_stream_survives_viewer_that_reads_nothing() {
        let dlg = bridge(false, Level::Info, None).with_program("true");
        dlg.dialog_exec("seq 1 50000", "b", "counting").unwrap();
    }

    #[test]
    fn quiet_stream_feeds_viewer_both_streams() {
        let dir = tempfile::tempdir().unwrap();
        let seen = dir.path().join("viewer.out");
        let dlg = capturing(None, &seen);

        dlg.dialog_exec("seq 1 20000; echo err-line 1>&2", "b", "counting")
            .unwrap();
        let got = wait_for(&seen, "err-line\n");
        assert_eq!(got, counted(20000) + "err-line\n");
    }

    #[test]
    fn quiet_stream_with_file_keeps_stderr_out_of_viewer() {
        let dir = tempfile::tempdir().unwrap();
        let seen = dir.path().join("viewer.out");
        let (tmp, file) = sink_file();
        let dlg = capturing(Some(file), &seen);

        dlg.dialog_exec("seq 1 20000; echo err-line 1>&2", "b", "counting")
            .unwrap();
        let got = wait_for(&seen, "\n20000\n");
        assert_eq!(got, counted(20000));

        // stderr reaches the log directly, stdout through the tee, so the
        // error line may land anywhere in it.
        let log = read(&tmp);
        assert_eq!(log.matches("err-line\n").count(), 1);
        assert_eq!(log.replace("err-line\n", ""), counted(20000));
    }

    #[test]
    fn stream_reports_command_exit_code() {
        let quiet = bridge(false, Level::Info, None).with_program("true");
        let err = quiet.dialog_exec("exit 3", "b", "t").unwrap_err();
        assert!(matches!(err, Error::Exit { code: Some(3), .. }));

        let loud = bridge(true, Level::Info, None);
        assert_eq!(loud.dialog_exec("exit 4", "b", "t").unwrap_err().exit_code(), Some(4));
    }

    #[test]
    fn verbose_stream_mirrors_both_streams_into_file() {
        let (tmp, file) = sink_file();
        let dlg = bridge(true, Level::Info, Some(file));

        dlg.dialog("echo out; echo err 1>&2", "b", "t", "x", BoxKind::ProgressBox)
            .unwrap();
        let log = read(&tmp);
        assert!(log.contains("out\n") && log.contains("err\n"), "{log:?}");
    }
}
