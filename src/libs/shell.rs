use {
    crate::{
        alert,
        libs::{
            error::{Error, Result},
            level::Level,
            logger::Logger,
        },
    },
    serde::{Deserialize, Serialize},
    std::{
        fs::File,
        io::{self, Read, Write},
        process::{Child, Command, ExitStatus, Stdio},
        sync::Arc,
        thread::{self, JoinHandle},
    },
};

/// Dialog box dimensions: `x` columns by `y` rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TtySize {
    pub x: u16,
    pub y: u16,
}

impl Default for TtySize {
    fn default() -> Self {
        Self { x: 80, y: 24 }
    }
}

impl TtySize {
    /// Current terminal size, if stdout is a terminal.
    pub fn detect() -> Option<Self> {
        crossterm::terminal::size()
            .ok()
            .map(|(cols, rows)| Self { x: cols, y: rows })
    }
}

/// Runs command lines through `shell -c`, routing output according to the
/// logger's verbosity and file sink.
#[derive(Debug, Clone)]
pub struct ShellRunner {
    pub shell: String,
    pub tty: TtySize,
    logger: Arc<Logger>,
}

impl ShellRunner {
    pub fn new(shell: impl Into<String>, tty: TtySize, logger: Arc<Logger>) -> Self {
        Self {
            shell: shell.into(),
            tty,
            logger,
        }
    }

    pub fn logger(&self) -> &Arc<Logger> {
        &self.logger
    }

    /// `shell -c command` with environment and stdin inherited.
    pub(crate) fn command(&self, command: &str) -> Command {
        let mut cmd = Command::new(&self.shell);
        cmd.arg("-c").arg(command).stdin(Stdio::inherit());
        cmd
    }

    pub(crate) fn spawn(&self, cmd: &mut Command) -> Result<Child> {
        cmd.spawn().map_err(|source| Error::Spawn {
            shell: self.shell.clone(),
            source,
        })
    }

    /// Run `command` and return its stdout, trimmed.
    ///
    /// stdout is captured and also teed into the file sink. stderr goes to
    /// the real stderr when verbose (plus the file sink), to the file sink
    /// alone when quiet, and nowhere when quiet without a file. Blocks until
    /// the command exits; a nonzero exit still hands back the captured
    /// output inside [`Error::Exit`].
    pub fn shell_exec(&self, command: &str) -> Result<String> {
        alert!(self.logger, Level::Debugext, "shell_exec: {} -c {}", self.shell, command);

        let verbose = self.logger.verbose();
        let file = self.logger.config().file_handle()?;

        let mut cmd = self.command(command);
        cmd.stdout(Stdio::piped());
        match (verbose, &file) {
            (true, Some(_)) => cmd.stderr(Stdio::piped()),
            (true, None) => cmd.stderr(Stdio::inherit()),
            (false, Some(f)) => cmd.stderr(f.try_clone()?),
            (false, None) => cmd.stderr(Stdio::null()),
        };

        let stderr_mirror = match (verbose, &file) {
            (true, Some(f)) => Some(boxed(f)?),
            _ => None,
        };

        let mut child = self.spawn(&mut cmd)?;
        drop(cmd);

        let stderr_pump = match (child.stderr.take(), stderr_mirror) {
            (Some(err), Some(f)) => Some(spawn_pump(err, vec![terminal(io::stderr()), f])),
            _ => None,
        };

        let mut captured = Vec::new();
        let mut pumped = Ok(());
        if let Some(out) = child.stdout.take() {
            let mut sinks: Vec<&mut dyn Write> = vec![&mut captured];
            let mut file_sink = file.as_ref();
            if let Some(f) = file_sink.as_mut() {
                sinks.push(f);
            }
            pumped = pump(out, &mut sinks);
        }

        // Reap the child and the stderr thread even if reading stdout failed.
        let status = child.wait();
        join_pump(stderr_pump);
        pumped?;
        let status = status?;

        let output = String::from_utf8_lossy(&captured).trim().to_string();
        check_status(status, output)
    }
}

/// Ok(output) on success, otherwise [`Error::Exit`] carrying it.
pub(crate) fn check_status(status: ExitStatus, output: String) -> Result<String> {
    if status.success() {
        Ok(output)
    } else {
        Err(Error::Exit {
            code: status.code(),
            output,
        })
    }
}

/// Copy `reader` into every sink until EOF. Sink errors are dropped so a
/// dead sink never stalls the producer; read errors are returned.
pub(crate) fn pump(mut reader: impl Read, sinks: &mut [&mut dyn Write]) -> io::Result<()> {
    let mut buf = [0u8; 8192];
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => return Ok(()),
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        for sink in sinks.iter_mut() {
            let _ = sink.write_all(&buf[..n]);
            let _ = sink.flush();
        }
    }
}

/// [`pump`] on its own thread, owning its sinks.
pub(crate) fn spawn_pump<R>(reader: R, mut sinks: Vec<Box<dyn Write + Send>>) -> JoinHandle<()>
where
    R: Read + Send + 'static,
{
    thread::spawn(move || {
        let mut refs: Vec<&mut dyn Write> = sinks
            .iter_mut()
            .map(|s| s.as_mut() as &mut dyn Write)
            .collect();
        let _ = pump(reader, &mut refs);
    })
}

pub(crate) fn join_pump(handle: Option<JoinHandle<()>>) {
    if let Some(h) = handle {
        let _ = h.join();
    }
}

pub(crate) fn terminal<W: Write + Send + 'static>(w: W) -> Box<dyn Write + Send> {
    Box::new(w)
}

/// Owned copy of a file sink for a pump thread.
pub(crate) fn boxed(file: &File) -> io::Result<Box<dyn Write + Send>> {
    Ok(Box::new(file.try_clone()?))
}
