use std::io;

/// Everything the library can hand back to a caller.
///
/// Sink write failures never show up here; the logger swallows them.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("unknown log level `{0}`")]
    UnknownLevel(String),

    #[error("failed to launch shell `{shell}`: {source}")]
    Spawn {
        shell: String,
        #[source]
        source: io::Error,
    },

    /// Nonzero exit. `code` is `None` when the process died from a signal.
    /// `output` keeps whatever stdout was captured before the exit.
    #[error("command exited with {}", describe_code(.code))]
    Exit { code: Option<i32>, output: String },

    #[error("settings: {0}")]
    Settings(String),

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl Error {
    /// Exit code of a finished command, if this error carries one.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Error::Exit { code, .. } => *code,
            _ => None,
        }
    }
}

fn describe_code(code: &Option<i32>) -> String {
    match code {
        Some(c) => format!("exit status {c}"),
        None => "no exit status (terminated by signal)".to_string(),
    }
}

pub type Result<T> = std::result::Result<T, Error>;
