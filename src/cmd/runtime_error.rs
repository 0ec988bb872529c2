use std::error::Error;
use std::fmt::{Display, Formatter};

use clap::CommandFactory;
#[cfg(feature = "log")]
use log::error;

use crate::alias::StoreError;
use crate::cmd::Cmd;
use crate::parse::ParseError;
use crate::waker::WakeError;

#[derive(Debug)]
pub enum RuntimeError {
    /// Missing or empty positional argument.
    Validation(String),
    NotFound(String),
    Storage(String),
    Transmission(String),
    Config(String),
    IOError(String),
    NoHomeDir,
}

impl RuntimeError {
    pub fn print_error(&self) {
        match self {
            RuntimeError::Validation(m) => {
                report(m);
                report(&Cmd::command().render_usage().to_string());
            }
            e => report(&e.to_string()),
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            RuntimeError::IOError(..) => 1,
            RuntimeError::Validation(..) => 2,
            RuntimeError::NotFound(..) => 3,
            RuntimeError::Storage(..) => 4,
            RuntimeError::Transmission(..) => 5,
            RuntimeError::Config(..) => 6,
            RuntimeError::NoHomeDir => 7,
        }
    }
}

#[cfg(feature = "log")]
fn report(m: &str) {
    if log::log_enabled!(log::Level::Error) {
        error!("{}", m)
    } else {
        eprintln!("{}", m)
    }
}

#[cfg(not(feature = "log"))]
fn report(m: &str) {
    eprintln!("{}", m)
}

impl Display for RuntimeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            RuntimeError::Validation(m) => write!(f, "{}", m),
            RuntimeError::NotFound(a) => write!(f, "no such alias: {}", a),
            RuntimeError::Storage(e) => write!(f, "storage error: {}", e),
            RuntimeError::Transmission(e) => write!(f, "cannot send magic packet: {}", e),
            RuntimeError::Config(e) => write!(f, "configuration error: {}", e),
            RuntimeError::IOError(e) => write!(f, "i/o error: {}", e),
            RuntimeError::NoHomeDir => write!(f, "couldn't determine home directory"),
        }
    }
}

impl Error for RuntimeError {}

impl From<StoreError> for RuntimeError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::NotFound(name) => RuntimeError::NotFound(name),
            e => RuntimeError::Storage(e.to_string()),
        }
    }
}

impl From<WakeError> for RuntimeError {
    fn from(value: WakeError) -> Self {
        RuntimeError::Transmission(value.to_string())
    }
}

impl From<ParseError> for RuntimeError {
    fn from(value: ParseError) -> Self {
        RuntimeError::Config(value.to_string())
    }
}

impl From<std::io::Error> for RuntimeError {
    fn from(value: std::io::Error) -> Self {
        RuntimeError::IOError(value.to_string())
    }
}
