//! Termination signals and their forwarding to child processes

use log::{info, warn};
use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;
use tokio::signal::unix::{signal as unix_signal, SignalKind};

/// Signals that end the runtime
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationSignal {
    Terminate,
    Interrupt,
}

impl TerminationSignal {
    pub fn as_nix(self) -> Signal {
        match self {
            TerminationSignal::Terminate => Signal::SIGTERM,
            TerminationSignal::Interrupt => Signal::SIGINT,
        }
    }
}

impl std::fmt::Display for TerminationSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TerminationSignal::Terminate => write!(f, "SIGTERM"),
            TerminationSignal::Interrupt => write!(f, "SIGINT"),
        }
    }
}

/// Signal handling errors
#[derive(Debug, thiserror::Error)]
pub enum SignalError {
    #[error("Failed to install {signal} handler: {source}")]
    Install {
        signal: TerminationSignal,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to send {signal} to process {pid}: {source}")]
    Delivery {
        signal: TerminationSignal,
        pid: u32,
        #[source]
        source: nix::errno::Errno,
    },

    /// Pids that `kill(2)` would widen to a process group
    #[error("Refusing to send {signal} to pid {pid}")]
    InvalidPid { signal: TerminationSignal, pid: u32 },
}

/// Wait for the first SIGTERM or SIGINT delivered to this process
pub async fn wait_for_termination() -> Result<TerminationSignal, SignalError> {
    let mut terminate = unix_signal(SignalKind::terminate()).map_err(|source| SignalError::Install {
        signal: TerminationSignal::Terminate,
        source,
    })?;
    let mut interrupt = unix_signal(SignalKind::interrupt()).map_err(|source| SignalError::Install {
        signal: TerminationSignal::Interrupt,
        source,
    })?;

    let received = tokio::select! {
        _ = terminate.recv() => TerminationSignal::Terminate,
        _ = interrupt.recv() => TerminationSignal::Interrupt,
    };

    info!("Received {}", received);
    Ok(received)
}

/// Deliver `signal` to the process `pid`
pub fn forward_signal(pid: u32, signal: TerminationSignal) -> Result<(), SignalError> {
    let raw = match i32::try_from(pid) {
        Ok(raw) if raw > 0 => raw,
        _ => return Err(SignalError::InvalidPid { signal, pid }),
    };

    info!("Forwarding {} to process {}", signal, pid);
    signal::kill(Pid::from_raw(raw), signal.as_nix()).map_err(|source| {
        warn!("Failed to forward {} to process {}: {}", signal, pid, source);
        SignalError::Delivery { signal, pid, source }
    })
}
