//! Supervision of the handler sub-process

use fnrt_config::HandlerConfig;
use fnrt_resilience::{forward_signal, wait_for_termination, TerminationSignal};
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::{mpsc, oneshot, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::error::ExecutionError;

/// Program and arguments the handler sub-process is launched with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl HandlerCommand {
    /// A binary handler runs directly; others run through the runtime bridge
    pub fn from_config(config: &HandlerConfig) -> Self {
        if config.is_binary {
            Self {
                program: config.path.clone(),
                args: Vec::new(),
            }
        } else {
            Self {
                program: config.runtime_binary.clone(),
                args: vec![config.runtime_bridge.clone()],
            }
        }
    }
}

/// How the sub-process ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildExit {
    /// Ended after a termination signal was forwarded to it
    Forwarded {
        signal: TerminationSignal,
        code: Option<i32>,
    },
    /// Ended on its own
    Unexpected { code: Option<i32> },
}

impl ChildExit {
    /// A sub-process that ends on its own leaves the server unable to serve
    pub fn is_fatal(&self) -> bool {
        matches!(self, ChildExit::Unexpected { .. })
    }
}

/// Lifecycle of the sub-process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildState {
    NotStarted,
    Starting,
    Running { pid: u32 },
    Terminated(ChildExit),
}

/// Owner of the single handler sub-process
pub struct ProcessSupervisor {
    command: HandlerCommand,
    state: watch::Sender<ChildState>,
    shutdown: CancellationToken,
}

/// Access to a started sub-process
pub struct SupervisorHandle {
    pid: u32,
    stop: mpsc::Sender<TerminationSignal>,
    exit: oneshot::Receiver<ChildExit>,
}

impl ProcessSupervisor {
    /// Create a supervisor that cancels `shutdown` once the sub-process is gone
    /// or is being stopped
    pub fn new(command: HandlerCommand, shutdown: CancellationToken) -> Self {
        let (state, _) = watch::channel(ChildState::NotStarted);
        Self {
            command,
            state,
            shutdown,
        }
    }

    pub fn from_config(config: &HandlerConfig, shutdown: CancellationToken) -> Self {
        Self::new(HandlerCommand::from_config(config), shutdown)
    }

    /// Observe lifecycle transitions
    pub fn subscribe(&self) -> watch::Receiver<ChildState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> ChildState {
        *self.state.borrow()
    }

    /// Spawn the sub-process and its supervision tasks
    ///
    /// Returns as soon as the spawn itself succeeds or fails; readiness of
    /// the handler's HTTP endpoint is not awaited.
    pub fn start(&self) -> Result<SupervisorHandle, ExecutionError> {
        let claimed = self.state.send_if_modified(|state| {
            if *state == ChildState::NotStarted {
                *state = ChildState::Starting;
                true
            } else {
                false
            }
        });
        if !claimed {
            return Err(ExecutionError::AlreadyStarted);
        }

        info!(
            "Starting handler process: {} {}",
            self.command.program,
            self.command.args.join(" ")
        );

        let mut child = match Command::new(&self.command.program)
            .args(&self.command.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
        {
            Ok(child) => child,
            Err(source) => {
                self.state.send_replace(ChildState::NotStarted);
                return Err(ExecutionError::Spawn {
                    program: self.command.program.clone(),
                    source,
                });
            }
        };

        let Some(pid) = child.id() else {
            self.state.send_replace(ChildState::NotStarted);
            return Err(ExecutionError::Spawn {
                program: self.command.program.clone(),
                source: std::io::Error::other("process ended before its pid was known"),
            });
        };

        if let Some(stdout) = child.stdout.take() {
            tokio::spawn(forward_lines(stdout, tokio::io::stdout()));
        }
        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(forward_lines(stderr, tokio::io::stderr()));
        }

        let (forwarded_tx, forwarded_rx) = watch::channel(None);
        let (stop_tx, stop_rx) = mpsc::channel(1);
        let (exit_tx, exit_rx) = oneshot::channel();
        let exited = CancellationToken::new();

        tokio::spawn(forward_termination(
            pid,
            stop_rx,
            forwarded_tx,
            exited.clone(),
            self.shutdown.clone(),
        ));
        tokio::spawn(monitor_exit(
            child,
            forwarded_rx,
            exit_tx,
            exited,
            self.state.clone(),
            self.shutdown.clone(),
        ));

        self.state.send_replace(ChildState::Running { pid });
        info!("Handler process started with pid {}", pid);

        Ok(SupervisorHandle {
            pid,
            stop: stop_tx,
            exit: exit_rx,
        })
    }
}

impl SupervisorHandle {
    pub fn pid(&self) -> u32 {
        self.pid
    }

    /// Forward `signal` to the sub-process as if this process had received it
    pub async fn terminate(&self, signal: TerminationSignal) {
        if self.stop.send(signal).await.is_err() {
            debug!("Handler process already gone, not forwarding {}", signal);
        }
    }

    /// Wait until the sub-process has ended
    pub async fn wait(self) -> ChildExit {
        self.exit.await.unwrap_or(ChildExit::Unexpected { code: None })
    }
}

/// Copy `source` line by line to `sink`; output need not be UTF-8
async fn forward_lines<R, W>(source: R, mut sink: W)
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut reader = BufReader::new(source);
    let mut line = Vec::new();
    loop {
        line.clear();
        match reader.read_until(b'\n', &mut line).await {
            Ok(0) => return,
            Ok(_) => {
                if !line.ends_with(b"\n") {
                    line.push(b'\n');
                }
                let written = async {
                    sink.write_all(&line).await?;
                    sink.flush().await
                };
                if let Err(e) = written.await {
                    warn!("Unable to forward handler output: {}", e);
                    return;
                }
            }
            Err(e) => {
                warn!("Unable to read handler output: {}", e);
                return;
            }
        }
    }
}

/// Relay the first termination signal to the sub-process
async fn forward_termination(
    pid: u32,
    mut stop: mpsc::Receiver<TerminationSignal>,
    forwarded: watch::Sender<Option<TerminationSignal>>,
    exited: CancellationToken,
    shutdown: CancellationToken,
) {
    let received = async {
        match wait_for_termination().await {
            Ok(signal) => signal,
            Err(e) => {
                error!("{}", e);
                std::future::pending::<TerminationSignal>().await
            }
        }
    };

    let signal = tokio::select! {
        _ = exited.cancelled() => return,
        signal = received => signal,
        Some(signal) = stop.recv() => signal,
    };

    forwarded.send_replace(Some(signal));
    if let Err(e) = forward_signal(pid, signal) {
        warn!("{}", e);
    }
    shutdown.cancel();
}

/// Wait for the sub-process to end and report how it ended
async fn monitor_exit(
    mut child: Child,
    forwarded: watch::Receiver<Option<TerminationSignal>>,
    exit: oneshot::Sender<ChildExit>,
    exited: CancellationToken,
    state: watch::Sender<ChildState>,
    shutdown: CancellationToken,
) {
    // Held open until the process ends
    let _stdin = child.stdin.take();

    let code = match child.wait().await {
        Ok(status) => status.code(),
        Err(e) => {
            error!("Unable to wait for handler process: {}", e);
            None
        }
    };
    exited.cancel();

    let outcome = match *forwarded.borrow() {
        Some(signal) => ChildExit::Forwarded { signal, code },
        None => ChildExit::Unexpected { code },
    };

    if outcome.is_fatal() {
        error!("Forked function has terminated unexpectedly (exit code {:?})", code);
    } else {
        info!("Handler process stopped (exit code {:?})", code);
    }

    state.send_replace(ChildState::Terminated(outcome));
    shutdown.cancel();
    let _ = exit.send(outcome);
}
