// Licensed under the Apache-2.0 license

//! Session Management
//!
//! An [`AdacSession`] owns the packet staging buffer and borrows the transport
//! for its whole lifetime. Requests and responses strictly alternate: a
//! response packet borrows the session, so nothing else can be issued until
//! it has been released.

#![no_std]

use adac_host_command_types::{is_vendor_command, AdacCommand, PsaStatus};
use adac_host_transport::{PacketBuffer, ResponsePacket, Transport, TransportError};

/// Session error enumeration
#[derive(Debug, Clone, PartialEq)]
pub enum SessionError {
    /// Invalid session state
    InvalidState {
        current: SessionState,
        expected: SessionState,
    },

    /// Transport layer error
    Transport(TransportError),

    /// Command ID is neither a known command nor a vendor command
    UnrecognizedCommand(u16),

    /// Command requires a payload but none was given
    MissingPayload(u16),
}

impl SessionError {
    pub fn status(&self) -> PsaStatus {
        match self {
            SessionError::InvalidState { .. } => PsaStatus::GenericError,
            SessionError::Transport(err) => err.status(),
            SessionError::UnrecognizedCommand(_) => PsaStatus::NotSupported,
            SessionError::MissingPayload(_) => PsaStatus::InvalidArgument,
        }
    }
}

impl core::fmt::Display for SessionError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            SessionError::InvalidState { current, expected } => write!(
                f,
                "Invalid session state: {:?} (expected {:?})",
                current, expected
            ),
            SessionError::Transport(err) => write!(f, "{}", err),
            SessionError::UnrecognizedCommand(id) => {
                write!(f, "Unrecognized command. ID=(0x{:x})", id)
            }
            SessionError::MissingPayload(id) => {
                write!(f, "Command 0x{:x} requires a payload", id)
            }
        }
    }
}

impl From<TransportError> for SessionError {
    fn from(err: TransportError) -> Self {
        SessionError::Transport(err)
    }
}

/// Session result type
pub type SessionResult<T> = Result<T, SessionError>;

/// Session state enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Disconnected,
    Connected,
    Error,
}

/// Session statistics
#[derive(Debug, Clone, Default)]
pub struct SessionStatistics {
    pub commands_sent: u64,
    pub responses_received: u64,
    pub commands_failed: u64,
    pub bytes_sent: u64,
    pub bytes_received: u64,
}

/// Debug host session using dynamic dispatch with borrowed transport
pub struct AdacSession<'t> {
    /// Current session state
    pub state: SessionState,

    /// Transport interface (borrowed)
    transport: &'t mut dyn Transport,

    /// Staging buffer shared by every request and response
    buffer: PacketBuffer,

    /// Error state information
    pub last_error: Option<SessionError>,

    /// Statistics
    pub stats: SessionStatistics,
}

impl<'t> AdacSession<'t> {
    /// Create a new session with a full size packet buffer
    pub fn new(transport: &'t mut dyn Transport) -> Self {
        Self::with_buffer(transport, PacketBuffer::new())
    }

    /// Create a session staging packets in `buffer`
    pub fn with_buffer(transport: &'t mut dyn Transport, buffer: PacketBuffer) -> Self {
        Self {
            state: SessionState::Disconnected,
            transport,
            buffer,
            last_error: None,
            stats: SessionStatistics::default(),
        }
    }

    /// Connect to the target
    pub fn connect(&mut self) -> SessionResult<()> {
        if self.state != SessionState::Disconnected {
            return Err(SessionError::InvalidState {
                current: self.state,
                expected: SessionState::Disconnected,
            });
        }

        if let Err(err) = self.transport.connect() {
            log::error!("Connection failed: {}", err);
            self.state = SessionState::Error;
            return Err(self.record(err.into()));
        }

        self.state = SessionState::Connected;
        Ok(())
    }

    /// Disconnect from the target
    pub fn disconnect(&mut self) -> SessionResult<()> {
        if self.state == SessionState::Disconnected {
            return Ok(());
        }

        if let Err(err) = self.transport.disconnect() {
            self.last_error = Some(err.into());
        }

        self.state = SessionState::Disconnected;
        Ok(())
    }

    /// Check if session is connected and ready
    pub fn is_ready(&self) -> bool {
        self.state == SessionState::Connected
    }

    /// Largest request payload the staging buffer accepts
    pub fn max_payload(&self) -> usize {
        self.buffer.max_payload()
    }

    /// Build and send one request.
    ///
    /// Known commands are logged by name. Vendor commands (bit 15 set) are
    /// sent as given. Any other ID is still sent, but reported as
    /// [`SessionError::UnrecognizedCommand`].
    pub fn issue_command(&mut self, command: u16, data: &[u8]) -> SessionResult<()> {
        self.ensure_ready()?;

        let mut outcome = Ok(());
        match AdacCommand::from_raw(command) {
            Some(AdacCommand::AuthResponse) if data.is_empty() => {
                return Err(self.record(SessionError::MissingPayload(command)));
            }
            Some(cmd) => log::info!("Sending {}", cmd.description()),
            None if is_vendor_command(command) => {
                log::info!("Vendor specific command provided. ID=(0x{:x})", command)
            }
            None => {
                log::info!("Unrecognized command. ID=(0x{:x})", command);
                outcome = Err(SessionError::UnrecognizedCommand(command));
            }
        }

        let packet = match self.buffer.build_request(command, data) {
            Ok(packet) => packet,
            Err(err) => {
                log::error!("Command construction failed: {}", err);
                self.stats.commands_failed += 1;
                self.last_error = Some(err.clone().into());
                return Err(err.into());
            }
        };
        log::debug!(
            "request command = 0x{:04x}, data_count = {}",
            packet.command(),
            packet.data_count()
        );

        let sent = self.transport.send(&packet);
        let sent_len = packet.as_bytes().len();
        packet.release();

        if let Err(err) = sent {
            self.state = SessionState::Error;
            return Err(self.record(err.into()));
        }

        self.stats.commands_sent += 1;
        self.stats.bytes_sent += sent_len as u64;
        outcome.map_err(|err| self.record(err))
    }

    /// Receive the next response.
    ///
    /// The returned packet holds the staging buffer until it is released.
    pub fn await_response(&mut self) -> SessionResult<ResponsePacket<'_>> {
        self.ensure_ready()?;

        match self.transport.receive(&mut self.buffer) {
            Ok(packet) => {
                log::debug!(
                    "status = 0x{:04x}, data_count = {}",
                    packet.status(),
                    packet.data_count()
                );
                self.stats.responses_received += 1;
                self.stats.bytes_received += packet.data().len() as u64;
                Ok(packet)
            }
            Err(err) => {
                log::error!("Target response not obtained: {}", err);
                self.state = SessionState::Error;
                self.stats.commands_failed += 1;
                self.last_error = Some(err.clone().into());
                Err(err.into())
            }
        }
    }

    /// Issue a command and wait for its response.
    ///
    /// An unrecognized command still reaches the target, so its reply is read
    /// and discarded before [`SessionError::UnrecognizedCommand`] is returned.
    /// The next command then sees its own response.
    pub fn execute(&mut self, command: u16, data: &[u8]) -> SessionResult<ResponsePacket<'_>> {
        match self.issue_command(command, data) {
            Ok(()) => self.await_response(),
            Err(SessionError::UnrecognizedCommand(id)) => {
                self.await_response()?.release();
                Err(SessionError::UnrecognizedCommand(id))
            }
            Err(err) => Err(err),
        }
    }

    fn ensure_ready(&self) -> SessionResult<()> {
        if !self.is_ready() {
            return Err(SessionError::InvalidState {
                current: self.state,
                expected: SessionState::Connected,
            });
        }
        Ok(())
    }

    fn record(&mut self, err: SessionError) -> SessionError {
        self.stats.commands_failed += 1;
        self.last_error = Some(err.clone());
        err
    }
}
