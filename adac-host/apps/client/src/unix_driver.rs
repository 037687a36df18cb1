// Licensed under the Apache-2.0 license

use adac_host::{DriverError, MessageDriver};
use std::io::{ErrorKind, Read, Write};
use std::os::unix::net::UnixStream;
use std::path::{Path, PathBuf};

/// Unix domain socket driver for a debug target listening on a local path
pub struct UnixSocketDriver {
    stream: Option<UnixStream>,
    socket_path: PathBuf,
}

impl UnixSocketDriver {
    pub fn new(socket_path: impl AsRef<Path>) -> Self {
        Self {
            stream: None,
            socket_path: socket_path.as_ref().to_path_buf(),
        }
    }

    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }
}

fn io_error(err: std::io::Error) -> DriverError {
    match err.kind() {
        ErrorKind::TimedOut | ErrorKind::WouldBlock => DriverError::Timeout,
        ErrorKind::BrokenPipe | ErrorKind::ConnectionReset | ErrorKind::UnexpectedEof => {
            DriverError::Closed
        }
        _ => DriverError::CommunicationError,
    }
}

impl MessageDriver for UnixSocketDriver {
    fn write(&mut self, data: &[u8]) -> Result<usize, DriverError> {
        let stream = self.stream.as_mut().ok_or(DriverError::NotReady)?;
        loop {
            match stream.write(data) {
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                result => return result.map_err(io_error),
            }
        }
    }

    fn read(&mut self, buffer: &mut [u8]) -> Result<usize, DriverError> {
        let stream = self.stream.as_mut().ok_or(DriverError::NotReady)?;
        loop {
            match stream.read(buffer) {
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                result => return result.map_err(io_error),
            }
        }
    }

    fn is_ready(&self) -> bool {
        self.stream.is_some()
    }

    fn connect(&mut self) -> Result<(), DriverError> {
        let stream = UnixStream::connect(&self.socket_path).map_err(|err| {
            log::error!(
                "Cannot connect to {}: {}",
                self.socket_path.display(),
                err
            );
            DriverError::ConnectionRefused
        })?;
        self.stream = Some(stream);
        Ok(())
    }

    fn disconnect(&mut self) -> Result<(), DriverError> {
        if let Some(stream) = self.stream.take() {
            let _ = stream.shutdown(std::net::Shutdown::Both);
        }
        Ok(())
    }
}
