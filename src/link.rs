//! Transport between the face and its companion: newline-delimited JSON
//! over a Unix socket. The face listens, the companion dials in.

use crate::message::{FieldUpdate, RefreshRequest};
use anyhow::{bail, Context};
use log::{error, info, trace};
use std::{
    fs,
    io::{self, BufRead, BufReader, Read, Write},
    os::unix::net::{UnixListener, UnixStream},
    path::Path,
};

/// Cap on one message line, in bytes. Anything bigger gets dropped
/// instead of parsed.
const MESSAGE_LIMIT: usize = 1000;

/// Face side of the link. Holds at most one companion at a time; a new
/// connection replaces the old one. All reads are non-blocking so the
/// face's event loop never stalls on the socket.
pub struct FaceLink {
    listener: UnixListener,
    companion: Option<UnixStream>,
    /// Bytes of a line whose end hasn't arrived yet
    partial: Vec<u8>,
}

impl FaceLink {
    pub fn bind(path: &Path) -> anyhow::Result<Self> {
        // A socket file left over from a previous run blocks the bind
        if path.exists() {
            fs::remove_file(path).with_context(|| {
                format!("Error removing stale socket {path:?}")
            })?;
        }
        let listener = UnixListener::bind(path)
            .with_context(|| format!("Error binding socket {path:?}"))?;
        listener
            .set_nonblocking(true)
            .context("Error configuring socket")?;
        info!("Listening on {path:?}");
        Ok(Self {
            listener,
            companion: None,
            partial: Vec::new(),
        })
    }

    /// Poll for connections and data. Returns every complete message that
    /// has arrived since the last poll.
    pub fn poll(&mut self) -> Vec<FieldUpdate> {
        self.accept();
        self.read_available();
        self.drain_lines()
    }

    /// Send a refresh request to the connected companion
    pub fn send(&mut self, request: &RefreshRequest) -> anyhow::Result<()> {
        let companion =
            self.companion.as_mut().context("No companion connected")?;
        let mut line = serde_json::to_vec(request)?;
        line.push(b'\n');
        companion
            .write_all(&line)
            .context("Error writing to companion")?;
        Ok(())
    }

    fn accept(&mut self) {
        match self.listener.accept() {
            Ok((stream, _)) => {
                if let Err(err) = stream.set_nonblocking(true) {
                    error!("Error configuring companion stream: {err}");
                    return;
                }
                info!("Companion connected");
                self.companion = Some(stream);
                self.partial.clear();
            }
            Err(err) if err.kind() == io::ErrorKind::WouldBlock => {}
            Err(err) => error!("Error accepting connection: {err}"),
        }
    }

    /// Pull everything the companion has written so far into the line
    /// buffer
    fn read_available(&mut self) {
        let Some(companion) = &mut self.companion else {
            return;
        };
        let mut buffer = [0; 1024];
        let mut disconnected = false;
        loop {
            match companion.read(&mut buffer) {
                Ok(0) => {
                    info!("Companion disconnected");
                    disconnected = true;
                    break;
                }
                Ok(read) => self.partial.extend_from_slice(&buffer[..read]),
                Err(err) if err.kind() == io::ErrorKind::WouldBlock => break,
                Err(err) => {
                    error!("Error reading from companion: {err}");
                    disconnected = true;
                    break;
                }
            }
        }
        if disconnected {
            self.companion = None;
        }
    }

    /// Parse complete lines out of the buffer. Bad or oversized lines are
    /// logged and skipped, the stream keeps going.
    fn drain_lines(&mut self) -> Vec<FieldUpdate> {
        let mut updates = Vec::new();
        while let Some(end) =
            self.partial.iter().position(|byte| *byte == b'\n')
        {
            let line: Vec<u8> = self.partial.drain(..=end).collect();
            let line = &line[..line.len() - 1];
            if line.len() > MESSAGE_LIMIT {
                error!(
                    "Message dropped: {} bytes is over the limit",
                    line.len()
                );
                continue;
            }
            match serde_json::from_slice(line) {
                Ok(update) => {
                    trace!("Received {update:?}");
                    updates.push(update);
                }
                Err(err) => error!("Message dropped: {err}"),
            }
        }
        // A partial line past the limit can never complete into a valid
        // message
        if self.partial.len() > MESSAGE_LIMIT {
            error!(
                "Partial message dropped: {} bytes is over the limit",
                self.partial.len()
            );
            self.partial.clear();
        }
        updates
    }
}

/// Companion side of the link
pub struct CompanionLink {
    reader: BufReader<UnixStream>,
}

impl CompanionLink {
    pub fn connect(path: &Path) -> anyhow::Result<Self> {
        let stream = UnixStream::connect(path).with_context(|| {
            format!("Error connecting to face at {path:?}")
        })?;
        Ok(Self {
            reader: BufReader::new(stream),
        })
    }

    /// Block until the face asks for a refresh
    pub fn wait_for_request(&mut self) -> anyhow::Result<RefreshRequest> {
        let mut line = String::new();
        let read = self
            .reader
            .read_line(&mut line)
            .context("Error reading from face")?;
        if read == 0 {
            bail!("Face closed the link");
        }
        Ok(serde_json::from_str(line.trim_end())?)
    }

    /// Push a batch of fields to the face
    pub fn send(&mut self, update: &FieldUpdate) -> anyhow::Result<()> {
        let mut line = serde_json::to_vec(update)?;
        line.push(b'\n');
        self.reader
            .get_mut()
            .write_all(&line)
            .context("Error writing to face")?;
        Ok(())
    }
}
