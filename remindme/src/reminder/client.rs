// One-shot client for the watcher daemon socket
// Connects, sends a single framed request, and reads one response

use std::io::{BufRead, BufReader, Write};
use std::os::unix::net::UnixStream;
use std::time::Duration;

use crate::reminder::config::Config;
use crate::reminder::error::TransportError;
use crate::reminder::protocol::{
    deserialize_message, serialize_message, DaemonRequest, DaemonResponse,
    MAX_RESPONSE_FRAME_SIZE,
};

const READ_TIMEOUT: Duration = Duration::from_secs(30);
const WRITE_TIMEOUT: Duration = Duration::from_secs(5);

/// Connect to the resident watcher. A missing watcher is fatal for the
/// one-shot client; it never retries or spawns one.
pub fn connect(config: &Config) -> Result<UnixStream, TransportError> {
    let stream =
        UnixStream::connect(&config.socket_path).map_err(|source| TransportError::Connect {
            path: config.socket_path.clone(),
            source,
        })?;

    stream.set_read_timeout(Some(READ_TIMEOUT))?;
    stream.set_write_timeout(Some(WRITE_TIMEOUT))?;

    Ok(stream)
}

/// Send one request frame and wait for the matching response frame.
pub fn send_request(
    stream: &mut UnixStream,
    request: &DaemonRequest,
) -> Result<DaemonResponse, TransportError> {
    let bytes = serialize_message(request)?;
    stream.write_all(&bytes)?;
    stream.flush()?;

    let mut reader = BufReader::new(stream);
    let mut line = String::new();
    let n = reader.read_line(&mut line)?;
    if n == 0 {
        return Err(TransportError::ConnectionClosed);
    }
    if line.len() > MAX_RESPONSE_FRAME_SIZE {
        return Err(TransportError::FrameTooLarge {
            max_bytes: MAX_RESPONSE_FRAME_SIZE,
        });
    }

    Ok(deserialize_message(line.as_bytes())?)
}
