//! The connection to the compositor: socket ownership, message framing,
//! buffer management and the received-fd queue.

use std::collections::VecDeque;
use std::env;
use std::io::{self, ErrorKind};
use std::os::unix::io::{AsFd, AsRawFd, BorrowedFd, OwnedFd, RawFd};
use std::os::unix::net::UnixStream;
use std::path::{Path, PathBuf};
use std::slice;

use crate::protocol::MessageHeader;
use crate::socket::Socket;
use crate::wire::{self, FdList, MessageWriteError, Payload, MAX_FRAME_BYTES};

/// An error when trying to establish a Wayland connection.
#[derive(Debug, thiserror::Error)]
pub enum ConnectError {
    /// `XDG_RUNTIME_DIR` is not set, so there is no place to look for the
    /// compositor socket.
    #[error("XDG_RUNTIME_DIR is not set in the environment")]
    NoRuntimeDir,

    /// The socket could not be connected.
    #[error("could not connect to the compositor socket")]
    Io(#[from] io::Error),
}

/// An error while sending a request.
#[derive(Debug, thiserror::Error)]
pub enum SendError {
    /// A string argument does not fit in a 32-bit length prefix.
    #[error("a string argument is too long to be encoded")]
    StringTooLong,

    /// A string argument contains an interior NUL byte, which the wire's
    /// NUL-terminated strings cannot represent.
    #[error("a string argument contains an interior NUL byte")]
    NulInString,

    /// The message does not fit in the 16-bit frame size the wire allows.
    #[error("the message exceeds the maximum frame size")]
    FrameTooBig,

    /// The socket write failed.
    #[error("io error while writing to the socket")]
    Io(#[from] io::Error),
}

/// An error while receiving an event.
#[derive(Debug, thiserror::Error)]
pub enum RecvError {
    /// The compositor closed the connection. Terminal: the connection is
    /// unusable afterwards.
    #[error("the connection was closed by the peer")]
    Closed,

    /// The frame header announces an impossible size.
    #[error("received a frame with invalid size {0}")]
    InvalidFrameSize(u16),

    /// The socket read failed.
    #[error("io error while reading from the socket")]
    Io(#[from] io::Error),
}

/// Error from [`Connection::take_fd`] when no descriptor is queued.
///
/// Claiming fds the current message never carried is a caller bug.
#[derive(Debug, Clone, Copy, thiserror::Error)]
#[error("no file descriptor is queued on the connection")]
pub struct EmptyFdQueue;

// Word buffers start at 16 words and double until the frame fits.
const INITIAL_BUFFER_WORDS: usize = 16;

/// A growable, word-aligned byte buffer.
///
/// Keeping the storage as words means payload slices handed out by
/// [`Connection::recv`] are always 4-byte aligned, which the decoder's
/// typed array views rely on.
#[derive(Debug)]
struct WordBuf {
    words: Vec<u32>,
}

impl WordBuf {
    fn new() -> Self {
        Self { words: vec![0; INITIAL_BUFFER_WORDS] }
    }

    fn byte_len(&self) -> usize {
        self.words.len() * 4
    }

    fn grow(&mut self) {
        let len = self.words.len();
        self.words.resize(len * 2, 0);
    }

    fn ensure(&mut self, bytes: usize) {
        while self.byte_len() < bytes {
            self.grow();
        }
    }

    fn bytes(&self) -> &[u8] {
        // u32 -> u8 view, always valid
        unsafe { slice::from_raw_parts(self.words.as_ptr().cast(), self.byte_len()) }
    }

    fn bytes_mut(&mut self) -> &mut [u8] {
        let len = self.byte_len();
        // u32 -> u8 view, always valid
        unsafe { slice::from_raw_parts_mut(self.words.as_mut_ptr().cast(), len) }
    }
}

/// A connection to a Wayland compositor.
///
/// Owns the Unix stream, one growable buffer per direction, and the queue
/// of file descriptors received but not yet claimed. A connection is not
/// internally synchronized; callers that share one across threads must
/// serialize access themselves.
#[derive(Debug)]
pub struct Connection {
    socket: Socket,
    out: WordBuf,
    input: WordBuf,
    fd_queue: VecDeque<OwnedFd>,
}

impl Connection {
    /// Connect to the compositor named by the environment.
    ///
    /// `$XDG_RUNTIME_DIR` must be set. `$WAYLAND_DISPLAY` defaults to
    /// `"wayland-0"` and is used verbatim when it is an absolute path,
    /// joined to the runtime dir otherwise.
    pub fn connect_to_env() -> Result<Self, ConnectError> {
        let path =
            socket_path(env::var_os("XDG_RUNTIME_DIR"), env::var_os("WAYLAND_DISPLAY"))?;
        Self::connect(&path)
    }

    /// Connect to the compositor socket at `path`.
    pub fn connect(path: &Path) -> Result<Self, ConnectError> {
        let stream = UnixStream::connect(path)?;
        Ok(Self::from_stream(stream))
    }

    /// Wrap an already-connected stream (a socketpair in tests, an
    /// inherited socket in embedders).
    pub fn from_stream(stream: UnixStream) -> Self {
        Self {
            socket: Socket::from(stream),
            out: WordBuf::new(),
            input: WordBuf::new(),
            fd_queue: VecDeque::new(),
        }
    }

    /// Send one message on the object named by `object_id`.
    ///
    /// The frame and any fd arguments leave in a single `sendmsg`. The send
    /// buffer grows by doubling until the frame fits, so buffer exhaustion
    /// is never surfaced, only [`SendError::FrameTooBig`] when the frame
    /// cannot exist at all.
    pub fn send<'a, P: Payload<'a>>(
        &mut self,
        object_id: u32,
        payload: &P,
    ) -> Result<(), SendError> {
        let mut fds = FdList::new();
        let size = loop {
            fds.clear();
            match wire::write_message(object_id, payload, self.out.bytes_mut(), &mut fds) {
                Ok(size) => break size,
                Err(MessageWriteError::BufferTooSmall) => {
                    if self.out.byte_len() >= MAX_FRAME_BYTES {
                        return Err(SendError::FrameTooBig);
                    }
                    self.out.grow();
                }
                Err(MessageWriteError::StringTooLong) => return Err(SendError::StringTooLong),
                Err(MessageWriteError::NulInString) => return Err(SendError::NulInString),
                Err(MessageWriteError::FrameTooBig) => return Err(SendError::FrameTooBig),
            }
        };

        if log::log_enabled!(log::Level::Debug) {
            let interface = P::interface();
            let name = interface
                .message(P::direction(), payload.opcode())
                .map(|desc| desc.name)
                .unwrap_or("<unknown>");
            log::debug!("-> {}@{}.{} ({} bytes, {} fds)", interface, object_id, name, size, fds.len());
        }

        self.socket.send_with_fds(&self.out.bytes()[..size], &fds)?;
        Ok(())
    }

    /// Receive one message.
    ///
    /// Blocks until a full frame arrived. Returns the header and a view of
    /// the payload; the view borrows the receive buffer and is valid until
    /// the next `recv` call. File descriptors delivered alongside are
    /// queued for [`take_fd`](Self::take_fd).
    pub fn recv(&mut self) -> Result<(MessageHeader, &[u8]), RecvError> {
        let mut header_bytes = [0u8; MessageHeader::BYTES];
        self.socket.recv_exact(&mut header_bytes, &mut self.fd_queue).map_err(map_recv_err)?;
        let header = MessageHeader::from_bytes(header_bytes);

        if (header.size as usize) < MessageHeader::BYTES || header.size % 4 != 0 {
            return Err(RecvError::InvalidFrameSize(header.size));
        }
        let body_len = header.size as usize - MessageHeader::BYTES;
        self.input.ensure(body_len);
        self.socket
            .recv_exact(&mut self.input.bytes_mut()[..body_len], &mut self.fd_queue)
            .map_err(map_recv_err)?;

        log::debug!(
            "<- object {} opcode {} ({} bytes, {} fds queued)",
            header.object_id,
            header.opcode,
            header.size,
            self.fd_queue.len()
        );
        Ok((header, &self.input.bytes()[..body_len]))
    }

    /// Claim the oldest received file descriptor.
    ///
    /// After receiving a message whose schema carries fds, call this once
    /// per fd argument, in field order. Ownership transfers to the caller;
    /// descriptors never claimed are closed when the connection drops.
    pub fn take_fd(&mut self) -> Result<OwnedFd, EmptyFdQueue> {
        self.fd_queue.pop_front().ok_or(EmptyFdQueue)
    }

    /// Number of received file descriptors not yet claimed.
    pub fn pending_fds(&self) -> usize {
        self.fd_queue.len()
    }
}

// Resolution rule for the compositor socket: `WAYLAND_DISPLAY` defaults to
// "wayland-0" and wins outright when absolute; otherwise it is joined to
// `XDG_RUNTIME_DIR`, whose absence is fatal.
fn socket_path(
    runtime_dir: Option<std::ffi::OsString>,
    display: Option<std::ffi::OsString>,
) -> Result<PathBuf, ConnectError> {
    let display = PathBuf::from(display.unwrap_or_else(|| "wayland-0".into()));
    if display.is_absolute() {
        return Ok(display);
    }
    let runtime_dir = runtime_dir.ok_or(ConnectError::NoRuntimeDir)?;
    Ok(PathBuf::from(runtime_dir).join(display))
}

fn map_recv_err(err: io::Error) -> RecvError {
    if err.kind() == ErrorKind::UnexpectedEof {
        RecvError::Closed
    } else {
        RecvError::Io(err)
    }
}

impl AsFd for Connection {
    /// The socket fd, for readiness polling in external event loops.
    fn as_fd(&self) -> BorrowedFd<'_> {
        self.socket.as_fd()
    }
}

impl AsRawFd for Connection {
    fn as_raw_fd(&self) -> RawFd {
        self.socket.as_raw_fd()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interfaces::{wl_display, wl_shm};
    use crate::protocol::DISPLAY_ID;
    use crate::wire::parse_message;

    fn pair() -> (Connection, Connection) {
        let (a, b) = UnixStream::pair().unwrap();
        (Connection::from_stream(a), Connection::from_stream(b))
    }

    fn same_file(a: BorrowedFd, b: BorrowedFd) -> bool {
        let stat1 = rustix::fs::fstat(a).unwrap();
        let stat2 = rustix::fs::fstat(b).unwrap();
        stat1.st_dev == stat2.st_dev && stat1.st_ino == stat2.st_ino
    }

    #[test]
    fn socket_path_resolution() {
        let joined = socket_path(Some("/run/user/1000".into()), None).unwrap();
        assert_eq!(joined, Path::new("/run/user/1000/wayland-0"));

        let named =
            socket_path(Some("/run/user/1000".into()), Some("wayland-1".into())).unwrap();
        assert_eq!(named, Path::new("/run/user/1000/wayland-1"));

        // an absolute display wins outright
        let absolute = socket_path(None, Some("/tmp/test-socket".into())).unwrap();
        assert_eq!(absolute, Path::new("/tmp/test-socket"));

        assert!(matches!(socket_path(None, None), Err(ConnectError::NoRuntimeDir)));
    }

    #[test]
    fn send_recv_cycle() {
        let (mut client, mut server) = pair();

        client.send(DISPLAY_ID, &wl_display::Request::Sync { callback: 3 }).unwrap();

        let (header, body) = server.recv().unwrap();
        assert_eq!(header, MessageHeader { object_id: DISPLAY_ID, size: 12, opcode: 0 });
        let request: wl_display::Request = parse_message(header, body).unwrap();
        assert_eq!(request, wl_display::Request::Sync { callback: 3 });
    }

    #[test]
    fn fd_rides_the_ancillary_channel() {
        let (mut client, mut server) = pair();
        let file = std::fs::File::open("/dev/null").unwrap();

        let request =
            wl_shm::Request::CreatePool { id: 8, fd: file.as_raw_fd(), size: 4096 };
        client.send(6, &request).unwrap();

        let (header, body) = server.recv().unwrap();
        // the payload holds exactly the two non-fd words
        assert_eq!(header.size, 8 + 8);
        let parsed: wl_shm::Request = parse_message(header, body).unwrap();
        match parsed {
            wl_shm::Request::CreatePool { id, size, .. } => {
                assert_eq!((id, size), (8, 4096));
            }
        }

        assert_eq!(server.pending_fds(), 1);
        let received = server.take_fd().unwrap();
        assert!(same_file(received.as_fd(), file.as_fd()));
        assert!(server.take_fd().is_err());
    }

    #[test]
    fn fds_are_claimed_in_arrival_order() {
        let (mut client, mut server) = pair();
        let null = std::fs::File::open("/dev/null").unwrap();
        let zero = std::fs::File::open("/dev/zero").unwrap();

        client
            .send(6, &wl_shm::Request::CreatePool { id: 8, fd: null.as_raw_fd(), size: 1 })
            .unwrap();
        client
            .send(6, &wl_shm::Request::CreatePool { id: 9, fd: zero.as_raw_fd(), size: 1 })
            .unwrap();

        let _ = server.recv().unwrap();
        let _ = server.recv().unwrap();
        assert!(same_file(server.take_fd().unwrap().as_fd(), null.as_fd()));
        assert!(same_file(server.take_fd().unwrap().as_fd(), zero.as_fd()));
    }

    #[test]
    fn growing_messages_grow_the_send_buffer() {
        let (mut client, mut server) = pair();
        // far larger than the 16-word initial buffer
        let title = "t".repeat(3000);
        let request = crate::interfaces::xdg_toplevel::Request::SetTitle { title: &title };
        client.send(30, &request).unwrap();

        let (header, body) = server.recv().unwrap();
        let parsed: crate::interfaces::xdg_toplevel::Request =
            parse_message(header, body).unwrap();
        assert_eq!(parsed, request);
    }

    #[test]
    fn peer_close_is_reported() {
        let (mut client, server) = pair();
        drop(server);
        match client.recv() {
            Err(RecvError::Closed) => {}
            other => panic!("expected Closed, got {other:?}"),
        }
    }

    #[test]
    fn invalid_frame_size_is_rejected() {
        use std::io::Write;

        let (client_stream, mut server_stream) = UnixStream::pair().unwrap();
        let mut client = Connection::from_stream(client_stream);

        // hand-write a header announcing a 6-byte frame
        let raw = MessageHeader { object_id: 1, size: 6, opcode: 0 }.to_bytes();
        server_stream.write_all(&raw).unwrap();
        match client.recv() {
            Err(RecvError::InvalidFrameSize(6)) => {}
            other => panic!("expected InvalidFrameSize, got {other:?}"),
        }
    }
}
