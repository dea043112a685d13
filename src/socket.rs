//! Wayland socket manipulation: blocking sends and receives with ancillary
//! file-descriptor payloads.

use std::collections::VecDeque;
use std::io::{ErrorKind, IoSlice, IoSliceMut, Result as IoResult};
use std::os::unix::io::{AsFd, AsRawFd, BorrowedFd, OwnedFd, RawFd};
use std::os::unix::net::UnixStream;
use std::slice;

use rustix::io::retry_on_intr;
use rustix::net::{
    recvmsg, send, sendmsg, RecvAncillaryBuffer, RecvAncillaryMessage, RecvFlags,
    SendAncillaryBuffer, SendAncillaryMessage, SendFlags,
};

/// Number of fds a single receive reserves ancillary space for. The kernel
/// caps SCM_RIGHTS transfers well below typical frame counts; this matches
/// libwayland's limit.
pub(crate) const MAX_FDS_IN: usize = 28;

/// A connected Wayland socket.
#[derive(Debug)]
pub(crate) struct Socket {
    stream: UnixStream,
}

impl Socket {
    /// Send one frame, attaching `fds` as a single SCM_RIGHTS control block.
    ///
    /// The first `sendmsg` is handed the whole frame so fd-bearing messages
    /// are not split; any short-write remainder carries no fds and is
    /// drained with plain `send`.
    pub fn send_with_fds(&self, bytes: &[u8], fds: &[RawFd]) -> IoResult<()> {
        let mut written = if fds.is_empty() {
            retry_on_intr(|| send(self, bytes, SendFlags::NOSIGNAL))?
        } else {
            let iov = [IoSlice::new(bytes)];
            let mut cmsg_space = vec![0u8; rustix::cmsg_space!(ScmRights(fds.len()))];
            let mut cmsg_buffer = SendAncillaryBuffer::new(&mut cmsg_space);
            // RawFd and BorrowedFd share a layout, and the fds outlive the call
            let borrowed =
                unsafe { slice::from_raw_parts(fds.as_ptr() as *const BorrowedFd, fds.len()) };
            cmsg_buffer.push(SendAncillaryMessage::ScmRights(borrowed));
            retry_on_intr(|| sendmsg(self, &iov, &mut cmsg_buffer, SendFlags::NOSIGNAL))?
        };
        while written < bytes.len() {
            written += retry_on_intr(|| send(self, &bytes[written..], SendFlags::NOSIGNAL))?;
        }
        Ok(())
    }

    /// Fill `buffer` completely, queueing any fds that arrive alongside.
    ///
    /// Each `recvmsg` parses the ancillary data for SCM_RIGHTS blocks and
    /// appends their fds to `fds` in arrival order, close-on-exec set. EOF
    /// before the buffer is full reports `UnexpectedEof`.
    pub fn recv_exact(&self, buffer: &mut [u8], fds: &mut VecDeque<OwnedFd>) -> IoResult<()> {
        let mut filled = 0;
        while filled < buffer.len() {
            let mut cmsg_space = [0u8; rustix::cmsg_space!(ScmRights(MAX_FDS_IN))];
            let mut cmsg_buffer = RecvAncillaryBuffer::new(&mut cmsg_space);
            let mut iov = [IoSliceMut::new(&mut buffer[filled..])];
            let msg = retry_on_intr(|| {
                recvmsg(&self.stream, &mut iov, &mut cmsg_buffer, RecvFlags::CMSG_CLOEXEC)
            })?;
            let received_fds = cmsg_buffer
                .drain()
                .filter_map(|cmsg| match cmsg {
                    RecvAncillaryMessage::ScmRights(fds) => Some(fds),
                    _ => None,
                })
                .flatten();
            fds.extend(received_fds);
            if msg.bytes == 0 {
                return Err(ErrorKind::UnexpectedEof.into());
            }
            filled += msg.bytes;
        }
        Ok(())
    }
}

impl From<UnixStream> for Socket {
    fn from(stream: UnixStream) -> Self {
        Self { stream }
    }
}

impl AsFd for Socket {
    fn as_fd(&self) -> BorrowedFd<'_> {
        self.stream.as_fd()
    }
}

impl AsRawFd for Socket {
    fn as_raw_fd(&self) -> RawFd {
        self.stream.as_raw_fd()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_and_fds_cross_a_socketpair() {
        let (tx, rx) = UnixStream::pair().unwrap();
        let (tx, rx) = (Socket::from(tx), Socket::from(rx));

        let payload = [1u8, 2, 3, 4, 5, 6, 7, 8];
        tx.send_with_fds(&payload, &[0]).unwrap();

        let mut buffer = [0u8; 8];
        let mut fds = VecDeque::new();
        rx.recv_exact(&mut buffer, &mut fds).unwrap();
        assert_eq!(buffer, payload);
        assert_eq!(fds.len(), 1);
    }

    #[test]
    fn recv_exact_reports_eof() {
        let (tx, rx) = UnixStream::pair().unwrap();
        let rx = Socket::from(rx);
        drop(tx);

        let mut buffer = [0u8; 4];
        let mut fds = VecDeque::new();
        let err = rx.recv_exact(&mut buffer, &mut fds).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnexpectedEof);
    }
}
