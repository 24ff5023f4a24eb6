//! Seam to the bus/transport that actually moves bytes.
//!
//! The codec never does I/O itself: it asks the transport for a zeroed
//! command buffer, fills it, and hands it back together with the opcode and
//! true byte length. Ownership of a [`CmdBuf`] is single-owner end to end:
//! the builder holds it between `alloc` and `send`, and a rejected send
//! returns it so the builder can free it (here, drop it) itself.

use wmi_wire::cmd::WmiCmdId;

/// A command buffer handed out by the transport's allocator. Zero-filled on
/// allocation, which is what makes TLV pad bytes zero on the wire.
#[derive(Debug)]
pub struct CmdBuf {
    bytes: Box<[u8]>,
}

impl CmdBuf {
    pub fn zeroed(len: usize) -> Self {
        Self {
            bytes: vec![0u8; len].into_boxed_slice(),
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.bytes
    }
}

/// Reason a transport refused a send. The buffer rides along so the caller
/// keeps sole ownership of it.
#[derive(Debug)]
pub struct SendRejected {
    pub reason: &'static str,
    pub buf: CmdBuf,
}

/// Send-side transport primitives consumed by the command builder.
pub trait WmiTransport {
    /// Allocates a zeroed buffer of exactly `len` bytes, or `None` when the
    /// pool is exhausted. Callers must not retry synchronously.
    fn alloc(&mut self, len: usize) -> Option<CmdBuf>;

    /// Dispatches a completed command buffer. `len` is the true byte length
    /// (equal to `buf.len()`; the builder sizes buffers exact-fit).
    fn send(&mut self, buf: CmdBuf, len: usize, cmd_id: WmiCmdId) -> Result<(), SendRejected>;
}
