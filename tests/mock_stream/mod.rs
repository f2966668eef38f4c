use std::cell::{Cell, RefCell};
use std::io::{self, Cursor, Read, Write};
use std::rc::Rc;

use buildlamp::core::Packet;
use buildlamp::tcp::Transport;

/// Mock connection to a brick daemon that replays canned replies and records writes.
///
/// Once the replies run out, reads fail the way a socket read timeout does.
#[derive(Debug, Clone)]
pub struct MockStream {
    input: Cursor<Vec<u8>>,
    written: Rc<RefCell<Vec<u8>>>,
    shut_down: Rc<Cell<bool>>,
    shutdown_error: Option<io::ErrorKind>,
}

impl MockStream {
    pub fn new(replies: &[Packet]) -> Self {
        MockStream {
            input: Cursor::new(replies.iter().flat_map(Packet::to_bytes).collect()),
            written: Rc::new(RefCell::new(vec![])),
            shut_down: Rc::new(Cell::new(false)),
            shutdown_error: None,
        }
    }

    #[allow(dead_code)] // Not used by all tests.
    pub fn failing_shutdown(mut self, kind: io::ErrorKind) -> Self {
        self.shutdown_error = Some(kind);
        self
    }

    /// Shared view of everything written so far.
    pub fn written(&self) -> Rc<RefCell<Vec<u8>>> {
        self.written.clone()
    }

    #[allow(dead_code)] // Not used by all tests.
    pub fn shut_down(&self) -> Rc<Cell<bool>> {
        self.shut_down.clone()
    }
}

impl Read for MockStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.input.position() as usize >= self.input.get_ref().len() {
            return Err(io::Error::new(io::ErrorKind::WouldBlock, "Dummy read timeout"));
        }
        self.input.read(buf)
    }
}

impl Write for MockStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.written.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Transport for MockStream {
    fn shutdown(&mut self) -> io::Result<()> {
        self.shut_down.set(true);
        match self.shutdown_error {
            Some(kind) => Err(io::Error::new(kind, "Dummy shutdown error")),
            None => Ok(()),
        }
    }
}
