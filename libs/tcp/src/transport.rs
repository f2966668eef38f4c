use std::io::{self, Read, Write};
use std::net::{Shutdown, TcpStream};

/// A byte stream to the brick daemon that can be closed explicitly.
///
/// Implemented for [`TcpStream`]; tests substitute an in-memory stream.
pub trait Transport: Read + Write {
    /// Closes both directions of the stream.
    fn shutdown(&mut self) -> io::Result<()>;
}

impl Transport for TcpStream {
    fn shutdown(&mut self) -> io::Result<()> {
        TcpStream::shutdown(self, Shutdown::Both)
    }
}
