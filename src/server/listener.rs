// Listener module
// Creates the TCP listener and scans a bounded port range for a free port

use socket2::{Domain, Protocol, Socket, Type};
use std::io;
use std::net::{IpAddr, SocketAddr};

use crate::config::ServerConfig;
use crate::error::StartupError;
use crate::logger;

/// Pending connection queue length
const LISTEN_BACKLOG: i32 = 128;

/// Create a non-blocking `std::net::TcpListener` ready for Tokio.
///
/// `SO_REUSEADDR` is enabled on Unix so a port left in `TIME_WAIT` by a
/// previous run can be reused. `SO_REUSEPORT` is never set, so a port with
/// a live listener fails with `AddrInUse`.
pub fn create_listener(addr: SocketAddr) -> io::Result<std::net::TcpListener> {
    let socket = Socket::new(Domain::for_address(addr), Type::STREAM, Some(Protocol::TCP))?;

    #[cfg(unix)]
    socket.set_reuse_address(true)?;

    socket.set_nonblocking(true)?;
    socket.bind(&addr.into())?;
    socket.listen(LISTEN_BACKLOG)?;

    Ok(socket.into())
}

/// Port scan states
#[derive(Debug)]
pub enum ScanState<L> {
    /// About to bind this port
    Trying(u16),
    /// Bound; terminal
    Bound(u16, L),
    /// Every candidate was in use; terminal
    Exhausted,
    /// A bind error other than address-in-use; terminal
    Fatal { addr: SocketAddr, source: io::Error },
}

/// Tries `start`, `start + 1`, ... for at most `attempts` ports
#[derive(Debug, Clone, Copy)]
pub struct PortBinder {
    ip: IpAddr,
    start: u16,
    attempts: u16,
}

impl PortBinder {
    pub const fn new(ip: IpAddr, start: u16, attempts: u16) -> Self {
        Self {
            ip,
            start,
            attempts,
        }
    }

    pub fn from_config(server: &ServerConfig) -> Result<Self, StartupError> {
        Ok(Self::new(server.bind_ip()?, server.port, server.port_attempts))
    }

    /// Bind a real listener on the first free port
    ///
    /// The returned port is the one the socket actually holds, so port 0
    /// reports the ephemeral port picked by the OS.
    pub fn bind(&self) -> Result<(std::net::TcpListener, u16), StartupError> {
        let (listener, requested) = self.bind_with(create_listener)?;
        let port = listener
            .local_addr()
            .map_or(requested, |addr| addr.port());
        Ok((listener, port))
    }

    /// Run the scan with a custom bind function
    pub fn bind_with<L, F>(&self, mut bind: F) -> Result<(L, u16), StartupError>
    where
        F: FnMut(SocketAddr) -> io::Result<L>,
    {
        let mut state = if self.attempts == 0 {
            ScanState::Exhausted
        } else {
            ScanState::Trying(self.start)
        };

        loop {
            state = match state {
                ScanState::Trying(port) => self.step(port, &mut bind),
                ScanState::Bound(port, listener) => return Ok((listener, port)),
                ScanState::Exhausted => {
                    return Err(StartupError::PortExhaustion {
                        start: self.start,
                        attempts: self.attempts,
                    })
                }
                ScanState::Fatal { addr, source } => {
                    return Err(StartupError::Bind { addr, source })
                }
            };
        }
    }

    fn step<L, F>(&self, port: u16, bind: &mut F) -> ScanState<L>
    where
        F: FnMut(SocketAddr) -> io::Result<L>,
    {
        let addr = SocketAddr::new(self.ip, port);
        match bind(addr) {
            Ok(listener) => ScanState::Bound(port, listener),
            Err(e) if e.kind() == io::ErrorKind::AddrInUse => {
                logger::log_port_in_use(port);
                self.next_after(port)
            }
            Err(source) => ScanState::Fatal { addr, source },
        }
    }

    fn next_after<L>(&self, port: u16) -> ScanState<L> {
        let tried = port - self.start + 1;
        if tried >= self.attempts {
            return ScanState::Exhausted;
        }
        port.checked_add(1)
            .map_or(ScanState::Exhausted, ScanState::Trying)
    }
}
