use std::io;
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::thread;
use std::time::{Duration, Instant};

use may::coroutine::JoinHandle;
use may_minihttp::{HttpServer as MiniHttpServer, HttpService};
use tracing::{debug, info};

/// How long [`ServerHandle::wait_ready`] polls before giving up.
pub const READY_TIMEOUT: Duration = Duration::from_millis(250);

const READY_POLL: Duration = Duration::from_millis(5);

/// Binds a `may_minihttp` service, usually a [`JsonService`](super::JsonService).
///
/// ```rust,no_run
/// use autojson::server::{HttpServer, JsonService};
///
/// let handle = HttpServer(JsonService::builder().build()).start("127.0.0.1:0")?;
/// handle.wait_ready()?;
/// # Ok::<(), std::io::Error>(())
/// ```
pub struct HttpServer<T>(pub T);

impl<T: HttpService + Clone + Send + Sync + 'static> HttpServer<T> {
    /// Bind the first address `addr` resolves to and start accepting connections.
    ///
    /// # Errors
    ///
    /// `InvalidInput` when `addr` resolves to nothing, or the bind error.
    pub fn start<A: ToSocketAddrs>(self, addr: A) -> io::Result<ServerHandle> {
        let Some(addr) = addr.to_socket_addrs()?.next() else {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "address resolved to nothing",
            ));
        };
        let accept_loop = MiniHttpServer(self.0).start(addr)?;
        info!(%addr, "Server listening");
        Ok(ServerHandle { addr, accept_loop })
    }
}

/// A running server: its bound address and accept-loop coroutine.
pub struct ServerHandle {
    addr: SocketAddr,
    accept_loop: JoinHandle<()>,
}

impl ServerHandle {
    #[must_use]
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Block until a TCP connect succeeds, for at most [`READY_TIMEOUT`].
    ///
    /// # Errors
    ///
    /// `TimedOut` if nothing accepted in time.
    pub fn wait_ready(&self) -> io::Result<()> {
        self.wait_ready_for(READY_TIMEOUT)
    }

    /// [`wait_ready`](Self::wait_ready) with a caller-chosen timeout.
    ///
    /// # Errors
    ///
    /// `TimedOut` if nothing accepted within `timeout`.
    pub fn wait_ready_for(&self, timeout: Duration) -> io::Result<()> {
        let deadline = Instant::now() + timeout;
        loop {
            if TcpStream::connect(self.addr).is_ok() {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(io::Error::new(
                    io::ErrorKind::TimedOut,
                    format!("server on {} not accepting after {timeout:?}", self.addr),
                ));
            }
            thread::sleep(READY_POLL);
        }
    }

    /// Cancel the accept loop and wait for it to exit. Connections already accepted
    /// run on their own coroutines and finish their current request.
    #[allow(unsafe_code)]
    pub fn stop(self) {
        let Self { addr, accept_loop } = self;
        // SAFETY: `may` marks cancellation unsafe because the target may hold
        // resources; the accept loop only owns the listener, which is dropped on unwind.
        unsafe { accept_loop.coroutine().cancel() };
        // a cancelled coroutine joins as Err
        if accept_loop.join().is_err() {
            debug!(%addr, "Accept loop unwound");
        }
        info!(%addr, "Server stopped");
    }

    /// Wait for the accept loop to end on its own.
    ///
    /// # Errors
    ///
    /// The panic payload if the accept loop panicked.
    pub fn join(self) -> thread::Result<()> {
        self.accept_loop.join()
    }
}
