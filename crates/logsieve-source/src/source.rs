use std::sync::Arc;

use futures::future::BoxFuture;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::{Instant, timeout, timeout_at};
use tracing::{error, info, warn};

use logsieve_types::RawLogLine;

use crate::error::{Result, SourceError};
use crate::runtime::{ContainerRuntime, SourceHandle};
use crate::spec::SourceSpec;

/// Request sent to the log source once connected
pub const LOG_REQUEST: &[u8] = b"GET HTTP/1.1\r\nHost: localhost\r\n\r\n";

const READ_CHUNK: usize = 4096;

/// Something that can produce a batch of raw log lines
pub trait LogSource: Send + Sync {
    /// Fetch all available lines.
    ///
    /// Never fails: when the source is unavailable the error is logged and no
    /// lines are returned. The last element may be an empty string.
    fn fetch(&self) -> BoxFuture<'_, Vec<RawLogLine>>;
}

/// Split decoded stream text on `\n`, keeping a trailing empty line
pub fn split_lines(bytes: &[u8]) -> Vec<RawLogLine> {
    String::from_utf8_lossy(bytes)
        .split('\n')
        .map(str::to_string)
        .collect()
}

/// Log source backed by a container started for each fetch
pub struct ContainerLogSource<R> {
    runtime: Arc<R>,
    spec: SourceSpec,
}

impl<R: ContainerRuntime> ContainerLogSource<R> {
    pub fn new(runtime: Arc<R>, spec: SourceSpec) -> Self {
        Self { runtime, spec }
    }

    pub fn spec(&self) -> &SourceSpec {
        &self.spec
    }

    /// Start, drain, and stop the container
    async fn try_fetch(&self) -> Result<Vec<RawLogLine>> {
        let handle = self.runtime.start(&self.spec).await?;
        info!(container = %handle.id, endpoint = %handle.endpoint(), "log source started");

        let guard = StopGuard::new(Arc::clone(&self.runtime), handle);
        let drained = self.drain(guard.handle()).await;
        guard.stop().await;

        Ok(split_lines(&drained?))
    }

    /// Connect, send the request, and read until the peer closes
    async fn drain(&self, handle: &SourceHandle) -> Result<Vec<u8>> {
        if !self.spec.startup_grace.is_zero() {
            tokio::time::sleep(self.spec.startup_grace).await;
        }

        let endpoint = handle.endpoint();
        let mut stream = timeout(
            self.spec.connect_timeout,
            TcpStream::connect((handle.host.as_str(), handle.port)),
        )
        .await
        .map_err(|_| SourceError::ConnectTimedOut(endpoint.clone()))?
        .map_err(|source| SourceError::ConnectFailed {
            endpoint: endpoint.clone(),
            source,
        })?;

        stream.write_all(LOG_REQUEST).await?;

        let deadline = Instant::now() + self.spec.read_timeout;
        let mut data = Vec::new();
        let mut chunk = [0u8; READ_CHUNK];

        loop {
            match timeout_at(deadline, stream.read(&mut chunk)).await {
                Ok(Ok(0)) => break,
                Ok(Ok(n)) => data.extend_from_slice(&chunk[..n]),
                Ok(Err(e)) => return Err(e.into()),
                Err(_) => {
                    warn!(
                        endpoint = %endpoint,
                        bytes = data.len(),
                        "log source read timed out, using what was received"
                    );
                    break;
                }
            }
        }

        Ok(data)
    }
}

impl<R: ContainerRuntime> LogSource for ContainerLogSource<R> {
    fn fetch(&self) -> BoxFuture<'_, Vec<RawLogLine>> {
        Box::pin(async move {
            match self.try_fetch().await {
                Ok(lines) => {
                    info!(lines = lines.len(), "retrieved log lines");
                    lines
                }
                Err(e) => {
                    error!(error = %e, image = %self.spec.image, "failed to retrieve logs from log source");
                    Vec::new()
                }
            }
        })
    }
}

/// Stops the container when released, including when the fetch is cancelled
struct StopGuard<R: ContainerRuntime> {
    runtime: Arc<R>,
    handle: Option<SourceHandle>,
}

impl<R: ContainerRuntime> StopGuard<R> {
    fn new(runtime: Arc<R>, handle: SourceHandle) -> Self {
        Self {
            runtime,
            handle: Some(handle),
        }
    }

    fn handle(&self) -> &SourceHandle {
        // Only taken by `stop` and `drop`, both of which consume the guard
        self.handle.as_ref().unwrap_or_else(|| unreachable!())
    }

    async fn stop(mut self) {
        if let Some(handle) = self.handle.take() {
            stop_logged(self.runtime.as_ref(), &handle).await;
        }
    }
}

impl<R: ContainerRuntime> Drop for StopGuard<R> {
    fn drop(&mut self) {
        let Some(handle) = self.handle.take() else {
            return;
        };
        match tokio::runtime::Handle::try_current() {
            Ok(rt) => {
                let runtime = Arc::clone(&self.runtime);
                rt.spawn(async move {
                    stop_logged(runtime.as_ref(), &handle).await;
                });
            }
            Err(_) => {
                error!(container = %handle.id, "no async runtime to stop abandoned log source");
            }
        }
    }
}

async fn stop_logged<R: ContainerRuntime>(runtime: &R, handle: &SourceHandle) {
    match runtime.stop(handle).await {
        Ok(()) => info!(container = %handle.id, "log source stopped"),
        Err(e) => warn!(container = %handle.id, error = %e, "failed to stop log source"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::net::TcpListener;

    /// Runtime that "starts" a container by pointing at a local port
    struct FakeRuntime {
        port: u16,
        fail_start: bool,
        starts: AtomicUsize,
        stops: AtomicUsize,
    }

    impl FakeRuntime {
        fn new(port: u16) -> Arc<Self> {
            Arc::new(Self {
                port,
                fail_start: false,
                starts: AtomicUsize::new(0),
                stops: AtomicUsize::new(0),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                port: 0,
                fail_start: true,
                starts: AtomicUsize::new(0),
                stops: AtomicUsize::new(0),
            })
        }

        fn stops(&self) -> usize {
            self.stops.load(Ordering::SeqCst)
        }
    }

    impl ContainerRuntime for FakeRuntime {
        fn start<'a>(&'a self, _spec: &'a SourceSpec) -> BoxFuture<'a, Result<SourceHandle>> {
            Box::pin(async move {
                self.starts.fetch_add(1, Ordering::SeqCst);
                if self.fail_start {
                    return Err(SourceError::StartFailed("image not found".to_string()));
                }
                Ok(SourceHandle::new("fake-1", "127.0.0.1", self.port))
            })
        }

        fn stop<'a>(&'a self, _handle: &'a SourceHandle) -> BoxFuture<'a, Result<()>> {
            Box::pin(async move {
                self.stops.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
        }
    }

    fn fast_spec() -> SourceSpec {
        SourceSpec {
            startup_grace: Duration::ZERO,
            connect_timeout: Duration::from_secs(2),
            read_timeout: Duration::from_secs(5),
            ..SourceSpec::default()
        }
    }

    /// Serve one connection: read the request, write `body`, then close
    /// (or hold the connection open when `hold` is set)
    async fn serve_once(body: &'static str, hold: bool) -> (u16, tokio::task::JoinHandle<Vec<u8>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let task = tokio::spawn(async move {
            let (mut sock, _) = listener.accept().await.unwrap();
            let mut request = vec![0u8; LOG_REQUEST.len()];
            sock.read_exact(&mut request).await.unwrap();
            sock.write_all(body.as_bytes()).await.unwrap();
            if hold {
                tokio::time::sleep(Duration::from_secs(30)).await;
            }
            request
        });
        (port, task)
    }

    #[test]
    fn test_split_lines_keeps_trailing_empty() {
        assert_eq!(split_lines(b"a\nb\n"), ["a", "b", ""]);
        assert_eq!(split_lines(b""), [""]);
        assert_eq!(split_lines(b"a\r\nb"), ["a\r", "b"]);
    }

    #[test]
    fn test_split_lines_invalid_utf8_is_lossy() {
        let lines = split_lines(b"ok\n\xff\xfe\n");
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "ok");
        assert!(lines[1].contains('\u{FFFD}'));
    }

    #[tokio::test]
    async fn test_fetch_reads_until_close_and_stops() {
        let (port, server) = serve_once("line one\nline two\n", false).await;
        let runtime = FakeRuntime::new(port);
        let source = ContainerLogSource::new(Arc::clone(&runtime), fast_spec());

        let lines = source.fetch().await;

        assert_eq!(lines, ["line one", "line two", ""]);
        assert_eq!(server.await.unwrap(), LOG_REQUEST);
        assert_eq!(runtime.starts.load(Ordering::SeqCst), 1);
        assert_eq!(runtime.stops(), 1);
    }

    #[tokio::test]
    async fn test_start_failure_yields_no_lines() {
        let runtime = FakeRuntime::failing();
        let source = ContainerLogSource::new(Arc::clone(&runtime), fast_spec());

        assert!(source.fetch().await.is_empty());
        assert_eq!(runtime.stops(), 0);
    }

    #[tokio::test]
    async fn test_connect_failure_yields_no_lines_and_stops() {
        // Grab a free port, then close it so the connect is refused
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            listener.local_addr().unwrap().port()
        };
        let runtime = FakeRuntime::new(port);
        let source = ContainerLogSource::new(Arc::clone(&runtime), fast_spec());

        assert!(source.fetch().await.is_empty());
        assert_eq!(runtime.stops(), 1);
    }

    #[tokio::test]
    async fn test_read_timeout_keeps_partial_stream() {
        let (port, _server) = serve_once("partial\n", true).await;
        let runtime = FakeRuntime::new(port);
        let spec = SourceSpec {
            read_timeout: Duration::from_millis(200),
            ..fast_spec()
        };
        let source = ContainerLogSource::new(Arc::clone(&runtime), spec);

        let lines = source.fetch().await;

        assert_eq!(lines, ["partial", ""]);
        assert_eq!(runtime.stops(), 1);
    }

    #[tokio::test]
    async fn test_reset_after_partial_stream_yields_no_lines_and_stops() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let server = tokio::spawn(async move {
            let (mut sock, _) = listener.accept().await.unwrap();
            let mut request = vec![0u8; LOG_REQUEST.len()];
            sock.read_exact(&mut request).await.unwrap();
            sock.write_all(b"partial line one\npartial li").await.unwrap();
            // Zero linger makes the close an RST instead of a FIN
            #[allow(deprecated)]
            sock.set_linger(Some(Duration::ZERO)).unwrap();
            drop(sock);
        });
        let runtime = FakeRuntime::new(port);
        let source = ContainerLogSource::new(Arc::clone(&runtime), fast_spec());

        let result = source.try_fetch().await;
        server.await.unwrap();

        assert!(matches!(result, Err(SourceError::Io(_))), "got {result:?}");
        assert_eq!(runtime.stops(), 1);
    }

    #[tokio::test]
    async fn test_read_error_fetch_is_empty() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            let (mut sock, _) = listener.accept().await.unwrap();
            let mut request = vec![0u8; LOG_REQUEST.len()];
            sock.read_exact(&mut request).await.unwrap();
            sock.write_all(b"some bytes\n").await.unwrap();
            #[allow(deprecated)]
            sock.set_linger(Some(Duration::ZERO)).unwrap();
        });
        let runtime = FakeRuntime::new(port);
        let source = ContainerLogSource::new(Arc::clone(&runtime), fast_spec());

        assert!(source.fetch().await.is_empty());
        assert_eq!(runtime.starts.load(Ordering::SeqCst), 1);
        assert_eq!(runtime.stops(), 1);
    }

    #[tokio::test]
    async fn test_cancelled_fetch_still_stops() {
        let (port, _server) = serve_once("never finishes\n", true).await;
        let runtime = FakeRuntime::new(port);
        let source = ContainerLogSource::new(Arc::clone(&runtime), fast_spec());

        let cancelled = tokio::time::timeout(Duration::from_millis(100), source.fetch()).await;
        assert!(cancelled.is_err());

        // The guard hands the stop to a spawned task
        for _ in 0..50 {
            if runtime.stops() == 1 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(runtime.stops(), 1);
    }
}
