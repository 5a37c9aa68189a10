use std::time::Duration;

/// Default log source image
pub const DEFAULT_IMAGE: &str = "gcr.io/hiring-278615/loggerator";

/// Port the log source listens on inside its container
pub const DEFAULT_CONTAINER_PORT: u16 = 8080;

/// How to start and reach a log source
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceSpec {
    /// Image reference to run
    pub image: String,

    /// Port exposed by the container
    pub container_port: u16,

    /// Fixed host port to publish the container port on. When unset the
    /// runtime picks a free port, so concurrent sources do not collide.
    pub host_port: Option<u16>,

    /// Host name used to reach the published port
    pub endpoint_host: String,

    /// Pause between start and connect, giving the process time to listen
    pub startup_grace: Duration,

    /// Upper bound on establishing the connection
    pub connect_timeout: Duration,

    /// Upper bound on draining the stream; bytes read so far are kept when it elapses
    pub read_timeout: Duration,

    /// Ask the runtime to remove the container once stopped
    pub remove_on_stop: bool,
}

impl Default for SourceSpec {
    fn default() -> Self {
        Self {
            image: DEFAULT_IMAGE.to_string(),
            container_port: DEFAULT_CONTAINER_PORT,
            host_port: None,
            endpoint_host: "localhost".to_string(),
            startup_grace: Duration::from_millis(500),
            connect_timeout: Duration::from_secs(5),
            read_timeout: Duration::from_secs(30),
            remove_on_stop: true,
        }
    }
}

impl SourceSpec {
    /// Create a spec for the given image with default ports and timeouts
    pub fn new(image: impl Into<String>) -> Self {
        Self {
            image: image.into(),
            ..Self::default()
        }
    }

    /// Container port and protocol, e.g. `8080/tcp`
    pub fn container_port_spec(&self) -> String {
        format!("{}/tcp", self.container_port)
    }

    /// Publish mapping passed to the runtime: `host:container/tcp`, or just
    /// `container/tcp` to let the runtime pick the host port
    pub fn port_mapping(&self) -> String {
        match self.host_port {
            Some(host) => format!("{host}:{}", self.container_port_spec()),
            None => self.container_port_spec(),
        }
    }
}
