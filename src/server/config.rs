//! Server configuration

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use crate::error::ConfigError;
use crate::sync::SyncConfig;

/// Default HTTP/WebSocket port
pub const DEFAULT_PORT: u16 = 3000;

/// Smallest outbound queue; must hold the two connect messages
pub const MIN_OUTBOUND_CAPACITY: usize = 4;

/// Origins accepted outside production
const DEV_ORIGINS: &[&str] = &[
    "http://localhost:3000",
    "http://localhost:3001",
    "http://localhost:3002",
    "http://localhost:3003",
    "https://codesandbox.io",
];

/// Which browser origins may open a WebSocket
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OriginPolicy {
    /// Any origin
    Any,
    /// Only the listed origins
    List(Vec<String>),
}

impl OriginPolicy {
    /// Development allow-list plus any extra origins
    pub fn development<I, S>(extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut origins: Vec<String> = DEV_ORIGINS.iter().map(|o| o.to_string()).collect();
        origins.extend(extra.into_iter().map(Into::into).filter(|o| !o.is_empty()));
        OriginPolicy::List(origins)
    }

    /// Check an `Origin` header value
    ///
    /// Requests without an origin come from non-browser clients and are allowed.
    pub fn allows(&self, origin: Option<&str>) -> bool {
        let origin = match origin {
            Some(origin) => origin.trim_end_matches('/'),
            None => return true,
        };

        match self {
            OriginPolicy::Any => true,
            OriginPolicy::List(allowed) => allowed
                .iter()
                .any(|a| a.trim_end_matches('/').eq_ignore_ascii_case(origin)),
        }
    }
}

/// Server configuration options
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to
    pub bind_addr: SocketAddr,

    /// Path that accepts WebSocket upgrades
    pub ws_path: String,

    /// Deployment environment name, reported by the health check
    pub environment: String,

    /// Public URL, informational only
    pub public_url: Option<String>,

    /// Allowed WebSocket origins
    pub origins: OriginPolicy,

    /// Maximum concurrent viewers (0 = unlimited)
    pub max_connections: usize,

    /// Per-viewer outbound queue length, in frames
    pub outbound_capacity: usize,

    /// Enable TCP_NODELAY (disable Nagle's algorithm)
    pub tcp_nodelay: bool,

    /// Store and protocol settings
    pub sync: SyncConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), DEFAULT_PORT),
            ws_path: "/ws".to_string(),
            environment: "development".to_string(),
            public_url: None,
            origins: OriginPolicy::development(Vec::<String>::new()),
            max_connections: 0, // Unlimited
            outbound_capacity: 64,
            tcp_nodelay: true,
            sync: SyncConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Create a new config with custom bind address
    pub fn with_addr(addr: SocketAddr) -> Self {
        Self {
            bind_addr: addr,
            ..Default::default()
        }
    }

    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration from an arbitrary variable source
    ///
    /// Recognized variables: `PORT`, `BIND_HOST`, `NODE_ENV`, `PUBLIC_URL`,
    /// `NEXT_PUBLIC_SOCKET_URL`, `WS_PATH`, `MAX_CONNECTIONS`,
    /// `MAX_EMPLOYEES`, `EMPLOYEES_PER_PAGE`, `INITIAL_EMPLOYEES`,
    /// `UPDATE_INTERVAL_MS`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let port: u16 = parse_var("PORT", var("PORT"))?.unwrap_or(DEFAULT_PORT);
        let host = var("BIND_HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let ip: IpAddr = host
            .parse()
            .map_err(|_| ConfigError::BindAddr(format!("{}:{}", host, port)))?;

        let environment = var("NODE_ENV").unwrap_or_else(|| "development".to_string());
        let public_url = var("PUBLIC_URL");
        let socket_url = var("NEXT_PUBLIC_SOCKET_URL");

        let origins = if environment == "production" {
            OriginPolicy::Any
        } else {
            OriginPolicy::development(public_url.iter().chain(socket_url.iter()).cloned())
        };

        let mut sync = SyncConfig::default();
        if let Some(max) = parse_var("MAX_EMPLOYEES", var("MAX_EMPLOYEES"))? {
            sync = sync.max_records(max);
        }
        if let Some(size) = parse_var("EMPLOYEES_PER_PAGE", var("EMPLOYEES_PER_PAGE"))? {
            sync = sync.page_size(size);
        }
        if let Some(count) = parse_var("INITIAL_EMPLOYEES", var("INITIAL_EMPLOYEES"))? {
            sync = sync.initial_records(count);
        }
        if let Some(ms) = parse_var::<u64>("UPDATE_INTERVAL_MS", var("UPDATE_INTERVAL_MS"))? {
            sync = sync.insert_interval(Duration::from_millis(ms.max(1)));
        }

        let mut config = Self {
            bind_addr: SocketAddr::new(ip, port),
            environment,
            public_url,
            origins,
            sync,
            ..Default::default()
        };
        if let Some(path) = var("WS_PATH") {
            config = config.ws_path(path);
        }
        if let Some(max) = parse_var("MAX_CONNECTIONS", var("MAX_CONNECTIONS"))? {
            config = config.max_connections(max);
        }

        Ok(config)
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Set the bind address
    pub fn bind(mut self, addr: SocketAddr) -> Self {
        self.bind_addr = addr;
        self
    }

    /// Set the WebSocket path (a leading `/` is added if missing)
    pub fn ws_path(mut self, path: impl Into<String>) -> Self {
        let path = path.into();
        self.ws_path = if path.starts_with('/') {
            path
        } else {
            format!("/{}", path)
        };
        self
    }

    /// Set the environment name
    pub fn environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = environment.into();
        self
    }

    /// Set the origin policy
    pub fn origins(mut self, origins: OriginPolicy) -> Self {
        self.origins = origins;
        self
    }

    /// Set maximum concurrent viewers
    pub fn max_connections(mut self, max: usize) -> Self {
        self.max_connections = max;
        self
    }

    /// Set per-viewer outbound queue length
    pub fn outbound_capacity(mut self, capacity: usize) -> Self {
        self.outbound_capacity = capacity.max(MIN_OUTBOUND_CAPACITY);
        self
    }

    /// Set store and protocol settings
    pub fn sync(mut self, sync: SyncConfig) -> Self {
        self.sync = sync;
        self
    }
}

fn parse_var<T: std::str::FromStr>(
    name: &'static str,
    value: Option<String>,
) -> Result<Option<T>, ConfigError> {
    match value {
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidVar { name, value }),
        None => Ok(None),
    }
}
