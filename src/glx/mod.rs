pub mod fbconfig;
pub mod glxinfo;
pub mod snapshot;
pub mod table;
pub mod x11;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

use fbconfig::FbConfigAttr;

/// Default limit for a single round of driver queries
pub const QUERY_TIMEOUT: Duration = Duration::from_secs(5);

/// How long exit waits for abandoned blocking queries
const SHUTDOWN_GRACE: Duration = Duration::from_millis(100);

/// String attributes the GLX page shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GlxString {
    DirectRendering,
    GlxExtensions,
    ServerVendor,
    ServerVersion,
    ServerExtensions,
    ClientVendor,
    ClientVersion,
    ClientExtensions,
    OpenglVendor,
    OpenglRenderer,
    OpenglVersion,
    OpenglExtensions,
}

impl GlxString {
    /// Query order used when probing the page.
    pub const ALL: [GlxString; 12] = [
        GlxString::DirectRendering,
        GlxString::GlxExtensions,
        GlxString::ServerVendor,
        GlxString::ServerVersion,
        GlxString::ServerExtensions,
        GlxString::ClientVendor,
        GlxString::ClientVersion,
        GlxString::ClientExtensions,
        GlxString::OpenglVendor,
        GlxString::OpenglRenderer,
        GlxString::OpenglVersion,
        GlxString::OpenglExtensions,
    ];

    pub fn name(self) -> &'static str {
        match self {
            GlxString::DirectRendering => "direct rendering",
            GlxString::GlxExtensions => "GLX extensions",
            GlxString::ServerVendor => "server GLX vendor",
            GlxString::ServerVersion => "server GLX version",
            GlxString::ServerExtensions => "server GLX extensions",
            GlxString::ClientVendor => "client GLX vendor",
            GlxString::ClientVersion => "client GLX version",
            GlxString::ClientExtensions => "client GLX extensions",
            GlxString::OpenglVendor => "OpenGL vendor",
            GlxString::OpenglRenderer => "OpenGL renderer",
            GlxString::OpenglVersion => "OpenGL version",
            GlxString::OpenglExtensions => "OpenGL extensions",
        }
    }

    pub fn is_extension_list(self) -> bool {
        matches!(
            self,
            GlxString::GlxExtensions
                | GlxString::ServerExtensions
                | GlxString::ClientExtensions
                | GlxString::OpenglExtensions
        )
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum QueryError {
    #[error("cannot open display {display}: {reason}")]
    Connect { display: String, reason: String },

    #[error("GLX is not available on {0}")]
    NoGlx(String),

    #[error("query for {what} failed: {reason}")]
    Failed { what: &'static str, reason: String },

    #[error("snapshot {path}: {reason}")]
    Snapshot { path: String, reason: String },

    #[error("GLX query timed out after {0:?}")]
    TimedOut(Duration),
}

impl QueryError {
    pub fn failed(what: &'static str, reason: impl ToString) -> Self {
        QueryError::Failed { what, reason: reason.to_string() }
    }
}

/// Driver query interface: capability strings plus the FBConfig records.
pub trait GlxQuery {
    fn string_attribute(&self, attr: GlxString) -> Result<String, QueryError>;

    /// FBConfig records in server order. `Ok(None)` means the server answered
    /// but has no list to give.
    fn fbconfig_attribs(&self) -> Result<Option<Vec<FbConfigAttr>>, QueryError>;
}

pub type SharedQuery = Arc<dyn GlxQuery + Send + Sync>;

/// Where the page gets its data from.
#[derive(Debug, Clone)]
pub enum Source {
    Live {
        display: Option<String>,
        screen: Option<u32>,
        glxinfo: String,
    },
    Snapshot(PathBuf),
}

impl Source {
    pub fn open(&self) -> Result<SharedQuery, QueryError> {
        match self {
            Source::Live { display, screen, glxinfo } => {
                let query = x11::X11Query::connect(display.as_deref(), *screen, glxinfo)?;
                Ok(Arc::new(query))
            }
            Source::Snapshot(path) => Ok(Arc::new(snapshot::Snapshot::load(path)?)),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Source::Live { display, .. } => display
                .clone()
                .or_else(|| std::env::var("DISPLAY").ok())
                .unwrap_or_else(|| "default display".to_string()),
            Source::Snapshot(path) => path.display().to_string(),
        }
    }
}

/// Run a blocking driver query off the async runtime, bounded by `limit`.
pub async fn run_blocking<T, F>(limit: Duration, f: F) -> Result<T>
where
    F: FnOnce() -> Result<T, QueryError> + Send + 'static,
    T: Send + 'static,
{
    let result = timeout(limit, tokio::task::spawn_blocking(f)).await;

    match result {
        Ok(Ok(Ok(value))) => Ok(value),
        Ok(Ok(Err(e))) => Err(e.into()),
        Ok(Err(e)) => anyhow::bail!("Query task failed: {}", e),
        Err(_) => Err(QueryError::TimedOut(limit).into()),
    }
}

/// Stop `rt` without waiting on blocking queries that already timed out.
/// A wedged X server keeps its worker thread; the process exits anyway.
pub fn shutdown_runtime(rt: tokio::runtime::Runtime) {
    rt.shutdown_timeout(SHUTDOWN_GRACE);
}
