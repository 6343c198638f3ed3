//! Live queries against an X server with the GLX extension.

use std::sync::OnceLock;

use x11rb::connection::{Connection, RequestConnection};
use x11rb::protocol::glx::{self, ConnectionExt as _};
use x11rb::rust_connection::RustConnection;

use super::fbconfig::{decode_property_list, FbConfigAttr};
use super::glxinfo::{self, GlxinfoReport};
use super::{GlxQuery, GlxString, QueryError};

// glXQueryServerString names
const GLX_VENDOR: u32 = 1;
const GLX_VERSION: u32 = 2;
const GLX_EXTENSIONS: u32 = 3;

pub struct X11Query {
    conn: RustConnection,
    screen: u32,
    display: Option<String>,
    glxinfo_path: String,
    glxinfo: OnceLock<Result<GlxinfoReport, QueryError>>,
}

impl X11Query {
    /// Connect to `display` (or `$DISPLAY`) and check that the server speaks
    /// GLX 1.3 or later, the first version with frame buffer configurations.
    pub fn connect(
        display: Option<&str>,
        screen: Option<u32>,
        glxinfo_path: &str,
    ) -> Result<Self, QueryError> {
        let display_name = display.unwrap_or("$DISPLAY").to_string();

        let (conn, default_screen) =
            x11rb::connect(display).map_err(|e| QueryError::Connect {
                display: display_name.clone(),
                reason: e.to_string(),
            })?;

        let screen = screen.unwrap_or(default_screen as u32);
        if screen as usize >= conn.setup().roots.len() {
            return Err(QueryError::Connect {
                display: display_name,
                reason: format!("no screen {}", screen),
            });
        }

        let present = conn
            .extension_information(glx::X11_EXTENSION_NAME)
            .map_err(|e| QueryError::failed("GLX extension", e))?;
        if present.is_none() {
            return Err(QueryError::NoGlx(display_name));
        }

        let version = conn
            .glx_query_version(1, 4)
            .map_err(|e| QueryError::failed("GLX version", e))?
            .reply()
            .map_err(|e| QueryError::failed("GLX version", e))?;

        tracing::info!(
            "Connected to {} screen {} (GLX {}.{})",
            display_name,
            screen,
            version.major_version,
            version.minor_version
        );

        if (version.major_version, version.minor_version) < (1, 3) {
            return Err(QueryError::NoGlx(format!(
                "{} (server GLX {}.{} has no FBConfigs)",
                display_name, version.major_version, version.minor_version
            )));
        }

        Ok(Self {
            conn,
            screen,
            display: display.map(str::to_string),
            glxinfo_path: glxinfo_path.to_string(),
            glxinfo: OnceLock::new(),
        })
    }

    fn server_string(&self, attr: GlxString, name: u32) -> Result<String, QueryError> {
        let reply = self
            .conn
            .glx_query_server_string(self.screen, name)
            .map_err(|e| QueryError::failed(attr.name(), e))?
            .reply()
            .map_err(|e| QueryError::failed(attr.name(), e))?;

        Ok(String::from_utf8_lossy(&reply.string)
            .trim_end_matches('\0')
            .to_string())
    }

    /// Display name that points glxinfo at the screen this connection reads.
    fn glxinfo_display(&self) -> Option<String> {
        self.display
            .clone()
            .or_else(|| std::env::var("DISPLAY").ok())
            .map(|display| glxinfo::display_for_screen(&display, self.screen))
    }

    /// The glxinfo report, run at most once per connection.
    fn client_report(&self) -> Result<&GlxinfoReport, QueryError> {
        self.glxinfo
            .get_or_init(|| glxinfo::run(&self.glxinfo_path, self.glxinfo_display().as_deref()))
            .as_ref()
            .map_err(Clone::clone)
    }
}

impl GlxQuery for X11Query {
    fn string_attribute(&self, attr: GlxString) -> Result<String, QueryError> {
        match attr {
            GlxString::ServerVendor => self.server_string(attr, GLX_VENDOR),
            GlxString::ServerVersion => self.server_string(attr, GLX_VERSION),
            GlxString::ServerExtensions => self.server_string(attr, GLX_EXTENSIONS),
            _ => self.client_report()?.string_attribute(attr),
        }
    }

    fn fbconfig_attribs(&self) -> Result<Option<Vec<FbConfigAttr>>, QueryError> {
        let reply = self
            .conn
            .glx_get_fb_configs(self.screen)
            .map_err(|e| QueryError::failed("FBConfigs", e))?
            .reply()
            .map_err(|e| QueryError::failed("FBConfigs", e))?;

        tracing::debug!(
            "GetFBConfigs: {} configs, {} properties each",
            reply.num_fb_configs,
            reply.num_properties
        );

        if reply.num_fb_configs == 0 {
            return Ok(None);
        }

        Ok(Some(decode_property_list(
            &reply.property_list,
            reply.num_fb_configs as usize,
            reply.num_properties as usize,
        )))
    }
}
