//! The GLX page: availability check, FBConfig table, and the lazily probed
//! GLX/OpenGL information strings.

use serde::Serialize;

use crate::glx::table::{build_fbconfig_table, FbConfigTable};
use crate::glx::{GlxQuery, GlxString, QueryError};

pub const ERR_SERVER_VENDOR: &str = "Failed to query the GLX server vendor.";
pub const ERR_FBCONFIGS: &str = "Failed to query list of GLX frame buffer configurations.";
pub const ERR_NO_FBCONFIGS: &str = "No frame buffer configurations found.";

/// GLX and OpenGL strings. Extension lists hold one name per line.
#[derive(Debug, Clone, Default, Serialize)]
pub struct GlxInfo {
    pub direct_rendering: String,
    pub glx_extensions: String,
    pub server_vendor: String,
    pub server_version: String,
    pub server_extensions: String,
    pub client_vendor: String,
    pub client_version: String,
    pub client_extensions: String,
    pub opengl_vendor: String,
    pub opengl_renderer: String,
    pub opengl_version: String,
    pub opengl_extensions: String,
}

/// A titled group of label/value rows.
pub struct InfoSection<'a> {
    pub title: &'static str,
    pub rows: Vec<(&'static str, &'a str)>,
}

impl GlxInfo {
    /// Query every string in page order, stopping at the first failure.
    pub fn probe(query: &dyn GlxQuery) -> Result<Self, QueryError> {
        let mut info = GlxInfo::default();

        for attr in GlxString::ALL {
            let mut value = query.string_attribute(attr)?;
            if attr.is_extension_list() {
                value = one_per_line(&value);
            }
            *info.field_mut(attr) = value;
        }

        Ok(info)
    }

    fn field_mut(&mut self, attr: GlxString) -> &mut String {
        match attr {
            GlxString::DirectRendering => &mut self.direct_rendering,
            GlxString::GlxExtensions => &mut self.glx_extensions,
            GlxString::ServerVendor => &mut self.server_vendor,
            GlxString::ServerVersion => &mut self.server_version,
            GlxString::ServerExtensions => &mut self.server_extensions,
            GlxString::ClientVendor => &mut self.client_vendor,
            GlxString::ClientVersion => &mut self.client_version,
            GlxString::ClientExtensions => &mut self.client_extensions,
            GlxString::OpenglVendor => &mut self.opengl_vendor,
            GlxString::OpenglRenderer => &mut self.opengl_renderer,
            GlxString::OpenglVersion => &mut self.opengl_version,
            GlxString::OpenglExtensions => &mut self.opengl_extensions,
        }
    }

    pub fn sections(&self) -> Vec<InfoSection<'_>> {
        vec![
            InfoSection {
                title: "GLX Information",
                rows: vec![
                    ("Direct Rendering:", self.direct_rendering.as_str()),
                    ("GLX Extensions:", self.glx_extensions.as_str()),
                ],
            },
            InfoSection {
                title: "Server GLX Information",
                rows: vec![
                    ("Vendor:", self.server_vendor.as_str()),
                    ("Version:", self.server_version.as_str()),
                    ("Extensions:", self.server_extensions.as_str()),
                ],
            },
            InfoSection {
                title: "Client GLX Information",
                rows: vec![
                    ("Vendor:", self.client_vendor.as_str()),
                    ("Version:", self.client_version.as_str()),
                    ("Extensions:", self.client_extensions.as_str()),
                ],
            },
            InfoSection {
                title: "OpenGL Information",
                rows: vec![
                    ("Vendor:", self.opengl_vendor.as_str()),
                    ("Renderer:", self.opengl_renderer.as_str()),
                    ("Version:", self.opengl_version.as_str()),
                    ("Extensions:", self.opengl_extensions.as_str()),
                ],
            },
        ]
    }
}

/// Space separated extension names, one per line.
pub fn one_per_line(list: &str) -> String {
    list.replace(' ', "\n")
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PageState {
    /// Static message shown instead of the page
    Failed { message: &'static str },
    Ready { fbconfigs: FbConfigTable },
}

#[derive(Debug, Clone, Serialize)]
pub struct GlxPage {
    #[serde(flatten)]
    pub state: PageState,
    pub info: Option<GlxInfo>,
    #[serde(skip)]
    probed: bool,
}

impl GlxPage {
    pub fn failed(message: &'static str) -> Self {
        Self {
            state: PageState::Failed { message },
            info: None,
            probed: false,
        }
    }

    /// Build the page. Any failure replaces the whole page with a static
    /// message; there is no partial table.
    pub fn build(query: &dyn GlxQuery) -> Self {
        if let Err(e) = query.string_attribute(GlxString::ServerVendor) {
            tracing::warn!("GLX availability check failed: {}", e);
            return Self::failed(ERR_SERVER_VENDOR);
        }

        let attribs = match query.fbconfig_attribs() {
            Ok(attribs) => attribs,
            Err(e) => {
                tracing::warn!("{}", e);
                return Self::failed(ERR_FBCONFIGS);
            }
        };

        let fbconfigs = match build_fbconfig_table(attribs.as_deref()) {
            Some(table) if !table.is_empty() => table,
            _ => return Self::failed(ERR_NO_FBCONFIGS),
        };
        tracing::info!("GLX page built with {} frame buffer configurations", fbconfigs.len());

        Self {
            state: PageState::Ready { fbconfigs },
            info: None,
            probed: false,
        }
    }

    pub fn error(&self) -> Option<&'static str> {
        match self.state {
            PageState::Failed { message } => Some(message),
            PageState::Ready { .. } => None,
        }
    }

    pub fn fbconfigs(&self) -> Option<&FbConfigTable> {
        match &self.state {
            PageState::Ready { fbconfigs } => Some(fbconfigs),
            PageState::Failed { .. } => None,
        }
    }

    /// Whether the information strings still need to be probed.
    pub fn needs_probe(&self) -> bool {
        !self.probed && self.error().is_none()
    }

    /// Fill in the information strings. Runs once; a failed query leaves the
    /// information pane empty.
    pub fn probe_info(&mut self, query: &dyn GlxQuery) {
        if !self.needs_probe() {
            return;
        }
        self.set_info(GlxInfo::probe(query));
    }

    /// Record the outcome of a probe done elsewhere (e.g. on a worker thread).
    pub fn set_info<E: std::fmt::Display>(&mut self, result: Result<GlxInfo, E>) {
        self.probed = true;
        match result {
            Ok(info) => self.info = Some(info),
            Err(e) => tracing::warn!("GLX information unavailable: {}", e),
        }
    }
}
