use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use std::time::{Duration, Instant};

use crate::config::AppConfig;
use crate::glx::table::NUM_FBCONFIG_ATTRIBS;
use crate::glx::{run_blocking, SharedQuery, Source};
use crate::page::{GlxInfo, GlxPage, ERR_SERVER_VENDOR};

/// How long a status message stays on the info line
const STATUS_TIMEOUT: Duration = Duration::from_secs(3);

/// Rows moved by PageUp/PageDown in the FBConfig window
const PAGE_ROWS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Info,
    ShowFbConfigs, // "Show GLX Frame Buffer Configurations" toggle
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Popup {
    None,
    FbConfigs,
    Help,
}

pub struct App {
    pub config: AppConfig,
    pub source: Source,
    query: Option<SharedQuery>,

    pub page: GlxPage,
    pub section: Section,
    pub popup: Popup,

    // Toggle button state; the FBConfig window is open while this is set
    pub show_fbc: bool,

    // Scroll offsets
    pub info_scroll: u16,
    pub help_scroll: u16,

    // Selected cell in the FBConfig window
    pub fbc_row: usize,
    pub fbc_col: usize,

    // Status message (shown in info line, auto-clears after timeout)
    pub status_message: Option<String>,
    pub status_message_time: Option<Instant>,
}

impl App {
    pub async fn new(config: AppConfig, source: Source) -> Result<Self> {
        let mut app = Self::with_page(config, source, None, GlxPage::failed(ERR_SERVER_VENDOR));
        app.load_page().await;

        if app.config.show_fbconfigs_on_start && app.page.fbconfigs().is_some() {
            app.set_show_fbc(true);
        }

        Ok(app)
    }

    pub fn with_page(
        config: AppConfig,
        source: Source,
        query: Option<SharedQuery>,
        page: GlxPage,
    ) -> Self {
        Self {
            config,
            source,
            query,
            page,
            section: Section::Info,
            popup: Popup::None,
            show_fbc: false,
            info_scroll: 0,
            help_scroll: 0,
            fbc_row: 0,
            fbc_col: 0,
            status_message: None,
            status_message_time: None,
        }
    }

    /// Set a status message (auto-clears after 3 seconds)
    fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = Some(msg.into());
        self.status_message_time = Some(Instant::now());
    }

    /// Open the source and build the page from scratch.
    async fn load_page(&mut self) {
        let source = self.source.clone();
        let result = run_blocking(self.config.query_timeout(), move || {
            let query = source.open()?;
            let page = GlxPage::build(&*query);
            Ok((query, page))
        })
        .await;

        match result {
            Ok((query, page)) => {
                self.query = Some(query);
                self.page = page;
            }
            Err(e) => {
                tracing::warn!("Could not open {}: {}", self.source.describe(), e);
                self.query = None;
                self.page = GlxPage::failed(ERR_SERVER_VENDOR);
                self.set_status(format!("Error: {}", e));
            }
        }

        self.show_fbc = false;
        if self.popup == Popup::FbConfigs {
            self.popup = Popup::None;
        }
        self.info_scroll = 0;
        self.fbc_row = 0;
        self.fbc_col = 0;
    }

    /// Query the GLX/OpenGL strings once the page has been shown.
    async fn probe_info(&mut self) {
        let Some(query) = self.query.clone() else {
            self.page.set_info(Err::<GlxInfo, _>("no connection to the GLX source"));
            return;
        };

        let result = run_blocking(self.config.query_timeout(), move || GlxInfo::probe(&*query)).await;
        self.page.set_info(result);
    }

    pub async fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        match self.popup {
            Popup::None => self.handle_normal_key(key).await,
            Popup::FbConfigs => {
                self.handle_fbconfigs_key(key);
                Ok(())
            }
            Popup::Help => {
                self.handle_help_key(key);
                Ok(())
            }
        }
    }

    async fn handle_normal_key(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Tab | KeyCode::BackTab => {
                // Only the info pane exists on a failed page
                if self.page.fbconfigs().is_some() {
                    self.section = match self.section {
                        Section::Info => Section::ShowFbConfigs,
                        Section::ShowFbConfigs => Section::Info,
                    };
                }
            }

            KeyCode::Char('j') | KeyCode::Down => {
                if self.section == Section::Info {
                    let max = self.info_line_count().saturating_sub(1) as u16;
                    self.info_scroll = (self.info_scroll + 1).min(max);
                }
            }
            KeyCode::Char('k') | KeyCode::Up => {
                if self.section == Section::Info {
                    self.info_scroll = self.info_scroll.saturating_sub(1);
                }
            }

            KeyCode::Char(' ') | KeyCode::Enter => {
                if self.section == Section::ShowFbConfigs {
                    self.toggle_show_fbc();
                }
            }
            KeyCode::Char('f') => self.toggle_show_fbc(),

            KeyCode::Char('R') => {
                self.load_page().await;
                if self.page.error().is_none() {
                    self.set_status("Reloaded GLX information");
                }
            }

            KeyCode::Char('?') | KeyCode::Char('h') => {
                self.help_scroll = 0;
                self.popup = Popup::Help;
            }

            _ => {}
        }
        Ok(())
    }

    fn handle_fbconfigs_key(&mut self, key: KeyEvent) {
        let rows = self.page.fbconfigs().map(|t| t.len()).unwrap_or(0);
        let last_row = rows.saturating_sub(1);
        let last_col = NUM_FBCONFIG_ATTRIBS - 1;

        match key.code {
            // Closing the window releases the toggle button
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('f') => self.set_show_fbc(false),

            KeyCode::Char('j') | KeyCode::Down => self.fbc_row = (self.fbc_row + 1).min(last_row),
            KeyCode::Char('k') | KeyCode::Up => self.fbc_row = self.fbc_row.saturating_sub(1),
            KeyCode::PageDown => self.fbc_row = (self.fbc_row + PAGE_ROWS).min(last_row),
            KeyCode::PageUp => self.fbc_row = self.fbc_row.saturating_sub(PAGE_ROWS),
            KeyCode::Char('g') => self.fbc_row = 0,
            KeyCode::Char('G') => self.fbc_row = last_row,

            KeyCode::Char('l') | KeyCode::Right => self.fbc_col = (self.fbc_col + 1).min(last_col),
            KeyCode::Char('h') | KeyCode::Left => self.fbc_col = self.fbc_col.saturating_sub(1),
            KeyCode::Home => self.fbc_col = 0,
            KeyCode::End => self.fbc_col = last_col,

            _ => {}
        }
    }

    fn handle_help_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc
            | KeyCode::Enter
            | KeyCode::Char('?')
            | KeyCode::Char('h')
            | KeyCode::Char('q') => self.popup = Popup::None,
            KeyCode::Char('j') | KeyCode::Down => self.help_scroll = self.help_scroll.saturating_add(1),
            KeyCode::Char('k') | KeyCode::Up => self.help_scroll = self.help_scroll.saturating_sub(1),
            _ => {}
        }
    }

    fn toggle_show_fbc(&mut self) {
        self.set_show_fbc(!self.show_fbc);
    }

    /// Open or close the FBConfig window, keeping the toggle in step.
    fn set_show_fbc(&mut self, enabled: bool) {
        if self.page.fbconfigs().is_none() {
            return;
        }

        self.show_fbc = enabled;
        self.popup = if enabled { Popup::FbConfigs } else { Popup::None };
        self.set_status(format!(
            "Show GLX Frame Buffer Configurations button {}.",
            if enabled { "enabled" } else { "disabled" }
        ));
    }

    /// Lines in the information pane: one title per section plus each value
    /// line (extension lists span several).
    pub fn info_line_count(&self) -> usize {
        self.page
            .info
            .as_ref()
            .map(|info| {
                info.sections()
                    .iter()
                    .map(|s| 1 + s.rows.iter().map(|(_, v)| v.lines().count().max(1)).sum::<usize>())
                    .sum()
            })
            .unwrap_or(0)
    }

    pub async fn tick(&mut self) -> Result<()> {
        if let Some(at) = self.status_message_time {
            if at.elapsed() >= STATUS_TIMEOUT {
                self.status_message = None;
                self.status_message_time = None;
            }
        }

        // The page has been drawn at least once by now
        if self.page.needs_probe() {
            self.probe_info().await;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::glx::snapshot::Snapshot;
    use crate::glx::GlxQuery;
    use crossterm::event::KeyModifiers;
    use std::sync::Arc;

    const SNAPSHOT: &str = r#"{
        "strings": {
            "direct_rendering": "Yes",
            "glx_extensions": "GLX_ARB_multisample GLX_EXT_visual_info",
            "server_vendor": "NVIDIA Corporation",
            "server_version": "1.4",
            "server_extensions": "GLX_ARB_multisample",
            "client_vendor": "NVIDIA Corporation",
            "client_version": "1.4",
            "client_extensions": "GLX_ARB_get_proc_address",
            "opengl_vendor": "NVIDIA Corporation",
            "opengl_renderer": "NVIDIA GeForce RTX 3070/PCIe/SSE2",
            "opengl_version": "4.6.0 NVIDIA 550.54.14",
            "opengl_extensions": "GL_ARB_ES2_compatibility GL_ARB_ES3_compatibility"
        },
        "fbconfigs": [
            { "fbconfig_id": 1, "visual_id": 33, "doublebuffer": true },
            { "fbconfig_id": 2, "visual_id": 34 },
            { "fbconfig_id": 3 },
            { "fbconfig_id": 0 }
        ]
    }"#;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn app_from(json: &str) -> App {
        let snapshot = Snapshot::from_json(json).unwrap();
        let page = GlxPage::build(&snapshot);
        let query: SharedQuery = Arc::new(snapshot);
        App::with_page(
            AppConfig::default(),
            Source::Snapshot("unused.json".into()),
            Some(query),
            page,
        )
    }

    #[tokio::test]
    async fn test_toggle_opens_and_closes_window() {
        let mut app = app_from(SNAPSHOT);

        app.handle_key(key(KeyCode::Tab)).await.unwrap();
        assert_eq!(app.section, Section::ShowFbConfigs);

        app.handle_key(key(KeyCode::Char(' '))).await.unwrap();
        assert!(app.show_fbc);
        assert_eq!(app.popup, Popup::FbConfigs);
        assert_eq!(
            app.status_message.as_deref(),
            Some("Show GLX Frame Buffer Configurations button enabled.")
        );

        // Closing the window resets the toggle
        app.handle_key(key(KeyCode::Esc)).await.unwrap();
        assert!(!app.show_fbc);
        assert_eq!(app.popup, Popup::None);
        assert_eq!(
            app.status_message.as_deref(),
            Some("Show GLX Frame Buffer Configurations button disabled.")
        );
    }

    #[tokio::test]
    async fn test_fbconfig_navigation_is_clamped() {
        let mut app = app_from(SNAPSHOT);
        app.handle_key(key(KeyCode::Char('f'))).await.unwrap();

        for _ in 0..5 {
            app.handle_key(key(KeyCode::Down)).await.unwrap();
        }
        assert_eq!(app.fbc_row, 2);

        app.handle_key(key(KeyCode::End)).await.unwrap();
        app.handle_key(key(KeyCode::Right)).await.unwrap();
        assert_eq!(app.fbc_col, NUM_FBCONFIG_ATTRIBS - 1);

        app.handle_key(key(KeyCode::Home)).await.unwrap();
        app.handle_key(key(KeyCode::Left)).await.unwrap();
        assert_eq!(app.fbc_col, 0);
    }

    #[tokio::test]
    async fn test_failed_page_has_no_toggle() {
        let mut app = app_from(r#"{ "strings": {}, "fbconfigs": [] }"#);
        assert!(app.page.error().is_some());

        app.handle_key(key(KeyCode::Char('f'))).await.unwrap();
        assert!(!app.show_fbc);
        assert_eq!(app.popup, Popup::None);

        app.handle_key(key(KeyCode::Tab)).await.unwrap();
        assert_eq!(app.section, Section::Info);
    }

    #[tokio::test]
    async fn test_tick_probes_info_once() {
        let mut app = app_from(SNAPSHOT);
        assert!(app.page.info.is_none());

        app.tick().await.unwrap();
        let info = app.page.info.as_ref().unwrap();
        assert_eq!(info.opengl_renderer, "NVIDIA GeForce RTX 3070/PCIe/SSE2");
        assert_eq!(info.opengl_extensions, "GL_ARB_ES2_compatibility\nGL_ARB_ES3_compatibility");
        assert!(!app.page.needs_probe());

        // 4 titles + 12 values, two extension lists span two lines
        assert_eq!(app.info_line_count(), 4 + 12 + 2);
    }

    #[tokio::test]
    async fn test_reload_failure_shows_static_message() {
        let mut app = app_from(SNAPSHOT);
        app.handle_key(key(KeyCode::Char('R'))).await.unwrap();

        assert_eq!(app.page.error(), Some(ERR_SERVER_VENDOR));
        assert!(app.status_message.as_deref().unwrap_or("").starts_with("Error:"));
    }

    #[test]
    fn test_snapshot_is_a_query() {
        let snapshot = Snapshot::from_json(SNAPSHOT).unwrap();
        let query: &dyn GlxQuery = &snapshot;
        assert_eq!(query.fbconfig_attribs().unwrap().unwrap().len(), 4);
    }
}
