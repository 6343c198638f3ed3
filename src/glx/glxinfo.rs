//! Client-side GLX and OpenGL strings, read from `glxinfo` output.
//!
//! The X protocol only answers for the server half of GLX. Everything that
//! needs a client library or a current context comes from `glxinfo` run
//! against the same display.

use std::collections::HashMap;
use std::process::Command;

use super::{GlxString, QueryError};

#[derive(Debug, Clone, Default)]
pub struct GlxinfoReport {
    fields: HashMap<String, String>,
}

impl GlxinfoReport {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    /// Look up one of the client-side strings. Server strings are not taken
    /// from here.
    pub fn string_attribute(&self, attr: GlxString) -> Result<String, QueryError> {
        let keys: &[&str] = match attr {
            GlxString::DirectRendering => &["direct rendering"],
            GlxString::GlxExtensions => &["GLX extensions"],
            GlxString::ServerVendor => &["server glx vendor string"],
            GlxString::ServerVersion => &["server glx version string"],
            GlxString::ServerExtensions => &["server glx extensions"],
            GlxString::ClientVendor => &["client glx vendor string"],
            GlxString::ClientVersion => &["client glx version string"],
            GlxString::ClientExtensions => &["client glx extensions"],
            GlxString::OpenglVendor => &["OpenGL vendor string"],
            GlxString::OpenglRenderer => &["OpenGL renderer string"],
            GlxString::OpenglVersion => {
                &["OpenGL version string", "OpenGL core profile version string"]
            }
            GlxString::OpenglExtensions => {
                &["OpenGL extensions", "OpenGL core profile extensions"]
            }
        };

        keys.iter()
            .find_map(|k| self.get(k))
            .map(str::to_string)
            .ok_or_else(|| QueryError::failed(attr.name(), "not reported by glxinfo"))
    }
}

/// Parse `glxinfo` output.
///
/// `key: value` lines become fields. A `key:` line with no value starts a
/// list; the indented lines that follow are comma separated names, which are
/// stored space separated.
pub fn parse(output: &str) -> GlxinfoReport {
    let mut fields = HashMap::new();
    let mut list: Option<(String, Vec<String>)> = None;

    for line in output.lines() {
        let indented = line.starts_with(' ') || line.starts_with('\t');

        if indented {
            if let Some((_, names)) = list.as_mut() {
                names.extend(
                    line.split(',')
                        .map(str::trim)
                        .filter(|n| !n.is_empty())
                        .map(str::to_string),
                );
            }
            continue;
        }

        if let Some((key, names)) = list.take() {
            fields.insert(key, names.join(" "));
        }

        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key = key.trim();
        let value = value.trim();

        if key.is_empty() {
            continue;
        }

        if value.is_empty() {
            list = Some((key.to_string(), Vec::new()));
        } else {
            // First occurrence wins (glxinfo repeats some keys per profile)
            fields.entry(key.to_string()).or_insert_with(|| value.to_string());
        }
    }

    if let Some((key, names)) = list.take() {
        fields.insert(key, names.join(" "));
    }

    GlxinfoReport { fields }
}

/// `host:dpy` with its screen part replaced by `screen`, so glxinfo reads
/// the same screen as the X queries.
pub fn display_for_screen(display: &str, screen: u32) -> String {
    let (host, number) = display.rsplit_once(':').unwrap_or(("", display));
    let number = number.split_once('.').map_or(number, |(n, _)| n);
    format!("{}:{}.{}", host, number, screen)
}

/// Run `glxinfo` against `display` and parse what it prints.
pub fn run(program: &str, display: Option<&str>) -> Result<GlxinfoReport, QueryError> {
    let mut cmd = Command::new(program);
    if let Some(display) = display {
        cmd.args(["-display", display]);
    }

    let output = cmd
        .output()
        .map_err(|e| QueryError::failed("glxinfo", format!("{}: {}", program, e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(QueryError::failed("glxinfo", stderr.trim()));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    tracing::debug!("glxinfo printed {} bytes", stdout.len());
    Ok(parse(&stdout))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
name of display: :0
display: :0  screen: 0
direct rendering: Yes
server glx vendor string: NVIDIA Corporation
server glx version string: 1.4
server glx extensions:
    GLX_ARB_context_flush_control, GLX_ARB_create_context,
    GLX_ARB_multisample, GLX_EXT_visual_info
client glx vendor string: NVIDIA Corporation
client glx version string: 1.4
client glx extensions:
    GLX_ARB_create_context, GLX_ARB_get_proc_address
GLX version: 1.4
GLX extensions:
    GLX_ARB_create_context, GLX_ARB_multisample
Memory info (GL_NVX_gpu_memory_info):
    Dedicated video memory: 8192 MB
OpenGL vendor string: NVIDIA Corporation
OpenGL renderer string: NVIDIA GeForce RTX 3070/PCIe/SSE2
OpenGL core profile version string: 4.6.0 NVIDIA 550.54.14
OpenGL core profile extensions:
    GL_AMD_multi_draw_indirect, GL_ARB_ES2_compatibility
OpenGL version string: 4.6.0 NVIDIA 550.54.14
OpenGL extensions:
    GL_AMD_multi_draw_indirect, GL_ARB_ES2_compatibility,
    GL_ARB_ES3_compatibility
";

    #[test]
    fn test_display_for_screen() {
        assert_eq!(display_for_screen(":0", 1), ":0.1");
        assert_eq!(display_for_screen(":0.0", 1), ":0.1");
        assert_eq!(display_for_screen("localhost:10.0", 2), "localhost:10.2");
        assert_eq!(display_for_screen("unix:1", 0), "unix:1.0");
    }

    #[test]
    fn test_parse_values() {
        let report = parse(SAMPLE);
        assert_eq!(report.get("direct rendering"), Some("Yes"));
        assert_eq!(
            report.string_attribute(GlxString::OpenglRenderer).unwrap(),
            "NVIDIA GeForce RTX 3070/PCIe/SSE2"
        );
        assert_eq!(
            report.string_attribute(GlxString::OpenglVersion).unwrap(),
            "4.6.0 NVIDIA 550.54.14"
        );
    }

    #[test]
    fn test_parse_extension_lists() {
        let report = parse(SAMPLE);
        assert_eq!(
            report.string_attribute(GlxString::ServerExtensions).unwrap(),
            "GLX_ARB_context_flush_control GLX_ARB_create_context GLX_ARB_multisample GLX_EXT_visual_info"
        );
        assert_eq!(
            report.string_attribute(GlxString::OpenglExtensions).unwrap(),
            "GL_AMD_multi_draw_indirect GL_ARB_ES2_compatibility GL_ARB_ES3_compatibility"
        );
        assert_eq!(
            report.string_attribute(GlxString::GlxExtensions).unwrap(),
            "GLX_ARB_create_context GLX_ARB_multisample"
        );
    }

    #[test]
    fn test_core_profile_fallback() {
        let report = parse(
            "OpenGL core profile version string: 4.5 (Core Profile) Mesa 24.0\n\
             OpenGL core profile extensions:\n    GL_ARB_clip_control\n",
        );
        assert_eq!(
            report.string_attribute(GlxString::OpenglVersion).unwrap(),
            "4.5 (Core Profile) Mesa 24.0"
        );
        assert_eq!(
            report.string_attribute(GlxString::OpenglExtensions).unwrap(),
            "GL_ARB_clip_control"
        );
    }

    #[test]
    fn test_missing_string_fails() {
        let report = parse("direct rendering: No\n");
        assert!(report.string_attribute(GlxString::ClientVendor).is_err());
    }
}
