//! Help text for the GLX page

use crate::glx::table::{COLUMNS, SHOW_FBC_HELP};

pub struct HelpSection {
    pub heading: &'static str,
    pub paragraphs: Vec<String>,
}

pub const HELP_TITLE: &str = "GLX Help";

const INTRO: &str = "This page describes information about the OpenGL extension to the \
                     X Server (GLX).";

fn section(heading: &'static str, text: &str) -> HelpSection {
    HelpSection { heading, paragraphs: vec![text.to_string()] }
}

pub fn glx_help() -> Vec<HelpSection> {
    let mut sections = vec![
        HelpSection { heading: HELP_TITLE, paragraphs: vec![INTRO.to_string()] },
        section(
            "Direct Rendering",
            "This will tell you if direct rendering is available.  If direct rendering \
             is available, then a program running on the same computer that this page is \
             running on will be able to bypass the X Server and take advantage of faster \
             rendering.  If direct rendering is not available, then indirect rendering \
             will be used and all rendering will happen through the X Server.",
        ),
        section(
            "GLX Extensions",
            "This is the list of GLX extensions that are supported by both the client \
             (libraries) and server (GLX extension to the X Server).",
        ),
        section(
            "Server GLX Vendor String",
            "This is the vendor supplying the GLX extension running on the X Server.",
        ),
        section(
            "Server GLX Version String",
            "This is the version of the GLX extension running on the X Server.",
        ),
        section(
            "Server GLX Extensions",
            "This is the list of extensions supported by the GLX extension running on \
             the X Server.",
        ),
        section(
            "Client GLX Vendor String",
            "This is the vendor supplying the GLX libraries.",
        ),
        section(
            "Client GLX Version String",
            "This is the version of the GLX libraries.",
        ),
        section(
            "Client GLX Extensions",
            "This is the list of extensions supported by the GLX libraries.",
        ),
        section(
            "OpenGL Vendor String",
            "This is the name of the vendor providing the OpenGL implementation.",
        ),
        section(
            "OpenGL Renderer String",
            "This shows the details of the graphics card on which OpenGL is running.",
        ),
        section(
            "OpenGL Version String",
            "This is the version of the OpenGL implementation.",
        ),
        section(
            "OpenGL Extensions",
            "This is the list of OpenGL extensions that are supported by this driver.",
        ),
        section("Show GLX Frame Buffer Configurations", SHOW_FBC_HELP),
    ];

    let mut paragraphs = vec![
        "This table lists the supported frame buffer configurations for the display."
            .to_string(),
    ];
    paragraphs.extend(COLUMNS.iter().map(|c| c.tooltip.to_string()));
    sections.push(HelpSection { heading: "GLX Frame Buffer Configurations", paragraphs });

    sections
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_help_lists_every_column() {
        let help = glx_help();
        assert_eq!(help[0].heading, HELP_TITLE);

        let table = help.last().unwrap();
        assert_eq!(table.heading, "GLX Frame Buffer Configurations");
        assert_eq!(table.paragraphs.len(), 1 + COLUMNS.len());
        assert!(table.paragraphs[1].starts_with("fid"));
        assert!(table.paragraphs[32].starts_with("tri"));
    }
}
