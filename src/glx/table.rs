//! GLX frame buffer configuration table
//!
//! Turns a sentinel-terminated list of `FbConfigAttr` records into a grid of
//! short display strings, 32 cells per configuration. Column order, header
//! titles, and tooltips are fixed.

use serde::Serialize;
use std::fmt;

use super::fbconfig::FbConfigAttr;

/// Number of FBConfig attributes shown per row
pub const NUM_FBCONFIG_ATTRIBS: usize = 32;

pub const SHOW_FBC_HELP: &str =
    "Show the GLX Frame Buffer Configurations table in a new window.";

/// Column header with its tooltip text.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Column {
    pub title: &'static str,
    pub tooltip: &'static str,
}

const fn column(title: &'static str, tooltip: &'static str) -> Column {
    Column { title, tooltip }
}

pub const COLUMNS: [Column; NUM_FBCONFIG_ATTRIBS] = [
    column("fid", "fid (Frame buffer ID) - Frame Buffer Configuration ID."),
    column("vid", "vid (XVisual ID) -  ID of the associated X Visual."),
    column(
        "vt",
        "vt (XVisual Type) -  Type of the associated X Visual.  \
         Possible X visual types are 'tc', 'dc', 'pc', 'sc', 'gs', 'sg' and '.' \
         which mean TrueColor, DirectColor, PseudoColor, StaticColor, GrayScale, \
         StaticGray and None, respectively.",
    ),
    column(
        "bfs",
        "bfs (buffer size) - Number of bits per color in the color buffer.",
    ),
    column(
        "lvl",
        "lvl (level) - Frame buffer level.  Level zero is the default frame \
         buffer.  Positive levels are the overlay frame buffers (on top of the \
         default frame buffer).  Negative levels are the underlay frame buffers \
         (under the default frame buffer).",
    ),
    column(
        "bf",
        "bf (Buffer format) - Color buffer format.  'rgb' means each element of the \
         pixel buffer holds red, green, blue, and alpha values.  'ci' means each \
         element of the pixel buffer holds a color index value, where the actual \
         color is defined by a color map.",
    ),
    column(
        "db",
        "db (Double buffer) - 'y' if the configuration has front and back color \
         buffers that are swappable.  '-' if this is not supported.",
    ),
    column(
        "st",
        "st (Stereo buffer) - 'y' if the configuration has left and right color \
         buffers that are rendered to in stereo.  '-' if this is not supported.",
    ),
    column(
        "rs",
        "rs (Red size) - Number of bits per color used for red.  \
         Undefined for configurations that use color indexing.",
    ),
    column(
        "gs",
        "gs (Green size) - Number of bits per color used for green.  \
         Undefined for configurations that use color indexing.",
    ),
    column(
        "bs",
        "bs (Blue size) - Number of bits per color used for blue.  \
         Undefined for configurations that use color indexing.",
    ),
    column(
        "as",
        "as (Alpha size) - Number of bits per color used for alpha.  \
         Undefined for configurations that use color indexing.",
    ),
    column(
        "aux",
        "aux (Auxiliary buffers) - Number of available auxiliary color buffers.",
    ),
    column(
        "dpt",
        "dpt (Depth buffer size) - Number of bits per color in the depth buffer.",
    ),
    column(
        "stn",
        "stn (Stencil size) - Number of bits per element in the stencil buffer.",
    ),
    column(
        "acr",
        "acr (Accumulator red size) - Number of bits per color used for red \
         in the accumulator buffer.",
    ),
    column(
        "acg",
        "acg (Accumulator green size) - Number of bits per color used for green \
         in the accumulator buffer.",
    ),
    column(
        "acb",
        "acb (Accumulator blue size) - Number of bits per color used for blue \
         in the accumulator buffer.",
    ),
    column(
        "aca",
        "aca (Accumulator alpha size) - Number of bits per color used for alpha \
         in the accumulator buffer.",
    ),
    column(
        "mvs",
        "mvs (Multisample coverage samples) - Number of coverage samples per multisample.",
    ),
    column(
        "mcs",
        "mcs (Multisample color samples) - Number of color samples per multisample.",
    ),
    column(
        "mb",
        "mb (Multisample buffer count) - Number of multisample buffers.",
    ),
    column(
        "cav",
        "cav (Caveats) - Caveats for this configuration.  A frame buffer \
         configuration may have the following caveats: 'NonC' if it supports \
         any non-conformant visual extension.  'Slow' if it has reduced \
         performance.  '-' if it has no caveats.",
    ),
    column(
        "pbw",
        "pbw (Pbuffer width) - Width of pbuffer (in hexadecimal).",
    ),
    column(
        "pbh",
        "pbh (Pbuffer height) - Height of pbuffer (in hexadecimal).",
    ),
    column(
        "pbp",
        "pbp (Pbuffer max pixels) - Max number of pixels in pbuffer (in \
         hexadecimal).",
    ),
    column(
        "trt",
        "trt (Transparency type) - Type of transparency (RGBA or Index).",
    ),
    column(
        "trr",
        "trr (Transparency red value) - Red value considered transparent.",
    ),
    column(
        "trg",
        "trg (Transparency green value) - Green value considered transparent.",
    ),
    column(
        "trb",
        "trb (Transparency blue value) - Blue value considered transparent.",
    ),
    column(
        "tra",
        "tra (Transparency alpha value) - Alpha value considered transparent.",
    ),
    column(
        "tri",
        "tri (Transparency index value) - Color index value considered transparent.",
    ),
];

pub type FbConfigRow = [String; NUM_FBCONFIG_ATTRIBS];

/// String grid shown in the FBConfig window. Owns its cells; nothing in it
/// refers back to the records it was built from.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FbConfigTable {
    pub rows: Vec<FbConfigRow>,
}

/// A typed cell value paired with its display rule.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Cell {
    /// `0x%02X`, or `.` when zero ("not applicable")
    Id(u32),
    /// `0x%0<width>X`
    Hex(u32, usize),
    /// Right-aligned decimal, minimum width
    Int(i32, usize),
    /// `y` / `.`
    Flag(bool),
    /// Abbreviation code
    Code(&'static str),
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Cell::Id(0) => f.write_str("."),
            Cell::Id(id) => write!(f, "0x{:02X}", id),
            Cell::Hex(value, width) => write!(f, "0x{:0width$X}", value, width = width),
            Cell::Int(value, width) => write!(f, "{:>width$}", value, width = width),
            Cell::Flag(true) => f.write_str("y"),
            Cell::Flag(false) => f.write_str("."),
            Cell::Code(code) => f.write_str(code),
        }
    }
}

/// Cells for one record, in column order.
fn cells(attr: &FbConfigAttr) -> [Cell; NUM_FBCONFIG_ATTRIBS] {
    // Without multisample data both sample cells read zero. With multisample
    // data but no coverage info the color cell repeats the sample count.
    let (samples, color_samples) = if !attr.multi_sample_valid {
        (0, 0)
    } else if attr.multi_sample_coverage_valid {
        (attr.multi_samples, attr.multi_samples_color)
    } else {
        (attr.multi_samples, attr.multi_samples)
    };

    [
        Cell::Id(attr.fbconfig_id),
        Cell::Id(attr.visual_id),
        Cell::Code(attr.visual_type().abbrev()),
        Cell::Int(attr.buffer_size, 3),
        Cell::Int(attr.level, 2),
        Cell::Code(attr.render().abbrev()),
        Cell::Flag(attr.doublebuffer),
        Cell::Flag(attr.stereo),
        Cell::Int(attr.red_size, 2),
        Cell::Int(attr.green_size, 2),
        Cell::Int(attr.blue_size, 2),
        Cell::Int(attr.alpha_size, 2),
        Cell::Int(attr.aux_buffers, 2),
        Cell::Int(attr.depth_size, 2),
        Cell::Int(attr.stencil_size, 2),
        Cell::Int(attr.accum_red_size, 2),
        Cell::Int(attr.accum_green_size, 2),
        Cell::Int(attr.accum_blue_size, 2),
        Cell::Int(attr.accum_alpha_size, 2),
        Cell::Int(samples, 2),
        Cell::Int(color_samples, 2),
        Cell::Int(attr.multi_sample_buffers, 1),
        Cell::Code(attr.caveat().abbrev()),
        Cell::Hex(attr.pbuffer_width, 4),
        Cell::Hex(attr.pbuffer_height, 4),
        Cell::Hex(attr.pbuffer_max, 7),
        Cell::Code(attr.transparency().abbrev()),
        Cell::Int(attr.transparent_red_value, 3),
        Cell::Int(attr.transparent_green_value, 3),
        Cell::Int(attr.transparent_blue_value, 3),
        Cell::Int(attr.transparent_alpha_value, 3),
        Cell::Int(attr.transparent_index_value, 3),
    ]
}

/// Format a single record into its 32 display cells.
pub fn format_row(attr: &FbConfigAttr) -> FbConfigRow {
    cells(attr).map(|cell| cell.to_string())
}

/// Records before the first zero-ID sentinel.
pub fn live_records(attribs: &[FbConfigAttr]) -> &[FbConfigAttr] {
    let end = attribs
        .iter()
        .position(FbConfigAttr::is_sentinel)
        .unwrap_or(attribs.len());
    &attribs[..end]
}

/// Build the table model. `None` in means "no data" and gives `None` back;
/// scanning stops at the first record whose configuration ID is zero.
pub fn build_fbconfig_table(attribs: Option<&[FbConfigAttr]>) -> Option<FbConfigTable> {
    let attribs = attribs?;
    let rows = live_records(attribs).iter().map(format_row).collect();
    Some(FbConfigTable { rows })
}

impl FbConfigTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Display width per column: the widest of the title and every cell.
    pub fn column_widths(&self) -> [usize; NUM_FBCONFIG_ATTRIBS] {
        let mut widths = COLUMNS.map(|c| c.title.len());
        for row in &self.rows {
            for (width, cell) in widths.iter_mut().zip(row.iter()) {
                *width = (*width).max(cell.len());
            }
        }
        widths
    }

    /// Plain-text rendering with a title header, one line per row.
    pub fn render_text(&self) -> String {
        let widths = self.column_widths();
        let mut out = String::new();

        let header: Vec<String> = COLUMNS
            .iter()
            .zip(widths.iter())
            .map(|(c, w)| format!("{:>w$}", c.title, w = *w))
            .collect();
        out.push_str(header.join(" ").trim_end());
        out.push('\n');

        for row in &self.rows {
            let line: Vec<String> = row
                .iter()
                .zip(widths.iter())
                .map(|(cell, w)| format!("{:>w$}", cell, w = *w))
                .collect();
            out.push_str(line.join(" ").trim_end());
            out.push('\n');
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::glx::fbconfig::{
        GLX_NONE, GLX_NON_CONFORMANT_CONFIG, GLX_RGBA_BIT, GLX_TRANSPARENT_INDEX, GLX_TRUE_COLOR,
    };

    fn config(id: u32) -> FbConfigAttr {
        FbConfigAttr {
            fbconfig_id: id,
            visual_id: id + 1,
            x_visual_type: GLX_TRUE_COLOR,
            buffer_size: 32,
            render_type: GLX_RGBA_BIT,
            red_size: 8,
            green_size: 8,
            blue_size: 8,
            alpha_size: 8,
            depth_size: 24,
            stencil_size: 8,
            config_caveat: GLX_NONE,
            transparent_type: GLX_NONE,
            ..Default::default()
        }
    }

    #[test]
    fn test_column_titles() {
        let titles: Vec<&str> = COLUMNS.iter().map(|c| c.title).collect();
        assert_eq!(
            titles,
            vec![
                "fid", "vid", "vt", "bfs", "lvl", "bf", "db", "st", "rs", "gs", "bs", "as", "aux",
                "dpt", "stn", "acr", "acg", "acb", "aca", "mvs", "mcs", "mb", "cav", "pbw", "pbh",
                "pbp", "trt", "trr", "trg", "trb", "tra", "tri",
            ]
        );
        for c in COLUMNS.iter() {
            assert!(c.tooltip.starts_with(c.title), "{}", c.title);
        }
    }

    #[test]
    fn test_three_record_example() {
        let first = FbConfigAttr {
            fbconfig_id: 0x01,
            visual_id: 0x02,
            x_visual_type: GLX_TRUE_COLOR,
            doublebuffer: true,
            multi_sample_valid: false,
            multi_samples: 8,
            multi_samples_color: 4,
            ..Default::default()
        };
        let second = FbConfigAttr { fbconfig_id: 0x02, ..Default::default() };
        let sentinel = FbConfigAttr::default();

        let table = build_fbconfig_table(Some(&[first, second, sentinel])).unwrap();
        assert_eq!(table.len(), 2);
        assert!(table.rows.iter().all(|r| r.len() == NUM_FBCONFIG_ATTRIBS));

        let row = &table.rows[0];
        assert_eq!(row[0], "0x01");
        assert_eq!(row[1], "0x02");
        assert_eq!(row[2], "tc");
        assert_eq!(row[6], "y");
        assert_eq!(row[19], " 0");
        assert_eq!(row[20], " 0");
    }

    #[test]
    fn test_sentinel_never_emitted() {
        let table = build_fbconfig_table(Some(&[config(1), FbConfigAttr::default()])).unwrap();
        assert_eq!(table.len(), 1);
        assert!(table.rows.iter().all(|r| r[0] != "."));
    }

    #[test]
    fn test_scan_stops_at_mid_sequence_sentinel() {
        let attribs = [FbConfigAttr::default(), config(5), config(6)];
        let table = build_fbconfig_table(Some(&attribs)).unwrap();
        assert!(table.is_empty());
        assert_eq!(live_records(&attribs).len(), 0);

        let attribs = [config(1), config(2), FbConfigAttr::default(), config(3)];
        assert_eq!(build_fbconfig_table(Some(&attribs)).unwrap().len(), 2);
        assert_eq!(live_records(&attribs).len(), 2);
    }

    #[test]
    fn test_null_input_is_absent_model() {
        assert!(build_fbconfig_table(None).is_none());
        assert!(build_fbconfig_table(Some(&[])).unwrap().is_empty());
    }

    #[test]
    fn test_zero_visual_id_is_placeholder() {
        let attr = FbConfigAttr { visual_id: 0, ..config(0x2a) };
        let row = format_row(&attr);
        assert_eq!(row[0], "0x2A");
        assert_eq!(row[1], ".");
    }

    #[test]
    fn test_multisample_invalid_forces_zero() {
        let attr = FbConfigAttr {
            multi_sample_valid: false,
            multi_sample_coverage_valid: true,
            multi_samples: 16,
            multi_samples_color: 8,
            multi_sample_buffers: 1,
            ..config(1)
        };
        let row = format_row(&attr);
        assert_eq!(row[19], " 0");
        assert_eq!(row[20], " 0");
        assert_eq!(row[21], "1");
    }

    #[test]
    fn test_coverage_invalid_duplicates_sample_count() {
        let attr = FbConfigAttr {
            multi_sample_valid: true,
            multi_sample_coverage_valid: false,
            multi_samples: 4,
            multi_samples_color: 2,
            ..config(1)
        };
        let row = format_row(&attr);
        assert_eq!(row[19], " 4");
        assert_eq!(row[19], row[20]);

        let attr = FbConfigAttr { multi_sample_coverage_valid: true, ..attr };
        let row = format_row(&attr);
        assert_eq!(row[19], " 4");
        assert_eq!(row[20], " 2");
    }

    #[test]
    fn test_full_row_formatting() {
        let attr = FbConfigAttr {
            level: -1,
            stereo: true,
            accum_red_size: 16,
            config_caveat: GLX_NON_CONFORMANT_CONFIG,
            pbuffer_width: 0x2000,
            pbuffer_height: 0x800,
            pbuffer_max: 0x1000000,
            transparent_type: GLX_TRANSPARENT_INDEX,
            transparent_index_value: 255,
            ..config(0x123)
        };
        let row = format_row(&attr);

        assert_eq!(row[0], "0x123");
        assert_eq!(row[1], "0x124");
        assert_eq!(row[3], " 32");
        assert_eq!(row[4], "-1");
        assert_eq!(row[5], "rgb");
        assert_eq!(row[6], ".");
        assert_eq!(row[7], "y");
        assert_eq!(row[13], "24");
        assert_eq!(row[15], "16");
        assert_eq!(row[22], "NonC");
        assert_eq!(row[23], "0x2000");
        assert_eq!(row[24], "0x0800");
        assert_eq!(row[25], "0x1000000");
        assert_eq!(row[26], "ci");
        assert_eq!(row[27], "  0");
        assert_eq!(row[31], "255");
    }

    #[test]
    fn test_render_text_alignment() {
        let table = build_fbconfig_table(Some(&[config(1), config(0x10)])).unwrap();
        let text = table.render_text();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with(" fid  vid vt bfs"));
        assert!(lines[1].starts_with("0x01 0x02 tc  32"));

        let widths = table.column_widths();
        assert_eq!(widths[0], 4);
        assert_eq!(widths[22], 3);
    }
}
