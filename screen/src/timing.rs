//! Video timing for the Apple ][ display on NTSC and PAL monitors.
//!
//! Horizontal positions are measured in CPU cycles (one cycle is one 14-dot
//! character cell), vertical positions in scanlines.
use std::fmt;
use std::str::FromStr;

use crate::error::{Result, ScreenError};

#[cfg(feature = "serde_support")]
use serde::{Deserialize, Serialize};

pub const HORIZ_START: usize = 16;
pub const HORIZ_BLANK: usize = 9 + HORIZ_START;
pub const HORIZ_DISPLAY: usize = 40;
pub const HORIZ_TOTAL: usize = HORIZ_BLANK + HORIZ_DISPLAY;

pub const CELL_WIDTH: usize = 14;
pub const CELL_HEIGHT: usize = 8;

pub const VERT_NTSC_START: usize = 38;
pub const VERT_PAL_START: usize = 48;
pub const VERT_DISPLAY: usize = 192;

// NTSC colour subcarrier is 315/88 MHz, sampled at 4x subcarrier
pub const NTSC_FSC: f64 = 315.0 / 88.0 * 1e6;
pub const NTSC_4FSC: f64 = 4.0 * NTSC_FSC;
const NTSC_HLENGTH: f64 = (52.0 + 8.0 / 9.0) * 1e-6;
const NTSC_HHALF: f64 = (35.0 + 2.0 / 3.0) * 1e-6;
const NTSC_HSTART: f64 = NTSC_HHALF - NTSC_HLENGTH / 2.0;
const NTSC_VTOTAL: usize = 262;
const NTSC_VLENGTH: f64 = 240.0;
const NTSC_VSTART: f64 = 19.0;

pub const PAL_FSC: f64 = 4433618.75;
pub const PAL_4FSC: f64 = 4.0 * PAL_FSC;
// The PAL Apple ][ master clock is not locked to the subcarrier
const PAL_14M: f64 = 14250450.0;
const PAL_HLENGTH: f64 = 52e-6;
const PAL_HHALF: f64 = (37.0 + 10.0 / 27.0) * 1e-6;
const PAL_HSTART: f64 = PAL_HHALF - PAL_HLENGTH / 2.0;
const PAL_VTOTAL: usize = 312;
const PAL_VLENGTH: f64 = 288.0;
const PAL_VSTART: f64 = 21.0;

// Reference phase of the colour burst relative to the subcarrier
const COLOR_BURST_DEGREES: f64 = -33.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Rect {
            x,
            y,
            width,
            height,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde_support", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde_support", serde(rename_all = "lowercase"))]
pub enum VideoStandard {
    #[default]
    Ntsc,
    Pal,
}

impl VideoStandard {
    pub fn constants(&self) -> VideoStandardConstants {
        match self {
            VideoStandard::Ntsc => VideoStandardConstants::ntsc(),
            VideoStandard::Pal => VideoStandardConstants::pal(),
        }
    }
}

impl FromStr for VideoStandard {
    type Err = ScreenError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "ntsc" | "60hz" => Ok(VideoStandard::Ntsc),
            "pal" | "50hz" => Ok(VideoStandard::Pal),
            _ => Err(ScreenError::Configuration(format!(
                "Unknown video standard '{s}'"
            ))),
        }
    }
}

impl fmt::Display for VideoStandard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VideoStandard::Ntsc => write!(f, "NTSC"),
            VideoStandard::Pal => write!(f, "PAL"),
        }
    }
}

/// Fixed timing of one video standard.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VideoStandardConstants {
    pub standard: VideoStandard,
    pub horiz_total: usize,
    pub cell_width: usize,
    pub clock_frequency: f64,
    pub display_rect: Rect,
    pub visible_rect: Rect,
    pub vert_total: usize,
}

impl VideoStandardConstants {
    pub fn ntsc() -> Self {
        let clock_frequency = NTSC_4FSC * HORIZ_TOTAL as f64 / 912.0;
        VideoStandardConstants {
            standard: VideoStandard::Ntsc,
            horiz_total: HORIZ_TOTAL,
            cell_width: CELL_WIDTH,
            clock_frequency,
            display_rect: Rect::new(
                HORIZ_START as f64,
                VERT_NTSC_START as f64,
                HORIZ_DISPLAY as f64,
                VERT_DISPLAY as f64,
            ),
            visible_rect: Rect::new(
                clock_frequency * NTSC_HSTART,
                NTSC_VSTART,
                clock_frequency * NTSC_HLENGTH,
                NTSC_VLENGTH,
            ),
            vert_total: NTSC_VTOTAL,
        }
    }

    pub fn pal() -> Self {
        let clock_frequency = PAL_14M * HORIZ_TOTAL as f64 / 912.0;
        VideoStandardConstants {
            standard: VideoStandard::Pal,
            horiz_total: HORIZ_TOTAL,
            cell_width: CELL_WIDTH,
            clock_frequency,
            display_rect: Rect::new(
                HORIZ_START as f64,
                VERT_PAL_START as f64,
                HORIZ_DISPLAY as f64,
                VERT_DISPLAY as f64,
            ),
            visible_rect: Rect::new(
                clock_frequency * PAL_HSTART,
                PAL_VSTART,
                clock_frequency * PAL_HLENGTH,
                PAL_VLENGTH,
            ),
            vert_total: PAL_VTOTAL,
        }
    }
}

/// Layout of the sampled image relative to the Apple ][ display area.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageGeometry {
    pub clock_frequency: f64,
    pub vert_start: f64,
    pub vert_total: usize,
    /// CPU cycles per frame, 17030 for NTSC
    pub frame_cycle_num: usize,
    pub cycle_num: usize,
    /// First displayed cell column
    pub horiz_start: i32,
    pub image_width: usize,
    pub image_height: usize,
    /// Pixels from the first visible sample to the first displayed one
    pub image_left: i32,
    pub color_burst: Vec<f32>,
    /// First pixel drawn in 40 column modes
    pub top_left: Point,
    /// First pixel drawn in 80 column and double hires modes
    pub top_left_80col: Point,
}

/// Colour burst reference phase in radians.
///
/// Only the pixel alignment against the 4 samples of one subcarrier cycle
/// matters, so the phase takes one of 4 values.
pub fn color_burst_phase(image_left: i32) -> f32 {
    let alignment = image_left.rem_euclid(4) as f64;
    (2.0 * std::f64::consts::PI * (COLOR_BURST_DEGREES / 360.0 + alignment / 4.0)) as f32
}

pub fn build_timing(constants: &VideoStandardConstants) -> ImageGeometry {
    let display = &constants.display_rect;
    let visible = &constants.visible_rect;
    let cell_width = constants.cell_width as f64;

    let vert_start = display.y;
    let frame_cycle_num = constants.horiz_total * constants.vert_total;
    let horiz_start = display.x.floor();

    let image_width = (cell_width * visible.width).floor() as usize;
    let image_height = visible.height.floor() as usize;
    let image_left = ((horiz_start - visible.x) * cell_width).floor() as i32;

    let top = (vert_start - visible.y) as i32;
    let half_cell = (constants.cell_width / 2) as i32;

    ImageGeometry {
        clock_frequency: constants.clock_frequency,
        vert_start,
        vert_total: constants.vert_total,
        frame_cycle_num,
        cycle_num: frame_cycle_num + 16,
        horiz_start: horiz_start as i32,
        image_width,
        image_height,
        image_left,
        color_burst: vec![color_burst_phase(image_left)],
        top_left: Point {
            x: image_left,
            y: top,
        },
        top_left_80col: Point {
            x: image_left - half_cell,
            y: top,
        },
    }
}
