//! Decoder matrix and filter setup for the render stage.
//!
//! Matrix literals below are written one column per line, the layout the
//! render stage uploads them in. Each stage is premultiplied onto the
//! accumulated matrix, so the order of stages in `decoder_matrix` is the
//! order a sample goes through them.
use glam::{Mat3, Vec3};
use tracing::{debug, trace};

use crate::config::{DecoderVariant, DisplayConfig, SourceSignalInfo};
use crate::error::Result;
use crate::filter::{Bandwidths, KernelBank};

// Difference between the I and Q channel cutoffs of an NTSC YIQ decoder
const NTSC_I_CUTOFF: f32 = 1300000.0;
const NTSC_Q_CUTOFF: f32 = 600000.0;
const NTSC_IQ_DELTA: f32 = NTSC_I_CUTOFF - NTSC_Q_CUTOFF;

// Phase offset between the CXA2025AS demodulator axes and I/Q
const CXA2025AS_ROTATION_DEGREES: f32 = -33.0;

#[rustfmt::skip]
const RGB_TO_YPBPR: [[f32; 3]; 3] = [
    [0.299, -0.168736,  0.5     ],
    [0.587, -0.331264, -0.418688],
    [0.114,  0.5,      -0.081312],
];

#[rustfmt::skip]
const YPBPR_TO_RGB: [[f32; 3]; 3] = [
    [1.0,    1.0,      1.0  ],
    [0.0,   -0.344136, 1.772],
    [1.402, -0.714136, 0.0  ],
];

#[rustfmt::skip]
const YUV_TO_RGB: [[f32; 3]; 3] = [
    [1.0,       1.0,      1.0     ],
    [0.0,      -0.394642, 2.032062],
    [1.139883, -0.580622, 0.0     ],
];

#[rustfmt::skip]
const CXA2025AS_TO_RGB: [[f32; 3]; 3] = [
    [1.0,    1.0,    1.0  ],
    [1.630, -0.378, -1.089],
    [0.317, -0.466,  1.677],
];

// Monochrome monitors keep luma and leak half of it into Pb
#[rustfmt::skip]
const MONOCHROME_LUMA: [[f32; 3]; 3] = [
    [1.0, 0.5, 0.0],
    [0.0, 0.0, 0.0],
    [0.0, 0.0, 0.0],
];

#[rustfmt::skip]
const LUMA_ONLY: [[f32; 3]; 3] = [
    [1.0, 0.0, 0.0],
    [0.0, 0.0, 0.0],
    [0.0, 0.0, 0.0],
];

#[rustfmt::skip]
const SWAP_IQ: [[f32; 3]; 3] = [
    [1.0, 0.0, 0.0],
    [0.0, 0.0, 1.0],
    [0.0, 1.0, 0.0],
];

fn columns(literal: &[[f32; 3]; 3]) -> Mat3 {
    Mat3::from_cols_array_2d(literal)
}

fn saturation(value: f32) -> Mat3 {
    Mat3::from_diagonal(Vec3::new(1.0, value, value))
}

/// Rotation of the two chroma axes, luma untouched.
fn chroma_rotation(angle: f32) -> Mat3 {
    let (sin, cos) = angle.sin_cos();
    #[rustfmt::skip]
    let literal = [
        [1.0, 0.0,  0.0],
        [0.0, cos, -sin],
        [0.0, sin,  cos],
    ];
    columns(&literal)
}

/// Everything the render stage needs for one display configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecodeParameters {
    /// Decoder these parameters were built for
    pub decoder: DecoderVariant,
    pub matrix: Mat3,
    pub offset: Vec3,
    /// Subcarrier in cycles per sample
    pub subcarrier: f32,
    pub kernels: KernelBank,
}

impl DecodeParameters {
    /// Matrix in column major order, as uploaded to a `mat3` uniform.
    pub fn matrix_uniform(&self) -> [f32; 9] {
        self.matrix.to_cols_array()
    }

    pub fn offset_uniform(&self) -> [f32; 3] {
        self.offset.to_array()
    }

    /// Decoded colour of a filtered (luma, chroma, chroma) sample.
    pub fn apply(&self, sample: Vec3) -> Vec3 {
        self.matrix * sample + self.offset
    }
}

/// Filter cutoffs as fractions of the sample rate.
pub fn bandwidths(config: &DisplayConfig, signal: &SourceSignalInfo) -> Bandwidths {
    let sample_rate = signal.sample_rate;
    let video = config.bandwidth / sample_rate;

    if !config.decoder.is_composite() || signal.subcarrier == 0.0 || config.white_only {
        return Bandwidths::uniform(video);
    }

    let luma = config.luma_bandwidth / sample_rate;
    let chroma_v = config.chroma_bandwidth / sample_rate;
    let chroma_u = if config.decoder == DecoderVariant::Yiq {
        chroma_v + NTSC_IQ_DELTA / sample_rate
    } else {
        chroma_v
    };

    Bandwidths {
        luma,
        chroma_u,
        chroma_v,
    }
}

/// Decoder matrix scaled by contrast, and the brightness offset.
pub fn decoder_matrix(config: &DisplayConfig, signal: &SourceSignalInfo) -> (Mat3, Vec3) {
    let decoder = config.decoder;
    let mut m = Mat3::IDENTITY;

    // Encode RGB input so the controls below work on colour difference
    if !decoder.is_composite() {
        m = columns(&RGB_TO_YPBPR) * m;
    }

    if decoder == DecoderVariant::Monochrome {
        m = columns(&MONOCHROME_LUMA) * m;
    }

    if decoder.is_composite() && (signal.subcarrier == 0.0 || config.white_only) {
        m = columns(&LUMA_ONLY) * m;
    }

    m = saturation(config.saturation) * m;

    m = chroma_rotation(2.0 * std::f32::consts::PI * config.hue) * m;

    m = match decoder {
        DecoderVariant::Rgb | DecoderVariant::Monochrome => columns(&YPBPR_TO_RGB) * m,
        DecoderVariant::Yuv | DecoderVariant::Yiq => columns(&YUV_TO_RGB) * m,
        DecoderVariant::Cxa2025as => {
            m = columns(&SWAP_IQ) * m;
            m = chroma_rotation(CXA2025AS_ROTATION_DEGREES.to_radians()) * m;
            columns(&CXA2025AS_TO_RGB) * m
        }
    };

    let brightness = config.brightness - signal.black_level;
    let brightness = if decoder.is_composite() {
        Vec3::new(brightness, 0.0, 0.0)
    } else {
        Vec3::splat(brightness)
    };
    let offset = m * brightness;

    let gain = signal.white_level - signal.black_level;
    let contrast = if gain > 0.0 {
        config.contrast / gain
    } else {
        0.0
    };

    (m * f32::max(contrast, 0.0), offset)
}

/// Recompute decoder parameters after a display or signal change.
pub fn recompute(config: &DisplayConfig, signal: &SourceSignalInfo) -> Result<DecodeParameters> {
    config.validate()?;
    signal.validate()?;

    let bandwidths = bandwidths(config, signal);
    debug!(
        decoder = %config.decoder,
        luma = bandwidths.luma,
        chroma_u = bandwidths.chroma_u,
        chroma_v = bandwidths.chroma_v,
        "Filter bandwidths"
    );

    let kernels = if config.decoder.is_composite() {
        KernelBank::composite(&bandwidths)?
    } else {
        KernelBank::rgb(bandwidths.luma)?
    };
    trace!(taps = ?kernels.uniforms(), "Filter kernels");

    let (matrix, offset) = decoder_matrix(config, signal);
    debug!(matrix = ?matrix.to_cols_array(), offset = ?offset.to_array(), "Decoder matrix");

    Ok(DecodeParameters {
        decoder: config.decoder,
        matrix,
        offset,
        subcarrier: signal.subcarrier / signal.sample_rate,
        kernels,
    })
}
