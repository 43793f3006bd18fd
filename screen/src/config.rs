use std::fmt;
use std::str::FromStr;

use crate::error::{Result, ScreenError};
use crate::timing::{
    ImageGeometry, NTSC_4FSC, NTSC_FSC, PAL_4FSC, PAL_FSC, VideoStandardConstants, build_timing,
};

#[cfg(feature = "serde_support")]
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde_support", derive(Serialize, Deserialize))]
#[cfg_attr(
    feature = "serde_support",
    serde(try_from = "String", into = "String")
)]
pub enum DecoderVariant {
    #[default]
    Rgb,
    Monochrome,
    Yuv,
    Yiq,
    Cxa2025as,
}

impl DecoderVariant {
    /// Decoders that demodulate a composite signal rather than filter RGB.
    pub fn is_composite(&self) -> bool {
        matches!(
            self,
            DecoderVariant::Yuv | DecoderVariant::Yiq | DecoderVariant::Cxa2025as
        )
    }

    pub fn name(&self) -> &'static str {
        match self {
            DecoderVariant::Rgb => "rgb",
            DecoderVariant::Monochrome => "monochrome",
            DecoderVariant::Yuv => "yuv",
            DecoderVariant::Yiq => "yiq",
            DecoderVariant::Cxa2025as => "cxa2025as",
        }
    }
}

impl FromStr for DecoderVariant {
    type Err = ScreenError;

    fn from_str(s: &str) -> Result<Self> {
        let lower = s.to_ascii_lowercase();
        let name = lower.strip_prefix("canvas_").unwrap_or(&lower);
        match name {
            "rgb" => Ok(DecoderVariant::Rgb),
            "monochrome" | "mono" => Ok(DecoderVariant::Monochrome),
            "yuv" => Ok(DecoderVariant::Yuv),
            "yiq" => Ok(DecoderVariant::Yiq),
            "cxa2025as" => Ok(DecoderVariant::Cxa2025as),
            _ => Err(ScreenError::Configuration(format!(
                "Unknown decoder variant '{s}'"
            ))),
        }
    }
}

impl TryFrom<String> for DecoderVariant {
    type Error = ScreenError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<DecoderVariant> for String {
    fn from(value: DecoderVariant) -> Self {
        value.name().to_string()
    }
}

impl fmt::Display for DecoderVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// User adjustable monitor settings.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde_support", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde_support", serde(default))]
pub struct DisplayConfig {
    pub decoder: DecoderVariant,
    pub brightness: f32,
    pub contrast: f32,
    pub saturation: f32,
    /// Fraction of a full turn
    pub hue: f32,
    /// Bandwidth in Hz used when no colour is decoded
    pub bandwidth: f32,
    pub luma_bandwidth: f32,
    pub chroma_bandwidth: f32,
    pub white_only: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        DisplayConfig {
            decoder: DecoderVariant::Rgb,
            brightness: 0.0,
            contrast: 1.0,
            saturation: 1.0,
            hue: 0.0,
            bandwidth: 14318180.0,
            luma_bandwidth: 2000000.0,
            chroma_bandwidth: 600000.0,
            white_only: false,
        }
    }
}

impl DisplayConfig {
    pub fn validate(&self) -> Result<()> {
        let values = [
            ("brightness", self.brightness),
            ("contrast", self.contrast),
            ("saturation", self.saturation),
            ("hue", self.hue),
        ];
        for (name, value) in values {
            if !value.is_finite() {
                return Err(ScreenError::Configuration(format!(
                    "{name} must be finite, got {value}"
                )));
            }
        }

        let bandwidths = [
            ("bandwidth", self.bandwidth),
            ("luma bandwidth", self.luma_bandwidth),
            ("chroma bandwidth", self.chroma_bandwidth),
        ];
        for (name, value) in bandwidths {
            if !value.is_finite() || value < 0.0 {
                return Err(ScreenError::Configuration(format!(
                    "{name} must be a finite non-negative frequency, got {value}"
                )));
            }
        }
        Ok(())
    }
}

/// Description of the sampled signal held by an image.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde_support", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde_support", serde(default))]
pub struct SourceSignalInfo {
    pub sample_rate: f32,
    /// Zero for a monochrome source
    pub subcarrier: f32,
    pub black_level: f32,
    pub white_level: f32,
    /// Radians, repeated over the scanlines
    pub color_burst: Vec<f32>,
    pub phase_alternation: Vec<bool>,
}

impl Default for SourceSignalInfo {
    fn default() -> Self {
        Self::ntsc()
    }
}

impl SourceSignalInfo {
    fn from_geometry(
        geometry: &ImageGeometry,
        sample_rate: f64,
        subcarrier: f64,
        phase_alternation: Vec<bool>,
    ) -> Self {
        SourceSignalInfo {
            sample_rate: sample_rate as f32,
            subcarrier: subcarrier as f32,
            black_level: 0.0,
            white_level: 1.0,
            color_burst: geometry.color_burst.clone(),
            phase_alternation,
        }
    }

    pub fn ntsc() -> Self {
        let geometry = build_timing(&VideoStandardConstants::ntsc());
        Self::from_geometry(&geometry, NTSC_4FSC, NTSC_FSC, vec![false])
    }

    pub fn pal() -> Self {
        let geometry = build_timing(&VideoStandardConstants::pal());
        Self::from_geometry(&geometry, PAL_4FSC, PAL_FSC, vec![false, true])
    }

    /// Same signal without a colour subcarrier.
    pub fn monochrome(mut self) -> Self {
        self.subcarrier = 0.0;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !self.sample_rate.is_finite() || self.sample_rate <= 0.0 {
            return Err(ScreenError::Configuration(format!(
                "Sample rate must be positive, got {}",
                self.sample_rate
            )));
        }
        if !self.subcarrier.is_finite() || self.subcarrier < 0.0 {
            return Err(ScreenError::Configuration(format!(
                "Invalid subcarrier frequency {}",
                self.subcarrier
            )));
        }
        if !self.black_level.is_finite() || !self.white_level.is_finite() {
            return Err(ScreenError::Configuration(
                "Black and white levels must be finite".to_string(),
            ));
        }
        if self.color_burst.is_empty() {
            return Err(ScreenError::Configuration(
                "Colour burst phase list is empty".to_string(),
            ));
        }
        if let Some(phase) = self.color_burst.iter().find(|phase| !phase.is_finite()) {
            return Err(ScreenError::Configuration(format!(
                "Colour burst phase must be finite, got {phase}"
            )));
        }
        if self.phase_alternation.is_empty() {
            return Err(ScreenError::Configuration(
                "Phase alternation list is empty".to_string(),
            ));
        }
        Ok(())
    }
}
