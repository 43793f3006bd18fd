//! Software version of the composite render stage.
//!
//! Each line is demodulated against the colour burst of the phase table,
//! low-passed with the kernel bank and converted with the decoder matrix.
use glam::Vec3;

use crate::config::DecoderVariant;
use crate::error::{Result, ScreenError};
use crate::filter::KERNEL_TAPS;
use crate::frame::LumaFrame;
use crate::matrix::DecodeParameters;
use crate::phase::{PhaseEntry, PhaseTable};

pub type Rgb = [u8; 3];

fn demodulate(row: &[u8], entry: &PhaseEntry, subcarrier: f32, composite: bool) -> Vec<Vec3> {
    row.iter()
        .enumerate()
        .map(|(x, &value)| {
            let luma = value as f32 / 255.0;
            if !composite {
                return Vec3::splat(luma);
            }
            let phase = 2.0
                * std::f64::consts::PI
                * (subcarrier as f64 * x as f64 + entry.phase as f64);
            let (sin, cos) = phase.sin_cos();
            luma * Vec3::new(1.0, sin as f32, entry.alternation_sign() * cos as f32)
        })
        .collect()
}

fn filter_at(samples: &[Vec3], x: usize, taps: &[Vec3; KERNEL_TAPS]) -> Vec3 {
    let sample = |i: isize| -> Vec3 {
        if i < 0 {
            Vec3::ZERO
        } else {
            samples.get(i as usize).copied().unwrap_or(Vec3::ZERO)
        }
    };

    let x = x as isize;
    let mut c = sample(x) * taps[0];
    for (lag, tap) in taps.iter().enumerate().skip(1) {
        let lag = lag as isize;
        c += (sample(x + lag) + sample(x - lag)) * *tap;
    }
    c
}

fn to_rgb(color: Vec3) -> Rgb {
    let c = color.clamp(Vec3::ZERO, Vec3::ONE) * 255.0;
    [c.x.round() as u8, c.y.round() as u8, c.z.round() as u8]
}

/// Decode a frame to RGB, one triple per pixel in row order.
///
/// `params` must have been computed for `decoder`.
pub fn decode_frame(
    frame: &LumaFrame,
    table: &PhaseTable,
    params: &DecodeParameters,
    decoder: DecoderVariant,
) -> Result<Vec<Rgb>> {
    if params.decoder != decoder {
        return Err(ScreenError::Configuration(format!(
            "Parameters computed for {} cannot decode as {decoder}",
            params.decoder
        )));
    }
    if table.height() < frame.height() {
        return Err(ScreenError::Dimension {
            left: table.height(),
            right: frame.height(),
        });
    }

    let kernels = params.kernels.uniforms();
    let mut taps = [Vec3::ZERO; KERNEL_TAPS];
    for (tap, kernel) in taps.iter_mut().zip(kernels.iter()) {
        *tap = Vec3::from_array(*kernel);
    }

    let width = frame.width();
    let mut output = Vec::with_capacity(width * frame.height());

    for (y, entry) in table.entries().iter().take(frame.height()).enumerate() {
        let row = &frame.data()[y * width..(y + 1) * width];
        let samples = demodulate(row, entry, params.subcarrier, decoder.is_composite());
        output.extend((0..width).map(|x| to_rgb(params.apply(filter_at(&samples, x, &taps)))));
    }
    Ok(output)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::config::{DisplayConfig, SourceSignalInfo};
    use crate::matrix::recompute;
    use crate::phase::build_phase_table_for_height;

    fn decode_flat(level: u8, decoder: DecoderVariant, signal: &SourceSignalInfo) -> Vec<Rgb> {
        let frame = LumaFrame::from_raw(64, 4, vec![level; 64 * 4]).unwrap();
        let table = build_phase_table_for_height(frame.height(), signal).unwrap();
        let config = DisplayConfig {
            decoder,
            ..Default::default()
        };
        let params = recompute(&config, signal).unwrap();
        decode_frame(&frame, &table, &params, decoder).unwrap()
    }

    fn centre(pixels: &[Rgb]) -> &[Rgb] {
        // Away from the zero padded edges on the first line
        &pixels[16..48]
    }

    #[test]
    fn flat_white_decodes_to_white() {
        for decoder in [
            DecoderVariant::Rgb,
            DecoderVariant::Yuv,
            DecoderVariant::Yiq,
        ] {
            let pixels = decode_flat(255, decoder, &SourceSignalInfo::ntsc());
            for pixel in centre(&pixels) {
                for channel in pixel {
                    assert!(*channel >= 245, "{decoder}: {pixel:?}");
                }
            }
        }
    }

    #[test]
    fn black_stays_black() {
        for decoder in [DecoderVariant::Rgb, DecoderVariant::Yuv, DecoderVariant::Cxa2025as] {
            let pixels = decode_flat(0, decoder, &SourceSignalInfo::pal());
            assert!(pixels.iter().all(|pixel| *pixel == [0, 0, 0]));
        }
    }

    #[test]
    fn monochrome_source_has_no_colour() {
        let pixels = decode_flat(128, DecoderVariant::Yuv, &SourceSignalInfo::ntsc().monochrome());
        for pixel in centre(&pixels) {
            assert_eq!(pixel[0], pixel[1]);
            assert_eq!(pixel[1], pixel[2]);
            assert!((pixel[0] as i32 - 128).abs() <= 1);
        }
    }

    #[test]
    fn isolated_dots_produce_colour() {
        // A dot every 4 samples sits on one subcarrier phase
        let mut frame = LumaFrame::new(64, 1);
        for x in (0..64).step_by(4) {
            frame.set(x, 0, 255);
        }
        let signal = SourceSignalInfo::ntsc();
        let table = build_phase_table_for_height(1, &signal).unwrap();
        let config = DisplayConfig {
            decoder: DecoderVariant::Yuv,
            ..Default::default()
        };
        let params = recompute(&config, &signal).unwrap();
        let pixels = decode_frame(&frame, &table, &params, DecoderVariant::Yuv).unwrap();
        let pixel = pixels[32];
        assert!(pixel[0] != pixel[1] || pixel[1] != pixel[2], "{pixel:?}");
    }

    #[test]
    fn short_phase_table_fails() {
        let frame = LumaFrame::new(8, 4);
        let signal = SourceSignalInfo::ntsc();
        let table = build_phase_table_for_height(2, &signal).unwrap();
        let params = recompute(&DisplayConfig::default(), &signal).unwrap();
        assert_eq!(
            decode_frame(&frame, &table, &params, DecoderVariant::Rgb),
            Err(ScreenError::Dimension { left: 2, right: 4 })
        );
    }

    #[test]
    fn parameters_must_match_decoder() {
        let frame = LumaFrame::new(8, 1);
        let signal = SourceSignalInfo::ntsc();
        let table = build_phase_table_for_height(1, &signal).unwrap();
        let params = recompute(&DisplayConfig::default(), &signal).unwrap();
        assert!(matches!(
            decode_frame(&frame, &table, &params, DecoderVariant::Yuv),
            Err(ScreenError::Configuration(_))
        ));
        assert!(decode_frame(&frame, &table, &params, DecoderVariant::Rgb).is_ok());
    }
}
