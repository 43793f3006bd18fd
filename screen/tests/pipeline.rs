use screen_emu::composite::decode_frame;
use screen_emu::frame::{LumaFrame, SCREEN_HEIGHT, SCREEN_WIDTH, compose_screen};
use screen_emu::timing::Point;
use screen_emu::{
    DecoderVariant, DisplayConfig, SourceSignalInfo, VideoStandard, Window, build_phase_table,
    build_timing, recompute,
};

fn assert_close(left: f32, right: f32, tolerance: f32) {
    assert!(
        (left - right).abs() <= tolerance,
        "{left} and {right} differ by more than {tolerance}"
    );
}

#[test]
fn ntsc_end_to_end() {
    let constants = VideoStandard::Ntsc.constants();
    assert_eq!(constants.display_rect.y, 38.0);
    assert_eq!(constants.visible_rect.y, 19.0);

    let geometry = build_timing(&constants);
    assert_eq!(geometry.top_left, Point { x: 92, y: 19 });

    let signal = SourceSignalInfo {
        sample_rate: 14318180.0,
        ..SourceSignalInfo::ntsc()
    };
    let config = DisplayConfig {
        decoder: DecoderVariant::Yuv,
        luma_bandwidth: 2000000.0,
        ..Default::default()
    };

    let fraction = config.luma_bandwidth / signal.sample_rate;
    assert_close(fraction, 0.1397, 1e-4);

    let lanczos = Window::lanczos(17, fraction);
    assert_eq!(lanczos.as_slice()[8], 1.0);
    assert_close(lanczos.as_slice()[9], 0.876_476, 1e-5);
    assert_close(lanczos.as_slice()[7], 0.876_476, 1e-5);

    let params = recompute(&config, &signal).unwrap();
    let taps = params.kernels.luma.taps();
    assert_close(taps[0], 0.279_41, 1e-4);
    assert_close(taps[1], 0.235_93, 1e-4);
    assert_close(taps[8], 0.001_30, 1e-4);
    assert_close(params.kernels.chroma_u.taps()[0], 0.260_30, 1e-4);

    let table = build_phase_table(&geometry, &signal).unwrap();
    assert_eq!(table.len(), 256);

    // White 40 column text area composes into the middle of the frame
    let screen = LumaFrame::from_raw(
        SCREEN_WIDTH,
        SCREEN_HEIGHT,
        vec![255; SCREEN_WIDTH * SCREEN_HEIGHT],
    )
    .unwrap();
    let frame = compose_screen(&screen, &geometry, false).unwrap();
    let pixels = decode_frame(&frame, &table, &params, config.decoder).unwrap();
    assert_eq!(pixels.len(), geometry.image_width * geometry.image_height);

    let width = geometry.image_width;
    assert_eq!(pixels[0], [0, 0, 0]);
    let centre = pixels[100 * width + 370];
    assert!(centre.iter().all(|&c| c >= 245), "{centre:?}");
}

#[test]
fn every_decoder_recomputes_for_both_standards() {
    for signal in [SourceSignalInfo::ntsc(), SourceSignalInfo::pal()] {
        for decoder in [
            DecoderVariant::Rgb,
            DecoderVariant::Monochrome,
            DecoderVariant::Yuv,
            DecoderVariant::Yiq,
            DecoderVariant::Cxa2025as,
        ] {
            let config = DisplayConfig {
                decoder,
                ..Default::default()
            };
            let first = recompute(&config, &signal).unwrap();
            let second = recompute(&config, &signal).unwrap();
            assert_eq!(first, second);
            assert!(first.matrix_uniform().iter().all(|v| v.is_finite()));
        }
    }
}
