use screen_emu::{
    DecoderVariant, DisplayConfig, SourceSignalInfo, VideoStandard, build_phase_table,
    build_timing, recompute,
};
use std::error::Error;
use std::io::{self, Write};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[cfg(feature = "serde_support")]
use std::fs;

const VERSION: &str = env!("CARGO_PKG_VERSION");

// Highest bandwidth the 4x subcarrier sampling can carry
const MAX_BANDWIDTH: f32 = 7159090.0;

fn print_version() {
    eprintln!("self_test {VERSION}");
}

fn print_usage() {
    eprintln!(
        r#"
USAGE:
    self_test [FLAGS]

FLAGS:
    -h, --help           Prints help information
    -V, --version        Prints version information
    --standard STD       Video standard. Valid value: ntsc,pal
    --decoder DECODER    Monitor decoder.
                         Valid value: rgb,monochrome,yuv,yiq,cxa2025as
    --config PATH        Load display settings from a YAML file
    --brightness VALUE   Set brightness
    --contrast VALUE     Set contrast
    --saturation VALUE   Set saturation
    --hue VALUE          Set hue in turns
    --bandwidth HZ       Set video bandwidth
    --luma HZ            Set luma bandwidth, 0 to 7159090
    --chroma HZ          Set chroma bandwidth, 0 to 7159090
    --white-only         Decode luma only
    --mono-source        Treat the source as having no colour subcarrier
    --lines COUNT        Number of phase table lines to print
"#
    );
}

fn print_help() {
    print_version();
    print_usage();
}

fn check_bandwidth(name: &str, value: f32) -> Result<f32, Box<dyn Error + Send + Sync>> {
    if !(0.0..=MAX_BANDWIDTH).contains(&value) {
        return Err(format!("{name} can only accept value from 0 to {MAX_BANDWIDTH}").into());
    }
    Ok(value)
}

#[cfg(feature = "serde_support")]
fn load_config(path: &str) -> Result<DisplayConfig, Box<dyn Error + Send + Sync>> {
    let input = fs::read_to_string(path)?;
    Ok(serde_yaml::from_str::<DisplayConfig>(&input)?)
}

#[cfg(not(feature = "serde_support"))]
fn load_config(_path: &str) -> Result<DisplayConfig, Box<dyn Error + Send + Sync>> {
    Err("Loading a configuration requires the serde_support feature".into())
}

#[rustfmt::skip]
fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    let mut pargs = pico_args::Arguments::from_env();

    if pargs.contains(["-h", "--help"]) {
        print_help();
        return Ok(());
    }

    if pargs.contains(["-V", "--version"]) {
        print_version();
        return Ok(());
    }

    let mut config = match pargs.opt_value_from_str::<_, String>("--config")? {
        Some(path) => load_config(&path)?,
        None => DisplayConfig::default(),
    };

    let standard = pargs
        .opt_value_from_str::<_, VideoStandard>("--standard")?
        .unwrap_or_default();

    if let Some(decoder) = pargs.opt_value_from_str::<_, DecoderVariant>("--decoder")? {
        config.decoder = decoder;
    }

    if let Some(value) = pargs.opt_value_from_str::<_, f32>("--brightness")? {
        config.brightness = value;
    }

    if let Some(value) = pargs.opt_value_from_str::<_, f32>("--contrast")? {
        config.contrast = value;
    }

    if let Some(value) = pargs.opt_value_from_str::<_, f32>("--saturation")? {
        config.saturation = value;
    }

    if let Some(value) = pargs.opt_value_from_str::<_, f32>("--hue")? {
        config.hue = value;
    }

    if let Some(value) = pargs.opt_value_from_str::<_, f32>("--bandwidth")? {
        config.bandwidth = value;
    }

    if let Some(value) = pargs.opt_value_from_str::<_, f32>("--luma")? {
        config.luma_bandwidth = check_bandwidth("luma", value)?;
    }

    if let Some(value) = pargs.opt_value_from_str::<_, f32>("--chroma")? {
        config.chroma_bandwidth = check_bandwidth("chroma", value)?;
    }

    if pargs.contains("--white-only") {
        config.white_only = true;
    }

    let mut signal = match standard {
        VideoStandard::Ntsc => SourceSignalInfo::ntsc(),
        VideoStandard::Pal => SourceSignalInfo::pal(),
    };

    if pargs.contains("--mono-source") {
        signal = signal.monochrome();
    }

    let lines = pargs.opt_value_from_str::<_, usize>("--lines")?.unwrap_or(4);

    let remaining = pargs.finish();
    if !remaining.is_empty() {
        return Err(format!("Unknown arguments: {remaining:?}").into());
    }

    info!(%standard, decoder = %config.decoder, "Computing decoder parameters");

    let geometry = build_timing(&standard.constants());
    let params = recompute(&config, &signal)?;
    let table = build_phase_table(&geometry, &signal)?;

    let stdout = io::stdout();
    let mut output = stdout.lock();

    writeln!(output, "Standard:             {standard:>12}")?;
    writeln!(output, "Decoder:              {:>12}", config.decoder)?;
    writeln!(output, "Clock frequency:      {:>12.1} Hz", geometry.clock_frequency)?;
    writeln!(output, "Cycles per frame:     {:>12}", geometry.frame_cycle_num)?;
    writeln!(output, "Image size:           {:>7} x {:<4}", geometry.image_width, geometry.image_height)?;
    writeln!(output, "Image left:           {:>12}", geometry.image_left)?;
    writeln!(output, "Top left:             {:>7}, {:<4}", geometry.top_left.x, geometry.top_left.y)?;
    writeln!(output, "Top left 80 column:   {:>7}, {:<4}", geometry.top_left_80col.x, geometry.top_left_80col.y)?;
    writeln!(output, "Colour burst:         {:>12.6} rad", geometry.color_burst[0])?;
    writeln!(output, "Subcarrier:           {:>12.6} cycles/sample", params.subcarrier)?;

    writeln!(output)?;
    writeln!(output, "Lag        Luma     Chroma U     Chroma V")?;
    for (lag, taps) in params.kernels.uniforms().iter().enumerate() {
        writeln!(output, "c{lag}   {:>10.6}   {:>10.6}   {:>10.6}", taps[0], taps[1], taps[2])?;
    }

    writeln!(output)?;
    writeln!(output, "Decoder matrix")?;
    for row in 0..3 {
        let r = params.matrix.row(row);
        writeln!(output, "    {:>10.6} {:>10.6} {:>10.6}", r.x, r.y, r.z)?;
    }
    let offset = params.offset;
    writeln!(output, "Decoder offset")?;
    writeln!(output, "    {:>10.6} {:>10.6} {:>10.6}", offset.x, offset.y, offset.z)?;

    writeln!(output)?;
    writeln!(output, "Phase table ({} lines, {} allocated)", table.height(), table.len())?;
    for (y, entry) in table.entries().iter().take(lines.min(table.height())).enumerate() {
        writeln!(output, "    {y:>4}: {:>8.6} {}", entry.phase, entry.alternation)?;
    }

    Ok(())
}
