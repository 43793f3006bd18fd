pub mod composite;
pub mod config;
pub mod error;
pub mod filter;
pub mod frame;
pub mod matrix;
pub mod phase;
pub mod timing;

pub use config::{DecoderVariant, DisplayConfig, SourceSignalInfo};
pub use error::{Result, ScreenError};
pub use filter::{FilterKernel, KernelBank, Window};
pub use matrix::{DecodeParameters, recompute};
pub use phase::{PhaseEntry, PhaseTable, build_phase_table};
pub use timing::{ImageGeometry, VideoStandard, VideoStandardConstants, build_timing};

#[cfg(test)]
pub(crate) fn assert_close(left: f32, right: f32, tolerance: f32) {
    assert!(
        (left - right).abs() <= tolerance,
        "{left} and {right} differ by more than {tolerance}"
    );
}
