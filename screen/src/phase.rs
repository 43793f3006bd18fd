use tracing::debug;

use crate::config::SourceSignalInfo;
use crate::error::Result;
use crate::timing::ImageGeometry;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PhaseEntry {
    /// Colour burst phase in turns, in [0, 1)
    pub phase: f32,
    pub alternation: u8,
}

impl PhaseEntry {
    /// Sign applied to the second chroma axis on this line.
    pub fn alternation_sign(&self) -> f32 {
        1.0 - 2.0 * self.alternation as f32
    }
}

/// Per scanline colour burst phase, padded to a power of two height.
#[derive(Debug, Clone, PartialEq)]
pub struct PhaseTable {
    height: usize,
    entries: Vec<PhaseEntry>,
}

impl PhaseTable {
    /// Scanlines carrying valid entries.
    pub fn height(&self) -> usize {
        self.height
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[PhaseEntry] {
        &self.entries
    }

    pub fn get(&self, y: usize) -> Option<&PhaseEntry> {
        self.entries.get(y)
    }

    /// One RGB float texel per line: phase, alternation, unused.
    pub fn texels(&self) -> Vec<f32> {
        let mut data = vec![0.0; 3 * self.entries.len()];
        for (texel, entry) in data.chunks_exact_mut(3).zip(self.entries.iter()) {
            texel[0] = entry.phase;
            texel[1] = entry.alternation as f32;
        }
        data
    }
}

pub fn build_phase_table_for_height(height: usize, signal: &SourceSignalInfo) -> Result<PhaseTable> {
    signal.validate()?;

    let color_burst = &signal.color_burst;
    let phase_alternation = &signal.phase_alternation;
    let mut entries = vec![PhaseEntry::default(); height.next_power_of_two()];

    for (y, entry) in entries.iter_mut().take(height).enumerate() {
        let c = color_burst[y % color_burst.len()] as f64 / (2.0 * std::f64::consts::PI);
        entry.phase = (c - c.floor()) as f32;
        entry.alternation = phase_alternation[y % phase_alternation.len()] as u8;
    }

    debug!(height, texture_height = entries.len(), "Phase table");

    Ok(PhaseTable { height, entries })
}

pub fn build_phase_table(geometry: &ImageGeometry, signal: &SourceSignalInfo) -> Result<PhaseTable> {
    build_phase_table_for_height(geometry.image_height, signal)
}
