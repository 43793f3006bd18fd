//! Luminance bitmaps sampled at four times the colour subcarrier.
use crate::error::{Result, ScreenError};
use crate::timing::ImageGeometry;

/// Width of an Apple ][ double resolution screen in dots.
pub const SCREEN_WIDTH: usize = 560;
pub const SCREEN_HEIGHT: usize = 192;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LumaFrame {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl LumaFrame {
    pub fn new(width: usize, height: usize) -> Self {
        LumaFrame {
            width,
            height,
            data: vec![0; width * height],
        }
    }

    pub fn from_raw(width: usize, height: usize, data: Vec<u8>) -> Result<Self> {
        if data.len() != width * height {
            return Err(ScreenError::Dimension {
                left: data.len(),
                right: width * height,
            });
        }
        Ok(LumaFrame {
            width,
            height,
            data,
        })
    }

    /// Luminance of an RGBA image taken as the brightest of R, G and B.
    pub fn from_rgba(width: usize, height: usize, rgba: &[u8]) -> Result<Self> {
        if rgba.len() != 4 * width * height {
            return Err(ScreenError::Dimension {
                left: rgba.len(),
                right: 4 * width * height,
            });
        }
        let data = rgba
            .chunks_exact(4)
            .map(|pixel| pixel[0].max(pixel[1]).max(pixel[2]))
            .collect();
        Ok(LumaFrame {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn get(&self, x: usize, y: usize) -> Option<u8> {
        if x < self.width && y < self.height {
            Some(self.data[y * self.width + x])
        } else {
            None
        }
    }

    pub fn set(&mut self, x: usize, y: usize, value: u8) {
        if x < self.width && y < self.height {
            self.data[y * self.width + x] = value;
        }
    }

    fn row(&self, y: usize) -> &[u8] {
        &self.data[y * self.width..(y + 1) * self.width]
    }
}

/// Place a 560x192 screen into a black frame laid out per `geometry`.
///
/// Double hires and 80 column output start half a cell earlier.
pub fn compose_screen(screen: &LumaFrame, geometry: &ImageGeometry, dhgr: bool) -> Result<LumaFrame> {
    if screen.width != SCREEN_WIDTH || screen.height != SCREEN_HEIGHT {
        return Err(ScreenError::Dimension {
            left: screen.width * screen.height,
            right: SCREEN_WIDTH * SCREEN_HEIGHT,
        });
    }

    let mut frame = LumaFrame::new(geometry.image_width, geometry.image_height);
    let top_left = if dhgr {
        geometry.top_left_80col
    } else {
        geometry.top_left
    };

    for y in 0..screen.height {
        let dst_y = top_left.y as isize + y as isize;
        if dst_y < 0 || dst_y as usize >= frame.height {
            continue;
        }
        for (x, &value) in screen.row(y).iter().enumerate() {
            let dst_x = top_left.x as isize + x as isize;
            if dst_x < 0 {
                continue;
            }
            frame.set(dst_x as usize, dst_y as usize, value);
        }
    }
    Ok(frame)
}
