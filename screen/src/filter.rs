/** Window design for the composite decoder low-pass filters.
 *
 *  Portion of this code is derived from Zellyn Hunter
 *  https://observablehq.com/@zellyn/apple-ii-ntsc-emulation-openemulator-explainer
 *
 *  Chebyshev window based on ideas at http://www.dsprelated.com/showarticle/42.php
 */
use crate::error::{Result, ScreenError};

/// Taps of the symmetric FIR filter applied by the decoder.
pub const WINDOW_LENGTH: usize = 17;

/// Taps exported per kernel, lags 0 to 8.
pub const KERNEL_TAPS: usize = WINDOW_LENGTH / 2 + 1;

const CHEBYSHEV_SIDELOBE_DB: f64 = 50.0;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Window {
    data: Vec<f32>,
}

impl Window {
    pub fn new(n: usize) -> Self {
        Window { data: vec![0.0; n] }
    }

    pub fn from_vec(data: Vec<f32>) -> Self {
        Window { data }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    pub fn into_vec(self) -> Vec<f32> {
        self.data
    }

    /// Scale to unity DC gain.
    pub fn normalize(&self) -> Result<Window> {
        let sum = self.data.iter().fold(0.0, |acc, &value| acc + value);
        if sum == 0.0 || !sum.is_finite() {
            return Err(ScreenError::Numeric(format!(
                "Cannot normalize window with sum {sum}"
            )));
        }
        Ok(self.scale(1.0 / sum))
    }

    pub fn scale(&self, factor: f32) -> Window {
        Window {
            data: self.data.iter().map(|value| value * factor).collect(),
        }
    }

    pub fn elementwise_multiply(&self, other: &Window) -> Result<Window> {
        if self.len() != other.len() {
            return Err(ScreenError::Dimension {
                left: self.len(),
                right: other.len(),
            });
        }
        Ok(Window {
            data: self
                .data
                .iter()
                .zip(other.data.iter())
                .map(|(a, b)| a * b)
                .collect(),
        })
    }

    /// Truncate or zero pad to `n` elements.
    pub fn resize(&self, n: usize) -> Window {
        let mut data = vec![0.0; n];
        let len = usize::min(n, self.len());
        data[..len].copy_from_slice(&self.data[..len]);
        Window { data }
    }

    pub fn real_idft(&self) -> Window {
        let size = self.len();
        let mut w = vec![0.0; size];

        for (i, v) in w.iter_mut().enumerate() {
            let omega = 2.0 * std::f64::consts::PI * i as f64 / size as f64;
            let sum = self
                .data
                .iter()
                .enumerate()
                .fold(0.0, |acc, (j, &value)| {
                    acc + value as f64 * f64::cos(j as f64 * omega)
                });
            *v = (sum / size as f64) as f32;
        }
        Window { data: w }
    }

    fn max_abs(&self) -> f32 {
        self.data
            .iter()
            .fold(0.0, |max, value| f32::max(max, value.abs()))
    }

    /// Dolph-Chebyshev window of `n` taps, peak normalized to 1.
    pub fn chebyshev(n: usize, sidelobe_db: f64) -> Result<Window> {
        if n < 2 {
            return Err(ScreenError::Configuration(format!(
                "Chebyshev window needs at least 2 taps, got {n}"
            )));
        }

        let m = n - 1;
        let alpha = f64::cosh(f64::acosh(f64::powf(10.0, sidelobe_db / 20.0)) / m as f64);
        let mut w = Window::new(m);
        for (i, v) in w.data.iter_mut().enumerate() {
            let a = f64::abs(alpha * f64::cos(std::f64::consts::PI * i as f64 / m as f64));
            let sign = if i % 2 == 0 { 1.0 } else { -1.0 };
            let value = if a > 1.0 {
                f64::cosh(m as f64 * f64::acosh(a))
            } else {
                f64::cos(m as f64 * f64::acos(a))
            };
            *v = (sign * value) as f32;
        }

        let mut w = w.real_idft().resize(n);

        // Fold the spectrum so both ends carry half the DC term
        w.data[0] /= 2.0;
        w.data[n - 1] = w.data[0];

        let max = w.max_abs();
        if max == 0.0 || !max.is_finite() {
            return Err(ScreenError::Numeric(format!(
                "Chebyshev window has invalid peak {max}"
            )));
        }
        Ok(Window {
            data: w.data.iter().map(|value| value / max).collect(),
        })
    }

    /// Sinc low-pass window of `n` taps with cutoff `fc` in cycles per sample.
    pub fn lanczos(n: usize, fc: f32) -> Window {
        let fc = f32::min(fc, 0.5) as f64;
        let half_n = (n / 2) as f64;
        let data = (0..n)
            .map(|i| {
                let x = 2.0 * std::f64::consts::PI * fc * (i as f64 - half_n);
                if x == 0.0 { 1.0 } else { (f64::sin(x) / x) as f32 }
            })
            .collect();
        Window { data }
    }
}

/// Non-negative lag half of a 17 tap symmetric FIR filter.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FilterKernel([f32; KERNEL_TAPS]);

impl FilterKernel {
    pub fn from_window(window: &Window) -> Result<Self> {
        if window.len() != WINDOW_LENGTH {
            return Err(ScreenError::Dimension {
                left: window.len(),
                right: WINDOW_LENGTH,
            });
        }
        let mut taps = [0.0; KERNEL_TAPS];
        taps.copy_from_slice(&window.as_slice()[KERNEL_TAPS - 1..]);
        Ok(FilterKernel(taps))
    }

    pub fn taps(&self) -> &[f32; KERNEL_TAPS] {
        &self.0
    }

    /// Weight at `lag`, mirrored for negative lags.
    pub fn tap(&self, lag: isize) -> f32 {
        self.0.get(lag.unsigned_abs()).copied().unwrap_or(0.0)
    }

    /// Gain at DC of the full symmetric filter.
    pub fn dc_gain(&self) -> f32 {
        self.0[0] + 2.0 * self.0[1..].iter().sum::<f32>()
    }
}

/// Luma and chroma cutoffs as fractions of the sample rate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bandwidths {
    pub luma: f32,
    pub chroma_u: f32,
    pub chroma_v: f32,
}

impl Bandwidths {
    pub fn uniform(fraction: f32) -> Self {
        Bandwidths {
            luma: fraction,
            chroma_u: fraction,
            chroma_v: fraction,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct KernelBank {
    pub luma: FilterKernel,
    pub chroma_u: FilterKernel,
    pub chroma_v: FilterKernel,
}

fn base_window() -> Result<Window> {
    Window::chebyshev(WINDOW_LENGTH, CHEBYSHEV_SIDELOBE_DB)?.normalize()
}

fn lowpass(base: &Window, fc: f32) -> Result<Window> {
    base.elementwise_multiply(&Window::lanczos(WINDOW_LENGTH, fc))?
        .normalize()
}

impl KernelBank {
    /// Kernels for a composite decoder. Chroma gains are doubled since only
    /// one sideband survives demodulation.
    pub fn composite(bandwidths: &Bandwidths) -> Result<Self> {
        let w = base_window()?;
        let wy = lowpass(&w, bandwidths.luma)?;
        let wu = lowpass(&w, bandwidths.chroma_u)?.scale(2.0);
        let wv = lowpass(&w, bandwidths.chroma_v)?.scale(2.0);

        Ok(KernelBank {
            luma: FilterKernel::from_window(&wy)?,
            chroma_u: FilterKernel::from_window(&wu)?,
            chroma_v: FilterKernel::from_window(&wv)?,
        })
    }

    /// Same low-pass on all three channels, for RGB input.
    pub fn rgb(fraction: f32) -> Result<Self> {
        let w = base_window()?;
        let kernel = FilterKernel::from_window(&lowpass(&w, fraction)?)?;

        Ok(KernelBank {
            luma: kernel,
            chroma_u: kernel,
            chroma_v: kernel,
        })
    }

    /// Per lag (luma, u, v) triples, the layout of the c0..c8 shader uniforms.
    pub fn uniforms(&self) -> [[f32; 3]; KERNEL_TAPS] {
        let mut out = [[0.0; 3]; KERNEL_TAPS];
        for (i, v) in out.iter_mut().enumerate() {
            *v = [
                self.luma.taps()[i],
                self.chroma_u.taps()[i],
                self.chroma_v.taps()[i],
            ];
        }
        out
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::assert_close;

    #[test]
    fn chebyshev_window_shape() {
        let w = Window::chebyshev(17, 50.0).unwrap();
        assert_eq!(w.len(), 17);
        assert_eq!(w.max_abs(), 1.0);
        let data = w.as_slice();
        for i in 0..17 {
            assert_close(data[i], data[16 - i], 1e-5);
        }
        // Peak sits at the centre tap
        assert_close(data[8], 1.0, 1e-6);
        assert!(data[0] > 0.0 && data[0] < data[1]);
    }

    #[test]
    fn normalized_chebyshev_is_symmetric() {
        let w = Window::chebyshev(17, 50.0).unwrap().normalize().unwrap();
        let data = w.as_slice();
        assert_eq!(data.len(), 17);
        assert_close(data.iter().sum::<f32>(), 1.0, 1e-5);
        for i in 0..17 {
            assert_close(data[i], data[16 - i], 1e-5);
        }
    }

    #[test]
    fn chebyshev_rejects_degenerate_length() {
        assert!(matches!(
            Window::chebyshev(1, 50.0),
            Err(ScreenError::Configuration(_))
        ));
    }

    #[test]
    fn lanczos_window_shape() {
        for (n, fc) in [(17, 0.1397), (9, 0.3), (17, 0.9)] {
            let w = Window::lanczos(n, fc);
            let data = w.as_slice();
            assert_eq!(data[n / 2], 1.0);
            for i in 0..n {
                assert_eq!(data[i], data[n - 1 - i]);
            }
        }
    }

    #[test]
    fn lanczos_tap_is_sinc() {
        let fc = 2_000_000.0 / 14_318_180.0;
        let w = Window::lanczos(17, fc);
        let x = 2.0 * std::f64::consts::PI * fc as f64;
        assert_close(w.as_slice()[9], (x.sin() / x) as f32, 1e-5);
        assert_close(w.as_slice()[9], 0.876_476, 1e-5);
    }

    #[test]
    fn lanczos_clamps_cutoff() {
        assert_eq!(Window::lanczos(17, 0.8), Window::lanczos(17, 0.5));
    }

    #[test]
    fn normalize_to_unity_gain() {
        let w = Window::from_vec(vec![1.0, 1.0, 1.0, 1.0]).normalize().unwrap();
        assert_eq!(w.as_slice(), &[0.25, 0.25, 0.25, 0.25]);
    }

    #[test]
    fn normalize_zero_sum_fails() {
        let w = Window::from_vec(vec![1.0, -1.0]);
        assert!(matches!(w.normalize(), Err(ScreenError::Numeric(_))));
        assert!(matches!(Window::new(3).normalize(), Err(ScreenError::Numeric(_))));
    }

    #[test]
    fn multiply_and_scale() {
        let a = Window::from_vec(vec![1.0, 2.0, 3.0]);
        let b = Window::from_vec(vec![2.0, 0.5, -1.0]);
        assert_eq!(a.elementwise_multiply(&b).unwrap().as_slice(), &[2.0, 1.0, -3.0]);
        assert_eq!(a.scale(2.0).as_slice(), &[2.0, 4.0, 6.0]);
        assert_eq!(
            a.elementwise_multiply(&Window::new(2)),
            Err(ScreenError::Dimension { left: 3, right: 2 })
        );
    }

    #[test]
    fn resize_pads_and_truncates() {
        let a = Window::from_vec(vec![1.0, 2.0, 3.0]);
        assert_eq!(a.resize(5).as_slice(), &[1.0, 2.0, 3.0, 0.0, 0.0]);
        assert_eq!(a.resize(2).as_slice(), &[1.0, 2.0]);
    }

    #[test]
    fn real_idft_of_impulse_is_flat() {
        let mut impulse = Window::new(4);
        impulse.data[0] = 4.0;
        assert_eq!(impulse.real_idft().as_slice(), &[1.0, 1.0, 1.0, 1.0]);
    }

    #[test]
    fn composite_kernels() {
        let bank = KernelBank::composite(&Bandwidths {
            luma: 0.1397,
            chroma_u: 0.0419,
            chroma_v: 0.0419,
        })
        .unwrap();
        assert_close(bank.luma.dc_gain(), 1.0, 1e-5);
        assert_close(bank.chroma_u.dc_gain(), 2.0, 1e-5);
        assert_close(bank.chroma_v.dc_gain(), 2.0, 1e-5);
        assert_eq!(bank.chroma_u, bank.chroma_v);
        assert_eq!(bank.luma.tap(-3), bank.luma.tap(3));
        assert_eq!(bank.luma.tap(9), 0.0);
        // Narrower chroma band puts relatively more weight off centre
        assert!(bank.chroma_u.taps()[0] / 2.0 < bank.luma.taps()[0]);
    }

    #[test]
    fn rgb_kernels_share_luma() {
        let bank = KernelBank::rgb(1.0).unwrap();
        assert_eq!(bank.luma, bank.chroma_u);
        assert_eq!(bank.luma, bank.chroma_v);
        assert_close(bank.luma.dc_gain(), 1.0, 1e-5);
        let uniforms = bank.uniforms();
        assert_eq!(uniforms[0][0], bank.luma.taps()[0]);
        assert_eq!(uniforms[8][2], bank.chroma_v.taps()[8]);
    }

    #[test]
    fn kernel_from_wrong_length_fails() {
        assert_eq!(
            FilterKernel::from_window(&Window::new(9)),
            Err(ScreenError::Dimension { left: 9, right: 17 })
        );
    }
}
