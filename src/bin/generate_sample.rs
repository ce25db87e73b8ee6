use std::path::PathBuf;

use anyhow::{Context, Result};

fn gaussian(x: f64, mu: f64, sigma: f64, amplitude: f64) -> f64 {
    amplitude * (-(x - mu).powi(2) / (2.0 * sigma.powi(2))).exp()
}

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5)).rotate_left(7).wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

/// Writes a synthetic line-scan file: `X  Y  wavenumber  intensity` rows,
/// one block per stage position, wavenumbers descending as the instrument
/// exports them.
fn main() -> Result<()> {
    let output_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("sample_linescan.txt"));
    let mut rng = SimpleRng::new(42);

    // Wavenumbers: 3200 → 164, step 4.
    let wavenumbers: Vec<f64> = (0..760).map(|i| 3200.0 - i as f64 * 4.0).collect();

    let xs: Vec<f64> = (0..8).map(|i| -2.0 + i as f64 * 0.5).collect();
    let ys: Vec<f64> = (0..6).map(|j| 1.0 + j as f64 * 0.5).collect();

    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .from_path(&output_path)
        .with_context(|| format!("creating {}", output_path.display()))?;

    let mut rows = 0usize;
    for &x in &xs {
        for &y in &ys {
            // A bead centred at (-0.25, 2.25): the 1001 band grows towards it,
            // the 2900 band stays roughly constant.
            let r2 = (x + 0.25).powi(2) + (y - 2.25).powi(2);
            let bead = (-r2 / 1.5).exp();
            let peaks = [(1001.0, 6.0, 40.0 * bead), (2904.0, 25.0, 8.0)];

            for &wn in &wavenumbers {
                let background = 5.0 + 0.002 * wn;
                let signal: f64 = peaks
                    .iter()
                    .map(|&(mu, sigma, amp)| gaussian(wn, mu, sigma, amp))
                    .sum();
                let intensity = background + signal + rng.gauss(0.0, 0.2);
                writer.write_record([x.to_string(), y.to_string(), wn.to_string(), intensity.to_string()])?;
                rows += 1;
            }
            for channel in 1..=3 {
                let wn = -(channel as f64) * 4.0;
                writer.write_record([x.to_string(), y.to_string(), wn.to_string(), "0".to_string()])?;
                rows += 1;
            }
        }
    }
    writer.flush()?;

    println!(
        "Wrote {} positions ({rows} rows) to {}",
        xs.len() * ys.len(),
        output_path.display()
    );
    Ok(())
}
