use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

/// Write a deterministic groundwater sample table with messy headers.
#[derive(Parser, Debug)]
struct Args {
    #[arg(short, long, default_value = "sample_data.csv")]
    output: PathBuf,
    #[arg(long, default_value_t = 60)]
    rows: usize,
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

    /// Log-normal draw, for concentrations spanning orders of magnitude.
    fn log_normal(&mut self, median: f64, spread: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        median * (spread * z).exp()
    }
}

/// Permissible limits in mg/L used to grade the synthetic index.
const METALS: [(&str, f64, f64); 6] = [
    ("As", 0.01, 0.004),
    ("cd", 0.003, 0.001),
    ("Cr", 0.05, 0.02),
    ("PB", 0.01, 0.006),
    ("Fe", 0.3, 0.2),
    ("zn", 5.0, 1.5),
];

fn level_for(hmpi: f64) -> &'static str {
    match hmpi {
        h if h < 25.0 => "Perfect",
        h if h < 50.0 => "Good",
        h if h < 75.0 => "Moderate",
        h if h < 100.0 => "Poor",
        h if h < 150.0 => "Very Poor",
        _ => "Extremely Poor",
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let mut rng = SimpleRng::new(42);

    let mut writer = csv::Writer::from_path(&args.output)
        .with_context(|| format!("creating {}", args.output.display()))?;

    let mut header = vec!["Station Name", " Lat ", "LONGITUDE"];
    header.extend(METALS.iter().map(|(name, _, _)| *name));
    header.extend(["HMPI", "Pollution Level", "Remarks"]);
    writer.write_record(&header)?;

    for i in 0..args.rows {
        // Scatter around Bengaluru.
        let lat = 12.95 + (rng.next_f64() - 0.5) * 0.4;
        let lon = 77.59 + (rng.next_f64() - 0.5) * 0.4;

        let mut record = vec![
            format!("Well {:03}", i + 1),
            format!("{lat:.5}"),
            format!("{lon:.5}"),
        ];
        let mut hmpi = 0.0;
        for (_, limit, median) in METALS {
            let conc = rng.log_normal(median, 0.8);
            hmpi += conc / limit * 100.0 / METALS.len() as f64;
            // A few lab "below detection limit" markers.
            if rng.next_f64() < 0.05 {
                record.push("BDL".to_string());
            } else {
                record.push(format!("{conc:.4}"));
            }
        }
        // Occasional broken coordinates to exercise the filters.
        if rng.next_f64() < 0.03 {
            record[1] = "not recorded".to_string();
        }
        record.push(format!("{hmpi:.2}"));
        record.push(level_for(hmpi).to_string());
        record.push(String::new());
        writer.write_record(&record)?;
    }
    writer.flush()?;

    println!("Wrote {} samples to {}", args.rows, args.output.display());
    Ok(())
}
