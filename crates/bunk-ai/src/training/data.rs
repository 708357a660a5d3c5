use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::prediction::PredictionInput;

/// One synthetic observation: the raw inputs plus whether bunking worked
/// out for this (simulated) student.
#[derive(Debug, Clone, Copy)]
pub struct LabeledSample {
    pub input: PredictionInput,
    pub safe_to_bunk: bool,
}

/// Seeded synthetic dataset for the binary classifier.
///
/// Attendance ~ Normal(75, 15) and past performance ~ Normal(70, 20), both
/// clipped to [0, 100]; syllabus completion ~ Beta(2, 2) scaled to 100; the
/// exam distance is exponentially skewed so most students sit far from
/// their next exam. Day counts are capped at 29 so no sample collides with
/// the no-exam sentinel (proximity 1.0), which the trained feature set
/// cannot encode anyway.
///
/// Labels come from an additive plausibility score over the same factors
/// the service reasons about, plus Gaussian noise, thresholded at 0.2.
pub fn generate_dataset(samples: usize, seed: u64) -> Vec<LabeledSample> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut dataset = Vec::with_capacity(samples);

    while dataset.len() < samples {
        let attendance = sample_normal(&mut rng, 75.0, 15.0).clamp(0.0, 100.0);
        let syllabus = sample_beta22(&mut rng) * 100.0;
        let performance = sample_normal(&mut rng, 70.0, 20.0).clamp(0.0, 100.0);

        let closeness = sample_exponential(&mut rng, 0.3).min(1.0);
        let days = (((1.0 - closeness) * 30.0).round() as u32).clamp(1, 29);
        let proximity = f64::from(days) / 30.0;

        let input = PredictionInput::new(attendance, proximity, syllabus, performance)
            .expect("generated sample stays inside the validated domain");

        let mut score = 0.0;

        if attendance >= 85.0 {
            score += 0.4;
        } else if attendance >= 75.0 {
            score += 0.2;
        } else if attendance < 65.0 {
            score -= 0.3;
        }

        if days >= 28 {
            score += 0.3;
        } else if days >= 22 {
            score += 0.1;
        } else if days <= 8 {
            score -= 0.4;
        }

        if syllabus >= 80.0 {
            score += 0.2;
        } else if syllabus >= 60.0 {
            score += 0.1;
        } else if syllabus < 40.0 {
            score -= 0.2;
        }

        if performance >= 85.0 {
            score += 0.1;
        } else if performance < 60.0 {
            score -= 0.1;
        }

        score += sample_normal(&mut rng, 0.0, 0.1);

        dataset.push(LabeledSample {
            input,
            safe_to_bunk: score > 0.2,
        });
    }

    dataset
}

/// Box-Muller transform over two uniform draws.
fn sample_normal(rng: &mut StdRng, mean: f64, std_dev: f64) -> f64 {
    let u1: f64 = rng.gen_range(f64::EPSILON..1.0);
    let u2: f64 = rng.gen();
    let radius = (-2.0 * u1.ln()).sqrt();
    mean + std_dev * radius * (std::f64::consts::TAU * u2).cos()
}

/// Beta(2, 2) as the median of three uniform draws.
fn sample_beta22(rng: &mut StdRng) -> f64 {
    let mut draws = [rng.gen::<f64>(), rng.gen::<f64>(), rng.gen::<f64>()];
    draws.sort_by(f64::total_cmp);
    draws[1]
}

fn sample_exponential(rng: &mut StdRng, scale: f64) -> f64 {
    let u: f64 = rng.gen_range(f64::EPSILON..1.0);
    -scale * u.ln()
}
