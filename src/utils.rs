//! Utility functions for the PUCT search
//!
//! This module contains the scalar formulas and vector helpers shared by
//! the tree, the driver and the diagnostics.

use rand::Rng;
use rand_distr::{Distribution, Gamma};

use crate::{MCTSError, Result};

/// Calculates the PUCT exploration bonus of a single move
///
/// ```text
/// U = C * sqrt(max(1, parent_visits)) * prior / (1 + child_visits)
/// ```
pub fn exploration_bonus(
    exploration_constant: f64,
    parent_visits: u32,
    prior: f64,
    child_visits: u32,
) -> f64 {
    exploration_constant * (parent_visits.max(1) as f64).sqrt() * prior
        / (1.0 + child_visits as f64)
}

/// Index of the largest value, lowest index on ties
pub fn argmax(values: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &v) in values.iter().enumerate() {
        match best {
            Some((_, b)) if v <= b => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}

/// Index of the smallest value, lowest index on ties
pub fn argmin(values: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &v) in values.iter().enumerate() {
        match best {
            Some((_, b)) if v >= b => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}

/// Divides every entry by the total, failing when the total is zero
pub fn normalize(values: &[f64]) -> Result<Vec<f64>> {
    let total: f64 = values.iter().sum();
    if total <= 0.0 {
        return Err(MCTSError::NoVisits);
    }
    Ok(values.iter().map(|v| v / total).collect())
}

/// Draws a symmetric Dirichlet sample of dimension `n`
///
/// Built from independent `Gamma(alpha, 1)` draws normalized to sum 1.
pub fn dirichlet_sample<R: Rng + ?Sized>(n: usize, alpha: f64, rng: &mut R) -> Result<Vec<f64>> {
    let gamma = Gamma::new(alpha, 1.0).map_err(|e| MCTSError::Noise(e.to_string()))?;
    let mut samples: Vec<f64> = (0..n).map(|_| gamma.sample(rng)).collect();

    let sum: f64 = samples.iter().sum();
    if sum > 0.0 {
        for s in &mut samples {
            *s /= sum;
        }
    } else if n > 0 {
        // every draw underflowed to zero; fall back to the distribution's mean
        samples.iter_mut().for_each(|s| *s = 1.0 / n as f64);
    }

    Ok(samples)
}

/// Samples an index with probability proportional to its weight
pub fn sample_index<R: Rng + ?Sized>(weights: &[f64], rng: &mut R) -> Option<usize> {
    let total: f64 = weights.iter().sum();
    if total <= 0.0 {
        return None;
    }

    let r: f64 = rng.gen_range(0.0..total);
    let mut cumulative = 0.0;
    for (i, &w) in weights.iter().enumerate() {
        cumulative += w;
        if r < cumulative {
            return Some(i);
        }
    }

    // rounding left r past the last bucket
    weights.iter().rposition(|&w| w > 0.0)
}
