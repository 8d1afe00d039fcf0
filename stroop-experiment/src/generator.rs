//! Trial lists and counterbalancing.
//!
//! Main-study blocks mix a sampled Stroop portion with a complete color-block
//! portion. The Stroop portion is drawn without replacement from the full
//! condition set replicated several times, which gives near-uniform (not
//! exactly balanced) condition frequencies.

use crate::config::{DetectionConfig, StroopConfig};
use crate::error::{ExperimentError, Result};
use rand::Rng;
use rand::seq::{IndexedRandom, SliceRandom, index};
use stroop_core::{
    Condition, DetectionSpec, InkColor, PrimeType, StroopType, TrialSpec, TrialType,
};

pub const MASK_CONSONANTS: &[u8] = b"BCDFGHJKLMNPQRSTVWXYZ";

const PRACTICE_CONDITIONS: [Condition; 5] = [
    Condition {
        trial_type: TrialType::Stroop,
        prime_type: PrimeType::Neutral,
        stroop_type: StroopType::Congruent,
        color: InkColor::Green,
    },
    Condition {
        trial_type: TrialType::Stroop,
        prime_type: PrimeType::Neutral,
        stroop_type: StroopType::Incongruent,
        color: InkColor::Red,
    },
    Condition {
        trial_type: TrialType::ColorBlock,
        prime_type: PrimeType::Neutral,
        stroop_type: StroopType::Congruent,
        color: InkColor::Green,
    },
    Condition {
        trial_type: TrialType::Stroop,
        prime_type: PrimeType::Neutral,
        stroop_type: StroopType::Congruent,
        color: InkColor::Red,
    },
    Condition {
        trial_type: TrialType::ColorBlock,
        prime_type: PrimeType::Neutral,
        stroop_type: StroopType::Congruent,
        color: InkColor::Red,
    },
];

/// 5–6 random upper-case consonants
pub fn random_mask<R: Rng + ?Sized>(rng: &mut R) -> String {
    let len = rng.random_range(5..=6);
    (0..len)
        .map(|_| MASK_CONSONANTS[rng.random_range(0..MASK_CONSONANTS.len())] as char)
        .collect()
}

/// `len` random upper-case letters A–Z
pub fn random_letters<R: Rng + ?Sized>(rng: &mut R, len: usize) -> String {
    (0..len)
        .map(|_| (b'A' + rng.random_range(0..26u8)) as char)
        .collect()
}

/// prime × stroop × color, in that nesting order
pub fn stroop_conditions() -> Vec<Condition> {
    let mut out = Vec::with_capacity(12);
    for prime in PrimeType::ALL {
        for stroop in StroopType::ALL {
            for color in InkColor::ALL {
                out.push(Condition::new(TrialType::Stroop, prime, stroop, color));
            }
        }
    }
    out
}

/// prime × color, stroop type fixed to congruent
pub fn color_block_conditions() -> Vec<Condition> {
    let mut out = Vec::with_capacity(6);
    for prime in PrimeType::ALL {
        for color in InkColor::ALL {
            out.push(Condition::new(
                TrialType::ColorBlock,
                prime,
                StroopType::Congruent,
                color,
            ));
        }
    }
    out
}

fn replicate(conditions: &[Condition], times: usize) -> Vec<Condition> {
    let mut pool = Vec::with_capacity(conditions.len() * times);
    for _ in 0..times {
        pool.extend_from_slice(conditions);
    }
    pool
}

/// Draws `amount` conditions without replacement from the replicated Stroop pool
pub fn sample_stroop_conditions<R: Rng + ?Sized>(
    config: &StroopConfig,
    rng: &mut R,
) -> Result<Vec<Condition>> {
    let pool = replicate(&stroop_conditions(), config.stroop_replication);
    let amount = config.stroop_sample_size;
    if amount > pool.len() {
        return Err(ExperimentError::SampleExceedsPool {
            requested: amount,
            available: pool.len(),
        });
    }
    Ok(index::sample(rng, pool.len(), amount)
        .into_iter()
        .map(|i| pool[i])
        .collect())
}

/// The fixed practice list, shuffled once
pub fn generate_practice_trials<R: Rng + ?Sized>(rng: &mut R) -> Vec<TrialSpec> {
    let mut conditions = PRACTICE_CONDITIONS;
    conditions.shuffle(rng);
    conditions
        .into_iter()
        .enumerate()
        .map(|(i, c)| TrialSpec::from_condition(c, 0, i as u32 + 1, true))
        .collect()
}

/// One main-study block: sampled Stroop trials plus every replicated
/// color-block trial, interleaved by a full shuffle
pub fn generate_block_trials<R: Rng + ?Sized>(
    block_num: u32,
    config: &StroopConfig,
    rng: &mut R,
) -> Result<Vec<TrialSpec>> {
    let mut conditions = sample_stroop_conditions(config, rng)?;
    conditions.extend(replicate(
        &color_block_conditions(),
        config.color_block_replication,
    ));
    conditions.shuffle(rng);

    Ok(conditions
        .into_iter()
        .enumerate()
        .map(|(i, c)| TrialSpec::from_condition(c, block_num, i as u32 + 1, false))
        .collect())
}

/// Every duration × `trials_per_duration` with a random prime word, shuffled
/// and cut into consecutive blocks
pub fn generate_detection_blocks<R: Rng + ?Sized>(
    config: &DetectionConfig,
    rng: &mut R,
) -> Result<Vec<Vec<DetectionSpec>>> {
    config.validate()?;

    let mut pool: Vec<(u64, InkColor)> = Vec::with_capacity(config.pool_size());
    for &duration_ms in &config.durations_ms {
        for _ in 0..config.trials_per_duration {
            let prime = *InkColor::ALL.choose(rng).unwrap_or(&InkColor::Green);
            pool.push((duration_ms, prime));
        }
    }
    pool.shuffle(rng);

    Ok(pool
        .chunks(config.trials_per_block)
        .take(config.blocks as usize)
        .enumerate()
        .map(|(b, chunk)| {
            chunk
                .iter()
                .enumerate()
                .map(|(t, &(duration_ms, prime))| DetectionSpec {
                    block_num: b as u32 + 1,
                    trial_num: t as u32 + 1,
                    duration_ms,
                    prime,
                })
                .collect()
        })
        .collect())
}
