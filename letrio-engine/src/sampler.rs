use chrono::Datelike;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Seed déterministe basé sur la date du jour (YYYYMMDD).
pub fn date_seed() -> u64 {
    let today = chrono::Local::now().date_naive();
    today.year() as u64 * 10_000 + today.month() as u64 * 100 + today.day() as u64
}

/// Génère `count` tirages uniformes `[centaines, dizaines, unités]`.
/// Les périodes sont attribuées à l'ingestion, d'après la prédiction en attente.
pub fn generate_sample_digits(count: usize, seed: u64) -> Vec<[u8; 3]> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            [
                rng.random_range(0..10),
                rng.random_range(0..10),
                rng.random_range(0..10),
            ]
        })
        .collect()
}
