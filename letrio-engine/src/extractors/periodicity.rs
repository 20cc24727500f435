use letrio_db::models::{Draw, Position, DIGIT_COUNT};

use super::{digit_series, normalize_max, uniform, Signal, SignalExtractor, SignalKind};

/// Périodicité : régression linéaire des indices d'apparition d'un chiffre
/// (`index_k ≈ a + b·k`) pour estimer son cycle `b` et sa prochaine sortie.
/// Le score mesure l'alignement de cette sortie attendue avec le prochain tirage,
/// pondéré par la régularité du cycle, puis ramené à un maximum de 1.0.
pub struct PeriodicityExtractor {
    /// Cycle supposé quand un chiffre n'est apparu qu'une fois.
    nominal_cycle: f64,
    /// Régularité attribuée à un cycle supposé.
    nominal_regularity: f64,
}

impl Default for PeriodicityExtractor {
    fn default() -> Self {
        Self {
            nominal_cycle: DIGIT_COUNT as f64,
            nominal_regularity: 0.5,
        }
    }
}

/// Ajustement `y ≈ a + b·k` par moindres carrés sur k = 0..len.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CycleFit {
    pub intercept: f64,
    pub cycle: f64,
    pub residual_std: f64,
}

pub fn fit_cycle(occurrences: &[usize]) -> Option<CycleFit> {
    let m = occurrences.len();
    if m < 2 {
        return None;
    }

    let mf = m as f64;
    let k_mean = (mf - 1.0) / 2.0;
    let y_mean = occurrences.iter().sum::<usize>() as f64 / mf;

    let mut cov = 0.0f64;
    let mut var = 0.0f64;
    for (k, &y) in occurrences.iter().enumerate() {
        let dk = k as f64 - k_mean;
        cov += dk * (y as f64 - y_mean);
        var += dk * dk;
    }
    let cycle = cov / var;
    let intercept = y_mean - cycle * k_mean;

    let sse: f64 = occurrences
        .iter()
        .enumerate()
        .map(|(k, &y)| (y as f64 - (intercept + cycle * k as f64)).powi(2))
        .sum();

    Some(CycleFit {
        intercept,
        cycle,
        residual_std: (sse / mf).sqrt(),
    })
}

impl SignalExtractor for PeriodicityExtractor {
    fn kind(&self) -> SignalKind {
        SignalKind::Periodicity
    }

    fn name(&self) -> &str {
        "Periodicity"
    }

    fn score(&self, window: &[Draw], position: Position) -> Signal {
        let n = window.len();
        if n < 2 {
            return uniform();
        }

        let mut occurrences: Vec<Vec<usize>> = vec![Vec::new(); DIGIT_COUNT];
        for (t, d) in digit_series(window, position).into_iter().enumerate() {
            occurrences[d].push(t);
        }

        // Le prochain tirage porte l'indice n.
        let upcoming = n as f64;
        let mut scores = [0.0f64; DIGIT_COUNT];
        for (d, occ) in occurrences.iter().enumerate() {
            let (expected, cycle, regularity) = match (occ.as_slice(), fit_cycle(occ)) {
                ([], _) => continue,
                ([only], _) => (
                    *only as f64 + self.nominal_cycle,
                    self.nominal_cycle,
                    self.nominal_regularity,
                ),
                (_, Some(fit)) => {
                    let cycle = fit.cycle.max(1.0);
                    (
                        fit.intercept + fit.cycle * occ.len() as f64,
                        cycle,
                        1.0 / (1.0 + fit.residual_std / cycle),
                    )
                }
                (_, None) => continue,
            };
            let alignment = 1.0 / (1.0 + (expected - upcoming).abs() / cycle);
            scores[d] = alignment * regularity;
        }

        normalize_max(scores)
    }
}
