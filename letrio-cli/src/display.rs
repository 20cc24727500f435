use comfy_table::{presets::UTF8_FULL, Cell, Color, ContentArrangement, Table};
use textplots::Plot;

use crate::import::ImportResult;
use crate::session::BatchResult;
use letrio_db::models::{Draw, Position, Prediction, Statistics, Validation, HIT_TOP_K};
use letrio_engine::backtest::BacktestResult;
use letrio_engine::extractors::SignalKind;
use letrio_engine::report::{BasicFeatures, FeatureMatrix};
use letrio_engine::{IngestOutcome, Weights, WindowSize};

/// Nombre de validations affichées par défaut.
pub const RECENT_VALIDATIONS: usize = 10;

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn hit_marker(hit: bool) -> Cell {
    if hit {
        Cell::new("中").fg(Color::Green)
    } else {
        Cell::new("挂").fg(Color::Red)
    }
}

fn top_digits(prediction: &Prediction, position: Position) -> String {
    prediction
        .position(position)
        .top_digits(HIT_TOP_K)
        .iter()
        .map(|d| d.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

/// `draws` : le plus récent en premier.
pub fn display_draws(draws: &[Draw]) {
    if draws.is_empty() {
        println!("Aucun tirage à afficher.");
        return;
    }

    let mut table = new_table();
    table.set_header(vec!["#", "Période", "Heure", "Tirage", "Somme", "Écart"]);

    for draw in draws {
        table.add_row(vec![
            draw.id.to_string(),
            draw.period.to_string(),
            draw.period.display_label(),
            draw.to_string(),
            draw.sum().to_string(),
            draw.span().to_string(),
        ]);
    }

    println!("{table}");
}

pub fn display_prediction(prediction: &Prediction) {
    println!("\n🎯 Prédiction pour la période {} ({})\n",
        prediction.period, prediction.period.display_label());

    let mut table = new_table();
    let mut header = vec!["Position".to_string()];
    header.extend((1..=10).map(|i| format!("{i}")));
    table.set_header(header);

    for position in Position::ALL {
        let mut row = vec![Cell::new(position.label())];
        for (i, entry) in prediction.position(position).entries().iter().enumerate() {
            let cell = Cell::new(format!("{} ({:.1}%)", entry.digit, entry.probability));
            row.push(if i < HIT_TOP_K { cell.fg(Color::Green) } else { cell });
        }
        table.add_row(row);
    }
    println!("{table}");
}

pub fn display_outcome(outcome: &IngestOutcome) {
    println!("Tirage {} ({}) : {}",
        outcome.draw.period, outcome.draw.period.short_label(), outcome.draw);

    if let Some(v) = &outcome.validation {
        let markers: Vec<&str> = Position::ALL
            .iter()
            .map(|&p| if v.hit(p) { "中" } else { "挂" })
            .collect();
        println!("  Validation : {} → {}", markers.join(" "),
            if v.is_hit() { "touché" } else { "manqué" });
    }

    let tops: Vec<String> = Position::ALL
        .iter()
        .map(|&p| format!("{} [{}]", p.label(), top_digits(&outcome.prediction, p)))
        .collect();
    println!("  Prochaine période {} : {}", outcome.prediction.period, tops.join("  "));
}

pub fn display_batch_summary(result: &BatchResult) {
    let validated = result.outcomes.iter().filter(|o| o.validation.is_some()).count();
    println!("  Tirages ingérés   : {}", result.outcomes.len());
    println!("  Validations       : {}", validated);
    if !result.rejected.is_empty() {
        println!("  Refusés           : {}", result.rejected.len());
        for (draw, reason) in &result.rejected {
            println!("    {} : {}", draw.period, reason);
        }
    }
}

pub fn display_import_summary(import: &ImportResult, batch: &BatchResult) {
    println!("Import terminé :");
    println!("  Total lignes lues : {}", import.total_records);
    if import.errors > 0 {
        println!("  Erreurs           : {}", import.errors);
    }
    display_batch_summary(batch);
}

/// Les `last` validations les plus récentes, la plus récente en premier.
pub fn display_validations(validations: &[Validation], last: usize) {
    if validations.is_empty() {
        println!("Aucune validation pour l'instant.");
        return;
    }

    let mut table = new_table();
    table.set_header(vec!["Période", "Réel", "Centaines", "Dizaines", "Unités", "Résultat"]);

    for v in validations.iter().rev().take(last) {
        let mut row = vec![
            Cell::new(v.period.short_label()),
            Cell::new(format!("{}{}{}", v.actual_hundred, v.actual_ten, v.actual_one)),
        ];
        for position in Position::ALL {
            let text = format!("{} {}", top_digits(&v.prediction, position),
                if v.hit(position) { "中" } else { "挂" });
            let cell = Cell::new(text);
            row.push(if v.hit(position) { cell.fg(Color::Green) } else { cell });
        }
        row.push(hit_marker(v.is_hit()));
        table.add_row(row);
    }
    println!("{table}");
}

pub fn display_statistics(stats: &Statistics, window: WindowSize) {
    println!("\n📊 Statistiques (fenêtre {} tirages)\n", window);

    let mut table = new_table();
    table.set_header(vec!["Indicateur", "Valeur"]);
    table.add_row(vec!["Précision globale".to_string(), format!("{}%", stats.overall_accuracy)]);
    table.add_row(vec!["Série en cours".to_string(), stats.current_streak.to_string()]);
    table.add_row(vec!["Meilleure série".to_string(), stats.longest_streak.to_string()]);
    table.add_row(vec!["Validations".to_string(), stats.total.to_string()]);
    table.add_row(vec!["Touchés".to_string(), stats.hits.to_string()]);
    for (position, hits) in Position::ALL.iter().zip([stats.hundred_hits, stats.ten_hits, stats.one_hits]) {
        table.add_row(vec![format!("Touchés {}", position.label()), hits.to_string()]);
    }
    println!("{table}");
}

pub fn display_feature_matrix(matrix: &FeatureMatrix) {
    println!("\n── {} ({} tirages) ──", matrix.position.label(), matrix.window_len);

    let mut table = new_table();
    let mut header = vec!["Rang".to_string(), "Chiffre".to_string(), "Sorties".to_string(), "Retard".to_string()];
    header.extend(SignalKind::ALL.iter().map(|k| k.to_string()));
    header.push("Composite".to_string());
    table.set_header(header);

    for row in matrix.ranked() {
        let mut cells = vec![
            row.rank.to_string(),
            row.digit.to_string(),
            row.count.to_string(),
            row.gap.to_string(),
        ];
        cells.extend(row.signals.iter().map(|(_, s)| format!("{:.3}", s)));
        cells.push(format!("{:.4}", row.composite));
        table.add_row(cells);
    }
    println!("{table}");
}

pub fn display_basic_features(features: &BasicFeatures) {
    println!("\n── Caractéristiques de base ({} tirages) ──", features.draws.len());

    let mut table = new_table();
    table.set_header(vec!["Période", "Tirage", "和值 Somme", "跨度 Écart", "Impair/Pair", "Grand/Petit"]);
    for f in features.draws.iter().rev() {
        table.add_row(vec![
            f.period.short_label(),
            f.digits.iter().map(|d| d.to_string()).collect::<String>(),
            f.sum.to_string(),
            f.span.to_string(),
            format!("{}:{}", f.odd, f.even),
            format!("{}:{}", f.big, f.small),
        ]);
    }
    println!("{table}");

    println!("  Somme moyenne : {:.2}   Écart moyen : {:.2}", features.average_sum, features.average_span);
    println!("  Impairs/Pairs : {}/{}   Grands/Petits : {}/{}",
        features.odd_total, features.even_total, features.big_total, features.small_total);
}

pub fn display_weights(weights: &Weights) {
    println!("\n== Poids du score composite ==\n");

    let mut table = new_table();
    table.set_header(vec!["Signal", "Poids", "Contribution"]);
    for kind in SignalKind::ALL {
        let weight = weights.get(kind);
        let bar = "█".repeat((weight * 30.0).round() as usize);
        table.add_row(vec![kind.to_string(), format!("{:.2}", weight), bar]);
    }
    println!("{table}");
}

pub fn display_backtest(results: &[BacktestResult], best: Option<&BacktestResult>) {
    println!("\n== Rejeu par fenêtre ==\n");

    let mut table = new_table();
    table.set_header(vec!["Fenêtre", "Précision", "Série en cours", "Meilleure série", "Validations"]);
    for r in results {
        let is_best = best.is_some_and(|b| b.window == r.window);
        let window = Cell::new(format!("{}{}", r.window, if is_best { " ★" } else { "" }));
        table.add_row(vec![
            if is_best { window.fg(Color::Green) } else { window },
            Cell::new(format!("{}%", r.statistics.overall_accuracy)),
            Cell::new(r.statistics.current_streak),
            Cell::new(r.statistics.longest_streak),
            Cell::new(r.statistics.total),
        ]);
    }
    println!("{table}");
}

pub fn display_backtest_chart(results: &[BacktestResult], best: Option<&BacktestResult>) {
    if results.is_empty() {
        println!("  (Pas de données à afficher)");
        return;
    }

    println!("\n== Précision par fenêtre (%) ==\n");
    let points: Vec<(f32, f32)> = results
        .iter()
        .map(|r| (r.window.get() as f32, r.statistics.overall_accuracy as f32))
        .collect();
    let x_min = WindowSize::MIN as f32;
    let x_max = WindowSize::MAX as f32;
    let shape = textplots::Shape::Points(&points);
    let mut chart = textplots::Chart::new_with_y_range(120, 40, x_min, x_max, 0.0, 100.0);
    println!("{}", chart.lineplot(&shape));

    if let Some(best) = best.filter(|b| !b.accuracy_curve.is_empty()) {
        println!("\n== Précision cumulée, fenêtre {} ==\n", best.window);
        let curve: Vec<(f32, f32)> = best
            .accuracy_curve
            .iter()
            .enumerate()
            .map(|(i, &a)| (i as f32 + 1.0, a as f32))
            .collect();
        let shape = textplots::Shape::Lines(&curve);
        let mut chart = textplots::Chart::new_with_y_range(
            120, 40, 1.0, best.accuracy_curve.len().max(2) as f32, 0.0, 100.0,
        );
        println!("{}", chart.lineplot(&shape));
    }
}
