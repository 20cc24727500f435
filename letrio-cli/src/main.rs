mod display;
mod import;
mod session;

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};

use letrio_db::db::{clear_all, count_draws, db_path, fetch_last_draws, migrate, open_db, save_pending};
use letrio_db::models::{NewDraw, Position};
use letrio_db::rusqlite::Connection;
use letrio_engine::backtest::{backtest_windows, best_window};
use letrio_engine::config::{load_config, save_config};
use letrio_engine::sampler::{date_seed, generate_sample_digits};
use letrio_engine::{LotteryEngine, Weights, WindowSize};

use crate::display::{
    display_backtest, display_backtest_chart, display_basic_features, display_batch_summary,
    display_draws, display_feature_matrix, display_import_summary, display_outcome,
    display_prediction, display_statistics, display_validations, display_weights,
    RECENT_VALIDATIONS,
};
use crate::session::{config_path, ingest_batch, ingest_each, load_engine, next_period};

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum PositionArg {
    Hundred,
    Ten,
    One,
}

impl From<PositionArg> for Position {
    fn from(arg: PositionArg) -> Self {
        match arg {
            PositionArg::Hundred => Position::Hundred,
            PositionArg::Ten => Position::Ten,
            PositionArg::One => Position::One,
        }
    }
}

#[derive(Parser)]
#[command(name = "letrio", about = "Analyse et prédiction de tirages à trois chiffres")]
struct Cli {
    /// Sortie JSON au lieu des tableaux
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Importer des tirages depuis un fichier CSV (periode;centaines;dizaines;unites)
    Import {
        /// Chemin vers le fichier CSV
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Ajouter un tirage (ex: 391)
    Add {
        /// Les trois chiffres du tirage ; demandés si absents
        digits: Option<String>,

        /// Période du tirage (par défaut : période visée par la prédiction en attente)
        #[arg(short, long)]
        period: Option<String>,
    },

    /// Lister les derniers tirages
    List {
        /// Nombre de tirages à afficher
        #[arg(short, long, default_value = "10")]
        last: u32,
    },

    /// Afficher la prédiction en attente
    Predict,

    /// Afficher les dernières validations
    Validations {
        /// Nombre de validations à afficher
        #[arg(short, long, default_value_t = RECENT_VALIDATIONS)]
        last: usize,
    },

    /// Afficher les statistiques de précision
    Stats,

    /// Afficher la matrice des signaux par chiffre
    Features {
        /// Limiter à une position
        #[arg(short, long)]
        position: Option<PositionArg>,

        /// Afficher aussi somme, écart, parité et grandeur
        #[arg(short, long)]
        basic: bool,
    },

    /// Afficher ou changer la taille de fenêtre (10 à 200, par pas de 10)
    Window {
        size: Option<usize>,
    },

    /// Afficher ou changer les poids du score composite
    Weights {
        #[arg(long)]
        frequency: Option<f64>,
        #[arg(long)]
        omission: Option<f64>,
        #[arg(long)]
        follow: Option<f64>,
        #[arg(long)]
        periodicity: Option<f64>,
        #[arg(long)]
        markov: Option<f64>,

        /// Revenir aux poids par défaut
        #[arg(long)]
        reset: bool,
    },

    /// Générer des tirages aléatoires à la suite de la prédiction en attente
    Sample {
        /// Nombre de tirages
        #[arg(short, long, default_value = "50")]
        count: usize,

        /// Seed pour la reproductibilité (par défaut : date du jour)
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Rejouer l'historique pour chaque taille de fenêtre
    Backtest {
        /// Fenêtres séparées par des virgules (par défaut : toutes)
        #[arg(short, long)]
        windows: Option<String>,
    },

    /// Effacer tirages, validations et prédiction en attente
    Clear {
        /// Ne pas demander de confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Afficher le chemin de la base de données
    DbPath,
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let path = db_path();
    let conn = open_db(&path)?;
    migrate(&conn)?;

    // Ces commandes doivent marcher même sur une base incohérente.
    match cli.command {
        Command::DbPath => {
            println!("{}", path.display());
            return Ok(());
        }
        Command::Clear { yes } => return cmd_clear(&conn, yes),
        _ => {}
    }

    let config = load_config(&config_path())?;
    let mut engine = load_engine(&conn, config)?;
    log::debug!("{} tirages chargés depuis {:?}", engine.draws().len(), path);

    let json = cli.json;
    match cli.command {
        Command::Import { file } => cmd_import(&conn, &mut engine, &file, json),
        Command::Add { digits, period } => cmd_add(&conn, &mut engine, digits, period, json),
        Command::List { last } => cmd_list(&conn, last, json),
        Command::Predict => cmd_predict(&engine, json),
        Command::Validations { last } => cmd_validations(&engine, last, json),
        Command::Stats => cmd_stats(&engine, json),
        Command::Features { position, basic } => cmd_features(&engine, position, basic, json),
        Command::Window { size } => cmd_window(&conn, &mut engine, size),
        Command::Weights { frequency, omission, follow, periodicity, markov, reset } => {
            let overrides = [frequency, omission, follow, periodicity, markov];
            cmd_weights(&conn, &mut engine, overrides, reset, json)
        }
        Command::Sample { count, seed } => cmd_sample(&conn, &mut engine, count, seed, json),
        Command::Backtest { windows } => cmd_backtest(&engine, windows.as_deref(), json),
        Command::DbPath | Command::Clear { .. } => Ok(()),
    }
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn cmd_import(conn: &Connection, engine: &mut LotteryEngine, file: &PathBuf, json: bool) -> Result<()> {
    let import = import::read_csv(file)?;
    let batch = ingest_batch(conn, engine, import.draws.clone())?;
    if json {
        return print_json(&batch.outcomes);
    }
    display_import_summary(&import, &batch);
    Ok(())
}

fn parse_digits(raw: &str) -> Result<[u8; 3]> {
    let digits: Vec<u8> = raw
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| c.to_digit(10).map(|d| d as u8))
        .collect::<Option<_>>()
        .with_context(|| format!("'{}' : chiffres attendus", raw))?;
    match digits.as_slice() {
        &[h, t, o] => Ok([h, t, o]),
        _ => bail!("Exactement 3 chiffres attendus, reçu '{}'", raw),
    }
}

fn cmd_add(
    conn: &Connection,
    engine: &mut LotteryEngine,
    digits: Option<String>,
    period: Option<String>,
    json: bool,
) -> Result<()> {
    let raw = match digits {
        Some(d) => d,
        None => prompt("Tirage (3 chiffres, ex: 391) : ")?,
    };
    let [hundred, ten, one] = parse_digits(&raw)?;
    let period = period.unwrap_or_else(|| next_period(engine, chrono::Local::now().naive_local()));

    let batch = ingest_batch(conn, engine, vec![NewDraw { period, hundred, ten, one }])?;
    if let Some((_, reason)) = batch.rejected.first() {
        bail!("Tirage refusé : {}", reason);
    }
    let Some(outcome) = batch.outcomes.first() else {
        bail!("Aucun tirage ingéré");
    };
    if json {
        return print_json(outcome);
    }
    display_outcome(outcome);
    Ok(())
}

fn cmd_list(conn: &Connection, last: u32, json: bool) -> Result<()> {
    let n = count_draws(conn)?;
    if n == 0 {
        println!("Base vide. Lancez d'abord : letrio import ou letrio sample");
        return Ok(());
    }
    let draws = fetch_last_draws(conn, last)?;
    if json {
        return print_json(&draws);
    }
    display_draws(&draws);
    Ok(())
}

fn cmd_predict(engine: &LotteryEngine, json: bool) -> Result<()> {
    let Some(prediction) = engine.current_prediction() else {
        println!("Aucune prédiction : la base est vide.");
        return Ok(());
    };
    if json {
        return print_json(prediction);
    }
    display_prediction(prediction);
    Ok(())
}

fn cmd_validations(engine: &LotteryEngine, last: usize, json: bool) -> Result<()> {
    if json {
        let validations = engine.validations();
        let start = validations.len().saturating_sub(last);
        return print_json(&validations[start..]);
    }
    display_validations(engine.validations(), last);
    Ok(())
}

fn cmd_stats(engine: &LotteryEngine, json: bool) -> Result<()> {
    let stats = engine.statistics();
    if json {
        return print_json(&stats);
    }
    display_statistics(&stats, engine.window_size());
    Ok(())
}

fn cmd_features(engine: &LotteryEngine, position: Option<PositionArg>, basic: bool, json: bool) -> Result<()> {
    if engine.draws().is_empty() {
        println!("Base vide. Lancez d'abord : letrio import ou letrio sample");
        return Ok(());
    }

    let positions: Vec<Position> = match position {
        Some(p) => vec![p.into()],
        None => Position::ALL.to_vec(),
    };
    let matrices: Vec<_> = positions.iter().map(|&p| engine.feature_matrix(p)).collect();

    if json {
        let basic_features = basic.then(|| engine.basic_features());
        return print_json(&serde_json::json!({
            "matrices": matrices,
            "basic": basic_features,
        }));
    }

    for matrix in &matrices {
        display_feature_matrix(matrix);
    }
    if basic {
        display_basic_features(&engine.basic_features());
    }
    Ok(())
}

fn save_engine_config(engine: &LotteryEngine) -> Result<()> {
    save_config(engine.config(), &config_path())
}

fn cmd_window(conn: &Connection, engine: &mut LotteryEngine, size: Option<usize>) -> Result<()> {
    let Some(size) = size else {
        println!("Fenêtre actuelle : {} tirages", engine.window_size());
        return Ok(());
    };

    engine.set_window_size(size)?;
    save_engine_config(engine)?;
    save_pending(conn, engine.current_prediction())?;
    println!("Fenêtre : {} tirages", engine.window_size());
    if let Some(prediction) = engine.current_prediction() {
        display_prediction(prediction);
    }
    Ok(())
}

fn cmd_weights(
    conn: &Connection,
    engine: &mut LotteryEngine,
    overrides: [Option<f64>; 5],
    reset: bool,
    json: bool,
) -> Result<()> {
    let [frequency, omission, follow, periodicity, markov] = overrides;
    let changed = reset || overrides.iter().any(Option::is_some);

    if changed {
        let base = if reset { Weights::default() } else { *engine.weights() };
        let weights = Weights {
            frequency: frequency.unwrap_or(base.frequency),
            omission: omission.unwrap_or(base.omission),
            follow: follow.unwrap_or(base.follow),
            periodicity: periodicity.unwrap_or(base.periodicity),
            markov: markov.unwrap_or(base.markov),
        };
        engine.set_weights(weights)?;
        save_engine_config(engine)?;
        save_pending(conn, engine.current_prediction())?;
    }

    if json {
        return print_json(engine.weights());
    }
    display_weights(engine.weights());
    Ok(())
}

fn cmd_sample(
    conn: &Connection,
    engine: &mut LotteryEngine,
    count: usize,
    seed: Option<u64>,
    json: bool,
) -> Result<()> {
    let seed = seed.unwrap_or_else(date_seed);
    let now = chrono::Local::now().naive_local();

    let mut digits = generate_sample_digits(count, seed).into_iter();
    let batch = ingest_each(conn, engine, |e| {
        digits.next().map(|[hundred, ten, one]| NewDraw {
            period: next_period(e, now),
            hundred,
            ten,
            one,
        })
    })?;
    if json {
        return print_json(&batch.outcomes);
    }
    println!("Échantillon généré (seed {}) :", seed);
    display_batch_summary(&batch);
    Ok(())
}

fn parse_windows(raw: Option<&str>) -> Result<Vec<WindowSize>> {
    let Some(raw) = raw else {
        return Ok(WindowSize::all());
    };
    raw.split(',')
        .map(|s| -> Result<WindowSize> {
            let n = s.trim().parse::<usize>().context("Format de fenêtres invalide")?;
            Ok(WindowSize::new(n)?)
        })
        .collect()
}

fn cmd_backtest(engine: &LotteryEngine, windows: Option<&str>, json: bool) -> Result<()> {
    let windows = parse_windows(windows)?;
    let history = engine.draws();
    if history.len() < 2 {
        bail!("Au moins 2 tirages sont nécessaires. Lancez d'abord : letrio import ou letrio sample");
    }

    let pb = ProgressBar::new(windows.len() as u64);
    pb.set_style(ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
        .progress_chars("=> "));
    pb.set_message(format!("{} tirages", history.len()));

    let results = backtest_windows(history, engine.config(), &windows, |_| pb.inc(1))?;
    pb.finish_with_message("Rejeu terminé");

    let best = best_window(&results);
    if json {
        return print_json(&results);
    }
    display_backtest(&results, best);
    display_backtest_chart(&results, best);
    if let Some(best) = best {
        println!("Meilleure fenêtre : {} ({}%). Pour l'appliquer : letrio window {}",
            best.window, best.statistics.overall_accuracy, best.window);
    }
    Ok(())
}

fn cmd_clear(conn: &Connection, yes: bool) -> Result<()> {
    if !yes {
        let confirm = prompt("Effacer tous les tirages et validations ? (o/n) : ")?;
        if confirm.trim().to_lowercase() != "o" {
            println!("Remise à zéro annulée.");
            return Ok(());
        }
    }
    clear_all(conn)?;
    println!("Base vidée.");
    Ok(())
}

fn prompt(msg: &str) -> Result<String> {
    print!("{}", msg);
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin()
        .read_line(&mut input)
        .context("Erreur de lecture")?;
    Ok(input.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_digits() {
        assert_eq!(parse_digits("391").unwrap(), [3, 9, 1]);
        assert_eq!(parse_digits(" 0 0 7 ").unwrap(), [0, 0, 7]);
        assert!(parse_digits("39").is_err());
        assert!(parse_digits("3a1").is_err());
        assert!(parse_digits("3911").is_err());
    }

    #[test]
    fn test_parse_windows() {
        assert_eq!(parse_windows(None).unwrap().len(), 20);
        let w = parse_windows(Some("10, 50,200")).unwrap();
        assert_eq!(w.iter().map(|w| w.get()).collect::<Vec<_>>(), vec![10, 50, 200]);
        assert!(parse_windows(Some("15")).is_err());
        assert!(parse_windows(Some("abc")).is_err());
    }

    #[test]
    fn test_cli_parses_subcommands() {
        let cli = Cli::try_parse_from(["letrio", "--json", "features", "-p", "ten", "--basic"]).unwrap();
        assert!(cli.json);
        assert!(matches!(
            cli.command,
            Command::Features { position: Some(PositionArg::Ten), basic: true }
        ));
        assert!(Cli::try_parse_from(["letrio", "window", "40"]).is_ok());
        assert!(Cli::try_parse_from(["letrio", "weights", "--markov", "0.3", "--follow", "0.1"]).is_ok());
    }
}
