extern crate clap;
extern crate colrec;
extern crate rand;

use anyhow::{bail, Context, Result};
use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};
use colrec::analysis::AnalysisHandler;
use colrec::dijet::DijetPairSelector;
use colrec::event::{EventReader, Jet};
use colrec::run_card::RunCard;
use colrec::settings_card::SettingsCard;
use env_logger::Env;
use log::{debug, info};
use rand::prelude::*;
use std::f64::consts::PI;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Instant;

fn parse_arg<T>(matches: &ArgMatches, name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match matches.value_of(name) {
        Some(x) => Ok(Some(
            T::from_str(x).with_context(|| format!("invalid value '{}' for --{}", x, name))?,
        )),
        None => Ok(None),
    }
}

/// Run the enabled analyses over an event file.
fn analyze(matches: &ArgMatches) -> Result<()> {
    let mut settings = match matches.value_of("settings") {
        Some(card) => SettingsCard::new(Path::new(card))?,
        None => SettingsCard::default(),
    };
    if let Some(dir) = matches.value_of("output") {
        settings.output_dir = dir.to_owned();
    }
    let max_events: Option<usize> = parse_arg(matches, "max-events")?;
    let output_dir = PathBuf::from(&settings.output_dir);

    let events_path = Path::new(matches.value_of("events").context("--events is required")?);
    let reader = EventReader::open(events_path)?;
    let mut handler = AnalysisHandler::new(settings)?;

    let now = Instant::now();
    handler.run(reader, max_events)?;
    handler.finalize();
    handler
        .write(&output_dir)
        .with_context(|| format!("could not write results to {}", output_dir.display()))?;

    info!(
        "analysed {} events from {} in {:#?}",
        handler.events(),
        events_path.display(),
        now.elapsed()
    );
    for a in handler.summary().analyses {
        println!(
            "{}: {} / {} events passed",
            a.name, a.cutflow.passed, a.cutflow.events
        );
        for (reason, count) in &a.cutflow.vetoes {
            println!("    {:<28} {}", reason, count);
        }
    }
    Ok(())
}

/// Render the generator command file.
fn generator_card(matches: &ArgMatches) -> Result<()> {
    let card = match matches.value_of("run-card") {
        Some(path) => RunCard::new(Path::new(path))?,
        None => RunCard::default(),
    };

    match matches.value_of("output") {
        Some(path) => {
            let f = File::create(path).with_context(|| format!("could not create {}", path))?;
            let mut w = BufWriter::new(f);
            card.write(&mut w)?;
            w.flush()?;
            info!("wrote {} generator commands to {}", card.commands().len(), path);
        }
        None => {
            let stdout = io::stdout();
            card.write(&mut stdout.lock())?;
        }
    }
    Ok(())
}

/// Inspect the selection of a single 4-jet event.
fn inspect(matches: &ArgMatches) -> Result<()> {
    let x = matches
        .values_of("point")
        .context("no jet components given")?
        .map(|x| f64::from_str(x).with_context(|| format!("'{}' is not a number", x)))
        .collect::<Result<Vec<_>>>()?;
    if x.len() != 16 {
        bail!("Expected 16 jet components (E px py pz for four jets), got {}", x.len());
    }

    let jets: Vec<Jet> = x
        .chunks(4)
        .map(|c| Jet::from_components(c[0], c[1], c[2], c[3]))
        .collect();

    for (i, c) in colrec::dijet::pair_candidates(&jets).iter().enumerate() {
        debug!(
            "pair {}: ({}, {}) angle={:.3} mass={:.4}",
            i, c.i, c.j, c.angle, c.mass
        );
    }

    println!("{}", DijetPairSelector::default().select(&jets));
    Ok(())
}

/// Time the selector on isotropic random 4-jet events.
fn bench(matches: &ArgMatches) -> Result<()> {
    let samples: usize = parse_arg(matches, "samples")?.unwrap_or(1_000_000);
    let seed: u64 = parse_arg(matches, "seed")?.unwrap_or(1);
    let mut rng = StdRng::seed_from_u64(seed);
    let selector = DijetPairSelector::default();

    let mut accepted = 0usize;
    let mut jets = Vec::with_capacity(4);
    let now = Instant::now();
    for _ in 0..samples {
        jets.clear();
        for _ in 0..4 {
            let e: f64 = rng.gen_range(5.0..100.0);
            let cos_theta: f64 = rng.gen_range(-1.0..1.0);
            let phi: f64 = rng.gen_range(0.0..2. * PI);
            let sin_theta = (1. - cos_theta * cos_theta).sqrt();
            jets.push(Jet::from_components(
                e,
                e * sin_theta * phi.cos(),
                e * sin_theta * phi.sin(),
                e * cos_theta,
            ));
        }

        if selector.select(&jets).is_accepted() {
            accepted += 1;
        }
    }

    println!("{:#?}", now.elapsed());
    println!(
        "accepted {} of {} events ({:.3}%)",
        accepted,
        samples,
        100. * accepted as f64 / samples.max(1) as f64
    );
    Ok(())
}

fn app() -> App<'static, 'static> {
    App::new("colrec")
        .version("0.1")
        .about("Colour-reconnection dijet analyses for e+e- -> W+W- events")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .arg(
            Arg::with_name("verbose")
                .short("v")
                .long("verbose")
                .multiple(true)
                .global(true)
                .help("Increase the log level (-v debug, -vv trace)"),
        )
        .subcommand(
            SubCommand::with_name("analyze")
                .about("Run the analyses over an event file")
                .arg(
                    Arg::with_name("events")
                        .short("e")
                        .long("events")
                        .value_name("FILE")
                        .required(true)
                        .help("YAML event file, one event per document"),
                )
                .arg(
                    Arg::with_name("settings")
                        .short("s")
                        .long("settings")
                        .value_name("CARD")
                        .help("Analysis settings card"),
                )
                .arg(
                    Arg::with_name("output")
                        .short("o")
                        .long("output")
                        .value_name("DIR")
                        .help("Output directory, overrides the settings card"),
                )
                .arg(
                    Arg::with_name("max-events")
                        .short("n")
                        .long("max-events")
                        .value_name("N")
                        .help("Stop after N events"),
                ),
        )
        .subcommand(
            SubCommand::with_name("generator-card")
                .about("Write the generator command file for a run card")
                .arg(
                    Arg::with_name("run-card")
                        .short("r")
                        .long("run-card")
                        .value_name("CARD")
                        .help("Generator run card, the reference run if absent"),
                )
                .arg(
                    Arg::with_name("output")
                        .short("o")
                        .long("output")
                        .value_name("FILE")
                        .help("Write to FILE instead of stdout"),
                ),
        )
        .subcommand(
            SubCommand::with_name("inspect")
                .about("Run the dijet selection on a single event")
                .arg(
                    Arg::with_name("point")
                        .required(true)
                        .multiple(true)
                        .number_of_values(16)
                        .allow_hyphen_values(true)
                        .help("E px py pz of each of the four jets"),
                ),
        )
        .subcommand(
            SubCommand::with_name("bench")
                .about("Benchmark the dijet selection on random events")
                .arg(
                    Arg::with_name("samples")
                        .long("samples")
                        .value_name("SAMPLES")
                        .help("Number of random events"),
                )
                .arg(
                    Arg::with_name("seed")
                        .long("seed")
                        .value_name("SEED")
                        .help("Random seed"),
                ),
        )
}

fn main() -> Result<()> {
    let matches = app().get_matches();

    let verbosity = matches.occurrences_of("verbose").max(
        matches
            .subcommand()
            .1
            .map_or(0, |m| m.occurrences_of("verbose")),
    );
    let level = match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(Env::default().default_filter_or(level)).init();

    match matches.subcommand() {
        ("analyze", Some(m)) => analyze(m),
        ("generator-card", Some(m)) => generator_card(m),
        ("inspect", Some(m)) => inspect(m),
        ("bench", Some(m)) => bench(m),
        (other, _) => bail!("unknown subcommand '{}'", other),
    }
}
