use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};

use anyhow::{Context, Result};
use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};
use env_logger::Env;

mod classifier;
use classifier::NaiveBayes;

mod config;
use config::Config;

mod convert;

mod error;

mod naf;

mod tabulated;

mod tass;

mod tokenizer;

mod unicode;

mod util;

static CONFIG: &str = "CONFIG";
static INPUT: &str = "INPUT";
static LOWERCASE: &str = "LOWERCASE";
static MODEL: &str = "MODEL";

fn load_config(matches: &ArgMatches) -> Result<Config> {
    match matches.value_of(CONFIG) {
        Some(config_path) => {
            let r = BufReader::new(
                File::open(config_path)
                    .with_context(|| format!("Cannot open configuration: {}", config_path))?,
            );
            Config::read(config_path, r)
                .with_context(|| format!("Cannot read configuration: {}", config_path))
        }
        None => Ok(Config::default()),
    }
}

fn input_arg<'a, 'b>(help: &'b str) -> Arg<'a, 'b> {
    Arg::with_name(INPUT).help(help).required(true).index(1)
}

fn model_arg<'a, 'b>() -> Arg<'a, 'b> {
    Arg::with_name(MODEL)
        .long("model")
        .short("m")
        .value_name("MODEL")
        .help("Classifier model, overrides the configuration")
        .takes_value(true)
}

fn load_classifier(config: &Config, matches: &ArgMatches) -> Result<NaiveBayes> {
    let properties = config.classifier_properties(matches.value_of(MODEL))?;
    NaiveBayes::load(&properties)
        .with_context(|| format!("Cannot load classifier: {}", properties.model.display()))
}

fn app() -> App<'static, 'static> {
    App::new("tass-convert")
        .about("Convert TASS sentiment corpora to tabulated text and NAF")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .arg(
            Arg::with_name(CONFIG)
                .long("config")
                .short("c")
                .value_name("FILE")
                .help("TOML configuration file")
                .takes_value(true),
        )
        .subcommand(
            SubCommand::with_name("to-tabulated")
                .about("Print tweets as id, polarity and tokens separated by tabs")
                .arg(input_arg("TASS XML corpus")),
        )
        .subcommand(
            SubCommand::with_name("to-naf")
                .about("Write a NAF document with word forms for every tweet")
                .arg(input_arg("TASS XML corpus")),
        )
        .subcommand(
            SubCommand::with_name("naf-to-tabulated")
                .about("Print the id and first topic of NAF topic documents")
                .arg(input_arg("NAF topic document or directory")),
        )
        .subcommand(
            SubCommand::with_name("classify")
                .about("Classify the documents of a tabulated file")
                .arg(input_arg("Tabulated file"))
                .arg(model_arg()),
        )
        .subcommand(
            SubCommand::with_name("annotate-naf")
                .about("Add the predicted label as topic to NAF documents")
                .arg(input_arg("NAF document or directory"))
                .arg(model_arg()),
        )
        .subcommand(
            SubCommand::with_name("train")
                .about("Train a naive Bayes classifier on a labeled tabulated file")
                .arg(input_arg("Tabulated file"))
                .arg(
                    Arg::with_name(MODEL)
                        .help("Output model")
                        .required(true)
                        .index(2),
                )
                .arg(
                    Arg::with_name(LOWERCASE)
                        .long("lowercase")
                        .help("Lowercase tokens"),
                ),
        )
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let matches = app().get_matches();
    let config = load_config(&matches)?;

    let stdout = io::stdout();
    let stdout = BufWriter::new(stdout.lock());

    match matches.subcommand() {
        ("to-tabulated", Some(matches)) => {
            let input = matches.value_of(INPUT).unwrap();
            let tokenizer = config.tokenizer.load();
            convert::xml_to_tabulated(input, &config, tokenizer.as_ref(), stdout)
                .with_context(|| format!("Cannot convert {}", input))?;
        }
        ("to-naf", Some(matches)) => {
            let input = matches.value_of(INPUT).unwrap();
            let tokenizer = config.tokenizer.load();
            let written = convert::xml_to_naf(input, &config, tokenizer.as_ref())
                .with_context(|| format!("Cannot convert {}", input))?;
            log::info!("Wrote {} NAF documents", written.len());
        }
        ("naf-to-tabulated", Some(matches)) => {
            let input = matches.value_of(INPUT).unwrap();
            let tabulated = convert::naf_to_tabulated(input, &config.naf.suffix)
                .with_context(|| format!("Cannot read NAF documents from {}", input))?;
            let mut stdout = stdout;
            stdout.write_all(tabulated.as_bytes())?;
            stdout.flush()?;
        }
        ("classify", Some(matches)) => {
            let input = matches.value_of(INPUT).unwrap();
            let classifier = load_classifier(&config, matches)?;
            convert::classify_tabulated(input, &classifier, stdout)
                .with_context(|| format!("Cannot classify {}", input))?;
        }
        ("annotate-naf", Some(matches)) => {
            let input = matches.value_of(INPUT).unwrap();
            let classifier = load_classifier(&config, matches)?;
            let written = convert::annotate_naf(input, &config, &classifier)
                .with_context(|| format!("Cannot annotate NAF documents in {}", input))?;
            log::info!("Wrote {} topic documents", written.len());
        }
        ("train", Some(matches)) => {
            let input = matches.value_of(INPUT).unwrap();
            let model_path = matches.value_of(MODEL).unwrap();
            let model = convert::train_tabulated(input, &config, matches.is_present(LOWERCASE))
                .with_context(|| format!("Cannot train on {}", input))?;
            log::info!(
                "Trained `{}` model with labels: {}",
                model.language(),
                model.labels().collect::<Vec<_>>().join(", ")
            );
            let write = BufWriter::new(
                File::create(model_path)
                    .with_context(|| format!("Cannot create model: {}", model_path))?,
            );
            model.write(write)?;
        }
        _ => unreachable!(),
    }

    Ok(())
}
