use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{Duration, Instant};

use clap::Parser;
use log::{debug, error, info};

use speller::config::{expand_tilde, Config};
use speller::lexer::Lexer;
use speller::pipeline::Pipeline;
use speller::{DuplicatePolicy, Result, WordIndex};

#[derive(Parser, Debug)]
#[command(version, about = "Checks texts against a word list")]
struct Cli {
    /// Word list, one word per line
    #[arg(short, long)]
    dictionary: Option<PathBuf>,

    /// JSON config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of hash buckets
    #[arg(long)]
    buckets: Option<usize>,

    /// Drop repeated dictionary words while loading
    #[arg(long)]
    skip_duplicates: bool,

    /// Texts to check
    #[arg(required = true)]
    texts: Vec<PathBuf>,
}

#[derive(Default)]
struct Timings {
    load: Duration,
    check: Duration,
    size: Duration,
    unload: Duration,
}

fn timed<T>(total: &mut Duration, f: impl FnOnce() -> T) -> T {
    let start = Instant::now();
    let out = f();
    *total += start.elapsed();
    out
}

fn run(cli: Cli) -> Result<()> {
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(dictionary) = cli.dictionary {
        config.dictionary = expand_tilde(&dictionary).unwrap_or(dictionary);
    }
    if let Some(buckets) = cli.buckets {
        config.buckets = buckets;
    }
    if cli.skip_duplicates {
        config.duplicates = DuplicatePolicy::Skip;
    }
    debug!("{:?}", config);

    let mut timings = Timings::default();
    let mut index = WordIndex::with_buckets(config.buckets)?.with_duplicates(config.duplicates);
    timed(&mut timings.load, || index.load(&config.dictionary))?;

    let mut misspelled = 0;
    let mut words = 0;
    for path in &cli.texts {
        info!("checking {:?}", path);
        let text = fs::read_to_string(path)?;
        let report = timed(&mut timings.check, || {
            Pipeline::new(&index).run(Lexer::new(text))
        })?;
        for token in &report.misspelled {
            println!(
                "{}:{}:{}: {}",
                path.display(),
                token.start.line() + 1,
                token.start.column() + 1,
                token.lexeme
            );
        }
        misspelled += report.misspelled.len();
        words += report.words;
    }

    let dictionary_size = timed(&mut timings.size, || index.size());
    timed(&mut timings.unload, || index.unload())?;

    println!();
    println!("WORDS MISSPELLED:     {misspelled}");
    println!("WORDS IN DICTIONARY:  {dictionary_size}");
    println!("WORDS IN TEXT:        {words}");
    println!("TIME IN load:         {:.2}", timings.load.as_secs_f64());
    println!("TIME IN check:        {:.2}", timings.check.as_secs_f64());
    println!("TIME IN size:         {:.2}", timings.size.as_secs_f64());
    println!("TIME IN unload:       {:.2}", timings.unload.as_secs_f64());
    let total = timings.load + timings.check + timings.size + timings.unload;
    println!("TIME IN TOTAL:        {:.2}", total.as_secs_f64());
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            eprintln!("speller: {err}");
            ExitCode::FAILURE
        }
    }
}
