use std::fmt;
use std::io::{BufRead, Write as _};
use std::sync::Arc;

use services::catalog_service::{self, CatalogService};
use services::{
    AdvanceOutcome, Clock, Direction, EventSink, OpenTriviaClient, QuizEvent, QuizLoopService,
    SessionEngine, StatsLedger,
};
use storage::repository::Storage;
use trivia_core::model::{Catalog, LifetimeStats, QuizResult, format_clock};

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidQuizCount { raw: String },
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidQuizCount { raw } => write!(f, "invalid --quizzes value: {raw}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

struct Args {
    db_url: String,
    quizzes: usize,
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- [--db <sqlite_url>] [--quizzes <n>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db sqlite://trivia.sqlite3");
    eprintln!("  --quizzes 10");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  TRIVIA_DB_URL, TRIVIA_QUIZZES");
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut db_url = std::env::var("TRIVIA_DB_URL")
            .ok()
            .map_or_else(|| "sqlite://trivia.sqlite3".into(), normalize_sqlite_url);
        let mut quizzes = std::env::var("TRIVIA_QUIZZES")
            .ok()
            .and_then(|value| value.parse::<usize>().ok())
            .unwrap_or(10);

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--quizzes" => {
                    let value = require_value(args, "--quizzes")?;
                    quizzes = value
                        .parse()
                        .ok()
                        .filter(|n| *n > 0)
                        .ok_or(ArgsError::InvalidQuizCount { raw: value })?;
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self { db_url, quizzes })
    }
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

/// Forwards session state changes to the log; the play loop below does the
/// actual screen printing.
struct LogSink;

impl EventSink for LogSink {
    fn publish(&self, event: QuizEvent) {
        match event {
            QuizEvent::QuestionEntered { index, total } => {
                log::debug!("entered question {} of {total}", index + 1);
            }
            QuizEvent::SessionCompleted { result } => {
                log::info!(
                    "session completed: {}/{} correct, score {}%",
                    result.correct_answers(),
                    result.total_questions(),
                    result.score()
                );
            }
            QuizEvent::StatsUpdated { stats } => {
                log::debug!("lifetime stats now at {} quizzes", stats.quizzes_played());
            }
        }
    }
}

fn prompt(label: &str) -> std::io::Result<Option<String>> {
    print!("{label}");
    std::io::stdout().flush()?;
    let mut line = String::new();
    if std::io::stdin().lock().read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_owned()))
}

fn print_catalog(catalog: &Catalog) {
    println!();
    println!("Available quizzes:");
    for (i, quiz) in catalog.iter().enumerate() {
        println!("  [{}] {} ({} questions)", i + 1, quiz.category(), quiz.len());
    }
    println!();
    println!("Pick a quiz number, or: lucky | stats | quit");
}

fn print_stats(stats: &LifetimeStats) {
    println!();
    println!("Your statistics:");
    println!("  Quizzes played:         {}", stats.quizzes_played());
    println!("  Questions answered:     {}", stats.questions_answered());
    println!("  Correct / wrong:        {} / {}", stats.correct_answers(), stats.wrong_answers());
    println!("  Average answering time: {}", stats.avg_answer_time());
}

fn print_result(result: &QuizResult) {
    println!();
    println!("Your results:");
    println!("  Time used:       {}", result.time_display());
    println!("  Score:           {} %", result.score());
    println!("  Points:          {} / {}", result.points(), result.max_points());
    println!(
        "  Correct answers: {} / {}",
        result.correct_answers(),
        result.total_questions()
    );
    println!("  By difficulty:");
    for difficulty in trivia_core::model::Difficulty::ALL {
        let tally = result.breakdown().tally(difficulty);
        println!("    {difficulty:<6} {} / {}", tally.correct, tally.total);
    }
}

/// One attempt at a quiz, from start through the scored result.
async fn play_quiz(
    service: &QuizLoopService,
    ledger: &mut StatsLedger,
    catalog: &Catalog,
    index: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut engine = SessionEngine::new();
    service.start_quiz(&mut engine, catalog, index)?;

    loop {
        let Some(view) = engine.current_view().cloned() else {
            break;
        };
        println!();
        println!(
            "{} — question {}/{} [{} | {} points | {}]",
            view.category(),
            view.number(),
            view.total(),
            view.difficulty(),
            view.points(),
            format_clock(engine.elapsed_seconds()),
        );
        println!("{}", view.text());
        for (i, option) in view.options().iter().enumerate() {
            let marker = if engine.current_pick() == Some(option.as_str()) {
                "*"
            } else {
                " "
            };
            println!("  {marker}{}) {option}", i + 1);
        }

        let Some(input) = prompt("answer number, or: back | next | abort > ")? else {
            engine.reset();
            return Ok(());
        };
        let outcome = match input.as_str() {
            "abort" => {
                engine.reset();
                println!("Session abandoned.");
                return Ok(());
            }
            "back" => service.advance(&mut engine, ledger, Direction::Previous).await,
            "next" | "" => service.advance(&mut engine, ledger, Direction::Next).await,
            raw => {
                let picked = raw
                    .parse::<usize>()
                    .ok()
                    .and_then(|n| n.checked_sub(1))
                    .and_then(|i| view.options().get(i).cloned());
                match picked {
                    Some(option) => {
                        service.choose(&mut engine, &option)?;
                        continue;
                    }
                    None => {
                        println!("Not an option: {raw}");
                        continue;
                    }
                }
            }
        };

        match outcome {
            Ok(AdvanceOutcome::Moved { .. }) => {}
            Ok(AdvanceOutcome::Finished { result, stats }) => {
                print_result(&result);
                print_stats(&stats);
                return Ok(());
            }
            Err(err) => println!("{err}"),
        }
    }

    Ok(())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv = std::env::args().skip(1);
    let args = Args::parse(&mut argv).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    // Open + migrate SQLite at startup. Keep this in the binary glue so core
    // and services stay pure.
    prepare_sqlite_file(&args.db_url)?;
    let storage = Storage::sqlite(&args.db_url).await?;

    let mut ledger = StatsLedger::load(storage.stats.clone()).await?;
    print_stats(ledger.current());

    println!();
    println!("Fetching {} quizzes...", args.quizzes);
    let catalog = CatalogService::new(Arc::new(OpenTriviaClient::new()))
        .load(args.quizzes)
        .await?;
    log::info!("catalog ready with {} quizzes", catalog.len());

    let service = QuizLoopService::new(Clock::default()).with_sink(Arc::new(LogSink));

    loop {
        print_catalog(&catalog);
        let Some(input) = prompt("> ")? else {
            break;
        };
        match input.as_str() {
            "quit" | "q" => break,
            "stats" => print_stats(ledger.current()),
            "lucky" => {
                let index = catalog_service::pick_random(&catalog)?;
                play_quiz(&service, &mut ledger, &catalog, index).await?;
            }
            raw => match raw.parse::<usize>().ok().and_then(|n| n.checked_sub(1)) {
                Some(index) if index < catalog.len() => {
                    play_quiz(&service, &mut ledger, &catalog, index).await?;
                }
                _ => println!("Not a quiz: {raw}"),
            },
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    pretty_env_logger::init();
    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
