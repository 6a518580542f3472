use std::collections::HashMap;
use std::fmt;
use std::io::{self, BufRead, Write};
use std::time::Duration;

use services::{AppServices, Clock, DictationOrder, DictationRound, PracticeEvent, TokioScheduler};
use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vocab_core::model::{Direction, ListId, WordDraft, format_elapsed};

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    MissingArgument { name: &'static str },
    UnknownArg(String),
    UnknownCommand(String),
    InvalidNumber { name: &'static str, raw: String },
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::MissingArgument { name } => write!(f, "missing <{name}>"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::UnknownCommand(cmd) => write!(f, "unknown subcommand: {cmd}"),
            ArgsError::InvalidNumber { name, raw } => write!(f, "invalid {name}: {raw}"),
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

fn require_arg(
    args: &mut impl Iterator<Item = String>,
    name: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingArgument { name })
}

fn parse_number<T: std::str::FromStr>(raw: String, name: &'static str) -> Result<T, ArgsError> {
    raw.trim()
        .parse()
        .map_err(|_| ArgsError::InvalidNumber { name, raw })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- [--db <sqlite_url>] <command>");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  status                                   today's practice progress (default)");
    eprintln!("  practice [--for <seconds>]               count practice time until Ctrl-C");
    eprintln!("  goal <minutes>                           set the daily goal (5-120)");
    eprintln!("  lists                                    show word lists");
    eprintln!("  create-list <name>                       add a word list");
    eprintln!("  rename-list <list-id> <name>             rename a word list");
    eprintln!("  words <list-id>                          show the words of a list");
    eprintln!("  add-word <list-id> <original> <translation>");
    eprintln!("  search <query>                           search every list");
    eprintln!("  dictation <list-id|catalog-slug> [--reverse] [--shuffle]");
    eprintln!("  seed                                     add a sample list");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db sqlite:vocab.sqlite3");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  VOCAB_DB_URL, RUST_LOG");
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Status,
    Practice { limit: Option<Duration> },
    Goal { minutes: u32 },
    Lists,
    CreateList { name: String },
    RenameList { list_id: ListId, name: String },
    Words { list_id: ListId },
    AddWord { list_id: ListId, draft_original: String, draft_translation: String },
    Search { query: String },
    Dictation { source: String, direction: Direction, order: DictationOrder },
    Seed,
}

impl Command {
    fn parse(name: &str, args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let cmd = match name {
            "status" => Self::Status,
            "practice" => {
                let mut limit = None;
                while let Some(arg) = args.next() {
                    match arg.as_str() {
                        "--for" => {
                            let secs: u64 = parse_number(require_value(args, "--for")?, "seconds")?;
                            limit = Some(Duration::from_secs(secs));
                        }
                        _ => return Err(ArgsError::UnknownArg(arg)),
                    }
                }
                Self::Practice { limit }
            }
            "goal" => Self::Goal {
                minutes: parse_number(require_arg(args, "minutes")?, "minutes")?,
            },
            "lists" => Self::Lists,
            "create-list" => Self::CreateList {
                name: require_arg(args, "name")?,
            },
            "rename-list" => Self::RenameList {
                list_id: parse_number(require_arg(args, "list-id")?, "list id")?,
                name: require_arg(args, "name")?,
            },
            "words" => Self::Words {
                list_id: parse_number(require_arg(args, "list-id")?, "list id")?,
            },
            "add-word" => Self::AddWord {
                list_id: parse_number(require_arg(args, "list-id")?, "list id")?,
                draft_original: require_arg(args, "original")?,
                draft_translation: require_arg(args, "translation")?,
            },
            "search" => {
                let query: Vec<String> = args.by_ref().collect();
                if query.is_empty() {
                    return Err(ArgsError::MissingArgument { name: "query" });
                }
                Self::Search {
                    query: query.join(" "),
                }
            }
            "dictation" => {
                let source = require_arg(args, "list-id|catalog-slug")?;
                let mut direction = Direction::OriginalToTranslation;
                let mut order = DictationOrder::ListOrder;
                for arg in args.by_ref() {
                    match arg.as_str() {
                        "--reverse" => direction = Direction::TranslationToOriginal,
                        "--shuffle" => order = DictationOrder::Shuffled,
                        _ => return Err(ArgsError::UnknownArg(arg)),
                    }
                }
                Self::Dictation {
                    source,
                    direction,
                    order,
                }
            }
            "seed" => Self::Seed,
            other => return Err(ArgsError::UnknownCommand(other.to_string())),
        };

        if let Some(extra) = args.next() {
            return Err(ArgsError::UnknownArg(extra));
        }
        Ok(cmd)
    }
}

struct Args {
    db_url: String,
    command: Command,
}

impl Args {
    fn parse(mut args: impl Iterator<Item = String>) -> Result<Option<Self>, ArgsError> {
        let mut db_url = normalize_sqlite_url(
            std::env::var("VOCAB_DB_URL").unwrap_or_else(|_| "sqlite:vocab.sqlite3".into()),
        );

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--help" | "-h" => return Ok(None),
                flag if flag.starts_with("--") => return Err(ArgsError::UnknownArg(arg)),
                name => {
                    let command = Command::parse(name, &mut args)?;
                    return Ok(Some(Self { db_url, command }));
                }
            }
        }

        Ok(Some(Self {
            db_url,
            command: Command::Status,
        }))
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

fn init_tracing() {
    // Logs go to stderr; stdout is for command output.
    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "warn,services=info,storage=info,app=info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let parsed = match Args::parse(std::env::args().skip(1)) {
        Ok(Some(parsed)) => parsed,
        Ok(None) => {
            print_usage();
            return Ok(());
        }
        Err(err) => {
            eprintln!("{err}");
            print_usage();
            return Err(err.into());
        }
    };

    // Open + migrate SQLite here so services stay free of filesystem concerns.
    prepare_sqlite_file(&parsed.db_url)?;
    let app = AppServices::new_sqlite(&parsed.db_url, Clock::default_clock()).await?;
    tracing::debug!(db_url = %parsed.db_url, "storage ready");

    match parsed.command {
        Command::Status => print_status(&app).await,
        Command::Practice { limit } => practice(&app, limit).await?,
        Command::Goal { minutes } => {
            let mut timer = app.practice_timer().await;
            let goal = timer.set_goal_minutes(minutes).await?;
            println!("Daily goal set to {goal} minutes.");
        }
        Command::Lists => {
            for list in app.vocabulary().lists().await? {
                println!("{:>4}  {}", list.id(), list.name());
            }
        }
        Command::CreateList { name } => {
            let list = app.vocabulary().create_list(&name).await?;
            println!("Created list {} ({}).", list.name(), list.id());
        }
        Command::RenameList { list_id, name } => {
            let list = app.vocabulary().rename_list(list_id, &name).await?;
            println!("Renamed list {} to {}.", list.id(), list.name());
        }
        Command::Words { list_id } => {
            for word in app.vocabulary().words(list_id).await? {
                println!("{:>4}  {} = {}", word.id(), word.original(), word.translation());
            }
        }
        Command::AddWord {
            list_id,
            draft_original,
            draft_translation,
        } => {
            let word = app
                .vocabulary()
                .add_word(list_id, WordDraft::new(draft_original, draft_translation))
                .await?;
            println!("Added {} = {}.", word.original(), word.translation());
        }
        Command::Search { query } => {
            let hits = app.search().search(&query).await?;
            if hits.is_empty() {
                println!("No results for \"{query}\".");
            } else {
                println!("{} results:", hits.len());
                for hit in hits {
                    println!(
                        "  {} = {}  [{}]",
                        hit.word.original(),
                        hit.word.translation(),
                        hit.source
                    );
                }
            }
        }
        Command::Dictation {
            source,
            direction,
            order,
        } => {
            let dictation = app.dictation();
            let round = match source.parse::<ListId>() {
                Ok(list_id) => dictation.start_for_list(list_id, direction, order).await?,
                Err(_) => dictation.start_for_catalog(&source, direction, order)?,
            };
            run_dictation(&round)?;
        }
        Command::Seed => {
            let vocabulary = app.vocabulary();
            let list = vocabulary.create_list("Everyday").await?;
            for (original, translation) in [("house", "בית"), ("book", "ספר"), ("friend", "חבר")] {
                vocabulary
                    .add_word(list.id(), WordDraft::new(original, translation))
                    .await?;
            }
            println!("Seeded list {} ({}).", list.name(), list.id());
        }
    }

    Ok(())
}

async fn print_status(app: &AppServices) {
    let progress = app.practice_timer().await.progress();
    println!(
        "Today: {} of {} minutes ({:.0}%){}",
        progress.elapsed_label(),
        progress.goal_minutes,
        progress.percent,
        if progress.goal_reached { "  done!" } else { "" }
    );
}

async fn practice(
    app: &AppServices,
    limit: Option<Duration>,
) -> Result<(), Box<dyn std::error::Error>> {
    let session = app.start_practice(&TokioScheduler).await;
    let mut events = session.subscribe().await;
    let progress = session.progress().await;
    println!(
        "Practicing. {} so far, goal {} minutes. Ctrl-C to stop.",
        progress.elapsed_label(),
        progress.goal_minutes
    );

    let deadline = async {
        match limit {
            Some(limit) => tokio::time::sleep(limit).await,
            None => std::future::pending().await,
        }
    };
    tokio::pin!(deadline);

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            () = &mut deadline => break,
            event = events.recv() => match event {
                Ok(PracticeEvent::GoalReached { goal_minutes, .. }) => {
                    println!("Well done! You reached your daily goal of {goal_minutes} minutes.");
                }
                Ok(PracticeEvent::DayRolledOver { date }) => {
                    println!("A new day has started ({date}).");
                }
                Err(RecvError::Lagged(_)) => {}
                Err(RecvError::Closed) => break,
            },
        }
    }

    let last = session.stop().await;
    println!("Stopped at {}.", format_elapsed(last.elapsed_seconds));
    Ok(())
}

fn run_dictation(round: &DictationRound) -> Result<(), Box<dyn std::error::Error>> {
    println!("Dictation: {} ({} words)", round.source(), round.len());
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    let mut answers = HashMap::new();

    for prompt in round.prompts() {
        print!("{} > ", prompt.text);
        io::stdout().flush()?;
        let Some(line) = lines.next() else {
            break;
        };
        answers.insert(prompt.word_id, line?);
    }

    let result = round.check(&answers);
    for answer in result.answers.iter().filter(|a| !a.is_correct) {
        println!("  expected {:?}, got {:?}", answer.expected, answer.user_answer);
    }
    println!(
        "{}/{} correct. {}",
        result.correct,
        result.total,
        result.encouragement().message()
    );
    Ok(())
}

#[tokio::main]
async fn main() {
    init_tracing();
    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
