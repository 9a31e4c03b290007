mod command;
mod render;

use std::fmt;
use std::path::{Path, PathBuf};

use quiz_core::model::QuizSettingsDraft;
use services::{Clock, QuizLoopService, SessionController, SessionView, SetupError};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use command::{Command, HELP};
use render::render_view;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    MissingFile,
    UnknownArg(String),
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::MissingFile => f.write_str("no idiom file given (--file or QUIZ_FILE)"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
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

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  idiom-quiz --file <idioms.csv> [--seed <n>] [--time <secs>] [--per-question] [--json]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --time 30, overall timer, fresh shuffle each run");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  QUIZ_FILE, QUIZ_SEED, QUIZ_TIME_LIMIT, QUIZ_PER_QUESTION, RUST_LOG");
}

#[derive(Debug)]
struct Args {
    file: PathBuf,
    draft: QuizSettingsDraft,
    json: bool,
}

fn env_flag(name: &str) -> bool {
    std::env::var(name)
        .map(|value| matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut file = std::env::var("QUIZ_FILE").ok().map(PathBuf::from);
        let mut draft = QuizSettingsDraft {
            seed: std::env::var("QUIZ_SEED").ok(),
            time_limit: std::env::var("QUIZ_TIME_LIMIT").ok(),
            per_question: env_flag("QUIZ_PER_QUESTION"),
        };
        let mut json = false;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--file" => file = Some(PathBuf::from(require_value(args, "--file")?)),
                "--seed" => draft.seed = Some(require_value(args, "--seed")?),
                "--time" => draft.time_limit = Some(require_value(args, "--time")?),
                "--per-question" => draft.per_question = true,
                "--json" => json = true,
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        let file = file.ok_or(ArgsError::MissingFile)?;
        Ok(Self { file, draft, json })
    }
}

struct Printer {
    json: bool,
    last: Option<SessionView>,
}

impl Printer {
    fn show(&mut self, view: SessionView) {
        if self.json {
            match serde_json::to_string(&view) {
                Ok(line) => println!("{line}"),
                Err(err) => eprintln!("failed to encode view: {err}"),
            }
        } else if self.last.as_ref().is_some_and(|last| same_screen(last, &view)) {
            if view.timer_active {
                println!("  time left {}", view.timer);
            }
        } else {
            println!("{}", render_view(&view));
        }
        self.last = Some(view);
    }

    fn show_changed(&mut self, session: &SessionController) {
        let view = session.view();
        if self.last.as_ref() != Some(&view) {
            self.show(view);
        }
    }
}

/// True if two views differ only in the countdown text.
fn same_screen(a: &SessionView, b: &SessionView) -> bool {
    let mut a = a.clone();
    a.timer.clone_from(&b.timer);
    a == *b
}

fn apply(session: &mut SessionController, command: Command) -> Result<(), services::SessionError> {
    match command {
        Command::Select(letter) => {
            session.select_pending(letter);
        }
        Command::Check => {
            session.commit_answer()?;
        }
        Command::Next => {
            session.advance();
        }
        Command::Previous => {
            session.retreat()?;
        }
        Command::Jump(index) => {
            session.jump_to(index)?;
        }
        Command::Flag => {
            session.toggle_flag();
        }
        Command::Finish => {
            session.finish_all();
        }
        Command::Retry | Command::Open(_) | Command::Help | Command::Quit => {}
    }
    Ok(())
}

/// Switch the quiz to a new idiom file and start a session from it.
///
/// The current file stays in use if the new one cannot be loaded.
async fn open_quiz(
    quiz: &mut QuizLoopService,
    path: &Path,
) -> Result<SessionController, SetupError> {
    let source = storage::open_source(path)?;
    debug!(file = %path.display(), "switching idiom file");
    quiz.replace_source(source).await
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv = std::env::args().skip(1);
    let args = Args::parse(&mut argv).inspect_err(|_| print_usage())?;
    let settings = args.draft.validate()?;
    debug!(file = %args.file.display(), ?settings, "starting quiz");

    let source = storage::open_source(&args.file)?;
    let mut quiz = QuizLoopService::new(Clock::default(), source, settings);
    let mut session = quiz.start().await?;

    let mut printer = Printer {
        json: args.json,
        last: None,
    };
    if !args.json {
        println!("{HELP}\n");
    }
    printer.show(session.view());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match Command::parse(&line) {
                    Ok(Command::Quit) => break,
                    Ok(Command::Help) => println!("{HELP}"),
                    Ok(Command::Retry) => match quiz.retry().await {
                        Ok(fresh) => {
                            session = fresh;
                            printer.last = None;
                        }
                        Err(err) => println!("{err}"),
                    },
                    Ok(Command::Open(path)) => match open_quiz(&mut quiz, &path).await {
                        Ok(fresh) => {
                            session = fresh;
                            printer.last = None;
                        }
                        Err(err) => println!("{err}"),
                    },
                    Ok(command) => {
                        if let Err(err) = apply(&mut session, command) {
                            println!("{err}");
                        }
                    }
                    Err(err) => println!("{err}"),
                }
            }
            Some(event) = session.next_timer_event() => {
                session.handle_timer_event(event);
            }
        }
        printer.show_changed(&session);
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(1);
    }
}
