mod demo;
mod play;

use std::fmt;

use lingo_core::model::{Difficulty, Language, Theme};
use services::{ApiConfig, AppServices, Clock, RegisterDraft};
use storage::repository::Storage;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::play::Prompt;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidLanguage { raw: String },
    InvalidLevel { raw: String },
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidLanguage { raw } => write!(f, "invalid --lang value: {raw}"),
            ArgsError::InvalidLevel { raw } => write!(f, "invalid --level value: {raw}"),
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

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- <command> [--db <sqlite_url>] [--lang <fr|es|de|it>] [--level <easy|medium|hard>] [--demo]");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  quiz         multiple-choice quiz (default)");
    eprintln!("  drag         drag-and-drop word matching");
    eprintln!("  guess        guess the hidden word letter by letter");
    eprintln!("  flashcards   browse flashcards page by page");
    eprintln!("  bingo        translate the words on a bingo card");
    eprintln!("  dictionary   look up single words");
    eprintln!("  login        log in (asks for username and password)");
    eprintln!("  register     create an account");
    eprintln!("  logout       forget the stored token");
    eprintln!("  theme        show the theme; `theme toggle|light|dark` changes it");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db sqlite://lingo.sqlite3");
    eprintln!("  --lang last selected language, else fr");
    eprintln!("  --level easy (bingo only)");
    eprintln!("  --demo plays against built-in sample content, nothing leaves the process");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  LINGO_DB_URL, LINGO_LANG, LINGO_API_BASE_URL, LINGO_AUTH_BASE_URL, RUST_LOG");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Quiz,
    Drag,
    Guess,
    Flashcards,
    Bingo,
    Dictionary,
    Login,
    Register,
    Logout,
    Theme,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "quiz" => Some(Self::Quiz),
            "drag" => Some(Self::Drag),
            "guess" => Some(Self::Guess),
            "flashcards" => Some(Self::Flashcards),
            "bingo" => Some(Self::Bingo),
            "dictionary" => Some(Self::Dictionary),
            "login" => Some(Self::Login),
            "register" => Some(Self::Register),
            "logout" => Some(Self::Logout),
            "theme" => Some(Self::Theme),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ThemeAction {
    Show,
    Toggle,
    Set(Theme),
}

struct Args {
    db_url: String,
    language: Option<Language>,
    level: Option<Difficulty>,
    demo: bool,
    theme: ThemeAction,
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut db_url = std::env::var("LINGO_DB_URL")
            .ok()
            .map_or_else(|| "sqlite://lingo.sqlite3".into(), normalize_sqlite_url);
        let mut language = std::env::var("LINGO_LANG")
            .ok()
            .and_then(|value| value.parse::<Language>().ok());
        let mut level = None;
        let mut demo = false;
        let mut theme = ThemeAction::Show;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--lang" => {
                    let value = require_value(args, "--lang")?;
                    let parsed = value
                        .parse::<Language>()
                        .map_err(|_| ArgsError::InvalidLanguage { raw: value.clone() })?;
                    language = Some(parsed);
                }
                "--level" => {
                    let value = require_value(args, "--level")?;
                    let parsed = value
                        .parse::<Difficulty>()
                        .map_err(|_| ArgsError::InvalidLevel { raw: value.clone() })?;
                    level = Some(parsed);
                }
                "--demo" => demo = true,
                "toggle" => theme = ThemeAction::Toggle,
                "light" => theme = ThemeAction::Set(Theme::Light),
                "dark" => theme = ThemeAction::Set(Theme::Dark),
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            db_url,
            language,
            level,
            demo,
            theme,
        })
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

async fn build_services(args: &Args) -> Result<AppServices, Box<dyn std::error::Error>> {
    let clock = Clock::default();
    if args.demo {
        let services = AppServices::with_backend(&Storage::in_memory(), demo::backend(), clock);
        services
            .auth()
            .login(demo::USERNAME, demo::PASSWORD)
            .await?;
        tracing::info!(user = demo::USERNAME, "demo mode, logged in");
        return Ok(services);
    }

    prepare_sqlite_file(&args.db_url)?;
    let config = ApiConfig::from_env()?;
    tracing::debug!(base_url = %config.base_url(), "using remote backend");
    Ok(AppServices::new_sqlite(&args.db_url, config, clock).await?)
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv: Vec<String> = std::env::args().skip(1).collect();

    let cmd = match argv.first().map(String::as_str) {
        None => Command::Quiz,
        Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) if first.starts_with("--") => Command::Quiz,
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };

    if !argv.is_empty() && !argv[0].starts_with("--") {
        argv.remove(0);
    }

    let mut iter = argv.into_iter();
    let parsed = Args::parse(&mut iter).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;
    if parsed.theme != ThemeAction::Show && cmd != Command::Theme {
        eprintln!("light/dark/toggle only apply to the theme command");
        print_usage();
        return Err(ArgsError::UnknownArg("theme value".into()).into());
    }
    if parsed.level.is_some() && cmd != Command::Bingo {
        eprintln!("--level only applies to the bingo command");
        print_usage();
        return Err(ArgsError::UnknownArg("--level".into()).into());
    }

    let services = build_services(&parsed).await?;
    let prefs = services.prefs();
    let language = match parsed.language {
        Some(language) => {
            prefs.set_selected_language(language).await?;
            language
        }
        None => prefs.selected_language().await?,
    };

    let mut prompt = Prompt::stdin();
    match cmd {
        Command::Quiz => play::quiz(&services, language, &mut prompt).await?,
        Command::Drag => play::drag(&services, language, &mut prompt).await?,
        Command::Guess => play::guess(&services, language, &mut prompt).await?,
        Command::Flashcards => play::flashcards(&services, language, &mut prompt).await?,
        Command::Bingo => {
            let level = parsed.level.unwrap_or_default();
            play::bingo(&services, language, level, &mut prompt).await?;
        }
        Command::Dictionary => play::dictionary(&services, language, &mut prompt).await?,
        Command::Login => {
            let Some(username) = prompt.ask("username: ").await? else {
                return Ok(());
            };
            let Some(password) = prompt.ask("password: ").await? else {
                return Ok(());
            };
            match services.auth().login(&username, &password).await {
                Ok(identity) => println!("Logged in as {} ({})", identity.username, identity.role),
                Err(err) => println!("{}", err.user_message()),
            }
        }
        Command::Register => {
            let mut draft = RegisterDraft::default();
            for (label, field) in [
                ("username: ", &mut draft.username),
                ("email: ", &mut draft.email),
                ("password: ", &mut draft.password),
            ] {
                let Some(value) = prompt.ask(label).await? else {
                    return Ok(());
                };
                *field = value;
            }
            match services.auth().register(&draft).await {
                Ok(()) => println!("Registration successful! You can now log in."),
                Err(err) => println!("{}", err.user_message()),
            }
        }
        Command::Logout => {
            services.auth().logout().await?;
            println!("Logged out.");
        }
        Command::Theme => {
            let theme = match parsed.theme {
                ThemeAction::Show => prefs.theme(false).await?,
                ThemeAction::Toggle => prefs.toggle_theme(false).await?,
                ThemeAction::Set(theme) => {
                    prefs.set_theme(theme).await?;
                    theme
                }
            };
            println!("Theme: {theme}");
        }
    }
    Ok(())
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

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
