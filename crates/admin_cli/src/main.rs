use std::{error::Error, io::Write, process::ExitCode};

use clap::{Args, Parser, Subcommand};
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    style::Print,
    terminal,
    terminal::ClearType,
};
use engine::{BbFields, BbKind, Engine, EngineError, PAGE_SIZE, Price, Registration};
use migration::MigratorTrait;
use sea_orm::Database;

type CliResult<T> = Result<T, Box<dyn Error + Send + Sync>>;

#[derive(Parser, Debug)]
#[command(name = "bboard_admin")]
#[command(about = "Admin utilities for the bulletin board (accounts, rubrics, listings)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./bboard.db?mode=rwc"
    )]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Accounts.
    User(User),
    /// Listing categories.
    Rubric(Rubric),
    /// Listings.
    Bb(Bb),
    /// Demo SMS records.
    Sms(Sms),
}

#[derive(Args, Debug)]
struct User {
    #[command(subcommand)]
    command: UserCommand,
}

#[derive(Subcommand, Debug)]
enum UserCommand {
    Create(UserCreateArgs),
}

#[derive(Args, Debug)]
struct UserCreateArgs {
    #[arg(long)]
    username: String,
    #[arg(long, default_value = "")]
    email: String,
    #[arg(long, default_value = "")]
    first_name: String,
    #[arg(long, default_value = "")]
    last_name: String,
}

#[derive(Args, Debug)]
struct Rubric {
    #[command(subcommand)]
    command: RubricCommand,
}

#[derive(Subcommand, Debug)]
enum RubricCommand {
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        photo: Option<String>,
    },
    /// Rubrics with their listing counts, most populated first.
    List,
    Delete {
        #[arg(long)]
        id: i32,
    },
}

#[derive(Args, Debug)]
struct Bb {
    #[command(subcommand)]
    command: BbCommand,
}

#[derive(Subcommand, Debug)]
enum BbCommand {
    Create(BbCreateArgs),
    List {
        #[arg(long)]
        page: Option<String>,
    },
    Delete {
        #[arg(long)]
        id: i32,
    },
}

#[derive(Args, Debug)]
struct BbCreateArgs {
    #[arg(long)]
    title: String,
    #[arg(long)]
    content: Option<String>,
    /// Decimal price, e.g. `15000.00`.
    #[arg(long)]
    price: Option<String>,
    #[arg(long)]
    rubric: Option<i32>,
    /// `buy`, `sell` or `exchange` (or the one-letter code).
    #[arg(long, default_value = "sell")]
    kind: String,
    #[arg(long)]
    photo: Option<String>,
}

#[derive(Args, Debug)]
struct Sms {
    #[command(subcommand)]
    command: SmsCommand,
}

#[derive(Subcommand, Debug)]
enum SmsCommand {
    Add {
        #[arg(long)]
        text: String,
    },
    List,
}

struct RawModeGuard;

impl RawModeGuard {
    fn enter() -> CliResult<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

/// Reads a line without echoing it, printing `*` per character.
fn prompt_password(prompt: &str) -> CliResult<String> {
    let _raw = RawModeGuard::enter()?;

    let mut out = std::io::stderr();
    execute!(
        out,
        cursor::MoveToColumn(0),
        terminal::Clear(ClearType::CurrentLine),
        Print(prompt)
    )?;
    out.flush()?;

    let mut buf = String::new();
    loop {
        let Event::Key(KeyEvent {
            code, modifiers, ..
        }) = event::read()?
        else {
            continue;
        };

        match code {
            KeyCode::Enter => {
                execute!(out, Print("\r\n"))?;
                out.flush()?;
                break;
            }
            KeyCode::Backspace => {
                if buf.pop().is_some() {
                    execute!(out, cursor::MoveLeft(1), Print(" "), cursor::MoveLeft(1))?;
                    out.flush()?;
                }
            }
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                execute!(out, Print("\r\n"))?;
                out.flush()?;
                return Err("interrupted".into());
            }
            KeyCode::Char(ch) if !modifiers.contains(KeyModifiers::CONTROL) => {
                buf.push(ch);
                execute!(out, Print("*"))?;
                out.flush()?;
            }
            _ => {}
        }
    }

    Ok(buf)
}

/// Prints the field errors of a rejected write; any other error is passed on.
fn report(err: EngineError) -> CliResult<ExitCode> {
    match err {
        EngineError::Validation(errors) => {
            for error in errors {
                eprintln!("{}: {}", error.field, error.message);
            }
            Ok(ExitCode::from(2))
        }
        EngineError::KeyNotFound(what) => {
            eprintln!("not found: {what}");
            Ok(ExitCode::FAILURE)
        }
        EngineError::ReferentialIntegrity(name) => {
            eprintln!("rubric '{name}' still has listings, delete or move them first");
            Ok(ExitCode::FAILURE)
        }
        EngineError::InvalidKind(kind) => {
            eprintln!("unknown listing kind: {kind}");
            Ok(ExitCode::from(2))
        }
        other => Err(other.into()),
    }
}

fn parse_price(raw: Option<&str>) -> Result<Option<Price>, String> {
    raw.map(|raw| raw.parse::<Price>().map_err(|err| format!("price: {err}")))
        .transpose()
}

async fn run(engine: &Engine, command: Command) -> Result<(), EngineError> {
    match command {
        Command::User(User {
            command: UserCommand::Create(args),
        }) => {
            let (password1, password2) = match prompt_password("Password: ")
                .and_then(|p1| Ok((p1, prompt_password("Confirm password: ")?)))
            {
                Ok(passwords) => passwords,
                Err(err) => {
                    eprintln!("{err}");
                    std::process::exit(1);
                }
            };
            let user = engine
                .register(Registration {
                    username: args.username,
                    email: args.email,
                    first_name: args.first_name,
                    last_name: args.last_name,
                    password1,
                    password2,
                })
                .await?;
            println!("created user: {}", user.username);
        }
        Command::Rubric(Rubric { command }) => match command {
            RubricCommand::Create { name, photo } => {
                let rubric = engine.new_rubric(&name, photo.as_deref()).await?;
                println!("created rubric: {} ({})", rubric.name, rubric.id);
            }
            RubricCommand::List => {
                for rubric in engine.rubrics_by_popularity().await? {
                    println!("{:>4}  {:<20}  {}", rubric.id, rubric.name, rubric.count);
                }
            }
            RubricCommand::Delete { id } => {
                engine.delete_rubric(id).await?;
                println!("deleted rubric {id}");
            }
        },
        Command::Bb(Bb { command }) => match command {
            BbCommand::Create(args) => {
                let kind = BbKind::try_from(args.kind.as_str())?;
                let price = match parse_price(args.price.as_deref()) {
                    Ok(price) => price,
                    Err(err) => {
                        eprintln!("{err}");
                        std::process::exit(2);
                    }
                };
                let bb = engine
                    .new_bb(BbFields {
                        kind,
                        rubric_id: args.rubric,
                        title: args.title,
                        content: args.content,
                        price,
                        photo: args.photo,
                    })
                    .await?;
                println!("created listing: {} ({})", bb.title_and_price(), bb.id);
            }
            BbCommand::List { page } => {
                let page = engine.bbs_page(page.as_deref(), PAGE_SIZE).await?;
                for bb in &page.items {
                    println!(
                        "{:>4}  {}  {}  {}",
                        bb.id,
                        bb.published.format("%Y-%m-%d %H:%M"),
                        bb.kind.label(),
                        bb.title_and_price()
                    );
                }
                println!(
                    "page {} of {} ({} listings)",
                    page.number, page.num_pages, page.total
                );
            }
            BbCommand::Delete { id } => {
                engine.delete_bb(id).await?;
                println!("deleted listing {id}");
            }
        },
        Command::Sms(Sms { command }) => match command {
            SmsCommand::Add { text } => {
                let sms = engine.new_sms(&text).await?;
                println!("stored sms {}", sms.id);
            }
            SmsCommand::List => {
                for sms in engine.sms_list().await? {
                    println!("{}  {}", sms.created_at.format("%Y-%m-%d %H:%M"), sms.text);
                }
            }
        },
    }
    Ok(())
}

#[tokio::main]
async fn main() -> CliResult<ExitCode> {
    let cli = Cli::parse();

    let db = Database::connect(cli.database_url.as_str()).await?;
    migration::Migrator::up(&db, None).await?;
    let engine = Engine::builder().database(db).build().await?;

    match run(&engine, cli.command).await {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(err) => report(err),
    }
}
