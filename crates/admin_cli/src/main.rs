use std::{error::Error, io::Write};

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    style::Print,
    terminal,
    terminal::ClearType,
};
use chrono_tz::Tz;
use engine::{CashEntryFilter, Engine, NewItem, PayrollPolicy, Role, calendar, users};
use migration::MigratorTrait;
use sea_orm::{ActiveModelTrait, Database, DatabaseConnection, EntityTrait, Set};

mod settings;

#[derive(Parser, Debug)]
#[command(name = "perla_admin")]
#[command(about = "Admin utilities for InternetPerla (users, catalogue, cash closure)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite:./perla.db?mode=rwc")]
    database_url: String,

    /// IANA name of the business timezone; overrides `business.timezone`.
    #[arg(long)]
    timezone: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    User(User),
    Warehouse(Warehouse),
    Item(Item),
    Cash(Cash),
}

#[derive(Args, Debug)]
struct User {
    #[command(subcommand)]
    command: UserCommand,
}

#[derive(Subcommand, Debug)]
enum UserCommand {
    Create(UserCreateArgs),
    /// Blocks login and stops payroll accruals for the user.
    Deactivate(UsernameArgs),
}

#[derive(Args, Debug)]
struct UserCreateArgs {
    #[arg(long)]
    username: String,
    #[arg(long)]
    display_name: Option<String>,
    #[arg(long, default_value = "worker", value_parser = parse_role)]
    role: Role,
}

#[derive(Args, Debug)]
struct UsernameArgs {
    #[arg(long)]
    username: String,
}

#[derive(Args, Debug)]
struct Warehouse {
    #[command(subcommand)]
    command: WarehouseCommand,
}

#[derive(Subcommand, Debug)]
enum WarehouseCommand {
    Create(WarehouseCreateArgs),
}

#[derive(Args, Debug)]
struct WarehouseCreateArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    location: Option<String>,
}

#[derive(Args, Debug)]
struct Item {
    #[command(subcommand)]
    command: ItemCommand,
}

#[derive(Subcommand, Debug)]
enum ItemCommand {
    Create(ItemCreateArgs),
}

#[derive(Args, Debug)]
struct ItemCreateArgs {
    #[arg(long)]
    sku: String,
    #[arg(long)]
    name: String,
    #[arg(long)]
    category: Option<String>,
    #[arg(long, default_value_t = 0)]
    min_stock: i64,
}

#[derive(Args, Debug)]
struct Cash {
    #[command(subcommand)]
    command: CashCommand,
}

#[derive(Subcommand, Debug)]
enum CashCommand {
    /// Closes a business date (default: today). Safe to repeat.
    Close(CloseArgs),
    /// Prints live totals per date.
    Totals(TotalsArgs),
}

#[derive(Args, Debug)]
struct CloseArgs {
    #[arg(long, value_parser = parse_date)]
    date: Option<NaiveDate>,
    /// Flat wage accrued per worker; overrides `business.daily_rate`.
    #[arg(long)]
    daily_rate: Option<String>,
}

#[derive(Args, Debug)]
struct TotalsArgs {
    #[arg(long, value_parser = parse_date)]
    from: Option<NaiveDate>,
    #[arg(long, value_parser = parse_date)]
    to: Option<NaiveDate>,
}

fn parse_role(raw: &str) -> Result<Role, String> {
    Role::try_from(raw).map_err(|err| err.to_string())
}

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    calendar::parse_date(raw).map_err(|err| err.to_string())
}

struct RawModeGuard;

impl RawModeGuard {
    fn enter() -> Result<Self, Box<dyn Error + Send + Sync>> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

fn prompt_password(prompt: &str) -> Result<String, Box<dyn Error + Send + Sync>> {
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

fn prompt_password_twice() -> Result<String, Box<dyn Error + Send + Sync>> {
    let mut out = std::io::stderr();
    for _ in 0..3 {
        let first = prompt_password("Password: ")?;
        if first.is_empty() {
            execute!(
                out,
                cursor::MoveToColumn(0),
                terminal::Clear(ClearType::CurrentLine),
                Print("Password must not be empty.\r\n")
            )?;
            continue;
        }

        if first == prompt_password("Confirm password: ")? {
            return Ok(first);
        }

        execute!(
            out,
            cursor::MoveToColumn(0),
            terminal::Clear(ClearType::CurrentLine),
            Print("Passwords do not match. Try again.\r\n")
        )?;
    }

    Err("too many attempts".into())
}

async fn connect_db(
    database_url: &str,
) -> Result<DatabaseConnection, Box<dyn Error + Send + Sync>> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

async fn build_engine(
    db: &DatabaseConnection,
    timezone: Tz,
    payroll: PayrollPolicy,
) -> Result<Engine, Box<dyn Error + Send + Sync>> {
    Ok(Engine::builder()
        .database(db.clone())
        .timezone(timezone)
        .payroll(payroll)
        .build()
        .await?)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();
    let business = settings::Business::load()?;
    let timezone = business.timezone(cli.timezone.as_deref())?;

    let db = connect_db(&cli.database_url).await?;

    match cli.command {
        Command::User(User {
            command: UserCommand::Create(args),
        }) => {
            if users::Entity::find_by_id(args.username.clone())
                .one(&db)
                .await?
                .is_some()
            {
                eprintln!("user already exists: {}", args.username);
                std::process::exit(1);
            }

            let password = prompt_password_twice()?;
            let user = users::ActiveModel {
                username: Set(args.username.clone()),
                password: Set(password),
                display_name: Set(args.display_name.unwrap_or_else(|| args.username.clone())),
                role: Set(args.role.as_str().to_string()),
                active: Set(true),
            };
            users::Entity::insert(user).exec(&db).await?;

            println!("created {}: {}", args.role.as_str(), args.username);
        }
        Command::User(User {
            command: UserCommand::Deactivate(args),
        }) => {
            let Some(user) = users::Entity::find_by_id(args.username.clone())
                .one(&db)
                .await?
            else {
                eprintln!("user not found: {}", args.username);
                std::process::exit(1);
            };

            let mut user: users::ActiveModel = user.into();
            user.active = Set(false);
            user.update(&db).await?;
            println!("deactivated user: {}", args.username);
        }
        Command::Warehouse(Warehouse {
            command: WarehouseCommand::Create(args),
        }) => {
            let engine = build_engine(&db, timezone, PayrollPolicy::default()).await?;
            let warehouse = engine
                .new_warehouse(&args.name, args.location.as_deref())
                .await?;
            println!("created warehouse: {} ({})", warehouse.name, warehouse.id);
        }
        Command::Item(Item {
            command: ItemCommand::Create(args),
        }) => {
            let engine = build_engine(&db, timezone, PayrollPolicy::default()).await?;
            let item = engine
                .new_item(NewItem {
                    sku: args.sku,
                    name: args.name,
                    category: args.category,
                    min_stock: args.min_stock,
                })
                .await?;
            println!("created item: {} {} ({})", item.sku, item.name, item.id);
        }
        Command::Cash(Cash {
            command: CashCommand::Close(args),
        }) => {
            let payroll = business.payroll(args.daily_rate.as_deref())?;
            let engine = build_engine(&db, timezone, payroll).await?;
            let date = args.date.unwrap_or_else(|| engine.today());
            let closure = engine.close_day(date, "admin_cli").await?;

            println!(
                "{date} {}: incomes {} expenses {} balance {}",
                closure.status.as_str(),
                closure.summary.incomes,
                closure.summary.expenses,
                closure.summary.balance
            );
            for accrual in &closure.accrued {
                println!("  accrued {} to {}", accrual.amount, accrual.user_name);
            }
        }
        Command::Cash(Cash {
            command: CashCommand::Totals(args),
        }) => {
            let engine = build_engine(&db, timezone, PayrollPolicy::default()).await?;
            let today = engine.today();
            let filter = CashEntryFilter {
                from: args.from.unwrap_or(today),
                to: args.to.unwrap_or(today),
                created_by: None,
            };
            for totals in engine.compute_totals(&filter).await? {
                println!(
                    "{}  +{:>12}  -{:>12}  ={:>12}",
                    totals.date,
                    totals.incomes.to_string(),
                    totals.expenses.to_string(),
                    totals.balance.to_string()
                );
            }
        }
    }

    Ok(())
}
