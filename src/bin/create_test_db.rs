use std::error::Error;
use std::fs;
use std::path::PathBuf;
use std::process::exit;

use clap::Parser;
use rusqlite::{Connection, params};

use cash_card::{CARD_OWNER_ROLE, PasswordHash, UserConfig, UsersConfig, initialize_db};

/// A utility for creating a demo database and users file for the cash card server.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: PathBuf,

    /// File path to save the users JSON file to.
    #[arg(long, short)]
    users_path: PathBuf,
}

const DEMO_CASH_CARDS: [(i64, f64, &str); 4] = [
    (99, 123.45, "Sarah"),
    (100, 1.00, "Sarah"),
    (101, 150.00, "Sarah"),
    (102, 200.00, "Kumar"),
];

const DEMO_USERS: [(&str, &str, &str); 3] = [
    ("Sarah", "abc123", CARD_OWNER_ROLE),
    ("hank-owns-no-cards", "qrs456", "NON-OWNER"),
    ("Kumar", "xyz789", CARD_OWNER_ROLE),
];

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    match args.output_path.extension() {
        Some(extension) if !extension.is_empty() => {}
        _ => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
    }

    for path in [&args.output_path, &args.users_path] {
        if path.is_file() {
            eprintln!("File already exists at {path:#?}!");
            exit(1);
        }
    }

    println!("Creating database at {:#?}", args.output_path);
    let mut conn = Connection::open(&args.output_path)?;

    initialize_db(&conn)?;

    println!("Creating demo cash cards...");
    let transaction = conn.transaction()?;
    for (id, amount, owner) in DEMO_CASH_CARDS {
        transaction.execute(
            "INSERT INTO cash_card (id, amount, owner) VALUES (?1, ?2, ?3)",
            params![id, amount, owner],
        )?;
    }
    transaction.commit()?;

    println!("Creating demo users at {:#?}...", args.users_path);
    let users = DEMO_USERS
        .iter()
        .map(|(username, password, role)| {
            Ok(UserConfig {
                username: (*username).to_owned(),
                password_hash: PasswordHash::from_raw_password(password, PasswordHash::DEFAULT_COST)?,
                roles: vec![(*role).to_owned()],
            })
        })
        .collect::<Result<Vec<_>, cash_card::Error>>()?;

    fs::write(
        &args.users_path,
        serde_json::to_string_pretty(&UsersConfig { users })?,
    )?;

    println!("Success!");

    Ok(())
}
