use std::{io, process::exit};

use clap::Parser;

use cash_card::PasswordHash;

/// A utility for hashing a password for the cash card users file.
///
/// The hash is printed to stdout, copy it into the `password_hash` field of a user.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// The bcrypt cost to hash with.
    #[arg(long, default_value_t = PasswordHash::DEFAULT_COST)]
    cost: u32,
}

fn main() {
    let args = Args::parse();

    let Some(password) = get_new_password() else {
        exit(1);
    };

    match PasswordHash::from_raw_password(&password, args.cost) {
        Ok(password_hash) => println!("{password_hash}"),
        Err(error) => {
            print_error(format!("Could not hash password: {error}"));
            exit(1);
        }
    }
}

fn get_new_password() -> Option<String> {
    loop {
        let first_password = prompt("Enter a password: ")?;

        if first_password.is_empty() {
            print_error("Password cannot be empty, try again.");
            continue;
        }

        let second_password = prompt("Enter the same password again: ")?;

        if first_password != second_password {
            print_error("Passwords must match, try again.");
            continue;
        }

        return Some(first_password);
    }
}

fn prompt(message: &str) -> Option<String> {
    match rpassword::prompt_password(message) {
        Ok(string) => Some(string),
        Err(error) if error.kind() == io::ErrorKind::UnexpectedEof => None,
        Err(error) => {
            print_error(format!("Could not read password from stdin: {error}"));
            None
        }
    }
}

fn print_error(error: impl ToString) {
    eprintln!("\x1b[31;1m{}\x1b[0m", error.to_string())
}
