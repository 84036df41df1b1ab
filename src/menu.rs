// Interactive menu
// The read-eval-print loop: show the menu, read a choice, ask for the
// airport and month, print the results, repeat until the user exits.
//
// Input is read from any BufRead and output written to any Write, so the
// loop runs the same against a terminal or a byte buffer.

use crate::app::AppContext;
use crate::store::Store;
use anyhow::Result;
use std::io::{BufRead, Write};
use thiserror::Error;
use tracing::info;

/// The entries of the main menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    Passengers,
    Advertisements,
    Exit,
}

impl MenuChoice {
    pub const ALL: [MenuChoice; 3] = [
        MenuChoice::Passengers,
        MenuChoice::Advertisements,
        MenuChoice::Exit,
    ];

    /// The number the user types to pick this entry
    pub fn number(&self) -> i64 {
        match self {
            MenuChoice::Passengers => 1,
            MenuChoice::Advertisements => 2,
            MenuChoice::Exit => 3,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MenuChoice::Passengers => "List passengers by airport and month",
            MenuChoice::Advertisements => "List advertisements by airport and month",
            MenuChoice::Exit => "Exit",
        }
    }
}

/// Why a line typed by the user was not accepted
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("no input given")]
    Empty,
    #[error("'{0}' is not a number")]
    NotANumber(String),
    #[error("{0} is out of range")]
    OutOfRange(String),
    #[error("{0} is not a menu option")]
    UnknownChoice(i64),
}

fn parse_number(input: &str) -> Result<i64, InputError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(InputError::Empty);
    }
    input.parse().map_err(|_| {
        let digits = input.strip_prefix(['-', '+']).unwrap_or(input);
        if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
            InputError::OutOfRange(input.to_string())
        } else {
            InputError::NotANumber(input.to_string())
        }
    })
}

pub fn parse_choice(input: &str) -> Result<MenuChoice, InputError> {
    let number = parse_number(input)?;
    MenuChoice::ALL
        .into_iter()
        .find(|choice| choice.number() == number)
        .ok_or(InputError::UnknownChoice(number))
}

/// Parse a month number
///
/// Any integer is accepted; months outside 1-12 simply match nothing.
pub fn parse_month(input: &str) -> Result<i32, InputError> {
    let number = parse_number(input)?;
    i32::try_from(number).map_err(|_| InputError::OutOfRange(input.trim().to_string()))
}

pub fn print_menu<W: Write>(out: &mut W) -> std::io::Result<()> {
    for choice in MenuChoice::ALL {
        writeln!(out, "{} -- {}", choice.number(), choice.label())?;
    }
    Ok(())
}

/// Print `message` and read one line
/// Returns None at end of input
fn prompt<R: BufRead, W: Write>(input: &mut R, out: &mut W, message: &str) -> Result<Option<String>> {
    write!(out, "{}", message)?;
    out.flush()?; // Ensure prompt is displayed immediately

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

/// Ask for a month until a number is given
fn prompt_month<R: BufRead, W: Write>(input: &mut R, out: &mut W) -> Result<Option<i32>> {
    loop {
        let Some(line) = prompt(input, out, "Enter the month (1-12): ")? else {
            return Ok(None);
        };
        match parse_month(&line) {
            Ok(month) => return Ok(Some(month)),
            Err(e) => writeln!(out, "Invalid month: {}. Please try again.", e)?,
        }
    }
}

/// Ask for the airport and month of a lookup
fn prompt_lookup<R: BufRead, W: Write>(input: &mut R, out: &mut W) -> Result<Option<(String, i32)>> {
    let Some(airport_id) = prompt(input, out, "Enter the airport ID: ")? else {
        return Ok(None);
    };
    let Some(month) = prompt_month(input, out)? else {
        return Ok(None);
    };
    Ok(Some((airport_id, month)))
}

/// Run the menu until the user picks Exit or input ends
///
/// Bad input is reported and asked for again. Errors from the database are
/// returned and end the loop.
pub fn run<S, R, W>(app: &AppContext<S>, input: &mut R, out: &mut W) -> Result<()>
where
    S: Store,
    R: BufRead,
    W: Write,
{
    loop {
        print_menu(out)?;
        let Some(line) = prompt(input, out, "Enter your option: ")? else {
            info!("End of input");
            break;
        };

        match parse_choice(&line) {
            Ok(MenuChoice::Passengers) => {
                let Some((airport_id, month)) = prompt_lookup(input, out)? else {
                    break;
                };
                app.print_passengers(out, &airport_id, month)?;
            }
            Ok(MenuChoice::Advertisements) => {
                let Some((airport_id, month)) = prompt_lookup(input, out)? else {
                    break;
                };
                app.print_advertisements(out, &airport_id, month)?;
            }
            Ok(MenuChoice::Exit) => {
                info!("Exit requested");
                break;
            }
            Err(e) => {
                writeln!(out, "Invalid option ({}). Please enter a valid number.", e)?;
            }
        }
    }

    Ok(())
}
