// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2025 Daniel Negri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

use chrono::{Duration, Utc};
use clap::{Parser, ValueEnum};
use csv::{ReaderBuilder, StringRecord, Trim, Writer};
use library_lending::{
    Book, Config, ConfigError, FinePolicy, InMemoryBookStore, InMemoryLoanStore,
    InMemoryMemberStore, LendingEngine, ManualClock, Member,
};
use serde::Serialize;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

/// Library Lending - Replay a script of library operations
///
/// Reads lending commands from a CSV file, runs them against an in-memory
/// library and writes one result row per command to stdout.
#[derive(Parser, Debug)]
#[command(name = "library-lending")]
#[command(about = "Replays a CSV script of library lending operations", long_about = None)]
struct Args {
    /// Path to CSV file with commands
    ///
    /// Expected format: command,arg1,arg2,arg3
    /// Example: cargo run -- script.csv > results.csv
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// TOML configuration file (borrow limit, loan duration, fine policy)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Fine policy, overrides the configuration file
    #[arg(short, long, value_enum)]
    policy: Option<PolicyArg>,

    /// Enable debug logging on stderr
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PolicyArg {
    Standard,
    Student,
}

impl From<PolicyArg> for FinePolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Standard => FinePolicy::Standard,
            PolicyArg::Student => FinePolicy::Student,
        }
    }
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            error!("Error loading configuration: {}", e);
            process::exit(1);
        }
    };

    let file = match File::open(&args.input) {
        Ok(f) => f,
        Err(e) => {
            error!("Error opening file '{}': {}", args.input.display(), e);
            process::exit(1);
        }
    };

    let session = match Session::new(&config) {
        Ok(session) => session,
        Err(e) => {
            error!("Error building engine: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = run_script(&session, BufReader::new(file), std::io::stdout()) {
        error!("Error processing script: {}", e);
        process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose {
        "library_lending=debug,main=debug,info"
    } else {
        "library_lending=info,main=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

fn load_config(args: &Args) -> Result<Config, ConfigError> {
    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(policy) = args.policy {
        config.fine.policy = policy.into();
        config.fine.daily_rate = None;
    }
    Ok(config)
}

/// An engine over fresh in-memory stores plus the script's loan aliases.
struct Session {
    engine: LendingEngine,
    clock: Arc<ManualClock>,
    aliases: RefCell<HashMap<String, String>>,
}

impl Session {
    fn new(config: &Config) -> Result<Self, ConfigError> {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let engine = LendingEngine::new(
            Arc::new(InMemoryBookStore::new()),
            Arc::new(InMemoryMemberStore::new()),
            Arc::new(InMemoryLoanStore::new()),
            Arc::new(config.fine.calculator()?),
        )
        .with_config(config.engine)
        .with_clock(clock.clone());

        Ok(Self {
            engine,
            clock,
            aliases: RefCell::new(HashMap::new()),
        })
    }

    /// Resolves a script alias to the loan ID it was bound to.
    ///
    /// Unknown aliases are passed through as literal loan IDs.
    fn resolve(&self, alias: &str) -> String {
        self.aliases
            .borrow()
            .get(alias)
            .cloned()
            .unwrap_or_else(|| alias.to_owned())
    }

    fn execute(&self, command: &Command) -> (bool, String) {
        match command {
            Command::AddBook { id, title, author } => {
                let added = self
                    .engine
                    .add_book(Book::new(id.as_str(), title.as_str(), author.as_str()));
                (added, if added { "Book added" } else { "Book rejected" }.to_owned())
            }
            Command::AddMember { id, name, email } => {
                let added = self
                    .engine
                    .add_member(Member::new(id.as_str(), name.as_str(), email.as_str()));
                (added, if added { "Member added" } else { "Member rejected" }.to_owned())
            }
            Command::Borrow {
                member_id,
                book_id,
                alias,
            } => {
                let outcome = self.engine.borrow(member_id, book_id);
                if let (Some(loan), Some(alias)) = (outcome.loan(), alias) {
                    self.aliases
                        .borrow_mut()
                        .insert(alias.clone(), loan.id().to_string());
                }
                match outcome.loan() {
                    Some(loan) => (true, format!("{} (loan {})", outcome.message(), loan.id())),
                    None => (false, outcome.message().to_owned()),
                }
            }
            Command::Return { loan } => {
                let outcome = self.engine.return_book(&self.resolve(loan));
                (outcome.is_success(), outcome.message().to_owned())
            }
            Command::Fine { loan } => {
                let fine = self.engine.calculate_fine(&self.resolve(loan));
                (true, fine.round_dp(2).to_string())
            }
            Command::Available => {
                let ids: Vec<String> = self
                    .engine
                    .get_available_books()
                    .iter()
                    .map(|book| book.id().to_string())
                    .collect();
                (true, ids.join(" "))
            }
            Command::Loans { member_id } => {
                let ids: Vec<String> = self
                    .engine
                    .get_member_loans(member_id)
                    .iter()
                    .map(|loan| loan.book_id().to_string())
                    .collect();
                (true, ids.join(" "))
            }
            Command::Advance { days, by } => match self.clock.advance(*by) {
                Some(_) => (true, format!("Clock advanced {days} days")),
                None => (false, format!("clock cannot advance {days} days")),
            },
        }
    }
}

/// A parsed script row.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    AddBook {
        id: String,
        title: String,
        author: String,
    },
    AddMember {
        id: String,
        name: String,
        email: String,
    },
    Borrow {
        member_id: String,
        book_id: String,
        alias: Option<String>,
    },
    Return {
        loan: String,
    },
    Fine {
        loan: String,
    },
    Available,
    Loans {
        member_id: String,
    },
    Advance {
        days: i64,
        by: Duration,
    },
}

impl Command {
    /// Converts a CSV record to a command.
    ///
    /// Missing trailing arguments read as empty strings, so blank-ID handling
    /// is left to the engine.
    fn parse(record: &StringRecord) -> Result<Self, String> {
        let arg = |i: usize| record.get(i).unwrap_or("").to_owned();
        let name = record.get(0).unwrap_or("").to_lowercase();

        match name.as_str() {
            "add_book" => Ok(Command::AddBook {
                id: arg(1),
                title: arg(2),
                author: arg(3),
            }),
            "add_member" => Ok(Command::AddMember {
                id: arg(1),
                name: arg(2),
                email: arg(3),
            }),
            "borrow" => Ok(Command::Borrow {
                member_id: arg(1),
                book_id: arg(2),
                alias: Some(arg(3)).filter(|alias| !alias.is_empty()),
            }),
            "return" => Ok(Command::Return { loan: arg(1) }),
            "fine" => Ok(Command::Fine { loan: arg(1) }),
            "available" => Ok(Command::Available),
            "loans" => Ok(Command::Loans { member_id: arg(1) }),
            "advance" => {
                let days: i64 = arg(1)
                    .parse()
                    .map_err(|e| format!("invalid day count '{}': {}", arg(1), e))?;
                Duration::try_days(days)
                    .map(|by| Command::Advance { days, by })
                    .ok_or_else(|| format!("invalid day count '{days}': out of range"))
            }
            other => Err(format!("unknown command '{other}'")),
        }
    }
}

/// One output row.
#[derive(Debug, Serialize)]
struct ResultRow {
    line: u64,
    command: String,
    success: bool,
    message: String,
}

/// Replays commands from a CSV reader, writing one result row per command.
///
/// # CSV Format
///
/// Expected columns: `command, arg1, arg2, arg3`
///
/// | Command | Arguments |
/// |---------|-----------|
/// | `add_book` | id, title, author |
/// | `add_member` | id, name, email |
/// | `borrow` | member id, book id, optional loan alias |
/// | `return` | loan alias or loan id |
/// | `fine` | loan alias or loan id |
/// | `available` | |
/// | `loans` | member id |
/// | `advance` | days to move the clock |
///
/// Malformed rows produce a failed result row and processing continues.
///
/// # Errors
///
/// Returns a CSV error if reading the header or writing output fails.
fn run_script<R: Read, W: Write>(
    session: &Session,
    reader: R,
    writer: W,
) -> Result<(), csv::Error> {
    let mut rdr = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .has_headers(true)
        .from_reader(reader);
    let mut wtr = Writer::from_writer(writer);

    for result in rdr.records() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                debug!("Skipping unreadable row: {}", e);
                continue;
            }
        };
        let line = record.position().map_or(0, |p| p.line());
        let name = record.get(0).unwrap_or("").to_owned();

        let (success, message) = match Command::parse(&record) {
            Ok(command) => session.execute(&command),
            Err(reason) => (false, reason),
        };

        wtr.serialize(ResultRow {
            line,
            command: name,
            success,
            message,
        })?;
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn replay(script: &str) -> Vec<Vec<String>> {
        replay_with(&Config::default(), script)
    }

    fn replay_with(config: &Config, script: &str) -> Vec<Vec<String>> {
        let session = Session::new(config).unwrap();
        let mut output = Vec::new();
        run_script(&session, Cursor::new(script), &mut output).unwrap();

        let mut rdr = ReaderBuilder::new().from_reader(output.as_slice());
        rdr.records()
            .map(|r| r.unwrap().iter().map(str::to_owned).collect())
            .collect()
    }

    #[test]
    fn parse_add_book() {
        let record = StringRecord::from(vec!["add_book", "B1", "Dune", "Frank Herbert"]);
        assert_eq!(
            Command::parse(&record).unwrap(),
            Command::AddBook {
                id: "B1".into(),
                title: "Dune".into(),
                author: "Frank Herbert".into(),
            }
        );
    }

    #[test]
    fn parse_borrow_without_alias() {
        let record = StringRecord::from(vec!["borrow", "M1", "B1"]);
        assert_eq!(
            Command::parse(&record).unwrap(),
            Command::Borrow {
                member_id: "M1".into(),
                book_id: "B1".into(),
                alias: None,
            }
        );
    }

    #[test]
    fn parse_rejects_unknown_command() {
        let record = StringRecord::from(vec!["renew", "L1"]);
        assert_eq!(
            Command::parse(&record),
            Err("unknown command 'renew'".to_owned())
        );
    }

    #[test]
    fn parse_rejects_bad_day_count() {
        let record = StringRecord::from(vec!["advance", "soon"]);
        assert!(Command::parse(&record).is_err());
    }

    #[test]
    fn parse_rejects_day_count_beyond_duration_range() {
        let record = StringRecord::from(vec!["advance", "200000000000"]);
        assert_eq!(
            Command::parse(&record),
            Err("invalid day count '200000000000': out of range".to_owned())
        );
    }

    #[test]
    fn oversized_advance_fails_its_row_and_continues() {
        let rows = replay(
            "command,arg1,arg2,arg3\n\
             advance,200000000000\n\
             advance,1000000000\n\
             advance,1\n\
             available\n",
        );

        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0][2], "false");
        assert_eq!(rows[0][3], "invalid day count '200000000000': out of range");
        assert_eq!(rows[1][2], "false");
        assert_eq!(rows[1][3], "clock cannot advance 1000000000 days");
        assert_eq!(rows[2][2], "true");
        assert_eq!(rows[3][1], "available");
        assert_eq!(rows[3][2], "true");
    }

    #[test]
    fn borrow_fine_return_flow() {
        let rows = replay(
            "command,arg1,arg2,arg3\n\
             add_book,B1,Dune,Frank Herbert\n\
             add_member,M1,Ada,ada@example.com\n\
             borrow,M1,B1,first\n\
             available\n\
             advance,20\n\
             fine,first\n\
             return,first\n\
             available\n",
        );

        assert_eq!(rows.len(), 8);
        assert_eq!(rows[2][1], "borrow");
        assert_eq!(rows[2][2], "true");
        assert!(rows[2][3].starts_with("Book borrowed successfully"));
        assert_eq!(rows[3][3], "");
        assert_eq!(rows[5][3], "3.00");
        assert_eq!(rows[6][3], "Book returned successfully");
        assert_eq!(rows[7][3], "B1");
    }

    #[test]
    fn student_policy_halves_fine() {
        let mut config = Config::default();
        config.fine.policy = FinePolicy::Student;
        let rows = replay_with(
            &config,
            "command,arg1,arg2,arg3\n\
             add_book,B1,Dune,Frank Herbert\n\
             add_member,M1,Ada,ada@example.com\n\
             borrow,M1,B1,l\n\
             advance,20\n\
             fine,l\n",
        );
        assert_eq!(rows[4][3], "1.50");
    }

    #[test]
    fn failures_are_reported_per_row() {
        let rows = replay(
            "command,arg1,arg2,arg3\n\
             borrow,M1,B1\n\
             borrow,,B1\n\
             return,nope\n\
             bogus\n\
             add_book,,Untitled,Nobody\n",
        );

        assert_eq!(rows.len(), 5);
        assert_eq!(rows[0][3], "Member not found");
        assert_eq!(rows[1][3], "Member ID cannot be null or empty");
        assert_eq!(rows[2][3], "Loan not found");
        assert_eq!(rows[3][3], "unknown command 'bogus'");
        assert_eq!(rows[4][2], "false");
        assert!(rows.iter().all(|row| row[2] == "false"));
    }

    #[test]
    fn borrow_limit_from_config() {
        let mut config = Config::default();
        config.engine.max_books_per_member = 1;
        let rows = replay_with(
            &config,
            "command,arg1,arg2,arg3\n\
             add_book,B1,Dune,Frank Herbert\n\
             add_book,B2,Emma,Jane Austen\n\
             add_member,M1,Ada,ada@example.com\n\
             borrow,M1,B1\n\
             borrow,M1,B2\n\
             loans,M1\n",
        );
        assert_eq!(
            rows[4][3],
            "Member has reached maximum borrowing limit of 1 books"
        );
        assert_eq!(rows[5][3], "B1");
    }

    #[test]
    fn rows_carry_source_line_numbers() {
        let rows = replay("command,arg1,arg2,arg3\navailable\nloans,M1\n");
        assert_eq!(rows[0][0], "2");
        assert_eq!(rows[1][0], "3");
        assert_eq!(rows[1][1], "loans");
    }
}
