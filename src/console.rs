use std::io::{self, BufRead, Write};
use std::str::FromStr;

use crate::error::TarmacError;

const INVALID_INPUT: &str = "Your input is invalid!";

/// Reservation status codes accepted by the booking and status-count flows.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReservationStatus {
    Waitlisted,
    Reserved,
    Confirmed,
}

impl ReservationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReservationStatus::Waitlisted => "W",
            ReservationStatus::Reserved => "R",
            ReservationStatus::Confirmed => "C",
        }
    }
}

impl FromStr for ReservationStatus {
    type Err = TarmacError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "W" => Ok(ReservationStatus::Waitlisted),
            "R" => Ok(ReservationStatus::Reserved),
            "C" => Ok(ReservationStatus::Confirmed),
            _ => Err(TarmacError::Input {
                message: "Input only accepts the following inputs: W, R, C".to_string(),
            }),
        }
    }
}

/// Line-oriented prompt/response console. Generic over reader and writer so
/// the interactive flows can be driven from buffers.
pub struct Console<R, W> {
    reader: R,
    writer: W,
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    pub fn writer(&mut self) -> &mut W {
        &mut self.writer
    }

    pub fn say(&mut self, text: &str) -> Result<(), TarmacError> {
        writeln!(self.writer, "{text}")?;
        Ok(())
    }

    fn read_line(&mut self) -> Result<String, TarmacError> {
        let mut line = String::new();
        let n = self.reader.read_line(&mut line)?;
        if n == 0 {
            return Err(TarmacError::Io(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "end of console input",
            )));
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }

    /// Write a prompt label and read one line of input.
    pub fn prompt(&mut self, label: &str) -> Result<String, TarmacError> {
        write!(self.writer, "{label}")?;
        self.writer.flush()?;
        self.read_line()
    }

    /// Prompt until the input parses as an integer. Malformed input is
    /// reported and the same prompt repeats.
    pub fn prompt_int(&mut self, label: &str) -> Result<i64, TarmacError> {
        loop {
            let line = self.prompt(label)?;
            match line.trim().parse::<i64>() {
                Ok(value) => return Ok(value),
                Err(_) => self.say(INVALID_INPUT)?,
            }
        }
    }

    pub fn read_choice(&mut self) -> Result<i64, TarmacError> {
        self.prompt_int("Please make your choice: ")
    }

    /// Prompt until the input is one of the closed status set {W, R, C}.
    pub fn prompt_status(&mut self, label: &str) -> Result<ReservationStatus, TarmacError> {
        loop {
            let line = self.prompt(label)?;
            match line.parse::<ReservationStatus>() {
                Ok(status) => return Ok(status),
                Err(err) => self.say(&err.to_string())?,
            }
        }
    }

    /// Ask a y/n question, repeating until one of the two is given.
    pub fn confirm(&mut self, question: &str) -> Result<bool, TarmacError> {
        loop {
            self.say(question)?;
            match self.read_line()?.trim() {
                "y" => return Ok(true),
                "n" => return Ok(false),
                _ => self.say(INVALID_INPUT)?,
            }
        }
    }
}
