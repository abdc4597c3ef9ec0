use std::io::{BufRead, Write};

use crate::console::Console;
use crate::db::Database;
use crate::error::TarmacError;
use crate::handlers;
use crate::transfer::Transfer;

const MENU: &[&str] = &[
    "Add Plane",
    "Add Pilot",
    "Add Flight",
    "Add Technician",
    "Book Flight",
    "List number of available seats for a given flight",
    "List total number of repairs per plane in descending order",
    "List total number of repairs per year in ascending order",
    "Find total number of passengers with a given status",
    "Attach document to reservation",
    "Retrieve reservation document",
    "< EXIT",
];

/// Read-eval-print loop over the fixed menu. Statement, input, and transfer
/// errors are reported and control returns to the menu; console I/O errors
/// end the loop.
pub async fn run<D, R, W>(
    db: &D,
    console: &mut Console<R, W>,
    store: &dyn Transfer,
    operator: &str,
    document_root: &str,
) -> Result<(), TarmacError>
where
    D: Database + Sync + ?Sized,
    R: BufRead,
    W: Write,
{
    loop {
        console.say("MAIN MENU")?;
        console.say("---------")?;
        for (index, label) in MENU.iter().enumerate() {
            console.say(&format!("{}. {label}", index + 1))?;
        }

        let choice = console.read_choice()?;
        let outcome = match choice {
            1 => handlers::add_plane(db, console).await,
            2 => handlers::add_pilot(db, console).await,
            3 => handlers::add_flight(db, console).await,
            4 => handlers::add_technician(db, console).await,
            5 => handlers::book_flight(db, console).await,
            6 => handlers::list_available_seats(db, console).await,
            7 => handlers::list_repairs_per_plane(db, console).await,
            8 => handlers::list_repairs_per_year(db, console).await,
            9 => handlers::count_passengers_with_status(db, console).await,
            10 => handlers::attach_document(console, store, operator, document_root),
            11 => handlers::fetch_document(console, store, operator, document_root),
            12 => break,
            _ => {
                console.say("Unrecognized choice! Try again.")?;
                Ok(())
            }
        };

        if let Err(err) = outcome {
            match err {
                TarmacError::Io(e) => return Err(TarmacError::Io(e)),
                other => console.say(&other.to_string())?,
            }
        }
    }
    Ok(())
}
