use std::io::{BufRead, Write};
use std::path::Path;

use crate::console::Console;
use crate::db::{query_and_print, Database, SqlArg};
use crate::error::TarmacError;
use crate::transfer::{remote_path, Transfer, TransferOutput};

const INSERT_PLANE: &str =
    "INSERT INTO Plane (id, make, model, age, seats) VALUES ($1, $2, $3, $4, $5)";
const INSERT_PILOT: &str = "INSERT INTO Pilot (id, fullname, nationality) VALUES ($1, $2, $3)";
const INSERT_FLIGHT: &str = "INSERT INTO Flight (fnum, cost, num_sold, num_stops, \
     arrival_airport, departure_airport) VALUES ($1, $2, $3, $4, $5, $6)";
const INSERT_TECHNICIAN: &str = "INSERT INTO Technician (id, full_name) VALUES ($1, $2)";

const RESERVATION_LOOKUP: &str = "SELECT status FROM Reservation WHERE cid = $1 AND fid = $2";
const RESERVATION_INSERT: &str =
    "INSERT INTO Reservation (rnum, cid, fid, status) VALUES ($1, $2, $3, $4)";
const RESERVATION_UPDATE: &str =
    "UPDATE Reservation SET status = $1 WHERE cid = $2 AND fid = $3";

const AVAILABLE_SEATS: &str = "SELECT (P.seats - F.num_sold) AS available_seats \
     FROM Plane P, Flight F, FlightInfo FI \
     WHERE FI.flight_id = F.fnum AND FI.plane_id = P.id AND F.fnum = $1 \
     GROUP BY P.seats, F.num_sold";
const REPAIRS_PER_PLANE: &str = "SELECT plane_id, COUNT(*) AS repairs FROM Repairs \
     GROUP BY plane_id ORDER BY repairs DESC";
const REPAIRS_PER_YEAR: &str =
    "SELECT EXTRACT(YEAR FROM repair_date) AS year, COUNT(*) AS repairs FROM Repairs \
     GROUP BY EXTRACT(YEAR FROM repair_date) ORDER BY COUNT(*) ASC";
const STATUS_COUNT: &str = "SELECT COUNT(*) FROM Reservation WHERE fid = $1 AND status = $2";

pub async fn add_plane<D, R, W>(db: &D, console: &mut Console<R, W>) -> Result<(), TarmacError>
where
    D: Database + Sync + ?Sized,
    R: BufRead,
    W: Write,
{
    let id = console.prompt("\tEnter Plane ID: ")?;
    let make = console.prompt("\tEnter Make: ")?;
    let model = console.prompt("\tEnter Model: ")?;
    let age = console.prompt_int("\tEnter age: ")?;
    let seats = console.prompt_int("\tEnter seats: ")?;
    db.execute_update(
        INSERT_PLANE,
        vec![
            SqlArg::Text(id),
            SqlArg::Text(make),
            SqlArg::Text(model),
            SqlArg::Int(age),
            SqlArg::Int(seats),
        ],
    )
    .await?;
    console.say("Plane added.")
}

pub async fn add_pilot<D, R, W>(db: &D, console: &mut Console<R, W>) -> Result<(), TarmacError>
where
    D: Database + Sync + ?Sized,
    R: BufRead,
    W: Write,
{
    let id = console.prompt_int("\tEnter Pilot ID: ")?;
    let fullname = console.prompt("\tEnter Full Name: ")?;
    let nationality = console.prompt("\tEnter Nationality: ")?;
    db.execute_update(
        INSERT_PILOT,
        vec![
            SqlArg::Int(id),
            SqlArg::Text(fullname),
            SqlArg::Text(nationality),
        ],
    )
    .await?;
    console.say("Pilot added.")
}

pub async fn add_flight<D, R, W>(db: &D, console: &mut Console<R, W>) -> Result<(), TarmacError>
where
    D: Database + Sync + ?Sized,
    R: BufRead,
    W: Write,
{
    let fnum = console.prompt_int("\tEnter Flight Number: ")?;
    let cost = console.prompt_int("\tEnter Flight Cost: ")?;
    let num_sold = console.prompt_int("\tNumber of Seats Sold: ")?;
    let num_stops = console.prompt_int("\tNumber of Stops: ")?;
    let arrival = console.prompt("\tEnter Destination Airport: ")?;
    let departure = console.prompt("\tEnter Departure Airport: ")?;
    db.execute_update(
        INSERT_FLIGHT,
        vec![
            SqlArg::Int(fnum),
            SqlArg::Int(cost),
            SqlArg::Int(num_sold),
            SqlArg::Int(num_stops),
            SqlArg::Text(arrival),
            SqlArg::Text(departure),
        ],
    )
    .await?;
    console.say("Flight added.")
}

pub async fn add_technician<D, R, W>(db: &D, console: &mut Console<R, W>) -> Result<(), TarmacError>
where
    D: Database + Sync + ?Sized,
    R: BufRead,
    W: Write,
{
    let id = console.prompt_int("\tEnter Technician ID: ")?;
    let full_name = console.prompt("\tEnter Full Name: ")?;
    db.execute_update(
        INSERT_TECHNICIAN,
        vec![SqlArg::Int(id), SqlArg::Text(full_name)],
    )
    .await?;
    console.say("Technician added.")
}

/// Two-state booking flow: a missing (customer, flight) reservation offers
/// creation, an existing one offers a status update.
pub async fn book_flight<D, R, W>(db: &D, console: &mut Console<R, W>) -> Result<(), TarmacError>
where
    D: Database + Sync + ?Sized,
    R: BufRead,
    W: Write,
{
    let cid = console.prompt_int("Input Customer ID: ")?;
    let fid = console.prompt_int("Input Flight Number: ")?;

    let existing = db
        .query(RESERVATION_LOOKUP, vec![SqlArg::Int(cid), SqlArg::Int(fid)])
        .await?;

    if existing.is_empty() {
        if console.confirm("Reservation does not exist. Would you like to book a reservation? (y/n)")? {
            let rnum = console.prompt_int("Input New Reservation Number: ")?;
            let status = console.prompt_status("Input New Reservation Status: ")?;
            db.execute_update(
                RESERVATION_INSERT,
                vec![
                    SqlArg::Int(rnum),
                    SqlArg::Int(cid),
                    SqlArg::Int(fid),
                    SqlArg::Text(status.as_str().to_string()),
                ],
            )
            .await?;
            let seq = db.current_sequence_value("reservation_rnum_seq").await?;
            tracing::debug!(sequence = seq, "reservation sequence after insert");
            console.say("Reservation booked.")?;
        }
    } else {
        existing.write_tsv(console.writer())?;
        if console.confirm("Would you like to update the reservation? (y/n)")? {
            let status = console.prompt_status("Input Update Reservation Status: ")?;
            db.execute_update(
                RESERVATION_UPDATE,
                vec![
                    SqlArg::Text(status.as_str().to_string()),
                    SqlArg::Int(cid),
                    SqlArg::Int(fid),
                ],
            )
            .await?;
            console.say("Reservation updated.")?;
        }
    }
    Ok(())
}

pub async fn list_available_seats<D, R, W>(
    db: &D,
    console: &mut Console<R, W>,
) -> Result<(), TarmacError>
where
    D: Database + Sync + ?Sized,
    R: BufRead,
    W: Write,
{
    let fnum = console.prompt_int("\tEnter Flight Number: ")?;
    query_and_print(db, console.writer(), AVAILABLE_SEATS, vec![SqlArg::Int(fnum)]).await?;
    Ok(())
}

pub async fn list_repairs_per_plane<D, R, W>(
    db: &D,
    console: &mut Console<R, W>,
) -> Result<(), TarmacError>
where
    D: Database + Sync + ?Sized,
    R: BufRead,
    W: Write,
{
    query_and_print(db, console.writer(), REPAIRS_PER_PLANE, vec![]).await?;
    Ok(())
}

pub async fn list_repairs_per_year<D, R, W>(
    db: &D,
    console: &mut Console<R, W>,
) -> Result<(), TarmacError>
where
    D: Database + Sync + ?Sized,
    R: BufRead,
    W: Write,
{
    query_and_print(db, console.writer(), REPAIRS_PER_YEAR, vec![]).await?;
    Ok(())
}

pub async fn count_passengers_with_status<D, R, W>(
    db: &D,
    console: &mut Console<R, W>,
) -> Result<(), TarmacError>
where
    D: Database + Sync + ?Sized,
    R: BufRead,
    W: Write,
{
    let fid = console.prompt_int("\tInput Flight Number: ")?;
    let status = console.prompt_status("\tInput Passenger Status: ")?;
    query_and_print(
        db,
        console.writer(),
        STATUS_COUNT,
        vec![SqlArg::Int(fid), SqlArg::Text(status.as_str().to_string())],
    )
    .await?;
    Ok(())
}

pub fn attach_document<R, W>(
    console: &mut Console<R, W>,
    store: &dyn Transfer,
    operator: &str,
    document_root: &str,
) -> Result<(), TarmacError>
where
    R: BufRead,
    W: Write,
{
    let rnum = console.prompt_int("Input Reservation Number: ")?;
    let local = console.prompt("Enter local file path: ")?;
    let ext = Path::new(&local)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("dat")
        .to_string();
    let remote = remote_path(document_root, operator, rnum, &ext);
    let output = store.store(&remote, Path::new(&local))?;
    report_transfer(console, &output)
}

pub fn fetch_document<R, W>(
    console: &mut Console<R, W>,
    store: &dyn Transfer,
    operator: &str,
    document_root: &str,
) -> Result<(), TarmacError>
where
    R: BufRead,
    W: Write,
{
    let rnum = console.prompt_int("Input Reservation Number: ")?;
    let ext = console.prompt("Enter document extension: ")?;
    let local = console.prompt("Enter destination file path: ")?;
    let remote = remote_path(document_root, operator, rnum, ext.trim_start_matches('.'));
    let output = store.fetch(&remote, Path::new(&local))?;
    report_transfer(console, &output)
}

fn report_transfer<R, W>(
    console: &mut Console<R, W>,
    output: &TransferOutput,
) -> Result<(), TarmacError>
where
    R: BufRead,
    W: Write,
{
    console.say(&format!("transfer exited with status {}", output.status))?;
    if !output.stdout.is_empty() {
        console.say(output.stdout.trim_end())?;
    }
    if !output.stderr.is_empty() {
        console.say(output.stderr.trim_end())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::testutil::FakeDb;
    use crate::db::ResultTable;
    use std::io::Cursor;

    fn console(input: &str) -> Console<Cursor<Vec<u8>>, Vec<u8>> {
        Console::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    fn status_row(status: &str) -> ResultTable {
        ResultTable {
            columns: vec!["status".to_string()],
            rows: vec![vec![status.to_string()]],
        }
    }

    #[tokio::test]
    async fn add_plane_inserts_prompted_fields_in_order() {
        let db = FakeDb::new();
        let mut c = console("N101\nBoeing\n737\n5\n150\n");
        add_plane(&db, &mut c).await.unwrap();

        let updates = db.updates.lock().unwrap();
        assert_eq!(updates.len(), 1);
        let (sql, args) = &updates[0];
        assert_eq!(sql, &INSERT_PLANE);
        assert_eq!(
            args,
            &vec![
                SqlArg::Text("N101".to_string()),
                SqlArg::Text("Boeing".to_string()),
                SqlArg::Text("737".to_string()),
                SqlArg::Int(5),
                SqlArg::Int(150),
            ]
        );
    }

    #[tokio::test]
    async fn booking_missing_reservation_offers_create() {
        let db = FakeDb::with_results(vec![ResultTable::empty()]);
        let mut c = console("7\n42\ny\n9001\nW\n");
        book_flight(&db, &mut c).await.unwrap();

        let queries = db.queries.lock().unwrap();
        assert_eq!(
            queries[0].1,
            vec![SqlArg::Int(7), SqlArg::Int(42)]
        );

        let updates = db.updates.lock().unwrap();
        assert_eq!(updates.len(), 1);
        let (sql, args) = &updates[0];
        assert_eq!(sql, &RESERVATION_INSERT);
        assert_eq!(
            args,
            &vec![
                SqlArg::Int(9001),
                SqlArg::Int(7),
                SqlArg::Int(42),
                SqlArg::Text("W".to_string()),
            ]
        );
        let out = String::from_utf8(c.writer().clone()).unwrap();
        assert!(out.contains("Reservation does not exist"));
    }

    #[tokio::test]
    async fn booking_existing_reservation_offers_update() {
        let db = FakeDb::with_results(vec![status_row("W")]);
        let mut c = console("7\n42\ny\nC\n");
        book_flight(&db, &mut c).await.unwrap();

        let updates = db.updates.lock().unwrap();
        assert_eq!(updates.len(), 1);
        let (sql, args) = &updates[0];
        assert_eq!(sql, &RESERVATION_UPDATE);
        assert_eq!(
            args,
            &vec![
                SqlArg::Text("C".to_string()),
                SqlArg::Int(7),
                SqlArg::Int(42),
            ]
        );
        let out = String::from_utf8(c.writer().clone()).unwrap();
        assert!(out.contains("status\nW"));
        assert!(out.contains("Would you like to update the reservation?"));
    }

    #[tokio::test]
    async fn booking_declined_issues_no_update() {
        let db = FakeDb::with_results(vec![ResultTable::empty()]);
        let mut c = console("7\n42\nn\n");
        book_flight(&db, &mut c).await.unwrap();
        assert!(db.updates.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn status_count_binds_flight_and_status() {
        let db = FakeDb::with_results(vec![ResultTable {
            columns: vec!["count".to_string()],
            rows: vec![vec!["3".to_string()]],
        }]);
        let mut c = console("42\nC\n");
        count_passengers_with_status(&db, &mut c).await.unwrap();

        let queries = db.queries.lock().unwrap();
        assert_eq!(queries[0].0, STATUS_COUNT);
        assert_eq!(
            queries[0].1,
            vec![SqlArg::Int(42), SqlArg::Text("C".to_string())]
        );
        let out = String::from_utf8(c.writer().clone()).unwrap();
        assert!(out.contains("count\n3"));
    }

    #[tokio::test]
    async fn repairs_per_plane_takes_no_input() {
        let db = FakeDb::new();
        let mut c = console("");
        list_repairs_per_plane(&db, &mut c).await.unwrap();
        assert_eq!(db.queries.lock().unwrap()[0].0, REPAIRS_PER_PLANE);
    }

    struct RecordingTransfer {
        calls: std::sync::Mutex<Vec<(String, String, String)>>,
    }

    impl Transfer for RecordingTransfer {
        fn store(&self, remote: &str, local: &Path) -> Result<TransferOutput, TarmacError> {
            self.calls.lock().unwrap().push((
                "put".to_string(),
                remote.to_string(),
                local.display().to_string(),
            ));
            Ok(TransferOutput {
                stdout: "copied".to_string(),
                stderr: String::new(),
                status: 0,
            })
        }

        fn fetch(&self, remote: &str, local: &Path) -> Result<TransferOutput, TarmacError> {
            self.calls.lock().unwrap().push((
                "get".to_string(),
                remote.to_string(),
                local.display().to_string(),
            ));
            Ok(TransferOutput {
                stdout: String::new(),
                stderr: "not found".to_string(),
                status: 1,
            })
        }
    }

    #[test]
    fn attach_document_builds_remote_path_from_extension() {
        let store = RecordingTransfer {
            calls: std::sync::Mutex::new(Vec::new()),
        };
        let mut c = console("9001\n/tmp/itinerary.pdf\n");
        attach_document(&mut c, &store, "alice", "tarmac").unwrap();

        let calls = store.calls.lock().unwrap();
        assert_eq!(
            calls[0],
            (
                "put".to_string(),
                "/tarmac/alice/alice-9001.pdf".to_string(),
                "/tmp/itinerary.pdf".to_string(),
            )
        );
        let out = String::from_utf8(c.writer().clone()).unwrap();
        assert!(out.contains("transfer exited with status 0"));
        assert!(out.contains("copied"));
    }

    #[test]
    fn fetch_document_surfaces_stderr_and_status() {
        let store = RecordingTransfer {
            calls: std::sync::Mutex::new(Vec::new()),
        };
        let mut c = console("7\npdf\n/tmp/out.pdf\n");
        fetch_document(&mut c, &store, "bob", "tarmac").unwrap();

        let calls = store.calls.lock().unwrap();
        assert_eq!(calls[0].1, "/tarmac/bob/bob-7.pdf");
        let out = String::from_utf8(c.writer().clone()).unwrap();
        assert!(out.contains("transfer exited with status 1"));
        assert!(out.contains("not found"));
    }
}
