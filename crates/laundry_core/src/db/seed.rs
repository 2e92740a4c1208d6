//! Start-up seeding of lookup tables and demo contacts.
//!
//! # Invariants
//! - Lookup rows are inserted with `INSERT OR IGNORE` on every open, so
//!   existing rows (including edited names/comments) are kept.
//! - Demo clients/admins are inserted only into an empty table.

use super::DbResult;
use crate::model::status::{ApplicationStatusCode, PollutionLevel};
use log::info;
use rusqlite::{params, Connection};

/// `(last_name, name, patronymic, phone, email)`.
type DemoContact = (&'static str, &'static str, &'static str, &'static str, &'static str);

const DEMO_CLIENTS: &[DemoContact] = &[
    ("Невская", "Есения", "Ивановна", "79161234567", "nevskay@mail.ru"),
    ("Горячева", "Мария", "Сергеевна", "79167654321", "goryacheva@mail.ru"),
    ("Федоров", "Алексей", "Владимирович", "79169998877", "sidorov@mail.ru"),
];

const DEMO_ADMINS: &[DemoContact] = &[
    ("Макаров", "Александр", "Максимович", "79182356841", "makarov@laundry.ru"),
    ("Погодина", "Евгения", "Васильевна", "79213894750", "pogodina@laundry.ru"),
    ("Марычев", "Павел", "Аркадьевич", "79569786342", "marychev@laundry.ru"),
];

/// Seeds lookup tables and, when requested, demo contacts.
pub fn seed_database(conn: &mut Connection, demo_contacts: bool) -> DbResult<()> {
    let tx = conn.transaction()?;

    for level in PollutionLevel::ALL {
        tx.execute(
            "INSERT OR IGNORE INTO PollutionStatus (code, name, comment) VALUES (?1, ?2, ?3);",
            params![level.as_str(), level.seed_name(), level.seed_comment()],
        )?;
    }
    for status in ApplicationStatusCode::ALL {
        tx.execute(
            "INSERT OR IGNORE INTO ApplicationStatus (code, name, comment) VALUES (?1, ?2, ?3);",
            params![status.as_str(), status.seed_name(), status.seed_comment()],
        )?;
    }

    let mut clients_seeded = 0;
    let mut admins_seeded = 0;
    if demo_contacts {
        clients_seeded = seed_contacts_if_empty(&tx, "Client", DEMO_CLIENTS)?;
        admins_seeded = seed_contacts_if_empty(&tx, "Admin", DEMO_ADMINS)?;
    }

    tx.commit()?;
    info!(
        "event=db_seed module=db status=ok clients_seeded={} admins_seeded={}",
        clients_seeded, admins_seeded
    );
    Ok(())
}

fn seed_contacts_if_empty(
    conn: &Connection,
    table: &'static str,
    rows: &[DemoContact],
) -> DbResult<usize> {
    let count: i64 = conn.query_row(&format!("SELECT COUNT(*) FROM {table};"), [], |row| {
        row.get(0)
    })?;
    if count > 0 {
        return Ok(0);
    }

    let mut stmt = conn.prepare(&format!(
        "INSERT OR IGNORE INTO {table} (last_name, name, patronymic, phone, email)
         VALUES (?1, ?2, ?3, ?4, ?5);"
    ))?;
    let mut inserted = 0;
    for (last_name, name, patronymic, phone, email) in rows {
        inserted += stmt.execute(params![last_name, name, patronymic, phone, email])?;
    }
    Ok(inserted)
}
