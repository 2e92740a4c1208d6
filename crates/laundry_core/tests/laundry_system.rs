use laundry_core::db::{open_db_in_memory, open_db_in_memory_with, OpenOptions};
use laundry_core::{
    ApplicationStatusCode, ContactForm, LaundrySystem, NewApplication, PollutionLevel, Role,
    ServiceError, Session, ValidationError,
};
use rusqlite::Connection;

fn empty_db() -> Connection {
    open_db_in_memory_with(OpenOptions {
        seed_demo_contacts: false,
    })
    .unwrap()
}

fn form(phone: &str, email: &str) -> ContactForm {
    ContactForm::new("Горячева", "Мария", "Сергеевна", phone, email)
}

fn request(client_id: i64) -> NewApplication {
    NewApplication {
        client_id,
        item_count: 3,
        pollution: PollutionLevel::Low,
        status: ApplicationStatusCode::InProgress,
    }
}

#[test]
fn create_client_round_trips_through_find_by_id() {
    let conn = empty_db();
    let system = LaundrySystem::open(&conn).unwrap();

    let created = system
        .create_client(ContactForm::new(
            " Невская ",
            "Есения",
            "Ивановна",
            " 79161234567 ",
            "nevskay@mail.ru",
        ))
        .unwrap();

    let loaded = system.client(created.id.unwrap()).unwrap().unwrap();
    assert_eq!(loaded, created);
    assert_eq!(loaded.last_name, "Невская");
    assert_eq!(loaded.phone, "79161234567");
}

#[test]
fn create_client_rejects_invalid_fields_without_writing() {
    let conn = empty_db();
    let system = LaundrySystem::open(&conn).unwrap();

    let cases = [
        (
            ContactForm::new("", "Мария", "Сергеевна", "79167654321", "m@mail.ru"),
            ValidationError::BlankField("last_name"),
        ),
        (
            ContactForm::new("Горячева", "Мария", "Сергеевна", "7916765432", "m@mail.ru"),
            ValidationError::InvalidPhone,
        ),
        (
            ContactForm::new("Горячева", "Мария", "Сергеевна", "79167654321", "mail.ru"),
            ValidationError::InvalidEmail,
        ),
    ];

    for (input, expected) in cases {
        match system.create_client(input) {
            Err(ServiceError::Validation(err)) => assert_eq!(err, expected),
            other => panic!("expected validation error, got {other:?}"),
        }
    }
    assert!(system.clients().unwrap().is_empty());
}

#[test]
fn update_client_keeps_identity() {
    let conn = empty_db();
    let system = LaundrySystem::open(&conn).unwrap();

    let created = system
        .create_client(form("79167654321", "m@mail.ru"))
        .unwrap();
    let id = created.id.unwrap();

    let updated = system
        .update_client(id, form("79167654322", "maria@mail.ru"))
        .unwrap();
    assert_eq!(updated.id, Some(id));
    assert_eq!(system.client(id).unwrap(), Some(updated));
    assert_eq!(system.clients().unwrap().len(), 1);
}

#[test]
fn update_client_with_unknown_id_is_client_not_found() {
    let conn = empty_db();
    let system = LaundrySystem::open(&conn).unwrap();

    let err = system
        .update_client(12, form("79167654321", "m@mail.ru"))
        .unwrap_err();
    assert!(matches!(err, ServiceError::ClientNotFound(12)));
    assert!(err.is_rejection());
}

#[test]
fn duplicate_phone_surfaces_as_storage_error() {
    let conn = empty_db();
    let system = LaundrySystem::open(&conn).unwrap();

    system
        .create_client(form("79167654321", "first@mail.ru"))
        .unwrap();
    let err = system
        .create_client(form("79167654321", "second@mail.ru"))
        .unwrap_err();

    match &err {
        ServiceError::Repo(repo_err) => assert!(repo_err.is_constraint_violation()),
        other => panic!("expected storage error, got {other:?}"),
    }
    assert!(!err.is_rejection());
}

#[test]
fn delete_client_removes_client_and_its_applications() {
    let conn = open_db_in_memory().unwrap();
    let system = LaundrySystem::open(&conn).unwrap();

    let first = system.create_application(&request(1)).unwrap();
    let second = system.create_application(&request(1)).unwrap();
    let other = system.create_application(&request(2)).unwrap();

    assert!(system.delete_client(1).unwrap());

    assert_eq!(system.client(1).unwrap(), None);
    assert_eq!(system.application(first.id.unwrap()).unwrap(), None);
    assert_eq!(system.application(second.id.unwrap()).unwrap(), None);
    assert_eq!(system.application(other.id.unwrap()).unwrap(), Some(other));
    assert!(!system.delete_client(1).unwrap());
}

#[test]
fn create_application_succeeds_for_resolved_references() {
    let conn = open_db_in_memory().unwrap();
    let system = LaundrySystem::open(&conn).unwrap();

    let created = system
        .create_application(&NewApplication {
            client_id: 3,
            item_count: 7,
            pollution: PollutionLevel::High,
            status: ApplicationStatusCode::Completed,
        })
        .unwrap();

    let loaded = system.application(created.id.unwrap()).unwrap().unwrap();
    assert_eq!(loaded, created);
    assert_eq!(loaded.client_id, 3);
    assert_eq!(loaded.item_count, 7);
    assert_eq!(system.applications_for_client(3).unwrap(), vec![loaded]);
}

#[test]
fn create_application_rejects_unknown_client() {
    let conn = open_db_in_memory().unwrap();
    let system = LaundrySystem::open(&conn).unwrap();

    let err = system.create_application(&request(404)).unwrap_err();
    assert!(matches!(err, ServiceError::ClientNotFound(404)));
    assert!(system.applications().unwrap().is_empty());
}

#[test]
fn create_application_rejects_missing_lookup_rows() {
    let conn = open_db_in_memory().unwrap();
    conn.execute_batch(
        "DELETE FROM PollutionStatus WHERE code = 'HIGH';
         DELETE FROM ApplicationStatus WHERE code = 'CANCELLED';",
    )
    .unwrap();
    let system = LaundrySystem::open(&conn).unwrap();

    let mut missing_pollution = request(1);
    missing_pollution.pollution = PollutionLevel::High;
    let err = system.create_application(&missing_pollution).unwrap_err();
    assert!(matches!(
        err,
        ServiceError::PollutionStatusNotFound(PollutionLevel::High)
    ));

    let mut missing_status = request(1);
    missing_status.status = ApplicationStatusCode::Cancelled;
    let err = system.create_application(&missing_status).unwrap_err();
    assert!(matches!(
        err,
        ServiceError::ApplicationStatusNotFound(ApplicationStatusCode::Cancelled)
    ));

    assert!(system.applications().unwrap().is_empty());
}

#[test]
fn create_application_rejects_non_positive_item_count() {
    let conn = open_db_in_memory().unwrap();
    let system = LaundrySystem::open(&conn).unwrap();

    for item_count in [0, -1] {
        let mut bad = request(1);
        bad.item_count = item_count;
        let err = system.create_application(&bad).unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Validation(ValidationError::NonPositiveItemCount(count)) if count == item_count
        ));
    }
    assert!(system.applications().unwrap().is_empty());
}

#[test]
fn applications_for_unknown_client_is_an_error() {
    let conn = open_db_in_memory().unwrap();
    let system = LaundrySystem::open(&conn).unwrap();

    let err = system.applications_for_client(99).unwrap_err();
    assert!(matches!(err, ServiceError::ClientNotFound(99)));
}

#[test]
fn update_application_status_for_every_status_pair() {
    let conn = open_db_in_memory().unwrap();
    let system = LaundrySystem::open(&conn).unwrap();

    for from in ApplicationStatusCode::ALL {
        for to in ApplicationStatusCode::ALL {
            let mut initial = request(1);
            initial.status = from;
            let created = system.create_application(&initial).unwrap();
            let id = created.id.unwrap();

            assert!(system.update_application_status(id, to).unwrap());
            assert_eq!(system.application(id).unwrap().unwrap().status, to);
        }
    }
}

#[test]
fn update_application_status_on_missing_application_returns_false() {
    let conn = open_db_in_memory().unwrap();
    let system = LaundrySystem::open(&conn).unwrap();

    for status in ApplicationStatusCode::ALL {
        assert!(!system.update_application_status(1000, status).unwrap());
    }
}

#[test]
fn update_application_status_to_missing_status_row_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let system = LaundrySystem::open(&conn).unwrap();
    let created = system.create_application(&request(1)).unwrap();
    conn.execute("DELETE FROM ApplicationStatus WHERE code = 'CANCELLED';", [])
        .unwrap();

    let err = system
        .update_application_status(created.id.unwrap(), ApplicationStatusCode::Cancelled)
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::ApplicationStatusNotFound(ApplicationStatusCode::Cancelled)
    ));
    assert_eq!(
        system
            .application(created.id.unwrap())
            .unwrap()
            .unwrap()
            .status,
        ApplicationStatusCode::InProgress
    );
}

#[test]
fn delete_application_reports_presence() {
    let conn = open_db_in_memory().unwrap();
    let system = LaundrySystem::open(&conn).unwrap();
    let created = system.create_application(&request(2)).unwrap();

    assert!(system.delete_application(created.id.unwrap()).unwrap());
    assert!(!system.delete_application(created.id.unwrap()).unwrap());
    assert!(system.applications().unwrap().is_empty());
}

#[test]
fn open_removes_duplicate_client_phones_keeping_lowest_id() {
    let conn = empty_db();
    recreate_contact_tables_without_unique(&conn);
    conn.execute_batch(
        "INSERT INTO Client (id, last_name, name, patronymic, phone, email) VALUES
            (1, 'Невская', 'Есения', 'Ивановна', '79161234567', 'a@mail.ru'),
            (2, 'Невская', 'Есения', 'Ивановна', '79161234567', 'b@mail.ru'),
            (3, 'Федоров', 'Алексей', 'Владимирович', '79169998877', 'c@mail.ru');
         INSERT INTO Application (client_id, item_count, pollution_code, status_code) VALUES
            (1, 1, 'LOW', 'IN_PROGRESS'),
            (2, 1, 'LOW', 'IN_PROGRESS');",
    )
    .unwrap();

    let system = LaundrySystem::open(&conn).unwrap();

    let ids: Vec<i64> = system
        .clients()
        .unwrap()
        .into_iter()
        .map(|client| client.id.unwrap())
        .collect();
    assert_eq!(ids, vec![1, 3]);

    let owners: Vec<i64> = system
        .applications()
        .unwrap()
        .into_iter()
        .map(|application| application.client_id)
        .collect();
    assert_eq!(owners, vec![1]);

    let report = system.cleanup_duplicates().unwrap();
    assert_eq!(report.clients_removed, 0);
    assert_eq!(report.admins_removed, 0);
}

#[test]
fn authenticate_client_matches_name_case_insensitively() {
    let conn = empty_db();
    let system = LaundrySystem::open(&conn).unwrap();
    let maria = system
        .create_client(form("79167654321", "goryacheva@mail.ru"))
        .unwrap();

    assert_eq!(
        system
            .authenticate_client("мария", "79167654321")
            .unwrap(),
        Some(maria.clone())
    );
    assert_eq!(
        system
            .authenticate_client("  МАРИЯ ", " 79167654321 ")
            .unwrap(),
        Some(maria)
    );
    assert_eq!(
        system
            .authenticate_client("мария", "00000000000")
            .unwrap(),
        None
    );
}

#[test]
fn authenticate_admin_uses_admin_table_only() {
    let conn = open_db_in_memory().unwrap();
    let system = LaundrySystem::open(&conn).unwrap();

    let admin = system
        .authenticate_admin("павел", "79569786342")
        .unwrap()
        .unwrap();
    assert_eq!(admin.last_name, "Марычев");

    assert_eq!(
        system.authenticate_admin("Мария", "79167654321").unwrap(),
        None
    );
    assert!(system.login_admin("Мария", "79167654321").unwrap().is_none());
}

#[test]
fn client_session_scopes_applications_to_its_owner() {
    let conn = open_db_in_memory().unwrap();
    let system = LaundrySystem::open(&conn).unwrap();
    system.create_application(&request(1)).unwrap();

    let session = system
        .login_client("Мария", "79167654321")
        .unwrap()
        .unwrap();
    assert_eq!(session.role(), Role::Client);
    assert_eq!(session.display_name(), "Мария Горячева");

    let submitted = system
        .submit_application(&session, 2, PollutionLevel::Medium)
        .unwrap();
    assert_eq!(submitted.client_id, 2);
    assert_eq!(submitted.status, ApplicationStatusCode::InProgress);

    assert_eq!(
        system.session_applications(&session).unwrap(),
        vec![submitted]
    );
}

#[test]
fn admin_session_sees_all_applications_but_cannot_submit() {
    let conn = open_db_in_memory().unwrap();
    let system = LaundrySystem::open(&conn).unwrap();
    system.create_application(&request(1)).unwrap();
    system.create_application(&request(3)).unwrap();

    let session = system
        .login_admin("Александр", "79182356841")
        .unwrap()
        .unwrap();
    assert_eq!(session.role(), Role::Admin);
    assert_eq!(system.session_applications(&session).unwrap().len(), 2);

    let err = system
        .submit_application(&session, 1, PollutionLevel::Low)
        .unwrap_err();
    assert!(matches!(err, ServiceError::ClientSessionRequired));
}

#[test]
fn update_profile_refreshes_session_client() {
    let conn = open_db_in_memory().unwrap();
    let system = LaundrySystem::open(&conn).unwrap();
    let mut session = system
        .login_client("есения", "79161234567")
        .unwrap()
        .unwrap();

    system
        .update_profile(
            &mut session,
            ContactForm::new(
                "Невская",
                "Есения",
                "Ивановна",
                "79161234500",
                "esenia@mail.ru",
            ),
        )
        .unwrap();

    let client = session.client().unwrap();
    assert_eq!(client.id, Some(1));
    assert_eq!(client.phone, "79161234500");
    assert_eq!(system.client(1).unwrap().as_ref(), Some(client));
}

#[test]
fn delete_own_profile_ends_client_session() {
    let conn = open_db_in_memory().unwrap();
    let system = LaundrySystem::open(&conn).unwrap();
    let session = system
        .login_client("алексей", "79169998877")
        .unwrap()
        .unwrap();
    let application = system
        .submit_application(&session, 1, PollutionLevel::High)
        .unwrap();

    assert!(system.delete_own_profile(session).unwrap());
    assert_eq!(system.client(3).unwrap(), None);
    assert_eq!(system.application(application.id.unwrap()).unwrap(), None);
}

#[test]
fn profile_operations_require_client_session() {
    let conn = open_db_in_memory().unwrap();
    let system = LaundrySystem::open(&conn).unwrap();
    let admin = system.admin(1).unwrap().unwrap();

    let mut session = Session::Admin(admin);
    let err = system
        .update_profile(&mut session, form("79167654399", "x@mail.ru"))
        .unwrap_err();
    assert!(matches!(err, ServiceError::ClientSessionRequired));

    let err = system.delete_own_profile(session).unwrap_err();
    assert!(matches!(err, ServiceError::ClientSessionRequired));
    assert_eq!(system.admins().unwrap().len(), 3);
}

#[test]
fn create_and_delete_admin() {
    let conn = empty_db();
    let system = LaundrySystem::open(&conn).unwrap();

    let admin = system
        .create_admin(ContactForm::new(
            "Погодина",
            "Евгения",
            "Васильевна",
            "79213894750",
            "pogodina@laundry.ru",
        ))
        .unwrap();
    let id = admin.id.unwrap();
    assert_eq!(system.admins().unwrap(), vec![admin]);

    assert!(system.delete_admin(id).unwrap());
    assert_eq!(system.admin(id).unwrap(), None);
}

#[test]
fn application_details_serialize_with_export_field_names() {
    let conn = open_db_in_memory().unwrap();
    let system = LaundrySystem::open(&conn).unwrap();
    let created = system.create_application(&request(2)).unwrap();

    let details = system.application_details().unwrap();
    let json = serde_json::to_value(&details).unwrap();
    let row = &json[0];

    assert_eq!(row["application_id"], created.id.unwrap());
    assert_eq!(row["number_of_items"], 3);
    assert_eq!(row["time_of_receipt"], created.received_at.unwrap());
    assert_eq!(row["client"]["client_id"], 2);
    assert_eq!(row["client"]["phone_number"], "79167654321");
    assert_eq!(row["pollution_status"]["pollution_status_id"], "LOW");
    assert_eq!(row["pollution_status"]["name"], "Небольшое");
    assert_eq!(
        row["application_status"]["application_status_id"],
        "IN_PROGRESS"
    );
}

#[test]
fn lookup_listings_follow_seed_order() {
    let conn = empty_db();
    let system = LaundrySystem::open(&conn).unwrap();

    let pollution: Vec<PollutionLevel> = system
        .pollution_statuses()
        .unwrap()
        .into_iter()
        .map(|row| row.code)
        .collect();
    assert_eq!(pollution, PollutionLevel::ALL.to_vec());

    let statuses: Vec<ApplicationStatusCode> = system
        .application_statuses()
        .unwrap()
        .into_iter()
        .map(|row| row.code)
        .collect();
    assert_eq!(statuses, ApplicationStatusCode::ALL.to_vec());
}

fn recreate_contact_tables_without_unique(conn: &Connection) {
    conn.execute_batch(
        "PRAGMA foreign_keys = OFF;
         DROP TABLE Application;
         DROP TABLE Client;
         CREATE TABLE Client (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            last_name TEXT NOT NULL,
            name TEXT NOT NULL,
            patronymic TEXT NOT NULL,
            phone TEXT NOT NULL,
            email TEXT NOT NULL
         );
         CREATE TABLE Application (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            client_id INTEGER NOT NULL REFERENCES Client(id),
            item_count INTEGER NOT NULL CHECK (item_count > 0),
            pollution_code TEXT NOT NULL REFERENCES PollutionStatus(code),
            status_code TEXT NOT NULL REFERENCES ApplicationStatus(code),
            received_at INTEGER NOT NULL DEFAULT (CAST(strftime('%s', 'now') AS INTEGER) * 1000)
         );
         PRAGMA foreign_keys = ON;",
    )
    .unwrap();
}
