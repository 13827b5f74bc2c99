//! Database fixtures shared by the compute tests.

use chrono::NaiveDate;
use common::{SessionEntry, Status};
use migration::{Migrator, MigratorTrait};
use model::entities::{class_section, student, subject, track};
use sea_orm::{ActiveModelTrait, ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, Set};
use std::time::Duration;

use crate::recorder::SessionKey;

pub async fn setup_db() -> Result<DatabaseConnection, DbErr> {
    // Connect to the SQLite database
    let db = Database::connect("sqlite::memory:").await?;

    // Enable foreign keys
    db.execute_unprepared("PRAGMA foreign_keys = ON;").await?;

    Migrator::up(&db, None).await.expect("Migrations failed.");
    Ok(db)
}

/// Like [`setup_db`], but the pool never grows past one connection, so an
/// open transaction makes every other caller wait.
pub async fn setup_single_connection_db() -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(30))
        .sqlx_logging(false);
    let db = Database::connect(options).await?;
    db.execute_unprepared("PRAGMA foreign_keys = ON;").await?;
    Migrator::up(&db, None).await.expect("Migrations failed.");
    Ok(db)
}

/// Ids of one class, track and subject created by [`seed_reference`].
#[derive(Debug, Clone, Copy)]
pub struct Refs {
    pub class_id: i32,
    pub track_id: i32,
    pub subject_id: i32,
}

impl Refs {
    pub fn key(&self, date: NaiveDate) -> SessionKey {
        SessionKey {
            class_id: self.class_id,
            track_id: self.track_id,
            subject_id: self.subject_id,
            date,
        }
    }
}

pub async fn seed_reference(db: &DatabaseConnection) -> Result<Refs, DbErr> {
    let class = class_section::ActiveModel {
        name: Set("X".to_string()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    let track = track::ActiveModel {
        code: Set("Y".to_string()),
        name: Set("Track Y".to_string()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    let subject = subject::ActiveModel {
        code: Set("MPL01".to_string()),
        name: Set("Math".to_string()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    Ok(Refs {
        class_id: class.id,
        track_id: track.id,
        subject_id: subject.id,
    })
}

/// Creates another subject and returns its id.
pub async fn add_subject(db: &DatabaseConnection, code: &str, name: &str) -> Result<i32, DbErr> {
    let subject = subject::ActiveModel {
        code: Set(code.to_string()),
        name: Set(name.to_string()),
        ..Default::default()
    }
    .insert(db)
    .await?;
    Ok(subject.id)
}

/// Enrolls a student into the class and track of `refs`.
pub async fn add_student(
    db: &DatabaseConnection,
    refs: &Refs,
    nis: &str,
    name: &str,
) -> Result<student::Model, DbErr> {
    student::ActiveModel {
        nis: Set(nis.to_string()),
        name: Set(name.to_string()),
        sex: Set(None),
        class_id: Set(Some(refs.class_id)),
        track_id: Set(Some(refs.track_id)),
        ..Default::default()
    }
    .insert(db)
    .await
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

pub fn entry(nis: &str, status: Status) -> SessionEntry {
    SessionEntry {
        nis: nis.to_string(),
        status,
    }
}
