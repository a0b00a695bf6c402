//! MongoDB backed repositories. Each entity lives in its own collection of one database.
//!
//! Documents use native BSON types (`ObjectId`, `DateTime`) so that the stored data stays queryable
//! from the mongo shell, and are converted to the domain models at the repository boundary.
use error_stack::{Report, ResultExt};
use mongodb::{Client, Database};
use tracing::info;
use tracker_core::TrackerEngine;

mod achievements;
mod defects;
mod projects;
mod reviews;
mod users;

pub use achievements::AchievementRepo;
pub use defects::DefectRepo;
pub use projects::ProjectRepo;
pub use reviews::ReviewRepo;
pub use users::UserRepo;

pub enum ConnectionDetails {
    Url(String),
}

#[derive(Debug, thiserror::Error)]
#[error("failed to create client connection to mongodb instance")]
pub struct ConnectError;

#[derive(Debug, Clone)]
pub struct MongoEngine {
    db: Database,
}

impl MongoEngine {
    pub fn new(client: Client, db_name: &str) -> Self {
        Self {
            db: client.database(db_name),
        }
    }

    pub async fn init(
        connection_details: ConnectionDetails,
        db_name: &str,
    ) -> Result<Self, Report<ConnectError>> {
        let client = match connection_details {
            ConnectionDetails::Url(url) => Client::with_uri_str(url)
                .await
                .change_context(ConnectError)?,
        };

        info!("connected to mongodb, using database '{db_name}'");

        Ok(Self::new(client, db_name))
    }

    /// Direct handle on the database, for seeding and inspecting collections.
    pub fn database(&self) -> &Database {
        &self.db
    }
}

impl TrackerEngine for MongoEngine {
    type Defects = DefectRepo;
    type Reviews = ReviewRepo;
    type Achievements = AchievementRepo;
    type Projects = ProjectRepo;
    type Users = UserRepo;

    fn defects(&self) -> Self::Defects {
        DefectRepo::new(&self.db)
    }

    fn reviews(&self) -> Self::Reviews {
        ReviewRepo::new(&self.db)
    }

    fn achievements(&self) -> Self::Achievements {
        AchievementRepo::new(&self.db)
    }

    fn projects(&self) -> Self::Projects {
        ProjectRepo::new(&self.db)
    }

    fn users(&self) -> Self::Users {
        UserRepo::new(&self.db)
    }
}

fn to_bson_date(date: chrono::DateTime<chrono::Utc>) -> bson::DateTime {
    bson::DateTime::from_chrono(date)
}

fn from_bson_date(date: bson::DateTime) -> chrono::DateTime<chrono::Utc> {
    date.to_chrono()
}
