use super::{from_bson_date, to_bson_date};
use bson::oid::ObjectId;
use bson::{Bson, Document, doc};
use engine::id::AchievementId;
use error_stack::ResultExt;
use mongodb::options::{FindOneAndUpdateOptions, ReturnDocument};
use mongodb::{Collection, Database};
use optional_field::Field;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio_stream::StreamExt;
use tracing::{debug, warn};
use tracker_core::achievement::{
    Achievement, AchievementPatch, AchievementRepository, AchievementStatus, NewAchievement,
    RelatedKind, RelatedRef, Rename, Visibility,
};
use tracker_core::result::{AchievementRepoError, OptRepoResult, RepoResult};

const ACHIEVEMENTS_COLLECTION_NAME: &str = "achievements";

/// The related reference is stored as two flat fields so that either can be queried on its own.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MongoAchievement {
    #[serde(rename = "_id")]
    id: ObjectId,
    user: ObjectId,
    achievement_name: String,
    achievement_code: String,
    achievement_desc: String,
    achievement_type: String,
    criteria: Option<Value>,
    badge_url: Option<String>,
    points: Option<u32>,
    level: Option<u32>,
    visibility: Visibility,
    status: AchievementStatus,
    related_object: Option<ObjectId>,
    related_object_type: Option<RelatedKind>,
    #[serde(default)]
    tags: Vec<String>,
    date: bson::DateTime,
}

fn related_parts(related: &RelatedRef) -> (ObjectId, RelatedKind) {
    let id = match related {
        RelatedRef::User(id) => id.object_id(),
        RelatedRef::Project(id) => id.object_id(),
        RelatedRef::Defect(id) => id.object_id(),
        RelatedRef::Review(id) => id.object_id(),
        RelatedRef::Achievement(id) => id.object_id(),
    };
    (id, related.kind())
}

fn related_from_parts(id: ObjectId, kind: RelatedKind) -> RelatedRef {
    match kind {
        RelatedKind::User => RelatedRef::User(id.into()),
        RelatedKind::Project => RelatedRef::Project(id.into()),
        RelatedKind::Defect => RelatedRef::Defect(id.into()),
        RelatedKind::Review => RelatedRef::Review(id.into()),
        RelatedKind::Achievement => RelatedRef::Achievement(id.into()),
    }
}

impl From<Achievement> for MongoAchievement {
    fn from(value: Achievement) -> Self {
        let (related_object, related_object_type) =
            match value.related.as_ref().map(related_parts) {
                Some((id, kind)) => (Some(id), Some(kind)),
                None => (None, None),
            };

        Self {
            id: value.id.into(),
            user: value.created_by.into(),
            achievement_name: value.name,
            achievement_code: value.code,
            achievement_desc: value.description,
            achievement_type: value.kind,
            criteria: value.criteria,
            badge_url: value.badge_url,
            points: value.points,
            level: value.level,
            visibility: value.visibility,
            status: value.status,
            related_object,
            related_object_type,
            tags: value.tags,
            date: to_bson_date(value.date),
        }
    }
}

impl From<MongoAchievement> for Achievement {
    fn from(value: MongoAchievement) -> Self {
        // a half written reference cannot be resolved, so it reads back as no reference at all
        let related = match (value.related_object, value.related_object_type) {
            (Some(id), Some(kind)) => Some(related_from_parts(id, kind)),
            _ => None,
        };

        Self {
            id: value.id.into(),
            created_by: value.user.into(),
            name: value.achievement_name,
            code: value.achievement_code,
            description: value.achievement_desc,
            kind: value.achievement_type,
            criteria: value.criteria,
            badge_url: value.badge_url,
            points: value.points,
            level: value.level,
            visibility: value.visibility,
            status: value.status,
            related,
            tags: value.tags,
            date: from_bson_date(value.date),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AchievementRepo {
    collection: Collection<MongoAchievement>,
}

impl AchievementRepo {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection(ACHIEVEMENTS_COLLECTION_NAME),
        }
    }

    async fn find_one_by(
        &self,
        filter: Document,
        field: &'static str,
    ) -> OptRepoResult<Achievement, AchievementRepoError> {
        self.collection
            .find_one(filter)
            .await
            .change_context(AchievementRepoError::FindBy(field))
            .map(|a| a.map(From::from))
    }
}

fn update_document(patch: AchievementPatch) -> Result<Document, bson::ser::Error> {
    let mut fields = Document::new();

    if let Some(Rename { name, code }) = patch.rename {
        fields.insert("achievementName", name);
        fields.insert("achievementCode", code);
    }
    if let Some(description) = patch.description {
        fields.insert("achievementDesc", description);
    }
    if let Some(kind) = patch.kind {
        fields.insert("achievementType", kind);
    }
    if let Some(criteria) = patch.criteria {
        fields.insert("criteria", bson::to_bson(&criteria)?);
    }
    if let Some(badge_url) = patch.badge_url {
        fields.insert("badgeUrl", badge_url);
    }
    if let Some(points) = patch.points {
        fields.insert("points", i64::from(points));
    }
    if let Some(level) = patch.level {
        fields.insert("level", i64::from(level));
    }
    if let Some(visibility) = patch.visibility {
        fields.insert("visibility", visibility.as_str());
    }
    if let Some(status) = patch.status {
        fields.insert("status", status.as_str());
    }
    match patch.related {
        Field::Present(Some(related)) => {
            let (id, kind) = related_parts(&related);
            fields.insert("relatedObject", id);
            fields.insert("relatedObjectType", kind.as_str());
        }
        Field::Present(None) => {
            fields.insert("relatedObject", Bson::Null);
            fields.insert("relatedObjectType", Bson::Null);
        }
        Field::Missing => {}
    }
    if let Some(tags) = patch.tags {
        fields.insert("tags", tags);
    }

    Ok(fields)
}

impl AchievementRepository for AchievementRepo {
    async fn get(&self, id: AchievementId) -> OptRepoResult<Achievement, AchievementRepoError> {
        self.collection
            .find_one(doc! { "_id": id })
            .await
            .change_context(AchievementRepoError::Get)
            .map(|a| a.map(From::from))
    }

    async fn list(&self) -> RepoResult<Vec<Achievement>, AchievementRepoError> {
        self.collection
            .find(Document::new())
            .await
            .change_context(AchievementRepoError::List)?
            .map(|a| a.map(From::from))
            .collect::<Result<_, _>>()
            .await
            .change_context(AchievementRepoError::List)
    }

    async fn find_by_name(&self, name: &str) -> OptRepoResult<Achievement, AchievementRepoError> {
        self.find_one_by(doc! { "achievementName": name }, "name")
            .await
    }

    async fn find_by_code(&self, code: &str) -> OptRepoResult<Achievement, AchievementRepoError> {
        self.find_one_by(doc! { "achievementCode": code }, "code")
            .await
    }

    async fn create(
        &self,
        new_achievement: NewAchievement,
    ) -> RepoResult<Achievement, AchievementRepoError> {
        let document =
            MongoAchievement::from(Achievement::create(AchievementId::new(), new_achievement));

        self.collection
            .insert_one(&document)
            .await
            .change_context(AchievementRepoError::Create)
            .attach_with(|| format!("achievement code: {}", document.achievement_code))?;

        Ok(document.into())
    }

    async fn update(
        &self,
        id: AchievementId,
        patch: AchievementPatch,
    ) -> OptRepoResult<Achievement, AchievementRepoError> {
        let fields = update_document(patch).change_context(AchievementRepoError::Update)?;

        if fields.is_empty() {
            warn!("no achievement fields specified, returning existing achievement");
            return self
                .get(id)
                .await
                .change_context(AchievementRepoError::Update);
        }

        debug!("updating achievement {id} with {fields:?}");

        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        self.collection
            .find_one_and_update(doc! { "_id": id }, doc! { "$set": fields })
            .with_options(options)
            .await
            .change_context(AchievementRepoError::Update)
            .map(|a| a.map(From::from))
    }

    async fn delete(&self, id: AchievementId) -> OptRepoResult<(), AchievementRepoError> {
        let result = self
            .collection
            .delete_one(doc! { "_id": id })
            .await
            .change_context(AchievementRepoError::Delete)?;

        Ok((result.deleted_count > 0).then_some(()))
    }
}
