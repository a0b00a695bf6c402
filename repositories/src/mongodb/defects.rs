use super::{from_bson_date, to_bson_date};
use bson::oid::ObjectId;
use bson::{Document, doc};
use engine::id::DefectId;
use error_stack::{IntoReport, ResultExt};
use mongodb::options::{FindOneAndUpdateOptions, FindOptions, ReturnDocument};
use mongodb::{Collection, Database};
use serde::{Deserialize, Serialize};
use tokio_stream::StreamExt;
use tracing::debug;
use tracker_core::defect::{
    Assignment, Defect, DefectListCriteria, DefectPatch, DefectPriority, DefectRepository,
    DefectSeverity, DefectStatus, NewDefect, StatusChange,
};
use tracker_core::result::{DefectRepoError, OptRepoResult, RepoResult};

const DEFECTS_COLLECTION_NAME: &str = "defects";

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MongoDefect {
    #[serde(rename = "_id")]
    id: ObjectId,
    project_id: ObjectId,
    project_name: String,
    defect_title: String,
    defect_description: String,
    defect_status: DefectStatus,
    defect_priority: DefectPriority,
    defect_severity: DefectSeverity,
    reported_by: ObjectId,
    assigned_to: Option<ObjectId>,
    reproduce_steps: String,
    expected_result: String,
    actual_result: String,
    created_date: bson::DateTime,
    modified_date: Option<bson::DateTime>,
    resolved_date: Option<bson::DateTime>,
    closed_date: Option<bson::DateTime>,
}

impl From<Defect> for MongoDefect {
    fn from(value: Defect) -> Self {
        Self {
            id: value.id.into(),
            project_id: value.project_id.into(),
            project_name: value.project_name,
            defect_title: value.title,
            defect_description: value.description,
            defect_status: value.status,
            defect_priority: value.priority,
            defect_severity: value.severity,
            reported_by: value.reported_by.into(),
            assigned_to: value.assigned_to.map(Into::into),
            reproduce_steps: value.reproduce_steps,
            expected_result: value.expected_result,
            actual_result: value.actual_result,
            created_date: to_bson_date(value.created_date),
            modified_date: value.modified_date.map(to_bson_date),
            resolved_date: value.resolved_date.map(to_bson_date),
            closed_date: value.closed_date.map(to_bson_date),
        }
    }
}

impl From<MongoDefect> for Defect {
    fn from(value: MongoDefect) -> Self {
        Self {
            id: value.id.into(),
            project_id: value.project_id.into(),
            project_name: value.project_name,
            title: value.defect_title,
            description: value.defect_description,
            status: value.defect_status,
            priority: value.defect_priority,
            severity: value.defect_severity,
            reported_by: value.reported_by.into(),
            assigned_to: value.assigned_to.map(Into::into),
            reproduce_steps: value.reproduce_steps,
            expected_result: value.expected_result,
            actual_result: value.actual_result,
            created_date: from_bson_date(value.created_date),
            modified_date: value.modified_date.map(from_bson_date),
            resolved_date: value.resolved_date.map(from_bson_date),
            closed_date: value.closed_date.map(from_bson_date),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DefectRepo {
    collection: Collection<MongoDefect>,
}

impl DefectRepo {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection(DEFECTS_COLLECTION_NAME),
        }
    }

    async fn set_fields(
        &self,
        id: DefectId,
        fields: Document,
    ) -> Result<Option<Defect>, mongodb::error::Error> {
        debug!("updating defect {id} with {fields:?}");

        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        self.collection
            .find_one_and_update(doc! { "_id": id }, doc! { "$set": fields })
            .with_options(options)
            .await
            .map(|d| d.map(From::from))
    }
}

impl DefectRepository for DefectRepo {
    async fn get(&self, id: DefectId) -> OptRepoResult<Defect, DefectRepoError> {
        self.collection
            .find_one(doc! { "_id": id })
            .await
            .change_context(DefectRepoError::Get)
            .map(|d| d.map(From::from))
    }

    async fn list(
        &self,
        criteria: DefectListCriteria,
    ) -> RepoResult<Vec<Defect>, DefectRepoError> {
        // mongodb reads a limit of 0 as no limit at all
        if criteria.page_size == 0 {
            return Ok(Vec::new());
        }

        let skip = criteria
            .offset()
            .ok_or(DefectRepoError::List)
            .attach_with(|| {
                format!(
                    "invalid page ({}) and page size ({})",
                    criteria.page, criteria.page_size
                )
            })?;

        let Ok(limit) = i64::try_from(criteria.page_size) else {
            return Err(DefectRepoError::List.into_report()).attach_with(|| {
                format!(
                    "invalid page_size {}. It is too large and not supported",
                    criteria.page_size
                )
            });
        };

        let filter = match criteria.project_id {
            Some(project_id) => doc! { "projectId": project_id },
            None => Document::new(),
        };

        let options = FindOptions::builder()
            .sort(doc! { "createdDate": 1, "_id": 1 })
            .skip(skip)
            .limit(limit)
            .build();

        self.collection
            .find(filter)
            .with_options(options)
            .await
            .change_context(DefectRepoError::List)?
            .map(|d| d.map(From::from))
            .collect::<Result<_, _>>()
            .await
            .change_context(DefectRepoError::List)
    }

    async fn create(&self, new_defect: NewDefect) -> RepoResult<Defect, DefectRepoError> {
        let document = MongoDefect::from(Defect::create(DefectId::new(), new_defect));

        self.collection
            .insert_one(&document)
            .await
            .change_context(DefectRepoError::Create)
            .attach_with(|| format!("defect title: {}", document.defect_title))?;

        Ok(document.into())
    }

    async fn patch(
        &self,
        id: DefectId,
        patch: DefectPatch,
    ) -> OptRepoResult<Defect, DefectRepoError> {
        let mut fields = Document::new();
        if let Some(project) = patch.project {
            fields.insert("projectId", project.id);
            fields.insert("projectName", project.name);
        }
        if let Some(title) = patch.title {
            fields.insert("defectTitle", title);
        }
        if let Some(description) = patch.description {
            fields.insert("defectDescription", description);
        }
        if let Some(priority) = patch.priority {
            fields.insert("defectPriority", priority.as_str());
        }
        if let Some(severity) = patch.severity {
            fields.insert("defectSeverity", severity.as_str());
        }
        if let Some(steps) = patch.reproduce_steps {
            fields.insert("reproduceSteps", steps);
        }
        if let Some(expected) = patch.expected_result {
            fields.insert("expectedResult", expected);
        }
        if let Some(actual) = patch.actual_result {
            fields.insert("actualResult", actual);
        }
        fields.insert("modifiedDate", to_bson_date(patch.modified));

        self.set_fields(id, fields)
            .await
            .change_context(DefectRepoError::Patch)
    }

    async fn change_status(
        &self,
        id: DefectId,
        change: StatusChange,
    ) -> OptRepoResult<Defect, DefectRepoError> {
        let mut fields = doc! {
            "defectStatus": change.status.as_str(),
            "modifiedDate": to_bson_date(change.at),
        };
        if let Some(resolved) = change.resolved_date() {
            fields.insert("resolvedDate", to_bson_date(resolved));
        }
        if let Some(closed) = change.closed_date() {
            fields.insert("closedDate", to_bson_date(closed));
        }

        self.set_fields(id, fields)
            .await
            .change_context(DefectRepoError::ChangeStatus)
    }

    async fn assign(
        &self,
        id: DefectId,
        assignment: Assignment,
    ) -> OptRepoResult<Defect, DefectRepoError> {
        let fields = doc! {
            "assignedTo": assignment.assignee,
            "modifiedDate": to_bson_date(assignment.at),
        };

        self.set_fields(id, fields)
            .await
            .change_context(DefectRepoError::Assign)
    }
}
