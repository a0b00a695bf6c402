//! Checks shared by every backend. Each takes a fresh engine.
#![allow(dead_code)]

use chrono::{DateTime, SubsecRound, Utc};
use engine::Pagination;
use engine::id::{AchievementId, DefectId, ProjectId, ReviewId, UserId};
use optional_field::Field;
use tracker_core::TrackerEngine;
use tracker_core::achievement::{
    AchievementPatch, AchievementRepository, AchievementStatus, NewAchievement, RelatedRef,
    ValidAchievement, Visibility,
};
use tracker_core::defect::{
    Assignment, DefectListCriteria, DefectPatch, DefectPriority, DefectRepository,
    DefectSeverity, DefectStatus, NewDefect, ProjectRef, StatusChange, ValidDefect,
    ValidDefectPatch,
};
use tracker_core::project::{NewProject, ProjectRepository};
use tracker_core::review::{Like, NewReview, ReviewRepository};

pub const DEFAULT_PAGE_SIZE: u64 = 25;

/// Stored dates only keep millisecond precision.
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

pub fn new_defect(project: ProjectRef, title: &str) -> NewDefect {
    NewDefect {
        fields: ValidDefect {
            project_id: project.id,
            title: title.into(),
            description: "the login button does nothing".into(),
            status: DefectStatus::New,
            priority: DefectPriority::High,
            severity: DefectSeverity::Major,
            assigned_to: None,
            reproduce_steps: "click login".into(),
            expected_result: "logged in".into(),
            actual_result: "nothing".into(),
        },
        project,
        reported_by: UserId::new(),
        created: now(),
    }
}

pub fn project_ref(name: &str) -> ProjectRef {
    ProjectRef {
        id: ProjectId::new(),
        name: name.into(),
    }
}

pub fn new_achievement(name: &str, code: &str) -> NewAchievement {
    NewAchievement {
        fields: ValidAchievement {
            name: name.into(),
            code: code.into(),
            description: "awarded for reporting defects".into(),
            kind: "defects".into(),
            criteria: Some(serde_json::json!({ "reported": 10 })),
            badge_url: None,
            points: Some(100),
            level: Some(2),
            visibility: Visibility::Public,
            status: AchievementStatus::Locked,
            related: Some(RelatedRef::Project(ProjectId::new())),
            tags: vec!["qa".into()],
        },
        created_by: UserId::new(),
        date: now(),
    }
}

pub fn empty_achievement_patch() -> AchievementPatch {
    AchievementPatch {
        rename: None,
        description: None,
        kind: None,
        criteria: None,
        badge_url: None,
        points: None,
        level: None,
        visibility: None,
        status: None,
        related: Field::Missing,
        tags: None,
    }
}

pub fn new_review(date: DateTime<Utc>) -> NewReview {
    NewReview {
        target: UserId::new(),
        author: UserId::new(),
        text: "always ships on time".into(),
        name: "jo".into(),
        avatar: None,
        date,
    }
}

pub async fn unknown_ids_return_none<E: TrackerEngine>(engine: E) {
    assert!(engine.defects().get(DefectId::new()).await.unwrap().is_none());
    assert!(engine.reviews().get(ReviewId::new()).await.unwrap().is_none());
    assert!(engine.achievements().get(AchievementId::new()).await.unwrap().is_none());
    assert!(engine.projects().get(ProjectId::new()).await.unwrap().is_none());
    assert!(
        engine
            .defects()
            .change_status(DefectId::new(), StatusChange::new(DefectStatus::Closed, now()))
            .await
            .unwrap()
            .is_none()
    );
    assert!(engine.reviews().delete(ReviewId::new()).await.unwrap().is_none());
    assert!(engine.achievements().delete(AchievementId::new()).await.unwrap().is_none());
}

pub async fn created_defect_can_be_fetched<E: TrackerEngine>(engine: E) {
    let defects = engine.defects();

    let created = defects
        .create(new_defect(project_ref("web"), "login broken"))
        .await
        .unwrap();
    let found = defects
        .get(created.id)
        .await
        .unwrap()
        .expect("recently created defect exists");

    assert_eq!(created, found);
    assert_eq!("web", found.project_name);
    assert!(found.modified_date.is_none());
}

pub async fn defect_list_filters_by_project_and_paginates<E: TrackerEngine>(engine: E) {
    let defects = engine.defects();
    let web = project_ref("web");
    let api = project_ref("api");

    for i in 0..3 {
        defects
            .create(new_defect(web.clone(), &format!("web {i}")))
            .await
            .unwrap();
    }
    defects.create(new_defect(api.clone(), "api 0")).await.unwrap();

    let all = defects
        .list(DefectListCriteria::new(Pagination::default(), DEFAULT_PAGE_SIZE, None))
        .await
        .unwrap();
    let api_only = defects
        .list(DefectListCriteria::new(Pagination::default(), DEFAULT_PAGE_SIZE, Some(api.id)))
        .await
        .unwrap();
    let second_web_page = defects
        .list(DefectListCriteria::new(
            Pagination::with_page_size(2, 2),
            DEFAULT_PAGE_SIZE,
            Some(web.id),
        ))
        .await
        .unwrap();
    let past_the_end = defects
        .list(DefectListCriteria::new(
            Pagination::with_default_page_size(5),
            DEFAULT_PAGE_SIZE,
            None,
        ))
        .await
        .unwrap();

    assert_eq!(4, all.len());
    assert_eq!(1, api_only.len());
    assert_eq!("api 0", api_only[0].title);
    assert_eq!(1, second_web_page.len());
    assert_eq!("web 2", second_web_page[0].title);
    assert!(past_the_end.is_empty());
}

pub async fn empty_page_size_lists_nothing<E: TrackerEngine>(engine: E) {
    let defects = engine.defects();
    defects
        .create(new_defect(project_ref("web"), "web 0"))
        .await
        .unwrap();

    let listed = defects
        .list(DefectListCriteria::new(
            Pagination::with_page_size(1, 0),
            DEFAULT_PAGE_SIZE,
            None,
        ))
        .await
        .unwrap();

    assert!(listed.is_empty());
}

pub async fn defect_writes_stamp_modified_date<E: TrackerEngine>(engine: E) {
    let defects = engine.defects();
    let created = defects
        .create(new_defect(project_ref("web"), "login broken"))
        .await
        .unwrap();
    let patch_time = now();

    let patched = defects
        .patch(
            created.id,
            DefectPatch::new(
                ValidDefectPatch {
                    title: Some("login button broken".into()),
                    ..Default::default()
                },
                None,
                patch_time,
            ),
        )
        .await
        .unwrap()
        .unwrap();

    assert_eq!("login button broken", patched.title);
    assert_eq!(created.description, patched.description);
    assert_eq!(Some(patch_time), patched.modified_date);

    let assignee = UserId::new();
    let assigned = defects
        .assign(created.id, Assignment { assignee, at: now() })
        .await
        .unwrap()
        .unwrap();

    assert_eq!(Some(assignee), assigned.assigned_to);
}

pub async fn status_changes_keep_lifecycle_markers<E: TrackerEngine>(engine: E) {
    let defects = engine.defects();
    let created = defects
        .create(new_defect(project_ref("web"), "login broken"))
        .await
        .unwrap();

    let resolved_at = now();
    let resolved = defects
        .change_status(created.id, StatusChange::new(DefectStatus::Resolved, resolved_at))
        .await
        .unwrap()
        .unwrap();
    let closed_at = now();
    let closed = defects
        .change_status(created.id, StatusChange::new(DefectStatus::Closed, closed_at))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(Some(resolved_at), resolved.resolved_date);
    assert!(resolved.closed_date.is_none());
    assert_eq!(DefectStatus::Closed, closed.status);
    assert_eq!(Some(resolved_at), closed.resolved_date);
    assert_eq!(Some(closed_at), closed.closed_date);
    assert_eq!(Some(closed_at), closed.modified_date);
}

pub async fn review_arrays_are_replaced<E: TrackerEngine>(engine: E) {
    let reviews = engine.reviews();
    let review = reviews.create(new_review(now())).await.unwrap();
    let liker = UserId::new();

    let liked = reviews
        .update_likes(review.id, vec![Like { user: liker }])
        .await
        .unwrap()
        .unwrap();
    let found = reviews.get(review.id).await.unwrap().unwrap();

    assert_eq!(vec![Like { user: liker }], liked.likes);
    assert_eq!(liked, found);

    let unliked = reviews
        .update_likes(review.id, Vec::new())
        .await
        .unwrap()
        .unwrap();

    assert!(unliked.likes.is_empty());
}

pub async fn reviews_are_listed_newest_first<E: TrackerEngine>(engine: E) {
    let reviews = engine.reviews();
    let older = reviews
        .create(new_review(now() - chrono::Duration::hours(1)))
        .await
        .unwrap();
    let newer = reviews.create(new_review(now())).await.unwrap();

    let listed = reviews.list().await.unwrap();

    let ids: Vec<_> = listed.iter().map(|r| r.id).collect();
    assert_eq!(vec![newer.id, older.id], ids);
}

pub async fn deleted_review_is_gone<E: TrackerEngine>(engine: E) {
    let reviews = engine.reviews();
    let review = reviews.create(new_review(now())).await.unwrap();

    assert_eq!(Some(()), reviews.delete(review.id).await.unwrap());
    assert!(reviews.get(review.id).await.unwrap().is_none());
}

pub async fn achievements_are_found_by_name_and_code<E: TrackerEngine>(engine: E) {
    let achievements = engine.achievements();
    let created = achievements
        .create(new_achievement("Bug Hunter", "BUG_HUNTER"))
        .await
        .unwrap();

    let by_name = achievements.find_by_name("Bug Hunter").await.unwrap();
    let by_code = achievements.find_by_code("BUG_HUNTER").await.unwrap();
    let missing = achievements.find_by_name("Bug Hunter II").await.unwrap();

    assert_eq!(Some(&created), by_name.as_ref());
    assert_eq!(Some(&created), by_code.as_ref());
    assert!(missing.is_none());
}

pub async fn achievement_update_can_unlink_related<E: TrackerEngine>(engine: E) {
    let achievements = engine.achievements();
    let created = achievements
        .create(new_achievement("Bug Hunter", "BUG_HUNTER"))
        .await
        .unwrap();
    assert!(created.related.is_some());

    let updated = achievements
        .update(
            created.id,
            AchievementPatch {
                status: Some(AchievementStatus::Earned),
                related: Field::Present(None),
                ..empty_achievement_patch()
            },
        )
        .await
        .unwrap()
        .unwrap();

    assert_eq!(AchievementStatus::Earned, updated.status);
    assert!(updated.related.is_none());
    assert_eq!(created.name, updated.name);
    assert_eq!(created.criteria, updated.criteria);
}

pub async fn created_project_can_be_fetched<E: TrackerEngine>(engine: E) {
    let projects = engine.projects();

    let created = projects
        .create(NewProject {
            name: "web".into(),
            description: Some("customer portal".into()),
            created_by: UserId::new(),
            created: now(),
        })
        .await
        .unwrap();

    assert_eq!(Some(created.clone()), projects.get(created.id).await.unwrap());
}
