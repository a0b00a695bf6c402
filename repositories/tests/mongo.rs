//! Runs the shared repository checks against a throwaway MongoDB container.
mod common;

use repositories::mongodb::{ConnectionDetails, MongoEngine};
use testcontainers_modules::mongo::Mongo;
use testcontainers_modules::testcontainers::ContainerAsync;
use testcontainers_modules::testcontainers::runners::AsyncRunner;
use tracker_core::TrackerEngine;
use tracker_core::user::{User, UserRepository, UserRole};

struct TestRuntime {
    _container: ContainerAsync<Mongo>,
    engine: MongoEngine,
}

async fn runtime() -> TestRuntime {
    let container = Mongo::default().start().await.unwrap();
    let host = container.get_host().await.unwrap();
    let port = container.get_host_port_ipv4(27017).await.unwrap();

    let engine = MongoEngine::init(
        ConnectionDetails::Url(format!("mongodb://{host}:{port}/?authSource=admin")),
        "defect_tracker_test",
    )
    .await
    .unwrap();

    TestRuntime {
        _container: container,
        engine,
    }
}

macro_rules! mongo_tests {
    ($($name:ident),+ $(,)?) => {
        $(
            #[tokio::test]
            #[ignore = "needs a docker daemon to start mongodb"]
            async fn $name() {
                let runtime = runtime().await;
                common::$name(runtime.engine.clone()).await;
            }
        )+
    };
}

mongo_tests!(
    unknown_ids_return_none,
    created_defect_can_be_fetched,
    defect_list_filters_by_project_and_paginates,
    empty_page_size_lists_nothing,
    defect_writes_stamp_modified_date,
    status_changes_keep_lifecycle_markers,
    review_arrays_are_replaced,
    reviews_are_listed_newest_first,
    deleted_review_is_gone,
    achievements_are_found_by_name_and_code,
    achievement_update_can_unlink_related,
    created_project_can_be_fetched,
);

#[tokio::test]
#[ignore = "needs a docker daemon to start mongodb"]
async fn seeded_user_roles_are_read_back() {
    let runtime = runtime().await;
    let users = runtime.engine.users();
    let admin = User {
        id: Default::default(),
        name: "root".into(),
        email: "root@example.com".into(),
        avatar: None,
        user_role: UserRole::Admin,
    };

    users.insert(admin.clone()).await.unwrap();

    let found = users.get(admin.id).await.unwrap().unwrap();
    assert!(found.is_admin());
    assert_eq!(admin, found);
}
