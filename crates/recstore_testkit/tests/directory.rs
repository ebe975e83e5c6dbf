//! Repository scenarios against canned directory servers.

use recstore_core::{Repository, RepositoryConfig};
use recstore_mapper::{record_from, DirectoryConnector, Mapper, MapperParams};
use recstore_testkit::prelude::*;
use serde_json::json;
use std::sync::Arc;

fn directory_config() -> RepositoryConfig {
    let mut config = RepositoryConfig::new().with_mapper_default("ldap");
    for server in two_directory_servers() {
        config = config.with_server(server);
    }
    config
}

#[test]
fn first_server_with_results_answers_the_repository() {
    let connector = CannedConnector::new()
        .with_rows("primary", Vec::new())
        .with_rows(
            "secondary",
            vec![record_from([
                ("uid", json!("alice")),
                ("cn", json!("Alice Example")),
            ])],
        );

    let mut users = Repository::new(
        directory_config(),
        MapperParams::new().with_query("alice").with_type_tag("user"),
    )
    .unwrap()
    .with_connector(Arc::new(connector) as Arc<dyn DirectoryConnector>);

    assert_eq!(
        users.get_data(),
        Some(record_from([
            ("cn", json!("Alice Example")),
            ("uid", json!("alice")),
        ]))
    );
}

#[test]
fn server_rows_are_never_merged() {
    let connector = CannedConnector::new()
        .with_rows("primary", vec![record_from([("uid", json!("alice"))])])
        .with_rows(
            "secondary",
            vec![record_from([
                ("uid", json!("alice")),
                ("mail", json!("alice@example.com")),
            ])],
        );

    let mut users = Repository::new(
        directory_config(),
        MapperParams::new().with_query("alice").with_type_tag("user"),
    )
    .unwrap()
    .with_connector(Arc::new(connector) as Arc<dyn DirectoryConnector>);

    // Only the primary's attributes are visible
    assert_eq!(users.get_data(), Some(record_from([("uid", json!("alice"))])));
}

#[test]
fn directory_writes_report_failure_not_panic() {
    let mut users = Repository::new(
        directory_config(),
        MapperParams::new().with_query("alice").with_type_tag("user"),
    )
    .unwrap()
    .with_connector(Arc::new(CannedConnector::new()) as Arc<dyn DirectoryConnector>);

    assert!(!users.set_data(Some(sample_record()), true));
    assert!(!users.mapper().delete());
    assert!(!users.mapper().rename("bob"));
    assert!(!users.mapper().exists());
}
