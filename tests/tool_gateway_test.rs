// ABOUTME: Integration tests for the tool invocation gateway
// ABOUTME: Covers per-user isolation, argument validation, and result payload shapes

mod helpers;

use helpers::test_database;
use serde_json::json;
use taskbot_server::llm::FunctionCall;
use taskbot_server::tools::{ToolError, ToolGateway};

fn call(name: &str, args: serde_json::Value) -> FunctionCall {
    FunctionCall {
        name: name.to_owned(),
        args,
    }
}

#[tokio::test]
async fn test_add_and_list_tasks() {
    let db = test_database().await;
    let gateway = ToolGateway::new(&db.database);

    let created = gateway
        .invoke(
            "user-a",
            &call("add_task", json!({"title": "Buy milk", "description": "2 liters"})),
        )
        .await
        .unwrap();
    assert_eq!(created["status"], "created");
    assert_eq!(created["title"], "Buy milk");
    let task_id = created["task_id"].as_i64().unwrap();
    assert!(task_id > 0);

    let listed = gateway
        .invoke("user-a", &call("list_tasks", json!({})))
        .await
        .unwrap();
    let tasks = listed.as_array().unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0]["id"], task_id);
    assert_eq!(tasks[0]["title"], "Buy milk");
    assert_eq!(tasks[0]["description"], "2 liters");
    assert_eq!(tasks[0]["completed"], false);
}

#[tokio::test]
async fn test_list_tasks_newest_first_with_status_filter() {
    let db = test_database().await;
    let gateway = ToolGateway::new(&db.database);

    let first = gateway
        .invoke("user-a", &call("add_task", json!({"title": "first"})))
        .await
        .unwrap();
    let second = gateway
        .invoke("user-a", &call("add_task", json!({"title": "second"})))
        .await
        .unwrap();

    gateway
        .invoke(
            "user-a",
            &call("complete_task", json!({"task_id": first["task_id"]})),
        )
        .await
        .unwrap();

    let all = gateway
        .invoke("user-a", &call("list_tasks", json!({"status": "all"})))
        .await
        .unwrap();
    let all = all.as_array().unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0]["id"], second["task_id"]);

    let pending = gateway
        .invoke("user-a", &call("list_tasks", json!({"status": "pending"})))
        .await
        .unwrap();
    assert_eq!(pending.as_array().unwrap().len(), 1);
    assert_eq!(pending[0]["title"], "second");

    let completed = gateway
        .invoke("user-a", &call("list_tasks", json!({"status": "completed"})))
        .await
        .unwrap();
    assert_eq!(completed.as_array().unwrap().len(), 1);
    assert_eq!(completed[0]["title"], "first");
}

#[tokio::test]
async fn test_complete_update_delete_round_trip() {
    let db = test_database().await;
    let gateway = ToolGateway::new(&db.database);

    let created = gateway
        .invoke("user-a", &call("add_task", json!({"title": "Task"})))
        .await
        .unwrap();
    let task_id = created["task_id"].clone();

    let completed = gateway
        .invoke("user-a", &call("complete_task", json!({"task_id": task_id})))
        .await
        .unwrap();
    assert_eq!(completed["status"], "completed");

    // Completing again is idempotent
    let again = gateway
        .invoke("user-a", &call("complete_task", json!({"task_id": task_id})))
        .await
        .unwrap();
    assert_eq!(again["status"], "completed");

    let updated = gateway
        .invoke(
            "user-a",
            &call("update_task", json!({"task_id": task_id, "title": "Renamed"})),
        )
        .await
        .unwrap();
    assert_eq!(updated["status"], "updated");
    assert_eq!(updated["title"], "Renamed");

    let deleted = gateway
        .invoke("user-a", &call("delete_task", json!({"task_id": task_id})))
        .await
        .unwrap();
    assert_eq!(deleted["status"], "deleted");
    assert_eq!(deleted["title"], "Renamed");

    // Deleting again reports not found
    let err = gateway
        .invoke("user-a", &call("delete_task", json!({"task_id": task_id})))
        .await
        .unwrap_err();
    assert!(matches!(err, ToolError::NotFound));
}

#[tokio::test]
async fn test_user_isolation() {
    let db = test_database().await;
    let gateway = ToolGateway::new(&db.database);

    let created = gateway
        .invoke("user-b", &call("add_task", json!({"title": "B's task"})))
        .await
        .unwrap();
    let task_id = created["task_id"].clone();

    // user-a cannot see or touch user-b's task
    let listed = gateway
        .invoke("user-a", &call("list_tasks", json!({})))
        .await
        .unwrap();
    assert!(listed.as_array().unwrap().is_empty());

    for tool in ["complete_task", "delete_task"] {
        let err = gateway
            .invoke("user-a", &call(tool, json!({"task_id": task_id})))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::NotFound), "{tool} leaked access");
    }

    let err = gateway
        .invoke(
            "user-a",
            &call("update_task", json!({"task_id": task_id, "title": "stolen"})),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ToolError::NotFound));

    // And user-b still has it, unmodified
    let listed = gateway
        .invoke("user-b", &call("list_tasks", json!({})))
        .await
        .unwrap();
    assert_eq!(listed[0]["title"], "B's task");
}

#[tokio::test]
async fn test_validation_errors() {
    let db = test_database().await;
    let gateway = ToolGateway::new(&db.database);

    let cases = [
        call("add_task", json!({"title": ""})),
        call("add_task", json!({"title": "   "})),
        call("add_task", json!({"title": "x".repeat(501)})),
        call("add_task", json!({})),
        call("list_tasks", json!({"limit": 0})),
        call("list_tasks", json!({"status": "done"})),
        call("update_task", json!({"task_id": 1})),
        call("complete_task", json!({"task_id": "seven"})),
    ];

    for case in cases {
        let err = gateway.invoke("user-a", &case).await.unwrap_err();
        assert!(
            matches!(err, ToolError::Validation(_)),
            "expected validation error for {} with {}",
            case.name,
            case.args
        );
    }
}

#[tokio::test]
async fn test_unknown_tool_rejected() {
    let db = test_database().await;
    let gateway = ToolGateway::new(&db.database);

    let err = gateway
        .invoke("user-a", &call("drop_database", json!({})))
        .await
        .unwrap_err();
    let ToolError::Validation(message) = err else {
        panic!("expected validation error");
    };
    assert!(message.contains("drop_database"));
}

#[tokio::test]
async fn test_missing_task_reports_not_found() {
    let db = test_database().await;
    let gateway = ToolGateway::new(&db.database);

    for tool in ["complete_task", "delete_task"] {
        let err = gateway
            .invoke("user-a", &call(tool, json!({"task_id": 424242})))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::NotFound));
    }

    let err = gateway
        .invoke(
            "user-a",
            &call("update_task", json!({"task_id": 424242, "title": "x"})),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ToolError::NotFound));
}
