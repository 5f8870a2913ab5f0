mod common;

use calmirror_core::notify::{Channel, ChannelKind, Reporter};
use calmirror_core::run::run_at;
use common::*;
use serde_json::json;

#[tokio::test]
async fn test_run_posts_one_report_covering_both_directions() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/webhook")
        .match_body(mockito::Matcher::Json(json!({
            "content": "📅 **Calendar Sync Report**\n\
                        ✨ Created: Release (11/01 10:00)\n\
                        ✨ Created: Busy (10/29 15:00)"
        })))
        .with_status(204)
        .expect(1)
        .create_async()
        .await;

    let provider = provider();
    provider.insert(WORK, timed("Release", ymd(2025, 11, 1), 10));
    provider.insert(LIFE, timed("Dentist", ymd(2025, 10, 29), 15));
    let settings = settings("");
    let reporter = Reporter::new(vec![Channel::new(
        ChannelKind::Discord,
        format!("{}/webhook", server.url()),
    )])
    .unwrap();

    let summary = run_at(&provider, &settings, &reporter, now()).await;

    mock.assert_async().await;
    assert_eq!(summary.notification.delivered, 1);
    assert_eq!(summary.changes.len(), 2);
}

#[tokio::test]
async fn test_quiet_run_sends_no_report() {
    let mut server = mockito::Server::new_async().await;
    let mock = server.mock("POST", "/webhook").expect(0).create_async().await;

    let provider = provider();
    provider.insert(WORK, timed("Standup", ymd(2025, 10, 28), 9));
    let settings = settings("");
    let reporter = Reporter::new(vec![Channel::new(
        ChannelKind::GoogleChat,
        format!("{}/webhook", server.url()),
    )])
    .unwrap();

    let summary = run_at(&provider, &settings, &reporter, now()).await;

    mock.assert_async().await;
    assert!(summary.changes.is_empty());
    assert!(summary.notification.skipped);
}
