//! Integration tests for ytstats-common crate.

use ytstats_common::{
    sanitize_filename,
    test_utils::{fixtures, Fault, ScriptedYouTube},
    MockYouTubeApi, RequestedCount, YouTubeApi, YtStatsError,
};

#[test]
fn test_sanitize_filename_keeps_unicode() {
    assert_eq!(sanitize_filename("Café: Live?"), "Café Live");
}

#[test]
fn test_requested_count_round_trips_through_display() {
    for choice in RequestedCount::choices() {
        let parsed: RequestedCount = choice.to_string().parse().unwrap();
        assert_eq!(parsed, choice);
    }
}

#[tokio::test]
async fn test_trait_object_dispatch() {
    let scripted = ScriptedYouTube::new()
        .with_channel(fixtures::channel("UC1", "One"))
        .fail_batch("v0", Fault::Remote, 1);
    let api: &dyn YouTubeApi = &scripted;

    let identity = api.channel_details("UC1").await.unwrap().unwrap();
    assert_eq!(identity.uploads_playlist_id, "UU1");
    assert!(api.channel_details("UC2").await.unwrap().is_none());

    let err = api.videos(&["v0".to_string()]).await.unwrap_err();
    assert!(matches!(
        err,
        YtStatsError::RemoteApi {
            status_code: Some(500),
            ..
        }
    ));
    assert_eq!(scripted.total_calls(), 3);
}

#[tokio::test]
async fn test_mock_api_expectations() {
    let mut mock = MockYouTubeApi::new();
    mock.expect_search_channel()
        .withf(|q: &str| q == "@handle")
        .times(1)
        .returning(|_| Ok(Some("UCh".to_string())));

    let found = mock.search_channel("@handle").await.unwrap();
    assert_eq!(found.as_deref(), Some("UCh"));
}
