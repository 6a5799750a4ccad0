//! Channel resolution from the supported URL shapes

use tracing::{debug, info, instrument};
use ytstats_common::{bail, ChannelIdentity, Result, YouTubeApi, YtStatsError};

const CHANNEL_MARKER: &str = "/channel/";
const USER_MARKER: &str = "/user/";
const CUSTOM_MARKER: &str = "/c/";
const HANDLE_MARKER: &str = "/@";

/// The shape of a channel URL, determined without any remote call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UrlShape {
    /// `/channel/<id>`: the ID is used as-is
    DirectId(String),
    /// `/user/<name>`
    LegacyUsername(String),
    /// `/c/<name>`; resolved the same way as a legacy username
    CustomPath(String),
    /// `/@<handle>`, stored with its leading `@`
    Handle(String),
    /// None of the above
    Invalid,
}

/// Classify a channel URL.
///
/// Markers are checked in a fixed order: `/channel/`, then `/user/` and `/c/`,
/// then `/@`. The path segment right after the first matching marker is the
/// identifier; query strings, fragments and trailing slashes are ignored.
pub fn classify(url: &str) -> UrlShape {
    let path = strip_query_and_fragment(url.trim());

    if let Some(id) = segment_after(path, CHANNEL_MARKER) {
        return UrlShape::DirectId(id.to_string());
    }
    if let Some(name) = segment_after(path, USER_MARKER) {
        return UrlShape::LegacyUsername(name.to_string());
    }
    if let Some(name) = segment_after(path, CUSTOM_MARKER) {
        return UrlShape::CustomPath(name.to_string());
    }
    if let Some(handle) = segment_after(path, HANDLE_MARKER) {
        return UrlShape::Handle(format!("@{}", handle));
    }

    UrlShape::Invalid
}

fn strip_query_and_fragment(url: &str) -> &str {
    url.split(|c| c == '?' || c == '#').next().unwrap_or(url)
}

/// The non-empty segment that follows `marker`, if the marker is present
fn segment_after<'a>(path: &'a str, marker: &str) -> Option<&'a str> {
    let (_, rest) = path.split_once(marker)?;
    rest.split('/').next().filter(|segment| !segment.is_empty())
}

/// Determine the canonical channel ID for a URL.
///
/// Direct IDs need no remote call. Usernames try the exact-username lookup
/// first and fall back to a free-text search; handles always go through search.
#[instrument(skip(api))]
pub async fn resolve_channel_id<A>(api: &A, url: &str) -> Result<String>
where
    A: YouTubeApi + ?Sized,
{
    match classify(url) {
        UrlShape::DirectId(id) => {
            debug!("Channel ID taken directly from URL: {}", id);
            Ok(id)
        }
        UrlShape::LegacyUsername(name) | UrlShape::CustomPath(name) => {
            if let Some(id) = api.channel_id_for_username(&name).await? {
                debug!("Resolved username {} to {}", name, id);
                return Ok(id);
            }

            debug!("Username lookup for {} found nothing, searching", name);
            match api.search_channel(&name).await? {
                Some(id) => {
                    debug!("Resolved {} through search to {}", name, id);
                    Ok(id)
                }
                None => bail!(resolution, "No channel found for username '{}'", name),
            }
        }
        UrlShape::Handle(handle) => match api.search_channel(&handle).await? {
            Some(id) => {
                debug!("Resolved handle {} to {}", handle, id);
                Ok(id)
            }
            None => bail!(resolution, "No channel found for handle '{}'", handle),
        },
        UrlShape::Invalid => Err(YtStatsError::invalid_url(url)),
    }
}

/// Resolve a URL to the channel's ID, uploads playlist and title
#[instrument(skip(api))]
pub async fn resolve<A>(api: &A, url: &str) -> Result<ChannelIdentity>
where
    A: YouTubeApi + ?Sized,
{
    let channel_id = resolve_channel_id(api, url).await?;

    let identity = api
        .channel_details(&channel_id)
        .await?
        .ok_or_else(|| YtStatsError::channel_not_found(&channel_id))?;

    info!(
        channel_id = %identity.channel_id,
        uploads = %identity.uploads_playlist_id,
        "Resolved channel '{}'",
        identity.title
    );
    Ok(identity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::predicate::eq;
    use ytstats_common::{test_utils::fixtures, MockYouTubeApi};

    #[test]
    fn test_classify_direct_id() {
        assert_eq!(
            classify("https://www.youtube.com/channel/UC123"),
            UrlShape::DirectId("UC123".to_string())
        );
        assert_eq!(
            classify("https://youtube.com/channel/UC123/videos?view=0#top"),
            UrlShape::DirectId("UC123".to_string())
        );
        assert_eq!(
            classify("https://www.youtube.com/channel/UC123/"),
            UrlShape::DirectId("UC123".to_string())
        );
    }

    #[test]
    fn test_classify_usernames_and_handles() {
        assert_eq!(
            classify("https://www.youtube.com/user/oldname"),
            UrlShape::LegacyUsername("oldname".to_string())
        );
        assert_eq!(
            classify("https://www.youtube.com/c/CustomName/featured"),
            UrlShape::CustomPath("CustomName".to_string())
        );
        assert_eq!(
            classify("https://www.youtube.com/@SomeHandle?si=abc"),
            UrlShape::Handle("@SomeHandle".to_string())
        );
        assert_eq!(
            classify("https://www.youtube.com/@SomeHandle/videos"),
            UrlShape::Handle("@SomeHandle".to_string())
        );
    }

    #[test]
    fn test_classify_priority() {
        // /channel/ wins over every other marker
        assert_eq!(
            classify("https://www.youtube.com/channel/UC9/user/x"),
            UrlShape::DirectId("UC9".to_string())
        );
        // /user/ wins over /@
        assert_eq!(
            classify("https://www.youtube.com/user/legacy/@handle"),
            UrlShape::LegacyUsername("legacy".to_string())
        );
    }

    #[test]
    fn test_classify_invalid() {
        assert_eq!(classify("https://www.youtube.com/watch?v=abc"), UrlShape::Invalid);
        assert_eq!(classify("https://www.youtube.com/channel/"), UrlShape::Invalid);
        assert_eq!(classify("https://www.youtube.com/@"), UrlShape::Invalid);
        assert_eq!(classify(""), UrlShape::Invalid);
        // Marker hidden in the query string does not count
        assert_eq!(
            classify("https://www.youtube.com/results?q=/channel/UC1"),
            UrlShape::Invalid
        );
    }

    #[tokio::test]
    async fn test_direct_id_makes_no_lookup_calls() {
        // A mock with no expectations panics on any call
        let api = MockYouTubeApi::new();
        let id = resolve_channel_id(&api, "https://www.youtube.com/channel/UCdirect")
            .await
            .unwrap();
        assert_eq!(id, "UCdirect");
    }

    #[tokio::test]
    async fn test_username_found_by_exact_lookup() {
        let mut api = MockYouTubeApi::new();
        api.expect_channel_id_for_username()
            .with(eq("legacy"))
            .times(1)
            .returning(|_| Ok(Some("UClegacy".to_string())));
        api.expect_search_channel().never();

        let id = resolve_channel_id(&api, "https://www.youtube.com/user/legacy")
            .await
            .unwrap();
        assert_eq!(id, "UClegacy");
    }

    #[tokio::test]
    async fn test_custom_path_falls_back_to_search() {
        let mut api = MockYouTubeApi::new();
        api.expect_channel_id_for_username()
            .with(eq("Custom"))
            .times(1)
            .returning(|_| Ok(None));
        api.expect_search_channel()
            .with(eq("Custom"))
            .times(1)
            .returning(|_| Ok(Some("UCcustom".to_string())));

        let id = resolve_channel_id(&api, "https://www.youtube.com/c/Custom")
            .await
            .unwrap();
        assert_eq!(id, "UCcustom");
    }

    #[tokio::test]
    async fn test_username_not_found_anywhere() {
        let mut api = MockYouTubeApi::new();
        api.expect_channel_id_for_username().returning(|_| Ok(None));
        api.expect_search_channel().returning(|_| Ok(None));

        let err = resolve_channel_id(&api, "https://www.youtube.com/user/ghost")
            .await
            .unwrap_err();
        assert!(matches!(err, YtStatsError::Resolution { .. }));
        assert!(err.to_string().contains("ghost"));
    }

    #[tokio::test]
    async fn test_handle_always_searches() {
        let mut api = MockYouTubeApi::new();
        api.expect_channel_id_for_username().never();
        api.expect_search_channel()
            .with(eq("@handle"))
            .times(1)
            .returning(|_| Ok(Some("UChandle".to_string())));

        let id = resolve_channel_id(&api, "https://www.youtube.com/@handle")
            .await
            .unwrap();
        assert_eq!(id, "UChandle");
    }

    #[tokio::test]
    async fn test_invalid_url_makes_no_calls() {
        let api = MockYouTubeApi::new();
        let err = resolve_channel_id(&api, "https://www.youtube.com/playlist?list=PL1")
            .await
            .unwrap_err();
        assert!(matches!(err, YtStatsError::InvalidUrlFormat { .. }));
    }

    #[tokio::test]
    async fn test_lookup_errors_propagate() {
        let mut api = MockYouTubeApi::new();
        api.expect_search_channel()
            .returning(|_| Err(YtStatsError::remote_api_with_status("quotaExceeded", 403)));

        let err = resolve_channel_id(&api, "https://www.youtube.com/@handle")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            YtStatsError::RemoteApi {
                status_code: Some(403),
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_resolve_full_identity() {
        let mut api = MockYouTubeApi::new();
        api.expect_channel_details()
            .with(eq("UC123"))
            .times(1)
            .returning(|_| Ok(Some(fixtures::channel("UC123", "Test Channel"))));

        let identity = resolve(&api, "https://www.youtube.com/channel/UC123")
            .await
            .unwrap();
        assert_eq!(identity.channel_id, "UC123");
        assert_eq!(identity.uploads_playlist_id, "UU123");
        assert_eq!(identity.title, "Test Channel");
    }

    #[tokio::test]
    async fn test_resolve_unknown_channel() {
        let mut api = MockYouTubeApi::new();
        api.expect_channel_details().returning(|_| Ok(None));

        let err = resolve(&api, "https://www.youtube.com/channel/UC404")
            .await
            .unwrap_err();
        match err {
            YtStatsError::ChannelNotFound { channel_id } => assert_eq!(channel_id, "UC404"),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
