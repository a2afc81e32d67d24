//! Destination resolution.
//!
//! Turns the active destination (and, for the managed platform, the active
//! broadcast's ingestion info) into the URL and key handed to the encoder.

use thiserror::Error;

use scorecast_ipc::{Destination, RemoteBroadcast, ResolvedTarget, MANAGED_PLATFORM_NAME};

/// Why a destination could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionError {
    /// No destination matches the active id.
    #[error("No stream destination selected.")]
    NoDestination,

    /// The managed platform is active but no broadcast is selected.
    #[error("No {platform} broadcast selected.")]
    NoBroadcastSelected { platform: String },

    /// The effective stream key is empty.
    #[error("{}", missing_key_message(.destination, .managed))]
    MissingStreamKey { destination: String, managed: bool },

    /// The destination has no URL.
    #[error("Cannot start live stream without a valid URL and key.")]
    MissingStreamUrl,
}

fn missing_key_message(destination: &str, managed: &bool) -> String {
    if *managed {
        format!("Selected {} broadcast has no stream key.", destination)
    } else {
        format!("Stream key for {} is missing.", destination)
    }
}

/// Compute the target for a transmission attempt.
///
/// `Ok(None)` means local capture only and is only ever returned when
/// `record_locally` is set. A returned target always has a non-empty URL and
/// key.
pub fn resolve(
    destinations: &[Destination],
    active_id: Option<u32>,
    active_broadcast: Option<&RemoteBroadcast>,
    record_locally: bool,
) -> Result<Option<ResolvedTarget>, ResolutionError> {
    let Some(destination) = active_id.and_then(|id| destinations.iter().find(|d| d.id == id))
    else {
        return if record_locally {
            Ok(None)
        } else {
            Err(ResolutionError::NoDestination)
        };
    };

    let key = if destination.is_managed_platform() {
        managed_key(destination, active_broadcast)?
    } else if destination.key.is_empty() {
        return local_or(
            record_locally,
            ResolutionError::MissingStreamKey {
                destination: destination.name.clone(),
                managed: false,
            },
        );
    } else {
        destination.key.as_str()
    };

    if destination.url.is_empty() {
        return local_or(record_locally, ResolutionError::MissingStreamUrl);
    }

    Ok(Some(ResolvedTarget {
        url: format!("{}{}", destination.url, key),
        key: key.to_string(),
    }))
}

/// The managed platform takes its key from the broadcast's ingestion info.
/// A missing broadcast or key is an error even when recording locally.
fn managed_key<'a>(
    destination: &Destination,
    broadcast: Option<&'a RemoteBroadcast>,
) -> Result<&'a str, ResolutionError> {
    let broadcast = broadcast.ok_or_else(|| ResolutionError::NoBroadcastSelected {
        platform: MANAGED_PLATFORM_NAME.to_string(),
    })?;

    broadcast
        .ingestion_stream_name
        .as_deref()
        .filter(|name| !name.is_empty())
        .ok_or_else(|| ResolutionError::MissingStreamKey {
            destination: destination.name.clone(),
            managed: true,
        })
}

fn local_or(
    record_locally: bool,
    error: ResolutionError,
) -> Result<Option<ResolvedTarget>, ResolutionError> {
    if record_locally {
        Ok(None)
    } else {
        Err(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scorecast_ipc::LifecycleStatus;

    fn twitch(key: &str) -> Destination {
        Destination {
            id: 1,
            name: "Twitch".to_string(),
            url: "rtmps://ingest.twitch.tv/app/".to_string(),
            key: key.to_string(),
        }
    }

    fn youtube(key: &str) -> Destination {
        Destination {
            id: 2,
            name: "YouTube".to_string(),
            url: "rtmp://a.rtmp.youtube.com/live2/".to_string(),
            key: key.to_string(),
        }
    }

    fn broadcast(stream_name: Option<&str>) -> RemoteBroadcast {
        RemoteBroadcast {
            id: "b1".to_string(),
            title: "Game night".to_string(),
            lifecycle_status: LifecycleStatus::Ready,
            ingestion_stream_name: stream_name.map(str::to_string),
        }
    }

    #[test]
    fn test_custom_destination_concatenates() {
        let target = resolve(&[twitch("abc")], Some(1), None, false).unwrap();
        assert_eq!(
            target,
            Some(ResolvedTarget {
                url: "rtmps://ingest.twitch.tv/app/abc".to_string(),
                key: "abc".to_string(),
            })
        );
    }

    #[test]
    fn test_custom_destination_missing_key() {
        let err = resolve(&[twitch("")], Some(1), None, false).unwrap_err();
        assert!(matches!(err, ResolutionError::MissingStreamKey { managed: false, .. }));
        assert_eq!(err.to_string(), "Stream key for Twitch is missing.");
    }

    #[test]
    fn test_custom_destination_missing_key_records_locally() {
        assert_eq!(resolve(&[twitch("")], Some(1), None, true), Ok(None));
    }

    #[test]
    fn test_no_destination() {
        assert_eq!(
            resolve(&[twitch("abc")], Some(9), None, false),
            Err(ResolutionError::NoDestination)
        );
        assert_eq!(
            resolve(&[twitch("abc")], None, None, false),
            Err(ResolutionError::NoDestination)
        );
        assert_eq!(resolve(&[], None, None, true), Ok(None));
    }

    #[test]
    fn test_managed_platform_uses_ingestion_name() {
        let b = broadcast(Some("yt-stream-key"));
        let target = resolve(&[youtube("ignored")], Some(2), Some(&b), false)
            .unwrap()
            .unwrap();
        assert_eq!(target.key, "yt-stream-key");
        assert_eq!(target.url, "rtmp://a.rtmp.youtube.com/live2/yt-stream-key");
    }

    #[test]
    fn test_managed_platform_requires_broadcast() {
        let err = resolve(&[youtube("")], Some(2), None, true).unwrap_err();
        assert_eq!(
            err,
            ResolutionError::NoBroadcastSelected {
                platform: "YouTube".to_string()
            }
        );
        assert_eq!(err.to_string(), "No YouTube broadcast selected.");
    }

    #[test]
    fn test_managed_platform_empty_ingestion_ignores_own_key() {
        for name in [None, Some("")] {
            let b = broadcast(name);
            let err = resolve(&[youtube("own-key")], Some(2), Some(&b), false).unwrap_err();
            assert!(matches!(err, ResolutionError::MissingStreamKey { managed: true, .. }));
            assert_eq!(err.to_string(), "Selected YouTube broadcast has no stream key.");
        }
    }

    #[test]
    fn test_missing_url() {
        let mut destination = twitch("abc");
        destination.url.clear();
        assert_eq!(
            resolve(&[destination.clone()], Some(1), None, false),
            Err(ResolutionError::MissingStreamUrl)
        );
        assert_eq!(resolve(&[destination], Some(1), None, true), Ok(None));
    }
}
