use bodega_types::api::RemoteProfile;
use bodega_types::models::UserRecord;

/// Merge a freshly resolved remote profile into the locally known record.
///
/// Remote fields win on conflict. The store-owned fields — `local_id`,
/// `active`, `photo_uri` — always survive from the local side, so a login
/// can never mint a new local id or drop a locally chosen photo.
pub fn merge_profiles(local: &UserRecord, remote: Option<&RemoteProfile>) -> UserRecord {
    let mut merged = local.clone();
    if let Some(remote) = remote {
        merged.remote_id = Some(remote.id);
        merged.name = remote.name.clone();
        merged.last_name = remote.last_name.clone();
        merged.email = remote.email.clone();
        merged.region = remote.region.clone();
        merged.registered_at = remote.registered_at.clone();
    }
    merged
}
