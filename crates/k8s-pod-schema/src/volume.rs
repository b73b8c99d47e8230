//! The pod-level volume schema and the shared volume-source fragment.

use config_schema::{Field, FieldKind, Schema};

/// The volume sources shared by every place a volume can be declared.
///
/// Each call returns a fresh allocation, so a call site may add fields to
/// what it receives (as [`volume_schema`] does with
/// `persistent_volume_claim` and `secret`) without those additions showing
/// up at other composition sites. At most one source may be set per volume
/// element; consumers declare the exclusive group over their full member
/// set themselves, since that set differs per site.
pub fn common_volume_sources() -> Schema {
    Schema::new()
        .field(
            "empty_dir",
            Field::optional(FieldKind::Block(Schema::new().field(
                "medium",
                Field::optional(FieldKind::String)
                    .with_default("")
                    .with_description(
                        "What type of storage medium should back this directory. The default is \
                         \"\", which means to use the node's default medium.",
                    ),
            )))
            .with_max_items(1)
            .with_description(
                "EmptyDir represents a temporary directory that shares a pod's lifetime.",
            ),
        )
        .field(
            "host_path",
            Field::optional(FieldKind::Block(Schema::new().field(
                "path",
                Field::optional(FieldKind::String)
                    .with_description("Path of the directory on the host."),
            )))
            .with_max_items(1)
            .with_description(
                "HostPath represents a pre-existing file or directory on the host machine that \
                 is directly exposed to the container.",
            ),
        )
        .field(
            "nfs",
            Field::optional(FieldKind::Block(
                Schema::new()
                    .field(
                        "server",
                        Field::optional(FieldKind::String)
                            .with_description("Hostname or IP address of the NFS server."),
                    )
                    .field(
                        "path",
                        Field::optional(FieldKind::String)
                            .with_description("Path that is exported by the NFS server."),
                    )
                    .field(
                        "read_only",
                        Field::optional(FieldKind::Bool)
                            .with_default(false)
                            .with_description(
                                "Force the NFS export to be mounted with read-only permissions.",
                            ),
                    ),
            ))
            .with_max_items(1)
            .with_description(
                "NFS represents an NFS mount on the host that shares a pod's lifetime.",
            ),
        )
        .field(
            "git_repo",
            Field::optional(FieldKind::Block(
                Schema::new()
                    .field(
                        "repository",
                        Field::optional(FieldKind::String).with_description("Repository URL."),
                    )
                    .field(
                        "revision",
                        Field::optional(FieldKind::String)
                            .with_description("Commit hash for the specified revision."),
                    )
                    .field(
                        "directory",
                        Field::optional(FieldKind::String).with_description(
                            "Target directory name. Must not contain or start with '..'. If '.' \
                             is supplied, the volume directory will be the git repository.",
                        ),
                    ),
            ))
            .with_max_items(1)
            .with_description("GitRepo represents a git repository at a particular revision."),
        )
}

/// A single element of the pod's `volumes` list.
///
/// Builds on [`common_volume_sources`] and adds the pod-only sources plus
/// the volume name. Exactly one source kind may be set per volume; the
/// schema declares this as an explicit exclusive group so the resolver
/// enforces it mechanically.
pub fn volume_schema() -> Schema {
    common_volume_sources()
        .field(
            "persistent_volume_claim",
            Field::optional(FieldKind::Block(
                Schema::new()
                    .field(
                        "claim_name",
                        Field::optional(FieldKind::String).with_description(
                            "Name of a persistent volume claim in the same namespace as the pod.",
                        ),
                    )
                    .field(
                        "read_only",
                        Field::optional(FieldKind::Bool)
                            .with_default(false)
                            .with_description(
                                "Will force the read-only setting in volume mounts.",
                            ),
                    ),
            ))
            .with_max_items(1)
            .with_description("The specification of a persistent volume claim."),
        )
        .field(
            "secret",
            Field::optional(FieldKind::Block(Schema::new().field(
                "secret_name",
                Field::optional(FieldKind::String)
                    .with_description("Name of the secret in the pod's namespace to use."),
            )))
            .with_max_items(1)
            .with_description("Secret represents a secret that should populate this volume."),
        )
        .field(
            "name",
            Field::optional(FieldKind::String).with_description(
                "Volume's name. Must be a DNS_LABEL and unique within the pod.",
            ),
        )
        .exclusive_group(
            "volume source",
            [
                "empty_dir",
                "host_path",
                "nfs",
                "git_repo",
                "persistent_volume_claim",
                "secret",
            ],
        )
}

#[cfg(test)]
mod tests {
    use config_schema::{Error, FieldPath, resolve};
    use serde_json::json;

    use super::*;

    #[test]
    fn a_single_volume_source_resolves_cleanly() {
        let resolved = resolve(
            &volume_schema(),
            &json!({
                "name": "data",
                "secret": [{ "secret_name": "db-credentials" }],
            }),
        );

        assert!(resolved.is_ok(), "unexpected errors: {:?}", resolved.errors);
        assert_eq!(
            resolved.value,
            json!({
                "secret": [{ "secret_name": "db-credentials" }],
                "name": "data",
            })
        );
    }

    #[test]
    fn two_volume_sources_conflict() {
        let resolved = resolve(
            &volume_schema(),
            &json!({
                "name": "data",
                "secret": [{ "secret_name": "db-credentials" }],
                "persistent_volume_claim": [{ "claim_name": "db-data" }],
            }),
        );

        assert_eq!(
            resolved.errors,
            vec![Error::MutuallyExclusive {
                path: FieldPath::root(),
                group: "volume source".to_string(),
                fields: vec![
                    "persistent_volume_claim".to_string(),
                    "secret".to_string(),
                ],
            }]
        );
    }

    #[test]
    fn source_blocks_are_limited_to_one_element() {
        let resolved = resolve(
            &volume_schema(),
            &json!({
                "name": "data",
                "empty_dir": [{}, {}],
            }),
        );

        assert_eq!(
            resolved.errors,
            vec![Error::TooManyItems {
                path: FieldPath::root().join("empty_dir"),
                count: 2,
                max_items: 1,
            }]
        );
    }

    #[test]
    fn empty_dir_medium_defaults_to_node_default() {
        let resolved = resolve(&volume_schema(), &json!({ "empty_dir": [{}] }));

        assert!(resolved.is_ok());
        assert_eq!(resolved.value, json!({ "empty_dir": [{ "medium": "" }] }));
    }

    #[test]
    fn pod_only_sources_do_not_leak_into_other_fragment_consumers() {
        // A second consumer of the shared fragment, e.g. a projected volume
        // of another resource, that never declared the pod-only sources.
        let other_consumer = Schema::new()
            .field("mount_path", Field::required(FieldKind::String))
            .compose(common_volume_sources());

        let resolved = resolve(
            &other_consumer,
            &json!({
                "mount_path": "/var/lib/data",
                "persistent_volume_claim": [{ "claim_name": "db-data" }],
            }),
        );

        assert!(resolved.is_ok());
        assert_eq!(resolved.value.get("persistent_volume_claim"), None);

        // The pod-level schema still resolves it.
        let resolved = resolve(
            &volume_schema(),
            &json!({ "persistent_volume_claim": [{ "claim_name": "db-data" }] }),
        );
        assert!(resolved.is_ok());
        assert_eq!(
            resolved.value,
            json!({
                "persistent_volume_claim": [{ "claim_name": "db-data", "read_only": false }],
            })
        );
    }
}
