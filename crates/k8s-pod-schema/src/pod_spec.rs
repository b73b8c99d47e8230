//! Field declarations for the Kubernetes Pod specification.

use config_schema::{Field, FieldKind, Schema, validation};

use crate::volume::volume_schema;

/// Fields of the pod specification itself.
///
/// This is the schema the workflow tool embeds into its pod resource;
/// per-field semantics (defaults, computed fields, constraints) follow the
/// Kubernetes API.
pub fn pod_spec_fields() -> Schema {
    Schema::new()
        .field(
            "active_deadline_seconds",
            Field::optional(FieldKind::Int)
                .with_validator(validation::positive)
                .with_description(
                    "Duration in seconds the pod may be active on the node relative to start \
                     time before the system will actively try to mark it failed. Must be a \
                     positive integer.",
                ),
        )
        .field(
            "containers",
            Field::optional(FieldKind::Block(container_fields())).with_description(
                "List of containers belonging to the pod. There must be at least one container \
                 in a pod; containers cannot currently be added or removed.",
            ),
        )
        .field(
            "dns_policy",
            Field::optional(FieldKind::String)
                .with_default("ClusterFirst")
                .with_description(
                    "DNS policy for containers within the pod. One of 'ClusterFirst' or \
                     'Default'.",
                ),
        )
        .field(
            "host_ipc",
            Field::optional(FieldKind::Bool)
                .with_default(false)
                .with_description("Use the host's IPC namespace."),
        )
        .field(
            "host_network",
            Field::optional(FieldKind::Bool)
                .with_default(false)
                .with_description(
                    "Host networking requested for this pod. If set, the ports that will be \
                     used must be specified.",
                ),
        )
        .field(
            "host_pid",
            Field::optional(FieldKind::Bool)
                .with_default(false)
                .with_description("Use the host's PID namespace."),
        )
        .field(
            "hostname",
            Field::optional_computed(FieldKind::String).with_description(
                "Hostname of the pod. If not specified, set to a system-defined value.",
            ),
        )
        .field(
            "image_pull_secrets",
            Field::optional(FieldKind::Block(local_object_reference_fields()))
                .with_description(
                    "References to secrets in the same namespace to use for pulling any of the \
                     images used by this pod.",
                ),
        )
        .field(
            "node_name",
            Field::optional_computed(FieldKind::String).with_description(
                "Request to schedule this pod onto a specific node. If non-empty, the \
                 scheduler simply schedules the pod onto that node.",
            ),
        )
        .field(
            "node_selector",
            Field::optional(FieldKind::Map).with_description(
                "Selector which must match a node's labels for the pod to be scheduled on \
                 that node.",
            ),
        )
        .field(
            "restart_policy",
            Field::optional(FieldKind::String)
                .with_default("Always")
                .with_description(
                    "Restart policy for all containers within the pod. One of Always, \
                     OnFailure, Never.",
                ),
        )
        .field(
            "security_context",
            Field::optional(FieldKind::Block(security_context_fields()))
                .with_max_items(1)
                .with_description(
                    "Pod-level security attributes and common container settings.",
                ),
        )
        .field(
            "service_account_name",
            Field::optional_computed(FieldKind::String)
                .with_description("Name of the service account to use to run this pod."),
        )
        .field(
            "subdomain",
            Field::optional(FieldKind::String).with_description(
                "If specified, the fully qualified pod hostname will be \
                 \"<hostname>.<subdomain>.<namespace>.svc.<cluster domain>\". Otherwise the \
                 pod will not have a domain name at all.",
            ),
        )
        .field(
            "termination_grace_period_seconds",
            Field::optional(FieldKind::Int)
                .with_default(30)
                .with_validator(validation::non_negative)
                .with_description(
                    "Duration in seconds the pod needs to terminate gracefully. Must be a \
                     non-negative integer; zero indicates delete immediately.",
                ),
        )
        .field(
            "volumes",
            Field::optional(FieldKind::Block(volume_schema())).with_description(
                "List of volumes that can be mounted by containers belonging to the pod.",
            ),
        )
}

/// Fields of a single container within the pod.
pub fn container_fields() -> Schema {
    Schema::new()
        .field(
            "name",
            Field::required(FieldKind::String).with_description(
                "Name of the container. Must be a DNS_LABEL and unique within the pod.",
            ),
        )
        .field(
            "image",
            Field::optional(FieldKind::String).with_description("Container image name."),
        )
        .field(
            "command",
            Field::optional(FieldKind::List(Box::new(FieldKind::String))).with_description(
                "Entrypoint array. The image's entrypoint is used if this is not provided.",
            ),
        )
        .field(
            "args",
            Field::optional(FieldKind::List(Box::new(FieldKind::String))).with_description(
                "Arguments to the entrypoint. The image's cmd is used if this is not provided.",
            ),
        )
        .field(
            "working_dir",
            Field::optional(FieldKind::String).with_description(
                "Container's working directory. Defaults to the container runtime's default \
                 if unset.",
            ),
        )
        .field(
            "image_pull_policy",
            Field::optional_computed(FieldKind::String).with_description(
                "Image pull policy. One of Always, Never, IfNotPresent. Defaults to Always if \
                 the image tag is :latest, IfNotPresent otherwise.",
            ),
        )
        .field(
            "stdin",
            Field::optional(FieldKind::Bool)
                .with_default(false)
                .with_description(
                    "Whether this container should allocate a buffer for stdin in the \
                     container runtime.",
                ),
        )
        .field(
            "tty",
            Field::optional(FieldKind::Bool)
                .with_default(false)
                .with_description("Whether this container should allocate a TTY for itself."),
        )
}

/// Pod-level security attributes.
pub fn security_context_fields() -> Schema {
    Schema::new()
        .field(
            "fs_group",
            Field::optional(FieldKind::Int).with_description(
                "A special supplemental group that applies to all containers in a pod. Some \
                 volume types allow the kubelet to change the ownership of the volume to be \
                 owned by the pod.",
            ),
        )
        .field(
            "run_as_non_root",
            Field::optional(FieldKind::Bool).with_description(
                "Indicates that the container must run as a non-root user. If true, the \
                 kubelet will validate the image at runtime and refuse to start the container \
                 if it runs as UID 0.",
            ),
        )
        .field(
            "run_as_user",
            Field::optional(FieldKind::Int).with_description(
                "The UID to run the entrypoint of the container process. Defaults to the user \
                 specified in image metadata if unspecified.",
            ),
        )
        .field(
            "supplemental_groups",
            Field::optional(FieldKind::List(Box::new(FieldKind::Int))).with_description(
                "A list of groups applied to the first process run in each container, in \
                 addition to the container's primary GID.",
            ),
        )
        .field(
            "se_linux_options",
            Field::optional(FieldKind::Block(se_linux_options_fields()))
                .with_max_items(1)
                .with_description("The SELinux context to be applied to all containers."),
        )
}

/// The SELinux context applied to a container.
pub fn se_linux_options_fields() -> Schema {
    Schema::new()
        .field(
            "user",
            Field::optional(FieldKind::String)
                .with_description("SELinux user label that applies to the container."),
        )
        .field(
            "role",
            Field::optional(FieldKind::String)
                .with_description("SELinux role label that applies to the container."),
        )
        .field(
            "type",
            Field::optional(FieldKind::String)
                .with_description("SELinux type label that applies to the container."),
        )
        .field(
            "level",
            Field::optional(FieldKind::String)
                .with_description("SELinux level label that applies to the container."),
        )
}

/// A reference to an object in the same namespace, e.g. an image pull
/// secret.
pub fn local_object_reference_fields() -> Schema {
    Schema::new().field(
        "name",
        Field::optional(FieldKind::String).with_description("Name of the referent."),
    )
}
