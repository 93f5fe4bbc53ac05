//! Karmada policy kinds (`policy.karmada.io` and `config.karmada.io`).

use crate::kind::ResourceKind;
use crate::kind::Scope;
use crate::schema::Attribute;
use crate::schema::Validator;

const POLICY_GROUP: &str = "policy.karmada.io";
const CONFIG_GROUP: &str = "config.karmada.io";
const VERSION: &str = "v1alpha1";

const SELECTOR_OPERATORS: &[&str] = &["In", "NotIn", "Exists", "DoesNotExist"];
const PLAINTEXT_OPERATORS: &[&str] = &["add", "remove", "replace"];
const LIST_OPERATORS: &[&str] = &["add", "remove"];
const METADATA_OPERATORS: &[&str] = &["addIfAbsent", "overwrite", "delete"];

pub fn kinds() -> Vec<ResourceKind> {
    vec![
        ResourceKind {
            group: POLICY_GROUP,
            version: VERSION,
            kind: "PropagationPolicy",
            plural: "propagationpolicies",
            scope: Scope::Namespaced,
            description: "Selects resources in its namespace and propagates them to member clusters.",
            body: vec![propagation_spec()],
        },
        ResourceKind {
            group: POLICY_GROUP,
            version: VERSION,
            kind: "ClusterPropagationPolicy",
            plural: "clusterpropagationpolicies",
            scope: Scope::Cluster,
            description: "Selects resources cluster-wide and propagates them to member clusters.",
            body: vec![propagation_spec()],
        },
        ResourceKind {
            group: POLICY_GROUP,
            version: VERSION,
            kind: "OverridePolicy",
            plural: "overridepolicies",
            scope: Scope::Namespaced,
            description: "Rewrites resources in its namespace before they reach member clusters.",
            body: vec![override_spec()],
        },
        ResourceKind {
            group: POLICY_GROUP,
            version: VERSION,
            kind: "ClusterOverridePolicy",
            plural: "clusteroverridepolicies",
            scope: Scope::Cluster,
            description: "Rewrites resources cluster-wide before they reach member clusters.",
            body: vec![override_spec()],
        },
        ResourceKind {
            group: CONFIG_GROUP,
            version: VERSION,
            kind: "ResourceInterpreterWebhookConfiguration",
            plural: "resourceinterpreterwebhookconfigurations",
            scope: Scope::Cluster,
            description: "Registers webhooks that interpret custom resources for Karmada.",
            body: vec![interpreter_webhooks()],
        },
    ]
}

fn propagation_spec() -> Attribute {
    Attribute::object(
        "spec",
        "spec",
        vec![
            resource_selectors(),
            Attribute::bool("propagate_deps", "propagateDeps")
                .describe("Propagate the resources the selected ones depend on, such as ConfigMaps and Secrets."),
            placement(),
            Attribute::int64("priority", "priority")
                .describe("Higher values win when several policies match the same resource."),
            Attribute::string("preemption", "preemption")
                .validate(Validator::OneOf { values: &["Always", "Never"] }),
            Attribute::string_list("dependent_overrides", "dependentOverrides"),
            Attribute::string("scheduler_name", "schedulerName"),
            failover(),
            Attribute::string("conflict_resolution", "conflictResolution")
                .validate(Validator::OneOf { values: &["Abort", "Overwrite"] }),
            Attribute::string("activation_preference", "activationPreference")
                .validate(Validator::OneOf { values: &["Lazy"] }),
            Attribute::object(
                "suspension",
                "suspension",
                vec![Attribute::bool("dispatching", "dispatching")],
            ),
            Attribute::bool("preserve_resources_on_deletion", "preserveResourcesOnDeletion"),
            Attribute::int64("max_clusters", "maxClusters")
                .describe("Upper bound on the number of clusters the resources are scheduled to.")
                .validate(Validator::Int64AtLeast { min: 1 }),
            Attribute::string("scheduling_mode", "schedulingMode")
                .describe("Duplicate replicas to every cluster, or divide them across clusters.")
                .validate(Validator::OneOf { values: &["Duplicate", "Divide"] }),
        ],
    )
    .required()
    .describe("Desired propagation behavior.")
}

fn override_spec() -> Attribute {
    Attribute::object(
        "spec",
        "spec",
        vec![
            resource_selectors(),
            Attribute::object_list(
                "override_rules",
                "overrideRules",
                vec![
                    cluster_affinity("target_cluster", "targetCluster")
                        .describe("Clusters the rule applies to; all clusters when unset."),
                    overriders().required(),
                ],
            )
            .describe("Rules applied in order to every selected resource."),
        ],
    )
    .required()
    .describe("Desired override behavior.")
}

fn resource_selectors() -> Attribute {
    Attribute::object_list(
        "resource_selectors",
        "resourceSelectors",
        vec![
            Attribute::string("api_version", "apiVersion").required(),
            Attribute::string("kind", "kind").required(),
            Attribute::string("namespace", "namespace"),
            Attribute::string("name", "name"),
            label_selector("label_selector", "labelSelector"),
        ],
    )
    .required()
    .describe("Resources the policy applies to.")
}

fn label_selector(name: &'static str, wire_name: &'static str) -> Attribute {
    Attribute::object(
        name,
        wire_name,
        vec![
            Attribute::string_map("match_labels", "matchLabels"),
            match_expressions(),
        ],
    )
}

fn match_expressions() -> Attribute {
    Attribute::object_list(
        "match_expressions",
        "matchExpressions",
        vec![
            Attribute::string("key", "key").required(),
            Attribute::string("operator", "operator")
                .required()
                .validate(Validator::OneOf { values: SELECTOR_OPERATORS }),
            Attribute::string_list("values", "values"),
        ],
    )
}

fn cluster_affinity(name: &'static str, wire_name: &'static str) -> Attribute {
    Attribute::object(
        name,
        wire_name,
        vec![
            label_selector("label_selector", "labelSelector"),
            Attribute::object("field_selector", "fieldSelector", vec![match_expressions()]),
            Attribute::string_list("cluster_names", "clusterNames"),
            Attribute::string_list("exclude", "exclude"),
        ],
    )
}

fn placement() -> Attribute {
    Attribute::object(
        "placement",
        "placement",
        vec![
            cluster_affinity("cluster_affinity", "clusterAffinity"),
            Attribute::object_list(
                "cluster_tolerations",
                "clusterTolerations",
                vec![
                    Attribute::string("key", "key"),
                    Attribute::string("operator", "operator")
                        .validate(Validator::OneOf { values: &["Equal", "Exists"] }),
                    Attribute::string("value", "value"),
                    Attribute::string("effect", "effect").validate(Validator::OneOf {
                        values: &["NoSchedule", "PreferNoSchedule", "NoExecute"],
                    }),
                    Attribute::int64("toleration_seconds", "tolerationSeconds"),
                ],
            ),
            Attribute::object_list(
                "spread_constraints",
                "spreadConstraints",
                vec![
                    Attribute::string("spread_by_field", "spreadByField")
                        .validate(Validator::OneOf {
                            values: &["cluster", "region", "zone", "provider"],
                        })
                        .validate(Validator::ConflictsWith { siblings: &["spread_by_label"] }),
                    Attribute::string("spread_by_label", "spreadByLabel"),
                    Attribute::int64("max_groups", "maxGroups")
                        .validate(Validator::Int64AtLeast { min: 0 }),
                    Attribute::int64("min_groups", "minGroups")
                        .validate(Validator::Int64AtLeast { min: 0 }),
                ],
            ),
            replica_scheduling(),
        ],
    )
    .describe("Rules for selecting member clusters.")
}

fn replica_scheduling() -> Attribute {
    Attribute::object(
        "replica_scheduling",
        "replicaScheduling",
        vec![
            Attribute::string("replica_scheduling_type", "replicaSchedulingType")
                .validate(Validator::OneOf { values: &["Duplicated", "Divided"] }),
            Attribute::string("replica_division_preference", "replicaDivisionPreference")
                .validate(Validator::OneOf { values: &["Aggregated", "Weighted"] }),
            Attribute::object(
                "weight_preference",
                "weightPreference",
                vec![
                    Attribute::object_list(
                        "static_weight_list",
                        "staticWeightList",
                        vec![
                            cluster_affinity("target_cluster", "targetCluster").required(),
                            Attribute::int64("weight", "weight")
                                .required()
                                .validate(Validator::Int64AtLeast { min: 1 }),
                        ],
                    )
                    .validate(Validator::ConflictsWith { siblings: &["dynamic_weight"] }),
                    Attribute::string("dynamic_weight", "dynamicWeight")
                        .validate(Validator::OneOf { values: &["AvailableReplicas"] }),
                ],
            ),
        ],
    )
}

fn failover() -> Attribute {
    Attribute::object(
        "failover",
        "failover",
        vec![Attribute::object(
            "application",
            "application",
            vec![
                Attribute::object(
                    "decision_conditions",
                    "decisionConditions",
                    vec![Attribute::int64("toleration_seconds", "tolerationSeconds")
                        .validate(Validator::Int64AtLeast { min: 0 })],
                ),
                Attribute::string("purge_mode", "purgeMode").validate(Validator::OneOf {
                    values: &["Immediately", "Graciously", "Never"],
                }),
                Attribute::int64("grace_period_seconds", "gracePeriodSeconds")
                    .validate(Validator::Int64AtLeast { min: 1 }),
            ],
        )],
    )
}

fn overriders() -> Attribute {
    let list_overrider = |name, wire_name| {
        Attribute::object_list(
            name,
            wire_name,
            vec![
                Attribute::string("container_name", "containerName").required(),
                Attribute::string("operator", "operator")
                    .required()
                    .validate(Validator::OneOf { values: LIST_OPERATORS }),
                Attribute::string_list("value", "value"),
            ],
        )
    };
    let metadata_overrider = |name, wire_name| {
        Attribute::object_list(
            name,
            wire_name,
            vec![
                Attribute::string("operator", "operator")
                    .required()
                    .validate(Validator::OneOf { values: METADATA_OPERATORS }),
                Attribute::string_map("value", "value"),
            ],
        )
    };

    Attribute::object(
        "overriders",
        "overriders",
        vec![
            Attribute::object_list(
                "plaintext",
                "plaintext",
                vec![
                    Attribute::string("path", "path").required(),
                    Attribute::string("operator", "operator")
                        .required()
                        .validate(Validator::OneOf { values: PLAINTEXT_OPERATORS }),
                    Attribute::dynamic("value", "value"),
                ],
            )
            .describe("JSON patch style overrides addressed by path."),
            Attribute::object_list(
                "image_overrider",
                "imageOverrider",
                vec![
                    Attribute::object(
                        "predicate",
                        "predicate",
                        vec![Attribute::string("path", "path").required()],
                    ),
                    Attribute::string("component", "component")
                        .required()
                        .validate(Validator::OneOf {
                            values: &["Registry", "Repository", "Tag"],
                        }),
                    Attribute::string("operator", "operator")
                        .required()
                        .validate(Validator::OneOf { values: PLAINTEXT_OPERATORS }),
                    Attribute::string("value", "value"),
                ],
            ),
            list_overrider("command_overrider", "commandOverrider"),
            list_overrider("args_overrider", "argsOverrider"),
            metadata_overrider("labels_overrider", "labelsOverrider"),
            metadata_overrider("annotations_overrider", "annotationsOverrider"),
        ],
    )
}

fn interpreter_webhooks() -> Attribute {
    Attribute::object_list(
        "webhooks",
        "webhooks",
        vec![
            Attribute::string("name", "name")
                .required()
                .validate(Validator::LengthBetween { min: 1, max: 253 }),
            Attribute::object(
                "client_config",
                "clientConfig",
                vec![
                    Attribute::string("url", "url")
                        .validate(Validator::ExactlyOneOf { siblings: &["service"] }),
                    Attribute::object(
                        "service",
                        "service",
                        vec![
                            Attribute::string("namespace", "namespace").required(),
                            Attribute::string("name", "name").required(),
                            Attribute::string("path", "path"),
                            Attribute::int64("port", "port")
                                .validate(Validator::Int64Between { min: 1, max: 65535 }),
                        ],
                    ),
                    Attribute::string("ca_bundle", "caBundle")
                        .describe("PEM encoded CA bundle, base64 encoded.")
                        .validate(Validator::Base64),
                ],
            )
            .required(),
            Attribute::object_list(
                "rules",
                "rules",
                vec![
                    Attribute::string_list("operations", "operations").required(),
                    Attribute::string_list("api_groups", "apiGroups").required(),
                    Attribute::string_list("api_versions", "apiVersions").required(),
                    Attribute::string_list("kinds", "kinds").required(),
                ],
            ),
            Attribute::int64("timeout_seconds", "timeoutSeconds")
                .validate(Validator::Int64Between { min: 1, max: 30 }),
            Attribute::string_list("interpreter_context_versions", "interpreterContextVersions")
                .required(),
        ],
    )
    .required()
    .describe("Webhooks to call, in order.")
}
