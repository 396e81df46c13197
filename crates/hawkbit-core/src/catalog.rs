//! Query field catalog.
//!
//! Static description of the RSQL/FIQL fields each resource family accepts in
//! `q=` filters and `sort=` parameters, including fields reachable through
//! joined entities (a target's tags, metadata, type, assigned and installed
//! distribution sets; an action's target, rollout and rollout group).
//!
//! The catalog is the single source for:
//! - the `get<Resource>SearchFields` discovery tools
//! - the `rsqlParam` / `sortParam` descriptions of every list tool
//! - the default sort applied when a list call omits one
//!
//! It is descriptive only. Filter expressions are validated by the
//! management server.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Resource families exposed as tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResourceFamily {
    Target,
    Action,
    Rollout,
    RolloutGroup,
    TargetFilterQuery,
    TargetTag,
    TargetType,
}

impl ResourceFamily {
    /// Every family, in tool listing order.
    pub const ALL: [ResourceFamily; 7] = [
        ResourceFamily::Target,
        ResourceFamily::Action,
        ResourceFamily::Rollout,
        ResourceFamily::RolloutGroup,
        ResourceFamily::TargetFilterQuery,
        ResourceFamily::TargetTag,
        ResourceFamily::TargetType,
    ];

    /// Human-readable name.
    pub fn label(self) -> &'static str {
        SearchCatalog::for_family(self).label
    }

    /// Catalog of this family.
    pub fn catalog(self) -> &'static SearchCatalog {
        SearchCatalog::for_family(self)
    }
}

impl fmt::Display for ResourceFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for ResourceFamily {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "target" | "targets" => Ok(ResourceFamily::Target),
            "action" | "actions" => Ok(ResourceFamily::Action),
            "rollout" | "rollouts" => Ok(ResourceFamily::Rollout),
            "rolloutgroup" | "rolloutgroups" | "deploygroup" => Ok(ResourceFamily::RolloutGroup),
            "targetfilterquery" | "targetfilter" | "targetfilters" => {
                Ok(ResourceFamily::TargetFilterQuery)
            }
            "targettag" | "targettags" | "tag" => Ok(ResourceFamily::TargetTag),
            "targettype" | "targettypes" => Ok(ResourceFamily::TargetType),
            _ => Err(format!("unknown resource family '{s}'")),
        }
    }
}

/// Fields reachable through one joined entity.
#[derive(Debug, Clone, Copy)]
pub struct JoinGroup {
    /// Heading used in the discovery text.
    pub label: &'static str,
    /// Entity owning the fields.
    pub entity: &'static str,
    /// One-line description of the join.
    pub description: &'static str,
    /// Dotted field paths.
    pub fields: &'static [&'static str],
}

/// One filterable field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QueryField {
    pub field_path: &'static str,
    pub owning_entity: &'static str,
    pub description: &'static str,
}

/// Searchable fields of a resource family.
#[derive(Debug, Clone, Copy)]
pub struct SearchCatalog {
    pub family: ResourceFamily,
    pub label: &'static str,
    /// Fields of the resource itself; all of them are sortable.
    pub fields: &'static [&'static str],
    pub joins: &'static [JoinGroup],
    /// Worked example filter expression.
    pub example: &'static str,
    /// Sort applied when a list call does not pass one.
    pub default_sort: &'static str,
}

static TARGET: SearchCatalog = SearchCatalog {
    family: ResourceFamily::Target,
    label: "Target",
    fields: &[
        "id",
        "name",
        "description",
        "createdat",
        "lastmodifiedat",
        "controllerid",
        "updatestatus",
        "ipaddress",
        "lastcontrollerrequestat",
    ],
    joins: &[
        JoinGroup {
            label: "Attributes",
            entity: "TargetAttribute",
            description: "Attributes are data about the target provided exclusively by the target.",
            fields: &["attribute.<key>"],
        },
        JoinGroup {
            label: "Metadata",
            entity: "TargetMetadata",
            description: "Metadata are data about the target provided exclusively by management.",
            fields: &["metadata.<key>"],
        },
        JoinGroup {
            label: "Target Tag",
            entity: "TargetTag",
            description: "Tags are used to group targets (devices).",
            fields: &["tag.name"],
        },
        JoinGroup {
            label: "Target Type",
            entity: "TargetType",
            description: "Target Type classifies targets into types.",
            fields: &["targettype.key", "targettype.name"],
        },
        JoinGroup {
            label: "Distribution Set",
            entity: "DistributionSet",
            description: "Distribution set installed on or assigned to the target.",
            fields: &[
                "assignedds.name",
                "assignedds.version",
                "installedds.name",
                "installedds.version",
            ],
        },
    ],
    example: "controllerid==target-0001;assignedds.version==1.0.0",
    default_sort: "id:asc",
};

static ACTION: SearchCatalog = SearchCatalog {
    family: ResourceFamily::Action,
    label: "Action",
    fields: &[
        "id",
        "active",
        "status",
        "lastActionStatusCode",
        "createdAt",
        "createdBy",
        "lastModifiedAt",
        "lastModifiedBy",
        "weight",
        "externalRef",
    ],
    joins: &[
        JoinGroup {
            label: "Target",
            entity: "Target",
            description: "Target the action runs on.",
            fields: &[
                "target.controllerId",
                "target.name",
                "target.updateStatus",
                "target.address",
            ],
        },
        JoinGroup {
            label: "Distribution Set",
            entity: "DistributionSet",
            description: "Distribution set deployed by the action.",
            fields: &[
                "distributionSet.id",
                "distributionSet.name",
                "distributionSet.version",
                "distributionSet.type",
            ],
        },
        JoinGroup {
            label: "Rollout",
            entity: "Rollout",
            description: "Rollout that created the action.",
            fields: &["rollout.id", "rollout.name"],
        },
        JoinGroup {
            label: "Rollout Group",
            entity: "RolloutGroup",
            description: "Rollout group the action belongs to.",
            fields: &["rolloutGroup.id", "rolloutGroup.name"],
        },
    ],
    example: "status==ACTIVE;target.controllerId==0001",
    default_sort: "id:desc",
};

static ROLLOUT: SearchCatalog = SearchCatalog {
    family: ResourceFamily::Rollout,
    label: "Rollout",
    fields: &[
        "id",
        "name",
        "description",
        "status",
        "createdat",
        "createdby",
        "lastmodifiedat",
        "lastmodifiedby",
    ],
    joins: &[JoinGroup {
        label: "Distribution Set",
        entity: "DistributionSet",
        description: "Distribution set the rollout deploys.",
        fields: &[
            "distributionset.id",
            "distributionset.name",
            "distributionset.version",
            "distributionset.type",
        ],
    }],
    example: "status==running;distributionset.name==firmware*",
    default_sort: "id:asc",
};

static ROLLOUT_GROUP: SearchCatalog = SearchCatalog {
    family: ResourceFamily::RolloutGroup,
    label: "Rollout Group",
    fields: &["id", "name", "description"],
    joins: &[],
    example: "name==group-1*",
    default_sort: "id:asc",
};

static TARGET_FILTER_QUERY: SearchCatalog = SearchCatalog {
    family: ResourceFamily::TargetFilterQuery,
    label: "Target Filter Query",
    fields: &[
        "id",
        "name",
        "createdat",
        "createdby",
        "lastmodifiedat",
        "lastmodifiedby",
    ],
    joins: &[JoinGroup {
        label: "Auto-Assign Distribution Set",
        entity: "DistributionSet",
        description: "Distribution set automatically assigned to targets matching the filter.",
        fields: &[
            "autoassigndistributionset.name",
            "autoassigndistributionset.version",
        ],
    }],
    example: "name==production*",
    default_sort: "id:asc",
};

static TARGET_TAG: SearchCatalog = SearchCatalog {
    family: ResourceFamily::TargetTag,
    label: "Target Tag",
    fields: &["id", "name", "description", "colour"],
    joins: &[],
    example: "name==production",
    default_sort: "id:asc",
};

static TARGET_TYPE: SearchCatalog = SearchCatalog {
    family: ResourceFamily::TargetType,
    label: "Target Type",
    fields: &["id", "key", "name", "description"],
    joins: &[],
    example: "key==gateway*",
    default_sort: "id:asc",
};

impl SearchCatalog {
    /// Catalog of a family.
    pub fn for_family(family: ResourceFamily) -> &'static SearchCatalog {
        match family {
            ResourceFamily::Target => &TARGET,
            ResourceFamily::Action => &ACTION,
            ResourceFamily::Rollout => &ROLLOUT,
            ResourceFamily::RolloutGroup => &ROLLOUT_GROUP,
            ResourceFamily::TargetFilterQuery => &TARGET_FILTER_QUERY,
            ResourceFamily::TargetTag => &TARGET_TAG,
            ResourceFamily::TargetType => &TARGET_TYPE,
        }
    }

    /// All fields with their owning entity, own fields first.
    pub fn entries(&self) -> impl Iterator<Item = QueryField> + '_ {
        let own = self.fields.iter().map(move |path| QueryField {
            field_path: *path,
            owning_entity: self.label,
            description: "Field of the resource itself (filterable and sortable).",
        });
        let joined = self.joins.iter().flat_map(|join| {
            join.fields.iter().map(move |path| QueryField {
                field_path: *path,
                owning_entity: join.entity,
                description: join.description,
            })
        });
        own.chain(joined)
    }

    /// Discovery text returned by the `get<Resource>SearchFields` tools.
    pub fn describe(&self) -> String {
        let mut out = format!("{} fields: {}\n", self.label, self.fields.join(", "));
        for join in self.joins {
            out.push_str(&format!(
                "{} fields ({}): {}\n",
                join.label,
                join.description,
                join.fields.join(", ")
            ));
        }
        out.push_str(&format!(
            "Sortable fields: {} (format field:asc|desc, default {})\n",
            self.fields.join(", "),
            self.default_sort
        ));
        out.push_str(&format!("example: {}", self.example));
        out
    }

    /// Description of the `rsqlParam` argument of list tools.
    pub fn filter_hint(&self, discovery_tool: &str) -> String {
        format!(
            "Feed Item Query Language (FIQL/RSQL) search filter. Only if necessary, consult {} for the available fields. Example: {}",
            discovery_tool, self.example
        )
    }

    /// Description of the `sortParam` argument of list tools.
    pub fn sort_hint(&self) -> String {
        format!(
            "Sort parameter, format field:asc|desc. Sortable fields: {}. Default: {}",
            self.fields.join(", "),
            self.default_sort
        )
    }
}

/// Discovery text of a family.
pub fn describe_searchable_fields(family: ResourceFamily) -> String {
    SearchCatalog::for_family(family).describe()
}
