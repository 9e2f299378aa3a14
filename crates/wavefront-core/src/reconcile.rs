//! Idempotent reconciliation of sources and source tags.
//!
//! Every function here is pure: it compares observed state fetched from the
//! API against a partial desired state and returns the (at most one) write
//! call needed to converge, together with the `changed` signal. Running a
//! reconciliation again against the state it produced always yields
//! `changed == false`.

use serde::{Deserialize, Serialize};

use crate::error::{Result, WavefrontError};
use crate::model::{Source, TagSet};

/// How desired tags are combined with the tags already on a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagState {
    /// Ensure the given tags are attached; others are kept.
    Present,
    /// Ensure the given tags are not attached; others are kept.
    Absent,
    /// Make the tag set exactly the given tags.
    Replace,
}

impl std::fmt::Display for TagState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Present => write!(f, "present"),
            Self::Absent => write!(f, "absent"),
            Self::Replace => write!(f, "replace"),
        }
    }
}

/// Desired attributes of a source. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DesiredState {
    pub description: Option<String>,
    pub hidden: Option<bool>,
    pub tags: Option<TagSet>,
}

/// Outcome of a tag reconciliation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagReconciliation {
    pub tags: TagSet,
    pub changed: bool,
}

/// Attribute fields that differ from the observed source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeChanges {
    pub description: Option<String>,
    pub hidden: Option<bool>,
}

impl AttributeChanges {
    pub fn is_empty(&self) -> bool {
        self.description.is_none() && self.hidden.is_none()
    }

    /// Returns `source` with the changed fields overwritten.
    pub fn apply_to(&self, source: &Source) -> Source {
        let mut updated = source.clone();
        if let Some(description) = &self.description {
            updated.description = Some(description.clone());
        }
        if let Some(hidden) = self.hidden {
            updated.hidden = hidden;
        }
        updated
    }
}

/// A write call against the source endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceCall {
    /// `POST /api/v2/source`
    Create(Source),
    /// `PUT /api/v2/source/{name}` with the full merged source.
    Update(Source),
}

/// `POST /api/v2/source/{source}/tag` with the full tag list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetTagsCall {
    pub source: String,
    pub tags: TagSet,
}

/// Result of planning a source convergence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcePlan {
    /// Zero or one write call.
    pub call: Option<SourceCall>,
    /// State of the source once `call` has been applied.
    pub expected: Source,
}

impl SourcePlan {
    pub fn changed(&self) -> bool {
        self.call.is_some()
    }
}

/// Compares description and hidden field by field. Only fields present in
/// `desired` are considered; the returned changes contain exactly the
/// mismatching ones. A source without a description counts as having an
/// empty one.
pub fn reconcile_attributes(observed: &Source, desired: &DesiredState) -> AttributeChanges {
    let description = desired
        .description
        .as_ref()
        .filter(|wanted| observed.description.as_deref().unwrap_or("") != wanted.as_str())
        .cloned();
    let hidden = desired.hidden.filter(|wanted| *wanted != observed.hidden);

    AttributeChanges {
        description,
        hidden,
    }
}

/// Computes the tag set a source should end up with.
///
/// `desired == None && mode == None` is a pure read. Tags without a mode, or
/// `replace` without tags, are rejected since their intent is ambiguous.
pub fn reconcile_tags(
    observed: &TagSet,
    desired: Option<&TagSet>,
    mode: Option<TagState>,
) -> Result<TagReconciliation> {
    let tags = match (mode, desired) {
        (None, None) => observed.clone(),
        (None, Some(_)) => {
            return Err(WavefrontError::invalid_argument(
                "tags were given without a state (present, absent or replace)",
            ));
        }
        (Some(TagState::Replace), None) => {
            return Err(WavefrontError::invalid_argument(
                "state=replace requires an explicit list of tags",
            ));
        }
        (Some(TagState::Present), desired) => match desired {
            Some(desired) => observed.union(desired).cloned().collect(),
            None => observed.clone(),
        },
        (Some(TagState::Absent), desired) => match desired {
            Some(desired) => observed.difference(desired).cloned().collect(),
            None => observed.clone(),
        },
        (Some(TagState::Replace), Some(desired)) => desired.clone(),
    };

    let changed = &tags != observed;
    Ok(TagReconciliation { tags, changed })
}

/// Plans the single write needed to converge `name` to `desired`.
///
/// A missing source is created with defaults for unspecified fields
/// (empty description, not hidden, no tags). An existing source gets one
/// update carrying every changed field, with desired tags replacing the
/// observed set.
pub fn plan_source(name: &str, observed: Option<&Source>, desired: &DesiredState) -> SourcePlan {
    let Some(observed) = observed else {
        let created = Source {
            name: name.to_string(),
            description: Some(desired.description.clone().unwrap_or_default()),
            hidden: desired.hidden.unwrap_or(false),
            tags: desired.tags.clone().unwrap_or_default(),
        };
        return SourcePlan {
            call: Some(SourceCall::Create(created.clone())),
            expected: created,
        };
    };

    let attributes = reconcile_attributes(observed, desired);
    let mut expected = attributes.apply_to(observed);
    let mut tags_changed = false;
    if let Some(tags) = &desired.tags
        && tags != &observed.tags
    {
        expected.tags = tags.clone();
        tags_changed = true;
    }

    let call = (!attributes.is_empty() || tags_changed).then(|| SourceCall::Update(expected.clone()));
    SourcePlan { call, expected }
}

/// Plans the single tag write (if any) for a source-tags invocation.
pub fn plan_tags(
    name: &str,
    observed: &TagSet,
    desired: Option<&TagSet>,
    mode: Option<TagState>,
) -> Result<(Option<SetTagsCall>, TagReconciliation)> {
    let reconciliation = reconcile_tags(observed, desired, mode)?;
    let call = reconciliation.changed.then(|| SetTagsCall {
        source: name.to_string(),
        tags: reconciliation.tags.clone(),
    });
    Ok((call, reconciliation))
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck_macros::quickcheck;

    fn tags(items: &[&str]) -> TagSet {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_absent_removes_last_tag() {
        let result = reconcile_tags(
            &tags(&["prod"]),
            Some(&tags(&["prod"])),
            Some(TagState::Absent),
        )
        .unwrap();
        assert!(result.tags.is_empty());
        assert!(result.changed);
    }

    #[test]
    fn test_present_adds_missing_tag() {
        let result = reconcile_tags(
            &tags(&["a", "b"]),
            Some(&tags(&["retired"])),
            Some(TagState::Present),
        )
        .unwrap();
        assert_eq!(result.tags, tags(&["a", "b", "retired"]));
        assert!(result.changed);
    }

    #[test]
    fn test_present_existing_tag_is_unchanged() {
        let result =
            reconcile_tags(&tags(&["a"]), Some(&tags(&["a"])), Some(TagState::Present)).unwrap();
        assert_eq!(result.tags, tags(&["a"]));
        assert!(!result.changed);
    }

    #[test]
    fn test_absent_missing_tag_is_unchanged() {
        let result =
            reconcile_tags(&tags(&["a"]), Some(&tags(&["b"])), Some(TagState::Absent)).unwrap();
        assert_eq!(result.tags, tags(&["a"]));
        assert!(!result.changed);
    }

    #[test]
    fn test_replace_ignores_order() {
        let observed: TagSet = ["nginx", "prod", "dc-3"].iter().map(|s| s.to_string()).collect();
        let desired: TagSet = ["dc-3", "nginx", "prod"].iter().map(|s| s.to_string()).collect();
        let result = reconcile_tags(&observed, Some(&desired), Some(TagState::Replace)).unwrap();
        assert!(!result.changed);
    }

    #[test]
    fn test_replace_with_empty_list_clears_tags() {
        let result =
            reconcile_tags(&tags(&["a", "b"]), Some(&TagSet::new()), Some(TagState::Replace))
                .unwrap();
        assert!(result.tags.is_empty());
        assert!(result.changed);
    }

    #[test]
    fn test_no_mode_no_tags_is_pure_read() {
        let observed = tags(&["a", "b"]);
        let result = reconcile_tags(&observed, None, None).unwrap();
        assert_eq!(result.tags, observed);
        assert!(!result.changed);

        let (call, _) = plan_tags("app-01", &observed, None, None).unwrap();
        assert!(call.is_none());
    }

    #[test]
    fn test_tags_without_mode_rejected() {
        let err = reconcile_tags(&TagSet::new(), Some(&tags(&["a"])), None).unwrap_err();
        assert!(matches!(err, WavefrontError::InvalidArgument(_)));
    }

    #[test]
    fn test_replace_without_tags_rejected() {
        let err = reconcile_tags(&tags(&["a"]), None, Some(TagState::Replace)).unwrap_err();
        assert!(matches!(err, WavefrontError::InvalidArgument(_)));
    }

    #[test]
    fn test_present_without_tags_is_unchanged() {
        let result = reconcile_tags(&tags(&["a"]), None, Some(TagState::Present)).unwrap();
        assert!(!result.changed);
    }

    #[test]
    fn test_plan_tags_emits_single_set_call() {
        let (call, result) = plan_tags(
            "app-01",
            &tags(&["a", "old"]),
            Some(&tags(&["a", "new"])),
            Some(TagState::Replace),
        )
        .unwrap();
        assert!(result.changed);
        assert_eq!(
            call,
            Some(SetTagsCall {
                source: "app-01".into(),
                tags: tags(&["a", "new"]),
            })
        );
    }

    #[test]
    fn test_hidden_only_update_leaves_description() {
        let observed = Source::new("app-01").with_description("x");
        let desired = DesiredState {
            hidden: Some(true),
            ..Default::default()
        };

        let changes = reconcile_attributes(&observed, &desired);
        assert_eq!(
            changes,
            AttributeChanges {
                description: None,
                hidden: Some(true),
            }
        );

        let plan = plan_source("app-01", Some(&observed), &desired);
        let expected = Source::new("app-01").with_description("x").with_hidden(true);
        assert_eq!(plan.call, Some(SourceCall::Update(expected.clone())));
        assert_eq!(plan.expected, expected);
    }

    #[test]
    fn test_empty_description_matches_missing_one() {
        let observed = Source::new("app-01");
        assert!(observed.description.is_none());
        let desired = DesiredState {
            description: Some(String::new()),
            ..Default::default()
        };

        assert!(reconcile_attributes(&observed, &desired).is_empty());
        let plan = plan_source("app-01", Some(&observed), &desired);
        assert!(!plan.changed());
        assert_eq!(plan.expected, observed);
    }

    #[test]
    fn test_matching_attributes_make_no_call() {
        let observed = Source::new("app-01")
            .with_description("x")
            .with_tags(["prod"]);
        let desired = DesiredState {
            description: Some("x".into()),
            hidden: Some(false),
            tags: Some(tags(&["prod"])),
        };

        assert!(reconcile_attributes(&observed, &desired).is_empty());
        let plan = plan_source("app-01", Some(&observed), &desired);
        assert!(!plan.changed());
        assert_eq!(plan.expected, observed);
    }

    #[test]
    fn test_empty_desired_state_never_writes() {
        let observed = Source::new("app-01").with_hidden(true).with_tags(["a"]);
        let plan = plan_source("app-01", Some(&observed), &DesiredState::default());
        assert!(plan.call.is_none());
    }

    #[test]
    fn test_missing_source_is_created_with_defaults() {
        let desired = DesiredState {
            tags: Some(tags(&["prod"])),
            ..Default::default()
        };
        let plan = plan_source("app-01", None, &desired);
        let expected = Source::new("app-01").with_description("").with_tags(["prod"]);
        assert_eq!(plan.call, Some(SourceCall::Create(expected.clone())));
        assert_eq!(plan.expected, expected);
    }

    #[test]
    fn test_source_plan_is_idempotent() {
        let observed = Source::new("app-01").with_description("old").with_tags(["a"]);
        let desired = DesiredState {
            description: Some("new".into()),
            hidden: Some(true),
            tags: Some(tags(&["b"])),
        };
        let first = plan_source("app-01", Some(&observed), &desired);
        assert!(first.changed());

        let second = plan_source("app-01", Some(&first.expected), &desired);
        assert!(!second.changed());
    }

    fn mode_from(selector: u8) -> TagState {
        match selector % 3 {
            0 => TagState::Present,
            1 => TagState::Absent,
            _ => TagState::Replace,
        }
    }

    #[quickcheck]
    fn prop_reconcile_tags_is_idempotent(observed: TagSet, desired: TagSet, selector: u8) -> bool {
        let mode = Some(mode_from(selector));
        let first = reconcile_tags(&observed, Some(&desired), mode).unwrap();
        let second = reconcile_tags(&first.tags, Some(&desired), mode).unwrap();
        !second.changed && second.tags == first.tags
    }

    #[quickcheck]
    fn prop_changed_iff_tags_differ(observed: TagSet, desired: TagSet, selector: u8) -> bool {
        let result = reconcile_tags(&observed, Some(&desired), Some(mode_from(selector))).unwrap();
        result.changed == (result.tags != observed)
    }
}
