//! Routing policies: the per-record decision made by the router.

use crate::allow_set::AllowSet;
use crate::record::{RoutingKey, Tag, TaggedRecord};

/// Closed set of classification strategies the router can run.
#[derive(Debug, Clone)]
pub enum RoutingPolicy {
    /// One sink per tag value; records without the tag go to `undetermined`.
    Demultiplex { tag: Tag },
    /// Pass-through filter keeping records whose tag value is allowed.
    AllowList {
        tag: Tag,
        allow: AllowSet,
        filter_undetermined: bool,
    },
    /// Pass-through filter dropping records whose aligned sequence and
    /// quality lengths differ.
    QualityFilter,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropReason {
    NotAllowed(RoutingKey),
    Undetermined,
    QualityMismatch { sequence_len: usize, quality_len: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Write to the sink owned by this key.
    Route(RoutingKey),
    /// Write unchanged to the single pass-through sink.
    Forward,
    Drop(DropReason),
}

impl RoutingPolicy {
    pub fn name(&self) -> &'static str {
        match self {
            RoutingPolicy::Demultiplex { .. } => "demultiplex",
            RoutingPolicy::AllowList { .. } => "allow-list",
            RoutingPolicy::QualityFilter => "quality-filter",
        }
    }

    /// Filtering policies forward into one shared output rather than
    /// one output per key.
    pub fn is_pass_through(&self) -> bool {
        !matches!(self, RoutingPolicy::Demultiplex { .. })
    }

    /// Classify a single record. Depends only on the record itself.
    pub fn decide<R: TaggedRecord + ?Sized>(&self, record: &R) -> Decision {
        match self {
            RoutingPolicy::Demultiplex { tag } => {
                Decision::Route(RoutingKey::for_record(record, tag))
            }
            RoutingPolicy::AllowList {
                tag,
                allow,
                filter_undetermined,
            } => match record.tag_value(tag) {
                Some(value) if allow.contains(&value) => Decision::Forward,
                Some(value) => Decision::Drop(DropReason::NotAllowed(RoutingKey::new(value))),
                None if *filter_undetermined => Decision::Drop(DropReason::Undetermined),
                None => Decision::Forward,
            },
            RoutingPolicy::QualityFilter => {
                let sequence_len = record.aligned_sequence_len();
                let quality_len = record.aligned_quality_len();
                if sequence_len == quality_len {
                    Decision::Forward
                } else {
                    Decision::Drop(DropReason::QualityMismatch {
                        sequence_len,
                        quality_len,
                    })
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemRecord;

    fn cb() -> Tag {
        "CB".parse().unwrap()
    }

    #[test]
    fn demultiplex_uses_tag_value_or_undetermined() {
        let policy = RoutingPolicy::Demultiplex { tag: cb() };
        assert_eq!(
            policy.decide(&MemRecord::tagged("r1", "CB", "AAA")),
            Decision::Route(RoutingKey::new("AAA"))
        );
        assert_eq!(
            policy.decide(&MemRecord::tagged("r2", "UB", "AAA")),
            Decision::Route(RoutingKey::undetermined())
        );
    }

    #[test]
    fn keys_are_case_sensitive() {
        let policy = RoutingPolicy::Demultiplex { tag: cb() };
        assert_ne!(
            policy.decide(&MemRecord::tagged("r1", "CB", "aaa")),
            policy.decide(&MemRecord::tagged("r2", "CB", "AAA"))
        );
    }

    #[test]
    fn allow_list_keeps_untagged_unless_asked() {
        let allow: AllowSet = ["AAA"].into_iter().collect();
        let mut policy = RoutingPolicy::AllowList {
            tag: cb(),
            allow: allow.clone(),
            filter_undetermined: false,
        };
        assert_eq!(policy.decide(&MemRecord::tagged("r1", "CB", "AAA")), Decision::Forward);
        assert_eq!(
            policy.decide(&MemRecord::tagged("r2", "CB", "BBB")),
            Decision::Drop(DropReason::NotAllowed(RoutingKey::new("BBB")))
        );
        assert_eq!(policy.decide(&MemRecord::new("r3")), Decision::Forward);

        policy = RoutingPolicy::AllowList {
            tag: cb(),
            allow,
            filter_undetermined: true,
        };
        assert_eq!(
            policy.decide(&MemRecord::new("r3")),
            Decision::Drop(DropReason::Undetermined)
        );
    }

    #[test]
    fn quality_filter_compares_aligned_lengths() {
        let policy = RoutingPolicy::QualityFilter;
        assert_eq!(policy.decide(&MemRecord::new("ok").with_lengths(10, 10)), Decision::Forward);
        assert_eq!(
            policy.decide(&MemRecord::new("bad").with_lengths(10, 9)),
            Decision::Drop(DropReason::QualityMismatch {
                sequence_len: 10,
                quality_len: 9
            })
        );
    }
}
