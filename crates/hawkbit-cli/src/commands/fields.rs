//! `hawkbit fields`: the discovery text of one resource family.

use clap::ValueEnum;
use hawkbit_core::{ResourceFamily, describe_searchable_fields};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FamilyArg {
    Target,
    Action,
    Rollout,
    RolloutGroup,
    TargetFilter,
    TargetTag,
    TargetType,
}

impl From<FamilyArg> for ResourceFamily {
    fn from(arg: FamilyArg) -> Self {
        match arg {
            FamilyArg::Target => ResourceFamily::Target,
            FamilyArg::Action => ResourceFamily::Action,
            FamilyArg::Rollout => ResourceFamily::Rollout,
            FamilyArg::RolloutGroup => ResourceFamily::RolloutGroup,
            FamilyArg::TargetFilter => ResourceFamily::TargetFilterQuery,
            FamilyArg::TargetTag => ResourceFamily::TargetTag,
            FamilyArg::TargetType => ResourceFamily::TargetType,
        }
    }
}

pub fn print(family: FamilyArg) {
    println!("{}", describe_searchable_fields(family.into()));
}
