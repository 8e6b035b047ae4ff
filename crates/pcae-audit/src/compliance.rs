//! # Compliance Recording and Checking
//!
//! Events record one requirement per applicable regulator. Recording is not
//! checking: every requirement's `status` is
//! [`RequirementStatus::ClaimedCompliant`] on creation, while its
//! `verification` comes from a [`ComplianceCheck`].
//!
//! The default [`RecordOnlyCheck`] determines nothing and leaves every
//! requirement [`RequirementStatus::Unverified`]. Deployments that can
//! actually evaluate a requirement plug in their own checker and report
//! themselves authoritative.

use crate::event::{AuditDetails, ComplianceRequirement, RequirementStatus};

pub trait ComplianceCheck: Send + Sync + std::fmt::Debug {
    /// Determine a verification status for each requirement, in order.
    /// Missing entries are treated as [`RequirementStatus::Unverified`].
    fn check_requirements(
        &self,
        requirements: &[ComplianceRequirement],
        details: &AuditDetails,
    ) -> Vec<RequirementStatus>;

    /// Whether the statuses returned by this checker are real determinations.
    fn is_authoritative(&self) -> bool {
        false
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RecordOnlyCheck;

impl ComplianceCheck for RecordOnlyCheck {
    fn check_requirements(
        &self,
        requirements: &[ComplianceRequirement],
        _details: &AuditDetails,
    ) -> Vec<RequirementStatus> {
        vec![RequirementStatus::Unverified; requirements.len()]
    }
}

/// Apply a checker's verdicts to `requirements`. Returns whether the result
/// counts as verified.
pub(crate) fn apply_check(
    check: &dyn ComplianceCheck,
    requirements: &mut [ComplianceRequirement],
    details: &AuditDetails,
) -> bool {
    let mut verdicts = check.check_requirements(requirements, details).into_iter();
    for requirement in requirements.iter_mut() {
        requirement.verification = verdicts.next().unwrap_or(RequirementStatus::Unverified);
    }
    check.is_authoritative()
        && requirements
            .iter()
            .all(|r| r.verification != RequirementStatus::Unverified)
}
