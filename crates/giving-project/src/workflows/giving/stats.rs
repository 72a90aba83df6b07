//! Read-side aggregation over candidates and donors, scoped by term.
//!
//! Each category is tallied in a single pass over the candidates in scope. The result always
//! lists every enum value, including `NotSpecified`, even when its count is zero.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use serde::Serialize;

use super::domain::{
    Actor, Candidate, DemographicCategory, Donor, DonorStatus, Gender, Race, SexualOrientation,
    SocialClass, TermId, UserId,
};
use super::error::GivingError;
use super::repository::{CandidateRepository, DonorRepository, TermRepository, UserRepository};

/// Count per enum value. Keys iterate in declaration order.
pub type CategoryCounts<T> = BTreeMap<T, usize>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CohortStats {
    pub term_id: Option<TermId>,
    pub candidate_count: usize,
    pub amount_donated: u64,
    pub donor_count: usize,
    pub amount_received: u64,
    pub pledged_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParticipantStats {
    pub user_id: UserId,
    pub todo: usize,
    pub asking: usize,
    pub pledged: usize,
    pub completed: usize,
    pub total_received: u64,
}

/// Everything the term dashboard shows, in one response.
#[derive(Debug, Clone, Serialize)]
pub struct TermReport {
    pub term_id: Option<TermId>,
    pub race: CategoryCounts<Race>,
    pub soc_class: CategoryCounts<SocialClass>,
    pub gender: CategoryCounts<Gender>,
    pub sexual_orientation: CategoryCounts<SexualOrientation>,
    pub cohort: CohortStats,
}

pub struct StatsAggregator<S> {
    store: Arc<S>,
}

impl<S> StatsAggregator<S>
where
    S: TermRepository + CandidateRepository + DonorRepository + UserRepository + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn race_stats(
        &self,
        actor: &Actor,
        term: Option<TermId>,
    ) -> Result<CategoryCounts<Race>, GivingError> {
        let candidates = self.scoped_candidates(actor, term)?;
        Ok(tally(&candidates, |candidate| candidate.demographic.race))
    }

    pub fn class_stats(
        &self,
        actor: &Actor,
        term: Option<TermId>,
    ) -> Result<CategoryCounts<SocialClass>, GivingError> {
        let candidates = self.scoped_candidates(actor, term)?;
        Ok(tally(&candidates, |candidate| candidate.demographic.soc_class))
    }

    pub fn gender_stats(
        &self,
        actor: &Actor,
        term: Option<TermId>,
    ) -> Result<CategoryCounts<Gender>, GivingError> {
        let candidates = self.scoped_candidates(actor, term)?;
        Ok(tally(&candidates, |candidate| candidate.demographic.gender))
    }

    pub fn sexual_orientation_stats(
        &self,
        actor: &Actor,
        term: Option<TermId>,
    ) -> Result<CategoryCounts<SexualOrientation>, GivingError> {
        let candidates = self.scoped_candidates(actor, term)?;
        Ok(tally(&candidates, |candidate| {
            candidate.demographic.sexual_orientation
        }))
    }

    /// Donation totals for a term.
    ///
    /// With a term, only donors whose owning user's candidate sits in that term are counted;
    /// donors owned by users without a candidate record are excluded. Without a term, every
    /// candidate and every donor is counted.
    pub fn cohort_stats(
        &self,
        actor: &Actor,
        term: Option<TermId>,
    ) -> Result<CohortStats, GivingError> {
        let candidates = self.scoped_candidates(actor, term)?;
        self.cohort_from(term, &candidates)
    }

    /// Per-participant status counts. Only completed donors contribute to `total_received`.
    pub fn participant_stats(
        &self,
        actor: &Actor,
        user_id: UserId,
    ) -> Result<ParticipantStats, GivingError> {
        if !actor.may_act_for(user_id) {
            return Err(GivingError::denied(
                "participants may only view their own statistics",
            ));
        }
        if self.store.fetch_user(user_id)?.is_none() {
            return Err(GivingError::not_found(UserId::ENTITY, user_id.0));
        }

        let donors = self.store.donors_for_owner(user_id)?;
        let mut stats = ParticipantStats {
            user_id,
            todo: 0,
            asking: 0,
            pledged: 0,
            completed: 0,
            total_received: 0,
        };
        for donor in &donors {
            match donor.status {
                DonorStatus::Todo => stats.todo += 1,
                DonorStatus::Asking => stats.asking += 1,
                DonorStatus::Pledged => stats.pledged += 1,
                DonorStatus::Completed => {
                    stats.completed += 1;
                    stats.total_received = stats
                        .total_received
                        .checked_add(donor.amount_received())
                        .ok_or(GivingError::Overflow("total_received"))?;
                }
            }
        }
        Ok(stats)
    }

    /// All term-scoped figures computed from one candidate load.
    pub fn term_report(&self, actor: &Actor, term: Option<TermId>) -> Result<TermReport, GivingError> {
        let candidates = self.scoped_candidates(actor, term)?;
        Ok(TermReport {
            term_id: term,
            race: tally(&candidates, |candidate| candidate.demographic.race),
            soc_class: tally(&candidates, |candidate| candidate.demographic.soc_class),
            gender: tally(&candidates, |candidate| candidate.demographic.gender),
            sexual_orientation: tally(&candidates, |candidate| {
                candidate.demographic.sexual_orientation
            }),
            cohort: self.cohort_from(term, &candidates)?,
        })
    }

    fn scoped_candidates(
        &self,
        actor: &Actor,
        term: Option<TermId>,
    ) -> Result<Vec<Candidate>, GivingError> {
        if !actor.is_admin() {
            return Err(GivingError::denied(
                "only administrators may view cohort statistics",
            ));
        }
        if let Some(term_id) = term {
            if self.store.fetch_term(term_id)?.is_none() {
                return Err(GivingError::not_found(TermId::ENTITY, term_id.0));
            }
        }
        Ok(self.store.candidates(term)?)
    }

    fn cohort_from(
        &self,
        term: Option<TermId>,
        candidates: &[Candidate],
    ) -> Result<CohortStats, GivingError> {
        let amount_donated = checked_total(
            "amount_donated",
            candidates.iter().map(|candidate| candidate.amount_donated),
        )?;

        let donors: Vec<Donor> = match term {
            None => self.store.donors()?,
            Some(_) => {
                let in_term: BTreeSet<_> = candidates.iter().map(|candidate| candidate.id).collect();
                let owners: BTreeSet<UserId> = self
                    .store
                    .users()?
                    .into_iter()
                    .filter(|user| user.candidate_id.is_some_and(|id| in_term.contains(&id)))
                    .map(|user| user.id)
                    .collect();
                self.store
                    .donors()?
                    .into_iter()
                    .filter(|donor| owners.contains(&donor.user_id))
                    .collect()
            }
        };

        Ok(CohortStats {
            term_id: term,
            candidate_count: candidates.len(),
            amount_donated,
            donor_count: donors.len(),
            amount_received: checked_total(
                "amount_received",
                donors.iter().map(Donor::amount_received),
            )?,
            pledged_count: donors
                .iter()
                .filter(|donor| donor.status == DonorStatus::Pledged)
                .count(),
        })
    }
}

fn checked_total(
    field: &'static str,
    amounts: impl IntoIterator<Item = u64>,
) -> Result<u64, GivingError> {
    amounts
        .into_iter()
        .try_fold(0_u64, |total, amount| total.checked_add(amount))
        .ok_or(GivingError::Overflow(field))
}

fn tally<T, F>(candidates: &[Candidate], pick: F) -> CategoryCounts<T>
where
    T: DemographicCategory,
    F: Fn(&Candidate) -> T,
{
    let mut counts: CategoryCounts<T> = T::ALL.iter().map(|value| (*value, 0)).collect();
    for candidate in candidates {
        *counts.entry(pick(candidate)).or_insert(0) += 1;
    }
    counts
}
