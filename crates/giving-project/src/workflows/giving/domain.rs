use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident, $entity:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl $name {
            pub const ENTITY: &'static str = $entity;
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

entity_id!(
    /// Identifier for a cohort window.
    TermId,
    "term"
);
entity_id!(
    /// Identifier for a candidate intake record.
    CandidateId,
    "candidate"
);
entity_id!(
    /// Identifier for a solicited donor.
    DonorId,
    "donor"
);
entity_id!(
    /// Identifier for an account.
    UserId,
    "user"
);

/// Shared behavior for the demographic enumerations.
///
/// Every category carries a `NotSpecified` sentinel. Choice listings hide it, statistics never do.
pub trait DemographicCategory: Copy + Eq + Ord + Sized + 'static {
    const FIELD: &'static str;
    const ALL: &'static [Self];

    fn label(self) -> &'static str;

    fn is_specified(self) -> bool;

    fn specified() -> Vec<Self> {
        Self::ALL
            .iter()
            .copied()
            .filter(|value| value.is_specified())
            .collect()
    }
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Race {
    #[default]
    NotSpecified,
    Black,
    White,
    Asian,
    Latinx,
    NativeAmerican,
}

impl DemographicCategory for Race {
    const FIELD: &'static str = "race";
    const ALL: &'static [Self] = &[
        Self::NotSpecified,
        Self::Black,
        Self::White,
        Self::Asian,
        Self::Latinx,
        Self::NativeAmerican,
    ];

    fn label(self) -> &'static str {
        match self {
            Self::NotSpecified => "Not Specified",
            Self::Black => "Black",
            Self::White => "White",
            Self::Asian => "Asian",
            Self::Latinx => "Latinx",
            Self::NativeAmerican => "Native American",
        }
    }

    fn is_specified(self) -> bool {
        self != Self::NotSpecified
    }
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SocialClass {
    #[default]
    NotSpecified,
    Low,
    Middle,
    Upper,
}

impl DemographicCategory for SocialClass {
    const FIELD: &'static str = "soc_class";
    const ALL: &'static [Self] = &[Self::NotSpecified, Self::Low, Self::Middle, Self::Upper];

    fn label(self) -> &'static str {
        match self {
            Self::NotSpecified => "Not Specified",
            Self::Low => "Low",
            Self::Middle => "Middle",
            Self::Upper => "Upper",
        }
    }

    fn is_specified(self) -> bool {
        self != Self::NotSpecified
    }
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Gender {
    #[default]
    NotSpecified,
    Woman,
    Man,
    NonBinary,
}

impl DemographicCategory for Gender {
    const FIELD: &'static str = "gender";
    const ALL: &'static [Self] = &[Self::NotSpecified, Self::Woman, Self::Man, Self::NonBinary];

    fn label(self) -> &'static str {
        match self {
            Self::NotSpecified => "Not Specified",
            Self::Woman => "Woman",
            Self::Man => "Man",
            Self::NonBinary => "Non Binary",
        }
    }

    fn is_specified(self) -> bool {
        self != Self::NotSpecified
    }
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SexualOrientation {
    #[default]
    NotSpecified,
    Lgbtq,
    Straight,
}

impl DemographicCategory for SexualOrientation {
    const FIELD: &'static str = "sexual_orientation";
    const ALL: &'static [Self] = &[Self::NotSpecified, Self::Lgbtq, Self::Straight];

    fn label(self) -> &'static str {
        match self {
            Self::NotSpecified => "Not Specified",
            Self::Lgbtq => "LGBTQ",
            Self::Straight => "Straight",
        }
    }

    fn is_specified(self) -> bool {
        self != Self::NotSpecified
    }
}

/// Demographic attributes attached to a candidate or a donor.
///
/// The record is stored inside its owner so both commit together.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Demographic {
    #[serde(default)]
    pub race: Race,
    #[serde(default)]
    pub soc_class: SocialClass,
    #[serde(default)]
    pub gender: Gender,
    #[serde(default)]
    pub sexual_orientation: SexualOrientation,
    #[serde(default)]
    pub age: u16,
}

/// One selectable value: the wire `value` clients submit and the `label` they display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DemographicChoice<T> {
    pub value: T,
    pub label: &'static str,
}

/// Choice lists for every demographic form field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DemographicChoices {
    pub race: Vec<DemographicChoice<Race>>,
    pub soc_class: Vec<DemographicChoice<SocialClass>>,
    pub gender: Vec<DemographicChoice<Gender>>,
    pub sexual_orientation: Vec<DemographicChoice<SexualOrientation>>,
}

impl Demographic {
    /// Selectable choices per category, without the `NotSpecified` sentinel.
    pub fn demographics_dict() -> DemographicChoices {
        fn choices<T: DemographicCategory>() -> Vec<DemographicChoice<T>> {
            T::specified()
                .into_iter()
                .map(|value| DemographicChoice {
                    value,
                    label: value.label(),
                })
                .collect()
        }

        DemographicChoices {
            race: choices(),
            soc_class: choices(),
            gender: choices(),
            sexual_orientation: choices(),
        }
    }
}

/// Intake status of a candidate. Assigned freely by administrators.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CandidateStatus {
    #[default]
    Pending,
    Assigned,
    Rejected,
}

impl CandidateStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Assigned => "Assigned",
            Self::Rejected => "Rejected",
        }
    }
}

/// Position of a donor in the solicitation pipeline.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DonorStatus {
    #[default]
    Todo,
    Asking,
    Pledged,
    Completed,
}

impl DonorStatus {
    pub const fn ordered() -> [Self; 4] {
        [Self::Todo, Self::Asking, Self::Pledged, Self::Completed]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Todo => "TODO",
            Self::Asking => "ASKING",
            Self::Pledged => "PLEDGED",
            Self::Completed => "COMPLETED",
        }
    }
}

impl fmt::Display for DonorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[default]
    Participant,
    Administrator,
}

impl Role {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Participant => "Participant",
            Self::Administrator => "Administrator",
        }
    }

    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Administrator)
    }
}

/// Identity an operation runs on behalf of. Always passed explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub user_id: UserId,
    pub role: Role,
}

impl Actor {
    pub const fn new(user_id: UserId, role: Role) -> Self {
        Self { user_id, role }
    }

    pub const fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Owner-or-admin check shared by every donor mutation.
    pub fn may_act_for(&self, owner: UserId) -> bool {
        self.is_admin() || self.user_id == owner
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Term {
    pub id: TermId,
    pub name: String,
    pub in_progress: bool,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: CandidateId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
    pub source: String,
    pub staff_contact: String,
    pub notes: String,
    pub status: CandidateStatus,
    pub term_id: Option<TermId>,
    pub amount_donated: u64,
    pub applied: bool,
    pub demographic: Demographic,
}

impl Candidate {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: Role,
    pub candidate_id: Option<CandidateId>,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn actor(&self) -> Actor {
        Actor::new(self.id, self.role)
    }
}

/// Fields captured when a donor moves from TODO to ASKING.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AskDetails {
    pub date_asking: NaiveDate,
    pub amount_asking_for: u64,
    pub how_asking: String,
}

/// Fields captured when a donor moves from ASKING to PLEDGED.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PledgeDetails {
    pub pledged: bool,
    pub amount_pledged: u64,
}

/// Fields captured when a donor moves from PLEDGED to COMPLETED.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiptDetails {
    pub amount_received: u64,
    pub date_received: NaiveDate,
}

/// Contact and interest fields owned by the participant, editable in any state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DonorProfile {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
    pub contact_date: Option<NaiveDate>,
    pub street_address: String,
    pub city: String,
    pub state: String,
    pub zipcode: String,
    pub interested_in_future_gp: bool,
    pub want_to_learn_about_brf_guarantees: bool,
    pub interested_in_volunteering: bool,
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Donor {
    pub id: DonorId,
    pub user_id: UserId,
    pub status: DonorStatus,
    pub profile: DonorProfile,
    pub demographic: Option<Demographic>,
    pub ask: Option<AskDetails>,
    pub pledge: Option<PledgeDetails>,
    pub receipt: Option<ReceiptDetails>,
    /// Bumped by the repository on every successful update.
    pub version: u64,
}

impl Donor {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.profile.first_name, self.profile.last_name)
    }

    pub fn amount_asking_for(&self) -> u64 {
        self.ask.as_ref().map_or(0, |ask| ask.amount_asking_for)
    }

    pub fn amount_pledged(&self) -> u64 {
        self.pledge.map_or(0, |pledge| pledge.amount_pledged)
    }

    pub fn amount_received(&self) -> u64 {
        self.receipt.map_or(0, |receipt| receipt.amount_received)
    }

    pub fn date_received(&self) -> Option<NaiveDate> {
        self.receipt.map(|receipt| receipt.date_received)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demographics_dict_pairs_wire_values_with_labels() {
        let dict = Demographic::demographics_dict();
        assert!(dict.race.iter().all(|choice| choice.value != Race::NotSpecified));
        assert_eq!(dict.race.len(), Race::ALL.len() - 1);
        assert_eq!(
            dict.sexual_orientation
                .iter()
                .map(|choice| choice.label)
                .collect::<Vec<_>>(),
            vec!["LGBTQ", "Straight"]
        );

        let json = serde_json::to_value(&dict).expect("serialize");
        let last = &json["race"][4];
        assert_eq!(last["value"], "NATIVE_AMERICAN");
        assert_eq!(last["label"], "Native American");
        let round_trip: Race =
            serde_json::from_value(last["value"].clone()).expect("value is accepted back");
        assert_eq!(round_trip, Race::NativeAmerican);
    }

    #[test]
    fn category_listings_start_with_sentinel() {
        assert_eq!(Race::ALL[0], Race::NotSpecified);
        assert_eq!(SocialClass::ALL[0], SocialClass::NotSpecified);
        assert_eq!(Gender::ALL[0], Gender::NotSpecified);
        assert_eq!(SexualOrientation::ALL[0], SexualOrientation::NotSpecified);
        assert_eq!(Demographic::default().race, Race::NotSpecified);
    }

    #[test]
    fn actor_ownership_rules() {
        let owner = UserId(7);
        assert!(Actor::new(owner, Role::Participant).may_act_for(owner));
        assert!(!Actor::new(UserId(8), Role::Participant).may_act_for(owner));
        assert!(Actor::new(UserId(1), Role::Administrator).may_act_for(owner));
    }

    #[test]
    fn enums_serialize_as_screaming_names() {
        let json = serde_json::to_string(&Race::NativeAmerican).expect("serialize");
        assert_eq!(json, "\"NATIVE_AMERICAN\"");
        let status: DonorStatus = serde_json::from_str("\"PLEDGED\"").expect("deserialize");
        assert_eq!(status, DonorStatus::Pledged);
    }
}
