//! Inbound payloads and their validation into domain values.
//!
//! Every form reports all of its field errors together; nothing is persisted until a form
//! validates cleanly.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use super::domain::{
    AskDetails, CandidateStatus, Demographic, DonorProfile, PledgeDetails, ReceiptDetails, Role,
    TermId,
};
use super::validation::{FormValidator, ValidationErrors};

/// Contact details for a new or edited donor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DonorForm {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub contact_date: Option<NaiveDate>,
    pub street_address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zipcode: Option<String>,
    pub interested_in_future_gp: bool,
    pub want_to_learn_about_brf_guarantees: bool,
    pub interested_in_volunteering: bool,
    pub demographic: Option<Demographic>,
    pub notes: Option<String>,
    pub version: Option<u64>,
}

impl DonorForm {
    pub fn validate(&self) -> Result<(DonorProfile, Option<Demographic>), ValidationErrors> {
        let mut validator = FormValidator::new();
        let first_name = validator.text("first_name", self.first_name.as_deref(), 1, 64);
        let last_name = validator.text("last_name", self.last_name.as_deref(), 1, 64);
        let email = validator.email("email", self.email.as_deref());
        let phone_number = validator.text("phone_number", self.phone_number.as_deref(), 1, 64);
        let contact_date = validator.required("contact_date", self.contact_date);
        let street_address =
            validator.text("street_address", self.street_address.as_deref(), 1, 500);
        let city = validator.text("city", self.city.as_deref(), 1, 500);
        let state = validator.text("state", self.state.as_deref(), 1, 500);
        let zipcode = validator.text("zipcode", self.zipcode.as_deref(), 1, 500);
        let notes = validator.optional_text("notes", self.notes.as_deref(), 3000);
        validator.finish()?;

        let profile = DonorProfile {
            first_name,
            last_name,
            email,
            phone_number,
            contact_date,
            street_address,
            city,
            state,
            zipcode,
            interested_in_future_gp: self.interested_in_future_gp,
            want_to_learn_about_brf_guarantees: self.want_to_learn_about_brf_guarantees,
            interested_in_volunteering: self.interested_in_volunteering,
            notes,
        };
        Ok((profile, self.demographic))
    }
}

/// TODO -> ASKING.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AskForm {
    pub date_asking: Option<NaiveDate>,
    pub amount_asking_for: Option<u64>,
    pub how_asking: Option<String>,
    pub version: Option<u64>,
}

impl AskForm {
    pub fn validate(&self) -> Result<AskDetails, ValidationErrors> {
        let mut validator = FormValidator::new();
        let date_asking = validator.required("date_asking", self.date_asking);
        let amount_asking_for = validator.required("amount_asking_for", self.amount_asking_for);
        let how_asking = validator.text("how_asking", self.how_asking.as_deref(), 1, 1024);
        validator.finish()?;

        match (date_asking, amount_asking_for) {
            (Some(date_asking), Some(amount_asking_for)) => Ok(AskDetails {
                date_asking,
                amount_asking_for,
                how_asking,
            }),
            _ => Err(ValidationErrors::single("date_asking", "incomplete ask")),
        }
    }
}

/// ASKING -> PLEDGED. The amount is only required when the donor pledged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PledgeForm {
    pub pledged: bool,
    pub amount_pledged: Option<u64>,
    pub version: Option<u64>,
}

impl PledgeForm {
    pub fn validate(&self) -> Result<PledgeDetails, ValidationErrors> {
        let mut validator = FormValidator::new();
        let amount = validator.required_if("amount_pledged", self.amount_pledged, self.pledged);
        validator.finish()?;

        // A declined pledge stores zero even if an amount was typed in.
        let amount_pledged = if self.pledged { amount.unwrap_or(0) } else { 0 };
        Ok(PledgeDetails {
            pledged: self.pledged,
            amount_pledged,
        })
    }
}

/// PLEDGED -> COMPLETED.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionForm {
    pub amount_received: Option<u64>,
    pub date_received: Option<NaiveDate>,
    pub version: Option<u64>,
}

impl CompletionForm {
    pub fn validate(&self) -> Result<ReceiptDetails, ValidationErrors> {
        let mut validator = FormValidator::new();
        let amount_received = validator.required("amount_received", self.amount_received);
        let date_received = validator.required("date_received", self.date_received);
        validator.finish()?;

        match (amount_received, date_received) {
            (Some(amount_received), Some(date_received)) => Ok(ReceiptDetails {
                amount_received,
                date_received,
            }),
            _ => Err(ValidationErrors::single("amount_received", "incomplete receipt")),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TermForm {
    pub name: Option<String>,
    pub in_progress: Option<bool>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

pub(crate) struct ValidTerm {
    pub(crate) name: String,
    pub(crate) in_progress: bool,
    pub(crate) start_date: NaiveDate,
    pub(crate) end_date: NaiveDate,
}

impl TermForm {
    pub(crate) fn validate(&self) -> Result<ValidTerm, ValidationErrors> {
        let mut validator = FormValidator::new();
        let name = validator.text("name", self.name.as_deref(), 1, 64);
        let start_date = validator.required("start_date", self.start_date);
        let end_date = validator.required("end_date", self.end_date);
        if let (Some(start), Some(end)) = (start_date, end_date) {
            if end < start {
                validator.reject("end_date", "End date must not be before the start date.");
            }
        }
        validator.finish()?;

        match (start_date, end_date) {
            (Some(start_date), Some(end_date)) => Ok(ValidTerm {
                name,
                in_progress: self.in_progress.unwrap_or(true),
                start_date,
                end_date,
            }),
            _ => Err(ValidationErrors::single("start_date", "incomplete term")),
        }
    }
}

/// Administrator-side candidate form, used for both creation and edits.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CandidateForm {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub source: Option<String>,
    pub staff_contact: Option<String>,
    pub notes: Option<String>,
    pub status: Option<CandidateStatus>,
    /// `None` leaves the term alone on edit; `Some(None)` (a JSON `null`) unassigns it.
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub term_id: Option<Option<TermId>>,
    pub amount_donated: Option<u64>,
    pub applied: Option<bool>,
    pub demographic: Demographic,
}

/// Marks a field that appeared in the payload, so an explicit `null` differs from a missing key.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

pub(crate) struct ValidCandidate {
    pub(crate) first_name: String,
    pub(crate) last_name: String,
    pub(crate) email: String,
    pub(crate) phone_number: String,
    pub(crate) source: String,
    pub(crate) staff_contact: String,
    pub(crate) notes: String,
}

impl CandidateForm {
    pub(crate) fn validate(&self) -> Result<ValidCandidate, ValidationErrors> {
        let mut validator = FormValidator::new();
        let first_name = validator.text("first_name", self.first_name.as_deref(), 1, 64);
        let last_name = validator.text("last_name", self.last_name.as_deref(), 1, 64);
        let email = validator.email("email", self.email.as_deref());
        let phone_number = validator.text("phone_number", self.phone_number.as_deref(), 1, 64);
        let source = validator.text("source", self.source.as_deref(), 1, 256);
        let staff_contact = validator.text("staff_contact", self.staff_contact.as_deref(), 1, 64);
        let notes = validator.optional_text("notes", self.notes.as_deref(), 1024);
        validator.finish()?;

        Ok(ValidCandidate {
            first_name,
            last_name,
            email,
            phone_number,
            source,
            staff_contact,
            notes,
        })
    }
}

/// Public "I'm interested" form. Extra answers are folded into the candidate notes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntakeForm {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub demographic: Demographic,
    pub pronouns: Option<String>,
    pub ability: Option<String>,
    pub how_long_philly: Option<String>,
    pub what_neighborhood: Option<String>,
    pub how_did_you_hear: Option<String>,
    pub notes: Option<String>,
}

pub(crate) struct ValidIntake {
    pub(crate) first_name: String,
    pub(crate) last_name: String,
    pub(crate) email: String,
    pub(crate) phone_number: String,
    pub(crate) notes: String,
}

impl IntakeForm {
    pub(crate) fn validate(&self) -> Result<ValidIntake, ValidationErrors> {
        let mut validator = FormValidator::new();
        let first_name = validator.text("first_name", self.first_name.as_deref(), 1, 64);
        let last_name = validator.text("last_name", self.last_name.as_deref(), 1, 64);
        let email = validator.email("email", self.email.as_deref());
        let phone_number = validator.optional_text("phone_number", self.phone_number.as_deref(), 64);
        let address = validator.text("address", self.address.as_deref(), 1, 300);
        let pronouns = validator.text("pronouns", self.pronouns.as_deref(), 1, 64);
        let ability = validator.text("ability", self.ability.as_deref(), 1, 64);
        let how_long =
            validator.text("how_long_philly", self.how_long_philly.as_deref(), 1, 64);
        let neighborhood =
            validator.text("what_neighborhood", self.what_neighborhood.as_deref(), 1, 128);
        let heard = validator.text("how_did_you_hear", self.how_did_you_hear.as_deref(), 1, 128);
        let anything_else = self.notes.as_deref().map(str::trim).unwrap_or_default();
        validator.finish()?;

        let notes = format!(
            "Address: {address}\nPronouns: {pronouns}\nAbility Status: {ability}\nHow long in Philadelphia: {how_long}\nWhat neighborhood: {neighborhood}\nHow they heard about GP: {heard}\nAnything else: {anything_else}"
        );

        Ok(ValidIntake {
            first_name,
            last_name,
            email,
            phone_number,
            notes,
        })
    }
}

/// Used for both direct account creation and invitations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserForm {
    pub role: Option<Role>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
}

pub(crate) struct ValidUser {
    pub(crate) role: Role,
    pub(crate) first_name: String,
    pub(crate) last_name: String,
    pub(crate) email: String,
}

impl UserForm {
    pub(crate) fn validate(&self) -> Result<ValidUser, ValidationErrors> {
        let mut validator = FormValidator::new();
        let role = validator.required("role", self.role);
        let first_name = validator.text("first_name", self.first_name.as_deref(), 1, 64);
        let last_name = validator.text("last_name", self.last_name.as_deref(), 1, 64);
        let email = validator.email("email", self.email.as_deref());
        validator.finish()?;

        Ok(ValidUser {
            role: role.unwrap_or_default(),
            first_name,
            last_name,
            email,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChangeEmailForm {
    pub email: Option<String>,
}

impl ChangeEmailForm {
    pub(crate) fn validate(&self) -> Result<String, ValidationErrors> {
        let mut validator = FormValidator::new();
        let email = validator.email("email", self.email.as_deref());
        validator.finish()?;
        Ok(email)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChangeRoleForm {
    pub role: Option<Role>,
}

impl ChangeRoleForm {
    pub(crate) fn validate(&self) -> Result<Role, ValidationErrors> {
        let mut validator = FormValidator::new();
        let role = validator.required("role", self.role);
        validator.finish()?;
        Ok(role.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, day).expect("valid date")
    }

    #[test]
    fn ask_form_requires_all_three_fields() {
        let errors = AskForm::default().validate().expect_err("empty ask");
        assert!(errors.has_field("date_asking"));
        assert!(errors.has_field("amount_asking_for"));
        assert!(errors.has_field("how_asking"));
    }

    #[test]
    fn declined_pledge_needs_no_amount() {
        let details = PledgeForm {
            pledged: false,
            amount_pledged: Some(40),
            version: None,
        }
        .validate()
        .expect("declined pledge validates");
        assert!(!details.pledged);
        assert_eq!(details.amount_pledged, 0);
    }

    #[test]
    fn pledge_without_amount_is_rejected() {
        let errors = PledgeForm {
            pledged: true,
            amount_pledged: None,
            version: None,
        }
        .validate()
        .expect_err("amount required");
        assert_eq!(errors.fields.len(), 1);
        assert_eq!(errors.fields[0].field, "amount_pledged");
    }

    #[test]
    fn term_form_rejects_inverted_window() {
        let form = TermForm {
            name: Some("Spring".to_string()),
            in_progress: None,
            start_date: Some(date(20)),
            end_date: Some(date(1)),
        };
        let errors = form.validate().err().expect("inverted dates");
        assert!(errors.has_field("end_date"));
    }

    #[test]
    fn candidate_term_distinguishes_missing_from_null() {
        let missing: CandidateForm = serde_json::from_str("{}").expect("empty form");
        assert_eq!(missing.term_id, None);

        let cleared: CandidateForm =
            serde_json::from_str(r#"{"term_id": null}"#).expect("null term");
        assert_eq!(cleared.term_id, Some(None));

        let assigned: CandidateForm =
            serde_json::from_str(r#"{"term_id": 7}"#).expect("numeric term");
        assert_eq!(assigned.term_id, Some(Some(TermId(7))));
    }

    #[test]
    fn intake_notes_collect_extra_answers() {
        let form = IntakeForm {
            first_name: Some("Rosa".to_string()),
            last_name: Some("Parks".to_string()),
            email: Some("rosa@example.org".to_string()),
            address: Some("12 Pine St".to_string()),
            pronouns: Some("she/her".to_string()),
            ability: Some("none".to_string()),
            how_long_philly: Some("4 years".to_string()),
            what_neighborhood: Some("Fishtown".to_string()),
            how_did_you_hear: Some("a friend".to_string()),
            ..IntakeForm::default()
        };
        let intake = form.validate().ok().expect("intake validates");
        assert!(intake.notes.starts_with("Address: 12 Pine St\nPronouns: she/her"));
        assert!(intake.notes.ends_with("Anything else: "));
        assert!(intake.phone_number.is_empty());
    }
}
