//! Flat CSV exports of candidates and donors.
//!
//! Text cells are always wrapped in double quotes with embedded quotes doubled. Numbers and
//! booleans are written bare.

use std::collections::HashMap;

use chrono::NaiveDate;

use super::domain::{
    Candidate, DemographicCategory, Demographic, Donor, Term, TermId, User, UserId,
};

pub const CANDIDATE_HEADER: [&str; 16] = [
    "First Name",
    "Last Name",
    "Term",
    "Email",
    "Phone",
    "Source",
    "Staff Contact",
    "Notes",
    "Status",
    "Amount Donated",
    "Applied",
    "Age",
    "Race",
    "Class",
    "Gender",
    "Sexual Orientation",
];

pub const DONOR_HEADER: [&str; 24] = [
    "First Name",
    "Last Name",
    "Participant",
    "Email",
    "Phone",
    "Contact Date",
    "Street Address",
    "City",
    "State",
    "Zipcode",
    "Status",
    "Amount Asking For",
    "Amount Pledged",
    "Amount Received",
    "Date Received",
    "Interested In Future GP",
    "Want To Learn About BRF Guarantees",
    "Interested In Volunteering",
    "Notes",
    "Age",
    "Race",
    "Class",
    "Gender",
    "Sexual Orientation",
];

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error("failed to flush csv output: {0}")]
    Flush(String),
    #[error(transparent)]
    Encoding(#[from] std::string::FromUtf8Error),
}

pub fn candidates_csv(candidates: &[Candidate], terms: &[Term]) -> Result<String, ExportError> {
    let term_names: HashMap<TermId, &str> = terms
        .iter()
        .map(|term| (term.id, term.name.as_str()))
        .collect();

    let mut writer = raw_writer();
    writer.write_record(CANDIDATE_HEADER)?;
    for candidate in candidates {
        let term = candidate
            .term_id
            .and_then(|id| term_names.get(&id).copied())
            .unwrap_or_default();
        let mut row = vec![
            quoted(&candidate.first_name),
            quoted(&candidate.last_name),
            quoted(term),
            quoted(&candidate.email),
            quoted(&candidate.phone_number),
            quoted(&candidate.source),
            quoted(&candidate.staff_contact),
            quoted(&candidate.notes),
            quoted(candidate.status.label()),
            candidate.amount_donated.to_string(),
            candidate.applied.to_string(),
        ];
        row.extend(demographic_cells(Some(&candidate.demographic)));
        writer.write_record(&row)?;
    }
    finish(writer)
}

pub fn donors_csv(donors: &[Donor], users: &[User]) -> Result<String, ExportError> {
    let owners: HashMap<UserId, String> = users
        .iter()
        .map(|user| (user.id, user.full_name()))
        .collect();

    let mut writer = raw_writer();
    writer.write_record(DONOR_HEADER)?;
    for donor in donors {
        let profile = &donor.profile;
        let participant = owners
            .get(&donor.user_id)
            .map(String::as_str)
            .unwrap_or_default();
        let mut row = vec![
            quoted(&profile.first_name),
            quoted(&profile.last_name),
            quoted(participant),
            quoted(&profile.email),
            quoted(&profile.phone_number),
            quoted(&date_cell(profile.contact_date)),
            quoted(&profile.street_address),
            quoted(&profile.city),
            quoted(&profile.state),
            quoted(&profile.zipcode),
            quoted(donor.status.label()),
            donor.amount_asking_for().to_string(),
            donor.amount_pledged().to_string(),
            donor.amount_received().to_string(),
            quoted(&date_cell(donor.date_received())),
            profile.interested_in_future_gp.to_string(),
            profile.want_to_learn_about_brf_guarantees.to_string(),
            profile.interested_in_volunteering.to_string(),
            quoted(&profile.notes),
        ];
        row.extend(demographic_cells(donor.demographic.as_ref()));
        writer.write_record(&row)?;
    }
    finish(writer)
}

fn raw_writer() -> csv::Writer<Vec<u8>> {
    // Text cells are quoted by hand; `NonNumeric` would also quote the boolean columns.
    csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Never)
        .from_writer(Vec::new())
}

fn finish(writer: csv::Writer<Vec<u8>>) -> Result<String, ExportError> {
    let bytes = writer
        .into_inner()
        .map_err(|err| ExportError::Flush(err.to_string()))?;
    Ok(String::from_utf8(bytes)?)
}

fn quoted(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

fn date_cell(date: Option<NaiveDate>) -> String {
    date.map(|date| date.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

fn demographic_cells(demographic: Option<&Demographic>) -> [String; 5] {
    let demographic = demographic.copied().unwrap_or_default();
    [
        demographic.age.to_string(),
        quoted(demographic.race.label()),
        quoted(demographic.soc_class.label()),
        quoted(demographic.gender.label()),
        quoted(demographic.sexual_orientation.label()),
    ]
}
