use crate::infra::{parse_date, seed_administrator};
use chrono::{Duration, Local, NaiveDate};
use clap::Args;
use giving_project::config::NotificationConfig;
use giving_project::error::AppError;
use giving_project::workflows::giving::{
    Actor, AskForm, CandidateForm, CandidateStatus, ChannelNotificationQueue, CompletionForm,
    DemographicCategory, Demographic, DonorForm, Gender, GivingProject, InMemoryGivingStore,
    IntakeForm, PledgeForm, Race, Role, TermForm, TermReport, UserForm,
};
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Reporting date (YYYY-MM-DD). The demo term is centred on it. Defaults to today.
    #[arg(long, value_parser = parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Name given to the seeded term.
    #[arg(long, default_value = "Demo Cohort")]
    pub(crate) term_name: String,
    /// Print the term report as JSON instead of a table.
    #[arg(long)]
    pub(crate) json: bool,
}

type DemoProject = GivingProject<InMemoryGivingStore, ChannelNotificationQueue>;

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        today,
        term_name,
        json,
    } = args;
    let today = today.unwrap_or_else(|| Local::now().date_naive());

    let store = Arc::new(InMemoryGivingStore::new());
    let admin = seed_administrator(&store, "staff@givingproject.org")?.actor();
    let (queue, mut outbox) = ChannelNotificationQueue::channel();
    let project = GivingProject::new(
        store,
        Arc::new(queue),
        NotificationConfig {
            alert_recipient: Some("staff@givingproject.org".to_string()),
            ..NotificationConfig::default()
        },
    );

    println!("Giving Project demo");
    let term = project.cohort.create_term(
        &admin,
        TermForm {
            name: Some(term_name),
            in_progress: Some(true),
            start_date: Some(today - Duration::days(30)),
            end_date: Some(today + Duration::days(60)),
        },
    )?;
    println!(
        "- Term {} ({} to {})",
        term.name, term.start_date, term.end_date
    );

    let participant = enroll_participant(&project, &admin)?;
    println!("- Participant account {} linked to intake record", participant.user_id);

    let pipeline = &project.pipeline;
    for (first_name, ask, pledge, received) in [
        ("Ruth", 500, Some(400), Some(400)),
        ("Sid", 250, Some(250), None),
        ("Tomas", 300, None, None),
    ] {
        let mut receipt = pipeline.create(&participant, donor_form(first_name, today))?;
        let donor_id = receipt.donor.id;
        println!("  {}", receipt.message);

        receipt = pipeline.record_ask(
            &participant,
            donor_id,
            AskForm {
                date_asking: Some(today),
                amount_asking_for: Some(ask),
                how_asking: Some("One-on-one conversation".to_string()),
                version: Some(receipt.donor.version),
            },
        )?;
        println!("  {}", receipt.message);

        receipt = pipeline.record_pledge(
            &participant,
            donor_id,
            PledgeForm {
                pledged: pledge.is_some(),
                amount_pledged: pledge,
                version: Some(receipt.donor.version),
            },
        )?;
        println!("  {} (pledged ${})", receipt.message, receipt.donor.amount_pledged());

        if let Some(amount) = received {
            receipt = pipeline.record_completion(
                &admin,
                donor_id,
                CompletionForm {
                    amount_received: Some(amount),
                    date_received: Some(today),
                    version: Some(receipt.donor.version),
                },
            )?;
            println!("  {} (received ${})", receipt.message, amount);
        }
    }

    let mine = project
        .stats
        .participant_stats(&participant, participant.user_id)?;
    println!(
        "- Participant pipeline: {} todo | {} asking | {} pledged | {} completed | ${} received",
        mine.todo, mine.asking, mine.pledged, mine.completed, mine.total_received
    );

    let report = project.stats.term_report(&admin, Some(term.id))?;
    if json {
        match serde_json::to_string_pretty(&report) {
            Ok(body) => println!("{body}"),
            Err(err) => println!("  Term report unavailable: {err}"),
        }
    } else {
        render_term_report(&report);
    }

    println!("- Queued notifications:");
    while let Ok(job) = outbox.try_recv() {
        println!("    - {} -> {} ({})", job.template, job.recipient, job.subject);
    }

    Ok(())
}

fn enroll_participant(project: &DemoProject, admin: &Actor) -> Result<Actor, AppError> {
    let demographic = Demographic {
        race: Race::Latinx,
        gender: Gender::Woman,
        age: 34,
        ..Demographic::default()
    };
    let candidate = project.cohort.submit_intake(IntakeForm {
        first_name: Some("Noor".to_string()),
        last_name: Some("Haddad".to_string()),
        email: Some("noor@example.net".to_string()),
        address: Some("44 Girard Ave".to_string()),
        demographic,
        pronouns: Some("she/her".to_string()),
        ability: Some("n/a".to_string()),
        how_long_philly: Some("10 years".to_string()),
        what_neighborhood: Some("Fairmount".to_string()),
        how_did_you_hear: Some("A past participant".to_string()),
        ..IntakeForm::default()
    })?;

    project.cohort.update_candidate(
        admin,
        candidate.id,
        CandidateForm {
            first_name: Some(candidate.first_name.clone()),
            last_name: Some(candidate.last_name.clone()),
            email: Some(candidate.email.clone()),
            phone_number: Some("215-555-0177".to_string()),
            source: Some(candidate.source.clone()),
            staff_contact: Some("Giving Project Staff".to_string()),
            notes: Some(candidate.notes.clone()),
            status: Some(CandidateStatus::Assigned),
            term_id: Some(candidate.term_id),
            amount_donated: Some(150),
            applied: Some(true),
            demographic,
        },
    )?;

    let account = project.cohort.invite_user(
        admin,
        UserForm {
            role: Some(Role::Participant),
            first_name: Some(candidate.first_name),
            last_name: Some(candidate.last_name),
            email: Some(candidate.email),
        },
    )?;
    let account = project
        .cohort
        .link_candidate(admin, account.id, Some(candidate.id))?;
    Ok(account.actor())
}

fn donor_form(first_name: &str, today: NaiveDate) -> DonorForm {
    DonorForm {
        first_name: Some(first_name.to_string()),
        last_name: Some("Walsh".to_string()),
        email: Some(format!("{}@donors.example", first_name.to_ascii_lowercase())),
        phone_number: Some("215-555-0101".to_string()),
        contact_date: Some(today),
        street_address: Some("1500 Walnut St".to_string()),
        city: Some("Philadelphia".to_string()),
        state: Some("PA".to_string()),
        zipcode: Some("19102".to_string()),
        interested_in_future_gp: true,
        ..DonorForm::default()
    }
}

fn render_term_report(report: &TermReport) {
    let cohort = &report.cohort;
    println!(
        "- Cohort: {} candidates | ${} donated | {} donors | ${} received | {} pledged",
        cohort.candidate_count,
        cohort.amount_donated,
        cohort.donor_count,
        cohort.amount_received,
        cohort.pledged_count
    );
    render_counts("Race", &report.race);
    render_counts("Class", &report.soc_class);
    render_counts("Gender", &report.gender);
    render_counts("Sexual orientation", &report.sexual_orientation);
}

fn render_counts<T: DemographicCategory>(title: &str, counts: &BTreeMap<T, usize>) {
    let cells: Vec<String> = counts
        .iter()
        .map(|(value, count)| format!("{} {}", value.label(), count))
        .collect();
    println!("  {title}: {}", cells.join(" | "));
}
