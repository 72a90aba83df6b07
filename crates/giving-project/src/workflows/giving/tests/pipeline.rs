use super::common::*;
use crate::workflows::giving::domain::{DonorId, DonorStatus};
use crate::workflows::giving::error::GivingError;
use crate::workflows::giving::forms::DonorForm;
use crate::workflows::giving::pipeline::{PipelineAction, TransitionError};
use crate::workflows::giving::repository::DonorRepository;

#[test]
fn full_pipeline_keeps_every_stage_field() {
    let fixture = fixture();
    let pipeline = &fixture.project.pipeline;
    let owner = fixture.participant;

    let created = pipeline
        .create(&owner, donor_form("Carmen"))
        .expect("donor created");
    assert_eq!(created.donor.status, DonorStatus::Todo);
    assert_eq!(created.donor.user_id, owner.user_id);
    assert_eq!(created.message, "Donor Carmen Donor successfully created");
    let id = created.donor.id;

    let asked = pipeline
        .record_ask(&owner, id, ask_form(500))
        .expect("ask recorded");
    assert_eq!(asked.donor.status, DonorStatus::Asking);
    assert_eq!(asked.message, "Donor Carmen Donor moved to ASKING");

    let pledged = pipeline
        .record_pledge(&owner, id, pledge_form(Some(400)))
        .expect("pledge recorded");
    assert_eq!(pledged.donor.status, DonorStatus::Pledged);

    let completed = pipeline
        .record_completion(&fixture.admin, id, completion_form(350))
        .expect("completion recorded");
    assert_eq!(completed.message, "Donor Carmen Donor moved to COMPLETED");

    let stored = fixture
        .store
        .fetch_donor(id)
        .expect("fetch succeeds")
        .expect("donor present");
    assert_eq!(stored.status, DonorStatus::Completed);
    assert_eq!(stored.amount_asking_for(), 500);
    assert_eq!(stored.amount_pledged(), 400);
    assert_eq!(stored.amount_received(), 350);
    assert_eq!(stored.date_received(), Some(date(2025, 4, 15)));
    let ask = stored.ask.expect("ask details kept");
    assert_eq!(ask.date_asking, date(2025, 3, 1));
    assert_eq!(ask.how_asking, "Coffee at Reading Terminal");
}

#[test]
fn completion_from_todo_is_a_precondition_error() {
    let fixture = fixture();
    let pipeline = &fixture.project.pipeline;
    let donor = pipeline
        .create(&fixture.participant, donor_form("Dee"))
        .expect("donor created")
        .donor;

    match pipeline.record_completion(&fixture.admin, donor.id, completion_form(100)) {
        Err(GivingError::Transition(TransitionError::InvalidState {
            action,
            from,
            required,
        })) => {
            assert_eq!(action, PipelineAction::RecordCompletion);
            assert_eq!(from, DonorStatus::Todo);
            assert_eq!(required, DonorStatus::Pledged);
        }
        other => panic!("expected transition error, got {other:?}"),
    }

    let stored = fixture
        .store
        .fetch_donor(donor.id)
        .expect("fetch succeeds")
        .expect("donor present");
    assert_eq!(stored.status, DonorStatus::Todo);
    assert!(stored.receipt.is_none());
}

#[test]
fn stages_cannot_be_skipped_or_repeated() {
    let fixture = fixture();
    let pipeline = &fixture.project.pipeline;
    let owner = fixture.participant;
    let donor = pipeline
        .create(&owner, donor_form("Eli"))
        .expect("donor created")
        .donor;

    let skipped = pipeline.record_pledge(&owner, donor.id, pledge_form(Some(10)));
    assert!(matches!(skipped, Err(GivingError::Transition(_))));

    pipeline
        .record_ask(&owner, donor.id, ask_form(10))
        .expect("ask recorded");
    let repeated = pipeline.record_ask(&owner, donor.id, ask_form(20));
    assert!(matches!(repeated, Err(GivingError::Transition(_))));
}

#[test]
fn declined_pledge_needs_no_amount_and_stores_zero() {
    let fixture = fixture();
    let pipeline = &fixture.project.pipeline;
    let owner = fixture.participant;
    let donor = pipeline
        .create(&owner, donor_form("Fay"))
        .expect("donor created")
        .donor;
    pipeline
        .record_ask(&owner, donor.id, ask_form(250))
        .expect("ask recorded");

    let receipt = pipeline
        .record_pledge(&owner, donor.id, pledge_form(None))
        .expect("declined pledge accepted");
    assert_eq!(receipt.donor.status, DonorStatus::Pledged);
    assert_eq!(receipt.donor.amount_pledged(), 0);
    assert_eq!(receipt.donor.pledge.map(|pledge| pledge.pledged), Some(false));
}

#[test]
fn confirmed_pledge_without_amount_fails_validation() {
    let fixture = fixture();
    let pipeline = &fixture.project.pipeline;
    let owner = fixture.participant;
    let donor = pipeline
        .create(&owner, donor_form("Gus"))
        .expect("donor created")
        .donor;
    pipeline
        .record_ask(&owner, donor.id, ask_form(250))
        .expect("ask recorded");

    let mut form = pledge_form(None);
    form.pledged = true;
    match pipeline.record_pledge(&owner, donor.id, form) {
        Err(GivingError::Validation(errors)) => {
            assert!(errors.has_field("amount_pledged"));
        }
        other => panic!("expected validation error, got {other:?}"),
    }

    let stored = fixture
        .store
        .fetch_donor(donor.id)
        .expect("fetch succeeds")
        .expect("donor present");
    assert_eq!(stored.status, DonorStatus::Asking);
}

#[test]
fn participants_cannot_certify_completion() {
    let fixture = fixture();
    let pipeline = &fixture.project.pipeline;
    let owner = fixture.participant;
    let donor = pipeline
        .create(&owner, donor_form("Hal"))
        .expect("donor created")
        .donor;
    pipeline
        .record_ask(&owner, donor.id, ask_form(90))
        .expect("ask recorded");
    pipeline
        .record_pledge(&owner, donor.id, pledge_form(Some(90)))
        .expect("pledge recorded");

    let result = pipeline.record_completion(&owner, donor.id, completion_form(90));
    assert!(matches!(result, Err(GivingError::PermissionDenied(_))));
}

#[test]
fn receipts_offer_only_the_next_step_the_actor_may_take() {
    let fixture = fixture();
    let pipeline = &fixture.project.pipeline;
    let owner = fixture.participant;

    let created = pipeline
        .create(&owner, donor_form("Ines"))
        .expect("donor created");
    assert_eq!(created.next_actions, vec![PipelineAction::RecordAsk]);
    let id = created.donor.id;

    pipeline
        .record_ask(&owner, id, ask_form(75))
        .expect("ask recorded");
    let pledged = pipeline
        .record_pledge(&owner, id, pledge_form(Some(75)))
        .expect("pledge recorded");
    assert!(pledged.next_actions.is_empty());

    let edited = pipeline
        .edit(&fixture.admin, id, donor_form("Ines"))
        .expect("admin edit");
    assert_eq!(edited.next_actions, vec![PipelineAction::RecordCompletion]);

    let completed = pipeline
        .record_completion(&fixture.admin, id, completion_form(75))
        .expect("completion recorded");
    assert!(completed.next_actions.is_empty());
}

#[test]
fn non_owner_cannot_delete_and_record_is_unchanged() {
    let fixture = fixture();
    let pipeline = &fixture.project.pipeline;
    let donor = pipeline
        .create(&fixture.participant, donor_form("Ida"))
        .expect("donor created")
        .donor;

    let result = pipeline.delete(&fixture.other, donor.id);
    assert!(matches!(result, Err(GivingError::PermissionDenied(_))));

    let stored = fixture
        .store
        .fetch_donor(donor.id)
        .expect("fetch succeeds")
        .expect("donor still present");
    assert_eq!(stored, donor);
}

#[test]
fn owner_and_admin_may_delete_in_any_state() {
    let fixture = fixture();
    let pipeline = &fixture.project.pipeline;
    let owner = fixture.participant;

    let fresh = pipeline
        .create(&owner, donor_form("Jo"))
        .expect("donor created")
        .donor;
    let message = pipeline.delete(&owner, fresh.id).expect("owner deletes");
    assert_eq!(message, "Successfully deleted donor Jo Donor.");

    let finished = completed_donor(&fixture, &owner, "Kai", 75);
    pipeline
        .delete(&fixture.admin, finished.id)
        .expect("admin deletes completed donor");

    assert!(fixture
        .store
        .donors_for_owner(owner.user_id)
        .expect("query succeeds")
        .is_empty());
}

#[test]
fn stale_version_is_a_conflict_and_leaves_the_donor_alone() {
    let fixture = fixture();
    let pipeline = &fixture.project.pipeline;
    let owner = fixture.participant;
    let donor = pipeline
        .create(&owner, donor_form("Lu"))
        .expect("donor created")
        .donor;

    let mut edit = donor_form("Luisa");
    edit.version = Some(donor.version);
    let edited = pipeline
        .edit(&owner, donor.id, edit)
        .expect("edit on current version");
    assert_eq!(edited.donor.version, donor.version + 1);

    let mut ask = ask_form(60);
    ask.version = Some(donor.version);
    match pipeline.record_ask(&owner, donor.id, ask) {
        Err(GivingError::Conflict(message)) => assert!(message.contains("changed since")),
        other => panic!("expected conflict, got {other:?}"),
    }

    let stored = fixture
        .store
        .fetch_donor(donor.id)
        .expect("fetch succeeds")
        .expect("donor present");
    assert_eq!(stored, edited.donor);
}

#[test]
fn edit_never_touches_pipeline_fields() {
    let fixture = fixture();
    let pipeline = &fixture.project.pipeline;
    let owner = fixture.participant;
    let donor = pipeline
        .create(&owner, donor_form("Mo"))
        .expect("donor created")
        .donor;
    pipeline
        .record_ask(&owner, donor.id, ask_form(300))
        .expect("ask recorded");

    let mut form = donor_form("Mo");
    form.city = Some("Camden".to_string());
    let edited = pipeline
        .edit(&owner, donor.id, form)
        .expect("edit succeeds")
        .donor;

    assert_eq!(edited.status, DonorStatus::Asking);
    assert_eq!(edited.amount_asking_for(), 300);
    assert_eq!(edited.profile.city, "Camden");
}

#[test]
fn create_reports_every_missing_field() {
    let fixture = fixture();
    match fixture
        .project
        .pipeline
        .create(&fixture.participant, DonorForm::default())
    {
        Err(GivingError::Validation(errors)) => {
            for field in ["first_name", "last_name", "email", "contact_date", "zipcode"] {
                assert!(errors.has_field(field), "missing error for {field}");
            }
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn listing_is_scoped_to_the_owner_unless_admin() {
    let fixture = fixture();
    let pipeline = &fixture.project.pipeline;
    pipeline
        .create(&fixture.participant, donor_form("Nia"))
        .expect("donor created");
    pipeline
        .create(&fixture.other, donor_form("Oz"))
        .expect("donor created");

    let own = pipeline.list_own(&fixture.participant).expect("own list");
    assert_eq!(own.len(), 1);
    assert_eq!(own[0].profile.first_name, "Nia");

    assert!(matches!(
        pipeline.list_all(&fixture.participant, None),
        Err(GivingError::PermissionDenied(_))
    ));
    assert_eq!(pipeline.list_all(&fixture.admin, None).expect("all").len(), 2);
}

#[test]
fn admin_listing_can_narrow_to_one_stage() {
    let fixture = fixture();
    let pipeline = &fixture.project.pipeline;
    completed_donor(&fixture, &fixture.participant, "Pia", 40);
    let asking = pipeline
        .create(&fixture.other, donor_form("Quin"))
        .expect("donor created")
        .donor;
    pipeline
        .record_ask(&fixture.other, asking.id, ask_form(75))
        .expect("ask recorded");
    pipeline
        .create(&fixture.other, donor_form("Rex"))
        .expect("donor created");

    let in_asking = pipeline
        .list_all(&fixture.admin, Some(DonorStatus::Asking))
        .expect("filtered list");
    assert_eq!(in_asking.len(), 1);
    assert_eq!(in_asking[0].id, asking.id);
    assert!(pipeline
        .list_all(&fixture.admin, Some(DonorStatus::Pledged))
        .expect("filtered list")
        .is_empty());
    assert_eq!(pipeline.list_all(&fixture.admin, None).expect("all").len(), 3);
}

#[test]
fn missing_donor_is_not_found() {
    let fixture = fixture();
    let result = fixture
        .project
        .pipeline
        .get(&fixture.admin, DonorId(9_999));
    assert!(matches!(
        result,
        Err(GivingError::NotFound {
            entity: "donor",
            id: 9_999
        })
    ));
}
