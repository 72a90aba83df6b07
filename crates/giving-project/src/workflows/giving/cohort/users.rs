use std::collections::BTreeMap;

use tracing::info;

use super::{require_admin, CohortService};
use crate::workflows::giving::domain::{Actor, CandidateId, User, UserId};
use crate::workflows::giving::error::GivingError;
use crate::workflows::giving::forms::{ChangeEmailForm, ChangeRoleForm, UserForm};
use crate::workflows::giving::notifications::{
    dispatch, NotificationJob, NotificationQueue, INVITE_TEMPLATE,
};
use crate::workflows::giving::repository::GivingStore;
use crate::workflows::giving::validation::ValidationErrors;

const EMAIL_TAKEN: &str = "Email already registered.";

impl<S, N> CohortService<S, N>
where
    S: GivingStore + 'static,
    N: NotificationQueue + 'static,
{
    pub fn users(&self, actor: &Actor) -> Result<Vec<User>, GivingError> {
        require_admin(actor, "list accounts")?;
        let mut users = self.store.users()?;
        users.sort_by(|a, b| {
            a.last_name
                .cmp(&b.last_name)
                .then_with(|| a.first_name.cmp(&b.first_name))
        });
        Ok(users)
    }

    pub fn create_user(&self, actor: &Actor, form: UserForm) -> Result<User, GivingError> {
        require_admin(actor, "create accounts")?;
        let user = self.insert_account(form)?;
        info!(user_id = %user.id, role = user.role.label(), "account created");
        Ok(user)
    }

    /// Creates the account and queues an invitation e-mail carrying the join link.
    pub fn invite_user(&self, actor: &Actor, form: UserForm) -> Result<User, GivingError> {
        require_admin(actor, "invite accounts")?;
        let user = self.insert_account(form)?;

        let inviter = self
            .store
            .fetch_user(actor.user_id)?
            .map(|inviter| inviter.full_name())
            .unwrap_or_default();
        let mut context = BTreeMap::new();
        context.insert("user_name".to_string(), user.full_name());
        context.insert("inviter_name".to_string(), inviter);
        context.insert("invite_link".to_string(), self.invite_link(user.id));
        dispatch(
            self.notifications.as_ref(),
            NotificationJob {
                recipient: user.email.clone(),
                subject: "You Are Invited To Join".to_string(),
                template: INVITE_TEMPLATE.to_string(),
                context,
            },
        );

        info!(user_id = %user.id, "invitation queued");
        Ok(user)
    }

    pub fn change_role(
        &self,
        actor: &Actor,
        user_id: UserId,
        form: ChangeRoleForm,
    ) -> Result<User, GivingError> {
        require_admin(actor, "change account roles")?;
        if actor.user_id == user_id {
            return Err(GivingError::denied("administrators cannot change their own role"));
        }
        let role = form.validate()?;
        let mut user = self.existing_user(user_id)?;
        user.role = role;
        self.store.update_user(user.clone())?;
        info!(user_id = %user_id, role = role.label(), "account role changed");
        Ok(user)
    }

    /// Users may change their own address; administrators may change anyone's.
    pub fn change_email(
        &self,
        actor: &Actor,
        user_id: UserId,
        form: ChangeEmailForm,
    ) -> Result<User, GivingError> {
        if !actor.may_act_for(user_id) {
            return Err(GivingError::denied("cannot change another user's email"));
        }
        let email = form.validate()?;
        let mut user = self.existing_user(user_id)?;
        if let Some(existing) = self.store.find_user_by_email(&email)? {
            if existing.id != user_id {
                return Err(ValidationErrors::single("email", EMAIL_TAKEN).into());
            }
        }
        user.email = email;
        self.store.update_user(user.clone())?;
        info!(user_id = %user_id, "account email changed");
        Ok(user)
    }

    pub fn delete_user(&self, actor: &Actor, user_id: UserId) -> Result<(), GivingError> {
        require_admin(actor, "delete accounts")?;
        if actor.user_id == user_id {
            return Err(GivingError::denied("administrators cannot delete themselves"));
        }
        let user = self.existing_user(user_id)?;
        self.store.delete_user(user_id)?;
        info!(user_id = %user_id, name = %user.full_name(), "account deleted");
        Ok(())
    }

    /// Ties a participant account to the candidate record it was recruited from.
    pub fn link_candidate(
        &self,
        actor: &Actor,
        user_id: UserId,
        candidate_id: Option<CandidateId>,
    ) -> Result<User, GivingError> {
        require_admin(actor, "link candidates to accounts")?;
        let mut user = self.existing_user(user_id)?;
        if let Some(id) = candidate_id {
            if self.store.fetch_candidate(id)?.is_none() {
                return Err(GivingError::not_found(CandidateId::ENTITY, id.0));
            }
        }
        user.candidate_id = candidate_id;
        self.store.update_user(user.clone())?;
        Ok(user)
    }

    fn insert_account(&self, form: UserForm) -> Result<User, GivingError> {
        let valid = form.validate()?;
        if self.store.find_user_by_email(&valid.email)?.is_some() {
            return Err(ValidationErrors::single("email", EMAIL_TAKEN).into());
        }
        Ok(self.store.insert_user(User {
            id: UserId(0),
            first_name: valid.first_name,
            last_name: valid.last_name,
            email: valid.email,
            role: valid.role,
            candidate_id: None,
        })?)
    }

    fn existing_user(&self, user_id: UserId) -> Result<User, GivingError> {
        self.store
            .fetch_user(user_id)?
            .ok_or(GivingError::not_found(UserId::ENTITY, user_id.0))
    }

    fn invite_link(&self, user_id: UserId) -> String {
        format!(
            "{}/account/join-from-invite/{}",
            self.settings.public_url.trim_end_matches('/'),
            user_id
        )
    }
}

