//! The three newsletter signup flows. Each one writes to its own subscriber
//! list and has its own validation and duplicate rules.

use db::models::subscriber::{Subscriber, SubscriberList};
use once_cell::sync::Lazy;
use regex::Regex;
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{info, warn};

static LOOSE_EMAIL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());
static STRICT_EMAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap());

#[derive(Debug, Error)]
pub enum NewsletterError {
    #[error("invalid email address")]
    InvalidEmail,
    #[error("email is required")]
    MissingEmail,
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignupOutcome {
    Subscribed,
    AlreadySubscribed,
}

#[derive(Clone)]
pub struct NewsletterService {
    pool: SqlitePool,
}

impl NewsletterService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Footer signup. Duplicates are matched ignoring case and surrounding
    /// whitespace.
    pub async fn subscribe(&self, email: Option<&str>) -> Result<SignupOutcome, NewsletterError> {
        let email = email
            .filter(|email| LOOSE_EMAIL.is_match(email))
            .ok_or(NewsletterError::InvalidEmail)?;

        self.append_unless_listed(SubscriberList::Website, email).await
    }

    /// Newsletter section signup. Stricter address check; a duplicate is
    /// reported the same way as a new signup.
    pub async fn join(&self, email: Option<&str>) -> Result<SignupOutcome, NewsletterError> {
        let email = email
            .filter(|email| STRICT_EMAIL.is_match(email))
            .ok_or(NewsletterError::InvalidEmail)?;

        self.append_unless_listed(SubscriberList::Newsletter, email).await
    }

    /// ToolCurator list signup. Any non-empty value is accepted and
    /// duplicates are matched exactly.
    pub async fn subscribe_toolcurator(
        &self,
        email: Option<&str>,
    ) -> Result<SignupOutcome, NewsletterError> {
        let email = email
            .filter(|email| !email.is_empty())
            .ok_or(NewsletterError::MissingEmail)?;

        let list = SubscriberList::Toolcurator;
        if Subscriber::find_by_email(&self.pool, list, email).await?.is_some() {
            info!(email, "Email already subscribed");
            return Ok(SignupOutcome::AlreadySubscribed);
        }

        let subscriber = Subscriber::create(&self.pool, list, email).await?;
        info!(email, at = %subscriber.created_at.to_rfc3339(), "Stored subscription");
        Ok(SignupOutcome::Subscribed)
    }

    async fn append_unless_listed(
        &self,
        list: SubscriberList,
        email: &str,
    ) -> Result<SignupOutcome, NewsletterError> {
        match self.is_listed(list, email).await {
            Ok(true) => {
                info!(%list, email, "Email already on the list");
                return Ok(SignupOutcome::AlreadySubscribed);
            }
            Ok(false) => {}
            Err(e) => warn!(%list, error = %e, "Could not check for duplicate emails"),
        }

        Subscriber::create(&self.pool, list, email).await?;
        info!(%list, email, "Subscribed");
        Ok(SignupOutcome::Subscribed)
    }

    async fn is_listed(&self, list: SubscriberList, email: &str) -> Result<bool, sqlx::Error> {
        let wanted = normalize(email);
        let emails = Subscriber::emails(&self.pool, list).await?;
        Ok(emails.iter().any(|existing| normalize(existing) == wanted))
    }
}

fn normalize(email: &str) -> String {
    email.trim().to_lowercase()
}
