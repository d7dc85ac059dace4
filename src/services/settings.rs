//! Process-wide settings: fetched once, broadcast after every successful save.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tokio::sync::{Mutex, watch};

use crate::domain::settings::{Settings, SettingsSection, Theme};
use crate::forms::settings::{EmailSettingsForm, GeneralSettingsForm, NotificationSettingsForm};
use crate::repository::errors::ApiError;
use crate::repository::{SettingsReader, SettingsWriter};
use crate::services::ServiceResult;

/// Shared settings with an explicit lifecycle.
///
/// Subscribers see `None` until [`init`](Self::init) completes and a new
/// snapshot after each successful update. Failed saves broadcast nothing.
pub struct SettingsStore<A: ?Sized> {
    api: Arc<A>,
    tx: watch::Sender<Option<Arc<Settings>>>,
    init_lock: Mutex<()>,
}

impl<A> SettingsStore<A>
where
    A: SettingsReader + SettingsWriter + ?Sized,
{
    pub fn new(api: Arc<A>) -> Self {
        let (tx, _) = watch::channel(None);
        Self {
            api,
            tx,
            init_lock: Mutex::new(()),
        }
    }

    /// Fetches settings on first use; later calls return the held snapshot.
    pub async fn init(&self) -> ServiceResult<Arc<Settings>> {
        let _guard = self.init_lock.lock().await;
        if let Some(settings) = self.current() {
            return Ok(settings);
        }

        let settings = self.api.fetch_settings().await.map_err(|err| {
            log::error!("Failed to load settings: {err}");
            err
        })?;
        let settings = Arc::new(settings);
        self.tx.send_replace(Some(Arc::clone(&settings)));
        log::info!("Settings loaded");
        Ok(settings)
    }

    /// Drops the held snapshot and fetches again.
    pub async fn reload(&self) -> ServiceResult<Arc<Settings>> {
        self.tx.send_replace(None);
        self.init().await
    }

    pub fn current(&self) -> Option<Arc<Settings>> {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Arc<Settings>>> {
        self.tx.subscribe()
    }

    /// Theme of the held settings, or the default before init.
    pub fn theme(&self) -> Theme {
        self.current()
            .map(|settings| settings.theme())
            .unwrap_or_default()
    }

    pub async fn update_general(&self, form: GeneralSettingsForm) -> ServiceResult<Arc<Settings>> {
        let form = form.check()?;
        self.save(SettingsSection::General, &form, |settings| {
            form.apply(&mut settings.general)
        })
        .await
    }

    pub async fn update_email(&self, form: EmailSettingsForm) -> ServiceResult<Arc<Settings>> {
        let form = form.check()?;
        self.save(SettingsSection::Email, &form, |settings| {
            form.apply(&mut settings.email)
        })
        .await
    }

    pub async fn update_notifications(
        &self,
        form: NotificationSettingsForm,
    ) -> ServiceResult<Arc<Settings>> {
        let form = form.check()?;
        self.save(SettingsSection::Notifications, &form, |settings| {
            form.apply(&mut settings.notifications)
        })
        .await
    }

    async fn save<B, F>(&self, section: SettingsSection, body: &B, apply: F) -> ServiceResult<Arc<Settings>>
    where
        B: Serialize,
        F: FnOnce(&mut Settings),
    {
        self.init().await?;

        let body = serde_json::to_value(body).map_err(|err| ApiError::Decode(err.to_string()))?;
        if body.as_object().is_some_and(|fields| fields.is_empty()) {
            return self.init().await;
        }

        self.api.save_settings(section, &body).await.map_err(|err| {
            log::error!("Failed to save {} settings: {err}", section.path());
            err
        })?;

        let mut updated = None;
        self.tx.send_modify(|current| {
            let mut next = current.as_deref().cloned().unwrap_or_default();
            apply(&mut next);
            let next = Arc::new(next);
            updated = Some(Arc::clone(&next));
            *current = Some(next);
        });
        log::info!("Saved {} settings", section.path());

        match updated {
            Some(settings) => Ok(settings),
            None => Ok(self.init().await?),
        }
    }
}

/// Keeps only the fields the backend reports as updated, e.g. to show a
/// confirmation.
pub fn updated_fields(reply: &Value) -> Vec<String> {
    reply
        .get("updated")
        .and_then(Value::as_object)
        .map(|fields| fields.keys().cloned().collect())
        .unwrap_or_default()
}
