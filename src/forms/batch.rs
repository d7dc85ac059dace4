use serde::Deserialize;

use crate::domain::mutation::Mutation;
use crate::domain::resource::ResourceKind;
use crate::forms::FormError;

#[derive(Debug, Default, Deserialize)]
/// Rows ticked in a list view.
pub struct BatchSelectionForm {
    #[serde(default)]
    pub ids: Vec<i64>,
}

impl BatchSelectionForm {
    fn check(&self) -> Result<(), FormError> {
        if self.ids.is_empty() {
            return Err(FormError::EmptySelection);
        }
        Ok(())
    }

    pub fn into_delete(self, resource: ResourceKind) -> Result<Mutation, FormError> {
        self.check()?;
        Ok(Mutation::delete_batch(resource, self.ids)?)
    }

    /// Only failed messages are requeued by the backend.
    pub fn into_retry(self) -> Result<Mutation, FormError> {
        self.check()?;
        Ok(Mutation::retry_messages(self.ids)?)
    }
}
