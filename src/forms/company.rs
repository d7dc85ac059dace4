use serde::Deserialize;
use validator::Validate;

use crate::domain::company::UpdateCompany;
use crate::domain::mutation::Mutation;
use crate::domain::resource::ResourceKind;
use crate::domain::types::{CompanyId, ContactEmail, NonEmptyString, PhoneNumber, WebsiteUrl};
use crate::forms::{FormError, non_blank};

#[derive(Debug, Deserialize, Validate)]
/// Form data for updating an existing company.
pub struct EditCompanyForm {
    pub id: i64,
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(length(min = 1))]
    pub industry: String,
    #[validate(length(min = 1))]
    pub country: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
}

impl EditCompanyForm {
    /// Validate and normalize the form into a domain update.
    pub fn into_update(self) -> Result<(CompanyId, UpdateCompany), FormError> {
        self.validate()?;

        let id = CompanyId::new(self.id)?;
        let email = non_blank(self.email.as_deref())
            .map(ContactEmail::new)
            .transpose()?
            .map(ContactEmail::into_inner);
        let phone = non_blank(self.phone.as_deref())
            .map(PhoneNumber::new)
            .transpose()?
            .map(PhoneNumber::into_inner);
        let website = non_blank(self.website.as_deref())
            .map(WebsiteUrl::new)
            .transpose()?
            .map(WebsiteUrl::into_inner);

        Ok((
            id,
            UpdateCompany {
                name: Some(NonEmptyString::new(self.name)?.into_inner()),
                industry: Some(NonEmptyString::new(self.industry)?.into_inner()),
                country: Some(NonEmptyString::new(self.country)?.into_inner()),
                email,
                phone,
                website,
            },
        ))
    }

    pub fn into_mutation(self) -> Result<Mutation, FormError> {
        let (id, update) = self.into_update()?;
        Ok(Mutation::update(ResourceKind::Companies, id.get(), &update)?)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn form() -> EditCompanyForm {
        EditCompanyForm {
            id: 4,
            name: " Acme ".into(),
            industry: "Software".into(),
            country: "India".into(),
            email: Some(" Sales@Acme.IO ".into()),
            phone: Some("".into()),
            website: None,
        }
    }

    #[test]
    fn normalizes_contact_fields() {
        let (id, update) = form().into_update().unwrap();
        assert_eq!(id.get(), 4);
        assert_eq!(update.name.as_deref(), Some("Acme"));
        assert_eq!(update.email.as_deref(), Some("sales@acme.io"));
        assert!(update.phone.is_none());
    }

    #[test]
    fn builds_put_request() {
        let request = form().into_mutation().unwrap().request().unwrap();
        assert_eq!(request.path, "companies/4");
        assert_eq!(
            request.body.and_then(|body| body.get("email").cloned()),
            Some(json!("sales@acme.io"))
        );
    }

    #[test]
    fn rejects_bad_email() {
        let mut bad = form();
        bad.email = Some("not-an-email".into());
        assert!(matches!(bad.into_update(), Err(FormError::InvalidEmail)));
    }
}
