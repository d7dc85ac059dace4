use serde::Deserialize;
use validator::Validate;

use crate::domain::mutation::Mutation;
use crate::domain::product::{FetchProductClients, NewProduct};
use crate::domain::resource::ResourceKind;
use crate::domain::types::{NonEmptyString, ProductId, TemplateId, WebsiteUrl};
use crate::forms::{FormError, non_blank};

#[derive(Debug, Deserialize, Validate)]
/// Form data for creating a product or replacing an existing one.
pub struct ProductForm {
    /// Set when editing.
    #[serde(default)]
    pub id: Option<i64>,
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub short_description: Option<String>,
    #[serde(default)]
    pub long_description: Option<String>,
    /// Comma separated industries the product targets.
    #[serde(default)]
    pub industry_tags: String,
    #[serde(default)]
    pub brochure_url: Option<String>,
    #[serde(default)]
    pub email_template_ids: Vec<i64>,
    #[serde(default)]
    pub whatsapp_template_ids: Vec<i64>,
}

fn slug_is_valid(slug: &str) -> bool {
    slug.chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

impl ProductForm {
    pub fn into_new_product(self) -> Result<NewProduct, FormError> {
        self.validate()?;

        let slug = non_blank(self.slug.as_deref()).map(str::to_string);
        if slug.as_deref().is_some_and(|slug| !slug_is_valid(slug)) {
            return Err(FormError::InvalidValue(
                "slug may only contain lowercase letters, digits and dashes".to_string(),
            ));
        }

        let mut industry_tags: Vec<String> = self
            .industry_tags
            .split(',')
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
            .map(str::to_string)
            .collect();
        industry_tags.dedup_by(|a, b| a.eq_ignore_ascii_case(b));

        let templates = |ids: Vec<i64>| {
            ids.into_iter()
                .map(TemplateId::new)
                .collect::<Result<Vec<_>, _>>()
        };

        Ok(NewProduct {
            name: NonEmptyString::new(self.name)?.into_inner(),
            slug,
            short_description: non_blank(self.short_description.as_deref()).map(str::to_string),
            long_description: non_blank(self.long_description.as_deref()).map(str::to_string),
            industry_tags,
            brochure_url: non_blank(self.brochure_url.as_deref())
                .map(WebsiteUrl::new)
                .transpose()?
                .map(WebsiteUrl::into_inner),
            email_template_ids: templates(self.email_template_ids)?,
            whatsapp_template_ids: templates(self.whatsapp_template_ids)?,
        })
    }

    /// `POST products` for a new product, `PUT products/{id}` otherwise.
    pub fn into_mutation(self) -> Result<Mutation, FormError> {
        let id = self.id.map(ProductId::new).transpose()?;
        let product = self.into_new_product()?;
        Ok(match id {
            Some(id) => Mutation::update(ResourceKind::Products, id.get(), &product)?,
            None => Mutation::create(ResourceKind::Products, &product)?,
        })
    }
}

#[derive(Debug, Deserialize, Validate)]
/// Form data for pulling matching companies into a product.
pub struct FetchClientsForm {
    pub product_id: i64,
    #[validate(range(min = 1, max = 50))]
    pub limit: u32,
    #[serde(default)]
    pub country: Option<String>,
}

impl FetchClientsForm {
    pub fn into_mutation(self) -> Result<Mutation, FormError> {
        self.validate()?;
        Ok(Mutation::FetchProductClients {
            product: ProductId::new(self.product_id)?,
            request: FetchProductClients {
                limit: self.limit,
                country: non_blank(self.country.as_deref()).map(str::to_string),
                override_filters: None,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::domain::mutation::Method;

    fn form() -> ProductForm {
        ProductForm {
            id: None,
            name: " Ledger Pro ".into(),
            slug: Some("".into()),
            short_description: Some("Bookkeeping".into()),
            long_description: None,
            industry_tags: "Retail, retail, Wholesale,".into(),
            brochure_url: Some("https://acme.io/ledger.pdf".into()),
            email_template_ids: vec![2],
            whatsapp_template_ids: Vec::new(),
        }
    }

    #[test]
    fn tags_are_split_and_deduplicated() {
        let product = form().into_new_product().unwrap();
        assert_eq!(product.name, "Ledger Pro");
        assert_eq!(product.industry_tags, vec!["Retail", "Wholesale"]);
        assert!(product.slug.is_none());
    }

    #[test]
    fn new_product_posts_and_edit_puts() {
        let create = form().into_mutation().unwrap().request().unwrap();
        assert_eq!(create.method, Method::Post);
        assert_eq!(create.path, "products");
        assert!(create.body.unwrap().get("slug").is_none());

        let mut edit = form();
        edit.id = Some(7);
        let update = edit.into_mutation().unwrap().request().unwrap();
        assert_eq!(update.method, Method::Put);
        assert_eq!(update.path, "products/7");
        assert_eq!(update.body.unwrap()["email_template_ids"], json!([2]));
    }

    #[test]
    fn bad_slug_and_brochure_are_rejected() {
        let mut bad = form();
        bad.slug = Some("Ledger Pro".into());
        assert!(matches!(bad.into_new_product(), Err(FormError::InvalidValue(_))));

        let mut bad = form();
        bad.brochure_url = Some("not a url".into());
        assert!(matches!(bad.into_new_product(), Err(FormError::InvalidUrl)));
    }

    #[test]
    fn fetch_limit_is_bounded() {
        let form = FetchClientsForm {
            product_id: 3,
            limit: 80,
            country: None,
        };
        assert!(matches!(form.into_mutation(), Err(FormError::Validation(_))));
    }
}
