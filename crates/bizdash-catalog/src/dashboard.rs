//! Session state for one dashboard: the catalog plus the selected detail.

use bizdash_core::SortKey;

use crate::catalog::{Catalog, LoadOutcome};
use crate::error::CatalogError;
use crate::source::{Source, SourceClient};
use crate::view::RecordView;

#[derive(Debug, Default)]
pub struct Dashboard {
    catalog: Catalog,
    selected: Option<RecordView>,
}

impl Dashboard {
    #[must_use]
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog,
            selected: None,
        }
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Reloads the catalog. The current selection is kept until the next
    /// detail request.
    pub async fn load(&mut self, client: &SourceClient, source: &Source) -> LoadOutcome {
        self.catalog.load(client, source).await
    }

    pub fn query<'a>(
        &'a self,
        filter: &str,
        sort: SortKey,
    ) -> impl Iterator<Item = RecordView> + 'a {
        self.catalog.query(filter, sort)
    }

    /// Selects the record with `id` for the detail panel.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::DetailNotFound`] and leaves the previous
    /// selection untouched when `id` is blank or unknown.
    pub fn select_detail(&mut self, id: &str) -> Result<&RecordView, CatalogError> {
        let view = self.catalog.select_detail(id)?;
        let selected: &RecordView = self.selected.insert(view);
        Ok(selected)
    }

    #[must_use]
    pub fn selected(&self) -> Option<&RecordView> {
        self.selected.as_ref()
    }
}
