use scraper::Html;

use crate::category::{Category, FromHtml};
use crate::constants::VEHICLE_TAG_CLASS_SUBSTRING;
use crate::vehicles::next_data::VehiclesNextData;
use crate::vehicles::tag::VehicleTag;

/// A parsed vehicles category page.
#[derive(Debug)]
pub struct VehiclesCategory {
    category: Category,
}

impl VehiclesCategory {
    pub fn new(category: Category) -> Self {
        Self { category }
    }

    pub fn category(&self) -> &Category {
        &self.category
    }

    pub fn html(&self) -> &Html {
        self.category.html()
    }

    pub fn vehicle_tags(&self) -> Vec<VehicleTag<'_>> {
        self.category
            .find_all_tags_by_class_substring("div", VEHICLE_TAG_CLASS_SUBSTRING)
            .into_iter()
            .map(VehicleTag::new)
            .collect()
    }

    pub fn load_next_data(&self) -> Option<VehiclesNextData> {
        self.category.load_next_data().map(VehiclesNextData::from)
    }
}

impl FromHtml for VehiclesCategory {
    fn from_html(html: &str) -> Self {
        Self::new(Category::from_html(html))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_every_listing_block() {
        let category = VehiclesCategory::from_html(
            r#"<html><body>
                <div class="feedItemBox extra"><span class="heading">A</span></div>
                <div class="feedItemBox extra"><span class="heading">B</span></div>
                <div class="banner">ad</div>
            </body></html>"#,
        );
        let models: Vec<_> = category
            .vehicle_tags()
            .iter()
            .map(|tag| tag.model().map(str::to_string))
            .collect();
        assert_eq!(models, vec![Some("A".to_string()), Some("B".to_string())]);
    }

    #[test]
    fn page_without_listings_has_no_tags() {
        let category = VehiclesCategory::from_html("<html><body></body></html>");
        assert!(category.vehicle_tags().is_empty());
        assert!(category.load_next_data().is_none());
    }
}
