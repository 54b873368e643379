use std::cell::OnceCell;

use scraper::ElementRef;

use crate::constants::VEHICLES_URL;
use crate::text_manipulators::{extract_text, find_by_class_substring, join_url};

const YEAR_AND_HAND_SEPARATOR: &str = " • ";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TagError {
    #[error("listing has no '{0}' element")]
    MissingElement(&'static str),

    #[error("malformed year and hand text '{0}'")]
    MalformedYearAndHand(String),
}

/// One listing block of a category page.
///
/// Element lookups run once per field; absent elements read as `None`.
#[derive(Debug)]
pub struct VehicleTag<'a> {
    element: ElementRef<'a>,
    relative_link: OnceCell<Option<String>>,
    image_url: OnceCell<Option<String>>,
    model: OnceCell<Option<String>>,
    marketing_text: OnceCell<Option<String>>,
    year_and_hand_string: OnceCell<Option<String>>,
    price_string: OnceCell<Option<String>>,
}

impl<'a> VehicleTag<'a> {
    pub fn new(element: ElementRef<'a>) -> Self {
        Self {
            element,
            relative_link: OnceCell::new(),
            image_url: OnceCell::new(),
            model: OnceCell::new(),
            marketing_text: OnceCell::new(),
            year_and_hand_string: OnceCell::new(),
            price_string: OnceCell::new(),
        }
    }

    pub fn element(&self) -> ElementRef<'a> {
        self.element
    }

    pub fn relative_link(&self) -> Option<&str> {
        cached(&self.relative_link, || {
            self.attribute("a", "itemLink", "href")
        })
    }

    pub fn page_link(&self) -> Option<String> {
        self.relative_link()
            .map(|relative_link| join_url(VEHICLES_URL, relative_link))
    }

    pub fn image_url(&self) -> Option<&str> {
        cached(&self.image_url, || self.attribute("img", "image", "src"))
    }

    pub fn model(&self) -> Option<&str> {
        cached(&self.model, || self.text("span", "heading"))
    }

    pub fn marketing_text(&self) -> Option<&str> {
        cached(&self.marketing_text, || {
            self.text("span", "marketingText")
        })
    }

    pub fn year_and_hand_string(&self) -> Option<&str> {
        cached(&self.year_and_hand_string, || {
            self.text("span", "yearAndHand")
        })
    }

    pub fn price_string(&self) -> Option<&str> {
        cached(&self.price_string, || self.text("span", "price"))
    }

    pub fn year(&self) -> Result<u32, TagError> {
        let (year, _) = self.split_year_and_hand()?;
        year.trim()
            .parse()
            .map_err(|_| self.malformed_year_and_hand())
    }

    /// The owner count, `1` in `"2022 • יד 1"`.
    pub fn hand(&self) -> Result<u32, TagError> {
        let (_, hand_string) = self.split_year_and_hand()?;
        match hand_string.split_whitespace().collect::<Vec<_>>()[..] {
            [_, hand] => hand.parse().map_err(|_| self.malformed_year_and_hand()),
            _ => Err(self.malformed_year_and_hand()),
        }
    }

    /// `"217,500 ₪"` reads as `217500`; anything else as `None`.
    pub fn price(&self) -> Option<i64> {
        let mut parts = self.price_string()?.split_whitespace();
        let (Some(price), Some(_), None) = (parts.next(), parts.next(), parts.next()) else {
            return None;
        };
        price.replace(',', "").parse().ok()
    }

    fn split_year_and_hand(&self) -> Result<(&str, &str), TagError> {
        let text = self
            .year_and_hand_string()
            .ok_or(TagError::MissingElement("yearAndHand"))?;
        text.split_once(YEAR_AND_HAND_SEPARATOR)
            .ok_or_else(|| self.malformed_year_and_hand())
    }

    fn malformed_year_and_hand(&self) -> TagError {
        TagError::MalformedYearAndHand(self.year_and_hand_string().unwrap_or_default().to_string())
    }

    fn attribute(&self, tag_name: &str, class_substring: &str, attribute: &str) -> Option<String> {
        find_by_class_substring(self.element, tag_name, class_substring)?
            .value()
            .attr(attribute)
            .map(str::to_string)
    }

    fn text(&self, tag_name: &str, class_substring: &str) -> Option<String> {
        find_by_class_substring(self.element, tag_name, class_substring)
            .map(|element| extract_text(element).trim().to_string())
    }
}

fn cached<F>(cell: &OnceCell<Option<String>>, init: F) -> Option<&str>
where
    F: FnOnce() -> Option<String>,
{
    cell.get_or_init(init).as_deref()
}

#[cfg(test)]
mod tests {
    use scraper::Html;

    use super::*;
    use crate::text_manipulators::find_all_by_class_substring;

    const LISTING: &str = r#"
        <div class="feedItemBox_box__x1">
            <a class="feed-item-base_itemLink__y2" href="item/8gdn3p98?opened-from=feed">
                <img class="feed-item-image_image__z3" src="https://img.yad2.co.il/Pic/1.jpeg">
                <span class="feed-item-info_heading__a4"> ג'יפ קומפאס </span>
                <span class="feed-item-info_marketingText__b5">4X4 Sport</span>
                <span class="feed-item-info_yearAndHand__c6">2022 • יד 1</span>
                <span class="price_price__d7">217,500 ₪</span>
            </a>
        </div>
    "#;

    fn with_tags<F: FnOnce(Vec<VehicleTag>)>(html: &str, check: F) {
        let document = Html::parse_document(html);
        let tags = find_all_by_class_substring(document.root_element(), "div", "feedItemBox")
            .into_iter()
            .map(VehicleTag::new)
            .collect();
        check(tags);
    }

    #[test]
    fn reads_listing_fields() {
        with_tags(LISTING, |tags| {
            let tag = &tags[0];
            assert_eq!(tag.relative_link(), Some("item/8gdn3p98?opened-from=feed"));
            assert_eq!(
                tag.page_link().as_deref(),
                Some("https://www.yad2.co.il/vehicles/item/8gdn3p98?opened-from=feed")
            );
            assert_eq!(tag.image_url(), Some("https://img.yad2.co.il/Pic/1.jpeg"));
            assert_eq!(tag.model(), Some("ג'יפ קומפאס"));
            assert_eq!(tag.marketing_text(), Some("4X4 Sport"));
            assert_eq!(tag.year_and_hand_string(), Some("2022 • יד 1"));
            assert_eq!(tag.year(), Ok(2022));
            assert_eq!(tag.hand(), Ok(1));
            assert_eq!(tag.price(), Some(217500));
        });
    }

    #[test]
    fn missing_elements_read_as_none() {
        with_tags(r#"<div class="feedItemBox"><p>sold</p></div>"#, |tags| {
            let tag = &tags[0];
            assert_eq!(tag.relative_link(), None);
            assert_eq!(tag.page_link(), None);
            assert_eq!(tag.price(), None);
            assert_eq!(tag.year(), Err(TagError::MissingElement("yearAndHand")));
        });
    }

    #[test]
    fn malformed_texts() {
        let html = r#"<div class="feedItemBox">
            <span class="yearAndHand">2022</span>
            <span class="price">לא צוין מחיר</span>
        </div>"#;
        with_tags(html, |tags| {
            let tag = &tags[0];
            assert_eq!(
                tag.year(),
                Err(TagError::MalformedYearAndHand("2022".to_string()))
            );
            assert!(tag.hand().is_err());
            assert_eq!(tag.price(), None);
        });
    }
}
