use std::io::{self, Read};

use log::{debug, warn};
use scraper::{ElementRef, Html};

use crate::constants::NEXT_DATA_SCRIPT_ID;
use crate::next_data::NextData;
use crate::text_manipulators::{extract_text, find_all_by_class_substring, find_by_id};

/// Document types [`crate::Scraper::fetch_category`] can build from a response body.
pub trait FromHtml: Sized {
    fn from_html(html: &str) -> Self;

    fn from_html_bytes(bytes: &[u8]) -> Self {
        Self::from_html(&String::from_utf8_lossy(bytes))
    }

    fn from_reader<R: Read>(mut reader: R) -> io::Result<Self> {
        let mut buffer = Vec::new();
        reader.read_to_end(&mut buffer)?;
        Ok(Self::from_html_bytes(&buffer))
    }
}

/// A parsed category page.
#[derive(Debug)]
pub struct Category {
    html: Html,
}

impl Category {
    pub fn new(html: Html) -> Self {
        Self { html }
    }

    pub fn html(&self) -> &Html {
        &self.html
    }

    /// `None` when the page has no payload script or its JSON is malformed.
    pub fn load_next_data(&self) -> Option<NextData> {
        let script = find_by_id(self.html.root_element(), "script", NEXT_DATA_SCRIPT_ID)?;
        match NextData::from_json_str(&extract_text(script)) {
            Ok(next_data) => Some(next_data),
            Err(e) => {
                warn!("Ignoring malformed {NEXT_DATA_SCRIPT_ID} payload: {e}");
                None
            }
        }
    }

    pub fn find_all_tags_by_class_substring(
        &self,
        tag_name: &str,
        substring: &str,
    ) -> Vec<ElementRef<'_>> {
        let tags = find_all_by_class_substring(self.html.root_element(), tag_name, substring);
        debug!(
            "Found {} '{}' tags with class containing '{}'",
            tags.len(),
            tag_name,
            substring
        );
        tags
    }
}

impl FromHtml for Category {
    fn from_html(html: &str) -> Self {
        Self::new(Html::parse_document(html))
    }
}
