use crate::requests::QueryParams;

pub type NumberRange = (i64, i64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderBy {
    Date = 1,
    PriceLowestToHighest = 3,
    PriceHighestToLowest = 4,
}

impl OrderBy {
    pub fn code(self) -> u8 {
        self as u8
    }
}

/// `"min-max"`, whichever order the bounds were given in.
pub fn format_number_range((a, b): NumberRange) -> String {
    format!("{}-{}", a.min(b), a.max(b))
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryFilters {
    pub page: Option<u32>,
    pub order_by: Option<OrderBy>,
    pub price_range: Option<NumberRange>,
}

impl QueryFilters {
    pub fn is_empty(&self) -> bool {
        self.to_params().is_empty()
    }

    /// Query parameters for the set filters only.
    pub fn to_params(&self) -> QueryParams {
        let mut params = QueryParams::new();
        if let Some(page) = self.page {
            params.insert("page".to_string(), page.to_string());
        }
        if let Some(order_by) = self.order_by {
            params.insert("Order".to_string(), order_by.code().to_string());
        }
        if let Some(price_range) = self.price_range {
            params.insert("price".to_string(), format_number_range(price_range));
        }
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filters_map_to_site_params() {
        let filters = QueryFilters {
            page: Some(1),
            order_by: Some(OrderBy::Date),
            price_range: Some((100, 200)),
        };
        let params = filters.to_params();
        assert_eq!(params["page"], "1");
        assert_eq!(params["Order"], "1");
        assert_eq!(params["price"], "100-200");
    }

    #[test]
    fn unset_filters_are_omitted() {
        let filters = QueryFilters {
            page: None,
            order_by: Some(OrderBy::PriceLowestToHighest),
            price_range: Some((50, 100)),
        };
        assert_eq!(
            filters.to_params(),
            QueryParams::from([
                ("Order".to_string(), "3".to_string()),
                ("price".to_string(), "50-100".to_string()),
            ])
        );
        assert!(QueryFilters::default().is_empty());
    }

    #[test]
    fn ranges_are_normalised() {
        assert_eq!(format_number_range((1, 10)), "1-10");
        assert_eq!(format_number_range((0, 0)), "0-0");
        assert_eq!(format_number_range((-5, 5)), "-5-5");
        assert_eq!(format_number_range((200, 100)), "100-200");
    }
}
