use crate::query::{NumberRange, OrderBy, QueryFilters, format_number_range};
use crate::requests::QueryParams;

/// Sort orders accepted by the vehicle feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderVehiclesBy {
    Date = OrderBy::Date as isize,
    PriceLowestToHighest = OrderBy::PriceLowestToHighest as isize,
    PriceHighestToLowest = OrderBy::PriceHighestToLowest as isize,
    DistanceLowestToHighest = 5,
    YearHighestToLowest = 6,
}

impl OrderVehiclesBy {
    pub fn code(self) -> u8 {
        self as u8
    }
}

impl From<OrderBy> for OrderVehiclesBy {
    fn from(order_by: OrderBy) -> Self {
        match order_by {
            OrderBy::Date => OrderVehiclesBy::Date,
            OrderBy::PriceLowestToHighest => OrderVehiclesBy::PriceLowestToHighest,
            OrderBy::PriceHighestToLowest => OrderVehiclesBy::PriceHighestToLowest,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VehiclesQueryFilters {
    pub page: Option<u32>,
    pub order_by: Option<OrderVehiclesBy>,
    pub price_range: Option<NumberRange>,
    pub year_range: Option<NumberRange>,
}

impl VehiclesQueryFilters {
    pub fn is_empty(&self) -> bool {
        self.to_params().is_empty()
    }

    pub fn to_params(&self) -> QueryParams {
        let common = QueryFilters {
            page: self.page,
            order_by: None,
            price_range: self.price_range,
        };
        let mut params = common.to_params();
        if let Some(order_by) = self.order_by {
            params.insert("Order".to_string(), order_by.code().to_string());
        }
        if let Some(year_range) = self.year_range {
            params.insert("year".to_string(), format_number_range(year_range));
        }
        params
    }
}

impl From<QueryFilters> for VehiclesQueryFilters {
    fn from(filters: QueryFilters) -> Self {
        Self {
            page: filters.page,
            order_by: filters.order_by.map(OrderVehiclesBy::from),
            price_range: filters.price_range,
            year_range: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn year_range_is_added_to_common_params() {
        let filters = VehiclesQueryFilters {
            page: Some(2),
            order_by: Some(OrderVehiclesBy::YearHighestToLowest),
            price_range: Some((10000, 50000)),
            year_range: Some((2015, 2020)),
        };
        assert_eq!(
            filters.to_params(),
            QueryParams::from([
                ("Order".to_string(), "6".to_string()),
                ("page".to_string(), "2".to_string()),
                ("price".to_string(), "10000-50000".to_string()),
                ("year".to_string(), "2015-2020".to_string()),
            ])
        );
    }

    #[test]
    fn shared_orders_keep_their_codes() {
        assert_eq!(OrderVehiclesBy::Date.code(), 1);
        assert_eq!(OrderVehiclesBy::PriceLowestToHighest.code(), 3);
        assert_eq!(OrderVehiclesBy::PriceHighestToLowest.code(), 4);
        assert_eq!(OrderVehiclesBy::DistanceLowestToHighest.code(), 5);
        let shared = OrderVehiclesBy::from(OrderBy::PriceHighestToLowest);
        assert_eq!(shared.code(), 4);
    }

    #[test]
    fn only_year_range_set() {
        let filters = VehiclesQueryFilters {
            year_range: Some((2020, 2018)),
            ..Default::default()
        };
        assert_eq!(filters.to_params()["year"], "2018-2020");
        assert_eq!(filters.to_params().len(), 1);
        assert!(VehiclesQueryFilters::default().is_empty());
    }

    #[test]
    fn converts_from_common_filters() {
        let filters = VehiclesQueryFilters::from(QueryFilters {
            page: Some(3),
            order_by: Some(OrderBy::Date),
            price_range: None,
        });
        assert_eq!(filters.order_by, Some(OrderVehiclesBy::Date));
        assert_eq!(filters.year_range, None);
    }
}
