use std::fmt;
use std::str::FromStr;

use crate::constants::VEHICLES_URL;
use crate::text_manipulators::join_url;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VehicleCategory {
    Cars,
    Motorcycles,
    Scooters,
    Trucks,
    Watercraft,
    Others,
}

impl VehicleCategory {
    pub const ALL: [VehicleCategory; 6] = [
        VehicleCategory::Cars,
        VehicleCategory::Motorcycles,
        VehicleCategory::Scooters,
        VehicleCategory::Trucks,
        VehicleCategory::Watercraft,
        VehicleCategory::Others,
    ];

    /// The path segment the site uses for this category.
    pub fn as_str(self) -> &'static str {
        match self {
            VehicleCategory::Cars => "cars",
            VehicleCategory::Motorcycles => "motorcycles",
            VehicleCategory::Scooters => "scooters",
            VehicleCategory::Trucks => "trucks",
            VehicleCategory::Watercraft => "watercraft",
            VehicleCategory::Others => "others",
        }
    }

    pub fn url(self) -> String {
        join_url(VEHICLES_URL, self.as_str())
    }
}

impl fmt::Display for VehicleCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown vehicle category '{0}'")]
pub struct UnknownVehicleCategory(pub String);

impl FromStr for VehicleCategory {
    type Err = UnknownVehicleCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        VehicleCategory::ALL
            .into_iter()
            .find(|category| category.as_str() == s)
            .ok_or_else(|| UnknownVehicleCategory(s.to_string()))
    }
}

pub fn get_vehicle_category_url(category: &str) -> Result<String, UnknownVehicleCategory> {
    category.parse::<VehicleCategory>().map(VehicleCategory::url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::BASE_URL;

    #[test]
    fn category_urls_live_under_vehicles() {
        assert_eq!(VEHICLES_URL, join_url(BASE_URL, "vehicles"));
        assert_eq!(
            VehicleCategory::Cars.url(),
            "https://www.yad2.co.il/vehicles/cars"
        );
        for category in VehicleCategory::ALL {
            assert_eq!(
                get_vehicle_category_url(category.as_str()).unwrap(),
                format!("https://www.yad2.co.il/vehicles/{category}")
            );
        }
    }

    #[test]
    fn unknown_category_is_rejected() {
        assert_eq!(
            get_vehicle_category_url("invalid-category"),
            Err(UnknownVehicleCategory("invalid-category".to_string()))
        );
        assert!("Cars".parse::<VehicleCategory>().is_err());
    }
}
