mod category;
mod next_data;
mod query;
mod tag;
mod urls;

pub use category::VehiclesCategory;
pub use next_data::{VehicleData, VehiclesNextData};
pub use query::{OrderVehiclesBy, VehiclesQueryFilters};
pub use tag::{TagError, VehicleTag};
pub use urls::{UnknownVehicleCategory, VehicleCategory, get_vehicle_category_url};
