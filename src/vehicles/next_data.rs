use chrono::NaiveDateTime;
use serde_json::{Map, Value};

use crate::constants::VEHICLES_URL;
use crate::next_data::{FieldFormat, NextData, StructureError};
use crate::safe_access::{FieldResult, FieldValue, FromField, SafeAccess};
use crate::text_manipulators::join_url;

type Object = Map<String, Value>;

/// One vehicle listing from the hydration payload.
///
/// Every accessor returns `Ok(None)` when its field is missing; only values
/// of the wrong type (or unparseable dates) are errors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VehicleData<'a> {
    data: &'a Value,
}

impl<'a> SafeAccess<'a> for VehicleData<'a> {
    fn root(&self) -> &'a Value {
        self.data
    }
}

impl<'a> VehicleData<'a> {
    pub fn new(data: &'a Value) -> Self {
        Self { data }
    }

    pub fn json(&self) -> &'a Value {
        self.data
    }

    fn labelled(&self, path: &[&str], format: FieldFormat) -> FieldResult<FieldValue<'a>> {
        let mut full_path = path.to_vec();
        full_path.push(format.key());
        self.get(&full_path)
    }

    fn specification<T: FromField<'a>>(&self, key: &str) -> FieldResult<T> {
        self.get(&["specifications", key])
    }

    pub fn token(&self) -> FieldResult<&'a str> {
        self.get(&["token"])
    }

    pub fn page_link(&self) -> FieldResult<String> {
        Ok(self
            .token()?
            .map(|token| join_url(VEHICLES_URL, &format!("item/{token}"))))
    }

    pub fn price(&self) -> FieldResult<i64> {
        self.get(&["price"])
    }

    pub fn customer(&self) -> FieldResult<&'a Object> {
        self.get(&["customer"])
    }

    pub fn customer_name(&self) -> FieldResult<&'a str> {
        self.get(&["customer", "name"])
    }

    pub fn customer_phone(&self) -> FieldResult<&'a str> {
        self.get(&["customer", "phone"])
    }

    pub fn address(&self) -> FieldResult<&'a Object> {
        self.get(&["address"])
    }

    pub fn top_area(&self, format: FieldFormat) -> FieldResult<FieldValue<'a>> {
        self.labelled(&["address", "topArea"], format)
    }

    pub fn area(&self, format: FieldFormat) -> FieldResult<FieldValue<'a>> {
        self.labelled(&["address", "area"], format)
    }

    pub fn city(&self, format: FieldFormat) -> FieldResult<FieldValue<'a>> {
        self.labelled(&["address", "city"], format)
    }

    pub fn metadata(&self) -> FieldResult<&'a Object> {
        self.get(&["metadata"])
    }

    pub fn video(&self) -> FieldResult<&'a str> {
        self.get(&["metadata", "video"])
    }

    pub fn cover_image(&self) -> FieldResult<&'a str> {
        self.get(&["metadata", "coverImage"])
    }

    pub fn images(&self) -> FieldResult<Vec<&'a str>> {
        self.get(&["metadata", "images"])
    }

    pub fn description(&self) -> FieldResult<&'a str> {
        self.get(&["metadata", "description"])
    }

    pub fn dates(&self) -> FieldResult<&'a Object> {
        self.get(&["dates"])
    }

    pub fn updated_at(&self) -> FieldResult<NaiveDateTime> {
        self.get_datetime(&["dates", "updatedAt"])
    }

    pub fn created_at(&self) -> FieldResult<NaiveDateTime> {
        self.get_datetime(&["dates", "createdAt"])
    }

    pub fn ends_at(&self) -> FieldResult<NaiveDateTime> {
        self.get_datetime(&["dates", "endsAt"])
    }

    pub fn rebounced_at(&self) -> FieldResult<NaiveDateTime> {
        self.get_datetime(&["dates", "rebouncedAt"])
    }

    pub fn manufacturer(&self, format: FieldFormat) -> FieldResult<FieldValue<'a>> {
        self.labelled(&["manufacturer"], format)
    }

    pub fn color(&self, format: FieldFormat) -> FieldResult<FieldValue<'a>> {
        self.labelled(&["color"], format)
    }

    pub fn km(&self) -> FieldResult<i64> {
        self.get(&["km"])
    }

    /// Usually read with [`FieldFormat::Id`], which is the owner count.
    pub fn hand(&self, format: FieldFormat) -> FieldResult<FieldValue<'a>> {
        self.labelled(&["hand"], format)
    }

    pub fn engine_volume(&self) -> FieldResult<i64> {
        self.get(&["engineVolume"])
    }

    pub fn horse_power(&self) -> FieldResult<i64> {
        self.get(&["horsePower"])
    }

    pub fn previous_owner(&self, format: FieldFormat) -> FieldResult<FieldValue<'a>> {
        self.labelled(&["previousOwner"], format)
    }

    pub fn above_price(&self) -> FieldResult<i64> {
        self.get(&["abovePrice"])
    }

    pub fn tags(&self) -> FieldResult<&'a [Value]> {
        self.get(&["tags"])
    }

    pub fn is_contact_lead_supported(&self) -> FieldResult<bool> {
        self.get(&["isContactLeadSupported"])
    }

    pub fn vehicle_dates(&self) -> FieldResult<&'a Object> {
        self.get(&["vehicleDates"])
    }

    pub fn year_of_production(&self) -> FieldResult<i64> {
        self.get(&["vehicleDates", "yearOfProduction"])
    }

    pub fn month_of_production(&self) -> FieldResult<i64> {
        self.get(&["vehicleDates", "monthOfProduction", "id"])
    }

    pub fn test_date(&self) -> FieldResult<NaiveDateTime> {
        self.get_datetime(&["vehicleDates", "testDate"])
    }

    pub fn model(&self, format: FieldFormat) -> FieldResult<FieldValue<'a>> {
        self.labelled(&["model"], format)
    }

    pub fn sub_model(&self, format: FieldFormat) -> FieldResult<FieldValue<'a>> {
        self.labelled(&["subModel"], format)
    }

    pub fn gear_box(&self, format: FieldFormat) -> FieldResult<FieldValue<'a>> {
        self.labelled(&["gearBox"], format)
    }

    pub fn car_family_types(&self, format: FieldFormat) -> FieldResult<Vec<FieldValue<'a>>> {
        self.get_each(&["carFamilyType"], format.key())
    }

    pub fn engine_type(&self, format: FieldFormat) -> FieldResult<FieldValue<'a>> {
        self.labelled(&["engineType"], format)
    }

    pub fn seats(&self) -> FieldResult<i64> {
        self.get(&["seats"])
    }

    pub fn number_of_doors(&self) -> FieldResult<i64> {
        self.get(&["numberOfDoors"])
    }

    pub fn owner(&self) -> FieldResult<&'a str> {
        self.get(&["owner", "text"])
    }

    pub fn body_type(&self) -> FieldResult<&'a str> {
        self.get(&["bodyType", "text"])
    }

    pub fn combined_fuel_consumption(&self) -> FieldResult<f64> {
        self.get(&["combinedFuelConsumption"])
    }

    pub fn power_train_architecture(&self) -> FieldResult<&'a str> {
        self.get(&["powertrainArchitecture"])
    }

    pub fn car_tags(&self, format: FieldFormat) -> FieldResult<Vec<FieldValue<'a>>> {
        self.get_each(&["carTag"], format.key())
    }

    pub fn specifications(&self) -> FieldResult<&'a Object> {
        self.get(&["specifications"])
    }

    pub fn has_air_conditioner(&self) -> FieldResult<bool> {
        self.specification("airConditioner")
    }

    pub fn has_power_steering(&self) -> FieldResult<bool> {
        self.specification("powerSteering")
    }

    pub fn has_magnesium_wheel(&self) -> FieldResult<bool> {
        self.specification("magnesiumWheel")
    }

    pub fn has_tire_pressure_monitoring_system(&self) -> FieldResult<bool> {
        self.specification("tirePressureMonitoringSystem")
    }

    pub fn has_abs(&self) -> FieldResult<bool> {
        self.specification("abs")
    }

    pub fn air_bags(&self) -> FieldResult<i64> {
        self.specification("airBags")
    }

    pub fn has_control_stability(&self) -> FieldResult<bool> {
        self.specification("controlStability")
    }

    /// Number of electric windows.
    pub fn electric_window(&self) -> FieldResult<i64> {
        self.specification("electricWindow")
    }

    pub fn has_breaking_assist_system(&self) -> FieldResult<bool> {
        self.specification("breakingAssistSystem")
    }

    pub fn has_reverse_camera(&self) -> FieldResult<bool> {
        self.specification("reverseCamera")
    }

    pub fn has_adaptive_cruise_control(&self) -> FieldResult<bool> {
        self.specification("adaptiveCruiseControl")
    }

    pub fn has_high_beams_auto_control(&self) -> FieldResult<bool> {
        self.specification("highBeamsAutoControl")
    }

    pub fn has_blind_spot_assist(&self) -> FieldResult<bool> {
        self.specification("blindSpotAssist")
    }

    pub fn has_identify_pedestrians(&self) -> FieldResult<bool> {
        self.specification("identifyPedestrians")
    }

    pub fn has_seat_belts_sensors(&self) -> FieldResult<bool> {
        self.specification("seatBeltsSensors")
    }

    pub fn has_identifying_dangerous_nearing(&self) -> FieldResult<bool> {
        self.specification("identifyingDangerousNearing")
    }

    pub fn has_auto_lighting_in_forward(&self) -> FieldResult<bool> {
        self.specification("autoLightingInForward")
    }

    pub fn has_identify_traffic_signs(&self) -> FieldResult<bool> {
        self.specification("identifyTrafficSigns")
    }

    pub fn ignition(&self, format: FieldFormat) -> FieldResult<FieldValue<'a>> {
        self.labelled(&["specifications", "ignition"], format)
    }

    pub fn safety_points(&self) -> FieldResult<i64> {
        self.specification("safetyPoints")
    }

    pub fn is_handicapped_friendly(&self) -> FieldResult<bool> {
        self.specification("isHandicappedFriendly")
    }

    pub fn has_sun_roof(&self) -> FieldResult<bool> {
        self.specification("sunRoof")
    }

    pub fn is_turbo(&self) -> FieldResult<bool> {
        self.specification("isTurbo")
    }

    pub fn has_road_deviation_control(&self) -> FieldResult<bool> {
        self.specification("roadDeviationControl")
    }

    pub fn has_forward_distance_monitor(&self) -> FieldResult<bool> {
        self.specification("forwardDistanceMonitor")
    }

    pub fn has_box(&self) -> FieldResult<bool> {
        self.specification("box")
    }
}

/// The hydration payload of a vehicles category page.
#[derive(Debug, Clone, PartialEq)]
pub struct VehiclesNextData {
    next_data: NextData,
}

impl VehiclesNextData {
    pub fn new(next_data: NextData) -> Self {
        Self { next_data }
    }

    pub fn next_data(&self) -> &NextData {
        &self.next_data
    }

    pub fn get(&self, key: &str) -> Result<&Value, StructureError> {
        self.next_data.get(key)
    }

    pub fn queries(&self) -> Result<&[Value], StructureError> {
        self.next_data.queries()
    }

    pub fn iterate_vehicles(
        &self,
    ) -> Result<impl Iterator<Item = VehicleData<'_>> + '_, StructureError> {
        Ok(self.next_data.iterate_listings()?.map(VehicleData::new))
    }

    pub fn collect_vehicles(&self) -> Result<Vec<VehicleData<'_>>, StructureError> {
        Ok(self.iterate_vehicles()?.collect())
    }
}

impl From<NextData> for VehiclesNextData {
    fn from(next_data: NextData) -> Self {
        Self::new(next_data)
    }
}
