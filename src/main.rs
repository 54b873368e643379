use anyhow::{Context, Result};
use dotenv::dotenv;
use log::{LevelFilter, info, warn};
use serde_json::{Value, json};
use yad2_scraper::{
    FieldFormat, Scraper, ScraperConfig, VehicleCategory, VehicleData, VehicleTag,
    VehiclesQueryFilters,
};

fn summarize_vehicle(vehicle: &VehicleData) -> Result<Value> {
    Ok(json!({
        "token": vehicle.token()?,
        "model": vehicle.model(FieldFormat::Text)?.map(|model| model.to_string()),
        "price": vehicle.price()?,
        "year": vehicle.year_of_production()?,
        "km": vehicle.km()?,
        "city": vehicle.city(FieldFormat::Text)?.map(|city| city.to_string()),
        "page_link": vehicle.page_link()?,
    }))
}

fn summarize_tag(tag: &VehicleTag) -> Value {
    json!({
        "model": tag.model(),
        "price": tag.price(),
        "year": tag.year().ok(),
        "hand": tag.hand().ok(),
        "page_link": tag.page_link(),
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    env_logger::Builder::new()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .init();

    let mut args = std::env::args().skip(1);
    let vehicle_category: VehicleCategory = args
        .next()
        .as_deref()
        .unwrap_or("cars")
        .parse()?;
    let page = args
        .next()
        .map(|page| page.parse::<u32>())
        .transpose()
        .context("page must be a positive number")?;

    let config = ScraperConfig::from_env().context("invalid scraper configuration")?;
    let mut scraper = Scraper::new(config)?;
    let filters = VehiclesQueryFilters {
        page,
        ..VehiclesQueryFilters::default()
    };

    let category = scraper
        .fetch_vehicle_category(vehicle_category, &filters)
        .await
        .with_context(|| format!("failed to fetch the {vehicle_category} category"))?;
    scraper.close();

    let summary = match category.load_next_data() {
        Some(next_data) => next_data
            .iterate_vehicles()?
            .map(|vehicle| summarize_vehicle(&vehicle))
            .collect::<Result<Vec<_>>>()?,
        None => {
            warn!("No hydration payload on the page, reading listing blocks instead");
            category.vehicle_tags().iter().map(summarize_tag).collect()
        }
    };

    info!("Found {} {vehicle_category} listings", summary.len());
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
