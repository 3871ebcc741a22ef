use chrono::{NaiveTime, Weekday};
use color_eyre::eyre::{eyre, Result};
use dotenv::dotenv;
use eyre::WrapErr;
use salonbook_core::models::salon::CreateSalonRequest;
use salonbook_core::scheduling::{DayWindow, WorkingHours};
use salonbook_db::repositories::{salon, service, staff};
use salonbook_db::schema::initialize_database;

fn hm(hour: u32, minute: u32) -> Result<NaiveTime> {
    NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(|| eyre!("invalid time {hour}:{minute}"))
}

fn weekday_schedule() -> Result<WorkingHours> {
    let mut hours = WorkingHours::empty();
    for day in [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
    ] {
        hours.add_window(day, DayWindow::new(hm(9, 0)?, hm(17, 0)?)?)?;
    }
    Ok(hours)
}

fn weekend_schedule() -> Result<WorkingHours> {
    let mut hours = WorkingHours::empty();
    hours.add_window(Weekday::Sat, DayWindow::new(hm(10, 0)?, hm(18, 0)?)?)?;
    hours.add_window(Weekday::Sun, DayWindow::new(hm(10, 0)?, hm(16, 0)?)?)?;
    Ok(hours)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    // Load environment variables
    dotenv().ok();

    let database_url = std::env::var("DATABASE_URL")
        .wrap_err("DATABASE_URL environment variable must be set")?;

    println!("Connecting to database...");
    let pool = salonbook_db::create_pool(&database_url).await?;
    initialize_database(&pool).await?;

    println!("Seeding demo data...");
    let tokyo = salon::create_salon(
        &pool,
        &CreateSalonRequest {
            name: "Hair Salon Tokyo".to_string(),
            description: "A popular beauty salon in Tokyo. Experienced stylists incorporate \
                          the latest trends while proposing styles that suit each customer."
                .to_string(),
            address: "Sample Building 3F, 1-1-1 Shibuya, Shibuya-ku, Tokyo".to_string(),
            phone: "03-1234-5678".to_string(),
            email: "info@hairsalon-tokyo.example".to_string(),
            website: "https://hairsalon-tokyo.example".to_string(),
            image_url: String::new(),
        },
    )
    .await?;

    staff::create_staff(
        &pool,
        tokyo.id,
        "Misaki Tanaka",
        "Stylist with 10 years of experience. Specializes in cuts and coloring.",
        &["Cut".to_string(), "Color".to_string()],
        10,
        &weekday_schedule()?,
    )
    .await?;
    staff::create_staff(
        &pool,
        tokyo.id,
        "Kenta Sato",
        "Stylist specializing in perms and styling.",
        &["Perm".to_string(), "Styling".to_string()],
        8,
        &weekend_schedule()?,
    )
    .await?;

    service::create_service(
        &pool,
        tokyo.id,
        "Cut",
        "Includes shampoo and blow dry",
        4000,
        60,
        "cut",
    )
    .await?;
    service::create_service(
        &pool,
        tokyo.id,
        "Cut + Color",
        "Cut, coloring, shampoo and blow dry",
        8000,
        120,
        "color",
    )
    .await?;
    service::create_service(
        &pool,
        tokyo.id,
        "Perm",
        "Perm, cut, shampoo and blow dry",
        10000,
        150,
        "perm",
    )
    .await?;

    let shibuya = salon::create_salon(
        &pool,
        &CreateSalonRequest {
            name: "Beauty Studio Shibuya".to_string(),
            description: "A beauty salon known for stylish cuts and colors in a modern space."
                .to_string(),
            address: "Beauty Building 2F, 2-2-2 Shibuya, Shibuya-ku, Tokyo".to_string(),
            phone: "03-2345-6789".to_string(),
            email: "contact@beauty-shibuya.example".to_string(),
            website: String::new(),
            image_url: String::new(),
        },
    )
    .await?;

    staff::create_staff(
        &pool,
        shibuya.id,
        "Yui Kobayashi",
        "Color specialist covering everything from unique styles to elegant tones.",
        &["Color".to_string()],
        6,
        &weekday_schedule()?,
    )
    .await?;
    service::create_service(
        &pool,
        shibuya.id,
        "Color",
        "Full coloring with aftercare treatment",
        7000,
        90,
        "color",
    )
    .await?;

    println!("Demo data seeded successfully.");
    Ok(())
}
