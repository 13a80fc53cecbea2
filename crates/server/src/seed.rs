//! Demo data for local development.
//!
//! Creates five accounts sharing one password, four printers and two orders
//! that exercise both order state machines. Everything goes through the same
//! services the HTTP handlers use, so seeded records obey the usual rules.

use secrecy::SecretString;
use thiserror::Error;
use tracing::info;

use printshare_core::{OrderStatus, PaymentStatus, Price, PriceError, PrinterStatus};

use crate::models::{NewOrder, NewPrinter, OrderPatch, Specifications};
use crate::services::{AuthError, AuthService, MarketplaceError};
use crate::state::AppState;

/// Errors while seeding demo data.
#[derive(Debug, Error)]
pub enum SeedError {
    #[error("demo account: {0}")]
    Account(#[from] AuthError),
    #[error("demo catalogue: {0}")]
    Catalogue(#[from] MarketplaceError),
    #[error("demo price: {0}")]
    Price(#[from] PriceError),
}

/// What [`seed_demo`] created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub users: usize,
    pub printers: usize,
    pub orders: usize,
}

struct DemoPrinter {
    name: &'static str,
    description: &'static str,
    build_volume: &'static str,
    layer_height: &'static str,
    materials: &'static [&'static str],
    technology: &'static str,
    price_per_hour: i64,
    location: &'static str,
    image: &'static str,
}

const DEMO_USERS: [(&str, &str); 5] = [
    ("owner1@printshare.dev", "Olivia Owner"),
    ("owner2@printshare.dev", "Oscar Owner"),
    ("owner3@printshare.dev", "Opal Owner"),
    ("customer1@printshare.dev", "Casey Customer"),
    ("customer2@printshare.dev", "Cody Customer"),
];

const DEMO_PRINTERS: [DemoPrinter; 4] = [
    DemoPrinter {
        name: "Ender 3 Pro",
        description: "Reliable FDM printer perfect for large prints. Well maintained and calibrated.",
        build_volume: "220x220x250mm",
        layer_height: "0.1-0.3mm",
        materials: &["PLA", "PETG", "TPU"],
        technology: "FDM",
        price_per_hour: 15,
        location: "San Francisco, CA",
        image: "/printer1.jpg",
    },
    DemoPrinter {
        name: "Prusa i3 MK3S+",
        description: "High-quality printer with excellent print quality. Auto bed leveling included.",
        build_volume: "250x210x210mm",
        layer_height: "0.05-0.3mm",
        materials: &["PLA", "PETG", "ASA", "TPU"],
        technology: "FDM",
        price_per_hour: 25,
        location: "Oakland, CA",
        image: "/printer2.jpg",
    },
    DemoPrinter {
        name: "Elegoo Mars 3",
        description: "Resin printer for high-detail prints. Perfect for miniatures and detailed models.",
        build_volume: "143x89x175mm",
        layer_height: "0.01-0.1mm",
        materials: &["Resin"],
        technology: "SLA",
        price_per_hour: 20,
        location: "San Jose, CA",
        image: "/printer3.jpg",
    },
    DemoPrinter {
        name: "Bambu Lab X1 Carbon",
        description: "High-speed printer with multi-color capability. Advanced features and reliability.",
        build_volume: "256x256x256mm",
        layer_height: "0.08-0.3mm",
        materials: &["PLA", "PETG", "TPU", "ABS"],
        technology: "FDM",
        price_per_hour: 30,
        location: "San Francisco, CA",
        image: "/printer4.jpg",
    },
];

impl DemoPrinter {
    fn listing(&self) -> Result<NewPrinter, PriceError> {
        Ok(NewPrinter {
            name: self.name.to_string(),
            description: self.description.to_string(),
            specifications: Specifications {
                build_volume: self.build_volume.to_string(),
                layer_height: self.layer_height.to_string(),
                materials: self.materials.iter().map(|m| (*m).to_string()).collect(),
                technology: self.technology.to_string(),
            },
            price_per_hour: Price::from_units(self.price_per_hour)?,
            location: self.location.to_string(),
            images: vec![self.image.to_string()],
            status: PrinterStatus::Available,
        })
    }
}

/// Populate `state` with demo accounts, printers and orders.
///
/// Hashes one password per account; call from a blocking context.
///
/// # Errors
///
/// Fails if any account already exists or a record is rejected.
pub fn seed_demo(state: &AppState, password: &SecretString) -> Result<SeedSummary, SeedError> {
    let credentials = state.credentials();
    let auth = AuthService::new(&credentials);
    let [owner1, owner2, owner3, customer1, customer2] = DEMO_USERS
        .map(|(email, name)| auth.register_user(email, name, password).map(|u| u.id));
    let (owner1, owner2, owner3) = (owner1?, owner2?, owner3?);
    let (customer1, customer2) = (customer1?, customer2?);

    let market = state.marketplace();
    let [ender, prusa, mars, bambu] = &DEMO_PRINTERS;
    let ender = market.create_printer(owner1, ender.listing()?)?;
    let prusa = market.create_printer(owner2, prusa.listing()?)?;
    market.create_printer(owner3, mars.listing()?)?;
    market.create_printer(owner1, bambu.listing()?)?;

    // A fresh request on the Ender, from the first customer.
    market.create_order(
        customer1,
        NewOrder {
            printer_id: ender.id,
            model_file_url: "/models/model1.stl".to_string(),
            model_file_name: "custom_part.stl".to_string(),
            total_price: Price::from_units(45)?,
        },
    )?;

    // An approved and paid job on the Prusa, from the second customer.
    let prototype = market.create_order(
        customer2,
        NewOrder {
            printer_id: prusa.id,
            model_file_url: "/models/model2.stl".to_string(),
            model_file_name: "prototype.stl".to_string(),
            total_price: Price::from_units(75)?,
        },
    )?;
    market.update_order(
        owner2,
        prototype.id,
        OrderPatch {
            status: Some(OrderStatus::Approved),
            payment_status: None,
        },
    )?;
    market.update_order(
        customer2,
        prototype.id,
        OrderPatch {
            status: None,
            payment_status: Some(PaymentStatus::Paid),
        },
    )?;

    let summary = SeedSummary {
        users: DEMO_USERS.len(),
        printers: DEMO_PRINTERS.len(),
        orders: 2,
    };
    info!(?summary, "demo data seeded");
    Ok(summary)
}
