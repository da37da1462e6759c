//! # Demo Data
//!
//! Fills an empty database with a realistic store: staff accounts, an
//! Indian general-store catalogue, regular customers and a month of
//! invoices, so the dashboard and reports have something to show.
//!
//! ## Rules
//! - Runs only when the `users` table is empty; otherwise it does nothing.
//! - Everything is written in one transaction.
//! - Seeded invoices are history: they don't decrement stock.
//! - Customer aggregates are recomputed from the generated invoices and the
//!   daily invoice sequence is advanced, so the next live invoice of any
//!   seeded day continues the numbering instead of colliding.

use std::collections::BTreeMap;

use chrono::{Days, NaiveDateTime, NaiveTime};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;
use sqlx::{Sqlite, Transaction};
use tracing::info;

use billmaster_core::{format_invoice_number, PaymentMethod, PaymentStatus, Role, DEFAULT_INVOICE_PREFIX};

use crate::error::{DbError, DbResult};
use crate::password::hash_password;
use crate::pool::Database;
use crate::repository::timestamp;

/// Days of invoice history, counting back from today (today included).
pub const HISTORY_DAYS: u64 = 30;

const SEED_USERS: &[(&str, &str, &str, Role)] = &[
    ("admin", "admin123", "Admin User", Role::Admin),
    ("staff", "staff123", "Staff Member", Role::Staff),
    ("cashier1", "cashier123", "Ramesh Kumar", Role::Staff),
    ("cashier2", "cashier123", "Sunita Devi", Role::Staff),
    ("manager", "manager123", "Vijay Sharma", Role::Admin),
];

const SEED_CATEGORIES: &[(&str, &str)] = &[
    ("Groceries", "Daily grocery items and essentials"),
    ("Beverages", "Drinks, juices and soft drinks"),
    ("Snacks", "Chips, biscuits and packaged snacks"),
    ("Dairy", "Milk, cheese, butter and dairy products"),
    ("Personal Care", "Soaps, shampoos and hygiene products"),
    ("Stationery", "Pens, notebooks and office supplies"),
    ("Electronics", "Mobile accessories, chargers and gadgets"),
    ("Frozen Foods", "Frozen snacks, ice cream and ready-to-eat meals"),
    ("Cleaning Supplies", "Detergents, floor cleaners and disinfectants"),
    ("Baby Products", "Diapers, baby food and baby care items"),
    ("Spices & Masala", "Indian spices, masala powders and seasonings"),
];

/// (name, category, price in rupees, stock, unit, description)
type CatalogueEntry = (&'static str, &'static str, i64, i64, &'static str, &'static str);

const SEED_PRODUCTS: &[CatalogueEntry] = &[
    ("Basmati Rice (5kg)", "Groceries", 450, 50, "pcs", "Premium long grain basmati rice"),
    ("Toor Dal (1kg)", "Groceries", 160, 80, "pcs", "Yellow split lentils"),
    ("Sunflower Oil (1L)", "Groceries", 180, 40, "pcs", "Refined sunflower cooking oil"),
    ("Sugar (1kg)", "Groceries", 50, 100, "kg", "White sugar"),
    ("Wheat Flour (5kg)", "Groceries", 280, 35, "pcs", "Chakki fresh atta"),
    ("Maggi Noodles (12 pack)", "Groceries", 168, 90, "pcs", "Instant masala noodles"),
    ("Aashirvaad Atta (10kg)", "Groceries", 520, 25, "pcs", "Whole wheat flour"),
    ("Fortune Mustard Oil (1L)", "Groceries", 210, 35, "pcs", "Pure mustard oil"),
    ("Tata Salt (1kg)", "Groceries", 28, 120, "pcs", "Iodized table salt"),
    ("Saffola Gold Oil (1L)", "Groceries", 250, 30, "pcs", "Healthy cooking oil"),
    ("Rajma (1kg)", "Groceries", 140, 50, "pcs", "Red kidney beans"),
    ("Chana Dal (1kg)", "Groceries", 120, 55, "pcs", "Bengal gram split"),
    ("Poha (500g)", "Groceries", 40, 70, "pcs", "Flattened rice flakes"),
    ("Coca Cola (500ml)", "Beverages", 40, 120, "pcs", "Carbonated soft drink"),
    ("Pepsi (500ml)", "Beverages", 40, 100, "pcs", "Carbonated soft drink"),
    ("Mango Juice (1L)", "Beverages", 90, 60, "pcs", "Real mango fruit juice"),
    ("Green Tea (25 bags)", "Beverages", 150, 45, "pcs", "Organic green tea bags"),
    ("Mineral Water (1L)", "Beverages", 20, 200, "pcs", "Packaged drinking water"),
    ("Thumbs Up (750ml)", "Beverages", 45, 80, "pcs", "Cola soft drink"),
    ("Sprite (500ml)", "Beverages", 40, 90, "pcs", "Lemon lime soft drink"),
    ("Red Bull Energy (250ml)", "Beverages", 125, 40, "pcs", "Energy drink"),
    ("Tropicana Orange (1L)", "Beverages", 110, 35, "pcs", "Orange fruit juice"),
    ("Bisleri Water (2L)", "Beverages", 30, 150, "pcs", "Packaged drinking water"),
    ("Nescafe Coffee (50g)", "Beverages", 175, 45, "pcs", "Instant coffee powder"),
    ("Tata Tea Gold (500g)", "Beverages", 260, 40, "pcs", "Premium leaf tea"),
    ("Lays Classic (150g)", "Snacks", 60, 75, "pcs", "Classic salted potato chips"),
    ("Oreo Biscuits", "Snacks", 35, 90, "pcs", "Chocolate cream biscuits"),
    ("Mixed Nuts (250g)", "Snacks", 320, 25, "pcs", "Premium assorted dry fruits"),
    ("Kurkure (100g)", "Snacks", 30, 110, "pcs", "Masala crunch snack"),
    ("Haldiram Namkeen (200g)", "Snacks", 80, 65, "pcs", "Aloo bhujia mixture"),
    ("Dark Fantasy Biscuit", "Snacks", 45, 80, "pcs", "Choco filled cookies"),
    ("Cadbury Dairy Milk (110g)", "Snacks", 100, 70, "pcs", "Milk chocolate bar"),
    ("5 Star Chocolate", "Snacks", 20, 120, "pcs", "Caramel nougat bar"),
    ("Pringles Original (107g)", "Snacks", 199, 30, "pcs", "Stackable potato crisps"),
    ("Bingo Mad Angles", "Snacks", 20, 100, "pcs", "Achaari masti snack"),
    ("Amul Milk (500ml)", "Dairy", 30, 150, "pcs", "Full cream toned milk"),
    ("Cheddar Cheese (200g)", "Dairy", 180, 30, "pcs", "Processed cheddar cheese slices"),
    ("Amul Butter (200g)", "Dairy", 110, 40, "pcs", "Pasteurized salted butter"),
    ("Yoghurt (400g)", "Dairy", 45, 60, "pcs", "Fresh set yoghurt"),
    ("Paneer (200g)", "Dairy", 90, 40, "pcs", "Fresh cottage cheese"),
    ("Amul Lassi (200ml)", "Dairy", 25, 80, "pcs", "Sweet mango lassi"),
    ("Cream (200ml)", "Dairy", 65, 35, "pcs", "Fresh dairy cream"),
    ("Milkmaid (400g)", "Dairy", 155, 30, "pcs", "Sweetened condensed milk"),
    ("Dove Soap (100g)", "Personal Care", 65, 80, "pcs", "Moisturizing beauty bar"),
    ("Head & Shoulders (200ml)", "Personal Care", 230, 35, "pcs", "Anti-dandruff shampoo"),
    ("Colgate Toothpaste (150g)", "Personal Care", 85, 55, "pcs", "Cavity protection toothpaste"),
    ("Dettol Handwash (250ml)", "Personal Care", 95, 50, "pcs", "Antibacterial hand wash"),
    ("Nivea Body Lotion (200ml)", "Personal Care", 199, 30, "pcs", "Moisturizing body lotion"),
    ("Gillette Razor (Pack of 5)", "Personal Care", 120, 40, "pcs", "Disposable shaving razors"),
    ("Lux Soap (3 pack)", "Personal Care", 135, 55, "pcs", "Fragrant beauty soap"),
    ("Vaseline (100ml)", "Personal Care", 95, 45, "pcs", "Petroleum jelly"),
    ("Notebook (200 pages)", "Stationery", 60, 100, "pcs", "Ruled long notebook"),
    ("Ball Pen (Pack of 10)", "Stationery", 50, 70, "pcs", "Blue ink ball pens"),
    ("A4 Paper (500 sheets)", "Stationery", 350, 20, "pcs", "White A4 printing paper"),
    ("Marker Set (8 colors)", "Stationery", 120, 40, "pcs", "Permanent color markers"),
    ("Stapler with Pins", "Stationery", 85, 30, "pcs", "Desktop stapler set"),
    ("Scissors", "Stationery", 45, 50, "pcs", "Stainless steel scissors"),
    ("Glue Stick (Pack of 3)", "Stationery", 60, 65, "pcs", "Non-toxic glue sticks"),
    ("Sticky Notes (100 sheets)", "Stationery", 50, 80, "pcs", "Colorful sticky note pads"),
    ("iPhone Charger Cable", "Electronics", 299, 40, "pcs", "Lightning to USB-C cable"),
    ("Wireless Earbuds", "Electronics", 1499, 25, "pcs", "Bluetooth 5.0 TWS earbuds"),
    ("Power Bank 10000mAh", "Electronics", 899, 30, "pcs", "Fast charging portable charger"),
    ("USB-C Hub 4-in-1", "Electronics", 650, 20, "pcs", "Multi-port USB hub adapter"),
    ("Phone Screen Guard", "Electronics", 149, 100, "pcs", "Tempered glass protector"),
    ("LED Desk Lamp", "Electronics", 599, 15, "pcs", "Rechargeable study lamp"),
    ("Bluetooth Speaker", "Electronics", 1299, 18, "pcs", "Portable waterproof speaker"),
    ("Mouse Wireless", "Electronics", 399, 35, "pcs", "Ergonomic wireless mouse"),
    ("Frozen Samosa (12pcs)", "Frozen Foods", 120, 50, "pcs", "Ready to fry samosas"),
    ("Ice Cream Vanilla (1L)", "Frozen Foods", 199, 30, "pcs", "Vanilla ice cream tub"),
    ("Frozen Pizza (Medium)", "Frozen Foods", 250, 25, "pcs", "Cheese burst frozen pizza"),
    ("Frozen Momos (20pcs)", "Frozen Foods", 150, 40, "pcs", "Chicken momos ready to steam"),
    ("Frozen French Fries (500g)", "Frozen Foods", 130, 45, "pcs", "Crispy french fries"),
    ("Ice Cream Chocolate (1L)", "Frozen Foods", 220, 28, "pcs", "Rich chocolate ice cream"),
    ("Surf Excel (1kg)", "Cleaning Supplies", 195, 60, "pcs", "Washing powder detergent"),
    ("Lizol Floor Cleaner (1L)", "Cleaning Supplies", 175, 45, "pcs", "Citrus floor disinfectant"),
    ("Vim Dishwash Gel (500ml)", "Cleaning Supplies", 110, 55, "pcs", "Lemon dishwashing liquid"),
    ("Harpic Toilet Cleaner", "Cleaning Supplies", 95, 50, "pcs", "Powerful toilet cleaner"),
    ("Colin Glass Cleaner", "Cleaning Supplies", 85, 35, "pcs", "Streak-free glass cleaner"),
    ("Scotch Brite Scrub Pad", "Cleaning Supplies", 30, 100, "pcs", "Heavy duty scrub pad"),
    ("Room Freshener (300ml)", "Cleaning Supplies", 199, 30, "pcs", "Room freshener spray"),
    ("Pampers Diapers (M, 20pcs)", "Baby Products", 450, 40, "pcs", "Medium size baby diapers"),
    ("Cerelac Baby Food (300g)", "Baby Products", 280, 35, "pcs", "Wheat apple baby cereal"),
    ("Johnson Baby Soap", "Baby Products", 75, 60, "pcs", "Gentle baby bath soap"),
    ("Baby Wipes (72pcs)", "Baby Products", 150, 50, "pcs", "Gentle cleansing wipes"),
    ("Johnson Baby Oil (200ml)", "Baby Products", 180, 30, "pcs", "Moisturizing baby oil"),
    ("Baby Powder (200g)", "Baby Products", 120, 45, "pcs", "Talcum powder for babies"),
    ("Turmeric Powder (200g)", "Spices & Masala", 55, 80, "pcs", "Pure haldi powder"),
    ("Red Chilli Powder (200g)", "Spices & Masala", 65, 70, "pcs", "Kashmiri mirch powder"),
    ("Garam Masala (100g)", "Spices & Masala", 75, 60, "pcs", "Garam masala blend"),
    ("Coriander Powder (200g)", "Spices & Masala", 45, 75, "pcs", "Dhaniya powder"),
    ("Cumin Seeds (100g)", "Spices & Masala", 60, 65, "pcs", "Whole jeera seeds"),
    ("Black Pepper (100g)", "Spices & Masala", 120, 40, "pcs", "Whole black peppercorns"),
    ("Biryani Masala (50g)", "Spices & Masala", 55, 50, "pcs", "Special biryani spice mix"),
    ("Kitchen King Masala (100g)", "Spices & Masala", 70, 55, "pcs", "All-purpose cooking masala"),
];

const SEED_CUSTOMERS: &[(&str, &str, &str, &str)] = &[
    ("Rahul Sharma", "9876543210", "rahul@example.com", "12, MG Road, Mumbai"),
    ("Priya Patel", "9876543211", "priya@example.com", "45, Park Street, Delhi"),
    ("Amit Kumar", "9876543212", "amit@example.com", "78, Lake View, Bangalore"),
    ("Sneha Reddy", "9876543213", "sneha@example.com", "23, Beach Road, Chennai"),
    ("Vikram Singh", "9876543214", "vikram@example.com", "56, Civil Lines, Jaipur"),
    ("Arjun Mehta", "9871234501", "arjun@example.com", "10, Sector 21, Noida"),
    ("Deepika Joshi", "9871234502", "deepika@example.com", "34, Jayanagar, Bangalore"),
    ("Ravi Verma", "9871234503", "ravi@example.com", "88, Banjara Hills, Hyderabad"),
    ("Anjali Gupta", "9871234504", "anjali@example.com", "5, Connaught Place, Delhi"),
    ("Suresh Iyer", "9871234505", "suresh@example.com", "67, Anna Nagar, Chennai"),
    ("Kavita Deshmukh", "9871234506", "kavita@example.com", "12, FC Road, Pune"),
    ("Mohammed Farooq", "9871234507", "farooq@example.com", "9, Charminar Road, Hyderabad"),
    ("Nisha Agarwal", "9871234508", "nisha@example.com", "45, Mall Road, Lucknow"),
    ("Rajesh Nair", "9871234509", "rajesh@example.com", "23, MG Road, Kochi"),
    ("Pooja Saxena", "9871234510", "pooja@example.com", "78, Hazratganj, Lucknow"),
    ("Sanjay Tiwari", "9871234511", "sanjay@example.com", "56, Civil Lines, Allahabad"),
    ("Meera Krishnan", "9871234512", "meera@example.com", "30, T Nagar, Chennai"),
    ("Aditya Kapoor", "9871234513", "aditya@example.com", "15, Sector 44, Gurgaon"),
    ("Shreya Das", "9871234514", "shreya@example.com", "8, Salt Lake, Kolkata"),
    ("Karan Malhotra", "9871234515", "karan@example.com", "42, Model Town, Jalandhar"),
];

const SEED_SETTINGS: &[(&str, &str)] = &[
    ("business_name", "BillMaster Pro Store"),
    ("business_address", "123, Main Street, City Center"),
    ("business_phone", "+91 98765 43210"),
    ("business_email", "store@billmaster.com"),
    ("currency_symbol", "₹"),
    ("tax_rate", "0"),
    ("invoice_prefix", DEFAULT_INVOICE_PREFIX),
];

const SEED_PAYMENT_METHODS: [PaymentMethod; 4] = [
    PaymentMethod::Cash,
    PaymentMethod::Card,
    PaymentMethod::Upi,
    PaymentMethod::BankTransfer,
];

/// What a seeding run inserted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SeedReport {
    /// True when the database already had users and nothing was written.
    pub skipped: bool,
    pub users: usize,
    pub categories: usize,
    pub products: usize,
    pub customers: usize,
    pub invoices: usize,
}

impl SeedReport {
    pub fn skipped() -> Self {
        SeedReport {
            skipped: true,
            ..Default::default()
        }
    }
}

struct SeededProduct {
    id: i64,
    name: &'static str,
    price_cents: i64,
}

/// Seeds demo data as of `now`, unless the database already has users.
pub async fn seed_demo_data<R: Rng + ?Sized>(
    db: &Database,
    rng: &mut R,
    now: NaiveDateTime,
) -> DbResult<SeedReport> {
    if db.users().count().await? > 0 {
        info!("Database already has users, skipping demo seed");
        return Ok(SeedReport::skipped());
    }

    // Hashing is CPU-bound; do it before the write lock is taken
    let mut hashed_users = Vec::with_capacity(SEED_USERS.len());
    for (username, password, full_name, role) in SEED_USERS {
        hashed_users.push((*username, hash_password(password)?, *full_name, *role));
    }

    let mut tx = db.pool().begin().await?;
    let created_at = timestamp(now);

    for (username, password_hash, full_name, role) in &hashed_users {
        sqlx::query(
            "INSERT INTO users (username, password_hash, full_name, role, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(username)
        .bind(password_hash)
        .bind(full_name)
        .bind(role)
        .bind(&created_at)
        .execute(&mut *tx)
        .await?;
    }

    let mut category_ids = BTreeMap::new();
    for (name, description) in SEED_CATEGORIES {
        let id = sqlx::query("INSERT INTO categories (name, description, created_at) VALUES (?1, ?2, ?3)")
            .bind(name)
            .bind(description)
            .bind(&created_at)
            .execute(&mut *tx)
            .await?
            .last_insert_rowid();
        category_ids.insert(*name, id);
    }

    let mut products = Vec::with_capacity(SEED_PRODUCTS.len());
    for (name, category, price, stock, unit, description) in SEED_PRODUCTS {
        let category_id = category_ids
            .get(category)
            .copied()
            .ok_or_else(|| DbError::Internal(format!("Unknown seed category '{}'", category)))?;
        let price_cents = price * 100;

        let id = sqlx::query(
            r#"
            INSERT INTO products
                (name, description, category_id, price_cents, stock_quantity, unit, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)
            "#,
        )
        .bind(name)
        .bind(description)
        .bind(category_id)
        .bind(price_cents)
        .bind(stock)
        .bind(unit)
        .bind(&created_at)
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

        products.push(SeededProduct {
            id,
            name,
            price_cents,
        });
    }

    let mut customers = Vec::with_capacity(SEED_CUSTOMERS.len());
    for (name, phone, email, address) in SEED_CUSTOMERS {
        let id = sqlx::query(
            "INSERT INTO customers (name, phone, email, address, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(name)
        .bind(phone)
        .bind(email)
        .bind(address)
        .bind(&created_at)
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();
        customers.push((id, *name));
    }

    for (key, value) in SEED_SETTINGS {
        sqlx::query(
            "INSERT INTO settings (key, value) VALUES (?1, ?2) ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        )
        .bind(key)
        .bind(value)
        .execute(&mut *tx)
        .await?;
    }

    let invoices = seed_invoices(&mut tx, rng, now, &products, &customers).await?;

    sqlx::query(
        r#"
        UPDATE customers SET
            total_orders = (SELECT COUNT(*) FROM invoices WHERE customer_id = customers.id),
            total_spent_cents = (
                SELECT COALESCE(SUM(total_cents), 0) FROM invoices WHERE customer_id = customers.id
            )
        "#,
    )
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    let report = SeedReport {
        skipped: false,
        users: hashed_users.len(),
        categories: SEED_CATEGORIES.len(),
        products: products.len(),
        customers: customers.len(),
        invoices,
    };
    info!(?report, "Demo data seeded");

    Ok(report)
}

/// Generates the invoice history, oldest day first.
async fn seed_invoices<R: Rng + ?Sized>(
    tx: &mut Transaction<'_, Sqlite>,
    rng: &mut R,
    now: NaiveDateTime,
    products: &[SeededProduct],
    customers: &[(i64, &'static str)],
) -> DbResult<usize> {
    let mut total = 0;

    for days_back in (0..=HISTORY_DAYS).rev() {
        let day = now
            .date()
            .checked_sub_days(Days::new(days_back))
            .ok_or_else(|| DbError::Internal("Seed date out of range".to_string()))?;
        let per_day: i64 = rng.gen_range(3..=8);

        // Sort times so numbering follows the clock within a day
        let mut times: Vec<NaiveTime> = (0..per_day)
            .filter_map(|_| NaiveTime::from_hms_opt(rng.gen_range(8..=21), rng.gen_range(0..=59), 0))
            .collect();
        times.sort();

        for (idx, time) in times.iter().enumerate() {
            let seq = idx as i64 + 1;
            let invoice_number = format_invoice_number(DEFAULT_INVOICE_PREFIX, day, seq);

            let customer = if rng.gen_bool(0.65) {
                customers.choose(rng)
            } else {
                None
            };

            let line_count = rng.gen_range(1..=5);
            let picked: Vec<&SeededProduct> = products.choose_multiple(rng, line_count).collect();
            let lines: Vec<(&SeededProduct, i64)> = picked
                .into_iter()
                .map(|p| (p, rng.gen_range(1..=3)))
                .collect();
            let subtotal: i64 = lines.iter().map(|(p, qty)| p.price_cents * qty).sum();

            let payment_method = SEED_PAYMENT_METHODS
                .choose(rng)
                .copied()
                .unwrap_or_default();
            let payment_status = if rng.gen_bool(0.88) {
                PaymentStatus::Paid
            } else {
                PaymentStatus::Pending
            };

            let invoice_id = sqlx::query(
                r#"
                INSERT INTO invoices
                    (invoice_number, customer_id, customer_name, subtotal_cents, tax_rate_bps,
                     tax_amount_cents, discount_cents, total_cents, payment_method, payment_status,
                     created_at)
                VALUES (?1, ?2, ?3, ?4, 0, 0, 0, ?4, ?5, ?6, ?7)
                "#,
            )
            .bind(&invoice_number)
            .bind(customer.map(|(id, _)| *id))
            .bind(customer.map(|(_, name)| *name))
            .bind(subtotal)
            .bind(payment_method)
            .bind(payment_status)
            .bind(timestamp(day.and_time(*time)))
            .execute(&mut **tx)
            .await?
            .last_insert_rowid();

            for (product, quantity) in &lines {
                sqlx::query(
                    r#"
                    INSERT INTO invoice_items
                        (invoice_id, product_id, product_name, quantity, unit_price_cents, total_price_cents)
                    VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                    "#,
                )
                .bind(invoice_id)
                .bind(product.id)
                .bind(product.name)
                .bind(quantity)
                .bind(product.price_cents)
                .bind(product.price_cents * quantity)
                .execute(&mut **tx)
                .await?;
            }
        }

        if !times.is_empty() {
            sqlx::query(
                r#"
                INSERT INTO invoice_sequences (day, last_seq) VALUES (?1, ?2)
                ON CONFLICT(day) DO UPDATE SET last_seq = MAX(last_seq, excluded.last_seq)
                "#,
            )
            .bind(day.format("%Y%m%d").to_string())
            .bind(times.len() as i64)
            .execute(&mut **tx)
            .await?;
        }

        total += times.len();
    }

    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DbConfig;
    use billmaster_core::{CartLine, CartRequest};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn now() -> NaiveDateTime {
        chrono::NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(23, 0, 0)
            .unwrap()
    }

    #[tokio::test]
    async fn test_seed_populates_store() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut rng = StdRng::seed_from_u64(7);

        let report = seed_demo_data(&db, &mut rng, now()).await.unwrap();
        assert!(!report.skipped);
        assert_eq!(report.users, 5);
        assert_eq!(report.categories, 11);
        assert_eq!(report.products, SEED_PRODUCTS.len());
        assert_eq!(report.customers, 20);
        assert!(report.invoices >= 31 * 3 && report.invoices <= 31 * 8);

        // Stock untouched by history
        let rice = db.products().get(1).await.unwrap();
        assert_eq!(rice.stock_quantity, 50);

        // Aggregates match the invoices
        let (orders, spent): (i64, i64) = sqlx::query_as(
            "SELECT COALESCE(SUM(total_orders), 0), COALESCE(SUM(total_spent_cents), 0) FROM customers",
        )
        .fetch_one(db.pool())
        .await
        .unwrap();
        let (linked, linked_total): (i64, i64) = sqlx::query_as(
            "SELECT COUNT(*), COALESCE(SUM(total_cents), 0) FROM invoices WHERE customer_id IS NOT NULL",
        )
        .fetch_one(db.pool())
        .await
        .unwrap();
        assert_eq!(orders, linked);
        assert_eq!(spent, linked_total);

        let admin = db.users().find_by_username("admin").await.unwrap().unwrap();
        assert!(crate::password::verify_password("admin123", &admin.password_hash));
    }

    #[tokio::test]
    async fn test_live_invoice_continues_seeded_sequence() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut rng = StdRng::seed_from_u64(11);
        seed_demo_data(&db, &mut rng, now()).await.unwrap();

        let seeded_today: i64 = sqlx::query_scalar("SELECT last_seq FROM invoice_sequences WHERE day = '20240309'")
            .fetch_one(db.pool())
            .await
            .unwrap();

        let cart = CartRequest {
            items: vec![CartLine {
                product_id: 1,
                quantity: 1,
                unit_price_cents: 45_000,
            }],
            ..CartRequest::default()
        };
        let created = db.invoices().create_at(&cart, Some(1), now()).await.unwrap();
        assert_eq!(
            created.invoice_number,
            format!("INV-20240309-{:04}", seeded_today + 1)
        );
    }

    #[tokio::test]
    async fn test_seed_skips_when_users_exist() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.users().ensure_default_admin().await.unwrap();

        let mut rng = StdRng::seed_from_u64(1);
        let report = seed_demo_data(&db, &mut rng, now()).await.unwrap();
        assert_eq!(report, SeedReport::skipped());
        assert_eq!(db.products().count_active().await.unwrap(), 0);
    }
}
