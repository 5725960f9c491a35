//! Fixtures shared by the repository and issuer tests.

use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use crate::pool::{Database, DbConfig};
use folio_core::{
    CartLine, Customer, Discount, DiscountSelection, IssueInvoiceCommand, NumberingAuthorization, Product,
    SessionContext, TaxRate, Tender, User, WALK_IN_CUSTOMER_ID,
};

pub(crate) async fn test_db() -> Database {
    Database::new(DbConfig::in_memory()).await.unwrap()
}

pub(crate) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

/// Authorization valid for all of 2026 with prefix `000-002-01-`.
pub(crate) fn authorization(initial: i64, final_correlative: i64, active: bool) -> NumberingAuthorization {
    let mut auth = NumberingAuthorization::new(
        Uuid::new_v4().to_string(),
        "CAI-TEST".to_string(),
        "000-002-01-".to_string(),
        initial,
        final_correlative,
        date(2026, 1, 1),
        date(2026, 12, 31),
        Utc::now(),
    )
    .unwrap();
    auth.is_active = active;
    auth
}

pub(crate) fn product(sku: &str, price_cents: i64, rate: TaxRate, stock: i64) -> Product {
    let now = Utc::now();
    Product {
        id: Uuid::new_v4().to_string(),
        sku: sku.to_string(),
        name: format!("Product {sku}"),
        price_cents,
        tax_rate_bps: rate.bps(),
        current_stock: stock,
        is_active: true,
        created_at: now,
        updated_at: now,
    }
}

pub(crate) fn customer(name: &str, rtn: Option<&str>) -> Customer {
    Customer {
        id: Uuid::new_v4().to_string(),
        name: name.to_string(),
        rtn: rtn.map(str::to_string),
        is_active: true,
        created_at: Utc::now(),
    }
}

pub(crate) fn user(username: &str, active: bool) -> User {
    User {
        id: Uuid::new_v4().to_string(),
        username: username.to_string(),
        is_active: active,
        created_at: Utc::now(),
    }
}

pub(crate) fn discount(name: &str, percentage_bps: u32) -> Discount {
    Discount {
        id: Uuid::new_v4().to_string(),
        name: name.to_string(),
        percentage_bps,
        is_active: true,
        created_at: Utc::now(),
    }
}

/// Everything an issuance needs already stored.
pub(crate) struct Fixture {
    pub db: Database,
    pub authorization: NumberingAuthorization,
    pub customer: Customer,
    pub cashier: User,
    pub discount: Discount,
    /// 100.00 at 15%, 10 in stock.
    pub coffee: Product,
    /// 50.00 exempt, 3 in stock.
    pub rice: Product,
}

/// Seeds the walk-in customer, one identified customer, an active cashier,
/// a 10% discount, two products and an active authorization for `1..=final`.
pub(crate) async fn fixture(final_correlative: i64) -> Fixture {
    let db = test_db().await;
    seed_fixture(db, final_correlative).await
}

pub(crate) async fn seed_fixture(db: Database, final_correlative: i64) -> Fixture {
    let walk_in = Customer {
        id: WALK_IN_CUSTOMER_ID.to_string(),
        ..customer("Consumidor Final", None)
    };
    db.customers().insert(&walk_in).await.unwrap();

    let customer = db
        .customers()
        .insert(&customer("Acme Hardware", Some("08011999000123")))
        .await
        .unwrap();
    let cashier = db.users().insert(&user("cashier", true)).await.unwrap();
    let discount = db.discounts().insert(&discount("Ten percent", 1000)).await.unwrap();
    let coffee = db
        .products()
        .insert(&product("COFFEE-1LB", 10000, TaxRate::ISV_15, 10))
        .await
        .unwrap();
    let rice = db
        .products()
        .insert(&product("RICE-5LB", 5000, TaxRate::EXEMPT, 3))
        .await
        .unwrap();
    let authorization = db
        .numbering()
        .insert(&authorization(1, final_correlative, true))
        .await
        .unwrap();

    Fixture {
        db,
        authorization,
        customer,
        cashier,
        discount,
        coffee,
        rice,
    }
}

pub(crate) fn cart_line(product: &Product, quantity: i64) -> CartLine {
    CartLine {
        product_id: product.id.clone(),
        description: product.name.clone(),
        quantity,
        tax_id: format!("ISV-{}", product.tax_rate_bps),
        tax_rate: product.tax_rate(),
        unit_price_cents: product.price_cents,
    }
}

impl Fixture {
    /// A cash sale of `lines` to the walk-in customer on 2026-03-01.
    pub(crate) fn cash_command(&self, lines: Vec<CartLine>, paid_cents: i64) -> IssueInvoiceCommand {
        IssueInvoiceCommand {
            date: date(2026, 3, 1),
            customer_id: WALK_IN_CUSTOMER_ID.to_string(),
            authorization_id: self.authorization.id.clone(),
            session: SessionContext {
                user_id: self.cashier.id.clone(),
                cash_register_id: Some("REG-01".to_string()),
            },
            discount: None,
            lines,
            payments: vec![Tender {
                payment_type_id: "cash".to_string(),
                amount_cents: paid_cents,
            }],
            is_credit: false,
            credit_days: None,
        }
    }

    /// One coffee with the 10% discount: 90.00 + 13.50 tax = 103.50 due.
    pub(crate) fn coffee_sale(&self, paid_cents: i64) -> IssueInvoiceCommand {
        let mut command = self.cash_command(vec![cart_line(&self.coffee, 1)], paid_cents);
        command.discount = Some(DiscountSelection {
            discount_id: self.discount.id.clone(),
            percentage_bps: self.discount.percentage_bps,
        });
        command
    }
}
