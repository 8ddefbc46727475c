//! Database seeder for Staffline development and testing.
//!
//! Seeds the system actor, a few demo employees, and opening leave balances
//! for local development and testing purposes. Opening balances go through
//! the ledger so the audit trail stays complete.
//!
//! Usage: cargo run --bin seeder

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use uuid::Uuid;

use staffline_core::leave::{Actor, ActorRole, LeaveLedger, LeaveType};
use staffline_db::entities::employees;
use staffline_db::{SqlBalanceStore, SqlEmployeeDirectory};
use staffline_shared::types::EmployeeId;

/// Demo employee IDs (consistent for all seeds)
const DEMO_EMPLOYEES: &[(&str, &str, &str)] = &[
    (
        "00000000-0000-0000-0000-000000000101",
        "Asha Verma",
        "asha.verma@staffline.dev",
    ),
    (
        "00000000-0000-0000-0000-000000000102",
        "Rahul Nair",
        "rahul.nair@staffline.dev",
    ),
    (
        "00000000-0000-0000-0000-000000000103",
        "Meera Iyer",
        "meera.iyer@staffline.dev",
    ),
];

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let database_url =
        std::env::var("DATABASE_URL").expect("DATABASE_URL must be set in environment");

    println!("Connecting to database...");
    let db = staffline_db::connect(&database_url)
        .await
        .expect("Failed to connect to database");

    println!("Seeding system actor...");
    seed_system_actor(&db).await;

    println!("Seeding demo employees...");
    seed_demo_employees(&db).await;

    println!("Seeding opening balances...");
    seed_opening_balances(&db).await;

    println!("Seeding complete!");
}

/// Seeds the well-known system actor used by scheduled jobs.
///
/// Marked inactive so the accrual batch never credits leave for it.
async fn seed_system_actor(db: &DatabaseConnection) {
    if employees::Entity::find_by_id(EmployeeId::SYSTEM.into_inner())
        .one(db)
        .await
        .ok()
        .flatten()
        .is_some()
    {
        println!("  System actor already exists, skipping...");
        return;
    }

    let system = employees::ActiveModel {
        id: Set(EmployeeId::SYSTEM.into_inner()),
        full_name: Set("Staffline System".to_string()),
        email: Set("system@staffline.dev".to_string()),
        is_active: Set(false),
        created_at: Set(Utc::now().into()),
        updated_at: Set(Utc::now().into()),
    };

    if let Err(e) = system.insert(db).await {
        eprintln!("Failed to insert system actor: {e}");
    } else {
        println!("  Created system actor: system@staffline.dev");
    }
}

/// Seeds demo employees for development.
async fn seed_demo_employees(db: &DatabaseConnection) {
    for (id, name, email) in DEMO_EMPLOYEES {
        let id = Uuid::parse_str(id).expect("invalid demo employee id");
        if employees::Entity::find_by_id(id)
            .one(db)
            .await
            .ok()
            .flatten()
            .is_some()
        {
            println!("  {name} already exists, skipping...");
            continue;
        }

        let employee = employees::ActiveModel {
            id: Set(id),
            full_name: Set((*name).to_string()),
            email: Set((*email).to_string()),
            is_active: Set(true),
            created_at: Set(Utc::now().into()),
            updated_at: Set(Utc::now().into()),
        };

        if let Err(e) = employee.insert(db).await {
            eprintln!("Failed to insert {name}: {e}");
        } else {
            println!("  Created employee: {email}");
        }
    }
}

/// Seeds opening balances through the ledger so every credit is audited.
async fn seed_opening_balances(db: &DatabaseConnection) {
    let ledger = LeaveLedger::new(
        Arc::new(SqlBalanceStore::new(db.clone())),
        Arc::new(SqlEmployeeDirectory::new(db.clone())),
    );
    let actor = Actor::new(EmployeeId::SYSTEM, ActorRole::SuperAdmin);

    let openings: &[(&str, Decimal, Decimal)] = &[
        ("00000000-0000-0000-0000-000000000101", dec!(4), dec!(4)),
        ("00000000-0000-0000-0000-000000000102", dec!(8.5), dec!(2)),
        ("00000000-0000-0000-0000-000000000103", dec!(1), dec!(0.5)),
    ];

    for (id, casual, sick) in openings {
        let employee = EmployeeId::from_uuid(Uuid::parse_str(id).expect("invalid demo employee id"));

        let already_seeded = ledger
            .get_balance(employee)
            .await
            .map(|b| !b.casual.is_zero() || !b.sick.is_zero())
            .unwrap_or(true);
        if already_seeded {
            println!("  Balances for {employee} already seeded, skipping...");
            continue;
        }

        if let Err(e) = ledger
            .manual_adjust(employee, LeaveType::Casual, *casual, &actor)
            .await
        {
            eprintln!("Failed to seed casual balance for {employee}: {e}");
        }
        if let Err(e) = ledger
            .manual_adjust(employee, LeaveType::Sick, *sick, &actor)
            .await
        {
            eprintln!("Failed to seed sick balance for {employee}: {e}");
        }
        println!("  Seeded opening balances for {employee}");
    }
}
