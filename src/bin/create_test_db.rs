use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use time::{Duration, OffsetDateTime};

use bizbook_rs::{
    CategoryName, Currency, CustomerForm, DaybookEntryForm, EntryKind, InventoryItemForm,
    InvoiceForm, LedgerEntryForm, NewTransaction, PaymentStatus, StaffForm, TransactionType,
    UserId, create_category, create_customer, create_daybook_entry, create_inventory_item,
    create_invoice, create_ledger_entry, create_staff, create_transaction, initialize_db,
    update_currency,
};

/// A utility for creating a test database for the REST API server of bizbook_rs.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,

    /// The identity provider's ID of the user that owns the demo data.
    #[arg(long, short, default_value = "test_user")]
    user_id: String,
}

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        None => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        Some(extension) if extension.is_empty() => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        _ => {}
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    let user_id = UserId::new(&args.user_id);
    let today = OffsetDateTime::now_utc().date();

    println!("Creating demo data for {user_id}...");

    update_currency(&user_id, Currency::USD, &conn)?;

    for (name, icon, category_type) in [
        ("Sales", "🛒", TransactionType::Income),
        ("Consulting", "💼", TransactionType::Income),
        ("Rent", "🏠", TransactionType::Expense),
        ("Supplies", "📦", TransactionType::Expense),
        ("Wages", "👷", TransactionType::Expense),
    ] {
        create_category(&user_id, CategoryName::new(name)?, icon, category_type, &conn)?;
    }

    for (days_ago, amount, category, transaction_type, description) in [
        (40, 1800.0, "Rent", TransactionType::Expense, "Shop rent"),
        (35, 4250.0, "Sales", TransactionType::Income, "Counter sales"),
        (20, 320.5, "Supplies", TransactionType::Expense, "Packaging"),
        (12, 1500.0, "Consulting", TransactionType::Income, "Shop fit-out advice"),
        (10, 2600.0, "Wages", TransactionType::Expense, "Fortnightly wages"),
        (5, 980.0, "Main Bank", TransactionType::Income, "Transfer in"),
        (1, 3120.75, "Sales", TransactionType::Income, "Counter sales"),
    ] {
        create_transaction(
            &user_id,
            NewTransaction {
                amount,
                category: category.to_owned(),
                date: today - Duration::days(days_ago),
                transaction_type,
                description: description.to_owned(),
            },
            &conn,
        )?;
    }

    for (name, email, phone) in [
        ("Aroha Cafe", "orders@arohacafe.test", "021 555 0101"),
        ("Bellbird Books", "accounts@bellbird.test", "021 555 0102"),
        ("Walk-in customer", "", ""),
    ] {
        create_customer(
            &user_id,
            CustomerForm {
                name: name.to_owned(),
                email: Some(email.to_owned()),
                phone: phone.to_owned(),
                address: String::new(),
            },
            &conn,
        )?;
    }

    for (name, sku, quantity, unit_price, reorder_level) in [
        ("Coffee beans 1kg", "BEAN-1KG", 24, 32.0, 10),
        ("Paper cups (50)", "CUP-50", 6, 7.5, 8),
        ("Oat milk 1L", "OAT-1L", 0, 3.9, 12),
    ] {
        create_inventory_item(
            &user_id,
            InventoryItemForm {
                name: name.to_owned(),
                sku: sku.to_owned(),
                quantity,
                unit_price,
                reorder_level,
            },
            &conn,
        )?;
    }

    for (name, role, salary, joined_days_ago) in [
        ("Mere Parata", "Manager", 68000.0, 900),
        ("Sam Lee", "Barista", 48000.0, 200),
    ] {
        create_staff(
            &user_id,
            StaffForm {
                name: name.to_owned(),
                role: role.to_owned(),
                email: String::new(),
                phone: String::new(),
                salary,
                joined_on: today - Duration::days(joined_days_ago),
            },
            &conn,
        )?;
    }

    for (number, customer_name, amount, issued_days_ago, payment_status) in [
        ("INV-0001", "Aroha Cafe", 640.0, 60, PaymentStatus::Paid),
        ("INV-0002", "Bellbird Books", 1250.0, 45, PaymentStatus::Unpaid),
        ("INV-0003", "Aroha Cafe", 410.0, 3, PaymentStatus::Unpaid),
    ] {
        let issued_on = today - Duration::days(issued_days_ago);
        create_invoice(
            &user_id,
            InvoiceForm {
                invoice_number: number.to_owned(),
                customer_name: customer_name.to_owned(),
                amount,
                issued_on,
                due_on: issued_on + Duration::days(30),
                payment_status,
            },
            &conn,
        )?;
    }

    for (ledger, description, kind, amount, days_ago) in [
        ("Bank", "Opening balance", EntryKind::Credit, 10000.0, 30),
        ("Bank", "Supplier payment", EntryKind::Debit, 820.0, 14),
        ("Bank", "Card settlements", EntryKind::Credit, 2310.0, 2),
        ("Salary", "Fortnightly wages", EntryKind::Debit, 2600.0, 10),
    ] {
        create_ledger_entry(
            &user_id,
            LedgerEntryForm {
                ledger: ledger.to_owned(),
                description: description.to_owned(),
                kind,
                amount,
                date: today - Duration::days(days_ago),
            },
            &conn,
        )?;
    }

    for (description, entry_type, amount, days_ago) in [
        ("Cash sales", TransactionType::Income, 540.0, 1),
        ("Milk delivery", TransactionType::Expense, 86.4, 1),
        ("Cash sales", TransactionType::Income, 495.5, 0),
    ] {
        create_daybook_entry(
            &user_id,
            DaybookEntryForm {
                description: description.to_owned(),
                entry_type,
                amount,
                date: today - Duration::days(days_ago),
            },
            &conn,
        )?;
    }

    println!("Success!");

    Ok(())
}
