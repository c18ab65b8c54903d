//! Seeds a small in-memory database and prints the orders with their items.
//!
//! ```sh
//! cargo run --example orders
//! ```
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, CellAlignment, Table};
use select_bench::fixtures::{self, Dataset};
use select_bench::strategies::{Strategy, StructMapping};
use select_bench::{Connection, Result};

fn main() -> Result<()> {
    select_bench::register_drivers();
    let dataset = Dataset::new(10, 3).with_empty_orders(2);
    let mut conn = Connection::open("sqlite:///:memory:")?;
    fixtures::seed(&mut conn, &dataset)?;

    let orders = StructMapping::fetch_all(&mut conn)?;
    fixtures::verify(&dataset, &orders)?;

    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec!["Order", "Customer", "Created at", "Items", "Total"]);
    for order in &orders {
        let created_at = match order.parent.created_at {
            Some(created_at) => created_at.to_rfc3339(),
            None => "-".to_string(),
        };
        let total: f64 =
            order.children.iter().map(|item| item.price * item.quantity.unwrap_or(1) as f64).sum();
        table.add_row(vec![
            Cell::new(order.parent.id).set_alignment(CellAlignment::Right),
            Cell::new(&order.parent.customer_name),
            Cell::new(created_at),
            Cell::new(order.children.len()).set_alignment(CellAlignment::Right),
            Cell::new(format!("{:.2}", total)).set_alignment(CellAlignment::Right),
        ]);
    }
    println!("{table}");

    conn.close()
}
