//! Output formatting for the CLI.

use cart_core::{Cart, Currency};
use cart_store::{Failure, Notifier};
use console::style;

/// Output handler for CLI messages.
#[derive(Clone)]
pub struct Output {
    verbose: bool,
    json: bool,
}

impl Output {
    /// Create a new output handler.
    pub fn new(verbose: bool, json: bool) -> Self {
        Self { verbose, json }
    }

    /// Print an info message.
    pub fn info(&self, msg: &str) {
        if self.json {
            return;
        }
        println!("{} {}", style("ℹ").blue(), msg);
    }

    /// Print a success message.
    pub fn success(&self, msg: &str) {
        if self.json {
            return;
        }
        println!("{} {}", style("✓").green(), msg);
    }

    /// Print a warning message.
    pub fn warn(&self, msg: &str) {
        if self.json {
            return;
        }
        eprintln!("{} {}", style("⚠").yellow(), msg);
    }

    /// Print an error message.
    pub fn error(&self, msg: &str) {
        if self.json {
            eprintln!("{}", serde_json::json!({ "error": msg }));
            return;
        }
        eprintln!("{} {}", style("✗").red(), style(msg).red());
    }

    /// Print a debug message (only in verbose mode).
    pub fn debug(&self, msg: &str) {
        if !self.verbose || self.json {
            return;
        }
        eprintln!("{} {}", style("→").dim(), style(msg).dim());
    }

    /// Print a header/title.
    pub fn header(&self, msg: &str) {
        if self.json {
            return;
        }
        println!("\n{}", style(msg).bold().underlined());
    }

    /// Print JSON output.
    pub fn json<T: serde::Serialize>(&self, value: &T) {
        if let Ok(json) = serde_json::to_string_pretty(value) {
            println!("{}", json);
        }
    }

    /// Print a key-value pair.
    pub fn kv(&self, key: &str, value: &str) {
        if self.json {
            return;
        }
        println!("  {}: {}", style(key).dim(), value);
    }

    /// Print a table row.
    pub fn table_row(&self, cols: &[&str], widths: &[usize]) {
        if self.json {
            return;
        }
        println!("  {}", format_row(cols, widths));
    }

    /// Print the cart as a table, or as JSON in JSON mode.
    pub fn cart(&self, cart: &Cart, currency: Currency) {
        if self.json {
            self.json(cart);
            return;
        }

        if cart.is_empty() {
            self.info("Cart is empty.");
            return;
        }

        let rows = cart_rows(cart, currency);
        let widths = column_widths(&rows);

        self.header(&format!("Cart ({} items)", cart.item_count()));
        for (i, row) in rows.iter().enumerate() {
            let cols: Vec<&str> = row.iter().map(String::as_str).collect();
            if i == 0 {
                println!("  {}", style(format_row(&cols, &widths)).dim());
            } else {
                self.table_row(&cols, &widths);
            }
        }
        println!();
        self.kv("Total", &cart.total().display(currency));
    }

    /// Check if JSON mode is enabled.
    pub fn is_json(&self) -> bool {
        self.json
    }
}

impl Notifier for Output {
    fn notify(&self, failure: &Failure<'_>) {
        self.error(failure.notice.message());
        self.debug(&format!(
            "{} {} failed: {}",
            failure.operation, failure.product_id, failure.error
        ));
    }
}

/// Header plus one row per entry: id, product, price, amount, subtotal.
fn cart_rows(cart: &Cart, currency: Currency) -> Vec<Vec<String>> {
    let header = ["ID", "PRODUCT", "PRICE", "QTY", "SUBTOTAL"]
        .iter()
        .map(|s| s.to_string())
        .collect();

    std::iter::once(header)
        .chain(cart.iter().map(|entry| {
            vec![
                entry.id.to_string(),
                entry.name.clone(),
                entry.price.display(currency),
                entry.amount.to_string(),
                entry.subtotal().display(currency),
            ]
        }))
        .collect()
}

fn column_widths(rows: &[Vec<String>]) -> Vec<usize> {
    let columns = rows.first().map_or(0, Vec::len);
    (0..columns)
        .map(|c| {
            rows.iter()
                .filter_map(|row| row.get(c))
                .map(|cell| cell.chars().count())
                .max()
                .unwrap_or(0)
        })
        .collect()
}

fn format_row(cols: &[&str], widths: &[usize]) -> String {
    let formatted: Vec<String> = cols
        .iter()
        .zip(widths.iter())
        .map(|(col, width)| format!("{:width$}", col, width = width))
        .collect();
    formatted.join("  ")
}
