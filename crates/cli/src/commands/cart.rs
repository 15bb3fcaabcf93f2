//! Cart commands.
//!
//! Every command prints the resulting cart, so `cart add 1` shows the new
//! amounts right away.

use rocketshoes_cart::{CartChange, CartError, CartStore, CartSummary, Notification, NotificationQueue};
use rocketshoes_core::{CurrencyCode, Price, Product, ProductId};

use super::format_price;

/// What to do with the cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartAction {
    Show,
    Add(ProductId),
    Remove(ProductId),
    Update(ProductId, u32),
}

/// Apply `action`, print notifications to stderr and the cart to stdout.
///
/// # Errors
///
/// Returns the operation's `CartError` after printing.
pub async fn run(
    store: &CartStore,
    queue: &NotificationQueue,
    action: CartAction,
) -> Result<(), CartError> {
    let result = match action {
        CartAction::Show => Ok(CartChange::Unchanged),
        CartAction::Add(id) => store.add_product(id).await,
        CartAction::Remove(id) => store.remove_product(id).await,
        CartAction::Update(id, amount) => store.update_product_amount(id, amount).await,
    };

    #[allow(clippy::print_stderr)]
    {
        for notification in queue.drain() {
            eprintln!("{}", render_notification(&notification));
        }
    }

    if let Ok(change) = &result {
        tracing::info!(change = %describe_change(change), "Cart command finished");
    }

    #[allow(clippy::print_stdout)]
    {
        print!(
            "{}",
            render_cart(&store.cart(), &store.summary(), store.locale().currency())
        );
    }

    result.map(|_| ())
}

fn render_notification(notification: &Notification) -> String {
    format!("! {} (product {})", notification.message, notification.product_id)
}

fn describe_change(change: &CartChange) -> String {
    match change {
        CartChange::Saved(line) => format!("product {} now x{}", line.id, line.amount),
        CartChange::Removed(line) => format!("product {} removed", line.id),
        CartChange::Unchanged => "no change".to_string(),
    }
}

/// Render the cart as a fixed-width table followed by totals.
pub fn render_cart(cart: &[Product], summary: &CartSummary, currency: CurrencyCode) -> String {
    if cart.is_empty() {
        return "Cart is empty\n".to_string();
    }

    let mut out = format!(
        "{:<6} {:>4} {:>12} {:>12}  TITLE\n",
        "ID", "QTY", "PRICE", "TOTAL"
    );
    for line in cart {
        out.push_str(&format!(
            "{:<6} {:>4} {:>12} {:>12}  {}\n",
            line.id,
            line.amount,
            format_price(line.price, currency),
            Price::new(line.line_total(), currency).display(),
            line.title
        ));
    }
    out.push_str(&format!(
        "{} item(s) in {} line(s), subtotal {}\n",
        summary.item_count,
        summary.line_count,
        summary.subtotal.display()
    ));
    out
}
