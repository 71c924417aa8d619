//! Markup for controller-created elements.
//!
//! The notification and cart overlay elements are built from askama
//! templates; the global stylesheet that positions them is injected once at
//! startup.

use askama::Template;

use crate::modal::CartModalView;
use crate::notifications::{NotificationPhase, Severity};

/// Notification element template.
#[derive(Template)]
#[template(
    source = r#"<div class="notification notification-{{ severity }}" role="status" style="background: {{ color }}; transform: {{ transform }}">{{ message }}</div>"#,
    ext = "html"
)]
struct NotificationTemplate<'a> {
    message: &'a str,
    severity: &'a str,
    color: &'a str,
    transform: &'a str,
}

/// Cart overlay template.
#[derive(Template)]
#[template(
    source = r#"<div class="cart-modal">
    <div class="cart-modal-content">
        <div class="cart-modal-header">
            <h3>Shopping Cart ({{ view.item_count }} items)</h3>
            <button class="close-modal">&times;</button>
        </div>
        <div class="cart-items">
            {% for row in view.rows %}
            <div class="cart-item">
                <img src="{{ row.image }}" alt="{{ row.name }}">
                <div class="cart-item-details">
                    <h4>{{ row.name }}</h4>
                    <p>{{ row.price }} x {{ row.quantity }}</p>
                </div>
                <button class="remove-item" data-name="{{ row.name }}">&times;</button>
            </div>
            {% endfor %}
        </div>
        <div class="cart-total">
            <strong>{{ total_label }}</strong>
        </div>
        <div class="cart-actions">
            <button class="clear-cart">Clear Cart</button>
            <button class="checkout-btn">Checkout</button>
        </div>
    </div>
</div>"#,
    ext = "html"
)]
struct CartModalTemplate<'a> {
    view: &'a CartModalView,
    total_label: String,
}

/// Render a notification element in its initial, off-screen position.
///
/// # Errors
///
/// Returns an error if template rendering fails.
pub fn render_notification(message: &str, severity: Severity) -> askama::Result<String> {
    NotificationTemplate {
        message,
        severity: severity.as_str(),
        color: severity.color(),
        transform: NotificationPhase::Offscreen.transform(),
    }
    .render()
}

/// Render the cart overlay.
///
/// # Errors
///
/// Returns an error if template rendering fails.
pub fn render_cart_modal(view: &CartModalView) -> askama::Result<String> {
    let total_label = view.total.as_ref().map_or_else(
        || "Total: unavailable".to_string(),
        |total| format!("Total: ${total}"),
    );
    CartModalTemplate { view, total_label }.render()
}

/// Global rules for the cart overlay and notifications.
pub const STYLESHEET: &str = r"
.cart-modal {
    position: fixed;
    top: 0;
    left: 0;
    width: 100%;
    height: 100%;
    background: rgba(0, 0, 0, 0.5);
    display: flex;
    align-items: center;
    justify-content: center;
    z-index: 10000;
}
.cart-modal-content {
    background: white;
    border-radius: 12px;
    padding: 30px;
    max-width: 500px;
    width: 90%;
    max-height: 80vh;
    overflow-y: auto;
}
.cart-modal-header {
    display: flex;
    justify-content: space-between;
    align-items: center;
    margin-bottom: 20px;
    padding-bottom: 15px;
    border-bottom: 1px solid #eee;
}
.close-modal {
    background: none;
    border: none;
    font-size: 24px;
    cursor: pointer;
    color: #666;
}
.cart-item {
    display: flex;
    align-items: center;
    gap: 15px;
    padding: 15px 0;
    border-bottom: 1px solid #f5f5f5;
}
.cart-item img {
    width: 60px;
    height: 60px;
    object-fit: cover;
    border-radius: 8px;
}
.remove-item {
    background: #ff6b6b;
    color: white;
    border: none;
    width: 30px;
    height: 30px;
    border-radius: 50%;
    cursor: pointer;
    margin-left: auto;
}
.cart-total {
    text-align: right;
    font-size: 18px;
    margin-bottom: 20px;
    padding-top: 15px;
    border-top: 1px solid #eee;
}
.cart-actions {
    display: flex;
    gap: 15px;
}
.clear-cart, .checkout-btn {
    flex: 1;
    padding: 12px;
    border: none;
    border-radius: 8px;
    font-weight: 600;
    cursor: pointer;
    color: white;
}
.clear-cart { background: #6c757d; }
.checkout-btn { background: #28a745; }
.notification {
    position: fixed;
    top: 20px;
    right: 20px;
    padding: 15px 20px;
    border-radius: 8px;
    color: white;
    font-weight: 600;
    z-index: 10000;
    transform: translateX(400px);
    transition: transform 0.3s ease;
    max-width: 300px;
    word-wrap: break-word;
}
@media (max-width: 768px) {
    .cart-modal-content {
        width: 95%;
        padding: 20px;
    }
    .cart-actions {
        flex-direction: column;
    }
}
";

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::modal::CartModalRow;

    #[test]
    fn test_notification_markup() {
        let html = render_notification("Saved <now>", Severity::Warning).unwrap();
        assert!(html.contains("notification-warning"));
        assert!(html.contains("#ffc107"));
        assert!(html.contains("translateX(400px)"));
        // Message text is escaped
        assert!(html.contains("Saved &#60;now&#62;") || html.contains("Saved &lt;now&gt;"));
    }

    #[test]
    fn test_cart_modal_markup() {
        let view = CartModalView {
            item_count: 3,
            rows: vec![CartModalRow {
                name: "Glow Serum".to_string(),
                image: "/img/serum.jpg".to_string(),
                price: "$10.00".to_string(),
                quantity: 3,
            }],
            total: Some("30.00".to_string()),
        };
        let html = render_cart_modal(&view).unwrap();
        assert!(html.contains("Shopping Cart (3 items)"));
        assert!(html.contains("$10.00 x 3"));
        assert!(html.contains("data-name=\"Glow Serum\""));
        assert!(html.contains("Total: $30.00"));
    }

    #[test]
    fn test_cart_modal_without_total() {
        let view = CartModalView {
            item_count: 1,
            rows: Vec::new(),
            total: None,
        };
        let html = render_cart_modal(&view).unwrap();
        assert!(html.contains("Total: unavailable"));
    }
}
