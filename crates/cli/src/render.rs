//! Plain-text rendering of flow views.

use std::io::{self, Write};

use chrono::{Datelike, NaiveDate};
use leipomo_core::SlotTime;
use leipomo_ordering::api::OrderReference;
use leipomo_ordering::cart::CartSummary;
use leipomo_ordering::catalog::CatalogView;
use leipomo_ordering::schedule::{CalendarView, DayStatus};
use leipomo_ordering::{Prompt, View};

/// Render any flow view.
pub fn view(out: &mut impl Write, view: &View) -> io::Result<()> {
    match view {
        View::Catalog => writeln!(out, "Browse the menu with `leipomo browse`."),
        View::Cart(summary) => cart(out, summary),
        View::Prompt(prompt) => self::prompt(out, prompt),
        View::Confirmed { reference } => confirmed(out, reference),
    }
}

pub fn catalog(out: &mut impl Write, view: &CatalogView) -> io::Result<()> {
    match view {
        CatalogView::Categories(categories) => {
            writeln!(out, "Categories:")?;
            for category in categories {
                writeln!(out, "  [{}] {}", category.id, category.name)?;
            }
        }
        CatalogView::Products { products, flat } => {
            if *flat {
                writeln!(out, "All products:")?;
            }
            if products.is_empty() {
                writeln!(out, "  No products.")?;
            }
            for entry in products {
                let price = entry
                    .product
                    .price
                    .map(|p| p.to_string())
                    .unwrap_or_default();
                write!(out, "  [{}] {:<32} {:>10}", entry.id(), entry.product.name, price)?;
                if entry.is_sold_out() {
                    write!(out, "  sold out")?;
                }
                if entry.in_cart > 0 {
                    write!(out, "  ({} in cart)", entry.in_cart)?;
                }
                writeln!(out)?;
            }
        }
    }
    Ok(())
}

pub fn cart(out: &mut impl Write, summary: &CartSummary) -> io::Result<()> {
    if summary.lines.is_empty() {
        return writeln!(out, "The cart is empty.");
    }

    for line in &summary.lines {
        let total = line.total().map(|t| t.to_string()).unwrap_or_default();
        writeln!(
            out,
            "  {:>3} x {:<32} {:>10}  ({})",
            line.quantity, line.name, total, line.key
        )?;
    }
    writeln!(out, "  Items: {}  Subtotal: {}", summary.total_quantity, summary.subtotal)?;
    if summary.has_unpriced_lines {
        writeln!(out, "  Some items are priced at pickup.")?;
    }
    Ok(())
}

/// Monday-first month grid. `*` marks the selection, `.` days that cannot be
/// picked.
pub fn calendar(out: &mut impl Write, view: &CalendarView) -> io::Result<()> {
    writeln!(out, "{}", view.month)?;
    writeln!(out, " Mo  Tu  We  Th  Fr  Sa  Su")?;
    for week in view.weeks() {
        for day in week {
            if !day.in_month {
                write!(out, "    ")?;
                continue;
            }
            let mark = if day.is_selected {
                '*'
            } else if day.status == DayStatus::Available {
                ' '
            } else {
                '.'
            };
            write!(out, "{:>3}{mark}", day.date.day())?;
        }
        writeln!(out)?;
    }
    Ok(())
}

pub fn slots(
    out: &mut impl Write,
    date: NaiveDate,
    slots: &[SlotTime],
    selected: Option<SlotTime>,
) -> io::Result<()> {
    if slots.is_empty() {
        return writeln!(out, "No pickup times on {date}.");
    }

    writeln!(out, "Pickup times on {date}:")?;
    let line = slots
        .iter()
        .map(|slot| {
            if Some(*slot) == selected {
                format!("[{slot}]")
            } else {
                slot.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ");
    writeln!(out, "  {line}")
}

/// Why no pickup can be booked on `date`.
pub fn unavailable_day(out: &mut impl Write, date: NaiveDate, status: DayStatus) -> io::Result<()> {
    let reason = match status {
        DayStatus::Available => return Ok(()),
        DayStatus::Past => "that day has passed",
        DayStatus::TooSoon => "orders need more notice",
        DayStatus::TooFar => "that is too far ahead",
        DayStatus::Closed => "the bakery is closed that day",
        DayStatus::Blackout => "the bakery is on a break",
    };
    writeln!(out, "No pickup times on {date}: {reason}.")
}

/// Cart recap shown before a resumed checkout step. The note step shows the
/// order itself.
pub fn resumed(out: &mut impl Write, summary: &CartSummary, prompt: &Prompt) -> io::Result<()> {
    if matches!(prompt, Prompt::Note { .. }) {
        return Ok(());
    }
    writeln!(out, "Your order so far:")?;
    cart(out, summary)
}

pub fn prompt(out: &mut impl Write, prompt: &Prompt) -> io::Result<()> {
    match prompt {
        Prompt::Name { current } => field(out, "Your name", current),
        Prompt::Email { current } => field(out, "Email", current),
        Prompt::Phone { current } => field(out, "Phone number", current),
        Prompt::Date { step, offline } => {
            if *offline {
                writeln!(out, "Pickup rules could not be loaded; showing default availability.")?;
            }
            if step.no_availability {
                return writeln!(out, "No pickup dates are available at the moment.");
            }
            if step.substituted {
                writeln!(out, "Nothing available in the requested month; showing {}.", step.calendar.month)?;
            }
            calendar(out, &step.calendar)?;
            writeln!(out, "Pickup date (YYYY-MM-DD, < previous month, > next month):")
        }
        Prompt::Time {
            date,
            slots: times,
            selected,
        } => {
            slots(out, *date, times, *selected)?;
            writeln!(out, "Pickup time (HH:MM):")
        }
        Prompt::Note {
            current,
            summary,
            pickup,
        } => {
            writeln!(out, "Your order:")?;
            cart(out, summary)?;
            writeln!(out, "  Pickup: {}", pickup.replace('T', " "))?;
            field(out, "Anything else? (optional, enter to place the order)", current)
        }
    }
}

fn field(out: &mut impl Write, label: &str, current: &str) -> io::Result<()> {
    if current.is_empty() {
        writeln!(out, "{label}:")
    } else {
        writeln!(out, "{label} [{current}]:")
    }
}

pub fn confirmed(out: &mut impl Write, reference: &OrderReference) -> io::Result<()> {
    writeln!(out, "Thank you! Your order number is {reference}.")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use leipomo_core::{Price, ProductId};
    use leipomo_ordering::cart::{Cart, CartItem};

    use super::*;

    fn rendered(f: impl FnOnce(&mut Vec<u8>) -> io::Result<()>) -> String {
        let mut out = Vec::new();
        f(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_cart_lists_lines_and_subtotal() {
        let mut cart = Cart::new();
        cart.add_item(
            &CartItem {
                product_id: Some(ProductId::new(7)),
                sku: None,
                name: "Pulla".to_string(),
                unit_price: Some(Price::from_cents(350)),
            },
            2,
        );

        let text = rendered(|out| super::cart(out, &cart.summary()));
        assert!(text.contains("Pulla"));
        assert!(text.contains("Items: 2"));
        assert!(text.contains("7.00 €"));
    }

    #[test]
    fn test_empty_cart() {
        let text = rendered(|out| super::cart(out, &Cart::new().summary()));
        assert_eq!(text, "The cart is empty.\n");
    }

    #[test]
    fn test_slots_mark_selection() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 26).unwrap();
        let times = [SlotTime::new(8, 0).unwrap(), SlotTime::new(9, 0).unwrap()];
        let text = rendered(|out| super::slots(out, date, &times, SlotTime::new(9, 0)));
        assert!(text.contains("08:00 [09:00]"));
    }

    #[test]
    fn test_unavailable_day_gives_reason() {
        let christmas = NaiveDate::from_ymd_opt(2026, 12, 25).unwrap();
        let text = rendered(|out| unavailable_day(out, christmas, DayStatus::Blackout));
        assert_eq!(text, "No pickup times on 2026-12-25: the bakery is on a break.\n");

        let text = rendered(|out| unavailable_day(out, christmas, DayStatus::Available));
        assert!(text.is_empty());
    }

    #[test]
    fn test_resumed_step_recaps_cart() {
        let mut cart = Cart::new();
        cart.add_item(
            &CartItem {
                product_id: Some(ProductId::new(12)),
                sku: None,
                name: "Ruisleipä".to_string(),
                unit_price: Some(Price::from_cents(600)),
            },
            1,
        );
        let summary = cart.summary();

        let phone = Prompt::Phone {
            current: String::new(),
        };
        let text = rendered(|out| resumed(out, &summary, &phone));
        assert!(text.starts_with("Your order so far:\n"));
        assert!(text.contains("Ruisleipä"));

        let note = Prompt::Note {
            current: String::new(),
            summary: summary.clone(),
            pickup: "2026-10-26T10:00".to_string(),
        };
        assert!(rendered(|out| resumed(out, &summary, &note)).is_empty());
    }

    #[test]
    fn test_field_shows_current_value() {
        let text = rendered(|out| {
            super::prompt(
                out,
                &Prompt::Name {
                    current: "Aino".to_string(),
                },
            )
        });
        assert_eq!(text, "Your name [Aino]:\n");
    }
}
