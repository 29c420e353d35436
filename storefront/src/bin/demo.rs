//! Storefront demo
//!
//! Walks through the storefront without a UI:
//! - Featured events and a few filtered listings
//! - A card purchase driven through the checkout store
//! - The receipt handed to the receipt view
//!
//! # Usage
//!
//! ```bash
//! CHECKOUT_PROCESSING_DELAY_MS=300 cargo run --bin demo
//! ```

use std::sync::Arc;
use std::time::Duration;
use storefront::{
    BrowseAction, CheckoutAction, Config, Route, Storefront, UiEvent,
    checkout::PaymentField,
    config,
    navigation::ChannelPresenter,
    types::{Event, EventId, PaymentMethod},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn print_events(heading: &str, events: &[&Event]) {
    println!("{heading} ({})", events.len());
    for event in events {
        println!(
            "   {:<8} {:<32} {:<10} {}",
            event.id.as_str(),
            event.title,
            event.location.city,
            event.price
        );
    }
    println!();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let dotenv = config::load_dotenv();
    let config = Config::from_process_env();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{},storefront=debug", config.logging.level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(error) = dotenv {
        tracing::warn!(%error, "Ignoring unreadable .env file");
    }

    println!("\n============================================");
    println!("   Event Storefront - Demo");
    println!("============================================\n");

    let storefront = Storefront::seeded(config)?;

    // ========== Browse ==========

    print_events("Featured", &storefront.featured());

    let browse = storefront.browse_store();
    browse
        .send(BrowseAction::AddTag {
            label: "Festival".to_string(),
        })
        .await?;
    let festivals = browse
        .state(|s| s.visible_events(storefront.catalog()).len())
        .await;
    println!("Festival tag selected: {festivals} event(s)\n");

    browse
        .send(BrowseAction::SetPriceRange {
            low: 0,
            high: 80_000,
        })
        .await?;
    let spec = browse.state(|s| s.spec.clone()).await;
    print_events("Festivals up to RWF 80,000", &storefront.list_events(&spec));

    // ========== Checkout ==========

    let (presenter, mut ui) = ChannelPresenter::new();
    let checkout = storefront.checkout_store(Arc::new(presenter));

    checkout
        .send(CheckoutAction::SelectEvent {
            event_id: EventId::new("evt-001"),
        })
        .await?;
    checkout
        .send(CheckoutAction::SetQuantity { quantity: 2 })
        .await?;
    checkout.send(CheckoutAction::ConfirmPurchase).await?;

    let timeout = storefront.config().processing_delay() + Duration::from_secs(5);
    let receipt = tokio::time::timeout(timeout, async {
        while let Some(event) = ui.recv().await {
            match event {
                UiEvent::Notify(notification) => {
                    println!(
                        "[notice] {} {}",
                        notification.title,
                        notification.description.unwrap_or_default()
                    );
                },
                UiEvent::Navigate(Route::Payment(request)) => {
                    println!("[view] payment: {} due", request.total_amount);
                    checkout
                        .send(CheckoutAction::OpenPaymentForm {
                            request: Some(request),
                        })
                        .await?;
                    checkout
                        .send(CheckoutAction::SelectPaymentMethod {
                            method: PaymentMethod::Card,
                        })
                        .await?;
                    for (field, value) in [
                        (PaymentField::CardNumber, "4111 1111 1111 1111"),
                        (PaymentField::CardHolder, "Aline Uwase"),
                        (PaymentField::ExpiryDate, "1227"),
                        (PaymentField::Cvv, "123"),
                    ] {
                        checkout
                            .send(CheckoutAction::UpdateField {
                                field,
                                value: value.to_string(),
                            })
                            .await?;
                    }
                    checkout.send(CheckoutAction::Submit).await?;
                },
                UiEvent::Navigate(Route::Receipt(receipt)) => return Ok(Some(receipt)),
                UiEvent::Navigate(route) => println!("[view] {}", route.path()),
            }
        }
        Ok::<_, anyhow::Error>(None)
    })
    .await??;

    let Some(receipt) = receipt else {
        anyhow::bail!("checkout finished without a receipt");
    };

    println!("\n🧾 Receipt");
    println!("   Order:   {}", receipt.order_number);
    for item in &receipt.items {
        println!(
            "   {} x {} @ {} = {}",
            item.quantity,
            item.event_title,
            item.unit_price,
            item.total_price()
        );
    }
    println!("   Total:   {}", receipt.total_amount);
    println!("   Paid by: {}", receipt.payment_method);
    println!("   At:      {}\n", receipt.purchased_at);

    checkout.shutdown();
    browse.shutdown();
    Ok(())
}
