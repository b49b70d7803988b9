//! FarmLink CLI - Shop and manage orders from the terminal
//!
//! Thin client over the FarmLink HTTP API.

mod api;
mod config;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::{ColoredString, Colorize};
use dialoguer::{Input, Password};
use farmlink::{OrderStatus, PaymentMethod, PaymentStatus, ProductSort, Role};
use uuid::Uuid;

use api::{FarmLinkClient, OrderResponse, PostalAddress, ProductFilter, Session};
use config::Config;

#[derive(Parser)]
#[command(name = "farmlink")]
#[command(about = "FarmLink CLI - Farm produce marketplace", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in and store the session
    Login {
        /// Account email (will prompt if not provided)
        #[arg(short, long)]
        email: Option<String>,
        /// Role to sign in as: consumer, farmer, admin
        #[arg(short, long)]
        role: Option<Role>,
    },

    /// Revoke the session
    Logout,

    /// Show current configuration
    Config,

    /// Browse the catalogue
    Product {
        #[command(subcommand)]
        action: ProductAction,
    },

    /// Shopping cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },

    /// Orders
    Order {
        #[command(subcommand)]
        action: OrderAction,
    },

    /// Delivery addresses
    Address {
        #[command(subcommand)]
        action: AddressAction,
    },
}

#[derive(Subcommand)]
enum ProductAction {
    /// List active products
    List {
        #[arg(long)]
        page: Option<i64>,
        #[arg(long)]
        size: Option<i64>,
        /// Category ID (descendants included)
        #[arg(long)]
        category: Option<Uuid>,
        #[arg(short, long)]
        keyword: Option<String>,
        /// rating, price_asc, price_desc, newest, best_selling
        #[arg(long)]
        sort: Option<ProductSort>,
    },
    /// Show one product
    Show { id: Uuid },
}

#[derive(Subcommand)]
enum CartAction {
    /// Add a product to the cart
    Add {
        product_id: Uuid,
        #[arg(short, long, default_value = "1")]
        quantity: i32,
    },
    /// List cart items
    List,
    /// Remove a cart item
    Remove { item_id: Uuid },
    /// Empty the cart
    Clear,
}

#[derive(Subcommand)]
enum OrderAction {
    /// Order every cart item of one farmer
    Create {
        /// Delivery address ID
        #[arg(long)]
        address: Uuid,
        /// Farmer ID
        #[arg(long)]
        farmer: Uuid,
        /// cod or vnpay
        #[arg(long, default_value = "cod")]
        method: PaymentMethod,
        #[arg(long)]
        note: Option<String>,
    },
    /// List own orders
    List,
    /// Show one order with its history
    Show { id: Uuid },
    /// Cancel a pending order
    Cancel {
        id: Uuid,
        #[arg(long)]
        reason: Option<String>,
    },
    /// Confirm a delivered order was received
    Receive { id: Uuid },
    /// Move an order of your farm to the next status (farmer)
    Advance { id: Uuid, status: OrderStatus },
}

#[derive(Subcommand)]
enum AddressAction {
    /// List saved addresses
    List,
    /// Add an address
    Add {
        #[arg(long)]
        receiver: String,
        #[arg(long)]
        phone: String,
        #[arg(long)]
        province: String,
        #[arg(long)]
        district: String,
        #[arg(long)]
        ward: String,
        #[arg(long)]
        detail: String,
        /// Make it the default address
        #[arg(long)]
        default: bool,
    },
    /// Make an address the default
    Default { id: Uuid },
    /// Remove an address
    Remove { id: Uuid },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load()?;
    let loaded = config.clone();
    let mut client = FarmLinkClient::new(&config.api_url(), session_of(&config));

    let result = match cli.command {
        Commands::Login { email, role } => cmd_login(&mut config, &mut client, email, role).await,
        Commands::Logout => cmd_logout(&mut client).await,
        Commands::Config => cmd_config(&config),
        Commands::Product { action } => cmd_product(&mut client, action).await,
        Commands::Cart { action } => {
            require_login(&config)?;
            cmd_cart(&mut client, action).await
        }
        Commands::Order { action } => {
            require_login(&config)?;
            cmd_order(&mut client, action).await
        }
        Commands::Address { action } => {
            require_login(&config)?;
            cmd_address(&mut client, action).await
        }
    };

    // Rotated or revoked tokens are written back even when the command failed
    sync_session(&mut config, &client);
    if config != loaded {
        config.save()?;
    }

    result
}

fn session_of(config: &Config) -> Option<Session> {
    match (&config.access_token, &config.refresh_token) {
        (Some(access), Some(refresh)) => Some(Session {
            access_token: access.clone(),
            refresh_token: refresh.clone(),
        }),
        _ => None,
    }
}

fn sync_session(config: &mut Config, client: &FarmLinkClient) {
    match client.session() {
        Some(session) => {
            config.access_token = Some(session.access_token.clone());
            config.refresh_token = Some(session.refresh_token.clone());
        }
        None => config.clear_session(),
    }
}

fn require_login(config: &Config) -> Result<()> {
    config
        .access_token
        .as_ref()
        .map(|_| ())
        .context("Not logged in. Run 'farmlink login' first.")
}

// ============================================
// Command Implementations
// ============================================

async fn cmd_login(
    config: &mut Config,
    client: &mut FarmLinkClient,
    email: Option<String>,
    role: Option<Role>,
) -> Result<()> {
    print!("Testing connection... ");
    match client.health().await {
        Ok(true) => println!("{}", "OK".green()),
        _ => {
            println!("{}", "Failed".red());
            bail!("Could not reach FarmLink API at {}", config.api_url());
        }
    }

    let email = match email {
        Some(e) => e,
        None => Input::new()
            .with_prompt("Email")
            .interact_text()
            .context("Failed to read email")?,
    };
    let password = Password::new()
        .with_prompt("Password")
        .interact()
        .context("Failed to read password")?;
    let role = role.or(config.role).unwrap_or(Role::Consumer);

    let tokens = client.login(&email, &password, role).await?;
    config.set_session(
        email.clone(),
        role,
        tokens.access_token,
        tokens.refresh_token,
    );

    println!(
        "{} Signed in as {} ({}), access valid for {}s",
        "✓".green(),
        email.cyan(),
        role,
        tokens.expires_in
    );
    Ok(())
}

async fn cmd_logout(client: &mut FarmLinkClient) -> Result<()> {
    if client.session().is_none() {
        println!("Not logged in.");
        return Ok(());
    }
    client.logout().await?;
    println!("{} Signed out", "✓".green());
    Ok(())
}

fn cmd_config(config: &Config) -> Result<()> {
    println!("{}", "Configuration:".bold());
    println!("  Path: {:?}", Config::config_path()?);
    println!("  Base URL: {}", config.api_url());
    println!(
        "  Session: {}",
        if config.is_logged_in() { "Active".green() } else { "None".red() }
    );
    println!("  Email: {}", config.email.as_deref().unwrap_or("-").cyan());
    println!(
        "  Role: {}",
        config.role.map(|r| r.to_string()).unwrap_or_else(|| "-".into())
    );
    Ok(())
}

async fn cmd_product(client: &mut FarmLinkClient, action: ProductAction) -> Result<()> {
    match action {
        ProductAction::List { page, size, category, keyword, sort } => {
            let filter = ProductFilter {
                page,
                size,
                category_id: category,
                keyword,
                sort,
            };
            let result = client.list_products(&filter).await?;

            if result.content.is_empty() {
                println!("No products found.");
                return Ok(());
            }

            println!(
                "{} (page {}/{}, {} total)",
                "Products:".bold(),
                result.page + 1,
                result.total_pages.max(1),
                result.total_elements
            );
            for p in result.content {
                println!(
                    "  {} {} {}/{} [{} in stock, {} sold, ★{:.1}]",
                    p.id.to_string().dimmed(),
                    p.name.cyan().bold(),
                    format_vnd(p.price).green(),
                    p.unit_price,
                    p.inventory,
                    p.sold,
                    p.rating
                );
            }
        }

        ProductAction::Show { id } => {
            let p = client.get_product(id).await?;
            println!("{}", p.name.cyan().bold());
            println!("  ID: {}", p.id);
            println!("  Farmer: {}", p.farmer_id);
            println!("  Price: {}/{}", format_vnd(p.price).green(), p.unit_price);
            println!("  Stock: {} (sold {})", p.inventory, p.sold);
            println!("  Rating: ★{:.1}", p.rating);
            if let Some(description) = p.description {
                println!("\n{}", truncate_string(&description, 400).dimmed());
            }
        }
    }

    Ok(())
}

async fn cmd_cart(client: &mut FarmLinkClient, action: CartAction) -> Result<()> {
    match action {
        CartAction::Add { product_id, quantity } => {
            let item = client.add_to_cart(product_id, quantity).await?;
            println!(
                "{} Cart now holds {} x {}",
                "✓".green(),
                item.quantity,
                item.product_id.to_string().dimmed()
            );
        }

        CartAction::List => {
            let lines = client.cart().await?;
            if lines.is_empty() {
                println!("Cart is empty.");
                return Ok(());
            }

            println!("{}", "Cart:".bold());
            let mut total = 0;
            for line in &lines {
                let subtotal = line.product.price * i64::from(line.item.quantity);
                total += subtotal;
                println!(
                    "  {} {} x {} {} (farmer {})",
                    line.item.id.to_string().dimmed(),
                    line.item.quantity,
                    line.product.name.cyan(),
                    format_vnd(subtotal).green(),
                    short_id(line.product.farmer_id)
                );
            }
            println!("  {} {}", "Total:".bold(), format_vnd(total).green().bold());
        }

        CartAction::Remove { item_id } => {
            client.remove_from_cart(item_id).await?;
            println!("{} Cart item removed", "✓".green());
        }

        CartAction::Clear => {
            let cleared = client.clear_cart().await?;
            println!("{} Removed {} cart items", "✓".green(), cleared.removed);
        }
    }

    Ok(())
}

async fn cmd_order(client: &mut FarmLinkClient, action: OrderAction) -> Result<()> {
    match action {
        OrderAction::Create { address, farmer, method, note } => {
            let items: Vec<Uuid> = client
                .cart()
                .await?
                .into_iter()
                .filter(|line| line.product.farmer_id == farmer)
                .map(|line| line.item.id)
                .collect();
            if items.is_empty() {
                bail!("No cart items from farmer {}", farmer);
            }

            let order = client
                .create_order(address, farmer, &items, method, note.as_deref())
                .await?;
            println!("{} Order placed", "✓".green());
            print_order(&order, false);
            if order.payment_method == PaymentMethod::Vnpay {
                println!(
                    "\n{}",
                    "Pay online from the app to complete a VNPay order.".yellow()
                );
            }
        }

        OrderAction::List => {
            let orders = client.my_orders().await?;
            if orders.is_empty() {
                println!("No orders yet.");
                return Ok(());
            }
            println!("{}", "Orders:".bold());
            for order in &orders {
                println!(
                    "  {} {} {} {} items, {}",
                    order.id.to_string().dimmed(),
                    status_badge(order.status),
                    payment_badge(order.payment_status),
                    order.total_quantity,
                    format_vnd(order.total_price).green()
                );
            }
        }

        OrderAction::Show { id } => {
            let order = client.get_order(id).await?;
            print_order(&order, true);
        }

        OrderAction::Cancel { id, reason } => {
            let order = client
                .change_order_status(Role::Consumer, id, OrderStatus::Canceled, reason.as_deref())
                .await?;
            println!("{} Order {} {}", "✓".green(), short_id(order.id), status_badge(order.status));
        }

        OrderAction::Receive { id } => {
            let order = client
                .change_order_status(Role::Consumer, id, OrderStatus::Received, None)
                .await?;
            println!("{} Order {} {}", "✓".green(), short_id(order.id), status_badge(order.status));
        }

        OrderAction::Advance { id, status } => {
            let order = client
                .change_order_status(Role::Farmer, id, status, None)
                .await?;
            println!("{} Order {} {}", "✓".green(), short_id(order.id), status_badge(order.status));
        }
    }

    Ok(())
}

async fn cmd_address(client: &mut FarmLinkClient, action: AddressAction) -> Result<()> {
    match action {
        AddressAction::List => {
            let addresses = client.addresses().await?;
            if addresses.is_empty() {
                println!("No addresses saved.");
                println!("\n{}", "Add one with:".dimmed());
                println!("  farmlink address add --receiver <NAME> --phone <PHONE> ...");
                return Ok(());
            }

            println!("{}", "Addresses:".bold());
            for a in addresses {
                let default_marker = if a.is_default {
                    " (default)".green().to_string()
                } else {
                    String::new()
                };
                println!(
                    "  {} {} {} - {}, {}, {}, {}{}",
                    a.id.to_string().dimmed(),
                    a.postal.receiver_name.cyan(),
                    a.postal.receiver_phone,
                    a.postal.detail,
                    a.postal.ward,
                    a.postal.district,
                    a.postal.province,
                    default_marker
                );
            }
        }

        AddressAction::Add { receiver, phone, province, district, ward, detail, default } => {
            let postal = PostalAddress {
                receiver_name: receiver,
                receiver_phone: phone,
                province,
                district,
                ward,
                detail,
            };
            let address = client.add_address(&postal, default).await?;
            println!(
                "{} Address {} saved{}",
                "✓".green(),
                short_id(address.id),
                if address.is_default { " as default" } else { "" }
            );
        }

        AddressAction::Default { id } => {
            client.set_default_address(id).await?;
            println!("{} Default address set", "✓".green());
        }

        AddressAction::Remove { id } => {
            client.delete_address(id).await?;
            println!("{} Address removed", "✓".green());
        }
    }

    Ok(())
}

// ============================================
// Formatting
// ============================================

fn print_order(order: &OrderResponse, with_history: bool) {
    println!(
        "{} {} {} via {}",
        order.id.to_string().bold(),
        status_badge(order.status),
        payment_badge(order.payment_status),
        order.payment_method
    );
    println!("  Farmer: {}  Placed: {}", short_id(order.farmer_id), order.created_at.dimmed());
    for item in &order.items {
        println!(
            "  {} x {} @ {} = {}",
            item.quantity,
            item.product_name.cyan(),
            format_vnd(item.unit_price),
            format_vnd(item.subtotal)
        );
    }
    println!("  {} {}", "Total:".bold(), format_vnd(order.total_price).green().bold());

    if with_history {
        println!("  {}", "History:".bold());
        for change in &order.history {
            let from = change
                .from
                .map(|s| s.to_string())
                .unwrap_or_else(|| "-".into());
            let reason = change
                .reason
                .as_deref()
                .map(|r| format!(" ({})", r))
                .unwrap_or_default();
            println!(
                "    {} -> {} by {}{}",
                from,
                change.to,
                change.actor_role,
                reason.dimmed()
            );
        }
    }
}

fn status_badge(status: OrderStatus) -> ColoredString {
    let label = format!("[{}]", status);
    match status {
        OrderStatus::Pending => label.yellow(),
        OrderStatus::Confirmed | OrderStatus::Delivering => label.cyan(),
        OrderStatus::Delivered | OrderStatus::Received => label.green(),
        OrderStatus::Canceled => label.red(),
    }
}

fn payment_badge(status: PaymentStatus) -> ColoredString {
    let label = status.to_string();
    match status {
        PaymentStatus::Paid => label.green(),
        PaymentStatus::Failed | PaymentStatus::Canceled => label.red(),
        _ => label.dimmed(),
    }
}

fn short_id(id: Uuid) -> String {
    id.to_string()[..8].to_string()
}

/// Dong amount with dot thousands separators, e.g. 1.250.000đ
fn format_vnd(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }
    let sign = if amount < 0 { "-" } else { "" };
    format!("{}{}đ", sign, grouped)
}

/// Truncate string safely for UTF-8 (by char count, not bytes)
fn truncate_string(s: &str, max_chars: usize) -> String {
    if s.chars().count() > max_chars {
        format!("{}...", s.chars().take(max_chars).collect::<String>())
    } else {
        s.to_string()
    }
}
