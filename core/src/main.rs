use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use mesto_core::{App, Card, Config, Gallery, TokenStore, Transport};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "mesto", version, about = "Mesto photo-sharing client", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create an account (does not log in)
    Register { email: String, password: String },
    /// Log in and store the session token
    Login { email: String, password: String },
    /// Forget the stored session token
    Logout,
    /// Show the current profile
    Whoami,
    /// List cards; `*` marks your own, the heart your like
    Cards,
    /// Add a card
    Add { name: String, image_url: String },
    /// Toggle your like on a card
    Like { id: String },
    /// Delete one of your cards
    Delete { id: String },
    /// Edit profile name and description
    Profile { name: String, about: String },
    /// Set the avatar image
    Avatar { url: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let config = Config::load();
    let mut app = App::from_config(&config);

    match cli.command {
        Command::Register { email, password } => {
            app.register(&email, &password).await.context("registration failed")?;
            println!("registered {email}; log in to continue");
        }
        Command::Login { email, password } => {
            app.login(&email, &password).await.context("login failed")?;
            println!("logged in as {email}");
        }
        Command::Logout => {
            app.logout()?;
            println!("logged out");
        }
        Command::Whoami => {
            restore(&mut app).await?;
            let user = app.gallery().user().context("profile not loaded")?;
            println!("{} <{}>", user.name, app.session().email().unwrap_or("?"));
            println!("{}", user.about);
        }
        Command::Cards => {
            restore(&mut app).await?;
            for card in app.gallery().cards() {
                print_card(app.gallery(), card);
            }
        }
        Command::Add { name, image_url } => {
            restore(&mut app).await?;
            let card = app.add_card(&name, &image_url).await?.clone();
            print_card(app.gallery(), &card);
        }
        Command::Like { id } => {
            restore(&mut app).await?;
            let card = app.toggle_like(&id).await?;
            print_card(app.gallery(), &card);
        }
        Command::Delete { id } => {
            restore(&mut app).await?;
            app.delete_card(&id).await?;
            println!("deleted {id}");
        }
        Command::Profile { name, about } => {
            restore(&mut app).await?;
            let user = app.update_profile(&name, &about).await?;
            println!("{}: {}", user.name, user.about);
        }
        Command::Avatar { url } => {
            restore(&mut app).await?;
            let user = app.update_avatar(&url).await?;
            println!("avatar set to {}", user.avatar);
        }
    }
    Ok(())
}

async fn restore<T: Transport, S: TokenStore>(app: &mut App<T, S>) -> anyhow::Result<()> {
    if !app.restore_session().await.context("could not restore session")? {
        bail!("not logged in; run `mesto login <email> <password>` first");
    }
    app.load().await.context("could not load profile and cards")?;
    Ok(())
}

fn print_card(gallery: &Gallery, card: &Card) {
    let heart = if gallery.is_liked_by_me(card) { "♥" } else { "♡" };
    let owner = if gallery.is_mine(card) { "*" } else { " " };
    println!(
        "{owner} {}  {}  {heart} {}  {}",
        card.id,
        card.name,
        card.like_count(),
        card.image_url
    );
}
