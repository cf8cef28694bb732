use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing::error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use wallpaper_prompts::app::App;
use wallpaper_prompts::catalog;
use wallpaper_prompts::models::PromptRecord;
use wallpaper_prompts::session::SessionStatus;
use wallpaper_prompts::settings::{mask_key, Provider, Theme};

#[derive(Debug, Parser)]
#[command(name = "wallpaper-prompts")]
#[command(about = "Generate aesthetic AI wallpaper prompts")]
struct CliArgs {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Generate prompts from a category and visual style (OpenRouter).
    Generate {
        #[arg(short, long, default_value = catalog::default_category())]
        category: String,
        #[arg(short, long, default_value = catalog::default_visual_style())]
        style: String,
        /// Prefer deep blacks and high contrast for OLED screens.
        #[arg(long)]
        oled: bool,
    },
    /// Generate prompts from an image file (Gemini).
    Image {
        #[arg(value_name = "PATH")]
        path: PathBuf,
    },
    /// Toggle a prompt's favorite flag.
    Favorite {
        #[arg(value_name = "ID")]
        id: String,
    },
    /// Replace a prompt's text everywhere it is saved.
    Edit {
        #[arg(value_name = "ID")]
        id: String,
        #[arg(value_name = "TEXT")]
        text: String,
    },
    /// Print a prompt's text only, for piping into a clipboard tool.
    Show {
        #[arg(value_name = "ID")]
        id: String,
    },
    /// List favorite prompts.
    Favorites,
    /// List recent generation batches, newest first.
    History,
    /// List the built-in categories and visual styles.
    Catalog,
    /// Show or change stored settings.
    Settings {
        #[command(subcommand)]
        action: Option<SettingsAction>,
    },
}

#[derive(Debug, Subcommand)]
enum SettingsAction {
    /// Store an API key; an empty value removes it.
    SetKey {
        #[arg(value_enum)]
        provider: ProviderArg,
        key: String,
    },
    /// Set the UI theme (yellow, blue, green, pink).
    Theme {
        #[arg(value_parser = parse_theme_arg)]
        theme: Theme,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ProviderArg {
    Gemini,
    Openrouter,
}

impl From<ProviderArg> for Provider {
    fn from(arg: ProviderArg) -> Self {
        match arg {
            ProviderArg::Gemini => Provider::Gemini,
            ProviderArg::Openrouter => Provider::OpenRouter,
        }
    }
}

fn parse_theme_arg(input: &str) -> std::result::Result<Theme, String> {
    input.parse::<Theme>().map_err(|e| e.to_string())
}

fn short_id(record: &PromptRecord) -> String {
    record.id.to_string()[..8].to_string()
}

fn print_prompt(index: usize, record: &PromptRecord) {
    let star = if record.is_favorite { "*" } else { " " };
    println!("{:>2}. [{}] {} {}", index + 1, short_id(record), star, record.text);
}

fn print_batch(records: &[&PromptRecord]) {
    for (i, record) in records.iter().enumerate() {
        print_prompt(i, record);
    }
}

/// Print the session outcome; returns whether generation succeeded.
fn report(app: &App) -> bool {
    match app.session().status() {
        SessionStatus::Displayed => {
            print_batch(&app.session().current_batch());
            true
        }
        SessionStatus::Failed => {
            eprintln!(
                "{}",
                app.session().last_error().unwrap_or("An unknown error occurred.")
            );
            false
        }
        SessionStatus::Idle | SessionStatus::Generating => {
            println!("No prompts were returned.");
            true
        }
    }
}

async fn run(command: Command) -> Result<bool> {
    let mut app = App::new()?;

    match command {
        Command::Generate {
            category,
            style,
            oled,
        } => {
            app.generate_from_category(&category, &style, oled).await;
            Ok(report(&app))
        }
        Command::Image { path } => {
            app.generate_from_image_file(&path).await?;
            Ok(report(&app))
        }
        Command::Favorite { id } => {
            let record = app.toggle_favorite(&id)?;
            if record.is_favorite {
                println!("Added [{}] to favorites", short_id(&record));
            } else {
                println!("Removed [{}] from favorites", short_id(&record));
            }
            Ok(true)
        }
        Command::Edit { id, text } => {
            let record = app.edit_prompt(&id, &text)?;
            println!("Updated [{}] {}", short_id(&record), record.text);
            Ok(true)
        }
        Command::Show { id } => {
            println!("{}", app.find_prompt(&id)?.text);
            Ok(true)
        }
        Command::Favorites => {
            let favorites = app.session().favorites();
            if favorites.is_empty() {
                println!("No favorites yet.");
            }
            print_batch(&favorites);
            Ok(true)
        }
        Command::History => {
            let history = app.session().history();
            if history.is_empty() {
                println!("No history yet.");
            }
            for (i, batch) in history.iter().enumerate() {
                let when = batch
                    .first()
                    .map(|r| r.created_at.format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_default();
                println!("Batch {} {}", i + 1, when);
                print_batch(batch);
            }
            Ok(true)
        }
        Command::Catalog => {
            println!("Categories:");
            for category in catalog::CATEGORIES {
                println!("  {}", category);
            }
            println!("Visual styles:");
            for style in catalog::VISUAL_STYLES {
                println!("  {}", style);
            }
            Ok(true)
        }
        Command::Settings { action } => {
            match action {
                Some(SettingsAction::SetKey { provider, key }) => {
                    app.set_api_key(provider.into(), &key)?;
                }
                Some(SettingsAction::Theme { theme }) => {
                    app.set_theme(theme)?;
                }
                None => {}
            }
            let settings = app.settings();
            println!("Theme:              {}", settings.theme);
            println!("Gemini API key:     {}", mask_key(&settings.gemini_api_key));
            println!("OpenRouter API key: {}", mask_key(&settings.open_router_api_key));
            Ok(true)
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wallpaper_prompts=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = CliArgs::parse();

    match run(args.command).await {
        Ok(true) => Ok(()),
        Ok(false) => std::process::exit(1),
        Err(e) => {
            error!("Command failed: {}", e);
            eprintln!("{}", e);
            std::process::exit(1);
        }
    }
}
