use std::io::{self, BufRead, Write};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use log::{debug, LevelFilter};
use tokio::sync::mpsc::UnboundedReceiver;

use gardenglow::browse::ListView;
use gardenglow::dashboard::{Confirm, DeleteOutcome};
use gardenglow::detail::DetailView;
use gardenglow::gardeners::{ExperienceTier, Gardener, GardenerFilter, GardenerStatus, Gender};
use gardenglow::guard::{FileSlot, GuardDecision, RouteGuard};
use gardenglow::mutation::{CommentOutcome, LikeOutcome};
use gardenglow::notice::{Notice, NoticeKind};
use gardenglow::prelude::*;

#[derive(Parser, Debug)]
#[clap(name = "gardenglow", version)]
#[clap(about = "Browse and share gardening tips with the GardenGlow community", long_about = None)]
struct Cli {
    #[clap(subcommand)]
    command: Commands,

    /// Sign in with this email before running the command
    #[clap(long, requires = "password")]
    email: Option<String>,

    /// Password for --email
    #[clap(long)]
    password: Option<String>,

    /// Directory holding the resume-after-login slot
    #[clap(long, default_value = ".gardenglow")]
    state_dir: String,

    /// Output debug logs to stderr
    #[clap(long)]
    debug: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List tips
    Tips {
        #[clap(long)]
        category: Option<Category>,
        #[clap(long)]
        difficulty: Option<Difficulty>,
        /// newest or mostLiked
        #[clap(long, default_value = "newest")]
        sort: SortMode,
    },
    /// List trending tips
    Top,
    /// Show a tip with its comments
    Show { id: String },
    /// Like a tip, or remove your like
    Like { id: String },
    /// Comment on a tip
    Comment { id: String, text: String },
    /// List your own tips
    MyTips,
    /// Delete one of your tips
    Delete {
        id: String,
        /// Skip the confirmation prompt
        #[clap(long)]
        yes: bool,
    },
    /// Explore gardeners
    Gardeners {
        /// Only featured active gardeners
        #[clap(long)]
        active: bool,
        #[clap(long)]
        experience: Option<ExperienceTier>,
        #[clap(long)]
        status: Option<GardenerStatus>,
        #[clap(long)]
        gender: Option<Gender>,
    },
    /// Dashboard overview
    Stats,
}

/// Asks on the terminal
struct Prompt;

impl Confirm for Prompt {
    fn confirm(&self, title: &str, text: &str) -> bool {
        print!("{} {} [y/N] ", title, text);
        if io::stdout().flush().is_err() {
            return false;
        }
        let mut answer = String::new();
        match io::stdin().lock().read_line(&mut answer) {
            Ok(_) => matches!(answer.trim(), "y" | "Y" | "yes"),
            Err(_) => false,
        }
    }
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let mut logger = pretty_env_logger::formatted_builder();
    if let Ok(filters) = std::env::var("RUST_LOG") {
        logger.parse_filters(&filters);
    }
    if cli.debug {
        logger.filter_level(LevelFilter::Debug);
    }
    logger.init();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let (notifier, mut notices) = Notifier::channel();
    let client = GardenGlow::new(ClientOptions::from_env()?)?.with_notifier(notifier);
    let guard = client.guard(Arc::new(FileSlot::new(&cli.state_dir)?));

    match (&cli.email, &cli.password) {
        (Some(email), Some(password)) => {
            let resume = client.accounts(guard.clone()).login(email, password).await;
            print_notices(&mut notices);
            debug!("Resuming at {}", resume?);
        }
        _ => {
            client.session().resolve(None).await;
        }
    }

    let result = execute(&client, &guard, cli.command).await;
    print_notices(&mut notices);
    result
}

/// `false` when the path needs a login first
async fn allowed(guard: &RouteGuard, path: &str) -> Result<bool> {
    match guard.check_when_ready(path).await? {
        GuardDecision::Allow => Ok(true),
        GuardDecision::Wait => Ok(false),
        GuardDecision::Redirect { to, remember } => {
            println!("Please log in ({}) to continue to {}", to, remember);
            Ok(false)
        }
    }
}

async fn execute(client: &GardenGlow, guard: &RouteGuard, command: Commands) -> Result<()> {
    match command {
        Commands::Tips {
            category,
            difficulty,
            sort,
        } => {
            let browse = client.browse();
            let criteria = FilterCriteria::new()
                .with_category(category)
                .with_difficulty(difficulty)
                .with_sort(sort);
            let view = match browse.set_criteria(criteria).await {
                Some(view) => view,
                None => browse.refresh().await,
            };
            if let ListView::Failed(e) = view {
                return Err(e);
            }
            let tips = browse.store().snapshot().await;
            if tips.is_empty() {
                println!("No tips match these filters.");
            }
            tips.iter().for_each(print_tip);
        }
        Commands::Top => {
            let store = TipStore::new();
            client.trending(&store).await?;
            store.snapshot().await.iter().for_each(print_tip);
        }
        Commands::Show { id } => {
            if !allowed(guard, &format!("/tip-details/{}", id)).await? {
                return Ok(());
            }
            match client.detail().load(&id).await {
                DetailView::Loaded(tip) => {
                    print_tip(&tip);
                    println!("  {}", tip.description);
                    for comment in &tip.comments {
                        println!("  - {}: {}", comment.user_name, comment.comment);
                    }
                }
                DetailView::NotFound => println!("Tip {} not found. Back to /", id),
                DetailView::Failed(e) => return Err(e),
            }
        }
        Commands::Like { id } => {
            let detail = client.detail();
            if let DetailView::Failed(e) = detail.load(&id).await {
                return Err(e);
            }
            match client.engine(detail.store()).toggle_like(&id).await? {
                LikeOutcome::Reconciled { likes, liked } => {
                    println!("{} ({} likes)", if liked { "Liked" } else { "Unliked" }, likes)
                }
                LikeOutcome::LoginRequired => {
                    guard.remember(&format!("/tip-details/{}", id))?;
                }
                LikeOutcome::Ignored => {}
            }
        }
        Commands::Comment { id, text } => {
            let detail = client.detail();
            if let DetailView::Failed(e) = detail.load(&id).await {
                return Err(e);
            }
            if let CommentOutcome::Posted(count) =
                client.engine(detail.store()).submit_comment(&id, &text).await?
            {
                println!("{} comments", count);
            }
        }
        Commands::MyTips => {
            if !allowed(guard, "/my-tips").await? {
                return Ok(());
            }
            let my_tips = client.my_tips();
            my_tips.load().await?;
            my_tips.store().snapshot().await.iter().for_each(print_tip);
        }
        Commands::Delete { id, yes } => {
            if !allowed(guard, "/my-tips").await? {
                return Ok(());
            }
            let my_tips = client.my_tips();
            let outcome = if yes {
                my_tips.delete(&id, &|_: &str, _: &str| true).await?
            } else {
                my_tips.delete(&id, &Prompt).await?
            };
            if outcome == DeleteOutcome::Cancelled {
                println!("Nothing deleted.");
            }
        }
        Commands::Gardeners {
            active,
            experience,
            status,
            gender,
        } => {
            if !allowed(guard, "/explore-gardeners").await? {
                return Ok(());
            }
            let gardeners = if active {
                client.gardeners().active().await?
            } else {
                let filter = GardenerFilter::new()
                    .with_experience(experience)
                    .with_status(status)
                    .with_gender(gender);
                client.gardeners().list(&filter).await?
            };
            if gardeners.is_empty() {
                println!("No gardeners found.");
            }
            gardeners.iter().for_each(print_gardener);
        }
        Commands::Stats => {
            if !allowed(guard, "/dashboard").await? {
                return Ok(());
            }
            let stats = client.my_tips().stats().await?;
            println!("Total tips:  {}", stats.total_tips);
            println!("My tips:     {}", stats.my_tips);
            println!("Likes on mine: {}", stats.my_likes);
            if let Some(profile) = stats.profile {
                println!(
                    "Last activity: {}",
                    profile.last_activity.as_deref().unwrap_or("none")
                );
            }
        }
    }
    Ok(())
}

fn print_tip(tip: &Tip) {
    println!(
        "{}  {} [{} / {}] by {}, {} likes, {} comments",
        tip.id,
        tip.title,
        tip.category,
        tip.difficulty,
        tip.author,
        tip.likes,
        tip.comments.len()
    );
}

fn print_gardener(gardener: &Gardener) {
    println!(
        "{} ({}, {} years, {}) {}: {} tips, {} likes",
        gardener.name,
        gardener.status,
        gardener.experience,
        gardener.experience_tier(),
        gardener.specialization,
        gardener.total_tips,
        gardener.likes_received
    );
}

fn print_notices(notices: &mut UnboundedReceiver<Notice>) {
    while let Ok(notice) = notices.try_recv() {
        let marker = match notice.kind {
            NoticeKind::Success => "+",
            NoticeKind::Info => "i",
            NoticeKind::Warning => "!",
            NoticeKind::Error => "x",
        };
        eprintln!("[{}] {}: {}", marker, notice.title, notice.text);
    }
}
