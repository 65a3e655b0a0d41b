//!
//! reclaim console
//! ---------------
//! Interactive client for the lost-and-found registry API. Sign in, browse
//! reported items, file claims, and (as an administrator) review the claim
//! queue and manage accounts.

use std::sync::Arc;

use anyhow::{Context, Result};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing::info;

use reclaim::admin::{self, UserDirectory, UsersProvider};
use reclaim::api::{HttpAuthProvider, HttpClaimsProvider, HttpClient, HttpItemsProvider, HttpUsersProvider};
use reclaim::claims::{ClaimDesk, ClaimsProvider, ReviewQueue};
use reclaim::cli;
use reclaim::config::Config;
use reclaim::error::AppError;
use reclaim::identity::{check, Access, AuthProvider, Capability, FileVault, SessionState, SessionStore};
use reclaim::model::{ClaimStatus, ImageAttachment, ItemDraft, ItemKind, PageQuery};
use reclaim::registry::{ItemRegistry, ItemsProvider};
use reclaim::reports;
use reclaim::validate;

const PAGE_SIZE: usize = 10;

fn print_usage() {
    eprintln!(
        "Commands:\n  login <email> <password>              sign in\n  register <name> <email> <password>    create an account (signs you in)\n  logout                                 sign out\n  whoami                                 show the current identity\n  forgot <email>                         request a password reset code\n  reset <email> <otp> <new-password>     consume the reset code\n\n  lost [page] [search...]                browse lost items (1-based page)\n  found [page] [search...]               browse found items\n  show lost|found <id>                   item details\n  report lost|found                      report an item (interactive)\n  claim lost|found <id> <reason...>      claim an item\n  mine                                   my reports: lost, found and claims\n\nAdmin:\n  claims [status] [page] [search...]     review queue (status: pending|approved|rejected)\n  approve <id> | reject <id>             adjudicate a pending claim\n  users [page] [search...]               account directory\n  enable <id> | disable <id>             toggle an account\n  stats                                  dashboard counts\n  export <path>                          save the approved-claims report\n  register-admin <name> <email> <pass>   provision another admin\n\n  help                                   this help\n  quit | exit                            leave"
    );
}

struct Console {
    rt: tokio::runtime::Runtime,
    state: Arc<SessionState>,
    store: SessionStore,
    auth: Arc<dyn AuthProvider>,
    items: Arc<dyn ItemsProvider>,
    claims_api: Arc<dyn ClaimsProvider>,
    users_api: Arc<dyn UsersProvider>,
    registry: ItemRegistry,
    desk: ClaimDesk,
    review: ReviewQueue,
    directory: UserDirectory,
}

fn main() -> Result<()> {
    println!(
        r"                __      _
   ________  _____/ /___ _(_)___ ___
  / ___/ _ \/ ___/ / __ `/ / __ `__ \
 / /  /  __/ /__/ / /_/ / / / / / / /
/_/   \___/\___/_/\__,_/_/_/ /_/ /_/
        lost & found console"
    );
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new("warn"))
        .unwrap();
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cfg = Config::from_env();
    info!(
        target: "reclaim",
        "starting: api_url='{}', vault='{}'",
        cfg.api_url,
        cfg.session_path().display()
    );

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to build Tokio runtime")?;

    let vault = Arc::new(FileVault::new(cfg.session_path()));
    let state = SessionState::new(vault);
    let client = Arc::new(HttpClient::new(&cfg.api_url, state.clone())?);
    let auth: Arc<dyn AuthProvider> = Arc::new(HttpAuthProvider::new(client.clone()));
    let items: Arc<dyn ItemsProvider> = Arc::new(HttpItemsProvider::new(client.clone()));
    let claims_api: Arc<dyn ClaimsProvider> = Arc::new(HttpClaimsProvider::new(client.clone()));
    let users_api: Arc<dyn UsersProvider> = Arc::new(HttpUsersProvider::new(client.clone()));

    let store = SessionStore::new(state.clone(), auth.clone());
    store.initialize();
    match store.current_user() {
        Some(u) => println!("Signed in as {} <{}>", u.name, u.email),
        None => println!("Not signed in. Type 'login <email> <password>' or 'help'."),
    }

    let console = Console {
        registry: ItemRegistry::new(items.clone()),
        desk: ClaimDesk::new(claims_api.clone()),
        review: ReviewQueue::new(claims_api.clone(), state.clone(), PAGE_SIZE),
        directory: UserDirectory::new(users_api.clone(), state.clone(), PAGE_SIZE),
        rt,
        state,
        store,
        auth,
        items,
        claims_api,
        users_api,
    };

    repl(console)
}

fn repl(console: Console) -> Result<()> {
    let mut editor = DefaultEditor::new()?;
    loop {
        let line = match editor.readline("reclaim> ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let _ = editor.add_history_entry(line);
        let words: Vec<&str> = line.split_whitespace().collect();
        match words[0].to_ascii_lowercase().as_str() {
            "quit" | "exit" => break,
            "help" => print_usage(),
            _ => dispatch(&console, &words),
        }
    }
    Ok(())
}

/// Print a failure the way the web client toasts it: message only.
fn report_err(e: &AppError) {
    eprintln!("error: {}", e.message());
}

/// Gate check for the console's protected commands; a denial names the
/// fallback surface instead of erroring.
fn gate(console: &Console, required: Capability) -> bool {
    match check(&console.state, required) {
        Access::Granted => true,
        Access::ToLogin => {
            println!("Please log in first.");
            false
        }
        Access::ToDashboard => {
            println!("Administrator access required; back to your dashboard.");
            false
        }
    }
}

fn parse_page(words: &[&str]) -> (usize, Option<String>) {
    match words.first() {
        Some(w) => match w.parse::<usize>() {
            Ok(n) => (n.max(1), join_rest(&words[1..])),
            Err(_) => (1, join_rest(words)),
        },
        None => (1, None),
    }
}

fn join_rest(words: &[&str]) -> Option<String> {
    if words.is_empty() {
        None
    } else {
        Some(words.join(" "))
    }
}

fn dispatch(console: &Console, words: &[&str]) {
    let cmd = words[0].to_ascii_lowercase();
    let args = &words[1..];
    match cmd.as_str() {
        "login" => {
            let [email, password] = args else {
                eprintln!("usage: login <email> <password>");
                return;
            };
            match console.rt.block_on(console.store.login(email, password)) {
                Ok(user) => println!("Welcome back, {}.", user.name),
                Err(e) => report_err(&e),
            }
        }
        "register" => {
            let [name, email, password] = args else {
                eprintln!("usage: register <name> <email> <password>");
                return;
            };
            match console.rt.block_on(console.store.register(name, email, password)) {
                Ok(user) => println!("Account created; signed in as {}.", user.name),
                Err(e) => report_err(&e),
            }
        }
        "logout" => {
            console.rt.block_on(console.store.logout());
            println!("Signed out.");
        }
        "whoami" => match console.store.current_user() {
            Some(u) => println!("{} <{}> ({:?})", u.name, u.email, u.role),
            None => println!("Not signed in."),
        },
        "forgot" => {
            let [email] = args else {
                eprintln!("usage: forgot <email>");
                return;
            };
            match console.rt.block_on(console.store.forgot_password(email)) {
                Ok(()) => println!("Reset code sent to {}.", email),
                Err(e) => report_err(&e),
            }
        }
        "reset" => {
            let [email, otp, new_password] = args else {
                eprintln!("usage: reset <email> <otp> <new-password>");
                return;
            };
            match console.rt.block_on(console.store.reset_password(email, otp, new_password)) {
                Ok(()) => println!("Password reset. Log in with your new password."),
                Err(e) => report_err(&e),
            }
        }
        "lost" | "found" => {
            if !gate(console, Capability::Authenticated) {
                return;
            }
            let kind = if cmd == "lost" { ItemKind::Lost } else { ItemKind::Found };
            let (display_page, search) = parse_page(args);
            let query = PageQuery { page: display_page - 1, size: PAGE_SIZE, search };
            match console.rt.block_on(console.registry.browse(kind, &query)) {
                Ok(page) => {
                    cli::print_table(cli::ITEM_COLUMNS, &cli::item_rows(&page.content));
                    println!("page {} of {}", display_page, page.total_pages.max(1));
                }
                Err(e) => report_err(&e),
            }
        }
        "show" => {
            if !gate(console, Capability::Authenticated) {
                return;
            }
            let [kind, id] = args else {
                eprintln!("usage: show lost|found <id>");
                return;
            };
            let Ok(kind) = kind.parse::<ItemKind>() else {
                eprintln!("usage: show lost|found <id>");
                return;
            };
            match console.rt.block_on(console.registry.detail(kind, id)) {
                Ok(item) => {
                    let viewer = console.store.current_user().map(|u| u.id);
                    cli::print_item(&item, viewer.as_deref());
                }
                Err(e) => report_err(&e),
            }
        }
        "report" => {
            if !gate(console, Capability::Authenticated) {
                return;
            }
            let Some(kind) = args.first().and_then(|k| k.parse::<ItemKind>().ok()) else {
                eprintln!("usage: report lost|found");
                return;
            };
            match prompt_draft() {
                Ok(draft) => match console.rt.block_on(console.registry.report(kind, &draft)) {
                    Ok(item) => println!("Reported. Item id: {}", item.id),
                    Err(e) => report_err(&e),
                },
                Err(e) => eprintln!("error: {}", e),
            }
        }
        "claim" => {
            if !gate(console, Capability::Authenticated) {
                return;
            }
            if args.len() < 3 {
                eprintln!("usage: claim lost|found <id> <reason...>");
                return;
            }
            let Ok(kind) = args[0].parse::<ItemKind>() else {
                eprintln!("usage: claim lost|found <id> <reason...>");
                return;
            };
            let id = args[1];
            let description = args[2..].join(" ");
            let Some(viewer) = console.store.current_user() else {
                return;
            };
            let outcome = console.rt.block_on(async {
                let item = console.registry.detail(kind, id).await?;
                console.desk.submit(&item, kind, &viewer.id, &description).await
            });
            match outcome {
                Ok(claim) => println!("Claim filed ({}). An administrator will review it.", claim.id),
                Err(e) => report_err(&e),
            }
        }
        "mine" => {
            if !gate(console, Capability::Authenticated) {
                return;
            }
            let summary = console
                .rt
                .block_on(reports::fetch_my_reports(&console.items, &console.claims_api));
            println!("-- my lost items --");
            match summary.lost.error() {
                Some(msg) => println!("unavailable: {}", msg),
                None => cli::print_table(cli::ITEM_COLUMNS, &cli::item_rows(summary.lost.rows())),
            }
            println!("-- my found items --");
            match summary.found.error() {
                Some(msg) => println!("unavailable: {}", msg),
                None => cli::print_table(cli::ITEM_COLUMNS, &cli::item_rows(summary.found.rows())),
            }
            println!("-- my claims --");
            match summary.claims.error() {
                Some(msg) => println!("unavailable: {}", msg),
                None => cli::print_table(cli::CLAIM_COLUMNS, &cli::claim_rows(summary.claims.rows())),
            }
        }
        "claims" => {
            if !gate(console, Capability::Admin) {
                return;
            }
            let mut rest = args;
            let outcome = console.rt.block_on(async {
                if let Some(status) = rest.first().and_then(|w| w.parse::<ClaimStatus>().ok()) {
                    rest = &rest[1..];
                    console.review.set_status_filter(status).await?;
                }
                if let Some(page) = rest.first().and_then(|w| w.parse::<usize>().ok()) {
                    rest = &rest[1..];
                    console.review.open_page(page.max(1)).await?;
                }
                if !rest.is_empty() {
                    console.review.set_search(&rest.join(" ")).await?;
                }
                if args.is_empty() {
                    console.review.refresh().await?;
                }
                Ok::<(), AppError>(())
            });
            match outcome {
                Ok(()) => print_review(console),
                Err(e) => report_err(&e),
            }
        }
        "approve" | "reject" => {
            if !gate(console, Capability::Admin) {
                return;
            }
            let [id] = args else {
                eprintln!("usage: {} <id>", cmd);
                return;
            };
            let outcome = if cmd == "approve" {
                console.rt.block_on(console.review.approve(id))
            } else {
                console.rt.block_on(console.review.reject(id))
            };
            match outcome {
                Ok(()) => {
                    println!("Claim {}.", if cmd == "approve" { "approved" } else { "rejected" });
                    print_review(console);
                }
                Err(e) => report_err(&e),
            }
        }
        "users" => {
            if !gate(console, Capability::Admin) {
                return;
            }
            let (display_page, search) = parse_page(args);
            let outcome = console.rt.block_on(async {
                if let Some(term) = search {
                    console.directory.set_search(&term).await?;
                }
                console.directory.open_page(display_page).await
            });
            match outcome {
                Ok(()) => {
                    let snap = console.directory.snapshot();
                    cli::print_table(cli::ACCOUNT_COLUMNS, &cli::account_rows(&snap.rows));
                    println!("page {} of {}", snap.display_page(), snap.total_pages.max(1));
                }
                Err(e) => report_err(&e),
            }
        }
        "enable" | "disable" => {
            if !gate(console, Capability::Admin) {
                return;
            }
            let [id] = args else {
                eprintln!("usage: {} <id>", cmd);
                return;
            };
            let outcome = if cmd == "enable" {
                console.rt.block_on(console.directory.enable(id))
            } else {
                console.rt.block_on(console.directory.disable(id))
            };
            match outcome {
                Ok(()) => println!("Account {}d.", cmd),
                Err(e) => report_err(&e),
            }
        }
        "stats" => {
            if !gate(console, Capability::Admin) {
                return;
            }
            // counts and the pending queue are independent reads; fetch them
            // together and let each fail on its own
            let (stats, queue) = console.rt.block_on(async {
                futures_util::join!(
                    admin::dashboard(&console.state, &console.users_api),
                    console.review.refresh(),
                )
            });
            match stats {
                Ok(stats) => cli::print_stats(&stats),
                Err(e) => report_err(&e),
            }
            match queue {
                Ok(()) => print_review(console),
                Err(e) => report_err(&e),
            }
        }
        "export" => {
            if !gate(console, Capability::Admin) {
                return;
            }
            let [path] = args else {
                eprintln!("usage: export <path>");
                return;
            };
            match console.rt.block_on(admin::export_approved_claims(
                &console.state,
                &console.claims_api,
                std::path::Path::new(path),
            )) {
                Ok(bytes) => println!("Report saved to {} ({} bytes).", path, bytes),
                Err(e) => report_err(&e),
            }
        }
        "register-admin" => {
            if !gate(console, Capability::Admin) {
                return;
            }
            let [name, email, password] = args else {
                eprintln!("usage: register-admin <name> <email> <password>");
                return;
            };
            match console.rt.block_on(admin::register_admin(&console.state, &console.auth, name, email, password)) {
                Ok(()) => println!("Admin account registered for {}.", email),
                Err(e) => report_err(&e),
            }
        }
        unknown => {
            eprintln!("Unrecognized command: {}. Type 'help'.", unknown);
        }
    }
}

fn print_review(console: &Console) {
    let snap = console.review.snapshot();
    println!("claims / status: {}, search: '{}'", snap.status, snap.search);
    cli::print_table(cli::REVIEW_COLUMNS, &cli::review_rows(&snap.rows));
    println!("page {} of {}", snap.display_page(), snap.total_pages.max(1));
}

fn prompt_line(label: &str) -> Result<String> {
    use std::io::Write;
    print!("{}: ", label);
    std::io::stdout().flush()?;
    let mut buf = String::new();
    std::io::stdin().read_line(&mut buf)?;
    Ok(buf.trim().to_string())
}

/// Interactive item report: one prompt per field, image optional.
fn prompt_draft() -> Result<ItemDraft> {
    let title = prompt_line("title")?;
    let description = prompt_line("description")?;
    println!("categories: {}", validate::CATEGORIES.join(", "));
    let category = prompt_line("category")?;
    let location = prompt_line("location")?;
    let date_raw = prompt_line("date (YYYY-MM-DD)")?;
    let event_date = date_raw
        .parse::<chrono::NaiveDate>()
        .with_context(|| format!("'{}' is not a valid date", date_raw))?;
    let contact_info = prompt_line("contact info")?;
    let image_path = prompt_line("image path (blank for none)")?;
    let image = if image_path.is_empty() {
        None
    } else {
        let bytes = std::fs::read(&image_path).with_context(|| format!("cannot read image '{}'", image_path))?;
        let file_name = std::path::Path::new(&image_path)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());
        Some(ImageAttachment { file_name, bytes })
    };
    Ok(ItemDraft { title, description, category, location, event_date, contact_info, image })
}
