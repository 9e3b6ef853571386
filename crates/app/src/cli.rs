use clap::{Parser, Subcommand};
use serde::Serialize;
use uuid::Uuid;

use crate::{App, LoginPortal, Notice};

#[derive(Parser)]
#[command(name = "sitedesk")]
#[command(about = "Telecom site management dashboard client")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Commands {
    /// Sign in with email and password
    Login {
        #[arg(long)]
        email: String,

        #[arg(long)]
        password: String,

        /// Use the admin portal (lands on /admin)
        #[arg(long)]
        admin: bool,
    },

    /// Sign out and clear the stored session
    Logout,

    /// Show the current identity and session phase
    Whoami,

    /// Resolve a route path with the current session
    Open { path: String },

    /// List all sites (admin)
    Sites,

    /// Show one site with its devices and fiber routes (admin)
    Site { id: String },

    /// Delete a site (admin)
    DeleteSite { id: Uuid },

    /// Site markers for the map
    Map,

    /// List tasks with their sites (user)
    Tasks,

    /// Mark a task completed
    Complete { task_id: Uuid },

    /// Mark a task not completed
    Reopen { task_id: Uuid },

    /// List notifications (admin)
    Notifications,
}

#[derive(Serialize)]
struct Whoami<'a> {
    identity: Option<&'a sitedesk_auth::Identity>,
    phase: String,
    loading: bool,
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_notice(notice: &Notice) {
    if notice.is_error() {
        eprintln!("error: {}", notice);
    } else {
        println!("{}", notice);
    }
}

/// Bootstrap the session, then run one command against it
pub async fn run(app: &App, command: Commands) -> anyhow::Result<()> {
    app.bootstrap().await;

    let result: Result<(), Notice> = match command {
        Commands::Login {
            email,
            password,
            admin,
        } => {
            let portal = if admin {
                LoginPortal::Admin
            } else {
                LoginPortal::User
            };
            match app.login(portal, &email, &password).await {
                Ok(nav) => print_json(&nav).map_err(|e| Notice::error(e.to_string())),
                Err(notice) => Err(notice),
            }
        }
        Commands::Logout => {
            print_json(&app.logout().await).map_err(|e| Notice::error(e.to_string()))
        }
        Commands::Whoami => {
            let ctx = app.session().snapshot().await;
            print_json(&Whoami {
                identity: ctx.identity.as_ref(),
                phase: ctx.phase.to_string(),
                loading: ctx.loading(),
            })
            .map_err(|e| Notice::error(e.to_string()))
        }
        Commands::Open { path } => {
            print_json(&app.open(&path).await).map_err(|e| Notice::error(e.to_string()))
        }
        Commands::Sites => emit(app.sites().await),
        Commands::Site { id } => emit(app.site_details(&id).await),
        Commands::DeleteSite { id } => app.delete_site(id).await.map(|n| print_notice(&n)),
        Commands::Map => emit(app.site_map().await),
        Commands::Tasks => emit(app.tasks().await),
        Commands::Complete { task_id } => emit(app.set_task_completed(task_id, true).await),
        Commands::Reopen { task_id } => emit(app.set_task_completed(task_id, false).await),
        Commands::Notifications => emit(app.notifications().await),
    };

    result.map_err(|notice| {
        print_notice(&notice);
        anyhow::Error::new(notice)
    })
}

fn emit<T: Serialize>(result: Result<T, Notice>) -> Result<(), Notice> {
    let value = result?;
    print_json(&value).map_err(|e| Notice::error(e.to_string()))
}
