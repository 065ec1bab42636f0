use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use client_core::{ApiClient, TodoStore, TokenStore};
use shared::domain::TodoId;
use storage::SessionStore;

#[derive(Parser, Debug)]
#[command(name = "todo", about = "Todo list client")]
struct Args {
    /// Base URL of the todo API.
    #[arg(long, env = "TODO_API_URL")]
    api_url: String,
    /// SQLite database holding the login session.
    #[arg(long, env = "TODO_SESSION_DB", default_value = "sqlite://./data/session.db")]
    session_db: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create an account.
    Register {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        email: String,
    },
    /// Log in and persist the session token.
    Login {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
    },
    /// Clear the persisted session token.
    Logout,
    /// List todos.
    List,
    /// Show one todo.
    Show { id: String },
    /// Add a todo.
    Add {
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: String,
    },
    /// Edit a todo's title and description.
    Edit {
        id: String,
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: String,
    },
    /// Delete a todo.
    Remove { id: String },
    /// Show the logged-in profile.
    Profile,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().init();
    let args = Args::parse();

    let session = SessionStore::new(&args.session_db).await?;
    let client = ApiClient::new(args.api_url, Arc::new(session) as Arc<dyn TokenStore>);

    match args.command {
        Command::Register {
            username,
            password,
            email,
        } => {
            client.register(&username, &password, &email).await?;
            println!("Registered {username}. Log in to continue.");
        }
        Command::Login { username, password } => {
            client.login(&username, &password).await?;
            println!("Logged in as {username}.");
        }
        Command::Logout => {
            client.logout().await?;
            println!("Logged out.");
        }
        Command::List => {
            let store = TodoStore::new(Arc::new(client));
            store.fetch_all().await?;
            let items = store.snapshot().await;
            if items.is_empty() {
                println!("No todos.");
            }
            for item in items {
                println!("{}  {}: {}", item.id, item.title, item.description);
            }
        }
        Command::Show { id } => {
            let item = client.get_todo(&TodoId(id)).await?;
            println!("{}", item.title);
            println!("{}", item.description);
        }
        Command::Add { title, description } => {
            let item = client.create_todo(&title, &description).await?;
            println!("Added {}", item.id);
        }
        Command::Edit {
            id,
            title,
            description,
        } => {
            let item = client.update_todo(&TodoId(id), &title, &description).await?;
            println!("Updated {}", item.id);
        }
        Command::Remove { id } => {
            client.delete_todo(&TodoId(id)).await?;
            println!("Deleted.");
        }
        Command::Profile => {
            let profile = client.profile().await?;
            println!("Username: {}", profile.username);
            println!("Email:    {}", profile.email);
        }
    }

    Ok(())
}
