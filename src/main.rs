use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use kanban_board::cli::Cli;
use kanban_board::cmd::*;
use kanban_board::config::DEFAULT_LOG_FILTER;
use kanban_board::contacts::{load_contacts, CONTACTS_KEY};
use kanban_board::storage::FileStorage;
use kanban_board::store::TaskStore;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = cli.config();
    let storage = Arc::new(FileStorage::new(&config.data_dir));
    let mut store = TaskStore::new(storage.clone(), config.key.clone());
    if !matches!(cli.command, Commands::Completions { .. }) {
        if let Err(e) = store.load_all().await {
            eprintln!("Could not read saved tasks, starting from an empty board: {e}");
        }
    }

    let result = match cli.command {
        Commands::Completions { shell } => {
            cmd_completions(shell);
            Ok(())
        }

        Commands::Add {
            title,
            desc,
            category,
            color,
            assignees,
            date,
            priority,
            status,
            subtasks,
        } => {
            cmd_add(
                &mut store,
                title,
                desc,
                category,
                color,
                assignees,
                date,
                priority,
                status,
                subtasks,
            )
            .await
        }

        Commands::List { status, search } => {
            cmd_list(&store, status, search);
            Ok(())
        }

        Commands::View { id } => {
            let directory = load_contacts(storage.as_ref(), CONTACTS_KEY).await;
            cmd_view(&store, &directory, id)
        }

        Commands::Edit {
            id,
            title,
            desc,
            category,
            color,
            assign,
            unassign,
            date,
            priority,
            add_subtasks,
            rm_subtasks,
            rename_subtasks,
        } => {
            cmd_edit(
                &mut store,
                id,
                title,
                desc,
                category,
                color,
                assign,
                unassign,
                date,
                priority,
                add_subtasks,
                rm_subtasks,
                rename_subtasks,
            )
            .await
        }

        Commands::Delete { id } => cmd_delete(&mut store, id).await,

        Commands::Move { id, status } => cmd_move(&mut store, id, status).await,

        Commands::Toggle { id, position } => cmd_toggle(&mut store, id, position).await,
    };

    if let Err(e) = result {
        eprintln!("{e}");
        std::process::exit(1);
    }
    Ok(())
}
