//! Entity CLI commands
//!
//! Categories, accounts, payees, locations and projects are managed through
//! one set of commands taking the kind as the first argument.

use clap::Subcommand;

use crate::error::{TallyError, TallyResult};
use crate::models::{Entity, EntityKind};
use crate::storage::Storage;

/// Entity subcommands
#[derive(Subcommand, Debug)]
pub enum EntityCommands {
    /// Add a category, account, payee, location or project
    Add {
        /// Kind of entry (category, account, payee, location, project)
        kind: EntityKind,

        /// Title of the new entry
        title: String,

        /// Parent category title (categories only)
        #[arg(short, long)]
        parent: Option<String>,

        /// Currency code the account is kept in (accounts only)
        #[arg(short, long)]
        currency: Option<String>,
    },

    /// List entries of one kind
    List {
        /// Kind of entry (category, account, payee, location, project)
        kind: EntityKind,

        /// Include inactive entries
        #[arg(short, long)]
        all: bool,
    },
}

/// Handle an entity command
pub fn handle_entity_command(storage: &Storage, cmd: EntityCommands) -> TallyResult<()> {
    match cmd {
        EntityCommands::Add {
            kind,
            title,
            parent,
            currency,
        } => {
            let entity = build_entity(storage, kind, title, parent, currency)?;
            let id = entity.id;
            let title = entity.title.clone();
            storage.entities.upsert(entity)?;
            storage.entities.save()?;
            println!("Created {} '{}' ({})", kind.display_name().to_lowercase(), title, id);
        }

        EntityCommands::List { kind, all } => {
            println!("{}", format_entity_list(storage, kind, all)?);
        }
    }

    Ok(())
}

fn build_entity(
    storage: &Storage,
    kind: EntityKind,
    title: String,
    parent: Option<String>,
    currency: Option<String>,
) -> TallyResult<Entity> {
    if storage.entities.get_by_title(kind, &title)?.is_some() {
        return Err(TallyError::Validation(format!(
            "{} '{}' already exists",
            kind, title
        )));
    }

    let mut entity = Entity::new(storage.entities.next_id()?, kind, title);

    if let Some(parent) = parent {
        let parent = storage
            .entities
            .get_by_title(EntityKind::Category, &parent)?
            .ok_or_else(|| TallyError::entity_not_found("Parent category", parent))?;
        entity = entity.with_parent(parent.id);
    }

    if let Some(code) = currency {
        if kind != EntityKind::Account {
            return Err(TallyError::Validation(format!(
                "Only accounts have a currency, not {}",
                kind.display_name().to_lowercase()
            )));
        }
        let currency = storage
            .currencies
            .get_by_name(&code)?
            .ok_or_else(|| TallyError::currency_not_found(code))?;
        entity = entity.with_currency(currency.id);
    }

    Ok(entity)
}

/// List entries of `kind`; categories are shown as a tree
pub fn format_entity_list(storage: &Storage, kind: EntityKind, all: bool) -> TallyResult<String> {
    let entities: Vec<Entity> = storage
        .entities
        .list(kind)?
        .into_iter()
        .filter(|e| all || e.active)
        .collect();

    if entities.is_empty() {
        return Ok(format!("No {} found.", plural(kind)));
    }

    let mut output = String::new();
    if kind == EntityKind::Category {
        for root in entities.iter().filter(|e| e.parent.is_none()) {
            push_tree(&mut output, &entities, root, 0);
        }
    } else {
        for entity in &entities {
            push_line(&mut output, entity, 0);
        }
    }
    Ok(output.trim_end().to_string())
}

fn plural(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Category => "categories",
        EntityKind::Account => "accounts",
        EntityKind::Payee => "payees",
        EntityKind::Location => "locations",
        EntityKind::Project => "projects",
    }
}

fn push_tree(output: &mut String, entities: &[Entity], node: &Entity, depth: usize) {
    push_line(output, node, depth);
    for child in entities.iter().filter(|e| e.parent == Some(node.id)) {
        push_tree(output, entities, child, depth + 1);
    }
}

fn push_line(output: &mut String, entity: &Entity, depth: usize) {
    let status = if entity.active { "" } else { " (inactive)" };
    output.push_str(&format!(
        "{}{:<6} {}{}\n",
        "  ".repeat(depth),
        entity.id.get(),
        entity.title,
        status
    ));
}
