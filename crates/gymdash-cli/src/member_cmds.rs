//! CLI handlers for `gymdash member` subcommands.

use std::sync::Arc;

use anyhow::Result;
use tracing::info;
use uuid::Uuid;

use gymdash_core::members::{Member, MemberFilter};
use gymdash_core::repository::Store;

use crate::MemberCommands;

pub async fn run_member_command(command: MemberCommands, store: Arc<dyn Store>) -> Result<()> {
    match command {
        MemberCommands::Add {
            name,
            email,
            phone,
            photo,
            status,
        } => {
            if name.trim().is_empty() {
                anyhow::bail!("member name must not be blank");
            }
            let member = Member {
                id: Uuid::new_v4(),
                name: name.trim().to_owned(),
                email,
                phone,
                photo,
                status,
            };
            store.insert_member(&member).await?;
            info!(member_id = %member.id, "member added");
            println!("Member {} added: {}", member.id, member.name);
            Ok(())
        }
        MemberCommands::List { search, status } => {
            let members = store.list_members().await?;
            let filter = MemberFilter { search, status };
            let shown = filter.apply(&members);

            if shown.is_empty() {
                println!("No members found.");
                return Ok(());
            }

            let name_w = shown.iter().map(|m| m.name.len()).max().unwrap_or(4).max(4);
            let email_w = shown.iter().map(|m| m.email.len()).max().unwrap_or(5).max(5);
            println!(
                "{:<36}  {:<name_w$}  {:<email_w$}  {:<8}  PHONE",
                "ID", "NAME", "EMAIL", "STATUS"
            );
            for m in shown {
                println!(
                    "{:<36}  {:<name_w$}  {:<email_w$}  {:<8}  {}",
                    m.id,
                    m.name,
                    m.email,
                    m.status.to_string(),
                    m.phone
                );
            }
            Ok(())
        }
    }
}
