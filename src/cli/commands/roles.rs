use clap::Subcommand;
use serde_json::{json, Map};

use crate::auth::{compute_new_roles, name_of, RoleSet};
use crate::cli::output::output_result;
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum RolesCommands {
    #[command(about = "Print the canonical form of a role string")]
    Normalize {
        #[arg(help = "Space-separated role names")]
        raw: String,
    },

    #[command(about = "Print the highest rank held by a role string")]
    Rank {
        #[arg(help = "Space-separated role names")]
        raw: String,
    },

    #[command(about = "Apply promotions and demotions on behalf of an actor")]
    Apply {
        #[arg(long, help = "Target user's current roles")]
        current: String,
        #[arg(long, help = "Roles held by the acting user")]
        actor: String,
        #[arg(long, default_value = "", help = "Roles to grant")]
        promote: String,
        #[arg(long, default_value = "", help = "Roles to revoke")]
        demote: String,
    },
}

pub fn handle(cmd: RolesCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        RolesCommands::Normalize { raw } => {
            let roles = RoleSet::decode(&raw);
            let mut data = Map::new();
            data.insert("roles".into(), json!(roles.encode()));
            data.insert("names".into(), json!(roles.names()));
            output_result(output_format, &roles.encode(), data)
        }
        RolesCommands::Rank { raw } => {
            let rank = RoleSet::decode(&raw).highest_rank();
            let mut data = Map::new();
            data.insert("rank".into(), json!(rank));
            data.insert("role".into(), json!(name_of(rank)));
            output_result(output_format, &rank.to_string(), data)
        }
        RolesCommands::Apply {
            current,
            actor,
            promote,
            demote,
        } => {
            let actor_rank = RoleSet::decode(&actor).highest_rank();
            let updated = compute_new_roles(
                &RoleSet::decode(&current),
                actor_rank,
                &RoleSet::decode(&promote),
                &RoleSet::decode(&demote),
            );
            let mut data = Map::new();
            data.insert("roles".into(), json!(updated.encode()));
            data.insert("actorRank".into(), json!(actor_rank));
            output_result(output_format, &updated.encode(), data)
        }
    }
}
