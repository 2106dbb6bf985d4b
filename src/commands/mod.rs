//! This module contains business logic for the commands for the application.
//!
//! The main entry point is the [`command_from_args`] function which converts CLI arguments into a command.
use anyhow::Result;

use crate::{
    args::{
        AtlasArgs, access_lists::AccessLists, alerts::Alerts, backups::Backups, backups::Restores,
        backups::Snapshots, clusters::Clusters, config::Config,
        data_federation::DataFederation, dbusers::DbUsers,
        private_endpoints::{PrivateEndpointCommands, PrivateEndpoints},
        projects::Projects,
        teams::Teams,
    },
    config::ConfigStore,
    formatting::{Format, Formattable},
};
use with_atlas::{AtlasContext, TryFromWithAtlasClient};

pub use core::{Command, CommandWithOutput, CommandWithOutputExt};

pub mod access_lists;
pub mod alerts;
pub mod backups;
pub mod clusters;
pub mod config;
mod core;
pub mod data_federation;
pub mod dbusers;
pub mod delete;
pub mod private_endpoints;
pub mod projects;
pub mod teams;
pub mod validators;
pub mod watch;
pub mod with_atlas;

/// Convert CLI arguments into a command.
///
/// This function is the main entry point for the command execution logic.
/// It converts the CLI arguments into a command and returns it.
///
/// `config` commands work on `store` directly. Every other command runs against the API with
/// the credentials of the profile named `profile_name`.
///
/// The output of the command will be formatted using the provided format and printed to stdout.
pub fn command_from_args(
    args: AtlasArgs,
    format: Format,
    store: ConfigStore,
    profile_name: String,
) -> Result<Box<dyn Command>> {
    match args {
        AtlasArgs::Config(a) => config_command(a, format, store, profile_name),
        AtlasArgs::Projects(a) => projects_command(a, &context(&store, &profile_name)?, format),
        AtlasArgs::Clusters(a) => clusters_command(a, &context(&store, &profile_name)?, format),
        AtlasArgs::Backups(a) => backups_command(a, &context(&store, &profile_name)?, format),
        AtlasArgs::Alerts(a) => alerts_command(a, &context(&store, &profile_name)?, format),
        AtlasArgs::DbUsers(a) => dbusers_command(a, &context(&store, &profile_name)?, format),
        AtlasArgs::AccessLists(a) => {
            access_lists_command(a, &context(&store, &profile_name)?, format)
        }
        AtlasArgs::PrivateEndpoints(a) => {
            private_endpoints_command(a, &context(&store, &profile_name)?, format)
        }
        AtlasArgs::Teams(a) => teams_command(a, &context(&store, &profile_name)?, format),
        AtlasArgs::DataFederation(a) => {
            data_federation_command(a, &context(&store, &profile_name)?, format)
        }
    }
}

/// Profile (with environment overrides) and API client of the selected profile.
fn context(store: &ConfigStore, profile_name: &str) -> Result<AtlasContext> {
    AtlasContext::from_profile(store.profile(profile_name)?)
}

/// Build an API backed command and wrap it so its output is printed.
fn atlas_command<A, C>(args: A, context: &AtlasContext, format: Format) -> Result<Box<dyn Command>>
where
    C: TryFromWithAtlasClient<A> + CommandWithOutput + Send + 'static,
    C::Output: Formattable + Send + 'static,
{
    C::try_from_with_atlas(args, context)?.with_print_to_stdout(format)
}

fn config_command(
    args: Config,
    format: Format,
    store: ConfigStore,
    profile_name: String,
) -> Result<Box<dyn Command>> {
    match args {
        Config::Init(a) => config::Init::new(a, store, profile_name).with_print_to_stdout(format),
        Config::List(a) => config::List::new(a, store).with_print_to_stdout(format),
        Config::Describe(a) => config::Describe::new(a, store).with_print_to_stdout(format),
        Config::Set(a) => config::Set::new(a, store, profile_name).with_print_to_stdout(format),
        Config::Delete(a) => config::Delete::new(a, store).with_print_to_stdout(format),
        Config::Rename(a) => config::Rename::new(a, store).with_print_to_stdout(format),
    }
}

fn private_endpoints_command(
    args: PrivateEndpoints,
    context: &AtlasContext,
    format: Format,
) -> Result<Box<dyn Command>> {
    let (provider, command) = args.split();
    match command {
        PrivateEndpointCommands::List(a) => {
            atlas_command::<_, private_endpoints::List>((provider, a), context, format)
        }
        PrivateEndpointCommands::Describe(a) => {
            atlas_command::<_, private_endpoints::Describe>((provider, a), context, format)
        }
        PrivateEndpointCommands::Create(a) => {
            atlas_command::<_, private_endpoints::Create>((provider, a), context, format)
        }
        PrivateEndpointCommands::Delete(a) => {
            atlas_command::<_, private_endpoints::Delete>((provider, a), context, format)
        }
        PrivateEndpointCommands::Watch(a) => {
            atlas_command::<_, private_endpoints::Watch>((provider, a), context, format)
        }
    }
}

fn teams_command(args: Teams, context: &AtlasContext, format: Format) -> Result<Box<dyn Command>> {
    match args {
        Teams::List(a) => atlas_command::<_, teams::List>(a, context, format),
        Teams::Describe(a) => atlas_command::<_, teams::Describe>(a, context, format),
        Teams::Create(a) => atlas_command::<_, teams::Create>(a, context, format),
        Teams::Delete(a) => atlas_command::<_, teams::Delete>(a, context, format),
    }
}

fn data_federation_command(
    args: DataFederation,
    context: &AtlasContext,
    format: Format,
) -> Result<Box<dyn Command>> {
    match args {
        DataFederation::List(a) => atlas_command::<_, data_federation::List>(a, context, format),
        DataFederation::Describe(a) => {
            atlas_command::<_, data_federation::Describe>(a, context, format)
        }
        DataFederation::Create(a) => {
            atlas_command::<_, data_federation::Create>(a, context, format)
        }
        DataFederation::Delete(a) => {
            atlas_command::<_, data_federation::Delete>(a, context, format)
        }
    }
}

fn projects_command(
    args: Projects,
    context: &AtlasContext,
    format: Format,
) -> Result<Box<dyn Command>> {
    match args {
        Projects::List(a) => atlas_command::<_, projects::List>(a, context, format),
        Projects::Describe(a) => atlas_command::<_, projects::Describe>(a, context, format),
        Projects::Create(a) => atlas_command::<_, projects::Create>(a, context, format),
        Projects::Delete(a) => atlas_command::<_, projects::Delete>(a, context, format),
    }
}

fn clusters_command(
    args: Clusters,
    context: &AtlasContext,
    format: Format,
) -> Result<Box<dyn Command>> {
    match args {
        Clusters::List(a) => atlas_command::<_, clusters::list::List>(a, context, format),
        Clusters::Describe(a) => atlas_command::<_, clusters::describe::Describe>(a, context, format),
        Clusters::Create(a) => atlas_command::<_, clusters::create::Create>(a, context, format),
        Clusters::Update(a) => atlas_command::<_, clusters::update::Update>(a, context, format),
        Clusters::Delete(a) => atlas_command::<_, clusters::delete::Delete>(a, context, format),
        Clusters::Watch(a) => atlas_command::<_, clusters::watch::Watch>(a, context, format),
        Clusters::Pause(a) => atlas_command::<_, clusters::pause::SetPaused>(a, context, format),
        Clusters::Start(a) => atlas_command::<_, clusters::pause::SetPaused>(a, context, format),
        Clusters::Upgrade(a) => atlas_command::<_, clusters::upgrade::Upgrade>(a, context, format),
        Clusters::AutoScalingConfig(a) => {
            atlas_command::<_, clusters::auto_scaling::DescribeAutoScalingConfig>(a, context, format)
        }
    }
}

fn backups_command(
    args: Backups,
    context: &AtlasContext,
    format: Format,
) -> Result<Box<dyn Command>> {
    use backups::{restores, snapshots};

    match args {
        Backups::Snapshots(snapshots_args) => match snapshots_args {
            Snapshots::List(a) => atlas_command::<_, snapshots::List>(a, context, format),
            Snapshots::Describe(a) => atlas_command::<_, snapshots::Describe>(a, context, format),
            Snapshots::Create(a) => atlas_command::<_, snapshots::Create>(a, context, format),
            Snapshots::Delete(a) => atlas_command::<_, snapshots::Delete>(a, context, format),
            Snapshots::Watch(a) => atlas_command::<_, snapshots::Watch>(a, context, format),
        },
        Backups::Restores(restores_args) => match restores_args {
            Restores::List(a) => atlas_command::<_, restores::List>(a, context, format),
            Restores::Describe(a) => atlas_command::<_, restores::Describe>(a, context, format),
            Restores::Start(a) => atlas_command::<_, restores::Start>(a, context, format),
            Restores::Watch(a) => atlas_command::<_, restores::Watch>(a, context, format),
        },
    }
}

fn alerts_command(args: Alerts, context: &AtlasContext, format: Format) -> Result<Box<dyn Command>> {
    match args {
        Alerts::List(a) => atlas_command::<_, alerts::List>(a, context, format),
        Alerts::Describe(a) => atlas_command::<_, alerts::Describe>(a, context, format),
        Alerts::Acknowledge(a) => atlas_command::<_, alerts::Acknowledge>(a, context, format),
        Alerts::Unacknowledge(a) => atlas_command::<_, alerts::Acknowledge>(a, context, format),
    }
}

fn dbusers_command(
    args: DbUsers,
    context: &AtlasContext,
    format: Format,
) -> Result<Box<dyn Command>> {
    match args {
        DbUsers::List(a) => atlas_command::<_, dbusers::List>(a, context, format),
        DbUsers::Describe(a) => atlas_command::<_, dbusers::Describe>(a, context, format),
        DbUsers::Create(a) => atlas_command::<_, dbusers::Create>(a, context, format),
        DbUsers::Update(a) => atlas_command::<_, dbusers::Update>(a, context, format),
        DbUsers::Delete(a) => atlas_command::<_, dbusers::Delete>(a, context, format),
    }
}

fn access_lists_command(
    args: AccessLists,
    context: &AtlasContext,
    format: Format,
) -> Result<Box<dyn Command>> {
    match args {
        AccessLists::List(a) => atlas_command::<_, access_lists::List>(a, context, format),
        AccessLists::Describe(a) => atlas_command::<_, access_lists::Describe>(a, context, format),
        AccessLists::Create(a) => atlas_command::<_, access_lists::Create>(a, context, format),
        AccessLists::Delete(a) => atlas_command::<_, access_lists::Delete>(a, context, format),
    }
}
