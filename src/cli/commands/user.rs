//! `qmt user` command - user directory management
//!
//! Users live in `.qmt/users.yaml`. Deleting a user walks every record in
//! the store: PROTECT attributions reject the deletion outright, SET_NULL
//! attributions are cleared.

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;

use crate::cli::commands::utils;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::attach::{store_attachment, AttachmentKind};
use crate::core::store::{self, StoreError};
use crate::core::users::{AccountType, User, UserDirectory, UserRole};

#[derive(Subcommand, Debug)]
pub enum UserCommands {
    /// List directory users
    List,

    /// Add a user to the directory
    New(NewArgs),

    /// Show a user
    Show(ShowArgs),

    /// Delete a user (rejected while protected attributions exist)
    Delete(DeleteArgs),

    /// Store a signature image for a user
    Sign(SignArgs),
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Login email (unique)
    pub email: String,

    /// Full name
    #[arg(long)]
    pub name: String,

    /// Phone number (unique when present)
    #[arg(long)]
    pub phone: Option<String>,

    /// Account type
    #[arg(long, value_enum, default_value = "customer")]
    pub account_type: AccountType,

    /// Role
    #[arg(long, value_enum)]
    pub role: Option<UserRole>,

    /// Disable two-factor authentication (on by default)
    #[arg(long)]
    pub no_two_factor: bool,

    /// Mark as a department head
    #[arg(long)]
    pub department_head: bool,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// User email
    pub email: String,
}

#[derive(clap::Args, Debug)]
pub struct DeleteArgs {
    /// User email
    pub email: String,

    /// Skip the confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,
}

#[derive(clap::Args, Debug)]
pub struct SignArgs {
    /// User email
    pub email: String,

    /// Path to the signature image
    pub file: PathBuf,
}

pub fn run(cmd: UserCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        UserCommands::List => run_list(global),
        UserCommands::New(args) => run_new(args, global),
        UserCommands::Show(args) => run_show(args, global),
        UserCommands::Delete(args) => run_delete(args, global),
        UserCommands::Sign(args) => run_sign(args, global),
    }
}

fn run_list(global: &GlobalOpts) -> Result<()> {
    let project = utils::open_project(global)?;
    let directory = UserDirectory::load(&project);

    if directory.users.is_empty() {
        println!("No users in the directory.");
        println!();
        println!("Add one with: {}", style("qmt user new <email> --name ...").yellow());
        return Ok(());
    }

    match global.format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&directory.users).into_diagnostic()?;
            println!("{}", json);
        }
        OutputFormat::Yaml => {
            let yaml = serde_yml::to_string(&directory.users).into_diagnostic()?;
            print!("{}", yaml);
        }
        _ => {
            println!(
                "{:<30} {:<24} {:<14} {:<15} {:<5}",
                style("EMAIL").bold(),
                style("NAME").bold(),
                style("ACCOUNT").bold(),
                style("ROLE").bold(),
                style("2FA").bold()
            );
            println!("{}", "-".repeat(92));
            for user in &directory.users {
                println!(
                    "{:<30} {:<24} {:<14} {:<15} {:<5}",
                    user.email,
                    crate::cli::helpers::truncate_str(&user.full_name, 22),
                    user.account_type,
                    user.role.map_or("-".to_string(), |r| r.to_string()),
                    if user.use_two_factor_authentication { "on" } else { "off" }
                );
            }
        }
    }
    Ok(())
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let project = utils::open_project(global)?;
    let mut directory = UserDirectory::load(&project);

    let mut user = User::new(args.email.clone(), args.name);
    user.phone_number = args.phone;
    user.account_type = args.account_type;
    user.role = args.role;
    user.use_two_factor_authentication = !args.no_two_factor;
    user.department_head = args.department_head;

    directory.add(user).map_err(|e| miette::miette!("{}", e))?;
    directory.save(&project).into_diagnostic()?;

    println!("{} Added user {}", style("✓").green(), style(&args.email).cyan());
    Ok(())
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let project = utils::open_project(global)?;
    let directory = UserDirectory::load(&project);

    let user = directory
        .find(&args.email)
        .ok_or_else(|| miette::miette!("No user found with email '{}'", args.email))?;

    let yaml = serde_yml::to_string(user).into_diagnostic()?;
    print!("{}", yaml);
    Ok(())
}

fn run_delete(args: DeleteArgs, global: &GlobalOpts) -> Result<()> {
    let project = utils::open_project(global)?;
    let mut directory = UserDirectory::load(&project);

    if directory.find(&args.email).is_none() {
        return Err(miette::miette!("No user found with email '{}'", args.email));
    }

    if !utils::confirm_delete(&format!("Delete user '{}'?", args.email), args.yes)? {
        println!("Aborted.");
        return Ok(());
    }

    match store::clear_user_references(&project, &args.email) {
        Ok(cleared) => {
            directory.remove(&args.email);
            directory.save(&project).into_diagnostic()?;
            println!(
                "{} Deleted user '{}' ({} attribution(s) cleared)",
                style("✓").green(),
                args.email,
                cleared
            );
            Ok(())
        }
        Err(StoreError::ProtectedUser { email, count, refs }) => {
            eprintln!(
                "{} User '{}' is referenced by {} protected attribution field(s):",
                style("✗").red(),
                email,
                count
            );
            for protected in refs.iter().take(10) {
                eprintln!(
                    "  {} {} ({})",
                    crate::cli::helpers::format_short_id(&protected.record),
                    protected.record_title,
                    style(protected.field).dim()
                );
            }
            if refs.len() > 10 {
                eprintln!("  ... and {} more", refs.len() - 10);
            }
            Err(miette::miette!(
                "Deletion rejected. Reassign or delete the referencing records first."
            ))
        }
        Err(e) => Err(miette::miette!("{}", e)),
    }
}

fn run_sign(args: SignArgs, global: &GlobalOpts) -> Result<()> {
    let project = utils::open_project(global)?;
    let mut directory = UserDirectory::load(&project);

    if directory.find(&args.email).is_none() {
        return Err(miette::miette!("No user found with email '{}'", args.email));
    }

    let stored = store_attachment(&project, AttachmentKind::Signatures, &args.file)
        .map_err(|e| miette::miette!("{}", e))?;

    if let Some(user) = directory.find_mut(&args.email) {
        user.signature = Some(stored.clone());
    }
    directory.save(&project).into_diagnostic()?;

    println!(
        "{} Stored signature for '{}' at {}",
        style("✓").green(),
        args.email,
        style(&stored).dim()
    );
    Ok(())
}
