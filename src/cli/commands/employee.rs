//! `qmt employee` command - employee management

use clap::Subcommand;
use miette::Result;

use crate::cli::commands::utils::{self, DeleteArgs, EditArgs, ListArgs, ShowArgs};
use crate::cli::GlobalOpts;
use crate::core::{store, Config, EntityPrefix};
use crate::entities::Employee;

#[derive(Subcommand, Debug)]
pub enum EmployeeCommands {
    /// List employees with filtering
    List(ListArgs),

    /// Register a new employee
    New(NewArgs),

    /// Show an employee's details
    Show(ShowArgs),

    /// Edit an employee in your editor
    Edit(EditArgs),

    /// Delete an employee
    Delete(DeleteArgs),
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Owning organisation (ID, @N, or name)
    #[arg(long)]
    pub org: String,

    /// Employee name
    #[arg(long)]
    pub name: String,

    /// Job title
    #[arg(long)]
    pub designation: Option<String>,

    #[arg(long)]
    pub email: Option<String>,

    #[arg(long)]
    pub phone: Option<String>,

    /// Employee number (unique across the project)
    #[arg(long)]
    pub employee_id: Option<String>,

    /// Name of one of the organisation's declared roles
    #[arg(long)]
    pub role: Option<String>,
}

pub fn run(cmd: EmployeeCommands, global: &GlobalOpts) -> Result<()> {
    let project = utils::open_project(global)?;
    match cmd {
        EmployeeCommands::List(args) => {
            utils::run_list::<Employee>(&project, EntityPrefix::Emp, &args, global)
        }
        EmployeeCommands::New(args) => run_new(args, global),
        EmployeeCommands::Show(args) => {
            utils::run_show::<Employee>(&project, EntityPrefix::Emp, &args.id, global)
        }
        EmployeeCommands::Edit(args) => {
            utils::run_edit::<Employee>(&project, EntityPrefix::Emp, &args.id, &Config::load())
        }
        EmployeeCommands::Delete(args) => {
            utils::run_delete::<Employee>(&project, EntityPrefix::Emp, &args)
        }
    }
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let project = utils::open_project(global)?;
    let config = Config::load();

    let org = utils::resolve_organisation(&project, &args.org)?;

    if let Some(ref employee_id) = args.employee_id {
        store::ensure_unique_employee_id(&project, employee_id, None)
            .map_err(|e| miette::miette!("{}", e))?;
    }

    let mut employee = Employee::new(org.id, args.name, config.author());
    employee.designation = args.designation;
    employee.email = args.email;
    employee.phone_number = args.phone;
    employee.employee_id = args.employee_id;
    employee.role = args.role;

    let path = store::save(&project, &mut employee).map_err(|e| miette::miette!("{}", e))?;
    utils::print_created(&project, &employee.id, &path);
    Ok(())
}
