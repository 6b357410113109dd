//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::cli::commands::{
    attach::AttachArgs,
    awareness::AwarenessCommands,
    bulk::BulkCommands,
    change::ChangeCommands,
    commitment::CommitmentCommands,
    commplan::CommplanCommands,
    completions::CompletionsArgs,
    contract::ContractCommands,
    design::DesignCommands,
    employee::EmployeeCommands,
    import::ImportArgs,
    init::InitArgs,
    ncr::NcrCommands,
    opportunity::OppCommands,
    org::OrgCommands,
    policy::PolicyCommands,
    register::RegisterCommands,
    release::ReleaseCommands,
    report::ReportCommands,
    resource::ResourceCommands,
    response::ResponseCommands,
    risk::RiskCommands,
    service::ServiceCommands,
    sop::SopCommands,
    stakeholder::StakeholderCommands,
    status::StatusArgs,
    supplier::SupplierCommands,
    training::TrainingCommands,
    transition::TransitionArgs,
    user::UserCommands,
    validate::ValidateArgs,
};

#[derive(Parser)]
#[command(name = "qmt")]
#[command(author, version, about = "Quality Management Toolkit")]
#[command(
    long_about = "A Unix-style toolkit for managing ISO 9001 quality management records as plain text files under version control."
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "auto")]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Enable verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Act as this user email (scoped listings; default: config or git user.email)
    #[arg(long = "as", global = true, value_name = "EMAIL")]
    pub as_user: Option<String>,

    /// Project root (default: auto-detect by finding .qmt/)
    #[arg(long, global = true)]
    pub project: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new QMT project
    Init(InitArgs),

    /// User directory management
    #[command(subcommand)]
    User(UserCommands),

    /// Organisation management (scoped listing)
    #[command(subcommand)]
    Org(OrgCommands),

    /// Stakeholder management
    #[command(subcommand)]
    Stakeholder(StakeholderCommands),

    /// Employee management
    #[command(subcommand)]
    Employee(EmployeeCommands),

    /// Leadership commitment management
    #[command(subcommand)]
    Commitment(CommitmentCommands),

    /// Quality policy management
    #[command(subcommand)]
    Policy(PolicyCommands),

    /// Risk management (derived score)
    #[command(subcommand)]
    Risk(RiskCommands),

    /// Opportunity management (derived score)
    #[command(subcommand)]
    Opp(OppCommands),

    /// Risk/opportunity response management
    #[command(subcommand)]
    Response(ResponseCommands),

    /// QMS change management
    #[command(subcommand)]
    Change(ChangeCommands),

    /// Standard operating procedure management
    #[command(subcommand)]
    Sop(SopCommands),

    /// Contract review management
    #[command(subcommand)]
    Contract(ContractCommands),

    /// Design project management
    #[command(subcommand)]
    Design(DesignCommands),

    /// Supplier evaluation management
    #[command(subcommand)]
    Supplier(SupplierCommands),

    /// Service report management
    #[command(subcommand)]
    Service(ServiceCommands),

    /// Product release management
    #[command(subcommand)]
    Release(ReleaseCommands),

    /// Nonconformance record management
    #[command(subcommand)]
    Ncr(NcrCommands),

    /// Resource plan management
    #[command(subcommand)]
    Resource(ResourceCommands),

    /// Training record management
    #[command(subcommand)]
    Training(TrainingCommands),

    /// Awareness record management
    #[command(subcommand)]
    Awareness(AwarenessCommands),

    /// Communication plan management
    #[command(subcommand)]
    Commplan(CommplanCommands),

    /// Document register management
    #[command(subcommand)]
    Register(RegisterCommands),

    /// Attach an evidence file to a record
    Attach(AttachArgs),

    /// Change a record's status through the transition guard
    Transition(TransitionArgs),

    /// Bulk operations on multiple records
    #[command(subcommand)]
    Bulk(BulkCommands),

    /// Import records from CSV
    Import(ImportArgs),

    /// Validate project records (uniqueness, references, derived fields)
    Validate(ValidateArgs),

    /// Show the project dashboard by area
    Status(StatusArgs),

    /// Generate QMS reports (risk register, management review)
    #[command(subcommand)]
    Report(ReportCommands),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Automatically detect based on context (yaml for show, tsv for list)
    #[default]
    Auto,
    /// YAML format (full fidelity)
    Yaml,
    /// Tab-separated values (for piping)
    Tsv,
    /// JSON format (for programming)
    Json,
    /// CSV format (for spreadsheets)
    Csv,
    /// Markdown tables
    Md,
    /// Just IDs, one per line
    Id,
}
