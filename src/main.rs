use clap::Parser;
use miette::Result;
use qmt::cli::{Cli, Commands};

fn main() -> Result<()> {
    // Restore default SIGPIPE so piping into `head` or `grep -q` terminates
    // quietly instead of panicking on a broken pipe.
    #[cfg(unix)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }

    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    let global = cli.global;

    match cli.command {
        Commands::Init(args) => qmt::cli::commands::init::run(args),
        Commands::User(cmd) => qmt::cli::commands::user::run(cmd, &global),
        Commands::Org(cmd) => qmt::cli::commands::org::run(cmd, &global),
        Commands::Stakeholder(cmd) => qmt::cli::commands::stakeholder::run(cmd, &global),
        Commands::Employee(cmd) => qmt::cli::commands::employee::run(cmd, &global),
        Commands::Commitment(cmd) => qmt::cli::commands::commitment::run(cmd, &global),
        Commands::Policy(cmd) => qmt::cli::commands::policy::run(cmd, &global),
        Commands::Risk(cmd) => qmt::cli::commands::risk::run(cmd, &global),
        Commands::Opp(cmd) => qmt::cli::commands::opportunity::run(cmd, &global),
        Commands::Response(cmd) => qmt::cli::commands::response::run(cmd, &global),
        Commands::Change(cmd) => qmt::cli::commands::change::run(cmd, &global),
        Commands::Sop(cmd) => qmt::cli::commands::sop::run(cmd, &global),
        Commands::Contract(cmd) => qmt::cli::commands::contract::run(cmd, &global),
        Commands::Design(cmd) => qmt::cli::commands::design::run(cmd, &global),
        Commands::Supplier(cmd) => qmt::cli::commands::supplier::run(cmd, &global),
        Commands::Service(cmd) => qmt::cli::commands::service::run(cmd, &global),
        Commands::Release(cmd) => qmt::cli::commands::release::run(cmd, &global),
        Commands::Ncr(cmd) => qmt::cli::commands::ncr::run(cmd, &global),
        Commands::Resource(cmd) => qmt::cli::commands::resource::run(cmd, &global),
        Commands::Training(cmd) => qmt::cli::commands::training::run(cmd, &global),
        Commands::Awareness(cmd) => qmt::cli::commands::awareness::run(cmd, &global),
        Commands::Commplan(cmd) => qmt::cli::commands::commplan::run(cmd, &global),
        Commands::Register(cmd) => qmt::cli::commands::register::run(cmd, &global),
        Commands::Attach(args) => qmt::cli::commands::attach::run(args, &global),
        Commands::Transition(args) => qmt::cli::commands::transition::run(args, &global),
        Commands::Bulk(cmd) => qmt::cli::commands::bulk::run(cmd, &global),
        Commands::Import(args) => qmt::cli::commands::import::run(args, &global),
        Commands::Validate(args) => qmt::cli::commands::validate::run(args, &global),
        Commands::Status(args) => qmt::cli::commands::status::run(args, &global),
        Commands::Report(cmd) => qmt::cli::commands::report::run(cmd, &global),
        Commands::Completions(args) => qmt::cli::commands::completions::run(args),
    }
}
